//! Zone-based rule matching for a discharge/load port pair.

use crate::tables::RuleTable;
use crate::types::{DistanceRule, Port};

/// A rule that applies to a pair, and whether it applies back to front.
#[derive(Debug, Clone, Copy)]
pub struct RuleMatch<'a> {
    pub rule: &'a DistanceRule,
    /// Set when the rule was declared `load zone -> disch zone`.
    pub is_reversed: bool,
}

/// Find every rule connecting the two ports' zones, lowest priority first.
///
/// A rule declared `disch zone -> load zone` matches forward, one declared
/// `load zone -> disch zone` matches reversed. Ports without a zone match
/// nothing. Equal priorities keep table order.
pub fn find_rules_for_pair<'a>(
    rules: &'a RuleTable,
    disch_port: &Port,
    load_port: &Port,
) -> Vec<RuleMatch<'a>> {
    let disch_zone = disch_port.zone_id.as_str();
    let load_zone = load_port.zone_id.as_str();
    if disch_zone.is_empty() || load_zone.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<RuleMatch<'a>> = rules
        .rules()
        .iter()
        .filter_map(|rule| {
            if rule.zone_start == disch_zone && rule.zone_end == load_zone {
                Some(RuleMatch {
                    rule,
                    is_reversed: false,
                })
            } else if rule.zone_start == load_zone && rule.zone_end == disch_zone {
                Some(RuleMatch {
                    rule,
                    is_reversed: true,
                })
            } else {
                None
            }
        })
        .collect();
    // `sort_by_key` is stable.
    matches.sort_by_key(|m| m.rule.priority);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(id: &str, zone: &str) -> Port {
        Port {
            id: id.to_string(),
            name: id.to_string(),
            is_load: true,
            zone_id: zone.to_string(),
            is_active: true,
            mgo_at_port: false,
            country_id: String::new(),
            port_code: String::new(),
            port_type: String::new(),
            coordinates: String::new(),
            nickname: String::new(),
            updated_at: None,
        }
    }

    fn rule(id: &str, priority: i64, start: &str, end: &str) -> DistanceRule {
        DistanceRule {
            id: id.to_string(),
            name: format!("rule {id}"),
            priority,
            zone_start: start.to_string(),
            zone_end: end.to_string(),
            waypoints: Vec::new(),
            discount_ballast: 0.0,
            discount_laden: 0.0,
        }
    }

    fn ids(matches: &[RuleMatch<'_>]) -> Vec<(String, bool)> {
        matches
            .iter()
            .map(|m| (m.rule.id.clone(), m.is_reversed))
            .collect()
    }

    #[test]
    fn matches_forward_and_reversed_zones() {
        let rules = RuleTable::new(vec![rule("r", 1, "1", "2")]);
        let forward = find_rules_for_pair(&rules, &port("d", "1"), &port("l", "2"));
        assert_eq!(ids(&forward), [("r".to_string(), false)]);

        let reversed = find_rules_for_pair(&rules, &port("d", "2"), &port("l", "1"));
        assert_eq!(ids(&reversed), [("r".to_string(), true)]);

        let other = find_rules_for_pair(&rules, &port("d", "1"), &port("l", "3"));
        assert!(other.is_empty());
    }

    #[test]
    fn missing_zone_matches_nothing() {
        let rules = RuleTable::new(vec![rule("r", 1, "", "2")]);
        assert!(find_rules_for_pair(&rules, &port("d", ""), &port("l", "2")).is_empty());
    }

    #[test]
    fn sorted_by_priority_with_stable_ties() {
        let rules = RuleTable::new(vec![
            rule("a", 5, "1", "2"),
            rule("b", 1, "2", "1"),
            rule("c", 5, "1", "2"),
            rule("d", 999, "1", "2"),
        ]);
        let found = find_rules_for_pair(&rules, &port("d", "1"), &port("l", "2"));
        let order: Vec<&str> = found.iter().map(|m| m.rule.id.as_str()).collect();
        assert_eq!(order, ["b", "a", "c", "d"]);
        assert!(found[0].is_reversed);
    }
}
