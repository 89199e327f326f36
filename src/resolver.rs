//! Expansion of a matched rule into a concrete route and per-leg checks.

use crate::segments::SegmentTable;
use crate::tables::PortTable;
use crate::types::{DistanceRule, Port};

/// Outcome of walking one rule's route for one port pair.
///
/// Resolution only proves every leg exists; leg distances are never summed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteResolution {
    pub resolved: bool,
    /// `(from, to)` ids of the legs that could not be found.
    pub missing_legs: Vec<(String, String)>,
}

impl RouteResolution {
    fn resolved() -> Self {
        RouteResolution {
            resolved: true,
            missing_legs: Vec::new(),
        }
    }

    fn missing(from_id: &str, to_id: &str) -> Self {
        RouteResolution {
            resolved: false,
            missing_legs: vec![(from_id.to_string(), to_id.to_string())],
        }
    }
}

/// Ordered port sequence `disch -> waypoints -> load` for a rule.
///
/// Waypoints unknown to the port table are dropped; a reversed match walks
/// the waypoints back to front. Consecutive stops with the same id collapse.
/// Returns `None` when the rule has no usable waypoint.
pub fn expand_route<'a>(
    disch_port: &'a Port,
    load_port: &'a Port,
    rule: &DistanceRule,
    is_reversed: bool,
    ports: &'a PortTable,
) -> Option<Vec<&'a Port>> {
    let mut waypoints: Vec<&Port> = rule.waypoints.iter().filter_map(|id| ports.get(id)).collect();
    if waypoints.is_empty() {
        return None;
    }
    if is_reversed {
        waypoints.reverse();
    }

    let mut route: Vec<&Port> = Vec::with_capacity(waypoints.len() + 2);
    for port in std::iter::once(disch_port)
        .chain(waypoints)
        .chain(std::iter::once(load_port))
    {
        if route.last().is_some_and(|prev| prev.id == port.id) {
            continue;
        }
        route.push(port);
    }
    Some(route)
}

/// Check that every leg a rule implies for the pair exists.
///
/// Without waypoints the pair is treated as a direct connection probed
/// `load -> disch` first; a miss is reported as the `(load, disch)` leg.
/// With waypoints the route is walked from the discharge end and stops at
/// the first missing leg.
pub fn resolve_route(
    disch_port: &Port,
    load_port: &Port,
    rule: &DistanceRule,
    is_reversed: bool,
    ports: &PortTable,
    segments: &SegmentTable,
) -> RouteResolution {
    let Some(route) = expand_route(disch_port, load_port, rule, is_reversed, ports) else {
        let (load_id, disch_id) = (load_port.id.as_str(), disch_port.id.as_str());
        let direct = segments
            .lookup(load_id, disch_id)
            .or_else(|| segments.lookup(disch_id, load_id));
        return match direct {
            Some(_) => RouteResolution::resolved(),
            None => RouteResolution::missing(load_id, disch_id),
        };
    };

    for leg in route.windows(2) {
        let (from, to) = (leg[0].id.as_str(), leg[1].id.as_str());
        if segments.lookup(from, to).is_none() {
            return RouteResolution::missing(from, to);
        }
    }
    RouteResolution::resolved()
}
