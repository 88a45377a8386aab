//! Incremental routing cache.
//!
//! Keyed per edge by a hash of every input that can change its geometry:
//! both endpoint nodes' positions and rotations, their resolved layouts, the
//! edge's manual corners, and the routing config. A cache hit skips
//! `route_edge` entirely; a miss recomputes and refreshes the entry.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use patch_core::EdgeId;
use patch_model::GraphSnapshot;
use patch_registry::{NodeRegistry, PortPlacement};

use crate::config::RoutingConfig;
use crate::error::RouteError;
use crate::path::{RouteResult, route_edge};
use crate::placements::node_placements;

#[derive(Hash)]
struct CacheKeyInputs {
    from_pos: (i32, i32),
    from_rotation: i32,
    from_layout: Vec<(u8, u8, usize)>,
    to_pos: (i32, i32),
    to_rotation: i32,
    to_layout: Vec<(u8, u8, usize)>,
    corners: Vec<(i32, i32)>,
    ticks_per_grid_bits: u64,
    bend_preference: u8,
}

fn placement_fingerprint(placements: &[PortPlacement]) -> Vec<(u8, u8, usize)> {
    placements
        .iter()
        .map(|p| {
            let dir = match p.direction {
                patch_core::Direction::Input => 0,
                patch_core::Direction::Output => 1,
            };
            let side = match p.side {
                patch_core::Side::Left => 0,
                patch_core::Side::Right => 1,
                patch_core::Side::Top => 2,
                patch_core::Side::Bottom => 3,
            };
            (dir, side, p.side_index)
        })
        .collect()
}

fn cache_key(snapshot: &GraphSnapshot, registry: &NodeRegistry, edge: &patch_model::EdgeRecord, config: &RoutingConfig) -> Option<u64> {
    let from_node = snapshot.nodes.iter().find(|n| n.id == edge.from.node)?;
    let to_node = snapshot.nodes.iter().find(|n| n.id == edge.to.node)?;
    let from_layout = node_placements(from_node, registry, snapshot)?;
    let to_layout = node_placements(to_node, registry, snapshot)?;

    let inputs = CacheKeyInputs {
        from_pos: (from_node.position.x, from_node.position.y),
        from_rotation: from_node.rotation.degrees(),
        from_layout: placement_fingerprint(&from_layout),
        to_pos: (to_node.position.x, to_node.position.y),
        to_rotation: to_node.rotation.degrees(),
        to_layout: placement_fingerprint(&to_layout),
        corners: edge.corners.iter().map(|c| (c.x, c.y)).collect(),
        ticks_per_grid_bits: config.ticks_per_grid.to_bits(),
        bend_preference: match config.bend_preference {
            crate::config::BendPreference::HorizontalFirst => 0,
            crate::config::BendPreference::VerticalFirst => 1,
        },
    };
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    inputs.hash(&mut hasher);
    Some(hasher.finish())
}

/// Per-edge cached routing results, keyed by a content hash of each edge's
/// routing inputs.
#[derive(Debug, Default)]
pub struct RouteCache {
    entries: HashMap<EdgeId, (u64, Result<RouteResult, RouteError>)>,
}

impl RouteCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes every edge in `snapshot`, reusing cached results whose content
    /// hash is unchanged. `changed` optionally restricts eager recomputation
    /// to a known subset of edges (e.g. from a model-change notification);
    /// edges outside it are still checked against their cached hash before
    /// being reused, so a stale `changed` set can never serve incorrect
    /// geometry — it only saves the hash check for the rest.
    pub fn route_batch<'a>(
        &mut self,
        snapshot: &GraphSnapshot,
        registry: &NodeRegistry,
        config: &RoutingConfig,
        changed: Option<&std::collections::HashSet<EdgeId>>,
    ) -> HashMap<EdgeId, Result<RouteResult, RouteError>> {
        let mut results = HashMap::with_capacity(snapshot.edges.len());
        let mut live_ids = std::collections::HashSet::with_capacity(snapshot.edges.len());

        for edge in &snapshot.edges {
            live_ids.insert(edge.id.clone());
            let force = changed.is_some_and(|set| set.contains(&edge.id));
            let key = cache_key(snapshot, registry, edge, config);

            let cached = self.entries.get(&edge.id);
            let reuse = !force
                && key.is_some()
                && cached.is_some_and(|(cached_key, _)| Some(*cached_key) == key);

            let outcome = if reuse {
                cached.unwrap().1.clone()
            } else {
                route_edge(snapshot, registry, edge, config)
            };

            if let Some(k) = key {
                self.entries.insert(edge.id.clone(), (k, outcome.clone()));
            } else {
                self.entries.remove(&edge.id);
            }
            results.insert(edge.id.clone(), outcome);
        }

        self.entries.retain(|id, _| live_ids.contains(id));
        results
    }

    /// Drops every cached entry, forcing full recomputation on the next batch.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
