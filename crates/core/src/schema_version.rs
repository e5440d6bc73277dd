//! Schema version labels and upgrade path resolution.
//!
//! Versions are opaque labels (`"1.0"`, `"1.1"`, ...) compared by equality
//! only. Upgrades are a directed graph of `(from, to)` edges; a multi-hop
//! upgrade is the shortest chain of edges leading from the stored version to
//! the target version.

use std::collections::{HashMap, HashSet, VecDeque};

/// A directed upgrade edge between two schema versions.
pub trait UpgradeEdge {
    fn from_version(&self) -> &str;
    fn to_version(&self) -> &str;
}

impl UpgradeEdge for (&str, &str) {
    fn from_version(&self) -> &str {
        self.0
    }
    fn to_version(&self) -> &str {
        self.1
    }
}

/// Resolve the ordered chain of edges (as indices into `edges`) that upgrades
/// `from` to `to`.
///
/// Returns `Some(vec![])` when the versions are equal and `None` when `to` is
/// unreachable from `from`. Breadth-first search keeps the chain minimal;
/// among equally short chains the one using earlier-declared edges wins.
pub fn resolve_upgrade_path<E: UpgradeEdge>(edges: &[E], from: &str, to: &str) -> Option<Vec<usize>> {
    if from == to {
        return Some(Vec::new());
    }

    let mut outgoing: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, edge) in edges.iter().enumerate() {
        outgoing.entry(edge.from_version()).or_default().push(index);
    }

    let mut visited: HashSet<&str> = HashSet::from([from]);
    let mut came_by: HashMap<&str, usize> = HashMap::new();
    let mut queue = VecDeque::from([from]);

    while let Some(version) = queue.pop_front() {
        let Some(candidates) = outgoing.get(version) else {
            continue;
        };
        for &index in candidates {
            let next = edges[index].to_version();
            if !visited.insert(next) {
                continue;
            }
            came_by.insert(next, index);
            if next == to {
                return Some(unwind(edges, &came_by, from, to));
            }
            queue.push_back(next);
        }
    }
    None
}

fn unwind<E: UpgradeEdge>(
    edges: &[E],
    came_by: &HashMap<&str, usize>,
    from: &str,
    to: &str,
) -> Vec<usize> {
    let mut chain = Vec::new();
    let mut cursor = to;
    while cursor != from {
        let index = came_by[cursor];
        chain.push(index);
        cursor = edges[index].from_version();
    }
    chain.reverse();
    chain
}
