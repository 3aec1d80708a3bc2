//! Invoice lineage: which original invoice does a rebilled invoice descend from?
//!
//! # Edge Direction
//!
//! ```text
//! A → B  means  "A was reversed and replaced by B"
//! A → A  means  "A is a known root" (a marker, not a cycle)
//! ```
//!
//! # Roots
//!
//! A node is a root when nothing points at it, or when the only edge pointing
//! at it is its own self-loop marker. Every node reachable from a root takes
//! that root as its effective root.
//!
//! # Degenerate input
//!
//! - Merges (a node reachable from two roots): the first root, in order of
//!   first appearance in the edge list, keeps the node.
//! - Rootless cycles (`X → Y → X`): the first-seen node on the cycle becomes an
//!   incidental root for everything it reaches, including nodes downstream of
//!   the cycle that happen to appear earlier in the edge list. Traversal always
//!   terminates.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

/// Flat invoice → effective-root mapping.
///
/// Total over every invoice that appears in the edge set. Roots map to
/// themselves, and no root maps elsewhere.
#[derive(Debug, Clone, Default)]
pub struct LineageMap {
    roots: HashMap<String, String>,
    incidental_roots: Vec<String>,
}

impl LineageMap {
    /// Effective root of `invoice`, if it appears in any edge.
    pub fn root_of(&self, invoice: &str) -> Option<&str> {
        self.roots.get(invoice).map(String::as_str)
    }

    /// Effective root of `invoice`, or the invoice itself when it is not part
    /// of any chain.
    pub fn resolve<'a>(&'a self, invoice: &'a str) -> &'a str {
        self.root_of(invoice).unwrap_or(invoice)
    }

    /// Nodes promoted to root only to break a cycle that had no root marker.
    pub fn incidental_roots(&self) -> &[String] {
        &self.incidental_roots
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.roots.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Adjacency over interned invoice ids, kept in first-appearance order so
/// resolution is deterministic.
struct Graph<'a> {
    ids: Vec<&'a str>,
    index: HashMap<&'a str, usize>,
    succs: Vec<Vec<usize>>,
    preds: Vec<Vec<usize>>,
    in_degree: Vec<usize>,
    self_loop: Vec<bool>,
}

impl<'a> Graph<'a> {
    fn build<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut g = Graph {
            ids: Vec::new(),
            index: HashMap::new(),
            succs: Vec::new(),
            preds: Vec::new(),
            in_degree: Vec::new(),
            self_loop: Vec::new(),
        };
        for (old, new) in edges {
            let a = g.intern(old);
            let b = g.intern(new);
            // Parallel duplicates collapse to one edge.
            if g.succs[a].contains(&b) {
                continue;
            }
            g.succs[a].push(b);
            g.in_degree[b] += 1;
            if a == b {
                g.self_loop[a] = true;
            } else {
                g.preds[b].push(a);
            }
        }
        g
    }

    fn intern(&mut self, id: &'a str) -> usize {
        if let Some(&i) = self.index.get(id) {
            return i;
        }
        let i = self.ids.len();
        self.ids.push(id);
        self.index.insert(id, i);
        self.succs.push(Vec::new());
        self.preds.push(Vec::new());
        self.in_degree.push(0);
        self.self_loop.push(false);
        i
    }

    fn is_root(&self, node: usize) -> bool {
        self.in_degree[node] == 0 || (self.in_degree[node] == 1 && self.self_loop[node])
    }

    /// Assign `root` to every unassigned node reachable from it (itself included).
    fn claim(&self, root: usize, owner: &mut [Option<usize>]) {
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            if owner[current].is_some() {
                continue;
            }
            owner[current] = Some(root);
            for &next in self.succs[current].iter().rev() {
                if owner[next].is_none() {
                    stack.push(next);
                }
            }
        }
    }

    /// Incidental root for the rootless component holding `start`: a node on a
    /// cycle that nothing outside its own cycle feeds into.
    fn incidental_root(&self, start: usize, owner: &[Option<usize>]) -> usize {
        let mut candidate = self.cycle_entry(start, owner);
        loop {
            let downstream = self.reachable(candidate, &self.succs, owner);
            let upstream = self.reachable(candidate, &self.preds, owner);
            // Another cycle feeds this one; move up to it.
            match upstream.iter().filter(|&&n| !downstream.contains(&n)).min() {
                Some(&outside) => candidate = self.cycle_entry(outside, owner),
                None => return candidate,
            }
        }
    }

    fn reachable(&self, from: usize, adj: &[Vec<usize>], owner: &[Option<usize>]) -> HashSet<usize> {
        let mut seen = HashSet::from([from]);
        let mut stack = vec![from];
        while let Some(current) = stack.pop() {
            for &next in &adj[current] {
                if owner[next].is_none() && seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        seen
    }

    /// Walk back from an unclaimed node through unclaimed predecessors until a
    /// node repeats, and return the first-seen node of the cycle found.
    ///
    /// Every predecessor of an unclaimed node is itself unclaimed, so the
    /// walk can only end on a cycle.
    fn cycle_entry(&self, start: usize, owner: &[Option<usize>]) -> usize {
        let mut position: HashMap<usize, usize> = HashMap::new();
        let mut path = Vec::new();
        let mut current = start;
        loop {
            if let Some(&pos) = position.get(&current) {
                return path[pos..].iter().copied().min().unwrap_or(current);
            }
            position.insert(current, path.len());
            path.push(current);
            match self.preds[current].iter().find(|&&p| owner[p].is_none()) {
                Some(&p) => current = p,
                None => return current,
            }
        }
    }
}

/// Resolve every invoice in `edges` (old → new) to its effective root.
pub fn resolve_roots<'a, I>(edges: I) -> LineageMap
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let graph = Graph::build(edges);
    let n = graph.ids.len();
    let mut owner: Vec<Option<usize>> = vec![None; n];

    let roots: Vec<usize> = (0..n).filter(|&i| graph.is_root(i)).collect();
    for &r in &roots {
        // A root can only have been claimed already if it is also reachable
        // from an earlier root, which `is_root` rules out.
        graph.claim(r, &mut owner);
    }

    let mut incidental_roots = Vec::new();
    for node in 0..n {
        if owner[node].is_none() {
            let root = graph.incidental_root(node, &owner);
            incidental_roots.push(graph.ids[root].to_string());
            graph.claim(root, &mut owner);
        }
    }

    if !incidental_roots.is_empty() {
        warn!(
            count = incidental_roots.len(),
            first = %incidental_roots[0],
            "reversal chain contains a cycle with no root marker; using first-seen invoice as root"
        );
    }
    debug!(nodes = n, roots = roots.len(), "resolved invoice lineage");

    let roots = (0..n)
        .filter_map(|i| {
            owner[i].map(|r| (graph.ids[i].to_string(), graph.ids[r].to_string()))
        })
        .collect();

    LineageMap { roots, incidental_roots }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn resolve(edges: &[(&str, &str)]) -> LineageMap {
        resolve_roots(edges.iter().copied())
    }

    #[test]
    fn empty_edge_set() {
        let map = resolve(&[]);
        assert!(map.is_empty());
        assert_eq!(map.resolve("INV1"), "INV1");
    }

    #[test]
    fn simple_chain() {
        let map = resolve(&[("A", "B"), ("B", "C")]);
        assert_eq!(map.root_of("A"), Some("A"));
        assert_eq!(map.root_of("B"), Some("A"));
        assert_eq!(map.root_of("C"), Some("A"));
        assert!(map.incidental_roots().is_empty());
    }

    #[test]
    fn self_loop_marks_root() {
        let map = resolve(&[("A", "A"), ("A", "B"), ("B", "C")]);
        assert_eq!(map.root_of("A"), Some("A"));
        assert_eq!(map.root_of("B"), Some("A"));
        assert_eq!(map.root_of("C"), Some("A"));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn lone_self_loop_is_its_own_root() {
        let map = resolve(&[("Z", "Z")]);
        assert_eq!(map.root_of("Z"), Some("Z"));
    }

    #[test]
    fn disjoint_chains() {
        let map = resolve(&[("A", "B"), ("X", "Y"), ("B", "C"), ("Y", "Z")]);
        assert_eq!(map.resolve("C"), "A");
        assert_eq!(map.resolve("Z"), "X");
        assert_eq!(map.resolve("Q"), "Q");
        assert_eq!(map.root_of("Q"), None);
    }

    #[test]
    fn pure_cycle_terminates_with_incidental_root() {
        let map = resolve(&[("X", "Y"), ("Y", "X")]);
        assert_eq!(map.root_of("X"), Some("X"));
        assert_eq!(map.root_of("Y"), Some("X"));
        assert_eq!(map.incidental_roots(), ["X".to_string()]);
    }

    #[test]
    fn node_downstream_of_cycle_seen_first_is_not_a_root() {
        // Z hangs off the X <-> Y cycle but is interned before either.
        let map = resolve(&[("Z", "W"), ("Y", "Z"), ("X", "Y"), ("Y", "X")]);
        assert_eq!(map.incidental_roots(), ["Y".to_string()]);
        assert_eq!(map.root_of("Y"), Some("Y"));
        assert_eq!(map.root_of("X"), Some("Y"));
        assert_eq!(map.root_of("Z"), Some("Y"));
        assert_eq!(map.root_of("W"), Some("Y"));
    }

    #[test]
    fn chained_cycles_break_at_the_upstream_one() {
        // X <-> Y feeds U <-> V; U is seen first but is not where the chain starts.
        let map = resolve(&[("U", "V"), ("V", "U"), ("Y", "U"), ("X", "Y"), ("Y", "X")]);
        assert_eq!(map.incidental_roots(), ["Y".to_string()]);
        for invoice in ["U", "V", "X", "Y"] {
            assert_eq!(map.root_of(invoice), Some("Y"));
        }
    }

    #[test]
    fn one_incidental_root_per_rootless_component() {
        let map = resolve(&[("P", "Q"), ("Q", "R"), ("R", "Q"), ("M", "N"), ("N", "M")]);
        // P roots its component; only M <-> N needs breaking.
        assert_eq!(map.incidental_roots(), ["M".to_string()]);
        assert_eq!(map.root_of("R"), Some("P"));
        assert_eq!(map.root_of("N"), Some("M"));
    }

    #[test]
    fn cycle_hanging_off_a_root_belongs_to_that_root() {
        let map = resolve(&[("R", "X"), ("X", "Y"), ("Y", "X")]);
        assert_eq!(map.root_of("X"), Some("R"));
        assert_eq!(map.root_of("Y"), Some("R"));
        assert!(map.incidental_roots().is_empty());
    }

    #[test]
    fn merge_keeps_first_root() {
        // M has two independent ancestors; A appears first.
        let map = resolve(&[("A", "M"), ("B", "M"), ("M", "N")]);
        assert_eq!(map.root_of("M"), Some("A"));
        assert_eq!(map.root_of("N"), Some("A"));
        assert_eq!(map.root_of("B"), Some("B"));
    }

    #[test]
    fn parallel_duplicate_edges_collapse() {
        // Without dedup B would have in-degree 2; it must still resolve to A.
        let map = resolve(&[("A", "B"), ("A", "B"), ("B", "C")]);
        assert_eq!(map.root_of("C"), Some("A"));
    }

    #[test]
    fn duplicate_self_loop_marker_is_still_root() {
        let map = resolve(&[("A", "A"), ("A", "A"), ("A", "B")]);
        assert_eq!(map.root_of("A"), Some("A"));
        assert_eq!(map.root_of("B"), Some("A"));
    }

    #[test]
    fn long_chain_does_not_recurse() {
        let ids: Vec<String> = (0..100_000).map(|i| format!("INV{i}")).collect();
        let edges: Vec<(&str, &str)> = ids
            .windows(2)
            .map(|w| (w[0].as_str(), w[1].as_str()))
            .collect();
        let map = resolve_roots(edges);
        assert_eq!(map.root_of("INV99999"), Some("INV0"));
    }

    proptest! {
        #[test]
        fn roots_are_fixed_points(
            raw in proptest::collection::vec((0u8..12, 0u8..12), 0..40)
        ) {
            let names: Vec<(String, String)> = raw
                .iter()
                .map(|(a, b)| (format!("I{a}"), format!("I{b}")))
                .collect();
            let map = resolve_roots(names.iter().map(|(a, b)| (a.as_str(), b.as_str())));

            for (a, b) in &names {
                prop_assert!(map.root_of(a).is_some());
                prop_assert!(map.root_of(b).is_some());
            }
            for (_, root) in map.iter() {
                prop_assert_eq!(map.root_of(root), Some(root));
            }
        }
    }
}
