use std::cmp::Ordering;

use tracing::debug;

use super::graph::Graph;

struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    fn find(&mut self, mut index: usize) -> usize {
        while self.parent[index] != index {
            self.parent[index] = self.parent[self.parent[index]];
            index = self.parent[index];
        }
        index
    }

    /// Returns `false` when both elements already share a root.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let (root_a, root_b) = (self.find(a), self.find(b));
        if root_a == root_b {
            return false;
        }

        match self.rank[root_a].cmp(&self.rank[root_b]) {
            Ordering::Less => self.parent[root_a] = root_b,
            Ordering::Greater => self.parent[root_b] = root_a,
            Ordering::Equal => {
                self.parent[root_b] = root_a;
                self.rank[root_a] = self.rank[root_a].saturating_add(1);
            }
        }
        true
    }
}

/// Heaviest first, then canonical key ascending.
fn strength_order(graph: &Graph, a: usize, b: usize) -> Ordering {
    let (edges, key_a, key_b) = (graph.edges(), graph.edge_key(a), graph.edge_key(b));
    edges[b]
        .weight
        .total_cmp(&edges[a].weight)
        .then_with(|| key_a.cmp(&key_b))
}

/// Edges that rank within the `k` strongest of at least one endpoint.
pub fn top_k_edges(graph: &Graph, k: usize) -> Vec<bool> {
    let mut keep = vec![false; graph.size()];
    if k == 0 {
        return keep;
    }

    let mut ranked = Vec::new();
    for index in 0..graph.order() {
        ranked.clear();
        ranked.extend_from_slice(graph.incident_edges(index));
        ranked.sort_by(|&a, &b| strength_order(graph, a, b));
        for &edge_index in ranked.iter().take(k) {
            keep[edge_index] = true;
        }
    }
    keep
}

pub fn maximum_spanning_tree(graph: &Graph) -> Vec<bool> {
    let mut order = (0..graph.size()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| strength_order(graph, a, b));

    let mut forest = DisjointSet::new(graph.order());
    let mut tree = vec![false; graph.size()];
    for edge_index in order {
        let edge = &graph.edges()[edge_index];
        if forest.union(edge.source, edge.target) {
            tree[edge_index] = true;
        }
    }
    tree
}

pub fn structural_edges(graph: &Graph, k: usize) -> Vec<bool> {
    let mut keep = top_k_edges(graph, k);
    for (flag, in_tree) in keep.iter_mut().zip(maximum_spanning_tree(graph)) {
        *flag |= in_tree;
    }
    keep
}

/// Writes `keep_structural` on every edge and returns how many were kept.
pub fn apply(graph: &mut Graph, k: usize) -> usize {
    let keep = structural_edges(graph, k);
    let kept = keep.iter().filter(|keep| **keep).count();
    graph.set_structural(&keep);
    debug!(kept, total = graph.size(), k, "structural edge filter applied");
    kept
}

#[cfg(test)]
mod tests {
    use std::collections::{HashSet, VecDeque};

    use super::*;
    use crate::config::{EdgeSizing, NodeSizing};
    use crate::network::graph::NodeKind;
    use crate::network::ingest::NodeRecord;

    fn build(ids: &[&str], edges: &[(&str, &str, f32)]) -> Graph {
        let mut graph = Graph::new(NodeSizing::default(), EdgeSizing::default());
        for id in ids {
            graph.add_node(NodeRecord {
                id: (*id).to_owned(),
                label: (*id).to_owned(),
                kind: NodeKind::Reception,
                href: None,
            });
        }
        for (u, v, weight) in edges {
            graph.add_or_merge_edge(u, v, *weight);
        }
        graph
    }

    fn kept_keys(graph: &Graph, keep: &[bool]) -> Vec<(String, String)> {
        let mut keys = keep
            .iter()
            .enumerate()
            .filter(|(_, keep)| **keep)
            .map(|(index, _)| {
                let (low, high) = graph.edge_key(index);
                (low.to_owned(), high.to_owned())
            })
            .collect::<Vec<_>>();
        keys.sort();
        keys
    }

    fn reachable(graph: &Graph, start: usize, keep: Option<&[bool]>) -> HashSet<usize> {
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(index) = queue.pop_front() {
            for &edge_index in graph.incident_edges(index) {
                if keep.is_some_and(|keep| !keep[edge_index]) {
                    continue;
                }
                let edge = &graph.edges()[edge_index];
                let next = if edge.source == index {
                    edge.target
                } else {
                    edge.source
                };
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    #[test]
    fn triangle_with_k1_uses_canonical_tie_break() {
        let graph = build(
            &["A", "B", "C"],
            &[("A", "B", 1.0), ("B", "C", 1.0), ("A", "C", 5.0)],
        );

        let first = kept_keys(&graph, &structural_edges(&graph, 1));
        let second = kept_keys(&graph, &structural_edges(&graph, 1));

        assert_eq!(
            first,
            vec![
                ("A".to_owned(), "B".to_owned()),
                ("A".to_owned(), "C".to_owned()),
            ]
        );
        assert_eq!(first, second);
    }

    #[test]
    fn star_keeps_hub_top_two_and_tree_covers_leaves() {
        let leaves = ["l1", "l2", "l3", "l4", "l5"];
        let mut ids = vec!["hub"];
        ids.extend(leaves);
        let edges = leaves
            .iter()
            .enumerate()
            .map(|(index, leaf)| ("hub", *leaf, (index + 1) as f32))
            .collect::<Vec<_>>();
        let graph = build(&ids, &edges);

        let hub = graph.index_of("hub").unwrap();
        let mut hub_ranked = graph.incident_edges(hub).to_vec();
        hub_ranked.sort_by(|&a, &b| strength_order(&graph, a, b));
        let hub_top = hub_ranked
            .iter()
            .take(2)
            .map(|&index| graph.edge_key(index).1)
            .collect::<Vec<_>>();
        assert_eq!(hub_top, vec!["l5", "l4"]);

        // Every spoke is a bridge, so the tree needs all of them.
        let tree = maximum_spanning_tree(&graph);
        assert!(tree.iter().all(|in_tree| *in_tree));
        assert!(structural_edges(&graph, 2).iter().all(|keep| *keep));
    }

    #[test]
    fn hub_keeps_its_own_top_two_when_leaves_prefer_other_hubs() {
        let leaves = ["l1", "l2", "l3", "l4"];
        let ids = ["hub", "h2", "h3", "l1", "l2", "l3", "l4"];
        let mut edges = vec![
            ("hub", "l1", 5.0),
            ("hub", "l2", 4.0),
            ("hub", "l3", 3.0),
            ("hub", "l4", 2.0),
        ];
        for leaf in leaves {
            edges.push(("h2", leaf, 10.0));
            edges.push(("h3", leaf, 10.0));
        }
        let graph = build(&ids, &edges);

        let keep = top_k_edges(&graph, 2);
        let spokes = kept_keys(&graph, &keep)
            .into_iter()
            .filter(|(low, _)| low == "hub")
            .collect::<Vec<_>>();

        assert_eq!(
            spokes,
            vec![
                ("hub".to_owned(), "l1".to_owned()),
                ("hub".to_owned(), "l2".to_owned()),
            ]
        );
    }

    #[test]
    fn top_k_drops_weak_edges_in_dense_graph() {
        let ids = ["a", "b", "c", "d"];
        let graph = build(
            &ids,
            &[
                ("a", "b", 9.0),
                ("a", "c", 8.0),
                ("a", "d", 1.0),
                ("b", "c", 7.0),
                ("b", "d", 6.0),
                ("c", "d", 5.0),
            ],
        );

        let keep = structural_edges(&graph, 1);
        let keys = kept_keys(&graph, &keep);
        assert!(!keys.contains(&("a".to_owned(), "d".to_owned())));
        assert!(keys.contains(&("a".to_owned(), "b".to_owned())));
    }

    #[test]
    fn retained_edges_preserve_connectivity() {
        let ids = ["a", "b", "c", "d", "e", "f", "g", "h", "x", "y"];
        let mut edges = Vec::new();
        for (i, u) in ids.iter().take(8).enumerate() {
            for (j, v) in ids.iter().take(8).enumerate().skip(i + 1) {
                if (i * 5 + j * 3) % 4 != 0 {
                    edges.push((*u, *v, ((i * 13 + j * 7) % 9 + 1) as f32));
                }
            }
        }
        edges.push(("x", "y", 2.0));
        let graph = build(&ids, &edges);

        for k in 0..3 {
            let keep = structural_edges(&graph, k);
            for start in 0..graph.order() {
                assert_eq!(
                    reachable(&graph, start, Some(keep.as_slice())),
                    reachable(&graph, start, None)
                );
            }
        }
    }

    #[test]
    fn apply_writes_flags() {
        let mut graph = build(
            &["A", "B", "C"],
            &[("A", "B", 1.0), ("B", "C", 1.0), ("A", "C", 5.0)],
        );
        assert_eq!(apply(&mut graph, 1), 2);
        assert!(!graph.edge_between("B", "C").unwrap().keep_structural);
        assert!(graph.edge_between("C", "A").unwrap().keep_structural);
    }

    #[test]
    fn disjoint_set_merges_once() {
        let mut set = DisjointSet::new(4);
        assert!(set.union(0, 1));
        assert!(set.union(2, 3));
        assert!(set.union(1, 3));
        assert!(!set.union(0, 2));
        assert_eq!(set.find(0), set.find(3));
    }
}
