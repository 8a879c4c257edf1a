// SPDX-License-Identifier: MIT OR Apache-2.0

//! Join Graph Validation
//!
//! Checks that the join relationships of a multi-source query form a forest,
//! which is what gives the backend a single order in which to join sources.
//!
//! The test peels leaves: every node of degree 1 gives up its last incident
//! edge, which may turn its neighbour into a new leaf. A graph is a forest iff
//! peeling removes every edge. Edges left over sit on a cycle.
//!
//! ```text
//! A - B - C        peel A-B, B-C  -> all edges pruned, forest
//!
//! A - B            no node of degree 1 -> nothing pruned, cycle
//!  \ /
//!   C
//! ```

use std::collections::{HashMap, VecDeque};

use crate::core::config::ParallelEdgePolicy;
use crate::query_api::definition::{JoinEdge, JointCondition, SourceRef};

/// Anything that links two sources.
pub trait JoinEndpoints {
    fn endpoints(&self) -> (&SourceRef, &SourceRef);
}

impl JoinEndpoints for JoinEdge {
    fn endpoints(&self) -> (&SourceRef, &SourceRef) {
        (&self.pos1, &self.pos2)
    }
}

impl JoinEndpoints for JointCondition {
    fn endpoints(&self) -> (&SourceRef, &SourceRef) {
        (&self.pos1, &self.pos2)
    }
}

impl<T: JoinEndpoints> JoinEndpoints for &T {
    fn endpoints(&self) -> (&SourceRef, &SourceRef) {
        (*self).endpoints()
    }
}

/// Unordered endpoint pair, stored smaller endpoint first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    low: SourceRef,
    high: SourceRef,
}

impl EdgeKey {
    pub fn new(a: &SourceRef, b: &SourceRef) -> Self {
        if a <= b {
            EdgeKey {
                low: a.clone(),
                high: b.clone(),
            }
        } else {
            EdgeKey {
                low: b.clone(),
                high: a.clone(),
            }
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.low == self.high
    }
}

/// Arena index of a source in a [`JoinGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct GraphEdge {
    a: NodeId,
    b: NodeId,
    /// Indices of the declared join edges this graph edge stands for.
    members: Vec<usize>,
}

impl GraphEdge {
    fn other(&self, node: NodeId) -> NodeId {
        if self.a == node {
            self.b
        } else {
            self.a
        }
    }
}

/// Immutable adjacency snapshot of declared join edges.
#[derive(Debug, Clone)]
pub struct JoinGraph {
    nodes: Vec<SourceRef>,
    edges: Vec<GraphEdge>,
    /// Incident graph edges per node. A self-loop is listed twice.
    incident: Vec<Vec<usize>>,
    declared_edges: usize,
}

/// Outcome of peeling a [`JoinGraph`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peeling {
    /// Graph edge indices in the order they were pruned.
    pub pruned: Vec<usize>,
    pub total_edges: usize,
}

impl Peeling {
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.pruned.len() == self.total_edges
    }
}

impl JoinGraph {
    /// Build the graph. Nodes are numbered in order of first appearance.
    pub fn build<E: JoinEndpoints>(edges: &[E], policy: ParallelEdgePolicy) -> Self {
        let mut node_ids: HashMap<&SourceRef, NodeId> = HashMap::new();
        let mut nodes: Vec<SourceRef> = Vec::new();
        let mut graph_edges: Vec<GraphEdge> = Vec::with_capacity(edges.len());
        let mut merged: HashMap<EdgeKey, usize> = HashMap::new();

        for (idx, edge) in edges.iter().enumerate() {
            let (p1, p2) = edge.endpoints();
            let a = intern(p1, &mut node_ids, &mut nodes);
            let b = intern(p2, &mut node_ids, &mut nodes);

            if policy == ParallelEdgePolicy::Merge {
                let key = EdgeKey::new(p1, p2);
                if let Some(existing) = merged.get(&key) {
                    graph_edges[*existing].members.push(idx);
                    continue;
                }
                merged.insert(key, graph_edges.len());
            }

            graph_edges.push(GraphEdge {
                a,
                b,
                members: vec![idx],
            });
        }

        let mut incident = vec![Vec::new(); nodes.len()];
        for (edge_idx, edge) in graph_edges.iter().enumerate() {
            incident[edge.a.0].push(edge_idx);
            incident[edge.b.0].push(edge_idx);
        }

        JoinGraph {
            nodes,
            edges: graph_edges,
            incident,
            declared_edges: edges.len(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of graph edges (after merging, if the policy merges).
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn declared_edge_count(&self) -> usize {
        self.declared_edges
    }

    pub fn source(&self, id: NodeId) -> &SourceRef {
        &self.nodes[id.0]
    }

    pub fn node_id(&self, source: &SourceRef) -> Option<NodeId> {
        self.nodes.iter().position(|n| n == source).map(NodeId)
    }

    pub fn sources(&self) -> impl Iterator<Item = &SourceRef> {
        self.nodes.iter()
    }

    /// Number of incident edge endpoints of `id`.
    pub fn degree(&self, id: NodeId) -> usize {
        self.incident[id.0].len()
    }

    /// Prune leaves until none are left.
    pub fn peel(&self) -> Peeling {
        let mut degree: Vec<usize> = self.incident.iter().map(Vec::len).collect();
        let mut pruned_flags = vec![false; self.edges.len()];
        let mut pruned = Vec::with_capacity(self.edges.len());

        let mut worklist: VecDeque<NodeId> = (0..self.nodes.len())
            .filter(|&n| degree[n] == 1)
            .map(NodeId)
            .collect();

        while let Some(node) = worklist.pop_front() {
            // Degree may have dropped to 0 since the node was queued
            let Some(edge_idx) = self.incident[node.0]
                .iter()
                .copied()
                .find(|&e| !pruned_flags[e])
            else {
                continue;
            };

            pruned_flags[edge_idx] = true;
            pruned.push(edge_idx);

            let other = self.edges[edge_idx].other(node);
            degree[node.0] -= 1;
            degree[other.0] -= 1;
            if degree[other.0] == 1 {
                worklist.push_back(other);
            }
        }

        Peeling {
            pruned,
            total_edges: self.edges.len(),
        }
    }

    /// True when the edges form a forest.
    pub fn is_forest(&self) -> bool {
        let peeling = self.peel();
        if !peeling.is_complete() {
            log::debug!(
                "Join graph keeps {} of {} edges after peeling",
                peeling.total_edges - peeling.pruned.len(),
                peeling.total_edges
            );
        }
        peeling.is_complete()
    }

    /// Declared edge indices in an order where, inside each tree, every edge
    /// after the first touches a source already joined. `None` on a cycle.
    pub fn join_order(&self) -> Option<Vec<usize>> {
        let peeling = self.peel();
        if !peeling.is_complete() {
            return None;
        }
        Some(
            peeling
                .pruned
                .iter()
                .rev()
                .flat_map(|&e| self.edges[e].members.iter().copied())
                .collect(),
        )
    }

    /// Number of connected components among the sources that appear in joins.
    pub fn component_count(&self) -> usize {
        let mut parent: Vec<usize> = (0..self.nodes.len()).collect();

        fn find(parent: &mut [usize], mut x: usize) -> usize {
            while parent[x] != x {
                parent[x] = parent[parent[x]];
                x = parent[x];
            }
            x
        }

        let mut components = self.nodes.len();
        for edge in &self.edges {
            let ra = find(&mut parent, edge.a.0);
            let rb = find(&mut parent, edge.b.0);
            if ra != rb {
                parent[ra] = rb;
                components -= 1;
            }
        }
        components
    }
}

fn intern<'a>(
    pos: &'a SourceRef,
    node_ids: &mut HashMap<&'a SourceRef, NodeId>,
    nodes: &mut Vec<SourceRef>,
) -> NodeId {
    if let Some(id) = node_ids.get(pos) {
        return *id;
    }
    let id = NodeId(nodes.len());
    nodes.push(pos.clone());
    node_ids.insert(pos, id);
    id
}

/// Whether `edges` form a forest, counting every edge separately.
pub fn is_acyclic<E: JoinEndpoints>(edges: &[E]) -> bool {
    is_acyclic_with_policy(edges, ParallelEdgePolicy::Reject)
}

pub fn is_acyclic_with_policy<E: JoinEndpoints>(edges: &[E], policy: ParallelEdgePolicy) -> bool {
    JoinGraph::build(edges, policy).is_forest()
}

/// Edges reordered so joins can be evaluated one after another, or `None` on a cycle.
pub fn join_order<E: JoinEndpoints>(edges: &[E]) -> Option<Vec<&E>> {
    JoinGraph::build(edges, ParallelEdgePolicy::Reject)
        .join_order()
        .map(|order| order.into_iter().map(|i| &edges[i]).collect())
}
