// SPDX-License-Identifier: MIT OR Apache-2.0

//! Join relationship validation
//!
//! A multi-source query is only evaluable when its join relationships form a
//! forest: each tree then has an order in which every join adds one new data
//! set to the ones already joined.

pub mod join_graph;

pub use join_graph::{
    is_acyclic, is_acyclic_with_policy, join_order, EdgeKey, JoinEndpoints, JoinGraph, NodeId,
    Peeling,
};
