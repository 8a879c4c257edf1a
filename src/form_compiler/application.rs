// SPDX-License-Identifier: MIT OR Apache-2.0

//! Application Pipeline - compile and validate a query form end to end
//!
//! Compilation alone only guarantees the form's shape. Before a spec is handed
//! to the backend the join graph must be a forest, and (when configured) the
//! joins must reach every data set and all operators must be evaluable.

use super::error::{ApplicationError, CompileError};
use super::normalizer::compile;
use super::operator_validation::validate_operators;
use crate::core::config::CompilerConfig;
use crate::core::validation::JoinGraph;
use crate::query_api::definition::{CanonicalQuerySpec, JointCondition, SourceColumns, SourceRef};

/// A spec that passed every check, with the order its joins evaluate in.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub spec: CanonicalQuerySpec,
    /// Indices into `spec.joint_conditions`
    pub join_order: Vec<usize>,
}

impl CompiledQuery {
    pub fn ordered_joins(&self) -> impl Iterator<Item = &JointCondition> {
        self.join_order
            .iter()
            .map(move |&i| &self.spec.joint_conditions[i])
    }
}

/// Compile `form_json` and run the checks enabled in `config`.
pub fn compile_query_application(
    form_json: &str,
    config: &CompilerConfig,
) -> Result<CompiledQuery, ApplicationError> {
    if form_json.len() > config.max_input_size {
        return Err(CompileError::InputTooLarge {
            size: form_json.len(),
            limit: config.max_input_size,
        }
        .into());
    }

    let spec = compile(form_json)?;
    let join_order = if spec.is_multi() {
        validate_joins(&spec, config)?
    } else {
        Vec::new()
    };

    if config.validate_operators {
        validate_operators(&spec)?;
    }

    log::info!(
        "Compiled {} query over {} data set(s) with {} join(s)",
        spec.query_concat_type.as_str(),
        spec.sources.len(),
        spec.joint_conditions.len()
    );

    Ok(CompiledQuery { spec, join_order })
}

/// Check the join graph of a multi-source spec and derive its join order.
pub fn validate_joins(
    spec: &CanonicalQuerySpec,
    config: &CompilerConfig,
) -> Result<Vec<usize>, ApplicationError> {
    let graph = JoinGraph::build(&spec.joint_conditions, config.parallel_edges);

    let Some(order) = graph.join_order() else {
        let peeling = graph.peel();
        log::warn!(
            "Rejecting query: {} of {} join(s) lie on a cycle",
            peeling.total_edges - peeling.pruned.len(),
            peeling.total_edges
        );
        return Err(ApplicationError::JoinGraphCyclic {
            remaining: peeling.total_edges - peeling.pruned.len(),
            total: peeling.total_edges,
        });
    };

    let components = graph.component_count();
    let unjoined: Vec<SourceRef> = if spec.sources.len() > 1 {
        spec.sources
            .iter()
            .filter(|source| !graph.sources().any(|node| refers_to(node, source)))
            .map(|source| SourceRef::Index(source.id as u64))
            .collect()
    } else {
        Vec::new()
    };

    if components > 1 || !unjoined.is_empty() {
        if config.require_connected {
            log::warn!(
                "Rejecting query: joins form {} group(s), unjoined data sets {:?}",
                components,
                unjoined
            );
            return Err(ApplicationError::JoinGraphDisconnected { components, unjoined });
        }
        log::warn!(
            "Joins form {} separate group(s); data sets {:?} are not joined",
            components,
            unjoined
        );
    }

    // Merged parallel conditions count as one join
    let joins = graph.edge_count();
    if joins + 1 != spec.sources.len() {
        if config.require_connected {
            log::warn!(
                "Rejecting query: {} join(s) for {} data set(s)",
                joins,
                spec.sources.len()
            );
            return Err(ApplicationError::JoinCountMismatch {
                joins,
                sources: spec.sources.len(),
            });
        }
        log::warn!(
            "{} join(s) for {} data set(s); the backend expects one join fewer than data sets",
            joins,
            spec.sources.len()
        );
    }

    Ok(order)
}

/// Whether a join endpoint names `source`: by position, or by its first shard address.
fn refers_to(node: &SourceRef, source: &SourceColumns) -> bool {
    match node {
        SourceRef::Index(idx) => *idx == source.id as u64,
        SourceRef::Name(name) => {
            *name == source.id.to_string() || source.first_shard() == Some(name.as_str())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ParallelEdgePolicy;
    use serde_json::json;

    fn form(joins: serde_json::Value, file_pos: serde_json::Value) -> String {
        json!({
            "queryConcatType": "multi",
            "queryConditions": [],
            "jointConditions": joins,
            "filePos": file_pos,
            "returnField": []
        })
        .to_string()
    }

    fn join(p1: serde_json::Value, p2: serde_json::Value) -> serde_json::Value {
        json!({"pos1": p1, "pos2": p2, "field1": "id", "field2": "id",
               "type": "int", "compare": "eq", "jointType": "INNER"})
    }

    #[test]
    fn test_chain_compiles_with_order() {
        let json = form(
            json!([join(json!(1), json!(2)), join(json!(0), json!(1))]),
            json!([["a"], ["b"], ["c"]]),
        );
        let compiled = compile_query_application(&json, &CompilerConfig::default()).unwrap();
        assert_eq!(compiled.join_order.len(), 2);
        assert_eq!(compiled.ordered_joins().count(), 2);
    }

    #[test]
    fn test_cycle_rejected() {
        let json = form(
            json!([
                join(json!(0), json!(1)),
                join(json!(1), json!(2)),
                join(json!(2), json!(0))
            ]),
            json!([["a"], ["b"], ["c"]]),
        );
        let err = compile_query_application(&json, &CompilerConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::JoinGraphCyclic {
                remaining: 3,
                total: 3
            }
        ));
    }

    #[test]
    fn test_parallel_edges_policy() {
        let json = form(
            json!([join(json!(0), json!(1)), join(json!(1), json!(0))]),
            json!([["a"], ["b"]]),
        );
        assert!(compile_query_application(&json, &CompilerConfig::default()).is_err());

        let merge = CompilerConfig {
            parallel_edges: ParallelEdgePolicy::Merge,
            ..CompilerConfig::default()
        };
        let compiled = compile_query_application(&json, &merge).unwrap();
        assert_eq!(compiled.join_order, vec![0, 1]);
    }

    fn lenient() -> CompilerConfig {
        CompilerConfig {
            require_connected: false,
            ..CompilerConfig::default()
        }
    }

    #[test]
    fn test_unjoined_source_rejected_by_default() {
        let json = form(json!([join(json!(0), json!(1))]), json!([["a"], ["b"], ["c"]]));
        match compile_query_application(&json, &CompilerConfig::default()) {
            Err(ApplicationError::JoinGraphDisconnected { components, unjoined }) => {
                assert_eq!(components, 1);
                assert_eq!(unjoined, vec![SourceRef::Index(2)]);
            }
            other => panic!("expected disconnected error, got {:?}", other),
        }

        assert!(compile_query_application(&json, &lenient()).is_ok());
    }

    #[test]
    fn test_shard_names_resolve_by_first_shard_only() {
        let file_pos = json!([["a1", "a2"], ["b1", "b2"]]);

        let json = form(json!([join(json!("a1"), json!("b1"))]), file_pos.clone());
        assert!(compile_query_application(&json, &CompilerConfig::default()).is_ok());

        let json = form(json!([join(json!("a1"), json!("b2"))]), file_pos);
        match compile_query_application(&json, &CompilerConfig::default()) {
            Err(ApplicationError::JoinGraphDisconnected { unjoined, .. }) => {
                assert_eq!(unjoined, vec![SourceRef::Index(1)]);
            }
            other => panic!("expected disconnected error, got {:?}", other),
        }
    }

    #[test]
    fn test_join_count_must_be_one_less_than_sources() {
        // Both names reach source 0, so four nodes stand for three sources
        let json = form(
            json!([
                join(json!(0), json!(1)),
                join(json!("a"), json!(2)),
                join(json!(1), json!(2))
            ]),
            json!([["a"], ["b"], ["c"]]),
        );
        assert!(matches!(
            compile_query_application(&json, &CompilerConfig::default()),
            Err(ApplicationError::JoinCountMismatch {
                joins: 3,
                sources: 3
            })
        ));
        assert!(compile_query_application(&json, &lenient()).is_ok());
    }

    #[test]
    fn test_multi_without_joins_needs_one_source() {
        let json = form(json!([]), json!([["a"]]));
        assert!(compile_query_application(&json, &CompilerConfig::default()).is_ok());

        let json = form(json!([]), json!([["a"], ["b"]]));
        assert!(matches!(
            compile_query_application(&json, &CompilerConfig::default()),
            Err(ApplicationError::JoinGraphDisconnected { components: 0, .. })
        ));
    }

    #[test]
    fn test_single_skips_join_checks() {
        let json = json!({
            "queryConcatType": "single",
            "queryConditions": [],
            "jointConditions": [join(json!(0), json!(0))],
            "filePos": [["a"]],
            "returnField": ["a_*"]
        })
        .to_string();
        let compiled = compile_query_application(&json, &CompilerConfig::default()).unwrap();
        assert!(compiled.join_order.is_empty());
        assert!(compiled.spec.joint_conditions.is_empty());
    }

    #[test]
    fn test_operator_validation_toggle() {
        let json = json!({
            "queryConcatType": "single",
            "queryConditions": [[
                {"pos": "a", "field": "age", "val": "old", "type": "int", "compare": "gt"}
            ]],
            "filePos": [["a"]],
            "returnField": []
        })
        .to_string();
        assert!(matches!(
            compile_query_application(&json, &CompilerConfig::default()),
            Err(ApplicationError::Operator(_))
        ));

        let lenient = CompilerConfig {
            validate_operators: false,
            ..CompilerConfig::default()
        };
        assert!(compile_query_application(&json, &lenient).is_ok());
    }

    #[test]
    fn test_input_size_limit() {
        let small = CompilerConfig {
            max_input_size: 8,
            ..CompilerConfig::default()
        };
        let err = compile_query_application("{\"queryConditions\": []}", &small).unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Compile(CompileError::InputTooLarge { limit: 8, .. })
        ));
    }
}
