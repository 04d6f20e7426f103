use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::stages::{STAGE_DEPENDENCIES, StageName};

/// Summary of the stage dependency graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageGraphSummary {
    pub nodes: usize,
    pub edges: usize,
}

/// Report for stage dependency ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageGraphReport {
    pub summary: StageGraphSummary,
    pub topo_order: Option<Vec<StageName>>,
    pub cycle: Option<Vec<StageName>>,
}

/// Build a deterministic dependency report for the seed stages.
pub fn build_stage_graph_report() -> StageGraphReport {
    let graph = build_adjacency();
    let nodes = graph.len();
    let edges = graph.values().map(|targets| targets.len()).sum();
    let summary = StageGraphSummary { nodes, edges };

    match toposort(&graph) {
        Ok(order) => StageGraphReport {
            summary,
            topo_order: Some(order),
            cycle: None,
        },
        Err(cycle) => StageGraphReport {
            summary,
            topo_order: None,
            cycle: Some(cycle),
        },
    }
}

/// Canonical execution order: dependencies first, ties by declaration order.
pub fn canonical_order() -> Vec<StageName> {
    build_stage_graph_report()
        .topo_order
        .unwrap_or_else(|| StageName::ALL.to_vec())
}

fn build_adjacency() -> BTreeMap<StageName, BTreeSet<StageName>> {
    let mut graph: BTreeMap<StageName, BTreeSet<StageName>> = BTreeMap::new();

    for stage in StageName::ALL {
        graph.entry(stage).or_default();
    }

    for (stage, deps) in STAGE_DEPENDENCIES {
        for dep in *deps {
            graph.entry(*dep).or_default().insert(*stage);
        }
    }

    graph
}

fn toposort(
    graph: &BTreeMap<StageName, BTreeSet<StageName>>,
) -> Result<Vec<StageName>, Vec<StageName>> {
    let mut indegree: BTreeMap<StageName, usize> =
        graph.keys().map(|node| (*node, 0)).collect();

    for targets in graph.values() {
        for target in targets {
            *indegree.entry(*target).or_insert(0) += 1;
        }
    }

    let mut ready: BTreeSet<StageName> = indegree
        .iter()
        .filter_map(|(node, count)| (*count == 0).then_some(*node))
        .collect();

    let mut order = Vec::with_capacity(graph.len());

    while let Some(node) = ready.pop_first() {
        order.push(node);

        if let Some(targets) = graph.get(&node) {
            for target in targets {
                if let Some(count) = indegree.get_mut(target) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.insert(*target);
                    }
                }
            }
        }
    }

    if order.len() == graph.len() {
        Ok(order)
    } else {
        Err(indegree
            .into_iter()
            .filter_map(|(node, count)| (count > 0).then_some(node))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_matches_pipeline() {
        assert_eq!(
            canonical_order(),
            vec![
                StageName::Products,
                StageName::Clients,
                StageName::Entries,
                StageName::Distributions,
                StageName::Sales,
            ]
        );
    }

    #[test]
    fn report_counts_dependency_edges() {
        let report = build_stage_graph_report();
        assert_eq!(report.summary.nodes, 5);
        assert_eq!(report.summary.edges, 4);
        assert!(report.cycle.is_none());
    }

    #[test]
    fn every_dependency_precedes_its_dependent() {
        let order = canonical_order();
        for stage in StageName::ALL {
            let position = order.iter().position(|s| *s == stage).expect("stage");
            for dep in stage.dependencies() {
                let dep_position = order.iter().position(|s| s == dep).expect("dep");
                assert!(dep_position < position, "{dep} must run before {stage}");
            }
        }
    }
}
