//! Reference solver: one task per PU, sticky across rounds.

use std::collections::HashSet;

use super::{BipartiteNetwork, FlowNodeId, Solver, TaskMapping};

/// Keeps every task on the PU it got last round while that PU still exists,
/// then hands the remaining PUs out in node order.
#[derive(Debug, Default)]
pub struct FirstFitSolver {
    previous: TaskMapping,
}

impl FirstFitSolver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Solver<BipartiteNetwork> for FirstFitSolver {
    fn solve(&mut self, network: &BipartiteNetwork) -> TaskMapping {
        let mut mapping = TaskMapping::new();
        let mut taken: HashSet<FlowNodeId> = HashSet::new();

        for (task_node, _) in network.task_nodes() {
            if let Some(prev) = self.previous.get(&task_node) {
                if network.has_resource_node(*prev) && taken.insert(*prev) {
                    mapping.insert(task_node, *prev);
                }
            }
        }

        let mut free = network
            .resource_nodes()
            .map(|(id, _)| id)
            .filter(|id| !taken.contains(id));

        for (task_node, _) in network.task_nodes() {
            if mapping.contains_key(&task_node) {
                continue;
            }
            match free.next() {
                Some(resource_node) => {
                    mapping.insert(task_node, resource_node);
                }
                None => break,
            }
        }

        self.previous = mapping.clone();
        mapping
    }
}
