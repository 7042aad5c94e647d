// src/dag/graph.rs

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use petgraph::unionfind::UnionFind;

use crate::dag::scenario::{Task, TaskId};
use crate::errors::ScenarioError;

/// Internal node structure: stores immediate deps and dependents as indices
/// into the scenario's task list.
#[derive(Debug, Clone, Default)]
struct DagNode {
    /// Direct dependencies: tasks that must complete before this one can start.
    deps: Vec<usize>,
    /// Direct dependents: tasks that depend on this one.
    dependents: Vec<usize>,
}

/// Structural view of a scenario's dependency graph.
///
/// Nodes are addressed by their position in the scenario's task list, so
/// every derived table (waves, components, schedules) is a plain `Vec`
/// indexed the same way. Building a `DagGraph` is also where malformed
/// scenarios are rejected: duplicate ids, dangling or self dependencies
/// and cycles all fail here.
#[derive(Debug, Clone)]
pub struct DagGraph {
    index: HashMap<TaskId, usize>,
    nodes: Vec<DagNode>,
    topo_order: Vec<usize>,
    /// Wave index per task: 0 for roots, else 1 + max wave of its deps.
    waves: Vec<usize>,
    /// Dense weakly-connected component id per task.
    components: Vec<usize>,
    component_count: usize,
}

impl DagGraph {
    /// Build and validate the DAG for the given tasks.
    pub fn build(tasks: &[Task]) -> Result<Self, ScenarioError> {
        let mut index = HashMap::with_capacity(tasks.len());
        for (i, task) in tasks.iter().enumerate() {
            if index.insert(task.id.clone(), i).is_some() {
                return Err(ScenarioError::DuplicateTask(task.id.clone()));
            }
        }

        let mut nodes = vec![DagNode::default(); tasks.len()];
        for (i, task) in tasks.iter().enumerate() {
            for dep in &task.deps {
                if dep == &task.id {
                    return Err(ScenarioError::SelfDependency(task.id.clone()));
                }
                let Some(&d) = index.get(dep) else {
                    return Err(ScenarioError::UnknownDependency {
                        task: task.id.clone(),
                        dependency: dep.clone(),
                    });
                };
                // Repeated entries in `after` collapse into one edge.
                if !nodes[i].deps.contains(&d) {
                    nodes[i].deps.push(d);
                    nodes[d].dependents.push(i);
                }
            }
        }

        // Edge direction: dep -> task.
        let mut graph: DiGraphMap<usize, ()> = DiGraphMap::new();
        for i in 0..tasks.len() {
            graph.add_node(i);
        }
        for (i, node) in nodes.iter().enumerate() {
            for &d in &node.deps {
                graph.add_edge(d, i, ());
            }
        }

        let topo_order = toposort(&graph, None).map_err(|cycle| ScenarioError::Cycle {
            task: tasks[cycle.node_id()].id.clone(),
        })?;

        let mut waves = vec![0usize; tasks.len()];
        for &i in &topo_order {
            waves[i] = nodes[i]
                .deps
                .iter()
                .map(|&d| waves[d] + 1)
                .max()
                .unwrap_or(0);
        }

        let mut sets = UnionFind::<usize>::new(tasks.len());
        for (i, node) in nodes.iter().enumerate() {
            for &d in &node.deps {
                sets.union(d, i);
            }
        }
        let mut dense: HashMap<usize, usize> = HashMap::new();
        let components: Vec<usize> = (0..tasks.len())
            .map(|i| {
                let next = dense.len();
                *dense.entry(sets.find(i)).or_insert(next)
            })
            .collect();

        Ok(Self {
            index,
            nodes,
            topo_order,
            waves,
            components,
            component_count: dense.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Position of a task id in the scenario, if known.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Immediate dependencies of a task.
    pub fn dependencies_of(&self, i: usize) -> &[usize] {
        self.nodes.get(i).map(|n| n.deps.as_slice()).unwrap_or(&[])
    }

    /// Immediate dependents of a task.
    pub fn dependents_of(&self, i: usize) -> &[usize] {
        self.nodes
            .get(i)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// Tasks with no dependencies.
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.nodes.len()).filter(|&i| self.nodes[i].deps.is_empty())
    }

    pub fn topological_order(&self) -> &[usize] {
        &self.topo_order
    }

    pub fn wave_of(&self, i: usize) -> usize {
        self.waves[i]
    }

    pub fn component_of(&self, i: usize) -> usize {
        self.components[i]
    }

    pub fn component_count(&self) -> usize {
        self.component_count
    }

    /// Number of waves each component goes through, indexed by component.
    pub fn waves_per_component(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.component_count];
        for (i, &c) in self.components.iter().enumerate() {
            counts[c] = counts[c].max(self.waves[i] + 1);
        }
        counts
    }
}
