use std::collections::{BTreeSet, HashMap, HashSet};

use crate::error::ExecutorError;
use crate::executor::types::TaskLike;

/// Task dependency graph (DAG)
#[derive(Debug)]
pub struct TaskGraph<T: TaskLike> {
    /// Task nodes: task name -> Task
    nodes: HashMap<String, T>,

    /// Dependency edges: task name -> list of dependencies
    edges: HashMap<String, Vec<String>>,

    /// Declaration order, used as the tie-break when ordering
    insertion_order: Vec<String>,
}

impl<T: TaskLike> TaskGraph<T> {
    /// Construct and validate a task graph from its declarations.
    pub fn from_tasks(tasks: Vec<T>) -> Result<Self, ExecutorError> {
        let mut nodes = HashMap::new();
        let mut edges = HashMap::new();
        let mut insertion_order = Vec::new();

        for task in tasks {
            if nodes.contains_key(task.id()) {
                return Err(ExecutorError::DuplicateTask(task.id().to_string()));
            }

            let name = task.id().to_string();
            edges.insert(name.clone(), task.dependencies().to_vec());
            insertion_order.push(name.clone());
            nodes.insert(name, task);
        }

        let graph = Self {
            nodes,
            edges,
            insertion_order,
        };
        graph.validate()?;
        Ok(graph)
    }

    /// Validate dependency relationships
    pub fn validate(&self) -> Result<(), ExecutorError> {
        for name in &self.insertion_order {
            for dep in &self.edges[name] {
                if !self.nodes.contains_key(dep) {
                    return Err(ExecutorError::DependencyNotFound {
                        task: name.clone(),
                        missing_dep: dep.clone(),
                    });
                }
            }
        }

        if let Some(cycle) = self.detect_cycle(&self.insertion_order) {
            return Err(ExecutorError::CircularDependency(cycle));
        }

        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.nodes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Tasks in declaration order.
    pub fn tasks(&self) -> impl Iterator<Item = &T> {
        self.insertion_order.iter().filter_map(|n| self.nodes.get(n))
    }

    /// Every task reachable from `requested` through dependencies, requested
    /// tasks included. Fails on unknown names and on cycles.
    pub fn closure(&self, requested: &[String]) -> Result<HashSet<String>, ExecutorError> {
        if let Some(cycle) = self.detect_cycle(requested) {
            return Err(ExecutorError::CircularDependency(cycle));
        }

        let mut seen = HashSet::new();
        let mut stack: Vec<&str> = Vec::new();
        for name in requested {
            if !self.nodes.contains_key(name) {
                return Err(ExecutorError::UnknownTask(name.clone()));
            }
            stack.push(name);
        }

        while let Some(name) = stack.pop() {
            if !seen.insert(name.to_string()) {
                continue;
            }
            let Some(deps) = self.edges.get(name) else {
                continue;
            };
            for dep in deps {
                if !self.nodes.contains_key(dep) {
                    return Err(ExecutorError::DependencyNotFound {
                        task: name.to_string(),
                        missing_dep: dep.clone(),
                    });
                }
                stack.push(dep);
            }
        }

        Ok(seen)
    }

    /// Topologically order `subset`, dependencies first.
    ///
    /// Among tasks with no ordering constraint the earliest declared runs first.
    pub fn order(&self, subset: &HashSet<String>) -> Result<Vec<String>, ExecutorError> {
        let index: HashMap<&str, usize> = self
            .insertion_order
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i))
            .collect();

        let mut in_degree: HashMap<&str, usize> = HashMap::new();
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
        for name in subset {
            let deps: Vec<&String> = self
                .edges
                .get(name)
                .map(|d| d.iter().filter(|d| subset.contains(*d)).collect())
                .unwrap_or_default();
            in_degree.insert(name.as_str(), deps.len());
            for dep in deps {
                dependents.entry(dep.as_str()).or_default().push(name.as_str());
            }
        }

        let mut ready: BTreeSet<(usize, &str)> = in_degree
            .iter()
            .filter(|(_, &degree)| degree == 0)
            .map(|(&name, _)| (index.get(name).copied().unwrap_or(usize::MAX), name))
            .collect();

        let mut ordered = Vec::with_capacity(subset.len());
        while let Some(next) = ready.pop_first() {
            let (_, name) = next;
            ordered.push(name.to_string());
            for &dependent in dependents.get(name).map(Vec::as_slice).unwrap_or_default() {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert((index.get(dependent).copied().unwrap_or(usize::MAX), dependent));
                    }
                }
            }
        }

        if ordered.len() != subset.len() {
            return Err(ExecutorError::CircularDependency(
                "Unable to complete topological sort (cycle detected)".to_string(),
            ));
        }

        Ok(ordered)
    }

    /// Detect circular dependencies reachable from `roots` using DFS
    fn detect_cycle(&self, roots: &[String]) -> Option<String> {
        let mut visited = HashSet::new();
        let mut stack = Vec::new();

        for name in roots {
            if !visited.contains(name) && self.dfs_cycle(name, &mut visited, &mut stack) {
                return Some(format_cycle_path(&stack));
            }
        }

        None
    }

    fn dfs_cycle(
        &self,
        node: &str,
        visited: &mut HashSet<String>,
        stack: &mut Vec<String>,
    ) -> bool {
        visited.insert(node.to_string());
        stack.push(node.to_string());

        if let Some(dependencies) = self.edges.get(node) {
            for dep in dependencies {
                if let Some(pos) = stack.iter().position(|x| x == dep) {
                    stack.push(dep.clone());
                    *stack = stack[pos..].to_vec();
                    return true;
                }

                if !visited.contains(dep) && self.dfs_cycle(dep, visited, stack) {
                    return true;
                }
            }
        }

        stack.pop();
        false
    }
}

fn format_cycle_path(stack: &[String]) -> String {
    stack.join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug)]
    struct Node {
        id: String,
        deps: Vec<String>,
    }

    impl TaskLike for Node {
        fn id(&self) -> &str {
            &self.id
        }

        fn dependencies(&self) -> &[String] {
            &self.deps
        }
    }

    fn node(id: &str, deps: &[&str]) -> Node {
        Node {
            id: id.to_string(),
            deps: deps.iter().map(|d| d.to_string()).collect(),
        }
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_chain_orders_dependencies_first() {
        let graph =
            TaskGraph::from_tasks(vec![node("a", &["b"]), node("b", &["c"]), node("c", &[])])
                .unwrap();
        let closure = graph.closure(&names(&["a"])).unwrap();
        assert_eq!(graph.order(&closure).unwrap(), names(&["c", "b", "a"]));
    }

    #[test]
    fn test_closure_excludes_unrelated_tasks() {
        let graph = TaskGraph::from_tasks(vec![
            node("a", &["b"]),
            node("b", &[]),
            node("x", &[]),
        ])
        .unwrap();
        let closure = graph.closure(&names(&["a"])).unwrap();
        assert!(!closure.contains("x"));
        assert_eq!(closure.len(), 2);
    }

    #[test]
    fn test_unconstrained_tasks_keep_declaration_order() {
        let graph = TaskGraph::from_tasks(vec![
            node("setup", &["z", "y", "x"]),
            node("x", &[]),
            node("y", &[]),
            node("z", &[]),
        ])
        .unwrap();
        let closure = graph.closure(&names(&["setup"])).unwrap();
        assert_eq!(
            graph.order(&closure).unwrap(),
            names(&["x", "y", "z", "setup"])
        );
    }

    #[test]
    fn test_diamond_runs_shared_dependency_once() {
        let graph = TaskGraph::from_tasks(vec![
            node("top", &["left", "right"]),
            node("left", &["base"]),
            node("right", &["base"]),
            node("base", &[]),
        ])
        .unwrap();
        let closure = graph.closure(&names(&["top"])).unwrap();
        assert_eq!(
            graph.order(&closure).unwrap(),
            names(&["base", "left", "right", "top"])
        );
    }

    #[test]
    fn test_cycle_rejected_at_construction() {
        let err = TaskGraph::from_tasks(vec![node("a", &["b"]), node("b", &["a"])]).unwrap_err();
        match err {
            ExecutorError::CircularDependency(path) => assert_eq!(path, "a -> b -> a"),
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_and_missing_dependency() {
        let err = TaskGraph::from_tasks(vec![node("a", &[]), node("a", &[])]).unwrap_err();
        assert!(matches!(err, ExecutorError::DuplicateTask(_)));

        let err = TaskGraph::from_tasks(vec![node("a", &["ghost"])]).unwrap_err();
        assert!(matches!(
            err,
            ExecutorError::DependencyNotFound { ref missing_dep, .. } if missing_dep == "ghost"
        ));
    }

    #[test]
    fn test_unknown_requested_task() {
        let graph = TaskGraph::from_tasks(vec![node("a", &[])]).unwrap();
        let err = graph.closure(&names(&["nope"])).unwrap_err();
        assert!(matches!(err, ExecutorError::UnknownTask(_)));
    }
}
