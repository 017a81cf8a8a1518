//! "resource A references resource B" graph
//!
//! Edges are recorded while resolving; the graph itself may contain cycles; [DependencyTracker::topological_sort]
//! reports them.
//!
//! Only `Ref` and `Fn::GetAtt` create edges. A `${Resource}` inside `Fn::Sub` or an explicit `DependsOn` does not.
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DependencyError {
    #[error("Circular dependency detected at resource '{resource}'")]
    Cycle { resource: String },
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DependencyTracker {
    /// source -> targets
    dependencies: BTreeMap<String, BTreeSet<String>>,
    /// target -> sources
    dependents: BTreeMap<String, BTreeSet<String>>,
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    InProgress,
    Done,
}

impl DependencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// `source` references `target`
    pub fn add_dependency(&mut self, source: impl Into<String>, target: impl Into<String>) {
        let (source, target) = (source.into(), target.into());
        tracing::trace!(%source, %target, "dependency");

        self.dependents
            .entry(target.clone())
            .or_default()
            .insert(source.clone());
        self.dependencies.entry(source).or_default().insert(target);
    }

    /// Resources `source` references, sorted
    pub fn dependencies_of(&self, source: &str) -> Vec<&str> {
        self.dependencies
            .get(source)
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect()
    }

    /// Resources referencing `target`, sorted
    pub fn dependents_of(&self, target: &str) -> Vec<&str> {
        self.dependents
            .get(target)
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect()
    }

    pub fn has_dependency(&self, source: &str, target: &str) -> bool {
        self.dependencies
            .get(source)
            .is_some_and(|targets| targets.contains(target))
    }

    /// Every resource on either end of an edge, sorted
    pub fn resources(&self) -> Vec<&str> {
        self.dependencies
            .keys()
            .chain(self.dependents.keys())
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of edges
    pub fn len(&self) -> usize {
        self.dependencies.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    pub fn merge(&mut self, other: &DependencyTracker) {
        for (source, targets) in &other.dependencies {
            for target in targets {
                self.add_dependency(source.as_str(), target.as_str());
            }
        }
    }

    pub fn clear(&mut self) {
        self.dependencies.clear();
        self.dependents.clear();
    }

    /// Order `resources` so that every resource comes after the resources it depends on
    ///
    /// Edges leaving the given set are ignored. Ties are broken lexically.
    pub fn topological_sort<S: AsRef<str>>(
        &self,
        resources: &[S],
    ) -> Result<Vec<String>, DependencyError> {
        let resources: BTreeSet<&str> = resources.iter().map(AsRef::as_ref).collect();

        let mut marks = HashMap::with_capacity(resources.len());
        let mut order = Vec::with_capacity(resources.len());
        for resource in &resources {
            self.visit(resource, &resources, &mut marks, &mut order)?;
        }

        Ok(order)
    }

    fn visit<'a>(
        &'a self,
        resource: &'a str,
        resources: &BTreeSet<&'a str>,
        marks: &mut HashMap<&'a str, Mark>,
        order: &mut Vec<String>,
    ) -> Result<(), DependencyError> {
        match marks.get(resource) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                return Err(DependencyError::Cycle {
                    resource: resource.to_string(),
                })
            }
            None => {}
        }

        marks.insert(resource, Mark::InProgress);
        for dependency in self.dependencies_of(resource) {
            if resources.contains(dependency) {
                self.visit(dependency, resources, marks, order)?;
            }
        }
        marks.insert(resource, Mark::Done);
        order.push(resource.to_string());

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sorts_dependencies_first() {
        let mut tracker = DependencyTracker::new();
        tracker.add_dependency("C", "B");
        tracker.add_dependency("B", "A");

        assert_eq!(
            tracker.topological_sort(&["C", "A", "B"]),
            Ok(vec!["A".to_string(), "B".to_string(), "C".to_string()])
        );
    }

    #[test]
    fn independent_resources_are_sorted_lexically() {
        let mut tracker = DependencyTracker::new();
        tracker.add_dependency("Api", "Role");

        assert_eq!(
            tracker.topological_sort(&["Zeta", "Api", "Role", "Bucket"]),
            Ok(vec![
                "Role".to_string(),
                "Api".to_string(),
                "Bucket".to_string(),
                "Zeta".to_string()
            ])
        );
    }

    #[test]
    fn detects_cycles() {
        let mut tracker = DependencyTracker::new();
        tracker.add_dependency("A", "B");
        tracker.add_dependency("B", "C");
        tracker.add_dependency("C", "A");

        assert_eq!(
            tracker.topological_sort(&["A", "B", "C"]),
            Err(DependencyError::Cycle {
                resource: "A".to_string()
            })
        );
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let mut tracker = DependencyTracker::new();
        tracker.add_dependency("A", "A");
        assert!(tracker.topological_sort(&["A"]).is_err());
    }

    #[test]
    fn edges_outside_the_set_are_ignored() {
        let mut tracker = DependencyTracker::new();
        tracker.add_dependency("A", "External");
        tracker.add_dependency("External", "A");

        assert_eq!(tracker.topological_sort(&["A"]), Ok(vec!["A".to_string()]));
    }

    #[test]
    fn queries() {
        let mut tracker = DependencyTracker::new();
        tracker.add_dependency("Fn", "Table");
        tracker.add_dependency("Fn", "Role");
        tracker.add_dependency("Api", "Fn");
        tracker.add_dependency("Api", "Fn");

        assert_eq!(tracker.dependencies_of("Fn"), ["Role", "Table"]);
        assert_eq!(tracker.dependents_of("Fn"), ["Api"]);
        assert!(tracker.has_dependency("Api", "Fn"));
        assert!(!tracker.has_dependency("Fn", "Api"));
        assert_eq!(tracker.resources(), ["Api", "Fn", "Role", "Table"]);
        assert_eq!(tracker.len(), 3);
    }

    #[test]
    fn merge_and_clear() {
        let mut tracker = DependencyTracker::new();
        tracker.add_dependency("A", "B");

        let mut other = DependencyTracker::new();
        other.add_dependency("B", "C");
        tracker.merge(&other);

        assert_eq!(tracker.dependencies_of("B"), ["C"]);
        assert_eq!(tracker.dependents_of("C"), ["B"]);

        tracker.clear();
        assert!(tracker.is_empty());
        assert!(tracker.resources().is_empty());
    }
}
