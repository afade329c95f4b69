//! Reconciler Service
//!
//! Pure domain logic for planning the calls that bring a remote binding
//! set in line with a declared one. This service has NO external
//! dependencies - it's pure Rust.

use crate::domain::entities::BackendBinding;
use std::collections::HashSet;

/// Planned membership changes for one update pass.
///
/// `add` and `remove` are sorted by (server id, port, weight) so the
/// resulting API payloads are deterministic.
#[derive(Debug, Clone, Default)]
pub struct BindingDiff {
    /// Bindings declared but not observed remotely
    pub add: Vec<BackendBinding>,
    /// Bindings observed remotely but no longer declared
    pub remove: Vec<BackendBinding>,
}

impl BindingDiff {
    /// True when the remote set already matches the declared one.
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

/// Set-difference planner for vserver group membership.
pub struct Reconciler;

impl Reconciler {
    /// Plan the changes needed to move `observed` to `desired`.
    ///
    /// Membership is decided by binding fingerprints, so server id casing
    /// does not cause spurious churn. The invariant: applying `add` and
    /// `remove` to `observed` yields exactly `desired`, with no binding
    /// touched that appears in both sets.
    pub fn plan(observed: &HashSet<BackendBinding>, desired: &HashSet<BackendBinding>) -> BindingDiff {
        let mut add: Vec<BackendBinding> = desired.difference(observed).cloned().collect();
        let mut remove: Vec<BackendBinding> = observed.difference(desired).cloned().collect();
        sort_bindings(&mut add);
        sort_bindings(&mut remove);
        BindingDiff { add, remove }
    }
}

fn sort_bindings(bindings: &mut [BackendBinding]) {
    bindings.sort_by(|a, b| {
        (a.server_id.to_lowercase(), a.port, a.weight)
            .cmp(&(b.server_id.to_lowercase(), b.port, b.weight))
    });
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn binding(server_id: &str, port: u16, weight: u32) -> BackendBinding {
        BackendBinding::new(server_id, port, weight).unwrap()
    }

    fn set(bindings: &[BackendBinding]) -> HashSet<BackendBinding> {
        bindings.iter().cloned().collect()
    }

    #[test]
    fn test_plan_empty_sets() {
        let diff = Reconciler::plan(&HashSet::new(), &HashSet::new());
        assert!(diff.is_empty());
    }

    #[test]
    fn test_plan_identical_sets_is_empty() {
        let bindings = set(&[binding("i-1", 80, 50), binding("i-2", 8080, 100)]);
        let diff = Reconciler::plan(&bindings, &bindings.clone());
        assert!(diff.is_empty());
    }

    #[test]
    fn test_plan_pure_addition() {
        let observed = set(&[binding("i-1", 80, 50)]);
        let desired = set(&[binding("i-1", 80, 50), binding("i-2", 8080, 100)]);

        let diff = Reconciler::plan(&observed, &desired);
        assert_eq!(diff.add, vec![binding("i-2", 8080, 100)]);
        assert!(diff.remove.is_empty());
    }

    #[test]
    fn test_plan_pure_removal() {
        let observed = set(&[binding("i-1", 80, 50), binding("i-2", 8080, 100)]);
        let desired = set(&[binding("i-2", 8080, 100)]);

        let diff = Reconciler::plan(&observed, &desired);
        assert!(diff.add.is_empty());
        assert_eq!(diff.remove, vec![binding("i-1", 80, 50)]);
    }

    #[test]
    fn test_plan_weight_change_is_add_plus_remove() {
        // Weight is part of binding identity, so reweighting a server
        // shows up as one add and one remove.
        let observed = set(&[binding("i-1", 80, 50)]);
        let desired = set(&[binding("i-1", 80, 90)]);

        let diff = Reconciler::plan(&observed, &desired);
        assert_eq!(diff.add, vec![binding("i-1", 80, 90)]);
        assert_eq!(diff.remove, vec![binding("i-1", 80, 50)]);
    }

    #[test]
    fn test_plan_ignores_server_id_case() {
        let observed = set(&[binding("I-1", 80, 50)]);
        let desired = set(&[binding("i-1", 80, 50)]);

        let diff = Reconciler::plan(&observed, &desired);
        assert!(diff.is_empty());
    }

    #[test]
    fn test_plan_output_sorted() {
        let observed = HashSet::new();
        let desired = set(&[
            binding("i-9", 80, 50),
            binding("i-1", 8080, 100),
            binding("i-1", 80, 50),
        ]);

        let diff = Reconciler::plan(&observed, &desired);
        assert_eq!(
            diff.add,
            vec![
                binding("i-1", 80, 50),
                binding("i-1", 8080, 100),
                binding("i-9", 80, 50),
            ]
        );
    }

    #[test]
    fn test_plan_applying_diff_reaches_desired() {
        let observed = set(&[binding("i-1", 80, 50), binding("i-2", 443, 10)]);
        let desired = set(&[binding("i-2", 443, 10), binding("i-3", 8080, 100)]);

        let diff = Reconciler::plan(&observed, &desired);

        let mut result = observed.clone();
        for b in &diff.add {
            result.insert(b.clone());
        }
        for b in &diff.remove {
            result.remove(b);
        }
        assert_eq!(result, desired);
    }
}
