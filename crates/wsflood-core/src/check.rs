//! Named checks
//!
//! A check is a named boolean assertion recorded for reporting. Failing a
//! check never halts the session or the run; the counters are aggregated
//! into the end-of-run report.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Pass/fail counters for one named check
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct CheckStats {
    pub passes: u64,
    pub fails: u64,
}

impl CheckStats {
    pub fn all_passed(&self) -> bool {
        self.fails == 0
    }
}

/// Shared registry of named checks, cloneable across session tasks
#[derive(Debug, Clone, Default)]
pub struct CheckSet {
    inner: Arc<Mutex<BTreeMap<String, CheckStats>>>,
}

impl CheckSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one outcome for `name`, returning the outcome for chaining
    pub fn record(&self, name: &str, pass: bool) -> bool {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let stats = map.entry(name.to_string()).or_default();
        if pass {
            stats.passes += 1;
        } else {
            stats.fails += 1;
        }
        pass
    }

    /// Snapshot of all counters, keyed by check name
    pub fn report(&self) -> BTreeMap<String, CheckStats> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// True when no recorded check has failed
    pub fn all_passed(&self) -> bool {
        self.report().values().all(CheckStats::all_passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accumulates() {
        let checks = CheckSet::new();
        assert!(checks.record("Connected successfully", true));
        assert!(!checks.record("Connected successfully", false));
        checks.record("Connected successfully", true);

        let report = checks.report();
        let stats = report.get("Connected successfully").unwrap();
        assert_eq!(stats.passes, 2);
        assert_eq!(stats.fails, 1);
    }

    #[test]
    fn test_all_passed() {
        let checks = CheckSet::new();
        assert!(checks.all_passed());

        checks.record("a", true);
        assert!(checks.all_passed());

        checks.record("b", false);
        assert!(!checks.all_passed());
    }

    #[test]
    fn test_shared_across_clones() {
        let checks = CheckSet::new();
        let other = checks.clone();
        other.record("shared", true);
        assert_eq!(checks.report().get("shared").unwrap().passes, 1);
    }
}
