// ── Reconciliation outcome ──

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured outcome handed back to the calling automation.
///
/// `result` is tri-state: `Some(true)` the desired state is in place,
/// `Some(false)` nothing was (or could be) applied, `None` the change would
/// be applied but the call ran in dry-run mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileResult {
    pub name: String,
    /// Always empty: no diff is computed.
    #[serde(default)]
    pub changes: BTreeMap<String, Value>,
    pub result: Option<bool>,
    pub comment: String,
}

impl ReconcileResult {
    fn new(name: &str, result: Option<bool>, comment: String) -> Self {
        Self {
            name: name.to_owned(),
            changes: BTreeMap::new(),
            result,
            comment,
        }
    }

    pub fn applied(name: &str, comment: impl Into<String>) -> Self {
        Self::new(name, Some(true), comment.into())
    }

    pub fn pending(name: &str, comment: impl Into<String>) -> Self {
        Self::new(name, None, comment.into())
    }

    pub fn failed(name: &str, comment: impl Into<String>) -> Self {
        Self::new(name, Some(false), comment.into())
    }

    /// `false` only for the explicit failure state.
    pub fn is_success(&self) -> bool {
        self.result != Some(false)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dry_run_result_serializes_null() {
        let r = ReconcileResult::pending("net", "Virtual network with name net will be created");
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            json!({
                "name": "net",
                "changes": {},
                "result": null,
                "comment": "Virtual network with name net will be created",
            })
        );
        assert!(r.is_success());
    }

    #[test]
    fn failure_is_not_success() {
        assert!(!ReconcileResult::failed("net", "boom").is_success());
        assert!(ReconcileResult::applied("net", "ok").is_success());
    }
}
