//! Check tree data model shared by rubric and results documents.
//!
//! A check's `result` is tri-state: `true`, `false`, or `null` (pending).
//! An *absent* `result` field is distinct from a pending one: rubric
//! entries have no result until they are instantiated for a student, and
//! scoring treats absence in a results document as a structural error.

use serde::{Deserialize, Serialize};

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckResult {
    Pass,
    Fail,
    /// Present but not yet determined (`null` in the document).
    Pending,
}

impl CheckResult {
    pub fn label(self) -> &'static str {
        match self {
            CheckResult::Pass => "PASS",
            CheckResult::Fail => "FAIL",
            CheckResult::Pending => "PENDING",
        }
    }

    pub fn from_passed(passed: bool) -> Self {
        if passed { CheckResult::Pass } else { CheckResult::Fail }
    }
}

/// A single gradeable criterion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckNode {
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Handler specification string; absent means `manual`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
    /// Tri-state result; `None` means the field is absent entirely.
    #[serde(default, with = "result_field", skip_serializing_if = "Option::is_none")]
    pub result: Option<CheckResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_checks: Option<SecondaryChecks>,
}

/// Nested sub-checks granting partial credit when the parent check fails.
///
/// Both fields are structurally required for scoring; they are optional
/// here so a malformed document loads and fails with a pointed diagnostic
/// instead of a generic deserialization error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SecondaryChecks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<CheckNode>>,
}

impl Default for CheckNode {
    fn default() -> Self {
        Self {
            tag: String::new(),
            desc: String::new(),
            weight: default_weight(),
            handler: None,
            working_directory: None,
            result: None,
            notes: Vec::new(),
            secondary_checks: None,
        }
    }
}

impl CheckNode {
    /// Handler specification, defaulting to `manual` when absent.
    pub fn handler_spec(&self) -> &str {
        self.handler.as_deref().unwrap_or("manual")
    }

    /// Display name used in prompts and log lines.
    pub fn display_name(&self) -> String {
        let tag = if self.tag.is_empty() { "Check" } else { &self.tag };
        if self.desc.is_empty() {
            tag.to_string()
        } else {
            format!("{tag}: {}", self.desc)
        }
    }
}

fn default_weight() -> f64 {
    1.0
}

/// Serde representation of the tri-state `result` field: `true`/`false`
/// map to pass/fail, `null` to pending. Absence is handled by the field's
/// `default`/`skip_serializing_if` attributes.
mod result_field {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::CheckResult;

    pub fn serialize<S: Serializer>(
        value: &Option<CheckResult>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(CheckResult::Pass) => serializer.serialize_bool(true),
            Some(CheckResult::Fail) => serializer.serialize_bool(false),
            Some(CheckResult::Pending) | None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<CheckResult>, D::Error> {
        let value = Option::<bool>::deserialize(deserializer)?;
        Ok(Some(match value {
            Some(true) => CheckResult::Pass,
            Some(false) => CheckResult::Fail,
            None => CheckResult::Pending,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_result_differs_from_null_result() {
        let absent: CheckNode = serde_yaml::from_str("tag: P1").expect("parse");
        assert_eq!(absent.result, None);

        let pending: CheckNode = serde_yaml::from_str("tag: P1\nresult: null").expect("parse");
        assert_eq!(pending.result, Some(CheckResult::Pending));

        let passed: CheckNode = serde_yaml::from_str("tag: P1\nresult: true").expect("parse");
        assert_eq!(passed.result, Some(CheckResult::Pass));

        let failed: CheckNode = serde_yaml::from_str("tag: P1\nresult: false").expect("parse");
        assert_eq!(failed.result, Some(CheckResult::Fail));
    }

    #[test]
    fn result_round_trips_through_yaml() {
        let mut node = CheckNode {
            tag: "P1".to_string(),
            result: Some(CheckResult::Pending),
            ..CheckNode::default()
        };
        let text = serde_yaml::to_string(&node).expect("dump");
        assert!(text.contains("result: null"));

        node.result = Some(CheckResult::Pass);
        let text = serde_yaml::to_string(&node).expect("dump");
        assert!(text.contains("result: true"));

        node.result = None;
        let text = serde_yaml::to_string(&node).expect("dump");
        assert!(!text.contains("result"));
    }

    #[test]
    fn weight_defaults_to_one() {
        let node: CheckNode = serde_yaml::from_str("tag: P1").expect("parse");
        assert_eq!(node.weight, 1.0);
    }

    #[test]
    fn handler_defaults_to_manual() {
        let node = CheckNode::default();
        assert_eq!(node.handler_spec(), "manual");
    }

    #[test]
    fn secondary_checks_fields_load_independently() {
        let node: CheckNode = serde_yaml::from_str(
            "tag: P1\nresult: false\nsecondary_checks:\n  weight: 0.8",
        )
        .expect("parse");
        let secondary = node.secondary_checks.expect("secondary");
        assert_eq!(secondary.weight, Some(0.8));
        assert_eq!(secondary.checks, None);
    }

    #[test]
    fn display_name_joins_tag_and_desc() {
        let node: CheckNode =
            serde_yaml::from_str("tag: P1\ndesc: Checks something").expect("parse");
        assert_eq!(node.display_name(), "P1: Checks something");
        assert_eq!(CheckNode::default().display_name(), "Check");
    }
}
