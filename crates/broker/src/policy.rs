//! High-availability policy definitions.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Name under which the HA policy is registered with the broker.
pub const HA_POLICY_NAME: &str = "HA";

/// Resources the HA policy applies to: everything except names beginning with
/// `amq.` or with a 32-character lowercase hex identifier.
pub const HA_POLICY_PATTERN: &str = r"^(?!(amq\.|[a-f0-9]{32})).*";

/// Local equivalent of the lookahead in `HA_POLICY_PATTERN`.
static EXCLUDED_RESOURCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(amq\.|[a-f0-9]{32})").expect("Invalid regex pattern"));

/// Whether a resource named `name` is covered by `HA_POLICY_PATTERN`.
#[must_use]
pub fn policy_applies_to(name: &str) -> bool {
    !EXCLUDED_RESOURCE_REGEX.is_match(name)
}

/// Replication policy for broker resources.
///
/// On the wire this is `{"ha-mode":"exactly","ha-params":k}` or
/// `{"ha-mode":"all"}`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(into = "PolicyDefinition", try_from = "PolicyDefinition")]
pub enum HaPolicy {
    /// Mirror to exactly `k` nodes.
    Exactly(usize),

    /// Mirror to every node.
    All,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum HaMode {
    Exactly,
    All,
}

#[derive(Serialize, Deserialize)]
struct PolicyDefinition {
    #[serde(rename = "ha-mode")]
    mode: HaMode,

    #[serde(rename = "ha-params", default, skip_serializing_if = "Option::is_none")]
    params: Option<usize>,
}

impl From<HaPolicy> for PolicyDefinition {
    fn from(policy: HaPolicy) -> Self {
        match policy {
            HaPolicy::Exactly(k) => Self {
                mode: HaMode::Exactly,
                params: Some(k),
            },
            HaPolicy::All => Self {
                mode: HaMode::All,
                params: None,
            },
        }
    }
}

impl TryFrom<PolicyDefinition> for HaPolicy {
    type Error = String;

    fn try_from(definition: PolicyDefinition) -> Result<Self, Self::Error> {
        match (definition.mode, definition.params) {
            (HaMode::Exactly, Some(k)) if k > 0 => Ok(Self::Exactly(k)),
            (HaMode::Exactly, _) => Err("ha-mode exactly requires a positive ha-params".into()),
            (HaMode::All, None) => Ok(Self::All),
            (HaMode::All, Some(_)) => Err("ha-mode all takes no ha-params".into()),
        }
    }
}

/// A named policy as registered with the broker.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Policy {
    /// Policy name.
    pub name: String,

    /// Regular expression selecting the resources the policy applies to.
    pub pattern: String,

    /// Policy definition.
    pub definition: HaPolicy,
}

impl Policy {
    /// The fleet-wide HA policy with the given definition.
    #[must_use]
    pub fn ha(definition: HaPolicy) -> Self {
        Self {
            name: HA_POLICY_NAME.to_string(),
            pattern: HA_POLICY_PATTERN.to_string(),
            definition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_wire_format() {
        assert_eq!(
            serde_json::to_string(&HaPolicy::Exactly(3)).unwrap(),
            r#"{"ha-mode":"exactly","ha-params":3}"#
        );
        assert_eq!(
            serde_json::to_string(&HaPolicy::All).unwrap(),
            r#"{"ha-mode":"all"}"#
        );
    }

    #[test]
    fn test_rejects_inconsistent_definitions() {
        for json in [
            r#"{"ha-mode":"exactly"}"#,
            r#"{"ha-mode":"exactly","ha-params":0}"#,
            r#"{"ha-mode":"all","ha-params":2}"#,
            r#"{"ha-mode":"nodes"}"#,
        ] {
            assert!(serde_json::from_str::<HaPolicy>(json).is_err(), "{json}");
        }

        assert_eq!(
            serde_json::from_str::<HaPolicy>(r#"{"ha-mode":"exactly","ha-params":2}"#).unwrap(),
            HaPolicy::Exactly(2)
        );
    }

    #[test]
    fn test_exclusion_pattern() {
        assert!(policy_applies_to("nova"));
        assert!(policy_applies_to("notifications.info"));
        assert!(policy_applies_to("amq"));
        assert!(!policy_applies_to("amq.gen-1234"));
        assert!(!policy_applies_to("0123456789abcdef0123456789abcdef"));
        assert!(!policy_applies_to("0123456789abcdef0123456789abcdef_fanout"));
        // Uppercase hex is not an identifier in this scheme.
        assert!(policy_applies_to("0123456789ABCDEF0123456789ABCDEF"));
        assert!(policy_applies_to("0123456789abcdef"));
    }

    #[test]
    fn test_ha_policy_uses_named_constants() {
        let policy = Policy::ha(HaPolicy::All);

        assert_eq!(policy.name, "HA");
        assert_eq!(policy.pattern, HA_POLICY_PATTERN);
    }
}
