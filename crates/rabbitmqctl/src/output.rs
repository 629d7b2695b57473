//! Parsing of admin tool output.

use std::sync::LazyLock;

use regex::Regex;
use warren_broker::ClusterView;

use crate::Error;

/// Plugin names as printed by `rabbitmq-plugins list -m`.
static PLUGIN_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("Invalid regex pattern"));

/// Parse `cluster_status --formatter json` output.
pub fn parse_cluster_status(stdout: &[u8]) -> Result<ClusterView, Error> {
    serde_json::from_slice(stdout).map_err(Error::OutputParse)
}

/// Parse `rabbitmq-plugins list -m -e` output, skipping banner lines.
pub fn parse_enabled_plugins(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| PLUGIN_NAME_REGEX.is_match(line))
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_parse_cluster_status() {
        let view = parse_cluster_status(
            br#"{"running_nodes":["rabbit@head-1","rabbit@head-2"],"partitions":[]}"#,
        )
        .unwrap();

        assert_eq!(view.len(), 2);
    }

    #[test]
    fn test_parse_cluster_status_rejects_text_output() {
        assert_matches!(
            parse_cluster_status(b"Cluster status of node rabbit@head-1 ..."),
            Err(Error::OutputParse(_))
        );
        assert_matches!(parse_cluster_status(b""), Err(Error::OutputParse(_)));
    }

    #[test]
    fn test_parse_enabled_plugins() {
        let stdout = "Listing plugins with pattern \".*\" ...\n\
                      rabbitmq_management\n\
                      rabbitmq_management_agent\n\
                      \n\
                      rabbitmq_web_dispatch\n";

        assert_eq!(
            parse_enabled_plugins(stdout),
            vec![
                "rabbitmq_management",
                "rabbitmq_management_agent",
                "rabbitmq_web_dispatch"
            ]
        );
        assert!(parse_enabled_plugins("").is_empty());
    }
}
