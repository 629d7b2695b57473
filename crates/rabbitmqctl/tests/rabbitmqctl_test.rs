use std::path::PathBuf;
use std::time::Duration;

use assert_matches::assert_matches;
use tracing_test::traced_test;
use warren_broker::{
    BrokerAdmin, BrokerAdminError, BrokerAdminErrorKind, HaPolicy, NodeNaming, Policy,
    QualifiedIdentity,
};
use warren_fleet::PeerIdentity;
use warren_rabbitmqctl::{Error, RabbitmqCtl, RabbitmqCtlOptions};

fn ctl_running(program: &str) -> RabbitmqCtl {
    let path = which::which(program).unwrap();

    RabbitmqCtl::new(RabbitmqCtlOptions {
        command_timeout: Duration::from_secs(5),
        ctl_path: Some(path.clone()),
        plugins_path: Some(path),
    })
    .unwrap()
}

fn missing_ctl() -> RabbitmqCtl {
    let path = PathBuf::from("/nonexistent/warren/rabbitmqctl");

    RabbitmqCtl::new(RabbitmqCtlOptions {
        command_timeout: Duration::from_secs(5),
        ctl_path: Some(path.clone()),
        plugins_path: Some(path),
    })
    .unwrap()
}

fn node(hostname: &str) -> QualifiedIdentity {
    NodeNaming::default()
        .qualify(&PeerIdentity::from(hostname))
        .unwrap()
}

#[tokio::test]
async fn test_health_check_reflects_exit_status() {
    assert!(
        ctl_running("true")
            .node_health_check(&node("head-1"))
            .await
            .unwrap()
    );
    assert!(
        !ctl_running("false")
            .node_health_check(&node("head-1"))
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_health_check_errors_when_tool_cannot_run() {
    let result = missing_ctl().node_health_check(&node("head-1")).await;

    assert_matches!(result, Err(Error::Spawn { .. }));
    assert_eq!(result.unwrap_err().kind(), BrokerAdminErrorKind::Unavailable);
}

#[tokio::test]
async fn test_failed_command_is_command_failed() {
    let error = ctl_running("false").stop_app().await.unwrap_err();

    assert_matches!(error, Error::NonZeroExitCode { ref command, .. } if command == "stop_app");
    assert_eq!(error.kind(), BrokerAdminErrorKind::CommandFailed);
}

#[tokio::test]
async fn test_successful_join_sequence() {
    let ctl = ctl_running("true");

    ctl.stop_app().await.unwrap();
    ctl.reset().await.unwrap();
    ctl.join_cluster(&node("head-1")).await.unwrap();
    ctl.start_app().await.unwrap();
    ctl.list_users().await.unwrap();
}

#[tokio::test]
async fn test_empty_cluster_status_is_an_output_error() {
    let error = ctl_running("true")
        .cluster_status(&node("head-1"))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), BrokerAdminErrorKind::Output);
}

#[traced_test]
#[tokio::test]
async fn test_change_password_never_logs_password() {
    ctl_running("true")
        .change_password("guest", "s3cr3t-passw0rd")
        .await
        .unwrap();

    assert!(logs_contain("password set for user guest"));
    assert!(!logs_contain("s3cr3t-passw0rd"));
}

#[traced_test]
#[tokio::test]
async fn test_set_policy_logs_definition() {
    ctl_running("true")
        .set_policy(&Policy::ha(HaPolicy::Exactly(2)))
        .await
        .unwrap();

    assert!(logs_contain(r#"policy HA set to {"ha-mode":"exactly","ha-params":2}"#));
}

#[tokio::test]
async fn test_plugins() {
    let ctl = ctl_running("true");

    assert!(ctl.list_enabled_plugins().await.unwrap().is_empty());
    ctl.enable_plugin("rabbitmq_management").await.unwrap();
}

#[test]
fn test_missing_binary_on_path() {
    let result = RabbitmqCtl::new(RabbitmqCtlOptions {
        ctl_path: Some(PathBuf::from("/usr/sbin/rabbitmqctl")),
        plugins_path: None,
        ..RabbitmqCtlOptions::default()
    });

    if which::which("rabbitmq-plugins").is_err() {
        assert_matches!(result, Err(Error::BinaryNotFound("rabbitmq-plugins")));
    }
}
