//! # Jenkins Client Unit Tests
//!
//! Tests for the script verification protocol and the groovy rendering
//! helpers.
//!
//! The script console answers HTTP 200 even when the submitted script throws,
//! so completion is proven by a verifier token the client appends to every
//! script. These tests pin down that protocol.

use jenkins_operator::client::{
    script_output_verified, strip_verification_token, verification_token, JenkinsClient,
    JenkinsClientError,
};
use jenkins_operator::configuration::user::groovy::{
    configuration_as_code_script, quote, quote_or_null,
};
use std::time::Duration;

#[test]
fn test_verification_token_is_content_derived() {
    let token = verification_token("println 'hello'");
    assert_eq!(token, verification_token("println 'hello'"));
    assert_ne!(token, verification_token("println 'other'"));
    assert!(token.starts_with("jenkins-operator-verify-"));
}

#[test]
fn test_output_verified_when_token_is_last_line() {
    let token = verification_token("script");
    let output = format!("some output\n{token}\n");
    assert!(script_output_verified(&output, &token));
}

#[test]
fn test_output_not_verified_when_script_aborted() {
    // An exception stack trace replaces the trailing verifier line
    let token = verification_token("script");
    let output = "groovy.lang.MissingPropertyException: No such property: foo\n\tat ...";
    assert!(!script_output_verified(output, &token));
}

#[test]
fn test_output_not_verified_when_token_mid_output() {
    let token = verification_token("script");
    let output = format!("{token}\nexception after the marker printed");
    assert!(!script_output_verified(&output, &token));
}

#[test]
fn test_strip_verification_token() {
    let token = verification_token("script");
    let output = format!("line one\nline two\n{token}\n");
    assert_eq!(strip_verification_token(&output, &token), "line one\nline two");
}

#[test]
fn test_strip_verification_token_empty_output() {
    let token = verification_token("script");
    let output = format!("{token}\n");
    assert_eq!(strip_verification_token(&output, &token), "");
}

#[test]
fn test_quote_plain_string() {
    assert_eq!(quote("hello"), "'hello'");
}

#[test]
fn test_quote_escapes_special_characters() {
    assert_eq!(quote("it's"), r"'it\'s'");
    assert_eq!(quote(r"back\slash"), r"'back\\slash'");
    assert_eq!(quote("line1\nline2"), r"'line1\nline2'");
    assert_eq!(quote("cr\rlf"), r"'cr\rlf'");
}

#[test]
fn test_quote_does_not_interpolate() {
    // Single-quoted groovy strings pass ${...} through literally
    assert_eq!(quote("${ADMIN}"), "'${ADMIN}'");
}

#[test]
fn test_quote_or_null() {
    assert_eq!(quote_or_null(Some("value")), "'value'");
    assert_eq!(quote_or_null(None), "null");
}

/// A local port nothing listens on; connections are refused immediately
fn unreachable_client() -> JenkinsClient {
    JenkinsClient::new("http://127.0.0.1:59999", "jenkins-operator", "token").unwrap()
}

#[tokio::test]
async fn test_wait_until_ready_times_out_against_unreachable_instance() {
    let client = unreachable_client();
    let result = client
        .wait_until_ready(Duration::from_millis(10), Duration::ZERO)
        .await;
    assert!(matches!(result, Err(JenkinsClientError::WaitTimedOut(_))));
}

#[tokio::test]
async fn test_wait_for_restart_completion_times_out() {
    let client = unreachable_client();
    let result = client.wait_for_restart_completion(Duration::ZERO).await;
    assert!(matches!(result, Err(JenkinsClientError::WaitTimedOut(_))));
}

#[tokio::test]
async fn test_is_ready_false_when_unreachable() {
    let client = unreachable_client();
    assert!(matches!(client.is_ready().await, Ok(false)));
}

#[tokio::test]
async fn test_safe_restart_unreachable_is_a_transport_error() {
    let client = unreachable_client();
    let result = client.safe_restart().await;
    assert!(matches!(result, Err(JenkinsClientError::Unreachable(_))));
}

#[test]
fn test_configuration_as_code_script_embeds_document() {
    let script = configuration_as_code_script("jenkins:\n  systemMessage: managed");
    assert!(script.contains("import io.jenkins.plugins.casc.ConfigurationAsCode"));
    assert!(script.contains(r"'jenkins:\n  systemMessage: managed'"));
    assert!(script.contains("ConfigurationAsCode.get().configure("));
    // Document lands in the Jenkins home, not an arbitrary path
    assert!(script.contains("Jenkins.get().getRootDir()"));
}
