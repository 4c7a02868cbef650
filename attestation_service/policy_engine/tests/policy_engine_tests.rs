use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use serde_json::{json, Value};

use config_manager::OpaServerConfig;
use policy_engine::{evaluate_rule, PolicyEngineConnector, PolicyEngineError, RegoEngineConnector, ALLOW_RULE};

fn read_test_policy(filename: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/data/policies");
    path.push(filename);
    fs::read_to_string(path).expect("Failed to read policy file")
}

fn read_test_input(filename: &str) -> Value {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/data/inputs");
    path.push(filename);
    let content = fs::read_to_string(path).expect("Failed to read input file");
    serde_json::from_str(&content).expect("Failed to parse input JSON")
}

#[test]
fn test_evaluate_rule_allow() {
    let input = read_test_input("boot_log.json");
    let policy = read_test_policy("mb_policy.rego");

    let result = evaluate_rule(&input, &policy, ALLOW_RULE).unwrap();
    assert_eq!(result, Value::Bool(true));
}

#[test]
fn test_evaluate_rule_unknown_kernel() {
    let input = read_test_input("boot_log_unknown_kernel.json");
    let policy = read_test_policy("mb_policy.rego");

    let result = evaluate_rule(&input, &policy, ALLOW_RULE).unwrap();
    assert_eq!(result, Value::Bool(false));
}

#[test]
fn test_evaluate_rule_null_input_uses_default() {
    let policy = read_test_policy("mb_policy.rego");

    let result = evaluate_rule(&Value::Null, &policy, ALLOW_RULE).unwrap();
    assert_eq!(result, Value::Bool(false));
}

#[test]
fn test_evaluate_rule_non_boolean_result() {
    let input = read_test_input("boot_log.json");
    let policy = read_test_policy("mb_policy.rego");

    let result = evaluate_rule(&input, &policy, "kernels").unwrap();
    let kernels = result.as_array().expect("kernels should be a set");
    assert_eq!(kernels.len(), 1);
}

#[test]
fn test_evaluate_rule_undefined_is_null() {
    let policy = "package probe\n\nallow {\n    input.ready == true\n}\n";

    let result = evaluate_rule(&json!({"ready": false}), policy, ALLOW_RULE).unwrap();
    assert_eq!(result, Value::Null);
}

#[test]
fn test_evaluate_rule_compilation_error() {
    let input = read_test_input("boot_log.json");
    let policy = read_test_policy("not_compilable_policy.rego");

    match evaluate_rule(&input, &policy, ALLOW_RULE) {
        Err(PolicyEngineError::PolicyParseError(_)) => (),
        other => panic!("Expected PolicyParseError, got: {:?}", other),
    }
}

#[test]
fn test_evaluate_rule_size_limit() {
    let input = read_test_input("boot_log.json");
    let policy = read_test_policy("large_output_policy.rego");

    match evaluate_rule(&input, &policy, "blob") {
        Err(PolicyEngineError::OutputSizeLimitError(size, limit)) => assert!(size > limit),
        other => panic!("Expected OutputSizeLimitError, got: {:?}", other),
    }
}

#[test]
fn test_evaluate_rule_thread_safety() {
    let input = Arc::new(read_test_input("boot_log.json"));
    let policy = Arc::new(read_test_policy("mb_policy.rego"));

    let mut handles = vec![];
    for _ in 0..10 {
        let input = Arc::clone(&input);
        let policy = Arc::clone(&policy);
        handles.push(thread::spawn(move || {
            let result = evaluate_rule(&input, &policy, ALLOW_RULE).unwrap();
            assert_eq!(result, Value::Bool(true));
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

#[tokio::test]
async fn test_uploaded_policy_survives_session() {
    let connector = RegoEngineConnector::new();
    let config = OpaServerConfig::default();
    let policy = read_test_policy("mb_policy.rego");

    let first = connector.connect(&config).unwrap();
    first.check_connection().await.unwrap();
    first.upload_policy(&policy, "policy_agent_1").await.unwrap();
    first.close();

    assert_eq!(connector.policy_count(), 1);
    let second = connector.connect(&config).unwrap();
    let result = second.evaluate(&read_test_input("boot_log.json"), "policy_agent_1", ALLOW_RULE).await.unwrap();
    assert_eq!(result, Value::Bool(true));
}

#[tokio::test]
async fn test_upload_rejects_uncompilable_policy() {
    let connector = RegoEngineConnector::new();
    let client = connector.connect(&OpaServerConfig::default()).unwrap();

    let result = client.upload_policy(&read_test_policy("not_compilable_policy.rego"), "policy_broken").await;
    assert!(matches!(result, Err(PolicyEngineError::PolicyParseError(_))));
    assert!(connector.registered("policy_broken").is_none());
}

#[tokio::test]
async fn test_evaluate_unregistered_policy() {
    let connector = RegoEngineConnector::new();
    let client = connector.connect(&OpaServerConfig::default()).unwrap();

    let result = client.evaluate(&json!({}), "policy_missing", ALLOW_RULE).await;
    assert!(matches!(result, Err(PolicyEngineError::EvaluationError(_))));
}

#[tokio::test]
async fn test_evaluate_follows_registered_package() {
    let connector = RegoEngineConnector::new();
    let client = connector.connect(&OpaServerConfig::default()).unwrap();
    let policy = read_test_policy("mb_policy.rego").replacen("package keylime.mb", "package policy_agent_2", 1);

    client.upload_policy(&policy, "policy_agent_2").await.unwrap();
    let result = client.evaluate(&read_test_input("boot_log.json"), "policy_agent_2", ALLOW_RULE).await.unwrap();
    assert_eq!(result, Value::Bool(true));
}

#[tokio::test]
async fn test_unreachable_engine() {
    let connector = RegoEngineConnector::new();
    let client = connector.connect(&OpaServerConfig::default()).unwrap();

    connector.set_reachable(false);
    assert!(matches!(client.check_connection().await, Err(PolicyEngineError::ConnectionError(_))));
    connector.set_reachable(true);
    assert!(client.check_connection().await.is_ok());
}
