/*
 * Copyright (c) Huawei Technologies Co., Ltd. 2025. All rights reserved.
 * Global Trust Authority is licensed under the Mulan PSL v2.
 * You can use this software according to the terms and conditions of the Mulan PSL v2.
 * You may obtain a copy of Mulan PSL v2 at:
 *     http://license.coscl.org.cn/MulanPSL2
 * THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY KIND, EITHER EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO NON-INFRINGEMENT, MERCHANTABILITY OR FIT FOR A PARTICULAR
 * PURPOSE.
 * See the Mulan PSL v2 for more details.
 */

//! In-process Rego evaluation
//!
//! [`RegoEngineConnector`] behaves like a policy server living inside the process: policies
//! uploaded through any of its sessions are kept in a registry shared by all of them, and
//! rules are evaluated with `regorus`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use async_trait::async_trait;
use config_manager::OpaServerConfig;
use log::{debug, error};
use regorus::Engine;
use serde_json::Value;
use crate::client::{PolicyEngineClient, PolicyEngineConnector};
use crate::error::PolicyEngineError;

/// Maximum size limit for policy evaluation result (500KB)
pub(crate) const MAX_RESULT_SIZE: usize = 500 * 1024;

type PolicyRegistry = Arc<RwLock<HashMap<String, String>>>;

/// Evaluates `rule` of the package declared by `policy` against `input`
///
/// Returns `Value::Null` when the rule is undefined for the given input.
///
/// # Errors
///
/// * `PolicyParseError` - the policy does not compile or declares no package
/// * `EvaluationError` - the query fails at runtime
/// * `OutputSizeLimitError` - the result exceeds 500KB once serialized
pub fn evaluate_rule(input: &Value, policy: &str, rule: &str) -> Result<Value, PolicyEngineError> {
    let package = package_path(policy)
        .ok_or_else(|| PolicyEngineError::PolicyParseError("policy declares no package".to_string()))?;

    let mut engine = compile(policy)?;

    if let Err(e) = engine.set_input_json(&input.to_string()) {
        return Err(PolicyEngineError::EvaluationError(format!("Failed to set input: {}", e)));
    }

    let query = format!("data.{}.{}", package, rule);
    let results = match engine.eval_query(query, false) {
        Ok(results) => results,
        Err(e) => return Err(PolicyEngineError::EvaluationError(format!("Failed to evaluate query: {}", e))),
    };

    let Some(expr) = results.result.first().and_then(|result| result.expressions.first()) else {
        return Ok(Value::Null);
    };
    if expr.value == regorus::Value::Undefined {
        return Ok(Value::Null);
    }

    let json_str = match expr.value.to_json_str() {
        Ok(str) => str,
        Err(e) => {
            return Err(PolicyEngineError::EvaluationError(format!(
                "Failed to convert result to JSON string: {}",
                e
            )))
        },
    };
    if json_str.len() > MAX_RESULT_SIZE {
        return Err(PolicyEngineError::OutputSizeLimitError(json_str.len(), MAX_RESULT_SIZE));
    }

    serde_json::from_str(&json_str)
        .map_err(|e| PolicyEngineError::EvaluationError(format!("Failed to parse JSON string: {}", e)))
}

fn compile(policy: &str) -> Result<Engine, PolicyEngineError> {
    let mut engine = Engine::new();
    if let Err(e) = engine.add_policy(String::from("policy.rego"), policy.to_string()) {
        let err_str = e.to_string();
        error!("Policy compilation error: {}", err_str);
        return Err(PolicyEngineError::PolicyParseError(err_str));
    }
    Ok(engine)
}

/// Package of the first `package` declaration in `policy`
fn package_path(policy: &str) -> Option<String> {
    policy.lines().find_map(|line| {
        let mut tokens = line.split_whitespace();
        match (tokens.next(), tokens.next()) {
            (Some("package"), Some(name)) => Some(name.to_string()),
            _ => None,
        }
    })
}

/// Factory for in-process sessions sharing one policy registry
#[derive(Clone)]
pub struct RegoEngineConnector {
    registry: PolicyRegistry,
    reachable: Arc<AtomicBool>,
}

impl Default for RegoEngineConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl RegoEngineConnector {
    pub fn new() -> Self {
        Self { registry: Arc::new(RwLock::new(HashMap::new())), reachable: Arc::new(AtomicBool::new(true)) }
    }

    /// Makes the health probe of every session (existing and future) succeed or fail
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Policy text registered under `policy_name`
    pub fn registered(&self, policy_name: &str) -> Option<String> {
        self.registry.read().ok()?.get(policy_name).cloned()
    }

    pub fn policy_count(&self) -> usize {
        self.registry.read().map(|registry| registry.len()).unwrap_or(0)
    }
}

impl PolicyEngineConnector for RegoEngineConnector {
    fn connect(&self, _config: &OpaServerConfig) -> Result<Box<dyn PolicyEngineClient>, PolicyEngineError> {
        Ok(Box::new(RegoEngineClient { registry: Arc::clone(&self.registry), reachable: Arc::clone(&self.reachable) }))
    }
}

/// Session with the in-process engine
pub struct RegoEngineClient {
    registry: PolicyRegistry,
    reachable: Arc<AtomicBool>,
}

#[async_trait]
impl PolicyEngineClient for RegoEngineClient {
    async fn check_connection(&self) -> Result<(), PolicyEngineError> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(PolicyEngineError::ConnectionError("in-process engine is marked unreachable".to_string()))
        }
    }

    async fn upload_policy(&self, policy: &str, policy_name: &str) -> Result<(), PolicyEngineError> {
        compile(policy)?;
        let mut registry = self
            .registry
            .write()
            .map_err(|e| PolicyEngineError::EvaluationError(format!("policy registry is poisoned: {}", e)))?;
        registry.insert(policy_name.to_string(), policy.to_string());
        debug!("Registered policy {}", policy_name);
        Ok(())
    }

    async fn evaluate(&self, input: &Value, policy_name: &str, rule_name: &str) -> Result<Value, PolicyEngineError> {
        let policy = {
            let registry = self
                .registry
                .read()
                .map_err(|e| PolicyEngineError::EvaluationError(format!("policy registry is poisoned: {}", e)))?;
            registry.get(policy_name).cloned()
        };
        let policy = policy
            .ok_or_else(|| PolicyEngineError::EvaluationError(format!("policy {} is not registered", policy_name)))?;
        evaluate_rule(input, &policy, rule_name)
    }

    fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_path() {
        assert_eq!(package_path("package mb\nallow = true").as_deref(), Some("mb"));
        assert_eq!(package_path("# header\n  package keylime.mb  \n").as_deref(), Some("keylime.mb"));
        assert_eq!(package_path("packages mb\n"), None);
        assert_eq!(package_path(""), None);
    }

    #[test]
    fn test_registry_is_shared_between_sessions() {
        let connector = RegoEngineConnector::new();
        let other = connector.clone();
        connector.registry.write().unwrap().insert("a".to_string(), "package a".to_string());
        assert_eq!(other.policy_count(), 1);
        assert_eq!(other.registered("a").as_deref(), Some("package a"));
        assert!(other.registered("b").is_none());
    }
}
