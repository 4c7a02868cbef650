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

//! Open Policy Agent REST client
//!
//! Policies are registered with `PUT /v1/policies/{name}`; a rule is evaluated through
//! `POST /v1/data/{package path}/{rule}` where the package path is the one the server
//! parsed out of the registered module.

use std::time::Duration;
use async_trait::async_trait;
use config_manager::OpaServerConfig;
use log::{debug, error, info};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Certificate, Client, StatusCode};
use serde_json::{json, Value};
use crate::client::{PolicyEngineClient, PolicyEngineConnector};
use crate::error::PolicyEngineError;

const CLIENT_CONNECTION_TIMEOUT: u64 = 60; // Client connection timeout in seconds

/// Session with an OPA server
pub struct OpaClient {
    client: Client,
    base_url: String,
}

impl OpaClient {
    /// Builds a client for `config`; the configured certificate, if any, is trusted
    /// as the server's root and the connection uses HTTPS.
    pub fn new(config: &OpaServerConfig) -> Result<Self, PolicyEngineError> {
        let mut builder = Client::builder().timeout(Duration::from_secs(CLIENT_CONNECTION_TIMEOUT));

        if let Some(cert_path) = &config.cert {
            let cert_data = std::fs::read(cert_path).map_err(|e| {
                error!("Failed to read OPA server certificate {}: {}", cert_path.display(), e);
                PolicyEngineError::ConfigError(format!("Failed to read certificate: {}", e))
            })?;
            let cert = Certificate::from_pem(&cert_data)
                .map_err(|e| PolicyEngineError::ConfigError(format!("Failed to parse certificate: {}", e)))?;
            builder = builder.add_root_certificate(cert);
        }

        let client = builder.build().map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            PolicyEngineError::ConfigError(e.to_string())
        })?;

        Ok(Self { client, base_url: config.server_url() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn policy_url(&self, policy_name: &str) -> String {
        format!("{}/v1/policies/{}", self.base_url, policy_name)
    }

    /// Fetches the registered module and resolves the data path of its package
    async fn resolve_package_path(&self, policy_name: &str) -> Result<String, PolicyEngineError> {
        let response = self
            .client
            .get(self.policy_url(policy_name))
            .send()
            .await
            .map_err(|e| PolicyEngineError::ConnectionError(e.to_string()))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(PolicyEngineError::EvaluationError(format!("policy {} is not registered", policy_name)));
        }
        let document = Self::json_body(response).await?;
        package_data_path(&document).ok_or_else(|| {
            PolicyEngineError::EvaluationError(format!("policy {} has no package declaration", policy_name))
        })
    }

    async fn json_body(response: reqwest::Response) -> Result<Value, PolicyEngineError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PolicyEngineError::UnexpectedResponse(format!("{}: {}", status, body)));
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| PolicyEngineError::UnexpectedResponse(format!("invalid JSON body: {}", e)))
    }
}

/// Data path (`a/b/c`) of the package of a module returned by `GET /v1/policies/{name}`.
///
/// The first term of the package path is the `data` root and is skipped.
pub fn package_data_path(policy_document: &Value) -> Option<String> {
    let terms = policy_document.pointer("/result/ast/package/path")?.as_array()?;
    let segments: Vec<&str> = terms
        .iter()
        .skip(1)
        .filter_map(|term| term.get("value").and_then(Value::as_str))
        .collect();
    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

#[async_trait]
impl PolicyEngineClient for OpaClient {
    async fn check_connection(&self) -> Result<(), PolicyEngineError> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await.map_err(|e| {
            error!("OPA server {} is not reachable: {}", self.base_url, e);
            PolicyEngineError::ConnectionError(e.to_string())
        })?;
        if !response.status().is_success() {
            return Err(PolicyEngineError::ConnectionError(format!(
                "health check of {} returned {}",
                self.base_url,
                response.status()
            )));
        }
        Ok(())
    }

    async fn upload_policy(&self, policy: &str, policy_name: &str) -> Result<(), PolicyEngineError> {
        info!("Uploading policy {} to {}", policy_name, self.base_url);
        let response = self
            .client
            .put(self.policy_url(policy_name))
            .header(CONTENT_TYPE, "text/plain")
            .body(policy.to_string())
            .send()
            .await
            .map_err(|e| PolicyEngineError::ConnectionError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::BAD_REQUEST {
            return Err(PolicyEngineError::PolicyParseError(body));
        }
        Err(PolicyEngineError::UnexpectedResponse(format!("{}: {}", status, body)))
    }

    async fn evaluate(&self, input: &Value, policy_name: &str, rule_name: &str) -> Result<Value, PolicyEngineError> {
        let package_path = self.resolve_package_path(policy_name).await?;
        let url = format!("{}/v1/data/{}/{}", self.base_url, package_path, rule_name);
        debug!("Evaluating {}", url);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "input": input }))
            .send()
            .await
            .map_err(|e| PolicyEngineError::ConnectionError(e.to_string()))?;
        let body = Self::json_body(response).await?;
        Ok(body.get("result").cloned().unwrap_or(Value::Null))
    }

    fn close(&self) {
        debug!("Closing OPA session with {}", self.base_url);
    }
}

/// Connector producing [`OpaClient`] sessions
#[derive(Debug, Default, Clone, Copy)]
pub struct OpaConnector;

impl PolicyEngineConnector for OpaConnector {
    fn connect(&self, config: &OpaServerConfig) -> Result<Box<dyn PolicyEngineClient>, PolicyEngineError> {
        Ok(Box::new(OpaClient::new(config)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_data_path() {
        let document = json!({
            "result": {
                "id": "policy_d432fbb3_d2f1",
                "ast": {
                    "package": {
                        "path": [
                            {"type": "var", "value": "data"},
                            {"type": "string", "value": "policy_d432fbb3_d2f1"}
                        ]
                    }
                }
            }
        });
        assert_eq!(package_data_path(&document).as_deref(), Some("policy_d432fbb3_d2f1"));
    }

    #[test]
    fn test_package_data_path_nested_package() {
        let document = json!({"result": {"ast": {"package": {"path": [
            {"type": "var", "value": "data"},
            {"type": "string", "value": "keylime"},
            {"type": "string", "value": "mb"}
        ]}}}});
        assert_eq!(package_data_path(&document).as_deref(), Some("keylime/mb"));
    }

    #[test]
    fn test_package_data_path_missing() {
        assert!(package_data_path(&json!({"result": {}})).is_none());
        let root_only = json!({"result": {"ast": {"package": {"path": [{"type": "var", "value": "data"}]}}}});
        assert!(package_data_path(&root_only).is_none());
    }

    #[test]
    fn test_new_plaintext_client() {
        let client = OpaClient::new(&OpaServerConfig::new("127.0.0.1", 8181)).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8181");
        assert_eq!(client.policy_url("policy_a"), "http://127.0.0.1:8181/v1/policies/policy_a");
    }

    #[test]
    fn test_new_with_missing_certificate() {
        let config = OpaServerConfig::new("127.0.0.1", 8181).with_cert("/nonexistent/opa.pem");
        assert!(matches!(OpaClient::new(&config), Err(PolicyEngineError::ConfigError(_))));
    }

    #[test]
    fn test_new_with_invalid_certificate() {
        let cert = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(cert.path(), "not a certificate").unwrap();
        let config = OpaServerConfig::new("127.0.0.1", 8181).with_cert(cert.path());
        assert!(OpaClient::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        // port 9 (discard) is not expected to run an OPA server
        let client = OpaClient::new(&OpaServerConfig::new("127.0.0.1", 9)).unwrap();
        let result = client.check_connection().await;
        assert!(matches!(result, Err(PolicyEngineError::ConnectionError(_))));
    }
}
