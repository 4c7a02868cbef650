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


//! Measured boot evaluation against a Rego policy hosted by a policy engine
//!
//! On the first attestation of an agent the policy is renamed to a package unique to that
//! agent and registered with the engine. Every attestation then evaluates the agent's boot
//! log against the `allow` rule of that package. All outcomes are reported as [`Failure`]
//! events of the [`Component::MeasuredBoot`] component.

use std::collections::BTreeSet;
use config_manager::OpaServerConfig;
use log::{debug, error, info, warn};
use policy_engine::{OpaConnector, PolicyEngineConnector, ALLOW_RULE};
use serde_json::{json, Value};
use crate::failure::{Component, Failure};
use crate::policy_validator::rewrite_package_name;

pub const OPA_SERVER_CONNECTION_FAILED: &str = "opa_server_connection_failed";
pub const UPLOAD_OPA_POLICY_FAILED: &str = "upload_opa_policy_failed";
pub const BOOTLOG_EVALUATION_FAILED: &str = "bootlog_evaluation_failed";

const UPLOAD_CONTEXT: &str = "Uploading the policy to the OPA server";
const EVALUATE_CONTEXT: &str = "Bootlog evaluation against OPA policy";

/// Name under which the policy of `agent_id` is registered with the engine.
///
/// Agent ids differing only by `-` versus `_` map to the same name.
pub fn policy_name_for_agent(agent_id: &str) -> String {
    format!("policy_{}", agent_id.replace('-', "_"))
}

/// Evaluates boot logs of agents against their measured boot policy
pub struct MeasuredBootEvaluator {
    config: OpaServerConfig,
    connector: Box<dyn PolicyEngineConnector>,
}

impl MeasuredBootEvaluator {
    pub fn new(config: OpaServerConfig, connector: Box<dyn PolicyEngineConnector>) -> Self {
        Self { config, connector }
    }

    /// Evaluator talking to the OPA server described by `config`
    pub fn with_opa(config: OpaServerConfig) -> Self {
        Self::new(config, Box::new(OpaConnector))
    }

    pub fn config(&self) -> &OpaServerConfig {
        &self.config
    }

    /// Evaluates `measurement_data` of `agent_id` against the `refstate` policy.
    ///
    /// The policy is registered with the engine only when `attestation_count` is 0; later
    /// attestations evaluate the policy registered then. A `None` policy on the first
    /// attestation is registered as empty text and left to the engine to reject.
    ///
    /// Returns an empty [`Failure`] when the engine answers `true`.
    pub async fn evaluate(
        &self,
        refstate: Option<&str>,
        measurement_data: Option<&Value>,
        pcrs_in_quote: &BTreeSet<u32>,
        agent_id: &str,
        attestation_count: u64,
    ) -> Failure {
        let mut failure = Failure::new(Component::MeasuredBoot);
        let server = self.config.server_url();

        let client = match self.connector.connect(&self.config) {
            Ok(client) => client,
            Err(e) => {
                error!("Agent {}: cannot open a session with the OPA server {}: {}", agent_id, server, e);
                failure.add_event(
                    OPA_SERVER_CONNECTION_FAILED,
                    json!({
                        "context": format!("Connection to the OPA server {} failed.", server),
                        "reason": e.to_string(),
                    }),
                    true,
                );
                return failure;
            },
        };
        let client = scopeguard::guard(client, |client| client.close());

        let policy_name = policy_name_for_agent(agent_id);
        debug!(
            "Agent {}: evaluating boot log against {} (attestation {}, PCRs in quote {:?})",
            agent_id, policy_name, attestation_count, pcrs_in_quote
        );

        if attestation_count == 0 {
            if let Err(e) = client.check_connection().await {
                error!("Agent {}: connection to the OPA server {} failed: {}", agent_id, server, e);
                failure.add_event(
                    OPA_SERVER_CONNECTION_FAILED,
                    json!({ "context": format!("Connection to the OPA server {} failed.", server) }),
                    true,
                );
                return failure;
            }

            let rewrite = rewrite_package_name(refstate.unwrap_or_default(), &policy_name);
            if !rewrite.rewritten {
                warn!("Agent {}: policy has no package declaration, uploading it unchanged as {}", agent_id, policy_name);
            }

            if let Err(e) = client.upload_policy(&rewrite.policy, &policy_name).await {
                error!("Agent {}: uploading policy {} to {} failed: {}", agent_id, policy_name, server, e);
                failure.add_event(
                    UPLOAD_OPA_POLICY_FAILED,
                    json!({
                        "context": UPLOAD_CONTEXT,
                        "operation": "upload",
                        "policy": rewrite.policy,
                    }),
                    true,
                );
                return failure;
            }
            info!("Agent {}: policy {} uploaded to {}", agent_id, policy_name, server);
        }

        let input = measurement_data.cloned().unwrap_or(Value::Null);
        let reason = match client.evaluate(&input, &policy_name, ALLOW_RULE).await {
            Ok(Value::Bool(true)) => None,
            Ok(result) => Some(result),
            Err(e) => Some(Value::String(e.to_string())),
        };

        if let Some(reason) = reason {
            error!("Agent {}: boot log rejected by policy {}: {}", agent_id, policy_name, reason);
            failure.add_event(
                BOOTLOG_EVALUATION_FAILED,
                json!({
                    "context": EVALUATE_CONTEXT,
                    "operation": "evaluate",
                    "refstate": refstate,
                    "reason": reason,
                }),
                true,
            );
        }

        failure
    }
}
