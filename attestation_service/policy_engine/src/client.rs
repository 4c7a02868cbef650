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

use async_trait::async_trait;
use config_manager::OpaServerConfig;
use mockall::automock;
use serde_json::Value;
use crate::error::PolicyEngineError;

/// Session with a policy decision engine.
///
/// Policies are registered under a name and stay registered on the engine after the
/// session is closed; later sessions evaluate them by the same name.
#[automock]
#[async_trait]
pub trait PolicyEngineClient: Send + Sync {
    /// Liveness probe
    async fn check_connection(&self) -> Result<(), PolicyEngineError>;

    /// Registers (or replaces) `policy` under `policy_name`
    async fn upload_policy(&self, policy: &str, policy_name: &str) -> Result<(), PolicyEngineError>;

    /// Evaluates `rule_name` of the policy registered as `policy_name` and returns the raw
    /// decision, which is `Value::Null` when the rule is undefined for the input
    async fn evaluate(&self, input: &Value, policy_name: &str, rule_name: &str) -> Result<Value, PolicyEngineError>;

    /// Releases the session; never fails
    fn close(&self);
}

/// Builds engine sessions from the configured server address
#[automock]
pub trait PolicyEngineConnector: Send + Sync {
    fn connect(&self, config: &OpaServerConfig) -> Result<Box<dyn PolicyEngineClient>, PolicyEngineError>;
}
