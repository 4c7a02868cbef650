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

//! Error types for policy engine sessions
//!
//! This module provides error types for the failure cases of connecting to a policy
//! engine, registering a policy with it and evaluating a rule.

use thiserror::Error;

/// Errors that can occur while talking to a policy engine
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyEngineError {
    /// The engine cannot be reached
    #[error("Failed to connect to policy engine: {0}")]
    ConnectionError(String),

    /// The engine rejected the policy document, e.g. a Rego syntax error
    #[error("Failed to parse policy: {0}")]
    PolicyParseError(String),

    /// Error that occurs during policy evaluation, such as invalid input or runtime errors
    #[error("Failed to evaluate policy: {0}")]
    EvaluationError(String),

    /// Error that occurs when the policy evaluation result exceeds the size limit
    #[error("Output size limit exceeded: Result size {0} bytes exceeds limit of {1} bytes")]
    OutputSizeLimitError(usize, usize),

    /// The session could not be built from the configuration, e.g. an unreadable certificate
    #[error("Invalid policy engine configuration: {0}")]
    ConfigError(String),

    /// The engine answered with a status the client does not handle
    #[error("Unexpected response from policy engine: {0}")]
    UnexpectedResponse(String),
}
