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

use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration file could not be opened or read
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    /// The YAML content does not match the configuration schema
    #[error("Failed to parse YAML: {0}")]
    ParseError(String),

    /// A configuration value is out of range
    #[error("Invalid configuration: {0}")]
    InvalidValue(String),

    /// The singleton was read before `initialize` succeeded
    #[error("Configuration not initialized")]
    NotInitialized,
}
