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

/// Configuration management module for loading and accessing verifier configuration.
///
/// This module provides a thread-safe singleton for configuration data loaded
/// from YAML files, plus the typed schema of the measured boot verifier.
///
/// # Example
///
/// ```no_run
/// use config_manager::MB_VERIFIER_CONFIG;
///
/// MB_VERIFIER_CONFIG.initialize("mb_verifier.yaml").expect("Failed to load config");
/// let config = MB_VERIFIER_CONFIG.get_instance().expect("Config not initialized");
/// println!("OPA server at {}", config.verifier.opa_server().server_url());
/// ```
pub mod error;
pub mod manager;
pub mod types;

// Re-export key struct
pub use error::ConfigError;
pub use manager::{ConfigSingleton, Validate};
pub use types::context::{MbVerifierConfig, OpaServerConfig, TenantConfig, VerifierConfig, MB_VERIFIER_CONFIG};
