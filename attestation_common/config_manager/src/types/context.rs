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

use std::path::PathBuf;
use serde::Deserialize;
use crate::error::ConfigError;
use crate::manager::{ConfigSingleton, Validate};

pub const DEFAULT_OPA_SERVER_IP: &str = "127.0.0.1";
pub const DEFAULT_OPA_SERVER_PORT: u16 = 8181;

/// Main configuration structure that matches the mb_verifier.yaml file structure.
///
/// Every section is optional; missing keys fall back to their defaults.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct MbVerifierConfig {
    /// Tenant side settings
    #[serde(default)]
    pub tenant: TenantConfig,
    /// Verifier side settings
    #[serde(default)]
    pub verifier: VerifierConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Tenant configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TenantConfig {
    /// Default measured boot policy file
    #[serde(default)]
    pub mb_refstate: Option<String>,
}

/// Verifier configuration
#[derive(Debug, Deserialize, Clone)]
pub struct VerifierConfig {
    #[serde(default = "default_opa_server_ip")]
    pub opa_server_ip: String,
    #[serde(default = "default_opa_server_port")]
    pub opa_server_port: u16,
    /// PEM certificate of the OPA server; empty means plain HTTP
    #[serde(default)]
    pub opa_server_cert: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// log4rs style logging.yaml; console logging is used when absent
    #[serde(default)]
    pub file: Option<String>,
}

fn default_opa_server_ip() -> String {
    DEFAULT_OPA_SERVER_IP.to_string()
}

fn default_opa_server_port() -> u16 {
    DEFAULT_OPA_SERVER_PORT
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            opa_server_ip: default_opa_server_ip(),
            opa_server_port: default_opa_server_port(),
            opa_server_cert: String::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), file: None }
    }
}

impl VerifierConfig {
    /// Connection settings of the policy engine server
    pub fn opa_server(&self) -> OpaServerConfig {
        let cert = match self.opa_server_cert.trim() {
            "" => None,
            path => Some(PathBuf::from(path)),
        };
        OpaServerConfig { ip: self.opa_server_ip.clone(), port: self.opa_server_port, cert }
    }
}

impl MbVerifierConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl Validate for MbVerifierConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.verifier.opa_server_ip.trim().is_empty() {
            return Err(ConfigError::InvalidValue("opa_server_ip cannot be empty".to_string()));
        }
        if self.verifier.opa_server_port == 0 {
            return Err(ConfigError::InvalidValue("opa_server_port cannot be 0".to_string()));
        }
        if !["trace", "debug", "info", "warn", "error", "off"].contains(&self.logging.level.as_str()) {
            return Err(ConfigError::InvalidValue(format!("Invalid log level: {}", self.logging.level)));
        }
        Ok(())
    }
}

/// Resolved address of the OPA policy engine server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaServerConfig {
    pub ip: String,
    pub port: u16,
    /// Trusted server certificate; TLS is used iff present
    pub cert: Option<PathBuf>,
}

impl Default for OpaServerConfig {
    fn default() -> Self {
        Self { ip: default_opa_server_ip(), port: default_opa_server_port(), cert: None }
    }
}

impl OpaServerConfig {
    pub fn new(ip: impl Into<String>, port: u16) -> Self {
        Self { ip: ip.into(), port, cert: None }
    }

    pub fn with_cert(mut self, cert: impl Into<PathBuf>) -> Self {
        self.cert = Some(cert.into());
        self
    }

    pub fn is_tls(&self) -> bool {
        self.cert.is_some()
    }

    /// `http://ip:port`, or `https://ip:port` when a certificate is configured
    pub fn server_url(&self) -> String {
        let scheme = if self.is_tls() { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.ip, self.port)
    }
}

/// Global configuration singleton instance
///
/// Users should call `MB_VERIFIER_CONFIG.initialize(path)` to load the configuration and
/// `MB_VERIFIER_CONFIG.get_instance()` to access the loaded configuration.
pub static MB_VERIFIER_CONFIG: ConfigSingleton<MbVerifierConfig> = ConfigSingleton::new();
