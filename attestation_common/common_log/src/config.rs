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

use serde::Deserialize;
use std::path::PathBuf;

/// Logging configuration, one entry per module path prefix.
///
/// ```yaml
/// loggers:
///   - path_prefix: root
///     log_directory: logs
///     log_file_name: mb_verifier.log
///     max_file_size: 10485760
///     max_zip_count: 6
///     level: info
///   - path_prefix: policy_engine
///     level: debug
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    pub loggers: Vec<LoggerConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggerConfig {
    pub path_prefix: String,
    /// Directory for the rolling file; the logger writes to stderr when absent.
    #[serde(default)]
    pub log_directory: Option<String>,
    #[serde(default = "default_log_file_name")]
    pub log_file_name: String,
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    #[serde(default = "default_max_zip_count")]
    pub max_zip_count: u32,
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_log_file_name() -> String {
    "mb_verifier.log".to_string()
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

fn default_max_zip_count() -> u32 {
    6
}

fn default_level() -> String {
    "info".to_string()
}

impl LogConfig {
    pub fn from_yaml(path: impl Into<PathBuf>) -> Result<Self, Box<dyn std::error::Error>> {
        let config_str = std::fs::read_to_string(path.into())?;
        Self::from_yaml_str(&config_str)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: LogConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Console-only configuration with a single root logger.
    pub fn console(level: &str) -> Self {
        Self {
            loggers: vec![LoggerConfig {
                path_prefix: "root".to_string(),
                log_directory: None,
                log_file_name: default_log_file_name(),
                max_file_size: default_max_file_size(),
                max_zip_count: default_max_zip_count(),
                level: level.to_string(),
            }],
        }
    }

    pub fn get_logger_config(&self, path_prefix: &str) -> Option<&LoggerConfig> {
        self.loggers.iter().find(|l| path_prefix.starts_with(&l.path_prefix))
    }

    pub fn get_root_config(&self) -> Option<&LoggerConfig> {
        self.get_logger_config("root")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_yaml_str_applies_defaults() {
        let config = LogConfig::from_yaml_str(
            r#"
loggers:
  - path_prefix: root
    log_directory: logs
    level: warn
  - path_prefix: policy_engine
"#,
        )
        .unwrap();

        let root = config.get_root_config().unwrap();
        assert_eq!(root.log_directory.as_deref(), Some("logs"));
        assert_eq!(root.level, "warn");
        assert_eq!(root.max_zip_count, 6);

        let engine = config.get_logger_config("policy_engine::opa_client").unwrap();
        assert_eq!(engine.level, "info");
        assert!(engine.log_directory.is_none());
    }

    #[test]
    fn test_console_config_has_root_only() {
        let config = LogConfig::console("debug");
        assert_eq!(config.loggers.len(), 1);
        assert_eq!(config.get_root_config().unwrap().level, "debug");
        assert!(config.get_logger_config("tpm_boot_verifier").is_none());
    }

    #[test]
    fn test_from_yaml_missing_file() {
        assert!(LogConfig::from_yaml("/nonexistent/logging.yaml").is_err());
    }
}
