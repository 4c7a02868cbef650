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

use chrono::{DateTime, Local};
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger as SizeBasedTriggerPolicy;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::Append;
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::{Config, Handle};
use std::env;
use std::path::PathBuf;
use crate::config::{LogConfig, LoggerConfig};

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S:%3f)} {l} [{M}:{L}] - {m}{n}";
const ROOT_APPENDER: &str = "root_appender";

pub struct Logger {
    #[allow(dead_code)]
    handle: Handle,
}

impl Logger {
    pub fn new_from_yaml(config_path: impl Into<PathBuf>) -> Result<Self, Box<dyn std::error::Error>> {
        let config = LogConfig::from_yaml(config_path)?;
        Self::new_from_config(config)
    }

    pub fn new_from_config(config: LogConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let final_config = Self::build_config(&config)?;
        let handle = log4rs::init_config(final_config)?;
        Ok(Self { handle })
    }

    /// Translates a [`LogConfig`] into a log4rs configuration without installing it.
    pub fn build_config(config: &LogConfig) -> Result<Config, Box<dyn std::error::Error>> {
        let mut log4rs_config = Config::builder();

        for logger_config in config.loggers.iter().filter(|l| l.path_prefix != "root") {
            let appender_name = format!("{}_appender", logger_config.path_prefix);
            let appender = Self::create_appender(logger_config)?;
            log4rs_config = log4rs_config.appender(Appender::builder().build(&appender_name, appender));

            let logger = log4rs::config::Logger::builder()
                .appender(appender_name)
                .additive(false)
                .build(logger_config.path_prefix.clone(), Self::parse_level(&logger_config.level));
            log4rs_config = log4rs_config.logger(logger);
        }

        let root = match config.get_root_config() {
            Some(root_config) => {
                let root_appender = Self::create_appender(root_config)?;
                log4rs_config = log4rs_config.appender(Appender::builder().build(ROOT_APPENDER, root_appender));
                Root::builder().appender(ROOT_APPENDER).build(Self::parse_level(&root_config.level))
            },
            None => {
                let console = Self::console_appender();
                log4rs_config = log4rs_config.appender(Appender::builder().build(ROOT_APPENDER, console));
                Root::builder().appender(ROOT_APPENDER).build(LevelFilter::Info)
            },
        };

        Ok(log4rs_config.build(root)?)
    }

    fn create_appender(config: &LoggerConfig) -> Result<Box<dyn Append>, Box<dyn std::error::Error>> {
        let log_directory = match &config.log_directory {
            Some(dir) => Self::resolve_directory(dir),
            None => return Ok(Self::console_appender()),
        };
        std::fs::create_dir_all(&log_directory)?;

        let now: DateTime<Local> = Local::now();
        let formatted_time = now.format("%Y%m%d%H%M%S%3f").to_string();

        let log_file = log_directory.join(&config.log_file_name);
        let archived_log_pattern = format!(
            "{}/{}-{{}}-{}.gz",
            log_directory.display(),
            config.log_file_name,
            formatted_time
        );

        let size_trigger = SizeBasedTriggerPolicy::new(config.max_file_size);
        let roller = FixedWindowRoller::builder().build(&archived_log_pattern, config.max_zip_count)?;
        let compound_policy = CompoundPolicy::new(Box::new(size_trigger), Box::new(roller));

        let appender = RollingFileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build(log_file, Box::new(compound_policy))?;

        Ok(Box::new(appender))
    }

    fn console_appender() -> Box<dyn Append> {
        Box::new(
            ConsoleAppender::builder()
                .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
                .target(Target::Stderr)
                .build(),
        )
    }

    /// Relative directories are rooted at `LOG_OUTPUT_DIR` when it is set.
    fn resolve_directory(dir: &str) -> PathBuf {
        let path = PathBuf::from(dir);
        if path.is_absolute() {
            return path;
        }
        dotenv::dotenv().ok();
        match env::var("LOG_OUTPUT_DIR") {
            Ok(root) if !root.is_empty() => PathBuf::from(root).join(path),
            _ => path,
        }
    }

    pub fn parse_level(level: &str) -> LevelFilter {
        match level.to_lowercase().as_str() {
            "trace" => LevelFilter::Trace,
            "debug" => LevelFilter::Debug,
            "info" => LevelFilter::Info,
            "warn" => LevelFilter::Warn,
            "error" => LevelFilter::Error,
            "off" => LevelFilter::Off,
            _ => LevelFilter::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogConfig;

    #[test]
    fn test_parse_level() {
        assert_eq!(Logger::parse_level("DEBUG"), LevelFilter::Debug);
        assert_eq!(Logger::parse_level("warn"), LevelFilter::Warn);
        assert_eq!(Logger::parse_level("off"), LevelFilter::Off);
        assert_eq!(Logger::parse_level("verbose"), LevelFilter::Info);
    }

    #[test]
    fn test_build_config_with_file_logger() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = format!(
            r#"
loggers:
  - path_prefix: root
    log_directory: {}
    log_file_name: verifier.log
    level: debug
  - path_prefix: policy_engine
    level: warn
"#,
            dir.path().display()
        );
        let config = LogConfig::from_yaml_str(&yaml).unwrap();
        let built = Logger::build_config(&config).unwrap();

        assert_eq!(built.root().level(), LevelFilter::Debug);
        assert_eq!(built.appenders().len(), 2);
        assert_eq!(built.loggers().len(), 1);
        assert!(dir.path().exists());
    }

    #[test]
    fn test_build_config_console_only() {
        let built = Logger::build_config(&LogConfig::console("error")).unwrap();
        assert_eq!(built.root().level(), LevelFilter::Error);
        assert_eq!(built.appenders().len(), 1);
    }
}
