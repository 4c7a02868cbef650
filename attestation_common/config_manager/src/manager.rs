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
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::OnceLock;
use log::info;
use crate::error::ConfigError;

/// Range checks run once after a configuration document is deserialized.
pub trait Validate {
    fn validate(&self) -> Result<(), ConfigError>;
}

/// A thread-safe singleton configuration manager that loads and provides access to configuration data.
///
/// This struct uses Rust's `OnceLock` to ensure that configuration is initialized only once
/// and can be safely accessed from multiple threads.
///
/// # Type Parameters
///
/// * `T` - The configuration type, deserialized from YAML and validated before it is stored.
pub struct ConfigSingleton<T: for<'a> Deserialize<'a> + Validate + Send + Sync + 'static> {
    instance: OnceLock<T>,
}

impl<T: for<'a> Deserialize<'a> + Validate + Send + Sync + 'static> ConfigSingleton<T> {
    /// Creates a new, uninitialized `ConfigSingleton` instance.
    pub const fn new() -> Self {
        ConfigSingleton { instance: OnceLock::new() }
    }

    /// Initializes the singleton by loading and parsing a YAML configuration file.
    ///
    /// If the singleton has already been initialized, this method returns `Ok(())`
    /// without changing the existing configuration.
    ///
    /// # Errors
    ///
    /// * `ReadError` - the file cannot be opened or read
    /// * `ParseError` - the YAML content cannot be parsed into `T`
    /// * `InvalidValue` - the parsed configuration fails validation
    pub fn initialize<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        if self.instance.get().is_some() {
            return Ok(());
        }

        let file = File::open(path.as_ref()).map_err(|e| ConfigError::ReadError(e.to_string()))?;
        let mut contents = String::new();
        let mut reader = BufReader::new(file);
        reader.read_to_string(&mut contents).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        self.initialize_from_str(&contents)?;
        info!("Configuration loaded from {}", path.as_ref().display());
        Ok(())
    }

    /// Same as [`initialize`](Self::initialize) for an in-memory YAML document.
    pub fn initialize_from_str(&self, contents: &str) -> Result<(), ConfigError> {
        if self.instance.get().is_some() {
            return Ok(());
        }
        let config: T = serde_yaml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        let _ = self.instance.set(config);
        Ok(())
    }

    /// Retrieves a reference to the initialized configuration instance.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` if `initialize` has not succeeded yet.
    pub fn get_instance(&self) -> Result<&T, ConfigError> {
        self.instance.get().ok_or(ConfigError::NotInitialized)
    }
}
