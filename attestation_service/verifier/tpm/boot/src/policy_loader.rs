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


//! Measured boot policy loading

use std::fs;
use std::path::{Path, PathBuf};
use config_manager::TenantConfig;
use log::{debug, error};
use crate::error::MbPolicyError;

/// Reads measured boot policies from disk
#[derive(Debug, Clone, Default)]
pub struct PolicyLoader {
    default_path: Option<PathBuf>,
}

impl PolicyLoader {
    pub fn new(default_path: Option<PathBuf>) -> Self {
        Self { default_path }
    }

    /// Loader whose default policy is `tenant.mb_refstate`
    pub fn from_config(tenant: &TenantConfig) -> Self {
        let default_path = tenant
            .mb_refstate
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);
        Self::new(default_path)
    }

    pub fn default_path(&self) -> Option<&Path> {
        self.default_path.as_deref()
    }

    /// Reads the whole policy file at `policy_path`, or at the default path when none is given.
    ///
    /// # Errors
    ///
    /// Every failure (no path at all, I/O error, invalid UTF-8) is reported as
    /// [`MbPolicyError::IoError`] carrying the cause.
    pub fn load(&self, policy_path: Option<&Path>) -> Result<String, MbPolicyError> {
        let path = policy_path.or(self.default_path.as_deref()).ok_or_else(|| {
            error!("No measured boot policy path given and no default configured");
            MbPolicyError::IoError("no policy path given and tenant.mb_refstate is not set".to_string())
        })?;

        let bytes = fs::read(path).map_err(|e| {
            error!("Failed to read measured boot policy {}: {}", path.display(), e);
            MbPolicyError::IoError(format!("{}: {}", path.display(), e))
        })?;
        let policy = String::from_utf8(bytes)
            .map_err(|e| MbPolicyError::IoError(format!("{}: invalid UTF-8: {}", path.display(), e)))?;

        debug!("Loaded measured boot policy from {} ({} bytes)", path.display(), policy.len());
        Ok(policy)
    }
}
