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

//! Database Configuration Module
//! Handles environment variables and connection settings

use std::env;
use log::{error, info};
use crate::DbError;

const DEFAULT_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// Database type ("mysql", "postgres" or "sqlite")
    pub db_type: String,
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Connection timeout (seconds)
    pub timeout: u64,
}

impl DbConfig {
    pub fn new(db_type: &str, url: &str) -> Self {
        Self {
            db_type: db_type.to_lowercase(),
            url: url.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Loads database configuration from environment variables.
    ///
    /// `DB_TYPE` selects the backend ("mysql", "postgres" or "sqlite") and with it the
    /// URL variable: `MYSQL_DATABASE_URL`, `POSTGRESQL_DATABASE_URL` or `SQLITE_DATABASE_URL`.
    /// A `.env` file is honoured when present.
    ///
    /// Optional `DATABASE_MAX_CONNECTIONS` and `DATABASE_TIMEOUT` default to 20 and
    /// 30 seconds if not set or invalid.
    ///
    /// # Errors
    ///
    /// * `DbError::InvalidDatabaseType` - `DB_TYPE` is missing or unsupported.
    /// * `DbError::MissingDatabaseUrl` - the URL variable of the backend is not set.
    pub fn from_env() -> Result<Self, DbError> {
        info!("get db config from env");
        dotenv::dotenv().ok();
        let db_type = env::var("DB_TYPE")
            .map_err(|_| DbError::InvalidDatabaseType("DB_TYPE is not set".to_string()))?
            .to_lowercase();
        let url_key = match db_type.as_str() {
            "mysql" => "MYSQL_DATABASE_URL",
            "postgres" => "POSTGRESQL_DATABASE_URL",
            "sqlite" => "SQLITE_DATABASE_URL",
            _ => {
                error!("db type {} is not supported", db_type);
                return Err(DbError::InvalidDatabaseType(db_type));
            },
        };
        info!("db type is {}", db_type);
        let url = env::var(url_key).map_err(|_| DbError::MissingDatabaseUrl(url_key.to_string()))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        let timeout = env::var("DATABASE_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self { db_type, url, max_connections, timeout })
    }
}
