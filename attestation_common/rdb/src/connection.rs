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

//! Database Connection Management Module
//! Provides unified database connection pool management functionality

use std::sync::Arc;
use std::time::Duration;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tokio::sync::OnceCell;
use log::{error, info};
use crate::config::DbConfig;
use crate::DbError;

static DB_CONN: OnceCell<Arc<DatabaseConnection>> = OnceCell::const_new();

/// Get database connection
///
/// The pool is created from [`DbConfig::from_env`] on first call,
/// subsequent calls reuse the same connection.
pub async fn get_connection() -> Result<Arc<DatabaseConnection>, DbError> {
    let conn = DB_CONN
        .get_or_try_init(|| async {
            info!("Initializing database connection...");
            let config = DbConfig::from_env()?;
            let conn = connect(&config).await?;
            Ok::<_, DbError>(Arc::new(conn))
        })
        .await?;
    Ok(conn.clone())
}

/// Create a connection pool for the given configuration
pub async fn connect(config: &DbConfig) -> Result<DatabaseConnection, DbError> {
    match config.db_type.as_str() {
        "mysql" | "postgres" | "sqlite" => {},
        other => {
            error!("Unsupported database type: {}", other);
            return Err(DbError::InvalidDatabaseType(other.to_string()));
        },
    }
    info!(
        "Configuring {} connection parameters: max_connections={}, timeout={}s",
        config.db_type, config.max_connections, config.timeout
    );
    let mut opt = ConnectOptions::new(config.url.clone());
    opt.max_connections(config.max_connections)
        .connect_timeout(Duration::from_secs(config.timeout))
        .sqlx_logging(false);
    // every pooled connection to an in-memory sqlite database sees its own database
    if config.url.contains(":memory:") {
        opt.max_connections(1).min_connections(1);
    }

    let conn = Database::connect(opt).await.map_err(|e| {
        error!("Failed to create {} connection pool: {}", config.db_type, e);
        DbError::ConnectionError(e.to_string())
    })?;
    info!("{} database connection pool created successfully", config.db_type);
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectionTrait, DatabaseBackend};

    #[tokio::test]
    async fn test_connect_sqlite_memory() {
        let conn = connect(&DbConfig::new("sqlite", "sqlite::memory:")).await.unwrap();
        assert_eq!(conn.get_database_backend(), DatabaseBackend::Sqlite);
    }

    #[tokio::test]
    async fn test_connect_rejects_unknown_type() {
        let result = connect(&DbConfig::new("oracle", "oracle://localhost")).await;
        assert!(matches!(result, Err(DbError::InvalidDatabaseType(_))));
    }
}
