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

//! Schema migrations
//!
//! Revisions are applied in order, each inside its own transaction, and recorded in
//! the `rdb_migrations` table so that `upgrade` only runs what is pending.
//! MySQL commits DDL implicitly, so a failed revision can leave partial changes there.

mod m2979e8d521bc_migrate_mb_refstates;
mod m3be092cd2635_create_mbrefstates;

use std::collections::HashSet;
use async_trait::async_trait;
use log::{info, error};
use sea_orm::sea_query::{Alias, Expr, Query};
use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, Statement, TransactionTrait};
use crate::DbError;

pub use m2979e8d521bc_migrate_mb_refstates::MigrateMbRefstates;
pub use m3be092cd2635_create_mbrefstates::CreateMbRefstatesTable;

const VERSION_TABLE: &str = "rdb_migrations";

/// One schema revision
#[async_trait]
pub trait Migration: Send + Sync {
    fn revision(&self) -> &'static str;

    /// Revision this one applies on top of
    fn down_revision(&self) -> Option<&'static str>;

    async fn upgrade(&self, txn: &DatabaseTransaction) -> Result<(), DbError>;

    async fn downgrade(&self, txn: &DatabaseTransaction) -> Result<(), DbError>;
}

/// Ordered chain of migrations
pub struct Migrator {
    migrations: Vec<Box<dyn Migration>>,
}

impl Migrator {
    pub fn new(migrations: Vec<Box<dyn Migration>>) -> Self {
        Self { migrations }
    }

    /// Migrations moving inline measured boot policies into the `mbrefstates` table
    pub fn mb_refstates() -> Self {
        Self::new(vec![Box::new(CreateMbRefstatesTable), Box::new(MigrateMbRefstates)])
    }

    pub fn revisions(&self) -> Vec<&'static str> {
        self.migrations.iter().map(|m| m.revision()).collect()
    }

    /// Revisions recorded as applied, in chain order
    pub async fn applied(&self, db: &DatabaseConnection) -> Result<Vec<&'static str>, DbError> {
        let applied = Self::load_applied(db).await?;
        Ok(self.revisions().into_iter().filter(|r| applied.contains(*r)).collect())
    }

    /// Most recent applied revision, `None` for an unmigrated schema
    pub async fn current_revision(&self, db: &DatabaseConnection) -> Result<Option<&'static str>, DbError> {
        Ok(self.applied(db).await?.last().copied())
    }

    /// Apply every pending revision in order, returning the ones applied
    pub async fn upgrade(&self, db: &DatabaseConnection) -> Result<Vec<&'static str>, DbError> {
        let applied = Self::load_applied(db).await?;
        let mut done = Vec::new();
        for migration in self.migrations.iter().filter(|m| !applied.contains(m.revision())) {
            let revision = migration.revision();
            info!("Upgrading schema to revision {}", revision);
            let txn = db.begin().await?;
            if let Err(e) = migration.upgrade(&txn).await {
                error!("Upgrade to revision {} failed: {}", revision, e);
                txn.rollback().await?;
                return Err(Self::wrap(revision, e));
            }
            let mut insert = Query::insert();
            insert
                .into_table(Alias::new(VERSION_TABLE))
                .columns([Alias::new("revision")])
                .values([revision.into()])
                .map_err(|e| Self::wrap(revision, DbError::Other(e.to_string())))?;
            txn.execute(txn.get_database_backend().build(&insert)).await?;
            txn.commit().await?;
            done.push(revision);
        }
        Ok(done)
    }

    /// Revert up to `steps` applied revisions, newest first, returning the ones reverted
    pub async fn downgrade(&self, db: &DatabaseConnection, steps: usize) -> Result<Vec<&'static str>, DbError> {
        let applied = Self::load_applied(db).await?;
        let mut done = Vec::new();
        for migration in self.migrations.iter().rev().filter(|m| applied.contains(m.revision())).take(steps) {
            let revision = migration.revision();
            info!("Downgrading schema revision {}", revision);
            let txn = db.begin().await?;
            if let Err(e) = migration.downgrade(&txn).await {
                error!("Downgrade of revision {} failed: {}", revision, e);
                txn.rollback().await?;
                return Err(Self::wrap(revision, e));
            }
            let delete = Query::delete()
                .from_table(Alias::new(VERSION_TABLE))
                .and_where(Expr::col(Alias::new("revision")).eq(revision))
                .to_owned();
            txn.execute(txn.get_database_backend().build(&delete)).await?;
            txn.commit().await?;
            done.push(revision);
        }
        Ok(done)
    }

    async fn load_applied(db: &DatabaseConnection) -> Result<HashSet<String>, DbError> {
        let backend = db.get_database_backend();
        db.execute(Statement::from_string(
            backend,
            format!("CREATE TABLE IF NOT EXISTS {} (revision VARCHAR(64) NOT NULL PRIMARY KEY)", VERSION_TABLE),
        ))
        .await?;
        let rows = db
            .query_all(Statement::from_string(backend, format!("SELECT revision FROM {}", VERSION_TABLE)))
            .await?;
        rows.iter()
            .map(|row| row.try_get::<String>("", "revision").map_err(DbError::from))
            .collect()
    }

    fn wrap(revision: &str, err: DbError) -> DbError {
        match err {
            DbError::MigrationError { .. } => err,
            other => DbError::MigrationError { revision: revision.to_string(), message: other.to_string() },
        }
    }
}

/// Execute a list of raw statements in order
pub(crate) async fn execute_all<C: ConnectionTrait>(conn: &C, statements: &[String]) -> Result<(), DbError> {
    let backend = conn.get_database_backend();
    for stmt in statements {
        conn.execute(Statement::from_string(backend, stmt.clone())).await?;
    }
    Ok(())
}
