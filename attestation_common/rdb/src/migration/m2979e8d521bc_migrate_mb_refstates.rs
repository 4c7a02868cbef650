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

use async_trait::async_trait;
use log::info;
use sea_orm::sea_query::{Alias, Expr, Query};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseTransaction, Statement};
use crate::migration::{execute_all, Migration};
use crate::DbError;

/// Moves the inline `verifiermain.mb_refstate` column into `mbrefstates` rows
/// named after the agent, referenced through `verifiermain.mb_refstate_id`
pub struct MigrateMbRefstates;

const FOREIGN_KEY: &str = "fk_verifiermain_mbrefstates";

fn add_reference_column_sql(backend: DatabaseBackend) -> Vec<String> {
    match backend {
        DatabaseBackend::MySql => vec![format!(
            "ALTER TABLE verifiermain ADD COLUMN mb_refstate_id INT NULL, \
             ADD CONSTRAINT {} FOREIGN KEY (mb_refstate_id) REFERENCES mbrefstates (id)",
            FOREIGN_KEY
        )],
        DatabaseBackend::Postgres => vec![format!(
            "ALTER TABLE verifiermain ADD COLUMN mb_refstate_id INTEGER \
             CONSTRAINT {} REFERENCES mbrefstates (id)",
            FOREIGN_KEY
        )],
        // sqlite cannot drop a column that takes part in a foreign key
        _ => vec!["ALTER TABLE verifiermain ADD COLUMN mb_refstate_id INTEGER".to_string()],
    }
}

fn drop_reference_column_sql(backend: DatabaseBackend) -> Vec<String> {
    let mut statements = Vec::new();
    if backend == DatabaseBackend::MySql {
        statements.push(format!("ALTER TABLE verifiermain DROP FOREIGN KEY {}", FOREIGN_KEY));
    }
    statements.push("ALTER TABLE verifiermain DROP COLUMN mb_refstate_id".to_string());
    statements
}

fn add_inline_column_sql(backend: DatabaseBackend) -> String {
    let column_type = match backend {
        DatabaseBackend::MySql => "LONGTEXT NULL",
        _ => "TEXT",
    };
    format!("ALTER TABLE verifiermain ADD COLUMN mb_refstate {}", column_type)
}

#[async_trait]
impl Migration for MigrateMbRefstates {
    fn revision(&self) -> &'static str {
        "2979e8d521bc"
    }

    fn down_revision(&self) -> Option<&'static str> {
        Some("3be092cd2635")
    }

    async fn upgrade(&self, txn: &DatabaseTransaction) -> Result<(), DbError> {
        let backend = txn.get_database_backend();
        let rows = txn
            .query_all(Statement::from_string(backend, "SELECT agent_id, mb_refstate FROM verifiermain".to_string()))
            .await?;
        info!("Moving {} inline measured boot policies to mbrefstates", rows.len());

        for row in &rows {
            let agent_id: String = row.try_get("", "agent_id")?;
            let mb_refstate: Option<String> = row.try_get("", "mb_refstate")?;
            let mut insert = Query::insert();
            insert
                .into_table(Alias::new("mbrefstates"))
                .columns([Alias::new("name"), Alias::new("mb_refstate")])
                .values([agent_id.into(), mb_refstate.into()])
                .map_err(|e| DbError::Other(e.to_string()))?;
            txn.execute(backend.build(&insert)).await?;
        }

        let mut statements = add_reference_column_sql(backend);
        statements.push("ALTER TABLE verifiermain DROP COLUMN mb_refstate".to_string());
        statements.push(
            "UPDATE verifiermain SET mb_refstate_id = \
             (SELECT mbrefstates.id FROM mbrefstates WHERE mbrefstates.name = verifiermain.agent_id)"
                .to_string(),
        );
        execute_all(txn, &statements).await
    }

    async fn downgrade(&self, txn: &DatabaseTransaction) -> Result<(), DbError> {
        let backend = txn.get_database_backend();
        let rows = txn
            .query_all(Statement::from_string(backend, "SELECT name, mb_refstate FROM mbrefstates".to_string()))
            .await?;

        execute_all(txn, &[add_inline_column_sql(backend)]).await?;

        for row in &rows {
            let name: String = row.try_get("", "name")?;
            let mb_refstate: Option<String> = row.try_get("", "mb_refstate")?;
            let update = Query::update()
                .table(Alias::new("verifiermain"))
                .value(Alias::new("mb_refstate"), mb_refstate)
                .and_where(Expr::col(Alias::new("agent_id")).eq(name.clone()))
                .to_owned();
            txn.execute(backend.build(&update)).await?;
        }

        // the reference column goes before its rows so the foreign key never dangles
        execute_all(txn, &drop_reference_column_sql(backend)).await?;
        for row in &rows {
            let name: String = row.try_get("", "name")?;
            let delete = Query::delete()
                .from_table(Alias::new("mbrefstates"))
                .and_where(Expr::col(Alias::new("name")).eq(name))
                .to_owned();
            txn.execute(backend.build(&delete)).await?;
        }
        info!("Moved {} measured boot policies back to verifiermain", rows.len());
        Ok(())
    }
}
