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
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseTransaction};
use crate::migration::{execute_all, Migration};
use crate::DbError;

/// Creates the `mbrefstates` table holding named measured boot policies
pub struct CreateMbRefstatesTable;

fn create_table_sql(backend: DatabaseBackend) -> String {
    match backend {
        DatabaseBackend::MySql => "CREATE TABLE mbrefstates (\
            id INT NOT NULL AUTO_INCREMENT, \
            name VARCHAR(255) NOT NULL, \
            checksum VARCHAR(128) NULL, \
            mb_refstate LONGTEXT NULL, \
            PRIMARY KEY (id), \
            CONSTRAINT uniq_mbrefstates0name UNIQUE (name)\
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8"
            .to_string(),
        DatabaseBackend::Postgres => "CREATE TABLE mbrefstates (\
            id SERIAL NOT NULL, \
            name VARCHAR(255) NOT NULL, \
            checksum VARCHAR(128), \
            mb_refstate TEXT, \
            PRIMARY KEY (id), \
            CONSTRAINT uniq_mbrefstates0name UNIQUE (name))"
            .to_string(),
        _ => "CREATE TABLE mbrefstates (\
            id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT, \
            name VARCHAR(255) NOT NULL, \
            checksum VARCHAR(128), \
            mb_refstate TEXT, \
            CONSTRAINT uniq_mbrefstates0name UNIQUE (name))"
            .to_string(),
    }
}

#[async_trait]
impl Migration for CreateMbRefstatesTable {
    fn revision(&self) -> &'static str {
        "3be092cd2635"
    }

    fn down_revision(&self) -> Option<&'static str> {
        Some("21b5cb88fcdb")
    }

    async fn upgrade(&self, txn: &DatabaseTransaction) -> Result<(), DbError> {
        execute_all(txn, &[create_table_sql(txn.get_database_backend())]).await
    }

    async fn downgrade(&self, txn: &DatabaseTransaction) -> Result<(), DbError> {
        execute_all(txn, &["DROP TABLE mbrefstates".to_string()]).await
    }
}
