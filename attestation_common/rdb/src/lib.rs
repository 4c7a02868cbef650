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

//! Database connection management module
//! Provides connection pool management for MySQL, PostgreSQL and SQLite,
//! and the schema migrations of the verifier tables

pub mod config;
pub mod connection;
pub mod error;
pub mod migration;

pub use config::DbConfig;
pub use connection::{connect, get_connection};
pub use error::DbError;
pub use migration::{Migration, Migrator};
