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


use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MbRefstateError {
    #[error("Invalid policy name: {0}")]
    InvalidName(String),

    /// The text lacks a package or an allow declaration
    #[error("Invalid measured boot policy: {0}")]
    InvalidPolicy(String),

    #[error("Measured boot policy already exists: {0}")]
    AlreadyExists(String),

    #[error("Measured boot policy not found: {0}")]
    NotFound(String),

    #[error("Database operation error: {0}")]
    DatabaseOperationError(String),
}

impl From<DbErr> for MbRefstateError {
    fn from(err: DbErr) -> Self {
        MbRefstateError::DatabaseOperationError(err.to_string())
    }
}
