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


use log::{error, info};
use openssl::sha::sha256;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder,
};
use tpm_boot_verifier::policy_is_valid;
use crate::entities::mb_refstate_db_model::{ActiveModel, Column, Entity as MbRefstateEntity, Model};
use crate::error::MbRefstateError;

/// Maximum length of the `name` column
const MAX_NAME_LEN: usize = 255;

/// Hex encoded sha256 digest of a policy text
pub fn policy_checksum(refstate: &str) -> String {
    hex::encode(sha256(refstate.as_bytes()))
}

pub struct MbRefstateRepository;

impl MbRefstateRepository {
    /// Stores a new named policy together with its checksum.
    ///
    /// # Errors
    /// * `InvalidName` - empty or longer than 255 characters
    /// * `InvalidPolicy` - the text has no package or no allow declaration
    /// * `AlreadyExists` - a policy with this name is already stored
    /// * `DatabaseOperationError` - the insert failed
    pub async fn add<C: ConnectionTrait>(db: &C, name: &str, refstate: &str) -> Result<Model, MbRefstateError> {
        Self::check_name(name)?;
        Self::check_policy(name, refstate)?;

        if Self::get_by_name(db, name).await?.is_some() {
            return Err(MbRefstateError::AlreadyExists(name.to_string()));
        }

        let model = ActiveModel {
            name: Set(name.to_string()),
            checksum: Set(Some(policy_checksum(refstate))),
            mb_refstate: Set(Some(refstate.to_string())),
            ..Default::default()
        };
        let model = model.insert(db).await.map_err(|e| {
            error!("Failed to insert measured boot policy {}: {}", name, e);
            MbRefstateError::from(e)
        })?;
        info!("Stored measured boot policy {} (id {})", name, model.id);
        Ok(model)
    }

    pub async fn get_by_name<C: ConnectionTrait>(db: &C, name: &str) -> Result<Option<Model>, MbRefstateError> {
        let model = MbRefstateEntity::find().filter(Column::Name.eq(name)).one(db).await?;
        Ok(model)
    }

    pub async fn list<C: ConnectionTrait>(db: &C) -> Result<Vec<Model>, MbRefstateError> {
        let models = MbRefstateEntity::find().order_by_asc(Column::Name).all(db).await?;
        Ok(models)
    }

    /// Replaces the text of an existing policy and recomputes its checksum
    pub async fn update<C: ConnectionTrait>(db: &C, name: &str, refstate: &str) -> Result<Model, MbRefstateError> {
        Self::check_policy(name, refstate)?;

        let existing = Self::get_by_name(db, name)
            .await?
            .ok_or_else(|| MbRefstateError::NotFound(name.to_string()))?;
        let mut model = existing.into_active_model();
        model.checksum = Set(Some(policy_checksum(refstate)));
        model.mb_refstate = Set(Some(refstate.to_string()));

        let model = model.update(db).await?;
        info!("Updated measured boot policy {}", name);
        Ok(model)
    }

    pub async fn delete_by_name<C: ConnectionTrait>(db: &C, name: &str) -> Result<(), MbRefstateError> {
        let result = MbRefstateEntity::delete_many().filter(Column::Name.eq(name)).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(MbRefstateError::NotFound(name.to_string()));
        }
        info!("Deleted measured boot policy {}", name);
        Ok(())
    }

    fn check_name(name: &str) -> Result<(), MbRefstateError> {
        if name.trim().is_empty() {
            return Err(MbRefstateError::InvalidName("name cannot be empty".to_string()));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(MbRefstateError::InvalidName(format!("name exceeds {} characters", MAX_NAME_LEN)));
        }
        Ok(())
    }

    fn check_policy(name: &str, refstate: &str) -> Result<(), MbRefstateError> {
        if !policy_is_valid(Some(refstate)) {
            error!("Rejected measured boot policy {}: no package or allow declaration", name);
            return Err(MbRefstateError::InvalidPolicy(format!(
                "{} must declare a package and an allow rule",
                name
            )));
        }
        Ok(())
    }
}
