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


//! Measured boot verification
//!
//! Loads and checks measured boot policies and evaluates agent boot logs against them
//! through a [`policy_engine`] session, reporting results as [`Failure`] events.

mod error;
mod failure;
mod mb_evaluator;
mod policy_loader;
mod policy_validator;

pub use error::MbPolicyError;
pub use failure::{Component, Event, Failure};
pub use mb_evaluator::{
    policy_name_for_agent, MeasuredBootEvaluator,
    BOOTLOG_EVALUATION_FAILED, OPA_SERVER_CONNECTION_FAILED, UPLOAD_OPA_POLICY_FAILED,
};
pub use policy_loader::PolicyLoader;
pub use policy_validator::{package_names, policy_is_valid, rewrite_package_name, PackageRewrite};
