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

//! Policy Engine for Measured Boot Attestation
//!
//! This crate provides the capability interface the verifier uses to talk to a Rego
//! policy decision engine, with two implementations:
//!
//! - [`OpaConnector`] talks to an Open Policy Agent server over its REST API
//! - [`RegoEngineConnector`] evaluates policies in-process with `regorus`, keeping
//!   uploaded policies in a registry shared by all of its sessions

mod client;
mod error;
mod opa_client;
mod rego_engine;

pub use client::{MockPolicyEngineClient, MockPolicyEngineConnector, PolicyEngineClient, PolicyEngineConnector};
pub use error::PolicyEngineError;
pub use opa_client::{package_data_path, OpaClient, OpaConnector};
pub use rego_engine::{evaluate_rule, RegoEngineClient, RegoEngineConnector};

/// Rule evaluated by the measured boot verifier
pub const ALLOW_RULE: &str = "allow";
