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


use std::path::PathBuf;
use clap::Subcommand;
use crate::entities::EngineKind;

#[derive(Subcommand)]
pub enum MbPolicyCommands {
    /// Check that a policy declares a package and an allow rule
    Validate {
        /// Policy file, default tenant.mb_refstate
        #[clap(short, long)]
        policy: Option<PathBuf>,
    },

    /// Print the policy name used for an agent
    Name {
        /// Agent id
        #[clap(short, long, required = true)]
        agent_id: String,
    },

    /// Evaluate a boot log against a policy
    Evaluate {
        /// Policy file, default tenant.mb_refstate
        #[clap(short, long)]
        policy: Option<PathBuf>,

        /// Boot log (measurement data) JSON file
        #[clap(short, long, required = true)]
        input: PathBuf,

        /// Agent id
        #[clap(short, long, required = true)]
        agent_id: String,

        /// Number of previous attestations; 0 uploads the policy
        #[clap(long, default_value_t = 0)]
        attestation_count: u64,

        /// PCR indexes present in the quote
        #[clap(long, value_delimiter = ',')]
        pcrs: Vec<u32>,

        /// Policy engine; the local engine only keeps policies for this run and requires attestation count 0
        #[clap(short, long, value_enum, default_value_t = EngineKind::Opa)]
        engine: EngineKind,
    },
}

#[derive(Subcommand)]
pub enum RefstateCommands {
    /// Store a named policy
    Add {
        #[clap(short, long, required = true)]
        name: String,

        /// Policy file
        #[clap(short, long, required = true)]
        policy: PathBuf,
    },

    /// Print a stored policy
    Show {
        #[clap(short, long, required = true)]
        name: String,
    },

    /// Replace the text of a stored policy
    Update {
        #[clap(short, long, required = true)]
        name: String,

        /// Policy file
        #[clap(short, long, required = true)]
        policy: PathBuf,
    },

    /// Delete a stored policy
    Delete {
        #[clap(short, long, required = true)]
        name: String,
    },

    /// List stored policies
    List,
}

#[derive(Subcommand)]
pub enum DbCommands {
    /// Apply pending schema revisions
    Upgrade,

    /// Revert applied schema revisions
    Downgrade {
        /// Number of revisions to revert
        #[clap(long, default_value_t = 1)]
        steps: usize,
    },

    /// Print the current schema revision
    Current,
}
