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


mod commands;
mod entities;
mod error;

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use clap::{Parser, Subcommand};
use config_manager::{MbVerifierConfig, MB_VERIFIER_CONFIG};
use log::{error, info};
use mb_refstate::MbRefstateRepository;
use policy_engine::{OpaConnector, PolicyEngineConnector, RegoEngineConnector};
use rdb::{get_connection, Migrator};
use serde_json::Value;
use tpm_boot_verifier::{policy_is_valid, policy_name_for_agent, MeasuredBootEvaluator, PolicyLoader};

use crate::commands::{DbCommands, MbPolicyCommands, RefstateCommands};
use crate::entities::EngineKind;
use crate::error::CliError;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Verifier configuration file (YAML)
    #[clap(short, long)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    group: CommandGroup,
}

#[derive(Subcommand)]
enum CommandGroup {
    /// Measured boot policy checks and evaluation
    MbPolicy {
        #[clap(subcommand)]
        command: MbPolicyCommands,
    },

    /// Stored measured boot policies
    Refstate {
        #[clap(subcommand)]
        command: RefstateCommands,
    },

    /// Database schema management
    Db {
        #[clap(subcommand)]
        command: DbCommands,
    },
}

fn load_config(path: Option<&Path>) -> Result<MbVerifierConfig, CliError> {
    match path {
        Some(path) => {
            MB_VERIFIER_CONFIG.initialize(path)?;
            Ok(MB_VERIFIER_CONFIG.get_instance()?.clone())
        },
        None => Ok(MbVerifierConfig::default()),
    }
}

fn init_logging(config: &MbVerifierConfig) {
    let result = match &config.logging.file {
        Some(file) => common_log::init_with_yaml(file),
        None => common_log::init_console(&config.logging.level),
    };
    if let Err(e) = result {
        eprintln!("warning: logging is not initialized: {}", e);
    }
}

fn read_policy_file(path: &Path) -> Result<String, CliError> {
    Ok(PolicyLoader::new(None).load(Some(path))?)
}

fn read_measurement_data(path: &Path) -> Result<Value, CliError> {
    let content =
        fs::read_to_string(path).map_err(|e| CliError::Input(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&content).map_err(|e| CliError::Input(format!("{}: {}", path.display(), e)))
}

async fn deal_mb_policy_commands(command: MbPolicyCommands, config: &MbVerifierConfig) -> Result<bool, CliError> {
    let loader = PolicyLoader::from_config(&config.tenant);
    match command {
        MbPolicyCommands::Validate { policy } => {
            let text = loader.load(policy.as_deref())?;
            let valid = policy_is_valid(Some(text.as_str()));
            println!("{}", if valid { "valid" } else { "invalid: missing package or allow declaration" });
            Ok(valid)
        },
        MbPolicyCommands::Name { agent_id } => {
            println!("{}", policy_name_for_agent(&agent_id));
            Ok(true)
        },
        MbPolicyCommands::Evaluate { policy, input, agent_id, attestation_count, pcrs, engine } => {
            if engine == EngineKind::Local && attestation_count > 0 {
                return Err(CliError::Input(
                    "the local engine registers policies only for this run; use --attestation-count 0".to_string(),
                ));
            }
            let refstate = loader.load(policy.as_deref())?;
            let measurement_data = read_measurement_data(&input)?;
            let pcrs_in_quote: BTreeSet<u32> = pcrs.into_iter().collect();

            let connector: Box<dyn PolicyEngineConnector> = match engine {
                EngineKind::Opa => Box::new(OpaConnector),
                EngineKind::Local => Box::new(RegoEngineConnector::new()),
            };
            let evaluator = MeasuredBootEvaluator::new(config.verifier.opa_server(), connector);
            let failure = evaluator
                .evaluate(Some(refstate.as_str()), Some(&measurement_data), &pcrs_in_quote, &agent_id, attestation_count)
                .await;

            let report = serde_json::to_string_pretty(&failure).map_err(|e| CliError::Input(e.to_string()))?;
            println!("{}", report);
            Ok(!failure.has_fatal())
        },
    }
}

async fn deal_refstate_commands(command: RefstateCommands) -> Result<bool, CliError> {
    let connection = get_connection().await?;
    let db = connection.as_ref();
    match command {
        RefstateCommands::Add { name, policy } => {
            let refstate = read_policy_file(&policy)?;
            let model = MbRefstateRepository::add(db, &name, &refstate).await?;
            println!("stored {} (id {}, checksum {})", model.name, model.id, model.checksum.unwrap_or_default());
        },
        RefstateCommands::Show { name } => match MbRefstateRepository::get_by_name(db, &name).await? {
            Some(model) => {
                println!("name: {}", model.name);
                println!("checksum: {}", model.checksum.unwrap_or_default());
                println!("{}", model.mb_refstate.unwrap_or_default());
            },
            None => {
                println!("measured boot policy {} not found", name);
                return Ok(false);
            },
        },
        RefstateCommands::Update { name, policy } => {
            let refstate = read_policy_file(&policy)?;
            let model = MbRefstateRepository::update(db, &name, &refstate).await?;
            println!("updated {} (checksum {})", model.name, model.checksum.unwrap_or_default());
        },
        RefstateCommands::Delete { name } => {
            MbRefstateRepository::delete_by_name(db, &name).await?;
            println!("deleted {}", name);
        },
        RefstateCommands::List => {
            for model in MbRefstateRepository::list(db).await? {
                println!("{}\t{}", model.name, model.checksum.unwrap_or_default());
            }
        },
    }
    Ok(true)
}

async fn deal_db_commands(command: DbCommands) -> Result<bool, CliError> {
    let connection = get_connection().await?;
    let db = connection.as_ref();
    let migrator = Migrator::mb_refstates();
    match command {
        DbCommands::Upgrade => {
            let applied = migrator.upgrade(db).await?;
            info!("Applied revisions: {:?}", applied);
            println!("applied: {}", applied.join(", "));
        },
        DbCommands::Downgrade { steps } => {
            let reverted = migrator.downgrade(db, steps).await?;
            info!("Reverted revisions: {:?}", reverted);
            println!("reverted: {}", reverted.join(", "));
        },
        DbCommands::Current => {
            println!("{}", migrator.current_revision(db).await?.unwrap_or("base"));
        },
    }
    Ok(true)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        },
    };
    init_logging(&config);

    let result = match cli.group {
        CommandGroup::MbPolicy { command } => deal_mb_policy_commands(command, &config).await,
        CommandGroup::Refstate { command } => deal_refstate_commands(command).await,
        CommandGroup::Db { command } => deal_db_commands(command).await,
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        },
    }
}
