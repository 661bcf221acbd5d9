//! Minimal EDM service. Reads one JSON request per line on stdin and writes
//! one JSON response per line on stdout.
//!
//! Environment:
//! - `EDM_DATA_DIR` - data directory (default `./data`)
//! - `EDM_STORE` - `fs` or `redb` (default `fs`)
//! - `EDM_WORKERS` - worker threads as `high,medium,low` (default `1,2,1`)
//! - `RUST_LOG` - log filter

mod host;

use std::{env, path::PathBuf, sync::Arc};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use edm::ability::AbilityId;
use edm::prelude::*;
use edm::request::{EdmRequest, EdmResponse};
use edm::{AppBuilder, ServiceHandle};
use edm_store_adapter_fs::StoreAdapterFs;
use edm_store_adapter_redb::StoreAdapterRedb;

pub struct Config {
	pub data_dir: PathBuf,
	pub store: String,
	pub workers: (usize, usize, usize),
}

impl Config {
	fn from_env() -> EdmResult<Self> {
		let workers = match env::var("EDM_WORKERS") {
			Ok(counts) => parse_workers(&counts)?,
			Err(_) => (1, 2, 1),
		};
		Ok(Config {
			data_dir: PathBuf::from(env::var("EDM_DATA_DIR").unwrap_or_else(|_| "./data".to_string())),
			store: env::var("EDM_STORE").unwrap_or_else(|_| "fs".to_string()),
			workers,
		})
	}
}

fn parse_workers(value: &str) -> EdmResult<(usize, usize, usize)> {
	let counts = value
		.split(',')
		.map(|n| n.trim().parse::<usize>())
		.collect::<Result<Vec<_>, _>>()
		.map_err(|_| Error::ConfigError(format!("invalid EDM_WORKERS: {}", value)))?;
	match counts.as_slice() {
		[high, med, low] => Ok((*high, *med, *low)),
		_ => Err(Error::ConfigError(format!("EDM_WORKERS needs 3 counts: {}", value))),
	}
}

async fn serve_stdio(handle: ServiceHandle) -> EdmResult<()> {
	let mut lines = BufReader::new(tokio::io::stdin()).lines();
	let mut stdout = tokio::io::stdout();

	while let Some(line) = lines.next_line().await? {
		if line.trim().is_empty() {
			continue;
		}
		let res = match serde_json::from_str::<EdmRequest>(&line) {
			Ok(req) => handle.call(req).await?,
			Err(err) => {
				warn!("Malformed request: {}", err);
				EdmResponse::err(ErrCode::ParamError)
			}
		};
		let mut out = serde_json::to_vec(&res)?;
		out.push(b'\n');
		stdout.write_all(&out).await?;
		stdout.flush().await?;
	}
	Ok(())
}

async fn run() -> EdmResult<()> {
	let config = Config::from_env()?;
	let mut builder = AppBuilder::new();

	match config.store.as_str() {
		"fs" => {
			let store = Arc::new(StoreAdapterFs::new(config.data_dir.clone().into_boxed_path()).await?);
			builder.admin_adapter(store.clone()).policy_adapter(store);
		}
		"redb" => {
			tokio::fs::create_dir_all(&config.data_dir).await?;
			let store = Arc::new(StoreAdapterRedb::new(&config.data_dir.join("edm.db")).await?);
			builder.admin_adapter(store.clone()).policy_adapter(store);
		}
		other => return Err(Error::ConfigError(format!("unknown EDM_STORE: {}", other))),
	}

	let (high, med, low) = config.workers;
	builder
		.workers(high, med, low)
		.ability(AbilityId::BUNDLE_MGR, Arc::new(host::LogAbility::new("bundle_mgr")))
		.ability(AbilityId::ACCOUNT_MGR, Arc::new(host::LogAbility::new("account_mgr")))
		.ability(AbilityId::PRINT_SERVICE, Arc::new(host::LogAbility::new("print_service")))
		.ability(AbilityId::UPDATE_SERVICE, Arc::new(host::LogAbility::new("update_service")))
		.ability(AbilityId::ABILITY_MGR, Arc::new(host::LogAbility::new("ability_mgr")))
		.ability(AbilityId::DEVICE_INFO, Arc::new(host::HostDeviceInfo::from_env()))
		.ability(AbilityId::NET_MGR, Arc::new(host::HostNetwork::from_env()));

	let (_app, handle) = builder.start().await?;

	tokio::select! {
		res = serve_stdio(handle) => res,
		_ = tokio::signal::ctrl_c() => {
			info!("Interrupted, shutting down");
			Ok(())
		}
	}
}

#[tokio::main]
async fn main() {
	if let Err(err) = run().await {
		error!("FATAL: {}", err);
		std::process::exit(1);
	}
}


// vim: ts=4
