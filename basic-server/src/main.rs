use std::{env, sync::Arc};

use restgate::{demo, AppBuilder};
use restgate_core::GateSettings;
use restgate_store_adapter_memory::StoreAdapterMemory;
use restgate_types::error::{Error, RgResult};

pub struct Config {
	pub listen: String,
	pub settings_file: Option<String>,
}

async fn load_settings(config: &Config) -> RgResult<GateSettings> {
	let settings = match &config.settings_file {
		Some(path) => {
			let text = tokio::fs::read_to_string(path)
				.await
				.map_err(|err| Error::ConfigError(format!("cannot read {}: {}", path, err)))?;
			GateSettings::from_yaml(&text)?
		}
		None => GateSettings::default(),
	};
	settings.with_env_overrides()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> RgResult<()> {
	let config = Config {
		listen: env::var("LISTEN").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
		settings_file: env::var("RESTGATE_CONFIG").ok(),
	};

	let mut builder = AppBuilder::new();
	let settings = load_settings(&config).await?;

	let store = Arc::new(StoreAdapterMemory::new());
	demo::seed(store.as_ref()).await?;

	builder.settings(settings).store(store);
	demo::register(&mut builder);
	builder.run(&config.listen).await
}

// vim: ts=4
