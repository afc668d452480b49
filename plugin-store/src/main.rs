// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

use log::{error, info};
use plugin_store::error::IoContext;
use plugin_store::{CatalogService, Result, config};

async fn inner_main() -> Result<()> {
    let config = config::load()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level.as_str()))
        .init();

    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)
            .io_context(|| format!("Failed to create {}", parent.display()))?;
    }

    info!("Migrating catalog at {}", config.db_path.display());
    let service = CatalogService::new(config);
    service.migrate().await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = inner_main().await {
        error!("{e}");
        eprintln!("plugin-store-migrate: {e}");
        std::process::exit(1);
    }
}
