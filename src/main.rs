use std::sync::Arc;

use folder_server::assets::CachedAssets;
use folder_server::config::{self, AppState, Config};
use folder_server::logger;
use folder_server::server::{self, Server, Shutdown};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional first argument: config file path (without extension)
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Create the Tokio runtime, thread count from `server.workers`
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers.max(1));
        logger::log_info(&format!("[CONFIG] Using {workers} worker threads"));
    } else {
        logger::log_info("[CONFIG] Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    logger::log_config(&cfg.render());

    let root = cfg.root_path()?;
    let assets = CachedAssets::load_default(&cfg.assets.dir, &cfg.assets.icon_name)?;
    let shutdown = Shutdown::new();
    server::start_signal_handler(shutdown.clone())?;

    let state = Arc::new(AppState::new(cfg, root, assets, shutdown));
    let server = Server::bind(Arc::clone(&state))?;

    logger::log_server_start(&server.local_addr()?, &state.config, &state.root);
    server.run().await;
    Ok(())
}
