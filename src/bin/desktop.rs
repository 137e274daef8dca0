//! Rustimate Desktop - the prediction form as a native window
//!
//! Same configuration as the web binary; reads `MODEL_PATH` and friends from
//! the environment or a `.env` file.

use anyhow::Result;
use rustimate::application::system::Application;
use rustimate::config::Config;
use rustimate::interfaces::desktop::run_desktop;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

fn main() -> Result<()> {
    // 0. Load Env (before starting anything)
    dotenvy::dotenv().ok();

    // 1. Setup Logging
    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(false) // cleaner
        .pretty();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("Initializing Rustimate Desktop...");

    // 2. Load model and reference prices
    let config = Config::from_env()?;
    let app = Application::build(config)?;

    // 3. Run UI (Blocks Main Thread)
    run_desktop(app)
}
