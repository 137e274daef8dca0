//! Rustimate - apartment price prediction form
//!
//! Loads the model artifact once, then serves the prediction form on a local
//! port and opens it in the default browser.
//!
//! # Usage
//! ```sh
//! MODEL_PATH=models/price_model.json cargo run -- --port 8501
//! ```

use anyhow::Result;
use clap::Parser;
use rustimate::application::system::Application;
use rustimate::config::Config;
use rustimate::interfaces::web::run_server;
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the model artifact (overrides MODEL_PATH)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Port to listen on (overrides SERVER_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Address to bind (overrides SERVER_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Do not open the browser after startup
    #[arg(long)]
    no_browser: bool,
}

impl Args {
    fn apply(self, config: &mut Config) {
        if let Some(model) = self.model {
            config.model.model_path = model;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if self.no_browser {
            config.server.open_browser = false;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load environment variables
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("Rustimate {} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = Config::from_env()?;
    args.apply(&mut config);
    info!(
        "Configuration loaded: Model={:?}, Bind={}",
        config.model.model_path,
        config.server.bind_address()
    );

    let open_browser = config.server.open_browser;
    let app = Application::build(config)?;

    run_server(app, open_browser).await
}
