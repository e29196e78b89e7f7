//! csv-depot - Entry Point
//!
//! Accepts plain-text CSV uploads into a repository directory and serves
//! listings and tabular previews over a line-based TCP protocol.

use log::{error, info};

use csv_depot::{DepotConfig, Server};

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    info!("Launching csv-depot...");

    let config = match DepotConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let server = match Server::new(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Startup failed: {}", e);
            std::process::exit(1);
        }
    };

    server.start().await;
}
