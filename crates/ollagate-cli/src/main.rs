//! CLI entry point - the composition root.

use clap::Parser;

use ollagate_cli::{Cli, init_tracing, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before parsing so PROXY_* values from it apply
    dotenvy::dotenv().ok();

    let config = Cli::parse().into_config();
    init_tracing(&config.log_level);

    run(config).await
}
