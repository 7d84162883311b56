use clap::Parser;

use version_relay::config::Cli;
use version_relay::logging::init_logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(&cli.config)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(version_relay::server::run::run_server(cli.config))
}
