use clap::Parser;
use tracing_subscriber::EnvFilter;

use pns_node::cli::{self, Cli};
use pns_node::config::NodeConfig;
use pns_node::format::print_error;

fn main() {
    let cli = Cli::parse();

    let config = match NodeConfig::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            print_error(&e.to_string(), e.hint());
            std::process::exit(1);
        }
    };

    // RUST_LOG wins over the configured level. Logs go to stderr so that
    // --json output stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli::run(cli, config) {
        tracing::debug!(error = ?e, "command failed");
        print_error(&e.to_string(), e.hint());
        std::process::exit(1);
    }
}
