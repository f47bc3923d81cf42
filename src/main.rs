mod cli;

use clap::Parser;
use placesync::config::Config;
use placesync::error::Result;

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // Initialize logger
    env_logger::init();

    if args.version {
        println!("placesync {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let cfg = if let Some(config_path) = &args.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load()
    };

    cli::handle_args(args, cfg)
}
