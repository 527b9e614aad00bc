mod cli;
mod title_cmd;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = Cli::parse();

    // RUST_LOG, when set, wins over -v
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .init();
    log::debug!("{cli:?}");

    if let Err(code) = title_cmd::run(&cli) {
        std::process::exit(code);
    }
}
