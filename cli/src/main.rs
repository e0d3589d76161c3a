mod commands;
mod terminal;

use commands::{CommandLine, Commands, read, run, scan};
use terminal::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging();

    let cfg = commands.settings.to_config()?;

    match commands.command {
        Commands::Run => run::run(cfg).await,
        Commands::Scan => scan::scan(cfg).await,
        Commands::Read => read::read(&cfg).await,
    }
}
