use std::process::ExitCode;

use clap::Parser;

use forest_router_cli::{run, Cli, RouteTable};
use forest_router_core::logging::{init_logging, LogFormat};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let table = match RouteTable::load(&cli.routes) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(2);
        }
    };

    let directive = cli.log_level.as_deref().unwrap_or(&table.settings.log_level);
    let format = if cli.pretty {
        LogFormat::Pretty
    } else {
        LogFormat::for_settings(&table.settings)
    };
    init_logging(directive, format);

    let mut stdout = std::io::stdout().lock();
    match run(&table, &cli.command, &mut stdout) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
    }
}
