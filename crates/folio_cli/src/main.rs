//! CLI inspection entry point.
//!
//! # Responsibility
//! - Verify `folio_core` wiring against a real database file.
//! - Print per-collection record counts or one user's portfolio as JSON.
//!
//! Usage: `folio_cli` or `folio_cli portfolio <user_id>`.

use folio_core::db::{close_db, open_db};
use folio_core::{flush_logging, init_logging, CoreConfig, PortfolioService, ServiceRegistry};
use log::error;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let code = match run(std::env::args().skip(1).collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={}", err);
            eprintln!("folio_cli: {err}");
            ExitCode::FAILURE
        }
    };
    flush_logging();
    code
}

fn run(args: Vec<String>) -> Result<(), Box<dyn Error>> {
    let config = CoreConfig::from_env()?;
    init_logging(&config.log_level, &config.log_dir)?;
    config.log_loaded();

    let conn = open_db(&config.db_path)?;
    {
        let registry = ServiceRegistry::new(&conn)?;
        match args.as_slice() {
            [] => print_summary(&registry)?,
            [command, user_id] if command == "portfolio" => {
                let portfolio = PortfolioService::new(&registry).load(user_id)?;
                println!("{}", serde_json::to_string_pretty(&portfolio)?);
            }
            _ => return Err("usage: folio_cli [portfolio <user_id>]".into()),
        }
    }
    close_db(conn)?;
    Ok(())
}

fn print_summary(registry: &ServiceRegistry<'_>) -> Result<(), Box<dyn Error>> {
    println!("folio_core ping={}", folio_core::ping());
    println!("folio_core version={}", folio_core::core_version());
    for service in registry.services() {
        let kind = service.kind();
        println!("{} records={}", kind.collection, service.get_all(None)?.len());
    }
    Ok(())
}
