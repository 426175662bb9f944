//! Binary entry point: bootstrap the local database, then hand the terminal
//! to the screen until the user quits.
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use coal_mine_orders::logging::init_logging;
use coal_mine_orders::{run_app, App, AppConfig, Database};

#[derive(Parser)]
#[command(name = "coal-mine")]
#[command(about = "Field work orders for coal mine devices")]
struct Cli {
    /// SQLite database file
    #[arg(long = "db", env = "COAL_MINE_DB", global = true)]
    db_path: Option<PathBuf>,

    /// File that receives log output
    #[arg(long, env = "COAL_MINE_LOG", global = true)]
    log_file: Option<PathBuf>,

    /// Profile endpoint requested when the screen opens
    #[arg(long, env = "COAL_MINE_PROFILE_URL", global = true)]
    profile_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or migrate the database schema, then exit
    Init,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::resolve(cli.db_path, cli.log_file, cli.profile_url)?;
    init_logging(&config.log_path)?;

    match cli.command {
        Some(Commands::Init) => {
            let db = Database::bootstrap(&config.db_path)?;
            let version = db.schema_version()?;
            println!(
                "{} is at schema version {version}",
                config.db_path.display()
            );
            db.close();
        }
        None => {
            let mut app = App::new(Some(config.profile_url.clone()));

            let db = app.attach_database(Database::bootstrap(&config.db_path));

            let result = run_app(&mut app);
            if let Some(db) = db {
                db.close();
            }
            result?;
        }
    }

    Ok(())
}
