use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ortomat::cli::{format_status, handle_backup_command, BackupCommands};
use ortomat::config::{paths::OrtomatPaths, settings::Settings};
use ortomat::storage::Store;

#[derive(Parser)]
#[command(
    name = "ortomat",
    version,
    about = "Backup and restore for the Ortomat vending-machine store",
    long_about = "Exports every entity of the Ortomat data store to a versioned \
                  JSON snapshot and restores the store from one. Restores replace \
                  ALL data and reset every account to a temporary password."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Backup management commands
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Show record counts for every entity kind
    Status,

    /// Show current configuration and paths
    Config,
}

fn init_tracing(verbose: u8, settings: &Settings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match verbose {
            0 => settings.log_filter.as_str(),
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        EnvFilter::new(level)
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = OrtomatPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    init_tracing(cli.verbose, &settings);

    // Initialize storage
    let store = Store::open(paths.clone())?;

    match cli.command {
        Some(Commands::Backup(cmd)) => {
            handle_backup_command(&store, &paths, &settings, cmd)?;
        }
        Some(Commands::Status) => {
            print!("{}", format_status(&store)?);
        }
        Some(Commands::Config) => {
            println!("Ortomat Configuration");
            println!("=====================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Backup directory: {}", paths.backup_dir().display());
            println!("Audit journal:    {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Log filter:             {}", settings.log_filter);
            println!(
                "  Activity log limit:     {}",
                settings.backup.activity_log_limit
            );
            println!(
                "  Pre-restore backup:     {}",
                settings.backup.pre_restore_backup
            );
            println!(
                "  Argon2 memory/time/par: {}/{}/{}",
                settings.hashing.memory_cost,
                settings.hashing.time_cost,
                settings.hashing.parallelism
            );
        }
        None => {
            println!("Ortomat - backup and restore for the vending-machine store");
            println!();
            println!("Run 'ortomat --help' for usage information.");
            println!("Run 'ortomat backup export' to create a snapshot.");
        }
    }

    Ok(())
}
