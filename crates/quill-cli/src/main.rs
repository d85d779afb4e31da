use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::script::ScriptArgs;

#[derive(Parser, Debug)]
#[command(name = "quill", version, about = "Quill audit change-log CLI")]
struct Cli {
    /// Path to quill.yaml. Defaults apply when the file does not exist.
    #[arg(long, short, global = true, env = "QUILL_CONFIG", default_value = "quill.yaml")]
    config: PathBuf,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the configuration file and print the resolved settings.
    Check,

    /// Run one unit of work described in a YAML/JSON change-set file and flush it.
    Replay {
        /// Path to the change-set file
        file: PathBuf,

        /// Stage the batch and print it instead of writing to the sink
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Record one global script execution.
    Script(ScriptArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Check => commands::check::run_check(&cli.config)?,
        Command::Replay { file, dry_run } => {
            commands::replay::run_replay(&cli.config, &file, dry_run).await?
        }
        Command::Script(args) => commands::script::run_script(&cli.config, args).await?,
    }

    Ok(())
}
