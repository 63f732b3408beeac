use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eyre::Result;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

#[derive(Subcommand, Debug)]
enum Command {
    /// List the built-in calculators
    List {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a calculator's markup
    Render {
        /// Calculator id, as shown by `list`
        id: String,
    },
    /// Evaluate a calculator against given field values
    Eval {
        id: String,
        /// Field value, e.g. `--set bmi-bsa-weight=70`; checkbox options take true/false
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        values: Vec<String>,
        /// Display unit of a field, e.g. `--unit bmi-bsa-weight=lbs`
        #[arg(long = "unit", value_name = "FIELD=UNIT")]
        units: Vec<String>,
        /// JSON record bundle used for auto-population
        #[arg(long)]
        record: Option<PathBuf>,
        /// Print the result markup instead of a summary
        #[arg(long)]
        markup: bool,
    },
    /// Report overlapping or out-of-order risk tables
    Lint,
    /// Write the current settings, with defaults filled in, back to disk
    InitSettings,
}

#[derive(Parser, Debug)]
#[command(name = "medcalc")]
#[command(about = "Declarative clinical calculators", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file (defaults to <config dir>/medcalc/settings.json)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if cli.json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let settings = config::load_settings(cli.settings.as_deref())?;

    match cli.command {
        Command::List { json } => commands::list(json),
        Command::Render { id } => commands::render(settings, &id),
        Command::Eval {
            id,
            values,
            units,
            record,
            markup,
        } => {
            commands::eval(
                settings,
                commands::EvalRequest {
                    id,
                    values,
                    units,
                    record,
                    markup,
                },
            )
            .await
        }
        Command::Lint => commands::lint(),
        Command::InitSettings => {
            let path = match cli.settings {
                Some(path) => path,
                None => config::settings_path()?,
            };
            settings.save(&path)?;
            println!("{}", path.display());
            Ok(())
        }
    }
}
