use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use ratepad::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for ratepad::AppCommand {
    fn from(cmd: Commands) -> ratepad::AppCommand {
        match cmd {
            Commands::Rates => ratepad::AppCommand::Rates,
            Commands::Convert {
                keys,
                from,
                to,
                offline,
            } => ratepad::AppCommand::Convert {
                keys,
                from,
                to,
                offline,
            },
            Commands::Currencies => ratepad::AppCommand::Currencies,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Refresh and display exchange rates for every supported currency
    Rates,
    /// Evaluate keypad input and convert the result
    Convert {
        /// Keypad input, e.g. "120*3=" or "1500"
        keys: String,
        /// Currency to convert from
        #[arg(short, long)]
        from: Option<String>,
        /// Currency to convert to
        #[arg(short, long)]
        to: Option<String>,
        /// Use saved or built-in rates without fetching
        #[arg(long)]
        offline: bool,
    },
    /// List supported currencies
    Currencies,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => ratepad::cli::setup::setup(),
        Some(cmd) => ratepad::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
