use anyhow::Result;
use clap::{Parser, Subcommand};

/// mealdays - weekly meal planner
#[derive(Parser)]
#[command(name = "mealdays")]
#[command(about = "Plan breakfast, lunch and dinner for the days ahead", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Server host address (overrides config file)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run database migrations
    Migrate,
    /// Drop database if exists and recreate with migrations
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = mealdays::Config::load(cli.config)?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    mealdays::observability::init_observability(
        "mealdays",
        env!("CARGO_PKG_VERSION"),
        &config.logging.level,
    )?;

    match cli.command {
        Commands::Serve { host, port } => mealdays::cli::serve(config, host, port).await,
        Commands::Migrate => mealdays::cli::migrate(&config).await,
        Commands::Reset => mealdays::cli::reset(&config).await,
    }
}
