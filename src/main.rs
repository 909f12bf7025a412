use anyhow::Result;
use clap::{Parser, Subcommand};

/// advent - one small seasonal activity a day
#[derive(Parser)]
#[command(name = "advent")]
#[command(about = "Daily advent activities with completion tracking", long_about = None)]
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
    /// Print the date to activity mapping
    Schedule {
        /// First date to print (YYYY-MM-DD), defaults to today
        #[arg(long)]
        from: Option<String>,

        /// Number of days to print
        #[arg(long, default_value_t = 25)]
        days: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = advent::config::Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    advent::observability::init(
        "advent",
        env!("CARGO_PKG_VERSION"),
        &config.observability.log_level,
    )?;

    match cli.command {
        Commands::Serve { host, port } => advent::cli::serve(config, host, port).await,
        Commands::Migrate => advent::cli::migrate(config).await,
        Commands::Reset => advent::cli::reset(config).await,
        Commands::Schedule { from, days } => advent::cli::schedule(config, from, days),
    }
}
