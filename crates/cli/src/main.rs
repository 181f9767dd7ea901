use clap::{Parser, Subcommand};
use ferrous_doh_domain::{CliOverrides, UpstreamPolicy};
use tracing::info;

mod bootstrap;
mod commands;
mod di;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "ferrous-doh")]
#[command(version = "0.1.0")]
#[command(about = "Ferrous DoH - DNS-over-HTTPS forwarder with upstream load balancing")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// Upstream DoH endpoint, repeat for several (replaces the configured list)
    #[arg(short = 'u', long = "upstream", value_name = "URL", global = true)]
    upstreams: Vec<String>,

    /// Selection policy (random, round_robin, sequential)
    #[arg(short = 'p', long, global = true)]
    policy: Option<UpstreamPolicy>,

    /// Per-attempt timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Failures tolerated before an upstream is skipped (0 disables)
    #[arg(long, global = true)]
    max_fails: Option<u32>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a name through the upstream pool
    Query {
        domain: String,

        /// Record type
        #[arg(short = 't', long = "type", default_value = "A")]
        record_type: String,

        /// Number of times to send the query
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u32,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the resolved upstream configuration
    Upstreams {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        upstreams: cli.upstreams,
        policy: cli.policy,
        timeout_ms: cli.timeout_ms,
        max_fails: cli.max_fails,
        log_level: cli.log_level,
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);

    info!("Starting Ferrous DoH v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Query {
            domain,
            record_type,
            count,
            json,
        } => {
            let services = di::DohServices::new(&config)?;
            commands::query::run(services, &domain, &record_type, count, json).await
        }
        Command::Upstreams { json } => commands::upstreams::run(&config, json),
    }
}
