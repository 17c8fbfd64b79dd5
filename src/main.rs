use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use riak_http::config::{HttpClientConfigBuilder, HttpClientSettings};
use riak_http::logging::init_logging;
use riak_http::mapreduce::{FilterList, KeyFilter};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Resolve Riak HTTP client settings and render key filters
#[derive(Parser)]
#[command(name = "riakcfg")]
#[command(about = "Resolve Riak HTTP client configuration and key filters", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Settings file (TOML, or YAML for .yml/.yaml)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved client configuration as JSON
    Resolve(ResolveArgs),
    /// Print key filters as a JSON filter list
    Filter {
        /// Filters as operator[:arg[:arg...]], e.g. greater_than_eq:5
        #[arg(required = true)]
        specs: Vec<String>,
    },
}

#[derive(Args)]
struct ResolveArgs {
    /// Full REST URL; overrides scheme, host, port and riak path
    #[arg(long)]
    url: Option<String>,

    #[arg(long)]
    scheme: Option<String>,

    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,

    /// Base Riak resource path
    #[arg(long)]
    riak_path: Option<String>,

    #[arg(long)]
    mapreduce_path: Option<String>,

    /// Connect and read timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    #[arg(long)]
    max_connections: Option<usize>,

    /// Ignore RIAK_* environment variables
    #[arg(long)]
    no_env: bool,
}

impl ResolveArgs {
    /// Whether a URL part is given on the command line without `--url`.
    fn sets_url_parts(&self) -> bool {
        self.url.is_none()
            && (self.scheme.is_some()
                || self.host.is_some()
                || self.port.is_some()
                || self.riak_path.is_some())
    }

    fn apply(&self, mut builder: HttpClientConfigBuilder) -> HttpClientConfigBuilder {
        if let Some(url) = &self.url {
            builder = builder.with_url(url.clone());
        }
        if let Some(scheme) = &self.scheme {
            builder = builder.with_scheme(scheme.clone());
        }
        if let Some(host) = &self.host {
            builder = builder.with_host(host.clone());
        }
        if let Some(port) = self.port {
            builder = builder.with_port(port);
        }
        if let Some(path) = &self.riak_path {
            builder = builder.with_riak_path(path.clone());
        }
        if let Some(path) = &self.mapreduce_path {
            builder = builder.with_mapreduce_path(path.clone());
        }
        if let Some(millis) = self.timeout_ms {
            builder = builder.with_timeout(Duration::from_millis(millis));
        }
        if let Some(max) = self.max_connections {
            builder = builder.with_max_connections(max);
        }
        builder
    }
}

fn run_resolve(config: Option<PathBuf>, args: ResolveArgs) -> Result<()> {
    let mut settings = match &config {
        Some(path) => HttpClientSettings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => HttpClientSettings::default(),
    };

    if !args.no_env {
        settings
            .merge_env()
            .context("Invalid RIAK_* environment variable")?;
    }
    if args.sets_url_parts() {
        settings
            .split_url()
            .context("Invalid url in settings")?;
    }
    debug!("Effective settings: {:?}", settings);

    let builder = args.apply(settings.apply(HttpClientConfigBuilder::new()));
    let config = builder.build().context("Invalid client configuration")?;

    println!("{}", serde_json::to_string_pretty(&config.summary())?);
    Ok(())
}

fn run_filter(specs: Vec<String>) -> Result<()> {
    let filters = specs
        .iter()
        .map(|spec| {
            spec.parse::<KeyFilter>()
                .with_context(|| format!("Cannot parse filter {spec:?}"))
        })
        .collect::<Result<FilterList>>()?;

    debug!("Parsed {} key filter(s)", filters.len());
    println!("{}", serde_json::to_string(&filters)?);
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Resolve(args) => run_resolve(cli.config, args),
        Commands::Filter { specs } => run_filter(specs),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
