//! onedist CLI - query remote one-dimensional distributions.

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use onedist::{ConfigFile, DistClient, DistributionRef, Operation, QueryValue, Settings};
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "onedist")]
#[command(version)]
#[command(about = "Query one-dimensional distributions hosted by the onedist service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML configuration file (token, version)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// API token (overrides config file and ONEDIST_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// API version (overrides config file)
    #[arg(long, global = true)]
    api_version: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate pdf, cdf or qf at points, or draw samples
    Query {
        /// One of: pdf, cdf, qf, samples (or density, cumulative, quantile, sample)
        operation: String,

        /// Comma-separated points, e.g. -1,0,1 (pdf, cdf, qf)
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        values: Vec<f64>,

        /// Number of samples to draw (samples)
        #[arg(long)]
        size: Option<u64>,

        #[command(flatten)]
        dist: DistArgs,
    },

    /// Create a distribution and print its path
    Create {
        /// Distribution family, e.g. cinterp5_01
        #[arg(short, long)]
        family: String,

        /// Family arguments as JSON
        #[arg(short, long)]
        arguments: String,
    },

    /// Show a distribution's metadata and fit status
    Show {
        /// Distribution path, e.g. /1d/dists/abc
        path: String,
    },
}

/// Which distribution to query.
#[derive(Args)]
struct DistArgs {
    /// Path of an existing distribution
    #[arg(short, long)]
    path: Option<String>,

    /// Family of a distribution to create
    #[arg(short, long)]
    family: Option<String>,

    /// Family arguments as JSON
    #[arg(short, long)]
    arguments: Option<String>,
}

impl DistArgs {
    fn into_ref(self) -> Result<DistributionRef> {
        let arguments = self.arguments.as_deref().map(parse_arguments).transpose()?;
        Ok(DistributionRef::from_parts(self.path, self.family, arguments)?)
    }
}

fn parse_arguments(raw: &str) -> Result<serde_json::Value> {
    serde_json::from_str(raw).with_context(|| format!("--arguments is not valid JSON: {raw}"))
}

fn query_value(operation: Operation, values: Vec<f64>, size: Option<u64>) -> Result<QueryValue> {
    match (operation, size) {
        (Operation::Sample, Some(_)) if !values.is_empty() => {
            bail!("--values does not apply to samples; use --size")
        }
        (Operation::Sample, Some(size)) => Ok(QueryValue::Size(size)),
        (Operation::Sample, None) => bail!("samples requires --size"),
        (_, Some(_)) => bail!("--size only applies to samples; use --values"),
        (_, None) => Ok(QueryValue::Points(values)),
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut config = match &cli.config {
        Some(path) => ConfigFile::from_file(path)
            .with_context(|| format!("Failed to load config from {path:?}"))?,
        None => ConfigFile::default(),
    };
    if let Some(version) = &cli.api_version {
        config.version = Some(version.clone());
    }
    Ok(config.into_settings(cli.token.clone()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let settings = load_settings(&cli)?;
    let client = DistClient::new(settings).context("Failed to create HTTP client")?;
    let settings = client.transport().settings();
    info!(
        base_url = %settings.base_url,
        authenticated = settings.is_authenticated(),
        "Using distribution service"
    );

    match cli.command {
        Commands::Query {
            operation,
            values,
            size,
            dist,
        } => {
            let operation: Operation = operation.parse()?;
            let value = query_value(operation, values, size)?;
            let dist = dist.into_ref()?;

            let results = client
                .query(operation, &value, &dist)
                .await
                .with_context(|| format!("{operation} query failed"))?;
            for r in results {
                println!("{r}");
            }
        }

        Commands::Create { family, arguments } => {
            let arguments = parse_arguments(&arguments)?;
            let path = client
                .create_distribution(&family, &arguments)
                .await
                .context("Failed to create distribution")?;
            println!("{path}");
        }

        Commands::Show { path } => {
            let body = client
                .get_distribution(&path)
                .await
                .with_context(|| format!("Failed to fetch distribution {path}"))?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    Ok(())
}
