use clap::Parser;
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod cli;
mod core;

use crate::api::IntegrationClient;
use crate::cli::enable::{RunOptions, DEFAULT_MISSING_LABEL};
use crate::core::filter::FilterPolicy;

#[derive(Parser, Debug)]
#[command(name = "adaptive-poll")]
#[command(
    author,
    version,
    about = "Enable adaptive polling for eligible AWSCloudWatch integrations"
)]
struct Cli {
    /// Full domain name (e.g. app.us1.signalfx.com)
    #[arg(value_name = "domainName")]
    domain_name: String,

    /// API token, found on UI in: [My Profile -> Show User API Access Token] OR [Settings -> Access Tokens]
    #[arg(value_name = "apiToken")]
    api_token: String,

    /// Cold poll rate to set
    #[arg(
        long = "coldPollRateMinutes",
        value_name = "minutes",
        default_value = "15",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    cold_poll_rate_minutes: u32,

    /// Include disabled integrations
    #[arg(long = "includeDisabled")]
    include_disabled: bool,

    /// Override cold poll rate for integrations which already have adaptive polling configured
    #[arg(long = "overrideExisting")]
    override_existing: bool,

    /// Placeholder shown for integrations without a cold poll rate
    #[arg(long = "noneLabel", value_name = "text", default_value = DEFAULT_MISSING_LABEL)]
    none_label: String,
}

impl Cli {
    fn run_options(&self) -> RunOptions {
        RunOptions {
            cold_poll_rate_minutes: self.cold_poll_rate_minutes,
            policy: FilterPolicy {
                include_disabled: self.include_disabled,
                override_existing: self.override_existing,
            },
            missing_label: self.none_label.clone(),
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_logging();

    let client = IntegrationClient::new(&args.domain_name, &args.api_token)?;
    let options = args.run_options();

    let mut input = io::stdin().lock();
    let mut output = io::stdout().lock();

    let summary = cli::enable::run(&client, &options, &mut input, &mut output).await?;
    tracing::info!(
        found = summary.found,
        filtered_disabled = summary.filtered_disabled,
        filtered_cold_poll_set = summary.filtered_cold_poll_set,
        filtered_streaming = summary.filtered_streaming,
        candidates = summary.candidates,
        confirmed = summary.confirmed,
        updated = summary.updated,
        all_succeeded = summary.all_succeeded(),
        "Run finished"
    );

    Ok(())
}
