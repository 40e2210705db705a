use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use reqwest::Url;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "svc-probe")]
#[command(about = "Probe a running lookup-service (usable as a container health check)", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:50001")]
    url: String,

    /// Request timeout in milliseconds.
    #[arg(short, long, default_value_t = 2000)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Call the liveness probe
    Live,
    /// Call the readiness probe
    Ready,
    /// Look up a resource by ID
    Lookup { id: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(cli.timeout_ms))
        .build()?;

    let url = endpoint_url(&cli.url, &cli.command)?;
    let res = client.get(url).send().await?;
    print_response(res).await
}

/// Resolve the endpoint for `command` under `base`.
///
/// The lookup ID is appended as a single percent-encoded path segment, so
/// `/`, `?`, `%` and spaces reach the service as part of the identifier.
fn endpoint_url(base: &str, command: &Commands) -> Result<Url, Box<dyn std::error::Error>> {
    let mut url = Url::parse(base)?;
    let segment = match command {
        Commands::Live => "live",
        Commands::Ready => "ready",
        Commands::Lookup { id } => id.as_str(),
    };

    url.path_segments_mut()
        .map_err(|_| format!("base URL cannot carry a path: {}", base))?
        .pop_if_empty()
        .push(segment);
    Ok(url)
}

/// Print the response and report whether it was a success.
async fn print_response(res: reqwest::Response) -> Result<bool, Box<dyn std::error::Error>> {
    let status = res.status();
    let body = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
    } else {
        println!("{}", status);
    }

    if !body.is_empty() {
        match serde_json::from_str::<Value>(&body) {
            Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
            Err(_) => println!("{}", body),
        }
    }

    Ok(status.is_success())
}
