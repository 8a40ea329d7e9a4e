//! HSTS-enforcing fetch tool.
//!
//! ```text
//!     URL ──▶ HstsClient ──▶ HstsLayer ──▶ User-Agent ──▶ ReqwestTransport ──▶ origin
//!                 │              │  ▲                                            │
//!                 │              ▼  │ find / update                              │
//!                 │          MemoryStore ◀── preload (config)                    │
//!                 │                  ▲                                           │
//!                 │                  └──── Strict-Transport-Security ◀───────────┘
//!                 ▼
//!          redirects followed hop by hop
//! ```

use clap::{Parser, Subcommand};
use hyper::Uri;
use std::path::PathBuf;

use hsts_client::config::{load_config, ClientConfig};
use hsts_client::interceptor::upgrade::host_component;
use hsts_client::observability::logging;
use hsts_client::{HstsClient, HstsStore};

#[derive(Parser)]
#[command(name = "hsts-client")]
#[command(about = "Fetch URLs with client-side HSTS enforcement", long_about = None)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the known hosts as JSON when done.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch each URL in order, sharing what was learned between them
    Fetch {
        #[arg(required = true)]
        urls: Vec<Uri>,
    },
    /// Report whether each host is a Known HSTS Host after preloading
    Check {
        #[arg(required = true)]
        hosts: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    logging::init(&config.observability);

    tracing::info!(
        preload = config.preload.len(),
        ignore_insecure_headers = config.policy.ignore_insecure_headers,
        timeout_secs = config.transport.timeout_secs,
        "Configuration loaded"
    );

    let client = HstsClient::from_config(&config)?;

    match cli.command {
        Commands::Fetch { urls } => {
            for url in urls {
                match client.get(url.clone()).await {
                    Ok(fetch) => {
                        for hop in &fetch.hops {
                            let marker = if hop.upgraded() { " (hsts)" } else { "" };
                            println!("{} -> {}{} {}", hop.requested, hop.sent, marker, hop.status);
                        }
                    }
                    Err(e) => {
                        tracing::warn!(url = %url, error = %e, "Fetch failed");
                        eprintln!("{}: {}", url, e);
                    }
                }
            }
        }
        Commands::Check { hosts } => {
            for host in hosts {
                let uri = format!("http://{}/", host).parse::<Uri>().ok();
                let verdict = match uri.as_ref().and_then(host_component) {
                    Some(h) if h.is_ip_literal() => "ip literal, never known".to_string(),
                    Some(h) => match client.store().find(&h.key())? {
                        Some(known) => format!(
                            "known (via {}, include_subdomains={}, permanent={})",
                            known.domain, known.include_subdomains, known.permanent
                        ),
                        None => "not known".to_string(),
                    },
                    None => "invalid host".to_string(),
                };
                println!("{}: {}", host, verdict);
            }
        }
    }

    if cli.json {
        let snapshot: Vec<_> = client
            .store()
            .snapshot()
            .into_iter()
            .map(|(key, host)| serde_json::json!({ "key": key, "record": host }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }

    Ok(())
}
