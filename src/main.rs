use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use whois43::{Config, LookupOptions, WhoisClient};

#[derive(Parser)]
#[command(name = "whois43")]
#[command(about = "WHOIS lookup with normalized JSON output", version)]
struct Cli {
    /// Domain, hostname or IP address to look up
    target: String,

    /// Query this WHOIS host instead of selecting one per TLD
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Query the country NIC at <country>.whois-servers.net
    #[arg(short, long)]
    country: Option<String>,

    /// Quick lookup: do not follow registrar referrals
    #[arg(short = 'Q', long)]
    quick: bool,

    /// Prefer IPv6 when connecting to WHOIS servers
    #[arg(long)]
    prefer_ipv6: bool,

    /// Per-query timeout in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Print the raw reply instead of the normalized record
    #[arg(long)]
    raw: bool,

    /// Use a system whois executable instead of the built-in client
    #[arg(long)]
    command: bool,

    /// Executable to run in --command mode
    #[arg(long, default_value = "whois", requires = "command")]
    executable: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load().context("failed to load configuration")?;
    if cli.prefer_ipv6 {
        config.prefer_ipv6 = true;
    }
    if let Some(seconds) = cli.timeout {
        config.whois_timeout_seconds = seconds;
    }

    let options = LookupOptions {
        server: cli.host.clone(),
        country: cli.country.clone(),
        quick: cli.quick,
        ignore_socket_errors: config.ignore_socket_errors,
        timeout: Duration::from_secs(config.whois_timeout_seconds),
    };
    let client = WhoisClient::with_config(config);

    if cli.raw {
        let text = client
            .lookup_raw(&cli.target, &options)
            .await
            .with_context(|| format!("WHOIS lookup for {} failed", cli.target))?;
        print!("{text}");
        return Ok(());
    }

    let record = if cli.command {
        client
            .lookup_command(&cli.target, &cli.executable, &[])
            .await
    } else {
        client.lookup_with_options(&cli.target, &options).await
    }
    .with_context(|| format!("WHOIS lookup for {} failed", cli.target))?;

    // The raw reply is kept out of the printed record; --raw shows it.
    let mut value = serde_json::to_value(&record)?;
    if let Some(object) = value.as_object_mut() {
        object.remove("raw_text");
    }
    println!("{}", serde_json::to_string_pretty(&value)?);

    Ok(())
}
