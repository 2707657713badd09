//! Frey
//!
//! Command-line stub resolver: plain queries plus DNSLink and dnsaddr
//! discovery over TXT records.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use console::style;
use frey_config::Config;
use frey_config::resolver::parse_server;
use frey_metrics::metrics;
use frey_metrics::tracing_setup::init_tracing;
use frey_proto::{Message, Type};
use frey_resolver::Resolver;
use serde::Serialize;
use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{Level, debug};

/// Frey - DNS stub resolver for DNSLink and multiaddr discovery
#[derive(Parser, Debug)]
#[command(name = "frey")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, value_name = "FILE", env = "FREY_CONFIG")]
    config: Option<PathBuf>,

    /// Server to query (IP with optional port); repeat to try several in order
    #[arg(short, long = "server", global = true, value_name = "ADDR")]
    servers: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Print client counters to stderr when done
    #[arg(long, global = true)]
    stats: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Query a name and print the full response
    Query {
        /// Name to look up
        name: String,

        /// Record type (A, AAAA, TXT, ... or TYPEnnn)
        #[arg(short = 't', long = "type", default_value = "A")]
        rtype: String,
    },

    /// Print the TXT records of a name
    Txt {
        /// Name to look up
        host: String,
    },

    /// Resolve the DNSLink path of a domain
    Dnslink {
        /// Domain publishing `_dnslink` records
        host: String,
    },

    /// Resolve the multiaddrs of a domain
    Dnsaddr {
        /// Domain publishing `_dnsaddr` records
        host: String,
    },

    /// Validate configuration file
    Validate {
        /// Show detailed validation output
        #[arg(short, long)]
        verbose: bool,
    },
}

/// Find the configuration file in standard locations
fn find_config_file(explicit_path: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path);
    }

    [
        "./frey.yaml",
        "./frey.yml",
        "./frey.toml",
        "./frey.json",
        "/etc/frey/frey.yaml",
    ]
    .into_iter()
    .map(PathBuf::from)
    .find(|path| path.exists())
}

fn load_config(explicit_path: Option<PathBuf>) -> Result<Config> {
    match find_config_file(explicit_path) {
        Some(path) => Config::from_file(&path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Initialize logging; the CLI level wins over the file.
fn init_logging(config: &Config, cli_level: Option<&str>) -> Result<()> {
    let mut log_config = config
        .logging
        .to_log_config()
        .context("Invalid logging configuration")?;

    if let Some(level) = cli_level {
        log_config.level = level
            .parse::<Level>()
            .with_context(|| format!("Invalid log level '{level}'"))?;
    }

    init_tracing(&log_config).context("Failed to initialize logging")
}

/// Builds resolver settings from the file, with `--server` overriding the
/// configured list.
fn resolver_config(config: Config, servers: &[String]) -> Result<frey_resolver::ResolverConfig> {
    let mut resolver = config
        .into_resolver_config()
        .context("Invalid configuration")?;

    if !servers.is_empty() {
        resolver.servers = servers
            .iter()
            .map(|s| parse_server(s))
            .collect::<frey_config::Result<Vec<SocketAddr>>>()?;
    }

    debug!(servers = ?resolver.servers, "resolver configured");
    Ok(resolver)
}

/// JSON form of a query response.
#[derive(Debug, Serialize)]
struct QueryOutput {
    id: u16,
    rcode: String,
    recursion_available: bool,
    answers: Vec<String>,
    authority: Vec<String>,
}

impl From<&Message> for QueryOutput {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id(),
            rcode: message.response_code().to_string(),
            recursion_available: message.recursion_available(),
            answers: message.answers().iter().map(ToString::to_string).collect(),
            authority: message.authority().iter().map(ToString::to_string).collect(),
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_set(title: &str, values: &BTreeSet<String>, json: bool) -> Result<()> {
    if json {
        return print_json(values);
    }

    if values.is_empty() {
        eprintln!("{}", style(format!("No {title} found")).yellow());
    }
    for value in values {
        println!("{value}");
    }
    Ok(())
}

async fn run_query(resolver: &Resolver, name: &str, rtype: &str, json: bool) -> Result<()> {
    let rtype: Type = rtype
        .parse()
        .with_context(|| format!("Unknown record type '{rtype}'"))?;
    let response = resolver
        .query(name, rtype)
        .await
        .with_context(|| format!("Query for {name} {rtype} failed"))?;

    if json {
        return print_json(&QueryOutput::from(&response));
    }

    println!("{response}");
    Ok(())
}

/// Validate configuration file
fn validate_config(path: Option<PathBuf>, verbose: bool) -> Result<()> {
    let config_path = find_config_file(path).context("No configuration file found")?;

    println!("Validating configuration: {}", config_path.display());

    let config = Config::from_file(&config_path).with_context(|| {
        format!(
            "Failed to load configuration from {}",
            config_path.display()
        )
    })?;

    if verbose {
        println!("\n{}", style("Configuration loaded:").green().bold());
        println!("  Servers: {}", config.resolver.servers.join(", "));
        println!("  Timeout: {} ms", config.resolver.timeout_ms);
        println!("  EDNS payload size: {}", config.resolver.udp_payload_size);
        println!("  TCP fallback: {}", config.resolver.tcp_fallback);
        println!("  Cache capacity: {}", config.cache.capacity);
        println!(
            "  Logging: {} ({})",
            config.logging.level, config.logging.format
        );
    }

    config
        .validate()
        .with_context(|| "Configuration validation failed")?;

    println!("{}", style("Configuration is valid!").green().bold());
    Ok(())
}

fn print_stats() {
    let snapshot = metrics().snapshot();
    eprintln!("{}", style("Client statistics").cyan().bold());
    eprintln!("  {}       {}", style("Queries:").dim(), snapshot.queries_total);
    eprintln!(
        "  {}    {} hits, {} misses",
        style("Cache:").dim(),
        snapshot.cache_hits,
        snapshot.cache_misses
    );
    eprintln!(
        "  {}  {} UDP, {} TCP fallbacks, {} failed",
        style("Attempts:").dim(),
        snapshot.udp_attempts,
        snapshot.tcp_fallbacks,
        snapshot.attempt_failures
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Validate { verbose } = &cli.command {
        return validate_config(cli.config, *verbose);
    }

    let config = load_config(cli.config.clone())?;
    init_logging(&config, cli.log_level.as_deref())?;

    let resolver = Resolver::new(resolver_config(config, &cli.servers)?)?;

    let result = match &cli.command {
        Commands::Query { name, rtype } => run_query(&resolver, name, rtype, cli.json).await,
        Commands::Txt { host } => {
            let records = resolver.retrieve_txt_records(host).await?;
            print_set("TXT records", &records, cli.json)
        }
        Commands::Dnslink { host } => {
            let link = resolver.resolve_dns_link(host).await?;
            if cli.json {
                print_json(&link)
            } else {
                println!("{link}");
                Ok(())
            }
        }
        Commands::Dnsaddr { host } => {
            let addrs = resolver.resolve_dns_addr(host).await?;
            print_set("dnsaddr records", &addrs, cli.json)
        }
        Commands::Validate { .. } => bail!("validate is handled before the resolver starts"),
    };

    if cli.stats {
        print_stats();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["frey", "dnsaddr", "bootstrap.libp2p.io"]).unwrap();
        assert!(cli.config.is_none());
        assert!(cli.servers.is_empty());
        assert!(!cli.json);
        assert!(matches!(cli.command, Commands::Dnsaddr { ref host } if host == "bootstrap.libp2p.io"));

        let cli = Cli::try_parse_from([
            "frey",
            "query",
            "example.com",
            "-t",
            "AAAA",
            "-s",
            "1.1.1.1",
            "--server",
            "[2606:4700:4700::1111]:53",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.servers.len(), 2);
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Query { ref rtype, .. } if rtype == "AAAA"));

        let cli = Cli::try_parse_from(["frey", "-c", "/etc/frey/frey.yaml", "validate", "-v"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/frey/frey.yaml")));
        assert!(matches!(cli.command, Commands::Validate { verbose: true }));

        assert!(Cli::try_parse_from(["frey"]).is_err());
    }

    #[test]
    fn test_server_override() {
        let config = resolver_config(Config::default(), &["9.9.9.9".to_string()]).unwrap();
        assert_eq!(config.servers, vec!["9.9.9.9:53".parse().unwrap()]);

        let config = resolver_config(Config::default(), &[]).unwrap();
        assert_eq!(config.servers, frey_resolver::default_servers());

        assert!(resolver_config(Config::default(), &["dns.google".to_string()]).is_err());
    }

    #[test]
    fn test_query_output() {
        use frey_proto::{MessageConfig, Name, Question, ResourceRecord};

        let query = Message::query(Question::txt(Name::from_text("example.com").unwrap()), 1024);
        let response = MessageConfig {
            answers: vec![ResourceRecord::txt(
                Name::from_text("example.com").unwrap(),
                60,
                ["hello"],
            )],
            ..Message::response_to(&query)
        }
        .build()
        .unwrap();

        let output = QueryOutput::from(&response);
        assert_eq!(output.id, query.id());
        assert_eq!(output.rcode, "NOERROR");
        assert_eq!(output.answers, vec!["example.com.\t60\tIN\tTXT\t\"hello\""]);
    }
}
