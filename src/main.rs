//! Gossipwire - Wire codec for gossip exchanges
//!
//! Command-line front end: converts gossip messages between their binary wire
//! form and JSON, and dumps the raw fields of any encoded message.

use std::fmt::Display;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::{de::DeserializeOwned, Serialize};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gossipwire::config::{self, Config};
use gossipwire::protocol::{self, DecodeOptions, Message};
use gossipwire::{Info, Kind, Request, Response};

/// Gossipwire - encode, decode and inspect gossip messages
#[derive(Parser)]
#[command(name = "gossipwire")]
#[command(author = "Gossipwire Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Encode, decode and inspect gossip wire messages", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a wire-encoded message and print it
    Decode {
        /// Message kind
        #[arg(short, long, value_enum)]
        kind: Kind,

        /// Print the compact text form instead of JSON
        #[arg(short, long)]
        text: bool,

        /// Input file (stdin if omitted)
        input: Option<PathBuf>,
    },

    /// Encode a JSON message into its wire form
    Encode {
        /// Message kind
        #[arg(short, long, value_enum)]
        kind: Kind,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Input JSON file (stdin if omitted)
        input: Option<PathBuf>,
    },

    /// List the raw fields of any wire-encoded message
    Inspect {
        /// Input file (stdin if omitted)
        input: Option<PathBuf>,
    },

    /// Show current configuration
    Config {
        /// Generate sample configuration
        #[arg(long)]
        generate: bool,

        /// Output path for generated config
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Load configuration
    let config = if let Some(config_path) = &cli.config {
        Config::load(config_path)?
    } else {
        Config::load_default().unwrap_or_default()
    };
    let opts = config.codec.decode_options();

    match cli.command {
        Commands::Decode { kind, text, input } => {
            let bytes = read_input(input.as_deref())?;
            tracing::debug!("Decoding {} bytes as {}", bytes.len(), kind);

            let rendered = match kind {
                Kind::Request => render::<Request>(&bytes, &opts, text, config.output.pretty)?,
                Kind::Response => render::<Response>(&bytes, &opts, text, config.output.pretty)?,
                Kind::Info => render::<Info>(&bytes, &opts, text, config.output.pretty)?,
            };
            println!("{}", rendered);
        }
        Commands::Encode {
            kind,
            output,
            input,
        } => {
            let json = read_input(input.as_deref())?;
            let bytes = match kind {
                Kind::Request => encode::<Request>(&json)?,
                Kind::Response => encode::<Response>(&json)?,
                Kind::Info => encode::<Info>(&json)?,
            };
            tracing::debug!("Encoded {} as {} bytes", kind, bytes.len());

            if let Some(path) = output {
                std::fs::write(&path, &bytes)
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("Wrote {} bytes to: {}", bytes.len(), path.display());
            } else {
                std::io::stdout().write_all(&bytes)?;
            }
        }
        Commands::Inspect { input } => {
            let bytes = read_input(input.as_deref())?;
            inspect(&bytes, opts)?;
        }
        Commands::Config { generate, output } => {
            if generate {
                let sample = config::generate_sample_config()?;
                if let Some(path) = output {
                    std::fs::write(&path, &sample)?;
                    println!("Configuration written to: {}", path.display());
                } else {
                    println!("{}", sample);
                }
            } else {
                println!("{}", toml::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}

/// Read a whole file, or stdin when no path is given
fn read_input(path: Option<&Path>) -> anyhow::Result<Vec<u8>> {
    match path {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("reading {}", path.display()))
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Decode `bytes` as `M` and render it as JSON or compact text
fn render<M>(bytes: &[u8], opts: &DecodeOptions, text: bool, pretty: bool) -> anyhow::Result<String>
where
    M: Message + Serialize + Display,
{
    let msg = M::unmarshal_with(bytes, opts)
        .with_context(|| format!("decoding {}", M::NAME))?;

    if text {
        Ok(msg.to_string())
    } else if pretty {
        Ok(serde_json::to_string_pretty(&msg)?)
    } else {
        Ok(serde_json::to_string(&msg)?)
    }
}

/// Parse JSON as `M` and encode it
fn encode<M>(json: &[u8]) -> anyhow::Result<Vec<u8>>
where
    M: Message + DeserializeOwned,
{
    let msg: M = serde_json::from_slice(json).with_context(|| format!("parsing {}", M::NAME))?;
    Ok(msg.marshal()?)
}

/// Print one line per top-level field
fn inspect(bytes: &[u8], opts: DecodeOptions) -> anyhow::Result<()> {
    println!("{} bytes", bytes.len());

    for field in protocol::raw_fields(bytes, opts) {
        match field {
            Ok(field) => println!("{}", field),
            Err(e) => anyhow::bail!("malformed input: {}", e),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["gossipwire", "decode", "--kind", "info", "in.bin"]);
        assert!(cli.is_ok());

        let cli = Cli::try_parse_from(["gossipwire", "decode", "--kind", "bogus"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let json = br#"{"node_id": 4, "addr": {"network_field": "tcp", "address_field": "a:1"},
            "high_water_stamps": {"4": 100}}"#;
        let bytes = encode::<Request>(json).unwrap();
        let req = Request::unmarshal(&bytes).unwrap();

        assert_eq!(req.node_id, 4);
        assert_eq!(req.high_water_stamps[&4], 100);

        let rendered = render::<Request>(&bytes, &DecodeOptions::default(), true, false).unwrap();
        assert!(rendered.starts_with("node_id:4 "));
    }

    #[test]
    fn test_render_reports_malformed_input() {
        let err = render::<Info>(&[0x0a, 0x05], &DecodeOptions::default(), false, false);
        assert!(err.is_err());
    }
}
