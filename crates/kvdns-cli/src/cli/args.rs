//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use kvdns_core::RecordType;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Key-value backed authoritative DNS.
///
/// Records are kept in a single database file, one table per record type,
/// and served over UDP and TCP by `kvdns serve`. While a server runs,
/// record commands reach its store with `--server`.
#[derive(Parser, Debug)]
#[command(name = "kvdns")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (default: <config dir>/kvdns/kvdns.toml)
    #[arg(short, long, env = "KVDNS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Record database file, overriding the config file
    #[arg(short, long, env = "KVDNS_DATABASE", global = true)]
    pub database: Option<PathBuf>,

    /// Management API of a running server, e.g. http://127.0.0.1:5380
    #[arg(short, long, env = "KVDNS_SERVER", global = true)]
    pub server: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer DNS queries from the record store
    Serve(ServeArgs),

    /// Show the record of a type stored under a name
    Get(RecordArgs),

    /// Create or replace a record
    Set(SetArgs),

    /// Remove a record
    Delete(RecordArgs),

    /// List owner names per record type
    List(ListArgs),
}

// ============================================================================
// Serve command
// ============================================================================

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen address for UDP and TCP
    #[arg(short, long, env = "KVDNS_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Do not accept queries over TCP
    #[arg(long)]
    pub disable_tcp: bool,

    /// Do not accept queries over UDP
    #[arg(long)]
    pub disable_udp: bool,

    /// TTL stamped on every answer, in seconds
    #[arg(long, env = "KVDNS_TTL")]
    pub ttl: Option<u32>,

    /// Listen address for the HTTP management API
    #[arg(long, env = "KVDNS_API_LISTEN")]
    pub api_listen: Option<SocketAddr>,

    /// Do not serve the HTTP management API
    #[arg(long)]
    pub disable_api: bool,
}

// ============================================================================
// Record commands
// ============================================================================

#[derive(Args, Debug)]
pub struct RecordArgs {
    /// Record type (A, AAAA, MX, LOC, ...)
    #[arg(value_name = "TYPE", value_parser = parse_record_type)]
    pub rtype: RecordType,

    /// Owner name
    pub name: String,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Record type (A, AAAA, MX, LOC, ...)
    #[arg(value_name = "TYPE", value_parser = parse_record_type)]
    pub rtype: RecordType,

    /// Owner name
    pub name: String,

    /// Record data in zone-file presentation, e.g. `10 mail.example.com`
    #[arg(
        value_name = "VALUE",
        required_unless_present = "json",
        conflicts_with = "json",
        allow_hyphen_values = true
    )]
    pub values: Vec<String>,

    /// Record data as a JSON object, e.g. '{"host":"mail.example.com","priority":10}'
    #[arg(long, value_name = "BODY")]
    pub json: Option<String>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Restrict the listing to these record types
    #[arg(value_name = "TYPE", value_parser = parse_record_type)]
    pub types: Vec<RecordType>,
}

fn parse_record_type(s: &str) -> Result<RecordType, String> {
    s.parse::<RecordType>().map_err(|e| e.to_string())
}
