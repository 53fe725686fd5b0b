pub mod mappings;
pub mod query;

use std::net::IpAddr;

use clap::{Parser, Subcommand};
use portgate_common::mapping::{EndpointSpec, Protocol};

#[derive(Parser)]
#[command(name = "portgate")]
#[command(about = "A UPnP port-mapping client for NAT gateways.")]
pub struct CommandLine {
    /// Probe a specific gateway address instead of broadcasting
    #[arg(long, global = true)]
    pub target: Option<IpAddr>,

    /// Discovery timeout in milliseconds
    #[arg(long, global = true, default_value_t = 1800)]
    pub timeout: u64,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the gateway address and account credentials
    #[command(alias = "st")]
    Status,
    /// Print the gateway's external IP address
    #[command(alias = "e")]
    ExternalIp,
    /// Print the gateway account's username and password
    #[command(alias = "c")]
    Creds,
    /// List active port mappings
    #[command(alias = "l")]
    List {
        /// Keep only mappings pointing at this machine
        #[arg(long)]
        local: bool,
        /// Keep only mappings whose description contains this string
        #[arg(long)]
        description: Option<String>,
        /// Treat the description filter as a regular expression
        #[arg(long, requires = "description")]
        regex: bool,
    },
    /// Forward a public port to a private host
    #[command(alias = "a")]
    Add {
        /// Public side: a port, or host:port
        public: EndpointSpec,
        /// Private side: a port, or host:port (host defaults to this machine)
        private: EndpointSpec,
        #[arg(long, default_value = "tcp")]
        protocol: Protocol,
        #[arg(long)]
        description: Option<String>,
        /// Lease duration in seconds
        #[arg(long)]
        ttl: Option<u32>,
    },
    /// Remove a forwarding rule
    #[command(alias = "r")]
    Remove {
        /// Public side: a port, or host:port
        public: EndpointSpec,
        #[arg(long, default_value = "tcp")]
        protocol: Protocol,
    },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
