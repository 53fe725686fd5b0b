mod commands;
mod terminal;

use std::time::Duration;

use commands::{CommandLine, Commands, mappings, query};
use portgate_core::Client;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let command_line = CommandLine::parse_args();

    terminal::logging::init(command_line.verbose);

    let client = Client::new()
        .await?
        .discovery_timeout(Duration::from_millis(command_line.timeout));
    let gateway = client.find_gateway(command_line.target).await?;

    let result = match command_line.command {
        Commands::Status => query::status(&gateway).await,
        Commands::ExternalIp => query::external_ip(&gateway).await,
        Commands::Creds => query::creds(&gateway).await,
        Commands::List {
            local,
            description,
            regex,
        } => mappings::list(&gateway, local, description, regex).await,
        Commands::Add {
            public,
            private,
            protocol,
            description,
            ttl,
        } => mappings::add(&gateway, public, private, protocol, description, ttl).await,
        Commands::Remove { public, protocol } => {
            mappings::remove(&gateway, public, protocol).await
        }
    };

    client.close();
    result
}
