use anyhow::Context;
use colored::*;
use portgate_common::mapping::{
    AddMapping, DescriptionFilter, EndpointSpec, MappingFilter, PortMapping, Protocol,
    RemoveMapping,
};
use portgate_core::Gateway;
use regex_lite::Regex;
use tracing::info;

pub async fn list(
    gateway: &Gateway,
    local: bool,
    description: Option<String>,
    regex: bool,
) -> anyhow::Result<()> {
    let filter = build_filter(local, description, regex)?;
    let entries = gateway.mappings(&filter).await?;

    if entries.is_empty() {
        println!("no active port mappings");
        return Ok(());
    }
    for entry in &entries {
        print_entry(entry);
    }
    Ok(())
}

pub async fn add(
    gateway: &Gateway,
    public: EndpointSpec,
    private: EndpointSpec,
    protocol: Protocol,
    description: Option<String>,
    ttl: Option<u32>,
) -> anyhow::Result<()> {
    let request = AddMapping {
        public,
        private,
        protocol: Some(protocol),
        description,
        ttl,
    };
    gateway.add_mapping(&request).await?;
    info!("mapping added");
    Ok(())
}

pub async fn remove(
    gateway: &Gateway,
    public: EndpointSpec,
    protocol: Protocol,
) -> anyhow::Result<()> {
    let request = RemoveMapping {
        public,
        protocol: Some(protocol),
    };
    gateway.remove_mapping(&request).await?;
    info!("mapping removed");
    Ok(())
}

fn build_filter(
    local: bool,
    description: Option<String>,
    regex: bool,
) -> anyhow::Result<MappingFilter> {
    let description = match description {
        Some(pattern) if regex => Some(DescriptionFilter::Pattern(
            Regex::new(&pattern).context("invalid description pattern")?,
        )),
        Some(needle) => Some(DescriptionFilter::Substring(needle)),
        None => None,
    };
    Ok(MappingFilter { local, description })
}

fn print_entry(entry: &PortMapping) {
    let public_host = if entry.public.host.is_empty() {
        "*"
    } else {
        entry.public.host.as_str()
    };
    let state = if entry.enabled {
        "enabled".green()
    } else {
        "disabled".red()
    };
    let local_tag = if entry.local { " [local]".cyan() } else { "".normal() };

    println!(
        "{}:{}/{} -> {}:{}  {} ttl={}s{}  {}",
        public_host,
        entry.public.port.to_string().bold(),
        entry.protocol.to_string().to_lowercase(),
        entry.private.host,
        entry.private.port,
        state,
        entry.ttl,
        local_tag,
        entry.description.dimmed(),
    );
}
