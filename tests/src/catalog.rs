//! Catalog operations driven through a scripted invoker.

use std::net::{IpAddr, Ipv4Addr};

use portgate_common::mapping::{
    AddMapping, DescriptionFilter, EndpointSpec, MappingFilter, Protocol, RemoveMapping,
};
use portgate_core::{Error, catalog};
use regex_lite::Regex;

use crate::support::{Call, ScriptedInvoker, mapping_entry, reply_body};

fn local_addr() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(192, 168, 1, 42))
}

fn arg(calls: &[Call], index: usize, name: &str) -> Option<String> {
    calls[index]
        .1
        .iter()
        .find(|(arg_name, _)| arg_name == name)
        .and_then(|(_, value)| value.clone())
}

#[tokio::test]
async fn external_ip_is_returned_unmodified() {
    let invoker = ScriptedInvoker::new(vec![Ok(reply_body(
        "<u:GetExternalIPAddressResponse xmlns:u=\"urn:svc\">\
         <NewExternalIPAddress>203.0.113.009</NewExternalIPAddress>\
         </u:GetExternalIPAddressResponse>",
    ))]);

    let ip = catalog::single_field(&invoker, "GetExternalIPAddress", "NewExternalIPAddress")
        .await
        .unwrap();

    // No reformatting or validation, even for a non-canonical address.
    assert_eq!(ip, "203.0.113.009");
}

#[tokio::test]
async fn credentials_come_from_their_response_fields() {
    let invoker = ScriptedInvoker::new(vec![
        Ok(reply_body(
            "<u:GetUserNameResponse xmlns:u=\"urn:svc\">\
             <NewUserName>admin</NewUserName></u:GetUserNameResponse>",
        )),
        Ok(reply_body(
            "<u:GetPasswordResponse xmlns:u=\"urn:svc\">\
             <NewPassword>hunter2</NewPassword></u:GetPasswordResponse>",
        )),
    ]);

    let username = catalog::single_field(&invoker, "GetUserName", "NewUserName")
        .await
        .unwrap();
    let password = catalog::single_field(&invoker, "GetPassword", "NewPassword")
        .await
        .unwrap();

    assert_eq!(username, "admin");
    assert_eq!(password, "hunter2");
}

#[tokio::test]
async fn missing_response_element_is_incorrect_response() {
    let invoker = ScriptedInvoker::new(vec![Ok(reply_body(
        "<u:SomethingUnrelated xmlns:u=\"urn:svc\"/>",
    ))]);

    let result = catalog::single_field(&invoker, "GetUserName", "NewUserName").await;

    match result {
        Err(Error::IncorrectResponse(action)) => assert_eq!(action, "GetUserName"),
        other => panic!("expected IncorrectResponse, got {other:?}"),
    }
}

#[tokio::test]
async fn add_mapping_applies_defaults() {
    let invoker = ScriptedInvoker::new(vec![Ok(reply_body(
        "<u:AddPortMappingResponse xmlns:u=\"urn:svc\"/>",
    ))]);
    let request = AddMapping {
        public: 8080.into(),
        private: ("192.168.1.5", 80).into(),
        ..Default::default()
    };

    catalog::add(&invoker, local_addr(), &request).await.unwrap();

    let calls = invoker.calls();
    assert_eq!(calls[0].0, "AddPortMapping");
    assert_eq!(arg(&calls, 0, "NewRemoteHost"), None);
    assert_eq!(arg(&calls, 0, "NewExternalPort"), Some("8080".to_string()));
    assert_eq!(arg(&calls, 0, "NewProtocol"), Some("TCP".to_string()));
    assert_eq!(arg(&calls, 0, "NewInternalPort"), Some("80".to_string()));
    assert_eq!(
        arg(&calls, 0, "NewInternalClient"),
        Some("192.168.1.5".to_string())
    );
    assert_eq!(arg(&calls, 0, "NewEnabled"), Some("1".to_string()));
    assert_eq!(
        arg(&calls, 0, "NewPortMappingDescription"),
        Some(catalog::DEFAULT_DESCRIPTION.to_string())
    );
    assert_eq!(arg(&calls, 0, "NewLeaseDuration"), Some("1800".to_string()));
}

#[tokio::test]
async fn add_mapping_defaults_internal_host_to_local_address() {
    let invoker = ScriptedInvoker::new(vec![Ok(reply_body(
        "<u:AddPortMappingResponse xmlns:u=\"urn:svc\"/>",
    ))]);
    let request = AddMapping {
        public: 9000.into(),
        private: EndpointSpec::from(3000),
        protocol: Some(Protocol::Udp),
        description: Some("my tunnel".to_string()),
        ttl: Some(600),
    };

    catalog::add(&invoker, local_addr(), &request).await.unwrap();

    let calls = invoker.calls();
    assert_eq!(
        arg(&calls, 0, "NewInternalClient"),
        Some("192.168.1.42".to_string())
    );
    assert_eq!(arg(&calls, 0, "NewProtocol"), Some("UDP".to_string()));
    assert_eq!(
        arg(&calls, 0, "NewPortMappingDescription"),
        Some("my tunnel".to_string())
    );
    assert_eq!(arg(&calls, 0, "NewLeaseDuration"), Some("600".to_string()));
}

#[tokio::test]
async fn remove_mapping_sends_the_public_side() {
    let invoker = ScriptedInvoker::new(vec![Ok(reply_body(
        "<u:DeletePortMappingResponse xmlns:u=\"urn:svc\"/>",
    ))]);
    let request = RemoveMapping {
        public: 8080.into(),
        protocol: Some(Protocol::Udp),
    };

    catalog::remove(&invoker, &request).await.unwrap();

    let calls = invoker.calls();
    assert_eq!(calls[0].0, "DeletePortMapping");
    assert_eq!(arg(&calls, 0, "NewExternalPort"), Some("8080".to_string()));
    assert_eq!(arg(&calls, 0, "NewProtocol"), Some("UDP".to_string()));
    assert_eq!(arg(&calls, 0, "NewRemoteHost"), None);
}

#[tokio::test]
async fn enumeration_stops_at_the_first_fault() {
    // Three well-formed entries; the fourth lookup fails like a gateway
    // fault once the queue drains.
    let invoker = ScriptedInvoker::new(vec![
        Ok(mapping_entry("", 8081, "TCP", 81, "192.168.1.10", "1", "first", 3600)),
        Ok(mapping_entry("", 8082, "UDP", 82, "192.168.1.42", "1", "second", 3600)),
        Ok(mapping_entry("", 8083, "TCP", 83, "192.168.1.11", "0", "third", 3600)),
    ]);

    let entries = catalog::enumerate(&invoker, local_addr(), &MappingFilter::default())
        .await
        .unwrap();

    assert_eq!(entries.len(), 3);
    let ports: Vec<u16> = entries.iter().map(|e| e.public.port).collect();
    assert_eq!(ports, vec![8081, 8082, 8083]);

    assert!(!entries[0].local);
    assert!(entries[1].local);
    assert_eq!(entries[1].protocol, Protocol::Udp);
    assert!(entries[0].enabled);
    assert!(!entries[2].enabled);
    assert_eq!(entries[0].public.host, "");

    // Indices are 1-based and contiguous, one exchange per index.
    let indices: Vec<Option<String>> = (0..4)
        .map(|call| arg(&invoker.calls(), call, "NewPortMappingIndex"))
        .collect();
    assert_eq!(
        indices,
        vec![
            Some("1".to_string()),
            Some("2".to_string()),
            Some("3".to_string()),
            Some("4".to_string()),
        ]
    );
}

#[tokio::test]
async fn empty_table_yields_no_entries() {
    let invoker = ScriptedInvoker::new(Vec::new());

    let entries = catalog::enumerate(&invoker, local_addr(), &MappingFilter::default())
        .await
        .unwrap();

    assert!(entries.is_empty());
}

#[tokio::test]
async fn undecodable_entry_ends_the_walk() {
    let invoker = ScriptedInvoker::new(vec![
        Ok(mapping_entry("", 8081, "TCP", 81, "192.168.1.10", "1", "first", 3600)),
        Ok(reply_body("<u:GetGenericPortMappingEntryResponse xmlns:u=\"urn:svc\"/>")),
        Ok(mapping_entry("", 8083, "TCP", 83, "192.168.1.11", "1", "third", 3600)),
    ]);

    let entries = catalog::enumerate(&invoker, local_addr(), &MappingFilter::default())
        .await
        .unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].public.port, 8081);
}

#[tokio::test]
async fn enumeration_applies_client_side_filters() {
    let responses = || {
        vec![
            Ok(mapping_entry("", 8081, "TCP", 81, "192.168.1.42", "1", "node:nat:upnp", 3600)),
            Ok(mapping_entry("", 8082, "TCP", 82, "192.168.1.10", "1", "node:nat:upnp", 3600)),
            Ok(mapping_entry("", 8083, "TCP", 83, "192.168.1.42", "1", "media server", 3600)),
        ]
    };

    let local_only = MappingFilter {
        local: true,
        ..Default::default()
    };
    let entries = catalog::enumerate(&ScriptedInvoker::new(responses()), local_addr(), &local_only)
        .await
        .unwrap();
    assert_eq!(
        entries.iter().map(|e| e.public.port).collect::<Vec<_>>(),
        vec![8081, 8083]
    );

    let substring = MappingFilter {
        local: false,
        description: Some(DescriptionFilter::Substring("nat".to_string())),
    };
    let entries = catalog::enumerate(&ScriptedInvoker::new(responses()), local_addr(), &substring)
        .await
        .unwrap();
    assert_eq!(entries.len(), 2);

    let anchored = MappingFilter {
        local: false,
        description: Some(DescriptionFilter::Pattern(Regex::new("^node").unwrap())),
    };
    let entries = catalog::enumerate(&ScriptedInvoker::new(responses()), local_addr(), &anchored)
        .await
        .unwrap();
    assert_eq!(entries.len(), 2);

    let nothing = MappingFilter {
        local: false,
        description: Some(DescriptionFilter::Substring("xyz".to_string())),
    };
    let entries = catalog::enumerate(&ScriptedInvoker::new(responses()), local_addr(), &nothing)
        .await
        .unwrap();
    assert!(entries.is_empty());
}
