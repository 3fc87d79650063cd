//! Integration tests for decoding SolusVM responses.
//!
//! These tests run captured panel responses through the decoder and the snapshot mapping
//! without touching the network.

use serde_json::Value;
use solusvm_client::{decode_response, VirtualMachineClient, VirtualMachineSnapshot};
use solusvm_core::Error;
use std::fs;
use std::path::PathBuf;

/// Get the path to the test fixtures directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Load a fixture from disk.
fn load_fixture(name: &str) -> Vec<u8> {
    let fixture_path = fixtures_dir().join(name);
    fs::read(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read fixture at {}: {}",
            fixture_path.display(),
            e
        )
    })
}

fn offline_client() -> VirtualMachineClient {
    VirtualMachineClient::new("https://panel.example.com:5656", "KEY", "HASH").unwrap()
}

fn snapshot_from(name: &str) -> Result<VirtualMachineSnapshot, Error> {
    let response = decode_response(&load_fixture(name))?;
    VirtualMachineSnapshot::from_response(offline_client(), response)
}

#[test]
fn test_decode_info_fragment() {
    let response = decode_response(&load_fixture("info_success.xml")).unwrap();

    assert!(response.is_success());
    assert_eq!(response.status_message, "");
    assert_eq!(response.vm_state, "online");
    assert_eq!(response.hostname, "vps1.example.com");
    assert_eq!(response.ip_address, "192.0.2.10");
    assert_eq!(response.hdd, "21474836480,8589934592,12884901888,40");
    assert_eq!(response.ip_addresses, "192.0.2.10,192.0.2.11,2001:db8::10");
}

#[test]
fn test_snapshot_from_info_fragment() {
    let snapshot = snapshot_from("info_success.xml").unwrap();

    assert_eq!(snapshot.hostname, "vps1.example.com");
    assert_eq!(snapshot.status, "online");
    assert_eq!(snapshot.main_ip, "192.0.2.10");
    assert_eq!(
        snapshot.ip_addresses,
        vec!["192.0.2.10", "192.0.2.11", "2001:db8::10"]
    );

    assert_eq!(snapshot.disk.total, 21_474_836_480);
    assert_eq!(snapshot.disk.used, 8_589_934_592);
    assert_eq!(snapshot.disk.free, 12_884_901_888);
    assert_eq!(snapshot.disk.percent_used, 40);

    assert_eq!(snapshot.bandwidth.percent_used, 5);
    assert_eq!(snapshot.memory.total, 2_147_483_648);
}

#[test]
fn test_snapshot_from_full_document() {
    let snapshot = snapshot_from("info_document.xml").unwrap();

    assert_eq!(snapshot.hostname, "vps2.example.com");
    assert_eq!(snapshot.status, "offline");
    assert_eq!(snapshot.main_ip, "198.51.100.7");
    assert!(
        snapshot.ip_addresses.is_empty(),
        "empty ipaddr should mean no addresses"
    );
    assert_eq!(snapshot.bandwidth.total, 0);
}

#[test]
fn test_error_response_carries_message() {
    let err = snapshot_from("error_invalid_ip.xml").unwrap_err();

    assert_eq!(err.to_string(), "Invalid ipaddress");
    assert_eq!(err.error_code(), "REMOTE_OPERATION_FAILED");
}

#[test]
fn test_truncated_usage_is_rejected() {
    let err = snapshot_from("info_truncated_usage.xml").unwrap_err();

    match err {
        Error::MalformedUsage { field, value, .. } => {
            assert_eq!(field, "hdd");
            assert_eq!(value, "21474836480,8589934592");
        }
        other => panic!("expected MalformedUsage, got {other:?}"),
    }
}

#[test]
fn test_display_json_from_fixture() {
    let snapshot = snapshot_from("info_success.xml").unwrap();
    let value: Value = serde_json::from_str(&snapshot.to_display_json().unwrap()).unwrap();

    assert_eq!(value["hostname"], "vps1.example.com");
    assert_eq!(value["hdd"]["total"], "20.00GB");
    assert_eq!(value["hdd"]["used"], "8.00GB");
    assert_eq!(value["hdd"]["free"], "12.00GB");
    assert_eq!(value["hdd"]["percent_used"], "40%");
    assert_eq!(value["bandwith"]["total"], "1.00TB");
    assert_eq!(value["bandwith"]["used"], "51.20GB");
    assert_eq!(value["bandwith"]["free"], "972.80GB");
    assert_eq!(value["memory"]["total"], "2.00GB");
    assert_eq!(value["memory"]["percent_used"], "50%");
}

#[test]
fn test_raw_json_keeps_numbers() {
    let snapshot = snapshot_from("info_success.xml").unwrap();
    let value: Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();

    assert_eq!(value["hdd"]["total"], 21_474_836_480_i64);
    assert_eq!(value["memory"]["percent_used"], 50);
    assert_eq!(value["ipaddress"][2], "2001:db8::10");
    assert!(value.get("client").is_none());
}
