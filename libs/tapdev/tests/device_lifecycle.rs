//! End-to-end open/configure/I-O flow against a fake configuration utility
//! and a fake device-node directory.

use std::fs;
use std::net::Ipv4Addr;
use std::sync::Mutex;

use anyhow::Result;
use burrow_tapdev::{ConfigUtility, InvocationStatus, MacAddr, TapConfig, TapDevice, TapError};
use tempfile::TempDir;

/// Plays back canned query output and records every invocation.
struct FakeUtility {
    query_output: String,
    address_success: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeUtility {
    fn new(query_output: &str) -> Self {
        Self {
            query_output: query_output.to_string(),
            address_success: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing_address(mut self) -> Self {
        self.address_success = false;
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ConfigUtility for FakeUtility {
    fn set_mac(&self, iface: &str, mac: &MacAddr) -> Result<InvocationStatus> {
        self.record(format!("mac {iface} {mac}"));
        Ok(InvocationStatus {
            success: true,
            detail: String::new(),
        })
    }

    fn set_address(
        &self,
        iface: &str,
        address: Ipv4Addr,
        netmask: Ipv4Addr,
        mtu: u32,
    ) -> Result<InvocationStatus> {
        self.record(format!("addr {iface} {address} {netmask} {mtu}"));
        Ok(InvocationStatus {
            success: self.address_success,
            detail: if self.address_success {
                String::new()
            } else {
                "bad value".to_string()
            },
        })
    }

    fn query_status(&self, iface: &str) -> Result<String> {
        self.record(format!("query {iface}"));
        Ok(self.query_output.clone())
    }
}

fn node_dir_with(indices: &[u8]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for index in indices {
        fs::write(dir.path().join(format!("tap{index}")), b"").unwrap();
    }
    dir
}

fn config_for(dir: &TempDir) -> TapConfig {
    TapConfig::new(Ipv4Addr::new(10, 9, 0, 2), Ipv4Addr::new(255, 255, 255, 0))
        .with_node_prefix(dir.path().join("tap").to_string_lossy())
}

#[test]
fn open_configures_and_recovers_mac() {
    let dir = node_dir_with(&[0]);
    let tool = FakeUtility::new("tap0: flags=8843<UP>\n\tether 1a:2b:3c:4d:5e:6f \n");
    let config = config_for(&dir).with_mtu(1400);

    let device = TapDevice::open_with(&config, &tool).unwrap();

    assert_eq!(device.index(), 0);
    assert_eq!(device.name(), "tap0");
    assert_eq!(device.address(), Ipv4Addr::new(10, 9, 0, 2));
    assert_eq!(
        device.hardware_address().map(|m| m.octets()),
        Some([0x1a, 0x2b, 0x3c, 0x4d, 0x5e, 0x6f])
    );
    assert_eq!(
        tool.calls(),
        vec![
            "addr tap0 10.9.0.2 255.255.255.0 1400".to_string(),
            "query tap0".to_string(),
        ]
    );
}

#[test]
fn hardware_address_is_set_before_addressing() {
    let dir = node_dir_with(&[0]);
    let tool = FakeUtility::new("ether 02:00:00:00:00:01\n");
    let mac: MacAddr = "02:00:00:00:00:01".parse().unwrap();
    let config = config_for(&dir).with_mac(mac);

    TapDevice::open_with(&config, &tool).unwrap();

    let calls = tool.calls();
    assert_eq!(calls[0], "mac tap0 02:00:00:00:00:01");
    assert!(calls[1].starts_with("addr tap0"));
}

#[test]
fn locator_skips_bound_indices() {
    let dir = node_dir_with(&[2]);
    let tool = FakeUtility::new("ether 02:00:00:00:00:01\n");

    let device = TapDevice::open_with(&config_for(&dir), &tool).unwrap();

    assert_eq!(device.index(), 2);
    assert_eq!(device.name(), "tap2");
}

#[test]
fn exhausted_namespace_fails_without_a_handle() {
    let dir = node_dir_with(&[]);
    let tool = FakeUtility::new("ether 02:00:00:00:00:01\n");

    let err = TapDevice::open_with(&config_for(&dir), &tool).unwrap_err();
    assert!(matches!(err, TapError::NoDeviceAvailable { .. }));
    // Acquisition never reached the configuration utility.
    assert!(tool.calls().is_empty());
}

#[test]
fn patternless_query_output_leaves_mac_unset() {
    let dir = node_dir_with(&[0]);
    let tool = FakeUtility::new("no link");

    let device = TapDevice::open_with(&config_for(&dir), &tool).unwrap();
    assert!(device.hardware_address().is_none());
}

#[test]
fn empty_query_output_is_fatal_for_the_device() {
    let dir = node_dir_with(&[0]);
    let tool = FakeUtility::new("");

    let err = TapDevice::open_with(&config_for(&dir), &tool).unwrap_err();
    assert!(matches!(err, TapError::MacQueryEmpty { .. }));
}

#[test]
fn checked_addressing_failure_fails_the_open() {
    let dir = node_dir_with(&[0]);
    let tool = FakeUtility::new("ether 02:00:00:00:00:01\n").failing_address();

    let err = TapDevice::open_with(&config_for(&dir), &tool).unwrap_err();
    match err {
        TapError::ConfigurationFailed { iface, detail } => {
            assert_eq!(iface, "tap0");
            assert_eq!(detail, "bad value");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unchecked_addressing_failure_is_fire_and_forget() {
    let dir = node_dir_with(&[0]);
    let tool = FakeUtility::new("ether 02:00:00:00:00:01\n").failing_address();
    let config = config_for(&dir).with_unchecked_invocations();

    let device = TapDevice::open_with(&config, &tool).unwrap();
    assert_eq!(device.index(), 0);
}

#[test]
fn close_releases_the_index_for_reacquisition() {
    let dir = node_dir_with(&[0]);
    let tool = FakeUtility::new("ether 02:00:00:00:00:01\n");
    let config = config_for(&dir);

    let device = TapDevice::open_with(&config, &tool).unwrap();
    assert_eq!(device.index(), 0);
    device.close();

    let device = TapDevice::open_with(&config, &tool).unwrap();
    assert_eq!(device.index(), 0);
}

#[test]
fn write_passes_bytes_through_unframed() {
    let dir = node_dir_with(&[0]);
    let tool = FakeUtility::new("ether 02:00:00:00:00:01\n");

    let mut device = TapDevice::open_with(&config_for(&dir), &tool).unwrap();
    let frame = [0xdeu8, 0xad, 0xbe, 0xef, 0x00, 0x7e];
    assert_eq!(device.write(&frame).unwrap(), frame.len());

    // The backing node carries exactly the written bytes.
    assert_eq!(fs::read(dir.path().join("tap0")).unwrap(), frame);
}

#[test]
fn read_passes_bytes_through_unframed() {
    let dir = node_dir_with(&[]);
    let frame = [0x00u8, 0x1a, 0x2b, 0xff, 0x7e];
    fs::write(dir.path().join("tap0"), frame).unwrap();
    let tool = FakeUtility::new("ether 02:00:00:00:00:01\n");

    let mut device = TapDevice::open_with(&config_for(&dir), &tool).unwrap();
    let mut buf = [0u8; 64];
    let n = device.read(&mut buf).unwrap();
    assert_eq!(&buf[..n], &frame);
}
