//! Tap device handle: acquisition, interface configuration, raw frame I/O.
//!
//! `open` drives the front half of the device lifecycle: probe for a free
//! device node, apply addressing through the external configuration utility,
//! then recover the hardware address the kernel actually bound from that
//! utility's status output. The returned handle owns the descriptor;
//! `read` and `write` are thin blocking wrappers and `close` consumes the
//! handle.

use std::fs::File;
use std::io::{Read, Write};
use std::net::Ipv4Addr;
use std::os::unix::io::{AsRawFd, RawFd};

use tracing::{debug, info, warn};

use crate::config::TapConfig;
use crate::error::TapError;
use crate::ifconfig::{ConfigUtility, Ifconfig};
use crate::locator;
use crate::mac::{self, MacAddr};

/// An open, configured tap device.
///
/// Owns the device descriptor exclusively. The descriptor is released exactly
/// once, by [`TapDevice::close`] or by drop on a failed open.
#[derive(Debug)]
pub struct TapDevice {
    file: File,
    index: u8,
    address: Ipv4Addr,
    mac: Option<MacAddr>,
}

impl TapDevice {
    /// Open and configure a tap device using the system configuration
    /// utility.
    pub fn open(config: &TapConfig) -> Result<Self, TapError> {
        Self::open_with(config, &Ifconfig::default())
    }

    /// Open and configure a tap device through a caller-supplied
    /// configuration utility.
    pub fn open_with(config: &TapConfig, tool: &dyn ConfigUtility) -> Result<Self, TapError> {
        if let Some(name) = &config.preferred_name {
            debug!(
                preferred = %name,
                "tap nodes are index-addressed; preferred name ignored"
            );
        }

        let (file, index) = locator::probe(&config.node_prefix)?;
        let iface = iface_name(index);

        // Set the hardware address before bringing the interface up. The
        // utility gives no reliable confirmation for this, so the step stays
        // best-effort in both modes.
        if let Some(mac) = &config.mac {
            match tool.set_mac(&iface, mac) {
                Ok(status) if !status.success => {
                    warn!(
                        iface = %iface,
                        mac = %mac,
                        detail = %status.detail,
                        "setting hardware address failed"
                    );
                }
                Err(err) => {
                    warn!(
                        iface = %iface,
                        mac = %mac,
                        error = %err,
                        "could not invoke utility to set hardware address"
                    );
                }
                Ok(_) => {}
            }
        }

        match tool.set_address(&iface, config.address, config.netmask, config.mtu) {
            Ok(status) if !status.success => {
                if config.checked_invocations {
                    return Err(TapError::ConfigurationFailed {
                        iface,
                        detail: status.detail,
                    });
                }
                warn!(
                    iface = %iface,
                    detail = %status.detail,
                    "interface configuration reported failure"
                );
            }
            Err(err) => {
                if config.checked_invocations {
                    return Err(TapError::ConfigurationFailed {
                        iface,
                        detail: err.to_string(),
                    });
                }
                warn!(iface = %iface, error = %err, "could not invoke configuration utility");
            }
            Ok(_) => {}
        }

        info!(
            iface = %iface,
            address = %config.address,
            netmask = %config.netmask,
            "interface up and running"
        );

        // The opening call does not report which hardware address the kernel
        // bound, so it is recovered from the utility's status output. Empty
        // output leaves the interface state unknowable; the descriptor is
        // released and the device reported unusable.
        let text = tool.query_status(&iface).map_err(|source| TapError::QueryFailed {
            iface: iface.clone(),
            source,
        })?;

        if text.is_empty() {
            return Err(TapError::MacQueryEmpty { iface });
        }

        let mac = mac::find_mac(&text);
        match &mac {
            Some(mac) => {
                info!(iface = %iface, mtu = config.mtu, mac = %mac, "interface hardware address");
            }
            None => {
                warn!(iface = %iface, "no hardware address in interface status output");
            }
        }

        Ok(Self {
            file,
            index,
            address: config.address,
            mac,
        })
    }

    /// Interface name bound to this device (`tap` plus the device index).
    pub fn name(&self) -> String {
        iface_name(self.index)
    }

    /// Index of the device node that won the probe. Immutable after open.
    pub fn index(&self) -> u8 {
        self.index
    }

    /// IPv4 address assigned at configuration time.
    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    /// Hardware address recovered from the status query, or `None` when the
    /// output carried no parsable address. Higher layers must tolerate
    /// `None`.
    pub fn hardware_address(&self) -> Option<MacAddr> {
        self.mac
    }

    /// Blocking read of at most `buf.len()` bytes from the device.
    ///
    /// No buffering or framing is added; 0 follows the transport's native
    /// end-of-stream semantics.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, TapError> {
        self.file.read(buf).map_err(TapError::Read)
    }

    /// Blocking write of `buf` to the device.
    ///
    /// Short writes are returned as-is; there is no retry.
    pub fn write(&mut self, buf: &[u8]) -> Result<usize, TapError> {
        self.file.write(buf).map_err(TapError::Write)
    }

    /// Release the device descriptor.
    ///
    /// Consumes the handle, so a second close is unrepresentable. Addressing
    /// applied during configuration is not torn down.
    pub fn close(self) {
        debug!(iface = %self.name(), "closing tap device");
    }
}

impl AsRawFd for TapDevice {
    fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

/// Interface name for a device index.
fn iface_name(index: u8) -> String {
    format!("tap{index}")
}

#[cfg(test)]
mod tests {
    use std::fs::OpenOptions;
    use std::os::unix::io::OwnedFd;
    use std::os::unix::net::UnixStream;

    use super::*;

    fn device_from(file: File, index: u8) -> TapDevice {
        TapDevice {
            file,
            index,
            address: Ipv4Addr::new(10, 9, 0, 2),
            mac: None,
        }
    }

    #[test]
    fn test_iface_name_derives_from_index() {
        assert_eq!(iface_name(0), "tap0");
        assert_eq!(iface_name(254), "tap254");
    }

    #[test]
    fn test_loopback_round_trip_adds_no_framing() {
        let (a, b) = UnixStream::pair().unwrap();
        let mut tx = device_from(File::from(OwnedFd::from(a)), 0);
        let mut rx = device_from(File::from(OwnedFd::from(b)), 1);

        let frame = [0x00u8, 0x1a, 0x2b, 0xff, 0x00, 0x7e];
        assert_eq!(tx.write(&frame).unwrap(), frame.len());

        let mut buf = [0u8; 64];
        let n = rx.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], &frame);
    }

    #[test]
    fn test_read_surfaces_native_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tap0");
        std::fs::write(&path, b"").unwrap();

        let write_only = OpenOptions::new().write(true).open(&path).unwrap();
        let mut device = device_from(write_only, 0);

        let mut buf = [0u8; 8];
        assert!(matches!(device.read(&mut buf), Err(TapError::Read(_))));
    }

    #[test]
    fn test_write_surfaces_native_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tap0");
        std::fs::write(&path, b"").unwrap();

        let read_only = OpenOptions::new().read(true).open(&path).unwrap();
        let mut device = device_from(read_only, 0);

        assert!(matches!(device.write(b"frame"), Err(TapError::Write(_))));
    }
}
