//! Open-time configuration for a tap device.

use std::net::Ipv4Addr;

use crate::locator::TAP_NODE_PREFIX;
use crate::mac::MacAddr;

/// Default MTU when none is supplied.
pub const DEFAULT_MTU: u32 = 1500;

/// Parameters for opening and configuring a tap device.
#[derive(Debug, Clone)]
pub struct TapConfig {
    /// Advisory interface name from the caller. Tap nodes are index-addressed
    /// on this platform, so the locator picks the first free index and this
    /// name plays no part in selection.
    pub preferred_name: Option<String>,
    /// IPv4 address to assign.
    pub address: Ipv4Addr,
    /// Netmask for the assigned address.
    pub netmask: Ipv4Addr,
    /// MTU to set on the interface.
    pub mtu: u32,
    /// Hardware address to set before addressing, if any.
    pub mac: Option<MacAddr>,
    /// Check the configuration utility's exit status for the addressing step.
    /// Disabled, the step is fire-and-forget like the historical behavior.
    pub checked_invocations: bool,
    /// Device node path prefix; the candidate index is appended.
    pub node_prefix: String,
}

impl TapConfig {
    /// Create a configuration with defaults for everything but addressing.
    pub fn new(address: Ipv4Addr, netmask: Ipv4Addr) -> Self {
        Self {
            preferred_name: None,
            address,
            netmask,
            mtu: DEFAULT_MTU,
            mac: None,
            checked_invocations: true,
            node_prefix: TAP_NODE_PREFIX.to_string(),
        }
    }

    /// Set a custom MTU.
    pub fn with_mtu(mut self, mtu: u32) -> Self {
        self.mtu = mtu;
        self
    }

    /// Set the hardware address to apply before addressing.
    pub fn with_mac(mut self, mac: MacAddr) -> Self {
        self.mac = Some(mac);
        self
    }

    /// Record the caller's preferred interface name.
    pub fn with_preferred_name(mut self, name: impl Into<String>) -> Self {
        self.preferred_name = Some(name.into());
        self
    }

    /// Probe device nodes under a different path prefix.
    pub fn with_node_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.node_prefix = prefix.into();
        self
    }

    /// Ignore the configuration utility's exit status (historical
    /// fire-and-forget behavior).
    pub fn with_unchecked_invocations(mut self) -> Self {
        self.checked_invocations = false;
        self
    }
}
