//! Tap device lifecycle for the burrow tunnel endpoint.
//!
//! Manages the local end of a packet-level tunnel: finds a free tap device
//! node, opens it, applies interface addressing through the system
//! configuration utility, recovers the bound hardware address from that
//! utility's status output, and exposes raw frame read/write/close to the
//! forwarding engine.
//!
//! ## Architecture
//!
//! - **Locator**: ascending probe of the `/dev/tapN` namespace; the first
//!   free node wins and its index names the interface.
//! - **Configurator**: `ifconfig` invocations behind the [`ConfigUtility`]
//!   seam: optional hardware-address set, addressing + up, and a status
//!   query whose text yields the live MAC.
//! - **Helper launch**: for restricted execution modes, a unix-socket
//!   handoff that replaces the process with a privileged helper instead of
//!   opening the device directly.
//!
//! Everything is synchronous and blocking. The caller owns threading, the
//! logging subscriber, and packet framing.

mod config;
mod device;
mod error;
mod helper;
mod ifconfig;
mod locator;
mod mac;

pub use config::{TapConfig, DEFAULT_MTU};
pub use device::TapDevice;
pub use error::TapError;
pub use helper::{HelperLaunch, HELPER_BINARY_PATH, HELPER_SOCKET_PATH};
pub use ifconfig::{ConfigUtility, Ifconfig, InvocationStatus};
pub use locator::TAP_NODE_PREFIX;
pub use mac::{find_mac, MacAddr, ParseMacError};
