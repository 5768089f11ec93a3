//! Invocation of the external interface-configuration utility.
//!
//! There is no structured API for tap interface state on this platform; the
//! `ifconfig` binary is the de-facto one, driven by arguments and read back
//! by parsing its textual output. The invocations sit behind a narrow
//! capability trait so the sequencing and parsing logic stays testable
//! without spawning processes, and so the utility can be swapped per
//! platform.

use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::process::{Command, Output};

use anyhow::{Context, Result};

use crate::mac::MacAddr;

/// Outcome of a single configuration-utility invocation.
#[derive(Debug, Clone)]
pub struct InvocationStatus {
    /// Whether the utility exited successfully.
    pub success: bool,
    /// Trimmed stderr, empty when the utility had nothing to say.
    pub detail: String,
}

impl InvocationStatus {
    fn from_output(output: &Output) -> Self {
        Self {
            success: output.status.success(),
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }
}

/// Capability interface over the external configuration utility.
///
/// `Err` means the utility could not be invoked at all; `Ok` carries its exit
/// status so callers decide how strictly to treat a rejection.
pub trait ConfigUtility {
    /// Set the hardware address of an interface.
    fn set_mac(&self, iface: &str, mac: &MacAddr) -> Result<InvocationStatus>;

    /// Assign IPv4 address, netmask, and MTU, and bring the interface up, in
    /// one invocation.
    fn set_address(
        &self,
        iface: &str,
        address: Ipv4Addr,
        netmask: Ipv4Addr,
        mtu: u32,
    ) -> Result<InvocationStatus>;

    /// Query interface status and return the raw textual output.
    fn query_status(&self, iface: &str) -> Result<String>;
}

/// Production implementation backed by the system `ifconfig` binary.
#[derive(Debug, Clone)]
pub struct Ifconfig {
    program: PathBuf,
}

impl Default for Ifconfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ifconfig"),
        }
    }
}

impl Ifconfig {
    /// Use a specific utility binary instead of `ifconfig` from `PATH`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        Command::new(&self.program)
            .args(args)
            .output()
            .with_context(|| format!("failed to execute {}", self.program.display()))
    }
}

impl ConfigUtility for Ifconfig {
    fn set_mac(&self, iface: &str, mac: &MacAddr) -> Result<InvocationStatus> {
        let output = self.run(&[iface, "ether", &mac.to_string()])?;
        Ok(InvocationStatus::from_output(&output))
    }

    fn set_address(
        &self,
        iface: &str,
        address: Ipv4Addr,
        netmask: Ipv4Addr,
        mtu: u32,
    ) -> Result<InvocationStatus> {
        let output = self.run(&[
            iface,
            &address.to_string(),
            "netmask",
            &netmask.to_string(),
            "mtu",
            &mtu.to_string(),
            "up",
        ])?;
        Ok(InvocationStatus::from_output(&output))
    }

    fn query_status(&self, iface: &str) -> Result<String> {
        let output = self.run(&[iface])?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
