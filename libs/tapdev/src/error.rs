//! Error types for tap device acquisition, configuration, and I/O.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from tap device operations.
#[derive(Debug, Error)]
pub enum TapError {
    /// Every candidate device node in the probe range failed to open.
    #[error("no tap device node available ({probed} candidates probed)")]
    NoDeviceAvailable { probed: u32 },

    /// Staging the helper handoff socket failed. Each stage (unlink, create,
    /// bind, listen) is distinct and non-recoverable.
    #[error("helper socket {stage} failed for {}: {source}", .path.display())]
    HelperSocket {
        stage: &'static str,
        path: PathBuf,
        source: io::Error,
    },

    /// Replacing the process image with the helper executable failed.
    #[error("failed to exec helper {}: {source}", .path.display())]
    HelperExec { path: PathBuf, source: io::Error },

    /// The configuration utility rejected the addressing invocation.
    #[error("failed to configure interface {iface}: {detail}")]
    ConfigurationFailed { iface: String, detail: String },

    /// The status query invocation could not be run at all.
    #[error("status query for {iface} failed: {source}")]
    QueryFailed {
        iface: String,
        #[source]
        source: anyhow::Error,
    },

    /// The status query produced no output. The interface state is unknowable,
    /// so the device is treated as unusable and its descriptor released.
    #[error("status query for {iface} returned no output")]
    MacQueryEmpty { iface: String },

    /// Read from the device descriptor failed.
    #[error("tap device read failed: {0}")]
    Read(#[source] io::Error),

    /// Write to the device descriptor failed.
    #[error("tap device write failed: {0}")]
    Write(#[source] io::Error),
}
