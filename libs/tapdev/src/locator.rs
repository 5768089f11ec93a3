//! Tap device node probing.
//!
//! Tap device nodes are a scarce, enumerable resource: a fixed path prefix
//! plus a small index. The locator owns index selection; callers never pick
//! an index themselves.

use std::fs::{File, OpenOptions};

use tracing::{debug, info};

use crate::error::TapError;

/// Path prefix for tap device nodes; the candidate index is appended.
pub const TAP_NODE_PREFIX: &str = "/dev/tap";

/// Number of candidate device indices probed (0 through 254).
const CANDIDATE_COUNT: u32 = 255;

/// Probe candidate device nodes in ascending index order and open the first
/// one that is free.
///
/// The OS enforces exclusive binding: opening a node another process holds
/// fails, and that index is skipped for the remainder of this call. There is
/// no retry, so a transiently failing index is lost until the next probe.
pub(crate) fn probe(prefix: &str) -> Result<(File, u8), TapError> {
    for index in 0..CANDIDATE_COUNT {
        let node = format!("{prefix}{index}");
        match OpenOptions::new().read(true).write(true).open(&node) {
            Ok(file) => {
                info!(node = %node, index, "opened tap device node");
                return Ok((file, index as u8));
            }
            Err(err) => {
                debug!(node = %node, error = %err, "device node unavailable");
            }
        }
    }

    Err(TapError::NoDeviceAvailable {
        probed: CANDIDATE_COUNT,
    })
}
