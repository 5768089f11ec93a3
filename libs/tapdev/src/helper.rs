//! Privilege helper launch for restricted execution modes.
//!
//! When the process cannot open device nodes directly, acquisition is handed
//! to a privileged helper: a listening unix socket is staged at a fixed,
//! well-known path, then the process image is replaced with the helper
//! executable, which performs the privileged open and drives the tunnel from
//! then on. The socket protocol past accept belongs to the helper.

use std::convert::Infallible;
use std::fs;
use std::io;
use std::os::unix::io::{AsRawFd, OwnedFd};
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use nix::sys::socket::{
    bind, listen, socket, AddressFamily, Backlog, SockFlag, SockType, UnixAddr,
};
use tracing::info;

use crate::error::TapError;

/// Well-known socket path the helper connects back on.
pub const HELPER_SOCKET_PATH: &str = "/tmp/burrow-helper.sock";

/// Fixed installation path of the helper executable.
pub const HELPER_BINARY_PATH: &str = "/usr/local/libexec/burrow-tap-helper";

/// Launch parameters for the privileged helper handoff.
#[derive(Debug, Clone)]
pub struct HelperLaunch {
    /// Filesystem path of the handoff socket.
    pub socket_path: PathBuf,
    /// Path of the helper executable.
    pub helper_path: PathBuf,
}

impl Default for HelperLaunch {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(HELPER_SOCKET_PATH),
            helper_path: PathBuf::from(HELPER_BINARY_PATH),
        }
    }
}

impl HelperLaunch {
    /// Stage the handoff socket somewhere other than the well-known path.
    pub fn with_socket_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.socket_path = path.into();
        self
    }

    /// Use a helper executable outside the fixed installation path.
    pub fn with_helper_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.helper_path = path.into();
        self
    }

    /// Stage the handoff socket and replace this process with the helper.
    ///
    /// On success this never returns: the helper image takes over the process
    /// and inherits the listening descriptor. Socket failures are distinct
    /// per stage and non-recoverable; the caller should abort.
    pub fn launch(&self) -> Result<Infallible, TapError> {
        let listener = stage_socket(&self.socket_path)?;

        info!(
            socket = %self.socket_path.display(),
            helper = %self.helper_path.display(),
            "delegating tap acquisition to privileged helper"
        );

        let source = Command::new(&self.helper_path).exec();
        drop(listener);
        Err(TapError::HelperExec {
            path: self.helper_path.clone(),
            source,
        })
    }
}

/// Create, bind, and listen on the handoff socket.
///
/// Any stale socket file is unlinked first; only one launch can hold the path
/// at a time, enforced by bind failure. The descriptor is created without
/// close-on-exec so it survives into the helper image. Backlog is 1: exactly
/// one connection is expected.
fn stage_socket(path: &Path) -> Result<OwnedFd, TapError> {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(socket_error("unlink", path, err)),
    }

    let fd = socket(AddressFamily::Unix, SockType::Stream, SockFlag::empty(), None)
        .map_err(|errno| socket_error("create", path, errno.into()))?;

    let addr = UnixAddr::new(path).map_err(|errno| socket_error("bind", path, errno.into()))?;
    bind(fd.as_raw_fd(), &addr).map_err(|errno| socket_error("bind", path, errno.into()))?;

    let backlog = Backlog::new(1).map_err(|errno| socket_error("listen", path, errno.into()))?;
    listen(&fd, backlog).map_err(|errno| socket_error("listen", path, errno.into()))?;

    Ok(fd)
}

fn socket_error(stage: &'static str, path: &Path, source: io::Error) -> TapError {
    TapError::HelperSocket {
        stage,
        path: path.to_path_buf(),
        source,
    }
}
