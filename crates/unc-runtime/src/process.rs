//! Process creation inside new namespaces.
//!
//! Clones a child with the requested namespace flags, installs its
//! identity maps from the parent side, and only then lets the child
//! re-execute the given binary.

#![allow(unsafe_code)]

use std::ffi::CString;
use std::io::Write;
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sched::CloneFlags;
use nix::sys::signal::{Signal, kill};
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::Pid;
use unc_common::constants::CLONE_STACK_SIZE;
use unc_common::error::{Result, UncError};
use unc_common::types::{ContainerExit, IdentityMapping};
use unc_core::namespace::user::write_id_maps;

/// Exit status of a child that never got to `execv`.
const CHILD_SETUP_FAILED: isize = 127;

/// A child process running in its own namespaces.
#[derive(Debug)]
pub struct NamespacedChild {
    pid: Pid,
}

impl NamespacedChild {
    /// PID of the child as seen from the launcher's namespace.
    pub const fn pid(&self) -> Pid {
        self.pid
    }

    /// Blocks until the child terminates.
    ///
    /// # Errors
    ///
    /// Returns an error if `waitpid(2)` fails.
    pub fn wait(self) -> Result<ContainerExit> {
        loop {
            match waitpid(self.pid, None) {
                Ok(WaitStatus::Exited(_, code)) => return Ok(ContainerExit::Exited(code)),
                Ok(WaitStatus::Signaled(_, signal, _)) => {
                    return Ok(ContainerExit::Signaled(signal as i32));
                }
                Ok(_) | Err(Errno::EINTR) => {}
                Err(e) => {
                    return Err(UncError::Namespace {
                        message: format!("waitpid {} failed: {e}", self.pid),
                    });
                }
            }
        }
    }

    /// Sends `SIGKILL` and reaps the child.
    ///
    /// As PID 1 of its namespace, the child takes its mounts, descendants,
    /// and network devices down with it.
    pub fn kill(self) {
        if let Err(e) = kill(self.pid, Signal::SIGKILL) {
            tracing::warn!(pid = %self.pid, error = %e, "failed to kill container process");
            return;
        }
        if let Err(e) = self.wait() {
            tracing::warn!(error = %e, "failed to reap container process");
        }
    }
}

/// Clones a child into the namespaces named by `flags` and re-executes
/// `exe` there with `argv`.
///
/// The child blocks on a pipe until the parent has written its identity
/// maps, so the re-executed binary always starts as container root. Stdio
/// and the environment are inherited unchanged.
///
/// # Errors
///
/// Returns an error if `clone(2)` fails or the identity maps cannot be
/// written. In the latter case the child is killed before returning.
pub fn spawn_namespaced(
    exe: &Path,
    argv: &[String],
    flags: CloneFlags,
    mapping: &IdentityMapping,
) -> Result<NamespacedChild> {
    let exe_c = cstring(exe.as_os_str().as_bytes())?;
    let argv_c = argv
        .iter()
        .map(|arg| cstring(arg.as_bytes()))
        .collect::<Result<Vec<_>>>()?;

    let (ready_rx, ready_tx) =
        nix::unistd::pipe2(OFlag::O_CLOEXEC).map_err(|e| UncError::Namespace {
            message: format!("sync pipe: {e}"),
        })?;
    let rx_fd = ready_rx.as_raw_fd();
    let tx_fd = ready_tx.as_raw_fd();

    let child = Box::new(move || -> isize {
        // SAFETY: tx_fd is this process's copy of the parent's write end;
        // closing it lets EOF arrive if the parent gives up.
        let _ = unsafe { libc::close(tx_fd) };
        if !wait_for_parent(rx_fd) {
            return CHILD_SETUP_FAILED;
        }
        match nix::unistd::execv(&exe_c, &argv_c) {
            Ok(never) => match never {},
            Err(_) => CHILD_SETUP_FAILED,
        }
    });

    let mut stack = vec![0u8; CLONE_STACK_SIZE];
    // SAFETY: the child runs in a copy of our address space (no CLONE_VM)
    // and only touches async-signal-safe calls before execv.
    let pid = unsafe {
        nix::sched::clone(child, &mut stack, flags, Some(Signal::SIGCHLD as i32))
    }
    .map_err(|e| UncError::Namespace {
        message: format!("clone with {flags:?} failed: {e}"),
    })?;
    drop(ready_rx);
    let child = NamespacedChild { pid };

    if let Err(e) = write_id_maps(pid.as_raw(), mapping) {
        child.kill();
        return Err(e);
    }

    let mut ready = std::fs::File::from(ready_tx);
    if let Err(e) = ready.write_all(&[1]) {
        child.kill();
        return Err(UncError::Namespace {
            message: format!("failed to release container process: {e}"),
        });
    }
    Ok(child)
}

/// Blocks until the parent writes the go-ahead byte. `false` on EOF.
fn wait_for_parent(fd: RawFd) -> bool {
    let mut byte = 0u8;
    loop {
        // SAFETY: fd is open in this process and `byte` is one writable byte.
        let n = unsafe { libc::read(fd, (&raw mut byte).cast(), 1) };
        if n == 1 {
            return true;
        }
        if n == 0 || Errno::last() != Errno::EINTR {
            return false;
        }
    }
}

fn cstring(bytes: &[u8]) -> Result<CString> {
    CString::new(bytes).map_err(|e| UncError::Config {
        message: format!("argument contains an interior NUL byte: {e}"),
    })
}
