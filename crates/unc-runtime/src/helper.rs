//! Invocation of the privileged network helper.

use std::process::{Command, Stdio};

use unc_common::constants::NETWORK_HELPER;
use unc_common::error::{Result, UncError};

/// The external `unet` executable, found on `PATH` at call time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkHelper {
    program: String,
}

impl NetworkHelper {
    /// Uses `program` (a name looked up on `PATH`, or a path) as the helper.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The configured helper program.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Runs the helper for container `pid` and waits for it.
    ///
    /// # Errors
    ///
    /// Returns [`UncError::HelperSpawn`] if the helper cannot be found or
    /// started, and [`UncError::NetworkHelper`] carrying its combined
    /// stdout and stderr if it exits unsuccessfully.
    pub fn attach(&self, pid: i32) -> Result<()> {
        let spawn_error = |source| UncError::HelperSpawn {
            program: self.program.clone(),
            source,
        };
        let path = which::which(&self.program)
            .map_err(|e| spawn_error(std::io::Error::new(std::io::ErrorKind::NotFound, e)))?;

        tracing::debug!(helper = %path.display(), pid, "putting veth interface into container");
        let output = Command::new(&path)
            .arg(pid.to_string())
            .stdin(Stdio::null())
            .output()
            .map_err(spawn_error)?;

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(UncError::NetworkHelper {
                program: self.program.clone(),
                status: output.status.to_string(),
                output: combined.trim_end().to_string(),
            });
        }
        tracing::debug!(pid, "network setup done");
        Ok(())
    }
}

impl Default for NetworkHelper {
    fn default() -> Self {
        Self::new(NETWORK_HELPER)
    }
}
