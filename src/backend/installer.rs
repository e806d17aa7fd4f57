//! The appliance installer binary

use super::command::run_with_timeout;
use super::{BackendError, InstallerBinary};
use crate::utils::paths::default_input_path;
use crate::utils::system::absolutize;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// Runs the installer from the work directory, where it reads and writes
/// `default-input.json`. Paths handed to it are made absolute first.
#[derive(Debug, Clone)]
pub struct ExternalInstaller {
    binary: PathBuf,
    work_dir: PathBuf,
    timeout: Duration,
}

impl ExternalInstaller {
    pub fn new(binary: PathBuf, work_dir: PathBuf, timeout: Duration) -> Self {
        Self {
            binary,
            work_dir: absolutize(&work_dir),
            timeout,
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.current_dir(&self.work_dir);
        cmd
    }
}

impl InstallerBinary for ExternalInstaller {
    fn create_default_input(&self, disks: usize, tiering: bool) -> Result<PathBuf, BackendError> {
        let mut cmd = self.command();
        cmd.args(["-create-default-json", "-disks"]).arg(disks.to_string());
        if tiering {
            cmd.arg("-tiering");
        }
        run_with_timeout(&mut cmd, self.timeout)?;
        Ok(default_input_path(&self.work_dir))
    }

    fn install(&self, input: &Path, package: &Path) -> Result<String, BackendError> {
        let mut cmd = self.command();
        cmd.arg("-no-prompt").arg(absolutize(input)).arg(absolutize(package));
        let out = run_with_timeout(&mut cmd, self.timeout)?;
        Ok(out.stdout)
    }
}
