use anyhow::{Context as _, Result, anyhow};
use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt as _;

/// Single-writer guard for a dataset file.
///
/// Holds a PID file next to the dataset; the file is removed on drop.
#[derive(Debug)]
pub struct InstanceLock {
    lock_file_path: PathBuf,
    _lock_file: File,
}

impl InstanceLock {
    /// Take the lock at `lock_file_path`, clearing it first if the PID it
    /// names is no longer running.
    pub fn acquire(lock_file_path: impl Into<PathBuf>) -> Result<Self> {
        let lock_file_path = lock_file_path.into();

        if lock_file_path.exists() {
            Self::check_existing_lock(&lock_file_path)?;
        }

        let lock_file = Self::create_lock_file(&lock_file_path).with_context(|| {
            format!("Failed to create lock file {}", lock_file_path.display())
        })?;

        log::debug!("Acquired dataset lock at {}", lock_file_path.display());

        Ok(Self {
            lock_file_path,
            _lock_file: lock_file,
        })
    }

    fn check_existing_lock(lock_file_path: &Path) -> Result<()> {
        let contents = std::fs::read_to_string(lock_file_path)?;

        if let Ok(pid) = contents.trim().parse::<u32>() {
            if Self::is_process_running(pid) {
                return Err(anyhow!(
                    "Dataset is locked by running process {pid} ({})",
                    lock_file_path.display()
                ));
            }
            log::warn!("Found stale lock file with PID: {pid}, removing...");
        } else {
            log::warn!("Found invalid lock file, removing...");
        }
        std::fs::remove_file(lock_file_path)?;

        Ok(())
    }

    fn create_lock_file(lock_file_path: &Path) -> Result<File> {
        if let Some(parent) = lock_file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        // create_new: two writers racing past the stale check must not both win
        let mut options = OpenOptions::new();
        options.create_new(true).write(true);

        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(lock_file_path)?;

        let pid = std::process::id();
        write!(file, "{pid}")?;
        file.flush()?;

        Ok(file)
    }

    fn is_process_running(pid: u32) -> bool {
        #[cfg(unix)]
        {
            // kill -0 checks existence without delivering a signal
            use std::process::Command;

            match Command::new("kill").args(["-0", &pid.to_string()]).output() {
                Ok(output) => output.status.success(),
                Err(_) => false,
            }
        }

        #[cfg(not(unix))]
        {
            let _ = pid;
            log::warn!("Process existence check not implemented for this platform");
            false
        }
    }

    pub fn lock_file_path(&self) -> &Path {
        &self.lock_file_path
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        if self.lock_file_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.lock_file_path) {
                log::error!("Failed to remove lock file: {e}");
            } else {
                log::debug!("Released dataset lock");
            }
        }
    }
}
