//! Browser launching.
//!
//! Each service gets its own persistent browser profile so that logins
//! survive between runs. Launches are fire-and-forget: the browser outlives
//! the controller, and a failed launch only means that game's window will
//! never be found.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use redzone_core::error::{RedzoneError, Result};
use redzone_core::models::ServiceBinding;

/// Spawns isolated browser instances, one profile directory per service.
#[derive(Debug, Clone)]
pub struct BrowserLauncher {
    executable: PathBuf,
    profile_root: PathBuf,
}

impl BrowserLauncher {
    pub fn new(executable: impl Into<PathBuf>, profile_root: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            profile_root: profile_root.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// `<profile_root>/<service>`; does not touch the filesystem.
    pub fn profile_dir(&self, service: &str) -> PathBuf {
        self.profile_root.join(service)
    }

    /// Create the service's profile directory (and parents) if absent.
    pub fn ensure_profile_dir(&self, service: &str) -> Result<PathBuf> {
        let dir = self.profile_dir(service);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// The browser invocation for one window.
    pub fn build_command(&self, profile_dir: &Path, url: &str) -> Command {
        let mut command = Command::new(&self.executable);
        command
            .arg(format!("--user-data-dir={}", profile_dir.display()))
            .arg("--no-first-run")
            .arg("--new-window")
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        command
    }

    /// Spawn the browser and return its PID.
    pub fn try_launch(&self, service: &str, url: &str) -> Result<u32> {
        let profile_dir = self.ensure_profile_dir(service)?;
        let child = self
            .build_command(&profile_dir, url)
            .spawn()
            .map_err(|source| RedzoneError::Launch {
                browser: self.executable.clone(),
                source,
            })?;

        let pid = child.id();
        spawn_reaper_thread(child);
        Ok(pid)
    }

    /// Spawn the browser, logging and swallowing any failure.
    pub fn launch(&self, service: &str, url: &str) -> bool {
        match self.try_launch(service, url) {
            Ok(pid) => {
                tracing::debug!(
                    service,
                    url,
                    pid,
                    browser = %self.executable().display(),
                    "browser launched"
                );
                true
            }
            Err(e) => {
                tracing::warn!(
                    service,
                    url,
                    browser = %self.executable().display(),
                    error = %e,
                    "browser launch failed"
                );
                false
            }
        }
    }

    /// Launch the window for `binding` and flag it as launched on success.
    pub fn launch_binding(&self, binding: &mut ServiceBinding) -> bool {
        let launched = self.launch(&binding.service, &binding.url);
        if launched {
            binding.launched = true;
        }
        launched
    }
}

/// Reap the child on a detached thread so it never lingers as a zombie.
///
/// Dropping a `Child` neither waits for nor kills it, so the browser keeps
/// running after the controller exits.
fn spawn_reaper_thread(mut child: std::process::Child) {
    thread::spawn(move || {
        let _ = child.wait();
    });
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use redzone_core::models::TrackedGame;
    use std::ffi::OsStr;
    use tempfile::TempDir;

    fn binding(service: &str, profile_root: &Path) -> ServiceBinding {
        ServiceBinding::new(
            TrackedGame {
                id: "1".to_string(),
                display_name: "Utah vs BYU".to_string(),
                href: "https://watch.example/1".to_string(),
                feed_href: None,
            },
            service.to_string(),
            "https://watch.example/1".to_string(),
            profile_root.join(service),
        )
    }

    #[test]
    fn test_profile_dir_is_per_service() {
        let launcher = BrowserLauncher::new("/usr/bin/google-chrome", "/home/fan/.profiles");
        assert_eq!(
            launcher.profile_dir("espn"),
            PathBuf::from("/home/fan/.profiles/espn")
        );
        assert_eq!(launcher.executable(), Path::new("/usr/bin/google-chrome"));
    }

    #[test]
    fn test_ensure_profile_dir_creates_nested_dirs() {
        let tmp = TempDir::new().expect("tempdir");
        let launcher = BrowserLauncher::new("chrome", tmp.path().join("a").join("b"));

        let dir = launcher.ensure_profile_dir("peacock").expect("create");
        assert!(dir.is_dir());
        // Idempotent.
        launcher.ensure_profile_dir("peacock").expect("create again");
    }

    #[test]
    fn test_build_command_arguments() {
        let launcher = BrowserLauncher::new("/opt/chrome", "/p");
        let command = launcher.build_command(Path::new("/p/fox"), "https://watch.example/9");

        assert_eq!(command.get_program(), OsStr::new("/opt/chrome"));
        let args: Vec<&OsStr> = command.get_args().collect();
        assert_eq!(
            args,
            vec![
                OsStr::new("--user-data-dir=/p/fox"),
                OsStr::new("--no-first-run"),
                OsStr::new("--new-window"),
                OsStr::new("https://watch.example/9"),
            ]
        );
    }

    #[test]
    fn test_launch_missing_browser_is_swallowed() {
        let tmp = TempDir::new().expect("tempdir");
        let launcher = BrowserLauncher::new(tmp.path().join("no-such-browser"), tmp.path());

        assert!(matches!(
            launcher.try_launch("espn", "https://watch.example"),
            Err(RedzoneError::Launch { .. })
        ));
        assert!(!launcher.launch("espn", "https://watch.example"));

        let mut b = binding("espn", tmp.path());
        assert!(!launcher.launch_binding(&mut b));
        assert!(!b.launched);
        // The profile directory is still prepared for the next attempt.
        assert!(tmp.path().join("espn").is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_launch_binding_marks_launched() {
        let tmp = TempDir::new().expect("tempdir");
        // `true` accepts and ignores the browser arguments.
        let launcher = BrowserLauncher::new("true", tmp.path());

        let mut b = binding("espn", tmp.path());
        assert!(launcher.launch_binding(&mut b));
        assert!(b.launched);
    }
}
