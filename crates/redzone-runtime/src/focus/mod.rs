//! Window focus control.
//!
//! [`FocusController::activate`] polls the platform's window list for a title
//! containing a hint and brings the first match to the front. Platform
//! specifics live behind [`WindowBackend`]:
//!
//! * [`wmctrl::WmctrlBackend`] – X11 desktops, via `wmctrl` and `xdotool`;
//! * [`applescript::AppleScriptBackend`] – macOS, via `osascript`;
//! * `win32::Win32Backend` – Windows, via the Win32 API.

pub mod applescript;
pub mod wmctrl;
#[cfg(windows)]
pub mod win32;

use std::sync::Arc;
use std::time::{Duration, Instant};

use redzone_core::error::Result;

// ── Public types ──────────────────────────────────────────────────────────────

/// Screen rectangle of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// One on-screen window as reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    /// Backend-specific identifier used to address the window again.
    pub handle: String,
    pub title: String,
    pub bounds: Option<Bounds>,
}

/// Platform window-manager operations needed to surface a window.
///
/// Implementations may block (shelling out, Win32 calls); the controller runs
/// them on tokio's blocking pool.
pub trait WindowBackend: Send + Sync + 'static {
    /// Visible top-level windows.
    fn list_windows(&self) -> Result<Vec<WindowInfo>>;

    /// Bring `window` to the foreground.
    fn raise(&self, window: &WindowInfo) -> Result<()>;

    /// Left-click at absolute screen coordinates.
    fn click(&self, x: i32, y: i32) -> Result<()>;
}

/// Default backend for the OS this binary was built for.
#[cfg(windows)]
pub fn native_backend() -> win32::Win32Backend {
    win32::Win32Backend
}

/// Default backend for the OS this binary was built for.
#[cfg(target_os = "macos")]
pub fn native_backend() -> applescript::AppleScriptBackend {
    applescript::AppleScriptBackend
}

/// Default backend for the OS this binary was built for.
#[cfg(not(any(windows, target_os = "macos")))]
pub fn native_backend() -> wmctrl::WmctrlBackend {
    wmctrl::WmctrlBackend
}

// ── FocusController ───────────────────────────────────────────────────────────

/// Default pause between window-list scans.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(300);

/// Finds windows by title hint and brings them to the front.
pub struct FocusController<B> {
    backend: Arc<B>,
    retry_interval: Duration,
}

impl<B: WindowBackend> FocusController<B> {
    pub fn new(backend: B, retry_interval: Duration) -> Self {
        Self {
            backend: Arc::new(backend),
            retry_interval,
        }
    }

    pub fn backend(&self) -> &B {
        self.backend.as_ref()
    }

    /// Surface the first window whose title contains `hint`
    /// (case-insensitive), retrying until `timeout` elapses.
    ///
    /// A matching window that refuses to be raised is clicked at its centre
    /// instead; if that fails too the next match is tried. At least one scan
    /// is made even with a zero timeout. An empty hint never matches.
    pub async fn activate(&self, hint: &str, timeout: Duration) -> bool {
        let needle = hint.trim().to_lowercase();
        if needle.is_empty() {
            tracing::warn!("refusing to activate a window with an empty title hint");
            return false;
        }

        let deadline = Instant::now() + timeout;
        loop {
            if self.scan_blocking(&needle).await {
                return true;
            }
            if Instant::now() >= deadline {
                tracing::debug!(hint, ?timeout, "no window matched before timeout");
                return false;
            }
            tokio::time::sleep(self.retry_interval).await;
        }
    }

    /// Run [`scan_once`] off the runtime thread so a slow backend call does
    /// not hold up other tasks such as Ctrl-C handling.
    async fn scan_blocking(&self, needle: &str) -> bool {
        let backend = Arc::clone(&self.backend);
        let needle = needle.to_string();
        match tokio::task::spawn_blocking(move || scan_once(backend.as_ref(), &needle)).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(error = %e, "window scan task failed");
                false
            }
        }
    }
}

/// One pass over the window list. `needle` is already lowercase.
fn scan_once<B: WindowBackend>(backend: &B, needle: &str) -> bool {
    let windows = match backend.list_windows() {
        Ok(w) => w,
        Err(e) => {
            tracing::debug!(error = %e, "window listing failed");
            return false;
        }
    };

    for window in windows
        .iter()
        .filter(|w| !w.title.is_empty() && w.title.to_lowercase().contains(needle))
    {
        match backend.raise(window) {
            Ok(()) => {
                tracing::debug!(title = %window.title, "window raised");
                return true;
            }
            Err(e) => {
                tracing::debug!(title = %window.title, error = %e, "raise failed; trying click");
            }
        }

        let Some(bounds) = window.bounds else {
            continue;
        };
        let (x, y) = bounds.center();
        match backend.click(x, y) {
            Ok(()) => {
                tracing::debug!(title = %window.title, x, y, "window clicked");
                return true;
            }
            Err(e) => {
                tracing::debug!(title = %window.title, error = %e, "click fallback failed");
            }
        }
    }

    false
}

/// Run `program` with `args`, mapping spawn failures and non-zero exits to
/// [`RedzoneError::Window`](redzone_core::RedzoneError::Window). Returns stdout.
pub(crate) fn run_tool(program: &str, args: &[&str]) -> Result<String> {
    use redzone_core::RedzoneError;

    let output = std::process::Command::new(program)
        .args(args)
        .output()
        .map_err(|e| RedzoneError::Window(format!("{program}: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RedzoneError::Window(format!(
            "{program} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
