//! X11 backend built on the `wmctrl` and `xdotool` command-line tools.

use redzone_core::error::Result;

use super::{run_tool, Bounds, WindowBackend, WindowInfo};

/// Lists and raises windows with `wmctrl`; clicks with `xdotool`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WmctrlBackend;

impl WindowBackend for WmctrlBackend {
    fn list_windows(&self) -> Result<Vec<WindowInfo>> {
        let stdout = run_tool("wmctrl", &["-lG"])?;
        Ok(stdout.lines().filter_map(parse_wmctrl_line).collect())
    }

    fn raise(&self, window: &WindowInfo) -> Result<()> {
        run_tool("wmctrl", &["-i", "-a", &window.handle]).map(|_| ())
    }

    fn click(&self, x: i32, y: i32) -> Result<()> {
        let (x, y) = (x.to_string(), y.to_string());
        run_tool("xdotool", &["mousemove", "--sync", &x, &y, "click", "1"]).map(|_| ())
    }
}

/// Parse one line of `wmctrl -lG`:
///
/// ```text
/// 0x03a00003  0 0    28   1920 1052 host Georgia vs Alabama - Google Chrome
/// ```
///
/// Columns are id, desktop, x, y, width, height, client host, then the
/// title, which may contain any whitespace and may be empty.
pub fn parse_wmctrl_line(line: &str) -> Option<WindowInfo> {
    let mut rest = line;
    let mut fields = Vec::with_capacity(7);
    for _ in 0..7 {
        let trimmed = rest.trim_start();
        let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
        if end == 0 {
            return None;
        }
        fields.push(&trimmed[..end]);
        rest = &trimmed[end..];
    }

    let handle = fields[0];
    if !handle.starts_with("0x") {
        return None;
    }

    let nums: Vec<i32> = fields[2..6]
        .iter()
        .map(|f| f.parse::<i32>())
        .collect::<std::result::Result<_, _>>()
        .ok()?;

    Some(WindowInfo {
        handle: handle.to_string(),
        title: rest.trim().to_string(),
        bounds: Some(Bounds {
            x: nums[0],
            y: nums[1],
            width: nums[2],
            height: nums[3],
        }),
    })
}
