//! macOS backend driving System Events through `osascript`.
//!
//! Windows are addressed as `<pid>:<index>`, the owning process id plus the
//! 1-based window index inside that process, so no title ever needs to be
//! quoted into a script.

use redzone_core::error::{RedzoneError, Result};

use super::{run_tool, Bounds, WindowBackend, WindowInfo};

const LIST_SCRIPT: &str = r#"
set out to ""
tell application "System Events"
    repeat with p in (every process whose visible is true)
        set pid to unix id of p
        set i to 0
        repeat with w in (every window of p)
            set i to i + 1
            try
                set {px, py} to position of w
                set {sw, sh} to size of w
                set out to out & pid & tab & i & tab & px & tab & py & tab & sw & tab & sh & tab & (name of w) & linefeed
            end try
        end repeat
    end repeat
end tell
return out
"#;

/// Lists, raises and clicks windows via AppleScript.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppleScriptBackend;

impl WindowBackend for AppleScriptBackend {
    fn list_windows(&self) -> Result<Vec<WindowInfo>> {
        let stdout = run_tool("osascript", &["-e", LIST_SCRIPT])?;
        Ok(stdout.lines().filter_map(parse_window_line).collect())
    }

    fn raise(&self, window: &WindowInfo) -> Result<()> {
        let (pid, index) = split_handle(&window.handle)?;
        let script = format!(
            "tell application \"System Events\"\n\
             set p to first process whose unix id is {pid}\n\
             set frontmost of p to true\n\
             perform action \"AXRaise\" of window {index} of p\n\
             end tell"
        );
        run_tool("osascript", &["-e", &script]).map(|_| ())
    }

    fn click(&self, x: i32, y: i32) -> Result<()> {
        let script = format!("tell application \"System Events\" to click at {{{x}, {y}}}");
        run_tool("osascript", &["-e", &script]).map(|_| ())
    }
}

/// Parse one tab-separated line produced by the listing script:
/// pid, index, x, y, width, height, title.
pub fn parse_window_line(line: &str) -> Option<WindowInfo> {
    let mut parts = line.splitn(7, '\t');
    let pid: u32 = parts.next()?.trim().parse().ok()?;
    let index: u32 = parts.next()?.trim().parse().ok()?;

    let mut nums = [0i32; 4];
    for slot in nums.iter_mut() {
        *slot = parts.next()?.trim().parse().ok()?;
    }
    let title = parts.next().unwrap_or_default().trim().to_string();

    Some(WindowInfo {
        handle: format!("{pid}:{index}"),
        title,
        bounds: Some(Bounds {
            x: nums[0],
            y: nums[1],
            width: nums[2],
            height: nums[3],
        }),
    })
}

fn split_handle(handle: &str) -> Result<(u32, u32)> {
    let invalid = || RedzoneError::Window(format!("malformed window handle: {handle}"));
    let (pid, index) = handle.split_once(':').ok_or_else(invalid)?;
    let pid = pid.parse().map_err(|_| invalid())?;
    let index = index.parse().map_err(|_| invalid())?;
    Ok((pid, index))
}
