//! Windows backend on top of the Win32 window-manager API.
//!
//! Window handles are carried as the decimal value of the `HWND`.

use std::ffi::c_void;

use redzone_core::error::{RedzoneError, Result};
use windows::Win32::Foundation::{BOOL, HWND, LPARAM, RECT};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_MOUSE, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP,
    MOUSEINPUT, MOUSE_EVENT_FLAGS,
};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetWindowRect, GetWindowTextLengthW, GetWindowTextW, IsIconic,
    IsWindowVisible, SetCursorPos, SetForegroundWindow, ShowWindow, SW_RESTORE,
};

use super::{Bounds, WindowBackend, WindowInfo};

#[derive(Debug, Clone, Copy, Default)]
pub struct Win32Backend;

impl WindowBackend for Win32Backend {
    fn list_windows(&self) -> Result<Vec<WindowInfo>> {
        let mut windows: Vec<WindowInfo> = Vec::new();
        // SAFETY: the callback only runs during this call and casts `lparam`
        // back to the `Vec` borrowed here.
        unsafe {
            EnumWindows(
                Some(collect_window),
                LPARAM(&mut windows as *mut Vec<WindowInfo> as isize),
            )
        }
        .map_err(|e| RedzoneError::Window(format!("EnumWindows: {e}")))?;
        Ok(windows)
    }

    fn raise(&self, window: &WindowInfo) -> Result<()> {
        let hwnd = parse_handle(&window.handle)?;
        // SAFETY: plain Win32 calls on a handle obtained from EnumWindows; a
        // stale handle makes them fail, not misbehave.
        unsafe {
            if IsIconic(hwnd).as_bool() {
                let _ = ShowWindow(hwnd, SW_RESTORE);
            }
            if SetForegroundWindow(hwnd).as_bool() {
                Ok(())
            } else {
                Err(RedzoneError::Window(format!(
                    "SetForegroundWindow refused {}",
                    window.handle
                )))
            }
        }
    }

    fn click(&self, x: i32, y: i32) -> Result<()> {
        // SAFETY: the INPUT array outlives the SendInput call.
        unsafe {
            SetCursorPos(x, y).map_err(|e| RedzoneError::Window(format!("SetCursorPos: {e}")))?;
            let inputs = [
                mouse_input(MOUSEEVENTF_LEFTDOWN),
                mouse_input(MOUSEEVENTF_LEFTUP),
            ];
            let sent = SendInput(&inputs, std::mem::size_of::<INPUT>() as i32);
            if sent as usize == inputs.len() {
                Ok(())
            } else {
                Err(RedzoneError::Window("SendInput was blocked".to_string()))
            }
        }
    }
}

unsafe extern "system" fn collect_window(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let windows = &mut *(lparam.0 as *mut Vec<WindowInfo>);

    if !IsWindowVisible(hwnd).as_bool() {
        return BOOL(1);
    }
    let len = GetWindowTextLengthW(hwnd);
    if len <= 0 {
        return BOOL(1);
    }

    let mut buf = vec![0u16; len as usize + 1];
    let copied = GetWindowTextW(hwnd, &mut buf);
    let title = String::from_utf16_lossy(&buf[..copied.max(0) as usize]);

    let mut rect = RECT::default();
    let bounds = GetWindowRect(hwnd, &mut rect).ok().map(|_| Bounds {
        x: rect.left,
        y: rect.top,
        width: rect.right - rect.left,
        height: rect.bottom - rect.top,
    });

    windows.push(WindowInfo {
        handle: (hwnd.0 as isize).to_string(),
        title,
        bounds,
    });
    BOOL(1)
}

fn mouse_input(flags: MOUSE_EVENT_FLAGS) -> INPUT {
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dwFlags: flags,
                ..Default::default()
            },
        },
    }
}

fn parse_handle(handle: &str) -> Result<HWND> {
    let raw: isize = handle
        .parse()
        .map_err(|_| RedzoneError::Window(format!("malformed window handle: {handle}")))?;
    Ok(HWND(raw as *mut c_void))
}
