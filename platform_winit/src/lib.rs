#![forbid(unsafe_code)]

use std::fmt;
use std::sync::Arc;

pub use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
pub use winit::event::{ElementState, Event, MouseButton, WindowEvent};
pub use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
pub use winit::keyboard::{KeyCode, PhysicalKey};
pub use winit::window::{Window, WindowId};

#[derive(Debug)]
pub enum WindowInitError {
    EventLoop(String),
    Window(winit::error::OsError),
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowInitError::EventLoop(message) => {
                write!(f, "event loop initialization failed: {}", message)
            }
            WindowInitError::Window(err) => write!(f, "window creation failed: {}", err),
        }
    }
}

impl std::error::Error for WindowInitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WindowInitError::EventLoop(_) => None,
            WindowInitError::Window(err) => Some(err),
        }
    }
}

/// Title and logical size of a top-level window.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowSpec {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl WindowSpec {
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width: width.max(1),
            height: height.max(1),
        }
    }
}

pub fn create_event_loop() -> Result<EventLoop<()>, WindowInitError> {
    EventLoop::new().map_err(|err| WindowInitError::EventLoop(err.to_string()))
}

/// Opens a window on a running (or about to run) event loop. Windows are
/// shared with their GPU surface, hence the `Arc`.
pub fn create_window(
    target: &EventLoopWindowTarget<()>,
    spec: &WindowSpec,
) -> Result<Arc<Window>, WindowInitError> {
    let window = winit::window::WindowBuilder::new()
        .with_title(spec.title.as_str())
        .with_inner_size(LogicalSize::new(spec.width, spec.height))
        .build(target)
        .map_err(WindowInitError::Window)?;
    Ok(Arc::new(window))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_spec_rejects_zero_sizes() {
        let spec = WindowSpec::new("Compilation Flow", 0, 900);
        assert_eq!((spec.width, spec.height), (1, 900));
    }
}
