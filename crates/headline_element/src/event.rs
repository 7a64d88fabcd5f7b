//! Host events

/// Control flow after handling an event
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ControlFlow {
    /// Keep the host running
    #[default]
    Continue,
    /// Stop the host
    Exit,
}

/// Events delivered by the host environment
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Window-related event
    Window(WindowEvent),
    /// Frame tick: commit layout, run next-paint work, advance animations
    Frame {
        /// Time since the previous frame in milliseconds
        dt_ms: f32,
    },
}

/// Window events
#[derive(Clone, Debug, PartialEq)]
pub enum WindowEvent {
    /// Viewport was resized
    Resized {
        /// New width in pixels
        width: u32,
        /// New height in pixels
        height: u32,
    },
    /// The host is shutting down; every element detaches
    CloseRequested,
}

impl Event {
    pub fn resized(width: u32, height: u32) -> Self {
        Event::Window(WindowEvent::Resized { width, height })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_flow_default() {
        assert_eq!(ControlFlow::default(), ControlFlow::Continue);
    }

    #[test]
    fn test_resized_helper() {
        assert_eq!(
            Event::resized(800, 600),
            Event::Window(WindowEvent::Resized {
                width: 800,
                height: 600
            })
        );
    }
}
