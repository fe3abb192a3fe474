use serde::{Deserialize, Serialize};

/// Handle for one scheduled animation-frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRequestId(pub u64);

/// Environment side effects the ROI engine drives.
///
/// Implemented by the embedding UI layer: text selection, the document-level
/// "dragging" marker, the renderer's native tooltip, window-scoped pointer
/// listeners and frame scheduling.
pub trait InteractionHost {
    fn set_text_selection_enabled(&mut self, enabled: bool);

    fn set_dragging_marker(&mut self, active: bool);

    fn set_native_tooltip_suppressed(&mut self, suppressed: bool);

    /// Starts or stops routing window-level move/up/cancel/leave events.
    fn set_window_listeners(&mut self, _active: bool) {}

    /// Schedules one frame callback.
    ///
    /// Returning `None` means the host has no frame scheduler; updates are
    /// then applied immediately.
    fn request_animation_frame(&mut self) -> Option<FrameRequestId> {
        None
    }

    fn cancel_animation_frame(&mut self, _id: FrameRequestId) {}
}

/// Host that ignores every side effect.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullInteractionHost;

impl InteractionHost for NullInteractionHost {
    fn set_text_selection_enabled(&mut self, _enabled: bool) {}

    fn set_dragging_marker(&mut self, _active: bool) {}

    fn set_native_tooltip_suppressed(&mut self, _suppressed: bool) {}
}

/// Proof that drag side effects are applied on the host.
///
/// Acquired when a drag starts; `release` reverts every effect. There is at
/// most one session per engine.
#[derive(Debug)]
#[must_use = "a drag session must be released"]
pub struct DragSession {
    _private: (),
}

impl DragSession {
    pub fn acquire<H: InteractionHost + ?Sized>(host: &mut H) -> Self {
        host.set_text_selection_enabled(false);
        host.set_dragging_marker(true);
        host.set_window_listeners(true);
        Self { _private: () }
    }

    pub fn release<H: InteractionHost + ?Sized>(self, host: &mut H) {
        restore_host(host);
    }
}

/// Reverts every drag side effect, whether or not a session is held.
pub fn restore_host<H: InteractionHost + ?Sized>(host: &mut H) {
    host.set_window_listeners(false);
    host.set_dragging_marker(false);
    host.set_text_selection_enabled(true);
}
