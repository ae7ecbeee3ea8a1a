//! Host-independent input mapping.
//!
//! Native windows and the browser bridge both feed raw pointer/keyboard
//! events through here, so the same gesture and shortcut rules apply
//! everywhere.

use crate::controls::{ControlAction, ControlId};
use crate::page::Page;

/// Change to the orbit camera requested by the pointer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OrbitGesture {
    /// Drag in pixels.
    Rotate { dx: f32, dy: f32 },
    /// Drag in pixels.
    Pan { dx: f32, dy: f32 },
    /// Wheel steps; positive zooms in.
    Zoom { steps: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// Turns press/move/release sequences into orbit gestures.
#[derive(Debug, Default)]
pub struct PointerTracker {
    pressed: Option<PointerButton>,
    last: Option<(f32, f32)>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, button: PointerButton) {
        // First button wins until it is released.
        if self.pressed.is_none() {
            self.pressed = Some(button);
        }
    }

    pub fn release(&mut self, button: PointerButton) {
        if self.pressed == Some(button) {
            self.pressed = None;
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.pressed.is_some()
    }

    /// Record a cursor position, returning the drag gesture if a button is held.
    pub fn move_to(&mut self, x: f32, y: f32) -> Option<OrbitGesture> {
        let previous = self.last.replace((x, y));
        let (px, py) = previous?;
        let (dx, dy) = (x - px, y - py);
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        match self.pressed? {
            PointerButton::Primary => Some(OrbitGesture::Rotate { dx, dy }),
            PointerButton::Secondary => Some(OrbitGesture::Pan { dx, dy }),
        }
    }

    /// Cursor left the surface; the next move starts a fresh delta.
    pub fn leave(&mut self) {
        self.last = None;
        self.pressed = None;
    }

    /// Wheel input. `delta_y` follows the DOM convention: positive scrolls down (zoom out).
    pub fn wheel(&self, delta_y: f32) -> Option<OrbitGesture> {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return None;
        }
        Some(OrbitGesture::Zoom {
            steps: -delta_y.signum(),
        })
    }
}

/// Keys with a binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShortcutKey {
    Space,
    P,
    R,
    Q,
    A,
    W,
    S,
    E,
    D,
    Enter,
    Escape,
    Backspace,
}

/// What a shortcut asks for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    Control(ControlAction),
    Navigate(Page),
}

impl ShortcutKey {
    pub fn command(self) -> Command {
        use ControlAction::*;
        match self {
            ShortcutKey::Space => Command::Control(TogglePlaying),
            ShortcutKey::P => Command::Control(ToggleParticles),
            ShortcutKey::R => Command::Control(Reset),
            ShortcutKey::Q => Command::Control(Nudge(ControlId::Amplitude, 1)),
            ShortcutKey::A => Command::Control(Nudge(ControlId::Amplitude, -1)),
            ShortcutKey::W => Command::Control(Nudge(ControlId::Frequency, 1)),
            ShortcutKey::S => Command::Control(Nudge(ControlId::Frequency, -1)),
            ShortcutKey::E => Command::Control(Nudge(ControlId::Speed, 1)),
            ShortcutKey::D => Command::Control(Nudge(ControlId::Speed, -1)),
            ShortcutKey::Enter => Command::Navigate(Page::Explore),
            ShortcutKey::Escape | ShortcutKey::Backspace => Command::Navigate(Page::Landing),
        }
    }
}
