//! Window input state.
//!
//! Collects the winit events the swarm cares about: cursor position (for
//! the pointer and orbit drag), mouse buttons, and a few keys. Per-frame
//! edges (just pressed, drag delta) are cleared by `begin_frame`.

use glam::Vec2;
use std::collections::HashSet;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::PhysicalKey;

pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;

/// Current input state.
#[derive(Debug, Default)]
pub struct Input {
    keys_pressed: HashSet<KeyCode>,
    mouse_held: HashSet<MouseButton>,
    mouse_position: Vec2,
    mouse_ndc: Option<Vec2>,
    mouse_delta: Vec2,
    window_size: (u32, u32),
}

impl Input {
    pub fn new() -> Self {
        Self {
            window_size: (800, 600),
            ..Default::default()
        }
    }

    /// Key went down this frame.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn mouse_held(&self, button: MouseButton) -> bool {
        self.mouse_held.contains(&button)
    }

    /// Cursor position in window pixels.
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// Cursor in normalized device coordinates (-1 to 1, Y up), or `None`
    /// before the cursor has entered the window.
    pub fn mouse_ndc(&self) -> Option<Vec2> {
        self.mouse_ndc
    }

    /// Cursor movement since last frame in pixels.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Clear per-frame edges.
    pub(crate) fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.mouse_delta = Vec2::ZERO;
    }

    pub(crate) fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
        self.refresh_ndc();
    }

    fn refresh_ndc(&mut self) {
        let (w, h) = self.window_size;
        if w > 0 && h > 0 && self.mouse_ndc.is_some() {
            self.mouse_ndc = Some(pixels_to_ndc(self.mouse_position, w, h));
        }
    }

    /// Process a winit window event.
    pub(crate) fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    if event.state == ElementState::Pressed && !event.repeat {
                        self.keys_pressed.insert(code);
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => {
                    self.mouse_held.insert(*button);
                }
                ElementState::Released => {
                    self.mouse_held.remove(button);
                }
            },
            WindowEvent::CursorMoved { position, .. } => {
                let new_pos = Vec2::new(position.x as f32, position.y as f32);
                if self.mouse_ndc.is_some() {
                    self.mouse_delta += new_pos - self.mouse_position;
                }
                self.mouse_position = new_pos;
                let (w, h) = self.window_size;
                if w > 0 && h > 0 {
                    self.mouse_ndc = Some(pixels_to_ndc(new_pos, w, h));
                }
            }
            _ => {}
        }
    }
}

/// Window pixel position to NDC, Y flipped so up is positive.
pub fn pixels_to_ndc(position: Vec2, width: u32, height: u32) -> Vec2 {
    Vec2::new(
        (position.x / width as f32) * 2.0 - 1.0,
        1.0 - (position.y / height as f32) * 2.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixels_to_ndc() {
        let center = pixels_to_ndc(Vec2::new(400.0, 300.0), 800, 600);
        assert!(center.length() < 1e-6);

        let top_left = pixels_to_ndc(Vec2::ZERO, 800, 600);
        assert_eq!(top_left, Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn test_no_ndc_before_cursor() {
        let mut input = Input::new();
        assert!(input.mouse_ndc().is_none());
        input.set_window_size(1024, 768);
        assert!(input.mouse_ndc().is_none());
    }

    #[test]
    fn test_begin_frame_clears_edges() {
        let mut input = Input::new();
        input.keys_pressed.insert(KeyCode::Space);
        input.mouse_delta = Vec2::ONE;
        input.begin_frame();
        assert!(!input.key_pressed(KeyCode::Space));
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
    }
}
