//! Keyboard and mouse input.
//!
//! [`Input`] tracks raw window events and turns them into what the scene
//! understands: [`Command`]s for key presses and a [`HandForce`] while a
//! mouse button is held.
//!
//! | Input | Effect |
//! |-------|--------|
//! | Space | next shape |
//! | R | freeze / unfreeze |
//! | F | toggle the status line |
//! | 1-7 | jump to shape |
//! | Q, Esc | quit |
//! | Left mouse | scatter particles at the pointer |
//! | Right mouse | attract particles to the pointer |

use glam::{Vec2, Vec3};
use std::collections::HashSet;
use winit::event::{ElementState, MouseButton as WinitMouseButton, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

use crate::config::HandForceConfig;
use crate::particles::{ForceKind, HandForce};
use crate::scene::Command;

/// Scene units per NDC unit when placing the pointer in the scene.
const POINTER_SCALE: f32 = 100.0;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl From<WinitMouseButton> for MouseButton {
    fn from(btn: WinitMouseButton) -> Self {
        match btn {
            WinitMouseButton::Left => MouseButton::Left,
            WinitMouseButton::Right => MouseButton::Right,
            _ => MouseButton::Middle,
        }
    }
}

/// Keys the display reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Space,
    R,
    F,
    Q,
    Escape,
    /// Number row, 0-9.
    Digit(u8),
    Other,
}

impl From<WinitKeyCode> for KeyCode {
    fn from(key: WinitKeyCode) -> Self {
        match key {
            WinitKeyCode::Space => KeyCode::Space,
            WinitKeyCode::KeyR => KeyCode::R,
            WinitKeyCode::KeyF => KeyCode::F,
            WinitKeyCode::KeyQ => KeyCode::Q,
            WinitKeyCode::Escape => KeyCode::Escape,

            WinitKeyCode::Digit0 | WinitKeyCode::Numpad0 => KeyCode::Digit(0),
            WinitKeyCode::Digit1 | WinitKeyCode::Numpad1 => KeyCode::Digit(1),
            WinitKeyCode::Digit2 | WinitKeyCode::Numpad2 => KeyCode::Digit(2),
            WinitKeyCode::Digit3 | WinitKeyCode::Numpad3 => KeyCode::Digit(3),
            WinitKeyCode::Digit4 | WinitKeyCode::Numpad4 => KeyCode::Digit(4),
            WinitKeyCode::Digit5 | WinitKeyCode::Numpad5 => KeyCode::Digit(5),
            WinitKeyCode::Digit6 | WinitKeyCode::Numpad6 => KeyCode::Digit(6),
            WinitKeyCode::Digit7 | WinitKeyCode::Numpad7 => KeyCode::Digit(7),
            WinitKeyCode::Digit8 | WinitKeyCode::Numpad8 => KeyCode::Digit(8),
            WinitKeyCode::Digit9 | WinitKeyCode::Numpad9 => KeyCode::Digit(9),

            _ => KeyCode::Other,
        }
    }
}

/// The command bound to `key`, if any.
pub fn command_for_key(key: KeyCode) -> Option<Command> {
    match key {
        KeyCode::Space => Some(Command::TriggerNextShape),
        KeyCode::R => Some(Command::ToggleFreeze),
        KeyCode::F => Some(Command::ToggleStatus),
        KeyCode::Q | KeyCode::Escape => Some(Command::Quit),
        // Shapes are numbered from 1 on the keyboard
        KeyCode::Digit(n @ 1..=7) => Some(Command::SkipToShape(usize::from(n) - 1)),
        KeyCode::Digit(_) | KeyCode::Other => None,
    }
}

/// Place a pointer given in NDC on the scene's z = 0 plane.
pub fn ndc_to_scene(ndc: Vec2) -> Vec3 {
    Vec3::new(ndc.x * POINTER_SCALE, ndc.y * POINTER_SCALE, 0.0)
}

/// Input state tracking for keyboard and mouse.
///
/// Tracks both instantaneous events (pressed this frame) and continuous
/// state (currently held).
#[derive(Debug, Default)]
pub struct Input {
    keys_held: HashSet<KeyCode>,
    /// Presses in arrival order, cleared every frame.
    keys_pressed: Vec<KeyCode>,

    mouse_held: HashSet<MouseButton>,

    mouse_position: Vec2,
    mouse_ndc: Vec2,

    // Window size for NDC calculation
    window_size: (u32, u32),
}

impl Input {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            window_size: (width, height),
            ..Default::default()
        }
    }

    /// Check if a mouse button is currently held down.
    pub fn mouse_held(&self, button: MouseButton) -> bool {
        self.mouse_held.contains(&button)
    }

    /// Mouse position in normalized device coordinates (-1 to 1).
    ///
    /// Origin is at center of window. X increases to the right, Y upward.
    pub fn mouse_ndc(&self) -> Vec2 {
        self.mouse_ndc
    }

    /// Commands for the keys pressed this frame, in press order.
    pub fn commands(&self) -> impl Iterator<Item = Command> + '_ {
        self.keys_pressed.iter().filter_map(|&key| command_for_key(key))
    }

    /// The force the held mouse buttons apply this frame.
    ///
    /// Left scatters, right attracts; with both held, left wins.
    pub fn hand_force(&self, config: &HandForceConfig) -> Option<HandForce> {
        let kind = if self.mouse_held(MouseButton::Left) {
            ForceKind::Scatter
        } else if self.mouse_held(MouseButton::Right) {
            ForceKind::Attract
        } else {
            return None;
        };

        Some(HandForce {
            position: ndc_to_scene(self.mouse_ndc),
            kind,
            strength: config.strength,
            radius: config.radius,
        })
    }

    /// Called at the start of each frame to clear per-frame state.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
    }

    /// Update window size for NDC calculations.
    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
        self.update_ndc();
    }

    fn update_ndc(&mut self) {
        let (w, h) = self.window_size;
        if w > 0 && h > 0 {
            self.mouse_ndc = Vec2::new(
                (self.mouse_position.x / w as f32) * 2.0 - 1.0,
                1.0 - (self.mouse_position.y / h as f32) * 2.0, // Y flipped
            );
        }
    }

    fn press_key(&mut self, key: KeyCode) {
        // Only fire pressed event if not already held (no repeat)
        if self.keys_held.insert(key) {
            self.keys_pressed.push(key);
        }
    }

    fn release_key(&mut self, key: KeyCode) {
        self.keys_held.remove(&key);
    }

    fn move_cursor(&mut self, position: Vec2) {
        self.mouse_position = position;
        self.update_ndc();
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(keycode) = event.physical_key {
                    let key = KeyCode::from(keycode);
                    match event.state {
                        ElementState::Pressed => self.press_key(key),
                        ElementState::Released => self.release_key(key),
                    }
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let btn = MouseButton::from(*button);
                match state {
                    ElementState::Pressed => {
                        self.mouse_held.insert(btn);
                    }
                    ElementState::Released => {
                        self.mouse_held.remove(&btn);
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.move_cursor(Vec2::new(position.x as f32, position.y as f32));
            }

            WindowEvent::CursorLeft { .. } | WindowEvent::Focused(false) => {
                self.mouse_held.clear();
            }

            WindowEvent::Resized(size) => self.set_window_size(size.width, size.height),

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        assert_eq!(command_for_key(KeyCode::Space), Some(Command::TriggerNextShape));
        assert_eq!(command_for_key(KeyCode::R), Some(Command::ToggleFreeze));
        assert_eq!(command_for_key(KeyCode::F), Some(Command::ToggleStatus));
        assert_eq!(command_for_key(KeyCode::Q), Some(Command::Quit));
        assert_eq!(command_for_key(KeyCode::Escape), Some(Command::Quit));
        assert_eq!(command_for_key(KeyCode::Digit(1)), Some(Command::SkipToShape(0)));
        assert_eq!(command_for_key(KeyCode::Digit(7)), Some(Command::SkipToShape(6)));
        assert_eq!(command_for_key(KeyCode::Digit(0)), None);
        assert_eq!(command_for_key(KeyCode::Digit(8)), None);
        assert_eq!(command_for_key(KeyCode::Other), None);
    }

    #[test]
    fn test_winit_key_conversion() {
        assert_eq!(KeyCode::from(WinitKeyCode::KeyR), KeyCode::R);
        assert_eq!(KeyCode::from(WinitKeyCode::Digit3), KeyCode::Digit(3));
        assert_eq!(KeyCode::from(WinitKeyCode::Numpad3), KeyCode::Digit(3));
        assert_eq!(KeyCode::from(WinitKeyCode::KeyZ), KeyCode::Other);
    }

    #[test]
    fn test_key_state() {
        let mut input = Input::new(800, 600);
        assert!(!input.keys_held.contains(&KeyCode::Space));

        input.press_key(KeyCode::Space);
        input.press_key(KeyCode::Digit(2));
        assert!(input.keys_held.contains(&KeyCode::Space));
        assert!(input.keys_pressed.contains(&KeyCode::Space));

        let commands: Vec<Command> = input.commands().collect();
        assert_eq!(
            commands,
            vec![Command::TriggerNextShape, Command::SkipToShape(1)]
        );

        // After begin_frame, pressed is cleared but held remains
        input.begin_frame();
        assert!(input.keys_held.contains(&KeyCode::Space));
        assert!(!input.keys_pressed.contains(&KeyCode::Space));
        assert_eq!(input.commands().count(), 0);
    }

    #[test]
    fn test_held_key_does_not_repeat() {
        let mut input = Input::new(800, 600);
        input.press_key(KeyCode::R);
        input.begin_frame();
        input.press_key(KeyCode::R);
        assert!(!input.keys_pressed.contains(&KeyCode::R));

        input.release_key(KeyCode::R);
        input.press_key(KeyCode::R);
        assert!(input.keys_pressed.contains(&KeyCode::R));
    }

    #[test]
    fn test_mouse_ndc() {
        let mut input = Input::new(800, 600);

        input.move_cursor(Vec2::new(400.0, 300.0));
        assert!(input.mouse_ndc().length() < 1e-6);

        input.move_cursor(Vec2::new(800.0, 0.0));
        assert_eq!(input.mouse_ndc(), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_hand_force_from_mouse() {
        let config = HandForceConfig::default();
        let mut input = Input::new(200, 200);
        input.move_cursor(Vec2::new(150.0, 50.0));
        assert!(input.hand_force(&config).is_none());

        input.mouse_held.insert(MouseButton::Right);
        let force = input.hand_force(&config).unwrap();
        assert_eq!(force.kind, ForceKind::Attract);
        assert_eq!(force.position, Vec3::new(50.0, 50.0, 0.0));
        assert_eq!(force.strength, 5.0);
        assert_eq!(force.radius, 100.0);

        input.mouse_held.insert(MouseButton::Left);
        assert_eq!(input.hand_force(&config).unwrap().kind, ForceKind::Scatter);
    }
}
