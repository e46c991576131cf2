//! The abstract input surface the simulation reads from.

use crate::math::Vec2;

/// Logical keys; the platform layer maps physical keys onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    MoveLeft,
    MoveRight,
    Jump,
    DashLeft,
    DashRight,
}

impl Key {
    pub const COUNT: usize = 5;

    pub const ALL: [Key; Key::COUNT] = [
        Key::MoveLeft,
        Key::MoveRight,
        Key::Jump,
        Key::DashLeft,
        Key::DashRight,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Shoot and break.
    Left,
    /// Place.
    Right,
}

/// Held-state queries for one frame.
pub trait InputState {
    fn is_key_held(&self, key: Key) -> bool;
    fn is_mouse_held(&self, button: MouseButton) -> bool;
    /// Mouse position in world tile coordinates.
    fn mouse_pos(&self) -> Vec2;
}

/// A plain recorded input state, used by headless drivers and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    keys: [bool; Key::COUNT],
    left: bool,
    right: bool,
    mouse: Vec2,
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, key: Key) -> Self {
        self.press(key);
        self
    }

    pub fn with_mouse(mut self, button: MouseButton, pos: Vec2) -> Self {
        self.set_mouse_button(button, true);
        self.mouse = pos;
        self
    }

    pub fn press(&mut self, key: Key) {
        self.keys[key.index()] = true;
    }

    pub fn release(&mut self, key: Key) {
        self.keys[key.index()] = false;
    }

    pub fn set_mouse_button(&mut self, button: MouseButton, held: bool) {
        match button {
            MouseButton::Left => self.left = held,
            MouseButton::Right => self.right = held,
        }
    }

    pub fn set_mouse_pos(&mut self, pos: Vec2) {
        self.mouse = pos;
    }

    /// Release every key and button.
    pub fn clear(&mut self) {
        *self = InputSnapshot {
            mouse: self.mouse,
            ..InputSnapshot::default()
        };
    }
}

impl InputState for InputSnapshot {
    fn is_key_held(&self, key: Key) -> bool {
        self.keys[key.index()]
    }

    fn is_mouse_held(&self, button: MouseButton) -> bool {
        match button {
            MouseButton::Left => self.left,
            MouseButton::Right => self.right,
        }
    }

    fn mouse_pos(&self) -> Vec2 {
        self.mouse
    }
}
