//! Edge-triggered input state, filled in by the host between frames.

use super::layout::Vec2;

#[derive(Debug, Default, Copy, Clone)]
pub struct DigitalInput {
    pub down: bool,
    pressed: bool,
    released: bool
}

impl DigitalInput {
    pub fn press(&mut self) {
        if !self.down {
            self.pressed = true;
        }
        self.down = true;
    }

    pub fn release(&mut self) {
        if self.down {
            self.released = true;
        }
        self.down = false;
    }

    /// Went down since the last frame.
    pub fn was_pressed(&self) -> bool {
        self.pressed
    }

    /// Went up since the last frame.
    pub fn was_released(&self) -> bool {
        self.released
    }

    fn end_frame(&mut self) {
        self.pressed = false;
        self.released = false;
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Key {
    Reset,
    Undo,
    ToggleDrawMode,
    ShowRules,
    SelectCardBack,
    Confirm,
    Digit(u8)
}

#[derive(Debug, Default, Clone)]
pub struct Input {
    pub mouse_pos: Vec2,
    pub mouse_delta: Vec2,
    pub left: DigitalInput,
    pub right: DigitalInput,
    pub left_down_pos: Vec2,
    pub right_down_pos: Vec2,
    held_keys: Vec<Key>,
    pressed_keys: Vec<Key>
}

impl Input {
    pub fn mouse_move(&mut self, pos: Vec2) {
        self.mouse_delta += pos - self.mouse_pos;
        self.mouse_pos = pos;
    }

    pub fn mouse_down(&mut self, button: MouseButton, pos: Vec2) {
        self.mouse_move(pos);
        match button {
            MouseButton::Left => {
                self.left.press();
                self.left_down_pos = pos;
            }
            MouseButton::Right => {
                self.right.press();
                self.right_down_pos = pos;
            }
        }
    }

    pub fn mouse_up(&mut self, button: MouseButton, pos: Vec2) {
        self.mouse_move(pos);
        match button {
            MouseButton::Left => self.left.release(),
            MouseButton::Right => self.right.release()
        }
    }

    pub fn key_down(&mut self, key: Key) {
        if !self.held_keys.contains(&key) {
            self.held_keys.push(key);
            self.pressed_keys.push(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.held_keys.retain(|&held| held != key);
    }

    /// Keys that went down since the last frame, in order.
    pub fn pressed_keys(&self) -> &[Key] {
        &self.pressed_keys
    }

    pub fn end_frame(&mut self) {
        self.left.end_frame();
        self.right.end_frame();
        self.pressed_keys.clear();
        self.mouse_delta = Vec2::ZERO;
    }
}
