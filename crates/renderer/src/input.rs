use std::collections::HashSet;

use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{Key as WinitKey, NamedKey};

/// The keys the cube reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Up,
    Down,
    Left,
    Right,
}

impl Key {
    pub const ALL: [Key; 5] = [Key::Escape, Key::Up, Key::Down, Key::Left, Key::Right];

    pub fn from_winit(key: &WinitKey) -> Option<Self> {
        match key {
            WinitKey::Named(NamedKey::Escape) => Some(Key::Escape),
            WinitKey::Named(NamedKey::ArrowUp) => Some(Key::Up),
            WinitKey::Named(NamedKey::ArrowDown) => Some(Key::Down),
            WinitKey::Named(NamedKey::ArrowLeft) => Some(Key::Left),
            WinitKey::Named(NamedKey::ArrowRight) => Some(Key::Right),
            _ => None,
        }
    }
}

/// Anything that can answer "is this key held right now".
pub trait KeySource {
    fn is_pressed(&self, key: Key) -> bool;
}

/// Held keys, fed from window events between frames.
#[derive(Debug, Default)]
pub struct KeyboardState {
    held: HashSet<Key>,
}

impl KeyboardState {
    /// Applies a winit key event. Returns true when the held set changed.
    pub fn handle_event(&mut self, event: &KeyEvent) -> bool {
        let Some(key) = Key::from_winit(&event.logical_key) else {
            return false;
        };
        match event.state {
            ElementState::Pressed => self.press(key),
            ElementState::Released => self.release(key),
        }
    }

    pub fn press(&mut self, key: Key) -> bool {
        self.held.insert(key)
    }

    pub fn release(&mut self, key: Key) -> bool {
        self.held.remove(&key)
    }

    /// Forgets every held key, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.held.clear();
    }
}

impl KeySource for KeyboardState {
    fn is_pressed(&self, key: Key) -> bool {
        self.held.contains(&key)
    }
}

/// Translation applied to the cube.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Offsets {
    pub vertical: f32,
    pub horizontal: f32,
}

impl Offsets {
    /// The `vec2 offset` uniform value: x is horizontal, y is vertical.
    pub fn as_uniform(self) -> [f32; 2] {
        [self.horizontal, self.vertical]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputOutcome {
    pub close_requested: bool,
}

/// Reads the five keys once and returns the updated offsets.
pub fn apply_input(keys: &impl KeySource, offsets: Offsets, step: f32) -> (Offsets, InputOutcome) {
    let mut next = offsets;
    let outcome = InputOutcome {
        close_requested: keys.is_pressed(Key::Escape),
    };

    if keys.is_pressed(Key::Down) {
        next.vertical -= step;
    }
    if keys.is_pressed(Key::Up) {
        next.vertical += step;
    }
    if keys.is_pressed(Key::Right) {
        next.horizontal += step;
    }
    if keys.is_pressed(Key::Left) {
        next.horizontal -= step;
    }

    (next, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(keys: &[Key]) -> KeyboardState {
        let mut state = KeyboardState::default();
        for key in keys {
            state.press(*key);
        }
        state
    }

    #[test]
    fn each_direction_moves_one_step() {
        let cases = [
            (Key::Up, Offsets { vertical: 0.01, horizontal: 0.0 }),
            (Key::Down, Offsets { vertical: -0.01, horizontal: 0.0 }),
            (Key::Right, Offsets { vertical: 0.0, horizontal: 0.01 }),
            (Key::Left, Offsets { vertical: 0.0, horizontal: -0.01 }),
        ];
        for (key, expected) in cases {
            let (offsets, outcome) = apply_input(&held(&[key]), Offsets::default(), 0.01);
            assert_eq!(offsets, expected, "{key:?}");
            assert!(!outcome.close_requested);
        }
    }

    #[test]
    fn diagonals_accumulate_on_both_axes() {
        let keys = held(&[Key::Up, Key::Left]);
        let mut offsets = Offsets::default();
        let mut expected = Offsets::default();
        for _ in 0..10 {
            offsets = apply_input(&keys, offsets, 0.01).0;
            expected.vertical += 0.01;
            expected.horizontal -= 0.01;
        }
        assert_eq!(offsets, expected);
        assert!(offsets.vertical > 0.09 && offsets.horizontal < -0.09);
    }

    #[test]
    fn opposite_keys_cancel() {
        let keys = held(&[Key::Up, Key::Down, Key::Left, Key::Right]);
        let (offsets, _) = apply_input(&keys, Offsets::default(), 0.01);
        assert_eq!(offsets, Offsets::default());
    }

    #[test]
    fn escape_requests_close_without_moving() {
        let (offsets, outcome) = apply_input(&held(&[Key::Escape]), Offsets::default(), 0.01);
        assert!(outcome.close_requested);
        assert_eq!(offsets, Offsets::default());
    }

    #[test]
    fn release_and_clear_drop_keys() {
        let mut state = held(&[Key::Up, Key::Right]);
        assert!(state.release(Key::Up));
        assert!(!state.release(Key::Up));
        assert!(state.is_pressed(Key::Right));
        state.clear();
        assert!(Key::ALL.iter().all(|key| !state.is_pressed(*key)));
    }

    #[test]
    fn maps_arrow_keys() {
        assert_eq!(
            Key::from_winit(&WinitKey::Named(NamedKey::ArrowUp)),
            Some(Key::Up)
        );
        assert_eq!(
            Key::from_winit(&WinitKey::Named(NamedKey::Escape)),
            Some(Key::Escape)
        );
        assert_eq!(Key::from_winit(&WinitKey::Named(NamedKey::Space)), None);
    }

    #[test]
    fn uniform_is_horizontal_then_vertical() {
        let offsets = Offsets {
            vertical: 0.5,
            horizontal: -0.25,
        };
        assert_eq!(offsets.as_uniform(), [-0.25, 0.5]);
    }
}
