//! Joypad input injection

use bitflags::bitflags;
use std::fmt;

/// Number of player slots a core can be fed from
pub const MAX_PLAYERS: u8 = 4;

/// Joypad input the front-end can inject, numbered like the libretro
/// `RETRO_DEVICE_ID_JOYPAD_*` constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum InjectedInput {
    B = 0,
    Y = 1,
    Select = 2,
    Start = 3,
    Up = 4,
    Down = 5,
    Left = 6,
    Right = 7,
    A = 8,
    X = 9,
}

impl InjectedInput {
    pub fn all() -> [InjectedInput; 10] {
        [
            InjectedInput::B,
            InjectedInput::Y,
            InjectedInput::Select,
            InjectedInput::Start,
            InjectedInput::Up,
            InjectedInput::Down,
            InjectedInput::Left,
            InjectedInput::Right,
            InjectedInput::A,
            InjectedInput::X,
        ]
    }

    /// libretro device id
    pub fn device_id(self) -> u32 {
        self as u32
    }

    pub fn from_device_id(id: u32) -> Option<Self> {
        Self::all().into_iter().find(|input| input.device_id() == id)
    }

    pub fn button(self) -> JoypadButtons {
        JoypadButtons::from_bits_truncate(1 << self.device_id())
    }

    pub fn name(self) -> &'static str {
        match self {
            InjectedInput::B => "b",
            InjectedInput::Y => "y",
            InjectedInput::Select => "select",
            InjectedInput::Start => "start",
            InjectedInput::Up => "up",
            InjectedInput::Down => "down",
            InjectedInput::Left => "left",
            InjectedInput::Right => "right",
            InjectedInput::A => "a",
            InjectedInput::X => "x",
        }
    }

    /// Parse a button name, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|input| input.name().eq_ignore_ascii_case(name))
    }
}

bitflags! {
    /// Joypad button flags, one bit per libretro device id
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct JoypadButtons: u16 {
        const B      = 1 << 0;
        const Y      = 1 << 1;
        const SELECT = 1 << 2;
        const START  = 1 << 3;
        const UP     = 1 << 4;
        const DOWN   = 1 << 5;
        const LEFT   = 1 << 6;
        const RIGHT  = 1 << 7;
        const A      = 1 << 8;
        const X      = 1 << 9;
    }
}

/// Player the input is delivered to (0-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PlayerSlot(u8);

impl PlayerSlot {
    pub const PLAYER_1: PlayerSlot = PlayerSlot(0);

    pub fn new(index: u8) -> Option<Self> {
        (index < MAX_PLAYERS).then_some(Self(index))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0 + 1)
    }
}

/// Latched joypad state for one player.
///
/// Injected presses stay latched until the next poll so a press that lands
/// between two frames is still seen by the core.
#[derive(Debug, Clone, Default)]
pub struct JoypadState {
    latched: JoypadButtons,
}

impl JoypadState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, input: InjectedInput) {
        self.latched |= input.button();
    }

    pub fn is_pressed(&self, input: InjectedInput) -> bool {
        self.latched.contains(input.button())
    }

    pub fn buttons(&self) -> JoypadButtons {
        self.latched
    }

    /// Return the latched buttons and release them
    pub fn poll(&mut self) -> JoypadButtons {
        std::mem::take(&mut self.latched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_ids() {
        assert_eq!(InjectedInput::B.device_id(), 0);
        assert_eq!(InjectedInput::Start.device_id(), 3);
        assert_eq!(InjectedInput::X.device_id(), 9);
        assert_eq!(InjectedInput::from_device_id(8), Some(InjectedInput::A));
        assert_eq!(InjectedInput::from_device_id(10), None);
    }

    #[test]
    fn test_names() {
        assert_eq!(InjectedInput::from_name("START"), Some(InjectedInput::Start));
        assert_eq!(InjectedInput::from_name("a"), Some(InjectedInput::A));
        assert_eq!(InjectedInput::from_name("l2"), None);
        for input in InjectedInput::all() {
            assert_eq!(InjectedInput::from_name(input.name()), Some(input));
        }
    }

    #[test]
    fn test_button_mapping() {
        assert_eq!(InjectedInput::Select.button(), JoypadButtons::SELECT);
        assert_eq!(InjectedInput::Right.button(), JoypadButtons::RIGHT);
        assert_eq!(InjectedInput::X.button(), JoypadButtons::X);
    }

    #[test]
    fn test_player_slot() {
        assert_eq!(PlayerSlot::PLAYER_1.index(), 0);
        assert_eq!(PlayerSlot::new(3).map(|p| p.index()), Some(3));
        assert!(PlayerSlot::new(MAX_PLAYERS).is_none());
        assert_eq!(format!("{}", PlayerSlot::PLAYER_1), "P1");
    }

    #[test]
    fn test_joypad_latch() {
        let mut state = JoypadState::new();
        assert!(!state.is_pressed(InjectedInput::A));

        state.press(InjectedInput::A);
        state.press(InjectedInput::Start);
        assert!(state.is_pressed(InjectedInput::A));

        let polled = state.poll();
        assert_eq!(polled, JoypadButtons::A | JoypadButtons::START);
        assert!(state.buttons().is_empty());
    }
}
