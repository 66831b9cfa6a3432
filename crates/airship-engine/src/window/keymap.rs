use winit::event::ElementState;
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};

use airship_core::input::{Key, KeyAction, KeyEvent, KeyMods};

/// Translates a winit keyboard event into the engine's `KeyEvent`.
pub(crate) fn translate_key(event: &winit::event::KeyEvent, mods: KeyMods) -> KeyEvent {
    let (key, scancode) = map_key(event.physical_key);
    KeyEvent {
        key,
        scancode,
        action: key_action(event.state, event.repeat),
        mods,
    }
}

pub(crate) fn key_action(state: ElementState, repeat: bool) -> KeyAction {
    match (state, repeat) {
        (ElementState::Pressed, false) => KeyAction::Press,
        (ElementState::Pressed, true) => KeyAction::Held,
        (ElementState::Released, _) => KeyAction::Release,
    }
}

pub(crate) fn map_modifiers(m: ModifiersState) -> KeyMods {
    KeyMods {
        shift: m.shift_key(),
        ctrl: m.control_key(),
        alt: m.alt_key(),
        super_key: m.super_key(),
    }
}

pub(crate) fn map_key(pk: PhysicalKey) -> (Key, u32) {
    match pk {
        PhysicalKey::Code(code) => {
            let key = match code {
                KeyCode::Escape => Key::Escape,
                KeyCode::Enter => Key::Enter,
                KeyCode::Tab => Key::Tab,
                KeyCode::Backspace => Key::Backspace,
                KeyCode::Space => Key::Space,

                KeyCode::ArrowUp => Key::ArrowUp,
                KeyCode::ArrowDown => Key::ArrowDown,
                KeyCode::ArrowLeft => Key::ArrowLeft,
                KeyCode::ArrowRight => Key::ArrowRight,

                KeyCode::ShiftLeft => Key::LeftShift,
                KeyCode::ShiftRight => Key::RightShift,
                KeyCode::ControlLeft => Key::LeftCtrl,
                KeyCode::ControlRight => Key::RightCtrl,
                KeyCode::AltLeft => Key::LeftAlt,
                KeyCode::AltRight => Key::RightAlt,

                KeyCode::KeyA => Key::A,
                KeyCode::KeyB => Key::B,
                KeyCode::KeyC => Key::C,
                KeyCode::KeyD => Key::D,
                KeyCode::KeyE => Key::E,
                KeyCode::KeyF => Key::F,
                KeyCode::KeyG => Key::G,
                KeyCode::KeyH => Key::H,
                KeyCode::KeyI => Key::I,
                KeyCode::KeyJ => Key::J,
                KeyCode::KeyK => Key::K,
                KeyCode::KeyL => Key::L,
                KeyCode::KeyM => Key::M,
                KeyCode::KeyN => Key::N,
                KeyCode::KeyO => Key::O,
                KeyCode::KeyP => Key::P,
                KeyCode::KeyQ => Key::Q,
                KeyCode::KeyR => Key::R,
                KeyCode::KeyS => Key::S,
                KeyCode::KeyT => Key::T,
                KeyCode::KeyU => Key::U,
                KeyCode::KeyV => Key::V,
                KeyCode::KeyW => Key::W,
                KeyCode::KeyX => Key::X,
                KeyCode::KeyY => Key::Y,
                KeyCode::KeyZ => Key::Z,

                KeyCode::Digit0 => Key::Num0,
                KeyCode::Digit1 => Key::Num1,
                KeyCode::Digit2 => Key::Num2,
                KeyCode::Digit3 => Key::Num3,
                KeyCode::Digit4 => Key::Num4,
                KeyCode::Digit5 => Key::Num5,
                KeyCode::Digit6 => Key::Num6,
                KeyCode::Digit7 => Key::Num7,
                KeyCode::Digit8 => Key::Num8,
                KeyCode::Digit9 => Key::Num9,

                _ => Key::Unknown,
            };

            (key, code as u32)
        }

        // NativeKeyCode is not a u32 in winit 0.30.
        PhysicalKey::Unidentified(_) => (Key::Unknown, 0),
    }
}
