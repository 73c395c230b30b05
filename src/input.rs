use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::engine::Key;
use crate::runtime::StrafeEvent;

/// What a terminal event asks the trainer to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Key),
    Shoot,
    Quit,
}

pub fn command_for(event: &StrafeEvent) -> Option<Command> {
    match event {
        StrafeEvent::Key(key) => key_command(key),
        StrafeEvent::Mouse(mouse) => mouse_command(mouse),
        StrafeEvent::Resize | StrafeEvent::Tick => None,
    }
}

fn key_command(key: &KeyEvent) -> Option<Command> {
    // terminals without keyboard enhancement only report presses; auto-repeat
    // arrives as more presses and renews the hold
    if key.kind == KeyEventKind::Release {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Command::Quit),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('a') | KeyCode::Char('A') => Some(Command::Move(Key::Left)),
        KeyCode::Char('d') | KeyCode::Char('D') => Some(Command::Move(Key::Right)),
        KeyCode::Char(' ') => Some(Command::Shoot),
        KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
        _ => None,
    }
}

fn mouse_command(mouse: &MouseEvent) -> Option<Command> {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(Command::Shoot),
        _ => None,
    }
}
