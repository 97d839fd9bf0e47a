// Copyright (c) 2026 rezky_nightky

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::grid::Pos;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,
    Resize(u16, u16),
    Spawn(Pos),
    Ignore,
}

/// Maps a raw terminal event onto what the app should do about it.
pub fn action_for(ev: &Event) -> Action {
    match ev {
        Event::Resize(w, h) => Action::Resize(*w, *h),
        Event::Key(k) => key_action(k),
        Event::Mouse(m) => mouse_action(m),
        _ => Action::Ignore,
    }
}

fn key_action(k: &KeyEvent) -> Action {
    if k.kind != KeyEventKind::Press {
        return Action::Ignore;
    }
    match (k.code, k.modifiers) {
        (KeyCode::Esc, _) | (KeyCode::Char('q'), _) => Action::Quit,
        (KeyCode::Char('c'), m) if m.contains(KeyModifiers::CONTROL) => Action::Quit,
        _ => Action::Ignore,
    }
}

fn mouse_action(m: &MouseEvent) -> Action {
    match m.kind {
        MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left) => {
            Action::Spawn(Pos::from((m.column, m.row)))
        }
        _ => Action::Ignore,
    }
}
