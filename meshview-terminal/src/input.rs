/// Terminal input translated into viewer events
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use meshview_core::{AppEvent, DeviceError, EventSource};
use std::time::Duration;

/// Reads events from the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalEvents;

impl EventSource for TerminalEvents {
    fn poll(&mut self, timeout: Duration) -> Result<bool, DeviceError> {
        Ok(event::poll(timeout)?)
    }

    fn read(&mut self) -> Result<Option<AppEvent>, DeviceError> {
        Ok(map_event(event::read()?))
    }
}

pub fn map_event(event: Event) -> Option<AppEvent> {
    match event {
        Event::Key(key) => map_key(key),
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            ..
        }) => Some(AppEvent::Click),
        Event::Resize(cols, rows) => Some(AppEvent::Resize(cols, rows)),
        _ => None,
    }
}

fn map_key(key: KeyEvent) -> Option<AppEvent> {
    // Windows reports releases too
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => Some(AppEvent::Close),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(AppEvent::Close)
        }
        KeyCode::Char(c) if c.is_ascii_digit() => c.to_digit(10).map(|d| AppEvent::Digit(d as u8)),
        KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Right => Some(AppEvent::Advance),
        _ => None,
    }
}
