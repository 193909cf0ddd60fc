use std::time::Duration;
use tracing::trace;

use crate::domain::{DashConfig, DashError, Message};
use crate::model::Model;
use crate::pipeline::SortKey;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyModifiers};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &DashConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, DashError> {
        if event::poll(Duration::from_millis(self.event_poll_time))?
            && let Event::Key(key) = event::read()?
            && key.kind == event::KeyEventKind::Press
        {
            return Ok(self.handle_key(key, model.raw_keyevents()));
        }
        Ok(None)
    }

    fn handle_key(&self, key: event::KeyEvent, raw: bool) -> Option<Message> {
        // The prompt gets every key unmapped
        if raw {
            return Some(Message::RawKey(key));
        }
        let message = match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Message::Quit),
            (KeyCode::Char('q'), _) => Some(Message::Quit),
            (KeyCode::Char('j') | KeyCode::Down, _) => Some(Message::MoveDown),
            (KeyCode::Char('k') | KeyCode::Up, _) => Some(Message::MoveUp),
            (KeyCode::Char('g') | KeyCode::Home, _) => Some(Message::MoveBeginning),
            (KeyCode::Char('G') | KeyCode::End, _) => Some(Message::MoveEnd),
            (KeyCode::Char('l') | KeyCode::Right | KeyCode::PageDown, _) => {
                Some(Message::NextPage)
            }
            (KeyCode::Char('h') | KeyCode::Left | KeyCode::PageUp, _) => {
                Some(Message::PreviousPage)
            }
            (KeyCode::Char(c @ '1'..='9'), _) => {
                c.to_digit(10).map(|d| Message::GotoPage(d as usize))
            }
            (KeyCode::Char('n'), _) => Some(Message::SortBy(SortKey::Client)),
            (KeyCode::Char('c'), _) => Some(Message::SortBy(SortKey::Country)),
            (KeyCode::Char('d'), _) => Some(Message::SortBy(SortKey::Date)),
            (KeyCode::Char('/'), _) => Some(Message::Search),
            (KeyCode::Char('f'), _) => Some(Message::Filter),
            (KeyCode::Char('x'), _) => Some(Message::ClearFilters),
            (KeyCode::Char('b'), _) => Some(Message::ToggleSidebar),
            (KeyCode::Char('y'), _) => Some(Message::CopyRow),
            (KeyCode::Char('e'), _) => Some(Message::CopyEmail),
            (KeyCode::Char('?'), _) => Some(Message::Help),
            (KeyCode::Esc, _) => Some(Message::Exit),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyEvent;

    fn map(code: KeyCode) -> Option<Message> {
        let controller = Controller::new(&DashConfig::default());
        controller.handle_key(KeyEvent::new(code, KeyModifiers::NONE), false)
    }

    #[test]
    fn maps_navigation_and_paging() {
        assert_eq!(map(KeyCode::Char('j')), Some(Message::MoveDown));
        assert_eq!(map(KeyCode::Up), Some(Message::MoveUp));
        assert_eq!(map(KeyCode::Right), Some(Message::NextPage));
        assert_eq!(map(KeyCode::PageUp), Some(Message::PreviousPage));
        assert_eq!(map(KeyCode::Char('3')), Some(Message::GotoPage(3)));
        assert_eq!(map(KeyCode::Char('0')), None);
    }

    #[test]
    fn maps_table_actions() {
        assert_eq!(map(KeyCode::Char('n')), Some(Message::SortBy(SortKey::Client)));
        assert_eq!(map(KeyCode::Char('c')), Some(Message::SortBy(SortKey::Country)));
        assert_eq!(map(KeyCode::Char('d')), Some(Message::SortBy(SortKey::Date)));
        assert_eq!(map(KeyCode::Char('/')), Some(Message::Search));
        assert_eq!(map(KeyCode::Char('f')), Some(Message::Filter));
        assert_eq!(map(KeyCode::Char('b')), Some(Message::ToggleSidebar));
        assert_eq!(map(KeyCode::Char('q')), Some(Message::Quit));
        assert_eq!(map(KeyCode::Char('z')), None);
    }

    #[test]
    fn raw_mode_forwards_keys() {
        let controller = Controller::new(&DashConfig::default());
        let key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(controller.handle_key(key, true), Some(Message::RawKey(key)));
    }

    #[test]
    fn ctrl_c_quits() {
        let controller = Controller::new(&DashConfig::default());
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(controller.handle_key(key, false), Some(Message::Quit));
    }
}
