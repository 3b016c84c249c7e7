// ============================================================================
// Gestion des événements
// ============================================================================
// Lecture du clavier avec timeout, et helpers pour reconnaître les touches.
//
// Toute la boucle tourne sur un seul thread : on poll le clavier, on met à
// jour App, on redessine. Pas de channel, pas de worker.
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Terminal redimensionné : on redessine
    Resize,

    /// Rien pendant le timeout
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    timeout: Duration,
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler {
    /// Crée un gestionnaire avec un timeout de 250ms
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_millis(250),
        }
    }

    /// Lit le prochain événement (bloquant au plus `timeout`)
    ///
    /// Sur certains OS, on reçoit Press ET Release : on ne garde que Press.
    pub fn next(&self) -> Result<Event> {
        if !event::poll(self.timeout)? {
            return Ok(Event::Tick);
        }

        match event::read()? {
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
            CrosstermEvent::Resize(_, _) => Ok(Event::Resize),
            _ => Ok(Event::Tick),
        }
    }
}

// ============================================================================
// Helpers : reconnaître une touche
// ============================================================================

fn key_code(event: &Event) -> Option<KeyCode> {
    match event {
        Event::Key(key) => Some(key.code),
        _ => None,
    }
}

/// 'q' (quitter, en deux temps)
pub fn is_quit_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('q') | KeyCode::Char('Q')))
}

/// Échap
pub fn is_escape_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Esc))
}

/// Entrée
pub fn is_enter_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Enter))
}

/// Backspace
pub fn is_backspace_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Backspace))
}

/// Flèche haut ou 'k' (vim)
pub fn is_up_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K')))
}

/// Flèche bas ou 'j' (vim)
pub fn is_down_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J')))
}

/// Tab ou 'l' : écran suivant
pub fn is_next_screen_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Tab | KeyCode::Char('l')))
}

/// Shift-Tab ou 'h' : écran précédent
pub fn is_previous_screen_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::BackTab | KeyCode::Char('h')))
}

/// 'a' : saisir le montant
pub fn is_edit_amount_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('a') | KeyCode::Char('A')))
}

/// Numéro d'écran pour les touches '1' à '4'
pub fn screen_number(event: &Event) -> Option<u32> {
    match key_code(event)? {
        KeyCode::Char(c @ '1'..='4') => c.to_digit(10),
        _ => None,
    }
}

/// Caractère accepté dans la saisie du montant (chiffre ou point)
pub fn amount_char(event: &Event) -> Option<char> {
    match key_code(event)? {
        KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => Some(c),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    #[test]
    fn test_is_quit_event() {
        assert!(is_quit_event(&key(KeyCode::Char('q'))));
        assert!(!is_quit_event(&key(KeyCode::Char('a'))));
        assert!(!is_quit_event(&Event::Tick));
    }

    #[test]
    fn test_screen_number() {
        assert_eq!(screen_number(&key(KeyCode::Char('1'))), Some(1));
        assert_eq!(screen_number(&key(KeyCode::Char('4'))), Some(4));
        assert_eq!(screen_number(&key(KeyCode::Char('5'))), None);
        assert_eq!(screen_number(&Event::Resize), None);
    }

    #[test]
    fn test_amount_char() {
        assert_eq!(amount_char(&key(KeyCode::Char('7'))), Some('7'));
        assert_eq!(amount_char(&key(KeyCode::Char('.'))), Some('.'));
        assert_eq!(amount_char(&key(KeyCode::Char('x'))), None);
        assert_eq!(amount_char(&key(KeyCode::Enter)), None);
    }

    #[test]
    fn test_navigation_keys() {
        assert!(is_next_screen_event(&key(KeyCode::Tab)));
        assert!(is_previous_screen_event(&key(KeyCode::BackTab)));
        assert!(is_up_event(&key(KeyCode::Char('k'))));
        assert!(is_down_event(&key(KeyCode::Down)));
        assert!(is_edit_amount_event(&key(KeyCode::Char('a'))));
    }
}
