//! Backend-agnostic input types
//!
//! Platform glue (for example `trellis-winit`) converts its native events into
//! these types before handing them to [`GuiContext`](crate::GuiContext).

/// Backend-agnostic mouse button representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button (scroll wheel click)
    Middle,
    /// Additional mouse buttons (back, forward, etc.)
    Other(u8),
}

/// Backend-agnostic named key representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Enter,
    Escape,
    Backspace,
    Delete,
    Tab,
    Space,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    PageUp,
    PageDown,
    Shift,
    Control,
    Alt,
    /// Super/Meta/Windows/Command key
    Super,
    CapsLock,
    /// Function keys F1-F12
    F(u8),
    Insert,
}

/// Backend-agnostic key representation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A named key (Enter, Escape, arrows, etc.)
    Named(NamedKey),
    /// A character key (letters, numbers, symbols)
    Character(String),
    /// Unknown/unhandled key
    Unknown,
}

impl Key {
    /// Convenience constructor for a character key
    pub fn character(ch: char) -> Self {
        Key::Character(ch.to_string())
    }

    /// True when this is the character key `ch`, ignoring ASCII case
    pub fn is_char(&self, ch: char) -> bool {
        match self {
            Key::Character(s) => {
                let mut chars = s.chars();
                matches!((chars.next(), chars.next()), (Some(c), None) if c.eq_ignore_ascii_case(&ch))
            }
            _ => false,
        }
    }
}

/// Modifier keys currently held
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    /// Ctrl (or Cmd on macOS)
    pub ctrl: bool,
    pub alt: bool,
    pub super_key: bool,
}

impl Modifiers {
    /// Track a key transition; returns true if the key was a modifier
    pub fn update(&mut self, key: &Key, pressed: bool) -> bool {
        let Key::Named(named) = key else {
            return false;
        };
        match named {
            NamedKey::Shift => self.shift = pressed,
            NamedKey::Control => self.ctrl = pressed,
            NamedKey::Alt => self.alt = pressed,
            NamedKey::Super => self.super_key = pressed,
            _ => return false,
        }
        true
    }

    /// Check if any modifier key is held (Ctrl, Alt, Super, but not Shift)
    pub fn any_command(&self) -> bool {
        self.ctrl || self.alt || self.super_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_keys() {
        let mut mods = Modifiers::default();

        assert!(mods.update(&Key::Named(NamedKey::Shift), true));
        assert!(mods.shift);

        mods.update(&Key::Named(NamedKey::Control), true);
        assert!(mods.ctrl);

        mods.update(&Key::Named(NamedKey::Shift), false);
        assert!(!mods.shift);
        assert!(mods.ctrl);

        assert!(!mods.update(&Key::character('a'), true));
    }

    #[test]
    fn test_is_char_ignores_case() {
        assert!(Key::character('A').is_char('a'));
        assert!(!Key::Character("ab".into()).is_char('a'));
        assert!(!Key::Named(NamedKey::Enter).is_char('a'));
    }
}
