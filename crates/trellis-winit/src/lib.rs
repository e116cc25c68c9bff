//! Winit input adapter and system clipboard for trellis
//!
//! [`WinitInputExt`] feeds winit window events into a [`GuiContext`];
//! [`ArboardClipboard`] backs edit box cut, copy and paste with the platform
//! clipboard.

use trellis::{Clipboard, GuiContext, Key, Modifiers, MouseButton, NamedKey, Point};
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{Key as WinitKey, ModifiersState};

/// Pixel wheel deltas are divided by this to get lines
const PIXELS_PER_LINE: f32 = 20.0;

/// Extension trait for GuiContext to handle winit events
pub trait WinitInputExt {
    /// Route one winit window event into the toolkit.
    ///
    /// Call this for every `WindowEvent` received from winit, then call
    /// `process` once per frame.
    fn handle_winit_event(&mut self, event: &WindowEvent);
}

impl WinitInputExt for GuiContext {
    fn handle_winit_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::Resized(size) => {
                self.resize(size.width, size.height);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse_move(Point::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => {
                // Off-screen, so nothing stays hovered
                self.mouse_move(Point::new(-1.0, -1.0));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
                };
                if lines != 0.0 {
                    self.mouse_wheel(lines);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = convert_mouse_button(*button);
                let position = self.router().cursor();
                match state {
                    ElementState::Pressed => self.mouse_down(button, position),
                    ElementState::Released => self.mouse_up(button, position),
                }
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.set_modifiers(convert_modifiers(modifiers.state()));
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let key = convert_key(&event.logical_key);
                let pressed = event.state == ElementState::Pressed;
                self.key(key, pressed);

                if pressed {
                    if let Some(text) = &event.text {
                        for ch in text.chars() {
                            self.character(ch);
                        }
                    }
                }
            }
            WindowEvent::Focused(false) => {
                self.clear_focus();
            }
            _ => {
                log::trace!("ignored window event {event:?}");
            }
        }
    }
}

/// Convert winit MouseButton to trellis MouseButton
pub fn convert_mouse_button(button: winit::event::MouseButton) -> MouseButton {
    match button {
        winit::event::MouseButton::Left => MouseButton::Left,
        winit::event::MouseButton::Right => MouseButton::Right,
        winit::event::MouseButton::Middle => MouseButton::Middle,
        winit::event::MouseButton::Back => MouseButton::Other(3),
        winit::event::MouseButton::Forward => MouseButton::Other(4),
        winit::event::MouseButton::Other(n) => MouseButton::Other(n.min(u8::MAX as u16) as u8),
    }
}

/// Convert winit Key to trellis Key
pub fn convert_key(key: &WinitKey) -> Key {
    match key {
        WinitKey::Named(named) => convert_named_key(named).map_or(Key::Unknown, Key::Named),
        WinitKey::Character(s) => Key::Character(s.to_string()),
        _ => Key::Unknown,
    }
}

/// Convert winit NamedKey to trellis NamedKey; keys trellis has no name for give `None`
pub fn convert_named_key(key: &winit::keyboard::NamedKey) -> Option<NamedKey> {
    use winit::keyboard::NamedKey as WN;

    let named = match key {
        WN::Enter => NamedKey::Enter,
        WN::Escape => NamedKey::Escape,
        WN::Backspace => NamedKey::Backspace,
        WN::Delete => NamedKey::Delete,
        WN::Tab => NamedKey::Tab,
        WN::Space => NamedKey::Space,
        WN::ArrowLeft => NamedKey::ArrowLeft,
        WN::ArrowRight => NamedKey::ArrowRight,
        WN::ArrowUp => NamedKey::ArrowUp,
        WN::ArrowDown => NamedKey::ArrowDown,
        WN::Home => NamedKey::Home,
        WN::End => NamedKey::End,
        WN::PageUp => NamedKey::PageUp,
        WN::PageDown => NamedKey::PageDown,
        WN::Shift => NamedKey::Shift,
        WN::Control => NamedKey::Control,
        WN::Alt => NamedKey::Alt,
        WN::Super => NamedKey::Super,
        WN::CapsLock => NamedKey::CapsLock,
        WN::Insert => NamedKey::Insert,
        WN::F1 => NamedKey::F(1),
        WN::F2 => NamedKey::F(2),
        WN::F3 => NamedKey::F(3),
        WN::F4 => NamedKey::F(4),
        WN::F5 => NamedKey::F(5),
        WN::F6 => NamedKey::F(6),
        WN::F7 => NamedKey::F(7),
        WN::F8 => NamedKey::F(8),
        WN::F9 => NamedKey::F(9),
        WN::F10 => NamedKey::F(10),
        WN::F11 => NamedKey::F(11),
        WN::F12 => NamedKey::F(12),
        _ => return None,
    };
    Some(named)
}

pub fn convert_modifiers(state: ModifiersState) -> Modifiers {
    Modifiers {
        shift: state.shift_key(),
        ctrl: state.control_key(),
        alt: state.alt_key(),
        super_key: state.super_key(),
    }
}

/// Platform clipboard through arboard
pub struct ArboardClipboard {
    inner: arboard::Clipboard,
}

impl ArboardClipboard {
    pub fn new() -> Result<Self, arboard::Error> {
        Ok(Self {
            inner: arboard::Clipboard::new()?,
        })
    }
}

impl Clipboard for ArboardClipboard {
    fn set_text(&mut self, text: &str) {
        if let Err(err) = self.inner.set_text(text) {
            log::warn!("clipboard write failed: {err}");
        }
    }

    fn get_text(&mut self) -> Option<String> {
        match self.inner.get_text() {
            Ok(text) => Some(text),
            Err(err) => {
                log::debug!("clipboard read failed: {err}");
                None
            }
        }
    }
}

/// Bind the platform clipboard to `ctx`.
///
/// Returns false and leaves the in-process clipboard in place when the
/// platform clipboard is unavailable (for example on a headless machine).
pub fn install_system_clipboard(ctx: &mut GuiContext) -> bool {
    match ArboardClipboard::new() {
        Ok(clipboard) => {
            ctx.set_clipboard(clipboard);
            true
        }
        Err(err) => {
            log::warn!("system clipboard unavailable: {err}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::{PhysicalPosition, PhysicalSize};
    use winit::event::TouchPhase;
    use winit::keyboard::SmolStr;

    #[test]
    fn test_mouse_buttons() {
        assert_eq!(
            convert_mouse_button(winit::event::MouseButton::Left),
            MouseButton::Left
        );
        assert_eq!(
            convert_mouse_button(winit::event::MouseButton::Forward),
            MouseButton::Other(4)
        );
        assert_eq!(
            convert_mouse_button(winit::event::MouseButton::Other(900)),
            MouseButton::Other(u8::MAX)
        );
    }

    #[test]
    fn test_keys() {
        use winit::keyboard::NamedKey as WN;

        assert_eq!(
            convert_key(&WinitKey::Named(WN::Backspace)),
            Key::Named(NamedKey::Backspace)
        );
        assert_eq!(
            convert_key(&WinitKey::Named(WN::F7)),
            Key::Named(NamedKey::F(7))
        );
        assert_eq!(convert_key(&WinitKey::Named(WN::MediaPlay)), Key::Unknown);
        assert_eq!(
            convert_key(&WinitKey::Character(SmolStr::new("a"))),
            Key::character('a')
        );
    }

    fn device() -> winit::event::DeviceId {
        // SAFETY: only compared against other dummies, never passed to the platform
        unsafe { winit::event::DeviceId::dummy() }
    }

    fn context() -> GuiContext {
        let _ = env_logger::builder().is_test(true).try_init();
        GuiContext::new(trellis::HeadlessRenderer::new(), 640, 480)
    }

    #[test]
    fn test_resize_and_cursor_events() {
        let mut ctx = context();
        let button = ctx
            .create_button_ex(None, &trellis::ElementDesc::at(10.0, 10.0, 50.0, 20.0))
            .unwrap();

        ctx.handle_winit_event(&WindowEvent::Resized(PhysicalSize::new(800, 600)));
        assert_eq!(ctx.screen_size(), trellis::Size::new(800.0, 600.0));

        ctx.handle_winit_event(&WindowEvent::CursorMoved {
            device_id: device(),
            position: PhysicalPosition::new(20.0, 15.0),
        });
        assert_eq!(ctx.router().cursor(), Point::new(20.0, 15.0));
        assert_eq!(ctx.hovered(), Some(button));

        ctx.handle_winit_event(&WindowEvent::CursorLeft {
            device_id: device(),
        });
        assert_eq!(ctx.hovered(), None);
    }

    #[test]
    fn test_pixel_wheel_delta_becomes_lines() {
        let mut ctx = context();
        let bar = ctx
            .create_scrollbar_ex(None, &trellis::ElementDesc::at(0.0, 0.0, 16.0, 100.0))
            .unwrap();
        ctx.set_scroll_content_size(bar, 10.0);
        ctx.handle_winit_event(&WindowEvent::CursorMoved {
            device_id: device(),
            position: PhysicalPosition::new(8.0, 50.0),
        });

        // 40px down is two lines down
        ctx.handle_winit_event(&WindowEvent::MouseWheel {
            device_id: device(),
            delta: MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -40.0)),
            phase: TouchPhase::Moved,
        });
        assert_eq!(ctx.scroll_position(bar), Some(2.0));

        ctx.handle_winit_event(&WindowEvent::MouseWheel {
            device_id: device(),
            delta: MouseScrollDelta::LineDelta(0.0, 1.0),
            phase: TouchPhase::Moved,
        });
        assert_eq!(ctx.scroll_position(bar), Some(1.0));
    }

    #[test]
    fn test_modifiers() {
        let state = ModifiersState::SHIFT | ModifiersState::CONTROL;
        let modifiers = convert_modifiers(state);
        assert!(modifiers.shift && modifiers.ctrl);
        assert!(!modifiers.alt && !modifiers.super_key);
    }
}
