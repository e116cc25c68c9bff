//! Input routing and focus state machine
//!
//! Raw device input enters through the `GuiContext` methods in this module and
//! is turned into capability calls and [`GuiEvent`](crate::GuiEvent)s. The
//! router owns five element slots:
//!
//! - `hovered`: element under the cursor
//! - `pressed`: element a button went down on, until the button comes up
//! - `dragged`: pressed element that is draggable
//! - `mouse_focus`: last element clicked
//! - `kb_focus`: element receiving characters and keys
//!
//! Slots hold generational handles, and destroying an element clears every slot
//! that refers to it, so no slot can name a dead element.

use crate::element::ElementId;
use crate::events::EventKind;
use crate::flags::{ElementFlags, StateFlags};
use crate::input::{Key, Modifiers, MouseButton};
use crate::primitives::Point;
use crate::GuiContext;

#[derive(Debug, Clone, Default)]
pub struct InputRouter {
    hovered: Option<ElementId>,
    pressed: Option<ElementId>,
    dragged: Option<ElementId>,
    mouse_focus: Option<ElementId>,
    kb_focus: Option<ElementId>,
    cursor: Point,
    modifiers: Modifiers,
}

impl InputRouter {
    pub fn hovered(&self) -> Option<ElementId> {
        self.hovered
    }

    pub fn pressed(&self) -> Option<ElementId> {
        self.pressed
    }

    pub fn dragged(&self) -> Option<ElementId> {
        self.dragged
    }

    pub fn mouse_focus(&self) -> Option<ElementId> {
        self.mouse_focus
    }

    pub fn keyboard_focus(&self) -> Option<ElementId> {
        self.kb_focus
    }

    /// Last known cursor position
    pub fn cursor(&self) -> Point {
        self.cursor
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// All five slots, in declaration order
    pub fn slots(&self) -> [Option<ElementId>; 5] {
        [
            self.hovered,
            self.pressed,
            self.dragged,
            self.mouse_focus,
            self.kb_focus,
        ]
    }

    /// Clear every slot referring to `id`
    pub(crate) fn forget(&mut self, id: ElementId) {
        for slot in [
            &mut self.hovered,
            &mut self.pressed,
            &mut self.dragged,
            &mut self.mouse_focus,
            &mut self.kb_focus,
        ] {
            if *slot == Some(id) {
                *slot = None;
            }
        }
    }
}

impl GuiContext {
    pub fn router(&self) -> &InputRouter {
        &self.router
    }

    pub fn modifiers(&self) -> Modifiers {
        self.router.modifiers
    }

    /// Replace the tracked modifier state, for backends that report it directly
    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.router.modifiers = modifiers;
    }

    // ========== Mouse ==========

    pub fn mouse_move(&mut self, position: Point) {
        let last = self.router.cursor;
        self.router.cursor = position;

        if let Some(dragged) = self.router.dragged {
            if let Some(on_mouse_drag) = self.caps_of(dragged).and_then(|caps| caps.on_mouse_drag) {
                on_mouse_drag(self, dragged, position, position.delta_from(last));
            }
            return;
        }

        let hit = self.hit_test(position);
        if hit != self.router.hovered {
            if let Some(previous) = self.router.hovered.take() {
                self.mouse_leave(previous, position);
            }
            if let Some(next) = hit {
                self.router.hovered = Some(next);
                self.mouse_enter(next, position);
            }
        }

        if let Some(hovered) = self.router.hovered {
            if let Some(on_mouse_move) = self.caps_of(hovered).and_then(|caps| caps.on_mouse_move) {
                on_mouse_move(self, hovered, position);
            }
        }
    }

    fn mouse_enter(&mut self, id: ElementId, position: Point) {
        let Some(element) = self.elements.get_mut(id) else {
            return;
        };
        element.state |= StateFlags::HOVERED;
        let caps = element.caps;
        if let Some(on_mouse_enter) = caps.on_mouse_enter {
            on_mouse_enter(self, id);
        }
        self.emit(id, EventKind::HoverEnter { position });
        self.invalidate(id);
    }

    fn mouse_leave(&mut self, id: ElementId, position: Point) {
        let Some(element) = self.elements.get_mut(id) else {
            return;
        };
        element.state.remove(StateFlags::HOVERED);
        let caps = element.caps;
        if let Some(on_mouse_leave) = caps.on_mouse_leave {
            on_mouse_leave(self, id);
        }
        self.emit(id, EventKind::HoverLeave { position });
        self.invalidate(id);
    }

    pub fn mouse_down(&mut self, button: MouseButton, position: Point) {
        self.router.cursor = position;
        self.clear_focus();
        if self.router.pressed.is_some() {
            self.router.dragged = None;
            self.release_pressed(button, position);
        }

        let Some(hit) = self.hit_test(position) else {
            return;
        };
        self.router.pressed = Some(hit);
        self.router.mouse_focus = Some(hit);
        let Some(element) = self.elements.get_mut(hit) else {
            return;
        };
        element.state |= StateFlags::PRESSED;
        let caps = element.caps;

        if let Some(on_mouse_click) = caps.on_mouse_click {
            on_mouse_click(self, hit, button, position);
        }
        self.emit(hit, EventKind::Click { button, position });
        self.invalidate(hit);

        let flags = self.flags_of(hit);
        if !self.is_alive(hit) {
            return;
        }
        if flags.contains(ElementFlags::DRAGGABLE) {
            self.router.dragged = Some(hit);
        }
        if flags.contains(ElementFlags::KEYBOARD_CONTROL) && !flags.contains(ElementFlags::INACTIVE) {
            self.focus(hit);
        }
    }

    pub fn mouse_up(&mut self, button: MouseButton, position: Point) {
        self.router.cursor = position;
        self.router.dragged = None;
        self.release_pressed(button, position);
    }

    fn release_pressed(&mut self, button: MouseButton, position: Point) {
        let Some(pressed) = self.router.pressed.take() else {
            return;
        };
        let Some(element) = self.elements.get_mut(pressed) else {
            return;
        };
        element.state.remove(StateFlags::PRESSED);
        let caps = element.caps;
        if let Some(on_mouse_release) = caps.on_mouse_release {
            on_mouse_release(self, pressed, button, position);
        }
        self.emit(pressed, EventKind::Release { button, position });
        self.invalidate(pressed);
    }

    /// Scroll the hovered element, or its nearest ancestor that scrolls
    pub fn mouse_wheel(&mut self, delta: f32) {
        let mut current = self.router.hovered;
        while let Some(id) = current {
            if let Some(on_mouse_wheel) = self.caps_of(id).and_then(|caps| caps.on_mouse_wheel) {
                on_mouse_wheel(self, id, delta);
                return;
            }
            current = self.parent(id);
        }
    }

    // ========== Keyboard ==========

    pub fn character(&mut self, ch: char) {
        let Some(focused) = self.router.kb_focus else {
            return;
        };
        if let Some(on_character) = self.caps_of(focused).and_then(|caps| caps.on_character) {
            on_character(self, focused, ch);
        }
    }

    /// Key transition; modifiers are tracked before the focused element sees it
    pub fn key(&mut self, key: Key, pressed: bool) {
        self.router.modifiers.update(&key, pressed);
        let Some(focused) = self.router.kb_focus else {
            return;
        };
        if let Some(on_key_press) = self.caps_of(focused).and_then(|caps| caps.on_key_press) {
            on_key_press(self, focused, &key, pressed);
        }
    }

    // ========== Focus ==========

    pub fn keyboard_focus(&self) -> Option<ElementId> {
        self.router.kb_focus
    }

    pub fn hovered(&self) -> Option<ElementId> {
        self.router.hovered
    }

    /// Give keyboard focus to `id`
    pub fn focus(&mut self, id: ElementId) {
        if self.router.kb_focus == Some(id) {
            return;
        }
        let Some(element) = self.elements.get(id) else {
            log::trace!("focus on stale element {id:?}");
            return;
        };
        if element.has_flag(ElementFlags::INACTIVE) {
            return;
        }
        self.clear_focus();
        if let Some(element) = self.elements.get_mut(id) {
            element.state |= StateFlags::FOCUSED;
        }
        self.router.kb_focus = Some(id);
        self.emit(id, EventKind::FocusEnter);
        self.invalidate(id);
    }

    pub fn clear_focus(&mut self) {
        let Some(focused) = self.router.kb_focus.take() else {
            return;
        };
        let Some(element) = self.elements.get_mut(focused) else {
            return;
        };
        element.state.remove(StateFlags::FOCUSED);
        self.emit(focused, EventKind::FocusExit);
        self.invalidate(focused);
    }

    /// Drop every routing slot held by a hidden element
    pub(crate) fn release_input(&mut self, id: ElementId) {
        if self.router.kb_focus == Some(id) {
            self.clear_focus();
        }
        if self.router.hovered == Some(id) {
            if let Some(element) = self.elements.get_mut(id) {
                element.state.remove(StateFlags::HOVERED);
            }
        }
        if let Some(element) = self.elements.get_mut(id) {
            element.state.remove(StateFlags::PRESSED);
        }
        self.router.forget(id);
    }
}
