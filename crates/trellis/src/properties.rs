//! Universal element properties
//!
//! Every setter silently ignores stale handles; nothing here can fail or panic
//! in the middle of a frame.

use crate::color::Color;
use crate::element::{ElementId, ElementKind, WidgetData};
use crate::events::GuiEvent;
use crate::flags::{ElementFlags, StateFlags};
use crate::font::{FontDesc, FontFlags};
use crate::primitives::{Point, Rect, Size, Spacing};
use crate::text::TextAlign;
use crate::GuiContext;

impl GuiContext {
    // ========== Geometry ==========

    /// Position relative to the parent's content rect
    pub fn position(&self, id: ElementId) -> Option<Point> {
        Some(self.elements.get(id)?.local.min_point())
    }

    pub fn size(&self, id: ElementId) -> Option<Size> {
        Some(self.elements.get(id)?.local.size())
    }

    /// Absolute screen rect
    pub fn bounds(&self, id: ElementId) -> Option<Rect> {
        Some(self.elements.get(id)?.bounds)
    }

    pub fn set_position(&mut self, id: ElementId, x: f32, y: f32) {
        let Some(element) = self.elements.get_mut(id) else {
            log::trace!("set_position on stale element {id:?}");
            return;
        };
        let size = element.local.size();
        element.local = Rect::from_xywh(x, y, size.width, size.height);
        element.rel_position = None;
        self.update_bounds(id);
        self.invalidate_placement(id);
    }

    pub fn set_size(&mut self, id: ElementId, width: f32, height: f32) {
        let Some(element) = self.elements.get_mut(id) else {
            log::trace!("set_size on stale element {id:?}");
            return;
        };
        element.local = Rect::from_min_size(element.local.min, [width.max(0.0), height.max(0.0)]);
        element.rel_size = None;
        self.update_bounds(id);
        self.invalidate_placement(id);
    }

    /// Position as fractions of the parent's content rect, kept on resize
    pub fn set_rel_position(&mut self, id: ElementId, x: f32, y: f32) {
        let Some(element) = self.elements.get_mut(id) else {
            log::trace!("set_rel_position on stale element {id:?}");
            return;
        };
        element.rel_position = Some([x, y]);
        self.update_bounds(id);
        self.invalidate_placement(id);
    }

    /// Size as fractions of the parent's content rect, kept on resize
    pub fn set_rel_size(&mut self, id: ElementId, width: f32, height: f32) {
        let Some(element) = self.elements.get_mut(id) else {
            log::trace!("set_rel_size on stale element {id:?}");
            return;
        };
        element.rel_size = Some([width.max(0.0), height.max(0.0)]);
        self.update_bounds(id);
        self.invalidate_placement(id);
    }

    /// A moved element changes what its parent's cache shows
    fn invalidate_placement(&mut self, id: ElementId) {
        match self.parent(id) {
            Some(parent) => self.invalidate(parent),
            None => self.invalidate(id),
        }
        self.invalidate(id);
    }

    // ========== Appearance ==========

    pub fn colour(&self, id: ElementId) -> Option<Color> {
        Some(self.elements.get(id)?.colour)
    }

    pub fn set_colour(&mut self, id: ElementId, colour: Color) {
        let Some(element) = self.elements.get_mut(id) else {
            log::trace!("set_colour on stale element {id:?}");
            return;
        };
        element.colour = colour;
        let caps = element.caps;
        if let Some(on_colour_change) = caps.on_colour_change {
            on_colour_change(self, id);
        }
        self.invalidate(id);
    }

    pub fn set_text_colour(&mut self, id: ElementId, colour: Color) {
        let target = self.text_target(id);
        let Some(text) = self
            .elements
            .get_mut(target)
            .and_then(|element| element.text.as_mut())
        else {
            return;
        };
        text.set_colour(colour);
        self.invalidate(target);
    }

    /// Opacity of the element and everything it owns
    pub fn set_alpha(&mut self, id: ElementId, alpha: u8) {
        let Some(element) = self.elements.get_mut(id) else {
            log::trace!("set_alpha on stale element {id:?}");
            return;
        };
        element.alpha = alpha;
        let mut owned = element.children.clone();
        if let WidgetData::Window(window) = &element.data {
            owned.extend(window.decorations());
        }
        for child in owned {
            self.set_alpha(child, alpha);
        }
        self.invalidate(id);
    }

    pub fn alpha(&self, id: ElementId) -> Option<u8> {
        Some(self.elements.get(id)?.alpha)
    }

    // ========== Text ==========

    /// Element holding the text shown for `id`; a window shows it in its titlebar
    pub(crate) fn text_target(&self, id: ElementId) -> ElementId {
        match self.elements.get(id).map(|element| &element.data) {
            Some(WidgetData::Window(window)) => window.titlebar.unwrap_or(id),
            _ => id,
        }
    }

    /// Displayed text, with markup removed
    pub fn text(&self, id: ElementId) -> Option<&str> {
        let target = self.text_target(id);
        Some(self.elements.get(target)?.text.as_ref()?.as_str())
    }

    pub fn text_size(&self, id: ElementId) -> Option<Size> {
        let target = self.text_target(id);
        Some(self.elements.get(target)?.text.as_ref()?.size())
    }

    /// Replace the text; markup is parsed when the element has `TEXT_FORMATTING`
    pub fn set_text(&mut self, id: ElementId, text: &str) {
        let target = self.text_target(id);
        let formatting = self.flags_of(id).contains(ElementFlags::TEXT_FORMATTING);
        let GuiContext {
            elements, renderer, ..
        } = self;
        let Some(element) = elements.get_mut(target) else {
            log::trace!("set_text on stale element {id:?}");
            return;
        };
        let font = element.font_handle();
        let caps = element.caps;
        let Some(buffer) = element.text.as_mut() else {
            return;
        };
        buffer.set_buffer(renderer.as_mut(), font, text, formatting);

        if let Some(on_text_change) = caps.on_text_change {
            on_text_change(self, target);
        }
        self.invalidate(target);
    }

    pub fn set_alignment(&mut self, id: ElementId, align: TextAlign) {
        let target = self.text_target(id);
        if let Some(text) = self
            .elements
            .get_mut(target)
            .and_then(|element| element.text.as_mut())
        {
            text.set_align(align);
            self.invalidate(target);
        }
    }

    pub fn set_text_padding(&mut self, id: ElementId, padding: Spacing) {
        let target = self.text_target(id);
        if let Some(text) = self
            .elements
            .get_mut(target)
            .and_then(|element| element.text.as_mut())
        {
            text.set_padding(padding);
            self.invalidate(target);
        }
    }

    /// Re-measure and re-position the element's text after a font change
    pub(crate) fn relayout_text(&mut self, id: ElementId) {
        let GuiContext {
            elements, renderer, ..
        } = self;
        let Some(element) = elements.get_mut(id) else {
            return;
        };
        let font = element.font_handle();
        if let Some(text) = element.text.as_mut() {
            text.update_dimensions(renderer.as_mut(), font);
            text.update_position();
        }
    }

    // ========== Fonts ==========

    pub fn font(&self, id: ElementId) -> Option<FontDesc> {
        let target = self.text_target(id);
        self.elements.get(target)?.font().cloned()
    }

    /// Switch to the font described by `desc`.
    ///
    /// The previous font is released once nothing else uses it. If the new
    /// font cannot be loaded the element keeps its current one.
    pub fn set_font(&mut self, id: ElementId, desc: &FontDesc) {
        let target = self.text_target(id);
        if !self.elements.contains_key(target) {
            log::trace!("set_font on stale element {id:?}");
            return;
        }
        let Some(font) = self.fonts.acquire(self.renderer.as_mut(), desc) else {
            return;
        };
        let Some(element) = self.elements.get_mut(target) else {
            return;
        };
        let previous = element.font.replace(font);
        let caps = element.caps;
        if let Some(previous) = previous {
            self.fonts.release(self.renderer.as_mut(), previous);
        }

        self.relayout_text(target);
        if let Some(on_text_change) = caps.on_text_change {
            on_text_change(self, target);
        }
        self.invalidate(target);
    }

    pub fn set_font_name(&mut self, id: ElementId, name: &str) {
        let mut desc = self.font_or_default(id);
        desc.name = name.to_string();
        self.set_font(id, &desc);
    }

    pub fn set_font_size(&mut self, id: ElementId, size: u32) {
        let mut desc = self.font_or_default(id);
        desc.size = size;
        self.set_font(id, &desc);
    }

    pub fn set_font_flags(&mut self, id: ElementId, flags: FontFlags) {
        let mut desc = self.font_or_default(id);
        desc.flags = flags;
        self.set_font(id, &desc);
    }

    fn font_or_default(&self, id: ElementId) -> FontDesc {
        self.font(id)
            .unwrap_or_else(|| self.config.default_font.clone())
    }

    // ========== Flags ==========

    pub fn flags(&self, id: ElementId) -> Option<ElementFlags> {
        Some(self.elements.get(id)?.flags)
    }

    pub fn state(&self, id: ElementId) -> Option<StateFlags> {
        Some(self.elements.get(id)?.state)
    }

    pub fn kind(&self, id: ElementId) -> Option<ElementKind> {
        Some(self.elements.get(id)?.kind)
    }

    pub fn set_flags(&mut self, id: ElementId, flags: ElementFlags) {
        let Some(element) = self.elements.get_mut(id) else {
            log::trace!("set_flags on stale element {id:?}");
            return;
        };
        let old = element.flags;
        if old == flags {
            return;
        }
        element.flags = flags;
        let caps = element.caps;

        let stale_target = if !flags.contains(ElementFlags::CACHED) {
            element.render_target.take()
        } else {
            None
        };
        if let Some(target) = stale_target {
            self.renderer.destroy_render_target(target);
        }

        let formatting_changed = old.contains(ElementFlags::TEXT_FORMATTING)
            != flags.contains(ElementFlags::TEXT_FORMATTING);
        if formatting_changed {
            let target = self.text_target(id);
            let source = self
                .elements
                .get(target)
                .and_then(|element| element.text.as_ref())
                .map(|text| text.source().to_string());
            if let Some(source) = source {
                self.set_text(id, &source);
            }
        }

        if old.contains(ElementFlags::VISIBLE) && !flags.contains(ElementFlags::VISIBLE) {
            self.release_input(id);
        }

        if let Some(on_flags_change) = caps.on_flags_change {
            on_flags_change(self, id, old);
        }
        self.invalidate_placement(id);
    }

    pub fn add_flags(&mut self, id: ElementId, flags: ElementFlags) {
        let current = self.flags_of(id);
        self.set_flags(id, current | flags);
    }

    pub fn remove_flags(&mut self, id: ElementId, flags: ElementFlags) {
        let current = self.flags_of(id);
        self.set_flags(id, current - flags);
    }

    pub fn set_visible(&mut self, id: ElementId, visible: bool) {
        if visible {
            self.add_flags(id, ElementFlags::VISIBLE);
        } else {
            self.remove_flags(id, ElementFlags::VISIBLE);
        }
    }

    pub fn is_visible(&self, id: ElementId) -> bool {
        self.elements
            .get(id)
            .is_some_and(|element| element.is_visible())
    }

    // ========== Event Handler ==========

    /// Receive events targeted at `id`; anything the closure captures acts as user data
    pub fn set_event_handler(&mut self, id: ElementId, handler: impl FnMut(&GuiEvent) + 'static) {
        if let Some(element) = self.elements.get_mut(id) {
            element.handler = Some(Box::new(handler));
        }
    }

    pub fn clear_event_handler(&mut self, id: ElementId) {
        if let Some(element) = self.elements.get_mut(id) {
            element.handler = None;
        }
    }
}
