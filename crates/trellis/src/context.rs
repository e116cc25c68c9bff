//! GUI context owning every element and process-wide resource
//!
//! The `GuiContext` is the central coordinator of the toolkit. It holds:
//! - The element arena and the top-level layer list
//! - Font and texture registries
//! - Input routing (hover, press, drag and focus slots)
//! - The renderer, skin and clipboard capabilities
//!
//! Everything runs on one thread. Input calls and [`process`](GuiContext::process)
//! are the only entry points that mutate state.

use crate::clipboard::{Clipboard, MemoryClipboard};
use crate::element::{Capabilities, Element, ElementId};
use crate::events::{EventKind, GuiEvent};
use crate::flags::{ElementFlags, StateFlags};
use crate::font::{FontDesc, FontRegistry};
use crate::primitives::{Rect, Size};
use crate::renderer::Renderer;
use crate::routing::InputRouter;
use crate::skin::{SimpleSkin, Skin};
use crate::texture::TextureRegistry;
use crate::widgets::edit_box;
use slotmap::SlotMap;
use std::time::Instant;
use trellis_macros::WithBuilders;

/// Tunables shared by every element of a context
#[derive(Debug, Clone, WithBuilders)]
pub struct GuiConfig {
    /// Font given to new elements that carry text
    pub default_font: FontDesc,
    /// Edit box cursor blink half-period
    pub cursor_blink_ms: u64,
    /// Delay before a held scrollbar button starts repeating
    pub scroll_repeat_delay_ms: u64,
    /// Interval between repeats of a held scrollbar button
    pub scroll_repeat_interval_ms: u64,
    pub titlebar_height: f32,
    /// Glyph shown for every character of a masked edit box
    pub mask_char: char,
    /// Extra bytes reserved when an edit box grows
    pub edit_slack: usize,
    pub scrollbar_width: f32,
    /// Raw lines a memo box keeps before evicting the oldest
    pub memo_max_history: usize,
    /// Upper bound on live elements
    pub max_elements: usize,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            default_font: FontDesc::default(),
            cursor_blink_ms: 500,
            scroll_repeat_delay_ms: 500,
            scroll_repeat_interval_ms: 100,
            titlebar_height: 20.0,
            mask_char: '*',
            edit_slack: 32,
            scrollbar_width: 16.0,
            memo_max_history: 50,
            max_elements: 1_000_000,
        }
    }
}

pub struct GuiContext {
    pub(crate) elements: SlotMap<ElementId, Element>,
    /// Parentless elements in render order
    pub(crate) layers: Vec<ElementId>,
    pub(crate) fonts: FontRegistry,
    pub(crate) textures: TextureRegistry,
    pub(crate) router: InputRouter,
    pub(crate) renderer: Box<dyn Renderer>,
    pub(crate) skin: Box<dyn Skin>,
    pub(crate) clipboard: Box<dyn Clipboard>,
    pub(crate) config: GuiConfig,
    pub(crate) screen: Size,
    pub(crate) redraw: bool,
    /// Some cached element needs its offscreen target regenerated
    pub(crate) cache_refresh: bool,
    /// Milliseconds as of the current process pass
    pub(crate) ticks: u64,
    started: Instant,
    events: Vec<GuiEvent>,
    pending_pastes: Vec<ElementId>,
}

impl GuiContext {
    /// Create a context drawing through `renderer` onto a `width` x `height` screen
    pub fn new(renderer: impl Renderer + 'static, width: u32, height: u32) -> Self {
        Self::with_config(renderer, width, height, GuiConfig::default())
    }

    pub fn with_config(
        renderer: impl Renderer + 'static,
        width: u32,
        height: u32,
        config: GuiConfig,
    ) -> Self {
        let mut renderer: Box<dyn Renderer> = Box::new(renderer);
        renderer.resize(width, height);
        log::debug!("gui context created ({width}x{height})");

        Self {
            elements: SlotMap::with_key(),
            layers: Vec::new(),
            fonts: FontRegistry::new(),
            textures: TextureRegistry::new(),
            router: InputRouter::default(),
            renderer,
            skin: Box::new(SimpleSkin::default()),
            clipboard: Box::new(MemoryClipboard::new()),
            config,
            screen: Size::new(width as f32, height as f32),
            redraw: true,
            cache_refresh: false,
            ticks: 0,
            started: Instant::now(),
            events: Vec::new(),
            pending_pastes: Vec::new(),
        }
    }

    pub fn set_skin(&mut self, skin: impl Skin + 'static) {
        self.skin = Box::new(skin);
        self.redraw = true;
    }

    pub fn set_clipboard(&mut self, clipboard: impl Clipboard + 'static) {
        self.clipboard = Box::new(clipboard);
    }

    pub fn config(&self) -> &GuiConfig {
        &self.config
    }

    /// Milliseconds seen by the last process pass
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn screen_size(&self) -> Size {
        self.screen
    }

    pub fn screen_rect(&self) -> Rect {
        Rect::from_min_size([0.0, 0.0], [self.screen.width, self.screen.height])
    }

    /// The screen changed size; layers with relative layout follow it
    pub fn resize(&mut self, width: u32, height: u32) {
        self.screen = Size::new(width as f32, height as f32);
        self.renderer.resize(width, height);
        for layer in self.layers.clone() {
            self.update_bounds(layer);
        }
        self.redraw = true;
    }

    // ========== Element Access ==========

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn is_alive(&self, id: ElementId) -> bool {
        self.elements.contains_key(id)
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Top-level elements in render order
    pub fn layers(&self) -> &[ElementId] {
        &self.layers
    }

    pub(crate) fn caps_of(&self, id: ElementId) -> Option<&'static Capabilities> {
        self.elements.get(id).map(|element| element.caps)
    }

    pub(crate) fn flags_of(&self, id: ElementId) -> ElementFlags {
        self.elements
            .get(id)
            .map(|element| element.flags)
            .unwrap_or_default()
    }

    // ========== Events ==========

    /// Deliver an event to the element's handler and record it
    pub(crate) fn emit(&mut self, id: ElementId, kind: EventKind) {
        let event = GuiEvent { element: id, kind };
        if let Some(handler) = self
            .elements
            .get_mut(id)
            .and_then(|element| element.handler.as_mut())
        {
            handler(&event);
        }
        self.events.push(event);
    }

    /// Events emitted since the last call, oldest first
    pub fn drain_events(&mut self) -> Vec<GuiEvent> {
        std::mem::take(&mut self.events)
    }

    // ========== Redraw ==========

    /// Force a full repaint on the next process pass
    pub fn request_redraw(&mut self) {
        self.redraw = true;
    }

    pub fn needs_redraw(&self) -> bool {
        self.redraw
    }

    /// Element changed visually: repaint, and regenerate every cache it lands in
    pub(crate) fn invalidate(&mut self, id: ElementId) {
        self.redraw = true;
        let mut current = Some(id);
        while let Some(node) = current {
            let Some(element) = self.elements.get_mut(node) else {
                break;
            };
            if element.flags.contains(ElementFlags::CACHED) {
                element.state |= StateFlags::CACHE_DIRTY;
                self.cache_refresh = true;
            }
            current = element.parent;
        }
    }

    // ========== Frame Lifecycle ==========

    /// Run one frame using wall-clock time since the context was created
    pub fn process(&mut self) {
        let ticks = self.started.elapsed().as_millis() as u64;
        self.process_at(ticks);
    }

    /// Run one frame at `ticks` milliseconds.
    ///
    /// Delivers pending clipboard requests, calls every visible element's
    /// `process` capability, regenerates dirty caches and renders if a redraw
    /// was requested. Fonts and textures nobody references any more are
    /// released at the end.
    pub fn process_at(&mut self, ticks: u64) {
        self.ticks = ticks;
        self.deliver_pastes();

        let mut visible = Vec::new();
        for layer in self.layers.clone() {
            self.collect_visible(layer, &mut visible);
        }
        for id in visible {
            if let Some(process) = self.caps_of(id).and_then(|caps| caps.process) {
                process(self, id);
            }
        }

        if self.cache_refresh {
            self.refresh_caches();
        }
        if self.redraw {
            self.render();
        }

        self.fonts.purge(self.renderer.as_mut());
        self.textures.purge(self.renderer.as_mut());
    }

    fn collect_visible(&self, id: ElementId, out: &mut Vec<ElementId>) {
        let Some(element) = self.elements.get(id) else {
            return;
        };
        if !element.is_visible() {
            return;
        }
        out.push(id);
        for &child in &element.children {
            self.collect_visible(child, out);
        }
    }

    /// Queue a clipboard read for an edit box, delivered on the next process pass
    pub(crate) fn request_paste(&mut self, id: ElementId) {
        self.pending_pastes.push(id);
    }

    fn deliver_pastes(&mut self) {
        for id in std::mem::take(&mut self.pending_pastes) {
            if !self.is_alive(id) {
                log::trace!("dropping paste for destroyed element {id:?}");
                continue;
            }
            if let Some(text) = self.clipboard.get_text() {
                edit_box::insert_text(self, id, &text);
            }
        }
    }

    /// Destroy every element and release all backend resources.
    ///
    /// Safe to call more than once; dropping the context calls it too.
    pub fn shutdown(&mut self) {
        if self.elements.is_empty() && self.fonts.is_empty() && self.textures.is_empty() {
            return;
        }
        for layer in self.layers.clone() {
            self.destroy(layer);
        }
        self.fonts.clear(self.renderer.as_mut());
        self.textures.clear(self.renderer.as_mut());
        self.router = InputRouter::default();
        self.pending_pastes.clear();
        log::debug!("gui context shut down");
    }
}

impl Drop for GuiContext {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::HeadlessRenderer;

    #[test]
    fn test_config_builders() {
        let config = GuiConfig::default()
            .with_cursor_blink_ms(250)
            .with_mask_char('#');
        assert_eq!(config.cursor_blink_ms, 250);
        assert_eq!(config.mask_char, '#');
        assert_eq!(config.titlebar_height, 20.0);
    }

    #[test]
    fn test_process_renders_only_when_requested() {
        let renderer = HeadlessRenderer::new();
        let probe = renderer.probe();
        let mut ctx = GuiContext::new(renderer, 320, 240);

        ctx.process_at(0);
        assert_eq!(probe.frames(), 1);
        ctx.process_at(16);
        assert_eq!(probe.frames(), 1);

        ctx.request_redraw();
        ctx.process_at(32);
        assert_eq!(probe.frames(), 2);
    }

    #[test]
    fn test_shutdown_releases_everything() {
        let renderer = HeadlessRenderer::new();
        let probe = renderer.probe();
        let mut ctx = GuiContext::new(renderer, 320, 240);
        let window = ctx.create_window(None).unwrap();
        ctx.create_button(Some(window)).unwrap();
        assert!(probe.loaded_fonts() > 0);

        ctx.shutdown();
        assert_eq!(ctx.element_count(), 0);
        assert!(ctx.layers().is_empty());
        assert_eq!(probe.loaded_fonts(), 0);
        ctx.shutdown();
    }

    #[test]
    fn test_drain_events_empties_queue() {
        let mut ctx = GuiContext::new(HeadlessRenderer::new(), 100, 100);
        let button = ctx.create_button(None).unwrap();
        ctx.emit(button, EventKind::FocusEnter);
        assert_eq!(ctx.drain_events().len(), 1);
        assert!(ctx.drain_events().is_empty());
    }
}
