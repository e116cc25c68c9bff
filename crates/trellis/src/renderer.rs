//! Renderer capability consumed by the core
//!
//! The core never talks to a graphics API directly. Every pixel goes through a
//! [`Renderer`] implementation; skins translate element state into calls on it.
//! Solid geometry and text are mandatory. Textures and offscreen render
//! targets are optional and advertised through [`RendererCaps`].

use crate::color::Color;
use crate::font::FontDesc;
use crate::format::FormatTag;
use crate::primitives::{Point, Rect, Size};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

bitflags::bitflags! {
    /// Optional features a renderer supports
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RendererCaps: u32 {
        const TEXTURES = 1 << 0;
        const RENDER_TARGETS = 1 << 1;
    }
}

/// Backend handle for a loaded font
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontHandle(pub u32);

/// Backend handle for a loaded texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Backend handle for an offscreen render target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetHandle(pub u32);

/// A texture as reported by the backend after loading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureInfo {
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
}

/// Pixel output backend.
///
/// Optional operations have no-op defaults; the core checks
/// [`capabilities`](Renderer::capabilities) before relying on them.
pub trait Renderer {
    fn capabilities(&self) -> RendererCaps {
        RendererCaps::empty()
    }

    fn begin(&mut self);
    fn end(&mut self);
    fn resize(&mut self, width: u32, height: u32);

    fn set_draw_colour(&mut self, colour: Color);
    fn start_clip(&mut self, rect: Rect);
    fn end_clip(&mut self);

    fn draw_rect(&mut self, rect: Rect);
    fn draw_triangle(&mut self, a: Point, b: Point, c: Point);
    fn draw_pixel(&mut self, point: Point);

    fn load_font(&mut self, desc: &FontDesc) -> Option<FontHandle>;
    fn destroy_font(&mut self, font: FontHandle);
    /// Draw a single run of text; `tags` index into `text` by character
    fn draw_text(&mut self, font: FontHandle, text: &str, position: Point, tags: &[FormatTag]);
    fn measure_text(&mut self, font: FontHandle, text: &str) -> Size;

    fn load_texture(&mut self, _path: &str) -> Option<TextureInfo> {
        None
    }
    fn destroy_texture(&mut self, _texture: TextureHandle) {}
    /// `uv` is `[u0, v0, u1, v1]`
    fn draw_textured_rect(&mut self, _texture: TextureHandle, _rect: Rect, _uv: [f32; 4]) {}

    fn create_render_target(&mut self, _width: u32, _height: u32) -> Option<RenderTargetHandle> {
        None
    }
    fn destroy_render_target(&mut self, _target: RenderTargetHandle) {}
    fn draw_render_target(&mut self, _target: RenderTargetHandle, _position: Point) {}
    fn enable_render_target(&mut self, _target: RenderTargetHandle, _origin: Point) {}
    fn disable_render_target(&mut self, _target: RenderTargetHandle) {}
}

/// One recorded call on a [`HeadlessRenderer`]
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Begin,
    End,
    Colour(Color),
    StartClip(Rect),
    EndClip,
    Rect(Rect),
    Triangle([Point; 3]),
    Pixel(Point),
    Text {
        text: String,
        position: Point,
        tags: Vec<FormatTag>,
    },
    TexturedRect {
        texture: TextureHandle,
        rect: Rect,
        uv: [f32; 4],
    },
    RenderTarget {
        target: RenderTargetHandle,
        position: Point,
    },
    EnableTarget(RenderTargetHandle),
    DisableTarget(RenderTargetHandle),
}

/// Renderer without a display.
///
/// Text metrics are monospace: every glyph is [`GLYPH_WIDTH`](Self::GLYPH_WIDTH)
/// pixels wide and a line is as tall as the font size. The renderer is usually
/// boxed into a [`GuiContext`](crate::GuiContext), so its recordings are read
/// through a [`HeadlessProbe`] taken before handing it over.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    caps: RendererCaps,
    state: Rc<RefCell<HeadlessState>>,
}

#[derive(Debug, Default)]
struct HeadlessState {
    size: (u32, u32),
    fonts: HashMap<u32, FontDesc>,
    textures: HashMap<u32, String>,
    targets: usize,
    next_handle: u32,
    commands: Vec<DrawCommand>,
    frames: usize,
}

impl HeadlessState {
    fn allocate_handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }
}

/// Read-only view into a [`HeadlessRenderer`] that outlives the move into a context
#[derive(Debug, Clone)]
pub struct HeadlessProbe {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessProbe {
    /// Commands recorded since the last `begin`
    pub fn commands(&self) -> Vec<DrawCommand> {
        self.state.borrow().commands.clone()
    }

    /// Text runs drawn in the last frame
    pub fn texts(&self) -> Vec<String> {
        self.state
            .borrow()
            .commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of completed frames
    pub fn frames(&self) -> usize {
        self.state.borrow().frames
    }

    /// Number of fonts currently loaded
    pub fn loaded_fonts(&self) -> usize {
        self.state.borrow().fonts.len()
    }

    /// Number of textures currently loaded
    pub fn loaded_textures(&self) -> usize {
        self.state.borrow().textures.len()
    }

    /// Number of render targets currently alive
    pub fn render_targets(&self) -> usize {
        self.state.borrow().targets
    }

    pub fn size(&self) -> (u32, u32) {
        self.state.borrow().size
    }
}

impl HeadlessRenderer {
    pub const GLYPH_WIDTH: f32 = 8.0;

    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend to support optional features
    pub fn with_capabilities(caps: RendererCaps) -> Self {
        Self {
            caps,
            ..Self::default()
        }
    }

    pub fn probe(&self) -> HeadlessProbe {
        HeadlessProbe {
            state: Rc::clone(&self.state),
        }
    }
}

impl Renderer for HeadlessRenderer {
    fn capabilities(&self) -> RendererCaps {
        self.caps
    }

    fn begin(&mut self) {
        let mut state = self.state.borrow_mut();
        state.commands.clear();
        state.push(DrawCommand::Begin);
    }

    fn end(&mut self) {
        let mut state = self.state.borrow_mut();
        state.push(DrawCommand::End);
        state.frames += 1;
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.state.borrow_mut().size = (width, height);
    }

    fn set_draw_colour(&mut self, colour: Color) {
        self.state.borrow_mut().push(DrawCommand::Colour(colour));
    }

    fn start_clip(&mut self, rect: Rect) {
        self.state.borrow_mut().push(DrawCommand::StartClip(rect));
    }

    fn end_clip(&mut self) {
        self.state.borrow_mut().push(DrawCommand::EndClip);
    }

    fn draw_rect(&mut self, rect: Rect) {
        self.state.borrow_mut().push(DrawCommand::Rect(rect));
    }

    fn draw_triangle(&mut self, a: Point, b: Point, c: Point) {
        self.state
            .borrow_mut()
            .push(DrawCommand::Triangle([a, b, c]));
    }

    fn draw_pixel(&mut self, point: Point) {
        self.state.borrow_mut().push(DrawCommand::Pixel(point));
    }

    fn load_font(&mut self, desc: &FontDesc) -> Option<FontHandle> {
        if desc.name.is_empty() || desc.size == 0 {
            return None;
        }
        let mut state = self.state.borrow_mut();
        let handle = state.allocate_handle();
        state.fonts.insert(handle, desc.clone());
        Some(FontHandle(handle))
    }

    fn destroy_font(&mut self, font: FontHandle) {
        self.state.borrow_mut().fonts.remove(&font.0);
    }

    fn draw_text(&mut self, _font: FontHandle, text: &str, position: Point, tags: &[FormatTag]) {
        self.state.borrow_mut().push(DrawCommand::Text {
            text: text.to_string(),
            position,
            tags: tags.to_vec(),
        });
    }

    fn measure_text(&mut self, font: FontHandle, text: &str) -> Size {
        let line_height = self
            .state
            .borrow()
            .fonts
            .get(&font.0)
            .map(|desc| desc.size as f32)
            .unwrap_or(0.0);
        let mut lines = 0usize;
        let mut widest = 0usize;
        for line in text.split('\n') {
            lines += 1;
            widest = widest.max(line.chars().count());
        }
        Size::new(
            widest as f32 * Self::GLYPH_WIDTH,
            lines as f32 * line_height,
        )
    }

    fn load_texture(&mut self, path: &str) -> Option<TextureInfo> {
        if !self.caps.contains(RendererCaps::TEXTURES) || path.is_empty() {
            return None;
        }
        let mut state = self.state.borrow_mut();
        let handle = state.allocate_handle();
        state.textures.insert(handle, path.to_string());
        Some(TextureInfo {
            handle: TextureHandle(handle),
            width: 64,
            height: 64,
        })
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        self.state.borrow_mut().textures.remove(&texture.0);
    }

    fn draw_textured_rect(&mut self, texture: TextureHandle, rect: Rect, uv: [f32; 4]) {
        self.state
            .borrow_mut()
            .push(DrawCommand::TexturedRect { texture, rect, uv });
    }

    fn create_render_target(&mut self, _width: u32, _height: u32) -> Option<RenderTargetHandle> {
        if !self.caps.contains(RendererCaps::RENDER_TARGETS) {
            return None;
        }
        let mut state = self.state.borrow_mut();
        state.targets += 1;
        Some(RenderTargetHandle(state.allocate_handle()))
    }

    fn destroy_render_target(&mut self, _target: RenderTargetHandle) {
        let mut state = self.state.borrow_mut();
        state.targets = state.targets.saturating_sub(1);
    }

    fn draw_render_target(&mut self, target: RenderTargetHandle, position: Point) {
        self.state
            .borrow_mut()
            .push(DrawCommand::RenderTarget { target, position });
    }

    fn enable_render_target(&mut self, target: RenderTargetHandle, _origin: Point) {
        self.state
            .borrow_mut()
            .push(DrawCommand::EnableTarget(target));
    }

    fn disable_render_target(&mut self, target: RenderTargetHandle) {
        self.state
            .borrow_mut()
            .push(DrawCommand::DisableTarget(target));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monospace_measurement() {
        let mut r = HeadlessRenderer::new();
        let font = r.load_font(&FontDesc::new("Mono", 16)).unwrap();
        assert_eq!(r.measure_text(font, "abc"), Size::new(24.0, 16.0));
        assert_eq!(r.measure_text(font, "ab\nabcd"), Size::new(32.0, 32.0));
        assert_eq!(r.measure_text(font, ""), Size::new(0.0, 16.0));
    }

    #[test]
    fn test_probe_sees_recorded_frames() {
        let mut r = HeadlessRenderer::new();
        let probe = r.probe();
        r.begin();
        r.draw_rect(Rect::from_xywh(0.0, 0.0, 4.0, 4.0));
        r.end();
        assert_eq!(probe.frames(), 1);
        assert_eq!(probe.commands().len(), 3);
    }

    #[test]
    fn test_optional_features_follow_caps() {
        let mut plain = HeadlessRenderer::new();
        assert!(plain.load_texture("a.png").is_none());
        assert!(plain.create_render_target(10, 10).is_none());

        let mut full = HeadlessRenderer::with_capabilities(RendererCaps::all());
        assert!(full.load_texture("a.png").is_some());
        assert!(full.create_render_target(10, 10).is_some());
    }
}
