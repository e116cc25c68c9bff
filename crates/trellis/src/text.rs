//! Text layout owned by an element
//!
//! A [`Text`] keeps its displayed buffer, measured size and render origin in
//! sync. Every mutating call recomputes the layout immediately, so the cached
//! position is never stale with respect to bounds, padding, alignment, font or
//! content.

use crate::color::{palette, Color};
use crate::format::{self, FormatTag};
use crate::primitives::{Point, Rect, Size, Spacing};
use crate::renderer::{FontHandle, Renderer};

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HorizontalAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalAlign {
    #[default]
    Top,
    Center,
    Bottom,
}

/// Nine-way alignment of text inside its bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextAlign {
    pub h: HorizontalAlign,
    pub v: VerticalAlign,
}

impl TextAlign {
    pub const TOP_LEFT: Self = Self::new(HorizontalAlign::Left, VerticalAlign::Top);
    pub const TOP: Self = Self::new(HorizontalAlign::Center, VerticalAlign::Top);
    pub const TOP_RIGHT: Self = Self::new(HorizontalAlign::Right, VerticalAlign::Top);
    pub const LEFT: Self = Self::new(HorizontalAlign::Left, VerticalAlign::Center);
    pub const CENTER: Self = Self::new(HorizontalAlign::Center, VerticalAlign::Center);
    pub const RIGHT: Self = Self::new(HorizontalAlign::Right, VerticalAlign::Center);
    pub const BOTTOM_LEFT: Self = Self::new(HorizontalAlign::Left, VerticalAlign::Bottom);
    pub const BOTTOM: Self = Self::new(HorizontalAlign::Center, VerticalAlign::Bottom);
    pub const BOTTOM_RIGHT: Self = Self::new(HorizontalAlign::Right, VerticalAlign::Bottom);

    pub const fn new(h: HorizontalAlign, v: VerticalAlign) -> Self {
        Self { h, v }
    }
}

/// Measure `text` with `font`; an element without a loaded font has no extent
pub fn measure(renderer: &mut dyn Renderer, font: Option<FontHandle>, text: &str) -> Size {
    match font {
        Some(font) => renderer.measure_text(font, text),
        None => Size::zero(),
    }
}

/// Byte offset of character `index` in `s`, clamped to the end
pub fn byte_offset(s: &str, index: usize) -> usize {
    s.char_indices()
        .nth(index)
        .map(|(offset, _)| offset)
        .unwrap_or(s.len())
}

/// Characters in `s`
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[derive(Debug, Clone)]
pub struct Text {
    /// Content as last set, markup included
    pub(crate) source: String,
    pub(crate) buffer: String,
    pub(crate) tags: Vec<FormatTag>,
    pub(crate) size: Size,
    pub(crate) position: Point,
    pub(crate) bounds: Rect,
    pub(crate) padding: Spacing,
    pub(crate) align: TextAlign,
    pub(crate) colour: Color,
    /// Horizontal shift applied after alignment (edit boxes scroll their text)
    pub(crate) scroll_x: f32,
}

impl Default for Text {
    fn default() -> Self {
        Self {
            source: String::new(),
            buffer: String::new(),
            tags: Vec::new(),
            size: Size::zero(),
            position: Point::zero(),
            bounds: Rect::default(),
            padding: Spacing::all(2.0),
            align: TextAlign::LEFT,
            colour: palette::TEXT,
            scroll_x: 0.0,
        }
    }
}

impl Text {
    /// Displayed text with markup removed
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Content as last set, markup included
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tags(&self) -> &[FormatTag] {
        &self.tags
    }

    /// Measured size of the displayed text
    pub fn size(&self) -> Size {
        self.size
    }

    /// Top-left origin the text is drawn at
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn padding(&self) -> Spacing {
        self.padding
    }

    pub fn align(&self) -> TextAlign {
        self.align
    }

    pub fn colour(&self) -> Color {
        self.colour
    }

    /// Character count of the displayed text
    pub fn len(&self) -> usize {
        char_len(&self.buffer)
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Replace the content, parsing markup when `formatting` is set.
    ///
    /// The buffer is reallocated to fit exactly.
    pub fn set_buffer(
        &mut self,
        renderer: &mut dyn Renderer,
        font: Option<FontHandle>,
        source: &str,
        formatting: bool,
    ) {
        self.source = source.to_string();
        if formatting {
            let parsed = format::parse(source);
            self.buffer = parsed.text;
            self.tags = parsed.tags;
        } else {
            self.buffer = source.to_string();
            self.tags.clear();
        }
        self.buffer.shrink_to_fit();
        self.update_dimensions(renderer, font);
        self.update_position();
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
        self.update_position();
    }

    pub fn set_padding(&mut self, padding: Spacing) {
        self.padding = padding;
        self.update_position();
    }

    pub fn set_align(&mut self, align: TextAlign) {
        self.align = align;
        self.update_position();
    }

    pub fn set_colour(&mut self, colour: Color) {
        self.colour = colour;
    }

    /// Re-measure after the font or content changed
    pub fn update_dimensions(&mut self, renderer: &mut dyn Renderer, font: Option<FontHandle>) {
        self.size = measure(renderer, font, &self.buffer);
    }

    /// Recompute the render origin from bounds, padding and alignment
    pub fn update_position(&mut self) {
        let area = self.bounds.shrink(self.padding);

        let x = match self.align.h {
            HorizontalAlign::Left => area.x(),
            HorizontalAlign::Center => area.x() + (area.width() - self.size.width) / 2.0,
            HorizontalAlign::Right => area.max[0] - self.size.width,
        };
        let y = match self.align.v {
            VerticalAlign::Top => area.y(),
            VerticalAlign::Center => area.y() + (area.height() - self.size.height) / 2.0,
            VerticalAlign::Bottom => area.max[1] - self.size.height,
        };

        self.position = Point::new((x - self.scroll_x).floor(), y.floor());
    }

    /// Area inside the padding
    pub fn content_rect(&self) -> Rect {
        self.bounds.shrink(self.padding)
    }

    /// Pixel x of character `index` within `shown`, relative to the text origin
    pub fn char_offset(
        renderer: &mut dyn Renderer,
        font: Option<FontHandle>,
        shown: &str,
        index: usize,
    ) -> f32 {
        let end = byte_offset(shown, index);
        measure(renderer, font, &shown[..end]).width
    }

    /// Absolute position of character `index` of the displayed text
    pub fn char_position(
        &self,
        renderer: &mut dyn Renderer,
        font: Option<FontHandle>,
        index: usize,
    ) -> Point {
        let dx = Self::char_offset(renderer, font, &self.buffer, index);
        Point::new(self.position.x + dx, self.position.y)
    }

    /// Index of the character boundary in `shown` nearest to absolute `x`.
    ///
    /// Only the x axis is considered.
    pub fn closest_char(
        &self,
        renderer: &mut dyn Renderer,
        font: Option<FontHandle>,
        shown: &str,
        x: f32,
    ) -> usize {
        let target = x - self.position.x;
        let mut best = 0;
        let mut best_distance = f32::MAX;
        for index in 0..=char_len(shown) {
            let distance = (Self::char_offset(renderer, font, shown, index) - target).abs();
            if distance < best_distance {
                best = index;
                best_distance = distance;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontDesc;
    use crate::renderer::HeadlessRenderer;

    fn setup() -> (HeadlessRenderer, Option<FontHandle>) {
        let mut renderer = HeadlessRenderer::new();
        let font = renderer.load_font(&FontDesc::new("Mono", 10));
        (renderer, font)
    }

    #[test]
    fn test_alignment_positions() {
        let (mut renderer, font) = setup();
        let mut text = Text {
            padding: Spacing::ZERO,
            ..Text::default()
        };
        text.set_bounds(Rect::from_xywh(0.0, 0.0, 100.0, 50.0));
        text.set_buffer(&mut renderer, font, "abcd", false);

        text.set_align(TextAlign::TOP_LEFT);
        assert_eq!(text.position(), Point::new(0.0, 0.0));

        text.set_align(TextAlign::CENTER);
        assert_eq!(text.position(), Point::new(34.0, 20.0));

        text.set_align(TextAlign::BOTTOM_RIGHT);
        assert_eq!(text.position(), Point::new(68.0, 40.0));
    }

    #[test]
    fn test_position_follows_every_change() {
        let (mut renderer, font) = setup();
        let mut text = Text::default();
        text.set_align(TextAlign::RIGHT);
        text.set_bounds(Rect::from_xywh(0.0, 0.0, 100.0, 20.0));
        text.set_buffer(&mut renderer, font, "ab", false);
        let before = text.position();

        text.set_buffer(&mut renderer, font, "abcd", false);
        assert_eq!(text.position().x, before.x - 16.0);

        text.set_padding(Spacing::all(10.0));
        assert_eq!(text.position().x, 100.0 - 10.0 - 32.0);

        text.set_bounds(Rect::from_xywh(50.0, 0.0, 100.0, 20.0));
        assert_eq!(text.position().x, 150.0 - 10.0 - 32.0);
    }

    #[test]
    fn test_formatting_strips_markup() {
        let (mut renderer, font) = setup();
        let mut text = Text::default();
        text.set_buffer(&mut renderer, font, "[uline]ab[u]", true);
        assert_eq!(text.as_str(), "ab");
        assert_eq!(text.tags().len(), 2);
        assert_eq!(text.size().width, 16.0);

        text.set_buffer(&mut renderer, font, "[uline]ab[u]", false);
        assert_eq!(text.len(), 12);
        assert!(text.tags().is_empty());
    }

    #[test]
    fn test_closest_char_uses_x_only() {
        let (mut renderer, font) = setup();
        let mut text = Text {
            padding: Spacing::ZERO,
            ..Text::default()
        };
        text.set_bounds(Rect::from_xywh(0.0, 0.0, 100.0, 20.0));
        text.set_buffer(&mut renderer, font, "hello", false);

        assert_eq!(text.closest_char(&mut renderer, font, "hello", -5.0), 0);
        assert_eq!(text.closest_char(&mut renderer, font, "hello", 11.0), 1);
        assert_eq!(text.closest_char(&mut renderer, font, "hello", 13.0), 2);
        assert_eq!(text.closest_char(&mut renderer, font, "hello", 500.0), 5);
    }

    #[test]
    fn test_no_font_measures_nothing() {
        let mut renderer = HeadlessRenderer::new();
        let mut text = Text::default();
        text.set_buffer(&mut renderer, None, "abc", false);
        assert_eq!(text.size(), Size::zero());
    }

    #[test]
    fn test_byte_offset_handles_multibyte() {
        assert_eq!(byte_offset("héllo", 2), 3);
        assert_eq!(byte_offset("héllo", 99), 6);
    }
}
