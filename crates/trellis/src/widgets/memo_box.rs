//! Memo box: a scrolling log of word-wrapped lines
//!
//! Lines are kept as added ("raw") and as wrapped to the current width. Once
//! more than `max_history` raw lines are held the oldest one goes, together
//! with every wrapped line cut from it.
//!
//! The display position is a fraction in `0..=1`. At 0 a top-to-bottom memo
//! shows its oldest lines from the top edge, while a bottom-to-top memo shows
//! its newest lines against the bottom edge and so follows new output.

use crate::color::palette;
use crate::element::{Capabilities, Element, ElementDesc, ElementId, ElementKind, WidgetData};
use crate::error::GuiError;
use crate::flags::ElementFlags;
use crate::format::{self, FormatTag};
use crate::primitives::{Point, Rect, Size};
use crate::render::Frame;
use crate::renderer::{FontHandle, Renderer};
use crate::text::{byte_offset, measure, TextAlign};
use crate::widgets::Defaults;
use crate::GuiContext;
use std::collections::VecDeque;

/// Which edge lines are paginated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemoLayout {
    #[default]
    TopToBottom,
    BottomToTop,
}

#[derive(Debug, Clone)]
struct RawLine {
    serial: u64,
    text: String,
    tags: Vec<FormatTag>,
}

/// One wrapped display line
#[derive(Debug, Clone)]
pub struct MemoLine {
    text: String,
    tags: Vec<FormatTag>,
    /// Serial of the raw line this was cut from
    raw: u64,
    position: Option<Point>,
}

impl MemoLine {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tags(&self) -> &[FormatTag] {
        &self.tags
    }

    /// Draw origin, `None` while scrolled out of view
    pub fn position(&self) -> Option<Point> {
        self.position
    }
}

#[derive(Debug, Clone)]
pub struct MemoBoxState {
    raw: VecDeque<RawLine>,
    lines: VecDeque<MemoLine>,
    next_serial: u64,
    max_history: usize,
    position: f32,
    layout: MemoLayout,
    line_height: f32,
    max_visible: usize,
    scrollbar: Option<ElementId>,
}

impl MemoBoxState {
    fn new(max_history: usize) -> Self {
        Self {
            raw: VecDeque::new(),
            lines: VecDeque::new(),
            next_serial: 0,
            max_history,
            position: 0.0,
            layout: MemoLayout::default(),
            line_height: 0.0,
            max_visible: 0,
            scrollbar: None,
        }
    }

    /// Wrapped lines, oldest first
    pub fn lines(&self) -> impl Iterator<Item = &MemoLine> {
        self.lines.iter()
    }

    /// Wrapped lines currently on screen, top to bottom
    pub fn visible_lines(&self) -> impl Iterator<Item = &MemoLine> {
        self.lines.iter().filter(|line| line.position.is_some())
    }

    /// Lines as added, oldest first
    pub fn raw_lines(&self) -> impl Iterator<Item = &str> {
        self.raw.iter().map(|line| line.text.as_str())
    }

    pub fn raw_len(&self) -> usize {
        self.raw.len()
    }

    pub fn wrapped_len(&self) -> usize {
        self.lines.len()
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn layout(&self) -> MemoLayout {
        self.layout
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    pub fn max_visible(&self) -> usize {
        self.max_visible
    }

    pub fn scrollbar(&self) -> Option<ElementId> {
        self.scrollbar
    }

    /// Wrapped lines that do not fit
    fn hidden(&self) -> usize {
        self.lines.len().saturating_sub(self.max_visible)
    }

    /// Scrollbar position showing the current display position
    fn bar_position(&self) -> f32 {
        let hidden = self.hidden() as f32;
        match self.layout {
            MemoLayout::TopToBottom => self.position * hidden,
            MemoLayout::BottomToTop => (1.0 - self.position) * hidden,
        }
    }

    fn evict(&mut self) {
        while self.raw.len() > self.max_history {
            let Some(oldest) = self.raw.pop_front() else {
                break;
            };
            while self
                .lines
                .front()
                .is_some_and(|line| line.raw == oldest.serial)
            {
                self.lines.pop_front();
            }
        }
    }
}

/// Greedy word wrap of `raw` to `width` pixels.
///
/// Breaks at the last space that fits; a word longer than the width is cut
/// where it overflows. Every line holds at least one character.
fn wrap(
    renderer: &mut dyn Renderer,
    font: Option<FontHandle>,
    raw: &RawLine,
    width: f32,
) -> Vec<MemoLine> {
    let text = &raw.text;
    let chars: Vec<char> = text.chars().collect();
    let count = chars.len();
    let line = |start: usize, end: usize| MemoLine {
        text: text[byte_offset(text, start)..byte_offset(text, end)].to_string(),
        tags: format::slice_tags(&raw.tags, start, end),
        raw: raw.serial,
        position: None,
    };
    if count == 0 {
        return vec![line(0, 0)];
    }

    let mut lines = Vec::new();
    let mut start = 0;
    while start < count {
        let mut end = start + 1;
        while end < count {
            let next = &text[byte_offset(text, start)..byte_offset(text, end + 1)];
            if measure(renderer, font, next).width > width {
                break;
            }
            end += 1;
        }
        if end == count {
            lines.push(line(start, end));
            break;
        }
        match (start + 1..=end).rev().find(|&i| chars[i] == ' ') {
            Some(space) => {
                lines.push(line(start, space));
                start = space + 1;
            }
            None => {
                lines.push(line(start, end));
                start = end;
            }
        }
    }
    lines
}

static CAPS: Capabilities = Capabilities {
    render: Some(render),
    on_bounds_change: Some(rewrap),
    on_text_change: Some(rewrap),
    on_mouse_wheel: Some(on_mouse_wheel),
    ..Capabilities::NONE
};

fn memo_mut(ctx: &mut GuiContext, id: ElementId) -> Option<&mut MemoBoxState> {
    match &mut ctx.elements.get_mut(id)?.data {
        WidgetData::MemoBox(memo) => Some(memo),
        _ => None,
    }
}

fn render(frame: &mut Frame<'_>, id: ElementId) {
    let Some(element) = frame.element(id) else {
        return;
    };
    frame.push_clip(element.bounds());
    frame.skin.draw_memobox(frame.renderer, element);
    frame.pop_clip();
}

/// Width available to text, keeping clear of the scrollbar
fn text_area(element: &Element, bar_width: f32) -> Rect {
    let area = element
        .text()
        .map_or(element.bounds, |text| text.content_rect());
    Rect::from_min_size(area.min, [(area.width() - bar_width).max(0.0), area.height()])
}

/// Wrap every raw line again after a width or font change
fn rewrap(ctx: &mut GuiContext, id: ElementId) {
    let bar_width = ctx.config.scrollbar_width;
    let GuiContext {
        elements, renderer, ..
    } = ctx;
    let Some(element) = elements.get_mut(id) else {
        return;
    };
    let font = element.font_handle();
    let width = text_area(element, bar_width).width();
    let WidgetData::MemoBox(memo) = &mut element.data else {
        return;
    };

    memo.line_height = measure(renderer.as_mut(), font, "").height;
    memo.lines = memo
        .raw
        .iter()
        .flat_map(|raw| wrap(renderer.as_mut(), font, raw, width))
        .collect();
    layout(ctx, id);
}

/// Fit the scrollbar to the wrapped line count, then place the lines
fn layout(ctx: &mut GuiContext, id: ElementId) {
    let bar_width = ctx.config.scrollbar_width;
    let Some(element) = ctx.elements.get_mut(id) else {
        return;
    };
    let bounds = element.bounds;
    let height = text_area(element, bar_width).height();
    let WidgetData::MemoBox(memo) = &mut element.data else {
        return;
    };

    memo.max_visible = if memo.line_height > 0.0 {
        (height / memo.line_height).floor() as usize
    } else {
        0
    };
    let count = memo.lines.len();
    let hidden = memo.hidden();
    let bar_size = if count > 0 {
        (memo.max_visible as f32 / count as f32).min(1.0)
    } else {
        1.0
    };
    let target = memo.bar_position();
    let Some(bar) = memo.scrollbar else {
        place_lines(ctx, id);
        return;
    };

    ctx.place(
        bar,
        Rect::from_xywh(bounds.width() - bar_width, 0.0, bar_width, bounds.height()),
    );
    ctx.set_scroll_bar_size(bar, bar_size);
    ctx.set_scroll_content_size(bar, hidden as f32);
    ctx.scroll_to(bar, target);
    ctx.set_visible(bar, hidden > 0);
    place_lines(ctx, id);
}

/// Give the lines in view a draw origin and clear the rest
fn place_lines(ctx: &mut GuiContext, id: ElementId) {
    let bar_width = ctx.config.scrollbar_width;
    let Some(element) = ctx.elements.get_mut(id) else {
        return;
    };
    let area = text_area(element, bar_width);
    let WidgetData::MemoBox(memo) = &mut element.data else {
        return;
    };

    let count = memo.lines.len();
    let offset = (memo.position * memo.hidden() as f32).round() as usize;
    let (line_height, max_visible, layout) = (memo.line_height, memo.max_visible, memo.layout);

    let shown = match layout {
        MemoLayout::TopToBottom => offset..(offset + max_visible).min(count),
        MemoLayout::BottomToTop => {
            let end = count.saturating_sub(offset);
            end.saturating_sub(max_visible)..end
        }
    };
    for (index, line) in memo.lines.iter_mut().enumerate() {
        line.position = shown.contains(&index).then(|| match layout {
            MemoLayout::TopToBottom => Point::new(
                area.x(),
                area.y() + (index - shown.start) as f32 * line_height,
            ),
            MemoLayout::BottomToTop => Point::new(
                area.x(),
                area.max[1] - (shown.end - index) as f32 * line_height,
            ),
        });
    }
    ctx.invalidate(id);
}

fn on_scroll(ctx: &mut GuiContext, id: ElementId, bar_position: f32) {
    let Some(memo) = memo_mut(ctx, id) else {
        return;
    };
    let hidden = memo.hidden();
    if hidden > 0 {
        let fraction = (bar_position / hidden as f32).clamp(0.0, 1.0);
        memo.position = match memo.layout {
            MemoLayout::TopToBottom => fraction,
            MemoLayout::BottomToTop => 1.0 - fraction,
        };
    }
    place_lines(ctx, id);
}

fn on_mouse_wheel(ctx: &mut GuiContext, id: ElementId, delta: f32) {
    if let Some(bar) = ctx.memo_scrollbar(id).filter(|&bar| ctx.is_visible(bar)) {
        ctx.scroll_by(bar, -delta);
    }
}

impl Element {
    pub fn as_memo_box(&self) -> Option<&MemoBoxState> {
        match &self.data {
            WidgetData::MemoBox(memo) => Some(memo),
            _ => None,
        }
    }
}

impl GuiContext {
    pub fn create_memo_box(&mut self, parent: Option<ElementId>) -> Result<ElementId, GuiError> {
        let id = self.create_element(
            parent,
            ElementKind::MemoBox,
            &CAPS,
            WidgetData::MemoBox(MemoBoxState::new(self.config.memo_max_history)),
            true,
        )?;
        let bar = match self.create_scrollbar(Some(id)) {
            Ok(bar) => bar,
            Err(err) => {
                self.destroy(id);
                return Err(err);
            }
        };
        self.set_scroll_owner(bar, on_scroll);
        if let Some(memo) = memo_mut(self, id) {
            memo.scrollbar = Some(bar);
        }
        self.init_element(
            id,
            Defaults {
                flags: ElementFlags::VISIBLE
                    | ElementFlags::BORDER
                    | ElementFlags::BACKGROUND
                    | ElementFlags::MOUSE_CONTROL,
                colour: palette::SURFACE,
                size: Size::new(200.0, 100.0),
                align: Some(TextAlign::TOP_LEFT),
            },
        );
        Ok(id)
    }

    pub fn create_memo_box_ex(
        &mut self,
        parent: Option<ElementId>,
        desc: &ElementDesc,
    ) -> Result<ElementId, GuiError> {
        let id = self.create_memo_box(parent)?;
        self.apply_desc(id, desc);
        Ok(id)
    }

    /// Append text; each `\n` starts a new raw line.
    ///
    /// Markup is parsed per line when the memo has `TEXT_FORMATTING`.
    pub fn add_memo_line(&mut self, id: ElementId, text: &str) {
        let formatting = self.flags_of(id).contains(ElementFlags::TEXT_FORMATTING);
        let bar_width = self.config.scrollbar_width;
        let GuiContext {
            elements, renderer, ..
        } = self;
        let Some(element) = elements.get_mut(id) else {
            log::trace!("add_memo_line on stale element {id:?}");
            return;
        };
        let font = element.font_handle();
        let width = text_area(element, bar_width).width();
        let WidgetData::MemoBox(memo) = &mut element.data else {
            return;
        };

        for piece in text.split('\n') {
            let (text, tags) = if formatting {
                let parsed = format::parse(piece);
                (parsed.text, parsed.tags)
            } else {
                (piece.to_string(), Vec::new())
            };
            let raw = RawLine {
                serial: memo.next_serial,
                text,
                tags,
            };
            memo.next_serial += 1;
            memo.lines.extend(wrap(renderer.as_mut(), font, &raw, width));
            memo.raw.push_back(raw);
        }
        memo.evict();
        layout(self, id);
    }

    pub fn clear_memo(&mut self, id: ElementId) {
        if let Some(memo) = memo_mut(self, id) {
            memo.raw.clear();
            memo.lines.clear();
            memo.position = 0.0;
            layout(self, id);
        }
    }

    /// Raw lines held
    pub fn memo_line_count(&self, id: ElementId) -> usize {
        self.elements
            .get(id)
            .and_then(Element::as_memo_box)
            .map_or(0, MemoBoxState::raw_len)
    }

    pub fn memo_position(&self, id: ElementId) -> Option<f32> {
        Some(self.elements.get(id)?.as_memo_box()?.position)
    }

    /// Display position in `0..=1`, measured from the layout's anchored edge
    pub fn set_memo_position(&mut self, id: ElementId, position: f32) {
        if let Some(memo) = memo_mut(self, id) {
            memo.position = position.clamp(0.0, 1.0);
            layout(self, id);
        }
    }

    pub fn set_memo_layout(&mut self, id: ElementId, memo_layout: MemoLayout) {
        if let Some(memo) = memo_mut(self, id) {
            memo.layout = memo_layout;
            layout(self, id);
        }
    }

    /// Drops the oldest lines right away if the memo holds more
    pub fn set_memo_max_history(&mut self, id: ElementId, max_history: usize) {
        if let Some(memo) = memo_mut(self, id) {
            memo.max_history = max_history;
            memo.evict();
            layout(self, id);
        }
    }

    pub fn memo_scrollbar(&self, id: ElementId) -> Option<ElementId> {
        self.elements.get(id)?.as_memo_box()?.scrollbar
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::GuiConfig;
    use crate::renderer::HeadlessRenderer;

    /// Text area is 180x46 with 8px glyphs and 11px lines, so 22 columns and 4 rows
    fn setup(config: GuiConfig) -> (GuiContext, ElementId) {
        let mut ctx = GuiContext::with_config(HeadlessRenderer::new(), 640, 480, config);
        let memo = ctx
            .create_memo_box_ex(None, &ElementDesc::at(0.0, 0.0, 200.0, 50.0))
            .unwrap();
        (ctx, memo)
    }

    fn memo(ctx: &GuiContext, id: ElementId) -> &MemoBoxState {
        ctx.element(id).unwrap().as_memo_box().unwrap()
    }

    fn wrapped(ctx: &GuiContext, id: ElementId) -> Vec<String> {
        memo(ctx, id).lines().map(|line| line.text().to_string()).collect()
    }

    fn y_of(ctx: &GuiContext, id: ElementId, index: usize) -> Option<f32> {
        memo(ctx, id).lines().nth(index)?.position().map(|p| p.y)
    }

    #[test]
    fn test_wraps_at_word_boundaries() {
        let (mut ctx, id) = setup(GuiConfig::default());
        ctx.add_memo_line(id, &vec!["word"; 10].join(" "));
        assert_eq!(
            wrapped(&ctx, id),
            vec!["word word word word", "word word word word", "word word"]
        );
        assert_eq!(ctx.memo_line_count(id), 1);
    }

    #[test]
    fn test_long_word_is_cut() {
        let (mut ctx, id) = setup(GuiConfig::default());
        ctx.add_memo_line(id, &"x".repeat(30));
        assert_eq!(wrapped(&ctx, id), vec!["x".repeat(22), "x".repeat(8)]);
    }

    #[test]
    fn test_newlines_split_raw_lines() {
        let (mut ctx, id) = setup(GuiConfig::default());
        ctx.add_memo_line(id, "one\ntwo");
        assert_eq!(ctx.memo_line_count(id), 2);
        ctx.add_memo_line(id, "");
        assert_eq!(wrapped(&ctx, id), vec!["one", "two", ""]);
    }

    #[test]
    fn test_history_evicts_oldest() {
        let (mut ctx, id) = setup(GuiConfig::default().with_memo_max_history(3));
        ctx.add_memo_line(id, &vec!["word"; 10].join(" "));
        for i in 1..5 {
            ctx.add_memo_line(id, &format!("line {i}"));
        }
        assert_eq!(ctx.memo_line_count(id), 3);
        assert_eq!(wrapped(&ctx, id), vec!["line 2", "line 3", "line 4"]);

        ctx.set_memo_max_history(id, 1);
        assert_eq!(wrapped(&ctx, id), vec!["line 4"]);
    }

    #[test]
    fn test_top_to_bottom_scrolling() {
        let (mut ctx, id) = setup(GuiConfig::default());
        for i in 0..6 {
            ctx.add_memo_line(id, &format!("line {i}"));
        }
        let bar = ctx.memo_scrollbar(id).unwrap();
        assert!(ctx.is_visible(bar));
        assert_eq!(memo(&ctx, id).max_visible(), 4);
        assert_eq!(y_of(&ctx, id, 0), Some(2.0));
        assert_eq!(y_of(&ctx, id, 4), None);

        ctx.set_memo_position(id, 1.0);
        assert_eq!(y_of(&ctx, id, 0), None);
        assert_eq!(y_of(&ctx, id, 2), Some(2.0));
        assert_eq!(ctx.scroll_position(bar), Some(2.0));

        ctx.scroll_to(bar, 1.0);
        assert_eq!(ctx.memo_position(id), Some(0.5));
        assert_eq!(y_of(&ctx, id, 1), Some(2.0));
    }

    #[test]
    fn test_bottom_to_top_follows_newest() {
        let (mut ctx, id) = setup(GuiConfig::default());
        ctx.set_memo_layout(id, MemoLayout::BottomToTop);
        ctx.add_memo_line(id, "a");
        ctx.add_memo_line(id, "b");
        assert_eq!(y_of(&ctx, id, 1), Some(37.0));
        assert_eq!(y_of(&ctx, id, 0), Some(26.0));

        for i in 0..4 {
            ctx.add_memo_line(id, &format!("line {i}"));
        }
        assert_eq!(y_of(&ctx, id, 5), Some(37.0));
        assert_eq!(y_of(&ctx, id, 1), None);
        let bar = ctx.memo_scrollbar(id).unwrap();
        assert_eq!(ctx.scroll_position(bar), Some(2.0));

        ctx.scroll_to(bar, 0.0);
        assert_eq!(ctx.memo_position(id), Some(1.0));
        assert_eq!(y_of(&ctx, id, 0), Some(4.0));
        assert_eq!(y_of(&ctx, id, 5), None);
    }

    #[test]
    fn test_resize_rewraps() {
        let (mut ctx, id) = setup(GuiConfig::default());
        ctx.add_memo_line(id, &vec!["word"; 10].join(" "));
        ctx.set_size(id, 420.0, 50.0);
        assert_eq!(wrapped(&ctx, id).len(), 1);
    }

    #[test]
    fn test_only_visible_lines_are_drawn() {
        let renderer = HeadlessRenderer::new();
        let probe = renderer.probe();
        let mut ctx = GuiContext::new(renderer, 640, 480);
        let id = ctx
            .create_memo_box_ex(None, &ElementDesc::at(0.0, 0.0, 200.0, 50.0))
            .unwrap();
        for i in 0..6 {
            ctx.add_memo_line(id, &format!("line {i}"));
        }
        ctx.render();
        let texts = probe.texts();
        assert!(texts.contains(&"line 3".to_string()));
        assert!(!texts.contains(&"line 4".to_string()));
    }
}
