//! Single-line edit box
//!
//! The element's text buffer holds the content. The box keeps a cursor and a
//! selection anchor as character indices; the selection is the range between
//! them. Everything derived from them (displayed string, cursor and selection
//! rects, horizontal scroll) is recomputed after every edit, so it never lags
//! behind the content.

use crate::color::palette;
use crate::element::{Capabilities, Element, ElementDesc, ElementId, ElementKind, WidgetData};
use crate::error::GuiError;
use crate::events::EventKind;
use crate::flags::{ElementFlags, StateFlags};
use crate::input::{Key, MouseButton, NamedKey};
use crate::primitives::{Point, Rect, Size};
use crate::render::Frame;
use crate::text::{byte_offset, char_len, measure, Text, TextAlign};
use crate::widgets::Defaults;
use crate::GuiContext;

#[derive(Debug, Clone, Default)]
pub struct EditBoxState {
    cursor: usize,
    /// Anchor of the selection; equal to `cursor` when nothing is selected
    selection_end: usize,
    /// Content as drawn, masked when the box has `MASK_INPUT`
    display: String,
    cursor_rect: Rect,
    selection_rect: Option<Rect>,
    cursor_visible: bool,
    last_blink: u64,
}

impl EditBoxState {
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selection_end(&self) -> usize {
        self.selection_end
    }

    /// Selected character range, empty when nothing is selected
    pub fn selection(&self) -> (usize, usize) {
        (
            self.cursor.min(self.selection_end),
            self.cursor.max(self.selection_end),
        )
    }

    pub fn has_selection(&self) -> bool {
        self.cursor != self.selection_end
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn cursor_rect(&self) -> Rect {
        self.cursor_rect
    }

    pub fn selection_rect(&self) -> Option<Rect> {
        self.selection_rect
    }

    /// Blink phase; only meaningful while focused
    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }
}

static CAPS: Capabilities = Capabilities {
    render: Some(render),
    process: Some(process),
    on_bounds_change: Some(sync),
    on_flags_change: Some(on_flags_change),
    on_text_change: Some(sync),
    on_mouse_click: Some(on_mouse_click),
    on_mouse_drag: Some(on_mouse_drag),
    on_character: Some(on_character),
    on_key_press: Some(on_key_press),
    ..Capabilities::NONE
};

fn parts(element: &mut Element) -> Option<(&mut Text, &mut EditBoxState)> {
    let Element { text, data, .. } = element;
    match (text.as_mut(), data) {
        (Some(text), WidgetData::EditBox(edit)) => Some((text, edit)),
        _ => None,
    }
}

fn render(frame: &mut Frame<'_>, id: ElementId) {
    let Some(element) = frame.element(id) else {
        return;
    };
    frame.push_clip(element.bounds());
    frame.skin.draw_editbox(frame.renderer, element);
    frame.pop_clip();
}

/// Recompute everything derived from the content, cursor and selection.
///
/// Scrolls the text horizontally so the cursor stays inside the box and
/// restarts the blink with the cursor shown.
fn sync(ctx: &mut GuiContext, id: ElementId) {
    let mask = ctx.config.mask_char;
    let masked = ctx.flags_of(id).contains(ElementFlags::MASK_INPUT);
    let ticks = ctx.ticks;
    let GuiContext {
        elements, renderer, ..
    } = ctx;
    let Some(element) = elements.get_mut(id) else {
        return;
    };
    let font = element.font_handle();
    let Some((text, edit)) = parts(element) else {
        return;
    };
    let renderer = renderer.as_mut();

    let len = char_len(&text.buffer);
    edit.cursor = edit.cursor.min(len);
    edit.selection_end = edit.selection_end.min(len);
    text.source.clone_from(&text.buffer);
    text.tags.clear();
    edit.display = if masked {
        std::iter::repeat(mask).take(len).collect()
    } else {
        text.buffer.clone()
    };
    text.size = measure(renderer, font, &edit.display);
    let line_height = measure(renderer, font, "").height;

    let width = text.content_rect().width();
    let cursor_x = Text::char_offset(renderer, font, &edit.display, edit.cursor);
    if text.size.width <= width {
        text.scroll_x = 0.0;
    } else if cursor_x - text.scroll_x > width {
        text.scroll_x = cursor_x - width;
    } else if cursor_x < text.scroll_x {
        text.scroll_x = cursor_x;
    }
    text.update_position();

    let origin = text.position;
    edit.cursor_rect = Rect::from_xywh(origin.x + cursor_x, origin.y, 1.0, line_height);
    edit.selection_rect = if edit.has_selection() {
        let (start, end) = edit.selection();
        let start_x = Text::char_offset(renderer, font, &edit.display, start);
        let end_x = Text::char_offset(renderer, font, &edit.display, end);
        Some(Rect::from_xywh(
            origin.x + start_x,
            origin.y,
            end_x - start_x,
            line_height,
        ))
    } else {
        None
    };
    edit.cursor_visible = true;
    edit.last_blink = ticks;
    ctx.invalidate(id);
}

/// Insert at the cursor, replacing the selection.
///
/// Control characters are dropped. The buffer grows with `edit_slack` spare
/// bytes so typing does not reallocate on every character.
pub(crate) fn insert_text(ctx: &mut GuiContext, id: ElementId, inserted: &str) {
    let inserted: String = inserted.chars().filter(|c| !c.is_control()).collect();
    if inserted.is_empty() {
        return;
    }
    erase_selection(ctx, id);
    let slack = ctx.config.edit_slack;
    let Some((text, edit)) = ctx.elements.get_mut(id).and_then(parts) else {
        log::trace!("insert_text on non-edit-box {id:?}");
        return;
    };

    if text.buffer.capacity() < text.buffer.len() + inserted.len() + 1 {
        text.buffer.reserve_exact(inserted.len() + 1 + slack);
    }
    let at = byte_offset(&text.buffer, edit.cursor);
    text.buffer.insert_str(at, &inserted);
    edit.cursor += char_len(&inserted);
    edit.selection_end = edit.cursor;
    sync(ctx, id);
}

/// Remove characters `begin..end`; cursor and anchor both land on `begin`
fn erase(ctx: &mut GuiContext, id: ElementId, begin: usize, end: usize) {
    let Some((text, edit)) = ctx.elements.get_mut(id).and_then(parts) else {
        return;
    };
    let end = end.min(char_len(&text.buffer));
    let begin = begin.min(end);
    let range = byte_offset(&text.buffer, begin)..byte_offset(&text.buffer, end);
    text.buffer.replace_range(range, "");
    edit.cursor = begin;
    edit.selection_end = begin;
    sync(ctx, id);
}

/// Returns false when there was nothing selected
fn erase_selection(ctx: &mut GuiContext, id: ElementId) -> bool {
    match ctx.elements.get(id).and_then(Element::as_edit_box) {
        Some(edit) if edit.has_selection() => {
            let (start, end) = edit.selection();
            erase(ctx, id, start, end);
            true
        }
        _ => false,
    }
}

/// Move the cursor to `to(cursor, len)`, extending the selection if asked
fn move_cursor(
    ctx: &mut GuiContext,
    id: ElementId,
    extend: bool,
    to: impl FnOnce(usize, usize) -> usize,
) {
    let Some((text, edit)) = ctx.elements.get_mut(id).and_then(parts) else {
        return;
    };
    edit.cursor = to(edit.cursor, char_len(&text.buffer));
    if !extend {
        edit.selection_end = edit.cursor;
    }
    sync(ctx, id);
}

/// Character boundary nearest to screen `x`
fn char_at(ctx: &mut GuiContext, id: ElementId, x: f32) -> Option<usize> {
    let GuiContext {
        elements, renderer, ..
    } = ctx;
    let element = elements.get(id)?;
    let text = element.text.as_ref()?;
    let edit = element.as_edit_box()?;
    Some(text.closest_char(renderer.as_mut(), element.font_handle(), &edit.display, x))
}

fn process(ctx: &mut GuiContext, id: ElementId) {
    let blink = ctx.config.cursor_blink_ms;
    let ticks = ctx.ticks;
    let Some(element) = ctx.elements.get_mut(id) else {
        return;
    };
    if !element.has_state(StateFlags::FOCUSED) {
        return;
    }
    let WidgetData::EditBox(edit) = &mut element.data else {
        return;
    };
    if ticks.saturating_sub(edit.last_blink) >= blink {
        edit.cursor_visible = !edit.cursor_visible;
        edit.last_blink = ticks;
        ctx.invalidate(id);
    }
}

fn on_flags_change(ctx: &mut GuiContext, id: ElementId, old: ElementFlags) {
    let masked = ctx.flags_of(id).contains(ElementFlags::MASK_INPUT);
    if masked != old.contains(ElementFlags::MASK_INPUT) {
        sync(ctx, id);
    }
}

fn on_mouse_click(ctx: &mut GuiContext, id: ElementId, button: MouseButton, position: Point) {
    if button != MouseButton::Left {
        return;
    }
    let extend = ctx.modifiers().shift;
    if let Some(index) = char_at(ctx, id, position.x) {
        move_cursor(ctx, id, extend, |_, _| index);
    }
}

fn on_mouse_drag(ctx: &mut GuiContext, id: ElementId, position: Point, _delta: Point) {
    if let Some(index) = char_at(ctx, id, position.x) {
        move_cursor(ctx, id, true, |_, _| index);
    }
}

fn on_character(ctx: &mut GuiContext, id: ElementId, ch: char) {
    if ch.is_control() || ctx.modifiers().any_command() {
        return;
    }
    let mut buf = [0; 4];
    insert_text(ctx, id, ch.encode_utf8(&mut buf));
}

fn on_key_press(ctx: &mut GuiContext, id: ElementId, key: &Key, pressed: bool) {
    if !pressed {
        return;
    }
    let modifiers = ctx.modifiers();
    if modifiers.ctrl {
        if key.is_char('a') {
            ctx.edit_select_all(id);
        } else if key.is_char('x') {
            ctx.edit_cut(id);
        } else if key.is_char('c') {
            ctx.edit_copy(id);
        } else if key.is_char('v') {
            ctx.edit_paste(id);
        }
        if !matches!(key, Key::Named(_)) {
            return;
        }
    }

    let Key::Named(named) = key else {
        return;
    };
    let shift = modifiers.shift;
    match named {
        NamedKey::Backspace => {
            if !erase_selection(ctx, id) {
                if let Some(cursor) = ctx.edit_cursor(id).filter(|&c| c > 0) {
                    erase(ctx, id, cursor - 1, cursor);
                }
            }
        }
        NamedKey::Delete => {
            if !erase_selection(ctx, id) {
                if let Some(cursor) = ctx.edit_cursor(id) {
                    erase(ctx, id, cursor, cursor + 1);
                }
            }
        }
        NamedKey::Enter => ctx.emit(id, EventKind::InputReturn),
        NamedKey::ArrowLeft => move_cursor(ctx, id, shift, |cursor, _| cursor.saturating_sub(1)),
        NamedKey::ArrowRight => move_cursor(ctx, id, shift, |cursor, len| (cursor + 1).min(len)),
        NamedKey::Home => move_cursor(ctx, id, shift, |_, _| 0),
        NamedKey::End => move_cursor(ctx, id, shift, |_, len| len),
        _ => {}
    }
}

impl Element {
    pub fn as_edit_box(&self) -> Option<&EditBoxState> {
        match &self.data {
            WidgetData::EditBox(edit) => Some(edit),
            _ => None,
        }
    }
}

impl GuiContext {
    pub fn create_edit_box(&mut self, parent: Option<ElementId>) -> Result<ElementId, GuiError> {
        let id = self.create_element(
            parent,
            ElementKind::EditBox,
            &CAPS,
            WidgetData::EditBox(EditBoxState::default()),
            true,
        )?;
        self.init_element(
            id,
            Defaults {
                flags: ElementFlags::VISIBLE
                    | ElementFlags::BORDER
                    | ElementFlags::BACKGROUND
                    | ElementFlags::MOUSE_CONTROL
                    | ElementFlags::KEYBOARD_CONTROL
                    | ElementFlags::DRAGGABLE,
                colour: palette::SURFACE,
                size: Size::new(150.0, 20.0),
                align: Some(TextAlign::LEFT),
            },
        );
        Ok(id)
    }

    pub fn create_edit_box_ex(
        &mut self,
        parent: Option<ElementId>,
        desc: &ElementDesc,
    ) -> Result<ElementId, GuiError> {
        let id = self.create_edit_box(parent)?;
        self.apply_desc(id, desc);
        Ok(id)
    }

    /// Type `text` at the cursor as if entered from the keyboard
    pub fn edit_insert(&mut self, id: ElementId, text: &str) {
        insert_text(self, id, text);
    }

    /// Remove characters `begin..end`, clamped to the content
    pub fn edit_erase(&mut self, id: ElementId, begin: usize, end: usize) {
        erase(self, id, begin, end);
    }

    pub fn edit_cursor(&self, id: ElementId) -> Option<usize> {
        Some(self.elements.get(id)?.as_edit_box()?.cursor)
    }

    /// Selected character range as `(start, end)`
    pub fn edit_selection(&self, id: ElementId) -> Option<(usize, usize)> {
        Some(self.elements.get(id)?.as_edit_box()?.selection())
    }

    pub fn edit_selected_text(&self, id: ElementId) -> Option<String> {
        let element = self.elements.get(id)?;
        let (start, end) = element.as_edit_box()?.selection();
        let buffer = element.text.as_ref()?.as_str();
        Some(buffer[byte_offset(buffer, start)..byte_offset(buffer, end)].to_string())
    }

    /// Content as drawn
    pub fn edit_display(&self, id: ElementId) -> Option<&str> {
        Some(self.elements.get(id)?.as_edit_box()?.display())
    }

    /// Place the cursor and clear the selection
    pub fn set_edit_cursor(&mut self, id: ElementId, index: usize) {
        move_cursor(self, id, false, |_, len| index.min(len));
    }

    /// Select from `anchor` to `cursor`; the cursor ends up at `cursor`
    pub fn set_edit_selection(&mut self, id: ElementId, anchor: usize, cursor: usize) {
        let Some((text, edit)) = self.elements.get_mut(id).and_then(parts) else {
            return;
        };
        let len = char_len(&text.buffer);
        edit.selection_end = anchor.min(len);
        edit.cursor = cursor.min(len);
        sync(self, id);
    }

    pub fn edit_select_all(&mut self, id: ElementId) {
        let Some((text, edit)) = self.elements.get_mut(id).and_then(parts) else {
            return;
        };
        edit.cursor = char_len(&text.buffer);
        edit.selection_end = 0;
        sync(self, id);
    }

    /// Copy the selection to the clipboard
    pub fn edit_copy(&mut self, id: ElementId) {
        if let Some(selected) = self.edit_selected_text(id).filter(|s| !s.is_empty()) {
            self.clipboard.set_text(&selected);
        }
    }

    /// Copy the selection to the clipboard and remove it
    pub fn edit_cut(&mut self, id: ElementId) {
        if let Some(selected) = self.edit_selected_text(id).filter(|s| !s.is_empty()) {
            self.clipboard.set_text(&selected);
            erase_selection(self, id);
        }
    }

    /// Insert the clipboard text on the next process pass
    pub fn edit_paste(&mut self, id: ElementId) {
        if matches!(self.kind(id), Some(ElementKind::EditBox)) {
            self.request_paste(id);
        }
    }
}
