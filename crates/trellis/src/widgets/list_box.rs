//! List box: fixed-height rows with single or multiple selection
//!
//! Rows are laid out top to bottom starting at the first visible item. A child
//! scrollbar appears once the rows no longer fit; its position is the index of
//! the first visible row.

use crate::color::palette;
use crate::element::{Capabilities, Element, ElementDesc, ElementId, ElementKind, WidgetData};
use crate::error::GuiError;
use crate::events::EventKind;
use crate::flags::ElementFlags;
use crate::format::{self, FormatTag};
use crate::input::MouseButton;
use crate::primitives::{Point, Rect, Size};
use crate::render::Frame;
use crate::text::TextAlign;
use crate::widgets::Defaults;
use crate::GuiContext;
use std::any::Any;

const DEFAULT_ITEM_HEIGHT: f32 = 20.0;

pub struct ListItem {
    text: String,
    tags: Vec<FormatTag>,
    bounds: Option<Rect>,
    selected: bool,
    data: Option<Box<dyn Any>>,
}

impl ListItem {
    fn new(text: &str, formatting: bool, data: Option<Box<dyn Any>>) -> Self {
        let (text, tags) = if formatting {
            let parsed = format::parse(text);
            (parsed.text, parsed.tags)
        } else {
            (text.to_string(), Vec::new())
        };
        Self {
            text,
            tags,
            bounds: None,
            selected: false,
            data,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tags(&self) -> &[FormatTag] {
        &self.tags
    }

    /// Screen rect of the row, `None` while scrolled out of view
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn data(&self) -> Option<&dyn Any> {
        self.data.as_deref()
    }
}

pub struct ListBoxState {
    items: Vec<ListItem>,
    item_height: f32,
    first_visible: usize,
    max_visible: usize,
    scrollbar: Option<ElementId>,
}

impl Default for ListBoxState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            item_height: DEFAULT_ITEM_HEIGHT,
            first_visible: 0,
            max_visible: 0,
            scrollbar: None,
        }
    }
}

impl ListBoxState {
    pub fn items(&self) -> impl Iterator<Item = &ListItem> {
        self.items.iter()
    }

    pub fn item(&self, index: usize) -> Option<&ListItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_height(&self) -> f32 {
        self.item_height
    }

    pub fn first_visible(&self) -> usize {
        self.first_visible
    }

    /// Whole rows that fit in the box
    pub fn max_visible(&self) -> usize {
        self.max_visible
    }

    pub fn scrollbar(&self) -> Option<ElementId> {
        self.scrollbar
    }

    pub fn selected(&self) -> impl Iterator<Item = usize> + '_ {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.selected)
            .map(|(index, _)| index)
    }
}

static CAPS: Capabilities = Capabilities {
    render: Some(render),
    on_bounds_change: Some(layout),
    on_mouse_click: Some(on_mouse_click),
    on_mouse_wheel: Some(on_mouse_wheel),
    ..Capabilities::NONE
};

fn list_mut(ctx: &mut GuiContext, id: ElementId) -> Option<&mut ListBoxState> {
    match &mut ctx.elements.get_mut(id)?.data {
        WidgetData::ListBox(list) => Some(list),
        _ => None,
    }
}

fn render(frame: &mut Frame<'_>, id: ElementId) {
    let Some(element) = frame.element(id) else {
        return;
    };
    frame.push_clip(element.bounds());
    frame.skin.draw_listbox(frame.renderer, element);
    frame.pop_clip();
}

/// Size the scrollbar to the item count, then place the rows
fn layout(ctx: &mut GuiContext, id: ElementId) {
    let bar_width = ctx.config.scrollbar_width;
    let Some(element) = ctx.elements.get_mut(id) else {
        return;
    };
    let bounds = element.bounds;
    let WidgetData::ListBox(list) = &mut element.data else {
        return;
    };

    list.max_visible = if list.item_height > 0.0 {
        (bounds.height() / list.item_height).floor() as usize
    } else {
        0
    };
    let count = list.items.len();
    let overflow = count as f32 * list.item_height > bounds.height();
    let hidden = count.saturating_sub(list.max_visible);
    let bar_size = if count > 0 {
        list.max_visible as f32 / count as f32
    } else {
        1.0
    };
    let Some(bar) = list.scrollbar else {
        place_items(ctx, id);
        return;
    };

    ctx.place(
        bar,
        Rect::from_xywh(bounds.width() - bar_width, 0.0, bar_width, bounds.height()),
    );
    ctx.set_scroll_bar_size(bar, bar_size);
    ctx.set_scroll_content_size(bar, hidden as f32);
    ctx.set_visible(bar, overflow);
    place_items(ctx, id);
}

/// Recompute row rects from the first visible index
fn place_items(ctx: &mut GuiContext, id: ElementId) {
    let bar_width = ctx.config.scrollbar_width;
    let bar_shown = ctx
        .list_scrollbar(id)
        .is_some_and(|bar| ctx.is_visible(bar));
    let Some(element) = ctx.elements.get_mut(id) else {
        return;
    };
    let bounds = element.bounds;
    let WidgetData::ListBox(list) = &mut element.data else {
        return;
    };

    let width = if bar_shown {
        bounds.width() - bar_width
    } else {
        bounds.width()
    };
    let last_start = list.items.len().saturating_sub(list.max_visible);
    list.first_visible = list.first_visible.min(last_start);
    let visible = list.first_visible..list.first_visible + list.max_visible;
    let (first, item_height) = (list.first_visible, list.item_height);

    for (index, item) in list.items.iter_mut().enumerate() {
        item.bounds = visible.contains(&index).then(|| {
            Rect::from_xywh(
                bounds.x(),
                bounds.y() + (index - first) as f32 * item_height,
                width,
                item_height,
            )
        });
    }
    ctx.invalidate(id);
}

fn on_scroll(ctx: &mut GuiContext, id: ElementId, position: f32) {
    if let Some(list) = list_mut(ctx, id) {
        list.first_visible = position.round().max(0.0) as usize;
    }
    place_items(ctx, id);
}

fn on_mouse_click(ctx: &mut GuiContext, id: ElementId, button: MouseButton, position: Point) {
    if button != MouseButton::Left {
        return;
    }
    let toggle = ctx.flags_of(id).contains(ElementFlags::MULTI_SELECT) && ctx.modifiers().ctrl;
    let Some(list) = list_mut(ctx, id) else {
        return;
    };
    let Some(index) = list
        .items
        .iter()
        .position(|item| item.bounds.is_some_and(|bounds| bounds.contains(position)))
    else {
        return;
    };

    let mut changes = Vec::new();
    if toggle {
        let item = &mut list.items[index];
        item.selected = !item.selected;
        changes.push((index, item.selected));
    } else {
        for (other, item) in list.items.iter_mut().enumerate() {
            let selected = other == index;
            if item.selected != selected {
                item.selected = selected;
                changes.push((other, selected));
            }
        }
    }

    for (index, selected) in changes {
        ctx.emit(id, EventKind::ListSelect { index, selected });
    }
    ctx.invalidate(id);
}

/// Wheel over the rows scrolls like wheel over the bar
fn on_mouse_wheel(ctx: &mut GuiContext, id: ElementId, delta: f32) {
    if let Some(bar) = ctx.list_scrollbar(id).filter(|&bar| ctx.is_visible(bar)) {
        ctx.scroll_by(bar, -delta);
    }
}

impl Element {
    pub fn as_list_box(&self) -> Option<&ListBoxState> {
        match &self.data {
            WidgetData::ListBox(list) => Some(list),
            _ => None,
        }
    }
}

impl GuiContext {
    pub fn create_list_box(&mut self, parent: Option<ElementId>) -> Result<ElementId, GuiError> {
        let id = self.create_element(
            parent,
            ElementKind::ListBox,
            &CAPS,
            WidgetData::ListBox(ListBoxState::default()),
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
        if let Some(list) = list_mut(self, id) {
            list.scrollbar = Some(bar);
        }
        self.init_element(
            id,
            Defaults {
                flags: ElementFlags::VISIBLE
                    | ElementFlags::BORDER
                    | ElementFlags::BACKGROUND
                    | ElementFlags::MOUSE_CONTROL,
                colour: palette::SURFACE,
                size: Size::new(150.0, 100.0),
                align: Some(TextAlign::TOP_LEFT),
            },
        );
        Ok(id)
    }

    pub fn create_list_box_ex(
        &mut self,
        parent: Option<ElementId>,
        desc: &ElementDesc,
    ) -> Result<ElementId, GuiError> {
        let id = self.create_list_box(parent)?;
        self.apply_desc(id, desc);
        Ok(id)
    }

    /// Append a row; markup is parsed when the box has `TEXT_FORMATTING`
    pub fn add_list_item(&mut self, id: ElementId, text: &str) -> Option<usize> {
        self.push_list_item(id, text, None)
    }

    /// Append a row carrying caller data, returned by [`list_item_data`](Self::list_item_data)
    pub fn add_list_item_with_data(
        &mut self,
        id: ElementId,
        text: &str,
        data: impl Any,
    ) -> Option<usize> {
        self.push_list_item(id, text, Some(Box::new(data)))
    }

    fn push_list_item(
        &mut self,
        id: ElementId,
        text: &str,
        data: Option<Box<dyn Any>>,
    ) -> Option<usize> {
        let formatting = self.flags_of(id).contains(ElementFlags::TEXT_FORMATTING);
        let list = list_mut(self, id)?;
        list.items.push(ListItem::new(text, formatting, data));
        let index = list.items.len() - 1;
        layout(self, id);
        Some(index)
    }

    pub fn remove_list_item(&mut self, id: ElementId, index: usize) {
        let Some(list) = list_mut(self, id) else {
            return;
        };
        if index < list.items.len() {
            list.items.remove(index);
            layout(self, id);
        }
    }

    pub fn clear_list_items(&mut self, id: ElementId) {
        if let Some(list) = list_mut(self, id) {
            list.items.clear();
            list.first_visible = 0;
            layout(self, id);
        }
    }

    pub fn list_item_count(&self, id: ElementId) -> usize {
        self.elements
            .get(id)
            .and_then(Element::as_list_box)
            .map_or(0, ListBoxState::len)
    }

    pub fn list_item_text(&self, id: ElementId, index: usize) -> Option<&str> {
        Some(self.elements.get(id)?.as_list_box()?.item(index)?.text())
    }

    pub fn list_item_data(&self, id: ElementId, index: usize) -> Option<&dyn Any> {
        self.elements.get(id)?.as_list_box()?.item(index)?.data()
    }

    /// Indices of the selected rows in ascending order
    pub fn list_selection(&self, id: ElementId) -> Vec<usize> {
        self.elements
            .get(id)
            .and_then(Element::as_list_box)
            .map(|list| list.selected().collect())
            .unwrap_or_default()
    }

    /// Select or deselect a row without emitting an event.
    ///
    /// Selecting clears the other rows unless the box has `MULTI_SELECT`.
    pub fn select_list_item(&mut self, id: ElementId, index: usize, selected: bool) {
        let multi = self.flags_of(id).contains(ElementFlags::MULTI_SELECT);
        let Some(list) = list_mut(self, id) else {
            return;
        };
        if index >= list.items.len() {
            return;
        }
        if selected && !multi {
            for item in &mut list.items {
                item.selected = false;
            }
        }
        list.items[index].selected = selected;
        self.invalidate(id);
    }

    pub fn list_max_visible(&self, id: ElementId) -> usize {
        self.elements
            .get(id)
            .and_then(Element::as_list_box)
            .map_or(0, ListBoxState::max_visible)
    }

    pub fn list_scrollbar(&self, id: ElementId) -> Option<ElementId> {
        self.elements.get(id)?.as_list_box()?.scrollbar
    }

    pub fn set_list_item_height(&mut self, id: ElementId, height: f32) {
        if let Some(list) = list_mut(self, id) {
            list.item_height = height.max(1.0);
            layout(self, id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::TagFlags;
    use crate::renderer::HeadlessRenderer;

    fn setup(count: usize) -> (GuiContext, ElementId) {
        let mut ctx = GuiContext::new(HeadlessRenderer::new(), 640, 480);
        let list = ctx
            .create_list_box_ex(None, &ElementDesc::at(10.0, 10.0, 120.0, 60.0))
            .unwrap();
        for i in 0..count {
            ctx.add_list_item(list, &format!("item {i}")).unwrap();
        }
        (ctx, list)
    }

    fn item_bounds(ctx: &GuiContext, list: ElementId, index: usize) -> Option<Rect> {
        ctx.element(list)
            .unwrap()
            .as_list_box()
            .unwrap()
            .item(index)
            .unwrap()
            .bounds()
    }

    #[test]
    fn test_overflow_shows_scrollbar() {
        let (ctx, list) = setup(5);
        assert_eq!(ctx.list_max_visible(list), 3);
        let bar = ctx.list_scrollbar(list).unwrap();
        assert!(ctx.is_visible(bar));
        assert_eq!(ctx.element(bar).unwrap().as_scrollbar().unwrap().content_size(), 2.0);
        assert_eq!(
            item_bounds(&ctx, list, 0),
            Some(Rect::from_xywh(10.0, 10.0, 104.0, 20.0))
        );
        assert_eq!(item_bounds(&ctx, list, 3), None);
    }

    #[test]
    fn test_fitting_items_hide_scrollbar() {
        let (ctx, list) = setup(3);
        let bar = ctx.list_scrollbar(list).unwrap();
        assert!(!ctx.is_visible(bar));
        assert_eq!(item_bounds(&ctx, list, 2).unwrap().width(), 120.0);
    }

    #[test]
    fn test_scrolling_moves_rows() {
        let (mut ctx, list) = setup(5);
        let bar = ctx.list_scrollbar(list).unwrap();
        ctx.scroll_to(bar, 2.0);
        assert_eq!(item_bounds(&ctx, list, 0), None);
        assert_eq!(item_bounds(&ctx, list, 2).unwrap().y(), 10.0);
        assert_eq!(item_bounds(&ctx, list, 4).unwrap().y(), 50.0);

        ctx.mouse_move(Point::new(20.0, 20.0));
        ctx.mouse_wheel(1.0);
        assert_eq!(ctx.scroll_position(bar), Some(1.0));
        assert_eq!(item_bounds(&ctx, list, 1).unwrap().y(), 10.0);
    }

    #[test]
    fn test_single_selection() {
        let (mut ctx, list) = setup(3);
        ctx.mouse_down(MouseButton::Left, Point::new(20.0, 15.0));
        ctx.mouse_down(MouseButton::Left, Point::new(20.0, 35.0));
        assert_eq!(ctx.list_selection(list), vec![1]);

        let selects: Vec<EventKind> = ctx
            .drain_events()
            .into_iter()
            .map(|e| e.kind)
            .filter(|kind| matches!(kind, EventKind::ListSelect { .. }))
            .collect();
        assert_eq!(
            selects,
            vec![
                EventKind::ListSelect {
                    index: 0,
                    selected: true
                },
                EventKind::ListSelect {
                    index: 0,
                    selected: false
                },
                EventKind::ListSelect {
                    index: 1,
                    selected: true
                },
            ]
        );
    }

    #[test]
    fn test_multi_selection_with_ctrl() {
        let (mut ctx, list) = setup(3);
        ctx.add_flags(list, ElementFlags::MULTI_SELECT);
        let mut modifiers = ctx.modifiers();
        modifiers.ctrl = true;
        ctx.set_modifiers(modifiers);

        ctx.mouse_down(MouseButton::Left, Point::new(20.0, 15.0));
        ctx.mouse_down(MouseButton::Left, Point::new(20.0, 55.0));
        assert_eq!(ctx.list_selection(list), vec![0, 2]);
        ctx.mouse_down(MouseButton::Left, Point::new(20.0, 15.0));
        assert_eq!(ctx.list_selection(list), vec![2]);
    }

    #[test]
    fn test_item_data_and_removal() {
        let (mut ctx, list) = setup(0);
        ctx.add_list_item_with_data(list, "a", 7u32);
        ctx.add_list_item(list, "b");
        assert_eq!(
            ctx.list_item_data(list, 0).and_then(|d| d.downcast_ref::<u32>()),
            Some(&7)
        );
        assert!(ctx.list_item_data(list, 1).is_none());

        ctx.remove_list_item(list, 0);
        assert_eq!(ctx.list_item_count(list), 1);
        assert_eq!(ctx.list_item_text(list, 0), Some("b"));
        ctx.clear_list_items(list);
        assert_eq!(ctx.list_item_count(list), 0);
    }

    #[test]
    fn test_formatted_items() {
        let (mut ctx, list) = setup(0);
        ctx.add_flags(list, ElementFlags::TEXT_FORMATTING);
        ctx.add_list_item(list, "a[uline]xy[u]");
        assert_eq!(ctx.list_item_text(list, 0), Some("axy"));

        let state = ctx.element(list).unwrap().as_list_box().unwrap();
        let tags = state.item(0).unwrap().tags();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].index, 1);
        assert_eq!(tags[0].flags, TagFlags::UNDERLINE_START);
        assert_eq!(tags[1].index, 3);
        assert_eq!(tags[1].flags, TagFlags::UNDERLINE_END);

        // Without formatting the markup is kept literally
        ctx.remove_flags(list, ElementFlags::TEXT_FORMATTING);
        ctx.add_list_item(list, "[uline]z");
        assert_eq!(ctx.list_item_text(list, 1), Some("[uline]z"));
    }

    #[test]
    fn test_removing_items_clamps_scroll() {
        let (mut ctx, list) = setup(5);
        let bar = ctx.list_scrollbar(list).unwrap();
        ctx.scroll_to(bar, 2.0);
        ctx.remove_list_item(list, 4);
        assert_eq!(ctx.scroll_position(bar), Some(1.0));
        assert_eq!(item_bounds(&ctx, list, 1).unwrap().y(), 10.0);
    }
}
