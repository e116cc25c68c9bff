//! Scrollbar: two nudge buttons and a draggable thumb
//!
//! The public contract is four numbers. `content_size` is the scroll range,
//! `position` lies in `0..=content_size`, `bar_size` is the thumb length as a
//! fraction of the track and `step` is how far one nudge moves. Every change of
//! position, whatever caused it, emits [`EventKind::Scroll`] and notifies the
//! owning widget if one registered.
//!
//! Holding a nudge button repeats it from the per-frame `process` pass: first
//! after `scroll_repeat_delay_ms`, then every `scroll_repeat_interval_ms`.

use crate::color::palette;
use crate::element::{Capabilities, Element, ElementDesc, ElementId, ElementKind, WidgetData};
use crate::error::GuiError;
use crate::events::EventKind;
use crate::flags::{ElementFlags, StateFlags};
use crate::input::MouseButton;
use crate::primitives::{Point, Rect, Size};
use crate::render::Frame;
use crate::widgets::Defaults;
use crate::GuiContext;

/// Thumb never gets shorter than this many pixels
const MIN_THUMB: f32 = 8.0;

bitflags::bitflags! {
    /// Hit regions of a scrollbar
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ScrollParts: u8 {
        /// Up or left button
        const BUTTON_BACK = 1 << 0;
        /// Down or right button
        const BUTTON_FORWARD = 1 << 1;
        const THUMB = 1 << 2;
        /// Track outside the thumb
        const TRACK = 1 << 3;
    }
}

/// Called on the owning widget with the new position
pub type ScrollNotifyFn = fn(&mut GuiContext, ElementId, f32);

#[derive(Debug, Clone)]
pub struct ScrollbarState {
    content_size: f32,
    position: f32,
    bar_size: f32,
    step: f32,
    horizontal: bool,
    back: Rect,
    forward: Rect,
    thumb: Rect,
    /// Start and length of the track between the buttons
    track: (f32, f32),
    hovered: ScrollParts,
    pressed: ScrollParts,
    /// Ticks at which a held button fires next
    next_repeat: u64,
    /// Cursor offset from the thumb start along the axis while dragging
    drag_offset: f32,
    pub(crate) owner_notify: Option<ScrollNotifyFn>,
}

impl Default for ScrollbarState {
    fn default() -> Self {
        Self {
            content_size: 0.0,
            position: 0.0,
            bar_size: 1.0,
            step: 1.0,
            horizontal: false,
            back: Rect::default(),
            forward: Rect::default(),
            thumb: Rect::default(),
            track: (0.0, 0.0),
            hovered: ScrollParts::empty(),
            pressed: ScrollParts::empty(),
            next_repeat: 0,
            drag_offset: 0.0,
            owner_notify: None,
        }
    }
}

impl ScrollbarState {
    pub fn content_size(&self) -> f32 {
        self.content_size
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn bar_size(&self) -> f32 {
        self.bar_size
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn is_horizontal(&self) -> bool {
        self.horizontal
    }

    pub fn back_button_rect(&self) -> Rect {
        self.back
    }

    pub fn forward_button_rect(&self) -> Rect {
        self.forward
    }

    pub fn thumb_rect(&self) -> Rect {
        self.thumb
    }

    pub fn hovered_parts(&self) -> ScrollParts {
        self.hovered
    }

    pub fn pressed_parts(&self) -> ScrollParts {
        self.pressed
    }

    fn axis(&self, point: Point) -> f32 {
        if self.horizontal {
            point.x
        } else {
            point.y
        }
    }

    fn thumb_length(&self, track_length: f32) -> f32 {
        (track_length * self.bar_size)
            .max(MIN_THUMB)
            .min(track_length)
    }

    /// Recompute button and thumb rects from `bounds`
    fn layout(&mut self, bounds: Rect) {
        let (length, thickness) = if self.horizontal {
            (bounds.width(), bounds.height())
        } else {
            (bounds.height(), bounds.width())
        };
        let button = thickness.min(length / 2.0);

        let (track_start, track_length) = if self.horizontal {
            self.back = Rect::from_xywh(bounds.x(), bounds.y(), button, thickness);
            self.forward = Rect::from_xywh(bounds.max[0] - button, bounds.y(), button, thickness);
            (bounds.x() + button, length - 2.0 * button)
        } else {
            self.back = Rect::from_xywh(bounds.x(), bounds.y(), thickness, button);
            self.forward = Rect::from_xywh(bounds.x(), bounds.max[1] - button, thickness, button);
            (bounds.y() + button, length - 2.0 * button)
        };

        let track_length = track_length.max(0.0);
        self.track = (track_start, track_length);
        let thumb_length = self.thumb_length(track_length);
        let offset = if self.content_size > 0.0 {
            (track_length - thumb_length) * self.position / self.content_size
        } else {
            0.0
        };
        self.thumb = if self.horizontal {
            Rect::from_xywh(track_start + offset, bounds.y(), thumb_length, thickness)
        } else {
            Rect::from_xywh(bounds.x(), track_start + offset, thickness, thumb_length)
        };
    }

    /// Position that puts the thumb start at pixel `start` along the axis
    fn position_at(&self, start: f32) -> f32 {
        let (track_start, track_length) = self.track;
        let free = track_length - self.thumb_length(track_length);
        if free <= 0.0 {
            return 0.0;
        }
        (start - track_start) / free * self.content_size
    }

    fn part_at(&self, point: Point, bounds: Rect) -> ScrollParts {
        if self.back.contains(point) {
            ScrollParts::BUTTON_BACK
        } else if self.forward.contains(point) {
            ScrollParts::BUTTON_FORWARD
        } else if self.thumb.contains(point) {
            ScrollParts::THUMB
        } else if bounds.contains(point) {
            ScrollParts::TRACK
        } else {
            ScrollParts::empty()
        }
    }
}

static CAPS: Capabilities = Capabilities {
    render: Some(render),
    process: Some(process),
    on_bounds_change: Some(on_bounds_change),
    on_mouse_leave: Some(on_mouse_leave),
    on_mouse_move: Some(on_mouse_move),
    on_mouse_click: Some(on_mouse_click),
    on_mouse_release: Some(on_mouse_release),
    on_mouse_drag: Some(on_mouse_drag),
    on_mouse_wheel: Some(on_mouse_wheel),
    ..Capabilities::NONE
};

fn state_mut(ctx: &mut GuiContext, id: ElementId) -> Option<(&mut ScrollbarState, Rect)> {
    let element = ctx.elements.get_mut(id)?;
    let bounds = element.bounds;
    match &mut element.data {
        WidgetData::Scrollbar(bar) => Some((bar, bounds)),
        _ => None,
    }
}

fn render(frame: &mut Frame<'_>, id: ElementId) {
    if let Some(element) = frame.element(id) {
        frame.skin.draw_scrollbar(frame.renderer, element);
    }
}

/// Repeat a held nudge button
fn process(ctx: &mut GuiContext, id: ElementId) {
    let ticks = ctx.ticks;
    let interval = ctx.config.scroll_repeat_interval_ms;
    let held = ctx
        .elements
        .get(id)
        .is_some_and(|element| element.has_state(StateFlags::PRESSED));
    let Some((bar, _)) = state_mut(ctx, id) else {
        return;
    };
    if !held {
        bar.pressed.remove(ScrollParts::BUTTON_BACK | ScrollParts::BUTTON_FORWARD);
        return;
    }
    let direction = if bar.pressed.contains(ScrollParts::BUTTON_BACK) {
        -1.0
    } else if bar.pressed.contains(ScrollParts::BUTTON_FORWARD) {
        1.0
    } else {
        return;
    };
    if ticks < bar.next_repeat {
        return;
    }
    bar.next_repeat = ticks + interval;
    let step = bar.step;
    ctx.scroll_by(id, direction * step);
}

fn on_bounds_change(ctx: &mut GuiContext, id: ElementId) {
    if let Some((bar, bounds)) = state_mut(ctx, id) {
        bar.layout(bounds);
    }
}

fn on_mouse_leave(ctx: &mut GuiContext, id: ElementId) {
    if let Some((bar, _)) = state_mut(ctx, id) {
        bar.hovered = ScrollParts::empty();
    }
}

fn on_mouse_move(ctx: &mut GuiContext, id: ElementId, position: Point) {
    let Some((bar, bounds)) = state_mut(ctx, id) else {
        return;
    };
    let hovered = bar.part_at(position, bounds);
    if hovered != bar.hovered {
        bar.hovered = hovered;
        ctx.invalidate(id);
    }
}

fn on_mouse_click(ctx: &mut GuiContext, id: ElementId, button: MouseButton, position: Point) {
    if button != MouseButton::Left {
        return;
    }
    let delay = ctx.config.scroll_repeat_delay_ms;
    let ticks = ctx.ticks;
    let Some((bar, bounds)) = state_mut(ctx, id) else {
        return;
    };

    let part = bar.part_at(position, bounds);
    bar.pressed = part;
    let axis = bar.axis(position);
    let step = bar.step;
    if part == ScrollParts::BUTTON_BACK || part == ScrollParts::BUTTON_FORWARD {
        bar.next_repeat = ticks + delay;
        let direction = if part == ScrollParts::BUTTON_BACK { -1.0 } else { 1.0 };
        ctx.scroll_by(id, direction * step);
    } else if part == ScrollParts::THUMB {
        let start = if bar.horizontal { bar.thumb.x() } else { bar.thumb.y() };
        bar.drag_offset = axis - start;
    } else if part == ScrollParts::TRACK {
        // Jump so the thumb centres on the cursor, then keep dragging it
        let length = if bar.horizontal {
            bar.thumb.width()
        } else {
            bar.thumb.height()
        };
        bar.drag_offset = length / 2.0;
        bar.pressed = ScrollParts::THUMB;
        let target = bar.position_at(axis - bar.drag_offset);
        ctx.scroll_to(id, target);
    }
    ctx.invalidate(id);
}

fn on_mouse_release(ctx: &mut GuiContext, id: ElementId, _button: MouseButton, _position: Point) {
    if let Some((bar, _)) = state_mut(ctx, id) {
        bar.pressed = ScrollParts::empty();
    }
    ctx.invalidate(id);
}

fn on_mouse_drag(ctx: &mut GuiContext, id: ElementId, position: Point, _delta: Point) {
    let Some((bar, _)) = state_mut(ctx, id) else {
        return;
    };
    if !bar.pressed.contains(ScrollParts::THUMB) {
        return;
    }
    let target = bar.position_at(bar.axis(position) - bar.drag_offset);
    ctx.scroll_to(id, target);
}

fn on_mouse_wheel(ctx: &mut GuiContext, id: ElementId, delta: f32) {
    let Some((bar, _)) = state_mut(ctx, id) else {
        return;
    };
    let step = bar.step;
    ctx.scroll_by(id, -delta * step);
}

impl Element {
    pub fn as_scrollbar(&self) -> Option<&ScrollbarState> {
        match &self.data {
            WidgetData::Scrollbar(bar) => Some(bar),
            _ => None,
        }
    }
}

impl GuiContext {
    /// Vertical scrollbar, `scrollbar_width` wide
    pub fn create_scrollbar(&mut self, parent: Option<ElementId>) -> Result<ElementId, GuiError> {
        let id = self.create_element(
            parent,
            ElementKind::Scrollbar,
            &CAPS,
            WidgetData::Scrollbar(ScrollbarState::default()),
            false,
        )?;
        self.init_element(
            id,
            Defaults {
                flags: ElementFlags::VISIBLE | ElementFlags::MOUSE_CONTROL | ElementFlags::DRAGGABLE,
                colour: palette::SURFACE,
                size: Size::new(self.config.scrollbar_width, 100.0),
                align: None,
            },
        );
        Ok(id)
    }

    pub fn create_scrollbar_ex(
        &mut self,
        parent: Option<ElementId>,
        desc: &ElementDesc,
    ) -> Result<ElementId, GuiError> {
        let id = self.create_scrollbar(parent)?;
        self.apply_desc(id, desc);
        Ok(id)
    }

    /// Move to `position`, clamped to the range.
    ///
    /// Emits a scroll event and notifies the owner only when the position
    /// actually changed.
    pub fn scroll_to(&mut self, id: ElementId, position: f32) {
        let Some((bar, bounds)) = state_mut(self, id) else {
            log::trace!("scroll_to on non-scrollbar {id:?}");
            return;
        };
        let position = position.clamp(0.0, bar.content_size.max(0.0));
        let delta = position - bar.position;
        if delta == 0.0 {
            return;
        }
        bar.position = position;
        bar.layout(bounds);
        let notify = bar.owner_notify;

        self.emit(id, EventKind::Scroll { position, delta });
        if let (Some(notify), Some(owner)) = (notify, self.parent(id)) {
            notify(self, owner, position);
        }
        self.invalidate(id);
    }

    pub fn scroll_by(&mut self, id: ElementId, delta: f32) {
        if let Some(position) = self.scroll_position(id) {
            self.scroll_to(id, position + delta);
        }
    }

    pub fn scroll_position(&self, id: ElementId) -> Option<f32> {
        Some(self.elements.get(id)?.as_scrollbar()?.position)
    }

    /// Scroll range; the position is pulled back inside it
    pub fn set_scroll_content_size(&mut self, id: ElementId, content_size: f32) {
        let Some((bar, bounds)) = state_mut(self, id) else {
            return;
        };
        bar.content_size = content_size.max(0.0);
        bar.layout(bounds);
        let position = bar.position;
        self.scroll_to(id, position);
        self.invalidate(id);
    }

    /// Thumb length as a fraction of the track
    pub fn set_scroll_bar_size(&mut self, id: ElementId, bar_size: f32) {
        if let Some((bar, bounds)) = state_mut(self, id) {
            bar.bar_size = bar_size.clamp(0.0, 1.0);
            bar.layout(bounds);
            self.invalidate(id);
        }
    }

    pub fn set_scroll_step(&mut self, id: ElementId, step: f32) {
        if let Some((bar, _)) = state_mut(self, id) {
            bar.step = step.max(0.0);
        }
    }

    pub fn set_scrollbar_horizontal(&mut self, id: ElementId, horizontal: bool) {
        if let Some((bar, bounds)) = state_mut(self, id) {
            bar.horizontal = horizontal;
            bar.layout(bounds);
            self.invalidate(id);
        }
    }

    /// Route position changes of a child scrollbar to its parent widget
    pub(crate) fn set_scroll_owner(&mut self, id: ElementId, notify: ScrollNotifyFn) {
        if let Some((bar, _)) = state_mut(self, id) {
            bar.owner_notify = Some(notify);
        }
    }
}
