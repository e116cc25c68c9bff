//! Element record and capability table
//!
//! Every widget is an [`Element`] in the context's arena. Behavior that differs
//! between widget types is looked up in a static [`Capabilities`] table shared
//! by all elements of one kind. Any entry may be `None`; callers check before
//! invoking.

use crate::color::Color;
use crate::events::EventHandler;
use crate::flags::{ElementFlags, StateFlags};
use crate::font::{Font, FontDesc};
use crate::input::{Key, MouseButton};
use crate::primitives::{Point, Rect, Size};
use crate::render::Frame;
use crate::renderer::{FontHandle, RenderTargetHandle};
use crate::text::Text;
use crate::widgets::canvas::CanvasState;
use crate::widgets::checkbox::CheckboxState;
use crate::widgets::edit_box::EditBoxState;
use crate::widgets::list_box::ListBoxState;
use crate::widgets::memo_box::MemoBoxState;
use crate::widgets::progress_bar::ProgressBarState;
use crate::widgets::scrollbar::ScrollbarState;
use crate::widgets::sprite::SpriteState;
use crate::widgets::window::WindowState;
use crate::GuiContext;
use std::fmt;
use std::rc::Rc;
use trellis_macros::WithBuilders;

slotmap::new_key_type! {
    /// Generational handle to an element.
    ///
    /// A handle to a destroyed element never refers to a newer one.
    pub struct ElementId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Button,
    Canvas,
    Checkbox,
    EditBox,
    Label,
    ListBox,
    MemoBox,
    ProgressBar,
    Scrollbar,
    Sprite,
    Window,
    WindowTitlebar,
    WindowCloseButton,
}

pub type ElementFn = fn(&mut GuiContext, ElementId);
pub type RenderFn = fn(&mut Frame<'_>, ElementId);
pub type MouseButtonFn = fn(&mut GuiContext, ElementId, MouseButton, Point);

/// Per-kind behavior table
#[derive(Clone, Copy)]
pub struct Capabilities {
    /// Release kind-specific resources, after the children are gone
    pub destroy: Option<ElementFn>,
    pub render: Option<RenderFn>,
    /// Drawn after the children
    pub post_render: Option<RenderFn>,
    /// Called once per frame for visible elements
    pub process: Option<ElementFn>,
    /// Content rect children are laid out and clipped against
    pub get_clip_region: Option<fn(&Element) -> Rect>,
    pub on_bounds_change: Option<ElementFn>,
    /// Receives the flags from before the change
    pub on_flags_change: Option<fn(&mut GuiContext, ElementId, ElementFlags)>,
    pub on_colour_change: Option<ElementFn>,
    /// Content or font changed
    pub on_text_change: Option<ElementFn>,
    pub on_mouse_enter: Option<ElementFn>,
    pub on_mouse_leave: Option<ElementFn>,
    pub on_mouse_click: Option<MouseButtonFn>,
    pub on_mouse_release: Option<MouseButtonFn>,
    /// Cursor position and movement since the last drag call
    pub on_mouse_drag: Option<fn(&mut GuiContext, ElementId, Point, Point)>,
    pub on_mouse_move: Option<fn(&mut GuiContext, ElementId, Point)>,
    /// Positive values scroll up
    pub on_mouse_wheel: Option<fn(&mut GuiContext, ElementId, f32)>,
    pub on_character: Option<fn(&mut GuiContext, ElementId, char)>,
    pub on_key_press: Option<fn(&mut GuiContext, ElementId, &Key, bool)>,
}

impl Capabilities {
    pub const NONE: Capabilities = Capabilities {
        destroy: None,
        render: None,
        post_render: None,
        process: None,
        get_clip_region: None,
        on_bounds_change: None,
        on_flags_change: None,
        on_colour_change: None,
        on_text_change: None,
        on_mouse_enter: None,
        on_mouse_leave: None,
        on_mouse_click: None,
        on_mouse_release: None,
        on_mouse_drag: None,
        on_mouse_move: None,
        on_mouse_wheel: None,
        on_character: None,
        on_key_press: None,
    };
}

/// Kind-specific state
pub enum WidgetData {
    None,
    Canvas(CanvasState),
    Checkbox(CheckboxState),
    EditBox(EditBoxState),
    ListBox(ListBoxState),
    MemoBox(MemoBoxState),
    ProgressBar(ProgressBarState),
    Scrollbar(ScrollbarState),
    Sprite(SpriteState),
    Window(WindowState),
}

pub struct Element {
    pub(crate) kind: ElementKind,
    pub(crate) parent: Option<ElementId>,
    pub(crate) children: Vec<ElementId>,
    /// Position and size relative to the parent's content rect
    pub(crate) local: Rect,
    /// Absolute screen rect
    pub(crate) bounds: Rect,
    pub(crate) rel_position: Option<[f32; 2]>,
    pub(crate) rel_size: Option<[f32; 2]>,
    pub(crate) flags: ElementFlags,
    pub(crate) state: StateFlags,
    pub(crate) colour: Color,
    pub(crate) alpha: u8,
    pub(crate) text: Option<Text>,
    pub(crate) font: Option<Rc<Font>>,
    pub(crate) caps: &'static Capabilities,
    pub(crate) handler: Option<EventHandler>,
    pub(crate) data: WidgetData,
    pub(crate) render_target: Option<RenderTargetHandle>,
}

impl Element {
    pub(crate) fn new(kind: ElementKind, caps: &'static Capabilities, data: WidgetData) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            local: Rect::default(),
            bounds: Rect::default(),
            rel_position: None,
            rel_size: None,
            flags: ElementFlags::VISIBLE,
            state: StateFlags::empty(),
            colour: Color::default(),
            alpha: 255,
            text: None,
            font: None,
            caps,
            handler: None,
            data,
            render_target: None,
        }
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    /// Children in render order; the last one is on top
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn local_rect(&self) -> Rect {
        self.local
    }

    pub fn size(&self) -> Size {
        self.bounds.size()
    }

    pub fn flags(&self) -> ElementFlags {
        self.flags
    }

    pub fn state(&self) -> StateFlags {
        self.state
    }

    pub fn has_flag(&self, flag: ElementFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn has_state(&self, state: StateFlags) -> bool {
        self.state.contains(state)
    }

    pub fn is_visible(&self) -> bool {
        self.flags.contains(ElementFlags::VISIBLE)
    }

    pub fn colour(&self) -> Color {
        self.colour
    }

    pub fn alpha(&self) -> u8 {
        self.alpha
    }

    /// Colour with the element's alpha applied
    pub fn draw_colour(&self) -> Color {
        self.colour.with_alpha(self.colour.a * self.alpha as f32 / 255.0)
    }

    /// Text colour with the element's alpha applied
    pub fn text_draw_colour(&self) -> Option<Color> {
        let colour = self.text.as_ref()?.colour;
        Some(colour.with_alpha(colour.a * self.alpha as f32 / 255.0))
    }

    pub fn text(&self) -> Option<&Text> {
        self.text.as_ref()
    }

    pub fn font(&self) -> Option<&FontDesc> {
        self.font.as_deref().map(Font::desc)
    }

    pub fn font_handle(&self) -> Option<FontHandle> {
        self.font.as_deref().map(Font::handle)
    }

    pub fn data(&self) -> &WidgetData {
        &self.data
    }

    pub fn capabilities(&self) -> &'static Capabilities {
        self.caps
    }

    /// Rect children are positioned and clipped against
    pub fn clip_region(&self) -> Rect {
        match self.caps.get_clip_region {
            Some(get_clip_region) => get_clip_region(self),
            None => self.bounds,
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("kind", &self.kind)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("bounds", &self.bounds)
            .field("flags", &self.flags)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Overrides applied by the `create_*_ex` constructors
#[derive(Debug, Clone, Default, WithBuilders)]
pub struct ElementDesc {
    #[with_builders(into)]
    pub position: Option<Point>,
    #[with_builders(into)]
    pub size: Option<Size>,
    /// Replaces the kind's default flags
    #[with_builders(into)]
    pub flags: Option<ElementFlags>,
    #[with_builders(into)]
    pub colour: Option<Color>,
    #[with_builders(into)]
    pub text: Option<String>,
}

impl ElementDesc {
    /// Position and size in one call
    pub fn at(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::default()
            .with_position(Point::new(x, y))
            .with_size(Size::new(width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desc_builders() {
        let desc = ElementDesc::at(1.0, 2.0, 3.0, 4.0)
            .with_text("hi")
            .with_flags(ElementFlags::VISIBLE | ElementFlags::BORDER);
        assert_eq!(desc.position, Some(Point::new(1.0, 2.0)));
        assert_eq!(desc.size, Some(Size::new(3.0, 4.0)));
        assert_eq!(desc.text.as_deref(), Some("hi"));
        assert!(desc.colour.is_none());
    }

    #[test]
    fn test_clip_region_defaults_to_bounds() {
        static CAPS: Capabilities = Capabilities::NONE;
        let mut element = Element::new(ElementKind::Label, &CAPS, WidgetData::None);
        element.bounds = Rect::from_xywh(5.0, 5.0, 10.0, 10.0);
        assert_eq!(element.clip_region(), element.bounds);
    }

    #[test]
    fn test_draw_colour_applies_alpha() {
        static CAPS: Capabilities = Capabilities::NONE;
        let mut element = Element::new(ElementKind::Button, &CAPS, WidgetData::None);
        element.alpha = 0;
        assert_eq!(element.draw_colour().a, 0.0);
    }
}
