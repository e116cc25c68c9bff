//! Window: a container with an optional titlebar and close button
//!
//! The titlebar and close button are decorations. They name the window as
//! their parent but are kept in [`WindowState`] rather than the child list, so
//! they are positioned against the window's outer bounds while children are
//! laid out and clipped against the client area below the titlebar.

use crate::color::{palette, Color};
use crate::element::{Capabilities, Element, ElementDesc, ElementId, ElementKind, WidgetData};
use crate::error::GuiError;
use crate::events::EventKind;
use crate::flags::{ElementFlags, StateFlags};
use crate::input::MouseButton;
use crate::primitives::{Point, Rect, Size};
use crate::render::Frame;
use crate::text::TextAlign;
use crate::widgets::Defaults;
use crate::GuiContext;

const CLOSE_COLOUR: Color = Color::rgb8(243, 139, 168);
/// Space between the close button and the titlebar edges
const CLOSE_INSET: f32 = 2.0;

#[derive(Debug, Clone, Default)]
pub struct WindowState {
    pub(crate) titlebar: Option<ElementId>,
    pub(crate) close_button: Option<ElementId>,
    pub(crate) titlebar_height: f32,
}

impl WindowState {
    pub fn titlebar(&self) -> Option<ElementId> {
        self.titlebar
    }

    pub fn close_button(&self) -> Option<ElementId> {
        self.close_button
    }

    pub fn titlebar_height(&self) -> f32 {
        self.titlebar_height
    }

    /// Titlebar then close button, whichever exist
    pub fn decorations(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.titlebar.into_iter().chain(self.close_button)
    }
}

static WINDOW_CAPS: Capabilities = Capabilities {
    destroy: Some(destroy),
    render: Some(render),
    post_render: Some(post_render),
    get_clip_region: Some(client_area),
    on_bounds_change: Some(layout_decorations),
    on_flags_change: Some(on_flags_change),
    on_mouse_click: Some(on_click),
    ..Capabilities::NONE
};

static TITLEBAR_CAPS: Capabilities = Capabilities {
    destroy: Some(forget_decoration),
    render: Some(render_titlebar),
    on_mouse_click: Some(on_titlebar_click),
    on_mouse_drag: Some(on_titlebar_drag),
    ..Capabilities::NONE
};

static CLOSE_BUTTON_CAPS: Capabilities = Capabilities {
    destroy: Some(forget_decoration),
    render: Some(render_close_button),
    on_mouse_release: Some(on_close_release),
    ..Capabilities::NONE
};

fn window_state(ctx: &GuiContext, id: ElementId) -> Option<&WindowState> {
    ctx.elements.get(id)?.as_window()
}

fn destroy(ctx: &mut GuiContext, id: ElementId) {
    let decorations: Vec<ElementId> = window_state(ctx, id)
        .map(|window| window.decorations().collect())
        .unwrap_or_default();
    for decoration in decorations {
        ctx.destroy(decoration);
    }
}

/// A decoration destroyed on its own must not stay recorded in its window
fn forget_decoration(ctx: &mut GuiContext, id: ElementId) {
    let Some(window) = ctx.parent(id) else {
        return;
    };
    if let Some(WidgetData::Window(state)) = ctx.elements.get_mut(window).map(|e| &mut e.data) {
        if state.titlebar == Some(id) {
            state.titlebar = None;
        }
        if state.close_button == Some(id) {
            state.close_button = None;
        }
    }
    ctx.invalidate(window);
}

fn render(frame: &mut Frame<'_>, id: ElementId) {
    if let Some(element) = frame.element(id) {
        frame.skin.draw_window(frame.renderer, element);
    }
}

/// Decorations are drawn over the children
fn post_render(frame: &mut Frame<'_>, id: ElementId) {
    let Some(window) = frame.element(id).and_then(Element::as_window) else {
        return;
    };
    for decoration in window.decorations() {
        frame.render_element(decoration);
    }
}

fn client_area(element: &Element) -> Rect {
    let bounds = element.bounds;
    match element.as_window() {
        Some(window) if element.has_flag(ElementFlags::TITLEBAR) => {
            let top = (bounds.min[1] + window.titlebar_height).min(bounds.max[1]);
            Rect::new([bounds.min[0], top], bounds.max)
        }
        _ => bounds,
    }
}

fn layout_decorations(ctx: &mut GuiContext, id: ElementId) {
    let Some(element) = ctx.elements.get(id) else {
        return;
    };
    let Some(window) = element.as_window() else {
        return;
    };
    let width = element.bounds.width();
    let height = window.titlebar_height;
    let (titlebar, close_button) = (window.titlebar, window.close_button);

    if let Some(titlebar) = titlebar {
        ctx.place(titlebar, Rect::from_xywh(0.0, 0.0, width, height));
    }
    if let Some(close_button) = close_button {
        let side = (height - 2.0 * CLOSE_INSET).max(0.0);
        ctx.place(
            close_button,
            Rect::from_xywh(width - side - CLOSE_INSET, CLOSE_INSET, side, side),
        );
    }
}

fn on_flags_change(ctx: &mut GuiContext, id: ElementId, old: ElementFlags) {
    let flags = ctx.flags_of(id);
    let layout = ElementFlags::TITLEBAR | ElementFlags::CLOSE_BUTTON;
    if (old & layout) != (flags & layout) {
        sync_decorations(ctx, id);
        // The client area moved
        for child in ctx.children(id).to_vec() {
            ctx.update_bounds(child);
        }
    }
}

/// Show each decoration exactly when the window's flags ask for it
fn sync_decorations(ctx: &mut GuiContext, id: ElementId) {
    let flags = ctx.flags_of(id);
    let Some(window) = window_state(ctx, id) else {
        return;
    };
    let (titlebar, close_button) = (window.titlebar, window.close_button);
    let has_titlebar = flags.contains(ElementFlags::TITLEBAR);

    if let Some(titlebar) = titlebar {
        ctx.set_visible(titlebar, has_titlebar);
    }
    if let Some(close_button) = close_button {
        ctx.set_visible(
            close_button,
            has_titlebar && flags.contains(ElementFlags::CLOSE_BUTTON),
        );
    }
}

fn on_click(ctx: &mut GuiContext, id: ElementId, _button: MouseButton, _position: Point) {
    ctx.send_to_top(id);
}

fn render_titlebar(frame: &mut Frame<'_>, id: ElementId) {
    if let Some(element) = frame.element(id) {
        frame.skin.draw_window_titlebar(frame.renderer, element);
    }
}

fn on_titlebar_click(ctx: &mut GuiContext, id: ElementId, _button: MouseButton, _position: Point) {
    if let Some(window) = ctx.parent(id) {
        ctx.send_to_top(window);
    }
}

/// Move the window with the cursor, keeping it inside its container
fn on_titlebar_drag(ctx: &mut GuiContext, id: ElementId, _position: Point, delta: Point) {
    let Some(window) = ctx.parent(id) else {
        return;
    };
    let Some(local) = ctx.elements.get(window).map(|element| element.local) else {
        return;
    };
    let container = ctx.container_rect(window);

    let max_x = (container.width() - local.width()).max(0.0);
    let max_y = (container.height() - local.height()).max(0.0);
    let x = (local.x() + delta.x).clamp(0.0, max_x);
    let y = (local.y() + delta.y).clamp(0.0, max_y);
    if x != local.x() || y != local.y() {
        ctx.set_position(window, x, y);
    }
}

fn render_close_button(frame: &mut Frame<'_>, id: ElementId) {
    if let Some(element) = frame.element(id) {
        frame.skin.draw_window_closebutton(frame.renderer, element);
    }
}

fn on_close_release(ctx: &mut GuiContext, id: ElementId, button: MouseButton, position: Point) {
    if button != MouseButton::Left {
        return;
    }
    let inside = ctx
        .bounds(id)
        .is_some_and(|bounds| bounds.contains(position));
    let Some(window) = ctx.parent(id) else {
        return;
    };
    if inside {
        ctx.emit(window, EventKind::WindowClose);
        if ctx.is_alive(window) {
            ctx.set_visible(window, false);
        }
    }
}

impl Element {
    pub fn as_window(&self) -> Option<&WindowState> {
        match &self.data {
            WidgetData::Window(window) => Some(window),
            _ => None,
        }
    }
}

impl GuiContext {
    /// Window with titlebar and close button; its text shows in the titlebar
    pub fn create_window(&mut self, parent: Option<ElementId>) -> Result<ElementId, GuiError> {
        let state = WindowState {
            titlebar_height: self.config.titlebar_height,
            ..WindowState::default()
        };
        let id = self.create_element(
            parent,
            ElementKind::Window,
            &WINDOW_CAPS,
            WidgetData::Window(state),
            false,
        )?;

        // Recorded as soon as they exist so destroying the window cleans them up
        let (titlebar, close_button) = match self.create_decorations(id) {
            Ok(pair) => pair,
            Err(err) => {
                self.destroy(id);
                return Err(err);
            }
        };

        self.init_element(
            titlebar,
            Defaults {
                flags: ElementFlags::VISIBLE | ElementFlags::MOUSE_CONTROL | ElementFlags::DRAGGABLE,
                colour: palette::SURFACE_RAISED,
                size: Size::zero(),
                align: Some(TextAlign::LEFT),
            },
        );
        self.init_element(
            close_button,
            Defaults {
                flags: ElementFlags::VISIBLE | ElementFlags::MOUSE_CONTROL,
                colour: CLOSE_COLOUR,
                size: Size::zero(),
                align: None,
            },
        );

        self.init_element(
            id,
            Defaults {
                flags: ElementFlags::VISIBLE
                    | ElementFlags::BORDER
                    | ElementFlags::BACKGROUND
                    | ElementFlags::MOUSE_CONTROL
                    | ElementFlags::CLIP_CHILDREN
                    | ElementFlags::TITLEBAR
                    | ElementFlags::CLOSE_BUTTON,
                colour: palette::WINDOW,
                size: Size::new(200.0, 150.0),
                align: None,
            },
        );
        sync_decorations(self, id);
        Ok(id)
    }

    fn create_decorations(&mut self, id: ElementId) -> Result<(ElementId, ElementId), GuiError> {
        let titlebar = self.create_decoration(id, ElementKind::WindowTitlebar, &TITLEBAR_CAPS)?;
        if let Some(WidgetData::Window(window)) = self.elements.get_mut(id).map(|e| &mut e.data) {
            window.titlebar = Some(titlebar);
        }
        let close_button =
            self.create_decoration(id, ElementKind::WindowCloseButton, &CLOSE_BUTTON_CAPS)?;
        if let Some(WidgetData::Window(window)) = self.elements.get_mut(id).map(|e| &mut e.data) {
            window.close_button = Some(close_button);
        }
        Ok((titlebar, close_button))
    }

    pub fn create_window_ex(
        &mut self,
        parent: Option<ElementId>,
        desc: &ElementDesc,
    ) -> Result<ElementId, GuiError> {
        let id = self.create_window(parent)?;
        self.apply_desc(id, desc);
        Ok(id)
    }

    pub fn window_titlebar(&self, id: ElementId) -> Option<ElementId> {
        window_state(self, id)?.titlebar
    }

    pub fn window_close_button(&self, id: ElementId) -> Option<ElementId> {
        window_state(self, id)?.close_button
    }

    /// Change the titlebar height; children follow the client area
    pub fn set_titlebar_height(&mut self, id: ElementId, height: f32) {
        let Some(WidgetData::Window(window)) = self.elements.get_mut(id).map(|e| &mut e.data) else {
            return;
        };
        window.titlebar_height = height.max(0.0);
        self.update_bounds(id);
        self.invalidate(id);
    }

    /// Whether `id` is a decoration of some window
    pub fn is_decoration(&self, id: ElementId) -> bool {
        self.elements
            .get(id)
            .is_some_and(|element| element.has_state(StateFlags::DECORATION))
    }
}

#[cfg(test)]
mod tests {
    use crate::element::ElementDesc;
    use crate::events::EventKind;
    use crate::flags::ElementFlags;
    use crate::input::MouseButton;
    use crate::primitives::{Point, Rect};
    use crate::renderer::HeadlessRenderer;
    use crate::GuiContext;

    fn context() -> GuiContext {
        GuiContext::new(HeadlessRenderer::new(), 640, 480)
    }

    #[test]
    fn test_decorations_follow_window() {
        let mut ctx = context();
        let window = ctx
            .create_window_ex(None, &ElementDesc::at(10.0, 10.0, 200.0, 100.0))
            .unwrap();
        let titlebar = ctx.window_titlebar(window).unwrap();
        let close = ctx.window_close_button(window).unwrap();

        assert_eq!(ctx.bounds(titlebar), Some(Rect::from_xywh(10.0, 10.0, 200.0, 20.0)));
        assert_eq!(ctx.bounds(close), Some(Rect::from_xywh(192.0, 12.0, 16.0, 16.0)));
        assert!(ctx.is_decoration(titlebar));
        assert!(ctx.children(window).is_empty());

        ctx.set_position(window, 0.0, 0.0);
        assert_eq!(ctx.bounds(close), Some(Rect::from_xywh(182.0, 2.0, 16.0, 16.0)));
    }

    #[test]
    fn test_text_goes_to_titlebar() {
        let mut ctx = context();
        let window = ctx
            .create_window_ex(None, &ElementDesc::default().with_text("Settings"))
            .unwrap();
        let titlebar = ctx.window_titlebar(window).unwrap();
        assert_eq!(ctx.text(window), Some("Settings"));
        assert_eq!(
            ctx.element(titlebar).unwrap().text().unwrap().as_str(),
            "Settings"
        );
    }

    #[test]
    fn test_titlebar_drag_moves_and_clamps() {
        let mut ctx = context();
        let window = ctx
            .create_window_ex(None, &ElementDesc::at(0.0, 0.0, 200.0, 100.0))
            .unwrap();

        ctx.mouse_down(MouseButton::Left, Point::new(50.0, 10.0));
        ctx.mouse_move(Point::new(60.0, 20.0));
        assert_eq!(ctx.position(window), Some(Point::new(10.0, 10.0)));

        ctx.mouse_move(Point::new(-500.0, 20.0));
        assert_eq!(ctx.position(window), Some(Point::new(0.0, 10.0)));
        ctx.mouse_move(Point::new(5000.0, 5000.0));
        assert_eq!(ctx.position(window), Some(Point::new(440.0, 380.0)));
        ctx.mouse_up(MouseButton::Left, Point::new(5000.0, 5000.0));
    }

    #[test]
    fn test_children_use_client_area() {
        let mut ctx = context();
        let window = ctx
            .create_window_ex(None, &ElementDesc::at(0.0, 0.0, 200.0, 100.0))
            .unwrap();
        let label = ctx.create_label(Some(window)).unwrap();
        assert_eq!(ctx.bounds(label).unwrap().min, [0.0, 20.0]);

        ctx.remove_flags(window, ElementFlags::TITLEBAR);
        assert_eq!(ctx.bounds(label).unwrap().min, [0.0, 0.0]);
        let titlebar = ctx.window_titlebar(window).unwrap();
        assert!(!ctx.is_visible(titlebar));
    }

    #[test]
    fn test_close_button_hides_and_emits() {
        let mut ctx = context();
        let window = ctx
            .create_window_ex(None, &ElementDesc::at(0.0, 0.0, 200.0, 100.0))
            .unwrap();
        let p = Point::new(190.0, 10.0);

        ctx.mouse_down(MouseButton::Left, p);
        ctx.mouse_up(MouseButton::Left, p);
        assert!(!ctx.is_visible(window));
        assert!(ctx
            .drain_events()
            .iter()
            .any(|e| e.element == window && e.kind == EventKind::WindowClose));
    }

    #[test]
    fn test_click_brings_window_to_top() {
        let mut ctx = context();
        let a = ctx
            .create_window_ex(None, &ElementDesc::at(0.0, 0.0, 200.0, 100.0))
            .unwrap();
        let b = ctx
            .create_window_ex(None, &ElementDesc::at(300.0, 0.0, 200.0, 100.0))
            .unwrap();
        assert_eq!(ctx.layers(), &[a, b]);

        ctx.mouse_down(MouseButton::Left, Point::new(50.0, 60.0));
        assert_eq!(ctx.layers(), &[b, a]);
        ctx.mouse_up(MouseButton::Left, Point::new(50.0, 60.0));

        ctx.mouse_down(MouseButton::Left, Point::new(350.0, 10.0));
        assert_eq!(ctx.layers(), &[a, b]);
    }

    #[test]
    fn test_destroy_removes_decorations() {
        let mut ctx = context();
        let window = ctx.create_window(None).unwrap();
        let titlebar = ctx.window_titlebar(window).unwrap();
        ctx.destroy(window);
        assert!(!ctx.is_alive(titlebar));
        assert_eq!(ctx.element_count(), 0);
    }

    #[test]
    fn test_destroyed_titlebar_is_forgotten() {
        let mut ctx = context();
        let window = ctx
            .create_window_ex(None, &ElementDesc::at(0.0, 0.0, 200.0, 100.0).with_text("Tools"))
            .unwrap();
        let titlebar = ctx.window_titlebar(window).unwrap();
        let close = ctx.window_close_button(window).unwrap();

        ctx.destroy(titlebar);
        assert_eq!(ctx.window_titlebar(window), None);
        assert_eq!(ctx.window_close_button(window), Some(close));
        assert_eq!(ctx.text(window), None);
        ctx.set_text(window, "ignored");
        ctx.set_size(window, 300.0, 120.0);
        ctx.render();

        ctx.destroy(close);
        assert_eq!(ctx.window_close_button(window), None);
        ctx.destroy(window);
        assert_eq!(ctx.element_count(), 0);
    }
}
