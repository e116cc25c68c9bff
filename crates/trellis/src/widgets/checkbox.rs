use crate::color::palette;
use crate::element::{Capabilities, Element, ElementDesc, ElementId, ElementKind, WidgetData};
use crate::error::GuiError;
use crate::events::EventKind;
use crate::flags::ElementFlags;
use crate::input::MouseButton;
use crate::primitives::{Point, Size, Spacing};
use crate::render::Frame;
use crate::text::TextAlign;
use crate::widgets::Defaults;
use crate::GuiContext;

/// Gap between the check square and the caption
const CAPTION_GAP: f32 = 4.0;

#[derive(Debug, Clone, Default)]
pub struct CheckboxState {
    checked: bool,
}

impl CheckboxState {
    pub fn checked(&self) -> bool {
        self.checked
    }
}

static CAPS: Capabilities = Capabilities {
    render: Some(render),
    on_bounds_change: Some(on_bounds_change),
    on_mouse_release: Some(on_mouse_release),
    ..Capabilities::NONE
};

fn render(frame: &mut Frame<'_>, id: ElementId) {
    if let Some(element) = frame.element(id) {
        frame.skin.draw_checkbox(frame.renderer, element);
    }
}

/// Keep the caption clear of the square, which is as wide as the element is tall
fn on_bounds_change(ctx: &mut GuiContext, id: ElementId) {
    let Some(element) = ctx.elements.get_mut(id) else {
        return;
    };
    let side = element.bounds.height().min(element.bounds.width());
    if let Some(text) = element.text.as_mut() {
        let padding = text.padding();
        text.set_padding(Spacing::trbl(
            padding.top,
            padding.right,
            padding.bottom,
            side + CAPTION_GAP,
        ));
    }
}

fn on_mouse_release(ctx: &mut GuiContext, id: ElementId, button: MouseButton, position: Point) {
    if button != MouseButton::Left {
        return;
    }
    let Some(element) = ctx.elements.get_mut(id) else {
        return;
    };
    if !element.bounds.contains(position) {
        return;
    }
    let WidgetData::Checkbox(checkbox) = &mut element.data else {
        return;
    };
    checkbox.checked = !checkbox.checked;
    let checked = checkbox.checked;
    ctx.emit(id, EventKind::CheckboxToggle { checked });
    ctx.invalidate(id);
}

impl Element {
    pub fn as_checkbox(&self) -> Option<&CheckboxState> {
        match &self.data {
            WidgetData::Checkbox(checkbox) => Some(checkbox),
            _ => None,
        }
    }
}

impl GuiContext {
    pub fn create_checkbox(&mut self, parent: Option<ElementId>) -> Result<ElementId, GuiError> {
        let id = self.create_element(
            parent,
            ElementKind::Checkbox,
            &CAPS,
            WidgetData::Checkbox(CheckboxState::default()),
            true,
        )?;
        self.init_element(
            id,
            Defaults {
                flags: ElementFlags::VISIBLE | ElementFlags::MOUSE_CONTROL,
                colour: palette::SURFACE_RAISED,
                size: Size::new(120.0, 16.0),
                align: Some(TextAlign::LEFT),
            },
        );
        Ok(id)
    }

    pub fn create_checkbox_ex(
        &mut self,
        parent: Option<ElementId>,
        desc: &ElementDesc,
    ) -> Result<ElementId, GuiError> {
        let id = self.create_checkbox(parent)?;
        self.apply_desc(id, desc);
        Ok(id)
    }

    pub fn is_checked(&self, id: ElementId) -> Option<bool> {
        Some(self.elements.get(id)?.as_checkbox()?.checked)
    }

    /// Set the state without emitting a toggle event
    pub fn set_checked(&mut self, id: ElementId, checked: bool) {
        if let Some(WidgetData::Checkbox(checkbox)) = self.elements.get_mut(id).map(|e| &mut e.data) {
            checkbox.checked = checked;
            self.invalidate(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::element::ElementDesc;
    use crate::events::EventKind;
    use crate::input::MouseButton;
    use crate::primitives::Point;
    use crate::renderer::HeadlessRenderer;
    use crate::GuiContext;

    #[test]
    fn test_click_toggles_and_emits() {
        let mut ctx = GuiContext::new(HeadlessRenderer::new(), 200, 200);
        let checkbox = ctx
            .create_checkbox_ex(None, &ElementDesc::at(0.0, 0.0, 100.0, 16.0))
            .unwrap();
        let p = Point::new(5.0, 5.0);

        ctx.mouse_down(MouseButton::Left, p);
        ctx.mouse_up(MouseButton::Left, p);
        assert_eq!(ctx.is_checked(checkbox), Some(true));
        assert!(ctx
            .drain_events()
            .iter()
            .any(|e| e.kind == EventKind::CheckboxToggle { checked: true }));

        ctx.mouse_down(MouseButton::Left, p);
        ctx.mouse_up(MouseButton::Left, p);
        assert_eq!(ctx.is_checked(checkbox), Some(false));
    }

    #[test]
    fn test_release_outside_does_not_toggle() {
        let mut ctx = GuiContext::new(HeadlessRenderer::new(), 200, 200);
        let checkbox = ctx
            .create_checkbox_ex(None, &ElementDesc::at(0.0, 0.0, 100.0, 16.0))
            .unwrap();

        ctx.mouse_down(MouseButton::Left, Point::new(5.0, 5.0));
        ctx.mouse_up(MouseButton::Left, Point::new(150.0, 150.0));
        assert_eq!(ctx.is_checked(checkbox), Some(false));
    }

    #[test]
    fn test_caption_starts_after_square() {
        let mut ctx = GuiContext::new(HeadlessRenderer::new(), 200, 200);
        let checkbox = ctx
            .create_checkbox_ex(None, &ElementDesc::at(0.0, 0.0, 100.0, 16.0).with_text("on"))
            .unwrap();
        let text = ctx.element(checkbox).unwrap().text().unwrap();
        assert_eq!(text.position().x, 20.0);
    }
}
