//! Canvas: an element the application draws into directly

use crate::color::palette;
use crate::element::{Capabilities, Element, ElementDesc, ElementId, ElementKind, WidgetData};
use crate::error::GuiError;
use crate::flags::ElementFlags;
use crate::primitives::{Rect, Size};
use crate::render::Frame;
use crate::renderer::Renderer;
use crate::widgets::Defaults;
use crate::GuiContext;

/// Application draw hook, called with the canvas bounds after the skin
pub type CanvasDrawFn = Box<dyn Fn(&mut dyn Renderer, Rect)>;

#[derive(Default)]
pub struct CanvasState {
    draw: Option<CanvasDrawFn>,
}

impl CanvasState {
    pub fn has_draw_hook(&self) -> bool {
        self.draw.is_some()
    }
}

static CAPS: Capabilities = Capabilities {
    render: Some(render),
    ..Capabilities::NONE
};

fn render(frame: &mut Frame<'_>, id: ElementId) {
    let Some(element) = frame.element(id) else {
        return;
    };
    frame.skin.draw_canvas(frame.renderer, element);
    if let Some(draw) = element.as_canvas().and_then(|canvas| canvas.draw.as_ref()) {
        frame.push_clip(element.bounds());
        draw(&mut *frame.renderer, element.bounds());
        frame.pop_clip();
    }
}

impl Element {
    pub fn as_canvas(&self) -> Option<&CanvasState> {
        match &self.data {
            WidgetData::Canvas(canvas) => Some(canvas),
            _ => None,
        }
    }
}

impl GuiContext {
    pub fn create_canvas(&mut self, parent: Option<ElementId>) -> Result<ElementId, GuiError> {
        let id = self.create_element(
            parent,
            ElementKind::Canvas,
            &CAPS,
            WidgetData::Canvas(CanvasState::default()),
            false,
        )?;
        self.init_element(
            id,
            Defaults {
                flags: ElementFlags::VISIBLE | ElementFlags::BACKGROUND | ElementFlags::MOUSE_CONTROL,
                colour: palette::BLACK,
                size: Size::new(100.0, 100.0),
                align: None,
            },
        );
        Ok(id)
    }

    pub fn create_canvas_ex(
        &mut self,
        parent: Option<ElementId>,
        desc: &ElementDesc,
    ) -> Result<ElementId, GuiError> {
        let id = self.create_canvas(parent)?;
        self.apply_desc(id, desc);
        Ok(id)
    }

    /// Install the hook that paints the canvas contents
    pub fn set_canvas_draw(
        &mut self,
        id: ElementId,
        draw: impl Fn(&mut dyn Renderer, Rect) + 'static,
    ) {
        let Some(WidgetData::Canvas(canvas)) = self.elements.get_mut(id).map(|e| &mut e.data) else {
            log::trace!("set_canvas_draw on non-canvas {id:?}");
            return;
        };
        canvas.draw = Some(Box::new(draw));
        self.invalidate(id);
    }

    pub fn clear_canvas_draw(&mut self, id: ElementId) {
        if let Some(WidgetData::Canvas(canvas)) = self.elements.get_mut(id).map(|e| &mut e.data) {
            canvas.draw = None;
            self.invalidate(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::color::Color;
    use crate::element::ElementDesc;
    use crate::primitives::{Point, Rect};
    use crate::renderer::{DrawCommand, HeadlessRenderer};
    use crate::GuiContext;

    #[test]
    fn test_draw_hook_runs_inside_bounds() {
        let renderer = HeadlessRenderer::new();
        let probe = renderer.probe();
        let mut ctx = GuiContext::new(renderer, 200, 200);
        let canvas = ctx
            .create_canvas_ex(None, &ElementDesc::at(10.0, 10.0, 50.0, 50.0))
            .unwrap();
        ctx.set_canvas_draw(canvas, |renderer, bounds| {
            renderer.set_draw_colour(Color::rgb(1.0, 0.0, 0.0));
            renderer.draw_pixel(Point::new(bounds.x() + 1.0, bounds.y() + 1.0));
        });

        ctx.render();
        let commands = probe.commands();
        assert!(commands
            .iter()
            .any(|c| *c == DrawCommand::StartClip(Rect::from_xywh(10.0, 10.0, 50.0, 50.0))));
        assert!(commands
            .iter()
            .any(|c| *c == DrawCommand::Pixel(Point::new(11.0, 11.0))));
    }

    #[test]
    fn test_hook_ignored_on_other_kinds() {
        let mut ctx = GuiContext::new(HeadlessRenderer::new(), 200, 200);
        let label = ctx.create_label(None).unwrap();
        ctx.set_canvas_draw(label, |_, _| {});
        assert!(ctx.element(label).unwrap().as_canvas().is_none());
    }
}
