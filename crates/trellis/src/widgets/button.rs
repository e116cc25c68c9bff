use crate::color::palette;
use crate::element::{Capabilities, ElementDesc, ElementId, ElementKind, WidgetData};
use crate::error::GuiError;
use crate::flags::ElementFlags;
use crate::primitives::Size;
use crate::render::Frame;
use crate::text::TextAlign;
use crate::widgets::Defaults;
use crate::GuiContext;

static CAPS: Capabilities = Capabilities {
    render: Some(render),
    ..Capabilities::NONE
};

fn render(frame: &mut Frame<'_>, id: ElementId) {
    if let Some(element) = frame.element(id) {
        frame.skin.draw_button(frame.renderer, element);
    }
}

impl GuiContext {
    pub fn create_button(&mut self, parent: Option<ElementId>) -> Result<ElementId, GuiError> {
        let id = self.create_element(parent, ElementKind::Button, &CAPS, WidgetData::None, true)?;
        self.init_element(
            id,
            Defaults {
                flags: ElementFlags::VISIBLE
                    | ElementFlags::BORDER
                    | ElementFlags::BACKGROUND
                    | ElementFlags::MOUSE_CONTROL,
                colour: palette::SURFACE_RAISED,
                size: Size::new(80.0, 24.0),
                align: Some(TextAlign::CENTER),
            },
        );
        Ok(id)
    }

    pub fn create_button_ex(
        &mut self,
        parent: Option<ElementId>,
        desc: &ElementDesc,
    ) -> Result<ElementId, GuiError> {
        let id = self.create_button(parent)?;
        self.apply_desc(id, desc);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use crate::element::{ElementDesc, ElementKind};
    use crate::flags::ElementFlags;
    use crate::renderer::{DrawCommand, HeadlessRenderer};
    use crate::GuiContext;

    #[test]
    fn test_button_defaults() {
        let mut ctx = GuiContext::new(HeadlessRenderer::new(), 200, 200);
        let button = ctx.create_button(None).unwrap();
        assert_eq!(ctx.kind(button), Some(ElementKind::Button));
        assert!(ctx.flags(button).unwrap().contains(ElementFlags::MOUSE_CONTROL));
        assert_eq!(ctx.size(button).unwrap().width, 80.0);
    }

    #[test]
    fn test_button_draws_centred_text() {
        let renderer = HeadlessRenderer::new();
        let probe = renderer.probe();
        let mut ctx = GuiContext::new(renderer, 200, 200);
        ctx.create_button_ex(
            None,
            &ElementDesc::at(0.0, 0.0, 100.0, 30.0).with_text("ok"),
        )
        .unwrap();

        ctx.render();
        let text_at = probe.commands().into_iter().find_map(|command| match command {
            DrawCommand::Text { position, .. } => Some(position),
            _ => None,
        });
        // 2 glyphs of 8px, line height 11
        let position = text_at.unwrap();
        assert_eq!(position.x, 42.0);
        assert_eq!(position.y, 9.0);
    }
}
