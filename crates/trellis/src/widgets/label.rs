use crate::color::Color;
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
        frame.skin.draw_label(frame.renderer, element);
    }
}

impl GuiContext {
    /// Static text; labels never take mouse input
    pub fn create_label(&mut self, parent: Option<ElementId>) -> Result<ElementId, GuiError> {
        let id = self.create_element(parent, ElementKind::Label, &CAPS, WidgetData::None, true)?;
        self.init_element(
            id,
            Defaults {
                flags: ElementFlags::VISIBLE,
                colour: Color::transparent(),
                size: Size::new(100.0, 20.0),
                align: Some(TextAlign::LEFT),
            },
        );
        Ok(id)
    }

    pub fn create_label_ex(
        &mut self,
        parent: Option<ElementId>,
        desc: &ElementDesc,
    ) -> Result<ElementId, GuiError> {
        let id = self.create_label(parent)?;
        self.apply_desc(id, desc);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use crate::element::ElementDesc;
    use crate::flags::ElementFlags;
    use crate::renderer::HeadlessRenderer;
    use crate::GuiContext;

    #[test]
    fn test_label_background_is_opt_in() {
        let renderer = HeadlessRenderer::new();
        let probe = renderer.probe();
        let mut ctx = GuiContext::new(renderer, 200, 200);
        let label = ctx
            .create_label_ex(None, &ElementDesc::default().with_text("plain"))
            .unwrap();

        ctx.render();
        assert_eq!(probe.texts(), vec!["plain".to_string()]);
        let plain = probe.commands().len();

        ctx.add_flags(label, ElementFlags::BACKGROUND);
        ctx.render();
        assert!(probe.commands().len() > plain);
    }
}
