use crate::color::palette;
use crate::element::{Capabilities, Element, ElementDesc, ElementId, ElementKind, WidgetData};
use crate::error::GuiError;
use crate::flags::ElementFlags;
use crate::primitives::Size;
use crate::render::Frame;
use crate::text::TextAlign;
use crate::widgets::Defaults;
use crate::GuiContext;

#[derive(Debug, Clone)]
pub struct ProgressBarState {
    value: f32,
    max: f32,
}

impl Default for ProgressBarState {
    fn default() -> Self {
        Self {
            value: 0.0,
            max: 100.0,
        }
    }
}

impl ProgressBarState {
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Filled portion in `0..=1`
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            return 0.0;
        }
        (self.value / self.max).clamp(0.0, 1.0)
    }
}

static CAPS: Capabilities = Capabilities {
    render: Some(render),
    ..Capabilities::NONE
};

fn render(frame: &mut Frame<'_>, id: ElementId) {
    if let Some(element) = frame.element(id) {
        frame.skin.draw_progressbar(frame.renderer, element);
    }
}

impl Element {
    pub fn as_progress_bar(&self) -> Option<&ProgressBarState> {
        match &self.data {
            WidgetData::ProgressBar(progress) => Some(progress),
            _ => None,
        }
    }
}

impl GuiContext {
    pub fn create_progress_bar(&mut self, parent: Option<ElementId>) -> Result<ElementId, GuiError> {
        let id = self.create_element(
            parent,
            ElementKind::ProgressBar,
            &CAPS,
            WidgetData::ProgressBar(ProgressBarState::default()),
            true,
        )?;
        self.init_element(
            id,
            Defaults {
                flags: ElementFlags::VISIBLE | ElementFlags::BORDER | ElementFlags::BACKGROUND,
                colour: palette::SURFACE,
                size: Size::new(150.0, 20.0),
                align: Some(TextAlign::CENTER),
            },
        );
        Ok(id)
    }

    pub fn create_progress_bar_ex(
        &mut self,
        parent: Option<ElementId>,
        desc: &ElementDesc,
    ) -> Result<ElementId, GuiError> {
        let id = self.create_progress_bar(parent)?;
        self.apply_desc(id, desc);
        Ok(id)
    }

    pub fn progress(&self, id: ElementId) -> Option<f32> {
        Some(self.elements.get(id)?.as_progress_bar()?.value)
    }

    /// Clamped to `0..=max`
    pub fn set_progress(&mut self, id: ElementId, value: f32) {
        if let Some(WidgetData::ProgressBar(progress)) = self.elements.get_mut(id).map(|e| &mut e.data) {
            progress.value = value.clamp(0.0, progress.max.max(0.0));
            self.invalidate(id);
        }
    }

    pub fn set_progress_max(&mut self, id: ElementId, max: f32) {
        if let Some(WidgetData::ProgressBar(progress)) = self.elements.get_mut(id).map(|e| &mut e.data) {
            progress.max = max.max(0.0);
            progress.value = progress.value.min(progress.max);
            self.invalidate(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::renderer::HeadlessRenderer;
    use crate::GuiContext;

    #[test]
    fn test_value_is_clamped() {
        let mut ctx = GuiContext::new(HeadlessRenderer::new(), 200, 200);
        let bar = ctx.create_progress_bar(None).unwrap();

        ctx.set_progress(bar, 150.0);
        assert_eq!(ctx.progress(bar), Some(100.0));
        ctx.set_progress(bar, -3.0);
        assert_eq!(ctx.progress(bar), Some(0.0));

        ctx.set_progress(bar, 40.0);
        ctx.set_progress_max(bar, 20.0);
        assert_eq!(ctx.progress(bar), Some(20.0));
        let fraction = ctx.element(bar).unwrap().as_progress_bar().unwrap().fraction();
        assert_eq!(fraction, 1.0);
    }

    #[test]
    fn test_zero_max_is_empty() {
        let mut ctx = GuiContext::new(HeadlessRenderer::new(), 200, 200);
        let bar = ctx.create_progress_bar(None).unwrap();
        ctx.set_progress_max(bar, 0.0);
        let fraction = ctx.element(bar).unwrap().as_progress_bar().unwrap().fraction();
        assert_eq!(fraction, 0.0);
    }
}
