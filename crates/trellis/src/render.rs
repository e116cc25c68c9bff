//! Render pass
//!
//! Layers are drawn in list order, each element before its children, so the
//! last element drawn is the one hit testing finds first. Drawing itself goes
//! through each kind's `render` capability, which hands the element to the
//! active [`Skin`].

use crate::element::{Element, ElementId};
use crate::flags::{ElementFlags, StateFlags};
use crate::primitives::Rect;
use crate::renderer::{Renderer, RendererCaps};
use crate::skin::Skin;
use crate::GuiContext;
use slotmap::SlotMap;

/// Borrowed view of the context while a pass is drawing
pub struct Frame<'a> {
    pub elements: &'a SlotMap<ElementId, Element>,
    pub renderer: &'a mut dyn Renderer,
    pub skin: &'a dyn Skin,
    clips: Vec<Rect>,
    /// Element whose offscreen cache is being filled
    caching: Option<ElementId>,
}

impl<'a> Frame<'a> {
    pub(crate) fn new(
        elements: &'a SlotMap<ElementId, Element>,
        renderer: &'a mut dyn Renderer,
        skin: &'a dyn Skin,
    ) -> Self {
        Self {
            elements,
            renderer,
            skin,
            clips: Vec::new(),
            caching: None,
        }
    }

    pub fn element(&self, id: ElementId) -> Option<&'a Element> {
        self.elements.get(id)
    }

    /// Clip to `rect` intersected with the current clip
    pub fn push_clip(&mut self, rect: Rect) {
        let rect = match self.clips.last() {
            Some(current) => current
                .intersect(&rect)
                .unwrap_or(Rect::from_min_size(rect.min, [0.0, 0.0])),
            None => rect,
        };
        self.clips.push(rect);
        self.renderer.start_clip(rect);
    }

    pub fn pop_clip(&mut self) {
        self.clips.pop();
        self.renderer.end_clip();
        if let Some(&outer) = self.clips.last() {
            self.renderer.start_clip(outer);
        }
    }

    /// Draw `id` and its subtree
    pub fn render_element(&mut self, id: ElementId) {
        let elements = self.elements;
        let Some(element) = elements.get(id) else {
            return;
        };
        if !element.is_visible() {
            return;
        }

        if let Some(target) = element.render_target {
            if element.has_flag(ElementFlags::CACHED) && self.caching != Some(id) {
                self.renderer
                    .draw_render_target(target, element.bounds.min_point());
                return;
            }
        }

        if let Some(render) = element.caps.render {
            render(self, id);
        }

        let clip = element.has_flag(ElementFlags::CLIP_CHILDREN);
        if clip {
            self.push_clip(element.clip_region());
        }
        for &child in &element.children {
            self.render_element(child);
        }
        if clip {
            self.pop_clip();
        }

        if let Some(post_render) = element.caps.post_render {
            post_render(self, id);
        }
    }
}

impl GuiContext {
    /// Draw every layer now, regardless of the redraw flag
    pub fn render(&mut self) {
        let GuiContext {
            elements,
            layers,
            renderer,
            skin,
            ..
        } = self;

        renderer.begin();
        {
            let mut frame = Frame::new(elements, renderer.as_mut(), skin.as_ref());
            for &layer in layers.iter() {
                frame.render_element(layer);
            }
        }
        renderer.end();
        self.redraw = false;
    }

    /// Regenerate offscreen targets of cached elements marked dirty
    pub(crate) fn refresh_caches(&mut self) {
        self.cache_refresh = false;
        let supported = self
            .renderer
            .capabilities()
            .contains(RendererCaps::RENDER_TARGETS);

        let dirty: Vec<ElementId> = self
            .elements
            .iter()
            .filter(|(_, element)| element.has_state(StateFlags::CACHE_DIRTY))
            .map(|(id, _)| id)
            .collect();

        for id in dirty {
            let GuiContext {
                elements,
                renderer,
                skin,
                ..
            } = self;
            let Some(element) = elements.get_mut(id) else {
                continue;
            };
            element.state.remove(StateFlags::CACHE_DIRTY);
            if !supported || !element.has_flag(ElementFlags::CACHED) {
                continue;
            }

            let bounds = element.bounds;
            if element.render_target.is_none() {
                element.render_target = renderer.create_render_target(
                    bounds.width().max(1.0) as u32,
                    bounds.height().max(1.0) as u32,
                );
            }
            let Some(target) = element.render_target else {
                log::warn!("could not create render target for {id:?}");
                continue;
            };

            renderer.enable_render_target(target, bounds.min_point());
            {
                let mut frame = Frame::new(elements, renderer.as_mut(), skin.as_ref());
                frame.caching = Some(id);
                frame.render_element(id);
            }
            renderer.disable_render_target(target);
        }
        self.redraw = true;
    }
}

#[cfg(test)]
mod tests {
    use crate::element::ElementDesc;
    use crate::flags::ElementFlags;
    use crate::renderer::{DrawCommand, HeadlessRenderer, RendererCaps};
    use crate::GuiContext;

    #[test]
    fn test_hidden_subtree_is_skipped() {
        let renderer = HeadlessRenderer::new();
        let probe = renderer.probe();
        let mut ctx = GuiContext::new(renderer, 200, 200);
        let window = ctx.create_window(None).unwrap();
        ctx.create_label_ex(Some(window), &ElementDesc::default().with_text("inside"))
            .unwrap();

        ctx.render();
        assert!(probe.texts().contains(&"inside".to_string()));

        ctx.set_visible(window, false);
        ctx.render();
        assert!(probe.texts().is_empty());
    }

    #[test]
    fn test_cached_element_draws_from_target() {
        let renderer = HeadlessRenderer::with_capabilities(RendererCaps::RENDER_TARGETS);
        let probe = renderer.probe();
        let mut ctx = GuiContext::new(renderer, 200, 200);
        let label = ctx
            .create_label_ex(None, &ElementDesc::at(0.0, 0.0, 50.0, 20.0).with_text("x"))
            .unwrap();
        ctx.add_flags(label, ElementFlags::CACHED);

        ctx.process_at(0);
        assert_eq!(probe.render_targets(), 1);
        let commands = probe.commands();
        assert!(commands
            .iter()
            .any(|c| matches!(c, DrawCommand::RenderTarget { .. })));
        assert!(!commands.iter().any(|c| matches!(c, DrawCommand::Text { .. })));
    }

    #[test]
    fn test_cache_ignored_without_capability() {
        let renderer = HeadlessRenderer::new();
        let probe = renderer.probe();
        let mut ctx = GuiContext::new(renderer, 200, 200);
        let label = ctx
            .create_label_ex(None, &ElementDesc::at(0.0, 0.0, 50.0, 20.0).with_text("x"))
            .unwrap();
        ctx.add_flags(label, ElementFlags::CACHED);

        ctx.process_at(0);
        assert_eq!(probe.render_targets(), 0);
        assert_eq!(probe.texts(), vec!["x".to_string()]);
    }
}
