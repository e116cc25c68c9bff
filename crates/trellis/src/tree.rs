//! Element tree: creation, destruction, parenting, z-order and layout
//!
//! An element either has a parent and sits in that parent's child list, or has
//! no parent and sits in the layer list. Window decorations are the one
//! exception: they point at their window as parent but live in the window's
//! state instead of its child list.

use crate::element::{Capabilities, Element, ElementDesc, ElementId, ElementKind, WidgetData};
use crate::error::GuiError;
use crate::flags::StateFlags;
use crate::primitives::Rect;
use crate::text::Text;
use crate::GuiContext;

impl GuiContext {
    // ========== Creation ==========

    /// Allocate an element, attached to `parent` or to the layer list
    pub(crate) fn create_element(
        &mut self,
        parent: Option<ElementId>,
        kind: ElementKind,
        caps: &'static Capabilities,
        data: WidgetData,
        with_text: bool,
    ) -> Result<ElementId, GuiError> {
        let id = self.allocate(parent, kind, caps, data, with_text)?;
        match parent {
            Some(parent) => {
                if let Some(element) = self.elements.get_mut(parent) {
                    element.children.push(id);
                }
            }
            None => {
                self.layers.push(id);
                if let Some(element) = self.elements.get_mut(id) {
                    element.state |= StateFlags::LAYER;
                }
            }
        }
        self.update_bounds(id);
        self.invalidate(id);
        Ok(id)
    }

    /// Allocate a window decoration, owned by `window` but outside its child list
    pub(crate) fn create_decoration(
        &mut self,
        window: ElementId,
        kind: ElementKind,
        caps: &'static Capabilities,
    ) -> Result<ElementId, GuiError> {
        let id = self.allocate(Some(window), kind, caps, WidgetData::None, true)?;
        if let Some(element) = self.elements.get_mut(id) {
            element.state |= StateFlags::DECORATION;
        }
        Ok(id)
    }

    fn allocate(
        &mut self,
        parent: Option<ElementId>,
        kind: ElementKind,
        caps: &'static Capabilities,
        data: WidgetData,
        with_text: bool,
    ) -> Result<ElementId, GuiError> {
        let limit = self.config.max_elements;
        if self.elements.len() >= limit {
            return Err(GuiError::CapacityExceeded { limit });
        }
        let alpha = match parent {
            Some(parent) => match self.elements.get(parent) {
                Some(parent) => parent.alpha,
                None => return Err(GuiError::InvalidParent(parent)),
            },
            None => 255,
        };

        let mut element = Element::new(kind, caps, data);
        element.parent = parent;
        element.alpha = alpha;
        if with_text {
            let mut text = Text::default();
            element.font = self
                .fonts
                .acquire(self.renderer.as_mut(), &self.config.default_font);
            text.update_dimensions(self.renderer.as_mut(), element.font_handle());
            element.text = Some(text);
        } else {
            element.state |= StateFlags::NO_TEXT;
        }

        let id = self.elements.insert(element);
        log::debug!("created {kind:?} {id:?}");
        Ok(id)
    }

    /// Apply the overrides of an `_ex` constructor through the public setters
    pub(crate) fn apply_desc(&mut self, id: ElementId, desc: &ElementDesc) {
        if let Some(position) = desc.position {
            self.set_position(id, position.x, position.y);
        }
        if let Some(size) = desc.size {
            self.set_size(id, size.width, size.height);
        }
        if let Some(flags) = desc.flags {
            self.set_flags(id, flags);
        }
        if let Some(colour) = desc.colour {
            self.set_colour(id, colour);
        }
        if let Some(text) = &desc.text {
            self.set_text(id, text);
        }
    }

    // ========== Destruction ==========

    /// Destroy `id` and its whole subtree.
    ///
    /// Children go first, then the kind's `destroy` capability runs, then the
    /// element's text, font and render target are released. Input routing
    /// never refers to the element afterwards.
    pub fn destroy(&mut self, id: ElementId) {
        let Some(element) = self.elements.get(id) else {
            log::trace!("destroy on stale element {id:?}");
            return;
        };
        let children = element.children.clone();
        let caps = element.caps;

        for child in children {
            self.destroy(child);
        }
        if let Some(destroy) = caps.destroy {
            destroy(self, id);
        }

        let Some(element) = self.elements.remove(id) else {
            return;
        };
        match element.parent {
            Some(parent) => {
                if let Some(parent) = self.elements.get_mut(parent) {
                    parent.children.retain(|&child| child != id);
                }
            }
            None => self.layers.retain(|&layer| layer != id),
        }
        if let Some(font) = element.font {
            self.fonts.release(self.renderer.as_mut(), font);
        }
        if let Some(target) = element.render_target {
            self.renderer.destroy_render_target(target);
        }

        self.router.forget(id);
        self.redraw = true;
        log::debug!("destroyed {:?} {id:?}", element.kind);
    }

    // ========== Topology ==========

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.elements.get(id)?.parent
    }

    /// Children in render order; empty for stale handles
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.elements
            .get(id)
            .map(|element| element.children.as_slice())
            .unwrap_or_default()
    }

    pub fn is_layer(&self, id: ElementId) -> bool {
        self.elements
            .get(id)
            .is_some_and(|element| element.parent.is_none())
    }

    /// Attach a parentless element to `parent`, on top of its siblings
    pub fn add_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), GuiError> {
        if !self.elements.contains_key(parent) {
            return Err(GuiError::InvalidParent(parent));
        }
        let Some(element) = self.elements.get(child) else {
            return Err(GuiError::InvalidElement(child));
        };
        if element.parent.is_some() {
            return Err(GuiError::ChildAlreadyParented(child));
        }

        let mut ancestor = Some(parent);
        while let Some(node) = ancestor {
            if node == child {
                return Err(GuiError::CycleDetected(child));
            }
            ancestor = self.parent(node);
        }

        self.layers.retain(|&layer| layer != child);
        if let Some(element) = self.elements.get_mut(child) {
            element.parent = Some(parent);
            element.state.remove(StateFlags::LAYER);
        }
        if let Some(element) = self.elements.get_mut(parent) {
            element.children.push(child);
        }
        self.update_bounds(child);
        self.invalidate(child);
        Ok(())
    }

    /// Detach `child` from `parent`, turning it into a layer.
    ///
    /// Does nothing unless `child` is currently in `parent`'s child list.
    pub fn remove_child(&mut self, parent: ElementId, child: ElementId) {
        let Some(element) = self.elements.get_mut(parent) else {
            log::trace!("remove_child on stale parent {parent:?}");
            return;
        };
        let Some(index) = element.children.iter().position(|&c| c == child) else {
            return;
        };
        element.children.remove(index);
        self.invalidate(parent);

        if let Some(element) = self.elements.get_mut(child) {
            element.parent = None;
            element.state |= StateFlags::LAYER;
        }
        self.layers.push(child);
        self.update_bounds(child);
        self.redraw = true;
    }

    // ========== Z-Order ==========

    /// Move one step toward the top of its siblings
    pub fn raise(&mut self, id: ElementId) {
        self.reorder(id, |siblings, index| {
            if index + 1 < siblings.len() {
                siblings.swap(index, index + 1);
            }
        });
    }

    /// Move one step toward the bottom of its siblings
    pub fn lower(&mut self, id: ElementId) {
        self.reorder(id, |siblings, index| {
            if index > 0 {
                siblings.swap(index, index - 1);
            }
        });
    }

    /// Draw above all siblings and win hit tests against them
    pub fn send_to_top(&mut self, id: ElementId) {
        self.reorder(id, |siblings, index| {
            let id = siblings.remove(index);
            siblings.push(id);
        });
    }

    pub fn send_to_bottom(&mut self, id: ElementId) {
        self.reorder(id, |siblings, index| {
            let id = siblings.remove(index);
            siblings.insert(0, id);
        });
    }

    fn reorder(&mut self, id: ElementId, apply: impl FnOnce(&mut Vec<ElementId>, usize)) {
        let Some(element) = self.elements.get(id) else {
            log::trace!("reorder on stale element {id:?}");
            return;
        };
        let siblings = match element.parent {
            Some(parent) => match self.elements.get_mut(parent) {
                Some(parent) => &mut parent.children,
                None => return,
            },
            None => &mut self.layers,
        };
        if let Some(index) = siblings.iter().position(|&sibling| sibling == id) {
            apply(siblings, index);
        }
        match self.parent(id) {
            Some(parent) => self.invalidate(parent),
            None => self.redraw = true,
        }
    }

    // ========== Layout ==========

    /// Rect an element's local position is relative to
    pub(crate) fn container_rect(&self, id: ElementId) -> Rect {
        let Some(element) = self.elements.get(id) else {
            return self.screen_rect();
        };
        match element.parent.and_then(|parent| self.elements.get(parent)) {
            Some(parent) if element.has_state(StateFlags::DECORATION) => parent.bounds,
            Some(parent) => parent.clip_region(),
            None => self.screen_rect(),
        }
    }

    /// Recompute absolute bounds of `id` and its subtree from local rects
    pub(crate) fn update_bounds(&mut self, id: ElementId) {
        let container = self.container_rect(id);
        let Some(element) = self.elements.get_mut(id) else {
            return;
        };

        let mut local = element.local;
        if let Some([fx, fy]) = element.rel_position {
            local = Rect::from_xywh(
                container.width() * fx,
                container.height() * fy,
                local.width(),
                local.height(),
            );
        }
        if let Some([fw, fh]) = element.rel_size {
            local = Rect::from_min_size(
                local.min,
                [container.width() * fw, container.height() * fh],
            );
        }
        let bounds = local.translate(container.x(), container.y());
        let resized = bounds.size() != element.bounds.size();

        element.local = local;
        element.bounds = bounds;
        if let Some(text) = element.text.as_mut() {
            text.set_bounds(bounds);
        }
        let stale_target = if resized {
            element.render_target.take()
        } else {
            None
        };
        let children = element.children.clone();
        let caps = element.caps;

        if let Some(target) = stale_target {
            self.renderer.destroy_render_target(target);
        }
        if let Some(on_bounds_change) = caps.on_bounds_change {
            on_bounds_change(self, id);
        }
        for child in children {
            self.update_bounds(child);
        }
    }

    /// Set a local rect without going through the public setters
    pub(crate) fn place(&mut self, id: ElementId, local: Rect) {
        if let Some(element) = self.elements.get_mut(id) {
            element.local = local;
            element.rel_position = None;
            element.rel_size = None;
        }
        self.update_bounds(id);
    }
}

#[cfg(test)]
mod tests {
    use crate::element::ElementDesc;
    use crate::error::GuiError;
    use crate::renderer::HeadlessRenderer;
    use crate::GuiContext;

    fn context() -> GuiContext {
        GuiContext::new(HeadlessRenderer::new(), 640, 480)
    }

    /// Parent set exactly when the element is not a layer
    fn assert_topology(ctx: &GuiContext) {
        for (id, element) in ctx.elements.iter() {
            let in_layers = ctx.layers.contains(&id);
            assert!(
                element.parent.is_some() != in_layers,
                "{id:?} parent={:?} in_layers={in_layers}",
                element.parent
            );
        }
    }

    #[test]
    fn test_create_attaches_to_parent_or_layers() {
        let mut ctx = context();
        let window = ctx.create_window(None).unwrap();
        let button = ctx.create_button(Some(window)).unwrap();

        assert!(ctx.is_layer(window));
        assert_eq!(ctx.parent(button), Some(window));
        assert_eq!(ctx.children(window), &[button]);
        assert_topology(&ctx);
    }

    #[test]
    fn test_add_child_requires_parentless_child() {
        let mut ctx = context();
        let a = ctx.create_window(None).unwrap();
        let b = ctx.create_window(None).unwrap();
        let label = ctx.create_label(Some(a)).unwrap();

        assert_eq!(
            ctx.add_child(b, label),
            Err(GuiError::ChildAlreadyParented(label))
        );

        ctx.remove_child(a, label);
        assert!(ctx.is_layer(label));
        assert_topology(&ctx);

        ctx.add_child(b, label).unwrap();
        assert_eq!(ctx.parent(label), Some(b));
        assert!(!ctx.layers().contains(&label));
        assert_topology(&ctx);
    }

    #[test]
    fn test_add_child_rejects_cycles() {
        let mut ctx = context();
        let outer = ctx.create_window(None).unwrap();
        let inner = ctx.create_window(Some(outer)).unwrap();
        assert_eq!(ctx.add_child(inner, outer), Err(GuiError::CycleDetected(outer)));
        assert_eq!(ctx.add_child(outer, outer), Err(GuiError::CycleDetected(outer)));
    }

    #[test]
    fn test_destroy_removes_subtree() {
        let mut ctx = context();
        let window = ctx.create_window(None).unwrap();
        let inner = ctx.create_window(Some(window)).unwrap();
        let button = ctx.create_button(Some(inner)).unwrap();

        ctx.destroy(window);
        assert!(!ctx.is_alive(window));
        assert!(!ctx.is_alive(inner));
        assert!(!ctx.is_alive(button));
        assert_eq!(ctx.element_count(), 0);

        // Stale handles are ignored
        ctx.destroy(button);
        ctx.set_position(button, 1.0, 1.0);
    }

    #[test]
    fn test_z_order_operations() {
        let mut ctx = context();
        let a = ctx.create_label(None).unwrap();
        let b = ctx.create_label(None).unwrap();
        let c = ctx.create_label(None).unwrap();

        ctx.send_to_top(a);
        assert_eq!(ctx.layers(), &[b, c, a]);
        ctx.send_to_bottom(a);
        assert_eq!(ctx.layers(), &[a, b, c]);
        ctx.raise(a);
        assert_eq!(ctx.layers(), &[b, a, c]);
        ctx.lower(c);
        assert_eq!(ctx.layers(), &[b, c, a]);
        ctx.lower(b);
        assert_eq!(ctx.layers(), &[b, c, a]);
    }

    #[test]
    fn test_child_bounds_follow_parent() {
        let mut ctx = context();
        let outer = ctx
            .create_label_ex(None, &ElementDesc::at(100.0, 50.0, 200.0, 200.0))
            .unwrap();
        let inner = ctx
            .create_label_ex(Some(outer), &ElementDesc::at(10.0, 10.0, 20.0, 20.0))
            .unwrap();
        assert_eq!(ctx.bounds(inner).unwrap().min, [110.0, 60.0]);

        ctx.set_position(outer, 0.0, 0.0);
        assert_eq!(ctx.bounds(inner).unwrap().min, [10.0, 10.0]);
    }

    #[test]
    fn test_relative_layout() {
        let mut ctx = context();
        let outer = ctx
            .create_label_ex(None, &ElementDesc::at(0.0, 0.0, 200.0, 100.0))
            .unwrap();
        let inner = ctx.create_label(Some(outer)).unwrap();
        ctx.set_rel_position(inner, 0.5, 0.5);
        ctx.set_rel_size(inner, 0.25, 0.5);
        assert_eq!(ctx.bounds(inner).unwrap().min, [100.0, 50.0]);
        assert_eq!(ctx.bounds(inner).unwrap().max, [150.0, 100.0]);

        ctx.set_size(outer, 400.0, 200.0);
        assert_eq!(ctx.bounds(inner).unwrap().min, [200.0, 100.0]);
        assert_eq!(ctx.bounds(inner).unwrap().max, [300.0, 200.0]);
    }
}
