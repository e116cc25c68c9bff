//! Hit testing: point to the topmost interactive element
//!
//! Layers are walked last to first. Inside an element the children are tested
//! last to first before the element itself, so a child always wins over its
//! parent and later siblings win over earlier ones. A window probes its close
//! button and titlebar before anything else.

use crate::element::{ElementId, WidgetData};
use crate::flags::ElementFlags;
use crate::primitives::{Point, Rect};
use crate::GuiContext;

impl GuiContext {
    /// Topmost visible element under `point` that accepts mouse input
    pub fn hit_test(&self, point: Point) -> Option<ElementId> {
        self.layers
            .iter()
            .rev()
            .find_map(|&layer| self.hit_test_element(layer, point, None))
    }

    fn hit_test_element(&self, id: ElementId, point: Point, clip: Option<Rect>) -> Option<ElementId> {
        let element = self.elements.get(id)?;
        if !element.is_visible() {
            return None;
        }
        if clip.is_some_and(|clip| !clip.contains(point)) {
            return None;
        }

        if let WidgetData::Window(window) = &element.data {
            let decorations = [window.close_button, window.titlebar];
            for decoration in decorations.into_iter().flatten() {
                if let Some(hit) = self.hit_test_element(decoration, point, clip) {
                    return Some(hit);
                }
            }
        }

        let child_clip = if element.has_flag(ElementFlags::CLIP_CHILDREN) {
            let region = element.clip_region();
            match clip {
                Some(clip) => clip.intersect(&region),
                None => Some(region),
            }
        } else {
            clip
        };
        // An empty clip hides every child
        let children_reachable = !element.has_flag(ElementFlags::CLIP_CHILDREN) || child_clip.is_some();
        if children_reachable {
            for &child in element.children.iter().rev() {
                if let Some(hit) = self.hit_test_element(child, point, child_clip) {
                    return Some(hit);
                }
            }
        }

        let accepts = element.has_flag(ElementFlags::MOUSE_CONTROL)
            && !element.has_flag(ElementFlags::INACTIVE);
        (accepts && element.bounds.contains(point)).then_some(id)
    }
}

#[cfg(test)]
mod tests {
    use crate::element::ElementDesc;
    use crate::flags::ElementFlags;
    use crate::primitives::Point;
    use crate::renderer::HeadlessRenderer;
    use crate::GuiContext;

    fn context() -> GuiContext {
        GuiContext::new(HeadlessRenderer::new(), 640, 480)
    }

    #[test]
    fn test_child_wins_over_parent() {
        let mut ctx = context();
        let window = ctx
            .create_window_ex(None, &ElementDesc::at(0.0, 0.0, 200.0, 200.0))
            .unwrap();
        let button = ctx
            .create_button_ex(Some(window), &ElementDesc::at(10.0, 10.0, 50.0, 20.0))
            .unwrap();

        let inside_button = Point::new(20.0, 40.0);
        assert_eq!(ctx.hit_test(inside_button), Some(button));
        assert_eq!(ctx.hit_test(Point::new(150.0, 150.0)), Some(window));
        assert_eq!(ctx.hit_test(Point::new(500.0, 400.0)), None);
    }

    #[test]
    fn test_later_sibling_wins() {
        let mut ctx = context();
        let a = ctx
            .create_button_ex(None, &ElementDesc::at(0.0, 0.0, 100.0, 100.0))
            .unwrap();
        let b = ctx
            .create_button_ex(None, &ElementDesc::at(50.0, 50.0, 100.0, 100.0))
            .unwrap();

        let overlap = Point::new(75.0, 75.0);
        assert_eq!(ctx.hit_test(overlap), Some(b));
        ctx.send_to_top(a);
        assert_eq!(ctx.hit_test(overlap), Some(a));
        assert_eq!(ctx.hit_test(overlap), Some(a));
    }

    #[test]
    fn test_inactive_and_hidden_are_skipped() {
        let mut ctx = context();
        let below = ctx
            .create_button_ex(None, &ElementDesc::at(0.0, 0.0, 100.0, 100.0))
            .unwrap();
        let above = ctx
            .create_button_ex(None, &ElementDesc::at(0.0, 0.0, 100.0, 100.0))
            .unwrap();
        let p = Point::new(10.0, 10.0);

        ctx.add_flags(above, ElementFlags::INACTIVE);
        assert_eq!(ctx.hit_test(p), Some(below));

        ctx.remove_flags(above, ElementFlags::INACTIVE);
        ctx.set_visible(above, false);
        assert_eq!(ctx.hit_test(p), Some(below));
    }

    #[test]
    fn test_labels_are_transparent() {
        let mut ctx = context();
        let button = ctx
            .create_button_ex(None, &ElementDesc::at(0.0, 0.0, 100.0, 100.0))
            .unwrap();
        ctx.create_label_ex(None, &ElementDesc::at(0.0, 0.0, 100.0, 100.0))
            .unwrap();
        assert_eq!(ctx.hit_test(Point::new(5.0, 5.0)), Some(button));
    }

    #[test]
    fn test_clipped_children_not_hit_outside_parent() {
        let mut ctx = context();
        let window = ctx
            .create_window_ex(None, &ElementDesc::at(0.0, 0.0, 100.0, 100.0))
            .unwrap();
        let button = ctx
            .create_button_ex(Some(window), &ElementDesc::at(50.0, 50.0, 100.0, 100.0))
            .unwrap();

        assert_eq!(ctx.hit_test(Point::new(90.0, 90.0)), Some(button));
        assert_eq!(ctx.hit_test(Point::new(120.0, 120.0)), None);

        ctx.remove_flags(window, ElementFlags::CLIP_CHILDREN);
        assert_eq!(ctx.hit_test(Point::new(120.0, 120.0)), Some(button));
    }

    #[test]
    fn test_titlebar_probed_first() {
        let mut ctx = context();
        let window = ctx
            .create_window_ex(None, &ElementDesc::at(0.0, 0.0, 200.0, 100.0))
            .unwrap();
        let titlebar = ctx.window_titlebar(window).unwrap();
        let close = ctx.window_close_button(window).unwrap();

        assert_eq!(ctx.hit_test(Point::new(50.0, 10.0)), Some(titlebar));
        let close_bounds = ctx.bounds(close).unwrap();
        let centre = Point::new(
            close_bounds.x() + close_bounds.width() / 2.0,
            close_bounds.y() + close_bounds.height() / 2.0,
        );
        assert_eq!(ctx.hit_test(centre), Some(close));
    }
}
