//! Skins turn element state into renderer calls
//!
//! The core never draws directly. Each widget kind's `render` capability picks
//! the matching `draw_*` method of the active [`Skin`].

use crate::color::{palette, Color};
use crate::element::Element;
use crate::flags::{ElementFlags, StateFlags};
use crate::primitives::{Point, Rect, Spacing};
use crate::renderer::Renderer;
use crate::widgets::scrollbar::ScrollParts;

pub trait Skin {
    fn draw_button(&self, renderer: &mut dyn Renderer, element: &Element);
    fn draw_canvas(&self, renderer: &mut dyn Renderer, element: &Element);
    fn draw_checkbox(&self, renderer: &mut dyn Renderer, element: &Element);
    fn draw_editbox(&self, renderer: &mut dyn Renderer, element: &Element);
    fn draw_label(&self, renderer: &mut dyn Renderer, element: &Element);
    fn draw_listbox(&self, renderer: &mut dyn Renderer, element: &Element);
    fn draw_memobox(&self, renderer: &mut dyn Renderer, element: &Element);
    fn draw_progressbar(&self, renderer: &mut dyn Renderer, element: &Element);
    fn draw_scrollbar(&self, renderer: &mut dyn Renderer, element: &Element);
    fn draw_sprite(&self, renderer: &mut dyn Renderer, element: &Element);
    fn draw_window(&self, renderer: &mut dyn Renderer, element: &Element);
    fn draw_window_titlebar(&self, renderer: &mut dyn Renderer, element: &Element);
    fn draw_window_closebutton(&self, renderer: &mut dyn Renderer, element: &Element);
}

/// Flat-colour skin using only rects, triangles and text
#[derive(Debug, Clone)]
pub struct SimpleSkin {
    pub border: Color,
    pub accent: Color,
    pub selection: Color,
    /// Added to an element's colour while hovered
    pub hover_shade: f32,
    /// Added to an element's colour while pressed
    pub press_shade: f32,
}

impl Default for SimpleSkin {
    fn default() -> Self {
        Self {
            border: palette::BORDER,
            accent: palette::ACCENT,
            selection: palette::SELECTION,
            hover_shade: 0.08,
            press_shade: -0.08,
        }
    }
}

fn fill(renderer: &mut dyn Renderer, rect: Rect, colour: Color) {
    renderer.set_draw_colour(colour);
    renderer.draw_rect(rect);
}

/// One pixel outline drawn as four rects
fn outline(renderer: &mut dyn Renderer, rect: Rect, colour: Color) {
    renderer.set_draw_colour(colour);
    let [x0, y0] = rect.min;
    let [x1, y1] = rect.max;
    renderer.draw_rect(Rect::new([x0, y0], [x1, y0 + 1.0]));
    renderer.draw_rect(Rect::new([x0, y1 - 1.0], [x1, y1]));
    renderer.draw_rect(Rect::new([x0, y0], [x0 + 1.0, y1]));
    renderer.draw_rect(Rect::new([x1 - 1.0, y0], [x1, y1]));
}

fn draw_text(renderer: &mut dyn Renderer, element: &Element) {
    let (Some(text), Some(font), Some(colour)) = (
        element.text(),
        element.font_handle(),
        element.text_draw_colour(),
    ) else {
        return;
    };
    if text.is_empty() {
        return;
    }
    renderer.set_draw_colour(colour);
    renderer.draw_text(font, text.as_str(), text.position(), text.tags());
}

impl SimpleSkin {
    /// Element colour adjusted for hover and press state
    fn face(&self, element: &Element) -> Color {
        let colour = element.draw_colour();
        if element.has_state(StateFlags::PRESSED) {
            colour.shade(self.press_shade)
        } else if element.has_state(StateFlags::HOVERED) {
            colour.shade(self.hover_shade)
        } else {
            colour
        }
    }

    fn frame(&self, renderer: &mut dyn Renderer, element: &Element, face: Color) {
        if element.has_flag(ElementFlags::BACKGROUND) {
            fill(renderer, element.bounds(), face);
        }
        if element.has_flag(ElementFlags::BORDER) {
            outline(renderer, element.bounds(), self.alpha(element, self.border));
        }
    }

    fn alpha(&self, element: &Element, colour: Color) -> Color {
        colour.with_alpha(colour.a * element.alpha() as f32 / 255.0)
    }

    fn arrow(&self, renderer: &mut dyn Renderer, rect: Rect, direction: Arrow, colour: Color) {
        let area = rect.shrink(Spacing::all(rect.width().min(rect.height()) / 3.0));
        let (x0, y0, x1, y1) = (area.min[0], area.min[1], area.max[0], area.max[1]);
        let (xm, ym) = ((x0 + x1) / 2.0, (y0 + y1) / 2.0);
        let [a, b, c] = match direction {
            Arrow::Up => [Point::new(xm, y0), Point::new(x1, y1), Point::new(x0, y1)],
            Arrow::Down => [Point::new(x0, y0), Point::new(x1, y0), Point::new(xm, y1)],
            Arrow::Left => [Point::new(x0, ym), Point::new(x1, y0), Point::new(x1, y1)],
            Arrow::Right => [Point::new(x0, y0), Point::new(x1, ym), Point::new(x0, y1)],
        };
        renderer.set_draw_colour(colour);
        renderer.draw_triangle(a, b, c);
    }
}

#[derive(Clone, Copy)]
enum Arrow {
    Up,
    Down,
    Left,
    Right,
}

impl Skin for SimpleSkin {
    fn draw_button(&self, renderer: &mut dyn Renderer, element: &Element) {
        self.frame(renderer, element, self.face(element));
        draw_text(renderer, element);
    }

    fn draw_canvas(&self, renderer: &mut dyn Renderer, element: &Element) {
        self.frame(renderer, element, element.draw_colour());
    }

    fn draw_checkbox(&self, renderer: &mut dyn Renderer, element: &Element) {
        let bounds = element.bounds();
        let side = bounds.height().min(bounds.width());
        let square = Rect::from_xywh(bounds.x(), bounds.y() + (bounds.height() - side) / 2.0, side, side);

        fill(renderer, square, self.face(element));
        outline(renderer, square, self.alpha(element, self.border));
        if element.as_checkbox().is_some_and(|checkbox| checkbox.checked()) {
            fill(
                renderer,
                square.shrink(Spacing::all(side / 4.0)),
                self.alpha(element, self.accent),
            );
        }
        draw_text(renderer, element);
    }

    fn draw_editbox(&self, renderer: &mut dyn Renderer, element: &Element) {
        self.frame(renderer, element, element.draw_colour());
        let Some(edit) = element.as_edit_box() else {
            return;
        };
        let focused = element.has_state(StateFlags::FOCUSED);

        if let Some(selection) = edit.selection_rect() {
            fill(renderer, selection, self.alpha(element, self.selection));
        }
        if let (Some(text), Some(font), Some(colour)) = (
            element.text(),
            element.font_handle(),
            element.text_draw_colour(),
        ) {
            if !edit.display().is_empty() {
                renderer.set_draw_colour(colour);
                renderer.draw_text(font, edit.display(), text.position(), &[]);
            }
            if focused && edit.cursor_visible() {
                fill(renderer, edit.cursor_rect(), colour);
            }
        }
    }

    fn draw_label(&self, renderer: &mut dyn Renderer, element: &Element) {
        self.frame(renderer, element, element.draw_colour());
        draw_text(renderer, element);
    }

    fn draw_listbox(&self, renderer: &mut dyn Renderer, element: &Element) {
        self.frame(renderer, element, element.draw_colour());
        let (Some(list), Some(font), Some(colour)) = (
            element.as_list_box(),
            element.font_handle(),
            element.text_draw_colour(),
        ) else {
            return;
        };
        let padding = element.text().map(|text| text.padding()).unwrap_or_default();
        for item in list.items() {
            let Some(bounds) = item.bounds() else {
                continue;
            };
            if item.is_selected() {
                fill(renderer, bounds, self.alpha(element, self.selection));
            }
            renderer.set_draw_colour(colour);
            renderer.draw_text(
                font,
                item.text(),
                Point::new(bounds.x() + padding.left, bounds.y() + padding.top),
                item.tags(),
            );
        }
    }

    fn draw_memobox(&self, renderer: &mut dyn Renderer, element: &Element) {
        self.frame(renderer, element, element.draw_colour());
        let (Some(memo), Some(font), Some(colour)) = (
            element.as_memo_box(),
            element.font_handle(),
            element.text_draw_colour(),
        ) else {
            return;
        };
        for line in memo.visible_lines() {
            let Some(position) = line.position() else {
                continue;
            };
            renderer.set_draw_colour(colour);
            renderer.draw_text(font, line.text(), position, line.tags());
        }
    }

    fn draw_progressbar(&self, renderer: &mut dyn Renderer, element: &Element) {
        self.frame(renderer, element, element.draw_colour());
        if let Some(progress) = element.as_progress_bar() {
            let bounds = element.bounds().shrink(Spacing::all(2.0));
            let filled = Rect::from_xywh(
                bounds.x(),
                bounds.y(),
                bounds.width() * progress.fraction(),
                bounds.height(),
            );
            fill(renderer, filled, self.alpha(element, self.accent));
        }
        draw_text(renderer, element);
    }

    fn draw_scrollbar(&self, renderer: &mut dyn Renderer, element: &Element) {
        fill(renderer, element.bounds(), element.draw_colour());
        let Some(bar) = element.as_scrollbar() else {
            return;
        };
        let base = element.draw_colour().shade(0.1);
        let arrow = self.alpha(element, palette::TEXT);

        let parts = [
            (ScrollParts::BUTTON_BACK, bar.back_button_rect()),
            (ScrollParts::BUTTON_FORWARD, bar.forward_button_rect()),
            (ScrollParts::THUMB, bar.thumb_rect()),
        ];
        for (part, rect) in parts {
            let colour = if bar.pressed_parts().contains(part) {
                base.shade(self.press_shade)
            } else if bar.hovered_parts().contains(part) {
                base.shade(self.hover_shade)
            } else {
                base
            };
            fill(renderer, rect, colour);
            outline(renderer, rect, self.alpha(element, self.border));
        }

        let (back, forward) = if bar.is_horizontal() {
            (Arrow::Left, Arrow::Right)
        } else {
            (Arrow::Up, Arrow::Down)
        };
        self.arrow(renderer, bar.back_button_rect(), back, arrow);
        self.arrow(renderer, bar.forward_button_rect(), forward, arrow);
    }

    fn draw_sprite(&self, renderer: &mut dyn Renderer, element: &Element) {
        let Some(sprite) = element.as_sprite() else {
            return;
        };
        match sprite.texture() {
            Some(texture) => {
                renderer.set_draw_colour(element.draw_colour());
                renderer.draw_textured_rect(texture.handle(), element.bounds(), sprite.uv());
            }
            None => self.frame(renderer, element, element.draw_colour()),
        }
    }

    fn draw_window(&self, renderer: &mut dyn Renderer, element: &Element) {
        self.frame(renderer, element, element.draw_colour());
    }

    fn draw_window_titlebar(&self, renderer: &mut dyn Renderer, element: &Element) {
        fill(renderer, element.bounds(), self.face(element));
        draw_text(renderer, element);
    }

    fn draw_window_closebutton(&self, renderer: &mut dyn Renderer, element: &Element) {
        let bounds = element.bounds();
        fill(renderer, bounds, self.face(element));
        let cross = bounds.shrink(Spacing::all(bounds.width() / 4.0));
        let colour = self.alpha(element, palette::TEXT);
        renderer.set_draw_colour(colour);
        renderer.draw_triangle(
            cross.min_point(),
            Point::new(cross.max[0], cross.min[1]),
            Point::new((cross.min[0] + cross.max[0]) / 2.0, (cross.min[1] + cross.max[1]) / 2.0),
        );
        renderer.draw_triangle(
            Point::new(cross.min[0], cross.max[1]),
            cross.max_point(),
            Point::new((cross.min[0] + cross.max[0]) / 2.0, (cross.min[1] + cross.max[1]) / 2.0),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementDesc, ElementId};
    use crate::renderer::{DrawCommand, HeadlessProbe, HeadlessRenderer};
    use crate::GuiContext;

    fn context() -> GuiContext {
        GuiContext::new(HeadlessRenderer::new(), 640, 480)
    }

    /// Draw one element with a fresh renderer and return what it recorded
    fn draw(
        ctx: &GuiContext,
        id: ElementId,
        paint: fn(&SimpleSkin, &mut dyn Renderer, &Element),
    ) -> Vec<DrawCommand> {
        let mut renderer = HeadlessRenderer::new();
        let recorder: HeadlessProbe = renderer.probe();
        paint(&SimpleSkin::default(), &mut renderer, ctx.element(id).unwrap());
        recorder.commands()
    }

    /// Colour in effect when `rect` was first filled
    fn fill_colour(commands: &[DrawCommand], rect: Rect) -> Option<Color> {
        let mut colour = None;
        for command in commands {
            match command {
                DrawCommand::Colour(c) => colour = Some(*c),
                DrawCommand::Rect(r) if *r == rect => return colour,
                _ => {}
            }
        }
        None
    }

    fn count(commands: &[DrawCommand], pred: fn(&DrawCommand) -> bool) -> usize {
        commands.iter().filter(|c| pred(c)).count()
    }

    #[test]
    fn test_button_face_follows_hover() {
        let mut ctx = context();
        let button = ctx
            .create_button_ex(None, &ElementDesc::at(10.0, 10.0, 80.0, 24.0).with_text("ok"))
            .unwrap();
        let bounds = ctx.bounds(button).unwrap();
        let base = ctx.element(button).unwrap().draw_colour();

        let idle = draw(&ctx, button, SimpleSkin::draw_button);
        assert_eq!(fill_colour(&idle, bounds), Some(base));
        assert_eq!(count(&idle, |c| matches!(c, DrawCommand::Text { .. })), 1);

        ctx.mouse_move(Point::new(20.0, 20.0));
        let hovered = draw(&ctx, button, SimpleSkin::draw_button);
        let shade = SimpleSkin::default().hover_shade;
        assert_eq!(fill_colour(&hovered, bounds), Some(base.shade(shade)));
    }

    #[test]
    fn test_checkbox_mark_only_when_checked() {
        let mut ctx = context();
        let checkbox = ctx
            .create_checkbox_ex(None, &ElementDesc::at(0.0, 0.0, 16.0, 16.0))
            .unwrap();
        let rects = |c: &DrawCommand| matches!(c, DrawCommand::Rect(_));

        let unchecked = count(&draw(&ctx, checkbox, SimpleSkin::draw_checkbox), rects);
        ctx.set_checked(checkbox, true);
        let checked = count(&draw(&ctx, checkbox, SimpleSkin::draw_checkbox), rects);
        assert_eq!(checked, unchecked + 1);
    }

    #[test]
    fn test_editbox_draws_masked_display() {
        let mut ctx = context();
        let edit = ctx
            .create_edit_box_ex(None, &ElementDesc::at(0.0, 0.0, 150.0, 20.0).with_text("pw"))
            .unwrap();
        ctx.add_flags(edit, ElementFlags::MASK_INPUT);

        let commands = draw(&ctx, edit, SimpleSkin::draw_editbox);
        let texts: Vec<&str> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["**"]);
    }

    #[test]
    fn test_scrollbar_draws_both_arrows() {
        let mut ctx = context();
        let bar = ctx
            .create_scrollbar_ex(None, &ElementDesc::at(0.0, 0.0, 16.0, 100.0))
            .unwrap();
        let commands = draw(&ctx, bar, SimpleSkin::draw_scrollbar);
        assert_eq!(
            count(&commands, |c| matches!(c, DrawCommand::Triangle(_))),
            2
        );
    }

    #[test]
    fn test_transparent_element_draws_transparent_border() {
        let mut ctx = context();
        let label = ctx
            .create_label_ex(None, &ElementDesc::at(0.0, 0.0, 50.0, 20.0))
            .unwrap();
        ctx.add_flags(label, ElementFlags::BORDER);
        ctx.set_alpha(label, 0);

        let commands = draw(&ctx, label, SimpleSkin::draw_label);
        let colours: Vec<Color> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Colour(c) => Some(*c),
                _ => None,
            })
            .collect();
        assert!(!colours.is_empty());
        assert!(colours.iter().all(|c| c.a == 0.0));
    }
}
