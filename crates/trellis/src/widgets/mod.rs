//! Built-in widget kinds
//!
//! Each module holds the kind's static capability table, its
//! `create_<kind>` / `create_<kind>_ex` constructors and any kind-specific API
//! on [`GuiContext`].

pub mod button;
pub mod canvas;
pub mod checkbox;
pub mod edit_box;
pub mod label;
pub mod list_box;
pub mod memo_box;
pub mod progress_bar;
pub mod scrollbar;
pub mod sprite;
pub mod window;

use crate::color::Color;
use crate::element::ElementId;
use crate::flags::ElementFlags;
use crate::primitives::{Rect, Size};
use crate::text::TextAlign;
use crate::GuiContext;

/// Kind defaults written over a freshly allocated element
pub(crate) struct Defaults {
    pub flags: ElementFlags,
    pub colour: Color,
    pub size: Size,
    pub align: Option<TextAlign>,
}

impl GuiContext {
    /// Apply kind defaults without going through the change callbacks
    pub(crate) fn init_element(&mut self, id: ElementId, defaults: Defaults) {
        let Some(element) = self.elements.get_mut(id) else {
            return;
        };
        element.flags = defaults.flags;
        element.colour = defaults.colour;
        element.local = Rect::from_min_size(
            element.local.min,
            [defaults.size.width, defaults.size.height],
        );
        if let (Some(text), Some(align)) = (element.text.as_mut(), defaults.align) {
            text.set_align(align);
        }
        self.update_bounds(id);
    }
}
