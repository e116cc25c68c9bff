//! Sprite: a textured rect
//!
//! Textures come from the context's registry, so sprites showing the same
//! image share one backend texture. Without renderer texture support a sprite
//! falls back to its plain background.

use crate::color::Color;
use crate::element::{Capabilities, Element, ElementDesc, ElementId, ElementKind, WidgetData};
use crate::error::GuiError;
use crate::flags::ElementFlags;
use crate::primitives::Size;
use crate::render::Frame;
use crate::texture::Texture;
use crate::widgets::Defaults;
use crate::GuiContext;
use std::rc::Rc;

/// Whole texture
const FULL_UV: [f32; 4] = [0.0, 0.0, 1.0, 1.0];

#[derive(Debug, Clone)]
pub struct SpriteState {
    texture: Option<Rc<Texture>>,
    uv: [f32; 4],
}

impl Default for SpriteState {
    fn default() -> Self {
        Self {
            texture: None,
            uv: FULL_UV,
        }
    }
}

impl SpriteState {
    pub fn texture(&self) -> Option<&Texture> {
        self.texture.as_deref()
    }

    /// `[u0, v0, u1, v1]`
    pub fn uv(&self) -> [f32; 4] {
        self.uv
    }
}

static CAPS: Capabilities = Capabilities {
    render: Some(render),
    ..Capabilities::NONE
};

fn render(frame: &mut Frame<'_>, id: ElementId) {
    if let Some(element) = frame.element(id) {
        frame.skin.draw_sprite(frame.renderer, element);
    }
}

impl Element {
    pub fn as_sprite(&self) -> Option<&SpriteState> {
        match &self.data {
            WidgetData::Sprite(sprite) => Some(sprite),
            _ => None,
        }
    }
}

impl GuiContext {
    pub fn create_sprite(&mut self, parent: Option<ElementId>) -> Result<ElementId, GuiError> {
        let id = self.create_element(
            parent,
            ElementKind::Sprite,
            &CAPS,
            WidgetData::Sprite(SpriteState::default()),
            false,
        )?;
        self.init_element(
            id,
            Defaults {
                flags: ElementFlags::VISIBLE,
                colour: Color::default(),
                size: Size::zero(),
                align: None,
            },
        );
        Ok(id)
    }

    pub fn create_sprite_ex(
        &mut self,
        parent: Option<ElementId>,
        desc: &ElementDesc,
    ) -> Result<ElementId, GuiError> {
        let id = self.create_sprite(parent)?;
        self.apply_desc(id, desc);
        Ok(id)
    }

    /// Show the image at `path`; returns false if it could not be loaded.
    ///
    /// A sprite that has no size yet takes the texture's size.
    pub fn set_sprite_texture(&mut self, id: ElementId, path: &str) -> bool {
        if !matches!(self.kind(id), Some(ElementKind::Sprite)) {
            log::trace!("set_sprite_texture on non-sprite {id:?}");
            return false;
        }
        let Some(texture) = self.textures.acquire(self.renderer.as_mut(), path) else {
            return false;
        };
        let (width, height) = (texture.width() as f32, texture.height() as f32);

        let Some(element) = self.elements.get_mut(id) else {
            return false;
        };
        let needs_size = element.local.width() == 0.0 && element.local.height() == 0.0;
        if let WidgetData::Sprite(sprite) = &mut element.data {
            sprite.texture = Some(texture);
        }
        if needs_size {
            self.set_size(id, width, height);
        }
        self.invalidate(id);
        true
    }

    /// Drop the texture; the registry frees it once no sprite uses it
    pub fn clear_sprite_texture(&mut self, id: ElementId) {
        if let Some(WidgetData::Sprite(sprite)) = self.elements.get_mut(id).map(|e| &mut e.data) {
            sprite.texture = None;
            self.invalidate(id);
        }
    }

    /// Sub-rect of the texture to show, `[u0, v0, u1, v1]` in `0..=1`
    pub fn set_sprite_uv(&mut self, id: ElementId, uv: [f32; 4]) {
        if let Some(WidgetData::Sprite(sprite)) = self.elements.get_mut(id).map(|e| &mut e.data) {
            sprite.uv = uv.map(|c| c.clamp(0.0, 1.0));
            self.invalidate(id);
        }
    }
}
