//! Shared textures, deduplicated by path

use crate::renderer::{Renderer, RendererCaps, TextureHandle, TextureInfo};
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Texture {
    path: String,
    info: TextureInfo,
}

impl Texture {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn handle(&self) -> TextureHandle {
        self.info.handle
    }

    pub fn width(&self) -> u32 {
        self.info.width
    }

    pub fn height(&self) -> u32 {
        self.info.height
    }
}

#[derive(Debug, Default)]
pub struct TextureRegistry {
    textures: HashMap<String, Rc<Texture>>,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a shared texture for `path`, loading it on first use.
    ///
    /// Returns `None` when the renderer has no texture support or loading fails.
    pub fn acquire(&mut self, renderer: &mut dyn Renderer, path: &str) -> Option<Rc<Texture>> {
        if let Some(texture) = self.textures.get(path) {
            return Some(Rc::clone(texture));
        }
        if !renderer.capabilities().contains(RendererCaps::TEXTURES) {
            log::debug!("renderer has no texture support, skipping {path:?}");
            return None;
        }

        let Some(info) = renderer.load_texture(path) else {
            log::warn!("could not load texture {path:?}");
            return None;
        };
        log::debug!("loaded texture {path:?} ({}x{})", info.width, info.height);

        let texture = Rc::new(Texture {
            path: path.to_string(),
            info,
        });
        self.textures.insert(path.to_string(), Rc::clone(&texture));
        Some(texture)
    }

    /// Release every texture only the registry still holds; returns how many
    pub fn purge(&mut self, renderer: &mut dyn Renderer) -> usize {
        let before = self.textures.len();
        self.textures.retain(|path, texture| {
            if Rc::strong_count(texture) > 1 {
                return true;
            }
            log::debug!("released texture {path:?}");
            renderer.destroy_texture(texture.handle());
            false
        });
        before - self.textures.len()
    }

    pub fn clear(&mut self, renderer: &mut dyn Renderer) {
        for (_, texture) in self.textures.drain() {
            renderer.destroy_texture(texture.handle());
        }
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::HeadlessRenderer;

    #[test]
    fn test_requires_texture_capability() {
        let mut renderer = HeadlessRenderer::new();
        let mut registry = TextureRegistry::new();
        assert!(registry.acquire(&mut renderer, "a.png").is_none());
    }

    #[test]
    fn test_shared_by_path_and_purged() {
        let mut renderer = HeadlessRenderer::with_capabilities(RendererCaps::TEXTURES);
        let probe = renderer.probe();
        let mut registry = TextureRegistry::new();

        let a = registry.acquire(&mut renderer, "a.png").unwrap();
        let b = registry.acquire(&mut renderer, "a.png").unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(probe.loaded_textures(), 1);

        drop(a);
        assert_eq!(registry.purge(&mut renderer), 0);
        drop(b);
        assert_eq!(registry.purge(&mut renderer), 1);
        assert_eq!(probe.loaded_textures(), 0);
    }
}
