//! Shared fonts
//!
//! Fonts are deduplicated by their full description. Elements hold an
//! `Rc<Font>`; the registry holds one more. A font whose only remaining owner
//! is the registry gets released back to the renderer by [`FontRegistry::purge`].

use crate::renderer::{FontHandle, Renderer};
use std::collections::HashMap;
use std::rc::Rc;

bitflags::bitflags! {
    /// Font style flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FontFlags: u32 {
        const BOLD = 1 << 0;
        const ITALIC = 1 << 1;
        const UNDERLINE = 1 << 2;
        const STRIKEOUT = 1 << 3;
        const ANTIALIASED = 1 << 4;
    }
}

/// Everything that identifies a loaded font
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontDesc {
    pub name: String,
    /// Pixel height
    pub size: u32,
    pub flags: FontFlags,
    pub charset: u8,
    pub first_char: u32,
    pub last_char: u32,
}

impl FontDesc {
    pub fn new(name: impl Into<String>, size: u32) -> Self {
        Self {
            name: name.into(),
            size,
            flags: FontFlags::empty(),
            charset: 0,
            first_char: 32,
            last_char: 255,
        }
    }

    pub fn with_flags(mut self, flags: FontFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_range(mut self, first_char: u32, last_char: u32) -> Self {
        self.first_char = first_char;
        self.last_char = last_char;
        self
    }
}

impl Default for FontDesc {
    fn default() -> Self {
        Self::new("Tahoma", 11)
    }
}

/// A font loaded by the renderer
#[derive(Debug)]
pub struct Font {
    desc: FontDesc,
    handle: FontHandle,
}

impl Font {
    pub fn desc(&self) -> &FontDesc {
        &self.desc
    }

    pub fn handle(&self) -> FontHandle {
        self.handle
    }
}

#[derive(Debug, Default)]
pub struct FontRegistry {
    fonts: HashMap<FontDesc, Rc<Font>>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a shared font matching `desc`, loading it on first use
    pub fn acquire(&mut self, renderer: &mut dyn Renderer, desc: &FontDesc) -> Option<Rc<Font>> {
        if let Some(font) = self.fonts.get(desc) {
            return Some(Rc::clone(font));
        }

        let Some(handle) = renderer.load_font(desc) else {
            log::warn!("could not load font {:?} at {}px", desc.name, desc.size);
            return None;
        };
        log::debug!("loaded font {:?} at {}px", desc.name, desc.size);

        let font = Rc::new(Font {
            desc: desc.clone(),
            handle,
        });
        self.fonts.insert(desc.clone(), Rc::clone(&font));
        Some(font)
    }

    /// Drop a font the caller is done with, releasing it if nobody else holds it
    pub fn release(&mut self, renderer: &mut dyn Renderer, font: Rc<Font>) {
        let desc = font.desc.clone();
        drop(font);
        let unused = self
            .fonts
            .get(&desc)
            .is_some_and(|font| Rc::strong_count(font) == 1);
        if unused {
            if let Some(font) = self.fonts.remove(&desc) {
                log::debug!("released font {:?} at {}px", desc.name, desc.size);
                renderer.destroy_font(font.handle);
            }
        }
    }

    /// Release every font only the registry still holds; returns how many
    pub fn purge(&mut self, renderer: &mut dyn Renderer) -> usize {
        let before = self.fonts.len();
        self.fonts.retain(|desc, font| {
            if Rc::strong_count(font) > 1 {
                return true;
            }
            log::debug!("released font {:?} at {}px", desc.name, desc.size);
            renderer.destroy_font(font.handle);
            false
        });
        before - self.fonts.len()
    }

    /// Release every font regardless of outstanding references
    pub fn clear(&mut self, renderer: &mut dyn Renderer) {
        for (_, font) in self.fonts.drain() {
            renderer.destroy_font(font.handle);
        }
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}
