//! # trellis
//!
//! Retained-mode widget toolkit core.
//!
//! Elements live in an arena owned by a [`GuiContext`] and form a tree whose
//! sibling order is the z-order. Widget behavior is dispatched through a static
//! [`Capabilities`] table per widget kind. Drawing goes through a pluggable
//! [`Renderer`] and [`Skin`]; platform glue lives in separate crates like
//! `trellis-winit`.
//!
//! ## Core Types
//!
//! - [`GuiContext`] - Owns every element, registry and input slot
//! - [`Element`] - One widget instance
//! - [`ElementId`] - Generational handle to an element
//!
//! ## Input & Events
//!
//! - [`InputRouter`] - Hover, press, drag and focus slots
//! - [`GuiEvent`] - An event targeted at a specific element
//!
//! ## Text
//!
//! - [`Text`] - Buffer, measured size and render origin of an element's text
//! - [`format`] - Inline colour and underline markup

mod clipboard;
mod color;
mod context;
mod element;
mod error;
mod events;
mod flags;
mod font;
pub mod format;
mod hit_test;
mod input;
mod primitives;
mod properties;
mod render;
mod renderer;
mod routing;
mod skin;
mod text;
mod texture;
mod tree;
pub mod widgets;

// Core types
pub use color::*;
pub use context::*;
pub use element::*;
pub use error::*;
pub use flags::*;
pub use primitives::*;
pub use render::*;

// Backends
pub use clipboard::*;
pub use renderer::*;
pub use skin::*;

// Text & resources
pub use font::*;
pub use format::{FormatTag, ParsedText, TagFlags};
pub use text::*;
pub use texture::*;

// Input & Events
pub use events::*;
pub use input::*;
pub use routing::*;

// Widgets
pub use widgets::canvas::CanvasState;
pub use widgets::checkbox::CheckboxState;
pub use widgets::edit_box::EditBoxState;
pub use widgets::list_box::{ListBoxState, ListItem};
pub use widgets::memo_box::{MemoBoxState, MemoLayout, MemoLine};
pub use widgets::progress_bar::ProgressBarState;
pub use widgets::scrollbar::{ScrollParts, ScrollbarState};
pub use widgets::sprite::SpriteState;
pub use widgets::window::WindowState;
