//! Behavior and internal state flag sets for elements.

bitflags::bitflags! {
    /// Behavior flags controlled by application code.
    ///
    /// Combine with bitwise OR: `ElementFlags::VISIBLE | ElementFlags::BORDER`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ElementFlags: u32 {
        /// Element and its subtree are rendered and hit-testable
        const VISIBLE = 1 << 0;
        /// Draw a border
        const BORDER = 1 << 1;
        /// Draw a background fill
        const BACKGROUND = 1 << 2;
        /// Becomes the drag target when pressed
        const DRAGGABLE = 1 << 3;
        /// Children are clipped to the element's clip region
        const CLIP_CHILDREN = 1 << 4;
        /// Can be hit by mouse input
        const MOUSE_CONTROL = 1 << 5;
        /// Receives keyboard focus when clicked
        const KEYBOARD_CONTROL = 1 << 6;
        /// Disabled: never a hit-test result and never focused
        const INACTIVE = 1 << 7;
        /// Parse `[#rrggbb]`/`[uline]` markup out of the text
        const TEXT_FORMATTING = 1 << 8;
        /// Edit box shows a mask glyph instead of its characters
        const MASK_INPUT = 1 << 9;
        /// Window has a titlebar
        const TITLEBAR = 1 << 10;
        /// Window has a close button (requires TITLEBAR)
        const CLOSE_BUTTON = 1 << 11;
        /// List box allows more than one selected item
        const MULTI_SELECT = 1 << 12;
        /// Subtree is rendered through an offscreen render target when supported
        const CACHED = 1 << 13;
    }
}

bitflags::bitflags! {
    /// Internal state flags maintained by the context and input routing.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StateFlags: u32 {
        /// Cursor is over the element
        const HOVERED = 1 << 0;
        /// Mouse button went down on the element and has not been released
        const PRESSED = 1 << 1;
        /// Element owns keyboard focus
        const FOCUSED = 1 << 2;
        /// Element is a top-level layer
        const LAYER = 1 << 3;
        /// Element type carries no text object
        const NO_TEXT = 1 << 4;
        /// Window decoration, positioned against the parent's outer bounds
        const DECORATION = 1 << 5;
        /// Offscreen cache must be regenerated before the next main pass
        const CACHE_DIRTY = 1 << 6;
    }
}
