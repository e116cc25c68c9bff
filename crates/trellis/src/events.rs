//! Events synthesized by input routing and widgets
//!
//! An event is delivered synchronously to the target element's handler while
//! the input call that caused it is still running. The same record is also
//! appended to the context's event list, see
//! [`GuiContext::drain_events`](crate::GuiContext::drain_events).

use crate::element::ElementId;
use crate::input::MouseButton;
use crate::primitives::Point;

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    HoverEnter {
        position: Point,
    },
    HoverLeave {
        position: Point,
    },
    Click {
        button: MouseButton,
        position: Point,
    },
    Release {
        button: MouseButton,
        position: Point,
    },
    /// Element gained keyboard focus
    FocusEnter,
    /// Element lost keyboard focus
    FocusExit,
    /// Return was pressed in an edit box
    InputReturn,
    /// Scrollbar moved to `position`, `delta` is signed
    Scroll {
        position: f32,
        delta: f32,
    },
    CheckboxToggle {
        checked: bool,
    },
    /// The close button of a window was released over
    WindowClose,
    /// A list box item was selected or deselected
    ListSelect {
        index: usize,
        selected: bool,
    },
}

/// An event targeted at a specific element
#[derive(Debug, Clone, PartialEq)]
pub struct GuiEvent {
    pub element: ElementId,
    pub kind: EventKind,
}

/// Application callback attached to an element
pub type EventHandler = Box<dyn FnMut(&GuiEvent)>;
