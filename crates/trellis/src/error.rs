use crate::element::ElementId;
use std::fmt;

/// Errors from element construction and explicit topology changes.
///
/// Ordinary property setters never fail; they ignore stale handles instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuiError {
    /// The parent handle does not refer to a live element
    InvalidParent(ElementId),
    /// The handle does not refer to a live element
    InvalidElement(ElementId),
    /// The element arena reached `GuiConfig::max_elements`
    CapacityExceeded { limit: usize },
    /// The child already belongs to another container
    ChildAlreadyParented(ElementId),
    /// Attaching would make an element its own ancestor
    CycleDetected(ElementId),
}

impl fmt::Display for GuiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuiError::InvalidParent(id) => write!(f, "parent {id:?} is not a live element"),
            GuiError::InvalidElement(id) => write!(f, "{id:?} is not a live element"),
            GuiError::CapacityExceeded { limit } => {
                write!(f, "element limit of {limit} reached")
            }
            GuiError::ChildAlreadyParented(id) => {
                write!(f, "element {id:?} already has a parent")
            }
            GuiError::CycleDetected(id) => {
                write!(f, "attaching {id:?} would create a cycle")
            }
        }
    }
}

impl std::error::Error for GuiError {}
