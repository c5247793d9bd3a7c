//! Document host abstraction
//!
//! The engine never talks to a browser directly. Everything it needs from a
//! document goes through [`Dom`]: the WASM userscript implements it on top of
//! `web-sys`, and [`MemoryDom`] implements it in memory for tests and headless use.
//!
//! All methods take `&self`: a live document is shared mutable state by nature,
//! and hosts provide their own interior mutability.

mod memory;


pub use memory::{MemoryDom, MemoryMutation, NodeId};

use std::fmt;

use crate::selector::SelectorList;

/// One inline style declaration as read back from an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleDecl {
    pub value: String,
    pub important: bool,
}

impl StyleDecl {
    pub fn important(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            important: true,
        }
    }

    pub fn normal(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            important: false,
        }
    }
}

/// Operations the engine performs on a live document.
///
/// Failures are absorbed by the host: a query that cannot run returns no
/// elements, a write that cannot run is skipped.
pub trait Dom {
    /// Element handle. Equality is element identity.
    type Element: Clone + PartialEq + fmt::Debug;

    fn head(&self) -> Option<Self::Element>;

    fn body(&self) -> Option<Self::Element>;

    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    /// Create a detached element
    fn create_element(&self, tag: &str) -> Option<Self::Element>;

    fn set_id(&self, element: &Self::Element, id: &str);

    fn set_text(&self, element: &Self::Element, text: &str);

    fn append_child(&self, parent: &Self::Element, child: &Self::Element);

    /// Every connected element matching `selector`, in document order
    fn query_all(&self, selector: &SelectorList) -> Vec<Self::Element>;

    /// First descendant of `root` matching `selector`
    fn query_within(&self, root: &Self::Element, selector: &SelectorList) -> Option<Self::Element>;

    /// Nearest inclusive ancestor matching `selector`
    fn closest(&self, element: &Self::Element, selector: &SelectorList) -> Option<Self::Element>;

    fn style_value(&self, element: &Self::Element, property: &str) -> Option<StyleDecl>;

    /// Write an inline declaration with `!important` priority
    fn set_style_important(&self, element: &Self::Element, property: &str, value: &str);

    fn has_class(&self, element: &Self::Element, class: &str) -> bool;

    fn add_class(&self, element: &Self::Element, class: &str);

    fn remove_class(&self, element: &Self::Element, class: &str);

    /// Whether the element is still attached to the document
    fn is_connected(&self, element: &Self::Element) -> bool;
}

/// Force `!important` inline declarations onto `element`.
///
/// Declarations already present with the same value and priority are left
/// untouched, so repeated calls cause no further mutations. Returns the number
/// of declarations written.
pub fn enforce_important<D: Dom>(dom: &D, element: &D::Element, styles: &[(&str, &str)]) -> usize {
    let mut written = 0;
    for &(property, value) in styles {
        let current = dom.style_value(element, property);
        if current.is_some_and(|decl| decl.important && decl.value == value) {
            continue;
        }
        dom.set_style_important(element, property, value);
        written += 1;
    }
    written
}

/// Add or remove `class` so that its presence equals `present`.
/// Returns true when the class list changed.
pub fn toggle_class<D: Dom>(dom: &D, element: &D::Element, class: &str, present: bool) -> bool {
    if dom.has_class(element, class) == present {
        return false;
    }
    if present {
        dom.add_class(element, class);
    } else {
        dom.remove_class(element, class);
    }
    true
}
