//! Browser implementation of the engine's document interface
//!
//! Queries go straight to the native selector engine with the fingerprint's
//! source text. Calls that throw are logged and degrade to "nothing found" or
//! "nothing written", which the next pass retries.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CssStyleDeclaration, Document, Element, HtmlElement};

use unveil_core::{Dom, SelectorList, StyleDecl};

use crate::error::HostError;

fn absorb<T>(op: &'static str, result: Result<T, JsValue>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(error = %HostError::js(op, err), "DOM call failed");
            None
        }
    }
}

/// The live page document
#[derive(Debug, Clone)]
pub struct WebDom {
    document: Document,
}

impl WebDom {
    pub fn from_window() -> Result<Self, HostError> {
        let window = web_sys::window().ok_or(HostError::NoWindow)?;
        let document = window.document().ok_or(HostError::NoDocument)?;
        Ok(Self { document })
    }

    /// Inline style block of HTML elements; SVG and friends have none we touch
    fn inline_style(element: &Element) -> Option<CssStyleDeclaration> {
        element.dyn_ref::<HtmlElement>().map(HtmlElement::style)
    }
}

impl Dom for WebDom {
    type Element = Element;

    fn head(&self) -> Option<Element> {
        self.document.head().map(Element::from)
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn create_element(&self, tag: &str) -> Option<Element> {
        absorb("createElement", self.document.create_element(tag))
    }

    fn set_id(&self, element: &Element, id: &str) {
        element.set_id(id);
    }

    fn set_text(&self, element: &Element, text: &str) {
        element.set_text_content(Some(text));
    }

    fn append_child(&self, parent: &Element, child: &Element) {
        absorb("appendChild", parent.append_child(child));
    }

    fn query_all(&self, selector: &SelectorList) -> Vec<Element> {
        let Some(list) = absorb("querySelectorAll", self.document.query_selector_all(selector.as_str())) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn query_within(&self, root: &Element, selector: &SelectorList) -> Option<Element> {
        absorb("querySelector", root.query_selector(selector.as_str())).flatten()
    }

    fn closest(&self, element: &Element, selector: &SelectorList) -> Option<Element> {
        absorb("closest", element.closest(selector.as_str())).flatten()
    }

    fn style_value(&self, element: &Element, property: &str) -> Option<StyleDecl> {
        let style = Self::inline_style(element)?;
        let value = style.get_property_value(property).ok()?;
        if value.is_empty() {
            return None;
        }
        let important = style.get_property_priority(property) == "important";
        Some(StyleDecl { value, important })
    }

    fn set_style_important(&self, element: &Element, property: &str, value: &str) {
        if let Some(style) = Self::inline_style(element) {
            absorb("setProperty", style.set_property_with_priority(property, value, "important"));
        }
    }

    fn has_class(&self, element: &Element, class: &str) -> bool {
        element.class_list().contains(class)
    }

    fn add_class(&self, element: &Element, class: &str) {
        absorb("classList.add", element.class_list().add_1(class));
    }

    fn remove_class(&self, element: &Element, class: &str) {
        absorb("classList.remove", element.class_list().remove_1(class));
    }

    fn is_connected(&self, element: &Element) -> bool {
        element.is_connected()
    }
}
