//! In-memory element tree the compiler walks.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::RtResult;

/// Event handler attached to an element. Receives the element it fired on.
pub type Handler = Rc<dyn Fn(&Element) -> RtResult<()>>;

#[derive(Default)]
struct ElementData {
    tag: String,
    attributes: Vec<(String, String)>,
    text: String,
    value: String,
    children: Vec<Element>,
    on_keyup: Option<Handler>,
    on_click: Option<Handler>,
}

/// Shared handle to a markup element.
///
/// Attributes keep their declaration order, which is the order directives
/// are linked in.
///
/// # Examples
///
/// ```rust
/// use nglite::Element;
///
/// let input = Element::new("input").with_attribute("ngl-model", "name");
/// let form = Element::new("form").with_child(input.clone());
///
/// assert_eq!(form.children().len(), 1);
/// assert_eq!(input.attribute("ngl-model").as_deref(), Some("name"));
/// ```
#[derive(Clone)]
pub struct Element {
    inner: Rc<RefCell<ElementData>>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ElementData {
                tag: tag.into(),
                ..ElementData::default()
            })),
        }
    }

    pub fn with_attribute(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_child(self, child: Element) -> Self {
        self.append_child(child);
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    pub fn tag(&self) -> String {
        self.inner.borrow().tag.clone()
    }

    /// Attributes in declaration order.
    pub fn attributes(&self) -> Vec<(String, String)> {
        self.inner.borrow().attributes.clone()
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.inner
            .borrow()
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    /// Sets an attribute, replacing an existing one in place.
    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        let (name, value) = (name.into(), value.into());
        let mut data = self.inner.borrow_mut();
        match data.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = value,
            None => data.attributes.push((name, value)),
        }
    }

    pub fn children(&self) -> Vec<Element> {
        self.inner.borrow().children.clone()
    }

    pub fn append_child(&self, child: Element) {
        self.inner.borrow_mut().children.push(child);
    }

    pub fn text(&self) -> String {
        self.inner.borrow().text.clone()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        self.inner.borrow_mut().text = text.into();
    }

    /// Current value of a form control.
    pub fn value(&self) -> String {
        self.inner.borrow().value.clone()
    }

    pub fn set_value(&self, value: impl Into<String>) {
        self.inner.borrow_mut().value = value.into();
    }

    pub fn set_on_keyup<F>(&self, handler: F)
    where
        F: Fn(&Element) -> RtResult<()> + 'static,
    {
        self.inner.borrow_mut().on_keyup = Some(Rc::new(handler));
    }

    pub fn set_on_click<F>(&self, handler: F)
    where
        F: Fn(&Element) -> RtResult<()> + 'static,
    {
        self.inner.borrow_mut().on_click = Some(Rc::new(handler));
    }

    /// Fires the keyup handler, if any.
    pub fn keyup(&self) -> RtResult<()> {
        let handler = self.inner.borrow().on_keyup.clone();
        self.fire(handler)
    }

    /// Fires the click handler, if any.
    pub fn click(&self) -> RtResult<()> {
        let handler = self.inner.borrow().on_click.clone();
        self.fire(handler)
    }

    /// Sets the value then fires keyup, like a user typing into the control.
    pub fn type_text(&self, value: impl Into<String>) -> RtResult<()> {
        self.set_value(value);
        self.keyup()
    }

    fn fire(&self, handler: Option<Handler>) -> RtResult<()> {
        match handler {
            Some(handler) => handler(self),
            None => Ok(()),
        }
    }

    pub fn ptr_eq(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.inner.borrow();
        f.debug_struct("Element")
            .field("tag", &data.tag)
            .field("attributes", &data.attributes)
            .field("text", &data.text)
            .field("value", &data.value)
            .field("children", &data.children)
            .finish()
    }
}
