//! Element values: host tags, component invocations, and text.

use std::fmt;
use std::rc::Rc;

use super::component::ComponentRef;
use super::props::{PropValue, Props};
use crate::host::{Event, EventHandler};
use crate::identity::Key;

/// Tag of the host node that wraps multi-element component output.
pub const FRAGMENT_TAG: &str = "synact-fragment";

/// Path name used for text elements.
pub const TEXT_NAME: &str = "#text";

/// Path name used for empty elements.
pub const EMPTY_NAME: &str = "#empty";

/// Immutable description of one node to render.
///
/// Cloning is cheap; the payloads are shared.
#[derive(Clone)]
pub enum Element {
    Host(Rc<HostElement>),
    Component(Rc<ComponentElement>),
    Text(Rc<str>),
    /// Renders as an empty text node.
    Empty,
}

impl Element {
    pub fn text(text: impl AsRef<str>) -> Self {
        Element::Text(Rc::from(text.as_ref()))
    }

    /// Name used in identity paths.
    pub fn name(&self) -> &str {
        match self {
            Element::Host(h) => &h.tag,
            Element::Component(c) => c.component.name(),
            Element::Text(_) => TEXT_NAME,
            Element::Empty => EMPTY_NAME,
        }
    }

    /// Explicit identity key, if any.
    pub fn key(&self) -> Option<&Key> {
        match self {
            Element::Host(h) => h.key.as_ref(),
            Element::Component(c) => c.key.as_ref(),
            Element::Text(_) | Element::Empty => None,
        }
    }

    /// Whether the patcher may update `other` in place to become `self`.
    ///
    /// Only kind and tag / component identity matter; props and children do not.
    /// Text elements only match text with identical content.
    pub fn same_type(&self, other: &Element) -> bool {
        match (self, other) {
            (Element::Host(a), Element::Host(b)) => a.tag == b.tag,
            (Element::Component(a), Element::Component(b)) => {
                a.component.id() == b.component.id()
            }
            (Element::Text(a), Element::Text(b)) => a == b,
            (Element::Empty, Element::Empty) => true,
            _ => false,
        }
    }

    pub fn as_host(&self) -> Option<&HostElement> {
        match self {
            Element::Host(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_component(&self) -> Option<&ComponentElement> {
        match self {
            Element::Component(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Element::Text(t) => Some(t),
            _ => None,
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Host(h) => h.fmt(f),
            Element::Component(c) => c.fmt(f),
            Element::Text(t) => write!(f, "Text({t:?})"),
            Element::Empty => f.write_str("Empty"),
        }
    }
}

// ---------------------------------------------------------------------------
// HostElement
// ---------------------------------------------------------------------------

/// A host tag with props and children.
#[derive(Clone, Debug)]
pub struct HostElement {
    pub tag: Rc<str>,
    pub props: Props,
    pub children: Vec<Element>,
    pub key: Option<Key>,
}

/// Start building a host element.
pub fn h(tag: impl AsRef<str>) -> HostElement {
    HostElement::new(tag)
}

/// Wrap several elements in a single fragment host node.
pub fn fragment<C: IntoChildren>(children: impl IntoIterator<Item = C>) -> HostElement {
    HostElement::new(FRAGMENT_TAG).children(children)
}

impl HostElement {
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self {
            tag: Rc::from(tag.as_ref()),
            props: Props::new(),
            children: Vec::new(),
            key: None,
        }
    }

    /// Set a prop (builder). The `key` prop sets the identity key instead.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        let name = name.into();
        let value = value.into();
        if name == "key" {
            self.key = value.as_attribute().map(Key::explicit);
        } else {
            self.props.set(name, value);
        }
        self
    }

    /// Attach an event handler (builder): `on("click", ..)` sets `onClick`.
    pub fn on(self, event: &str, handler: impl Fn(&Event) + 'static) -> Self {
        let mut name = String::from(super::props::EVENT_PREFIX);
        let mut chars = event.chars();
        if let Some(first) = chars.next() {
            name.extend(first.to_uppercase());
            name.push_str(chars.as_str());
        }
        self.attr(name, EventHandler::new(handler))
    }

    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Append one child or a flattened sequence of children (builder).
    pub fn child(mut self, child: impl IntoChildren) -> Self {
        child.extend_into(&mut self.children);
        self
    }

    /// Append children, flattening nested sequences one level (builder).
    pub fn children<C: IntoChildren>(mut self, children: impl IntoIterator<Item = C>) -> Self {
        for child in children {
            child.extend_into(&mut self.children);
        }
        self
    }
}

impl From<HostElement> for Element {
    fn from(value: HostElement) -> Self {
        Element::Host(Rc::new(value))
    }
}

// ---------------------------------------------------------------------------
// ComponentElement
// ---------------------------------------------------------------------------

/// A component invocation: function reference plus props.
#[derive(Clone)]
pub struct ComponentElement {
    pub component: ComponentRef,
    pub props: Props,
    pub key: Option<Key>,
}

/// Start building a component invocation.
pub fn component<F, R>(f: F) -> ComponentElement
where
    F: Fn(&Props) -> R + 'static,
    R: IntoElement + 'static,
{
    ComponentElement::new(ComponentRef::new(f))
}

impl ComponentElement {
    pub fn new(component: ComponentRef) -> Self {
        Self {
            component,
            props: Props::new(),
            key: None,
        }
    }

    /// Set a prop (builder). The `key` prop sets the identity key instead.
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        let name = name.into();
        let value = value.into();
        if name == "key" {
            self.key = value.as_attribute().map(Key::explicit);
        } else {
            self.props.set(name, value);
        }
        self
    }

    pub fn props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }

    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Pass children through props (builder).
    pub fn child(mut self, child: impl IntoChildren) -> Self {
        child.extend_into(self.props.children_mut());
        self
    }

    pub fn children<C: IntoChildren>(mut self, children: impl IntoIterator<Item = C>) -> Self {
        for child in children {
            child.extend_into(self.props.children_mut());
        }
        self
    }

    /// Invoke the component function.
    pub fn render(&self) -> Element {
        self.component.call(&self.props)
    }
}

impl fmt::Debug for ComponentElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentElement")
            .field("component", &self.component.name())
            .field("props", &self.props)
            .field("key", &self.key)
            .finish()
    }
}

impl From<ComponentElement> for Element {
    fn from(value: ComponentElement) -> Self {
        Element::Component(Rc::new(value))
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Anything a component function may return.
pub trait IntoElement {
    fn into_element(self) -> Element;
}

/// Anything accepted as a child argument; sequences flatten one level.
pub trait IntoChildren {
    fn extend_into(self, out: &mut Vec<Element>);
}

impl IntoElement for Element {
    fn into_element(self) -> Element {
        self
    }
}

impl IntoElement for HostElement {
    fn into_element(self) -> Element {
        self.into()
    }
}

impl IntoElement for ComponentElement {
    fn into_element(self) -> Element {
        self.into()
    }
}

impl IntoElement for &str {
    fn into_element(self) -> Element {
        Element::text(self)
    }
}

impl IntoElement for String {
    fn into_element(self) -> Element {
        Element::text(self)
    }
}

impl IntoElement for bool {
    fn into_element(self) -> Element {
        Element::Empty
    }
}

impl IntoElement for () {
    fn into_element(self) -> Element {
        Element::Empty
    }
}

impl<T: IntoElement> IntoElement for Option<T> {
    fn into_element(self) -> Element {
        self.map_or(Element::Empty, IntoElement::into_element)
    }
}

impl<T: IntoElement> IntoElement for Vec<T> {
    fn into_element(self) -> Element {
        let mut items: Vec<Element> = self.into_iter().map(IntoElement::into_element).collect();
        match items.len() {
            0 => Element::Empty,
            1 => items.remove(0),
            _ => fragment(items).into(),
        }
    }
}

macro_rules! element_from_display {
    ($($t:ty),*) => {
        $(impl IntoElement for $t {
            fn into_element(self) -> Element {
                Element::text(self.to_string())
            }
        }

        impl IntoChildren for $t {
            fn extend_into(self, out: &mut Vec<Element>) {
                out.push(self.into_element());
            }
        })*
    };
}

element_from_display!(i32, i64, u32, u64, usize, f64);

macro_rules! single_child {
    ($($t:ty),*) => {
        $(impl IntoChildren for $t {
            fn extend_into(self, out: &mut Vec<Element>) {
                out.push(self.into_element());
            }
        })*
    };
}

single_child!(Element, HostElement, ComponentElement, &str, String, bool);

impl<T: IntoElement> IntoChildren for Option<T> {
    fn extend_into(self, out: &mut Vec<Element>) {
        out.push(self.into_element());
    }
}

impl<T: IntoElement> IntoChildren for Vec<T> {
    fn extend_into(self, out: &mut Vec<Element>) {
        out.extend(self.into_iter().map(IntoElement::into_element));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(_: &Props) -> Element {
        Element::text("label")
    }

    fn other(_: &Props) -> Element {
        Element::Empty
    }

    #[test]
    fn host_builder_collects_props_and_children() {
        let el: Element = h("div")
            .attr("id", "main")
            .child("hello")
            .child(h("span"))
            .into();
        let host = el.as_host().unwrap();
        assert_eq!(&*host.tag, "div");
        assert_eq!(host.props.get_str("id"), Some("main"));
        assert_eq!(host.children.len(), 2);
        assert_eq!(host.children[0].as_text(), Some("hello"));
    }

    #[test]
    fn key_prop_becomes_identity_key() {
        let el: Element = h("li").attr("key", 7).into();
        assert_eq!(el.key(), Some(&Key::explicit("7")));
        assert!(!el.as_host().unwrap().props.contains("key"));
    }

    #[test]
    fn on_builds_handler_prop() {
        let el = h("button").on("click", |_| {});
        assert!(el.props.get_handler("onClick").is_some());
    }

    #[test]
    fn children_flatten_one_level() {
        let nested = vec![vec![Element::text("a"), Element::text("b")], vec![Element::text("c")]];
        let el = h("ul").children(nested);
        let texts: Vec<_> = el.children.iter().filter_map(Element::as_text).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn booleans_and_none_render_empty() {
        let el = h("div").child(false).child(None::<Element>).child(3);
        assert!(matches!(el.children[0], Element::Empty));
        assert!(matches!(el.children[1], Element::Empty));
        assert_eq!(el.children[2].as_text(), Some("3"));
    }

    #[test]
    fn same_type_ignores_props_and_children() {
        let a: Element = h("div").attr("x", 1).child("a").into();
        let b: Element = h("div").attr("x", 2).into();
        let c: Element = h("span").into();
        assert!(a.same_type(&b));
        assert!(!a.same_type(&c));
        assert!(!a.same_type(&Element::text("div")));
    }

    #[test]
    fn same_type_compares_component_identity() {
        let a: Element = component(label).into();
        let b: Element = component(label).prop("x", 1).into();
        let c: Element = component(other).into();
        assert!(a.same_type(&b));
        assert!(!a.same_type(&c));
        assert_eq!(a.name(), "label");
    }

    #[test]
    fn vec_output_normalisation() {
        assert!(matches!(Vec::<Element>::new().into_element(), Element::Empty));
        let single = vec![Element::text("x")].into_element();
        assert_eq!(single.as_text(), Some("x"));
        let many = vec![Element::text("x"), Element::text("y")].into_element();
        assert_eq!(many.name(), FRAGMENT_TAG);
    }
}
