//! DOM queries, serialisation, and event dispatch.

use std::fmt::Write as _;

use super::node::{NodeData, NodeId, NodeKind};
use super::tree::Dom;
use crate::host::Event;

impl Dom {
    /// All nodes under `start` (inclusive) with the given tag, in document order.
    pub fn query_by_tag(&self, start: NodeId, tag: &str) -> Vec<NodeId> {
        self.query_all(start, |data| data.tag() == Some(tag))
    }

    /// All nodes under `start` (inclusive) carrying `class`, in document order.
    pub fn query_by_class(&self, start: NodeId, class: &str) -> Vec<NodeId> {
        self.query_all(start, |data| data.has_class(class))
    }

    /// First node under `start` whose `id` attribute matches.
    pub fn query_by_id(&self, start: NodeId, id: &str) -> Option<NodeId> {
        self.query_all(start, |data| data.attribute("id") == Some(id))
            .into_iter()
            .next()
    }

    /// All nodes under `start` (inclusive) matching a predicate, in document order.
    pub fn query_all(&self, start: NodeId, predicate: impl Fn(&NodeData) -> bool) -> Vec<NodeId> {
        self.walk_depth_first(start)
            .into_iter()
            .filter(|&id| self.get(id).is_some_and(&predicate))
            .collect()
    }

    /// Concatenated text of every text node under `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        self.walk_depth_first(id)
            .into_iter()
            .filter_map(|node| self.get(node).and_then(NodeData::as_text))
            .collect()
    }

    /// Markup for the children of `id`.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_html(child, &mut out);
        }
        out
    }

    /// Markup for `id` itself and its subtree.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let Some(data) = self.get(id) else {
            return;
        };
        match &data.kind {
            NodeKind::Text(text) => out.push_str(&escape(text, false)),
            NodeKind::Element { tag } => {
                out.push('<');
                out.push_str(tag);
                for (key, value) in &data.attributes {
                    let _ = write!(out, " {key}=\"{}\"", escape(value, true));
                }
                out.push('>');
                for &child in self.children(id) {
                    self.write_html(child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }

    /// Invoke the handler `node` has installed for `event.name`.
    ///
    /// Returns whether a handler ran. Events do not bubble.
    pub fn dispatch(&self, node: NodeId, event: &Event) -> bool {
        let handler = self
            .get(node)
            .and_then(|data| data.handler(&event.name))
            .cloned();
        match handler {
            Some(handler) => {
                tracing::trace!(?node, event = %event.name, "dispatch event");
                handler.call(event);
                true
            }
            None => false,
        }
    }

    /// Dispatch a `click` event to `node`.
    pub fn click(&self, node: NodeId) -> bool {
        self.dispatch(node, &Event::new("click"))
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::dom::node::NodeData;
    use crate::dom::tree::Dom;
    use crate::host::{Event, EventHandler, Host};

    /// Build a test tree:
    /// ```text
    ///   main
    ///   ├── ul.list
    ///   │   ├── li#first "a"
    ///   │   └── li "b & c"
    ///   └── button.btn.primary "go"
    /// ```
    fn build_query_tree() -> (Dom, crate::dom::NodeId) {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::element("main"));
        let ul = dom.insert_child(root, NodeData::element("ul").with_attribute("class", "list"));
        let first = dom.insert_child(ul, NodeData::element("li").with_attribute("id", "first"));
        dom.insert_child(first, NodeData::text("a"));
        let second = dom.insert_child(ul, NodeData::element("li"));
        dom.insert_child(second, NodeData::text("b & c"));
        let button = dom.insert_child(
            root,
            NodeData::element("button").with_attribute("class", "btn primary"),
        );
        dom.insert_child(button, NodeData::text("go"));
        (dom, root)
    }

    #[test]
    fn query_by_tag_in_document_order() {
        let (dom, root) = build_query_tree();
        let items = dom.query_by_tag(root, "li");
        assert_eq!(items.len(), 2);
        assert_eq!(dom.text_content(items[0]), "a");
        assert_eq!(dom.text_content(items[1]), "b & c");
    }

    #[test]
    fn query_by_class_and_id() {
        let (dom, root) = build_query_tree();
        assert_eq!(dom.query_by_class(root, "primary").len(), 1);
        assert!(dom.query_by_class(root, "missing").is_empty());
        let first = dom.query_by_id(root, "first").unwrap();
        assert_eq!(dom.text_content(first), "a");
    }

    #[test]
    fn html_is_escaped_and_attribute_sorted() {
        let mut dom = Dom::new();
        let node = dom.create_node("a");
        dom.set_attribute(&node, "title", "say \"hi\"");
        dom.set_attribute(&node, "href", "/x?a=1&b=2");
        let text = dom.create_text_node("1 < 2");
        dom.append_child(&node, &text);
        assert_eq!(
            dom.outer_html(node),
            r#"<a href="/x?a=1&amp;b=2" title="say &quot;hi&quot;">1 &lt; 2</a>"#
        );
    }

    #[test]
    fn inner_html_of_tree() {
        let (dom, root) = build_query_tree();
        insta::assert_snapshot!(
            dom.inner_html(root),
            @r#"<ul class="list"><li id="first">a</li><li>b &amp; c</li></ul><button class="btn primary">go</button>"#
        );
    }

    #[test]
    fn dispatch_calls_installed_handler() {
        let (mut dom, root) = build_query_tree();
        let button = dom.query_by_tag(root, "button")[0];
        let clicks = Rc::new(Cell::new(0));
        let counter = clicks.clone();
        dom.set_event_handler(
            &button,
            "click",
            Some(EventHandler::new(move |_| counter.set(counter.get() + 1))),
        );
        assert!(dom.click(button));
        assert!(dom.click(button));
        assert!(!dom.dispatch(button, &Event::new("input")));
        assert!(!dom.click(root));
        assert_eq!(clicks.get(), 2);
    }
}
