//! Snapshot rendering helpers.
//!
//! Functions for rendering components once into a throwaway [`Dom`] and
//! converting markup or mutation logs into plain strings suitable for
//! snapshot testing.

use std::fmt::Write as _;

use crate::dom::{Dom, Mutation, NodeId};
use crate::element::{IntoElement, Props};
use crate::error::Result;
use crate::host::Host;
use crate::runtime::Runtime;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Mount component `f`, settle its effects, and return the markup.
///
/// # Examples
///
/// ```
/// use synact::prelude::*;
/// use synact::testing::render_to_string;
///
/// let html = render_to_string(|_: &Props| h("p").attr("class", "greeting").child("hi")).unwrap();
/// assert_eq!(html, r#"<p class="greeting">hi</p>"#);
/// ```
pub fn render_to_string<F, R>(f: F) -> Result<String>
where
    F: Fn(&Props) -> R + 'static,
    R: IntoElement + 'static,
{
    render_element_to_string(crate::element::component(f))
}

/// Mount an arbitrary element, settle, and return the markup.
pub fn render_element_to_string(element: impl IntoElement) -> Result<String> {
    let mut dom = Dom::new();
    let container = dom.create_node("main");
    let mut runtime = Runtime::new(dom);
    runtime.mount_element(element, &container)?;
    runtime.run_until_idle()?;
    Ok(runtime.host().inner_html(container))
}

/// One line per mutation, with node ids replaced by their order of first
/// appearance (`n0`, `n1`, ...) so the output is stable across runs.
pub fn mutations_to_string(mutations: &[Mutation]) -> String {
    let mut names: Vec<NodeId> = Vec::new();
    let mut name = |node: NodeId| {
        let index = match names.iter().position(|n| *n == node) {
            Some(index) => index,
            None => {
                names.push(node);
                names.len() - 1
            }
        };
        format!("n{index}")
    };

    let mut out = String::new();
    for mutation in mutations {
        let _ = match mutation {
            Mutation::CreateNode { node, tag } => writeln!(out, "create {} <{tag}>", name(*node)),
            Mutation::CreateText { node, text } => {
                writeln!(out, "create {} {text:?}", name(*node))
            }
            Mutation::SetAttribute { node, key, value } => {
                writeln!(out, "set {} {key}={value:?}", name(*node))
            }
            Mutation::RemoveAttribute { node, key } => {
                writeln!(out, "unset {} {key}", name(*node))
            }
            Mutation::SetHandler {
                node,
                event,
                installed,
            } => {
                let verb = if *installed { "listen" } else { "unlisten" };
                writeln!(out, "{verb} {} {event}", name(*node))
            }
            Mutation::AppendChild { parent, child } => {
                let parent = name(*parent);
                writeln!(out, "append {parent} {}", name(*child))
            }
            Mutation::ReplaceChild { parent, old, new } => {
                let parent = name(*parent);
                let old = name(*old);
                writeln!(out, "replace {parent} {old} -> {}", name(*new))
            }
            Mutation::RemoveChild { parent, child } => {
                let parent = name(*parent);
                writeln!(out, "remove {parent} {}", name(*child))
            }
        };
    }
    out.trim_end().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{h, Element};

    #[test]
    fn renders_component_markup() {
        let html = render_to_string(|_: &Props| h("ul").children([1, 2].map(|n| h("li").child(n))))
            .unwrap();
        insta::assert_snapshot!(html, @"<ul><li>1</li><li>2</li></ul>");
    }

    #[test]
    fn renders_plain_element() {
        let html = render_element_to_string(Element::text("just text")).unwrap();
        assert_eq!(html, "just text");
    }

    #[test]
    fn mutation_names_are_stable() {
        let mut dom = Dom::new();
        let root = dom.create_node("main");
        let p = dom.create_node("p");
        let text = dom.create_text_node("hi");
        dom.append_child(&p, &text);
        dom.append_child(&root, &p);
        dom.set_attribute(&p, "id", "x");
        insta::assert_snapshot!(mutations_to_string(&dom.take_mutations()), @r#"
        create n0 <main>
        create n1 <p>
        create n2 "hi"
        append n1 n2
        append n0 n1
        set n1 id="x"
        "#);
    }
}
