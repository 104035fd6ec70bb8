//! Pilot: programmatic interaction with a headless runtime.
//!
//! The `Pilot` owns a [`Runtime`] over the in-memory [`Dom`] with one mounted
//! container, and provides methods to simulate events, flush the scheduler,
//! and read the rendered markup back.

use crate::dom::{Dom, NodeId};
use crate::element::{IntoElement, Props};
use crate::error::{Diagnostic, Result};
use crate::host::{Event, Host};
use crate::identity::IdentityPath;
use crate::runtime::{MountHandle, Runtime, RuntimeConfig};

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless runtime driver for testing.
///
/// # Examples
///
/// ```
/// use synact::hooks::use_state;
/// use synact::prelude::*;
/// use synact::testing::Pilot;
///
/// let mut pilot = Pilot::mount(|_: &Props| {
///     let (count, set_count) = use_state(0);
///     h("button")
///         .on("click", move |_| set_count.update(|n| *n += 1))
///         .child(count)
/// })
/// .unwrap();
/// pilot.click("button").unwrap();
/// assert_eq!(pilot.html(), "<button>1</button>");
/// ```
pub struct Pilot {
    runtime: Runtime<Dom>,
    container: NodeId,
    handle: MountHandle<NodeId>,
}

impl Pilot {
    /// Mount component `f` into a fresh `<main>` container.
    pub fn mount<F, R>(f: F) -> Result<Self>
    where
        F: Fn(&Props) -> R + 'static,
        R: IntoElement + 'static,
    {
        Self::mount_with_config(f, RuntimeConfig::default())
    }

    /// Like [`Pilot::mount`] with an explicit runtime config.
    pub fn mount_with_config<F, R>(f: F, config: RuntimeConfig) -> Result<Self>
    where
        F: Fn(&Props) -> R + 'static,
        R: IntoElement + 'static,
    {
        let mut dom = Dom::new();
        let container = dom.create_node("main");
        let mut runtime = Runtime::with_config(dom, config);
        let handle = runtime.mount(f, &container)?;
        Ok(Self {
            runtime,
            container,
            handle,
        })
    }

    // ── Events ───────────────────────────────────────────────────────

    /// Click the first element with `tag`, then settle the scheduler.
    ///
    /// Returns whether a click handler ran.
    pub fn click(&mut self, tag: &str) -> Result<bool> {
        self.click_nth(tag, 0)
    }

    /// Click the `n`th element (document order) with `tag`, then settle.
    pub fn click_nth(&mut self, tag: &str, n: usize) -> Result<bool> {
        self.dispatch_nth(tag, n, Event::new("click"))
    }

    /// Send an `input` event carrying `value` to the first element with `tag`,
    /// then settle.
    pub fn input(&mut self, tag: &str, value: &str) -> Result<bool> {
        self.dispatch_nth(tag, 0, Event::new("input").with_value(value))
    }

    fn dispatch_nth(&mut self, tag: &str, n: usize, event: Event) -> Result<bool> {
        let target = self
            .runtime
            .host()
            .query_by_tag(self.container, tag)
            .get(n)
            .copied();
        let handled = match target {
            Some(node) => self.runtime.host().dispatch(node, &event),
            None => false,
        };
        self.settle()?;
        Ok(handled)
    }

    // ── Processing ───────────────────────────────────────────────────

    /// Flush the scheduler once.
    pub fn flush(&mut self) -> Result<usize> {
        self.runtime.flush()
    }

    /// Flush until no re-render is pending.
    pub fn settle(&mut self) -> Result<usize> {
        self.runtime.run_until_idle()
    }

    /// Force a full pass over the root.
    pub fn rerender(&mut self) -> Result<()> {
        self.runtime.rerender(&self.handle)
    }

    /// Mount a different root component into the same container.
    pub fn remount<F, R>(&mut self, f: F) -> Result<()>
    where
        F: Fn(&Props) -> R + 'static,
        R: IntoElement + 'static,
    {
        self.handle = self.runtime.mount(f, &self.container)?;
        Ok(())
    }

    /// Unmount the root, running every outstanding cleanup.
    pub fn unmount(&mut self) -> Result<()> {
        self.runtime.unmount(&self.container)
    }

    // ── Query ────────────────────────────────────────────────────────

    /// Markup inside the container.
    pub fn html(&self) -> String {
        self.runtime.host().inner_html(self.container)
    }

    /// Concatenated text inside the container.
    pub fn text(&self) -> String {
        self.runtime.host().text_content(self.container)
    }

    /// Nodes with `tag` inside the container, in document order.
    pub fn query(&self, tag: &str) -> Vec<NodeId> {
        self.runtime.host().query_by_tag(self.container, tag)
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn dom(&self) -> &Dom {
        self.runtime.host()
    }

    pub fn dom_mut(&mut self) -> &mut Dom {
        self.runtime.host_mut()
    }

    pub fn runtime(&self) -> &Runtime<Dom> {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut Runtime<Dom> {
        &mut self.runtime
    }

    pub fn is_alive(&self, path: &IdentityPath) -> bool {
        self.runtime.is_alive(path)
    }

    /// Live instance paths, rendered as strings.
    pub fn instance_paths(&self) -> Vec<String> {
        self.runtime
            .instance_paths()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.runtime.take_diagnostics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::h;
    use crate::hooks::use_state;

    fn toggle(_: &Props) -> crate::element::HostElement {
        let (on, set_on) = use_state(false);
        h("button")
            .on("click", move |_| set_on.update(|v| *v = !*v))
            .child(if on { "on" } else { "off" })
    }

    #[test]
    fn click_settles_and_rerenders() {
        let mut pilot = Pilot::mount(toggle).unwrap();
        assert_eq!(pilot.text(), "off");
        assert!(pilot.click("button").unwrap());
        assert_eq!(pilot.text(), "on");
        assert!(pilot.click("button").unwrap());
        assert_eq!(pilot.text(), "off");
    }

    #[test]
    fn click_on_missing_tag_is_noop() {
        let mut pilot = Pilot::mount(toggle).unwrap();
        assert!(!pilot.click("a").unwrap());
        assert_eq!(pilot.text(), "off");
    }

    #[test]
    fn input_event_carries_value() {
        let mut pilot = Pilot::mount(|_: &Props| {
            let (value, set_value) = use_state(String::new());
            h("div")
                .child(h("input").on("input", move |e| {
                    set_value.set(e.value.clone().unwrap_or_default())
                }))
                .child(h("p").child(value))
        })
        .unwrap();
        pilot.input("input", "hello").unwrap();
        assert_eq!(pilot.html(), "<div><input></input><p>hello</p></div>");
    }

    #[test]
    fn instance_paths_are_reported() {
        let pilot = Pilot::mount(toggle).unwrap();
        assert_eq!(pilot.instance_paths(), vec!["/Mount0/toggle:0"]);
    }

    #[test]
    fn unmount_empties_container() {
        let mut pilot = Pilot::mount(toggle).unwrap();
        pilot.unmount().unwrap();
        assert_eq!(pilot.html(), "");
        assert_eq!(pilot.runtime().instance_count(), 0);
    }
}
