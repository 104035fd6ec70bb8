//! Reconciler: patch the retained host tree from a pair of element trees.
//!
//! One [`Reconciler`] lives for one render pass. It walks the new and previous
//! elements side by side, resolving component invocations to persistent
//! instances, and issues the minimal host mutations:
//!
//! 1. new absent → remove the host node
//! 2. previous absent → create a fresh host node
//! 3. different kind, tag, or component → create a fresh node and replace
//! 4. same component → re-render the instance and patch its output against the
//!    instance's previous output
//! 5. same host tag → update changed props, then pair children by index
//!
//! Instances left behind by steps 1 and 3 are disposed, cleanups included,
//! before anything renders in their place. The pass also records every
//! instance it reaches, and the runtime sweeps whatever else is left in the
//! pass's subtree before any effect runs.

use std::collections::HashSet;

use crate::element::{event_name, ComponentElement, Element, HostElement, PropValue, Props};
use crate::error::{Diagnostic, RenderError, Result};
use crate::hooks::context::{ContextScoping, ProviderChain, SharedStore};
use crate::hooks::scope::{self, RenderScope};
use crate::host::Host;
use crate::identity::{IdentityPath, Key};

use super::scheduler::SchedulerHandle;
use super::store::{InstanceId, InstanceStore, Location};

/// What a finished pass reached, for disposal and effect flushing.
#[derive(Debug, Default)]
pub(crate) struct PassReport {
    /// Every instance resolved during the pass.
    pub seen: HashSet<InstanceId>,
    /// Instances in the order they rendered.
    pub rendered: Vec<InstanceId>,
}

pub(crate) struct Reconciler<'a, H: Host> {
    pub host: &'a mut H,
    pub store: &'a mut InstanceStore<H::Node>,
    pub scheduler: &'a SchedulerHandle,
    pub shared: &'a SharedStore,
    pub scoping: ContextScoping,
    pub diagnostics: &'a mut Vec<Diagnostic>,
    report: PassReport,
}

/// Where a patch happens in identity terms: the enclosing element's path in
/// the new and previous tree, and the providers in scope.
#[derive(Clone, Copy)]
pub(crate) struct Cursor<'c> {
    pub new_base: &'c IdentityPath,
    pub old_base: &'c IdentityPath,
    pub providers: &'c ProviderChain,
    /// Stale siblings were already disposed by `patch_children`.
    siblings_settled: bool,
}

impl<'c> Cursor<'c> {
    /// A lone slot under `base`, e.g. a root or a component's output.
    pub fn at(base: &'c IdentityPath, providers: &'c ProviderChain) -> Self {
        Self {
            new_base: base,
            old_base: base,
            providers,
            siblings_settled: false,
        }
    }

    fn children(
        new_base: &'c IdentityPath,
        old_base: &'c IdentityPath,
        providers: &'c ProviderChain,
    ) -> Self {
        Self {
            new_base,
            old_base,
            providers,
            siblings_settled: true,
        }
    }
}

/// Path of `element` placed at `index` below `base`.
pub(crate) fn child_path(base: &IdentityPath, element: &Element, index: usize) -> IdentityPath {
    base.child(element.name(), Key::resolve(element.key(), index))
}

impl<'a, H: Host> Reconciler<'a, H> {
    pub fn new(
        host: &'a mut H,
        store: &'a mut InstanceStore<H::Node>,
        scheduler: &'a SchedulerHandle,
        shared: &'a SharedStore,
        scoping: ContextScoping,
        diagnostics: &'a mut Vec<Diagnostic>,
    ) -> Self {
        Self {
            host,
            store,
            scheduler,
            shared,
            scoping,
            diagnostics,
            report: PassReport::default(),
        }
    }

    pub fn into_report(self) -> PassReport {
        self.report
    }

    // -----------------------------------------------------------------------
    // Patch
    // -----------------------------------------------------------------------

    /// Reconcile the host child at `index` of `parent`.
    pub fn patch(
        &mut self,
        parent: &H::Node,
        index: usize,
        cursor: Cursor<'_>,
        new: Option<&Element>,
        old: Option<&Element>,
    ) -> Result<()> {
        match (new, old) {
            (None, None) => Ok(()),
            (None, Some(old)) => {
                let old_path = child_path(cursor.old_base, old, index);
                let node = self.existing(parent, index, &old_path)?;
                self.dispose_stale(cursor, &old_path, None);
                tracing::trace!(path = %old_path, "remove host node");
                self.host.remove_child(parent, &node);
                Ok(())
            }
            (Some(new), None) => {
                let path = child_path(cursor.new_base, new, index);
                let node = self.create(new, &path, parent, index, cursor.providers)?;
                self.place(parent, index, &node);
                Ok(())
            }
            (Some(new), Some(old)) => {
                let path = child_path(cursor.new_base, new, index);
                let old_path = child_path(cursor.old_base, old, index);
                if !new.same_type(old) {
                    return self.replace(parent, index, cursor, new, old);
                }
                match (new, old) {
                    (Element::Component(component), Element::Component(_)) => {
                        if path != old_path {
                            // Same component, different identity: a keyed move or
                            // key change. Its instance output is rebuilt in place.
                            return self.replace(parent, index, cursor, new, old);
                        }
                        self.render_instance(component, &path, parent, index, cursor.providers)
                    }
                    (Element::Host(new_host), Element::Host(old_host)) => {
                        let node = self.existing(parent, index, &old_path)?;
                        self.update_props(&node, &path, &old_host.props, &new_host.props)?;
                        self.patch_children(
                            &node,
                            Cursor::children(&path, &old_path, cursor.providers),
                            &new_host.children,
                            &old_host.children,
                        )
                    }
                    // Equal text or both empty.
                    _ => Ok(()),
                }
            }
        }
    }

    /// Re-render the instance for `path` and patch its output in place.
    pub fn render_instance(
        &mut self,
        element: &ComponentElement,
        path: &IdentityPath,
        parent: &H::Node,
        index: usize,
        providers: &ProviderChain,
    ) -> Result<()> {
        let (id, output, inner) = self.render_component(element, path, providers)?;
        self.set_location(id, parent, index);
        let previous = self.store.get(id).and_then(|ctx| ctx.rendered.clone());
        match previous {
            Some(previous) => self.patch(
                parent,
                index,
                Cursor::at(path, &inner),
                Some(&output),
                Some(&previous),
            )?,
            None => {
                let out_path = child_path(path, &output, index);
                let node = self.create(&output, &out_path, parent, index, &inner)?;
                self.place(parent, index, &node);
            }
        }
        if let Some(ctx) = self.store.get_mut(id) {
            ctx.rendered = Some(output);
        }
        Ok(())
    }

    /// Swap the host node at `index` for a freshly created one. The old
    /// subtree's instances are disposed before the new one renders.
    fn replace(
        &mut self,
        parent: &H::Node,
        index: usize,
        cursor: Cursor<'_>,
        new: &Element,
        old: &Element,
    ) -> Result<()> {
        let path = child_path(cursor.new_base, new, index);
        let old_path = child_path(cursor.old_base, old, index);
        let old_node = self.existing(parent, index, &old_path)?;
        self.dispose_stale(cursor, &old_path, Some(&path));
        let node = self.create(new, &path, parent, index, cursor.providers)?;
        tracing::trace!(from = %old_path, to = %path, "replace host node");
        self.host.replace_child(parent, &old_node, &node);
        Ok(())
    }

    fn patch_children(
        &mut self,
        node: &H::Node,
        cursor: Cursor<'_>,
        new: &[Element],
        old: &[Element],
    ) -> Result<()> {
        self.check_collisions(cursor.new_base, new);
        if cursor.new_base == cursor.old_base {
            // Old children absent from the new list, before anything here renders.
            let live: HashSet<IdentityPath> = new
                .iter()
                .enumerate()
                .map(|(index, child)| child_path(cursor.new_base, child, index))
                .collect();
            for (index, child) in old.iter().enumerate() {
                let old_path = child_path(cursor.old_base, child, index);
                if !live.contains(&old_path) {
                    self.dispose(&old_path);
                }
            }
        }
        for (index, child) in new.iter().enumerate() {
            self.patch(node, index, cursor, Some(child), old.get(index))?;
        }
        for index in (new.len()..old.len()).rev() {
            self.patch(node, index, cursor, None, old.get(index))?;
        }
        Ok(())
    }

    /// Dispose the instances under a single replaced or removed slot.
    ///
    /// Siblings are handled up front by `patch_children`. When the enclosing
    /// identity itself changed, the old paths cannot be told apart from
    /// moved ones here, and the end-of-pass sweep collects them instead.
    fn dispose_stale(
        &mut self,
        cursor: Cursor<'_>,
        old_path: &IdentityPath,
        new_path: Option<&IdentityPath>,
    ) {
        if cursor.siblings_settled
            || cursor.new_base != cursor.old_base
            || new_path == Some(old_path)
        {
            return;
        }
        self.dispose(old_path);
    }

    /// Dispose every instance under `path` this pass has not reached and run
    /// its cleanups now.
    fn dispose(&mut self, path: &IdentityPath) {
        for disposed in self.store.dispose_subtree(path, &self.report.seen) {
            disposed.run();
        }
    }

    // -----------------------------------------------------------------------
    // Create
    // -----------------------------------------------------------------------

    /// Build a detached host node for `element`, rendering every component
    /// inside it. The caller attaches it at (`parent`, `index`).
    fn create(
        &mut self,
        element: &Element,
        path: &IdentityPath,
        parent: &H::Node,
        index: usize,
        providers: &ProviderChain,
    ) -> Result<H::Node> {
        match element {
            Element::Text(text) => Ok(self.host.create_text_node(text)),
            Element::Empty => Ok(self.host.create_text_node("")),
            Element::Host(host) => self.create_host(host, path, providers),
            Element::Component(component) => {
                let (id, output, inner) = self.render_component(component, path, providers)?;
                self.set_location(id, parent, index);
                let out_path = child_path(path, &output, index);
                let node = self.create(&output, &out_path, parent, index, &inner)?;
                if let Some(ctx) = self.store.get_mut(id) {
                    ctx.rendered = Some(output);
                }
                Ok(node)
            }
        }
    }

    fn create_host(
        &mut self,
        element: &HostElement,
        path: &IdentityPath,
        providers: &ProviderChain,
    ) -> Result<H::Node> {
        validate_tag(&element.tag, path)?;
        let node = self.host.create_node(&element.tag);
        tracing::trace!(%path, tag = %element.tag, "create host node");
        for (name, value) in element.props.iter() {
            self.apply_prop(&node, path, name, Some(value))?;
        }
        self.check_collisions(path, &element.children);
        for (index, child) in element.children.iter().enumerate() {
            let child_path = child_path(path, child, index);
            let child_node = self.create(child, &child_path, &node, index, providers)?;
            self.host.append_child(&node, &child_node);
        }
        Ok(node)
    }

    // -----------------------------------------------------------------------
    // Components
    // -----------------------------------------------------------------------

    /// Resolve the instance for `path` and call its component function inside
    /// a render scope. Returns the instance, its output, and the provider
    /// chain its output renders under.
    fn render_component(
        &mut self,
        element: &ComponentElement,
        path: &IdentityPath,
        providers: &ProviderChain,
    ) -> Result<(InstanceId, Element, ProviderChain)> {
        let (id, replaced) = self.store.resolve(path, element, providers);
        for disposed in replaced {
            disposed.run();
        }
        if !self.report.seen.insert(id) {
            tracing::debug!(%path, "instance rendered twice in one pass");
        }

        let hooks = match self.store.get(id) {
            Some(ctx) => ctx.hooks.clone(),
            None => return Err(RenderError::invalid(path, "instance vanished during render")),
        };
        let render_scope = RenderScope {
            instance: id,
            hooks,
            scheduler: self.scheduler.clone(),
            providers: providers.clone(),
            shared: self.shared.clone(),
            scoping: self.scoping,
        };
        let output = {
            let _guard = scope::enter(render_scope);
            element.render()
        };
        self.report.rendered.push(id);

        let inner = match element.component.provision() {
            Some(provision) => {
                self.shared.publish(provision.key, provision.value.clone());
                providers.push(provision.key, provision.value.clone())
            }
            None => providers.clone(),
        };
        Ok((id, output, inner))
    }

    fn set_location(&mut self, id: InstanceId, parent: &H::Node, index: usize) {
        if let Some(ctx) = self.store.get_mut(id) {
            ctx.location = Some(Location {
                parent: parent.clone(),
                index,
            });
        }
    }

    // -----------------------------------------------------------------------
    // Props
    // -----------------------------------------------------------------------

    /// Apply only the props that were added, changed, or removed.
    fn update_props(
        &mut self,
        node: &H::Node,
        path: &IdentityPath,
        old: &Props,
        new: &Props,
    ) -> Result<()> {
        for (name, value) in new.iter() {
            if old.get(name) != Some(value) {
                self.apply_prop(node, path, name, Some(value))?;
            }
        }
        for (name, _) in old.iter() {
            if !new.contains(name) {
                self.apply_prop(node, path, name, None)?;
            }
        }
        Ok(())
    }

    fn apply_prop(
        &mut self,
        node: &H::Node,
        path: &IdentityPath,
        name: &str,
        value: Option<&PropValue>,
    ) -> Result<()> {
        match (event_name(name), value) {
            (Some(event), Some(PropValue::Handler(handler))) => {
                self.host.set_event_handler(node, &event, Some(handler.clone()));
            }
            (Some(event), None) => self.host.set_event_handler(node, &event, None),
            (Some(_), Some(_)) => {
                return Err(RenderError::invalid(
                    path,
                    format!("event prop `{name}` must hold a handler"),
                ))
            }
            (None, Some(PropValue::Handler(_))) => {
                return Err(RenderError::invalid(
                    path,
                    format!("handler under non-event prop `{name}`"),
                ))
            }
            (None, Some(value)) => match value.as_attribute() {
                Some(text) => self.host.set_attribute(node, name, &text),
                None => {
                    return Err(RenderError::invalid(
                        path,
                        format!("prop `{name}` has no attribute form"),
                    ))
                }
            },
            (None, None) => self.host.remove_attribute(node, name),
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn existing(&self, parent: &H::Node, index: usize, path: &IdentityPath) -> Result<H::Node> {
        self.host
            .child_at(parent, index)
            .ok_or_else(|| RenderError::MissingHostNode {
                path: path.to_string(),
                index,
            })
    }

    /// Put `node` at `index`, replacing whatever is there.
    fn place(&mut self, parent: &H::Node, index: usize, node: &H::Node) {
        match self.host.child_at(parent, index) {
            Some(existing) => self.host.replace_child(parent, &existing, node),
            None => self.host.append_child(parent, node),
        }
    }

    /// Report siblings that resolve to the same identity path.
    fn check_collisions(&mut self, base: &IdentityPath, children: &[Element]) {
        let mut paths = HashSet::with_capacity(children.len());
        for (index, child) in children.iter().enumerate() {
            let path = child_path(base, child, index);
            if !paths.insert(path.clone()) {
                tracing::warn!(%path, "identity collision between siblings");
                self.diagnostics
                    .push(Diagnostic::IdentityCollision { path });
            }
        }
    }
}

fn validate_tag(tag: &str, path: &IdentityPath) -> Result<()> {
    if tag.is_empty() {
        return Err(RenderError::invalid(path, "empty tag name"));
    }
    let valid = tag
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':' || c == '.');
    if !valid || !tag.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(RenderError::invalid(path, format!("malformed tag name `{tag}`")));
    }
    Ok(())
}
