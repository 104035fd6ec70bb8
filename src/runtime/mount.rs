//! Runtime: mount roots, drive render passes, flush the re-render queue.
//!
//! A [`Runtime`] owns the host surface, the instance store, and the
//! scheduler queue. Every pass has the same shape: patch (disposing replaced
//! and removed instances as it goes), then sweep the instances the pass no
//! longer reached, then run the effects the pass queued, instance by instance
//! in render order.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::element::{component, Element, IntoElement, Props};
use crate::error::{Diagnostic, RenderError, Result};
use crate::hooks::context::{ProviderChain, SharedStore};
use crate::hooks::slot::run_pending_effects;
use crate::host::Host;
use crate::identity::IdentityPath;

use super::config::RuntimeConfig;
use super::reconciler::{Cursor, PassReport, Reconciler};
use super::scheduler::SchedulerHandle;
use super::store::{InstanceId, InstanceStore};

// ---------------------------------------------------------------------------
// MountHandle
// ---------------------------------------------------------------------------

/// Identifies one mounted root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountHandle<N> {
    container: N,
    path: IdentityPath,
}

impl<N> MountHandle<N> {
    /// The host container the root renders into.
    pub fn container(&self) -> &N {
        &self.container
    }

    /// The root's identity path (`/Mount0`).
    pub fn path(&self) -> &IdentityPath {
        &self.path
    }
}

struct Root {
    path: IdentityPath,
    /// Host child index the root's output occupies in its container.
    index: usize,
    /// Last successfully rendered top-level element.
    element: Option<Element>,
}

// ---------------------------------------------------------------------------
// Runtime
// ---------------------------------------------------------------------------

/// Reconciliation runtime over a host surface.
pub struct Runtime<H: Host> {
    host: H,
    store: InstanceStore<H::Node>,
    scheduler: SchedulerHandle,
    shared: SharedStore,
    config: RuntimeConfig,
    roots: HashMap<H::Node, Root>,
    next_mount: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<H: Host> Runtime<H> {
    /// Create a runtime with the default config.
    pub fn new(host: H) -> Self {
        Self::with_config(host, RuntimeConfig::default())
    }

    pub fn with_config(host: H, config: RuntimeConfig) -> Self {
        Self {
            host,
            store: InstanceStore::new(),
            scheduler: SchedulerHandle::new(),
            shared: SharedStore::default(),
            config,
            roots: HashMap::new(),
            next_mount: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable host access. Mutating nodes the runtime rendered can make the
    /// next pass fail with [`RenderError::MissingHostNode`].
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// The queue setters write to.
    pub fn scheduler(&self) -> &SchedulerHandle {
        &self.scheduler
    }

    // -----------------------------------------------------------------------
    // Mounting
    // -----------------------------------------------------------------------

    /// Render component `f` into `container`.
    ///
    /// Mounting into a container that is already mounted re-renders it
    /// against the previous tree, keeping instance state where identities
    /// still match.
    pub fn mount<F, R>(&mut self, f: F, container: &H::Node) -> Result<MountHandle<H::Node>>
    where
        F: Fn(&Props) -> R + 'static,
        R: IntoElement + 'static,
    {
        self.mount_element(component(f), container)
    }

    /// Like [`Runtime::mount`], passing `props` to the root component.
    pub fn mount_with_props<F, R>(
        &mut self,
        f: F,
        props: Props,
        container: &H::Node,
    ) -> Result<MountHandle<H::Node>>
    where
        F: Fn(&Props) -> R + 'static,
        R: IntoElement + 'static,
    {
        self.mount_element(component(f).props(props), container)
    }

    /// Render an arbitrary element into `container`.
    pub fn mount_element(
        &mut self,
        element: impl IntoElement,
        container: &H::Node,
    ) -> Result<MountHandle<H::Node>> {
        let element = element.into_element();
        if !self.roots.contains_key(container) {
            let path = IdentityPath::root(format!(
                "{}{}",
                self.config.mount_prefix, self.next_mount
            ));
            self.next_mount += 1;
            let index = self.host.child_count(container);
            tracing::debug!(root = %path, index, "mounting container");
            self.roots.insert(
                container.clone(),
                Root {
                    path,
                    index,
                    element: None,
                },
            );
        }
        let path = self.render_root(container, element)?;
        Ok(MountHandle {
            container: container.clone(),
            path,
        })
    }

    /// Force a full pass over a mounted root.
    pub fn rerender(&mut self, handle: &MountHandle<H::Node>) -> Result<()> {
        let element = self
            .roots
            .get(&handle.container)
            .and_then(|root| root.element.clone())
            .ok_or(RenderError::NotMounted)?;
        self.render_root(&handle.container, element)?;
        Ok(())
    }

    /// Remove a root's host output and dispose every instance under it,
    /// running their cleanups.
    pub fn unmount(&mut self, container: &H::Node) -> Result<()> {
        let root = self
            .roots
            .remove(container)
            .ok_or(RenderError::NotMounted)?;
        if root.element.is_some() {
            if let Some(node) = self.host.child_at(container, root.index) {
                self.host.remove_child(container, &node);
            }
        }
        let disposed = self.store.dispose_subtree(&root.path, &HashSet::new());
        tracing::debug!(root = %root.path, instances = disposed.len(), "unmounted");
        for instance in disposed {
            instance.run();
        }
        if self.roots.is_empty() {
            self.shared.clear();
        }
        Ok(())
    }

    fn render_root(&mut self, container: &H::Node, element: Element) -> Result<IdentityPath> {
        let (path, index, previous) = match self.roots.get(container) {
            Some(root) => (root.path.clone(), root.index, root.element.clone()),
            None => return Err(RenderError::NotMounted),
        };
        let providers = ProviderChain::default();
        let report = {
            let mut rec = self.reconciler();
            rec.patch(
                container,
                index,
                Cursor::at(&path, &providers),
                Some(&element),
                previous.as_ref(),
            )?;
            rec.into_report()
        };
        if let Some(root) = self.roots.get_mut(container) {
            root.element = Some(element);
        }
        self.settle(&path, report);
        Ok(path)
    }

    // -----------------------------------------------------------------------
    // Scheduling
    // -----------------------------------------------------------------------

    /// Whether any re-render is queued.
    pub fn has_pending(&self) -> bool {
        !self.scheduler.is_empty()
    }

    /// Drain the queue once, re-rendering each queued instance.
    ///
    /// An instance re-rendered as part of an earlier pass in the same flush
    /// is skipped, as is one disposed since it was queued. Requests made
    /// while flushing wait for the next flush. Returns the number of passes.
    pub fn flush(&mut self) -> Result<usize> {
        let queued = self.scheduler.drain();
        let mut covered: HashSet<InstanceId> = HashSet::new();
        let mut passes = 0;

        for id in queued {
            if covered.contains(&id) {
                tracing::trace!(instance = ?id, "already re-rendered in this flush");
                continue;
            }
            let target = self.store.get(id).and_then(|ctx| {
                let location = ctx.location.clone()?;
                Some((
                    ctx.path.clone(),
                    ctx.element.clone(),
                    ctx.providers.clone(),
                    location,
                ))
            });
            let Some((path, element, providers, location)) = target else {
                tracing::debug!(instance = ?id, "skipping re-render of disposed instance");
                continue;
            };

            let report = {
                let mut rec = self.reconciler();
                rec.render_instance(
                    &element,
                    &path,
                    &location.parent,
                    location.index,
                    &providers,
                )?;
                rec.into_report()
            };
            covered.extend(report.seen.iter().copied());
            self.settle(&path, report);
            passes += 1;
        }

        if passes > 0 {
            tracing::debug!(passes, "flush complete");
        }
        Ok(passes)
    }

    /// Flush until the queue stays empty.
    ///
    /// Fails with [`RenderError::Unsettled`] when effects keep requesting
    /// re-renders past `max_flush_passes` flushes.
    pub fn run_until_idle(&mut self) -> Result<usize> {
        let mut total = 0;
        for _ in 0..self.config.max_flush_passes {
            if self.scheduler.is_empty() {
                return Ok(total);
            }
            total += self.flush()?;
        }
        if self.scheduler.is_empty() {
            Ok(total)
        } else {
            Err(RenderError::Unsettled {
                passes: self.config.max_flush_passes,
            })
        }
    }

    /// Wait until a re-render is requested, then flush once.
    ///
    /// Setters may run on other local tasks (`tokio::task::spawn_local`)
    /// while this is pending.
    pub async fn tick(&mut self) -> Result<usize> {
        let scheduler = self.scheduler.clone();
        while scheduler.is_empty() {
            scheduler.notified().await;
        }
        self.flush()
    }

    // -----------------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------------

    /// Diagnostics collected since the last call.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Number of live component instances.
    pub fn instance_count(&self) -> usize {
        self.store.len()
    }

    /// Whether a live instance has this identity path.
    pub fn is_alive(&self, path: &IdentityPath) -> bool {
        self.store.id_of(path).is_some()
    }

    /// Paths of all live instances, in path order.
    pub fn instance_paths(&self) -> Vec<IdentityPath> {
        self.store.paths().cloned().collect()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn reconciler(&mut self) -> Reconciler<'_, H> {
        Reconciler::new(
            &mut self.host,
            &mut self.store,
            &self.scheduler,
            &self.shared,
            self.config.context_scoping,
            &mut self.diagnostics,
        )
    }

    /// Dispose what the pass rooted at `prefix` left behind, then run the
    /// effects it queued.
    fn settle(&mut self, prefix: &IdentityPath, report: PassReport) {
        let disposed = self.store.dispose_subtree(prefix, &report.seen);
        let disposed_count = disposed.len();
        for instance in disposed {
            instance.run();
        }

        let mut effects = 0;
        for id in report.rendered {
            let Some(hooks) = self.store.get(id).map(|ctx| ctx.hooks.clone()) else {
                continue;
            };
            effects += run_pending_effects(&hooks);
        }
        tracing::debug!(
            root = %prefix,
            disposed = disposed_count,
            effects,
            "pass settled"
        );
    }
}

impl<H: Host> fmt::Debug for Runtime<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.config)
            .field("roots", &self.roots.len())
            .field("instances", &self.store.len())
            .field("pending", &self.scheduler.pending_count())
            .finish()
    }
}
