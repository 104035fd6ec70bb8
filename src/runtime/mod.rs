//! Runtime: instance store, reconciler, scheduler, and the mount entry points.

pub mod config;
pub mod mount;
pub(crate) mod reconciler;
pub mod scheduler;
pub mod store;

pub use config::RuntimeConfig;
pub use mount::{MountHandle, Runtime};
pub use scheduler::SchedulerHandle;
pub use store::InstanceId;
