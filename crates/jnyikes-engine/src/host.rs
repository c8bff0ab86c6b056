//! Process lifecycle slot
//!
//! The embedding binding keeps one [`Host`] for the life of the process
//! (typically in a `static`), forwards the runtime's load and unload
//! notifications to it, and starts the worker through it.

use std::sync::Arc;

use jnyikes_sdk::{RuntimeEnv, RuntimeVm};
use parking_lot::RwLock;

use crate::guard::{GuardError, ThreadGuard};
use crate::options::EngineOptions;

/// Stored runtime handle plus the worker guard
pub struct Host {
    options: EngineOptions,
    vm: RwLock<Option<Arc<dyn RuntimeVm>>>,
    guard: ThreadGuard,
}

impl Default for Host {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

impl Host {
    /// Host with no runtime loaded
    pub fn new(options: EngineOptions) -> Self {
        let guard = ThreadGuard::with_options(&options);
        Self {
            options,
            vm: RwLock::new(None),
            guard,
        }
    }

    /// Load notification: store the runtime handle and report the
    /// interface version the engine needs
    pub fn on_load(&self, vm: Arc<dyn RuntimeVm>) -> i32 {
        *self.vm.write() = Some(vm);
        log::info!(
            "runtime loaded, interface version {:#x}",
            self.options.interface_version
        );
        self.options.interface_version
    }

    /// Unload notification: drop the runtime handle
    pub fn on_unload(&self) {
        if self.vm.write().take().is_some() {
            log::info!("runtime unloaded");
        }
    }

    /// Stored runtime handle
    pub fn runtime(&self) -> Option<Arc<dyn RuntimeVm>> {
        self.vm.read().clone()
    }

    /// Start the worker on the stored runtime
    pub fn start<F>(&self, entry: F) -> Result<(), GuardError>
    where
        F: FnOnce(&dyn RuntimeVm, &dyn RuntimeEnv) -> i32 + Send + 'static,
    {
        let vm = self.runtime().ok_or(GuardError::NotLoaded)?;
        self.guard.start(vm, entry)
    }

    /// The worker guard
    pub fn guard(&self) -> &ThreadGuard {
        &self.guard
    }

    /// Engine options
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("options", &self.options)
            .field("loaded", &self.vm.read().is_some())
            .field("guard", &self.guard)
            .finish()
    }
}
