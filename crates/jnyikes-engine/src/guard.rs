//! Single-flight worker thread
//!
//! [`ThreadGuard`] runs at most one runtime-attached worker at a time. A
//! `start` while a worker is running is refused rather than queued, and the
//! previous worker's OS thread is joined before the next one is spawned, so
//! workers never overlap.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use jnyikes_sdk::{RuntimeEnv, RuntimeVm};
use parking_lot::Mutex;
use thiserror::Error;

use crate::options::{EngineOptions, DEFAULT_WORKER_THREAD_NAME};

/// Errors from starting a worker
#[derive(Debug, Error)]
pub enum GuardError {
    /// A worker is already running
    #[error("worker already in use")]
    InUse,

    /// No runtime handle has been stored by the load hook
    #[error("no runtime loaded")]
    NotLoaded,

    /// The OS refused to create the thread
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

#[derive(Debug, Default)]
struct GuardState {
    running: bool,
    last: Option<JoinHandle<()>>,
    last_status: Option<i32>,
}

/// Marks the worker finished, even if the entry point panics
struct Finish {
    state: Arc<Mutex<GuardState>>,
    status: Option<i32>,
}

impl Drop for Finish {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.running = false;
        state.last_status = self.status;
    }
}

/// Single-flight controller for the runtime-attached worker thread
#[derive(Debug)]
pub struct ThreadGuard {
    thread_name: String,
    state: Arc<Mutex<GuardState>>,
}

impl Default for ThreadGuard {
    fn default() -> Self {
        Self::new(DEFAULT_WORKER_THREAD_NAME)
    }
}

impl ThreadGuard {
    /// Guard whose worker thread is named `thread_name`
    pub fn new(thread_name: impl Into<String>) -> Self {
        Self {
            thread_name: thread_name.into(),
            state: Arc::new(Mutex::new(GuardState::default())),
        }
    }

    /// Guard configured from options
    pub fn with_options(options: &EngineOptions) -> Self {
        Self::new(options.worker_thread_name.clone())
    }

    /// Worker thread and attach name
    pub fn thread_name(&self) -> &str {
        &self.thread_name
    }

    /// Spawn the worker: attach to `vm`, run `entry`, detach.
    ///
    /// Fails with [`GuardError::InUse`] while a previous worker runs. A
    /// finished previous worker is joined first, which may block briefly
    /// while its thread exits.
    pub fn start<F>(&self, vm: Arc<dyn RuntimeVm>, entry: F) -> Result<(), GuardError>
    where
        F: FnOnce(&dyn RuntimeVm, &dyn RuntimeEnv) -> i32 + Send + 'static,
    {
        let mut state = self.state.lock();
        if state.running {
            return Err(GuardError::InUse);
        }
        if let Some(previous) = state.last.take() {
            if previous.join().is_err() {
                log::warn!("previous worker {} panicked", self.thread_name);
            }
        }

        let shared = Arc::clone(&self.state);
        let name = self.thread_name.clone();
        let handle = thread::Builder::new()
            .name(self.thread_name.clone())
            .spawn(move || {
                let finish = Finish {
                    state: shared,
                    status: None,
                };
                run_worker(vm, &name, entry, finish)
            })?;

        state.running = true;
        state.last = Some(handle);
        Ok(())
    }

    /// Whether a worker is running
    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    /// Status returned by the last finished worker's entry point.
    ///
    /// `None` before any worker finished, or when the last one panicked.
    /// A worker that could not attach reports the attach error's code.
    pub fn last_status(&self) -> Option<i32> {
        self.state.lock().last_status
    }

    /// Block until the current or last worker has exited
    pub fn wait(&self) {
        let handle = self.state.lock().last.take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                log::warn!("worker {} panicked", self.thread_name);
            }
        }
    }
}

/// Detaches the worker thread when dropped, also on unwind
struct Detach<'vm> {
    vm: &'vm dyn RuntimeVm,
    name: &'vm str,
    attached: bool,
}

impl Drop for Detach<'_> {
    fn drop(&mut self) {
        if !self.attached {
            return;
        }
        match self.vm.detach_current_thread() {
            Ok(()) => log::info!("worker {} detached", self.name),
            Err(err) => log::error!("worker {} could not detach: {}", self.name, err),
        }
    }
}

fn run_worker<F>(vm: Arc<dyn RuntimeVm>, name: &str, entry: F, mut finish: Finish)
where
    F: FnOnce(&dyn RuntimeVm, &dyn RuntimeEnv) -> i32,
{
    // Declared before the env so the env is dropped first
    let mut detach = Detach {
        vm: &*vm,
        name,
        attached: false,
    };
    let env = match vm.attach_current_thread(name) {
        Ok(env) => env,
        Err(err) => {
            log::error!("worker {} could not attach: {}", name, err);
            finish.status = Some(err.code());
            return;
        }
    };
    detach.attached = true;
    log::info!("worker {} attached", name);

    let status = entry(&*vm, &*env);
    drop(env);
    drop(detach);
    log::debug!("worker {} finished with status {}", name, status);
    finish.status = Some(status);
}
