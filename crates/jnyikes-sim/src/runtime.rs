//! Process-wide runtime handle

use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use jnyikes_sdk::{JyError, JyResult, RuntimeEnv, RuntimeVm};
use parking_lot::Mutex;

use crate::class::ClassDef;
use crate::env::SimEnv;
use crate::heap::{Heap, ObjectId, Value};

#[derive(Debug, Default)]
struct Threads {
    attached: HashMap<ThreadId, String>,
    attaches: usize,
    detaches: usize,
    peak: usize,
    fail_attach: bool,
}

#[derive(Debug)]
struct Inner {
    heap: Mutex<Heap>,
    threads: Mutex<Threads>,
}

/// Simulated managed runtime; cheap to clone, clones share state
#[derive(Debug, Clone)]
pub struct SimRuntime {
    inner: Arc<Inner>,
}

impl Default for SimRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl SimRuntime {
    /// Runtime with only the root object, class, string and reflection
    /// classes defined
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                heap: Mutex::new(Heap::with_builtins()),
                threads: Mutex::new(Threads::default()),
            }),
        }
    }

    /// Register a class
    pub fn define(&self, class: ClassDef) -> &Self {
        self.inner.heap.lock().define(class);
        self
    }

    /// Env for the calling thread, without attaching it
    pub fn env(&self) -> SimEnv<'_> {
        SimEnv::new(self)
    }

    pub(crate) fn with_heap<R>(&self, f: impl FnOnce(&mut Heap) -> R) -> R {
        f(&mut self.inner.heap.lock())
    }

    // ========================================================================
    // Heap inspection
    // ========================================================================

    /// Allocate an instance with default fields, constructor not run
    pub fn new_instance(&self, class: &str) -> Option<ObjectId> {
        self.with_heap(|heap| heap.new_instance(class))
    }

    /// Allocate a string
    pub fn new_string(&self, s: &str) -> ObjectId {
        self.with_heap(|heap| heap.new_string(s))
    }

    /// Field of an object
    pub fn field(&self, obj: ObjectId, name: &str) -> Option<Value> {
        self.with_heap(|heap| heap.field(obj, name))
    }

    /// Store a field of an object
    pub fn set_field(&self, obj: ObjectId, name: &str, value: Value) {
        self.with_heap(|heap| heap.set_field(obj, name, value));
    }

    /// Contents of a string object
    pub fn string(&self, obj: ObjectId) -> Option<String> {
        self.with_heap(|heap| heap.string(obj).map(str::to_string))
    }

    /// Runtime class of an object
    pub fn class_of(&self, obj: ObjectId) -> Option<String> {
        self.with_heap(|heap| heap.class_of(obj).map(str::to_string))
    }

    /// Static field of a class
    pub fn static_field(&self, class: &str, name: &str) -> Option<Value> {
        self.with_heap(|heap| heap.static_field(class, name))
    }

    // ========================================================================
    // Thread accounting
    // ========================================================================

    /// Make every following attach fail
    pub fn fail_attach(&self, fail: bool) {
        self.inner.threads.lock().fail_attach = fail;
    }

    /// Successful attaches so far
    pub fn attach_count(&self) -> usize {
        self.inner.threads.lock().attaches
    }

    /// Detaches so far
    pub fn detach_count(&self) -> usize {
        self.inner.threads.lock().detaches
    }

    /// Threads attached right now
    pub fn attached_count(&self) -> usize {
        self.inner.threads.lock().attached.len()
    }

    /// Most threads ever attached at once
    pub fn peak_attached(&self) -> usize {
        self.inner.threads.lock().peak
    }

    /// Names of the threads attached right now
    pub fn attached_names(&self) -> Vec<String> {
        self.inner.threads.lock().attached.values().cloned().collect()
    }
}

impl RuntimeVm for SimRuntime {
    fn attach_current_thread(&self, thread_name: &str) -> JyResult<Box<dyn RuntimeEnv + '_>> {
        let mut threads = self.inner.threads.lock();
        if threads.fail_attach {
            return Err(JyError::Internal);
        }
        threads
            .attached
            .insert(thread::current().id(), thread_name.to_string());
        threads.attaches += 1;
        threads.peak = threads.peak.max(threads.attached.len());
        Ok(Box::new(SimEnv::new(self)))
    }

    fn detach_current_thread(&self) -> JyResult<()> {
        let mut threads = self.inner.threads.lock();
        match threads.attached.remove(&thread::current().id()) {
            Some(_) => {
                threads.detaches += 1;
                Ok(())
            }
            None => Err(JyError::InvalidArgument),
        }
    }
}
