//! Per-thread env
//!
//! Every handle returned to the caller is a fresh local reference recorded
//! in this env's table until `delete_local_ref`. Tests use
//! [`SimEnv::live_local_refs`] to check that nothing leaked and
//! [`SimEnv::misuse_count`] to check that no call was made with an
//! exception pending or through a stale handle.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use jnyikes_sdk::{MethodId, ObjectRef, ReturnKind, RtValue, RuntimeEnv};

use crate::heap::{ObjectId, Value};
use crate::SimRuntime;

/// One thread's view of a [`SimRuntime`]
pub struct SimEnv<'vm> {
    runtime: &'vm SimRuntime,
    locals: RefCell<HashMap<u64, ObjectId>>,
    next_handle: Cell<u64>,
    pending: RefCell<Option<String>>,
    described: RefCell<Vec<String>>,
    misuse: Cell<usize>,
}

impl<'vm> SimEnv<'vm> {
    pub(crate) fn new(runtime: &'vm SimRuntime) -> Self {
        Self {
            runtime,
            locals: RefCell::new(HashMap::new()),
            next_handle: Cell::new(1),
            pending: RefCell::new(None),
            described: RefCell::new(Vec::new()),
            misuse: Cell::new(0),
        }
    }

    /// The runtime this env belongs to
    pub fn runtime(&self) -> &'vm SimRuntime {
        self.runtime
    }

    /// New local reference to `obj`
    pub fn local(&self, obj: ObjectId) -> ObjectRef {
        let handle = self.next_handle.get();
        self.next_handle.set(handle + 1);
        self.locals.borrow_mut().insert(handle, obj);
        ObjectRef::new(handle).unwrap_or_else(|| unreachable!("handles start at 1"))
    }

    /// Heap object behind a local reference
    pub fn object_id(&self, obj: ObjectRef) -> Option<ObjectId> {
        let id = self.locals.borrow().get(&obj.to_raw()).copied();
        if id.is_none() {
            self.misuse.set(self.misuse.get() + 1);
        }
        id
    }

    /// Local references not yet deleted
    pub fn live_local_refs(&self) -> usize {
        self.locals.borrow().len()
    }

    /// Calls made with an exception pending or through the wrong call
    /// primitive, plus uses of stale handles
    pub fn misuse_count(&self) -> usize {
        self.misuse.get()
    }

    /// Class of the pending exception
    pub fn pending_exception(&self) -> Option<String> {
        self.pending.borrow().clone()
    }

    /// Exceptions printed through `exception_describe`, in order
    pub fn described(&self) -> Vec<String> {
        self.described.borrow().clone()
    }

    /// Raise an exception of `class`
    pub fn throw(&self, class: &str) {
        *self.pending.borrow_mut() = Some(class.to_string());
    }

    fn guard_call(&self) {
        if self.pending.borrow().is_some() {
            self.misuse.set(self.misuse.get() + 1);
        }
    }

    fn class_named(&self, class: ObjectRef) -> Option<String> {
        let id = self.object_id(class)?;
        self.runtime
            .with_heap(|heap| heap.class_named_by(id).map(str::to_string))
    }

    fn to_value(&self, value: RtValue) -> Value {
        match value {
            RtValue::Void => Value::Void,
            RtValue::Boolean(v) => Value::Boolean(v),
            RtValue::Byte(v) => Value::Byte(v),
            RtValue::Char(v) => Value::Char(v),
            RtValue::Short(v) => Value::Short(v),
            RtValue::Int(v) => Value::Int(v),
            RtValue::Long(v) => Value::Long(v),
            RtValue::Float(v) => Value::Float(v),
            RtValue::Double(v) => Value::Double(v),
            RtValue::Object(obj) => Value::Object(obj.and_then(|obj| self.object_id(obj))),
        }
    }

    fn to_rt(&self, value: Value) -> RtValue {
        match value {
            Value::Void => RtValue::Void,
            Value::Boolean(v) => RtValue::Boolean(v),
            Value::Byte(v) => RtValue::Byte(v),
            Value::Char(v) => RtValue::Char(v),
            Value::Short(v) => RtValue::Short(v),
            Value::Int(v) => RtValue::Int(v),
            Value::Long(v) => RtValue::Long(v),
            Value::Float(v) => RtValue::Float(v),
            Value::Double(v) => RtValue::Double(v),
            Value::Object(obj) => RtValue::Object(obj.map(|obj| self.local(obj))),
        }
    }

    fn lookup(&self, class: ObjectRef, name: &str, descriptor: &str, is_static: bool) -> Option<MethodId> {
        self.guard_call();
        let found = self.class_named(class).and_then(|class| {
            self.runtime
                .with_heap(|heap| heap.find_method(&class, name, descriptor, is_static))
        });
        match found {
            Some(index) => Some(MethodId::from_raw(index as u64 + 1)),
            None => {
                self.throw("java/lang/NoSuchMethodError");
                None
            }
        }
    }

    fn invoke(
        &self,
        this: Option<ObjectId>,
        method: MethodId,
        ret: ReturnKind,
        is_static: bool,
        args: &[RtValue],
    ) -> RtValue {
        self.guard_call();
        let index = (method.to_raw() as usize).wrapping_sub(1);
        let declared = self.runtime.with_heap(|heap| {
            heap.method(index)
                .map(|entry| (entry.return_kind(), entry.def.is_static))
        });
        // Wrong call primitive or static/instance mix-up
        match declared {
            Some((kind, declared_static)) if kind == ret && declared_static == is_static => {}
            _ => {
                self.misuse.set(self.misuse.get() + 1);
                return zero(ret);
            }
        }

        let args = args.iter().map(|arg| self.to_value(*arg)).collect();
        match self.runtime.with_heap(|heap| heap.invoke(index, this, args)) {
            Ok(value) => self.to_rt(value),
            Err(thrown) => {
                self.throw(&thrown.class);
                zero(ret)
            }
        }
    }
}

fn zero(ret: ReturnKind) -> RtValue {
    match ret {
        ReturnKind::Void => RtValue::Void,
        ReturnKind::Boolean => RtValue::Boolean(false),
        ReturnKind::Byte => RtValue::Byte(0),
        ReturnKind::Char => RtValue::Char(0),
        ReturnKind::Short => RtValue::Short(0),
        ReturnKind::Int => RtValue::Int(0),
        ReturnKind::Long => RtValue::Long(0),
        ReturnKind::Float => RtValue::Float(0.0),
        ReturnKind::Double => RtValue::Double(0.0),
        ReturnKind::Object => RtValue::Object(None),
    }
}

impl RuntimeEnv for SimEnv<'_> {
    fn find_class(&self, name: &str) -> Option<ObjectRef> {
        self.guard_call();
        let id = self.runtime.with_heap(|heap| {
            heap.is_defined(name).then(|| heap.class_object(name))
        });
        match id {
            Some(id) => Some(self.local(id)),
            None => {
                self.throw("java/lang/NoClassDefFoundError");
                None
            }
        }
    }

    fn get_object_class(&self, obj: ObjectRef) -> Option<ObjectRef> {
        let id = self.object_id(obj)?;
        let class = self.runtime.with_heap(|heap| {
            let class = heap.class_of(id)?.to_string();
            Some(heap.class_object(&class))
        })?;
        Some(self.local(class))
    }

    fn get_method_id(&self, class: ObjectRef, name: &str, descriptor: &str) -> Option<MethodId> {
        self.lookup(class, name, descriptor, false)
    }

    fn get_static_method_id(&self, class: ObjectRef, name: &str, descriptor: &str) -> Option<MethodId> {
        self.lookup(class, name, descriptor, true)
    }

    fn new_object(&self, class: ObjectRef, ctor: MethodId, args: &[RtValue]) -> Option<ObjectRef> {
        let name = self.class_named(class)?;
        let obj = self.runtime.with_heap(|heap| heap.new_instance(&name))?;
        self.invoke(Some(obj), ctor, ReturnKind::Void, false, args);
        if self.pending.borrow().is_some() {
            return None;
        }
        Some(self.local(obj))
    }

    fn call_method(&self, obj: ObjectRef, method: MethodId, ret: ReturnKind, args: &[RtValue]) -> RtValue {
        match self.object_id(obj) {
            Some(id) => self.invoke(Some(id), method, ret, false, args),
            None => zero(ret),
        }
    }

    fn call_static_method(
        &self,
        class: ObjectRef,
        method: MethodId,
        ret: ReturnKind,
        args: &[RtValue],
    ) -> RtValue {
        match self.object_id(class) {
            Some(_) => self.invoke(None, method, ret, true, args),
            None => zero(ret),
        }
    }

    fn new_string(&self, s: &str) -> Option<ObjectRef> {
        let id = self.runtime.with_heap(|heap| heap.new_string(s));
        Some(self.local(id))
    }

    fn read_string(&self, s: ObjectRef) -> Option<String> {
        let id = self.object_id(s)?;
        self.runtime
            .with_heap(|heap| heap.string(id).map(str::to_string))
    }

    fn array_length(&self, array: ObjectRef) -> usize {
        self.object_id(array)
            .and_then(|id| self.runtime.with_heap(|heap| heap.array(id).map(<[_]>::len)))
            .unwrap_or(0)
    }

    fn array_element(&self, array: ObjectRef, index: usize) -> Option<ObjectRef> {
        let id = self.object_id(array)?;
        let element = self
            .runtime
            .with_heap(|heap| heap.array(id).and_then(|items| items.get(index).copied()));
        match element {
            Some(element) => Some(self.local(element)),
            None => {
                self.throw("java/lang/ArrayIndexOutOfBoundsException");
                None
            }
        }
    }

    fn exception_check(&self) -> bool {
        self.pending.borrow().is_some()
    }

    fn exception_describe(&self) {
        if let Some(class) = self.pending.borrow().clone() {
            self.described.borrow_mut().push(class);
        }
    }

    fn exception_clear(&self) {
        *self.pending.borrow_mut() = None;
    }

    fn delete_local_ref(&self, obj: ObjectRef) {
        if self.locals.borrow_mut().remove(&obj.to_raw()).is_none() {
            self.misuse.set(self.misuse.get() + 1);
        }
    }
}
