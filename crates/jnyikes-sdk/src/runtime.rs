//! Capability traits for the managed runtime
//!
//! The marshalling engine never talks to a concrete runtime. It programs
//! against [`RuntimeEnv`] (one attached thread's view of the runtime) and
//! [`RuntimeVm`] (the process-wide runtime handle used to attach threads).
//! A binding to a real runtime, or the simulated one used in tests,
//! provides the implementations.
//!
//! Every [`ObjectRef`] an env hands out is a *local reference* that stays
//! alive until [`RuntimeEnv::delete_local_ref`] is called. The runtime's
//! local-reference table is small, so callers wrap them in [`LocalRef`],
//! which releases on drop and therefore on every exit path.

use std::num::NonZeroU64;

use crate::error::JyResult;
use crate::types::TypeTag;

/// Opaque, non-null handle to a runtime object (class objects included)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(transparent)]
pub struct ObjectRef(NonZeroU64);

impl ObjectRef {
    /// Wrap raw handle bits; `None` for the null handle
    #[inline]
    pub const fn new(raw: u64) -> Option<Self> {
        match NonZeroU64::new(raw) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }

    /// Raw handle bits
    #[inline]
    pub const fn to_raw(self) -> u64 {
        self.0.get()
    }
}

/// Opaque handle to a resolved method
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(transparent)]
pub struct MethodId(u64);

impl MethodId {
    /// Wrap raw handle bits
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw handle bits
    #[inline]
    pub const fn to_raw(self) -> u64 {
        self.0
    }
}

/// Argument or result of a runtime call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RtValue {
    /// No value
    Void,
    /// `Z`
    Boolean(bool),
    /// `B`
    Byte(i8),
    /// `C`
    Char(u16),
    /// `S`
    Short(i16),
    /// `I`
    Int(i32),
    /// `J`
    Long(i64),
    /// `F`
    Float(f32),
    /// `D`
    Double(f64),
    /// Any reference type; `None` is the runtime's null
    Object(Option<ObjectRef>),
}

/// Which typed call primitive to use for a method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnKind {
    /// `CallVoidMethod`
    Void,
    /// `CallBooleanMethod`
    Boolean,
    /// `CallByteMethod`
    Byte,
    /// `CallCharMethod`
    Char,
    /// `CallShortMethod`
    Short,
    /// `CallIntMethod`
    Int,
    /// `CallLongMethod`
    Long,
    /// `CallFloatMethod`
    Float,
    /// `CallDoubleMethod`
    Double,
    /// `CallObjectMethod`
    Object,
}

impl ReturnKind {
    /// Call primitive matching a property type
    pub const fn for_tag(tag: TypeTag) -> Self {
        match tag {
            TypeTag::Void => ReturnKind::Void,
            TypeTag::Boolean => ReturnKind::Boolean,
            TypeTag::Byte => ReturnKind::Byte,
            TypeTag::Char => ReturnKind::Char,
            TypeTag::Short => ReturnKind::Short,
            TypeTag::Int | TypeTag::UInt => ReturnKind::Int,
            TypeTag::Long | TypeTag::ULong => ReturnKind::Long,
            TypeTag::Float => ReturnKind::Float,
            TypeTag::Double => ReturnKind::Double,
            TypeTag::String | TypeTag::Bag | TypeTag::ClassRef => ReturnKind::Object,
        }
    }
}

/// One attached thread's view of the managed runtime.
///
/// Lookups return `None` on failure and usually leave an exception pending;
/// callers check [`exception_check`](Self::exception_check) and clear it.
/// Calls return the runtime's result; when the callee throws, the result is
/// meaningless and an exception is pending.
pub trait RuntimeEnv {
    // ========================================================================
    // Classes and methods
    // ========================================================================

    /// Find a class by internal name (`com/example/Point`)
    fn find_class(&self, name: &str) -> Option<ObjectRef>;

    /// Class of an object
    fn get_object_class(&self, obj: ObjectRef) -> Option<ObjectRef>;

    /// Resolve an instance method by name and descriptor
    fn get_method_id(&self, class: ObjectRef, name: &str, descriptor: &str) -> Option<MethodId>;

    /// Resolve a static method by name and descriptor
    fn get_static_method_id(
        &self,
        class: ObjectRef,
        name: &str,
        descriptor: &str,
    ) -> Option<MethodId>;

    // ========================================================================
    // Objects and calls
    // ========================================================================

    /// Instantiate `class` through the constructor `ctor`
    fn new_object(&self, class: ObjectRef, ctor: MethodId, args: &[RtValue]) -> Option<ObjectRef>;

    /// Invoke an instance method with the call primitive for `ret`
    fn call_method(
        &self,
        obj: ObjectRef,
        method: MethodId,
        ret: ReturnKind,
        args: &[RtValue],
    ) -> RtValue;

    /// Invoke a static method with the call primitive for `ret`
    fn call_static_method(
        &self,
        class: ObjectRef,
        method: MethodId,
        ret: ReturnKind,
        args: &[RtValue],
    ) -> RtValue;

    // ========================================================================
    // Strings and arrays
    // ========================================================================

    /// Transcode a host string into a runtime string
    fn new_string(&self, s: &str) -> Option<ObjectRef>;

    /// Copy a runtime string out
    fn read_string(&self, s: ObjectRef) -> Option<String>;

    /// Length of a runtime object array
    fn array_length(&self, array: ObjectRef) -> usize;

    /// Element of a runtime object array
    fn array_element(&self, array: ObjectRef, index: usize) -> Option<ObjectRef>;

    // ========================================================================
    // Exceptions and references
    // ========================================================================

    /// Whether an exception is pending
    fn exception_check(&self) -> bool;

    /// Print the pending exception through the runtime's own reporting
    fn exception_describe(&self);

    /// Clear the pending exception
    fn exception_clear(&self);

    /// Release a local reference
    fn delete_local_ref(&self, obj: ObjectRef);
}

/// Process-wide runtime handle.
pub trait RuntimeVm: Send + Sync {
    /// Attach the calling OS thread and return its env
    fn attach_current_thread(&self, thread_name: &str) -> JyResult<Box<dyn RuntimeEnv + '_>>;

    /// Detach the calling OS thread
    fn detach_current_thread(&self) -> JyResult<()>;
}

/// Local reference released when dropped
pub struct LocalRef<'env> {
    env: &'env dyn RuntimeEnv,
    obj: ObjectRef,
}

impl<'env> LocalRef<'env> {
    /// Take ownership of `obj`
    pub fn new(env: &'env dyn RuntimeEnv, obj: ObjectRef) -> Self {
        Self { env, obj }
    }

    /// Take ownership of a possibly-null reference
    pub fn wrap(env: &'env dyn RuntimeEnv, obj: Option<ObjectRef>) -> Option<Self> {
        obj.map(|obj| Self::new(env, obj))
    }

    /// Borrow the handle
    pub fn get(&self) -> ObjectRef {
        self.obj
    }

    /// Give up ownership without releasing
    pub fn into_raw(self) -> ObjectRef {
        let obj = self.obj;
        std::mem::forget(self);
        obj
    }
}

impl Drop for LocalRef<'_> {
    fn drop(&mut self) {
        self.env.delete_local_ref(self.obj);
    }
}

impl std::fmt::Debug for LocalRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LocalRef({:#x})", self.obj.to_raw())
    }
}
