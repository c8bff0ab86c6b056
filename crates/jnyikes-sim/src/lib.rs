//! Jnyikes sim - an in-process stand-in for the managed runtime
//!
//! Implements [`RuntimeEnv`](jnyikes_sdk::RuntimeEnv) and
//! [`RuntimeVm`](jnyikes_sdk::RuntimeVm) over a small object heap so the
//! engine can be exercised end to end without a real runtime. Classes are
//! declared with [`ClassDef`]; the root object class, `java/lang/Class`,
//! `java/lang/String` and `java/lang/reflect/Method` are built in, with
//! enough of the reflection API (`getClass`, `getName`, `getMethods`,
//! `Method.toString`) for accessor discovery.
//!
//! ```ignore
//! let rt = SimRuntime::new();
//! rt.define(ClassDef::new("Point").property("X", JType::Int));
//! let env = rt.env();
//! ```

#![warn(missing_docs)]

pub mod class;
pub mod env;
pub mod heap;
pub mod runtime;

pub use class::{method_body, ClassDef, Frame, JType, MethodBody, MethodDef, Throw};
pub use env::SimEnv;
pub use heap::{ObjectId, Value};
pub use runtime::SimRuntime;

/// Internal name of the root object class
pub const OBJECT: &str = "java/lang/Object";
/// Internal name of the class of class objects
pub const CLASS: &str = "java/lang/Class";
/// Internal name of the string class
pub const STRING: &str = "java/lang/String";
/// Internal name of the reflective method class
pub const METHOD: &str = "java/lang/reflect/Method";
