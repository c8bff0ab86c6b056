//! Jnyikes SDK - property bags and the runtime capability surface
//!
//! A [`PropertyBag`] is a host-side stand-in for one object of a managed
//! runtime: a class name plus an ordered list of accessor-named, typed
//! values. This crate holds the bag itself, the typed values it carries,
//! method-descriptor synthesis and the [`RuntimeEnv`] / [`RuntimeVm`]
//! traits the marshalling engine is written against.
//!
//! # Example
//!
//! ```ignore
//! use jnyikes_sdk::{PropertyBag, PropertyValue, TypeTag};
//!
//! let mut bag = PropertyBag::new("com/example/Point")?;
//! bag.set_property("setX", PropertyValue::Int(3))?;
//! bag.set_property("setY", PropertyValue::Int(4))?;
//!
//! let x = bag.get_property_copy("setX", TypeTag::Int)?;
//! assert_eq!(x, PropertyValue::Int(3));
//! ```

#![warn(missing_docs)]

pub mod bag;
pub mod error;
pub mod list;
pub mod runtime;
pub mod signature;
pub mod types;

pub use bag::{Property, PropertyBag};
pub use error::{JyError, JyResult};
pub use list::OrderedList;
pub use runtime::{LocalRef, MethodId, ObjectRef, ReturnKind, RtValue, RuntimeEnv, RuntimeVm};
pub use types::{PropertyValue, TypeTag};
