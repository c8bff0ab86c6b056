//! Jnyikes engine - marshalling between property bags and runtime objects
//!
//! The engine converts a [`PropertyBag`] into an object of the managed
//! runtime by replaying its properties as setter calls, and converts a
//! runtime object back into a bag by discovering and calling its
//! accessors. It is written against the capability traits of
//! [`jnyikes_sdk`], so it runs on any binding that implements them.
//!
//! # Example
//!
//! ```ignore
//! use jnyikes_engine::Marshaller;
//! use jnyikes_sdk::{PropertyBag, PropertyValue};
//!
//! fn app_main(env: &dyn jnyikes_sdk::RuntimeEnv) -> jnyikes_sdk::JyResult<()> {
//!     let mut point = PropertyBag::new("Point")?;
//!     point.set_property("setX", PropertyValue::Int(3))?;
//!     point.set_property("setY", PropertyValue::Int(4))?;
//!
//!     let marshaller = Marshaller::new(env);
//!     let obj = marshaller.to_object(&point)?;
//!     let back = marshaller.to_bag(obj.get())?;
//!     assert_eq!(back.get_property("getX"), Some(&PropertyValue::Int(3)));
//!     Ok(())
//! }
//! ```
//!
//! # Threads
//!
//! Conversions run on whatever thread owns the env. [`Host`] and
//! [`ThreadGuard`] provide the single attached worker thread an embedding
//! binding usually runs its application on.

#![warn(missing_docs)]

pub mod discovery;
pub mod guard;
pub mod host;
pub mod marshal;
pub mod options;
mod reflect;
mod send;
mod to_bag;
mod to_object;

pub use discovery::{parse_description, AccessorShape, DiscoveredMethod, MethodTable};
pub use guard::{GuardError, ThreadGuard};
pub use host::Host;
pub use marshal::Marshaller;
pub use options::{EngineOptions, OptionsError};

use jnyikes_sdk::{JyResult, LocalRef, ObjectRef, PropertyBag, RuntimeEnv};

/// Convert a bag to a runtime object with default options
pub fn bag_to_object<'env>(env: &'env dyn RuntimeEnv, bag: &PropertyBag) -> JyResult<LocalRef<'env>> {
    Marshaller::new(env).to_object(bag)
}

/// Convert a runtime object to a bag with default options
pub fn object_to_bag(env: &dyn RuntimeEnv, obj: ObjectRef) -> JyResult<PropertyBag> {
    Marshaller::new(env).to_bag(obj)
}

/// Convert a bag and hand it to a static receiver, with default options
pub fn send(
    env: &dyn RuntimeEnv,
    bag: &PropertyBag,
    receiver_class: &str,
    receiver_method: &str,
) -> JyResult<()> {
    Marshaller::new(env).send(bag, receiver_class, receiver_method)
}
