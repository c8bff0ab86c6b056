//! Object to bag conversion
//!
//! The object's accessors are discovered reflectively and each is called
//! once; its result becomes a property named after the accessor. Accessors
//! returning other objects are followed recursively, up to the configured
//! depth.

use jnyikes_sdk::signature;
use jnyikes_sdk::{
    JyError, JyResult, LocalRef, ObjectRef, PropertyBag, PropertyValue, ReturnKind, RtValue,
    TypeTag,
};

use crate::discovery::DiscoveredMethod;
use crate::marshal::Marshaller;

impl<'env> Marshaller<'env> {
    /// Build a bag from a runtime object.
    ///
    /// The bag's class name is the object's runtime class in internal
    /// form. A null object-typed accessor result is stored as a null nested
    /// bag that remembers the accessor's declared class. Object graphs deeper than the configured maximum, cyclic ones
    /// included, fail with `Internal`.
    pub fn to_bag(&self, obj: ObjectRef) -> JyResult<PropertyBag> {
        self.to_bag_at(obj, 0)
    }

    fn to_bag_at(&self, obj: ObjectRef, depth: usize) -> JyResult<PropertyBag> {
        if depth >= self.max_depth() {
            log::error!("object graph deeper than {} levels", self.max_depth());
            return Err(JyError::Internal);
        }

        let class = self.own(self.env().get_object_class(obj), JyError::InvalidArgument)?;
        let class_name = signature::internal_name(&self.class_name_of(class.get())?);
        let mut bag = PropertyBag::new(&class_name)?;

        let table = self.discover(class.get())?;
        log::debug!(
            "converting object of {} to bag ({} accessors, depth {})",
            class_name,
            table.len(),
            depth
        );
        for method in &table {
            let value = self.fetch(obj, method, depth)?;
            log::trace!("{}.{} -> {}", class_name, method.accessor_name(), value.type_tag());
            bag.set_property(method.accessor_name(), value)?;
        }
        Ok(bag)
    }

    /// Call one accessor and convert its result
    fn fetch(&self, obj: ObjectRef, method: &DiscoveredMethod, depth: usize) -> JyResult<PropertyValue> {
        let env = self.env();
        let tag = method.return_tag();
        let result = env.call_method(obj, method.method_id(), ReturnKind::for_tag(tag), &[]);
        let held = match result {
            RtValue::Object(result) => LocalRef::wrap(env, result),
            _ => None,
        };
        self.check_exception()?;

        let value = match (tag, result) {
            (TypeTag::Boolean, RtValue::Boolean(v)) => PropertyValue::Boolean(v),
            (TypeTag::Byte, RtValue::Byte(v)) => PropertyValue::Byte(v),
            (TypeTag::Char, RtValue::Char(v)) => PropertyValue::Char(v),
            (TypeTag::Short, RtValue::Short(v)) => PropertyValue::Short(v),
            (TypeTag::Int, RtValue::Int(v)) => PropertyValue::Int(v),
            (TypeTag::Long, RtValue::Long(v)) => PropertyValue::Long(v),
            (TypeTag::Float, RtValue::Float(v)) => PropertyValue::Float(v),
            (TypeTag::Double, RtValue::Double(v)) => PropertyValue::Double(v),
            (TypeTag::String, RtValue::Object(_)) => match held {
                Some(ref s) => PropertyValue::String(Some(self.read_string(s)?)),
                None => PropertyValue::String(None),
            },
            (TypeTag::Bag, RtValue::Object(_)) => match held {
                Some(ref child) => {
                    let child = self.to_bag_at(child.get(), depth + 1)?;
                    PropertyValue::Bag(Some(Box::new(child)))
                }
                None => match method.return_class() {
                    Some(class) => PropertyValue::NullBag(class.to_string()),
                    None => PropertyValue::Bag(None),
                },
            },
            (tag, result) => {
                log::error!(
                    "accessor {}{} returned {:?} for {}",
                    method.accessor_name(),
                    method.descriptor(),
                    result,
                    tag
                );
                return Err(JyError::Internal);
            }
        };
        Ok(value)
    }
}
