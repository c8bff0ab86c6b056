//! Bag to object conversion
//!
//! A fresh instance of the bag's class is created through its no-argument
//! constructor, then each property is replayed, in insertion order, as a
//! call to the setter named by the property.

use jnyikes_sdk::signature::{self, OBJECT_CLASS};
use jnyikes_sdk::{
    JyError, JyResult, LocalRef, MethodId, ObjectRef, PropertyBag, PropertyValue, ReturnKind,
    RtValue, TypeTag,
};

use crate::marshal::Marshaller;

const CONSTRUCTOR: (&str, &str) = ("<init>", "()V");

/// Parameter shape of one setter probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SetterParam<'a> {
    /// The property's own type
    Own(TypeTag, Option<&'a str>),
    /// The root object class
    AnyObject,
}

/// One `(parameter, return)` setter shape to try
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SetterCandidate<'a> {
    param: SetterParam<'a>,
    ret: TypeTag,
}

impl SetterCandidate<'_> {
    fn descriptor(&self) -> JyResult<String> {
        match self.param {
            SetterParam::Own(tag, detail) => signature::synthesize(self.ret, None, tag, detail),
            SetterParam::AnyObject => {
                signature::synthesize(self.ret, None, TypeTag::ClassRef, Some(OBJECT_CLASS))
            }
        }
    }
}

/// Setter shapes for `value`, in probe order.
///
/// Own type returning void, own type returning boolean, then for nested
/// bags the root object class returning void and boolean. A null nested
/// bag of unknown class only gets the root object shapes.
fn setter_candidates(value: &PropertyValue) -> Vec<SetterCandidate<'_>> {
    let own = match value {
        PropertyValue::Bag(Some(child)) => child
            .class_name()
            .map(|class| SetterParam::Own(TypeTag::Bag, Some(class))),
        PropertyValue::NullBag(class) => {
            Some(SetterParam::Own(TypeTag::Bag, Some(class.as_str())))
        }
        PropertyValue::Bag(None) => None,
        PropertyValue::ClassRef(class) => class
            .as_deref()
            .map(|class| SetterParam::Own(TypeTag::ClassRef, Some(class))),
        other => Some(SetterParam::Own(other.type_tag(), None)),
    };

    let mut candidates = Vec::with_capacity(4);
    if let Some(param) = own {
        candidates.push(SetterCandidate { param, ret: TypeTag::Void });
        candidates.push(SetterCandidate { param, ret: TypeTag::Boolean });
    }
    if value.type_tag() == TypeTag::Bag {
        candidates.push(SetterCandidate { param: SetterParam::AnyObject, ret: TypeTag::Void });
        candidates.push(SetterCandidate { param: SetterParam::AnyObject, ret: TypeTag::Boolean });
    }
    candidates
}

/// Resolved setter
#[derive(Debug, Clone, Copy)]
struct Setter {
    method: MethodId,
    ret: ReturnKind,
}

impl<'env> Marshaller<'env> {
    /// Build a runtime object from `bag`.
    ///
    /// Fails with `InvalidArgument` for a poisoned or unnamed bag,
    /// `ClassNotFound` when the class or its no-argument constructor is
    /// missing, `NotFound` when a property has no matching setter and
    /// `ExceptionRaised` when the runtime throws. Every reference taken
    /// along the way is released, including the half-built object on
    /// failure.
    pub fn to_object(&self, bag: &PropertyBag) -> JyResult<LocalRef<'env>> {
        if bag.is_poisoned() {
            return Err(JyError::InvalidArgument);
        }
        let class_name = bag.class_name().ok_or(JyError::InvalidArgument)?;
        log::debug!("converting bag of {} ({} properties) to object", class_name, bag.len());

        let env = self.env();
        let class = self.own(env.find_class(class_name), JyError::ClassNotFound)?;
        let (name, descriptor) = CONSTRUCTOR;
        let Some(ctor) = env.get_method_id(class.get(), name, descriptor) else {
            self.clear_exception();
            return Err(JyError::ClassNotFound);
        };
        let obj = env.new_object(class.get(), ctor, &[]);
        let obj = self.own_result(obj)?.ok_or(JyError::Internal)?;

        for property in bag.properties() {
            log::trace!(
                "{}.{} <- {}",
                class_name,
                property.method_name(),
                property.type_tag()
            );
            self.apply_property(class.get(), obj.get(), property.method_name(), property.value())?;
        }
        Ok(obj)
    }

    fn apply_property(
        &self,
        class: ObjectRef,
        obj: ObjectRef,
        setter_name: &str,
        value: &PropertyValue,
    ) -> JyResult<()> {
        if value.type_tag() == TypeTag::ClassRef {
            return Err(JyError::Unimplemented);
        }
        let setter = self.resolve_setter(class, setter_name, value)?;
        let (arg, _temp) = self.to_argument(value)?;
        let args: &[RtValue] = match arg {
            RtValue::Void => &[],
            ref arg => std::slice::from_ref(arg),
        };
        self.env().call_method(obj, setter.method, setter.ret, args);
        self.check_exception()
    }

    fn resolve_setter(&self, class: ObjectRef, name: &str, value: &PropertyValue) -> JyResult<Setter> {
        let env = self.env();
        for candidate in setter_candidates(value) {
            let descriptor = candidate.descriptor()?;
            let method = env.get_method_id(class, name, &descriptor);
            // A failed probe leaves NoSuchMethodError pending
            let threw = env.exception_check();
            if threw {
                env.exception_clear();
            }
            if let (Some(method), false) = (method, threw) {
                log::trace!("setter {}{}", name, descriptor);
                return Ok(Setter {
                    method,
                    ret: ReturnKind::for_tag(candidate.ret),
                });
            }
        }
        log::debug!("no setter {} for {}", name, value.type_tag());
        Err(JyError::NotFound)
    }

    /// Runtime argument for `value`, plus the temporary reference backing it
    fn to_argument(&self, value: &PropertyValue) -> JyResult<(RtValue, Option<LocalRef<'env>>)> {
        let arg = match *value {
            PropertyValue::Boolean(v) => RtValue::Boolean(v),
            PropertyValue::Byte(v) => RtValue::Byte(v),
            PropertyValue::Char(v) => RtValue::Char(v),
            PropertyValue::Short(v) => RtValue::Short(v),
            PropertyValue::Int(v) => RtValue::Int(v),
            PropertyValue::UInt(v) => RtValue::Int(v as i32),
            PropertyValue::Long(v) => RtValue::Long(v),
            PropertyValue::ULong(v) => RtValue::Long(v as i64),
            PropertyValue::Float(v) => RtValue::Float(v),
            PropertyValue::Double(v) => RtValue::Double(v),
            PropertyValue::Void => RtValue::Void,
            PropertyValue::String(None) | PropertyValue::Bag(None) | PropertyValue::NullBag(_) => {
                RtValue::Object(None)
            }
            PropertyValue::String(Some(ref s)) => {
                let s = self.own(self.env().new_string(s), JyError::OutOfMemory)?;
                return Ok((RtValue::Object(Some(s.get())), Some(s)));
            }
            PropertyValue::Bag(Some(ref child)) => {
                let child = self.to_object(child)?;
                return Ok((RtValue::Object(Some(child.get())), Some(child)));
            }
            PropertyValue::ClassRef(_) => return Err(JyError::Unimplemented),
        };
        Ok((arg, None))
    }
}
