//! Delivering a bag to a static receiving method

use jnyikes_sdk::signature;
use jnyikes_sdk::{JyError, JyResult, PropertyBag, ReturnKind, RtValue, TypeTag};

use crate::marshal::Marshaller;

impl<'env> Marshaller<'env> {
    /// Convert `bag` and pass it to the static method
    /// `boolean receiver_method(<bag class>)` of `receiver_class`.
    ///
    /// A poisoned bag fails with its own sticky error. The receiver
    /// returning `false` counts as `ExceptionRaised`, as does a throw.
    pub fn send(&self, bag: &PropertyBag, receiver_class: &str, receiver_method: &str) -> JyResult<()> {
        if let Some(err) = bag.error() {
            return Err(err);
        }
        if receiver_class.is_empty() || receiver_method.is_empty() {
            return Err(JyError::InvalidArgument);
        }
        let bag_class = bag.class_name().ok_or(JyError::InvalidArgument)?;
        let descriptor =
            signature::synthesize(TypeTag::Boolean, None, TypeTag::ClassRef, Some(bag_class))?;
        log::debug!("sending {} to {}.{}{}", bag_class, receiver_class, receiver_method, descriptor);

        let env = self.env();
        let class = self.own(env.find_class(receiver_class), JyError::ClassNotFound)?;
        let Some(method) = env.get_static_method_id(class.get(), receiver_method, &descriptor) else {
            self.clear_exception();
            return Err(JyError::NotFound);
        };
        if self.clear_exception() {
            return Err(JyError::NotFound);
        }

        let obj = self.to_object(bag)?;
        let accepted = env.call_static_method(
            class.get(),
            method,
            ReturnKind::Boolean,
            &[RtValue::Object(Some(obj.get()))],
        );
        drop(obj);
        drop(class);
        self.check_exception()?;

        match accepted {
            RtValue::Boolean(true) => Ok(()),
            _ => {
                log::debug!("{}.{} rejected {}", receiver_class, receiver_method, bag_class);
                Err(JyError::ExceptionRaised)
            }
        }
    }
}
