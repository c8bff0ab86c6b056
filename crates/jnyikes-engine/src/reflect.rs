//! Reflective queries
//!
//! Class names and method listings come from the runtime's own reflection
//! API, called through ordinary method invocation:
//! `Class.getName()`, `Class.getMethods()` and `Method.toString()`.

use jnyikes_sdk::{JyError, JyResult, LocalRef, ObjectRef, ReturnKind, RtValue};

use crate::marshal::Marshaller;

const GET_NAME: (&str, &str) = ("getName", "()Ljava/lang/String;");
const GET_METHODS: (&str, &str) = ("getMethods", "()[Ljava/lang/reflect/Method;");
const TO_STRING: (&str, &str) = ("toString", "()Ljava/lang/String;");

impl<'env> Marshaller<'env> {
    /// Dotted runtime class name of `obj` (`com.example.Point`)
    pub fn class_name(&self, obj: ObjectRef) -> JyResult<String> {
        let class = self.own(self.env().get_object_class(obj), JyError::InvalidArgument)?;
        self.class_name_of(class.get())
    }

    /// Dotted name of a class object
    pub fn class_name_of(&self, class: ObjectRef) -> JyResult<String> {
        let name = self.call_reflective(class, GET_NAME)?;
        self.read_string(&name)
    }

    /// `Method.toString()` of every public method of `class`, inherited
    /// ones included
    pub fn method_descriptions(&self, class: ObjectRef) -> JyResult<Vec<String>> {
        let env = self.env();
        let array = self.call_reflective(class, GET_METHODS)?;

        let len = env.array_length(array.get());
        let mut out = Vec::new();
        out.try_reserve_exact(len)?;
        for index in 0..len {
            let method = self.own(
                env.array_element(array.get(), index),
                JyError::InvalidArgument,
            )?;
            let text = self.call_reflective(method.get(), TO_STRING)?;
            out.push(self.read_string(&text)?);
        }
        Ok(out)
    }

    /// Copy a runtime string out
    pub(crate) fn read_string(&self, s: &LocalRef<'_>) -> JyResult<String> {
        self.env().read_string(s.get()).ok_or(JyError::OutOfMemory)
    }

    /// Invoke a zero-argument, object-returning reflection method on `target`.
    ///
    /// The method is resolved on `target`'s own class. A missing method or
    /// a null result is `InvalidArgument`.
    fn call_reflective(
        &self,
        target: ObjectRef,
        (name, descriptor): (&str, &str),
    ) -> JyResult<LocalRef<'env>> {
        let env = self.env();
        let class = self.own(env.get_object_class(target), JyError::InvalidArgument)?;
        let method = match env.get_method_id(class.get(), name, descriptor) {
            Some(method) => method,
            None => {
                self.clear_exception();
                return Err(JyError::InvalidArgument);
            }
        };
        drop(class);

        match env.call_method(target, method, ReturnKind::Object, &[]) {
            RtValue::Object(obj) => {
                self.own_result(obj)?.ok_or(JyError::InvalidArgument)
            }
            _ => {
                self.clear_exception();
                Err(JyError::Internal)
            }
        }
    }
}
