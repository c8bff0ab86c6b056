//! Property type tags and typed payloads

use crate::bag::PropertyBag;
use crate::error::{JyError, JyResult};

/// Type of a property stored in a [`PropertyBag`].
///
/// The discriminants are the legacy wire values and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeTag {
    /// Runtime string
    String = 1,
    /// 32-bit signed integer
    Int = 2,
    /// 32-bit unsigned integer (passed to the runtime as `int`)
    UInt = 3,
    /// 64-bit float
    Double = 4,
    /// 32-bit float
    Float = 5,
    /// 64-bit signed integer
    Long = 6,
    /// 64-bit unsigned integer (passed to the runtime as `long`)
    ULong = 7,
    /// Boolean
    Boolean = 8,
    /// 8-bit signed integer
    Byte = 9,
    /// UTF-16 code unit
    Char = 10,
    /// 16-bit signed integer
    Short = 11,
    /// No value
    Void = 12,
    /// Nested property bag
    Bag = 13,
    /// Reference to a runtime class, named by its internal name
    ClassRef = 14,
}

impl TypeTag {
    /// Every tag, in wire order
    pub const ALL: [TypeTag; 14] = [
        TypeTag::String,
        TypeTag::Int,
        TypeTag::UInt,
        TypeTag::Double,
        TypeTag::Float,
        TypeTag::Long,
        TypeTag::ULong,
        TypeTag::Boolean,
        TypeTag::Byte,
        TypeTag::Char,
        TypeTag::Short,
        TypeTag::Void,
        TypeTag::Bag,
        TypeTag::ClassRef,
    ];

    /// Legacy wire value
    pub const fn as_raw(self) -> u8 {
        self as u8
    }

    /// Tag for a legacy wire value
    pub fn from_raw(raw: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_raw() == raw)
    }

    /// Byte size of a fixed-size payload, `None` for variable or absent ones
    pub const fn fixed_size(self) -> Option<usize> {
        match self {
            TypeTag::Boolean | TypeTag::Byte => Some(1),
            TypeTag::Char | TypeTag::Short => Some(2),
            TypeTag::Int | TypeTag::UInt | TypeTag::Float => Some(4),
            TypeTag::Long | TypeTag::ULong | TypeTag::Double => Some(8),
            TypeTag::String | TypeTag::Void | TypeTag::Bag | TypeTag::ClassRef => None,
        }
    }

    /// Whether descriptors for this tag need a class name
    pub const fn is_class_like(self) -> bool {
        matches!(self, TypeTag::Bag | TypeTag::ClassRef)
    }

    /// Human-readable name
    pub const fn name(self) -> &'static str {
        match self {
            TypeTag::String => "string",
            TypeTag::Int => "int",
            TypeTag::UInt => "uint",
            TypeTag::Double => "double",
            TypeTag::Float => "float",
            TypeTag::Long => "long",
            TypeTag::ULong => "ulong",
            TypeTag::Boolean => "boolean",
            TypeTag::Byte => "byte",
            TypeTag::Char => "char",
            TypeTag::Short => "short",
            TypeTag::Void => "void",
            TypeTag::Bag => "bag",
            TypeTag::ClassRef => "class",
        }
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed payload of a property.
///
/// `None` in the nullable variants is a real absence (a runtime `null`), not
/// an error.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// String payload
    String(Option<String>),
    /// `int` payload
    Int(i32),
    /// `uint` payload
    UInt(u32),
    /// `double` payload
    Double(f64),
    /// `float` payload
    Float(f32),
    /// `long` payload
    Long(i64),
    /// `ulong` payload
    ULong(u64),
    /// `boolean` payload
    Boolean(bool),
    /// `byte` payload
    Byte(i8),
    /// `char` payload
    Char(u16),
    /// `short` payload
    Short(i16),
    /// No payload
    Void,
    /// Nested bag, owned exclusively by the enclosing property
    Bag(Option<Box<PropertyBag>>),
    /// Absent nested bag whose class is known (internal name), so typed
    /// setters can still be matched
    NullBag(String),
    /// Runtime class reference, by internal class name
    ClassRef(Option<String>),
}

impl PropertyValue {
    /// Type tag of this payload
    pub const fn type_tag(&self) -> TypeTag {
        match self {
            PropertyValue::String(_) => TypeTag::String,
            PropertyValue::Int(_) => TypeTag::Int,
            PropertyValue::UInt(_) => TypeTag::UInt,
            PropertyValue::Double(_) => TypeTag::Double,
            PropertyValue::Float(_) => TypeTag::Float,
            PropertyValue::Long(_) => TypeTag::Long,
            PropertyValue::ULong(_) => TypeTag::ULong,
            PropertyValue::Boolean(_) => TypeTag::Boolean,
            PropertyValue::Byte(_) => TypeTag::Byte,
            PropertyValue::Char(_) => TypeTag::Char,
            PropertyValue::Short(_) => TypeTag::Short,
            PropertyValue::Void => TypeTag::Void,
            PropertyValue::Bag(_) | PropertyValue::NullBag(_) => TypeTag::Bag,
            PropertyValue::ClassRef(_) => TypeTag::ClassRef,
        }
    }

    /// Whether the payload is absent
    pub const fn is_null(&self) -> bool {
        matches!(
            self,
            PropertyValue::String(None)
                | PropertyValue::Bag(None)
                | PropertyValue::NullBag(_)
                | PropertyValue::ClassRef(None)
                | PropertyValue::Void
        )
    }

    /// Native-endian byte image of the payload.
    ///
    /// Strings include their terminating NUL. Returns `None` for absent
    /// payloads and for nested bags, which have no flat image.
    pub fn encoded_bytes(&self) -> Option<Vec<u8>> {
        let bytes = match self {
            PropertyValue::String(Some(s)) | PropertyValue::ClassRef(Some(s)) => {
                let mut bytes = Vec::with_capacity(s.len() + 1);
                bytes.extend_from_slice(s.as_bytes());
                bytes.push(0);
                bytes
            }
            PropertyValue::Int(v) => v.to_ne_bytes().to_vec(),
            PropertyValue::UInt(v) => v.to_ne_bytes().to_vec(),
            PropertyValue::Double(v) => v.to_ne_bytes().to_vec(),
            PropertyValue::Float(v) => v.to_ne_bytes().to_vec(),
            PropertyValue::Long(v) => v.to_ne_bytes().to_vec(),
            PropertyValue::ULong(v) => v.to_ne_bytes().to_vec(),
            PropertyValue::Boolean(v) => vec![*v as u8],
            PropertyValue::Byte(v) => v.to_ne_bytes().to_vec(),
            PropertyValue::Char(v) => v.to_ne_bytes().to_vec(),
            PropertyValue::Short(v) => v.to_ne_bytes().to_vec(),
            PropertyValue::String(None)
            | PropertyValue::ClassRef(None)
            | PropertyValue::Void
            | PropertyValue::Bag(_)
            | PropertyValue::NullBag(_) => return None,
        };
        Some(bytes)
    }

    /// Deep copy that reports allocation failure instead of aborting
    pub fn try_clone(&self) -> JyResult<Self> {
        Ok(match self {
            PropertyValue::String(s) => PropertyValue::String(try_clone_str(s.as_deref())?),
            PropertyValue::ClassRef(s) => PropertyValue::ClassRef(try_clone_str(s.as_deref())?),
            PropertyValue::Bag(Some(bag)) => PropertyValue::Bag(Some(Box::new(bag.try_clone()?))),
            PropertyValue::Bag(None) => PropertyValue::Bag(None),
            PropertyValue::NullBag(class) => {
                PropertyValue::NullBag(try_clone_str(Some(class))?.unwrap_or_default())
            }
            other => other.clone(),
        })
    }
}

pub(crate) fn try_clone_str(s: Option<&str>) -> JyResult<Option<String>> {
    match s {
        Some(s) => {
            let mut owned = String::new();
            owned.try_reserve_exact(s.len()).map_err(JyError::from)?;
            owned.push_str(s);
            Ok(Some(owned))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_round_trip() {
        for tag in TypeTag::ALL {
            assert_eq!(TypeTag::from_raw(tag.as_raw()), Some(tag));
        }
        assert_eq!(TypeTag::from_raw(0), None);
        assert_eq!(TypeTag::from_raw(15), None);
        assert_eq!(TypeTag::Bag.as_raw(), 13);
    }

    #[test]
    fn test_fixed_sizes() {
        assert_eq!(TypeTag::Boolean.fixed_size(), Some(1));
        assert_eq!(TypeTag::Char.fixed_size(), Some(2));
        assert_eq!(TypeTag::Int.fixed_size(), Some(4));
        assert_eq!(TypeTag::Double.fixed_size(), Some(8));
        assert_eq!(TypeTag::String.fixed_size(), None);
        assert_eq!(TypeTag::Bag.fixed_size(), None);
    }

    #[test]
    fn test_encoded_bytes_match_fixed_size() {
        let values = [
            PropertyValue::Int(-7),
            PropertyValue::UInt(7),
            PropertyValue::Double(1.5),
            PropertyValue::Float(2.5),
            PropertyValue::Long(i64::MIN),
            PropertyValue::ULong(u64::MAX),
            PropertyValue::Boolean(true),
            PropertyValue::Byte(-1),
            PropertyValue::Char(0x263A),
            PropertyValue::Short(-300),
        ];
        for v in values {
            let size = v.type_tag().fixed_size().unwrap();
            assert_eq!(v.encoded_bytes().unwrap().len(), size, "{:?}", v);
        }
    }

    #[test]
    fn test_string_bytes_are_terminated() {
        let v = PropertyValue::String(Some("abc".to_string()));
        assert_eq!(v.encoded_bytes().unwrap(), b"abc\0");
        assert!(PropertyValue::String(None).encoded_bytes().is_none());
    }

    #[test]
    fn test_nullness() {
        assert!(PropertyValue::Void.is_null());
        assert!(PropertyValue::Bag(None).is_null());
        assert!(!PropertyValue::Int(0).is_null());
        let typed = PropertyValue::NullBag("com/example/Point".to_string());
        assert!(typed.is_null());
        assert_eq!(typed.type_tag(), TypeTag::Bag);
        assert!(typed.encoded_bytes().is_none());
        assert_eq!(typed.try_clone(), Ok(typed.clone()));
    }
}
