//! Property bag: a class name plus an ordered list of typed properties
//!
//! A bag describes one runtime object independently of the runtime. Each
//! property is keyed by the accessor that produced it (a setter when the bag
//! is built by hand, a getter when it was read back from an object), and the
//! list order is the order setters are replayed in.
//!
//! A bag that hits an allocation failure becomes poisoned: every mutating
//! call afterwards fails with [`JyError::InvalidArgument`] until the bag is
//! freed.

use crate::error::{JyError, JyResult};
use crate::list::OrderedList;
use crate::types::{try_clone_str, PropertyValue, TypeTag};

/// One property record
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    method_name: String,
    value: PropertyValue,
}

impl Property {
    /// Accessor name
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// Type tag of the payload
    pub fn type_tag(&self) -> TypeTag {
        self.value.type_tag()
    }

    /// Payload
    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    fn try_clone(&self) -> JyResult<Self> {
        Ok(Self {
            method_name: try_clone_str(Some(&self.method_name))?.unwrap_or_default(),
            value: self.value.try_clone()?,
        })
    }
}

/// Runtime-independent description of an object.
///
/// `PropertyBag::default()` is the zero state: no class, no properties, no
/// error. Freeing a bag returns it to that state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyBag {
    class_name: Option<String>,
    properties: OrderedList<Property>,
    error: Option<JyError>,
}

impl PropertyBag {
    /// Create an empty bag for `class_name` (internal, slash-separated form)
    pub fn new(class_name: &str) -> JyResult<Self> {
        if class_name.is_empty() {
            return Err(JyError::InvalidArgument);
        }
        Ok(Self {
            class_name: try_clone_str(Some(class_name))?,
            properties: OrderedList::new(),
            error: None,
        })
    }

    /// Class the bag describes
    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    /// Sticky error, `None` while the bag is usable
    pub fn error(&self) -> Option<JyError> {
        self.error
    }

    /// Whether the bag has a sticky error
    pub fn is_poisoned(&self) -> bool {
        self.error.is_some()
    }

    /// Append a property.
    ///
    /// Nested bags are moved in; pass `bag.clone()` to keep a copy. Absent
    /// payloads (`String(None)`, `Bag(None)`) are stored as absences.
    pub fn set_property(&mut self, accessor_name: &str, value: PropertyValue) -> JyResult<()> {
        if self.error.is_some() || accessor_name.is_empty() {
            return Err(JyError::InvalidArgument);
        }

        let method_name = match try_clone_str(Some(accessor_name)) {
            Ok(name) => name.unwrap_or_default(),
            Err(e) => return Err(self.poison(e)),
        };

        if let Err(e) = self.properties.try_append(Property { method_name, value }) {
            return Err(self.poison(e));
        }
        Ok(())
    }

    /// Remove the first property named `accessor_name` and return its payload
    pub fn remove_property(&mut self, accessor_name: &str) -> JyResult<PropertyValue> {
        if self.error.is_some() {
            return Err(JyError::InvalidArgument);
        }
        self.properties
            .remove_first(|p| p.method_name == accessor_name)
            .map(|p| p.value)
            .ok_or(JyError::NotFound)
    }

    /// Borrow the payload of the first property named `accessor_name`
    pub fn get_property(&self, accessor_name: &str) -> Option<&PropertyValue> {
        self.find(accessor_name).map(Property::value)
    }

    /// Owned copy of the first property named `accessor_name`.
    ///
    /// `tag` must be the type the property was stored with. A stored
    /// absence comes back as the matching `None` payload.
    pub fn get_property_copy(&self, accessor_name: &str, tag: TypeTag) -> JyResult<PropertyValue> {
        let property = self.find(accessor_name).ok_or(JyError::NotFound)?;
        if property.type_tag() != tag {
            return Err(JyError::InvalidArgument);
        }
        property.value.try_clone()
    }

    /// Copy the first property named `accessor_name` into `dest`.
    ///
    /// Strings are truncated to fit and always NUL-terminated; stored
    /// absences zero-fill `dest`. Returns the number of bytes written.
    pub fn get_property_buf(
        &self,
        accessor_name: &str,
        tag: TypeTag,
        dest: &mut [u8],
    ) -> JyResult<usize> {
        let property = self.find(accessor_name).ok_or(JyError::NotFound)?;
        if property.type_tag() != tag {
            return Err(JyError::InvalidArgument);
        }

        if property.value.is_null() {
            dest.fill(0);
            return Ok(0);
        }

        let bytes = property
            .value
            .encoded_bytes()
            .ok_or(JyError::Unimplemented)?;

        match tag.fixed_size() {
            Some(size) => {
                if size > dest.len() {
                    return Err(JyError::InvalidArgument);
                }
                dest[..size].copy_from_slice(&bytes);
                Ok(size)
            }
            None => {
                if dest.is_empty() {
                    return Err(JyError::InvalidArgument);
                }
                let n = bytes.len().min(dest.len());
                dest[..n].copy_from_slice(&bytes[..n]);
                dest[n - 1] = 0;
                Ok(n)
            }
        }
    }

    /// Properties in insertion order
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter()
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether the bag has no properties
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Release the class name and every property (nested bags included) and
    /// clear the sticky error. Safe on a zero-state bag.
    pub fn free(&mut self) {
        self.class_name = None;
        self.properties.destroy();
        self.error = None;
    }

    /// Deep copy that reports allocation failure instead of aborting
    pub fn try_clone(&self) -> JyResult<Self> {
        let mut properties = OrderedList::new();
        for property in &self.properties {
            properties.try_append(property.try_clone()?)?;
        }
        Ok(Self {
            class_name: try_clone_str(self.class_name.as_deref())?,
            properties,
            error: self.error,
        })
    }

    fn find(&self, accessor_name: &str) -> Option<&Property> {
        self.properties.find(|p| p.method_name == accessor_name)
    }

    fn poison(&mut self, e: JyError) -> JyError {
        self.error = Some(e);
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_values() -> Vec<PropertyValue> {
        vec![
            PropertyValue::String(Some("hello".to_string())),
            PropertyValue::Int(-42),
            PropertyValue::UInt(42),
            PropertyValue::Double(3.25),
            PropertyValue::Float(-0.5),
            PropertyValue::Long(1 << 40),
            PropertyValue::ULong(u64::MAX - 1),
            PropertyValue::Boolean(true),
            PropertyValue::Byte(-128),
            PropertyValue::Char(b'x' as u16),
            PropertyValue::Short(i16::MAX),
            PropertyValue::Void,
        ]
    }

    #[test]
    fn test_new_rejects_empty_class() {
        assert_eq!(PropertyBag::new(""), Err(JyError::InvalidArgument));
        let bag = PropertyBag::new("com/example/Point").unwrap();
        assert_eq!(bag.class_name(), Some("com/example/Point"));
        assert!(bag.is_empty());
        assert_eq!(bag.error(), None);
    }

    #[test]
    fn test_set_then_copy_is_byte_equal() {
        let mut bag = PropertyBag::new("Sample").unwrap();
        for (i, v) in sample_values().into_iter().enumerate() {
            bag.set_property(&format!("set{}", i), v).unwrap();
        }
        for (i, v) in sample_values().into_iter().enumerate() {
            let copy = bag.get_property_copy(&format!("set{}", i), v.type_tag()).unwrap();
            assert_eq!(copy.encoded_bytes(), v.encoded_bytes());
            assert_eq!(copy, v);
        }
    }

    #[test]
    fn test_copy_with_other_type_is_invalid() {
        let mut bag = PropertyBag::new("Sample").unwrap();
        bag.set_property("setX", PropertyValue::Int(1)).unwrap();
        assert_eq!(
            bag.get_property_copy("setX", TypeTag::Long),
            Err(JyError::InvalidArgument)
        );
        assert_eq!(
            bag.get_property_copy("setY", TypeTag::Int),
            Err(JyError::NotFound)
        );
    }

    #[test]
    fn test_empty_accessor_rejected() {
        let mut bag = PropertyBag::new("Sample").unwrap();
        assert_eq!(
            bag.set_property("", PropertyValue::Int(1)),
            Err(JyError::InvalidArgument)
        );
        assert!(bag.is_empty());
        assert!(!bag.is_poisoned());
    }

    #[test]
    fn test_first_match_wins() {
        let mut bag = PropertyBag::new("Sample").unwrap();
        bag.set_property("setX", PropertyValue::Int(1)).unwrap();
        bag.set_property("setX", PropertyValue::Int(2)).unwrap();
        assert_eq!(bag.get_property("setX"), Some(&PropertyValue::Int(1)));
        assert_eq!(bag.len(), 2);

        assert_eq!(bag.remove_property("setX"), Ok(PropertyValue::Int(1)));
        assert_eq!(bag.get_property("setX"), Some(&PropertyValue::Int(2)));
        assert_eq!(bag.remove_property("setZ"), Err(JyError::NotFound));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut bag = PropertyBag::new("Sample").unwrap();
        for name in ["setC", "setA", "setB"] {
            bag.set_property(name, PropertyValue::Boolean(false)).unwrap();
        }
        let names: Vec<_> = bag.properties().map(|p| p.method_name()).collect();
        assert_eq!(names, vec!["setC", "setA", "setB"]);
    }

    #[test]
    fn test_poisoned_bag_rejects_mutation() {
        let mut bag = PropertyBag::new("Sample").unwrap();
        bag.set_property("setX", PropertyValue::Int(1)).unwrap();
        bag.poison(JyError::OutOfMemory);

        assert_eq!(
            bag.set_property("setY", PropertyValue::Int(2)),
            Err(JyError::InvalidArgument)
        );
        assert_eq!(bag.remove_property("setX"), Err(JyError::InvalidArgument));
        assert_eq!(bag.len(), 1);
        assert_eq!(bag.error(), Some(JyError::OutOfMemory));

        bag.free();
        assert_eq!(bag.error(), None);
        assert!(bag.is_empty());
        assert_eq!(bag.class_name(), None);
    }

    #[test]
    fn test_null_payloads() {
        let mut bag = PropertyBag::new("Sample").unwrap();
        bag.set_property("setName", PropertyValue::String(None)).unwrap();
        bag.set_property("setChild", PropertyValue::Bag(None)).unwrap();

        assert_eq!(
            bag.get_property_copy("setName", TypeTag::String),
            Ok(PropertyValue::String(None))
        );
        assert_eq!(
            bag.get_property_copy("setChild", TypeTag::Bag),
            Ok(PropertyValue::Bag(None))
        );

        let mut buf = [0xAAu8; 8];
        assert_eq!(bag.get_property_buf("setName", TypeTag::String, &mut buf), Ok(0));
        assert_eq!(buf, [0u8; 8]);
    }

    #[test]
    fn test_buf_truncates_strings() {
        let mut bag = PropertyBag::new("Sample").unwrap();
        bag.set_property("setName", PropertyValue::String(Some("abcdef".to_string())))
            .unwrap();

        let mut small = [0xFFu8; 4];
        assert_eq!(bag.get_property_buf("setName", TypeTag::String, &mut small), Ok(4));
        assert_eq!(&small, b"abc\0");

        let mut large = [0xFFu8; 16];
        assert_eq!(bag.get_property_buf("setName", TypeTag::String, &mut large), Ok(7));
        assert_eq!(&large[..7], b"abcdef\0");
        assert_eq!(large[7], 0xFF);

        assert_eq!(
            bag.get_property_buf("setName", TypeTag::String, &mut []),
            Err(JyError::InvalidArgument)
        );
    }

    #[test]
    fn test_buf_fixed_size_capacity() {
        let mut bag = PropertyBag::new("Sample").unwrap();
        bag.set_property("setId", PropertyValue::Long(0x0102_0304_0506_0708)).unwrap();

        let mut short = [0u8; 4];
        assert_eq!(
            bag.get_property_buf("setId", TypeTag::Long, &mut short),
            Err(JyError::InvalidArgument)
        );

        let mut exact = [0u8; 8];
        assert_eq!(bag.get_property_buf("setId", TypeTag::Long, &mut exact), Ok(8));
        assert_eq!(i64::from_ne_bytes(exact), 0x0102_0304_0506_0708);
    }

    #[test]
    fn test_nested_bag_is_moved_and_freed() {
        let mut child = PropertyBag::new("Point").unwrap();
        child.set_property("setX", PropertyValue::Int(3)).unwrap();

        let mut parent = PropertyBag::new("Line").unwrap();
        parent
            .set_property("setStart", PropertyValue::Bag(Some(Box::new(child.clone()))))
            .unwrap();
        parent
            .set_property("setEnd", PropertyValue::Bag(Some(Box::new(child))))
            .unwrap();

        match parent.get_property_copy("setStart", TypeTag::Bag).unwrap() {
            PropertyValue::Bag(Some(copy)) => {
                assert_eq!(copy.class_name(), Some("Point"));
                assert_eq!(copy.get_property("setX"), Some(&PropertyValue::Int(3)));
            }
            other => panic!("unexpected payload {:?}", other),
        }

        let mut buf = [0u8; 8];
        assert_eq!(
            parent.get_property_buf("setStart", TypeTag::Bag, &mut buf),
            Err(JyError::Unimplemented)
        );

        parent.free();
        assert!(parent.is_empty());
    }

    #[test]
    fn test_free_zero_state_is_noop() {
        let mut bag = PropertyBag::default();
        bag.free();
        bag.free();
        assert_eq!(bag, PropertyBag::default());
    }

    #[test]
    fn test_try_clone_is_deep() {
        let mut child = PropertyBag::new("Point").unwrap();
        child.set_property("setX", PropertyValue::Int(3)).unwrap();
        let mut parent = PropertyBag::new("Line").unwrap();
        parent
            .set_property("setStart", PropertyValue::Bag(Some(Box::new(child))))
            .unwrap();

        let copy = parent.try_clone().unwrap();
        parent.free();
        assert_eq!(copy.len(), 1);
        assert_eq!(copy.class_name(), Some("Line"));
    }
}
