//! Accessor discovery
//!
//! Builds the table of zero-argument, value-returning accessors of a class
//! by parsing `Method.toString()` output such as
//!
//! ```text
//! public int com.example.Point.getX()
//! public final com.example.Point com.example.Line.getStart() throws java.io.IOException
//! ```
//!
//! Methods whose qualified name starts with `java.` or `javax.` are skipped.
//! This is a textual test on the declaring class, so it drops the methods
//! every class inherits from the root object class, but it also drops
//! accessors of user classes placed in those namespaces and keeps
//! overrides such as `toString` declared by user classes.

use jnyikes_sdk::signature::{self, tag_for_source_name};
use jnyikes_sdk::{JyError, JyResult, MethodId, ObjectRef, OrderedList, TypeTag};

use crate::marshal::Marshaller;

const RUNTIME_NAMESPACES: [&str; 2] = ["java.", "javax."];

const MODIFIERS: [&str; 10] = [
    "public",
    "protected",
    "private",
    "static",
    "final",
    "synchronized",
    "native",
    "abstract",
    "strictfp",
    "default",
];

/// Accessor shape parsed from one method description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorShape {
    /// Simple method name
    pub name: String,
    /// Return type
    pub return_tag: TypeTag,
    /// Internal class name of a class-typed return
    pub return_class: Option<String>,
}

impl AccessorShape {
    /// Zero-argument descriptor of this accessor
    pub fn descriptor(&self) -> JyResult<String> {
        signature::accessor(self.return_tag, self.return_class.as_deref())
    }
}

/// Parse a `Method.toString()` line.
///
/// Returns `None` for anything that is not a public, non-static,
/// zero-argument, value-returning method outside the runtime's own
/// namespaces, and for return types that cannot be carried by a bag
/// (arrays, generics).
pub fn parse_description(description: &str) -> Option<AccessorShape> {
    let open = description.find('(')?;
    let rest = &description[open + 1..];
    if !rest.trim_start().starts_with(')') {
        return None;
    }

    let mut words: Vec<&str> = description[..open].split_whitespace().collect();
    let qualified = words.pop()?;
    if RUNTIME_NAMESPACES.iter().any(|ns| qualified.starts_with(ns)) {
        return None;
    }
    let name = match qualified.rfind('.') {
        Some(dot) => &qualified[dot + 1..],
        None => qualified,
    };
    if name.is_empty() {
        return None;
    }

    let mut is_public = false;
    let mut return_token = None;
    for word in words {
        match word {
            "public" => is_public = true,
            "static" => return None,
            w if MODIFIERS.contains(&w) => {}
            w if return_token.is_none() => return_token = Some(w),
            _ => return None,
        }
    }
    if !is_public {
        return None;
    }

    let token = return_token?;
    if token.contains(['[', '<', '>']) {
        return None;
    }
    let (return_tag, return_class) = match tag_for_source_name(token) {
        Some(TypeTag::Void) => return None,
        Some(tag) => (tag, None),
        None => (TypeTag::Bag, Some(signature::internal_name(token))),
    };

    Some(AccessorShape {
        name: name.to_string(),
        return_tag,
        return_class,
    })
}

/// One resolved accessor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredMethod {
    accessor_name: String,
    descriptor: String,
    return_tag: TypeTag,
    return_class: Option<String>,
    method_id: MethodId,
}

impl DiscoveredMethod {
    /// Simple method name
    pub fn accessor_name(&self) -> &str {
        &self.accessor_name
    }

    /// Zero-argument descriptor, e.g. `()I`
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// Return type
    pub fn return_tag(&self) -> TypeTag {
        self.return_tag
    }

    /// Declared class of a class-typed return, in internal form
    pub fn return_class(&self) -> Option<&str> {
        self.return_class.as_deref()
    }

    /// Resolved handle
    pub fn method_id(&self) -> MethodId {
        self.method_id
    }
}

/// Accessors of one class, in reflection order.
///
/// Built per conversion; method handles are not kept across calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodTable {
    methods: OrderedList<DiscoveredMethod>,
}

impl MethodTable {
    /// Look up an accessor by name
    pub fn get(&self, accessor_name: &str) -> Option<&DiscoveredMethod> {
        self.methods.find(|m| m.accessor_name == accessor_name)
    }

    /// Iterate accessors
    pub fn iter(&self) -> impl Iterator<Item = &DiscoveredMethod> {
        self.methods.iter()
    }

    /// Number of accessors
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether no accessor was found
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl<'a> IntoIterator for &'a MethodTable {
    type Item = &'a DiscoveredMethod;
    type IntoIter = std::slice::Iter<'a, DiscoveredMethod>;

    fn into_iter(self) -> Self::IntoIter {
        self.methods.iter()
    }
}

impl<'env> Marshaller<'env> {
    /// Build the accessor table of `class`.
    ///
    /// An accepted accessor that cannot be resolved by name and descriptor
    /// fails the whole pass with `InvalidArgument`.
    pub fn discover(&self, class: ObjectRef) -> JyResult<MethodTable> {
        let env = self.env();
        let mut table = MethodTable::default();

        for description in self.method_descriptions(class)? {
            let Some(shape) = parse_description(&description) else {
                continue;
            };
            let descriptor = shape.descriptor()?;
            let Some(method_id) = env.get_method_id(class, &shape.name, &descriptor) else {
                self.clear_exception();
                log::error!(
                    "could not resolve accessor {}{} ({})",
                    shape.name,
                    descriptor,
                    description
                );
                return Err(JyError::InvalidArgument);
            };
            if self.clear_exception() {
                log::error!("exception resolving accessor {}{}", shape.name, descriptor);
                return Err(JyError::InvalidArgument);
            }

            log::trace!("discovered accessor {}{}", shape.name, descriptor);
            table.methods.try_append(DiscoveredMethod {
                accessor_name: shape.name,
                descriptor,
                return_tag: shape.return_tag,
                return_class: shape.return_class,
                method_id,
            })?;
        }
        Ok(table)
    }
}
