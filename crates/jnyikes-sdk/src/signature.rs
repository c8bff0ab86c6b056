//! Method descriptor synthesis
//!
//! The runtime resolves methods by `(name, descriptor)`, so the codes below
//! are a wire contract and must match the runtime's grammar exactly:
//!
//! | Type              | Code                  |
//! |-------------------|-----------------------|
//! | boolean           | `Z`                   |
//! | byte              | `B`                   |
//! | char              | `C`                   |
//! | short             | `S`                   |
//! | int / uint        | `I`                   |
//! | long / ulong      | `J`                   |
//! | float             | `F`                   |
//! | double            | `D`                   |
//! | void              | `V`                   |
//! | string            | `Ljava/lang/String;`  |
//! | nested bag        | `L<bag class>;`       |
//! | class reference   | `L<detail>;`          |

use crate::error::{JyError, JyResult};
use crate::types::TypeTag;

/// Internal name of the runtime's string class
pub const STRING_CLASS: &str = "java/lang/String";

/// Internal name of the runtime's root object class
pub const OBJECT_CLASS: &str = "java/lang/Object";

/// Source-level name of the runtime's string class, as reflection prints it
pub const STRING_CLASS_SOURCE_NAME: &str = "java.lang.String";

/// Append the descriptor code of `tag` to `out`.
///
/// `detail` is the class name for class-like tags and ignored otherwise.
pub fn push_type_code(out: &mut String, tag: TypeTag, detail: Option<&str>) -> JyResult<()> {
    match tag {
        TypeTag::Boolean => out.push('Z'),
        TypeTag::Byte => out.push('B'),
        TypeTag::Char => out.push('C'),
        TypeTag::Short => out.push('S'),
        TypeTag::Int | TypeTag::UInt => out.push('I'),
        TypeTag::Long | TypeTag::ULong => out.push('J'),
        TypeTag::Float => out.push('F'),
        TypeTag::Double => out.push('D'),
        TypeTag::Void => out.push('V'),
        TypeTag::String => push_class(out, STRING_CLASS),
        TypeTag::Bag | TypeTag::ClassRef => match detail {
            Some(class) if !class.is_empty() => push_class(out, class),
            _ => return Err(JyError::InvalidArgument),
        },
    }
    Ok(())
}

/// Descriptor code of a single type
pub fn type_code(tag: TypeTag, detail: Option<&str>) -> JyResult<String> {
    let mut out = String::new();
    push_type_code(&mut out, tag, detail)?;
    Ok(out)
}

/// Build the descriptor `(ParamCode)ReturnCode`.
///
/// A `Void` parameter means "no parameter" and yields `()ReturnCode`.
/// Class-like tags need their detail (the class name); without it the
/// result is [`JyError::InvalidArgument`].
pub fn synthesize(
    ret: TypeTag,
    ret_detail: Option<&str>,
    param: TypeTag,
    param_detail: Option<&str>,
) -> JyResult<String> {
    let mut out = String::with_capacity(
        4 + ret_detail.map_or(0, str::len) + param_detail.map_or(0, str::len),
    );
    out.push('(');
    if param != TypeTag::Void {
        push_type_code(&mut out, param, param_detail)?;
    }
    out.push(')');
    push_type_code(&mut out, ret, ret_detail)?;
    Ok(out)
}

/// Descriptor of a zero-argument accessor returning `ret`
pub fn accessor(ret: TypeTag, ret_detail: Option<&str>) -> JyResult<String> {
    synthesize(ret, ret_detail, TypeTag::Void, None)
}

/// Tag for a source-level type name as printed by reflection.
///
/// Only primitives, `void` and the string class are recognised; any other
/// name is a class and yields `None`.
pub fn tag_for_source_name(name: &str) -> Option<TypeTag> {
    Some(match name {
        "boolean" => TypeTag::Boolean,
        "byte" => TypeTag::Byte,
        "char" => TypeTag::Char,
        "short" => TypeTag::Short,
        "int" => TypeTag::Int,
        "long" => TypeTag::Long,
        "float" => TypeTag::Float,
        "double" => TypeTag::Double,
        "void" => TypeTag::Void,
        STRING_CLASS_SOURCE_NAME => TypeTag::String,
        _ => return None,
    })
}

/// Convert a dotted class name (`com.example.Point`) to its internal form
/// (`com/example/Point`)
pub fn internal_name(source_name: &str) -> String {
    source_name.replace('.', "/")
}

fn push_class(out: &mut String, class: &str) {
    out.push('L');
    out.push_str(class);
    out.push(';');
}
