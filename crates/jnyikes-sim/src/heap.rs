//! Object heap and class registry
//!
//! Objects are never collected; an [`ObjectId`] stays valid for the life
//! of the runtime. What the engine sees are local references, which live
//! in each env and map to these ids.

use std::collections::HashMap;
use std::sync::Arc;

use jnyikes_sdk::ReturnKind;

use crate::class::{method_body, ClassDef, Frame, MethodDef, Throw};
use crate::{CLASS, METHOD, OBJECT, STRING};

/// Heap identity of an object
pub type ObjectId = u64;

/// Value stored in fields and passed to method bodies
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// No value
    Void,
    /// `boolean`
    Boolean(bool),
    /// `byte`
    Byte(i8),
    /// `char`
    Char(u16),
    /// `short`
    Short(i16),
    /// `int`
    Int(i32),
    /// `long`
    Long(i64),
    /// `float`
    Float(f32),
    /// `double`
    Double(f64),
    /// Reference; `None` is null
    Object(Option<ObjectId>),
}

#[derive(Debug, Clone)]
enum ObjectData {
    Fields(HashMap<String, Value>),
    Str(String),
    Array(Vec<ObjectId>),
    Class(String),
    Method(usize),
}

#[derive(Debug, Clone)]
struct Object {
    class: String,
    data: ObjectData,
}

#[derive(Debug, Clone)]
struct ClassInfo {
    superclass: Option<String>,
    fields: Vec<(String, Value)>,
    methods: Vec<usize>,
}

#[derive(Debug, Clone)]
pub(crate) struct MethodEntry {
    pub(crate) class: String,
    pub(crate) def: MethodDef,
    pub(crate) description: String,
}

impl MethodEntry {
    /// Call primitive the descriptor's return type requires
    pub(crate) fn return_kind(&self) -> ReturnKind {
        let ret = self.def.descriptor.rsplit(')').next().unwrap_or("");
        match ret.chars().next() {
            Some('Z') => ReturnKind::Boolean,
            Some('B') => ReturnKind::Byte,
            Some('C') => ReturnKind::Char,
            Some('S') => ReturnKind::Short,
            Some('I') => ReturnKind::Int,
            Some('J') => ReturnKind::Long,
            Some('F') => ReturnKind::Float,
            Some('D') => ReturnKind::Double,
            Some('L') | Some('[') => ReturnKind::Object,
            _ => ReturnKind::Void,
        }
    }
}

/// All runtime state shared between threads
#[derive(Debug, Default)]
pub struct Heap {
    objects: Vec<Object>,
    classes: HashMap<String, ClassInfo>,
    class_objects: HashMap<String, ObjectId>,
    methods: Vec<MethodEntry>,
    statics: HashMap<(String, String), Value>,
}

impl Heap {
    /// Heap with the runtime's own classes defined
    pub(crate) fn with_builtins() -> Self {
        let mut heap = Heap::default();
        for class in builtin_classes() {
            heap.define(class);
        }
        heap
    }

    pub(crate) fn define(&mut self, class: ClassDef) {
        let source = source_class_name(&class.name);
        let mut methods = Vec::with_capacity(class.methods.len());
        for def in class.methods {
            let description = describe(&source, &def);
            methods.push(self.methods.len());
            self.methods.push(MethodEntry {
                class: class.name.clone(),
                def,
                description,
            });
        }
        self.classes.insert(
            class.name,
            ClassInfo {
                superclass: class.superclass,
                fields: class.fields,
                methods,
            },
        );
    }

    pub(crate) fn is_defined(&self, class: &str) -> bool {
        self.classes.contains_key(class)
    }

    fn alloc(&mut self, class: &str, data: ObjectData) -> ObjectId {
        self.objects.push(Object {
            class: class.to_string(),
            data,
        });
        self.objects.len() as ObjectId
    }

    fn object(&self, id: ObjectId) -> Option<&Object> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.objects.get(index)
    }

    fn object_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.objects.get_mut(index)
    }

    /// Allocate an instance with default field values, constructor not run
    pub(crate) fn new_instance(&mut self, class: &str) -> Option<ObjectId> {
        let mut fields = HashMap::new();
        let mut next = Some(class.to_string());
        while let Some(name) = next {
            let info = self.classes.get(&name)?;
            for (field, value) in &info.fields {
                fields.entry(field.clone()).or_insert(*value);
            }
            next = info.superclass.clone();
        }
        Some(self.alloc(class, ObjectData::Fields(fields)))
    }

    pub(crate) fn new_string(&mut self, s: &str) -> ObjectId {
        self.alloc(STRING, ObjectData::Str(s.to_string()))
    }

    pub(crate) fn string(&self, id: ObjectId) -> Option<&str> {
        match &self.object(id)?.data {
            ObjectData::Str(s) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn class_of(&self, id: ObjectId) -> Option<&str> {
        self.object(id).map(|obj| obj.class.as_str())
    }

    pub(crate) fn field(&self, id: ObjectId, name: &str) -> Option<Value> {
        match &self.object(id)?.data {
            ObjectData::Fields(fields) => fields.get(name).copied(),
            _ => None,
        }
    }

    pub(crate) fn set_field(&mut self, id: ObjectId, name: &str, value: Value) {
        if let Some(Object {
            data: ObjectData::Fields(fields),
            ..
        }) = self.object_mut(id)
        {
            fields.insert(name.to_string(), value);
        }
    }

    pub(crate) fn static_field(&self, class: &str, name: &str) -> Option<Value> {
        self.statics
            .get(&(class.to_string(), name.to_string()))
            .copied()
    }

    pub(crate) fn set_static(&mut self, class: &str, name: &str, value: Value) {
        self.statics
            .insert((class.to_string(), name.to_string()), value);
    }

    /// The single class object standing for `class`
    pub(crate) fn class_object(&mut self, class: &str) -> ObjectId {
        if let Some(id) = self.class_objects.get(class) {
            return *id;
        }
        let id = self.alloc(CLASS, ObjectData::Class(class.to_string()));
        self.class_objects.insert(class.to_string(), id);
        id
    }

    /// Class a class object stands for
    pub(crate) fn class_named_by(&self, id: ObjectId) -> Option<&str> {
        match &self.object(id)?.data {
            ObjectData::Class(name) => Some(name),
            _ => None,
        }
    }

    pub(crate) fn array(&self, id: ObjectId) -> Option<&[ObjectId]> {
        match &self.object(id)?.data {
            ObjectData::Array(items) => Some(items),
            _ => None,
        }
    }

    pub(crate) fn method(&self, index: usize) -> Option<&MethodEntry> {
        self.methods.get(index)
    }

    /// Find a method on `class` or its superclasses
    pub(crate) fn find_method(
        &self,
        class: &str,
        name: &str,
        descriptor: &str,
        is_static: bool,
    ) -> Option<usize> {
        let mut next = Some(class);
        while let Some(current) = next {
            let info = self.classes.get(current)?;
            let found = info.methods.iter().copied().find(|&index| {
                let def = &self.methods[index].def;
                def.name == name && def.descriptor == descriptor && def.is_static == is_static
            });
            if found.is_some() {
                return found;
            }
            // constructors are not inherited
            if name == "<init>" {
                return None;
            }
            next = info.superclass.as_deref();
        }
        None
    }

    /// Public methods of `class` as reflection lists them: own methods
    /// first, then inherited ones not overridden
    fn public_methods(&self, class: &str) -> Vec<usize> {
        let mut out: Vec<usize> = Vec::new();
        let mut next = Some(class);
        while let Some(current) = next {
            let Some(info) = self.classes.get(current) else {
                break;
            };
            for &index in &info.methods {
                let def = &self.methods[index].def;
                if def.name == "<init>" {
                    continue;
                }
                let overridden = out.iter().any(|&seen| {
                    let seen = &self.methods[seen].def;
                    seen.name == def.name && seen.descriptor == def.descriptor
                });
                if !overridden {
                    out.push(index);
                }
            }
            next = info.superclass.as_deref();
        }
        out
    }

    /// Run a method body
    pub(crate) fn invoke(
        &mut self,
        index: usize,
        this: Option<ObjectId>,
        args: Vec<Value>,
    ) -> Result<Value, Throw> {
        let Some(entry) = self.methods.get(index) else {
            return Err(Throw::new("java/lang/NoSuchMethodError"));
        };
        let class = entry.class.clone();
        let body = Arc::clone(&entry.def.body);
        let mut frame = Frame {
            heap: self,
            class,
            this,
            args,
        };
        body(&mut frame)
    }
}

/// Dotted form of an internal class name
pub(crate) fn source_class_name(internal: &str) -> String {
    internal.replace('/', ".")
}

/// Source-level type names of a descriptor: `(parameters, return)`
fn source_types(descriptor: &str) -> Option<(Vec<String>, String)> {
    let mut chars = descriptor.strip_prefix('(')?.chars().peekable();
    let mut params = Vec::new();
    while chars.peek() != Some(&')') {
        params.push(source_type(&mut chars)?);
    }
    chars.next();
    let ret = source_type(&mut chars)?;
    Some((params, ret))
}

fn source_type(chars: &mut impl Iterator<Item = char>) -> Option<String> {
    Some(match chars.next()? {
        'Z' => "boolean".to_string(),
        'B' => "byte".to_string(),
        'C' => "char".to_string(),
        'S' => "short".to_string(),
        'I' => "int".to_string(),
        'J' => "long".to_string(),
        'F' => "float".to_string(),
        'D' => "double".to_string(),
        'V' => "void".to_string(),
        'L' => {
            let name: String = chars.take_while(|&c| c != ';').collect();
            source_class_name(&name)
        }
        '[' => format!("{}[]", source_type(chars)?),
        _ => return None,
    })
}

/// `Method.toString()` text
fn describe(declaring: &str, def: &MethodDef) -> String {
    let (params, ret) = source_types(&def.descriptor)
        .unwrap_or_else(|| (Vec::new(), "void".to_string()));
    format!(
        "{} {} {}.{}({})",
        def.modifiers,
        ret,
        declaring,
        def.name,
        params.join(",")
    )
}

fn builtin<F>(name: &str, descriptor: &str, modifiers: &str, body: F) -> MethodDef
where
    F: Fn(&mut Frame<'_>) -> Result<Value, Throw> + Send + Sync + 'static,
{
    MethodDef {
        name: name.to_string(),
        descriptor: descriptor.to_string(),
        modifiers: modifiers.to_string(),
        is_static: false,
        body: method_body(body),
    }
}

fn builtin_classes() -> Vec<ClassDef> {
    let object = ClassDef::root(OBJECT)
        .constructor(|_| Ok(()))
        .raw_method(builtin(
            "getClass",
            "()Ljava/lang/Class;",
            "public final native",
            |frame| {
                let this = frame.this.ok_or_else(|| Throw::new("java/lang/NullPointerException"))?;
                let class = frame.heap.class_of(this).unwrap_or(OBJECT).to_string();
                Ok(Value::Object(Some(frame.heap.class_object(&class))))
            },
        ))
        .raw_method(builtin(
            "hashCode",
            "()I",
            "public native",
            |frame| Ok(Value::Int(frame.this.unwrap_or(0) as i32)),
        ))
        .raw_method(builtin(
            "toString",
            "()Ljava/lang/String;",
            "public",
            |frame| {
                let this = frame.this.unwrap_or(0);
                let class = frame.heap.class_of(this).unwrap_or(OBJECT).to_string();
                let text = format!("{}@{:x}", source_class_name(&class), this);
                Ok(Value::Object(Some(frame.heap.new_string(&text))))
            },
        ))
        .raw_method(builtin(
            "equals",
            "(Ljava/lang/Object;)Z",
            "public",
            |frame| Ok(Value::Boolean(frame.arg(0) == Value::Object(frame.this))),
        ))
        .raw_method(builtin(
            "wait",
            "()V",
            "public final",
            |_| Ok(Value::Void),
        ));

    let class = ClassDef::new(CLASS)
        .without_constructor()
        .raw_method(builtin(
            "getName",
            "()Ljava/lang/String;",
            "public",
            |frame| {
                let this = frame.this.unwrap_or(0);
                let name = frame
                    .heap
                    .class_named_by(this)
                    .map(source_class_name)
                    .ok_or_else(|| Throw::new("java/lang/IllegalStateException"))?;
                Ok(Value::Object(Some(frame.heap.new_string(&name))))
            },
        ))
        .raw_method(builtin(
            "getMethods",
            "()[Ljava/lang/reflect/Method;",
            "public",
            |frame| {
                let this = frame.this.unwrap_or(0);
                let class = frame
                    .heap
                    .class_named_by(this)
                    .map(str::to_string)
                    .ok_or_else(|| Throw::new("java/lang/IllegalStateException"))?;
                let methods = frame.heap.public_methods(&class);
                let items = methods
                    .into_iter()
                    .map(|index| frame.heap.alloc(METHOD, ObjectData::Method(index)))
                    .collect();
                let array = frame
                    .heap
                    .alloc("[Ljava/lang/reflect/Method;", ObjectData::Array(items));
                Ok(Value::Object(Some(array)))
            },
        ));

    let method = ClassDef::new(METHOD).without_constructor().raw_method(builtin(
        "toString",
        "()Ljava/lang/String;",
        "public",
        |frame| {
            let this = frame.this.unwrap_or(0);
            let text = match frame.heap.object(this).map(|obj| &obj.data) {
                Some(ObjectData::Method(index)) => frame.heap.methods[*index].description.clone(),
                _ => return Err(Throw::new("java/lang/IllegalStateException")),
            };
            Ok(Value::Object(Some(frame.heap.new_string(&text))))
        },
    ));

    let string = ClassDef::new(STRING).without_constructor();

    vec![object, class, method, string]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::JType;

    #[test]
    fn test_descriptions() {
        let mut heap = Heap::with_builtins();
        heap.define(
            ClassDef::new("com/example/Point")
                .property("X", JType::Int)
                .property("Next", JType::Object("com/example/Point".into())),
        );
        let class = heap.class_object("com/example/Point");
        let methods = heap.public_methods("com/example/Point");
        let texts: Vec<&str> = methods
            .iter()
            .map(|&i| heap.method(i).unwrap().description.as_str())
            .collect();
        assert_eq!(texts[0], "public int com.example.Point.getX()");
        assert_eq!(texts[1], "public void com.example.Point.setX(int)");
        assert_eq!(
            texts[2],
            "public com.example.Point com.example.Point.getNext()"
        );
        assert!(texts.contains(&"public final native java.lang.Class java.lang.Object.getClass()"));
        assert!(!texts.iter().any(|t| t.contains("<init>")));
        assert_eq!(heap.class_named_by(class), Some("com/example/Point"));
    }

    #[test]
    fn test_instance_fields_and_constructor_lookup() {
        let mut heap = Heap::with_builtins();
        heap.define(ClassDef::new("Point").property("X", JType::Int));
        let obj = heap.new_instance("Point").unwrap();
        assert_eq!(heap.field(obj, "X"), Some(Value::Int(0)));
        heap.set_field(obj, "X", Value::Int(5));
        assert_eq!(heap.field(obj, "X"), Some(Value::Int(5)));

        assert!(heap.find_method("Point", "<init>", "()V", false).is_some());
        assert!(heap.find_method(CLASS, "<init>", "()V", false).is_none());
        assert!(heap.find_method("Point", "hashCode", "()I", false).is_some());
        assert!(heap.find_method("Point", "getX", "()J", false).is_none());
        assert!(heap.new_instance("Missing").is_none());
    }
}
