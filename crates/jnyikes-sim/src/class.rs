//! Class definitions
//!
//! Classes are declared with [`ClassDef`] and registered with
//! [`SimRuntime::define`](crate::SimRuntime::define). Method bodies are
//! host closures run against a [`Frame`].

use std::sync::Arc;

use crate::heap::{Heap, ObjectId, Value};

/// Exception thrown by a method body, named by its class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Throw {
    /// Internal class name of the exception
    pub class: String,
}

impl Throw {
    /// Throw an exception of `class`
    pub fn new(class: impl Into<String>) -> Self {
        Self { class: class.into() }
    }
}

/// Method implementation
pub type MethodBody = Arc<dyn Fn(&mut Frame<'_>) -> Result<Value, Throw> + Send + Sync>;

/// Box a closure as a [`MethodBody`]
pub fn method_body<F>(body: F) -> MethodBody
where
    F: Fn(&mut Frame<'_>) -> Result<Value, Throw> + Send + Sync + 'static,
{
    Arc::new(body)
}

/// Field and return types of bean properties
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JType {
    /// `boolean`
    Boolean,
    /// `byte`
    Byte,
    /// `char`
    Char,
    /// `short`
    Short,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `float`
    Float,
    /// `double`
    Double,
    /// `java.lang.String`
    String,
    /// Any other class, by internal name
    Object(String),
}

impl JType {
    /// Descriptor code
    pub fn descriptor(&self) -> String {
        match self {
            JType::Boolean => "Z".to_string(),
            JType::Byte => "B".to_string(),
            JType::Char => "C".to_string(),
            JType::Short => "S".to_string(),
            JType::Int => "I".to_string(),
            JType::Long => "J".to_string(),
            JType::Float => "F".to_string(),
            JType::Double => "D".to_string(),
            JType::String => "Ljava/lang/String;".to_string(),
            JType::Object(class) => format!("L{};", class),
        }
    }

    /// Value of a fresh field
    pub fn default_value(&self) -> Value {
        match self {
            JType::Boolean => Value::Boolean(false),
            JType::Byte => Value::Byte(0),
            JType::Char => Value::Char(0),
            JType::Short => Value::Short(0),
            JType::Int => Value::Int(0),
            JType::Long => Value::Long(0),
            JType::Float => Value::Float(0.0),
            JType::Double => Value::Double(0.0),
            JType::String | JType::Object(_) => Value::Object(None),
        }
    }
}

/// One method
#[derive(Clone)]
pub struct MethodDef {
    /// Simple name
    pub name: String,
    /// Descriptor, e.g. `(I)V`
    pub descriptor: String,
    /// Modifier words printed by reflection
    pub modifiers: String,
    /// Static method
    pub is_static: bool,
    /// Implementation
    pub body: MethodBody,
}

impl std::fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}{}", self.modifiers, self.name, self.descriptor)
    }
}

/// Class declaration
#[derive(Debug, Clone)]
pub struct ClassDef {
    pub(crate) name: String,
    pub(crate) superclass: Option<String>,
    pub(crate) fields: Vec<(String, Value)>,
    pub(crate) methods: Vec<MethodDef>,
}

impl ClassDef {
    /// Class `name` (internal form) extending the root object class, with a
    /// no-op no-argument constructor
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            superclass: Some(crate::OBJECT.to_string()),
            fields: Vec::new(),
            methods: Vec::new(),
        }
        .constructor(|_| Ok(()))
    }

    /// Root of the hierarchy
    pub(crate) fn root(name: &str) -> Self {
        Self {
            name: name.to_string(),
            superclass: None,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Set the superclass
    pub fn extends(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    /// Declare a field
    pub fn field(mut self, name: impl Into<String>, ty: JType) -> Self {
        self.fields.push((name.into(), ty.default_value()));
        self
    }

    /// Declare field `name` with `get<name>` and `set<name>` accessors
    pub fn property(self, name: &str, ty: JType) -> Self {
        let getter_field = name.to_string();
        let setter_field = name.to_string();
        let code = ty.descriptor();
        self.field(name, ty)
            .method(&format!("get{}", name), &format!("(){}", code), move |frame| {
                Ok(frame.this_field(&getter_field))
            })
            .method(&format!("set{}", name), &format!("({})V", code), move |frame| {
                let value = frame.arg(0);
                frame.set_this_field(&setter_field, value);
                Ok(Value::Void)
            })
    }

    /// Declare a public instance method
    pub fn method<F>(self, name: &str, descriptor: &str, body: F) -> Self
    where
        F: Fn(&mut Frame<'_>) -> Result<Value, Throw> + Send + Sync + 'static,
    {
        self.raw_method(MethodDef {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            modifiers: "public".to_string(),
            is_static: false,
            body: method_body(body),
        })
    }

    /// Declare a public static method
    pub fn static_method<F>(self, name: &str, descriptor: &str, body: F) -> Self
    where
        F: Fn(&mut Frame<'_>) -> Result<Value, Throw> + Send + Sync + 'static,
    {
        self.raw_method(MethodDef {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            modifiers: "public static".to_string(),
            is_static: true,
            body: method_body(body),
        })
    }

    /// Replace the no-argument constructor
    pub fn constructor<F>(mut self, body: F) -> Self
    where
        F: Fn(&mut Frame<'_>) -> Result<(), Throw> + Send + Sync + 'static,
    {
        self.methods.retain(|m| m.name != "<init>");
        self.raw_method(MethodDef {
            name: "<init>".to_string(),
            descriptor: "()V".to_string(),
            modifiers: "public".to_string(),
            is_static: false,
            body: method_body(move |frame| body(frame).map(|()| Value::Void)),
        })
    }

    /// Remove the no-argument constructor
    pub fn without_constructor(mut self) -> Self {
        self.methods.retain(|m| m.name != "<init>");
        self
    }

    /// Declare a method with full control over its flags
    pub fn raw_method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }
}

/// Execution context of one method body
pub struct Frame<'h> {
    pub(crate) heap: &'h mut Heap,
    pub(crate) class: String,
    pub(crate) this: Option<ObjectId>,
    pub(crate) args: Vec<Value>,
}

impl Frame<'_> {
    /// Receiver of an instance method
    pub fn this(&self) -> Option<ObjectId> {
        self.this
    }

    /// Argument `index`, `Void` when absent
    pub fn arg(&self, index: usize) -> Value {
        self.args.get(index).copied().unwrap_or(Value::Void)
    }

    /// All arguments
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Field of the receiver
    pub fn this_field(&self, name: &str) -> Value {
        self.this
            .and_then(|obj| self.heap.field(obj, name))
            .unwrap_or(Value::Void)
    }

    /// Store a field of the receiver
    pub fn set_this_field(&mut self, name: &str, value: Value) {
        if let Some(obj) = self.this {
            self.heap.set_field(obj, name, value);
        }
    }

    /// Field of any object
    pub fn field(&self, obj: ObjectId, name: &str) -> Option<Value> {
        self.heap.field(obj, name)
    }

    /// Allocate a string
    pub fn new_string(&mut self, s: &str) -> ObjectId {
        self.heap.new_string(s)
    }

    /// Contents of a string object
    pub fn string(&self, obj: ObjectId) -> Option<String> {
        self.heap.string(obj).map(str::to_string)
    }

    /// Class of an object
    pub fn class_of(&self, obj: ObjectId) -> Option<String> {
        self.heap.class_of(obj).map(str::to_string)
    }

    /// Store a static field of the executing class
    pub fn set_static(&mut self, name: &str, value: Value) {
        let class = self.class.clone();
        self.heap.set_static(&class, name, value);
    }

    /// Static field of the executing class
    pub fn static_field(&self, name: &str) -> Option<Value> {
        self.heap.static_field(&self.class, name)
    }
}
