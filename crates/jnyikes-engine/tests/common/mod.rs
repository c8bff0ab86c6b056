//! Classes shared by the integration tests

#![allow(dead_code)]

use jnyikes_sdk::{PropertyBag, PropertyValue};
use jnyikes_sim::{ClassDef, JType, SimRuntime, Throw, Value};

pub const POINT: &str = "com/example/Point";
pub const LINE: &str = "com/example/Line";
pub const SAMPLE: &str = "com/example/Sample";
pub const HOLDER: &str = "com/example/Holder";
pub const TALLY: &str = "com/example/Tally";
pub const NODE: &str = "com/example/Node";
pub const FRAGILE: &str = "com/example/Fragile";
pub const GRUMPY: &str = "com/example/Grumpy";
pub const NO_CTOR: &str = "com/example/NoCtor";
pub const EMPTY: &str = "com/example/Empty";
pub const INBOX: &str = "com/example/Inbox";

/// Runtime with every fixture class defined
pub fn runtime() -> SimRuntime {
    let rt = SimRuntime::new();
    rt.define(ClassDef::new(POINT).property("X", JType::Int).property("Y", JType::Int))
        .define(
            ClassDef::new(LINE)
                .property("Start", JType::Object(POINT.into()))
                .field("End", JType::Object(POINT.into()))
                .method("getEnd", "()Lcom/example/Point;", |f| Ok(f.this_field("End")))
                .method("setEnd", "(Ljava/lang/Object;)V", |f| {
                    let value = f.arg(0);
                    f.set_this_field("End", value);
                    Ok(Value::Void)
                }),
        )
        .define(
            ClassDef::new(SAMPLE)
                .property("Flag", JType::Boolean)
                .property("Small", JType::Byte)
                .property("Letter", JType::Char)
                .property("Count", JType::Short)
                .property("Number", JType::Int)
                .property("Big", JType::Long)
                .property("Ratio", JType::Float)
                .property("Precise", JType::Double)
                .property("Label", JType::String),
        )
        .define(
            ClassDef::new(HOLDER)
                .field("Value", JType::Object("java/lang/Object".into()))
                .method("getValue", "()Ljava/lang/Object;", |f| Ok(f.this_field("Value")))
                .method("setValue", "(Ljava/lang/Object;)Z", |f| {
                    let value = f.arg(0);
                    f.set_this_field("Value", value);
                    Ok(Value::Boolean(true))
                }),
        )
        .define(
            ClassDef::new(TALLY)
                .field("Count", JType::Int)
                .method("getCount", "()I", |f| Ok(f.this_field("Count")))
                .method("setCount", "(I)Z", |f| {
                    let value = f.arg(0);
                    f.set_this_field("Count", value);
                    Ok(Value::Boolean(true))
                })
                .method("reset", "()V", |f| {
                    f.set_this_field("Count", Value::Int(0));
                    Ok(Value::Void)
                }),
        )
        .define(ClassDef::new(NODE).property("Next", JType::Object(NODE.into())))
        .define(
            ClassDef::new(FRAGILE)
                .method("setX", "(I)V", |_| Err(Throw::new("java/lang/IllegalArgumentException")))
                .method("getBroken", "()I", |_| Err(Throw::new("java/lang/IllegalStateException"))),
        )
        .define(
            ClassDef::new(GRUMPY)
                .constructor(|_| Err(Throw::new("java/lang/UnsupportedOperationException"))),
        )
        .define(ClassDef::new(NO_CTOR).without_constructor())
        .define(ClassDef::new(EMPTY))
        .define(
            ClassDef::new(INBOX)
                .static_method("deliver", "(Lcom/example/Point;)Z", |f| {
                    let value = f.arg(0);
                    f.set_static("last", value);
                    Ok(Value::Boolean(true))
                })
                .static_method("reject", "(Lcom/example/Point;)Z", |_| Ok(Value::Boolean(false)))
                .static_method("explode", "(Lcom/example/Point;)Z", |_| {
                    Err(Throw::new("java/lang/RuntimeException"))
                })
                .static_method("notify", "(Lcom/example/Point;)V", |_| Ok(Value::Void)),
        );
    rt
}

/// `Point` bag with the given coordinates
pub fn point(x: i32, y: i32) -> PropertyBag {
    let mut bag = PropertyBag::new(POINT).unwrap();
    bag.set_property("setX", PropertyValue::Int(x)).unwrap();
    bag.set_property("setY", PropertyValue::Int(y)).unwrap();
    bag
}
