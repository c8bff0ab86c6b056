//! Delivering bags to static receivers

mod common;

use common::*;
use jnyikes_engine::{send, Marshaller};
use jnyikes_sdk::{JyError, PropertyBag, PropertyValue};
use jnyikes_sim::Value;

#[test]
fn test_send_delivers_object() {
    let rt = runtime();
    let env = rt.env();

    send(&env, &point(3, 4), INBOX, "deliver").unwrap();

    let delivered = match rt.static_field(INBOX, "last") {
        Some(Value::Object(Some(id))) => id,
        other => panic!("nothing delivered: {:?}", other),
    };
    assert_eq!(rt.class_of(delivered).as_deref(), Some(POINT));
    assert_eq!(rt.field(delivered, "X"), Some(Value::Int(3)));
    assert_eq!(rt.field(delivered, "Y"), Some(Value::Int(4)));
    assert_eq!(env.live_local_refs(), 0);
    assert_eq!(env.misuse_count(), 0);
}

#[test]
fn test_send_rejected_by_receiver() {
    let rt = runtime();
    let env = rt.env();

    assert_eq!(
        send(&env, &point(1, 1), INBOX, "reject").unwrap_err(),
        JyError::ExceptionRaised
    );
    assert_eq!(env.live_local_refs(), 0);
}

#[test]
fn test_send_receiver_throws() {
    let rt = runtime();
    let env = rt.env();

    assert_eq!(
        send(&env, &point(1, 1), INBOX, "explode").unwrap_err(),
        JyError::ExceptionRaised
    );
    assert_eq!(env.pending_exception(), None);
    assert_eq!(env.described(), vec!["java/lang/RuntimeException".to_string()]);
    assert_eq!(env.live_local_refs(), 0);
}

#[test]
fn test_send_lookup_failures() {
    let rt = runtime();
    let env = rt.env();
    let m = Marshaller::new(&env);

    assert_eq!(
        m.send(&point(1, 1), "com/example/Nowhere", "deliver").unwrap_err(),
        JyError::ClassNotFound
    );
    assert_eq!(
        m.send(&point(1, 1), INBOX, "missing").unwrap_err(),
        JyError::NotFound
    );
    // receivers must return boolean
    assert_eq!(
        m.send(&point(1, 1), INBOX, "notify").unwrap_err(),
        JyError::NotFound
    );
    assert_eq!(env.pending_exception(), None);
    assert_eq!(env.live_local_refs(), 0);
    assert_eq!(env.misuse_count(), 0);
}

#[test]
fn test_send_conversion_failure() {
    let rt = runtime();
    let env = rt.env();

    let mut bag = point(1, 1);
    bag.set_property("setZ", PropertyValue::Int(0)).unwrap();
    assert_eq!(send(&env, &bag, INBOX, "deliver").unwrap_err(), JyError::NotFound);
    assert_eq!(rt.static_field(INBOX, "last"), None);
    assert_eq!(env.live_local_refs(), 0);
}

#[test]
fn test_send_invalid_arguments() {
    let rt = runtime();
    let env = rt.env();

    assert_eq!(
        send(&env, &point(1, 1), "", "deliver").unwrap_err(),
        JyError::InvalidArgument
    );
    assert_eq!(
        send(&env, &point(1, 1), INBOX, "").unwrap_err(),
        JyError::InvalidArgument
    );
    assert_eq!(
        send(&env, &PropertyBag::default(), INBOX, "deliver").unwrap_err(),
        JyError::InvalidArgument
    );
}
