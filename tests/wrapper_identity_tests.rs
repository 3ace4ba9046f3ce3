//! Integration tests for profiled proxies: identity and transparency

use tickprof::clock::{ManualClock, ManualCycle};
use tickprof::host::{Function, Object, Thrown, Value};
use tickprof::{Profiler, ProfilerError};

fn setup() -> (Profiler, ManualCycle) {
    let cycle = ManualCycle::new(0);
    let profiler = Profiler::builder(cycle.clone())
        .cost_clock(ManualClock::new())
        .build();
    profiler.enable();
    (profiler, cycle)
}

fn add() -> Function {
    Function::builder(Some("add"))
        .source("function add(a, b) { return a + b; }")
        .build(|_, args| {
            let a = args.first().and_then(Value::as_number).unwrap_or(0.0);
            let b = args.get(1).and_then(Value::as_number).unwrap_or(0.0);
            Ok(Value::from(a + b))
        })
}

#[test]
fn test_double_wrap_always_fails() {
    let (profiler, _) = setup();
    let once = profiler.register_function(&add(), None).unwrap();
    for name in [None, Some("add"), Some("other")] {
        let err = profiler.register_function(&once, name).unwrap_err();
        assert!(matches!(err, ProfilerError::DoubleWrap { .. }));
    }
}

#[test]
fn test_result_identical_inactive_and_active() {
    let (profiler, cycle) = setup();
    let original = add();
    let wrapped = profiler.register_function(&original, None).unwrap();
    let args = [Value::from(2), Value::from(40)];

    let expected = original.call(&Value::Undefined, &args).unwrap();
    assert_eq!(wrapped.call(&Value::Undefined, &args).unwrap(), expected);

    profiler.profile(Some(5), None);
    cycle.tick();
    assert!(profiler.is_active());
    assert_eq!(wrapped.call(&Value::Undefined, &args).unwrap(), expected);
}

#[test]
fn test_errors_propagate_unchanged() {
    let (profiler, cycle) = setup();
    profiler.background(None);
    cycle.tick();

    let thrower = Function::native("thrower", |_, _| {
        Err(Thrown(Value::from("invalid target")))
    });
    let wrapped = profiler.register_function(&thrower, None).unwrap();
    let err = wrapped.call(&Value::Undefined, &[]).unwrap_err();
    assert_eq!(err.value(), &Value::from("invalid target"));
}

#[test]
fn test_receiver_is_forwarded() {
    let (profiler, _) = setup();
    let returns_this = Function::native("returnsThis", |this, _| Ok(this.clone()));
    let wrapped = profiler.register_function(&returns_this, None).unwrap();

    let receiver = Value::from(Object::new());
    assert_eq!(wrapped.call(&receiver, &[]).unwrap(), receiver);
}

#[test]
fn test_bound_receiver_survives_wrapping() {
    let (profiler, _) = setup();
    let scope = Object::new();
    let returns_this = Function::native("returnsThis", |this, _| Ok(this.clone()));
    let bound = returns_this.bind(Value::from(scope.clone()));
    let wrapped = profiler.register_function(&bound, None).unwrap();

    let result = wrapped.call(&Value::from(Object::new()), &[]).unwrap();
    assert_eq!(result, Value::from(scope));
}

#[test]
fn test_custom_properties_are_copied() {
    let (profiler, _) = setup();
    let f = add();
    f.props().insert("testProperty", "hello");
    let wrapped = profiler.register_function(&f, None).unwrap();
    assert_eq!(wrapped.props().get("testProperty").unwrap(), Value::from("hello"));
}

#[test]
fn test_construct_through_proxy_yields_original_instance() {
    let (profiler, cycle) = setup();
    let point = Function::class("Point", |this, args| {
        if let Some(obj) = this.as_object() {
            obj.insert("x", args.first().cloned().unwrap_or_default());
        }
        Ok(Value::Undefined)
    });
    let wrapped = profiler.register_function(&point, None).unwrap();
    assert!(wrapped.is_constructor());

    profiler.profile(None, None);
    cycle.tick();
    let instance = wrapped.construct(&[Value::from(3)]).unwrap();
    let obj = instance.as_object().unwrap();
    assert!(obj.instance_of(&point));
    assert!(obj.instance_of(&wrapped));
    assert_eq!(obj.get("x").unwrap(), Value::from(3));
    profiler.with_state(|state| assert_eq!(state.unwrap().map["Point"].calls, 1));
}

#[test]
fn test_text_representation_embeds_original() {
    let (profiler, _) = setup();
    let f = add();
    let wrapped = profiler.register_function(&f, None).unwrap();
    assert!(wrapped.to_string().contains("function add(a, b) { return a + b; }"));
}

#[test]
fn test_identity_exposes_original() {
    let (profiler, _) = setup();
    let f = add();
    let wrapped = profiler.register_function(&f, Some("Math.add")).unwrap();
    let identity = wrapped.identity().unwrap();
    assert!(identity.original().ptr_eq(&f));
    assert_eq!(identity.display_name(), "Math.add");
}
