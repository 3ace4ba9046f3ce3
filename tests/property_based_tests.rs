//! Property-based tests for the profiler core
//!
//! Properties covered:
//! 1. Proxies are transparent, active or not
//! 2. Call counts are exact once a session is active
//! 3. Caller breakdowns partition the total call count
//! 4. The table report never exceeds its character budget
//! 5. Windowing follows the armed cycle and duration

use proptest::prelude::*;

use tickprof::clock::{ManualClock, ManualCycle};
use tickprof::host::{Function, Value};
use tickprof::sink::MemorySink;
use tickprof::Profiler;

fn profiler(start: u64) -> (Profiler, ManualClock, ManualCycle) {
    let clock = ManualClock::new();
    let cycle = ManualCycle::new(start);
    let profiler = Profiler::builder(cycle.clone())
        .cost_clock(clock.clone())
        .console(MemorySink::new())
        .notifier(MemorySink::new())
        .build();
    profiler.enable();
    (profiler, clock, cycle)
}

fn polynomial() -> Function {
    Function::native("polynomial", |_, args| {
        let x = args.first().and_then(Value::as_number).unwrap_or(0.0);
        let y = args.get(1).and_then(Value::as_number).unwrap_or(0.0);
        Ok(Value::from(x * x - 3.0 * y + 7.0))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_wrapping_is_transparent(x in -1e6f64..1e6, y in -1e6f64..1e6, active in any::<bool>()) {
        let (profiler, _, cycle) = profiler(0);
        let original = polynomial();
        let wrapped = profiler.register_function(&original, None).unwrap();
        if active {
            profiler.background(None);
            cycle.tick();
        }
        let args = [Value::from(x), Value::from(y)];
        prop_assert_eq!(
            wrapped.call(&Value::Undefined, &args).unwrap(),
            original.call(&Value::Undefined, &args).unwrap()
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_call_count_exact(before in 0usize..20, during in 1usize..200) {
        let (profiler, _, cycle) = profiler(10);
        let f = profiler.register_function(&polynomial(), Some("leaf")).unwrap();
        for _ in 0..before {
            f.call(&Value::Undefined, &[]).unwrap();
        }
        profiler.stream(Some(5), None);
        cycle.tick();
        for _ in 0..during {
            f.call(&Value::Undefined, &[]).unwrap();
        }
        let calls = profiler.with_state(|state| state.unwrap().map["leaf"].calls);
        prop_assert_eq!(calls, during as u64);
    }

    #[test]
    fn prop_caller_breakdown_partitions_calls(via_parent in 0usize..30, direct in 0usize..30) {
        prop_assume!(via_parent + direct > 0);
        let (profiler, _, cycle) = profiler(0);
        let child = profiler.register_function(&polynomial(), Some("child")).unwrap();
        let inner = child.clone();
        let parent = Function::native("parent", move |_, _| inner.call(&Value::Undefined, &[]));
        let parent = profiler.register_function(&parent, None).unwrap();

        profiler.background(None);
        cycle.tick();
        for _ in 0..via_parent {
            parent.call(&Value::Undefined, &[]).unwrap();
        }
        for _ in 0..direct {
            child.call(&Value::Undefined, &[]).unwrap();
        }

        profiler.with_state(|state| {
            let record = &state.unwrap().map["child"];
            assert_eq!(record.calls, (via_parent + direct) as u64);
            let by_parent = record.by_caller("parent").map_or(0, |r| r.calls);
            assert_eq!(by_parent, via_parent as u64);
            let sum: u64 = record.callers.values().map(|r| r.calls).sum();
            assert_eq!(sum, record.calls);
        });
    }

    #[test]
    fn prop_output_never_exceeds_limit(
        names in prop::collection::vec("[A-Za-z]{1,12}(\\.[a-z]{1,12})?", 0..200),
        limit in 0usize..2000,
    ) {
        let (profiler, clock, cycle) = profiler(0);
        profiler.profile(None, None);
        cycle.tick();
        for name in &names {
            profiler.measure(name, || clock.advance(0.25));
        }
        prop_assert!(profiler.output(Some(limit)).len() <= limit);
        prop_assert!(profiler.output(None).len() <= 1000);
    }

    #[test]
    fn prop_windowing(start in 0u64..1_000_000, duration in 1u64..500, offset in 0u64..1000) {
        let (profiler, _, cycle) = profiler(start);
        profiler.callgrind(Some(duration), None);
        let at = start + offset;
        cycle.set(at);
        let expected = at > start && at <= start + duration;
        prop_assert_eq!(profiler.is_active(), expected);
    }
}
