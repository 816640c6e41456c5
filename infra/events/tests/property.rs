use herald_event_bus::{EventBus, EventPayload, Handler};
use proptest::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const HANDLERS: usize = 4;

#[derive(Debug, Clone, Copy)]
enum Op {
    On(usize),
    Off(usize),
    Emit,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..HANDLERS).prop_map(Op::On),
        (0..HANDLERS).prop_map(Op::Off),
        Just(Op::Emit),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn registrations_follow_a_multiset_model(ops in proptest::collection::vec(op(), 0..40)) {
        let bus = EventBus::new();
        let event = bus.create_event("model");

        let counts: Vec<Arc<AtomicUsize>> = (0..HANDLERS).map(|_| Arc::default()).collect();
        let handlers: Vec<Handler> = counts
            .iter()
            .map(|count| {
                let count = Arc::clone(count);
                Handler::new(move |_: &EventPayload, _: &[String]| {
                    count.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        let mut registered = [0usize; HANDLERS];
        let mut expected = [0usize; HANDLERS];

        for op in ops {
            match op {
                Op::On(i) => {
                    bus.on(&event, handlers[i].clone());
                    registered[i] += 1;
                },
                Op::Off(i) => {
                    bus.off(&event, &handlers[i]);
                    registered[i] = 0;
                },
                Op::Emit => {
                    let scheduled = bus.emit(&event, "tick");
                    prop_assert_eq!(scheduled, registered.iter().sum::<usize>());
                    for (total, now) in expected.iter_mut().zip(registered) {
                        *total += now;
                    }
                },
            }
            prop_assert_eq!(bus.handler_count(&event), registered.iter().sum::<usize>());
        }

        bus.wait();
        prop_assert_eq!(bus.in_flight(), 0);
        for (count, want) in counts.iter().zip(expected) {
            prop_assert_eq!(count.load(Ordering::SeqCst), want);
        }
    }
}
