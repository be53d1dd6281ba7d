#![allow(missing_docs)]

use std::sync::Arc;

use loupe::{FormatterCache, Inspect, Inspector};
use rayon::prelude::*;

#[derive(Inspect)]
struct Reading {
    sensor: u16,
    value: f64,
    unit: &'static str,
}

#[derive(Inspect)]
enum Event {
    Sample { reading: Reading },
    Gap(u32),
}

#[test]
fn concurrent_first_use_publishes_one_formatter() {
    let cache = FormatterCache::new();
    let layout = Reading {
        sensor: 0,
        value: 0.0,
        unit: "C",
    }
    .layout()
    .expect("derived layout");

    let compiled: Vec<_> = (0..64)
        .into_par_iter()
        .map(|_| cache.compiled(layout))
        .collect();

    assert_eq!(cache.len(), 1);
    assert!(compiled.iter().all(|c| Arc::ptr_eq(c, &compiled[0])));
    let names: Vec<_> = compiled[0].slots().iter().map(|s| s.name).collect();
    assert_eq!(names, ["sensor", "unit", "value"]);
}

#[test]
fn parallel_rendering_is_deterministic() {
    let events: Vec<Event> = (0..256)
        .map(|i| {
            if i % 3 == 0 {
                Event::Gap(i)
            } else {
                Event::Sample {
                    reading: Reading {
                        sensor: (i % 7) as u16,
                        value: f64::from(i) / 2.0,
                        unit: "C",
                    },
                }
            }
        })
        .collect();

    let inspector = Inspector::builder().visit_budget(-1).build();
    let parallel: Vec<String> = events.par_iter().map(|e| inspector.stringify(e)).collect();
    let sequential: Vec<String> = events.iter().map(|e| inspector.stringify(e)).collect();
    assert_eq!(parallel, sequential);
    assert_eq!(parallel[0], "Event::Gap(0)");
    assert_eq!(
        parallel[1],
        "Event::Sample { reading: Reading { sensor: 1, unit: C, value: 0.5 } }"
    );

    let cache = FormatterCache::global();
    let gap = Event::Gap(1).layout().expect("variant layout");
    assert!(cache.contains(gap));
}
