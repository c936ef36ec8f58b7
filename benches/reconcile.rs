//! This bench test simulates a search returning results that overlap a large
//! lab listing, where every overlapping component must keep its local
//! request flag.

#![allow(missing_docs)]

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use labinv::{Component, ComponentId, ComponentStore};

fn component(i: usize, request_pending: bool) -> Component {
    Component {
        id: ComponentId::new(format!("CMP{i:05}")).unwrap(),
        name: format!("Component {i}"),
        lab_name: "Electronics Lab".to_string(),
        faculty_name: None,
        department_name: None,
        image: None,
        is_reserved: i % 7 == 0,
        request_pending,
    }
}

/// A store holding a listing of 5000 components, every third one requested.
fn preseed_store() -> ComponentStore {
    let mut store = ComponentStore::new();
    store.replace_lab_view((0..5000).map(|i| component(i, i % 3 == 0)).collect());
    store
}

fn reconcile(c: &mut Criterion) {
    c.bench_function("reconcile overlapping search", |b| {
        b.iter_batched(
            || {
                let fetched: Vec<_> = (2500..7500).map(|i| component(i, false)).collect();
                (preseed_store(), fetched)
            },
            |(mut store, fetched)| store.replace_search_view(fetched),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, reconcile);
criterion_main!(benches);
