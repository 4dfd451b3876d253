use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nodescan::config::InventoryConfig;
use nodescan::inventory::{Collector, FetchResult};
use nodescan::k8s::{NodeDetail, SchedulingEligibility};
use nodescan::NodeScanError;
use std::collections::BTreeMap;
use std::io;

fn results(count: usize) -> Vec<FetchResult> {
    (0..count)
        .map(|i| {
            let id = format!("node-{:04}", i);
            if i % 10 == 0 {
                return FetchResult::failure(id.clone(), NodeScanError::NodeNotFound { name: id });
            }

            let mut attributes = BTreeMap::new();
            if i % 3 == 0 {
                attributes.insert("consul.version".to_string(), "1.17.0".to_string());
            }
            let node = NodeDetail {
                id: id.clone(),
                name: format!("{}.cluster.local", id),
                attributes,
                eligibility: if i % 4 == 0 {
                    SchedulingEligibility::Ineligible
                } else {
                    SchedulingEligibility::Eligible
                },
                address: format!("10.0.{}.{}", i / 250, i % 250),
            };
            FetchResult::success(id, node)
        })
        .collect()
}

fn bench_collector(c: &mut Criterion) {
    let config = InventoryConfig::default();

    c.bench_function("collector_record_1000", |b| {
        b.iter_batched(
            || results(1000),
            |batch| {
                let mut collector = Collector::new(io::sink(), &config, batch.len());
                for result in batch {
                    collector.record(result).unwrap();
                }
                black_box(collector.summary())
            },
            criterion::BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_collector);
criterion_main!(benches);
