use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use darkroom_mirror::{classify, reconcile, LayerChange, LayerDescription, LayerKind, LayerTree};

fn wide_tree(n: u64) -> LayerTree {
    let descs: Vec<LayerDescription> = (0..n)
        .map(|id| LayerDescription {
            id,
            index: Some(id as usize),
            name: Some(format!("Layer {}", id)),
            kind: LayerKind::Layer,
            bounds: None,
            layers: Vec::new(),
        })
        .collect();
    LayerTree::from_descriptions(&descs).unwrap()
}

fn reverse_reorder(n: u64) -> Vec<LayerChange> {
    (0..n)
        .map(|id| LayerChange {
            id,
            index: Some((n - 1 - id) as usize),
            ..Default::default()
        })
        .collect()
}

fn classify_reverse_reorder(c: &mut Criterion) {
    let tree = wide_tree(512);
    let directives = reverse_reorder(512);

    c.bench_function("classify_reverse_reorder_512", |b| {
        b.iter(|| classify(black_box(&tree), black_box(&directives)))
    });
}

fn reconcile_reverse_reorder(c: &mut Criterion) {
    let tree = wide_tree(512);
    let directives = reverse_reorder(512);
    let changes = classify(&tree, &directives).unwrap();

    c.bench_function("reconcile_reverse_reorder_512", |b| {
        b.iter_batched(
            || tree.clone(),
            |mut tree| reconcile(&mut tree, black_box(&changes), black_box(&directives)),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, classify_reverse_reorder, reconcile_reverse_reorder);
criterion_main!(benches);
