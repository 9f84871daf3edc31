use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

use children_tree::{Forest, Insertion, Tree, diff};

fn prepend(forest: &mut Forest, n: usize) -> Tree<usize> {
    let mut tree = forest.empty();
    for i in 0..n {
        tree = forest.insert(&tree, vec![Insertion::new(0, i)]).unwrap();
    }
    tree
}

fn append_batch(forest: &mut Forest, n: usize) -> Tree<usize> {
    let insertions = (0..n).map(|i| Insertion::new(i, i)).collect();
    forest.insert(&forest.empty(), insertions).unwrap()
}

fn insert_middle(forest: &mut Forest, n: usize) -> Tree<usize> {
    let mut tree = forest.empty();
    for i in 0..n {
        tree = forest
            .insert(&tree, vec![Insertion::new(tree.count() / 2, i)])
            .unwrap();
    }
    tree
}

fn insert_random(forest: &mut Forest, n: usize) -> Tree<usize> {
    let mut tree = forest.empty();
    for i in 0..n {
        let p = rand::random::<usize>() % (tree.count() + 1);
        tree = forest.insert(&tree, vec![Insertion::new(p, i)]).unwrap();
    }
    tree
}

fn append_growth(c: &mut Criterion) {
    let mut forest = Forest::seeded(0);
    for n in [1, 10, 100, 1000] {
        c.bench_function(&format!("batch-append {n}"), |b| {
            b.iter(|| append_batch(&mut forest, black_box(n)));
        });
    }
}

fn prepend_growth(c: &mut Criterion) {
    let mut forest = Forest::seeded(0);
    for n in [1, 10, 100, 1000] {
        c.bench_function(&format!("prepend {n}"), |b| {
            b.iter(|| prepend(&mut forest, black_box(n)));
        });
    }
}

fn insert_middle_growth(c: &mut Criterion) {
    let mut forest = Forest::seeded(0);
    for n in [1, 10, 100, 1000] {
        c.bench_function(&format!("insert-middle {n}"), |b| {
            b.iter(|| insert_middle(&mut forest, black_box(n)));
        });
    }
}

fn insert_random_growth(c: &mut Criterion) {
    let mut forest = Forest::seeded(0);
    for n in [1, 10, 100, 1000, 10000] {
        c.bench_function(&format!("insert-random {n}"), |b| {
            b.iter(|| insert_random(&mut forest, black_box(n)));
        });
    }
}

fn reconcile_shuffle(c: &mut Criterion) {
    let mut forest = Forest::seeded(0);
    for n in [10, 100, 1000] {
        let previous: Vec<usize> = (0..n).collect();
        // move every tenth item to the front
        let mut current: Vec<usize> = previous.iter().copied().filter(|i| i % 10 == 0).collect();
        current.extend(previous.iter().copied().filter(|i| i % 10 != 0));
        let tree = append_batch(&mut forest, n);

        c.bench_function(&format!("diff-and-apply {n}"), |b| {
            b.iter_batched(
                || tree.clone(),
                |tree| {
                    let changes = diff(&previous, &current);
                    let tree = forest.remove(&tree, &changes.removes).unwrap();
                    forest.insert(&tree, changes.insertions(&current)).unwrap()
                },
                BatchSize::SmallInput,
            );
        });
    }
}

criterion_group!(
    benches,
    append_growth,
    prepend_growth,
    insert_middle_growth,
    insert_random_growth,
    reconcile_shuffle
);
criterion_main!(benches);
