use std::time::Instant;

use children_tree::{Forest, Insertion, Reconciler, TreeConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// One edit to a list of unique ids.
#[derive(Debug, Clone, Copy)]
enum Edit {
    Insert { at: usize, id: u32 },
    Remove { at: usize },
}

impl Edit {
    fn apply(self, list: &mut Vec<u32>) {
        match self {
            Edit::Insert { at, id } => list.insert(at, id),
            Edit::Remove { at } => {
                list.remove(at);
            }
        }
    }
}

/// Random edits over a list that only ever holds fresh ids, so every
/// snapshot of it is a valid keyed children list.
fn keyed_trace(rng: &mut StdRng, length: usize) -> (Vec<u32>, Vec<Edit>) {
    let mut list = Vec::new();
    let mut next_id = 0;
    let mut edits = Vec::with_capacity(length);

    for _ in 0..length {
        let edit = if !list.is_empty() && rng.gen_bool(0.45) {
            Edit::Remove {
                at: rng.gen_range(0..list.len()),
            }
        } else {
            next_id += 1;
            Edit::Insert {
                at: rng.gen_range(0..=list.len()),
                id: next_id,
            }
        };
        edit.apply(&mut list);
        edits.push(edit);
    }

    (list, edits)
}

fn main() -> Result<(), children_tree::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let start_time = Instant::now();
    let length = 100_000;
    let mut rng = StdRng::seed_from_u64(0);

    println!("Generating keyed trace of {length} edits...");
    let (expected, edits) = keyed_trace(&mut rng, length);
    println!("Expected final list: {} ids", expected.len());

    println!("\nApplying edits one at a time...");
    let trace_start = Instant::now();
    let mut forest = Forest::new(TreeConfig::seeded(0))?;
    let mut tree = forest.empty();

    for (i, edit) in edits.iter().enumerate() {
        if i % 25000 == 0 && i > 0 {
            let rate = i as f64 / trace_start.elapsed().as_secs_f64();
            println!("Progress: {i}/{} ({rate:.0} edits/sec)", edits.len());
        }

        tree = match *edit {
            Edit::Insert { at, id } => forest.insert(&tree, vec![Insertion::new(at, id)])?,
            Edit::Remove { at } => forest.remove(&tree, &[at])?,
        };
    }

    let trace_elapsed = trace_start.elapsed();
    println!("Edits applied in: {trace_elapsed:?}");

    let stats = tree.stats();
    println!("\nShape:");
    println!("Nodes: {}", stats.nodes);
    println!("Average depth: {:.2}", stats.average_depth);
    println!("Max depth: {}", stats.max_depth);
    println!("Widest node: {} slots", stats.max_slots);
    println!("Lists match: {}", tree.to_vec() == expected);

    let replayed = &edits[..edits.len().min(20_000)];
    println!(
        "\nReplaying {} edits through a reconciler, 200 per cycle...",
        replayed.len()
    );
    let mut reconciler: Reconciler<u32, u32> = Reconciler::new(TreeConfig::seeded(1))?;
    let mut list = Vec::new();
    let reconcile_start = Instant::now();
    for chunk in replayed.chunks(200) {
        for edit in chunk {
            edit.apply(&mut list);
        }
        reconciler.update(&list, |&id| Some(id))?;
    }
    let tree = reconciler.tree();
    println!(
        "{} cycles in: {:?}",
        replayed.len().div_ceil(200),
        reconcile_start.elapsed()
    );
    println!("Lists match: {}", tree.to_vec() == list);
    println!("Root key stays {:?}", tree.key());

    println!("\nTotal time: {:?}", start_time.elapsed());
    Ok(())
}
