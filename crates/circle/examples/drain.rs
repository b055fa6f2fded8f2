//! Runnable demonstration of scenarios S1/S2: a small ensemble of virtual
//! ranks, wired together with [`circle::EmulatedSubstrate`], draining a
//! handful of seeded items.
//!
//! ```text
//! cargo run --example drain -- 2
//! ```

use circle::{test_config, Context, EmulatedSubstrate, Handle, SubstrateBoxed};
use std::env;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[tokio::main]
async fn main() {
    circle::telemetry::init();

    let ranks: usize = env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(2);

    let dir = tempfile::tempdir().expect("create scratch checkpoint dir");
    let config = test_config(dir.path().to_path_buf());

    let substrates = EmulatedSubstrate::ensemble(ranks);
    let mut tasks = Vec::with_capacity(ranks);

    for substrate in substrates {
        let config = config.clone();
        tasks.push(tokio::spawn(async move {
            let substrate: Arc<dyn SubstrateBoxed> = Arc::new(substrate);
            let mut ctx = Context::init(substrate, config);
            let rank = ctx.rank();

            if rank == 0 {
                ctx.on_create(|handle: &mut Handle| {
                    for item in ["1", "2", "3", "4", "5", "6", "7", "8", "9", "10"] {
                        handle.enqueue(item.as_bytes()).expect("seed item");
                    }
                });
            }

            let processed = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&processed);
            ctx.on_process(move |_handle: &mut Handle, item: Vec<u8>| {
                counter.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(rank, item = %String::from_utf8_lossy(&item), "processed");
            });

            let summary = ctx.begin().await.expect("worker loop");
            ctx.finalize();
            (rank, summary, processed.load(Ordering::Relaxed))
        }));
    }

    for task in tasks {
        let (rank, summary, processed) = task.await.expect("rank task panicked");
        println!(
            "rank {rank}: processed={} (summary.processed={}, aborted={})",
            processed, summary.processed, summary.aborted
        );
    }
}
