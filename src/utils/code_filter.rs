use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use futures::StreamExt;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Expected capacity and false-positive rate.
/// Tune these based on real employee counts.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static CODE_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

/// A cold filter must abstain: before warmup finishes, a miss means
/// nothing, and reporting definite-absence would turn into a false 404
/// in the resolver.
static WARMED: AtomicBool = AtomicBool::new(false);

/// Definitely-absent check. Returns false only when the warmed filter is
/// certain the code does not exist; false positives remain possible and
/// the database stays authoritative.
pub fn definitely_absent(code: &str) -> bool {
    if !WARMED.load(Ordering::Acquire) {
        return false;
    }
    !CODE_FILTER
        .read()
        .expect("code filter poisoned")
        .contains(&code.to_string())
}

pub fn insert(code: &str) {
    CODE_FILTER
        .write()
        .expect("code filter poisoned")
        .add(&code.to_string());
}

pub fn remove(code: &str) {
    CODE_FILTER
        .write()
        .expect("code filter poisoned")
        .remove(&code.to_string());
}

/// Warm up the code filter using streaming + batching, then open the
/// definite-miss fast path.
pub async fn warmup_code_filter(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String,)>(
        "SELECT employee_code FROM employees WHERE employee_code IS NOT NULL",
    )
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (code,) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;

        batch.push(code);
        total += 1;

        if batch.len() == batch_size {
            insert_batch(&batch);
            batch.clear();
        }
    }

    if !batch.is_empty() {
        insert_batch(&batch);
    }

    WARMED.store(true, Ordering::Release);

    log::info!("Employee code filter warmup complete: {} codes", total);
    Ok(())
}

fn insert_batch(codes: &[String]) {
    let mut filter = CODE_FILTER.write().expect("code filter poisoned");

    for code in codes {
        filter.add(code);
    }
}
