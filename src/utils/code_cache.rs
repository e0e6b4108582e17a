use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

/// employee_code -> internal row id
pub static CODE_CACHE: Lazy<Cache<String, u64>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(500_000) // tune based on memory
        .time_to_live(Duration::from_secs(86400)) // 24h TTL
        .build()
});

pub async fn remember(code: &str, employee_id: u64) {
    CODE_CACHE.insert(code.to_string(), employee_id).await;
}

pub async fn lookup(code: &str) -> Option<u64> {
    CODE_CACHE.get(code).await
}

pub async fn forget(code: &str) {
    CODE_CACHE.invalidate(code).await;
}

async fn batch_remember(entries: &[(String, u64)]) {
    let futures: Vec<_> = entries
        .iter()
        .map(|(code, id)| CODE_CACHE.insert(code.clone(), *id))
        .collect();

    // Await all insertions concurrently
    futures::future::join_all(futures).await;
}

/// Preload recently created employees into the in-memory cache (batched).
pub async fn warmup_code_cache(pool: &MySqlPool, days: u32, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String, u64)>(
        r#"
        SELECT employee_code, id
        FROM employees
        WHERE employee_code IS NOT NULL
          AND created_at >= NOW() - INTERVAL ? DAY
        ORDER BY created_at DESC
        "#,
    )
    .bind(days)
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        let entry = row?;
        batch.push(entry);
        total_count += 1;

        if batch.len() >= batch_size {
            batch_remember(&batch).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        batch_remember(&batch).await;
    }

    log::info!(
        "Employee code cache warmup complete: {} codes (last {} days)",
        total_count,
        days
    );

    Ok(())
}
