use crate::{
    error::ApiError,
    utils::{code_cache, code_filter},
};
use sqlx::MySqlPool;

/// Map an external employee code to the internal row id. Every operation
/// addressed by code routes through here.
///
/// Three tiers: cuckoo filter for a definite miss (warmed filters only),
/// moka cache for a fast hit, database as the authority.
pub async fn resolve_code(pool: &MySqlPool, code: &str) -> Result<u64, ApiError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(ApiError::validation("employee code must not be empty"));
    }

    if code_filter::definitely_absent(code) {
        return Err(ApiError::not_found("Employee", code));
    }

    if let Some(id) = code_cache::lookup(code).await {
        return Ok(id);
    }

    let id: Option<u64> = sqlx::query_scalar("SELECT id FROM employees WHERE employee_code = ?")
        .bind(code)
        .fetch_optional(pool)
        .await?;

    match id {
        Some(id) => {
            code_cache::remember(code, id).await;
            code_filter::insert(code);
            Ok(id)
        }
        None => Err(ApiError::not_found("Employee", code)),
    }
}

/// Keep the lookup tiers coherent after a create or a backfill.
pub async fn register_code(code: &str, employee_id: u64) {
    code_filter::insert(code);
    code_cache::remember(code, employee_id).await;
}

/// Drop a deleted employee from the lookup tiers.
pub async fn unregister_code(code: &str) {
    code_filter::remove(code);
    code_cache::forget(code).await;
}
