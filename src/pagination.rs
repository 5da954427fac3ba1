use axum::http::{HeaderMap, HeaderValue, header::CONTENT_RANGE};

/// Builds the `Content-Range` header for a list response.
///
/// `puertos 0-99/250` for the first page of 250 rows. Both bounds are
/// inclusive, so the upper one stops at the last row (`total_count - 1`).
/// An empty result renders as `{offset}-{offset}/{total_count}`.
#[must_use]
pub fn calculate_content_range(offset: u64, limit: u64, total_count: u64, resource_name: &str) -> HeaderMap {
    let max_offset_limit = offset
        .saturating_add(limit.max(1))
        .saturating_sub(1)
        .min(total_count.saturating_sub(1))
        .max(offset);

    let content_range = format!("{resource_name} {offset}-{max_offset_limit}/{total_count}");

    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(&content_range) {
        Ok(value) => {
            headers.insert(CONTENT_RANGE, value);
        }
        Err(err) => tracing::warn!(%content_range, error = %err, "skipping invalid Content-Range"),
    }

    headers
}
