//! Paging and text-match helpers shared by the PostgreSQL adapters.

use lectern_core::{AppError, AppResult};

/// Converts a page window to the `LIMIT`/`OFFSET` pair Postgres binds.
pub(crate) fn page_bounds(limit: usize, skip: usize) -> AppResult<(i64, i64)> {
    let limit = i64::try_from(limit)
        .map_err(|error| AppError::Validation(format!("invalid page limit: {error}")))?;
    let skip = i64::try_from(skip)
        .map_err(|error| AppError::Validation(format!("invalid page offset: {error}")))?;

    Ok((limit, skip))
}

/// Wraps free text in `%` for `ILIKE`, escaping the pattern metacharacters.
pub(crate) fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for character in text.chars() {
        if matches!(character, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(character);
    }
    pattern.push('%');
    pattern
}
