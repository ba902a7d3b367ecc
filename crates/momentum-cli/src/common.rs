//! Shared helpers for command modules.

use momentum_core::DayKey;

/// Resolve an optional `--date YYYY-MM-DD` argument, defaulting to today.
pub fn resolve_date(date: &Option<String>) -> Result<DayKey, Box<dyn std::error::Error>> {
    match date {
        Some(s) => Ok(s.parse::<DayKey>().map_err(|e| format!("invalid date '{s}': {e}"))?),
        None => Ok(DayKey::today()),
    }
}

/// Turn blank strings into `None` so flags like `--identity ""` behave
/// like an omitted flag.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}
