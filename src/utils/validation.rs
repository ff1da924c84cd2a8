use crate::error::{Error, Result};

/// Rejects required text that is empty once trimmed.
pub fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::BadRequest(format!("{} is required", field)));
    }
    Ok(())
}

/// Trims entries, drops empty ones and keeps the first occurrence of each.
pub fn dedup_trimmed<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for value in values {
        let value = value.as_ref().trim();
        if !value.is_empty() && !out.iter().any(|v| v == value) {
            out.push(value.to_string());
        }
    }
    out
}
