//! Case-insensitive substring search over song names and artists.

use crate::catalog::SongRecord;

/// True if `record` matches the already-lowercased `term_lower`.
pub fn matches(record: &SongRecord, term_lower: &str) -> bool {
    if term_lower.is_empty() {
        return true;
    }
    record.name.to_lowercase().contains(term_lower)
        || record
            .artist
            .as_deref()
            .is_some_and(|a| a.to_lowercase().contains(term_lower))
}

/// Records whose name or artist contains `term`, in source order.
pub fn filter<'a>(records: &'a [SongRecord], term: &str) -> Vec<&'a SongRecord> {
    let term_lower = term.to_lowercase();
    records.iter().filter(|r| matches(r, &term_lower)).collect()
}
