use crate::domain::CatalogRecord;

/// Case-insensitive substring filter over title and note. An empty query
/// yields the unfiltered list. O(n) per call; the catalog keeps no search
/// index.
pub fn filter_records<'a>(records: &'a [CatalogRecord], query: &str) -> Vec<&'a CatalogRecord> {
    if query.is_empty() {
        return records.iter().collect();
    }
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|record| {
            record
                .title
                .as_deref()
                .is_some_and(|title| title.to_lowercase().contains(&needle))
                || record.note.to_lowercase().contains(&needle)
        })
        .collect()
}
