use anyhow::{bail, Result};
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use cropcatalog_core::Catalog;

use super::format_timestamp;

pub fn run(catalog: &Catalog, id: i64) -> Result<()> {
    let Some(record) = catalog.record(id)? else {
        bail!("no record with id {id}");
    };

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let dash = || "-".to_string();
    table.add_row(vec!["Id".to_string(), record.id.to_string()]);
    table.add_row(vec!["Image".to_string(), record.media_path.clone()]);
    table.add_row(vec!["Title".to_string(), record.title.unwrap_or_else(dash)]);
    table.add_row(vec!["Note".to_string(), record.note]);
    table.add_row(vec![
        "Category".to_string(),
        record.category.unwrap_or_else(dash),
    ]);
    table.add_row(vec!["Owner".to_string(), record.owner.unwrap_or_else(dash)]);
    table.add_row(vec![
        "Location".to_string(),
        record.location.unwrap_or_else(dash),
    ]);
    table.add_row(vec![
        "Details".to_string(),
        record.details.unwrap_or_else(dash),
    ]);
    table.add_row(vec![
        "Captured".to_string(),
        format_timestamp(record.timestamp_ms),
    ]);
    table.add_row(vec![
        "Remote URL".to_string(),
        record.remote_url.unwrap_or_else(dash),
    ]);
    table.add_row(vec![
        "Remote id".to_string(),
        record.remote_public_id.unwrap_or_else(dash),
    ]);

    println!("{table}");
    Ok(())
}
