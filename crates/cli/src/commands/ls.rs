use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use cropcatalog_core::domain::CatalogRecord;
use cropcatalog_core::Catalog;

use super::format_timestamp;

pub fn run(catalog: &Catalog, query: Option<&str>) -> Result<()> {
    let records = match query {
        Some(q) => catalog.search(q)?,
        None => catalog.records()?,
    };

    if records.is_empty() {
        match query {
            Some(q) => println!("No records match \"{q}\"."),
            None => println!("Catalog is empty. Run `cropcatalog add` first."),
        }
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Id"),
        Cell::new("Title"),
        Cell::new("Note"),
        Cell::new("Category"),
        Cell::new("Owner"),
        Cell::new("Captured"),
        Cell::new("Remote"),
    ]);

    for record in &records {
        table.add_row(record_row(record));
    }

    let mirrored = records
        .iter()
        .filter(|r| r.remote_public_id.is_some())
        .count();

    println!();
    println!("{table}");
    println!();
    println!("  {} records ({} mirrored)", records.len(), mirrored);
    println!();

    Ok(())
}

fn record_row(record: &CatalogRecord) -> Vec<Cell> {
    let remote = if record.remote_public_id.is_some() {
        "yes"
    } else {
        "-"
    };
    vec![
        Cell::new(record.id),
        Cell::new(record.title.as_deref().unwrap_or("-")),
        Cell::new(&record.note),
        Cell::new(record.category.as_deref().unwrap_or("-")),
        Cell::new(record.owner.as_deref().unwrap_or("-")),
        Cell::new(format_timestamp(record.timestamp_ms)),
        Cell::new(remote),
    ]
}
