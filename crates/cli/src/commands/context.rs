use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use cropcatalog_core::Catalog;

pub fn run(catalog: &Catalog, public_id: &str) -> Result<()> {
    let bundle = catalog.remote_context(public_id)?;

    if bundle.is_empty() {
        println!("No metadata stored for {public_id}.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    for (key, value) in &bundle {
        table.add_row(vec![key.clone(), value.clone()]);
    }

    println!("{table}");
    Ok(())
}
