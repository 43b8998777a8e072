use anyhow::Result;
use cropcatalog_core::Catalog;

pub fn run(catalog: &Catalog) -> Result<()> {
    let dispatched = catalog.resync_all()?;
    if dispatched == 0 {
        println!("No mirrored records to resync.");
    } else {
        println!("Queued metadata pushes for {dispatched} mirrored records.");
    }
    Ok(())
}
