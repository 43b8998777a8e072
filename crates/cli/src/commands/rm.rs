use anyhow::{bail, Result};
use cropcatalog_core::Catalog;

pub fn run(catalog: &Catalog, id: i64) -> Result<()> {
    let Some(record) = catalog.record(id)? else {
        bail!("no record with id {id}");
    };
    let mirrored = record
        .remote_public_id
        .as_deref()
        .is_some_and(|p| !p.is_empty());

    catalog.delete(id)?;

    if mirrored {
        println!("Removed record #{id} (remote cleanup queued)");
    } else {
        println!("Removed record #{id}");
    }
    Ok(())
}
