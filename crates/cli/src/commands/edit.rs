use anyhow::{bail, Result};
use cropcatalog_core::domain::RecordUpdate;
use cropcatalog_core::Catalog;

#[derive(Default)]
pub struct EditArgs {
    pub note: Option<String>,
    pub title: Option<String>,
    pub owner: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub details: Option<String>,
}

/// Overlay the given fields on the record's current values; omitted flags
/// leave their field untouched.
pub fn run(catalog: &Catalog, id: i64, args: EditArgs) -> Result<()> {
    let Some(record) = catalog.record(id)? else {
        bail!("no record with id {id}");
    };

    let mut update = RecordUpdate::from_record(&record);
    if let Some(note) = args.note {
        update.note = note;
    }
    if args.title.is_some() {
        update.title = args.title;
    }
    if args.owner.is_some() {
        update.owner = args.owner;
    }
    if args.category.is_some() {
        update.category = args.category;
    }
    if args.location.is_some() {
        update.location = args.location;
    }
    if args.details.is_some() {
        update.details = args.details;
    }

    if !catalog.update(id, &update)? {
        bail!("no record with id {id}");
    }

    if record.remote_public_id.is_some() {
        println!("Updated record #{id} (remote metadata push queued)");
    } else {
        println!("Updated record #{id}");
    }
    Ok(())
}
