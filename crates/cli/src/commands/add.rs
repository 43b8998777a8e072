use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use cropcatalog_core::domain::CatalogRecord;
use cropcatalog_core::Catalog;

pub struct AddArgs {
    pub image: PathBuf,
    pub note: String,
    pub title: Option<String>,
    pub owner: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub details: Option<String>,
    pub local_only: bool,
}

pub fn run(catalog: &Catalog, args: AddArgs) -> Result<()> {
    let record = CatalogRecord {
        id: 0,
        media_path: args.image.to_string_lossy().to_string(),
        title: args.title,
        note: args.note,
        timestamp_ms: Utc::now().timestamp_millis(),
        location: args.location,
        owner: args.owner,
        details: args.details,
        remote_url: None,
        remote_public_id: None,
        category: args.category,
    };

    let id = if args.local_only {
        catalog.create(&record)?
    } else {
        let bytes = std::fs::read(&args.image)
            .with_context(|| format!("reading {}", args.image.display()))?;
        catalog.create_with_upload(&bytes, record)?
    };

    let stored = catalog.record(id)?.expect("record just inserted");
    match &stored.remote_public_id {
        Some(public_id) => println!("Added record #{id} (remote: {public_id})"),
        None => println!("Added record #{id} (local only)"),
    }

    Ok(())
}
