use std::collections::BTreeSet;

use rusqlite::{params, Connection};
use tracing::{debug, error};

use crate::error::{Error, Result};

/// Schema version this build writes and expects.
pub const SCHEMA_VERSION: u32 = 6;

/// One additive migration step: the columns a release added to `images`.
struct Step {
    version: u32,
    name: &'static str,
    columns: &'static [(&'static str, &'static str)],
}

const STEPS: &[Step] = &[
    Step {
        version: 2,
        name: "add_title",
        columns: &[("title", "TEXT")],
    },
    Step {
        version: 3,
        name: "add_location_name",
        columns: &[("location_name", "TEXT")],
    },
    Step {
        version: 4,
        name: "add_owner_details_remote_url",
        columns: &[
            ("farmer_name", "TEXT"),
            ("additional_details", "TEXT"),
            ("cloudinary_url", "TEXT"),
        ],
    },
    Step {
        version: 5,
        name: "add_public_id",
        columns: &[("public_id", "TEXT")],
    },
    Step {
        version: 6,
        name: "add_plant_disease",
        columns: &[("plant_disease", "TEXT")],
    },
];

const CREATE_IMAGES: &str = "
    CREATE TABLE images (
        id                 INTEGER PRIMARY KEY AUTOINCREMENT,
        image_path         TEXT NOT NULL,
        title              TEXT,
        description        TEXT NOT NULL,
        timestamp          INTEGER NOT NULL,
        location_name      TEXT,
        farmer_name        TEXT,
        additional_details TEXT,
        cloudinary_url     TEXT,
        public_id          TEXT,
        plant_disease      TEXT
    );

    CREATE INDEX idx_images_timestamp ON images(timestamp);
";

/// Bring a store to the current schema. A missing `images` table means a
/// fresh store: it is created directly with the full current column set. An
/// existing store is migrated step by step through the applied-steps ledger.
pub fn setup(conn: &mut Connection) -> Result<()> {
    ensure_ledger(conn)?;
    if !table_exists(conn, "images")? {
        return create_current(conn);
    }
    // A store from before the ledger existed is version 1.
    seed_baseline(conn)?;
    migrate(conn)
}

/// Apply every migration step not yet recorded in the ledger, in ascending
/// version order. Each step runs in its own transaction together with its
/// ledger entry, so a step is either fully applied and recorded or absent.
/// A ledger version newer than this build is refused outright.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    let applied = applied_versions(conn)?;
    let current = applied.iter().next_back().copied().unwrap_or(1);
    if current > SCHEMA_VERSION {
        error!(
            db = current,
            supported = SCHEMA_VERSION,
            "store was written by a newer build, refusing to touch its schema"
        );
        return Err(Error::SchemaTooNew {
            db: current,
            code: SCHEMA_VERSION,
        });
    }

    for step in STEPS {
        if applied.contains(&step.version) {
            continue;
        }
        apply_step(conn, step)?;
    }
    Ok(())
}

fn ensure_ledger(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            name       TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;
    Ok(())
}

/// Create the full current schema and record every version as applied.
fn create_current(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(CREATE_IMAGES)?;
    tx.execute(
        "INSERT INTO schema_migrations (version, name) VALUES (1, 'initial_schema')",
        [],
    )?;
    for step in STEPS {
        tx.execute(
            "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
            params![step.version, step.name],
        )?;
    }
    tx.commit()?;
    debug!(version = SCHEMA_VERSION, "created fresh store");
    Ok(())
}

fn seed_baseline(conn: &Connection) -> Result<()> {
    let empty: bool = conn.query_row("SELECT COUNT(*) = 0 FROM schema_migrations", [], |row| {
        row.get(0)
    })?;
    if empty {
        conn.execute(
            "INSERT INTO schema_migrations (version, name) VALUES (1, 'initial_schema')",
            [],
        )?;
    }
    Ok(())
}

fn apply_step(conn: &mut Connection, step: &Step) -> Result<()> {
    let migration_err = |source| Error::Migration {
        version: step.version,
        source,
    };

    let tx = conn.transaction().map_err(migration_err)?;
    for (column, ty) in step.columns {
        // Pre-ledger stores may already carry columns from later releases;
        // adding one twice is an error in SQLite.
        if !column_exists(&tx, "images", column).map_err(migration_err)? {
            tx.execute_batch(&format!("ALTER TABLE images ADD COLUMN {column} {ty}"))
                .map_err(migration_err)?;
        }
    }
    tx.execute(
        "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
        params![step.version, step.name],
    )
    .map_err(migration_err)?;
    tx.commit().map_err(migration_err)?;

    debug!(version = step.version, name = step.name, "applied migration step");
    Ok(())
}

fn applied_versions(conn: &Connection) -> Result<BTreeSet<u32>> {
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations")?;
    let versions = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<BTreeSet<u32>, _>>()?;
    Ok(versions)
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare("SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2")?;
    let count: i64 = stmt.query_row(params![table, column], |row| row.get(0))?;
    Ok(count > 0)
}
