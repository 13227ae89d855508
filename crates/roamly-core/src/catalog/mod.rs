//! Package catalog store
//!
//! SQLite-backed catalog of tour packages with their embeddings. A package
//! row always carries its embedding BLOB; rows are written in one statement
//! so search never observes a package without a vector.

pub mod vectors;

use crate::error::{Result, RoamlyError};
use crate::package::{DateRange, Location, Package};
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

pub use vectors::{bytes_to_embedding, cosine_similarity, embedding_to_bytes, normalize};

/// SQLite-backed package catalog.
///
/// The connection is synchronized internally, so `Catalog` is shared by
/// reference across async tasks. Every method locks only for the duration of
/// its own statement; no lock is ever held across an await point.
pub struct Catalog {
    conn: Mutex<Connection>,
}

impl Catalog {
    /// Open or create a catalog at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let catalog = Self {
            conn: Mutex::new(conn),
        };
        catalog.ensure_schema()?;
        Ok(catalog)
    }

    /// Open an in-memory catalog (tests, ephemeral tooling)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let catalog = Self {
            conn: Mutex::new(conn),
        };
        catalog.ensure_schema()?;
        Ok(catalog)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RoamlyError::Search(format!("Lock error: {}", e)))
    }

    fn ensure_schema(&self) -> Result<()> {
        self.conn()?.execute_batch(
            "CREATE TABLE IF NOT EXISTS packages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                price REAL NOT NULL CHECK (price >= 0),
                duration_days INTEGER NOT NULL CHECK (duration_days > 0),
                seats INTEGER NOT NULL CHECK (seats > 0),
                category TEXT NOT NULL,
                city TEXT,
                region TEXT,
                country TEXT,
                tags TEXT NOT NULL DEFAULT '[]',
                is_international INTEGER NOT NULL DEFAULT 0,
                available_dates TEXT NOT NULL DEFAULT '[]',
                images TEXT NOT NULL DEFAULT '[]',
                embedding BLOB NOT NULL,
                embedding_model TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Insert a package together with its embedding, returning the stored
    /// record with its assigned id.
    pub fn insert(&self, package: Package, model: &str) -> Result<Package> {
        let now = Utc::now().to_rfc3339();
        let (city, region, country) = split_location(package.location.as_ref());

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO packages (
                title, description, price, duration_days, seats, category,
                city, region, country, tags, is_international,
                available_dates, images, embedding, embedding_model,
                created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?16)",
            params![
                package.title,
                package.description,
                package.price,
                package.duration_days,
                package.seats,
                package.category,
                city,
                region,
                country,
                serde_json::to_string(&package.tags)?,
                package.is_international as i64,
                serde_json::to_string(&package.available_dates)?,
                serde_json::to_string(&package.images)?,
                embedding_to_bytes(&package.embedding),
                model,
                now,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Ok(Package { id, ..package })
    }

    /// Update a package's descriptive fields and embedding in one statement
    pub fn update(&self, package: &Package, model: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let (city, region, country) = split_location(package.location.as_ref());

        let updated = self.conn()?.execute(
            "UPDATE packages SET
                title = ?1, description = ?2, price = ?3, duration_days = ?4,
                seats = ?5, category = ?6, city = ?7, region = ?8,
                country = ?9, tags = ?10, is_international = ?11,
                available_dates = ?12, images = ?13, embedding = ?14,
                embedding_model = ?15, updated_at = ?16
             WHERE id = ?17",
            params![
                package.title,
                package.description,
                package.price,
                package.duration_days,
                package.seats,
                package.category,
                city,
                region,
                country,
                serde_json::to_string(&package.tags)?,
                package.is_international as i64,
                serde_json::to_string(&package.available_dates)?,
                serde_json::to_string(&package.images)?,
                embedding_to_bytes(&package.embedding),
                model,
                now,
                package.id,
            ],
        )?;

        if updated == 0 {
            return Err(RoamlyError::PackageNotFound(package.id));
        }
        Ok(())
    }

    /// Fetch a single package by id
    pub fn get(&self, id: i64) -> Result<Package> {
        let result = self.conn()?.query_row(
            &format!("SELECT {} FROM packages WHERE id = ?1", COLUMNS),
            params![id],
            row_to_package,
        );

        match result {
            Ok(pkg) => Ok(pkg),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(RoamlyError::PackageNotFound(id)),
            Err(e) => Err(e.into()),
        }
    }

    /// List all packages in insertion order
    pub fn list(&self) -> Result<Vec<Package>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM packages ORDER BY id", COLUMNS))?;
        let rows = stmt.query_map([], row_to_package)?;
        let mut packages = Vec::new();
        for row in rows {
            packages.push(row?);
        }
        Ok(packages)
    }

    /// All (id, embedding) pairs in insertion order.
    ///
    /// Insertion order is what makes the search engine's tie-breaking stable.
    pub fn embeddings(&self) -> Result<Vec<(i64, Vec<f32>)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, embedding FROM packages ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            let id: i64 = row.get(0)?;
            let bytes: Vec<u8> = row.get(1)?;
            Ok((id, bytes_to_embedding(&bytes)))
        })?;
        let mut embeddings = Vec::new();
        for row in rows {
            embeddings.push(row?);
        }
        Ok(embeddings)
    }

    /// Number of packages in the catalog
    pub fn count(&self) -> Result<usize> {
        let count: i64 =
            self.conn()?
                .query_row("SELECT COUNT(*) FROM packages", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Delete a package by id
    pub fn delete(&self, id: i64) -> Result<()> {
        let deleted = self
            .conn()?
            .execute("DELETE FROM packages WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(RoamlyError::PackageNotFound(id));
        }
        Ok(())
    }
}

const COLUMNS: &str = "id, title, description, price, duration_days, seats, category, \
                       city, region, country, tags, is_international, available_dates, \
                       images, embedding";

fn row_to_package(row: &Row<'_>) -> rusqlite::Result<Package> {
    let tags_json: String = row.get(10)?;
    let dates_json: String = row.get(12)?;
    let images_json: String = row.get(13)?;
    let embedding_bytes: Vec<u8> = row.get(14)?;

    let location = Location {
        city: row.get(7)?,
        region: row.get(8)?,
        country: row.get(9)?,
    };

    Ok(Package {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        duration_days: row.get::<_, i64>(4)? as u32,
        seats: row.get::<_, i64>(5)? as u32,
        category: row.get(6)?,
        location: if location.is_empty() {
            None
        } else {
            Some(location)
        },
        tags: serde_json::from_str(&tags_json).unwrap_or_default(),
        is_international: row.get::<_, i64>(11)? != 0,
        available_dates: serde_json::from_str::<Vec<DateRange>>(&dates_json).unwrap_or_default(),
        images: serde_json::from_str(&images_json).unwrap_or_default(),
        embedding: bytes_to_embedding(&embedding_bytes),
    })
}

fn split_location(location: Option<&Location>) -> (Option<String>, Option<String>, Option<String>) {
    match location {
        Some(loc) => (loc.city.clone(), loc.region.clone(), loc.country.clone()),
        None => (None, None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::NewPackage;

    fn sample(title: &str) -> Package {
        NewPackage {
            title: title.into(),
            description: "A lovely trip.".into(),
            price: 8000.0,
            duration_days: 4,
            seats: 20,
            category: "beach".into(),
            location: Some(Location {
                city: Some("Goa".into()),
                region: None,
                country: Some("India".into()),
            }),
            tags: vec!["beach".into()],
            is_international: false,
            available_dates: vec![],
            images: vec!["https://example.com/goa.jpg".into()],
        }
        .into_package(0, vec![0.5, 0.5, 0.0, 0.0])
    }

    #[test]
    fn test_insert_and_get_roundtrip() {
        let catalog = Catalog::open_in_memory().unwrap();
        let stored = catalog.insert(sample("Goa Beach Getaway"), "test-model").unwrap();
        assert!(stored.id > 0);

        let fetched = catalog.get(stored.id).unwrap();
        assert_eq!(fetched.title, "Goa Beach Getaway");
        assert_eq!(fetched.embedding, vec![0.5, 0.5, 0.0, 0.0]);
        assert_eq!(
            fetched.location.as_ref().and_then(|l| l.city.clone()),
            Some("Goa".to_string())
        );
        assert_eq!(fetched.images.len(), 1);
    }

    #[test]
    fn test_get_missing_package() {
        let catalog = Catalog::open_in_memory().unwrap();
        assert!(matches!(
            catalog.get(42),
            Err(RoamlyError::PackageNotFound(42))
        ));
    }

    #[test]
    fn test_embeddings_in_insertion_order() {
        let catalog = Catalog::open_in_memory().unwrap();
        let a = catalog.insert(sample("First"), "m").unwrap();
        let b = catalog.insert(sample("Second"), "m").unwrap();

        let embeddings = catalog.embeddings().unwrap();
        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0].0, a.id);
        assert_eq!(embeddings[1].0, b.id);
        assert_eq!(catalog.count().unwrap(), 2);
    }

    #[test]
    fn test_update_replaces_embedding() {
        let catalog = Catalog::open_in_memory().unwrap();
        let mut stored = catalog.insert(sample("Goa"), "m").unwrap();
        stored.embedding = vec![0.0, 0.0, 1.0, 0.0];
        stored.price = 9000.0;
        catalog.update(&stored, "m").unwrap();

        let fetched = catalog.get(stored.id).unwrap();
        assert_eq!(fetched.embedding, vec![0.0, 0.0, 1.0, 0.0]);
        assert_eq!(fetched.price, 9000.0);
    }

    #[test]
    fn test_delete() {
        let catalog = Catalog::open_in_memory().unwrap();
        let stored = catalog.insert(sample("Goa"), "m").unwrap();
        catalog.delete(stored.id).unwrap();
        assert_eq!(catalog.count().unwrap(), 0);
        assert!(catalog.delete(stored.id).is_err());
    }

    #[test]
    fn test_catalog_is_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Catalog>();

        let catalog = std::sync::Arc::new(Catalog::open_in_memory().unwrap());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let catalog = std::sync::Arc::clone(&catalog);
                std::thread::spawn(move || {
                    catalog
                        .insert(sample(&format!("Trip {}", i)), "m")
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(catalog.count().unwrap(), 4);
    }

    #[test]
    fn test_persists_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");
        {
            let catalog = Catalog::open(&path).unwrap();
            catalog.insert(sample("Goa"), "m").unwrap();
        }
        let catalog = Catalog::open(&path).unwrap();
        assert_eq!(catalog.count().unwrap(), 1);
    }
}
