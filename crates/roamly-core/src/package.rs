//! Tour package catalog entities

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Structured location of a package. All fields optional; synthesis degrades
/// gracefully when some are missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Location {
    pub fn is_empty(&self) -> bool {
        self.city.is_none() && self.region.is_none() && self.country.is_none()
    }
}

/// Departure window for a package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// A tour package as stored in the catalog.
///
/// `embedding` is generated once at ingestion time from the synthesized
/// description and is owned by the record. Its length is constant across the
/// catalog and equals the embedding model's output dimensionality. If the
/// descriptive fields are edited, the embedding must be regenerated via
/// `Indexer::reindex`; an upsert alone leaves the vector stale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Non-negative
    pub price: f64,
    /// Positive
    pub duration_days: u32,
    /// Positive
    pub seats: u32,
    /// Free-text label, e.g. "romantic", "adventure"
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_international: bool,
    #[serde(default)]
    pub available_dates: Vec<DateRange>,
    #[serde(default)]
    pub images: Vec<String>,
    /// Never serialized outward; stored alongside the record
    #[serde(skip)]
    pub embedding: Vec<f32>,
}

/// Input shape for package ingestion, before an id and embedding exist
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPackage {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub duration_days: u32,
    pub seats: u32,
    pub category: String,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_international: bool,
    #[serde(default)]
    pub available_dates: Vec<DateRange>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl NewPackage {
    /// Basic field validation before ingestion
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::RoamlyError;

        if self.title.trim().is_empty() {
            return Err(RoamlyError::InvalidInput("title is required".into()));
        }
        if self.description.trim().is_empty() {
            return Err(RoamlyError::InvalidInput("description is required".into()));
        }
        if self.price < 0.0 || !self.price.is_finite() {
            return Err(RoamlyError::InvalidInput(
                "price must be a non-negative number".into(),
            ));
        }
        if self.duration_days == 0 {
            return Err(RoamlyError::InvalidInput(
                "durationDays must be positive".into(),
            ));
        }
        if self.seats == 0 {
            return Err(RoamlyError::InvalidInput("seats must be positive".into()));
        }
        for range in &self.available_dates {
            if range.end_date <= range.start_date {
                return Err(RoamlyError::InvalidInput(
                    "availableDates end date must be after start date".into(),
                ));
            }
        }
        Ok(())
    }

    /// Attach an id and embedding, producing the stored form
    pub fn into_package(self, id: i64, embedding: Vec<f32>) -> Package {
        Package {
            id,
            title: self.title,
            description: self.description,
            price: self.price,
            duration_days: self.duration_days,
            seats: self.seats,
            category: self.category,
            location: self.location,
            tags: self.tags,
            is_international: self.is_international,
            available_dates: self.available_dates,
            images: self.images,
            embedding,
        }
    }
}
