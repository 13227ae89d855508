//! Structured filter derivation from natural-language queries
//!
//! The chat model is treated strictly as an untrusted text transformer: its
//! output is deserialized into `PackageFilter` through serde with every
//! field defaulted, and any failure along the way degrades to "no filter"
//! rather than failing the search.

use super::{ChatMessage, LLMClient};
use crate::error::Result;
use crate::package::Package;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Structured predicate applied to search candidates after the vector stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackageFilter {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_duration_days: Option<u32>,
    pub max_duration_days: Option<u32>,
    pub min_seats: Option<u32>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub is_international: Option<bool>,
    /// Earliest acceptable departure date
    pub start_after: Option<NaiveDate>,
    /// Latest acceptable departure date
    pub start_before: Option<NaiveDate>,
}

impl PackageFilter {
    /// Whether this filter constrains anything at all
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether a package satisfies every present constraint
    pub fn matches(&self, package: &Package) -> bool {
        if let Some(min) = self.min_price {
            if package.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if package.price > max {
                return false;
            }
        }
        if let Some(min) = self.min_duration_days {
            if package.duration_days < min {
                return false;
            }
        }
        if let Some(max) = self.max_duration_days {
            if package.duration_days > max {
                return false;
            }
        }
        if let Some(min) = self.min_seats {
            if package.seats < min {
                return false;
            }
        }
        if let Some(ref category) = self.category {
            if !package.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if !self.tags.is_empty() {
            let has_any = self.tags.iter().any(|wanted| {
                package
                    .tags
                    .iter()
                    .any(|tag| tag.eq_ignore_ascii_case(wanted))
            });
            if !has_any {
                return false;
            }
        }
        if let Some(ref city) = self.city {
            let matched = package
                .location
                .as_ref()
                .and_then(|l| l.city.as_ref())
                .is_some_and(|c| c.eq_ignore_ascii_case(city));
            if !matched {
                return false;
            }
        }
        if let Some(ref country) = self.country {
            let matched = package
                .location
                .as_ref()
                .and_then(|l| l.country.as_ref())
                .is_some_and(|c| c.eq_ignore_ascii_case(country));
            if !matched {
                return false;
            }
        }
        if let Some(wanted) = self.is_international {
            if package.is_international != wanted {
                return false;
            }
        }
        if self.start_after.is_some() || self.start_before.is_some() {
            let in_window = package.available_dates.iter().any(|range| {
                self.start_after
                    .map_or(true, |after| range.start_date >= after)
                    && self
                        .start_before
                        .map_or(true, |before| range.start_date <= before)
            });
            if !in_window {
                return false;
            }
        }
        true
    }
}

/// Derives a `PackageFilter` from the raw user query via a chat model
pub struct FilterParser {
    client: Arc<dyn LLMClient>,
}

impl FilterParser {
    /// Create from an LLM client
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self { client }
    }

    /// Derive a filter from the raw query.
    ///
    /// Infallible surface: a model or parse failure yields the empty filter,
    /// so search degrades to pure vector ranking instead of failing.
    pub async fn derive(&self, raw_query: &str) -> PackageFilter {
        match self.derive_inner(raw_query).await {
            Ok(filter) => filter,
            Err(e) => {
                tracing::warn!("Filter derivation failed ({}), searching unfiltered", e);
                PackageFilter::default()
            }
        }
    }

    async fn derive_inner(&self, raw_query: &str) -> Result<PackageFilter> {
        let messages = vec![
            ChatMessage::system(
                "You convert travel queries into structured JSON filters. \
                 Output ONLY a valid JSON object, no explanation.",
            ),
            ChatMessage::user(build_filter_prompt(raw_query)),
        ];

        let response = self.client.chat_completion(messages).await?;
        Ok(parse_filter_response(&response))
    }
}

fn build_filter_prompt(raw_query: &str) -> String {
    format!(
        r#"Convert this travel query into a JSON filter object. Use ONLY these fields, and only when the query makes them evident:

- minPrice, maxPrice (numbers)
- minDurationDays, maxDurationDays (integers)
- minSeats (integer)
- category (string, e.g. "romantic", "adventure", "beach")
- tags (array of strings)
- city, country (strings)
- isInternational (boolean)
- startAfter, startBefore (dates, YYYY-MM-DD)

Example:
Query: "romantic maldives trip under 5000 for up to 4 days"
Output: {{"maxPrice": 5000, "maxDurationDays": 4, "category": "romantic", "country": "Maldives", "isInternational": true}}

Omit every field the query says nothing about. Return ONLY the JSON object.

Query: {}"#,
        raw_query
    )
}

/// Tolerant parse of the model output: extracts the JSON object (handling
/// markdown code fences and surrounding prose) and deserializes with all
/// fields defaulted. Anything unparseable becomes the empty filter.
fn parse_filter_response(response: &str) -> PackageFilter {
    let json_str = match (response.find('{'), response.rfind('}')) {
        (Some(start), Some(end)) if start < end => &response[start..=end],
        _ => {
            tracing::debug!("No JSON object in filter response: {}", response);
            return PackageFilter::default();
        }
    };

    match serde_json::from_str::<PackageFilter>(json_str) {
        Ok(filter) => filter,
        Err(e) => {
            tracing::warn!("Failed to parse filter JSON: {}, searching unfiltered", e);
            PackageFilter::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::{DateRange, Location, NewPackage};

    fn goa_package() -> Package {
        NewPackage {
            title: "Goa Beach Getaway".into(),
            description: "Sun and sand.".into(),
            price: 8000.0,
            duration_days: 4,
            seats: 20,
            category: "beach".into(),
            location: Some(Location {
                city: Some("Goa".into()),
                region: None,
                country: Some("India".into()),
            }),
            tags: vec!["beach".into(), "relaxation".into()],
            is_international: false,
            available_dates: vec![DateRange {
                start_date: NaiveDate::from_ymd_opt(2026, 9, 15).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2026, 9, 19).unwrap(),
            }],
            images: vec![],
        }
        .into_package(1, vec![])
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(PackageFilter::default().is_empty());
        assert!(PackageFilter::default().matches(&goa_package()));
    }

    #[test]
    fn test_price_and_duration_bounds() {
        let filter = PackageFilter {
            max_price: Some(10000.0),
            max_duration_days: Some(5),
            ..Default::default()
        };
        assert!(filter.matches(&goa_package()));

        let filter = PackageFilter {
            max_price: Some(5000.0),
            ..Default::default()
        };
        assert!(!filter.matches(&goa_package()));
    }

    #[test]
    fn test_category_and_location_case_insensitive() {
        let filter = PackageFilter {
            category: Some("Beach".into()),
            country: Some("india".into()),
            ..Default::default()
        };
        assert!(filter.matches(&goa_package()));

        let filter = PackageFilter {
            city: Some("Mumbai".into()),
            ..Default::default()
        };
        assert!(!filter.matches(&goa_package()));
    }

    #[test]
    fn test_tags_match_any() {
        let filter = PackageFilter {
            tags: vec!["relaxation".into(), "hiking".into()],
            ..Default::default()
        };
        assert!(filter.matches(&goa_package()));

        let filter = PackageFilter {
            tags: vec!["hiking".into()],
            ..Default::default()
        };
        assert!(!filter.matches(&goa_package()));
    }

    #[test]
    fn test_date_window() {
        let filter = PackageFilter {
            start_after: Some(NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()),
            start_before: Some(NaiveDate::from_ymd_opt(2026, 9, 30).unwrap()),
            ..Default::default()
        };
        assert!(filter.matches(&goa_package()));

        let filter = PackageFilter {
            start_after: Some(NaiveDate::from_ymd_opt(2026, 10, 1).unwrap()),
            ..Default::default()
        };
        assert!(!filter.matches(&goa_package()));
    }

    #[test]
    fn test_parse_filter_response_with_fences() {
        let response = "```json\n{\"maxPrice\": 5000, \"category\": \"beach\"}\n```";
        let filter = parse_filter_response(response);
        assert_eq!(filter.max_price, Some(5000.0));
        assert_eq!(filter.category.as_deref(), Some("beach"));
    }

    #[test]
    fn test_parse_filter_response_garbage_degrades_to_empty() {
        assert!(parse_filter_response("no json here").is_empty());
        assert!(parse_filter_response("{not valid json}").is_empty());
    }

    #[test]
    fn test_parse_filter_ignores_unknown_fields() {
        let response = r#"{"maxPrice": 9000, "mongoOperator": {"$lte": 1}}"#;
        let filter = parse_filter_response(response);
        assert_eq!(filter.max_price, Some(9000.0));
    }
}
