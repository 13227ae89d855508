//! Deterministic text synthesis for embedding
//!
//! Renders a package record into the natural-language description that gets
//! embedded at ingestion time, and expands a raw user query into the same
//! shape when the LLM-based transformer is unavailable. Both paths draw on
//! one shared vocabulary of duration/price band sentences so the two sides
//! of the vector space cannot silently drift apart.

use crate::config::PriceBands;
use crate::package::{Location, Package};

/// Fixed closing sentence shared by the query transformer prompt and the
/// template fallback. Keeps query embeddings structurally aligned with
/// package description embeddings.
pub const CLOSING_SENTENCE: &str =
    "This text describes the kind of tour package the traveler wants.";

/// Qualitative duration sentence.
///
/// Bands: 1 day, 2-3 days, 4-7 days, longer.
pub fn duration_sentence(days: u32) -> String {
    match days {
        0 | 1 => "This is a one-day trip.".to_string(),
        2..=3 => format!("This is a short {}-day trip.", days),
        4..=7 => format!("This is a {}-day tour.", days),
        _ => format!("This is an extended {}-day journey.", days),
    }
}

/// Qualitative price label for a band configuration
pub fn price_label(price: f64, bands: &PriceBands) -> &'static str {
    if price < bands.budget_max {
        "budget-friendly"
    } else if price < bands.moderate_max {
        "moderately priced"
    } else if price < bands.premium_max {
        "premium"
    } else {
        "luxury"
    }
}

fn price_sentence(price: f64, bands: &PriceBands) -> String {
    format!(
        "It is a {} package at {:.0} per person.",
        price_label(price, bands),
        price
    )
}

fn category_sentence(category: &str) -> Option<String> {
    let category = category.trim();
    if category.is_empty() {
        return None;
    }
    Some(format!("This is a {} tour package.", category))
}

fn tags_sentence(tags: &[String]) -> Option<String> {
    let tags: Vec<&str> = tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    if tags.is_empty() {
        return None;
    }
    Some(format!("Perfect for: {}.", tags.join(", ")))
}

/// Natural location sentence; skips absent fields so e.g. a country without
/// a city still reads grammatically.
fn location_sentence(location: &Location) -> Option<String> {
    let parts: Vec<&str> = [&location.city, &location.region, &location.country]
        .into_iter()
        .filter_map(|p| p.as_deref())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(format!("It takes place in {}.", parts.join(", ")))
}

fn scope_sentence(is_international: bool) -> &'static str {
    if is_international {
        "This is an international trip."
    } else {
        "This is a domestic trip."
    }
}

fn seats_sentence(seats: u32) -> String {
    format!("There are {} seats available.", seats)
}

/// Render a package into the text that gets embedded.
///
/// Pure function of the package fields and price bands. Sentence order puts
/// the most salient semantic content first, since pooling and truncation in
/// the embedding model weight earlier tokens more heavily: title, full
/// description, category, tags, location, duration band, price band,
/// domestic/international, seats. Missing optional fields are skipped, never
/// an error.
pub fn synthesize_description(package: &Package, bands: &PriceBands) -> String {
    let mut sentences: Vec<String> = Vec::with_capacity(9);

    sentences.push(package.title.trim().to_string());
    sentences.push(package.description.trim().to_string());
    if let Some(s) = category_sentence(&package.category) {
        sentences.push(s);
    }
    if let Some(s) = tags_sentence(&package.tags) {
        sentences.push(s);
    }
    if let Some(s) = package.location.as_ref().and_then(location_sentence) {
        sentences.push(s);
    }
    sentences.push(duration_sentence(package.duration_days));
    sentences.push(price_sentence(package.price, bands));
    sentences.push(scope_sentence(package.is_international).to_string());
    sentences.push(seats_sentence(package.seats));

    sentences.retain(|s| !s.is_empty());
    sentences.join(" ")
}

/// Template-only query expansion.
///
/// Error-path substitute for the LLM query transformer, not the primary
/// expansion path: wraps the raw query in a fixed frame ending with the
/// shared closing sentence.
pub fn synthesize_query_expansion(raw_query: &str) -> String {
    format!(
        "A traveler is searching for a tour package. Their request: {}. {}",
        raw_query.trim(),
        CLOSING_SENTENCE
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::Location;

    fn goa_package() -> Package {
        Package {
            id: 1,
            title: "Goa Beach Getaway".into(),
            description: "Sun, sand and seafood on India's west coast.".into(),
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
            available_dates: vec![],
            images: vec![],
            embedding: vec![],
        }
    }

    #[test]
    fn test_description_sentence_order() {
        let text = synthesize_description(&goa_package(), &PriceBands::default());
        let title_pos = text.find("Goa Beach Getaway").unwrap();
        let category_pos = text.find("This is a beach tour package.").unwrap();
        let tags_pos = text.find("Perfect for: beach, relaxation.").unwrap();
        let location_pos = text.find("It takes place in Goa, India.").unwrap();
        let duration_pos = text.find("This is a 4-day tour.").unwrap();
        let price_pos = text.find("moderately priced").unwrap();
        let scope_pos = text.find("This is a domestic trip.").unwrap();
        let seats_pos = text.find("There are 20 seats available.").unwrap();

        assert!(title_pos < category_pos);
        assert!(category_pos < tags_pos);
        assert!(tags_pos < location_pos);
        assert!(location_pos < duration_pos);
        assert!(duration_pos < price_pos);
        assert!(price_pos < scope_pos);
        assert!(scope_pos < seats_pos);
    }

    #[test]
    fn test_description_is_deterministic() {
        let bands = PriceBands::default();
        let pkg = goa_package();
        assert_eq!(
            synthesize_description(&pkg, &bands),
            synthesize_description(&pkg, &bands)
        );
    }

    #[test]
    fn test_missing_optional_fields_degrade_gracefully() {
        let mut pkg = goa_package();
        pkg.tags.clear();
        pkg.location = Some(Location {
            city: None,
            region: None,
            country: Some("India".into()),
        });
        let text = synthesize_description(&pkg, &PriceBands::default());
        assert!(!text.contains("Perfect for"));
        assert!(text.contains("It takes place in India."));

        pkg.location = None;
        let text = synthesize_description(&pkg, &PriceBands::default());
        assert!(!text.contains("takes place"));
    }

    #[test]
    fn test_duration_bands() {
        assert_eq!(duration_sentence(1), "This is a one-day trip.");
        assert_eq!(duration_sentence(3), "This is a short 3-day trip.");
        assert_eq!(duration_sentence(7), "This is a 7-day tour.");
        assert_eq!(duration_sentence(12), "This is an extended 12-day journey.");
    }

    #[test]
    fn test_price_bands_follow_configuration() {
        let bands = PriceBands::default();
        assert_eq!(price_label(4999.0, &bands), "budget-friendly");
        assert_eq!(price_label(5000.0, &bands), "moderately priced");
        assert_eq!(price_label(15000.0, &bands), "premium");
        assert_eq!(price_label(50000.0, &bands), "luxury");

        let tuned = PriceBands {
            budget_max: 100.0,
            moderate_max: 200.0,
            premium_max: 300.0,
        };
        assert_eq!(price_label(150.0, &tuned), "moderately priced");
    }

    #[test]
    fn test_query_expansion_ends_with_closing_sentence() {
        let text = synthesize_query_expansion("  relaxing beach trip in Goa  ");
        assert!(text.contains("relaxing beach trip in Goa"));
        assert!(text.ends_with(CLOSING_SENTENCE));
    }
}
