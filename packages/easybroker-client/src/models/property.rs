//! Property model, including operation and image normalization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::{de_opt_datetime, de_opt_id};

const PRICE_ON_REQUEST: &str = "Price on request";

/// Operation type tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationKind {
    Sale,
    Rental,
    TemporaryRental,
    Other(String),
}

impl OperationKind {
    fn parse(raw: &str) -> Self {
        match raw {
            "sale" => OperationKind::Sale,
            "rental" => OperationKind::Rental,
            "temporary_rental" => OperationKind::TemporaryRental,
            other => OperationKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            OperationKind::Sale => "sale",
            OperationKind::Rental => "rental",
            OperationKind::TemporaryRental => "temporary_rental",
            OperationKind::Other(raw) => raw,
        }
    }
}

/// A sale/rental operation attached to a property.
///
/// Upstream data carries operations in two shapes: a flat array of
/// operation-type strings (older API version) and an array of objects with
/// `type`/`amount`/`currency`/`formatted_amount` (newer). Both decode into
/// this one representation; derived accessors never see the raw shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub kind: OperationKind,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub formatted_amount: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOperation {
    Tag(String),
    Object {
        #[serde(default, rename = "type")]
        kind: Option<String>,
        #[serde(default)]
        amount: Option<f64>,
        #[serde(default)]
        currency: Option<String>,
        #[serde(default)]
        formatted_amount: Option<String>,
    },
}

impl<'de> Deserialize<'de> for Operation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawOperation::deserialize(deserializer)? {
            RawOperation::Tag(tag) => Operation {
                kind: OperationKind::parse(&tag),
                amount: None,
                currency: None,
                formatted_amount: None,
            },
            RawOperation::Object {
                kind,
                amount,
                currency,
                formatted_amount,
            } => Operation {
                kind: OperationKind::parse(kind.as_deref().unwrap_or_default()),
                amount,
                currency,
                formatted_amount,
            },
        })
    }
}

/// One entry of the detail-endpoint image list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PropertyImage {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// The `location` field is a bare display string on list endpoints and a
/// structured object (with coordinates) on the detail endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PropertyLocation {
    Name(String),
    Detailed(LocationDetail),
}

/// Structured location data from the detail endpoint.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct LocationDetail {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

/// A property listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Property {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub public_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub operations: Vec<Operation>,

    #[serde(default)]
    pub bedrooms: Option<u32>,
    #[serde(default)]
    pub bathrooms: Option<f64>,
    #[serde(default)]
    pub half_bathrooms: Option<f64>,
    #[serde(default)]
    pub parking_spaces: Option<u32>,

    #[serde(default)]
    pub construction_size: Option<f64>,
    #[serde(default)]
    pub lot_size: Option<f64>,

    #[serde(default)]
    pub location: Option<PropertyLocation>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub show_prices: bool,

    // List endpoints carry only the title image pair; the full image list
    // comes from the detail endpoint.
    #[serde(default)]
    pub title_image_thumb: Option<String>,
    #[serde(default)]
    pub title_image_full: Option<String>,
    #[serde(default)]
    pub property_images: Vec<PropertyImage>,
    #[serde(default)]
    pub videos: Vec<Value>,

    #[serde(default, deserialize_with = "de_opt_datetime")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_opt_datetime")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "de_opt_id")]
    pub internal_id: Option<String>,
    #[serde(default)]
    pub agent: Option<Value>,
}

impl Property {
    /// Main image: list-view thumbnail if present, else the first of the
    /// detail-view image list.
    pub fn main_image(&self) -> Option<&str> {
        self.title_image_thumb
            .as_deref()
            .or_else(|| self.first_detail_image())
    }

    /// Thumbnail: title thumb, else title full image, else first detail image.
    pub fn thumbnail_image(&self) -> Option<&str> {
        self.title_image_thumb
            .as_deref()
            .or(self.title_image_full.as_deref())
            .or_else(|| self.first_detail_image())
    }

    fn first_detail_image(&self) -> Option<&str> {
        self.property_images
            .iter()
            .find_map(|image| image.url.as_deref())
    }

    /// All detail-view image URLs.
    pub fn image_urls(&self) -> Vec<&str> {
        self.property_images
            .iter()
            .filter_map(|image| image.url.as_deref())
            .collect()
    }

    pub fn is_for_sale(&self) -> bool {
        self.operations
            .iter()
            .any(|op| op.kind == OperationKind::Sale)
    }

    pub fn is_for_rent(&self) -> bool {
        self.operations.iter().any(|op| {
            matches!(
                op.kind,
                OperationKind::Rental | OperationKind::TemporaryRental
            )
        })
    }

    /// Human-readable operation label, e.g. `"For Sale / For Rent"`.
    pub fn operation_label(&self) -> String {
        let mut labels = Vec::new();
        if self.is_for_sale() {
            labels.push("For Sale");
        }
        if self.is_for_rent() {
            labels.push("For Rent");
        }
        labels.join(" / ")
    }

    /// Formatted price for display.
    ///
    /// Prefers the upstream pre-formatted amount; otherwise formats the
    /// first known amount with a currency symbol and thousands grouping.
    /// `"Price on request"` when prices are hidden or absent.
    pub fn formatted_price(&self) -> String {
        if !self.show_prices {
            return PRICE_ON_REQUEST.to_string();
        }
        if let Some(formatted) = self
            .operations
            .iter()
            .find_map(|op| op.formatted_amount.as_deref())
        {
            return formatted.to_string();
        }

        let amount = self
            .operations
            .iter()
            .find_map(|op| op.amount)
            .or(self.price);
        let Some(amount) = amount else {
            return PRICE_ON_REQUEST.to_string();
        };

        let currency = self
            .operations
            .iter()
            .find_map(|op| op.currency.as_deref())
            .or(self.currency.as_deref());
        format!("{}{}", currency_symbol(currency), group_thousands(amount))
    }

    /// Display name of the raw location field, whichever shape it arrived in.
    pub fn location_name(&self) -> Option<&str> {
        match self.location.as_ref()? {
            PropertyLocation::Name(name) => Some(name),
            PropertyLocation::Detailed(detail) => detail.name.as_deref(),
        }
    }

    pub fn latitude(&self) -> Option<f64> {
        match self.location.as_ref()? {
            PropertyLocation::Detailed(detail) => detail.latitude,
            PropertyLocation::Name(_) => None,
        }
    }

    pub fn longitude(&self) -> Option<f64> {
        match self.location.as_ref()? {
            PropertyLocation::Detailed(detail) => detail.longitude,
            PropertyLocation::Name(_) => None,
        }
    }

    /// Coordinates exist only on detail-endpoint responses.
    pub fn has_coordinates(&self) -> bool {
        self.latitude().is_some() && self.longitude().is_some()
    }

    /// Join of non-empty neighborhood/city/state, else the raw location name.
    pub fn full_location(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.neighborhood, &self.city, &self.state]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            self.location_name().map(str::to_string)
        } else {
            Some(parts.join(", "))
        }
    }

    /// Bullet-joined bedroom/bathroom/parking counts, omitting zeros.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(bedrooms) = self.bedrooms.filter(|&n| n > 0) {
            parts.push(format!("{bedrooms} bed"));
        }
        if let Some(bathrooms) = self.bathrooms.filter(|&n| n > 0.0) {
            parts.push(format!("{} bath", format_count(bathrooms)));
        }
        if let Some(parking) = self.parking_spaces.filter(|&n| n > 0) {
            parts.push(format!("{parking} parking"));
        }
        parts.join(" • ")
    }
}

fn currency_symbol(currency: Option<&str>) -> &'static str {
    match currency.map(|c| c.to_uppercase()).as_deref() {
        Some("EUR") => "€",
        Some("GBP") => "£",
        // USD, MXN, and anything unknown all render as "$"
        _ => "$",
    }
}

/// Thousands-group a numeric amount, keeping two decimals only when the
/// amount is fractional.
fn group_thousands(amount: f64) -> String {
    let negative = amount < 0.0;
    let rendered = format!("{:.2}", amount.abs());
    let (digits, cents) = rendered.split_once('.').unwrap_or((rendered.as_str(), "00"));

    let mut out = String::with_capacity(rendered.len() + digits.len() / 3 + 1);
    if negative {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if cents != "00" {
        out.push('.');
        out.push_str(cents);
    }
    out
}

fn format_count(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as u64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn property(value: serde_json::Value) -> Property {
        serde_json::from_value(value).unwrap()
    }

    fn sample() -> serde_json::Value {
        json!({
            "id": "1",
            "public_id": "EB-12345",
            "title": "Beautiful House in Test City",
            "description": "A lovely property for testing purposes",
            "property_type": "House",
            "operations": ["sale"],
            "bedrooms": 3,
            "bathrooms": 2,
            "parking_spaces": 0,
            "city": "Test City",
            "state": "Test State",
            "price": 1_500_000,
            "currency": "USD",
            "show_prices": true,
            "property_images": [
                { "url": "https://example.com/image1.jpg", "title": "Front" },
                { "url": "https://example.com/image2.jpg", "title": "Back" }
            ],
            "updated_at": "2024-03-01T12:30:00Z",
            "created_at": "garbage"
        })
    }

    #[test]
    fn parses_basic_attributes() {
        let p = property(sample());
        assert_eq!(p.id.as_deref(), Some("1"));
        assert_eq!(p.public_id.as_deref(), Some("EB-12345"));
        assert_eq!(p.title.as_deref(), Some("Beautiful House in Test City"));
        assert_eq!(p.bedrooms, Some(3));
        assert_eq!(p.price, Some(1_500_000.0));
        assert!(p.updated_at.is_some());
        // Bad timestamps are dropped, never an error.
        assert!(p.created_at.is_none());
    }

    #[test]
    fn numeric_ids_are_normalized_to_strings() {
        let p = property(json!({ "id": 42 }));
        assert_eq!(p.id.as_deref(), Some("42"));
    }

    #[test]
    fn legacy_string_operations_decode() {
        let p = property(sample());
        assert_eq!(p.operations.len(), 1);
        assert_eq!(p.operations[0].kind, OperationKind::Sale);
        assert!(p.operations[0].amount.is_none());
        assert!(p.is_for_sale());
        assert!(!p.is_for_rent());
    }

    #[test]
    fn object_operations_decode_into_the_same_shape() {
        let p = property(json!({
            "show_prices": true,
            "operations": [
                { "type": "rental", "amount": 25_000, "currency": "MXN", "formatted_amount": "$25,000" },
                { "type": "temporary_rental" }
            ]
        }));
        assert!(!p.is_for_sale());
        assert!(p.is_for_rent());
        assert_eq!(p.operations[0].amount, Some(25_000.0));
        assert_eq!(p.operations[0].currency.as_deref(), Some("MXN"));
        assert_eq!(p.operations[1].kind, OperationKind::TemporaryRental);
    }

    #[test]
    fn unknown_operation_tags_are_preserved() {
        let p = property(json!({ "operations": ["auction"] }));
        assert_eq!(
            p.operations[0].kind,
            OperationKind::Other("auction".to_string())
        );
        assert!(!p.is_for_sale());
    }

    #[test]
    fn formatted_price_groups_thousands() {
        let p = property(sample());
        assert_eq!(p.formatted_price(), "$1,500,000");
    }

    #[test]
    fn formatted_price_prefers_upstream_formatting() {
        let p = property(json!({
            "show_prices": true,
            "operations": [
                { "type": "sale", "amount": 1_500_000, "currency": "USD", "formatted_amount": "$1.5M" }
            ]
        }));
        assert_eq!(p.formatted_price(), "$1.5M");
    }

    #[test]
    fn formatted_price_uses_operation_amounts() {
        let p = property(json!({
            "show_prices": true,
            "operations": [{ "type": "sale", "amount": 980_500, "currency": "EUR" }]
        }));
        assert_eq!(p.formatted_price(), "€980,500");
    }

    #[test]
    fn hidden_prices_render_as_on_request() {
        let mut raw = sample();
        raw["show_prices"] = json!(false);
        assert_eq!(property(raw).formatted_price(), "Price on request");
    }

    #[test]
    fn missing_price_renders_as_on_request() {
        let p = property(json!({ "show_prices": true, "operations": ["sale"] }));
        assert_eq!(p.formatted_price(), "Price on request");
    }

    #[test]
    fn operation_label_combines_sale_and_rent() {
        let sale = property(json!({ "operations": ["sale"] }));
        assert_eq!(sale.operation_label(), "For Sale");

        let both = property(json!({ "operations": ["sale", "rental"] }));
        assert_eq!(both.operation_label(), "For Sale / For Rent");

        let temporary = property(json!({ "operations": ["sale", "temporary_rental"] }));
        assert_eq!(temporary.operation_label(), "For Sale / For Rent");
    }

    #[test]
    fn main_image_prefers_list_view_thumbnail() {
        let p = property(sample());
        assert_eq!(p.main_image(), Some("https://example.com/image1.jpg"));

        let mut raw = sample();
        raw["title_image_thumb"] = json!("https://example.com/thumb.jpg");
        let p = property(raw);
        assert_eq!(p.main_image(), Some("https://example.com/thumb.jpg"));
    }

    #[test]
    fn thumbnail_image_falls_back_through_the_chain() {
        let p = property(json!({ "title_image_full": "https://example.com/full.jpg" }));
        assert_eq!(p.thumbnail_image(), Some("https://example.com/full.jpg"));

        let p = property(sample());
        assert_eq!(p.thumbnail_image(), Some("https://example.com/image1.jpg"));

        let p = property(json!({}));
        assert_eq!(p.thumbnail_image(), None);
    }

    #[test]
    fn summary_omits_zero_and_absent_counts() {
        let p = property(sample());
        assert_eq!(p.summary(), "3 bed • 2 bath");

        let mut raw = sample();
        raw["parking_spaces"] = json!(2);
        assert_eq!(property(raw).summary(), "3 bed • 2 bath • 2 parking");

        assert_eq!(property(json!({})).summary(), "");
    }

    #[test]
    fn full_location_joins_address_parts() {
        let p = property(sample());
        assert_eq!(p.full_location().as_deref(), Some("Test City, Test State"));
    }

    #[test]
    fn full_location_falls_back_to_raw_location_string() {
        let p = property(json!({ "location": "Centro, Monterrey" }));
        assert_eq!(p.full_location().as_deref(), Some("Centro, Monterrey"));
    }

    #[test]
    fn detail_location_object_carries_coordinates() {
        let p = property(json!({
            "location": { "name": "Centro", "latitude": 25.68, "longitude": -100.31 }
        }));
        assert!(p.has_coordinates());
        assert_eq!(p.latitude(), Some(25.68));
        assert_eq!(p.location_name(), Some("Centro"));

        let listed = property(json!({ "location": "Centro, Monterrey" }));
        assert!(!listed.has_coordinates());
    }

    #[test]
    fn image_urls_skips_entries_without_urls() {
        let p = property(json!({
            "property_images": [
                { "url": "https://example.com/a.jpg" },
                { "title": "broken entry" }
            ]
        }));
        assert_eq!(p.image_urls(), vec!["https://example.com/a.jpg"]);
    }

    #[test]
    fn groups_thousands_correctly() {
        assert_eq!(group_thousands(1_500_000.0), "1,500,000");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(1_000.0), "1,000");
        assert_eq!(group_thousands(12_345_678.5), "12,345,678.50");
    }
}
