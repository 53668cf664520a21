use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// The reservation being confirmed. Every field but `id` is display-only and
/// rendered as "N/A" when missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservationRecord {
    pub id: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub purpose: Option<String>,
    /// ISO date or RFC 3339 timestamp.
    pub arrival_date: Option<String>,
    /// "HH:mm" as entered by the guest.
    pub arrival_time: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub table_number: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub num_people: Option<String>,
}

/// One ordered dish.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderLine {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    /// Discounted unit price; wins over `price` when present and non-zero.
    pub offer_price: Option<Decimal>,
    #[serde(alias = "selectedQuantity")]
    pub quantity: Option<i64>,
}

impl OrderLine {
    pub fn new(name: impl Into<String>, price: Decimal, quantity: i64) -> Self {
        Self {
            name: Some(name.into()),
            price: Some(price),
            offer_price: None,
            quantity: Some(quantity),
        }
    }

    pub fn with_offer_price(mut self, offer_price: Decimal) -> Self {
        self.offer_price = Some(offer_price);
        self
    }

    pub fn unit_price(&self) -> Decimal {
        self.offer_price
            .filter(|offer| !offer.is_zero())
            .or(self.price)
            .unwrap_or(Decimal::ZERO)
    }

    /// Absent or non-positive quantities count as one.
    pub fn effective_quantity(&self) -> i64 {
        self.quantity.filter(|qty| *qty > 0).unwrap_or(1)
    }

    pub fn line_total(&self) -> Decimal {
        self.unit_price() * Decimal::from(self.effective_quantity())
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    }))
}
