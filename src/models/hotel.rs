use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: String,
    pub name: String,
    pub location: String,
    pub description: String,
    pub image: Option<String>,
    pub price: f64,
    pub rating: Option<f64>,
    pub reviews: i64,
    pub stripe_price_id: Option<String>,
    #[serde(skip_serializing, default)]
    pub embedding: Option<Vec<f32>>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Hotel {
    /// Text fed to the embedding provider when the hotel is (re-)indexed.
    pub fn embedding_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.name, self.description, self.location, self.price
        )
    }
}

/// Subset of hotel fields embedded in booking listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelSummary {
    pub id: String,
    pub name: String,
    pub location: String,
    pub image: Option<String>,
    pub price: f64,
}

/// Search hit: a hotel plus its similarity score against the query vector.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedHotel {
    pub id: String,
    pub name: String,
    pub location: String,
    pub image: Option<String>,
    pub price: f64,
    pub rating: Option<f64>,
    pub reviews: i64,
    pub score: f64,
}
