use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two listing purposes the marketplace accepts.
///
/// Stored as its canonical uppercase text form; the single-letter prefix
/// leads every listing code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    Sell,
    Rent,
}

impl Purpose {
    /// Parses client input, tolerating surrounding whitespace and any casing.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "SELL" => Some(Purpose::Sell),
            "RENT" => Some(Purpose::Rent),
            _ => None,
        }
    }

    pub fn prefix(self) -> char {
        match self {
            Purpose::Sell => 'S',
            Purpose::Rent => 'R',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Purpose::Sell => "SELL",
            Purpose::Rent => "RENT",
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::listings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Listing {
    pub id: Uuid,                   // Uuid
    pub code: String,               // Varchar
    pub title: String,              // Varchar
    pub price: i64,                 // Int8
    pub location: String,           // Varchar
    pub purpose: String,            // Varchar
    pub identity: String,           // Varchar
    pub description: String,        // Text
    pub images: Vec<String>,        // Array<Text>
    pub contact_name: String,       // Varchar
    pub contact_phone: String,      // Varchar
    pub owner_email: String,        // Varchar
    pub verified: bool,             // Bool
    pub created_at: DateTime<Utc>,  // Timestamptz
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::listings)]
pub struct NewListing {
    pub id: Uuid,
    pub code: String,
    pub title: String,
    pub price: i64,
    pub location: String,
    pub purpose: String,
    pub identity: String,
    pub description: String,
    pub images: Vec<String>,
    pub contact_name: String,
    pub contact_phone: String,
    pub owner_email: String,
}

/// Trimmed projection for the admin dashboard table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::listings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ListingSummary {
    pub id: Uuid,
    pub code: String,
    pub title: String,
    pub location: String,
    pub purpose: String,
    pub verified: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
}

/// Listing submission as it arrives over the wire. The owner is taken from
/// the caller's token, never from the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListingRequest {
    pub title: String,
    pub price: i64,
    pub location: String,
    pub purpose: String,
    pub identity: String,
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub contact_name: String,
    pub contact_phone: String,
}
