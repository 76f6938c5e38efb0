use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl ProductId {
    /// Identifier carried by a candidate before the repository assigns one.
    pub const UNASSIGNED: Self = Self(0);
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("product id must be a positive integer, got `{0}`")]
pub struct ProductIdParseError(pub String);

impl FromStr for ProductId {
    type Err = ProductIdParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        match trimmed.parse::<u64>() {
            Ok(id) if id > 0 => Ok(Self(id)),
            _ => Err(ProductIdParseError(value.to_string())),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed product payload: {0}")]
    Malformed(String),
    #[error("product payload must be a JSON object")]
    NotAnObject,
}

impl From<serde_json::Error> for DecodeError {
    fn from(error: serde_json::Error) -> Self {
        Self::Malformed(error.to_string())
    }
}

/// A catalog entry. Absent or `null` fields decode to zero values so that
/// missing data is reported by the validator rather than the decoder.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProductPayload")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    // Existing clients read and write the misspelled key.
    #[serde(rename = "descripton")]
    pub description: String,
    pub price: f64,
    pub sku: String,
    #[serde(skip)]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub updated_on: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub deleted_on: Option<DateTime<Utc>>,
}

/// Wire shape accepted from clients. Both description spellings are read and
/// the legacy `descripton` wins when a body carries the two.
#[derive(Deserialize)]
struct ProductPayload {
    #[serde(default)]
    id: Option<serde_json::Number>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    descripton: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    sku: Option<String>,
}

impl TryFrom<ProductPayload> for Product {
    type Error = DecodeError;

    fn try_from(payload: ProductPayload) -> Result<Self, Self::Error> {
        // Client ids are advisory: anything that is not a positive integer
        // leaves the candidate unassigned.
        let id = match payload.id {
            Some(number) if number.is_f64() => {
                return Err(DecodeError::Malformed(format!("id must be an integer, got {number}")));
            }
            Some(number) => {
                number.as_u64().filter(|id| *id > 0).map_or(ProductId::UNASSIGNED, ProductId)
            }
            None => ProductId::UNASSIGNED,
        };

        Ok(Self {
            id,
            name: payload.name.unwrap_or_default(),
            description: payload.descripton.or(payload.description).unwrap_or_default(),
            price: payload.price.unwrap_or_default(),
            sku: payload.sku.unwrap_or_default(),
            ..Self::default()
        })
    }
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        sku: impl Into<String>,
    ) -> Self {
        Self {
            id: ProductId::UNASSIGNED,
            name: name.into(),
            description: description.into(),
            price,
            sku: sku.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: ProductId) -> Self {
        self.id = id;
        self
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, DecodeError> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        if !value.is_object() {
            return Err(DecodeError::NotAnObject);
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Compares only the fields a client can observe on the wire.
    pub fn client_view_eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.description == other.description
            && self.price == other.price
            && self.sku == other.sku
    }
}

pub fn products_to_json(products: &[Product]) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(products)
}
