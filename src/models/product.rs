use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Identified, ValidationError, ValidationResult};

/// Fields that must be present when a product is created, in reporting order
pub const REQUIRED_PRODUCT_FIELDS: [&str; 5] = ["title", "description", "code", "price", "category"];

/// Core catalog product model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub code: String,
    pub price: Price,
    pub status: bool,
    pub category: String,
    #[serde(default)]
    pub thumbnails: Vec<String>,
}

impl Identified for Product {
    fn id(&self) -> u64 {
        self.id
    }
}

/// Positive product price.
///
/// Whole values serialize as JSON integers (`100`, not `100.0`) so stored
/// collections stay readable and match what clients submitted.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Price(f64);

impl Price {
    /// Build a price, rejecting non-finite and non-positive values
    pub fn new(value: f64) -> ValidationResult<Self> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(ValidationError::InvalidPrice {
                value: value.to_string(),
            })
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // 2^53: beyond this f64 no longer represents every integer exactly
        const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
        if self.0.fract() == 0.0 && self.0.abs() <= MAX_EXACT {
            serializer.serialize_i64(self.0 as i64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Price::new(value).map_err(serde::de::Error::custom)
    }
}

/// Price as submitted by a client: either a JSON number or numeric text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

impl PriceInput {
    /// Coerce the submitted value to a validated [`Price`]
    pub fn coerce(&self) -> ValidationResult<Price> {
        let invalid = || ValidationError::InvalidPrice {
            value: self.to_string(),
        };

        let value = match self {
            PriceInput::Number(n) => *n,
            PriceInput::Text(text) => text.trim().parse::<f64>().map_err(|_| invalid())?,
        };

        Price::new(value).map_err(|_| invalid())
    }
}

impl std::fmt::Display for PriceInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceInput::Number(n) => write!(f, "{}", n),
            PriceInput::Text(text) => write!(f, "{:?}", text),
        }
    }
}

impl From<f64> for PriceInput {
    fn from(value: f64) -> Self {
        PriceInput::Number(value)
    }
}

impl From<&str> for PriceInput {
    fn from(value: &str) -> Self {
        PriceInput::Text(value.to_string())
    }
}

/// Product fields submitted by a client, used both for creation (where the
/// required fields are checked) and for partial updates (where only present
/// fields are merged). An `id` in the body is not part of the draft and is
/// therefore ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub code: Option<String>,
    pub price: Option<PriceInput>,
    pub status: Option<bool>,
    pub category: Option<String>,
    pub thumbnails: Option<Vec<String>>,
}

impl ProductDraft {
    /// Names of the required fields absent from this draft
    pub fn missing_fields(&self) -> Vec<String> {
        let present = [
            self.title.is_some(),
            self.description.is_some(),
            self.code.is_some(),
            self.price.is_some(),
            self.category.is_some(),
        ];

        REQUIRED_PRODUCT_FIELDS
            .iter()
            .zip(present)
            .filter(|(_, is_present)| !is_present)
            .map(|(field, _)| field.to_string())
            .collect()
    }
}

impl Product {
    /// Build a new product with an already allocated `id` from a draft.
    /// Defaults `status` to true and `thumbnails` to empty.
    pub fn create(draft: ProductDraft, id: u64) -> ValidationResult<Self> {
        let missing = draft.missing_fields();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields { fields: missing });
        }

        let price = draft
            .price
            .as_ref()
            .ok_or_else(|| ValidationError::MissingFields {
                fields: vec!["price".to_string()],
            })?
            .coerce()?;

        Ok(Self {
            id,
            title: draft.title.unwrap_or_default(),
            description: draft.description.unwrap_or_default(),
            code: draft.code.unwrap_or_default(),
            price,
            status: draft.status.unwrap_or(true),
            category: draft.category.unwrap_or_default(),
            thumbnails: draft.thumbnails.unwrap_or_default(),
        })
    }

    /// Shallow merge of the present draft fields over this record.
    ///
    /// The merge is applied to a copy and only returned when the merged price
    /// validates, so a rejected update never leaves a half-applied record.
    pub fn merged_with(&self, draft: ProductDraft) -> ValidationResult<Self> {
        let mut merged = self.clone();

        if let Some(price) = &draft.price {
            merged.price = price.coerce()?;
        }
        if let Some(title) = draft.title {
            merged.title = title;
        }
        if let Some(description) = draft.description {
            merged.description = description;
        }
        if let Some(code) = draft.code {
            merged.code = code;
        }
        if let Some(status) = draft.status {
            merged.status = status;
        }
        if let Some(category) = draft.category {
            merged.category = category;
        }
        if let Some(thumbnails) = draft.thumbnails {
            merged.thumbnails = thumbnails;
        }

        Ok(merged)
    }
}

/// Sample catalog loaded by the seeding operation
pub fn sample_catalog() -> Vec<ProductDraft> {
    let empanada = |title: &str, description: &str, code: &str, category: &str, image: &str| {
        ProductDraft {
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            code: Some(code.to_string()),
            price: Some(PriceInput::Number(1500.0)),
            status: Some(true),
            category: Some(category.to_string()),
            thumbnails: Some(vec![format!("images/empanadas/{}", image)]),
        }
    };

    vec![
        empanada(
            "Beef Empanada",
            "Traditional filling of beef, onion, bell pepper and olives.",
            "EMP-BEEF",
            "Savory",
            "beef.jpg",
        ),
        empanada(
            "Chicken Empanada",
            "Mild chicken, onion and bell pepper filling.",
            "EMP-CHICKEN",
            "Savory",
            "chicken.jpg",
        ),
        empanada(
            "Ham and Cheese Empanada",
            "Ham, mozzarella and a touch of oregano.",
            "EMP-HAM-CHEESE",
            "Savory",
            "ham-cheese.jpg",
        ),
        empanada(
            "Vegetable Empanada",
            "Chard in white sauce with a hint of nutmeg.",
            "EMP-VEG",
            "Vegetarian",
            "vegetable.jpg",
        ),
        empanada(
            "Humita Empanada",
            "Creamy sweet corn, onion and paprika.",
            "EMP-HUMITA",
            "Vegetarian",
            "humita.jpg",
        ),
    ]
}
