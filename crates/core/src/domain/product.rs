use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Store-assigned surrogate key. Never reused once assigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductId(pub i64);

/// A caller-supplied lookup code that passed input constraints.
///
/// The content is otherwise untouched: quotes, semicolons and comment markers
/// are kept verbatim and only ever reach the store as a bound parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProductCode(String);

impl ProductCode {
    pub fn parse(raw: &str, max_length: usize) -> Result<Self, DomainError> {
        let length = raw.chars().count();
        if length > max_length {
            return Err(DomainError::InputRejected(format!(
                "product code has {length} characters (limit {max_length})"
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Live,
    Deleted { at: DateTime<Utc> },
}

impl Lifecycle {
    pub fn from_deleted_at(deleted_at: Option<DateTime<Utc>>) -> Self {
        match deleted_at {
            Some(at) => Self::Deleted { at },
            None => Self::Live,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub code: String,
    pub price: u64,
    pub lifecycle: Lifecycle,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload; the store assigns `id` and timestamps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewProduct {
    pub code: String,
    pub price: u64,
}

impl NewProduct {
    pub fn new(code: impl Into<String>, price: u64) -> Self {
        Self { code: code.into(), price }
    }
}
