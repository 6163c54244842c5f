use serde::Serialize;

use crate::value::{Attributes, StatValue};

/// Attribute key holding the aggregatable count.
pub const COUNT: &str = "count";
/// Seconds from dispatch until the response body was read.
pub const FETCHED_IN: &str = "fetched_in";
/// Seconds from dispatch until parsing completed.
pub const COMPLETED_IN: &str = "completed_in";
/// Redirect chain visited while resolving the origin.
pub const URLS: &str = "urls";

/// Attribute bag reported by one platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawStat {
    pub name: String,
    pub attributes: Attributes,
}

impl RawStat {
    /// Creates an unnamed stat; the dispatcher stamps the platform name.
    pub fn from_attributes(attributes: Attributes) -> Self {
        Self {
            name: String::new(),
            attributes,
        }
    }

    /// Creates a stat holding only a `count` attribute.
    pub fn with_count(count: impl Into<StatValue>) -> Self {
        let mut attributes = Attributes::new();
        attributes.insert(String::from(COUNT), count.into());
        Self::from_attributes(attributes)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<StatValue>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&StatValue> {
        self.attributes.get(key)
    }

    pub fn count(&self) -> Option<&StatValue> {
        self.get(COUNT)
    }
}
