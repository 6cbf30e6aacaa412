//! Port record as it appears in the dataset and in API responses.

use serde::{Deserialize, Deserializer, Serialize};

/// One port or location entity.
///
/// Every field is optional in the source document. Absent fields and explicit
/// `null` values both decode to the empty value; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Port {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub country: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub alias: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub regions: Vec<String>,
    /// `[longitude, latitude]`
    #[serde(default, deserialize_with = "null_as_default")]
    pub coordinates: Vec<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub province: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timezone: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub unlocs: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: String,
}

#[cfg(test)]
impl Port {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn with_coordinates(mut self, longitude: f64, latitude: f64) -> Self {
        self.coordinates = vec![longitude, latitude];
        self
    }

    pub fn with_unlocs(mut self, unlocs: Vec<String>) -> Self {
        self.unlocs = unlocs;
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
