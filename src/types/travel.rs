//! Travel record types.

use bson::oid::ObjectId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a travel record.
///
/// Wraps a BSON `ObjectId` and serializes as a 24-character hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TravelId(ObjectId);

impl TravelId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    /// The all-zero identifier carried by records that were never stored.
    pub fn nil() -> Self {
        Self(ObjectId::from_bytes([0; 12]))
    }

    /// Whether this is the all-zero identifier.
    pub fn is_nil(&self) -> bool {
        self.0.bytes() == [0; 12]
    }

    /// Get the inner `ObjectId`.
    pub fn as_object_id(&self) -> ObjectId {
        self.0
    }

    /// Hex representation.
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl Default for TravelId {
    fn default() -> Self {
        Self::nil()
    }
}

impl fmt::Display for TravelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

impl From<ObjectId> for TravelId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

/// Error returned when a string is not a valid travel identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("the provided hex string is not a valid ObjectID: {input:?}")]
pub struct TravelIdError {
    input: String,
}

impl FromStr for TravelId {
    type Err = TravelIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s)
            .map(Self)
            .map_err(|_| TravelIdError { input: s.to_string() })
    }
}

impl Serialize for TravelId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for TravelId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A travel record.
///
/// Missing fields decode to their zero values, so a partial request body
/// still yields a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Travel {
    /// Store-assigned identifier.
    pub id: TravelId,
    /// Free-text label.
    pub name: String,
    /// Photo URI or path, not validated.
    pub photo: String,
    /// Completion flag.
    pub done: bool,
}

impl Travel {
    /// Create an unsaved travel record.
    pub fn new(name: impl Into<String>, photo: impl Into<String>, done: bool) -> Self {
        Self {
            id: TravelId::nil(),
            name: name.into(),
            photo: photo.into(),
            done,
        }
    }

    /// Return the record with a different identifier.
    pub fn with_id(mut self, id: TravelId) -> Self {
        self.id = id;
        self
    }

    /// Apply a single-field update.
    pub fn apply(&mut self, update: &FieldUpdate) {
        match update {
            FieldUpdate::Name(name) => self.name = name.clone(),
            FieldUpdate::Photo(photo) => self.photo = photo.clone(),
            FieldUpdate::Done(done) => self.done = *done,
        }
    }
}

/// Update of exactly one travel field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    /// Set `name`.
    Name(String),
    /// Set `photo`.
    Photo(String),
    /// Set `done`.
    Done(bool),
}

impl FieldUpdate {
    /// Stored field name.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::Photo(_) => "photo",
            Self::Done(_) => "done",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_travel_id_hex_roundtrip() {
        let id = TravelId::new();
        let parsed: TravelId = id.to_hex().parse().unwrap();
        assert_eq!(id, parsed);
        assert_eq!(id.to_string().len(), 24);
    }

    #[test]
    fn test_travel_id_rejects_garbage() {
        assert!("not-an-id".parse::<TravelId>().is_err());
        assert!("".parse::<TravelId>().is_err());
    }

    #[test]
    fn test_travel_serializes_id_as_hex() {
        let id: TravelId = "64b7f1c2a1b2c3d4e5f60718".parse().unwrap();
        let travel = Travel::new("Lisbon", "lisbon.jpg", false).with_id(id);
        let json = serde_json::to_value(&travel).unwrap();

        assert_eq!(json["id"], "64b7f1c2a1b2c3d4e5f60718");
        assert_eq!(json["name"], "Lisbon");
        assert_eq!(json["photo"], "lisbon.jpg");
        assert_eq!(json["done"], false);
    }

    #[test]
    fn test_travel_decodes_partial_body() {
        let travel: Travel = serde_json::from_str(r#"{"name":"Kyoto"}"#).unwrap();
        assert_eq!(travel.name, "Kyoto");
        assert_eq!(travel.photo, "");
        assert!(!travel.done);
        assert!(travel.id.is_nil());
    }

    #[test]
    fn test_travel_rejects_invalid_id_in_body() {
        let result: Result<Travel, _> = serde_json::from_str(r#"{"id":"xyz","name":"Oslo"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_field_update() {
        let mut travel = Travel::new("Rome", "rome.png", false);
        travel.apply(&FieldUpdate::Done(true));
        travel.apply(&FieldUpdate::Name("Roma".to_string()));

        assert!(travel.done);
        assert_eq!(travel.name, "Roma");
        assert_eq!(FieldUpdate::Photo(String::new()).field(), "photo");
    }
}
