//! Entity ID type representing a domain.object_id pair

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for invalid entity IDs
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EntityIdError {
    #[error("entity_id must contain exactly one '.' separator")]
    InvalidFormat,

    #[error("domain cannot be empty")]
    EmptyDomain,

    #[error("object_id cannot be empty")]
    EmptyObjectId,

    #[error("domain '{0}' must be lowercase alphanumeric with single underscores")]
    InvalidDomain(String),

    #[error("object_id '{0}' must be lowercase alphanumeric with underscores")]
    InvalidObjectId(String),
}

/// A validated Home Assistant entity ID (e.g., "light.living_room")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId {
    raw: String,
    dot: usize,
}

impl EntityId {
    /// Parse and validate an entity ID string
    pub fn parse(raw: impl Into<String>) -> Result<Self, EntityIdError> {
        let raw = raw.into();
        let (domain, object_id) = raw.split_once('.').ok_or(EntityIdError::InvalidFormat)?;
        if object_id.contains('.') {
            return Err(EntityIdError::InvalidFormat);
        }
        if domain.is_empty() {
            return Err(EntityIdError::EmptyDomain);
        }
        if object_id.is_empty() {
            return Err(EntityIdError::EmptyObjectId);
        }
        if !valid_slug(domain) || domain.contains("__") {
            return Err(EntityIdError::InvalidDomain(domain.to_string()));
        }
        if !valid_slug(object_id) {
            return Err(EntityIdError::InvalidObjectId(object_id.to_string()));
        }

        let dot = domain.len();
        Ok(Self { raw, dot })
    }

    pub fn domain(&self) -> &str {
        &self.raw[..self.dot]
    }

    pub fn object_id(&self) -> &str {
        &self.raw[self.dot + 1..]
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Check whether this entity belongs to `domain`
    pub fn is_domain(&self, domain: &str) -> bool {
        self.domain() == domain
    }
}

/// Domain prefix of a raw entity ID string, without validating it.
///
/// Returns the whole string when there is no separator.
pub fn split_domain(entity_id: &str) -> &str {
    entity_id
        .split_once('.')
        .map_or(entity_id, |(domain, _)| domain)
}

/// Lowercase alphanumeric + underscore, not starting or ending with `_`
fn valid_slug(s: &str) -> bool {
    !s.starts_with('_')
        && !s.ends_with('_')
        && s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

impl FromStr for EntityId {
    type Err = EntityIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for EntityId {
    type Error = EntityIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> String {
        id.raw
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_parts() {
        let id = EntityId::parse("automation.morning_lights").unwrap();
        assert_eq!(id.domain(), "automation");
        assert_eq!(id.object_id(), "morning_lights");
        assert!(id.is_domain("automation"));
        assert_eq!(id.to_string(), "automation.morning_lights");
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!("kitchen".parse::<EntityId>().unwrap_err(), EntityIdError::InvalidFormat);
        assert_eq!("a.b.c".parse::<EntityId>().unwrap_err(), EntityIdError::InvalidFormat);
        assert_eq!(".kitchen".parse::<EntityId>().unwrap_err(), EntityIdError::EmptyDomain);
        assert_eq!("light.".parse::<EntityId>().unwrap_err(), EntityIdError::EmptyObjectId);
        assert!(matches!(
            "Light.kitchen".parse::<EntityId>(),
            Err(EntityIdError::InvalidDomain(_))
        ));
        assert!(matches!(
            "my__light.kitchen".parse::<EntityId>(),
            Err(EntityIdError::InvalidDomain(_))
        ));
        assert!(matches!(
            "light._kitchen".parse::<EntityId>(),
            Err(EntityIdError::InvalidObjectId(_))
        ));
        // Double underscore is allowed in the object_id
        assert!("light.my__kitchen".parse::<EntityId>().is_ok());
    }

    #[test]
    fn test_split_domain() {
        assert_eq!(split_domain("sensor.temperature"), "sensor");
        assert_eq!(split_domain("no_separator"), "no_separator");
    }

    #[test]
    fn test_serde() {
        let id: EntityId = serde_json::from_str("\"script.bedtime\"").unwrap();
        assert_eq!(id.domain(), "script");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"script.bedtime\"");
        assert!(serde_json::from_str::<EntityId>("\"bedtime\"").is_err());
    }
}
