use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

use super::constants;

/// Identifies one connected participant. Assigned by the transport when the
/// connection opens and never reused.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct ParticipantId(Uuid);

impl ParticipantId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for ParticipantId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for SessionId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

/// A participant's display name. Whitespace runs collapse to a single
/// space and the result is capped at [`constants::MAX_NAME_LENGTH`] chars.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(s: &str) -> Self {
        let mut name: String = s
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .chars()
            .take(constants::MAX_NAME_LENGTH)
            .collect();
        name.truncate(name.trim_end().len());
        if name.is_empty() {
            name = constants::DEFAULT_NAME.to_string();
        }
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for DisplayName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<&str> for DisplayName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DisplayName {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

/// Slot a participant occupies in a session. Slot 0 moves first.
pub type Slot = usize;

/// A seated participant as the session roster reports it.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: DisplayName,
    pub slot: Slot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_collapses_whitespace() {
        let name = DisplayName::new("  ada \t  lovelace ");
        assert_eq!(name.as_str(), "ada lovelace");
    }

    #[test]
    fn test_display_name_truncates() {
        let long = "x".repeat(constants::MAX_NAME_LENGTH * 2);
        let name = DisplayName::new(&long);
        assert_eq!(name.as_str().chars().count(), constants::MAX_NAME_LENGTH);
    }

    #[test]
    fn test_display_name_empty_falls_back() {
        assert_eq!(DisplayName::new("   ").as_str(), constants::DEFAULT_NAME);
        assert_eq!(DisplayName::new("").as_str(), constants::DEFAULT_NAME);
    }

    #[test]
    fn test_display_name_deserialize_sanitizes() {
        let name: DisplayName = serde_json::from_str("\"  bob  \"").unwrap();
        assert_eq!(name.as_str(), "bob");
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(ParticipantId::new(), ParticipantId::new());
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn test_participant_id_serializes_as_plain_uuid() {
        let uuid = Uuid::new_v4();
        let id = ParticipantId::from(uuid);
        assert_eq!(serde_json::to_string(&id).unwrap(), format!("\"{uuid}\""));
    }
}
