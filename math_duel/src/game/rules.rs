use serde::{Deserialize, Serialize};

use super::constants;

/// Numeric rules a session is played under.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Rules {
    pub starting_resource: i32,
    /// Ceiling for heal and drain gains.
    pub max_resource: i32,
    pub starting_hand_size: usize,
    pub grace_turns: i32,
    pub copies_per_card: usize,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            starting_resource: constants::STARTING_RESOURCE,
            max_resource: constants::MAX_RESOURCE,
            starting_hand_size: constants::STARTING_HAND_SIZE,
            grace_turns: constants::GRACE_TURNS,
            copies_per_card: constants::COPIES_PER_CARD,
        }
    }
}

impl Rules {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_resource <= 0 {
            return Err("Max resource must be positive".to_string());
        }
        if self.starting_resource <= 0 {
            return Err("Starting resource must be positive".to_string());
        }
        if self.starting_hand_size == 0 {
            return Err("Starting hand size must be at least 1".to_string());
        }
        if self.grace_turns <= 0 {
            return Err("Grace turns must be at least 1".to_string());
        }
        if self.copies_per_card == 0 {
            return Err("Card copies must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_are_valid() {
        let rules = Rules::default();
        assert!(rules.validate().is_ok());
        assert_eq!(rules.max_resource, 100);
        assert_eq!(rules.grace_turns, 3);
    }

    #[test]
    fn test_zero_hand_is_invalid() {
        let rules = Rules {
            starting_hand_size: 0,
            ..Rules::default()
        };
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_zero_grace_is_invalid() {
        let rules = Rules {
            grace_turns: 0,
            ..Rules::default()
        };
        assert!(rules.validate().is_err());
    }
}
