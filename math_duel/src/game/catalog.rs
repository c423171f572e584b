//! Card definitions and the table they are instantiated from.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// What a card does when played.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    /// Reduce the opponent's resource, absorbed by their block first.
    Damage,
    /// Add to the player's own block.
    Block,
    /// Restore the player's own resource up to the ceiling.
    Heal,
    /// Move resource from the opponent to the player.
    Drain,
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Damage => "damage",
            Self::Block => "block",
            Self::Heal => "heal",
            Self::Drain => "drain",
        };
        write!(f, "{repr}")
    }
}

/// A catalog entry. Templates have no identity; every deck copy made from
/// one becomes a distinct [`Card`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CardTemplate {
    pub name: String,
    #[serde(rename = "effect")]
    pub kind: CardKind,
    pub value: u32,
    pub description: String,
}

impl CardTemplate {
    pub fn new(name: &str, kind: CardKind, value: u32, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            value,
            description: description.to_string(),
        }
    }

    /// Make a fresh card instance with its own identifier.
    #[must_use]
    pub fn instantiate(&self) -> Card {
        Card {
            id: Uuid::new_v4(),
            name: self.name.clone(),
            kind: self.kind,
            value: self.value,
            description: self.description.clone(),
        }
    }
}

/// One physical card in a session. Identity is `id`; copies of the same
/// template share everything else.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Card {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "effect")]
    pub kind: CardKind,
    pub value: u32,
    pub description: String,
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} {})", self.name, self.kind, self.value)
    }
}

/// Immutable table of card definitions a deck is built from.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Catalog {
    entries: Vec<CardTemplate>,
}

impl Catalog {
    pub fn new(entries: Vec<CardTemplate>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CardTemplate] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Instantiate `copies` cards per entry, in catalog order.
    pub fn instantiate(&self, copies: usize) -> Vec<Card> {
        self.entries
            .iter()
            .flat_map(|template| (0..copies).map(|_| template.instantiate()))
            .collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(vec![
            CardTemplate::new(
                "Logic Bomb",
                CardKind::Damage,
                15,
                "Deal 15 damage to opponent",
            ),
            CardTemplate::new("Probability Shield", CardKind::Block, 10, "Gain 10 block"),
            CardTemplate::new("Calculus Heal", CardKind::Heal, 12, "Restore 12 IP"),
            CardTemplate::new("Algebra Strike", CardKind::Damage, 10, "Deal 10 damage"),
            CardTemplate::new("Geometry Defense", CardKind::Block, 8, "Gain 8 block"),
            CardTemplate::new(
                "Statistics Drain",
                CardKind::Drain,
                5,
                "Steal 5 IP from opponent",
            ),
        ])
    }
}
