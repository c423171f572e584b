use rand::{Rng, seq::SliceRandom};
use serde::Serialize;

use super::catalog::{Card, Catalog};

/// A session's draw pile and discard pile. The top of the draw pile is the
/// end of the vector.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Deck {
    draw_pile: Vec<Card>,
    discard_pile: Vec<Card>,
}

impl Deck {
    /// Build the full card population for one session and shuffle it.
    pub fn build<R: Rng + ?Sized>(catalog: &Catalog, copies: usize, rng: &mut R) -> Self {
        let mut deck = Self {
            draw_pile: catalog.instantiate(copies),
            discard_pile: Vec::new(),
        };
        deck.shuffle(rng);
        deck
    }

    /// Uniform permutation of the draw pile.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.draw_pile.shuffle(rng);
    }

    /// Take the top card. An empty draw pile is first replenished from the
    /// discard pile and reshuffled; `None` only when both piles are empty.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Card> {
        if self.draw_pile.is_empty() {
            if self.discard_pile.is_empty() {
                return None;
            }
            self.draw_pile.append(&mut self.discard_pile);
            self.shuffle(rng);
            log::debug!("Reshuffled {} cards into draw pile", self.draw_pile.len());
        }
        self.draw_pile.pop()
    }

    pub fn discard(&mut self, card: Card) {
        self.discard_pile.push(card);
    }

    /// Cards left in the draw pile.
    pub fn len(&self) -> usize {
        self.draw_pile.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draw_pile.is_empty()
    }

    pub fn discard_len(&self) -> usize {
        self.discard_pile.len()
    }

    pub fn draw_pile(&self) -> &[Card] {
        &self.draw_pile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::catalog::{CardKind, CardTemplate};
    use rand::{SeedableRng, rngs::StdRng};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_build_uses_copies_per_entry() {
        let deck = Deck::build(&Catalog::default(), 4, &mut rng());
        assert_eq!(deck.len(), 24);
        assert_eq!(deck.discard_len(), 0);
    }

    #[test]
    fn test_draw_takes_from_top() {
        let mut deck = Deck::build(&Catalog::default(), 1, &mut rng());
        let top = deck.draw_pile().last().cloned();
        let drawn = deck.draw(&mut rng());
        assert_eq!(drawn, top);
        assert_eq!(deck.len(), 5);
    }

    #[test]
    fn test_draw_reshuffles_discard_when_empty() {
        let mut rng = rng();
        let mut deck = Deck::build(&Catalog::default(), 1, &mut rng);
        let drawn: Vec<Card> = (0..6).map(|_| deck.draw(&mut rng).unwrap()).collect();
        assert!(deck.is_empty());

        for card in drawn {
            deck.discard(card);
        }
        assert_eq!(deck.discard_len(), 6);

        let card = deck.draw(&mut rng);
        assert!(card.is_some());
        assert_eq!(deck.len(), 5);
        assert_eq!(deck.discard_len(), 0);
    }

    #[test]
    fn test_draw_from_nothing_is_none() {
        let mut deck = Deck::build(&Catalog::new(vec![]), 4, &mut rng());
        assert!(deck.draw(&mut rng()).is_none());
        assert_eq!(deck.len(), 0);
        assert_eq!(deck.discard_len(), 0);
    }

    #[test]
    fn test_shuffle_keeps_population() {
        let catalog = Catalog::new(vec![CardTemplate::new("A", CardKind::Block, 1, "a")]);
        let mut deck = Deck::build(&catalog, 10, &mut rng());
        let mut before: Vec<_> = deck.draw_pile().iter().map(|c| c.id).collect();
        deck.shuffle(&mut rng());
        let mut after: Vec<_> = deck.draw_pile().iter().map(|c| c.id).collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }
}
