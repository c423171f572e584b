use serde::Serialize;

use super::{
    branch::{Branch, BranchEffects},
    catalog::Card,
    constants,
};

/// Per-participant state for the lifetime of one session.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    /// May go to zero or below; only heal and drain gains are clamped.
    pub resource: i32,
    pub hand: Vec<Card>,
    pub block: u32,
    pub branch: Option<Branch>,
    pub effects: BranchEffects,
    pub grace_period: bool,
    pub grace_turns: i32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new(constants::STARTING_RESOURCE)
    }
}

impl PlayerState {
    #[must_use]
    pub fn new(resource: i32) -> Self {
        Self {
            resource,
            hand: Vec::new(),
            block: 0,
            branch: None,
            effects: BranchEffects::default(),
            grace_period: false,
            grace_turns: 0,
        }
    }

    /// Record the branch and apply its one-time bonus.
    pub fn choose_branch(&mut self, branch: Branch) -> &BranchEffects {
        self.effects = branch.effects();
        self.branch = Some(branch);
        if let Some(bonus) = self.effects.initial_bonus {
            self.resource += bonus.resource;
            self.block += bonus.block;
        }
        &self.effects
    }

    /// Add to the resource pool without exceeding `ceiling`. A pool already
    /// above the ceiling is brought down to it.
    pub fn gain(&mut self, amount: i32, ceiling: i32) {
        self.resource = self.resource.saturating_add(amount).min(ceiling);
    }

    /// Let block absorb up to `damage`; returns the amount absorbed.
    pub fn absorb(&mut self, damage: u32) -> u32 {
        let blocked = damage.min(self.block);
        self.block -= blocked;
        blocked
    }

    pub fn decay_block(&mut self) {
        self.block = self.block.saturating_sub(1);
    }

    pub fn take_card(&mut self, card_id: uuid::Uuid) -> Option<Card> {
        let idx = self.hand.iter().position(|card| card.id == card_id)?;
        Some(self.hand.remove(idx))
    }

    pub fn has_branch(&self) -> bool {
        self.branch.is_some()
    }
}
