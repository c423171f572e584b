//! The authoritative state machine for one paired match.
//!
//! A [`GameSession`] is synchronous and owns everything about its match:
//! both players' state, the deck, the turn pointer and the winner. It never
//! talks to the network; callers (the session actor) broadcast snapshots
//! after each successful mutation.
//!
//! ## Lifecycle
//!
//! ```text
//! add_participant x2 -> set_branch x2 -> start
//!     -> (play_card -> next_turn)* -> winner decided
//! ```

use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::{
    branch::{Branch, BranchEffects},
    catalog::{Card, CardKind, Catalog},
    deck::Deck,
    entities::{DisplayName, Participant, ParticipantId, SessionId, Slot},
    errors::{SessionError, SessionResult},
    player::PlayerState,
    rules::Rules,
    views::{PlayerView, SessionSnapshot},
};

/// Participants a session seats.
pub const SEATS: usize = 2;

#[derive(Clone, Debug)]
struct Seat {
    participant: Participant,
    state: PlayerState,
}

/// What a resolved card did.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayResult {
    pub effect: CardKind,
    /// Magnitude after branch modifiers.
    pub value: u32,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_damage: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_drain: Option<i32>,
}

#[derive(Clone, Debug)]
pub struct PlayOutcome {
    pub card: Card,
    pub result: PlayResult,
    pub winner: Option<ParticipantId>,
}

#[derive(Clone, Debug)]
pub struct BranchOutcome {
    pub branch: Branch,
    pub effects: BranchEffects,
    /// Both participants have chosen and the game has not started yet.
    pub ready_to_start: bool,
}

#[derive(Clone, Debug)]
pub struct TurnOutcome {
    pub turn_index: Slot,
    pub active: ParticipantId,
    pub drawn: Vec<Card>,
}

pub struct GameSession {
    id: SessionId,
    rules: Rules,
    catalog: Arc<Catalog>,
    /// Ordered by slot.
    seats: Vec<Seat>,
    deck: Deck,
    turn: Slot,
    turn_count: u32,
    started: bool,
    winner: Option<ParticipantId>,
    /// Set by an accepted play, cleared by the turn advance.
    turn_pending: bool,
    rng: StdRng,
}

impl GameSession {
    #[must_use]
    pub fn new(id: SessionId, rules: Rules, catalog: Arc<Catalog>) -> Self {
        Self::with_rng(id, rules, catalog, StdRng::from_rng(&mut rand::rng()))
    }

    /// Same as [`GameSession::new`] with a caller-supplied shuffle source.
    #[must_use]
    pub fn with_rng(id: SessionId, rules: Rules, catalog: Arc<Catalog>, rng: StdRng) -> Self {
        Self {
            id,
            rules,
            catalog,
            seats: Vec::with_capacity(SEATS),
            deck: Deck::default(),
            turn: 0,
            turn_count: 0,
            started: false,
            winner: None,
            turn_pending: false,
            rng,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn winner(&self) -> Option<ParticipantId> {
        self.winner
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    pub fn turn_index(&self) -> Slot {
        self.turn
    }

    pub fn is_turn_pending(&self) -> bool {
        self.turn_pending
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.seats.iter().map(|seat| &seat.participant)
    }

    pub fn participant_count(&self) -> usize {
        self.seats.len()
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.seat(id).map(|seat| &seat.participant)
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.seat_index(id).is_some()
    }

    pub fn opponent_of(&self, id: ParticipantId) -> Option<&Participant> {
        self.seat_index(id)?;
        self.participants().find(|p| p.id != id)
    }

    pub fn player(&self, id: ParticipantId) -> Option<&PlayerState> {
        self.seat(id).map(|seat| &seat.state)
    }

    /// The participant whose slot matches the turn index.
    pub fn active_participant(&self) -> Option<ParticipantId> {
        self.seats
            .iter()
            .find(|seat| seat.participant.slot == self.turn)
            .map(|seat| seat.participant.id)
    }

    fn seat_index(&self, id: ParticipantId) -> Option<usize> {
        self.seats.iter().position(|seat| seat.participant.id == id)
    }

    fn seat(&self, id: ParticipantId) -> Option<&Seat> {
        self.seats.iter().find(|seat| seat.participant.id == id)
    }

    /// Seat a participant in the next free slot.
    pub fn add_participant(
        &mut self,
        id: ParticipantId,
        name: DisplayName,
    ) -> SessionResult<Slot> {
        if self.contains(id) {
            return Err(SessionError::AlreadyJoined);
        }
        if self.seats.len() >= SEATS {
            return Err(SessionError::SessionFull);
        }
        let slot = self.seats.len();
        self.seats.push(Seat {
            participant: Participant { id, name, slot },
            state: PlayerState::new(self.rules.starting_resource),
        });
        Ok(slot)
    }

    /// Take a participant out of the session. Their hand goes to the discard
    /// pile so the card population stays closed.
    pub fn remove_participant(&mut self, id: ParticipantId) -> Option<Participant> {
        let idx = self.seat_index(id)?;
        let seat = self.seats.remove(idx);
        for card in seat.state.hand {
            self.deck.discard(card);
        }
        self.turn_pending = false;
        Some(seat.participant)
    }

    /// Record a participant's branch choice and apply its one-time bonus.
    pub fn set_branch(&mut self, id: ParticipantId, branch: Branch) -> SessionResult<BranchOutcome> {
        let idx = self
            .seat_index(id)
            .ok_or(SessionError::UnknownParticipant)?;
        if self.winner.is_some() {
            return Err(SessionError::GameOver);
        }
        if self.seats[idx].state.has_branch() {
            return Err(SessionError::BranchAlreadyChosen);
        }

        let effects = self.seats[idx].state.choose_branch(branch.clone()).clone();
        Ok(BranchOutcome {
            branch,
            effects,
            ready_to_start: self.ready_to_start(),
        })
    }

    pub fn ready_to_start(&self) -> bool {
        !self.started
            && self.seats.len() == SEATS
            && self.seats.iter().all(|seat| seat.state.has_branch())
    }

    /// Build and shuffle the deck, deal starting hands, give slot 0 the turn.
    pub fn start(&mut self) -> SessionResult<()> {
        if self.seats.len() != SEATS {
            return Err(SessionError::NotEnoughPlayers);
        }
        if self.started {
            return Err(SessionError::AlreadyStarted);
        }

        self.deck = Deck::build(&self.catalog, self.rules.copies_per_card, &mut self.rng);
        let ids: Vec<ParticipantId> = self.participants().map(|p| p.id).collect();
        for id in ids {
            for _ in 0..self.rules.starting_hand_size {
                self.draw(id);
            }
        }

        self.turn = 0;
        self.turn_count = 0;
        self.turn_pending = false;
        self.started = true;
        log::info!(
            "Session {} started with {} cards",
            self.id,
            self.card_population()
        );
        Ok(())
    }

    /// Move the top card of the deck into the participant's hand.
    pub fn draw(&mut self, id: ParticipantId) -> Option<Card> {
        let idx = self.seat_index(id)?;
        let card = self.deck.draw(&mut self.rng)?;
        self.seats[idx].state.hand.push(card.clone());
        Some(card)
    }

    /// Play a card from the active participant's hand against the opponent.
    ///
    /// Rejections leave the session untouched. An accepted play marks the
    /// turn as pending until [`GameSession::next_turn`] runs.
    pub fn play_card(&mut self, id: ParticipantId, card_id: Uuid) -> SessionResult<PlayOutcome> {
        let actor = self
            .seat_index(id)
            .ok_or(SessionError::UnknownParticipant)?;
        if self.winner.is_some() {
            return Err(SessionError::GameOver);
        }
        if !self.started {
            return Err(SessionError::NotStarted);
        }
        if self.seats[actor].participant.slot != self.turn {
            return Err(SessionError::NotYourTurn);
        }
        if self.turn_pending {
            return Err(SessionError::TurnPending);
        }
        if !self.seats[actor].state.hand.iter().any(|c| c.id == card_id) {
            return Err(SessionError::CardNotFound);
        }

        let max_resource = self.rules.max_resource;
        let (me, opponent) = pair_mut(&mut self.seats, actor).ok_or(SessionError::NoOpponent)?;
        let card = me.take_card(card_id).ok_or(SessionError::CardNotFound)?;
        let result = resolve(&card, me, opponent, max_resource);
        self.deck.discard(card.clone());

        let winner = self.check_win();
        self.turn_pending = winner.is_none();

        Ok(PlayOutcome {
            card,
            result,
            winner,
        })
    }

    /// Grace-period bookkeeping and winner detection. Runs after every play.
    ///
    /// A participant dropping to zero or below enters a grace period of
    /// `rules.grace_turns` evaluations; each later evaluation counts it down
    /// and the opponent wins when it runs out. The first winner declared is
    /// final.
    pub fn check_win(&mut self) -> Option<ParticipantId> {
        if self.winner.is_some() || self.seats.len() != SEATS {
            return self.winner;
        }

        let grace_turns = self.rules.grace_turns;
        let mut declared = None;
        for idx in 0..SEATS {
            let state = &mut self.seats[idx].state;
            let expired = if state.resource <= 0 && !state.grace_period {
                state.grace_period = true;
                state.grace_turns = grace_turns;
                false
            } else if state.grace_period {
                state.grace_turns -= 1;
                state.grace_turns <= 0
            } else {
                false
            };

            if expired && declared.is_none() {
                declared = Some(self.seats[1 - idx].participant.id);
            }
        }

        if declared.is_none() {
            let (first, second) = (&self.seats[0], &self.seats[1]);
            if first.state.resource > 0 && out_of_grace(&second.state) {
                declared = Some(first.participant.id);
            } else if second.state.resource > 0 && out_of_grace(&first.state) {
                declared = Some(second.participant.id);
            }
        }

        if let Some(winner) = declared {
            log::info!("Session {} won by {}", self.id, winner);
            self.winner = Some(winner);
        }
        self.winner
    }

    /// Hand the turn to the other slot: draw for the new active participant
    /// (plus any branch extra draws), then decay every block by one.
    pub fn next_turn(&mut self) -> SessionResult<TurnOutcome> {
        if self.winner.is_some() {
            return Err(SessionError::GameOver);
        }
        if !self.started {
            return Err(SessionError::NotStarted);
        }
        if self.seats.len() != SEATS {
            return Err(SessionError::NoOpponent);
        }

        self.turn = 1 - self.turn;
        self.turn_count += 1;
        self.turn_pending = false;

        let active = self.seats[self.turn].participant.id;
        let draws = 1 + self.seats[self.turn].state.effects.extra_draws;
        let drawn: Vec<Card> = (0..draws).filter_map(|_| self.draw(active)).collect();

        for seat in &mut self.seats {
            seat.state.decay_block();
        }

        Ok(TurnOutcome {
            turn_index: self.turn,
            active,
            drawn,
        })
    }

    /// Total cards across draw pile, discard pile and every hand.
    pub fn card_population(&self) -> usize {
        self.deck.len()
            + self.deck.discard_len()
            + self
                .seats
                .iter()
                .map(|seat| seat.state.hand.len())
                .sum::<usize>()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            turn_index: self.turn,
            turn_count: self.turn_count,
            started: self.started,
            winner: self.winner,
            deck_size: self.deck.len(),
            discard_size: self.deck.discard_len(),
            players: self
                .seats
                .iter()
                .map(|seat| PlayerView {
                    id: seat.participant.id,
                    name: seat.participant.name.clone(),
                    slot: seat.participant.slot,
                    state: seat.state.clone(),
                })
                .collect(),
        }
    }
}

fn out_of_grace(state: &PlayerState) -> bool {
    state.grace_period && state.grace_turns <= 0
}

/// Borrow the acting seat's state together with the other seat's state.
fn pair_mut(seats: &mut [Seat], actor: usize) -> Option<(&mut PlayerState, &mut PlayerState)> {
    let [first, second] = seats else {
        return None;
    };
    match actor {
        0 => Some((&mut first.state, &mut second.state)),
        1 => Some((&mut second.state, &mut first.state)),
        _ => None,
    }
}

fn resolve(
    card: &Card,
    me: &mut PlayerState,
    opponent: &mut PlayerState,
    max_resource: i32,
) -> PlayResult {
    let mut result = PlayResult {
        effect: card.kind,
        value: card.value,
        description: card.description.clone(),
        blocked: None,
        actual_damage: None,
        actual_drain: None,
    };

    match card.kind {
        CardKind::Damage => {
            let damage = card.value.saturating_add(me.effects.damage_bonus);
            let blocked = opponent.absorb(damage);
            let dealt = damage - blocked;
            opponent.resource = opponent.resource.saturating_sub_unsigned(dealt);
            result.value = damage;
            result.blocked = Some(blocked);
            result.actual_damage = Some(dealt);
        }
        CardKind::Heal => {
            me.gain(magnitude(card.value), max_resource);
        }
        CardKind::Block => {
            let amount = card.value.saturating_add(me.effects.block_bonus);
            me.block = me.block.saturating_add(amount);
            result.value = amount;
        }
        CardKind::Drain => {
            // Against an opponent below zero the amount goes negative: the
            // opponent is pulled back toward zero and the player pays for it.
            let amount = magnitude(card.value).min(opponent.resource);
            opponent.resource -= amount;
            me.gain(amount, max_resource);
            result.actual_drain = Some(amount);
        }
    }

    result
}

fn magnitude(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
