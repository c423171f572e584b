/// Property-based tests for whole games played on a `GameSession`
///
/// Random play sequences over the default catalog check the invariants that
/// must hold from the first deal to the end of the game: the card
/// population never changes and a declared winner is never replaced.
use math_duel::{
    Branch, Catalog, GameSession, ParticipantId, SessionError, SessionId, game::rules::Rules,
};
use proptest::prelude::*;
use rand::{SeedableRng, rngs::StdRng};
use std::sync::Arc;

fn branch_strategy() -> impl Strategy<Value = Branch> {
    prop_oneof![
        Just(Branch::Algebra),
        Just(Branch::Calculus),
        Just(Branch::Geometry),
        Just(Branch::Probability),
        Just(Branch::Statistics),
        Just(Branch::parse("alchemy")),
    ]
}

fn started(seed: u64, branches: (Branch, Branch)) -> (GameSession, [ParticipantId; 2]) {
    let mut session = GameSession::with_rng(
        SessionId::new(),
        Rules::default(),
        Arc::new(Catalog::default()),
        StdRng::seed_from_u64(seed),
    );
    let ids = [ParticipantId::new(), ParticipantId::new()];
    session.add_participant(ids[0], "alice".into()).unwrap();
    session.add_participant(ids[1], "bob".into()).unwrap();
    session.set_branch(ids[0], branches.0).unwrap();
    session.set_branch(ids[1], branches.1).unwrap();
    session.start().unwrap();
    (session, ids)
}

proptest! {
    #[test]
    fn prop_population_is_closed(
        seed in any::<u64>(),
        branches in (branch_strategy(), branch_strategy()),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 1..120),
    ) {
        let (mut session, ids) = started(seed, branches);
        let population = session.card_population();
        prop_assert_eq!(population, 24);

        for pick in picks {
            let Some(active) = session.active_participant() else { break };
            let hand = &session.player(active).unwrap().hand;
            if hand.is_empty() {
                session.next_turn().unwrap();
                continue;
            }
            let card_id = hand[pick.index(hand.len())].id;
            match session.play_card(active, card_id) {
                Ok(outcome) if outcome.winner.is_none() => {
                    session.next_turn().unwrap();
                }
                Ok(_) => break,
                Err(e) => prop_assert!(false, "active play rejected: {}", e),
            }
            prop_assert_eq!(session.card_population(), population);
        }

        // Leaving keeps the cards in play too.
        session.remove_participant(ids[1]);
        prop_assert_eq!(session.card_population(), population);
    }

    #[test]
    fn prop_winner_never_changes(
        seed in any::<u64>(),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 1..200),
    ) {
        let (mut session, ids) = started(seed, (Branch::Calculus, Branch::Algebra));
        let mut declared = None;

        for pick in picks {
            if let Some(winner) = declared {
                prop_assert_eq!(session.winner(), Some(winner));
                prop_assert_eq!(session.next_turn().unwrap_err(), SessionError::GameOver);
                for id in ids {
                    let Some(card) = session.player(id).unwrap().hand.first().map(|c| c.id) else {
                        continue;
                    };
                    prop_assert_eq!(
                        session.play_card(id, card).unwrap_err(),
                        SessionError::GameOver
                    );
                }
                prop_assert_eq!(session.check_win(), Some(winner));
                continue;
            }

            let Some(active) = session.active_participant() else { break };
            let hand = &session.player(active).unwrap().hand;
            if hand.is_empty() {
                session.next_turn().unwrap();
                continue;
            }
            let card_id = hand[pick.index(hand.len())].id;
            let outcome = session.play_card(active, card_id).unwrap();
            declared = outcome.winner;
            if declared.is_none() {
                session.next_turn().unwrap();
            }
        }
    }

    #[test]
    fn prop_resource_never_above_ceiling_after_gain(
        seed in any::<u64>(),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 1..80),
    ) {
        let (mut session, ids) = started(seed, (Branch::Statistics, Branch::Geometry));

        for pick in picks {
            let Some(active) = session.active_participant() else { break };
            let hand = &session.player(active).unwrap().hand;
            if hand.is_empty() {
                session.next_turn().unwrap();
                continue;
            }
            let card_id = hand[pick.index(hand.len())].id;
            let outcome = session.play_card(active, card_id).unwrap();
            for id in ids {
                prop_assert!(session.player(id).unwrap().resource <= 100);
            }
            if outcome.winner.is_some() {
                break;
            }
            session.next_turn().unwrap();
        }
    }
}
