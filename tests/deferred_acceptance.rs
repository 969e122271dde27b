//! End-to-end behaviour of the deferred-acceptance engine.
//!
//! Covers the concrete two-by-two scenarios, the symmetry invariant after
//! every step and override, the termination bound, and proposer-optimality
//! against a brute-force enumeration of every stable matching on small
//! seeded instances.

use stable_match::engine::{find_blocking_pairs, Engine, StepOutcome};
use stable_match::registry::Roster;
use stable_match::sink::RecordingSink;
use stable_match::state::MatchState;
use stable_match::types::{Agent, AgentId, BlockingPair, MatchEvent, Side};
use stable_match::{AgentRegistry, EngineConfig, MatchError, NullSink, SelectionPolicy};

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

const A: u64 = 1;
const B: u64 = 2;
const X: u64 = 10;
const Y: u64 = 20;

/// A:[X,Y], B:[X,Y]; X:[A,B], Y:[A,B]
fn shared_tastes() -> (Vec<Agent>, Vec<Agent>) {
    (
        vec![Agent::new(A, "A", [X, Y]), Agent::new(B, "B", [X, Y])],
        vec![Agent::new(X, "X", [A, B]), Agent::new(Y, "Y", [A, B])],
    )
}

/// Random complete instance with proposers `1..=n` and receivers `101..=100+n`.
fn random_instance(n: usize, seed: u64) -> (Vec<Agent>, Vec<Agent>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let proposer_ids: Vec<u64> = (1..=n as u64).collect();
    let receiver_ids: Vec<u64> = (101..=100 + n as u64).collect();

    let proposers = proposer_ids
        .iter()
        .map(|&id| {
            let mut prefs = receiver_ids.clone();
            prefs.shuffle(&mut rng);
            Agent::new(id, format!("p{id}"), prefs)
        })
        .collect();
    let receivers = receiver_ids
        .iter()
        .map(|&id| {
            let mut prefs = proposer_ids.clone();
            prefs.shuffle(&mut rng);
            Agent::new(id, format!("r{id}"), prefs)
        })
        .collect();

    (proposers, receivers)
}

/// All permutations of `0..n` (n is small).
fn permutations(n: usize) -> Vec<Vec<usize>> {
    fn extend(prefix: &mut Vec<usize>, used: &mut [bool], out: &mut Vec<Vec<usize>>) {
        if prefix.len() == used.len() {
            out.push(prefix.clone());
            return;
        }
        for i in 0..used.len() {
            if !used[i] {
                used[i] = true;
                prefix.push(i);
                extend(prefix, used, out);
                prefix.pop();
                used[i] = false;
            }
        }
    }

    let mut out = Vec::new();
    extend(&mut Vec::with_capacity(n), &mut vec![false; n], &mut out);
    out
}

/// Every stable perfect matching, as `assignment[proposer] = receiver`.
fn all_stable_matchings(roster: &Roster) -> Vec<Vec<usize>> {
    permutations(roster.size())
        .into_iter()
        .filter(|assignment| {
            let mut state = MatchState::new(roster.size());
            for (p, &r) in assignment.iter().enumerate() {
                state.set_match(p, r);
            }
            find_blocking_pairs(roster, &state).is_empty()
        })
        .collect()
}

fn step_checked<S: stable_match::EventSink>(engine: &mut Engine<S>) -> StepOutcome {
    let outcome = engine.step();
    assert!(engine.state().is_symmetric(), "symmetry broken after {outcome:?}");
    outcome
}

// ============================================================================
// CONCRETE SCENARIOS
// ============================================================================

#[test]
fn forced_crossing_has_one_blocking_pair() {
    let (proposers, receivers) = shared_tastes();
    let mut engine = Engine::initialize(proposers, receivers).unwrap();

    engine.force_match(AgentId(A), AgentId(Y)).unwrap();
    engine.force_match(AgentId(B), AgentId(X)).unwrap();

    assert_eq!(
        engine.check_stability(),
        vec![BlockingPair::new(AgentId(A), AgentId(X))]
    );
}

#[test]
fn deferred_acceptance_concrete_run() {
    let (proposers, receivers) = shared_tastes();
    let mut engine = Engine::with_sink(RecordingSink::new(), proposers, receivers).unwrap();

    let termination = engine.run();

    assert!(termination.stable);
    assert!(termination.blocking_pairs.is_empty());
    assert_eq!(
        engine.matches(),
        vec![(AgentId(A), AgentId(X)), (AgentId(B), AgentId(Y))]
    );

    let resolutions: Vec<&MatchEvent> = engine
        .sink()
        .events()
        .iter()
        .filter(|event| event.is_resolution())
        .collect();
    assert_eq!(
        resolutions,
        vec![
            &MatchEvent::Accepted { proposer: AgentId(A), receiver: AgentId(X), displaced: None },
            &MatchEvent::Rejected { proposer: AgentId(B), receiver: AgentId(X) },
            &MatchEvent::Accepted { proposer: AgentId(B), receiver: AgentId(Y), displaced: None },
        ]
    );

    assert_eq!(
        engine.sink().events().last(),
        Some(&MatchEvent::Finished { stable: true, blocking_pairs: vec![] })
    );
}

#[test]
fn terminal_step_returns_identical_outcome() {
    let (proposers, receivers) = shared_tastes();
    let mut engine = Engine::initialize(proposers, receivers).unwrap();

    let first = loop {
        let outcome = engine.step();
        if outcome.is_terminal() {
            break outcome;
        }
    };

    for _ in 0..10 {
        assert_eq!(engine.step(), first);
    }
}

#[test]
fn setup_errors() {
    let err = Engine::initialize(
        vec![Agent::new(A, "A", [X])],
        vec![Agent::new(X, "X", [A]), Agent::new(Y, "Y", [A])],
    )
    .unwrap_err();
    assert_eq!(err, MatchError::SizeMismatch { proposers: 1, receivers: 2 });

    let err = Engine::initialize(
        vec![Agent::new(A, "A", [X, Y]), Agent::new(A, "A2", [X, Y])],
        vec![Agent::new(X, "X", [A]), Agent::new(Y, "Y", [A])],
    )
    .unwrap_err();
    assert!(matches!(err, MatchError::DuplicateId { side: Side::Proposer, .. }));

    let err = Engine::initialize(
        vec![Agent::new(A, "A", [X, Y]), Agent::new(B, "B", [X])],
        vec![Agent::new(X, "X", [A, B]), Agent::new(Y, "Y", [A, B])],
    )
    .unwrap_err();
    assert!(matches!(err, MatchError::IncompletePreference { side: Side::Proposer, .. }));
}

#[test]
fn registry_populated_in_any_order() {
    let mut registry = AgentRegistry::new();
    registry.register(Side::Receiver, AgentId(Y), vec![AgentId(A), AgentId(B)]).unwrap();
    registry.register(Side::Proposer, AgentId(B), vec![AgentId(X), AgentId(Y)]).unwrap();
    registry.register(Side::Receiver, AgentId(X), vec![AgentId(A), AgentId(B)]).unwrap();
    registry.register(Side::Proposer, AgentId(A), vec![AgentId(X), AgentId(Y)]).unwrap();

    let mut engine = Engine::from_registry(registry, EngineConfig::default(), NullSink).unwrap();
    assert!(engine.run().stable);
    // Registry order puts B first
    assert_eq!(
        engine.matches(),
        vec![(AgentId(B), AgentId(Y)), (AgentId(A), AgentId(X))]
    );
}

// ============================================================================
// PROPERTIES
// ============================================================================

#[test]
fn symmetry_holds_through_steps_and_overrides() {
    let (proposers, receivers) = random_instance(6, 7);
    let mut engine = Engine::initialize(proposers, receivers).unwrap();

    for _ in 0..10 {
        step_checked(&mut engine);
    }
    engine.force_match(AgentId(1), AgentId(106)).unwrap();
    assert!(engine.state().is_symmetric());
    engine.clear_match(Side::Receiver, AgentId(103)).unwrap();
    assert!(engine.state().is_symmetric());

    while !step_checked(&mut engine).is_terminal() {}
}

#[test]
fn termination_within_n_squared_resolutions() {
    for seed in 0..20 {
        let n = 2 + (seed as usize % 7);
        let (proposers, receivers) = random_instance(n, seed);
        let mut engine = Engine::with_sink(RecordingSink::new(), proposers, receivers).unwrap();

        let termination = engine.run();
        let resolutions = engine.sink().events().iter().filter(|e| e.is_resolution()).count();

        assert!(resolutions <= n * n, "seed {seed}: {resolutions} > {}", n * n);
        assert!(termination.stable, "seed {seed}");
        assert!(engine.is_complete(), "seed {seed}");
        assert!(engine.check_stability().is_empty(), "seed {seed}");
    }
}

#[test]
fn rejection_is_never_resolved_twice() {
    let (proposers, receivers) = random_instance(8, 99);
    let mut engine = Engine::with_sink(RecordingSink::new(), proposers, receivers).unwrap();
    engine.run();

    let mut seen = std::collections::HashSet::new();
    for event in engine.sink().events() {
        match event {
            MatchEvent::Accepted { proposer, receiver, .. }
            | MatchEvent::Rejected { proposer, receiver } => {
                assert!(seen.insert((*proposer, *receiver)), "{proposer} -> {receiver} twice");
            }
            _ => {}
        }
    }
}

#[test]
fn proposer_optimal_against_every_stable_matching() {
    for seed in 0..30 {
        let n = 2 + (seed as usize % 4);
        let (proposers, receivers) = random_instance(n, 1_000 + seed);
        let mut engine = Engine::initialize(proposers, receivers).unwrap();
        engine.run();

        let roster = engine.roster();
        let stable = all_stable_matchings(roster);
        assert!(!stable.is_empty(), "seed {seed}: no stable matching");

        for p in 0..n {
            let ours = engine.state().partner_rank(roster, Side::Proposer, p);
            for assignment in &stable {
                let theirs = roster.rank_at(Side::Proposer, p, Some(assignment[p]));
                assert!(ours <= theirs, "seed {seed}: proposer {p} does better elsewhere");
            }
        }
    }
}

#[test]
fn selection_policy_does_not_change_result() {
    for seed in 0..15 {
        let (proposers, receivers) = random_instance(7, 500 + seed);

        let mut round_robin = Engine::initialize(proposers.clone(), receivers.clone()).unwrap();
        let config = EngineConfig::new().with_selection(SelectionPolicy::FirstFree);
        let mut first_free = Engine::with_config(config, NullSink, proposers, receivers).unwrap();

        round_robin.run();
        first_free.run();

        assert_eq!(round_robin.matches(), first_free.matches(), "seed {seed}");
        assert_eq!(
            round_robin.receipt().state_root,
            first_free.receipt().state_root,
            "seed {seed}"
        );
    }
}

#[test]
fn stability_checker_on_arbitrary_states() {
    let (proposers, receivers) = random_instance(4, 42);
    let roster = Roster::new(proposers, receivers).unwrap();

    // Reference: pair blocks iff both strictly prefer each other to partners
    for assignment in permutations(4) {
        let mut state = MatchState::new(4);
        for (p, &r) in assignment.iter().enumerate().take(3) {
            state.set_match(p, r);
        }

        let mut expected = Vec::new();
        for p in 0..4 {
            for &r in roster.preferences_at(Side::Proposer, p) {
                let p_wants = roster.rank_at(Side::Proposer, p, Some(r))
                    < state.partner_rank(&roster, Side::Proposer, p);
                let r_wants = roster.rank_at(Side::Receiver, r, Some(p))
                    < state.partner_rank(&roster, Side::Receiver, r);
                if p_wants && r_wants {
                    expected.push(BlockingPair::new(
                        roster.id_at(Side::Proposer, p),
                        roster.id_at(Side::Receiver, r),
                    ));
                }
            }
        }

        assert_eq!(find_blocking_pairs(&roster, &state), expected);
    }
}

#[test]
fn channel_sink_observes_every_step() {
    let (proposers, receivers) = shared_tastes();
    let (tx, rx) = std::sync::mpsc::channel::<MatchEvent>();
    let mut engine = Engine::with_sink(tx, proposers, receivers).unwrap();

    let mut steps = 0;
    while !engine.step().is_terminal() {
        steps += 1;
    }
    drop(engine);

    let events: Vec<MatchEvent> = rx.iter().collect();
    // One event per non-terminal step plus Finished
    assert_eq!(events.len(), steps + 1);
    assert!(matches!(events.last(), Some(MatchEvent::Finished { stable: true, .. })));
}
