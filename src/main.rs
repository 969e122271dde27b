//! Stable Match - demo driver
//!
//! Runs the three-by-three example instance step by step, logging every
//! event, then swaps two partners by hand and reports the blocking pairs
//! the override creates.
//!
//! Set `RUST_LOG=debug` to see each phase.

use stable_match::engine::Engine;
use stable_match::sink::TracingSink;
use stable_match::types::{Agent, AgentId, Side};
use stable_match::{EngineConfig, Result, StepOutcome};
use tracing_subscriber::EnvFilter;

const BOY: u64 = 1;
const WOMAN: u64 = 2;
const GIRL: u64 = 3;

const CAT: u64 = 1;
const DOG: u64 = 2;
const RABBIT: u64 = 3;

fn preview() -> (Vec<Agent>, Vec<Agent>) {
    let humans = vec![
        Agent::new(BOY, "👦", [CAT, DOG, RABBIT]),
        Agent::new(WOMAN, "👩‍💻", [CAT, DOG, RABBIT]),
        Agent::new(GIRL, "👧", [CAT, DOG, RABBIT]),
    ];
    let animals = vec![
        Agent::new(CAT, "🐱", [WOMAN, BOY, GIRL]),
        Agent::new(DOG, "🐶", [WOMAN, BOY, GIRL]),
        Agent::new(RABBIT, "🐰", [WOMAN, BOY, GIRL]),
    ];
    (humans, animals)
}

fn name(engine: &Engine<TracingSink>, side: Side, id: AgentId) -> String {
    engine
        .roster()
        .lookup(side, id)
        .map(|agent| agent.name.clone())
        .unwrap_or_else(|_| id.to_string())
}

fn print_matches(engine: &Engine<TracingSink>) {
    for (proposer, receiver) in engine.matches() {
        println!(
            "  {} <-> {}",
            name(engine, Side::Proposer, proposer),
            name(engine, Side::Receiver, receiver)
        );
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .without_time()
        .init();

    println!("===========================================");
    println!("  Stable Match - deferred acceptance");
    println!("===========================================");
    println!();

    let (humans, animals) = preview();
    let mut engine = Engine::with_config(EngineConfig::default(), TracingSink, humans, animals)?;

    let mut steps = 0;
    let termination = loop {
        steps += 1;
        if let StepOutcome::Terminated(termination) = engine.step() {
            break termination;
        }
    };

    println!("Finished after {} steps (stable: {})", steps, termination.stable);
    print_matches(&engine);
    println!();

    let quality = engine.quality();
    println!("Quality:");
    println!("  Proposer cost:     {:>6}", quality.proposer_cost);
    println!("  Receiver cost:     {:>6}", quality.receiver_cost);
    println!("  Egalitarian cost:  {:>6}", quality.egalitarian_cost());
    if let (Some(p), Some(r)) = (quality.proposer_mean(), quality.receiver_mean()) {
        println!("  Mean positions:    {} / {}", p, r);
    }
    println!();

    let receipt = engine.receipt();
    println!("Receipt:");
    println!("  Proposals:  {}", receipt.proposals);
    println!("  Accepted:   {}", receipt.acceptances);
    println!("  Rejected:   {}", receipt.rejections);
    println!("  State root: {}", receipt.state_root_hex());
    println!();

    // Swap the first two pairs by hand
    let pairs = engine.matches();
    if let &[(p0, r0), (p1, r1), ..] = &pairs[..] {
        engine.force_match(p0, r1)?;
        engine.force_match(p1, r0)?;
        println!("After swapping partners:");
        print_matches(&engine);

        let blocking = engine.check_stability();
        println!("Blocking pairs: {}", blocking.len());
        for pair in blocking {
            println!(
                "  {} <-> {}",
                name(&engine, Side::Proposer, pair.proposer),
                name(&engine, Side::Receiver, pair.receiver)
            );
        }
    }

    Ok(())
}
