//! Step-wise deferred acceptance.
//!
//! ## State Machine
//!
//! Each call to [`Engine::step`] runs exactly one phase and emits exactly
//! one event:
//!
//! | Pending | Phase | Event | Next |
//! |---------|-------|-------|------|
//! | select | pick a free proposer | `Highlighted(SelectProposer)` | candidate |
//! | select | none left | `Finished` | terminated |
//! | candidate | first unproposed receiver | `Highlighted(SelectCandidate)` | resolve |
//! | candidate | list exhausted | `Highlighted(SelectCandidate, None)` | select |
//! | resolve | receiver compares ranks | `Accepted` / `Rejected` | select |
//!
//! Once terminated, `step` keeps returning the same outcome and emits
//! nothing.
//!
//! ## Overrides
//!
//! [`force_match`](Engine::force_match) and
//! [`clear_match`](Engine::clear_match) edit the match state through the
//! same mutators as the accept step. They drop any half-finished phase, so
//! the next `step` starts by selecting a proposer again. Overrides never
//! re-open a terminated run; call [`reset`](Engine::reset) for a new run.

use tracing::{debug, info, warn};

use crate::config::{EngineConfig, SelectionPolicy};
use crate::engine::stability::find_blocking_pairs;
use crate::error::Result;
use crate::registry::{AgentRegistry, Roster};
use crate::sink::{EventSink, NullSink};
use crate::state::MatchState;
use crate::types::{
    Agent, AgentId, BlockingPair, MatchEvent, MatchQuality, Phase, RunReceipt, Side,
};

// ============================================================================
// Outcomes
// ============================================================================

/// Terminal result of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Termination {
    /// True iff there are no blocking pairs
    pub stable: bool,
    /// Blocking pairs at termination, in checker order
    pub blocking_pairs: Vec<BlockingPair>,
}

/// What a single [`Engine::step`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// A free proposer was chosen
    Selected { proposer: AgentId },

    /// The proposer's best not-yet-proposed receiver was chosen
    Targeted { proposer: AgentId, receiver: AgentId },

    /// The proposer has proposed to everyone; it will not be selected again
    Exhausted { proposer: AgentId },

    /// The receiver accepted, releasing `displaced` if it held someone
    Accepted {
        proposer: AgentId,
        receiver: AgentId,
        displaced: Option<AgentId>,
    },

    /// The receiver kept its current partner
    Rejected { proposer: AgentId, receiver: AgentId },

    /// No free proposer remains
    Terminated(Termination),
}

impl StepOutcome {
    /// Check if the run is over
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepOutcome::Terminated(_))
    }
}

/// Partners released by a manual override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Released {
    /// Proposer that lost its receiver
    pub proposer: Option<AgentId>,
    /// Receiver that lost its proposer
    pub receiver: Option<AgentId>,
}

/// Counters for the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunStats {
    pub proposals: u64,
    pub acceptances: u64,
    pub rejections: u64,
    pub overrides: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Select,
    Candidate(usize),
    Resolve(usize, usize),
}

// ============================================================================
// Engine
// ============================================================================

/// Deferred-acceptance engine over a validated roster.
///
/// The engine owns its [`MatchState`]; every mutation takes `&mut self`, so
/// the stepper and the override path can never interleave on one engine.
/// Use [`SharedEngine`](crate::engine::SharedEngine) to drive it from more
/// than one thread.
#[derive(Debug)]
pub struct Engine<S = NullSink> {
    roster: Roster,
    state: MatchState,
    config: EngineConfig,
    sink: S,
    pending: Pending,
    cursor: usize,
    stats: RunStats,
    terminal: Option<Termination>,
}

impl Engine<NullSink> {
    /// Validate both sides and create an engine that emits nowhere
    ///
    /// # Errors
    ///
    /// `SizeMismatch`, `DuplicateId` or `IncompletePreference`
    pub fn initialize(proposers: Vec<Agent>, receivers: Vec<Agent>) -> Result<Self> {
        Self::with_config(EngineConfig::default(), NullSink, proposers, receivers)
    }
}

impl<S: EventSink> Engine<S> {
    /// Validate both sides and create an engine reporting to `sink`
    pub fn with_sink(sink: S, proposers: Vec<Agent>, receivers: Vec<Agent>) -> Result<Self> {
        Self::with_config(EngineConfig::default(), sink, proposers, receivers)
    }

    /// Validate both sides and create an engine with explicit configuration
    pub fn with_config(
        config: EngineConfig,
        sink: S,
        proposers: Vec<Agent>,
        receivers: Vec<Agent>,
    ) -> Result<Self> {
        let roster = Roster::new(proposers, receivers)?;
        Ok(Self::from_roster(roster, config, sink))
    }

    /// Validate a populated registry and create an engine over it
    pub fn from_registry(registry: AgentRegistry, config: EngineConfig, sink: S) -> Result<Self> {
        let roster = Roster::from_registry(registry)?;
        Ok(Self::from_roster(roster, config, sink))
    }

    /// Create an engine over an already validated roster
    pub fn from_roster(roster: Roster, config: EngineConfig, sink: S) -> Self {
        info!(size = roster.size(), selection = ?config.selection, "engine initialized");
        Self {
            state: MatchState::new(roster.size()),
            roster,
            config,
            sink,
            pending: Pending::Select,
            cursor: 0,
            stats: RunStats::default(),
            terminal: None,
        }
    }

    // ========================================================================
    // Stepping
    // ========================================================================

    /// Advance exactly one phase
    ///
    /// After termination this is a no-op that returns the same
    /// [`StepOutcome::Terminated`] value every time.
    pub fn step(&mut self) -> StepOutcome {
        if let Some(termination) = &self.terminal {
            return StepOutcome::Terminated(termination.clone());
        }

        match self.pending {
            Pending::Select => self.select_proposer(),
            Pending::Candidate(proposer) => self.select_candidate(proposer),
            Pending::Resolve(proposer, receiver) => self.resolve(proposer, receiver),
        }
    }

    /// Step until termination
    pub fn run(&mut self) -> Termination {
        loop {
            if let StepOutcome::Terminated(termination) = self.step() {
                return termination;
            }
        }
    }

    fn select_proposer(&mut self) -> StepOutcome {
        let size = self.roster.size();
        let start = match self.config.selection {
            SelectionPolicy::RoundRobin => self.cursor,
            SelectionPolicy::FirstFree => 0,
        };

        let chosen = (0..size)
            .map(|offset| (start + offset) % size)
            .find(|&proposer| self.state.is_eligible(proposer));

        let Some(proposer) = chosen else {
            return self.finish();
        };

        self.cursor = (proposer + 1) % size;
        self.pending = Pending::Candidate(proposer);

        let id = self.roster.id_at(Side::Proposer, proposer);
        debug!(proposer = %id, "selected free proposer");
        self.emit(MatchEvent::Highlighted {
            phase: Phase::SelectProposer,
            proposer: Some(id),
            receiver: None,
        });
        StepOutcome::Selected { proposer: id }
    }

    fn select_candidate(&mut self, proposer: usize) -> StepOutcome {
        let target = self
            .roster
            .preferences_at(Side::Proposer, proposer)
            .iter()
            .copied()
            .find(|&receiver| !self.state.has_proposed(proposer, receiver));

        let proposer_id = self.roster.id_at(Side::Proposer, proposer);

        match target {
            Some(receiver) => {
                self.pending = Pending::Resolve(proposer, receiver);

                let receiver_id = self.roster.id_at(Side::Receiver, receiver);
                debug!(proposer = %proposer_id, receiver = %receiver_id, "selected candidate");
                self.emit(MatchEvent::Highlighted {
                    phase: Phase::SelectCandidate,
                    proposer: Some(proposer_id),
                    receiver: Some(receiver_id),
                });
                StepOutcome::Targeted {
                    proposer: proposer_id,
                    receiver: receiver_id,
                }
            }
            None => {
                self.state.mark_exhausted(proposer);
                self.pending = Pending::Select;

                warn!(proposer = %proposer_id, "proposer exhausted its preference list");
                self.emit(MatchEvent::Highlighted {
                    phase: Phase::SelectCandidate,
                    proposer: Some(proposer_id),
                    receiver: None,
                });
                StepOutcome::Exhausted { proposer: proposer_id }
            }
        }
    }

    fn resolve(&mut self, proposer: usize, receiver: usize) -> StepOutcome {
        self.pending = Pending::Select;
        self.state.record_proposal(proposer, receiver);
        self.stats.proposals += 1;

        let proposer_id = self.roster.id_at(Side::Proposer, proposer);
        let receiver_id = self.roster.id_at(Side::Receiver, receiver);

        // Lower rank = more preferred; an unmatched receiver holds UNRANKED
        let held = self.state.partner_rank(&self.roster, Side::Receiver, receiver);
        let offered = self.roster.rank_at(Side::Receiver, receiver, Some(proposer));

        if offered < held {
            let displaced = self
                .state
                .set_match(proposer, receiver)
                .proposer
                .map(|old| self.roster.id_at(Side::Proposer, old));
            self.stats.acceptances += 1;

            debug!(proposer = %proposer_id, receiver = %receiver_id, ?displaced, "accepted");
            self.emit(MatchEvent::Accepted {
                proposer: proposer_id,
                receiver: receiver_id,
                displaced,
            });
            StepOutcome::Accepted {
                proposer: proposer_id,
                receiver: receiver_id,
                displaced,
            }
        } else {
            self.stats.rejections += 1;

            debug!(proposer = %proposer_id, receiver = %receiver_id, "rejected");
            self.emit(MatchEvent::Rejected {
                proposer: proposer_id,
                receiver: receiver_id,
            });
            StepOutcome::Rejected {
                proposer: proposer_id,
                receiver: receiver_id,
            }
        }
    }

    fn finish(&mut self) -> StepOutcome {
        let blocking_pairs = find_blocking_pairs(&self.roster, &self.state);
        let stable = blocking_pairs.is_empty();

        if stable {
            info!(
                proposals = self.stats.proposals,
                matched = self.state.matched_count(),
                "run finished stable"
            );
        } else {
            warn!(blocking = blocking_pairs.len(), "run finished with blocking pairs");
        }

        self.emit(MatchEvent::Finished {
            stable,
            blocking_pairs: blocking_pairs.clone(),
        });

        let termination = Termination { stable, blocking_pairs };
        self.terminal = Some(termination.clone());
        StepOutcome::Terminated(termination)
    }

    #[inline]
    fn emit(&mut self, event: MatchEvent) {
        self.sink.on_event(&event);
    }

    // ========================================================================
    // Overrides
    // ========================================================================

    /// Pair two agents directly, outside the proposal loop
    ///
    /// Proposal history is left untouched. Stability is not re-checked;
    /// call [`check_stability`](Self::check_stability) when needed.
    ///
    /// # Errors
    ///
    /// [`MatchError::UnknownAgent`](crate::MatchError::UnknownAgent) if
    /// either id is not registered
    pub fn force_match(&mut self, proposer: AgentId, receiver: AgentId) -> Result<Released> {
        let p = self.roster.index_of(Side::Proposer, proposer)?;
        let r = self.roster.index_of(Side::Receiver, receiver)?;

        let displaced = self.state.set_match(p, r);
        self.stats.overrides += 1;
        self.pending = Pending::Select;

        let released = Released {
            proposer: displaced.proposer.map(|i| self.roster.id_at(Side::Proposer, i)),
            receiver: displaced.receiver.map(|i| self.roster.id_at(Side::Receiver, i)),
        };
        info!(%proposer, %receiver, ?released, "forced match");
        Ok(released)
    }

    /// Unmatch an agent directly, outside the proposal loop
    ///
    /// # Returns
    ///
    /// The former partner, if any
    pub fn clear_match(&mut self, side: Side, id: AgentId) -> Result<Option<AgentId>> {
        let index = self.roster.index_of(side, id)?;

        let former = self
            .state
            .clear_match(side, index)
            .map(|partner| self.roster.id_at(side.opposite(), partner));
        self.stats.overrides += 1;
        self.pending = Pending::Select;

        info!(%side, %id, ?former, "cleared match");
        Ok(former)
    }

    /// Discard the match state and start a new run over the same roster
    pub fn reset(&mut self) {
        self.state = MatchState::new(self.roster.size());
        self.pending = Pending::Select;
        self.cursor = 0;
        self.stats = RunStats::default();
        self.terminal = None;
        info!("engine reset");
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Compute the blocking pairs of the current state
    pub fn check_stability(&self) -> Vec<BlockingPair> {
        find_blocking_pairs(&self.roster, &self.state)
    }

    /// Current partner of an agent
    pub fn partner_of(&self, side: Side, id: AgentId) -> Result<Option<AgentId>> {
        let index = self.roster.index_of(side, id)?;
        Ok(self
            .state
            .partner(side, index)
            .map(|partner| self.roster.id_at(side.opposite(), partner)))
    }

    /// Matched `(proposer, receiver)` pairs in proposer registry order
    pub fn matches(&self) -> Vec<(AgentId, AgentId)> {
        self.state.id_pairs(&self.roster)
    }

    /// Check if the run has terminated
    #[inline]
    pub fn is_terminated(&self) -> bool {
        self.terminal.is_some()
    }

    /// Terminal outcome, if the run has terminated
    #[inline]
    pub fn termination(&self) -> Option<&Termination> {
        self.terminal.as_ref()
    }

    /// Check if every agent is matched
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.state.is_complete()
    }

    /// Summarize the current state
    pub fn receipt(&self) -> RunReceipt {
        RunReceipt::new(
            self.stats.proposals,
            self.stats.acceptances,
            self.stats.rejections,
            self.stats.overrides,
            self.check_stability().len() as u64,
            self.state.state_root(&self.roster),
        )
    }

    /// Rank-based quality of the current state
    pub fn quality(&self) -> MatchQuality {
        MatchQuality::measure(&self.roster, &self.state)
    }

    #[inline]
    pub fn stats(&self) -> RunStats {
        self.stats
    }

    #[inline]
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    #[inline]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    #[inline]
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume the engine and return its sink
    pub fn into_sink(self) -> S {
        self.sink
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
