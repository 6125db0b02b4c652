// Lucky-draw selection: availability filtering, uniform random picks, and
// winner history.
//
// The random source is injected as `&mut impl Rng` so tests can seed a
// `SmallRng` for deterministic results while the app passes `thread_rng()`.

use rand::Rng;
use thiserror::Error;

use crate::roster::Roster;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum winner-history length when repeat winners are allowed. With
/// repeats disallowed the history is bounded by the roster size instead and
/// is never truncated.
pub const WINNER_HISTORY_CAP: usize = 10;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawError {
    #[error("no eligible names left to draw from")]
    EmptyPool,
}

// ---------------------------------------------------------------------------
// Draw state
// ---------------------------------------------------------------------------

/// Phase of the draw workflow.
///
/// `Settled` implicitly permits a new draw start; `clear_history` returns to
/// `Idle` from any phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawPhase {
    Idle,
    Rolling,
    Settled,
}

/// Winner history and draw settings. Reads the roster, never mutates it.
#[derive(Debug, Clone)]
pub struct DrawState {
    /// Past winners, most recent first.
    pub winners: Vec<String>,
    /// When true, won names stay eligible and the history is capped at
    /// `WINNER_HISTORY_CAP` entries.
    pub allow_repeat: bool,
    /// The last committed winner, if any.
    pub last_result: Option<String>,
    pub phase: DrawPhase,
}

impl DrawState {
    pub fn new(allow_repeat: bool) -> Self {
        DrawState {
            winners: Vec::new(),
            allow_repeat,
            last_result: None,
            phase: DrawPhase::Idle,
        }
    }

    /// Names currently eligible to win.
    ///
    /// The full roster when repeats are allowed; otherwise the roster minus
    /// every name already in the history. Exclusion is by name value, so when
    /// the roster holds duplicate copies of a won name, all copies drop out.
    pub fn available_names(&self, roster: &Roster) -> Vec<String> {
        if self.allow_repeat {
            roster.names().to_vec()
        } else {
            roster
                .names()
                .iter()
                .filter(|name| !self.winners.contains(name))
                .cloned()
                .collect()
        }
    }

    /// Enter the `Rolling` phase. The caller guards the preconditions: a
    /// non-empty available pool and no roll already in flight.
    pub fn begin_roll(&mut self) {
        self.phase = DrawPhase::Rolling;
    }

    /// Commit a winner: prepend to the history, set the last result, and
    /// settle the phase. The history is truncated to `WINNER_HISTORY_CAP`
    /// only when repeats are allowed.
    pub fn record_winner(&mut self, winner: String) {
        self.winners.insert(0, winner.clone());
        if self.allow_repeat {
            self.winners.truncate(WINNER_HISTORY_CAP);
        }
        self.last_result = Some(winner);
        self.phase = DrawPhase::Settled;
    }

    /// Reset the history and the displayed result. Valid from any phase.
    pub fn clear_history(&mut self) {
        self.winners.clear();
        self.last_result = None;
        self.phase = DrawPhase::Idle;
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Pick one name uniformly at random from `pool` as it exists at the moment
/// of the call. Fails with `EmptyPool` when there is nothing to pick from.
pub fn draw(pool: &[String], rng: &mut impl Rng) -> Result<String, DrawError> {
    if pool.is_empty() {
        return Err(DrawError::EmptyPool);
    }
    let index = rng.gen_range(0..pool.len());
    Ok(pool[index].clone())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
