// Application state and orchestration logic.
//
// The central event loop that coordinates console commands and rolling-draw
// events. Maintains the complete application state (roster, draw history,
// last grouping) and pushes notices to the console render loop.

use std::path::PathBuf;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::draw::{self, DrawPhase, DrawState};
use crate::export;
use crate::group::{self, Group};
use crate::roster::{Participant, Roster};

// ---------------------------------------------------------------------------
// Message types
// ---------------------------------------------------------------------------

/// A parsed console command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Replace the roster from pasted text.
    ReplaceNames { raw: String },
    /// Replace the roster from a file on disk.
    LoadFile { path: String },
    /// Load the built-in sample roster.
    LoadSample,
    /// List the roster with duplicate annotations.
    List,
    /// Drop duplicate names, keeping first occurrences.
    Dedupe,
    /// Toggle whether winners stay eligible.
    SetRepeat { allow: bool },
    /// Run the draw workflow.
    Draw,
    /// Show the winner history.
    ShowWinners,
    /// Clear the winner history (aborts a roll in flight).
    ClearHistory,
    /// Partition the roster into groups; `None` uses the configured size.
    Form { size: Option<usize> },
    /// Export the last grouping result to CSV.
    Export,
    Help,
    Quit,
}

/// An update pushed from the app loop to the console.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    RosterUpdated { count: usize, duplicates: usize },
    RosterListing { participants: Vec<Participant> },
    LoadFailed { path: String, message: String },
    RollTick { name: String },
    WinnerSettled { name: String, remaining: usize },
    PoolExhausted,
    RollInProgress,
    WinnerHistory { winners: Vec<String> },
    HistoryCleared,
    RepeatMode { allow: bool },
    GroupsFormed { groups: Vec<Group> },
    GroupingFailed { message: String },
    Exported { path: PathBuf, rows: usize },
    ExportFailed { message: String },
    NothingToExport,
    Help,
}

/// An event from the spawned rolling-draw task.
///
/// Every event carries the generation counter of the task that produced it;
/// events from superseded tasks are discarded.
#[derive(Debug, Clone)]
pub enum RollEvent {
    /// An intermediate pick, shown but never recorded.
    Pick { name: String, generation: u64 },
    /// The final pick, committed as the winner.
    Finished { winner: String, generation: u64 },
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The complete application state.
pub struct AppState {
    pub config: Config,
    pub roster: Roster,
    pub draw_state: DrawState,
    /// The most recent grouping result, kept for export.
    pub groups: Vec<Group>,
    pub current_roll_task: Option<tokio::task::JoinHandle<()>>,
    /// Monotonically increasing counter identifying the current roll task.
    /// Incremented each time a new task is spawned (and on cancellation).
    /// Events from stale generations are discarded in `handle_roll_event`.
    pub roll_generation: u64,
    /// Sender for roll events; spawned tasks use a clone of this sender to
    /// stream picks back to the main event loop.
    pub roll_tx: mpsc::Sender<RollEvent>,
}

impl AppState {
    pub fn new(config: Config, roll_tx: mpsc::Sender<RollEvent>) -> Self {
        let draw_state = DrawState::new(config.draw.allow_repeat);
        AppState {
            config,
            roster: Roster::new(),
            draw_state,
            groups: Vec::new(),
            current_roll_task: None,
            roll_generation: 0,
            roll_tx,
        }
    }

    /// Cancel the current roll task if one is running. Bumps the generation
    /// so any in-flight events from the aborted task are discarded, and
    /// releases the task's timer via `abort`.
    pub fn cancel_roll_task(&mut self) {
        if let Some(handle) = self.current_roll_task.take() {
            handle.abort();
            self.roll_generation += 1;
            info!("Cancelled previous roll task (gen now {})", self.roll_generation);
        }
    }

    /// Commit a winner and report it, with the post-draw eligible count.
    async fn settle_winner(&mut self, winner: String, out_tx: &mpsc::Sender<Notice>) {
        self.draw_state.record_winner(winner.clone());
        let remaining = self.draw_state.available_names(&self.roster).len();
        info!("Winner settled: {} ({} still eligible)", winner, remaining);
        let _ = out_tx
            .send(Notice::WinnerSettled {
                name: winner,
                remaining,
            })
            .await;
    }

    /// Notify the console that the roster changed, with fresh counts.
    async fn report_roster(&self, out_tx: &mpsc::Sender<Notice>) {
        let duplicates = self
            .roster
            .participants()
            .iter()
            .filter(|p| p.is_duplicate)
            .count();
        let _ = out_tx
            .send(Notice::RosterUpdated {
                count: self.roster.len(),
                duplicates,
            })
            .await;
    }
}

// ---------------------------------------------------------------------------
// Draw workflow
// ---------------------------------------------------------------------------

/// Start the draw workflow.
///
/// Refused while a roll is in flight (one rolling sequence at a time) or
/// when no names are eligible. With animation enabled, snapshots the
/// available pool and spawns a bounded-tick task that emits intermediate
/// picks and commits the final tick's pick; otherwise the draw commits
/// synchronously. Either path commits exactly one winner.
async fn start_draw(state: &mut AppState, out_tx: &mpsc::Sender<Notice>) {
    if state.draw_state.phase == DrawPhase::Rolling {
        debug!("Draw refused: roll already in flight");
        let _ = out_tx.send(Notice::RollInProgress).await;
        return;
    }

    let pool = state.draw_state.available_names(&state.roster);
    if pool.is_empty() {
        info!("Draw refused: no eligible names");
        let _ = out_tx.send(Notice::PoolExhausted).await;
        return;
    }

    state.cancel_roll_task();
    state.roll_generation += 1;
    let generation = state.roll_generation;

    if !state.config.animation.enabled {
        // Synchronous path: one authoritative pick, no rolling effect.
        // ThreadRng is !Send, so keep it out of scope before the awaits below.
        let result = {
            let mut rng = rand::thread_rng();
            draw::draw(&pool, &mut rng)
        };
        match result {
            Ok(winner) => state.settle_winner(winner, out_tx).await,
            Err(e) => {
                // Unreachable given the emptiness guard above.
                warn!("Draw failed: {}", e);
                let _ = out_tx.send(Notice::PoolExhausted).await;
            }
        }
        return;
    }

    state.draw_state.begin_roll();

    let ticks = state.config.animation.ticks;
    let interval = Duration::from_millis(state.config.animation.interval_ms);
    let tx = state.roll_tx.clone();

    info!(
        "Roll started: {} eligible, {} ticks at {:?} (gen: {})",
        pool.len(),
        ticks,
        interval,
        generation
    );

    let handle = tokio::spawn(async move {
        let mut rng = SmallRng::from_entropy();
        let mut timer = tokio::time::interval(interval);
        // The first tick completes immediately; consume it so the first
        // pick lands after one full interval.
        timer.tick().await;

        let mut final_pick = None;
        for _ in 0..ticks {
            timer.tick().await;
            let index = rng.gen_range(0..pool.len());
            let name = pool[index].clone();
            let _ = tx
                .send(RollEvent::Pick {
                    name: name.clone(),
                    generation,
                })
                .await;
            final_pick = Some(name);
        }

        // The final tick's pick is the winner; no extra selection step.
        if let Some(winner) = final_pick {
            let _ = tx.send(RollEvent::Finished { winner, generation }).await;
        }
    });

    state.current_roll_task = Some(handle);
}

/// Handle an event from the rolling-draw task.
///
/// **Generation check**: every event carries the generation counter set when
/// its task was spawned. If it doesn't match `state.roll_generation`, it is a
/// stale event from a cancelled task and is silently discarded. This prevents
/// a superseded roll from committing a winner.
async fn handle_roll_event(state: &mut AppState, event: RollEvent, out_tx: &mpsc::Sender<Notice>) {
    let event_generation = match &event {
        RollEvent::Pick { generation, .. } => *generation,
        RollEvent::Finished { generation, .. } => *generation,
    };

    if event_generation != state.roll_generation {
        debug!(
            "Discarding stale roll event (event gen: {}, current gen: {})",
            event_generation, state.roll_generation
        );
        return;
    }

    match event {
        RollEvent::Pick { name, .. } => {
            let _ = out_tx.send(Notice::RollTick { name }).await;
        }
        RollEvent::Finished { winner, .. } => {
            // The task ran to completion; drop its finished handle.
            state.current_roll_task = None;
            state.settle_winner(winner, out_tx).await;
        }
    }
}

// ---------------------------------------------------------------------------
// Command handling
// ---------------------------------------------------------------------------

/// Handle a console command. `Quit` is handled by the caller's loop.
async fn handle_command(state: &mut AppState, cmd: Command, out_tx: &mpsc::Sender<Notice>) {
    match cmd {
        Command::ReplaceNames { raw } => {
            state.roster.replace_from_text(&raw);
            info!("Roster replaced from text: {} names", state.roster.len());
            state.report_roster(out_tx).await;
        }
        Command::LoadFile { path } => match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                state.roster.replace_from_file_text(&content);
                info!(
                    "Roster replaced from file {}: {} names",
                    path,
                    state.roster.len()
                );
                state.report_roster(out_tx).await;
            }
            Err(e) => {
                warn!("Failed to read roster file {}: {}", path, e);
                let _ = out_tx
                    .send(Notice::LoadFailed {
                        path,
                        message: e.to_string(),
                    })
                    .await;
            }
        },
        Command::LoadSample => {
            state.roster = Roster::sample();
            info!("Sample roster loaded: {} names", state.roster.len());
            state.report_roster(out_tx).await;
        }
        Command::List => {
            let _ = out_tx
                .send(Notice::RosterListing {
                    participants: state.roster.participants(),
                })
                .await;
        }
        Command::Dedupe => {
            let before = state.roster.len();
            state.roster.dedupe();
            info!("Dedupe removed {} names", before - state.roster.len());
            state.report_roster(out_tx).await;
        }
        Command::SetRepeat { allow } => {
            state.draw_state.allow_repeat = allow;
            info!("Repeat winners {}", if allow { "allowed" } else { "disallowed" });
            let _ = out_tx.send(Notice::RepeatMode { allow }).await;
        }
        Command::Draw => {
            start_draw(state, out_tx).await;
        }
        Command::ShowWinners => {
            let _ = out_tx
                .send(Notice::WinnerHistory {
                    winners: state.draw_state.winners.clone(),
                })
                .await;
        }
        Command::ClearHistory => {
            state.cancel_roll_task();
            state.draw_state.clear_history();
            info!("Winner history cleared");
            let _ = out_tx.send(Notice::HistoryCleared).await;
        }
        Command::Form { size } => {
            let size = size.unwrap_or(state.config.grouping.default_group_size);
            let result = {
                let mut rng = rand::thread_rng();
                group::partition(state.roster.names(), size, &mut rng)
            };
            match result {
                Ok(groups) => {
                    info!(
                        "Formed {} groups of target size {} from {} names",
                        groups.len(),
                        size,
                        state.roster.len()
                    );
                    state.groups = groups.clone();
                    let _ = out_tx.send(Notice::GroupsFormed { groups }).await;
                }
                Err(e) => {
                    info!("Grouping refused: {}", e);
                    let _ = out_tx
                        .send(Notice::GroupingFailed {
                            message: e.to_string(),
                        })
                        .await;
                }
            }
        }
        Command::Export => {
            if state.groups.is_empty() {
                let _ = out_tx.send(Notice::NothingToExport).await;
                return;
            }
            let dir = PathBuf::from(&state.config.export.output_dir);
            match export::write_groups_csv(&dir, &state.groups) {
                Ok(path) => {
                    let rows = state.groups.iter().map(|g| g.members.len()).sum();
                    info!("Exported {} rows to {}", rows, path.display());
                    let _ = out_tx.send(Notice::Exported { path, rows }).await;
                }
                Err(e) => {
                    warn!("Export failed: {}", e);
                    let _ = out_tx
                        .send(Notice::ExportFailed {
                            message: e.to_string(),
                        })
                        .await;
                }
            }
        }
        Command::Help => {
            let _ = out_tx.send(Notice::Help).await;
        }
        Command::Quit => {
            // Handled in the main loop
        }
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Listens on two channels using `tokio::select!`:
/// 1. Parsed commands from the console
/// 2. Events from the rolling-draw task
///
/// Pushes notices through `out_tx` for the console render loop.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<Command>,
    mut roll_rx: mpsc::Receiver<RollEvent>,
    out_tx: mpsc::Sender<Notice>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    // Track whether the roll channel is still open. When it closes we stop
    // polling it so tokio::select! never spins on a closed receiver.
    let mut roll_open = true;

    loop {
        tokio::select! {
            // --- Console commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(Command::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_command(&mut state, cmd, &out_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            // --- Roll events (only poll when channel is open) ---
            event = roll_rx.recv(), if roll_open => {
                match event {
                    Some(event) => {
                        handle_roll_event(&mut state, event, &out_tx).await;
                    }
                    None => {
                        info!("Roll channel closed");
                        roll_open = false;
                    }
                }
            }
        }
    }

    // Cleanup: never leave a roll task able to fire after shutdown.
    state.cancel_roll_task();
    info!("Application event loop exiting");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
