//! Drop resolution: decides whether a released tile locks into place.

use pinch_puzzle_core::{DropOutcome, Event, GameState};
use tracing::{debug, info};

use crate::{Grab, Session};

/// Resolves the release of `grab`, counting the move and locking the tile
/// when it landed in its own cell.
///
/// Completes the session when the drop locked the last loose tile.
pub(crate) fn resolve(
    session: &mut Session,
    state: &mut GameState,
    grab: Grab,
    out_events: &mut Vec<Event>,
) {
    session.moves = session.moves.saturating_add(1);
    out_events.push(Event::MovesChanged {
        moves: session.moves,
    });

    let grid = session.grid;
    let Some(tile) = session.tiles.get_mut(grab.tile()) else {
        return;
    };
    let cell = grid.cell_of(tile.position);
    let outcome = if grid.index_of(cell) == Some(tile.correct()) {
        tile.lock_at(grid.position_of(tile.correct()));
        session.tiles.restack_after_lock(&mut session.z);
        DropOutcome::Locked
    } else {
        DropOutcome::Loose
    };

    debug!(
        tile = grab.tile().get(),
        row = cell.row(),
        column = cell.column(),
        ?outcome,
        moves = session.moves,
        "tile released"
    );
    out_events.push(Event::TileReleased {
        tile: grab.tile(),
        modality: grab.modality(),
        cell,
        outcome,
    });

    if outcome == DropOutcome::Locked && session.tiles.all_locked() {
        *state = GameState::Completed;
        session.scatter.cancel();
        info!(
            moves = session.moves,
            elapsed_ms = session.elapsed.as_millis() as u64,
            "puzzle completed"
        );
        out_events.push(Event::PuzzleCompleted {
            moves: session.moves,
            elapsed: session.elapsed,
        });
    }
}
