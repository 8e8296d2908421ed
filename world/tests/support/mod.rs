#![allow(dead_code)]

use std::time::Duration;

use pinch_puzzle_core::{Command, Event, GridSize, Modality, Position, TileId, TileSnapshot, Viewport};
use pinch_puzzle_world::{self as world, query, World, DEFAULT_PREVIEW_DELAY};

pub fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

pub fn ready_world() -> World {
    let mut world = World::new();
    let _ = run(
        &mut world,
        Command::ConfigureViewport {
            viewport: Viewport::new(1200.0, 1000.0).expect("valid viewport"),
        },
    );
    let _ = run(
        &mut world,
        Command::ImageLoaded {
            width: 600,
            height: 600,
        },
    );
    world
}

pub fn start(world: &mut World, size: u32, seed: u64) -> Vec<Event> {
    run(
        world,
        Command::StartGame {
            size: GridSize::new(size).expect("valid size"),
            seed,
        },
    )
}

/// Starts a game and waits out the preview so tiles are scattered.
pub fn scattered_world(size: u32, seed: u64) -> World {
    let mut world = ready_world();
    let _ = start(&mut world, size, seed);
    let _ = run(
        &mut world,
        Command::Tick {
            dt: DEFAULT_PREVIEW_DELAY,
        },
    );
    assert!(!query::is_previewing(&world));
    world
}

pub fn tick(world: &mut World, millis: u64) -> Vec<Event> {
    run(
        world,
        Command::Tick {
            dt: Duration::from_millis(millis),
        },
    )
}

pub fn snapshot(world: &World, id: TileId) -> TileSnapshot {
    query::tile(world, id).expect("tile exists")
}

/// Viewport point at the centre of a tile.
pub fn centre_of(world: &World, id: TileId) -> Position {
    let grid = query::grid(world).expect("session running");
    let half = grid.tile_length() * 0.5;
    grid.to_viewport(snapshot(world, id).position) + Position::new(half, half)
}

/// Grabs a tile at its centre and drags it so its corner lands on `corner`.
///
/// Returns the events of the grab, drag and release.
pub fn drag_tile_to(world: &mut World, id: TileId, corner: Position, modality: Modality) -> Vec<Event> {
    let at = centre_of(world, id);
    let delta = corner - snapshot(world, id).position;
    let mut events = run(world, Command::Grab { modality, at });
    events.extend(run(
        world,
        Command::Drag {
            modality,
            to: at + delta,
        },
    ));
    events.extend(run(world, Command::Release { modality }));
    events
}

/// Drags a tile far off the board into a slot reserved for its id.
pub fn park(world: &mut World, id: TileId) {
    let board = query::grid(world).expect("session running").board_size();
    let slot = id.get() as f32 + 1.0;
    let _ = drag_tile_to(
        world,
        id,
        Position::new(-3.0 * board * slot, -3.0 * board),
        Modality::Pointer,
    );
}

/// Reports whether the tile still rests somewhere near the board.
pub fn on_board(world: &World, id: TileId) -> bool {
    let board = query::grid(world).expect("session running").board_size();
    snapshot(world, id).position.x > -board
}

/// Parks every unlocked tile stacked above `id` so `id` becomes the topmost
/// tile on the board.
pub fn expose(world: &mut World, id: TileId) {
    let target_z = snapshot(world, id).z;
    loop {
        let covering = query::tiles(world)
            .iter()
            .filter(|tile| !tile.locked && tile.id != id && tile.z > target_z)
            .filter(|tile| on_board(world, tile.id))
            .max_by_key(|tile| tile.z)
            .map(|tile| tile.id);
        let Some(covering) = covering else {
            break;
        };
        park(world, covering);
    }
}

/// Locked tiles sit at z 0 and unlocked tiles form the compact range `1..=k`.
pub fn assert_stacking_is_compact(world: &World) {
    let tiles = query::tiles(world);
    let mut unlocked: Vec<u32> = tiles
        .iter()
        .filter(|tile| !tile.locked)
        .map(|tile| tile.z)
        .collect();
    unlocked.sort_unstable();
    let expected: Vec<u32> = (1..=unlocked.len() as u32).collect();
    assert_eq!(unlocked, expected, "unlocked tiles must stack as 1..=k");
    assert!(
        tiles.iter().filter(|tile| tile.locked).all(|tile| tile.z == 0),
        "locked tiles must sit at z 0"
    );
}
