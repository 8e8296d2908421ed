mod support;

use std::time::Duration;

use pinch_puzzle_core::{
    Command, Event, GameState, GrabRejection, Modality, Position, Resource, TileId,
};
use pinch_puzzle_world::{query, World, DEFAULT_PREVIEW_DELAY};

use support::{
    centre_of, drag_tile_to, ready_world, run, scattered_world, snapshot, start, tick,
};

fn topmost(world: &World) -> TileId {
    query::tiles(world)
        .iter()
        .max_by_key(|tile| tile.z)
        .map(|tile| tile.id)
        .expect("session has tiles")
}

#[test]
fn tiles_start_solved_and_scatter_after_preview() {
    let mut world = ready_world();
    let events = start(&mut world, 4, 9);
    assert!(matches!(events.as_slice(), [Event::GameStarted { .. }]));
    assert!(query::is_previewing(&world));

    let grid = *query::grid(&world).expect("session running");
    for tile in query::tiles(&world).iter() {
        assert_eq!(tile.position, grid.position_of(tile.correct));
    }

    let events = tick(&mut world, 4_900);
    assert!(!events.contains(&Event::TilesScattered));
    let events = tick(&mut world, 100);
    assert!(events.contains(&Event::TilesScattered));
    assert!(!query::is_previewing(&world));

    let extent = grid.scatter_extent();
    for tile in query::tiles(&world).iter() {
        assert!((0.0..=extent).contains(&tile.position.x));
        assert!((0.0..=extent).contains(&tile.position.y));
    }
}

#[test]
fn grabs_are_refused_during_preview() {
    let mut world = ready_world();
    let _ = start(&mut world, 3, 1);
    let at = centre_of(&world, TileId::new(0));

    let events = run(
        &mut world,
        Command::Grab {
            modality: Modality::Pointer,
            at,
        },
    );

    assert_eq!(
        events,
        vec![Event::GrabIgnored {
            modality: Modality::Pointer,
            reason: GrabRejection::Previewing,
        }]
    );
}

#[test]
fn quick_restart_discards_the_stale_scatter() {
    let mut world = ready_world();
    let _ = start(&mut world, 3, 1);
    let _ = tick(&mut world, 3_000);
    let _ = start(&mut world, 4, 2);

    let events = tick(&mut world, 3_000);
    assert!(!events.contains(&Event::TilesScattered));
    assert!(query::is_previewing(&world));
    assert_eq!(query::elapsed(&world), Duration::from_secs(3));

    let events = tick(&mut world, 2_000);
    assert!(events.contains(&Event::TilesScattered));
    assert_eq!(query::tiles(&world).len(), 16);
}

#[test]
fn restart_resets_counters() {
    let mut world = scattered_world(3, 4);
    let tile = topmost(&world);
    let _ = drag_tile_to(&mut world, tile, Position::new(-900.0, 0.0), Modality::Pointer);
    assert_eq!(query::moves(&world), 1);

    let _ = start(&mut world, 5, 4);

    assert_eq!(query::moves(&world), 0);
    assert_eq!(query::elapsed(&world), Duration::ZERO);
    assert_eq!(query::game_state(&world), GameState::Playing);
    assert!(query::tiles(&world).iter().all(|tile| !tile.locked));
}

#[test]
fn paused_time_is_not_counted() {
    let mut world = scattered_world(3, 6);
    let base = query::elapsed(&world);

    let _ = tick(&mut world, 1_000);
    let events = run(&mut world, Command::SetPaused { paused: true });
    assert_eq!(events, vec![Event::PauseChanged { paused: true }]);
    assert!(tick(&mut world, 10_000).is_empty());
    let _ = run(&mut world, Command::SetPaused { paused: false });
    let _ = tick(&mut world, 1_000);

    assert_eq!(query::elapsed(&world), base + Duration::from_secs(2));
}

#[test]
fn grab_while_paused_leaves_tiles_untouched() {
    let mut world = scattered_world(3, 12);
    let tile = topmost(&world);
    let at = centre_of(&world, tile);
    let before = snapshot(&world, tile);
    let _ = run(&mut world, Command::SetPaused { paused: true });

    let mut events = run(
        &mut world,
        Command::Grab {
            modality: Modality::Pointer,
            at,
        },
    );
    events.extend(run(
        &mut world,
        Command::Drag {
            modality: Modality::Pointer,
            to: at + Position::new(40.0, 40.0),
        },
    ));
    events.extend(run(
        &mut world,
        Command::Release {
            modality: Modality::Pointer,
        },
    ));

    assert_eq!(
        events,
        vec![Event::GrabIgnored {
            modality: Modality::Pointer,
            reason: GrabRejection::Paused,
        }]
    );
    assert_eq!(snapshot(&world, tile), before);
    assert_eq!(query::moves(&world), 0);
}

#[test]
fn pausing_force_releases_the_held_tile() {
    let mut world = scattered_world(3, 13);
    let tile = topmost(&world);
    let at = centre_of(&world, tile);
    let _ = run(
        &mut world,
        Command::Grab {
            modality: Modality::Pointer,
            at,
        },
    );

    let events = run(&mut world, Command::SetPaused { paused: true });

    assert!(query::active_grab(&world).is_none());
    assert_eq!(query::moves(&world), 1);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::TileReleased { tile: released, .. } if *released == tile)));
    assert_eq!(events.last(), Some(&Event::PauseChanged { paused: true }));
    assert_eq!(query::game_state(&world), GameState::Paused);
}

#[test]
fn second_modality_is_refused_while_a_tile_is_held() {
    let mut world = scattered_world(3, 14);
    let tile = topmost(&world);
    let at = centre_of(&world, tile);
    let _ = run(
        &mut world,
        Command::Grab {
            modality: Modality::Pointer,
            at,
        },
    );

    let events = run(
        &mut world,
        Command::Grab {
            modality: Modality::Camera,
            at,
        },
    );

    assert_eq!(
        events,
        vec![Event::GrabIgnored {
            modality: Modality::Camera,
            reason: GrabRejection::Busy {
                holder: Modality::Pointer,
            },
        }]
    );
    assert_eq!(
        query::active_grab(&world).map(|grab| grab.modality()),
        Some(Modality::Pointer)
    );
}

#[test]
fn grabbing_empty_space_picks_nothing() {
    let mut world = scattered_world(3, 15);

    let events = run(
        &mut world,
        Command::Grab {
            modality: Modality::Pointer,
            at: Position::new(-50.0, -50.0),
        },
    );

    assert_eq!(
        events,
        vec![Event::GrabIgnored {
            modality: Modality::Pointer,
            reason: GrabRejection::NoTile,
        }]
    );
}

#[test]
fn grabbed_tile_rises_above_every_other_tile() {
    let mut world = scattered_world(4, 16);
    let lowest = query::tiles(&world)
        .iter()
        .min_by_key(|tile| tile.z)
        .map(|tile| tile.id)
        .expect("session has tiles");
    support::expose(&mut world, lowest);
    let at = centre_of(&world, lowest);

    let _ = run(
        &mut world,
        Command::Grab {
            modality: Modality::Camera,
            at,
        },
    );

    assert_eq!(topmost(&world), lowest);
}

#[test]
fn image_failure_blocks_starting_a_game() {
    let mut world = ready_world();
    let _ = run(
        &mut world,
        Command::ReportResourceFailure {
            resource: Resource::Image,
            reason: "decode error".to_owned(),
        },
    );

    let events = start(&mut world, 3, 1);

    assert!(matches!(events.as_slice(), [Event::StartRejected { .. }]));
    assert_eq!(query::game_state(&world), GameState::Failed(Resource::Image));
}

#[test]
fn preview_delay_is_configurable() {
    let mut world = ready_world();
    let _ = run(
        &mut world,
        Command::ConfigurePreview {
            delay: Duration::from_millis(500),
        },
    );
    let _ = start(&mut world, 3, 1);

    let events = tick(&mut world, 500);

    assert!(events.contains(&Event::TilesScattered));
    assert!(DEFAULT_PREVIEW_DELAY > Duration::from_millis(500));
}

#[test]
fn pausing_the_final_drop_leaves_the_puzzle_completed() {
    let mut world = scattered_world(1, 3);
    let tile = TileId::new(0);
    let at = centre_of(&world, tile);
    let _ = run(
        &mut world,
        Command::Grab {
            modality: Modality::Pointer,
            at,
        },
    );

    let events = run(&mut world, Command::SetPaused { paused: true });

    assert_eq!(query::game_state(&world), GameState::Completed);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::PuzzleCompleted { moves: 1, .. })));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::PauseChanged { .. })));
    assert!(query::active_grab(&world).is_none());
    assert!(snapshot(&world, tile).locked);
}

#[test]
fn completed_puzzle_stays_completed_until_restarted() {
    let mut world = scattered_world(1, 8);
    let _ = drag_tile_to(&mut world, TileId::new(0), Position::ZERO, Modality::Camera);
    assert_eq!(query::game_state(&world), GameState::Completed);
    let elapsed = query::elapsed(&world);
    let at = centre_of(&world, TileId::new(0));

    for command in [
        Command::SetPaused { paused: true },
        Command::SetPaused { paused: false },
        Command::Grab {
            modality: Modality::Pointer,
            at,
        },
        Command::Release {
            modality: Modality::Pointer,
        },
        Command::Tick {
            dt: Duration::from_secs(1),
        },
    ] {
        let events = run(&mut world, command);

        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::PauseChanged { .. })));
        assert!(events.iter().all(|event| matches!(
            event,
            Event::GrabIgnored {
                reason: GrabRejection::NotPlaying,
                ..
            }
        )));
        assert_eq!(query::game_state(&world), GameState::Completed);
    }
    assert_eq!(query::moves(&world), 1);
    assert_eq!(query::elapsed(&world), elapsed);

    let _ = start(&mut world, 1, 9);
    assert_eq!(query::game_state(&world), GameState::Playing);
}
