use std::time::Duration;

use pinch_puzzle_core::{
    Command, DropOutcome, Event, GameState, GrabRejection, GridSize, InputAdapter, Modality,
    Position, TileId, Viewport,
};
use pinch_puzzle_system_hand_tracking::{
    HandFrame, HandLandmarks, HandTracking, NormalizedPoint,
};
use pinch_puzzle_world::{self as world, query, World, DEFAULT_PREVIEW_DELAY};

const FRAME: Duration = Duration::from_millis(33);
const WIDTH: f32 = 1000.0;
const HEIGHT: f32 = 1000.0;

/// Hand whose fingertip midpoint sits over the viewport point `at`.
fn hand_over(at: Position, spread: f32) -> HandLandmarks {
    let x = 1.0 - at.x / WIDTH;
    let y = at.y / HEIGHT;
    HandLandmarks::new(
        NormalizedPoint::new(x - spread * 0.5, y),
        NormalizedPoint::new(x + spread * 0.5, y),
    )
}

fn apply_all(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn playing_world() -> (World, Vec<Event>) {
    let mut world = World::new();
    let events = apply_all(
        &mut world,
        vec![
            Command::ConfigureViewport {
                viewport: Viewport::new(WIDTH, HEIGHT).expect("valid viewport"),
            },
            Command::ImageLoaded {
                width: 900,
                height: 900,
            },
            Command::StartGame {
                size: GridSize::new(3).expect("valid size"),
                seed: 2024,
            },
            Command::Tick {
                dt: DEFAULT_PREVIEW_DELAY,
            },
        ],
    );
    (world, events)
}

struct Rig {
    world: World,
    tracking: HandTracking,
    events: Vec<Event>,
}

impl Rig {
    fn new() -> Self {
        let (world, events) = playing_world();
        Self {
            world,
            tracking: HandTracking::default(),
            events,
        }
    }

    fn frame(&mut self, hand: Option<HandLandmarks>) {
        let mut commands = Vec::new();
        let frame = HandFrame { hand, dt: FRAME };
        self.tracking.handle(&self.events, frame, &mut commands);
        self.events = apply_all(&mut self.world, commands);
    }

    fn topmost(&self) -> (TileId, Position) {
        let grid = query::grid(&self.world).expect("session running");
        let tile = query::tiles(&self.world)
            .iter()
            .max_by_key(|tile| tile.z)
            .copied()
            .expect("session has tiles");
        let half = grid.tile_length() * 0.5;
        (
            tile.id,
            grid.to_viewport(tile.position) + Position::new(half, half),
        )
    }
}

#[test]
fn hovering_between_thresholds_never_toggles_the_pinch() {
    let mut tracking = HandTracking::default();
    let at = Position::new(500.0, 500.0);
    let distances = [
        0.10, 0.030, 0.040, 0.050, 0.045, 0.054, 0.036, 0.060, 0.050, 0.040, 0.036, 0.034,
    ];
    let mut commands = Vec::new();

    for distance in distances {
        tracking.handle(
            &[],
            HandFrame::detected(hand_over(at, distance), FRAME),
            &mut commands,
        );
    }

    let grabs = commands
        .iter()
        .filter(|command| matches!(command, Command::Grab { .. }))
        .count();
    let releases = commands
        .iter()
        .filter(|command| matches!(command, Command::Release { .. }))
        .count();
    let drags = commands
        .iter()
        .filter(|command| matches!(command, Command::Drag { .. }))
        .count();
    assert_eq!(grabs, 2, "pinch starts only below the start threshold");
    assert_eq!(releases, 1, "pinch ends only above the release threshold");
    assert_eq!(drags, 5, "frames held inside the band keep dragging");
    assert!(tracking.is_pinching());
}

#[test]
fn losing_the_hand_releases_the_pinch() {
    let mut tracking = HandTracking::default();
    let mut commands = Vec::new();
    tracking.handle(
        &[],
        HandFrame::detected(hand_over(Position::new(300.0, 300.0), 0.01), FRAME),
        &mut commands,
    );
    commands.clear();

    tracking.handle(&[], HandFrame::missing(FRAME), &mut commands);

    assert_eq!(
        commands,
        vec![Command::Release {
            modality: Modality::Camera,
        }]
    );
    assert!(!tracking.is_pinching());
}

#[test]
fn pinch_drag_drops_tile_into_its_cell() {
    let mut rig = Rig::new();
    let (tile, grab_point) = rig.topmost();
    let grid = *query::grid(&rig.world).expect("session running");
    let snapshot = query::tile(&rig.world, tile).expect("tile exists");
    let target = grab_point + (grid.position_of(snapshot.correct) - snapshot.position);

    rig.frame(Some(hand_over(grab_point, 0.2)));
    rig.frame(Some(hand_over(grab_point, 0.01)));
    assert_eq!(
        query::active_grab(&rig.world).map(|grab| grab.tile()),
        Some(tile)
    );

    for _ in 0..240 {
        rig.frame(Some(hand_over(target, 0.01)));
    }
    rig.frame(Some(hand_over(target, 0.2)));

    let dropped = query::tile(&rig.world, tile).expect("tile exists");
    assert!(dropped.locked, "tile should lock after a precise drop");
    assert_eq!(dropped.position, grid.position_of(dropped.correct));
    assert_eq!(query::moves(&rig.world), 1);
    assert!(rig.events.iter().any(|event| matches!(
        event,
        Event::TileReleased {
            modality: Modality::Camera,
            outcome: DropOutcome::Locked,
            ..
        }
    )));
}

#[test]
fn pinch_while_paused_grabs_nothing() {
    let mut rig = Rig::new();
    let paused = apply_all(&mut rig.world, vec![Command::SetPaused { paused: true }]);
    rig.events.extend(paused);
    let (tile, grab_point) = rig.topmost();
    let before = query::tile(&rig.world, tile);

    rig.frame(Some(hand_over(grab_point, 0.2)));
    rig.frame(Some(hand_over(grab_point, 0.01)));
    assert_eq!(
        rig.events,
        vec![Event::GrabIgnored {
            modality: Modality::Camera,
            reason: GrabRejection::Paused,
        }]
    );
    for _ in 0..10 {
        rig.frame(Some(hand_over(grab_point + Position::new(80.0, 0.0), 0.01)));
    }
    rig.frame(None);

    assert_eq!(query::tile(&rig.world, tile), before);
    assert_eq!(query::moves(&rig.world), 0);
    assert_eq!(query::game_state(&rig.world), GameState::Paused);
}

#[test]
fn pinch_over_empty_space_is_reported_as_a_miss() {
    let mut rig = Rig::new();
    let corner = Position::new(10.0, 10.0);

    rig.frame(Some(hand_over(corner, 0.2)));
    rig.frame(Some(hand_over(corner, 0.01)));

    assert_eq!(
        rig.events,
        vec![Event::GrabIgnored {
            modality: Modality::Camera,
            reason: GrabRejection::NoTile,
        }]
    );
    assert!(rig.tracking.is_pinching());
}
