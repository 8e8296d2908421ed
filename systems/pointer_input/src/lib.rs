#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure input system translating mouse, touch and pen gestures into tile commands.

use pinch_puzzle_core::{Command, Event, InputAdapter, Modality, Position};

/// Pointer sample captured by an adapter during a single frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    /// The pointer was pressed at the provided viewport position.
    Down {
        /// Pointer position in viewport coordinates.
        at: Position,
    },
    /// The pointer moved to the provided viewport position.
    Move {
        /// Pointer position in viewport coordinates.
        at: Position,
    },
    /// The pointer was lifted at the provided viewport position.
    Up {
        /// Pointer position in viewport coordinates.
        at: Position,
    },
}

/// Direct-manipulation input system.
///
/// A press requests a grab at the pointer, movement while pressed drags the
/// held tile and lifting the pointer drops it. The world decides whether a
/// tile is actually held, so the system only tracks the button state.
#[derive(Clone, Debug, Default)]
pub struct PointerInput {
    pressed: bool,
}

impl PointerInput {
    /// Creates a new pointer system with the button released.
    #[must_use]
    pub const fn new() -> Self {
        Self { pressed: false }
    }

    /// Reports whether the pointer is currently held down.
    #[must_use]
    pub const fn is_pressed(&self) -> bool {
        self.pressed
    }
}

impl InputAdapter for PointerInput {
    type Input = Option<PointerEvent>;

    fn modality(&self) -> Modality {
        Modality::Pointer
    }

    fn handle(&mut self, events: &[Event], input: Self::Input, out: &mut Vec<Command>) {
        let modality = self.modality();
        for event in events {
            if matches!(event, Event::GameStarted { .. }) {
                self.pressed = false;
            }
        }

        match input {
            Some(PointerEvent::Down { at }) => {
                if self.pressed {
                    out.push(Command::Release { modality });
                }
                self.pressed = true;
                out.push(Command::Grab { modality, at });
            }
            Some(PointerEvent::Move { at }) if self.pressed => {
                out.push(Command::Drag { modality, to: at });
            }
            Some(PointerEvent::Up { at }) if self.pressed => {
                self.pressed = false;
                out.push(Command::Drag { modality, to: at });
                out.push(Command::Release { modality });
            }
            Some(PointerEvent::Move { .. } | PointerEvent::Up { .. }) | None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hover_without_press_emits_nothing() {
        let mut pointer = PointerInput::new();
        let mut commands = Vec::new();

        pointer.handle(
            &[],
            Some(PointerEvent::Move {
                at: Position::new(4.0, 4.0),
            }),
            &mut commands,
        );
        pointer.handle(
            &[],
            Some(PointerEvent::Up {
                at: Position::new(4.0, 4.0),
            }),
            &mut commands,
        );

        assert!(commands.is_empty());
        assert!(!pointer.is_pressed());
    }

    #[test]
    fn lost_up_is_released_before_the_next_press() {
        let mut pointer = PointerInput::new();
        let mut commands = Vec::new();
        let at = Position::new(10.0, 10.0);

        pointer.handle(&[], Some(PointerEvent::Down { at }), &mut commands);
        commands.clear();
        pointer.handle(&[], Some(PointerEvent::Down { at }), &mut commands);

        assert_eq!(
            commands,
            vec![
                Command::Release {
                    modality: Modality::Pointer,
                },
                Command::Grab {
                    modality: Modality::Pointer,
                    at,
                },
            ]
        );
    }
}
