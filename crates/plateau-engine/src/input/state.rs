use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{ElementState, InputEvent, Key, MouseButton, PointerButtonEvent, PointerMoveEvent};
use crate::picking::Cursor;

/// Current input state of the window.
#[derive(Debug, Default)]
pub struct InputState {
    pub focused: bool,

    /// Pointer position in physical pixels; `None` outside the window.
    pub pointer: Option<(f32, f32)>,

    pub keys_down: HashSet<Key>,
    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Applies `ev` to the held state and records transitions into `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::Focused(focused) => {
                self.focused = *focused;
                if !*focused {
                    // Releases are not delivered to unfocused windows.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }

            InputEvent::PointerMoved(PointerMoveEvent { x, y }) => {
                self.pointer = Some((*x, *y));
            }

            InputEvent::PointerLeft => self.pointer = None,

            InputEvent::Key { key, state, .. } => match state {
                ElementState::Pressed => {
                    if self.keys_down.insert(*key) {
                        frame.keys_pressed.insert(*key);
                    }
                }
                ElementState::Released => {
                    self.keys_down.remove(key);
                }
            },

            InputEvent::PointerButton(PointerButtonEvent { button, state }) => match state {
                ElementState::Pressed => {
                    if self.buttons_down.insert(*button) {
                        frame.buttons_pressed.insert(*button);
                    }
                }
                ElementState::Released => {
                    if self.buttons_down.remove(button) {
                        frame.buttons_released.insert(*button);
                    }
                }
            },

            InputEvent::Resized { width, height } => {
                frame.resized = Some((*width, *height));
            }
        }

        frame.events.push(ev);
    }

    /// Pointer position as a picking cursor.
    pub fn cursor(&self) -> Option<Cursor> {
        self.pointer.map(|(x, y)| Cursor::new(x, y))
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(button: MouseButton) -> InputEvent {
        InputEvent::PointerButton(PointerButtonEvent {
            button,
            state: ElementState::Pressed,
        })
    }

    fn release(button: MouseButton) -> InputEvent {
        InputEvent::PointerButton(PointerButtonEvent {
            button,
            state: ElementState::Released,
        })
    }

    #[test]
    fn pointer_tracks_moves_and_leave() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, InputEvent::PointerMoved(PointerMoveEvent { x: 10.0, y: 20.5 }));
        assert_eq!(state.cursor(), Some(Cursor::new(10.0, 20.5)));

        state.apply_event(&mut frame, InputEvent::PointerLeft);
        assert_eq!(state.cursor(), None);
        assert_eq!(frame.events.len(), 2);
    }

    #[test]
    fn button_transitions_recorded_once() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, press(MouseButton::Left));
        state.apply_event(&mut frame, press(MouseButton::Left));
        assert!(frame.button_pressed(MouseButton::Left));
        assert!(state.button_down(MouseButton::Left));

        frame.clear();
        state.apply_event(&mut frame, release(MouseButton::Left));
        assert!(!frame.button_pressed(MouseButton::Left));
        assert!(frame.buttons_released.contains(&MouseButton::Left));
        assert!(!state.button_down(MouseButton::Left));
    }

    #[test]
    fn focus_loss_clears_held_state() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, press(MouseButton::Right));
        state.apply_event(
            &mut frame,
            InputEvent::Key {
                key: Key::Space,
                state: ElementState::Pressed,
                repeat: false,
            },
        );
        state.apply_event(&mut frame, InputEvent::Focused(false));

        assert!(!state.button_down(MouseButton::Right));
        assert!(!state.key_down(Key::Space));
    }

    #[test]
    fn resize_keeps_last_size() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, InputEvent::Resized { width: 800, height: 600 });
        state.apply_event(&mut frame, InputEvent::Resized { width: 1024, height: 768 });
        assert_eq!(frame.resized, Some((1024, 768)));

        frame.clear();
        assert_eq!(frame.resized, None);
    }
}
