use std::cell::RefCell;

use tandem_engine::coords::{Rect, Vec2};
use tandem_engine::input::{InputEvent, InputFrame, InputState, Key, KeyState, Modifiers, MouseButton};
use tandem_engine::scene::DrawList;
use tandem_engine::text::{FontId, FontLoadError, FontSystem};

use crate::constraints::{Constraints, LayoutCtx};
use crate::event::UiEvent;
use crate::painter::Painter;
use crate::state::UiState;
use crate::widget::Element;

// ── UiInput ───────────────────────────────────────────────────────────────

/// Input for one UI frame, in logical pixels.
#[derive(Debug, Clone, Default)]
pub struct UiInput {
    pub mouse_pos: Vec2,
    /// Primary button held.
    pub mouse_pressed: bool,
    /// Primary button released this frame.
    pub mouse_clicked: bool,
    /// Committed text, in arrival order.
    pub text_input: Vec<String>,
    /// Key presses including repeats, in arrival order.
    pub keys_pressed: Vec<(Key, Modifiers)>,
}

impl UiInput {
    pub fn from_engine(state: &InputState, frame: &InputFrame) -> Self {
        let mouse_pos = state.pointer_pos.map(|(x, y)| Vec2::new(x, y)).unwrap_or_default();
        let keys_pressed = frame
            .events
            .iter()
            .filter_map(|ev| match ev {
                InputEvent::Key { key, state: KeyState::Pressed, modifiers, .. } => Some((*key, *modifiers)),
                _ => None,
            })
            .collect();

        Self {
            mouse_pos,
            mouse_pressed: state.button_down(MouseButton::Left),
            mouse_clicked: frame.buttons_released.contains(&MouseButton::Left),
            text_input: frame.text.iter().map(|t| t.text.clone()).collect(),
            keys_pressed,
        }
    }
}

// ── UiScene ───────────────────────────────────────────────────────────────

/// Owns what outlives a single widget tree: fonts, the draw list and the
/// [`UiState`] widgets read from and write to.
pub struct UiScene {
    /// Public so renderers can borrow it alongside `draw_list`.
    pub font_system: FontSystem,
    /// Filled by the most recent [`frame`](Self::frame).
    pub draw_list: DrawList,
    pub(crate) state: RefCell<UiState>,
}

impl UiScene {
    pub fn new() -> Self {
        Self {
            font_system: FontSystem::new(),
            draw_list: DrawList::new(),
            state: RefCell::new(UiState::new()),
        }
    }

    pub fn load_font(&mut self, data: &[u8]) -> Result<FontId, FontLoadError> {
        self.font_system.load_font(data)
    }

    pub fn state(&self) -> std::cell::Ref<'_, UiState> {
        self.state.borrow()
    }

    /// Lays out and paints `root` over the viewport, then routes this frame's
    /// input through it. Clicks, text and keys stop at the first widget that
    /// consumes them.
    pub fn frame(&mut self, mut root: Element, viewport: Vec2, input: &UiInput) -> &mut DrawList {
        self.draw_list.clear();
        let rect = Rect::new(0.0, 0.0, viewport.x, viewport.y);

        // ── measure ───────────────────────────────────────────────────────
        let ctx = LayoutCtx::with_state(&self.font_system, &self.state);
        let _ = root.measure(Constraints::loose(viewport), &ctx);

        // ── paint ─────────────────────────────────────────────────────────
        {
            let mut painter =
                Painter::new(&mut self.draw_list, &self.font_system, input.mouse_pos, input.mouse_pressed);
            root.paint(&mut painter, rect);
        }

        // ── events ────────────────────────────────────────────────────────
        if input.mouse_clicked {
            root.on_event(&UiEvent::Click { pos: input.mouse_pos }, rect, &ctx);
        }
        for text in &input.text_input {
            root.on_event(&UiEvent::TextInput { text: text.clone() }, rect, &ctx);
        }
        for &(key, modifiers) in &input.keys_pressed {
            root.on_event(&UiEvent::KeyPress { key, modifiers }, rect, &ctx);
        }

        &mut self.draw_list
    }
}

impl Default for UiScene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use tandem_engine::input::{PointerButtonEvent, PointerMoveEvent, MouseButtonState, TextEvent};
    use tandem_engine::paint::Color;
    use tandem_engine::scene::DrawCmd;

    use super::*;
    use crate::widgets::{button::Button, container::Container, flex::Column, textbox::TextBox};

    fn click_at(x: f32, y: f32) -> UiInput {
        UiInput { mouse_pos: Vec2::new(x, y), mouse_clicked: true, ..Default::default() }
    }

    // ── UiInput ───────────────────────────────────────────────────────────

    #[test]
    fn from_engine_collects_clicks_text_and_keys() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, InputEvent::PointerMoved(PointerMoveEvent { x: 10.0, y: 20.0 }));
        for s in [MouseButtonState::Pressed, MouseButtonState::Released] {
            state.apply_event(
                &mut frame,
                InputEvent::PointerButton(PointerButtonEvent {
                    button: MouseButton::Left,
                    state: s,
                    x: 10.0,
                    y: 20.0,
                    modifiers: Modifiers::default(),
                }),
            );
        }
        state.apply_event(&mut frame, InputEvent::Text(TextEvent { text: "7".into() }));
        state.apply_event(
            &mut frame,
            InputEvent::Key { key: Key::Enter, state: KeyState::Pressed, modifiers: Modifiers::default(), repeat: false },
        );

        let input = UiInput::from_engine(&state, &frame);
        assert_eq!(input.mouse_pos, Vec2::new(10.0, 20.0));
        assert!(input.mouse_clicked);
        assert!(!input.mouse_pressed);
        assert_eq!(input.text_input, ["7"]);
        assert_eq!(input.keys_pressed, [(Key::Enter, Modifiers::default())]);
    }

    // ── frame ─────────────────────────────────────────────────────────────

    #[test]
    fn frame_paints_into_draw_list() {
        let mut scene = UiScene::new();
        let root = Container::new().background(Color::WHITE).min_size(10.0, 10.0);
        let list = scene.frame(root.into(), Vec2::new(100.0, 100.0), &UiInput::default());
        assert!(matches!(list.items()[0].cmd, DrawCmd::Rect(_)));
    }

    #[test]
    fn click_emits_into_state() {
        let mut scene = UiScene::new();
        let root = Column::new().child(Button::new(Container::new().min_size(50.0, 20.0)).id("b1"));
        let _ = scene.frame(root.into(), Vec2::new(200.0, 200.0), &click_at(5.0, 5.0));
        let emitted = scene.state.get_mut().take_emitted();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].source, "b1");
    }

    #[test]
    fn typing_reaches_focused_box_across_frames() {
        let mut scene = UiScene::new();
        let viewport = Vec2::new(200.0, 200.0);
        let _ = scene.frame(TextBox::new("t1").into(), viewport, &click_at(5.0, 5.0));
        assert!(scene.state().is_focused("t1"));

        let focused = scene.state().is_focused("t1");
        let typed = UiInput { text_input: vec!["4".into()], ..Default::default() };
        let _ = scene.frame(TextBox::new("t1").focused(focused).into(), viewport, &typed);
        assert_eq!(scene.state().text("t1"), Some("4"));
    }
}
