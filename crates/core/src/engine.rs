//! Frame loop tying a scene, a renderer and the input state together.
//!
//! One call to [`RenderEngine::update`] produces one frame:
//!
//! ```text
//! measure dt -> Scene::update -> Scene::draw -> overlays -> Renderer::present
//! ```

use std::time::{Duration, Instant};

use crate::config::EngineOptions;
use crate::error::DeviceError;
use crate::graphics::{Color, Point};
use crate::input::InputQuery;
use crate::logging::{log, LogCategory, LogLevel};
use crate::raster::Canvas;
use crate::renderer::Renderer;

const METRICS_ORIGIN: Point = Point::new(15, 15);
const TOUCH_MARKER_SIZE: i32 = 10;

/// Something that can be drawn once per frame.
pub trait Scene {
    /// Advance by `dt`, the time since the previous frame.
    fn update(&mut self, dt: Duration, input: &dyn InputQuery);

    /// Draw the current state; the canvas still holds the previous frame.
    fn draw(&mut self, canvas: &mut Canvas);
}

pub struct RenderEngine<R: Renderer, I: InputQuery> {
    renderer: R,
    input: I,
    options: EngineOptions,
    last_frame: Option<Instant>,
    frame_time: Duration,
    frames: u64,
    cursor: Point,
}

impl<R: Renderer, I: InputQuery> RenderEngine<R, I> {
    /// The mouse cursor starts at the centre of the screen.
    pub fn new(renderer: R, input: I, options: EngineOptions) -> Self {
        let cursor = Point::new(renderer.width() / 2, renderer.height() / 2);
        log(LogCategory::Engine, LogLevel::Info, || {
            format!(
                "engine started on {} ({}x{})",
                renderer.name(),
                renderer.width(),
                renderer.height()
            )
        });
        Self {
            renderer,
            input,
            options,
            last_frame: None,
            frame_time: Duration::ZERO,
            frames: 0,
            cursor,
        }
    }

    /// Run one frame, timing it against the previous call.
    ///
    /// The first frame sees a zero `dt`.
    pub fn update(&mut self, scene: &mut dyn Scene) -> Result<(), DeviceError> {
        let now = Instant::now();
        let dt = self
            .last_frame
            .map(|last| now.duration_since(last))
            .unwrap_or(Duration::ZERO);
        self.last_frame = Some(now);
        self.step(scene, dt)
    }

    /// Run one frame with an explicit `dt`.
    pub fn step(&mut self, scene: &mut dyn Scene, dt: Duration) -> Result<(), DeviceError> {
        self.frame_time = dt;

        scene.update(dt, &self.input);
        scene.draw(self.renderer.canvas_mut());

        if self.options.show_metrics {
            self.draw_metrics();
        }
        if self.options.show_mouse_cursor {
            self.update_cursor();
            self.draw_cursor();
        }
        if self.options.show_touch_cursor {
            self.draw_touch_marker();
        }

        self.renderer.present()?;
        self.frames += 1;

        log(LogCategory::Engine, LogLevel::Trace, || {
            format!("frame {} presented in {} ms", self.frames, dt.as_millis())
        });
        Ok(())
    }

    fn draw_metrics(&mut self) {
        let text = format!("Frame Diff (ms): {}", self.frame_time.as_millis());
        self.renderer.canvas_mut().draw_text(
            METRICS_ORIGIN.x,
            METRICS_ORIGIN.y,
            &text,
            Color::WHITE,
            8,
        );
    }

    fn update_cursor(&mut self) {
        let delta = self.input.take_mouse_delta();
        let width = self.renderer.width();
        let height = self.renderer.height();
        self.cursor = Point::new(
            self.cursor.x.saturating_add(delta.dx).clamp(0, width),
            self.cursor.y.saturating_add(delta.dy).clamp(0, height),
        );
    }

    fn draw_cursor(&mut self) {
        let Point { x, y } = self.cursor;
        self.renderer.canvas_mut().fill_triangle(
            Point::new(x, y),
            Point::new(x + 8, y + 5),
            Point::new(x + 2, y + 10),
            Color::RED,
        );
    }

    fn draw_touch_marker(&mut self) {
        let touch = self.input.touch_state();
        let x = (touch.x * self.renderer.width() as f32) as i32;
        let y = (touch.y * self.renderer.height() as f32) as i32;
        let color = if touch.touching { Color::RED } else { Color::GRAY };
        self.renderer
            .canvas_mut()
            .fill_rect(x, y, TOUCH_MARKER_SIZE, TOUCH_MARKER_SIZE, color);
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Duration of the last frame.
    pub fn frame_time(&self) -> Duration {
        self.frame_time
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn cursor_position(&self) -> Point {
        self.cursor
    }

    /// Give back the renderer and input source.
    pub fn into_parts(self) -> (R, I) {
        (self.renderer, self.input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::PixelFormat;
    use crate::input::{MouseButtons, PointerDelta, TouchSample};
    use crate::renderer::HeadlessRenderer;
    use std::cell::Cell;

    #[derive(Default)]
    struct MockInput {
        delta: Cell<PointerDelta>,
        touch: TouchSample,
    }

    impl InputQuery for MockInput {
        fn is_key_down(&self, code: u16) -> bool {
            code == 30
        }

        fn take_mouse_delta(&self) -> PointerDelta {
            self.delta.take()
        }

        fn mouse_buttons(&self) -> MouseButtons {
            MouseButtons::default()
        }

        fn touch_state(&self) -> TouchSample {
            self.touch
        }
    }

    #[derive(Default)]
    struct MockScene {
        updates: u32,
        saw_key: bool,
        last_dt: Duration,
    }

    impl Scene for MockScene {
        fn update(&mut self, dt: Duration, input: &dyn InputQuery) {
            self.updates += 1;
            self.saw_key = input.is_key_down(30);
            self.last_dt = dt;
        }

        fn draw(&mut self, canvas: &mut Canvas) {
            canvas.clear(Color::BLACK);
        }
    }

    fn quiet() -> EngineOptions {
        EngineOptions {
            show_metrics: false,
            show_mouse_cursor: false,
            show_touch_cursor: false,
            hide_console_caret: false,
        }
    }

    fn engine(input: MockInput, options: EngineOptions) -> RenderEngine<HeadlessRenderer, MockInput> {
        RenderEngine::new(
            HeadlessRenderer::new(200, 100, PixelFormat::Bgra8888),
            input,
            options,
        )
    }

    #[test]
    fn test_update_runs_scene_and_presents() {
        let mut engine = engine(MockInput::default(), quiet());
        let mut scene = MockScene::default();

        engine.update(&mut scene).unwrap();
        assert_eq!(scene.updates, 1);
        assert!(scene.saw_key);
        assert_eq!(scene.last_dt, Duration::ZERO);
        assert_eq!(engine.frames(), 1);
        assert_eq!(engine.renderer().frames_presented(), 1);

        engine.update(&mut scene).unwrap();
        assert_eq!(scene.updates, 2);
        assert_eq!(engine.frame_time(), scene.last_dt);
    }

    #[test]
    fn test_cursor_starts_centred_and_clamps() {
        let input = MockInput::default();
        input.delta.set(PointerDelta {
            dx: -500,
            dy: 7,
            wheel: 0,
        });
        let options = EngineOptions {
            show_mouse_cursor: true,
            ..quiet()
        };
        let mut engine = engine(input, options);
        assert_eq!(engine.cursor_position(), Point::new(100, 50));

        engine.step(&mut MockScene::default(), Duration::ZERO).unwrap();
        assert_eq!(engine.cursor_position(), Point::new(0, 57));
        assert_eq!(engine.renderer().canvas().pixel(0, 57), Some(Color::RED));

        engine.input().delta.set(PointerDelta {
            dx: 1000,
            dy: 1000,
            wheel: 0,
        });
        engine.step(&mut MockScene::default(), Duration::ZERO).unwrap();
        assert_eq!(engine.cursor_position(), Point::new(200, 100));
    }

    #[test]
    fn test_touch_marker_color_follows_contact() {
        let input = MockInput {
            touch: TouchSample {
                x: 0.5,
                y: 0.5,
                touching: true,
            },
            ..Default::default()
        };
        let options = EngineOptions {
            show_touch_cursor: true,
            ..quiet()
        };
        let mut engine = engine(input, options);
        engine.step(&mut MockScene::default(), Duration::ZERO).unwrap();

        let canvas = engine.renderer().canvas();
        assert_eq!(canvas.pixel(100, 50), Some(Color::RED));
        assert_eq!(canvas.pixel(109, 59), Some(Color::RED));
        assert_eq!(canvas.pixel(110, 60), Some(Color::BLACK));

        let (renderer, _) = engine.into_parts();
        let mut engine = RenderEngine::new(renderer, MockInput::default(), options);
        engine.step(&mut MockScene::default(), Duration::ZERO).unwrap();
        assert_eq!(engine.renderer().canvas().pixel(0, 0), Some(Color::GRAY));
    }

    #[test]
    fn test_metrics_text_is_drawn() {
        let options = EngineOptions {
            show_metrics: true,
            ..quiet()
        };
        let mut engine = engine(MockInput::default(), options);
        engine
            .step(&mut MockScene::default(), Duration::from_millis(16))
            .unwrap();

        let canvas = engine.renderer().canvas();
        let lit = (15..23)
            .flat_map(|y| (15..23).map(move |x| (x, y)))
            .filter(|&(x, y)| canvas.pixel(x, y) == Some(Color::WHITE))
            .count();
        assert!(lit > 0);
        assert_eq!(canvas.pixel(14, 14), Some(Color::BLACK));
    }
}
