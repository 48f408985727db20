//! Demo scene: a few primitives, a label and a WASD-driven square.

use std::time::Duration;

use rawdraw_core::engine::Scene;
use rawdraw_core::graphics::{Color, Point};
use rawdraw_core::input::keys::{KEY_A, KEY_D, KEY_S, KEY_W};
use rawdraw_core::input::InputQuery;
use rawdraw_core::raster::Canvas;

const SQUARE_SIZE: i32 = 10;
/// Pixels per millisecond
const MOVE_SPEED: f32 = 0.25;

pub struct DemoScene {
    width: i32,
    height: i32,
    x: f32,
    y: f32,
    status: String,
}

impl DemoScene {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            x: 80.0,
            y: 80.0,
            status: String::new(),
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x as i32, self.y as i32)
    }
}

impl Scene for DemoScene {
    fn update(&mut self, dt: Duration, input: &dyn InputQuery) {
        let step = MOVE_SPEED * dt.as_secs_f32() * 1000.0;

        if input.is_key_down(KEY_W) {
            self.y -= step;
        }
        if input.is_key_down(KEY_A) {
            self.x -= step;
        }
        if input.is_key_down(KEY_S) {
            self.y += step;
        }
        if input.is_key_down(KEY_D) {
            self.x += step;
        }

        self.x = self.x.clamp(0.0, (self.width - SQUARE_SIZE).max(0) as f32);
        self.y = self.y.clamp(0.0, (self.height - SQUARE_SIZE).max(0) as f32);

        let buttons = input.mouse_buttons();
        let touch = input.touch_state();
        self.status = format!(
            "L:{} M:{} R:{}  touch {:.2},{:.2}",
            buttons.left as u8, buttons.middle as u8, buttons.right as u8, touch.x, touch.y
        );
    }

    fn draw(&mut self, canvas: &mut Canvas) {
        canvas.clear(Color::BLACK);

        canvas.draw_text(30, 30, "Hello, World!", Color::WHITE, 16);
        canvas.draw_text(30, 56, "WASD moves, ESC quits", Color::GRAY, 8);
        canvas.draw_text(30, 70, &self.status, Color::GREEN, 8);

        canvas.draw_rect(20, 100, 160, 90, 3, Color::BLUE);
        canvas.fill_triangle(
            Point::new(100, 110),
            Point::new(40, 180),
            Point::new(160, 180),
            Color::GREEN,
        );

        let Point { x, y } = self.position();
        canvas.fill_rect(x, y, SQUARE_SIZE, SQUARE_SIZE, Color::WHITE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rawdraw_core::graphics::PixelFormat;
    use rawdraw_core::input::{MouseButtons, PointerDelta, TouchSample};

    struct HoldKey(u16);

    impl InputQuery for HoldKey {
        fn is_key_down(&self, code: u16) -> bool {
            code == self.0
        }

        fn take_mouse_delta(&self) -> PointerDelta {
            PointerDelta::default()
        }

        fn mouse_buttons(&self) -> MouseButtons {
            MouseButtons::default()
        }

        fn touch_state(&self) -> TouchSample {
            TouchSample::default()
        }
    }

    #[test]
    fn test_square_moves_with_keys_and_stays_on_screen() {
        let mut scene = DemoScene::new(200, 200);
        scene.update(Duration::from_millis(40), &HoldKey(KEY_D));
        assert_eq!(scene.position(), Point::new(90, 80));

        scene.update(Duration::from_secs(10), &HoldKey(KEY_W));
        assert_eq!(scene.position(), Point::new(90, 0));

        scene.update(Duration::from_secs(10), &HoldKey(KEY_S));
        assert_eq!(scene.position(), Point::new(90, 190));
    }

    #[test]
    fn test_draw_places_square() {
        let mut scene = DemoScene::new(320, 240);
        let mut canvas = Canvas::with_format(320, 240, PixelFormat::Bgra8888);
        scene.update(Duration::ZERO, &HoldKey(0));
        scene.draw(&mut canvas);

        assert_eq!(canvas.pixel(80, 80), Some(Color::WHITE));
        assert_eq!(canvas.pixel(89, 89), Some(Color::WHITE));
        assert_eq!(canvas.pixel(0, 0), Some(Color::BLACK));
        assert_eq!(canvas.pixel(20, 100), Some(Color::BLUE));
    }
}
