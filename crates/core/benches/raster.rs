use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rawdraw_core::graphics::{Color, PixelFormat, Point};
use rawdraw_core::raster::Canvas;

const WIDTH: i32 = 1920;
const HEIGHT: i32 = 1080;

fn canvas(format: PixelFormat) -> Canvas {
    Canvas::with_format(WIDTH, HEIGHT, format)
}

fn bench_clear(c: &mut Criterion) {
    let mut group = c.benchmark_group("canvas_clear");

    for format in [PixelFormat::Rgb565, PixelFormat::Bgra8888] {
        let mut canvas = canvas(format);
        group.bench_function(BenchmarkId::from_parameter(format!("{:?}", format)), |b| {
            b.iter(|| {
                canvas.clear(black_box(Color::BLUE));
            });
        });
    }

    group.finish();
}

fn bench_fill_rect(c: &mut Criterion) {
    let mut group = c.benchmark_group("canvas_fill_rect");

    for size in [10, 100, 500].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let mut canvas = canvas(PixelFormat::Bgra8888);
            b.iter(|| {
                canvas.fill_rect(black_box(20), black_box(20), size, size, Color::GREEN);
                canvas.clear_dirty();
            });
        });
    }

    group.finish();
}

fn bench_fill_triangle(c: &mut Criterion) {
    let mut group = c.benchmark_group("canvas_fill_triangle");

    group.bench_function("cursor", |b| {
        let mut canvas = canvas(PixelFormat::Bgra8888);
        b.iter(|| {
            canvas.fill_triangle(
                black_box(Point::new(960, 540)),
                Point::new(968, 545),
                Point::new(962, 550),
                Color::RED,
            );
        });
    });

    group.bench_function("half_screen", |b| {
        let mut canvas = canvas(PixelFormat::Bgra8888);
        b.iter(|| {
            canvas.fill_triangle(
                black_box(Point::new(0, 0)),
                Point::new(WIDTH - 1, HEIGHT / 2),
                Point::new(100, HEIGHT - 1),
                Color::WHITE,
            );
        });
    });

    group.finish();
}

fn bench_draw_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("canvas_draw_text");

    for size in [8, 16, 32].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let mut canvas = canvas(PixelFormat::Bgra8888);
            b.iter(|| {
                canvas.draw_text(15, 15, black_box("Frame Diff (ms): 16"), Color::WHITE, size);
                canvas.clear_dirty();
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_clear,
    bench_fill_rect,
    bench_fill_triangle,
    bench_draw_text
);
criterion_main!(benches);
