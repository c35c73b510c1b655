//! Stroke painting benchmarks

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use pixelstroke::{
    BrushFootprint, EngineConfig, JumbleSettings, Painter, StampPainter, StrokeContext, Surface,
    ToolKind,
};

fn generate_stroke(count: usize) -> Vec<(f32, f32)> {
    (0..count)
        .map(|i| {
            let t = i as f32 / count as f32;
            (t * 480.0 + 16.0, (t * std::f32::consts::PI * 4.0).sin() * 100.0 + 256.0)
        })
        .collect()
}

fn checker(size: u32) -> Surface {
    let mut surface = match Surface::new(size, size) {
        Ok(surface) => surface,
        Err(e) => panic!("bench surface: {}", e),
    };
    for index in 0..surface.pixel_count() {
        let color = if (index / 8 + index / (8 * size as usize)) % 2 == 0 {
            0x3366CCFF
        } else {
            0xF0E0A0FF
        };
        surface.set_pixel(index, color);
    }
    surface
}

fn run_stroke(
    painter: &mut Painter,
    surface: &mut Surface,
    points: &[(f32, f32)],
    ctx: &StrokeContext,
) {
    painter.begin(surface, None);
    for pair in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        painter.stamp_line(surface, x0, y0, x1, y1, ctx);
    }
    let label = painter.kind().label();
    let _ = painter.end(surface, label);
}

fn benchmark_tools(c: &mut Criterion) {
    let mut group = c.benchmark_group("Stroke By Tool");
    let config = EngineConfig {
        jumble: JumbleSettings {
            seed: Some(7),
            ..Default::default()
        },
        ..Default::default()
    };
    let points = generate_stroke(64);
    let start = checker(512);
    let ctx = StrokeContext::new(start.geometry(), BrushFootprint::circle(9, 0.5))
        .with_colors(0xC03030FF, 0x3366CCFF)
        .with_config(&config);

    for kind in ToolKind::ALL {
        group.bench_function(kind.label(), |b| {
            let mut painter = Painter::from_config(kind, &config);
            b.iter(|| {
                let mut surface = start.clone();
                run_stroke(&mut painter, &mut surface, &points, &ctx);
            })
        });
    }

    group.finish();
}

fn benchmark_brush_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("Brush Size Impact");
    let points = generate_stroke(64);
    let start = checker(512);

    for size in [1u32, 5, 15, 31].iter() {
        let ctx = StrokeContext::new(start.geometry(), BrushFootprint::circle(*size, 0.8))
            .with_colors(0xC03030FF, 0xFFFFFFFF)
            .with_opacity(180);
        group.bench_with_input(BenchmarkId::new("brush", size), &ctx, |b, ctx| {
            let mut painter = Painter::new(ToolKind::Brush);
            b.iter(|| {
                let mut surface = start.clone();
                run_stroke(&mut painter, &mut surface, &points, ctx);
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_tools, benchmark_brush_size);
criterion_main!(benches);
