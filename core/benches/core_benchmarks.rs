use criterion::{Criterion, black_box, criterion_group, criterion_main};

use cartograph_core::abstract_editor::ManualClock;
use cartograph_core::commands::{MapHistory, PaintTilesCommand};
use cartograph_core::document::MapDocument;
use cartograph_core::map::{EdgeId, EdgeState, GridConfig};

fn grid(size: i32) -> MapDocument {
    MapDocument::new(GridConfig {
        cols: size,
        rows: size,
        auto_expand_grid: false,
        ..Default::default()
    })
}

/// `rooms_per_side`² walled boxes of `room_size` cells per side.
fn walled_rooms(rooms_per_side: i32, room_size: i32) -> MapDocument {
    let mut doc = grid(rooms_per_side * room_size);
    for ry in 0..rooms_per_side {
        for rx in 0..rooms_per_side {
            let (x0, y0) = (rx * room_size, ry * room_size);
            let (x1, y1) = (x0 + room_size - 1, y0 + room_size - 1);
            for x in x0..=x1 {
                doc.set_edge_state(EdgeId::new(x, y1, x, y1 + 1), EdgeState::Wall);
            }
            for y in y0..=y1 {
                doc.set_edge_state(EdgeId::new(x1, y, x1 + 1, y), EdgeState::Wall);
            }
        }
    }
    doc
}

// ---------------------------------------------------------------------------
// Tile painting
// ---------------------------------------------------------------------------

fn bench_paint_row(c: &mut Criterion) {
    c.bench_function("paint_row_256", |b| {
        b.iter(|| {
            let mut doc = grid(256);
            for x in 0..256 {
                doc.set_tile_at(x, black_box(7), (x % 3) as u32 + 1);
            }
            black_box(doc.tiles().row(7).map(|row| row.runs().len()))
        });
    });
}

fn bench_paint_stroke_coalesced(c: &mut Criterion) {
    c.bench_function("paint_stroke_coalesced_64", |b| {
        b.iter(|| {
            let mut doc = grid(256);
            let clock = ManualClock::new();
            let mut history = MapHistory::with_clock(100, clock.clone());
            for x in 0..64 {
                let command = PaintTilesCommand::paint(&doc, [(x, 10), (x, 11)], 1);
                let _ = history.execute(command.into(), &mut doc);
                clock.advance(10);
            }
            black_box(history.undo_count())
        });
    });
}

// ---------------------------------------------------------------------------
// Room detection
// ---------------------------------------------------------------------------

fn bench_detect_rooms_small(c: &mut Criterion) {
    let doc = walled_rooms(8, 8);
    c.bench_function("detect_rooms_64x64", |b| {
        b.iter(|| black_box(doc.detect_all_enclosed_rooms().len()));
    });
}

fn bench_detect_rooms_large(c: &mut Criterion) {
    let doc = walled_rooms(32, 8);
    c.bench_function("detect_rooms_256x256", |b| {
        b.iter(|| black_box(doc.detect_all_enclosed_rooms().len()));
    });
}

criterion_group!(
    benches,
    bench_paint_row,
    bench_paint_stroke_coalesced,
    bench_detect_rooms_small,
    bench_detect_rooms_large,
);
criterion_main!(benches);
