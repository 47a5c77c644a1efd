//! Rendering benchmarks — text rasterization, frame packing, full ticks.

#![allow(missing_docs)]

use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use marquee_core::font::builtin;
use marquee_core::widget::Widget;
use marquee_core::{
    frame, Bitmap, Clock, Justify, PageBuilder, PageDef, Rect, Size, Text, VarStore,
};

/// Benchmark rendering a full-panel text line.
fn benchmark_text_render(c: &mut Criterion) {
    let font = Rc::new(builtin::classic_5x7());
    c.bench_function("text_render_100x16", |b| {
        let vars = VarStore::new();
        vars.set("name", "Malty and bitter with an IBU of 68");
        let mut text = Text::new(
            "{0}",
            vec!["name".into()],
            font.clone(),
            vars.clone(),
            true,
            Size::new(100, 16),
            Justify::Left,
        );
        let mut flip = false;
        b.iter(|| {
            flip = !flip;
            vars.set("name", if flip { "Rye IPA" } else { "Belgian Ale" });
            black_box(text.update(false))
        })
    });
}

/// Benchmark packing a 100×16 panel frame.
fn benchmark_frame_pack(c: &mut Criterion) {
    c.bench_function("frame_pack_100x16", |b| {
        let mut img = Bitmap::new(Size::new(100, 16), false);
        for x in 0..100 {
            img.put(x, x % 16, true);
        }
        b.iter(|| black_box(frame::pack(&img, Rect::new(0, 0, 100, 16))))
    });
}

/// Benchmark a complete controller tick over a realistic page.
fn benchmark_full_tick(c: &mut Criterion) {
    let page = PageDef::from_json(
        r#"{
            "widgets": {
                "name": {"type": "text", "format": "{0}", "variables": ["name"], "font": "5x7"},
                "bar": {"type": "progressbar", "value": "weight", "rangeval": [0, 846], "size": [98, 4]},
                "underline": {"type": "line", "point": [99, 0]}
            },
            "canvases": {
                "main": {
                    "size": [100, 16],
                    "widgets": [["name", 0, 0], ["underline", 0, 9], ["bar", 1, 11]]
                }
            },
            "sequences": [
                {"canvases": [{"name": "main", "duration": 10}]}
            ]
        }"#,
    )
    .unwrap_or_default();

    c.bench_function("controller_tick", |b| {
        let clock = Clock::manual();
        clock.set(1.0);
        let db = VarStore::new();
        db.set("name", "Rye IPA");
        db.set("weight", 423i64);
        let dbp = VarStore::new();
        let built = PageBuilder::new(db.clone(), dbp, clock.clone())
            .with_font("5x7", builtin::classic_5x7())
            .build(&page, Size::new(100, 16));
        let Ok(mut dc) = built else {
            return;
        };
        let mut weight = 0i64;
        b.iter(|| {
            clock.advance(0.1);
            weight = (weight + 1) % 846;
            db.set("weight", weight);
            black_box(dc.next())
        })
    });
}

criterion_group!(
    benches,
    benchmark_text_render,
    benchmark_frame_pack,
    benchmark_full_tick
);
criterion_main!(benches);
