//! marquee: run a page against a scripted variable feed and print the
//! packed frames as ASCII.
//!
//! Real deployments decode their own font files and push packed frames
//! onto a panel bus; this driver substitutes the bundled 5×7 face for
//! every page font and the terminal for the panel, which is all a page
//! author needs to iterate on layouts.

use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

use marquee_core::font::builtin;
use marquee_core::{frame, Clock, PageBuilder, PageDef, Rect, Size, Value, VarStore};

/// Demo and debug driver for the marquee display engine.
#[derive(Debug, Parser)]
#[command(name = "marquee", version, about)]
struct Cli {
    /// Page descriptor (JSON). Runs the built-in beer-tap demo page
    /// when omitted.
    page: Option<PathBuf>,

    /// Panel width in pixels.
    #[arg(long, default_value_t = 100)]
    width: u32,

    /// Panel height in pixels.
    #[arg(long, default_value_t = 16)]
    height: u32,

    /// Number of ticks to run; 0 runs forever.
    #[arg(long, default_value_t = 100)]
    ticks: u64,

    /// Milliseconds between ticks.
    #[arg(long, default_value_t = 100)]
    interval_ms: u64,
}

/// The built-in demo: a beer-tap front panel.
const DEMO_PAGE: &str = r#"{
    "fonts": {
        "latin1_5x8": {"file": "latin1_5x8.fnt"}
    },
    "widgets": {
        "name": {
            "type": "text", "format": "{0}", "variables": ["name"],
            "font": "latin1_5x8", "varwidth": true,
            "effect": {"type": "scroll", "direction": "left", "gap": 20, "threshold": 60, "hesitate": "onloop", "hesitate_time": 2}
        },
        "abv": {"type": "text", "format": "{0}", "variables": ["abv"], "font": "latin1_5x8", "just": "right", "size": [36, 8]},
        "remaining": {"type": "text", "format": "{0}", "variables": ["remaining"], "font": "latin1_5x8", "varwidth": true},
        "weight": {"type": "progressbar", "value": "weight", "rangeval": [0, 846], "size": [98, 5]},
        "underline": {"type": "line", "point": [99, 0]}
    },
    "canvases": {
        "pour": {
            "size": [100, 16],
            "widgets": [["name", 0, 0], ["underline", 0, 9], ["weight", 1, 11]]
        },
        "stats": {
            "size": [100, 16],
            "widgets": [["remaining", 0, 0], ["abv", 64, 8]]
        }
    },
    "sequences": [
        {
            "name": "playing",
            "conditional": "db['state'] == 'play'",
            "canvases": [
                {"name": "pour", "duration": 8},
                {"name": "stats", "duration": 4}
            ]
        },
        {
            "name": "idle",
            "conditional": "db['state'] != 'play'",
            "coolingperiod": 5,
            "canvases": [{"name": "stats", "duration": 3}]
        }
    ]
}"#;

/// Scripted variable mutations: `(at_seconds, name, value)`.
fn demo_events() -> Vec<(f64, &'static str, Value)> {
    vec![
        (10.0, "name", Value::from("Belgian Ale")),
        (10.0, "abv", Value::from("8.4 ABV")),
        (15.0, "remaining", Value::from("390 oz remaining")),
        (15.0, "weight", Value::from(390i64)),
        (30.0, "weight", Value::from(50i64)),
        (30.0, "remaining", Value::from("50 oz remaining")),
        (60.0, "state", Value::from("stop")),
        (70.0, "state", Value::from("play")),
    ]
}

fn seed_vars(db: &VarStore) {
    db.set("remaining", "423 oz remaining");
    db.set("name", "Rye IPA");
    db.set("abv", "7.2 ABV");
    db.set("weight", 423i64);
    db.set("description", "Malty and bitter with an IBU of 68");
    db.set("state", "play");
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let json = match &cli.page {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading page file {}", path.display()))?,
        None => DEMO_PAGE.to_string(),
    };
    let page = PageDef::from_json(&json).context("parsing page descriptor")?;

    let clock = Clock::system();
    let db = VarStore::new();
    let dbp = VarStore::new();
    seed_vars(&db);
    dbp.copy_from(&db);

    // Hosts decode the font files named by the page; here every font
    // resolves to the bundled face.
    let mut builder = PageBuilder::new(db.clone(), dbp.clone(), clock.clone());
    for (name, font) in &page.fonts {
        debug!(font = %name, file = %font.file, "substituting the bundled 5x7 face");
        builder = builder.with_font(name.clone(), builtin::classic_5x7());
    }

    let panel = Size::new(cli.width, cli.height);
    let mut controller = builder.build(&page, panel).context("building page")?;
    info!(
        sequences = controller.sequence_count(),
        width = panel.width,
        height = panel.height,
        "page loaded"
    );

    let events = demo_events();
    let mut tick: u64 = 0;
    loop {
        let elapsed = clock.now();
        db.set("elapsed_formatted", format_elapsed(elapsed));
        for (at, name, value) in &events {
            if elapsed >= *at {
                db.set(*name, value.clone());
            }
        }

        if let Some(img) = controller.next() {
            let packed = frame::pack(&img, Rect::new(0, 0, panel.width, panel.height));
            print!("{}", frame::render_ascii(&packed, panel.width));
        } else {
            debug!(tick, "no sequence active");
        }

        dbp.copy_from(&db);

        tick += 1;
        if cli.ticks != 0 && tick >= cli.ticks {
            break;
        }
        thread::sleep(Duration::from_millis(cli.interval_ms));
    }

    Ok(())
}

/// `M:SS` rendering of an elapsed-seconds counter.
fn format_elapsed(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
