//! Replays a recorded intent stream against a level and prints one CSV row
//! per frame.
//!
//! ```text
//! cargo run -p pixeldash_core --bin replay -- replay.json
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

use pixeldash_core::{init_logging, Events, Game, Intents, LevelLayout, Params, DT};

/// Replay a recorded run frame by frame
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Replay file: `{ "params"?, "level", "inputs": [bits], "dt"? }`
    replay: PathBuf,
    /// Viewport width used for the camera
    #[arg(long, default_value_t = 800.0)]
    width: f32,
    /// Viewport height used for the camera
    #[arg(long, default_value_t = 600.0)]
    height: f32,
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Deserialize)]
struct Replay {
    #[serde(default)]
    params: Params,
    level: LevelLayout,
    inputs: Vec<u8>,
    #[serde(default = "default_dt")]
    dt: f32,
}

fn default_dt() -> f32 {
    DT
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let raw = fs::read_to_string(&args.replay)
        .with_context(|| format!("reading {}", args.replay.display()))?;
    let replay: Replay = serde_json::from_str(&raw).context("parsing replay")?;
    replay.params.validate().context("replay params")?;
    replay.level.validate().context("replay level")?;

    let mut game = Game::new(replay.params, args.width, args.height);
    game.load_level(replay.level);
    game.start();

    println!("frame,x,y,dx,dy,grounded,state,events");
    for (frame, bits) in replay.inputs.iter().enumerate() {
        let events: Events = game.tick(replay.dt, Intents::from_bits_truncate(*bits));
        let player = game.player();
        println!(
            "{},{},{},{},{},{},{},{}",
            frame,
            player.x,
            player.y,
            player.dx,
            player.dy,
            u8::from(player.is_grounded()),
            game.state().phase(),
            events.bits()
        );
    }
    Ok(())
}
