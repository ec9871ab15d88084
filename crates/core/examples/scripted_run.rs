//! Runs a short scripted level and prints a JSON summary of what happened.

use pixeldash_core::{
    CollectibleKind, CollectiblePlacement, Events, Game, Intents, LevelLayout, Params, Platform,
    Point, Rect, Teleport, DT,
};

fn level() -> LevelLayout {
    LevelLayout {
        level: 1,
        platforms: vec![
            Platform::new(1, 0.0, 480.0, 900.0, 60.0),
            Platform::new(2, 1000.0, 480.0, 900.0, 60.0),
            Platform::new(3, 1300.0, 420.0, 80.0, 60.0),
        ],
        teleports: vec![Teleport {
            rect: Rect::new(1800.0, 380.0, 60.0, 100.0),
        }],
        collectibles: vec![
            CollectiblePlacement {
                kind: CollectibleKind::Pixel,
                x: 300.0,
                y: 465.0,
            },
            CollectiblePlacement {
                kind: CollectibleKind::Gem,
                x: 600.0,
                y: 465.0,
            },
            CollectiblePlacement {
                kind: CollectibleKind::JumpBoost,
                x: 1150.0,
                y: 465.0,
            },
        ],
        spawn: Point::new(80.0, 450.0),
        kill_y: 1200.0,
    }
}

fn main() {
    let mut game = Game::new(Params::default(), 960.0, 540.0);
    game.load_level(level());
    game.start();

    let mut counts = [0u32; 5];
    for frame in 0..600 {
        let mut intents = Intents::empty();
        // Clear the pit, then the step before the portal.
        if frame == 148 || frame == 212 {
            intents |= Intents::JUMP;
        }
        let events = game.tick(DT, intents);
        for (slot, event) in [
            Events::JUMPED,
            Events::LANDED,
            Events::COLLECTED,
            Events::DIED,
            Events::RESPAWNED,
        ]
        .into_iter()
        .enumerate()
        {
            counts[slot] += u32::from(events.contains(event));
        }
        if events.contains(Events::LEVEL_COMPLETE) {
            break;
        }
    }

    let player = game.player();
    let stats = game.state().stats();
    let summary = serde_json::json!({
        "state": game.state().phase().as_str(),
        "x": player.x,
        "y": player.y,
        "dx": player.dx,
        "dy": player.dy,
        "grounded": player.is_grounded(),
        "jumped": counts[0],
        "landed": counts[1],
        "collected": counts[2],
        "died": counts[3],
        "respawned": counts[4],
        "score": stats.score,
        "deaths": stats.total_deaths,
        "clock": game.clock(),
    });
    println!("{summary}");
}
