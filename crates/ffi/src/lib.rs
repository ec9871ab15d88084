//! C ABI over [`Game`]. Every entry point tolerates null pointers by doing
//! nothing (or returning a zero value).

use log::warn;
use pixeldash_core::{
    init_logging, CameraTransform, CollectibleKind, CollectiblePlacement, Game, Intents,
    LevelLayout, Params, Platform, PlayerSnapshot, Point, Stats, Teleport,
};

/// Collectible placement as laid out by C hosts; `kind` is a
/// [`CollectibleKind`] discriminant.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct RawPlacement {
    pub kind: u8,
    pub x: f32,
    pub y: f32,
}

unsafe fn slice<'a, T>(ptr: *const T, len: usize) -> &'a [T] {
    if ptr.is_null() || len == 0 {
        &[]
    } else {
        std::slice::from_raw_parts(ptr, len)
    }
}

#[no_mangle]
pub extern "C" fn core_init_logging(verbose: u8) {
    init_logging(verbose != 0);
}

#[no_mangle]
pub extern "C" fn core_default_params(out: *mut Params) {
    if let Some(out) = unsafe { out.as_mut() } {
        *out = Params::default();
    }
}

/// Creates a game. A null or invalid `params` falls back to the defaults.
/// Free with [`core_game_free`].
#[no_mangle]
pub extern "C" fn core_game_new(params: *const Params, width: f32, height: f32) -> *mut Game {
    let params = match unsafe { params.as_ref() } {
        Some(p) => match p.validate() {
            Ok(()) => *p,
            Err(err) => {
                warn!("rejecting params: {err}");
                Params::default()
            }
        },
        None => Params::default(),
    };
    Box::into_raw(Box::new(Game::new(params, width, height)))
}

#[no_mangle]
pub extern "C" fn core_game_free(game: *mut Game) {
    if !game.is_null() {
        drop(unsafe { Box::from_raw(game) });
    }
}

/// Copies the level data and moves the game to LevelReady. Returns 0 if the
/// layout is rejected.
#[no_mangle]
pub extern "C" fn core_game_load_level(
    game: *mut Game,
    level: u32,
    platforms: *const Platform,
    platform_len: usize,
    teleports: *const Teleport,
    teleport_len: usize,
    collectibles: *const RawPlacement,
    collectible_len: usize,
    spawn_x: f32,
    spawn_y: f32,
    kill_y: f32,
) -> u8 {
    let Some(g) = (unsafe { game.as_mut() }) else {
        return 0;
    };
    let layout = LevelLayout {
        level,
        platforms: unsafe { slice(platforms, platform_len) }.to_vec(),
        teleports: unsafe { slice(teleports, teleport_len) }.to_vec(),
        collectibles: unsafe { slice(collectibles, collectible_len) }
            .iter()
            .map(|c| CollectiblePlacement {
                kind: CollectibleKind::from_u8(c.kind),
                x: c.x,
                y: c.y,
            })
            .collect(),
        spawn: Point::new(spawn_x, spawn_y),
        kill_y,
    };
    if let Err(err) = layout.validate() {
        warn!("rejecting level {level}: {err}");
        return 0;
    }
    g.load_level(layout);
    1
}

#[no_mangle]
pub extern "C" fn core_game_start(game: *mut Game) -> u8 {
    unsafe { game.as_mut() }.map_or(0, |g| u8::from(g.start()))
}

#[no_mangle]
pub extern "C" fn core_game_restart(game: *mut Game) {
    if let Some(g) = unsafe { game.as_mut() } {
        g.restart_level();
    }
}

#[no_mangle]
pub extern "C" fn core_game_resize(game: *mut Game, width: f32, height: f32) {
    if let Some(g) = unsafe { game.as_mut() } {
        g.resize(width, height);
    }
}

/// Advances one frame and returns the `Events` bits raised by it.
#[no_mangle]
pub extern "C" fn core_game_tick(game: *mut Game, dt: f32, intent_bits: u8) -> u16 {
    match unsafe { game.as_mut() } {
        Some(g) => g.tick(dt, Intents::from_bits_truncate(intent_bits)).bits(),
        None => 0,
    }
}

/// Numeric code of the current game state; 255 for a null game.
#[no_mangle]
pub extern "C" fn core_game_phase(game: *const Game) -> u8 {
    unsafe { game.as_ref() }.map_or(255, |g| g.state().phase().code())
}

#[no_mangle]
pub extern "C" fn core_player_snapshot(game: *const Game, out: *mut PlayerSnapshot) {
    if let (Some(g), Some(out)) = unsafe { (game.as_ref(), out.as_mut()) } {
        *out = g.player().snapshot();
    }
}

#[no_mangle]
pub extern "C" fn core_game_stats(game: *const Game, out: *mut Stats) {
    if let (Some(g), Some(out)) = unsafe { (game.as_ref(), out.as_mut()) } {
        *out = *g.state().stats();
    }
}

#[no_mangle]
pub extern "C" fn core_camera_transform(game: *const Game, out: *mut CameraTransform) {
    if let (Some(g), Some(out)) = unsafe { (game.as_ref(), out.as_mut()) } {
        *out = g.camera().transform();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_handles_are_ignored() {
        core_default_params(std::ptr::null_mut());
        core_game_free(std::ptr::null_mut());
        assert_eq!(core_game_tick(std::ptr::null_mut(), 0.016, 1), 0);
        assert_eq!(core_game_phase(std::ptr::null()), 255);
        assert_eq!(core_game_start(std::ptr::null_mut()), 0);
    }

    #[test]
    fn level_round_trip_through_c_layout() {
        let game = core_game_new(std::ptr::null(), 800.0, 600.0);
        let floor = [Platform::new(1, 0.0, 300.0, 1000.0, 40.0)];
        let gems = [RawPlacement {
            kind: CollectibleKind::Gem as u8,
            x: 200.0,
            y: 285.0,
        }];
        let loaded = core_game_load_level(
            game,
            1,
            floor.as_ptr(),
            floor.len(),
            std::ptr::null(),
            0,
            gems.as_ptr(),
            gems.len(),
            50.0,
            270.0,
            2000.0,
        );
        assert_eq!(loaded, 1);
        assert_eq!(core_game_start(game), 1);
        core_game_tick(game, 1.0 / 60.0, 0);

        let mut snapshot = PlayerSnapshot::default();
        core_player_snapshot(game, &mut snapshot);
        assert_eq!(snapshot.grounded, 1);
        assert_eq!(snapshot.y + snapshot.height, 300.0);

        let mut stats = Stats::default();
        core_game_stats(game, &mut stats);
        assert_eq!(stats.total_pixels, 1);
        core_game_free(game);
    }

    #[test]
    fn degenerate_level_is_rejected() {
        let game = core_game_new(std::ptr::null(), 800.0, 600.0);
        let bad = [Platform::new(1, 0.0, 0.0, 0.0, 10.0)];
        let loaded = core_game_load_level(
            game,
            1,
            bad.as_ptr(),
            bad.len(),
            std::ptr::null(),
            0,
            std::ptr::null(),
            0,
            0.0,
            0.0,
            2000.0,
        );
        assert_eq!(loaded, 0);
        assert_eq!(core_game_phase(game), 0);
        core_game_free(game);
    }
}
