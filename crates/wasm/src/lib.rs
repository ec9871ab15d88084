use js_sys::{Object, Reflect};
use wasm_bindgen::prelude::*;

use pixeldash_core::{Game, Intents, LevelLayout, Params};

fn to_js<E: std::fmt::Display>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn set(obj: &Object, key: &str, value: JsValue) -> Result<(), JsValue> {
    Reflect::set(obj, &JsValue::from_str(key), &value).map(|_| ())
}

#[wasm_bindgen]
pub struct Core {
    game: Game,
}

#[wasm_bindgen]
impl Core {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> Core {
        Core {
            game: Game::new(Params::default(), width, height),
        }
    }

    /// Replaces the tuning. Missing fields keep their defaults.
    pub fn set_params_json(&mut self, json: &str) -> Result<(), JsValue> {
        let params = Params::from_json(json).map_err(to_js)?;
        self.game.set_params(params);
        Ok(())
    }

    pub fn load_level_json(&mut self, json: &str) -> Result<(), JsValue> {
        let layout = LevelLayout::from_json(json).map_err(to_js)?;
        self.game.load_level(layout);
        Ok(())
    }

    pub fn start(&mut self) -> bool {
        self.game.start()
    }

    pub fn restart(&mut self) {
        self.game.restart_level();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.game.resize(width, height);
    }

    /// Advances one frame and returns the player, camera, state and event
    /// bits as a plain JS object.
    pub fn step(&mut self, dt: f32, intent_bits: u8) -> Result<JsValue, JsValue> {
        let events = self.game.tick(dt, Intents::from_bits_truncate(intent_bits));
        let player = self.game.player();
        let camera = self.game.camera().transform();
        let stats = self.game.state().stats();

        let obj = Object::new();
        set(&obj, "x", JsValue::from_f64(f64::from(player.x)))?;
        set(&obj, "y", JsValue::from_f64(f64::from(player.y)))?;
        set(&obj, "dx", JsValue::from_f64(f64::from(player.dx)))?;
        set(&obj, "dy", JsValue::from_f64(f64::from(player.dy)))?;
        set(&obj, "angle", JsValue::from_f64(f64::from(player.angle)))?;
        set(&obj, "flash", JsValue::from_f64(f64::from(player.render_data().flash)))?;
        set(&obj, "grounded", JsValue::from_bool(player.is_grounded()))?;
        set(&obj, "dead", JsValue::from_bool(player.is_dead()))?;
        set(&obj, "respawning", JsValue::from_bool(player.is_respawning()))?;
        set(&obj, "cameraX", JsValue::from_f64(f64::from(camera.translate_x)))?;
        set(&obj, "cameraY", JsValue::from_f64(f64::from(camera.translate_y)))?;
        set(&obj, "state", JsValue::from_str(self.game.state().phase().as_str()))?;
        set(&obj, "score", JsValue::from_f64(stats.score as f64))?;
        set(&obj, "deaths", JsValue::from_f64(f64::from(stats.total_deaths)))?;
        set(&obj, "events", JsValue::from_f64(f64::from(events.bits())))?;
        Ok(JsValue::from(obj))
    }

    /// Layer scroll offset as `[x, y]`.
    pub fn parallax(&self, layer: &str) -> Box<[f32]> {
        let p = self.game.camera().parallax_offset(layer);
        Box::new([p.x, p.y])
    }

    /// Packed visible collectibles: `[kind, x, y, size, rotation, glow, pulse, ...]`.
    pub fn collectibles(&self) -> Box<[f32]> {
        let bounds = self.game.camera().bounds();
        self.game
            .collectibles()
            .visible(&bounds)
            .flat_map(|c| {
                let d = c.render_data();
                [
                    f32::from(d.kind as u8),
                    d.x,
                    d.y,
                    d.size,
                    d.rotation,
                    d.glow,
                    d.pulse,
                ]
            })
            .collect()
    }

    /// Packed explosion particles: `[x, y, size, angle, life, ...]`.
    pub fn particles(&self) -> Box<[f32]> {
        self.game
            .player()
            .particles()
            .iter()
            .flat_map(|p| [p.x, p.y, p.size, p.angle, p.life])
            .collect()
    }

    /// Collected/total/ratio as `[collected, total, ratio]`.
    pub fn progress(&self) -> Box<[f32]> {
        let p = self.game.collectibles().collection_progress();
        Box::new([p.collected as f32, p.total as f32, p.ratio])
    }
}
