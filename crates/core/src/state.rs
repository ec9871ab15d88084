//! High-level game state, session statistics and eased time-scale.

use std::fmt;

use log::info;

/// Fraction of the remaining time-scale gap closed per update.
const TIME_SCALE_EASE: f32 = 0.1;
/// Gap below which the time-scale snaps to its target.
const TIME_SCALE_EPSILON: f32 = 0.001;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum GamePhase {
    #[default]
    MainMenu,
    Playing,
    Paused,
    Dead,
    LevelComplete,
    LevelReady,
    EnteringPortal,
    Exiting,
    /// A name outside the canonical set, kept verbatim.
    Other(String),
}

impl GamePhase {
    /// Parses a canonical name, ignoring case and `_`/`-`/space separators.
    /// Anything else is preserved as [`GamePhase::Other`].
    pub fn parse(name: &str) -> Self {
        let key: String = name
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "mainmenu" => Self::MainMenu,
            "playing" => Self::Playing,
            "paused" => Self::Paused,
            "dead" => Self::Dead,
            "levelcomplete" => Self::LevelComplete,
            "levelready" => Self::LevelReady,
            "enteringportal" => Self::EnteringPortal,
            "exiting" => Self::Exiting,
            _ => Self::Other(name.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::MainMenu => "MAIN_MENU",
            Self::Playing => "PLAYING",
            Self::Paused => "PAUSED",
            Self::Dead => "DEAD",
            Self::LevelComplete => "LEVEL_COMPLETE",
            Self::LevelReady => "LEVEL_READY",
            Self::EnteringPortal => "ENTERING_PORTAL",
            Self::Exiting => "EXITING",
            Self::Other(name) => name,
        }
    }

    /// Stable numeric code for hosts; `Other` maps to 255.
    pub fn code(&self) -> u8 {
        match self {
            Self::MainMenu => 0,
            Self::Playing => 1,
            Self::Paused => 2,
            Self::Dead => 3,
            Self::LevelComplete => 4,
            Self::LevelReady => 5,
            Self::EnteringPortal => 6,
            Self::Exiting => 7,
            Self::Other(_) => 255,
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session statistics, owned by [`GameState`] and only reset explicitly.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Stats {
    pub score: u64,
    pub level: u32,
    pub total_deaths: u32,
    pub level_deaths: u32,
    pub pixels_collected: u32,
    pub total_pixels: u32,
    pub level_start: f64,
    pub consecutive_deaths: u32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            score: 0,
            level: 1,
            total_deaths: 0,
            level_deaths: 0,
            pixels_collected: 0,
            total_pixels: 0,
            level_start: 0.0,
            consecutive_deaths: 0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TimeScale {
    pub current: f32,
    pub target: f32,
}

impl Default for TimeScale {
    fn default() -> Self {
        Self {
            current: 1.0,
            target: 1.0,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct GameState {
    phase: GamePhase,
    stats: Stats,
    time_scale: TimeScale,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transitions by name. See [`GameState::set_phase`].
    pub fn set_state(&mut self, name: &str, now: f64) -> bool {
        self.set_phase(GamePhase::parse(name), now)
    }

    /// Moves to `phase` and runs its entry hook once. Re-entering the
    /// current phase is not a transition and returns `false`.
    pub fn set_phase(&mut self, phase: GamePhase, now: f64) -> bool {
        if phase == self.phase {
            return false;
        }
        info!("game state {} -> {}", self.phase, phase);
        self.phase = phase;

        match self.phase {
            GamePhase::Playing => self.time_scale.target = 1.0,
            GamePhase::Paused | GamePhase::LevelComplete => self.time_scale.target = 0.0,
            GamePhase::Dead => {
                self.stats.level_deaths += 1;
                self.stats.total_deaths += 1;
                self.stats.consecutive_deaths += 1;
            }
            GamePhase::LevelReady => {
                self.time_scale.target = 1.0;
                self.stats.level_start = now;
            }
            _ => {}
        }
        true
    }

    /// Eases the time-scale toward its target.
    pub fn update(&mut self, _dt: f32) {
        let ts = &mut self.time_scale;
        let gap = ts.target - ts.current;
        if gap.abs() < TIME_SCALE_EPSILON {
            ts.current = ts.target;
        } else {
            ts.current += gap * TIME_SCALE_EASE;
        }
    }

    pub fn scaled_dt(&self, dt: f32) -> f32 {
        dt * self.time_scale.current
    }

    /// Playing <-> Paused; other phases are left alone.
    pub fn toggle_pause(&mut self, now: f64) -> bool {
        match self.phase {
            GamePhase::Playing => self.set_phase(GamePhase::Paused, now),
            GamePhase::Paused => self.set_phase(GamePhase::Playing, now),
            _ => false,
        }
    }

    /// Prepares per-level statistics for `level`.
    pub fn begin_level(&mut self, level: u32, total_pixels: u32) {
        self.stats.level = level;
        self.stats.level_deaths = 0;
        self.stats.consecutive_deaths = 0;
        self.stats.pixels_collected = 0;
        self.stats.total_pixels = total_pixels;
    }

    pub fn record_pickup(&mut self, value: u32) {
        self.stats.score += u64::from(value);
        self.stats.pixels_collected += 1;
    }

    /// Back to a fresh session in the main menu.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn phase(&self) -> &GamePhase {
        &self.phase
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn time_scale(&self) -> TimeScale {
        self.time_scale
    }

    pub fn is_active(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.phase == GamePhase::Paused
    }

    pub fn is_dead(&self) -> bool {
        self.phase == GamePhase::Dead
    }

    pub fn is_level_complete(&self) -> bool {
        self.phase == GamePhase::LevelComplete
    }

    /// Seconds since the current level became ready.
    pub fn level_elapsed(&self, now: f64) -> f64 {
        (now - self.stats.level_start).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{GamePhase, GameState};
    use crate::DT;

    /// Runs updates until the time-scale settles, asserting it moves
    /// monotonically toward `target` without overshooting.
    fn settle(state: &mut GameState, target: f32) {
        let mut previous = state.time_scale().current;
        for _ in 0..200 {
            state.update(DT);
            let current = state.time_scale().current;
            assert!((target - current).abs() <= (target - previous).abs());
            if target >= previous {
                assert!(current <= target && current >= previous);
            } else {
                assert!(current >= target && current <= previous);
            }
            previous = current;
        }
        assert_eq!(state.time_scale().current, target);
    }

    #[test]
    fn pause_cycle_eases_time_scale() {
        let mut state = GameState::new();
        assert_eq!(state.phase(), &GamePhase::MainMenu);

        assert!(state.set_state("playing", 0.0));
        assert_eq!(state.time_scale().target, 1.0);
        settle(&mut state, 1.0);

        assert!(state.set_state("PAUSED", 0.0));
        assert_eq!(state.time_scale().target, 0.0);
        settle(&mut state, 0.0);
        assert_eq!(state.scaled_dt(DT), 0.0);

        assert!(state.set_state("Playing", 0.0));
        assert_eq!(state.time_scale().target, 1.0);
        settle(&mut state, 1.0);
        assert_eq!(state.scaled_dt(DT), DT);
    }

    #[test]
    fn easing_closes_ten_percent_per_update() {
        let mut state = GameState::new();
        state.set_phase(GamePhase::Playing, 0.0);
        state.set_phase(GamePhase::Paused, 0.0);
        state.update(DT);
        assert!((state.time_scale().current - 0.9).abs() < 1e-6);
    }

    #[rstest]
    #[case("MAIN_MENU", GamePhase::MainMenu)]
    #[case("levelComplete", GamePhase::LevelComplete)]
    #[case("level-ready", GamePhase::LevelReady)]
    #[case("ENTERING_PORTAL", GamePhase::EnteringPortal)]
    #[case("exiting", GamePhase::Exiting)]
    #[case("cutscene", GamePhase::Other("cutscene".to_owned()))]
    fn names_parse_case_insensitively(#[case] name: &str, #[case] expected: GamePhase) {
        assert_eq!(GamePhase::parse(name), expected);
    }

    #[test]
    fn unknown_names_pass_through() {
        let mut state = GameState::new();
        assert!(state.set_state("Cutscene", 0.0));
        assert_eq!(state.phase().as_str(), "Cutscene");
        assert!(!state.is_active());
    }

    #[test]
    fn death_counts_once_per_transition() {
        let mut state = GameState::new();
        state.set_phase(GamePhase::Playing, 0.0);
        assert!(state.set_phase(GamePhase::Dead, 0.0));
        assert!(!state.set_phase(GamePhase::Dead, 0.0));
        let stats = state.stats();
        assert_eq!(
            (stats.level_deaths, stats.total_deaths, stats.consecutive_deaths),
            (1, 1, 1)
        );
        assert!(state.is_dead());
    }

    #[test]
    fn level_ready_stamps_clock() {
        let mut state = GameState::new();
        state.set_phase(GamePhase::LevelComplete, 1.0);
        assert_eq!(state.time_scale().target, 0.0);
        state.set_phase(GamePhase::LevelReady, 12.5);
        assert_eq!(state.time_scale().target, 1.0);
        assert_eq!(state.stats().level_start, 12.5);
        assert_eq!(state.level_elapsed(14.0), 1.5);
    }

    #[test]
    fn toggle_pause_only_from_play() {
        let mut state = GameState::new();
        assert!(!state.toggle_pause(0.0));
        state.set_phase(GamePhase::Playing, 0.0);
        assert!(state.toggle_pause(0.0));
        assert!(state.is_paused());
        assert!(state.toggle_pause(0.0));
        assert!(state.is_active());
    }

    #[test]
    fn begin_level_keeps_totals() {
        let mut state = GameState::new();
        state.set_phase(GamePhase::Dead, 0.0);
        state.record_pickup(5);
        state.begin_level(2, 40);
        let stats = state.stats();
        assert_eq!(stats.level, 2);
        assert_eq!(stats.total_deaths, 1);
        assert_eq!(stats.level_deaths, 0);
        assert_eq!(stats.score, 5);
        assert_eq!(stats.pixels_collected, 0);
        assert_eq!(stats.total_pixels, 40);
    }
}
