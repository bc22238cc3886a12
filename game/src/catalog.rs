use std::time::Duration;

/// Every level asks for ten avoidance taps.
pub const ROUNDS_PER_LEVEL: usize = 10;
pub const LEVEL_COUNT: u8 = 6;
pub const STARTING_LIVES: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelConfig {
    pub id: u8,
    pub time_limit_secs: u64,
    pub color_arity: usize,
    pub duplicate_mode: bool,
}

// Duplicate mode is flagged for levels 5 and 6, but the board generator only
// applies it for level 5 (see board.rs).
const LEVELS: [LevelConfig; LEVEL_COUNT as usize] = [
    LevelConfig { id: 1, time_limit_secs: 20, color_arity: 2, duplicate_mode: false },
    LevelConfig { id: 2, time_limit_secs: 15, color_arity: 2, duplicate_mode: false },
    LevelConfig { id: 3, time_limit_secs: 20, color_arity: 4, duplicate_mode: false },
    LevelConfig { id: 4, time_limit_secs: 15, color_arity: 4, duplicate_mode: false },
    LevelConfig { id: 5, time_limit_secs: 15, color_arity: 4, duplicate_mode: true },
    LevelConfig { id: 6, time_limit_secs: 5, color_arity: 4, duplicate_mode: true },
];

/// Looks up a level's configuration.
///
/// Level ids are clamped to `[1, LEVEL_COUNT]` at every state-machine entry
/// point, so an out-of-range id here is a programming error.
pub fn level_config(id: u8) -> &'static LevelConfig {
    LEVELS
        .iter()
        .find(|config| config.id == id)
        .unwrap_or_else(|| panic!("level id out of range: {id}"))
}

/// Raw time-limit table. Ids outside the catalog get the tightest budget.
pub fn time_limit(id: u8) -> Duration {
    let secs = match id {
        1 => 20,
        2 => 15,
        3 => 20,
        4 => 15,
        5 => 15,
        6 => 5,
        _ => 5,
    };
    Duration::from_secs(secs)
}

pub fn clamp_level(id: u8) -> u8 {
    id.clamp(1, LEVEL_COUNT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_covers_all_six_levels() {
        for id in 1..=LEVEL_COUNT {
            let config = level_config(id);
            assert_eq!(config.id, id);
            assert_eq!(time_limit(id), Duration::from_secs(config.time_limit_secs));
        }
    }

    #[test]
    fn arity_switches_at_level_three() {
        assert_eq!(level_config(2).color_arity, 2);
        assert_eq!(level_config(3).color_arity, 4);
    }

    #[test]
    fn duplicate_mode_is_flagged_for_the_last_two_levels() {
        assert!(!level_config(4).duplicate_mode);
        assert!(level_config(5).duplicate_mode);
        assert!(level_config(6).duplicate_mode);
    }

    #[test]
    fn unknown_ids_fall_back_to_the_tightest_budget() {
        assert_eq!(time_limit(0), Duration::from_secs(5));
        assert_eq!(time_limit(9), Duration::from_secs(5));
    }

    #[test]
    fn clamp_keeps_ids_in_catalog_range() {
        assert_eq!(clamp_level(0), 1);
        assert_eq!(clamp_level(4), 4);
        assert_eq!(clamp_level(9), LEVEL_COUNT);
    }

    #[test]
    #[should_panic(expected = "level id out of range")]
    fn out_of_range_config_lookup_panics() {
        level_config(7);
    }
}
