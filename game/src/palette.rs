use serde::{Deserialize, Serialize};

/// The fixed button palette, in the order sequences and boards draw from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorToken {
    Blue,
    Green,
    Yellow,
    Red,
}

impl ColorToken {
    pub const ALL: [ColorToken; 4] = [
        ColorToken::Blue,
        ColorToken::Green,
        ColorToken::Yellow,
        ColorToken::Red,
    ];

    /// Display value button hosts render.
    pub fn hex(self) -> &'static str {
        match self {
            ColorToken::Blue => "#2962ff",
            ColorToken::Green => "#2e7d32",
            ColorToken::Yellow => "#f9a825",
            ColorToken::Red => "#d50000",
        }
    }

    /// Name the announcer reads out.
    pub fn spoken_name(self) -> &'static str {
        match self {
            ColorToken::Blue => "blue",
            ColorToken::Green => "green",
            ColorToken::Yellow => "yellow",
            ColorToken::Red => "red",
        }
    }
}

/// Palette subset a level draws from: the first two colors for levels 1-2,
/// the full palette from level 3 on.
pub fn palette_for_level(level: u8) -> &'static [ColorToken] {
    if level <= 2 {
        &ColorToken::ALL[..2]
    } else {
        &ColorToken::ALL[..]
    }
}
