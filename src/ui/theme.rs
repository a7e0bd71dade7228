use std::collections::BTreeMap;
use std::fs;
use std::str::FromStr;

use ratatui::style::Color;
use rust_embed::Embed;
use serde::Deserialize;
use tierdrill::config::Config;
use tracing::warn;

#[derive(Embed)]
#[folder = "assets/themes/"]
struct ThemeAssets;

const DEFAULT_THEME: &str = "catppuccin-mocha";

macro_rules! palette {
    ($($(#[$doc:meta])* $role:ident = $r:literal, $g:literal, $b:literal;)*) => {
        /// Colours by the role they play on screen.
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub struct Palette {
            $($(#[$doc])* pub $role: Color,)*
        }

        impl Default for Palette {
            fn default() -> Self {
                Self { $($role: Color::Rgb($r, $g, $b),)* }
            }
        }

        impl Palette {
            fn set(&mut self, role: &str, color: Color) -> bool {
                match role {
                    $(stringify!($role) => self.$role = color,)*
                    _ => return false,
                }
                true
            }
        }
    };
}

palette! {
    background = 0x1e, 0x1e, 0x2e;
    text = 0xcd, 0xd6, 0xf4;
    /// Labels, hints and anything not yet reached.
    muted = 0x58, 0x5b, 0x70;

    typed_ok = 0xa6, 0xe3, 0xa1;
    typed_miss = 0xf3, 0x8b, 0xa8;
    typed_miss_bg = 0x45, 0x27, 0x3a;
    caret_fg = 0x1e, 0x1e, 0x2e;
    caret_bg = 0xf5, 0xe0, 0xdc;

    title_fg = 0xcd, 0xd6, 0xf4;
    title_bg = 0x31, 0x32, 0x44;
    frame = 0x45, 0x47, 0x5a;
    /// Border of the panel that takes input.
    frame_active = 0x89, 0xb4, 0xfa;
    /// Cursor row in lists and key hints.
    selection = 0x89, 0xb4, 0xfa;

    tier_locked = 0x58, 0x5b, 0x70;
    tier_open = 0xcd, 0xd6, 0xf4;
    tier_done = 0xa6, 0xe3, 0xa1;
    meter_fill = 0x89, 0xb4, 0xfa;
    meter_track = 0x31, 0x32, 0x44;

    /// Speed figures.
    speed = 0x89, 0xb4, 0xfa;
    streak = 0xf9, 0xe2, 0xaf;
    good = 0xa6, 0xe3, 0xa1;
    fair = 0xf9, 0xe2, 0xaf;
    poor = 0xf3, 0x8b, 0xa8;
}

impl Palette {
    /// Colour for an accuracy percentage.
    pub fn accuracy(&self, accuracy: f64) -> Color {
        if accuracy >= 95.0 {
            self.good
        } else if accuracy >= 85.0 {
            self.fair
        } else {
            self.poor
        }
    }
}

/// On-disk form. Roles left out keep their default colour.
#[derive(Deserialize)]
struct ThemeFile {
    name: String,
    #[serde(default)]
    palette: BTreeMap<String, String>,
}

#[derive(Clone, Debug)]
pub struct Theme {
    pub name: String,
    pub palette: Palette,
}

impl Theme {
    /// User themes in `<config dir>/tierdrill/themes/` shadow bundled ones.
    pub fn load(name: &str) -> Option<Self> {
        let filename = format!("{name}.toml");

        let user_path = Config::config_dir().join("themes").join(&filename);
        if let Ok(content) = fs::read_to_string(&user_path) {
            match Self::parse(&content) {
                Ok(theme) => return Some(theme),
                Err(e) => warn!(path = %user_path.display(), error = %e, "ignoring malformed theme"),
            }
        }

        let file = ThemeAssets::get(&filename)?;
        let content = std::str::from_utf8(file.data.as_ref()).ok()?;
        Self::parse(content).ok()
    }

    /// Unknown roles and unparsable colours are logged and skipped.
    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        let file: ThemeFile = toml::from_str(content)?;
        let mut palette = Palette::default();
        for (role, value) in &file.palette {
            match Color::from_str(value) {
                Ok(color) => {
                    if !palette.set(role, color) {
                        warn!(theme = %file.name, role, "unknown palette role");
                    }
                }
                Err(_) => warn!(theme = %file.name, role, value, "unparsable colour"),
            }
        }
        Ok(Self {
            name: file.name,
            palette,
        })
    }

    pub fn available_themes() -> Vec<String> {
        ThemeAssets::iter()
            .filter_map(|f| f.strip_suffix(".toml").map(str::to_string))
            .collect()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::load(DEFAULT_THEME).unwrap_or_else(|| Self {
            name: DEFAULT_THEME.to_string(),
            palette: Palette::default(),
        })
    }
}
