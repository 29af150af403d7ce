use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The host's light/dark flag. Every themed color the engine draws is derived
/// from it.
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Opaque page color the backdrop sits on
    pub fn background(self) -> [u8; 3] {
        match self {
            Self::Light => [0xf4, 0xf4, 0xf6],
            Self::Dark => [0x0b, 0x0d, 0x12],
        }
    }

    /// Default hex outline color, `[r, g, b, a]`
    pub fn grid_color(self) -> [u8; 4] {
        match self {
            Self::Light => [0, 0, 0, 15],
            Self::Dark => [255, 255, 255, 15],
        }
    }

    /// Dim doodle tint. The dark theme needs twice the alpha for the same
    /// apparent contrast.
    pub fn base_tint(self) -> [u8; 4] {
        match self {
            Self::Light => [0, 0, 0, 13],
            Self::Dark => [255, 255, 255, 26],
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(format!("No theme named {}", s)),
        }
    }
}

impl From<dark_light::Mode> for Theme {
    fn from(mode: dark_light::Mode) -> Self {
        match mode {
            dark_light::Mode::Dark => Self::Dark,
            dark_light::Mode::Light | dark_light::Mode::Default => Self::Light,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_round_trips() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
    }

    #[test]
    fn test_parse() {
        assert_eq!("Dark".parse::<Theme>(), Ok(Theme::Dark));
        assert_eq!("light".parse::<Theme>(), Ok(Theme::Light));
        assert!("sepia".parse::<Theme>().is_err());
    }

    #[test]
    fn test_dark_base_tint_is_brighter() {
        assert!(Theme::Dark.base_tint()[3] > Theme::Light.base_tint()[3]);
    }
}
