use crate::error::{Error, ErrorKind};
use std::str::FromStr;

/// Ruleset a beatmap is played with.
///
/// The discriminant is the on-disk identifier (`Mode:` in `[General]`, and the
/// single byte written by the portable collection format).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum GameMode {
    #[default]
    Standard = 0,
    Taiko = 1,
    Catch = 2,
    Mania = 3,
}
impl GameMode {
    pub fn id(&self) -> u8 {
        *self as u8
    }
}
impl TryFrom<u8> for GameMode {
    type Error = Error;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Standard,
            1 => Self::Taiko,
            2 => Self::Catch,
            3 => Self::Mania,
            _ => exn::bail!(ErrorKind::ParseError {
                field: "mode",
                value: value.to_string(),
            }),
        })
    }
}
impl FromStr for GameMode {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<u8>() {
            Ok(id) => Self::try_from(id),
            Err(_) => exn::bail!(ErrorKind::ParseError {
                field: "mode",
                value: s.to_string(),
            }),
        }
    }
}
