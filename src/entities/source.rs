// Source Entity - where a saved amount is kept
//
// The set of sources is closed: every entry points at exactly one of these.
// Display attributes (label, color) live in `crate::display`, not here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// SOURCE
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Brokerage account at Bank Apoalim
    #[default]
    ApoalimStocks,

    /// Crypto exchange
    Binance,

    /// Kupat gemel le-hashkaa (investment pension fund)
    KupatGemel,

    /// USD currency account at Bank Apoalim
    ApoalimUsd,
}

impl Source {
    /// Every source, in picker order
    pub const ALL: [Source; 4] = [
        Source::ApoalimStocks,
        Source::Binance,
        Source::KupatGemel,
        Source::ApoalimUsd,
    ];

    /// Stable key used in the database and in config files
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::ApoalimStocks => "apoalim_stocks",
            Source::Binance => "binance",
            Source::KupatGemel => "kupat_gemel",
            Source::ApoalimUsd => "apoalim_usd",
        }
    }

    /// Position in `Source::ALL`
    pub fn index(&self) -> usize {
        match self {
            Source::ApoalimStocks => 0,
            Source::Binance => 1,
            Source::KupatGemel => 2,
            Source::ApoalimUsd => 3,
        }
    }

    /// Next source in picker order (wraps)
    pub fn next(&self) -> Self {
        Source::ALL[(self.index() + 1) % Source::ALL.len()]
    }

    /// Previous source in picker order (wraps)
    pub fn previous(&self) -> Self {
        Source::ALL[(self.index() + Source::ALL.len() - 1) % Source::ALL.len()]
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSource(pub String);

impl fmt::Display for UnknownSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown money source '{}'", self.0)
    }
}

impl std::error::Error for UnknownSource {}

impl FromStr for Source {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Source::ALL
            .iter()
            .copied()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| UnknownSource(s.to_string()))
    }
}
