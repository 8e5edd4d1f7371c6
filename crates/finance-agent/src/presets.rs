//! Built-in industry groups for comparisons

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named group of tickers from one industry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    TechGiants,
    Semiconductors,
    Automotive,
    Banking,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::TechGiants,
        Preset::Semiconductors,
        Preset::Automotive,
        Preset::Banking,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::TechGiants => "Tech Giants",
            Preset::Semiconductors => "Semiconductors",
            Preset::Automotive => "Automotive",
            Preset::Banking => "Banking",
        }
    }

    pub fn symbols(self) -> &'static [&'static str] {
        match self {
            Preset::TechGiants => &["AAPL", "MSFT", "GOOGL", "AMZN"],
            Preset::Semiconductors => &["NVDA", "AMD", "INTC", "TSM"],
            Preset::Automotive => &["TSLA", "F", "GM", "TM"],
            Preset::Banking => &["JPM", "BAC", "C", "WFC"],
        }
    }

    /// Command-line spelling, e.g. `tech-giants`
    pub fn slug(self) -> &'static str {
        match self {
            Preset::TechGiants => "tech-giants",
            Preset::Semiconductors => "semiconductors",
            Preset::Automotive => "automotive",
            Preset::Banking => "banking",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
