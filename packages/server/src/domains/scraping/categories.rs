//! Sports, stat categories and source URL construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    Basketball,
    Football,
}

impl Sport {
    pub const ALL: [Sport; 2] = [Sport::Basketball, Sport::Football];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Basketball => "basketball",
            Sport::Football => "football",
        }
    }

    /// Division segment of the stats site path.
    fn path_prefix(&self) -> &'static str {
        match self {
            Sport::Basketball => "basketball-men/d1",
            Sport::Football => "football/fbs",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basketball" => Ok(Sport::Basketball),
            "football" => Ok(Sport::Football),
            other => Err(format!("Unknown sport: {}", other)),
        }
    }
}

/// A stat category page. Ordering follows the scrape order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Scoring,
    Rebounding,
    Assists,
    Steals,
    Blocks,
    Passing,
    Rushing,
    Receiving,
    TotalOffense,
}

const BASKETBALL_CATEGORIES: &[Category] = &[
    Category::Scoring,
    Category::Rebounding,
    Category::Assists,
    Category::Steals,
    Category::Blocks,
];

const FOOTBALL_CATEGORIES: &[Category] = &[
    Category::Passing,
    Category::Rushing,
    Category::Receiving,
    Category::TotalOffense,
    Category::Scoring,
];

impl Category {
    /// Fixed category list for a sport, in scrape order.
    pub fn for_sport(sport: Sport) -> &'static [Category] {
        match sport {
            Sport::Basketball => BASKETBALL_CATEGORIES,
            Sport::Football => FOOTBALL_CATEGORIES,
        }
    }

    /// Path segment used by the stats site.
    pub fn slug(&self) -> &'static str {
        match self {
            Category::Scoring => "scoring",
            Category::Rebounding => "rebounding",
            Category::Assists => "assists",
            Category::Steals => "steals",
            Category::Blocks => "blocks",
            Category::Passing => "passing",
            Category::Rushing => "rushing",
            Category::Receiving => "receiving",
            Category::TotalOffense => "total-offense",
        }
    }

    /// `{base}/{sport path}/{category}/{season}`
    pub fn source_url(&self, base: &str, sport: Sport, season: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            base.trim_end_matches('/'),
            sport.path_prefix(),
            self.slug(),
            season
        )
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        BASKETBALL_CATEGORIES
            .iter()
            .chain(FOOTBALL_CATEGORIES)
            .find(|c| c.slug() == wanted)
            .copied()
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}
