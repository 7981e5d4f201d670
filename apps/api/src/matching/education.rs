#![allow(dead_code)]

//! Education Level Resolver: highest attained level across a candidate's
//! education entries, found by keyword search over the degree text.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::candidate::EducationEntry;

/// Ordinal education scale. Declaration order is rank order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    #[default]
    None,
    HighSchool,
    Associate,
    Bachelor,
    Master,
    Doctorate,
}

impl EducationLevel {
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Display label; empty for `None`.
    pub fn label(self) -> &'static str {
        match self {
            EducationLevel::None => "",
            EducationLevel::HighSchool => "High school",
            EducationLevel::Associate => "Associate",
            EducationLevel::Bachelor => "Bachelor",
            EducationLevel::Master => "Master",
            EducationLevel::Doctorate => "Doctorate",
        }
    }
}

impl fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lower-case keywords searched for in the degree field.
const DEGREE_KEYWORDS: &[(&str, EducationLevel)] = &[
    ("high school", EducationLevel::HighSchool),
    ("associate", EducationLevel::Associate),
    ("bachelor", EducationLevel::Bachelor),
    ("undergraduate", EducationLevel::Bachelor),
    ("master", EducationLevel::Master),
    ("mba", EducationLevel::Master),
    ("doctorate", EducationLevel::Doctorate),
    ("phd", EducationLevel::Doctorate),
    ("ph.d", EducationLevel::Doctorate),
];

/// Highest level matched by any keyword in any entry. Rank decides, not
/// keyword or entry order.
pub fn highest_education_level(entries: &[EducationEntry]) -> EducationLevel {
    entries
        .iter()
        .map(|entry| degree_level(&entry.degree))
        .max()
        .unwrap_or_default()
}

fn degree_level(degree: &str) -> EducationLevel {
    let degree = degree.to_lowercase();
    DEGREE_KEYWORDS
        .iter()
        .filter(|(keyword, _)| degree.contains(keyword))
        .map(|(_, level)| *level)
        .max()
        .unwrap_or_default()
}
