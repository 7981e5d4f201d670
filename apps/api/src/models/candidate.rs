use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A candidate as supplied by the profile-management side of the portal.
/// Read-only input to every scorer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    /// Full resume text, forwarded to the AI matcher when present.
    #[serde(default)]
    pub resume_text: Option<String>,
}

/// One employment entry. When `current` is set, `end_date` is ignored and
/// the entry is treated as ending at evaluation time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExperienceEntry {
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
}

impl ExperienceEntry {
    /// The date this entry ends at, with `today` standing in for current roles.
    pub fn effective_end(&self, today: NaiveDate) -> Option<NaiveDate> {
        if self.current {
            Some(today)
        } else {
            self.end_date
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub field: String,
    /// Free-text date range as entered by the candidate ("2014 - 2018").
    #[serde(default)]
    pub dates: Option<String>,
}
