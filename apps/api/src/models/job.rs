use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// An open vacancy as supplied by the vacancy-management side of the portal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobRequirement {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    /// Years of experience required. 0 means no requirement.
    #[serde(default)]
    pub experience_required: f64,
}

impl JobRequirement {
    /// Rejects jobs the scorers cannot reason about. Called at the service
    /// boundary before any scoring happens.
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.experience_required.is_finite() || self.experience_required < 0.0 {
            return Err(AppError::Validation(format!(
                "experience_required must be a non-negative number, got {}",
                self.experience_required
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_experience_is_valid() {
        let job = JobRequirement::default();
        assert!(job.validate().is_ok());
    }

    #[test]
    fn test_negative_experience_is_rejected() {
        let job = JobRequirement {
            experience_required: -1.0,
            ..Default::default()
        };
        assert!(matches!(job.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_nan_experience_is_rejected() {
        let job = JobRequirement {
            experience_required: f64::NAN,
            ..Default::default()
        };
        assert!(job.validate().is_err());
    }
}
