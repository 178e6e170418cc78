//! Profile data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::stage::Stage;

/// A user's study profile, created when onboarding completes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    #[serde(skip_serializing)]
    pub user_id: String,
    pub education_level: Option<String>,
    pub major: Option<String>,
    pub graduation_year: Option<i64>,
    /// Free text: GPA ("3.6/4", "8.2 CGPA") or percentage ("78%").
    pub academic_score: Option<String>,
    pub target_degree: Option<String>,
    pub field: Option<String>,
    pub intake_year: Option<i64>,
    pub countries: Vec<String>,
    pub budget_range: Option<String>,
    pub funding_type: Option<String>,
    pub ielts_status: Option<String>,
    pub gre_status: Option<String>,
    pub sop_status: Option<String>,
}

impl Profile {
    /// Profile with every field unset.
    pub fn empty(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            education_level: None,
            major: None,
            graduation_year: None,
            academic_score: None,
            target_degree: None,
            field: None,
            intake_year: None,
            countries: Vec::new(),
            budget_range: None,
            funding_type: None,
            ielts_status: None,
            gre_status: None,
            sop_status: None,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct ProfileRow {
    pub user_id: String,
    pub education_level: Option<String>,
    pub major: Option<String>,
    pub graduation_year: Option<i64>,
    pub academic_score: Option<String>,
    pub target_degree: Option<String>,
    pub field: Option<String>,
    pub intake_year: Option<i64>,
    pub countries: Option<String>,
    pub budget_range: Option<String>,
    pub funding_type: Option<String>,
    pub ielts_status: Option<String>,
    pub gre_status: Option<String>,
    pub sop_status: Option<String>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            user_id: row.user_id,
            education_level: row.education_level,
            major: row.major,
            graduation_year: row.graduation_year,
            academic_score: row.academic_score,
            target_degree: row.target_degree,
            field: row.field,
            intake_year: row.intake_year,
            countries: row
                .countries
                .as_deref()
                .and_then(|c| serde_json::from_str(c).ok())
                .unwrap_or_default(),
            budget_range: row.budget_range,
            funding_type: row.funding_type,
            ielts_status: row.ielts_status,
            gre_status: row.gre_status,
            sop_status: row.sop_status,
        }
    }
}

/// Body of `POST /api/onboarding` and `PATCH /api/onboarding`.
///
/// On completion every field is written as given; on update only the
/// provided fields change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileRequest {
    pub education_level: Option<String>,
    pub major: Option<String>,
    pub graduation_year: Option<i64>,
    pub academic_score: Option<String>,
    pub target_degree: Option<String>,
    pub field: Option<String>,
    pub intake_year: Option<i64>,
    pub countries: Option<Vec<String>>,
    pub budget_range: Option<String>,
    pub funding_type: Option<String>,
    pub ielts_status: Option<String>,
    pub gre_status: Option<String>,
    pub sop_status: Option<String>,
}

impl ProfileRequest {
    /// Build a complete profile from the request.
    pub fn into_profile(self, user_id: &str) -> Profile {
        let mut profile = Profile::empty(user_id);
        self.apply_to(&mut profile);
        profile
    }

    /// Overwrite the fields that are present in the request.
    pub fn apply_to(self, profile: &mut Profile) {
        macro_rules! set {
            ($($field:ident),*) => {
                $(if let Some(value) = self.$field {
                    profile.$field = Some(value);
                })*
            };
        }
        set!(
            education_level,
            major,
            graduation_year,
            academic_score,
            target_degree,
            field,
            intake_year,
            budget_range,
            funding_type,
            ielts_status,
            gre_status,
            sop_status
        );
        if let Some(countries) = self.countries {
            profile.countries = countries.into_iter().map(|c| c.trim().to_string()).collect();
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OnboardingResponse {
    pub message: String,
    pub onboarding_completed: bool,
    pub current_stage: Stage,
    pub stage_name: &'static str,
}

/// Short profile view for the onboarding status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileBrief {
    pub education_level: Option<String>,
    pub major: Option<String>,
    pub target_degree: Option<String>,
    pub field: Option<String>,
}

impl From<&Profile> for ProfileBrief {
    fn from(p: &Profile) -> Self {
        Self {
            education_level: p.education_level.clone(),
            major: p.major.clone(),
            target_degree: p.target_degree.clone(),
            field: p.field.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OnboardingStatus {
    pub onboarding_completed: bool,
    pub has_profile: bool,
    pub profile: Option<ProfileBrief>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_only_changes_present_fields() {
        let mut profile = ProfileRequest {
            major: Some("Law".into()),
            budget_range: Some("0-30000".into()),
            countries: Some(vec![" UK ".into()]),
            ..Default::default()
        }
        .into_profile("u1");
        assert_eq!(profile.countries, vec!["UK".to_string()]);

        ProfileRequest {
            budget_range: Some("70000+".into()),
            ..Default::default()
        }
        .apply_to(&mut profile);

        assert_eq!(profile.major.as_deref(), Some("Law"));
        assert_eq!(profile.budget_range.as_deref(), Some("70000+"));
        assert_eq!(profile.countries, vec!["UK".to_string()]);
    }

    #[test]
    fn test_serialized_profile_hides_user_id() {
        let json = serde_json::to_value(Profile::empty("secret")).unwrap();
        assert!(json.get("user_id").is_none());
        assert_eq!(json["countries"], serde_json::json!([]));
    }
}
