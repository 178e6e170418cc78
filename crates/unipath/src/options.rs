//! Fixed option lists offered to the onboarding form.

use serde::Serialize;

pub const MAJOR_OPTIONS: &[&str] = &[
    "Computer Science",
    "Engineering / Technology",
    "Science",
    "Business / Commerce",
    "Arts / Humanities",
    "Medicine / Healthcare",
    "Law",
    "Other",
];

pub const FIELD_OPTIONS: &[&str] = &[
    "Computer Science / IT",
    "Engineering",
    "Business / MBA",
    "Data Science / Analytics",
    "Medicine / Public Health",
    "Arts / Design",
    "Law",
    "Other",
];

pub const COUNTRY_OPTIONS: &[&str] = &[
    "USA",
    "UK",
    "Canada",
    "Australia",
    "Germany",
    "Singapore",
    "New Zealand",
    "Ireland",
];

pub const EDUCATION_LEVELS: &[&str] = &[
    "Undergraduate",
    "Bachelor's",
    "Graduate",
    "Master's",
    "Other",
];

pub const BUDGET_RANGES: &[&str] = &[
    "0-30000",
    "30000-50000",
    "50000-70000",
    "70000+",
    "No budget limit",
];

pub const FUNDING_TYPES: &[&str] = &[
    "Scholarship-dependent",
    "Loan-dependent",
    "Self-funded",
    "Mixed funding",
];

pub const EXAM_STATUSES: &[&str] = &[
    "Not started",
    "Planned",
    "Scheduled",
    "In progress",
    "Completed",
];

pub const TASK_STATUSES: &[&str] = &["pending", "in_progress", "completed"];

/// Keywords a university's offered fields are matched against, per field of study.
pub const FIELD_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Computer Science / IT",
        &[
            "Computer Science",
            "IT",
            "Information Technology",
            "Software",
            "Data",
            "AI",
            "Machine Learning",
        ],
    ),
    (
        "Engineering",
        &[
            "Engineering",
            "Mechanical",
            "Electrical",
            "Civil",
            "Software Engineering",
        ],
    ),
    (
        "Data Science / Analytics",
        &[
            "Data Science",
            "Data Analytics",
            "Analytics",
            "Statistics",
            "Big Data",
        ],
    ),
    (
        "Business / MBA",
        &[
            "Business",
            "MBA",
            "Commerce",
            "Management",
            "Accounting",
            "Finance",
        ],
    ),
    (
        "Medicine / Public Health",
        &["Medicine", "Healthcare", "Public Health", "Nursing", "Pharmacy"],
    ),
    (
        "Arts / Design",
        &["Arts", "Design", "Humanities", "Liberal Arts", "Fine Arts"],
    ),
    ("Law", &["Law", "Legal Studies"]),
];

/// Keywords for a field of study. Unknown fields match on their own name.
pub fn field_keywords(field: &str) -> Vec<&str> {
    FIELD_CATEGORIES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(field.trim()))
        .map(|(_, keywords)| keywords.to_vec())
        .unwrap_or_else(|| vec![field.trim()])
}

/// Body of `GET /api/options`.
#[derive(Debug, Clone, Serialize)]
pub struct OptionsResponse {
    pub majors: &'static [&'static str],
    pub fields: &'static [&'static str],
    pub countries: &'static [&'static str],
    pub education_levels: &'static [&'static str],
    pub budget_ranges: &'static [&'static str],
    pub funding_types: &'static [&'static str],
    pub exam_statuses: &'static [&'static str],
    pub task_statuses: &'static [&'static str],
}

impl OptionsResponse {
    pub fn all() -> Self {
        Self {
            majors: MAJOR_OPTIONS,
            fields: FIELD_OPTIONS,
            countries: COUNTRY_OPTIONS,
            education_levels: EDUCATION_LEVELS,
            budget_ranges: BUDGET_RANGES,
            funding_types: FUNDING_TYPES,
            exam_statuses: EXAM_STATUSES,
            task_statuses: TASK_STATUSES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_keywords_known_field() {
        let keywords = field_keywords("computer science / it");
        assert!(keywords.contains(&"Software"));
    }

    #[test]
    fn test_field_keywords_unknown_field_uses_itself() {
        assert_eq!(field_keywords(" Architecture "), vec!["Architecture"]);
    }
}
