//! Safe/Target/Dream categorization and acceptance estimation.
//!
//! Categories come from cost against the profile's budget ceiling:
//!
//! | cost                      | category |
//! |---------------------------|----------|
//! | `cost <= budget`          | Safe     |
//! | `cost <= budget * 1.2`    | Target   |
//! | otherwise                 | Dream    |
//!
//! Without a ceiling the category falls back to acceptance likelihood.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::models::{Category, Difficulty, Likelihood, Risk, University};
use crate::options::field_keywords;
use crate::profile::Profile;

static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid regex"));

/// Categorize a university by cost. `cost <= budget * 1.2` is evaluated in
/// integers so the threshold is exact.
pub fn categorize(cost: i64, budget: i64) -> Category {
    if cost <= budget {
        Category::Safe
    } else if cost.saturating_mul(10) <= budget.saturating_mul(12) {
        Category::Target
    } else {
        Category::Dream
    }
}

/// Parse the budget ceiling out of a budget range option.
///
/// `a-b` yields `b`, a bare number yields itself. Open-ended ranges
/// (`70000+`), "No budget limit" and anything unparseable have no ceiling.
pub fn budget_ceiling(range: Option<&str>) -> Option<i64> {
    let range = range?.trim();
    if range.is_empty() || range.ends_with('+') {
        return None;
    }

    let upper = match range.split_once('-') {
        Some((_, upper)) => upper,
        None => range,
    };
    let digits: String = upper
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | ' ' | '_'))
        .collect();
    digits.parse::<i64>().ok().filter(|v| *v > 0)
}

/// Academic score as a percentage.
///
/// Values up to 4 are read as a 4-point GPA and values up to 10 as a 10-point
/// GPA, unless the text carries a `%`. Anything larger is a percentage.
pub fn academic_percentage(raw: &str) -> Option<f64> {
    let value: f64 = NUMBER.find(raw)?.as_str().parse().ok()?;
    let pct = if raw.contains('%') || value > 10.0 {
        value
    } else if value <= 4.0 {
        value / 4.0 * 100.0
    } else {
        value * 10.0
    };
    Some(pct.clamp(0.0, 100.0))
}

fn words(s: &str) -> Vec<String> {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn contains_phrase(haystack: &str, needle: &str) -> bool {
    let hay = words(haystack);
    let needle = words(needle);
    !needle.is_empty() && hay.windows(needle.len()).any(|w| w == needle.as_slice())
}

/// Whether the university offers something matching a field of study.
pub fn offers_field(university: &University, field: &str) -> bool {
    let keywords = field_keywords(field);
    university
        .fields
        .iter()
        .any(|offered| keywords.iter().any(|kw| contains_phrase(offered, kw)))
}

fn is_completed(status: Option<&str>) -> bool {
    status.is_some_and(|s| s.trim().eq_ignore_ascii_case("completed"))
}

/// Acceptance estimate for one university.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Acceptance {
    pub score: i32,
    pub likelihood: Likelihood,
    pub risk: Risk,
    pub field_match: bool,
}

/// Estimate acceptance likelihood for a profile at a university.
pub fn acceptance(profile: &Profile, university: &University) -> Acceptance {
    let mut score = match university.difficulty {
        Difficulty::Low => 2,
        Difficulty::Medium => 0,
        Difficulty::High => -2,
    };

    if let Some(pct) = profile.academic_score.as_deref().and_then(academic_percentage) {
        score += if pct >= 85.0 {
            2
        } else if pct >= 70.0 {
            1
        } else if pct < 55.0 {
            -1
        } else {
            0
        };
    }

    if is_completed(profile.ielts_status.as_deref()) {
        score += 1;
    }
    if is_completed(profile.gre_status.as_deref()) {
        score += 1;
    }

    let field_match = profile
        .field
        .as_deref()
        .filter(|f| !f.trim().is_empty())
        .is_some_and(|f| offers_field(university, f));
    if field_match {
        score += 1;
    }

    let (likelihood, risk) = if score >= 3 {
        (Likelihood::High, Risk::Low)
    } else if score >= 1 {
        (Likelihood::Medium, Risk::Medium)
    } else {
        (Likelihood::Low, Risk::High)
    };

    Acceptance {
        score,
        likelihood,
        risk,
        field_match,
    }
}

/// A university annotated with its category and acceptance estimate.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendedUniversity {
    #[serde(flatten)]
    pub university: University,
    pub category: Category,
    pub acceptance_likelihood: Likelihood,
    pub risk_level: Risk,
    pub field_match: bool,
}

/// Recommendations grouped by category, each list cheapest first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Recommendations {
    pub dream: Vec<RecommendedUniversity>,
    pub target: Vec<RecommendedUniversity>,
    pub safe: Vec<RecommendedUniversity>,
    pub budget_ceiling: Option<i64>,
}

impl Recommendations {
    pub fn iter(&self) -> impl Iterator<Item = &RecommendedUniversity> {
        self.dream.iter().chain(&self.target).chain(&self.safe)
    }

    pub fn get(&self, university_id: i64) -> Option<&RecommendedUniversity> {
        self.iter().find(|r| r.university.id == university_id)
    }

    pub fn category_of(&self, university_id: i64) -> Option<Category> {
        self.get(university_id).map(|r| r.category)
    }

    pub fn total(&self) -> usize {
        self.dream.len() + self.target.len() + self.safe.len()
    }

    /// IDs per bucket, the compact form handed to counsellor models.
    pub fn ids(&self) -> serde_json::Value {
        let ids = |list: &[RecommendedUniversity]| {
            list.iter().map(|r| r.university.id).collect::<Vec<_>>()
        };
        serde_json::json!({
            "dream": ids(&self.dream),
            "target": ids(&self.target),
            "safe": ids(&self.safe),
        })
    }
}

fn bucket(ceiling: Option<i64>, cost: i64, likelihood: Likelihood) -> Category {
    match ceiling {
        Some(budget) => categorize(cost, budget),
        None => match likelihood {
            Likelihood::High => Category::Safe,
            Likelihood::Medium => Category::Target,
            Likelihood::Low => Category::Dream,
        },
    }
}

/// Category of a single university for a profile, as [`recommend`] would assign it.
pub fn category_for(profile: &Profile, university: &University) -> Category {
    bucket(
        budget_ceiling(profile.budget_range.as_deref()),
        university.avg_cost,
        acceptance(profile, university).likelihood,
    )
}

/// Bucket every university for a profile.
pub fn recommend(profile: &Profile, universities: Vec<University>) -> Recommendations {
    let ceiling = budget_ceiling(profile.budget_range.as_deref());
    let mut out = Recommendations {
        budget_ceiling: ceiling,
        ..Default::default()
    };

    for university in universities {
        let acc = acceptance(profile, &university);
        let category = bucket(ceiling, university.avg_cost, acc.likelihood);

        let entry = RecommendedUniversity {
            university,
            category,
            acceptance_likelihood: acc.likelihood,
            risk_level: acc.risk,
            field_match: acc.field_match,
        };
        match category {
            Category::Dream => out.dream.push(entry),
            Category::Target => out.target.push(entry),
            Category::Safe => out.safe.push(entry),
        }
    }

    for list in [&mut out.dream, &mut out.target, &mut out.safe] {
        list.sort_by(|a, b| {
            a.university
                .avg_cost
                .cmp(&b.university.avg_cost)
                .then_with(|| a.university.name.cmp(&b.university.name))
        });
    }

    out
}
