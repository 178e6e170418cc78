//! Everything a model may look at when planning.

use serde_json::json;

use crate::catalog::Recommendations;
use crate::profile::Profile;
use crate::stage::StageInfo;

#[derive(Debug, Clone)]
pub struct CounsellorContext {
    pub message: String,
    pub stage: StageInfo,
    pub profile: Profile,
    pub recommendations: Recommendations,
}

impl CounsellorContext {
    /// Profile fields a model is allowed to see.
    pub fn sanitized_profile(&self) -> serde_json::Value {
        let p = &self.profile;
        json!({
            "education_level": p.education_level,
            "major": p.major,
            "academic_score": p.academic_score,
            "target_degree": p.target_degree,
            "field": p.field,
            "countries": p.countries,
            "budget_range": p.budget_range,
            "funding_type": p.funding_type,
            "ielts_status": p.ielts_status,
            "gre_status": p.gre_status,
            "sop_status": p.sop_status,
        })
    }

    /// Prompt for remote language models.
    pub fn prompt(&self) -> String {
        let recommendations =
            serde_json::to_string(&self.recommendations).unwrap_or_else(|_| "{}".to_string());

        format!(
            r#"You are an AI Counsellor for a study-abroad platform.

Rules:
- You must NOT invent universities or data.
- You must ONLY use the data provided.
- You must return VALID JSON only (no markdown).

Allowed actions:
- shortlist (requires university_id, optional category Dream|Target|Safe)
- lock (requires university_id)
- create_task (requires title, optional stage)
- generate_tasks (no fields)

User stage: {stage}
Stage name: {stage_name}

User profile (sanitized):
{profile}

Available university recommendations (use only these):
{recommendations}

User message:
{message}

Return JSON in this exact format:
{{
  "intent": "recommend_universities|shortlist_university|lock_university|create_tasks|general_help",
  "explanation": "...",
  "recommendations": {{"dream": [ids], "target": [ids], "safe": [ids]}},
  "actions": [
    {{"type": "shortlist", "university_id": 1, "category": "Dream"}},
    {{"type": "lock", "university_id": 1}},
    {{"type": "create_task", "title": "Draft SOP", "stage": "STAGE_4_APPLICATION"}},
    {{"type": "generate_tasks"}}
  ]
}}"#,
            stage = self.stage.current_stage,
            stage_name = self.stage.display_name,
            profile = self.sanitized_profile(),
            message = self.message.trim(),
        )
    }
}
