//! Model abstraction and provider selection.

use async_trait::async_trait;
use std::sync::Arc;

use super::config::{CounsellorConfig, Provider};
use super::context::CounsellorContext;
use super::error::{CounsellorError, CounsellorResult};
use super::gemini::GeminiModel;
use super::models::Plan;
use super::rules::RuleBasedModel;

/// Something that can turn a message and its context into a plan.
#[async_trait]
pub trait CounsellorModel: Send + Sync {
    /// Short identifier reported in responses and logs.
    fn name(&self) -> &str;

    async fn plan(&self, context: &CounsellorContext) -> CounsellorResult<Plan>;
}

/// Build the configured model.
pub fn build_model(config: &CounsellorConfig) -> CounsellorResult<Arc<dyn CounsellorModel>> {
    match config.provider {
        Provider::Rules => Ok(Arc::new(RuleBasedModel)),
        Provider::Gemini => {
            let api_key = config.resolve_api_key().ok_or_else(|| {
                CounsellorError::NotConfigured(
                    "counsellor.api_key is required for the gemini provider".to_string(),
                )
            })?;
            Ok(Arc::new(GeminiModel::new(config, api_key)?))
        }
    }
}
