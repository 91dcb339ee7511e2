use std::future::Future;

use anyhow::{anyhow, Result};

use crate::models::ai::*;
use crate::utils::http::{body_excerpt, build_ai_client};

/// 查询层对外的唯一调用
///
/// `GeminiClient` 为正式实现，测试中替换为固定回复
pub trait ContentGenerator {
    fn generate(&self, payload: &PromptPayload) -> impl Future<Output = Result<ModelReply>> + Send;
}

/// Gemini `generateContent` 客户端（启用 Google Search grounding）
/// 启动时创建一次，保存在 AppState 中
pub struct GeminiClient {
    client: reqwest::Client,
    config: AIConfig,
}

impl GeminiClient {
    pub fn new(config: AIConfig) -> Result<Self> {
        let client = build_ai_client(config.timeout_secs)?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        let model = self.config.model_name.trim_start_matches("models/");
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(model)
        )
    }

    pub async fn generate_content(
        &self,
        payload: &PromptPayload,
    ) -> Result<GenerateContentResponse> {
        let req = GenerateContentRequest::search_grounded(payload, self.config.temperature);

        log::info!("Gemini request: model={}", self.config.model_name);
        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&req)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(anyhow!("Gemini API error ({}): {}", status, body_excerpt(&body, 500)));
        }

        let response: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            anyhow!(
                "Gemini response parse error: {} body: {}",
                e,
                body_excerpt(&body, 200)
            )
        })?;

        if let Some(usage) = &response.usage_metadata {
            log::info!(
                "Gemini usage: prompt={} candidates={} total={}",
                usage.prompt_token_count,
                usage.candidates_token_count,
                usage.total_token_count
            );
        }
        if let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            log::warn!("Gemini blocked the prompt: {}", reason);
        }
        if let Some(candidate) = response.candidates.first() {
            log::debug!(
                "Gemini finish_reason={:?} search_queries={:?}",
                candidate.finish_reason,
                candidate
                    .grounding_metadata
                    .as_ref()
                    .map(|m| &m.web_search_queries)
            );
        }

        Ok(response)
    }
}

impl ContentGenerator for GeminiClient {
    async fn generate(&self, payload: &PromptPayload) -> Result<ModelReply> {
        let reply = self.generate_content(payload).await?.into_reply();
        log::info!(
            "Gemini reply: {} chars, {} grounding chunks",
            reply.text.as_deref().map_or(0, str::len),
            reply.grounding_urls.len()
        );
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str, model: &str) -> GeminiClient {
        GeminiClient::new(AIConfig {
            base_url: base_url.to_string(),
            model_name: model.to_string(),
            api_key: "k".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_default() {
        let c = client(DEFAULT_BASE_URL, DEFAULT_MODEL);
        assert_eq!(
            c.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_endpoint_trims_slash_and_model_prefix() {
        let c = client("http://localhost:8080/v1beta/", "models/gemini-2.0-flash");
        assert_eq!(
            c.endpoint(),
            "http://localhost:8080/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        // 端口 9 (discard) 上没有 HTTP 服务
        let c = client("http://127.0.0.1:9/v1beta", DEFAULT_MODEL);
        let payload = PromptPayload {
            system_instruction: "s".to_string(),
            prompt: "p".to_string(),
        };
        assert!(c.generate(&payload).await.is_err());
    }
}
