use crate::domain::model::UpstreamCredentials;
use crate::utils::error::Result;
use async_trait::async_trait;
use url::Url;

/// 對上游 REST API 的 GET 呼叫
///
/// 實作必須把非 2xx 的回應當成錯誤，並把回應內容解析為 JSON。
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn get_json(
        &self,
        url: &Url,
        query: &[(String, String)],
        credentials: &UpstreamCredentials,
    ) -> Result<serde_json::Value>;
}
