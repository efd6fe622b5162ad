use crate::config::RelayConfig;
use crate::core::modules::ModuleRegistry;
use crate::domain::model::{DispatchStrategy, ModuleSpec, RelayRequest, UpstreamCredentials};
use crate::domain::ports::UpstreamClient;
use crate::utils::error::{RelayError, Result};
use futures::future::join_all;
use reqwest::header::HeaderValue;
use serde_json::{Map, Value};
use url::Url;

pub const LOCATION_QUERY_PARAM: &str = "locationId";
pub const LOCATION_UPSTREAM_PARAM: &str = "location_id";

/// 驗證請求、依模組選擇轉送方式並組合回應
pub struct RelayService<C: UpstreamClient> {
    client: C,
    modules: ModuleRegistry,
    base_url: Url,
    default_version: String,
}

impl<C: UpstreamClient> RelayService<C> {
    pub fn new(client: C, config: &RelayConfig) -> Self {
        Self {
            client,
            modules: config.modules.clone(),
            base_url: config.base_url.clone(),
            default_version: config.default_version.clone(),
        }
    }

    pub async fn handle(&self, request: RelayRequest) -> Result<Value> {
        let (module, authorization) = self.authorize(&request)?;
        let credentials = UpstreamCredentials {
            authorization,
            version: request
                .version
                .clone()
                .unwrap_or_else(|| self.default_version.clone()),
        };
        let list_url = self.module_url(module)?;

        tracing::info!(
            "📥 {}: relaying with {:?} ({} params)",
            module.name,
            module.strategy,
            request.params.len()
        );

        match module.strategy {
            DispatchStrategy::ListThenDetail => {
                self.fan_out(module, &list_url, &request.params, &credentials)
                    .await
            }
            DispatchStrategy::LocationSearch => {
                let query: Vec<(String, String)> = request
                    .param(LOCATION_QUERY_PARAM)
                    .map(|location| (LOCATION_UPSTREAM_PARAM.to_string(), location.to_string()))
                    .into_iter()
                    .collect();
                self.client.get_json(&list_url, &query, &credentials).await
            }
            DispatchStrategy::Passthrough => {
                let mut body = self
                    .client
                    .get_json(&list_url, &request.params, &credentials)
                    .await?;
                Ok(body
                    .get_mut(module.name)
                    .map(Value::take)
                    .unwrap_or(Value::Null))
            }
        }
    }

    /// 依序檢查模組與授權標頭，失敗時不會發出任何上游呼叫
    fn authorize(&self, request: &RelayRequest) -> Result<(&ModuleSpec, HeaderValue)> {
        let module = request
            .module
            .as_deref()
            .and_then(|name| self.modules.resolve(name))
            .ok_or_else(|| RelayError::InvalidModule {
                module: request.module.clone(),
            })?;

        let authorization = request
            .authorization
            .clone()
            .ok_or(RelayError::MissingCredentials)?;

        Ok((module, authorization))
    }

    fn module_url(&self, module: &ModuleSpec) -> Result<Url> {
        self.base_url
            .join(&format!("{}/", module.name))
            .map_err(|e| RelayError::ProcessingError {
                message: format!("Cannot build URL for module {}: {}", module.name, e),
            })
    }

    async fn fan_out(
        &self,
        module: &ModuleSpec,
        list_url: &Url,
        params: &[(String, String)],
        credentials: &UpstreamCredentials,
    ) -> Result<Value> {
        let list = self.client.get_json(list_url, params, credentials).await?;
        let ids = extract_ids(&list, module.name);
        let requested = ids.len();

        let fetches = ids.into_iter().map(|id| async move {
            match self.fetch_detail(list_url, &id, credentials).await {
                Ok(detail) => Some(detail),
                Err(e) => {
                    tracing::error!("❌ {}: {}", module.name, e);
                    None
                }
            }
        });
        let details: Vec<Value> = join_all(fetches).await.into_iter().flatten().collect();

        tracing::info!(
            "📡 {}: fetched {}/{} details",
            module.name,
            details.len(),
            requested
        );

        let mut body = Map::new();
        body.insert(module.name.to_string(), Value::Array(details));
        Ok(Value::Object(body))
    }

    async fn fetch_detail(
        &self,
        list_url: &Url,
        id: &str,
        credentials: &UpstreamCredentials,
    ) -> Result<Value> {
        let wrap = |source: RelayError| RelayError::DetailFetch {
            id: id.to_string(),
            source: Box::new(source),
        };

        let url = detail_url(list_url, id).map_err(wrap)?;
        self.client
            .get_json(&url, &[], credentials)
            .await
            .map_err(wrap)
    }
}

/// 取出清單中每一筆的 `id`，缺少或型別不符的項目會被略過
pub fn extract_ids(list: &Value, module_name: &str) -> Vec<String> {
    let Some(items) = list.get(module_name).and_then(Value::as_array) else {
        tracing::debug!("{}: no item list in upstream response", module_name);
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match item.get("id") {
            Some(Value::String(id)) if !id.is_empty() => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => {
                tracing::warn!("🔶 {}: item {} has no usable id, skipped", module_name, index);
                None
            }
        })
        .collect()
}

fn detail_url(list_url: &Url, id: &str) -> Result<Url> {
    let mut url = list_url.clone();
    url.path_segments_mut()
        .map_err(|_| RelayError::ProcessingError {
            message: format!("{} cannot be used as a base URL", list_url),
        })?
        .pop_if_empty()
        .push(id);
    Ok(url)
}
