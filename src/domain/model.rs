use reqwest::header::HeaderValue;

pub const MODULE_PARAM: &str = "module";

/// 每個模組對應的轉送方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStrategy {
    /// 先取清單，再並行取得每一筆的明細
    ListThenDetail,
    /// 只帶 `location_id` 參數的搜尋端點，回傳原始內容
    LocationSearch,
    /// 直接轉送，回傳與模組同名的欄位
    Passthrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleSpec {
    pub name: &'static str,
    pub strategy: DispatchStrategy,
}

/// 進站請求，`module` 以外的查詢參數依原順序保留
///
/// `Authorization` 以原始位元組保存，非 ASCII 內容也照樣轉送。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayRequest {
    pub module: Option<String>,
    pub params: Vec<(String, String)>,
    pub authorization: Option<HeaderValue>,
    pub version: Option<String>,
}

impl RelayRequest {
    /// 從原始查詢字串與兩個標頭建立請求
    pub fn from_parts(
        raw_query: Option<&str>,
        authorization: Option<HeaderValue>,
        version: Option<String>,
    ) -> Self {
        let mut module = None;
        let mut params = Vec::new();

        if let Some(query) = raw_query {
            for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
                if key == MODULE_PARAM {
                    // 重複的 module 以第一個為準
                    module.get_or_insert_with(|| value.into_owned());
                } else {
                    params.push((key.into_owned(), value.into_owned()));
                }
            }
        }

        Self {
            module,
            params,
            authorization: authorization.filter(|value| !value.is_empty()),
            version: version.filter(|value| !value.is_empty()),
        }
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

/// 原封不動轉送給上游的憑證
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamCredentials {
    pub authorization: HeaderValue,
    pub version: String,
}
