//! Remote configuration store speaking the `/form-config` HTTP surface.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use url::Url;

use crate::form::{ConfigDocument, FormName, StoredConfiguration};
use crate::observability::metrics;
use crate::store::{unix_now, ConfigStore, StoreError, StoreResult};

/// Client-side `ConfigStore` backed by a running service.
#[derive(Clone)]
pub struct HttpConfigStore {
    client: Client,
    base: Url,
}

impl HttpConfigStore {
    /// `base_url` is the service root, e.g. `http://localhost:8080`.
    pub fn new(base_url: &str) -> StoreResult<Self> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> StoreResult<Self> {
        let mut base =
            Url::parse(base_url).map_err(|e| StoreError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(base_url.to_string()));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { client, base })
    }

    fn url(&self, path: &str) -> StoreResult<Url> {
        self.base
            .join(path)
            .map_err(|e| StoreError::InvalidUrl(e.to_string()))
    }

    /// Effective field list for a built-in form, as served by the service.
    pub async fn resolved(&self, form: &FormName) -> StoreResult<serde_json::Value> {
        let res = self
            .client
            .get(self.url(&format!("form-config/{form}/resolved"))?)
            .send()
            .await?;
        Ok(expect_success(res).await?.json().await?)
    }
}

async fn expect_success(res: Response) -> StoreResult<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    Err(StoreError::Remote {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl ConfigStore for HttpConfigStore {
    fn kind(&self) -> &'static str {
        "http"
    }

    async fn get(&self, form: &FormName) -> StoreResult<Option<ConfigDocument>> {
        let mut url = self.url(&format!("form-config/{form}"))?;
        // Bypass intermediary caches; the service ignores the parameter.
        url.query_pairs_mut().append_pair("_ts", &unix_now().to_string());

        let result = self.fetch_document(url).await;
        metrics::record_store_op(self.kind(), "get", result.is_ok());
        result
    }

    async fn put(
        &self,
        form: &FormName,
        document: ConfigDocument,
    ) -> StoreResult<StoredConfiguration> {
        let url = self.url(&format!("form-config/{form}"))?;
        let result = self.send_document(url, &document).await;
        metrics::record_store_op(self.kind(), "put", result.is_ok());
        result
    }

    async fn list(&self) -> StoreResult<BTreeMap<FormName, ConfigDocument>> {
        let url = self.url("form-config")?;
        let result = self.fetch_all(url).await;
        metrics::record_store_op(self.kind(), "list", result.is_ok());
        result
    }
}

impl HttpConfigStore {
    async fn fetch_document(&self, url: Url) -> StoreResult<Option<ConfigDocument>> {
        let res = expect_success(self.client.get(url).send().await?).await?;
        if res.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let bytes = res.bytes().await?;
        if bytes.is_empty() {
            return Ok(None);
        }
        let value: serde_json::Value = serde_json::from_slice(&bytes)?;
        Ok(if value.is_null() {
            None
        } else {
            Some(ConfigDocument::from_stored(value))
        })
    }

    async fn send_document(
        &self,
        url: Url,
        document: &ConfigDocument,
    ) -> StoreResult<StoredConfiguration> {
        let res = self.client.post(url).json(document).send().await?;
        Ok(expect_success(res).await?.json().await?)
    }

    async fn fetch_all(&self, url: Url) -> StoreResult<BTreeMap<FormName, ConfigDocument>> {
        let res = expect_success(self.client.get(url).send().await?).await?;
        Ok(res.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalization() {
        let store = HttpConfigStore::new("http://localhost:8080/portal").unwrap();
        assert_eq!(
            store.url("form-config/AssetForm").unwrap().as_str(),
            "http://localhost:8080/portal/form-config/AssetForm"
        );

        let store = HttpConfigStore::new("http://localhost:8080").unwrap();
        assert_eq!(
            store.url("form-config").unwrap().as_str(),
            "http://localhost:8080/form-config"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpConfigStore::new("not a url"),
            Err(StoreError::InvalidUrl(_))
        ));
        assert!(matches!(
            HttpConfigStore::new("mailto:ops@example.com"),
            Err(StoreError::InvalidUrl(_))
        ));
    }
}
