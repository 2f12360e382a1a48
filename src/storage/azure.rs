use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{
    header::{ACCEPT, AUTHORIZATION},
    Client, Method, RequestBuilder, Response, StatusCode, Url,
};
use secrecy::{ExposeSecret, SecretSlice};
use serde_json::json;
use sha2::Sha256;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::{Error, Result, SignupStore};
use crate::{config::StorageAccount, model::SignupRecord, utils};

const API_VERSION: &str = "2019-02-02";
const JSON_NO_METADATA: &str = "application/json;odata=nometadata";
const ERROR_CODE_HEADER: &str = "x-ms-error-code";

/// Client for the Azure Table Storage REST API, bound to a single table.
#[derive(Debug)]
pub struct AzureTableClient {
    http_client: Client,
    account_name: String,
    account_key: SecretSlice<u8>,
    endpoint: Url,
    table_name: String,
    /// Set once the table is known to exist.
    table_ready: OnceCell<()>,
}

impl AzureTableClient {
    pub fn new<S: Into<String>>(
        account: StorageAccount,
        table_name: S,
        timeout: Duration,
    ) -> Result<Self> {
        let endpoint = Url::parse(&account.table_endpoint)
            .map_err(|e| Error::UrlParsing(e.to_string()))?;
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(AzureTableClient {
            http_client,
            account_name: account.account_name,
            account_key: account.account_key,
            endpoint,
            table_name: table_name.into(),
            table_ready: OnceCell::new(),
        })
    }

    /// Appends `resource` as a single, percent-encoded path segment to the endpoint.
    fn url(&self, resource: &str) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| Error::UrlParsing(format!("cannot append to '{}'", self.endpoint)))?
            .pop_if_empty()
            .push(resource);
        Ok(url)
    }

    /// A request carrying the date, version and `SharedKeyLite` authorization headers.
    fn request(&self, method: Method, url: Url) -> Result<RequestBuilder> {
        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let signature = shared_key_lite_signature(
            self.account_key.expose_secret(),
            &date,
            &self.account_name,
            url.path(),
        )?;

        let req = self
            .http_client
            .request(method, url)
            .header("x-ms-date", date)
            .header("x-ms-version", API_VERSION)
            .header(ACCEPT, JSON_NO_METADATA)
            .header(
                AUTHORIZATION,
                format!("SharedKeyLite {}:{signature}", self.account_name),
            );
        Ok(req)
    }

    async fn create_table(&self) -> Result<()> {
        let url = self.url("Tables")?;
        let resp = self
            .request(Method::POST, url)?
            .header("Prefer", "return-no-content")
            .json(&json!({ "TableName": self.table_name }))
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            info!("{:<20} - Created table '{}'", "create_table", self.table_name);
            return Ok(());
        }

        let code = error_code(resp).await;
        if status == StatusCode::CONFLICT && code == "TableAlreadyExists" {
            debug!("{:<20} - Table '{}' already exists", "create_table", self.table_name);
            return Ok(());
        }

        Err(Error::Service {
            status: status.as_u16(),
            code,
        })
    }
}

#[async_trait]
impl SignupStore for AzureTableClient {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn ensure_table(&self) -> Result<()> {
        // Concurrent callers wait for the same attempt, a failed attempt is retried by the next call.
        self.table_ready
            .get_or_try_init(|| self.create_table())
            .await?;
        Ok(())
    }

    async fn insert_entity(&self, record: &SignupRecord) -> Result<()> {
        let url = self.url(&self.table_name)?;
        let resp = self
            .request(Method::POST, url)?
            .header("Prefer", "return-no-content")
            .json(record)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let code = error_code(resp).await;
        match code.as_str() {
            "EntityAlreadyExists" => Err(Error::EntityAlreadyExists {
                partition_key: record.partition_key.clone(),
                row_key: record.row_key.clone(),
            }),
            "TableNotFound" => Err(Error::TableNotFound(self.table_name.clone())),
            _ => Err(Error::Service {
                status: status.as_u16(),
                code,
            }),
        }
    }

    async fn get_entity(
        &self,
        partition_key: &str,
        row_key: &str,
    ) -> Result<Option<SignupRecord>> {
        let resource = format!(
            "{}(PartitionKey='{}',RowKey='{}')",
            self.table_name,
            escape_key(partition_key),
            escape_key(row_key)
        );
        let url = self.url(&resource)?;
        let resp = self.request(Method::GET, url)?.send().await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Error::Service {
                status: status.as_u16(),
                code: error_code(resp).await,
            });
        }

        let record = resp.json::<SignupRecord>().await?;
        Ok(Some(record))
    }
}

// ###################################
// ->   HELPERS
// ###################################
/// Base64 HMAC-SHA256 over `"{date}\n/{account}{path}"`, the `SharedKeyLite` scheme of the table service.
fn shared_key_lite_signature(key: &[u8], date: &str, account: &str, path: &str) -> Result<String> {
    let string_to_sign = format!("{date}\n/{account}{path}");

    let mut mac =
        Hmac::<Sha256>::new_from_slice(key).map_err(|er| Error::Signing(er.to_string()))?;
    mac.update(string_to_sign.as_bytes());

    Ok(utils::b64_encode(mac.finalize().into_bytes()))
}

/// Quotes in key literals are escaped by doubling them.
fn escape_key(key: &str) -> String {
    key.replace('\'', "''")
}

/// Reads the service error code from the header, falling back to the OData error body.
async fn error_code(resp: Response) -> String {
    let from_header = resp
        .headers()
        .get(ERROR_CODE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    if let Some(code) = from_header {
        return code;
    }

    resp.json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| {
            body.get("odata.error")
                .and_then(|er| er.get("code"))
                .and_then(|code| code.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "Unknown".to_string())
}
