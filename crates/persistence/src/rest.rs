//! HTTP gateway for a hosted PostgREST backend.
//!
//! Tables are reached under `/rest/v1/{table}` and files under
//! `/storage/v1/object/{bucket}/{path}`. Every request carries the project
//! key as `apikey`; `Authorization` carries the signed-in admin's token when
//! acting for an admin and the project key otherwise.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_RANGE, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use domain::services::{Filter, GatewayError, ObjectStorage, Query, Row, TableGateway};

use crate::metrics::GatewayTimer;
use crate::tables::{validate_identifier, TableNames};

/// Connection settings for [`RestGateway`].
#[derive(Debug, Clone)]
pub struct RestConfig {
    pub url: String,
    pub anon_key: String,
    pub table_suffix: String,
    pub timeout_ms: u64,
}

/// Error body returned by PostgREST and the storage API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Table gateway and object storage over HTTP.
#[derive(Clone)]
pub struct RestGateway {
    client: Client,
    base_url: String,
    anon_key: String,
    bearer: String,
    tables: TableNames,
}

impl std::fmt::Debug for RestGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestGateway")
            .field("base_url", &self.base_url)
            .field("tables", &self.tables)
            .finish_non_exhaustive()
    }
}

fn transport(e: reqwest::Error) -> GatewayError {
    GatewayError::Transport(e.to_string())
}

impl RestGateway {
    pub fn new(config: &RestConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(transport)?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            bearer: config.anon_key.clone(),
            tables: TableNames::new(config.table_suffix.clone()),
        })
    }

    /// Same backend, authorised as the given user.
    pub fn with_access_token(&self, access_token: &str) -> Self {
        Self {
            bearer: access_token.to_string(),
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.bearer)
    }

    fn table_url(&self, table: &str) -> Result<String, GatewayError> {
        Ok(format!(
            "{}/rest/v1/{}",
            self.base_url,
            self.tables.physical(table)?
        ))
    }

    fn filter_params(filters: &[Filter]) -> Result<Vec<(String, String)>, GatewayError> {
        filters
            .iter()
            .map(|filter| match filter {
                Filter::Eq(column, value) => {
                    validate_identifier(column)?;
                    Ok((column.clone(), format!("eq.{}", value)))
                }
            })
            .collect()
    }

    /// Sends a request and turns non-2xx answers into [`GatewayError::Status`].
    async fn send(
        &self,
        operation: &'static str,
        table: &str,
        request: RequestBuilder,
    ) -> Result<Response, GatewayError> {
        let timer = GatewayTimer::new(operation, table);
        let result = Self::checked(request).await;
        timer.finish(result.is_ok());
        if let Err(e) = &result {
            debug!(operation, table, error = %e, "Gateway call failed");
        }
        result
    }

    async fn checked(request: RequestBuilder) -> Result<Response, GatewayError> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .unwrap_or(body);
        Err(GatewayError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn rows(response: Response) -> Result<Vec<Row>, GatewayError> {
        let body: Vec<Value> = response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;
        body.into_iter()
            .map(|value| match value {
                Value::Object(map) => Ok(map),
                other => Err(GatewayError::Decode(format!("expected object row, got {}", other))),
            })
            .collect()
    }

    fn representation() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        headers
    }
}

/// Total from a `Content-Range` header such as `0-9/42` or `*/0`.
fn parse_content_range(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

#[async_trait]
impl TableGateway for RestGateway {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>, GatewayError> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        params.extend(Self::filter_params(&query.filters)?);
        if !query.order.is_empty() {
            let order = query
                .order
                .iter()
                .map(|o| {
                    validate_identifier(&o.column)?;
                    Ok(format!(
                        "{}.{}",
                        o.column,
                        if o.ascending { "asc" } else { "desc" }
                    ))
                })
                .collect::<Result<Vec<_>, GatewayError>>()?;
            params.push(("order".to_string(), order.join(",")));
        }

        let request = self
            .request(Method::GET, self.table_url(table)?)
            .query(&params);
        let response = self.send("select", table, request).await?;
        Self::rows(response).await
    }

    async fn insert(&self, table: &str, row: Row) -> Result<Row, GatewayError> {
        let request = self
            .request(Method::POST, self.table_url(table)?)
            .headers(Self::representation())
            .json(&row);
        let response = self.send("insert", table, request).await?;
        Self::rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::Decode("insert returned no row".to_string()))
    }

    async fn update(&self, table: &str, id: &str, patch: Row) -> Result<Row, GatewayError> {
        let request = self
            .request(Method::PATCH, self.table_url(table)?)
            .query(&[("id", format!("eq.{}", id))])
            .headers(Self::representation())
            .json(&patch);
        let response = self.send("update", table, request).await?;
        Self::rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::NotFound(id.to_string()))
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), GatewayError> {
        let request = self
            .request(Method::DELETE, self.table_url(table)?)
            .query(&[("id", format!("eq.{}", id))]);
        self.send("delete", table, request).await?;
        Ok(())
    }

    async fn count(&self, table: &str, filters: &[Filter]) -> Result<u64, GatewayError> {
        let mut params = vec![("select".to_string(), "id".to_string())];
        params.extend(Self::filter_params(filters)?);

        let request = self
            .request(Method::GET, self.table_url(table)?)
            .query(&params)
            .header("Prefer", "count=exact")
            .header("Range-Unit", "items")
            .header("Range", "0-0");
        let response = self.send("count", table, request).await?;

        response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range)
            .ok_or_else(|| GatewayError::Decode("missing Content-Range total".to_string()))
    }
}

#[async_trait]
impl ObjectStorage for RestGateway {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        overwrite: bool,
    ) -> Result<(), GatewayError> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path);
        let request = self
            .request(Method::POST, url)
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", if overwrite { "true" } else { "false" })
            .body(bytes);
        self.send("upload", bucket, request).await?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, bucket, path
        )
    }
}
