//! Managed-Postgres backend speaking PostgREST to a Supabase project.
//!
//! The project schema is provisioned out of band; this client only issues
//! row-level CRUD. Unique-constraint violations surface as PostgREST error
//! bodies carrying the Postgres `23505` code, which is what we classify on.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::{Direction, Filter, OrderBy, Row, RowStore};

const UNIQUE_VIOLATION: &str = "23505";

pub struct SupabaseStore {
    client: Client,
    base_url: String,
}

impl SupabaseStore {
    pub fn new(base_url: &str, api_key: &str) -> StoreResult<Self> {
        let mut headers = HeaderMap::new();
        let key_value = HeaderValue::from_str(api_key)
            .map_err(|_| StoreError::Config("invalid SUPABASE_ANON_KEY".into()))?;
        headers.insert("apikey", key_value);
        let bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| StoreError::Config("invalid SUPABASE_ANON_KEY".into()))?;
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(StoreError::from)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/rest/v1/{}", self.base_url, table))
    }

    fn filter_params(filter: &Filter) -> Vec<(String, String)> {
        let mut params = Vec::new();
        for (column, value) in filter.eq_terms() {
            params.push((column.clone(), format!("eq.{}", render(value))));
        }
        for (column, value) in filter.lt_terms() {
            params.push((column.clone(), format!("lt.{}", render(value))));
        }
        if let Some((columns, needle)) = filter.contains_term() {
            // Commas and parens would break the or=(...) grammar.
            let needle: String = needle
                .chars()
                .filter(|c| !matches!(c, ',' | '(' | ')'))
                .collect();
            let terms: Vec<String> = columns
                .iter()
                .map(|column| format!("{column}.ilike.*{needle}*"))
                .collect();
            params.push(("or".into(), format!("({})", terms.join(","))));
        }
        params
    }

    fn order_param(order: Option<&OrderBy>) -> Option<(String, String)> {
        order.map(|order| {
            let direction = match order.direction {
                Direction::Asc => "asc",
                Direction::Desc => "desc",
            };
            ("order".into(), format!("{}.{}", order.column, direction))
        })
    }

    async fn rows(response: Response) -> StoreResult<Vec<Row>> {
        let response = Self::check(response).await?;
        response.json::<Vec<Row>>().await.map_err(StoreError::from)
    }

    async fn check(response: Response) -> StoreResult<Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        let code = body.get("code").and_then(Value::as_str).unwrap_or_default();
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("request rejected")
            .to_string();
        if code == UNIQUE_VIOLATION || status == StatusCode::CONFLICT {
            return Err(StoreError::DuplicateKey { message });
        }
        Err(StoreError::Backend {
            message: format!("postgrest {status}: {message}"),
        })
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn strip_nulls(row: Row) -> Row {
    row.into_iter().filter(|(_, v)| !v.is_null()).collect()
}

#[async_trait::async_trait]
impl RowStore for SupabaseStore {
    async fn insert(&self, table: &str, row: Row) -> StoreResult<Row> {
        let response = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&vec![strip_nulls(row)])
            .send()
            .await
            .map_err(StoreError::from)?;
        Self::rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::backend("insert returned no row"))
    }

    async fn find_many(
        &self,
        table: &str,
        filter: &Filter,
        order: Option<&OrderBy>,
    ) -> StoreResult<Vec<Row>> {
        let mut params = Self::filter_params(filter);
        params.push(("select".into(), "*".into()));
        if let Some(order) = Self::order_param(order) {
            params.push(order);
        }
        let response = self
            .request(Method::GET, table)
            .query(&params)
            .send()
            .await
            .map_err(StoreError::from)?;
        Self::rows(response).await
    }

    async fn find_one(&self, table: &str, filter: &Filter) -> StoreResult<Option<Row>> {
        let mut params = Self::filter_params(filter);
        params.push(("select".into(), "*".into()));
        params.push(("limit".into(), "1".into()));
        let response = self
            .request(Method::GET, table)
            .query(&params)
            .send()
            .await
            .map_err(StoreError::from)?;
        Ok(Self::rows(response).await?.into_iter().next())
    }

    async fn update(&self, table: &str, filter: &Filter, changes: Row) -> StoreResult<Option<Row>> {
        let response = self
            .request(Method::PATCH, table)
            .query(&Self::filter_params(filter))
            .header("Prefer", "return=representation")
            .json(&changes)
            .send()
            .await
            .map_err(StoreError::from)?;
        Ok(Self::rows(response).await?.into_iter().next())
    }

    async fn delete(&self, table: &str, filter: &Filter) -> StoreResult<bool> {
        let response = self
            .request(Method::DELETE, table)
            .query(&Self::filter_params(filter))
            .header("Prefer", "return=representation")
            .send()
            .await
            .map_err(StoreError::from)?;
        Ok(!Self::rows(response).await?.is_empty())
    }
}
