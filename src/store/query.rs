//! Query builders for the table client

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::Error;
use crate::fetch::{Fetch, FetchBuilder};

fn authorize<'a>(fetch: FetchBuilder<'a>, key: &str, token: Option<&str>) -> FetchBuilder<'a> {
    let fetch = fetch.header("apikey", key);
    match token {
        Some(token) => fetch.bearer_auth(token),
        None => fetch,
    }
}

/// Builder for SELECT queries
pub struct SelectBuilder {
    /// The request URL
    url: String,

    /// The public API key
    key: String,

    /// Bearer token of the calling session, if any
    token: Option<String>,

    /// HTTP client
    client: Client,

    /// Accumulated query parameters; a column may carry two predicates
    /// (range filters), so this is a list rather than a map
    params: Vec<(String, String)>,
}

impl SelectBuilder {
    pub(crate) fn new(
        url: String,
        key: String,
        token: Option<String>,
        columns: &str,
        client: Client,
    ) -> Self {
        Self {
            url,
            key,
            token,
            client,
            params: vec![("select".to_string(), columns.to_string())],
        }
    }

    fn filter<T: ToString>(&mut self, column: &str, operator: &str, value: T) -> &mut Self {
        self.params.push((
            column.to_string(),
            format!("{}.{}", operator, value.to_string()),
        ));
        self
    }

    /// Filter rows where column equals a value
    pub fn eq<T: ToString>(&mut self, column: &str, value: T) -> &mut Self {
        self.filter(column, "eq", value)
    }

    /// Filter rows where column matches a pattern, case insensitively.
    /// The pattern is sent as given; callers wrap substring searches in `%`.
    pub fn ilike(&mut self, column: &str, pattern: &str) -> &mut Self {
        self.filter(column, "ilike", pattern)
    }

    /// Filter rows where column is greater than or equal to a value
    pub fn gte<T: ToString>(&mut self, column: &str, value: T) -> &mut Self {
        self.filter(column, "gte", value)
    }

    /// Filter rows where column is less than or equal to a value
    pub fn lte<T: ToString>(&mut self, column: &str, value: T) -> &mut Self {
        self.filter(column, "lte", value)
    }

    /// Order the results by a column
    pub fn order(&mut self, column: &str, ascending: bool) -> &mut Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.params
            .push(("order".to_string(), format!("{}.{}", column, direction)));
        self
    }

    /// Limit the number of rows returned
    pub fn limit(&mut self, count: i64) -> &mut Self {
        self.params.push(("limit".to_string(), count.to_string()));
        self
    }

    /// Execute the query and return all matching rows
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<Vec<T>, Error> {
        let fetch = authorize(
            Fetch::get(&self.client, &self.url),
            &self.key,
            self.token.as_deref(),
        )
        .query_pairs(&self.params);

        fetch.execute::<Vec<T>>().await
    }

    /// Execute the query and return the first row, if any
    pub async fn execute_one<T: DeserializeOwned>(&mut self) -> Result<Option<T>, Error> {
        self.limit(1);
        let rows = self.execute::<T>().await?;
        Ok(rows.into_iter().next())
    }
}

/// Builder for INSERT queries
pub struct InsertBuilder<T: Serialize> {
    url: String,
    key: String,
    token: Option<String>,
    values: T,
    client: Client,
}

impl<T: Serialize> InsertBuilder<T> {
    pub(crate) fn new(
        url: String,
        key: String,
        token: Option<String>,
        values: T,
        client: Client,
    ) -> Self {
        Self {
            url,
            key,
            token,
            values,
            client,
        }
    }

    /// Execute the insert and return the created rows
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<Vec<R>, Error> {
        let fetch = authorize(
            Fetch::post(&self.client, &self.url),
            &self.key,
            self.token.as_deref(),
        )
        .header("Prefer", "return=representation")
        .json(&self.values)?;

        fetch.execute::<Vec<R>>().await
    }

    /// Execute the insert and return the single created row
    pub async fn execute_one<R: DeserializeOwned>(&self) -> Result<R, Error> {
        let rows = self.execute::<R>().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| Error::database("insert returned no rows"))
    }

    /// Execute the insert without returning the created data
    pub async fn execute_no_return(&self) -> Result<(), Error> {
        let fetch = authorize(
            Fetch::post(&self.client, &self.url),
            &self.key,
            self.token.as_deref(),
        )
        .header("Prefer", "return=minimal")
        .json(&self.values)?;

        fetch.execute_no_content().await
    }
}

/// Builder for UPDATE queries
pub struct UpdateBuilder<T: Serialize> {
    url: String,
    key: String,
    token: Option<String>,
    values: T,
    client: Client,
    params: Vec<(String, String)>,
}

impl<T: Serialize> UpdateBuilder<T> {
    pub(crate) fn new(
        url: String,
        key: String,
        token: Option<String>,
        values: T,
        client: Client,
    ) -> Self {
        Self {
            url,
            key,
            token,
            values,
            client,
            params: Vec::new(),
        }
    }

    /// Restrict the update to rows where column equals a value
    pub fn eq<V: ToString>(&mut self, column: &str, value: V) -> &mut Self {
        self.params
            .push((column.to_string(), format!("eq.{}", value.to_string())));
        self
    }

    /// Execute the update and return the affected rows
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<Vec<R>, Error> {
        let fetch = authorize(
            Fetch::patch(&self.client, &self.url),
            &self.key,
            self.token.as_deref(),
        )
        .header("Prefer", "return=representation")
        .query_pairs(&self.params)
        .json(&self.values)?;

        fetch.execute::<Vec<R>>().await
    }

    /// Execute the update and return the single affected row
    pub async fn execute_one<R: DeserializeOwned>(&self) -> Result<R, Error> {
        let rows = self.execute::<R>().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| Error::database("update matched no rows"))
    }
}

/// Builder for DELETE queries
pub struct DeleteBuilder {
    url: String,
    key: String,
    token: Option<String>,
    client: Client,
    params: Vec<(String, String)>,
}

impl DeleteBuilder {
    pub(crate) fn new(url: String, key: String, token: Option<String>, client: Client) -> Self {
        Self {
            url,
            key,
            token,
            client,
            params: Vec::new(),
        }
    }

    /// Restrict the delete to rows where column equals a value
    pub fn eq<V: ToString>(&mut self, column: &str, value: V) -> &mut Self {
        self.params
            .push((column.to_string(), format!("eq.{}", value.to_string())));
        self
    }

    /// Execute the delete without returning the removed data
    pub async fn execute_no_return(&self) -> Result<(), Error> {
        let fetch = authorize(
            Fetch::delete(&self.client, &self.url),
            &self.key,
            self.token.as_deref(),
        )
        .header("Prefer", "return=minimal")
        .query_pairs(&self.params);

        fetch.execute_no_content().await
    }
}

/// Builder for stored-procedure (RPC) calls
pub struct RpcBuilder<T: Serialize> {
    url: String,
    key: String,
    token: Option<String>,
    params: T,
    client: Client,
}

impl<T: Serialize> RpcBuilder<T> {
    pub(crate) fn new(url: String, key: String, params: T, client: Client) -> Self {
        Self {
            url,
            key,
            token: None,
            params,
            client,
        }
    }

    /// Attach the calling session's access token
    pub fn with_auth(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    /// Execute the call and return the function's result
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<R, Error> {
        let fetch = authorize(
            Fetch::post(&self.client, &self.url),
            &self.key,
            self.token.as_deref(),
        )
        .json(&self.params)?;

        fetch.execute::<R>().await
    }
}
