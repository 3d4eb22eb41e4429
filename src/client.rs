//! This module provides a client to connect to the hosted store
//!
//! The store exposes every collection as a PostgREST endpoint, e.g. `https://<project>/rest/v1/tasks`.

use std::error::Error;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use crate::config::StoreConfig;
use crate::query::{Query, Row};
use crate::resource::Resource;
use crate::traits::RemoteStore;

/// Asks the store to reply with the rows it has just written
static RETURN_REPRESENTATION: &str = "return=representation";


/// A store that fetches its data from the hosted database
pub struct Client {
    resource: Resource,
    http: reqwest::Client,
}

impl Client {
    /// Create a client. This does not start a connection
    pub fn new<S: AsRef<str>, T: ToString>(url: S, api_key: T) -> Result<Self, Box<dyn Error>> {
        let url = url::Url::parse(url.as_ref())?;

        Ok(Self {
            resource: Resource::new(url, api_key.to_string(), None),
            http: reqwest::Client::new(),
        })
    }

    /// Create a client from a configuration (usually read from the environment)
    pub fn from_config(config: &StoreConfig) -> Result<Self, Box<dyn Error>> {
        let url = url::Url::parse(&config.url)?;

        Ok(Self {
            resource: Resource::new(url, config.api_key.clone(), config.access_token.clone()),
            http: reqwest::Client::new(),
        })
    }

    pub fn resource(&self) -> &Resource { &self.resource }

    fn request(&self, method: Method, collection: &str) -> RequestBuilder {
        self.http
            .request(method, self.resource.collection_url(collection))
            .header("apikey", self.resource.api_key())
            .bearer_auth(self.resource.bearer())
            .header(ACCEPT, "application/json")
    }

    fn select_request(&self, collection: &str, query: &Query) -> RequestBuilder {
        self.request(Method::GET, collection)
            .query(&query.to_query_pairs())
    }

    fn insert_request(&self, collection: &str, row: &Row) -> RequestBuilder {
        self.request(Method::POST, collection)
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", RETURN_REPRESENTATION)
            .json(row)
    }

    fn update_request(&self, collection: &str, id: &str, changes: &Row) -> RequestBuilder {
        self.request(Method::PATCH, collection)
            .query(&Query::new().eq("id", id).to_query_pairs())
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", RETURN_REPRESENTATION)
            .json(changes)
    }

    fn delete_request(&self, collection: &str, id: &str) -> RequestBuilder {
        self.request(Method::DELETE, collection)
            .query(&Query::new().eq("id", id).to_query_pairs())
    }
}

/// Turn a non-2xx response into an error that carries the status code and the store's message
async fn check_status(response: Response) -> Result<Response, Box<dyn Error>> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(format!("Unexpected HTTP status code {:?} ({})", status, body).into())
}

/// The store replies with an array even when a single row is written
fn single_row(rows: Vec<Row>, collection: &str, what: &str) -> Result<Row, Box<dyn Error>> {
    match rows.into_iter().next() {
        None => Err(format!("The store returned no row after {} in {}", what, collection).into()),
        Some(row) => Ok(row),
    }
}

#[async_trait]
impl RemoteStore for Client {
    async fn select(&self, collection: &str, query: &Query) -> Result<Vec<Row>, Box<dyn Error>> {
        let response = self.select_request(collection, query).send().await?;
        let response = check_status(response).await?;
        let rows: Vec<Row> = response.json().await?;
        log::debug!("Selected {} rows from {}", rows.len(), collection);
        Ok(rows)
    }

    async fn insert(&self, collection: &str, row: Row) -> Result<Row, Box<dyn Error>> {
        let response = self.insert_request(collection, &row).send().await?;
        let response = check_status(response).await?;
        let rows: Vec<Row> = response.json().await?;
        single_row(rows, collection, "an insert")
    }

    async fn update(&self, collection: &str, id: &str, changes: Row) -> Result<Row, Box<dyn Error>> {
        let response = self.update_request(collection, id, &changes).send().await?;
        let response = check_status(response).await?;
        let rows: Vec<Row> = response.json().await?;
        single_row(rows, collection, &format!("updating {}", id))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), Box<dyn Error>> {
        let response = self.delete_request(collection, id).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Client {
        Client::new("https://abc.store.example", "anon-key").unwrap()
    }

    #[test]
    fn select_requests() {
        let query = Query::new()
            .lte("start_time", "2021-03-07T23:59:59Z")
            .gte("end_time", "2021-03-01T00:00:00Z");
        let request = client().select_request("time_slots", &query).build().unwrap();

        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.url().path(), "/rest/v1/time_slots");
        let pairs: Vec<(String, String)> = request.url().query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![
            ("start_time".to_string(), "lte.2021-03-07T23:59:59Z".to_string()),
            ("end_time".to_string(), "gte.2021-03-01T00:00:00Z".to_string()),
        ]);
        assert_eq!(request.headers()["apikey"], "anon-key");
        assert_eq!(request.headers()["authorization"], "Bearer anon-key");
    }

    #[test]
    fn write_requests() {
        let mut changes = Row::new();
        changes.insert("completed".to_string(), true.into());

        let request = client().update_request("tasks", "42", &changes).build().unwrap();
        assert_eq!(request.method(), &Method::PATCH);
        assert_eq!(request.url().query(), Some("id=eq.42"));
        assert_eq!(request.headers()["prefer"], RETURN_REPRESENTATION);
        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(body, br#"{"completed":true}"#);

        let request = client().delete_request("tasks", "42").build().unwrap();
        assert_eq!(request.method(), &Method::DELETE);
        assert_eq!(request.url().query(), Some("id=eq.42"));
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn store_calls_can_be_spawned() {
        let client = client();
        let row = Row::new();
        let query = Query::new();

        // Futures are only built here, nothing is sent
        assert_send(&client.select("tasks", &query));
        assert_send(&client.insert("tasks", row.clone()));
        assert_send(&client.update("tasks", "42", row));
        assert_send(&client.delete("tasks", "42"));
    }
}
