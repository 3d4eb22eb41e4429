use url::Url;

/// Just a wrapper around the store URL and its credentials
#[derive(Clone, Debug)]
pub struct Resource {
    url: Url,
    api_key: String,
    access_token: Option<String>,
}

impl Resource {
    pub fn new(url: Url, api_key: String, access_token: Option<String>) -> Self {
        Self { url, api_key, access_token }
    }

    pub fn url(&self) -> &Url { &self.url }
    pub fn api_key(&self) -> &str { &self.api_key }

    /// The bearer token requests are authenticated with.
    /// This is the user's access token when there is one, or the anonymous API key otherwise
    pub fn bearer(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.api_key)
    }

    /// Build the REST endpoint of a collection, keeping the same scheme and server but changing the path part
    pub fn collection_url(&self, collection: &str) -> Url {
        let mut built = self.url.clone();
        built.set_path(&format!("/rest/v1/{}", collection));
        built.set_query(None);
        built
    }
}
