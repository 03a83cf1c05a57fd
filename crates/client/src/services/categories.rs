use super::{ADMIN, page_pairs};
use crate::{ApiClient, dispatcher::ApiRequest};
use scribe_types::{Category, PageQuery, PageResult, TaxonomyParams, traits::Result};

pub struct CategoryApi<'a> {
    client: &'a ApiClient,
}

impl<'a> CategoryApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// # Errors
    ///
    /// Returns the classified [`scribe_types::ApiError`].
    pub async fn page(&self, query: &PageQuery) -> Result<PageResult<Category>> {
        let request =
            ApiRequest::get(format!("{ADMIN}/category/page")).query(page_pairs(query)?);
        self.client.send_json(&request).await
    }

    /// All categories, optionally narrowed by `filter` (e.g. `name`).
    ///
    /// # Errors
    ///
    /// Returns the classified [`scribe_types::ApiError`].
    pub async fn list(&self, filter: Option<&PageQuery>) -> Result<Vec<Category>> {
        let mut request = ApiRequest::get(format!("{ADMIN}/category/list"));
        if let Some(filter) = filter {
            request = request.query(page_pairs(filter)?);
        }
        self.client.send_json(&request).await
    }

    /// # Errors
    ///
    /// Returns the classified [`scribe_types::ApiError`].
    pub async fn get(&self, id: &str) -> Result<Category> {
        self.client
            .send_json(&ApiRequest::get(format!("{ADMIN}/category/{id}")))
            .await
    }

    /// # Errors
    ///
    /// Returns the classified [`scribe_types::ApiError`].
    pub async fn create(&self, params: &TaxonomyParams) -> Result<Category> {
        let request =
            ApiRequest::post(format!("{ADMIN}/category")).json(serde_json::to_value(params)?);
        self.client.send_json(&request).await
    }

    /// # Errors
    ///
    /// Returns the classified [`scribe_types::ApiError`].
    pub async fn update(&self, params: &TaxonomyParams) -> Result<Category> {
        let request =
            ApiRequest::put(format!("{ADMIN}/category")).json(serde_json::to_value(params)?);
        self.client.send_json(&request).await
    }

    /// # Errors
    ///
    /// Returns the classified [`scribe_types::ApiError`].
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client
            .send(&ApiRequest::delete(format!("{ADMIN}/category/{id}")))
            .await?;
        Ok(())
    }
}
