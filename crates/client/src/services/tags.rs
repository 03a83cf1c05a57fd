use super::{ADMIN, page_pairs};
use crate::{ApiClient, dispatcher::ApiRequest};
use scribe_types::{PageQuery, PageResult, Tag, TaxonomyParams, traits::Result};

pub struct TagApi<'a> {
    client: &'a ApiClient,
}

impl<'a> TagApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// # Errors
    ///
    /// Returns the classified [`scribe_types::ApiError`].
    pub async fn page(&self, query: &PageQuery) -> Result<PageResult<Tag>> {
        let request = ApiRequest::get(format!("{ADMIN}/tag/page")).query(page_pairs(query)?);
        self.client.send_json(&request).await
    }

    /// Every tag, unpaged.
    ///
    /// # Errors
    ///
    /// Returns the classified [`scribe_types::ApiError`].
    pub async fn list(&self) -> Result<Vec<Tag>> {
        self.client
            .send_json(&ApiRequest::get(format!("{ADMIN}/tag/list")))
            .await
    }

    /// # Errors
    ///
    /// Returns the classified [`scribe_types::ApiError`].
    pub async fn get(&self, id: &str) -> Result<Tag> {
        self.client
            .send_json(&ApiRequest::get(format!("{ADMIN}/tag/{id}")))
            .await
    }

    /// # Errors
    ///
    /// Returns the classified [`scribe_types::ApiError`].
    pub async fn create(&self, params: &TaxonomyParams) -> Result<Tag> {
        let request = ApiRequest::post(format!("{ADMIN}/tag")).json(serde_json::to_value(params)?);
        self.client.send_json(&request).await
    }

    /// # Errors
    ///
    /// Returns the classified [`scribe_types::ApiError`].
    pub async fn update(&self, params: &TaxonomyParams) -> Result<Tag> {
        let request = ApiRequest::put(format!("{ADMIN}/tag")).json(serde_json::to_value(params)?);
        self.client.send_json(&request).await
    }

    /// # Errors
    ///
    /// Returns the classified [`scribe_types::ApiError`].
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client
            .send(&ApiRequest::delete(format!("{ADMIN}/tag/{id}")))
            .await?;
        Ok(())
    }
}
