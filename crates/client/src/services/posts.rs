use super::{ADMIN, page_pairs};
use crate::{ApiClient, dispatcher::ApiRequest};
use scribe_types::{PageQuery, PageResult, Post, PostParams, traits::Result};
use serde_json::{Value, json};

pub struct PostApi<'a> {
    client: &'a ApiClient,
}

impl<'a> PostApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    fn path(suffix: &str) -> String {
        format!("{ADMIN}/post/{suffix}")
    }

    /// One page of posts. Filters: `word`, `status`, `categoryId`, `tagId`,
    /// `authorId`, `startDate`, `endDate`.
    ///
    /// # Errors
    ///
    /// Returns the classified [`scribe_types::ApiError`].
    pub async fn page(&self, query: &PageQuery) -> Result<PageResult<Post>> {
        let request = ApiRequest::get(Self::path("page")).query(page_pairs(query)?);
        self.client.send_json(&request).await
    }

    /// # Errors
    ///
    /// Returns the classified [`scribe_types::ApiError`].
    pub async fn get(&self, id: &str) -> Result<Post> {
        self.client.send_json(&ApiRequest::get(Self::path(id))).await
    }

    /// # Errors
    ///
    /// Returns the classified [`scribe_types::ApiError`].
    pub async fn update(&self, params: &PostParams) -> Result<Post> {
        let request = ApiRequest::put(format!("{ADMIN}/post")).json(serde_json::to_value(params)?);
        self.client.send_json(&request).await
    }

    /// # Errors
    ///
    /// Returns the classified [`scribe_types::ApiError`].
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.send(&ApiRequest::delete(Self::path(id))).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the classified [`scribe_types::ApiError`].
    pub async fn batch_delete(&self, ids: &[String]) -> Result<()> {
        let request = ApiRequest::delete(Self::path("batch")).json(json!({ "ids": ids }));
        self.client.send(&request).await?;
        Ok(())
    }

    /// Saves a new post as a draft.
    ///
    /// # Errors
    ///
    /// Returns the classified [`scribe_types::ApiError`].
    pub async fn create_draft(&self, params: &PostParams) -> Result<Post> {
        self.create("draft", params).await
    }

    /// Creates a post and publishes it in one step.
    ///
    /// # Errors
    ///
    /// Returns the classified [`scribe_types::ApiError`].
    pub async fn create_and_publish(&self, params: &PostParams) -> Result<Post> {
        self.create("direct/publish", params).await
    }

    /// # Errors
    ///
    /// Returns the classified [`scribe_types::ApiError`].
    pub async fn publish(&self, id: &str) -> Result<Post> {
        self.action(id, "publish").await
    }

    /// # Errors
    ///
    /// Returns the classified [`scribe_types::ApiError`].
    pub async fn unpublish(&self, id: &str) -> Result<Post> {
        self.action(id, "unpublish").await
    }

    /// Duplicates a post; the copy is returned.
    ///
    /// # Errors
    ///
    /// Returns the classified [`scribe_types::ApiError`].
    pub async fn copy(&self, id: &str) -> Result<Post> {
        self.action(id, "copy").await
    }

    async fn create(&self, suffix: &str, params: &PostParams) -> Result<Post> {
        let body: Value = serde_json::to_value(params)?;
        self.client
            .send_json(&ApiRequest::post(Self::path(suffix)).json(body))
            .await
    }

    async fn action(&self, id: &str, action: &str) -> Result<Post> {
        self.client
            .send_json(&ApiRequest::post(Self::path(&format!("{id}/{action}"))))
            .await
    }
}
