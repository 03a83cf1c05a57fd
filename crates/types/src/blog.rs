//! Blog content DTOs exchanged with the admin API.
//!
//! Known fields are typed; anything else the server sends (or a caller wants to
//! pass through) is kept in a flattened `extra` map so the client stays
//! forward-compatible with server additions.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Reads an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Publication state of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
    Private,
}

impl From<PostStatus> for u8 {
    fn from(s: PostStatus) -> Self {
        match s {
            PostStatus::Draft => 0,
            PostStatus::Published => 1,
            PostStatus::Private => 2,
        }
    }
}

impl TryFrom<u8> for PostStatus {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::Draft),
            1 => Ok(Self::Published),
            2 => Ok(Self::Private),
            other => Err(format!("unknown post status: {other}")),
        }
    }
}

/// A tag as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub post_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A category as returned by the API. Same shape as [`Tag`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub post_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Create/update payload shared by tags and categories.
///
/// `id` is required for updates and must be absent for creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TaxonomyParams {
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            slug: slug.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// A post as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: PostStatus,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tag_ids: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tag_list: Vec<Tag>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub view_count: u64,
    #[serde(default)]
    pub published_time: Option<String>,
    #[serde(default)]
    pub modified_time: Option<String>,
    /// Everything else (`coverImage`, `top`, `wordCount`, …).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Create/update payload for posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    /// Generated by the server when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub content: String,
    /// Generated by the server when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub status: PostStatus,
    pub category_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tag_ids: Vec<String>,
    pub author_id: String,
    /// Dynamic fields forwarded verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Paging and filter parameters for `*/page` and `*/list` endpoints.
///
/// Serialized to query pairs: absent values are skipped, list values repeat the key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    /// Comma-separated `field order` entries, e.g. `"publishedTime desc,title asc"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    /// Free-form filters (`word`, `status`, `categoryId`, `tagId`, …).
    #[serde(flatten)]
    pub filters: Map<String, Value>,
}

impl PageQuery {
    #[must_use]
    pub fn page(current: u32, page_size: u32) -> Self {
        Self {
            current: Some(current),
            page_size: Some(page_size),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }
}
