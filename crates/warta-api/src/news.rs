//! News and authoring endpoints
//!
//! Feeds, category listings, detail lookups, search, and the authoring
//! calls (create, update, list-by-author). All simple request/response;
//! the list endpoints share the lenient `data` handling.

use crate::client::ApiClient;
use crate::error::ApiError;
use serde_json::Value;
use warta_core::{
    Article, ArticleDraft, Category, CategoryListResponse, NewsDetailsResponse, NewsListResponse,
};

impl ApiClient {
    /// Front-page feed (`GET /news`)
    pub async fn news_feed(&self) -> Result<Vec<Article>, ApiError> {
        let response: NewsListResponse = self.get_json("/news").await?;
        Ok(response.data)
    }

    /// Breaking news ticker (`GET /breaking-news`)
    pub async fn breaking_news(&self) -> Result<Vec<Article>, ApiError> {
        let response: NewsListResponse = self.get_json("/breaking-news").await?;
        Ok(response.data)
    }

    /// Articles in a category (`GET /news/category`).
    ///
    /// `view_all` asks the backend for the unabridged listing, as the
    /// view-all screen does.
    pub async fn news_by_category(
        &self,
        category: &str,
        view_all: bool,
    ) -> Result<Vec<Article>, ApiError> {
        let mut query = vec![("category", category)];
        if view_all {
            query.push(("viewAll", "y"));
        }
        let response: NewsListResponse = self.get_json_query("/news/category", &query).await?;
        Ok(response.data)
    }

    /// Article detail (`GET /news-details/{slug}`)
    pub async fn news_details(&self, slug: &str) -> Result<Article, ApiError> {
        let response: NewsDetailsResponse =
            self.get_json(&format!("/news-details/{slug}")).await?;
        response
            .data
            .ok_or_else(|| ApiError::MalformedPayload("news details without data".to_string()))
    }

    /// Title search (`GET /news/search`)
    pub async fn search_news(&self, query: &str) -> Result<Vec<Article>, ApiError> {
        let response: NewsListResponse = self
            .get_json_query("/news/search", &[("name", query)])
            .await?;
        Ok(response.data)
    }

    /// Available article categories (`GET /category-name`), for the
    /// authoring category picker
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let response: CategoryListResponse = self.get_json("/category-name").await?;
        Ok(response.data)
    }

    /// Submit a new article (`POST /post-berita`, bearer)
    pub async fn create_article(&self, draft: &ArticleDraft) -> Result<(), ApiError> {
        let _: Value = self.post_json_auth("/post-berita", draft).await?;
        Ok(())
    }

    /// Update an existing article (`POST /update-berita/{slug}`, bearer)
    pub async fn update_article(&self, slug: &str, draft: &ArticleDraft) -> Result<(), ApiError> {
        let _: Value = self
            .post_json_auth(&format!("/update-berita/{slug}"), draft)
            .await?;
        Ok(())
    }

    /// The caller's own articles (`POST /list-by-author`, bearer, empty body)
    pub async fn list_by_author(&self) -> Result<Vec<Article>, ApiError> {
        let response: NewsListResponse = self
            .post_json_auth("/list-by-author", &Value::Object(Default::default()))
            .await?;
        Ok(response.data)
    }
}
