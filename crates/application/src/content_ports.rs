use async_trait::async_trait;
use lectern_core::AppResult;
use lectern_domain::{ContentDocument, ContentFilter, ContentKind, ContentUpdate};

/// Counter used to rank content listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentOrder {
    /// Most viewed first.
    #[default]
    Views,
    /// Most liked first.
    Likes,
    /// Most saved first.
    Saves,
}

impl ContentOrder {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Views => "views",
            Self::Likes => "likes",
            Self::Saves => "saves",
        }
    }

    /// Reads the ranking counter from a document.
    #[must_use]
    pub fn counter_value(&self, document: &ContentDocument) -> u64 {
        match self {
            Self::Views => document.views,
            Self::Likes => document.likes,
            Self::Saves => document.saves,
        }
    }
}

/// Query for ranked published content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopContentQuery {
    /// Kind to list.
    pub kind: ContentKind,
    /// Ranking counter, descending.
    pub order_by: ContentOrder,
    /// Page size.
    pub limit: usize,
    /// Documents to skip.
    pub skip: usize,
}

/// Free-text query over one content kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSearchQuery {
    /// Kind to search.
    pub kind: ContentKind,
    /// Case-insensitive substring matched against title, excerpt, body and tags.
    pub text: String,
    /// Whether drafts are candidates.
    pub include_drafts: bool,
    /// Page size.
    pub limit: usize,
    /// Documents to skip.
    pub skip: usize,
}

/// One page of content with the total number of candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPage {
    /// Documents on this page.
    pub items: Vec<ContentDocument>,
    /// Documents matching the query before paging.
    pub total: u64,
}

/// Repository port for content documents.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Finds one document by id.
    async fn find_content_by_id(&self, content_id: &str) -> AppResult<Option<ContentDocument>>;

    /// Finds one document by kind and slug.
    async fn find_content_by_slug(
        &self,
        kind: ContentKind,
        slug: &str,
    ) -> AppResult<Option<ContentDocument>>;

    /// Lists documents written by one author, newest first.
    async fn list_content_by_author(
        &self,
        kind: ContentKind,
        author_id: &str,
        include_drafts: bool,
    ) -> AppResult<Vec<ContentDocument>>;

    /// Lists published documents ranked by a counter.
    async fn list_top_content(&self, query: TopContentQuery) -> AppResult<ContentPage>;

    /// Searches one kind, newest first.
    async fn search_content(&self, query: ContentSearchQuery) -> AppResult<ContentPage>;

    /// Atomically applies `update` to the document matching `filter`.
    ///
    /// Returns the updated document, or `None` when nothing matched.
    async fn find_one_and_update(
        &self,
        filter: ContentFilter,
        update: ContentUpdate,
    ) -> AppResult<Option<ContentDocument>>;
}
