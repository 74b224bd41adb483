use std::sync::Arc;

use chrono::Utc;
use lectern_application::{
    ContentOrder, ContentRepository, ContentSearchQuery, TopContentQuery,
};
use lectern_domain::{
    ContentDocument, ContentFilter, ContentKind, ContentUpdate, Counter, MemberList, MemberRef,
};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::{PostgresContentRepository, canonical_document_id};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(8)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres content repository tests: {error}");
    }

    Some(pool)
}

fn member(id: &str) -> MemberRef {
    MemberRef {
        id: id.to_owned(),
        email: format!("{id}@example.com"),
        name: None,
        image: None,
    }
}

fn published_blog(author_id: &str) -> ContentDocument {
    let id = Uuid::new_v4().to_string();
    let slug = format!("post-{id}");
    ContentDocument::draft(id, ContentKind::Blog, slug, "Post", member(author_id), Utc::now())
        .published()
}

fn like_by(content_id: &str, user_id: &str) -> (ContentFilter, ContentUpdate) {
    (
        ContentFilter::by_id(content_id)
            .published()
            .without_member(MemberList::LikedBy, user_id),
        ContentUpdate::new()
            .increment(Counter::Likes, 1)
            .add_member(MemberList::LikedBy, member(user_id)),
    )
}

#[tokio::test]
async fn stored_document_round_trips_by_id_and_slug() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresContentRepository::new(pool);
    let document = published_blog("author-round-trip");
    assert!(repository.insert_document(&document).await.is_ok());

    let by_id = repository.find_content_by_id(document.id.as_str()).await;
    let by_slug = repository
        .find_content_by_slug(ContentKind::Blog, document.slug.as_str())
        .await;
    let malformed = repository.find_content_by_id("not-a-uuid").await;

    assert!(by_id.is_ok_and(|found| found.is_some_and(|found| found.id == document.id)));
    assert!(by_slug.is_ok_and(|found| found.is_some()));
    assert!(malformed.is_ok_and(|found| found.is_none()));
}

#[tokio::test]
async fn guarded_update_is_rejected_after_first_application() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresContentRepository::new(pool);
    let document = published_blog("author-guard");
    assert!(repository.insert_document(&document).await.is_ok());

    let (filter, update) = like_by(document.id.as_str(), "u1");
    let first = repository
        .find_one_and_update(filter.clone(), update.clone())
        .await;
    let second = repository.find_one_and_update(filter, update).await;

    assert!(first.is_ok_and(|updated| updated.is_some_and(|updated| updated.likes == 1)));
    assert!(second.is_ok_and(|updated| updated.is_none()));
}

#[tokio::test]
async fn concurrent_guarded_updates_serialize_on_row_lock() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = Arc::new(PostgresContentRepository::new(pool));
    let document = published_blog("author-concurrency");
    assert!(repository.insert_document(&document).await.is_ok());

    let mut handles = Vec::new();
    for index in 0..16 {
        let repository = repository.clone();
        let content_id = document.id.clone();
        handles.push(tokio::spawn(async move {
            let (filter, update) = like_by(content_id.as_str(), &format!("u{}", index % 4));
            repository
                .find_one_and_update(filter, update)
                .await
                .is_ok_and(|updated| updated.is_some())
        }));
    }

    let mut applied = 0;
    for handle in handles {
        if handle.await.unwrap_or_default() {
            applied += 1;
        }
    }

    let stored = repository.find_content_by_id(document.id.as_str()).await;
    assert_eq!(applied, 4);
    assert!(stored.is_ok_and(|stored| stored.is_some_and(|stored| {
        stored.likes == 4 && stored.liked_by.len() == 4
    })));
}

#[tokio::test]
async fn author_listing_and_top_content_respect_publication() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresContentRepository::new(pool);
    let author_id = format!("author-{}", Uuid::new_v4());
    let mut popular = published_blog(author_id.as_str());
    popular.views = u64::MAX / 4;
    let mut draft = published_blog(author_id.as_str());
    draft.is_published = false;
    draft.views = u64::MAX / 2;
    assert!(repository.insert_document(&popular).await.is_ok());
    assert!(repository.insert_document(&draft).await.is_ok());

    let public = repository
        .list_content_by_author(ContentKind::Blog, author_id.as_str(), false)
        .await;
    let with_drafts = repository
        .list_content_by_author(ContentKind::Blog, author_id.as_str(), true)
        .await;
    let top = repository
        .list_top_content(TopContentQuery {
            kind: ContentKind::Blog,
            order_by: ContentOrder::Views,
            limit: 1,
            skip: 0,
        })
        .await;

    assert!(public.is_ok_and(|documents| documents.len() == 1));
    assert!(with_drafts.is_ok_and(|documents| documents.len() == 2));
    assert!(top.is_ok_and(|page| {
        page.total >= 1 && page.items.first().is_some_and(|first| first.id == popular.id)
    }));
}

#[test]
fn only_the_stored_uuid_form_is_accepted() {
    let id = "67e55044-10b1-426f-9247-bb680e5fe0c8";

    assert!(canonical_document_id(id).is_some());
    assert!(canonical_document_id(id.to_uppercase().as_str()).is_none());
    assert!(canonical_document_id("67e5504410b1426f9247bb680e5fe0c8").is_none());
    assert!(canonical_document_id(format!("{{{id}}}").as_str()).is_none());
    assert!(canonical_document_id(format!("urn:uuid:{id}").as_str()).is_none());
}

#[tokio::test]
async fn non_canonical_ids_neither_resolve_nor_update() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresContentRepository::new(pool);
    let document = published_blog("author-canonical");
    assert!(repository.insert_document(&document).await.is_ok());
    let uppercase = document.id.to_uppercase();

    let found = repository.find_content_by_id(uppercase.as_str()).await;
    let (filter, update) = like_by(uppercase.as_str(), "u1");
    let updated = repository.find_one_and_update(filter, update).await;
    let stored = repository.find_content_by_id(document.id.as_str()).await;

    assert!(found.is_ok_and(|found| found.is_none()));
    assert!(updated.is_ok_and(|updated| updated.is_none()));
    assert!(stored.is_ok_and(|stored| stored.is_some_and(|stored| stored.likes == 0)));
}

#[tokio::test]
async fn search_matches_titles_and_tags_case_insensitively() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresContentRepository::new(pool);
    let token = format!("token{}", Uuid::new_v4().simple());
    let mut titled = published_blog("author-search");
    titled.title = format!("About {}", token.to_uppercase());
    let mut tagged_draft = published_blog("author-search");
    tagged_draft.tags = vec![token.clone()];
    tagged_draft.is_published = false;
    let mut wildcard = published_blog("author-search");
    wildcard.title = format!("{token}%");
    assert!(repository.insert_document(&titled).await.is_ok());
    assert!(repository.insert_document(&tagged_draft).await.is_ok());
    assert!(repository.insert_document(&wildcard).await.is_ok());
    let query = |text: String, include_drafts| ContentSearchQuery {
        kind: ContentKind::Blog,
        text,
        include_drafts,
        limit: 10,
        skip: 0,
    };

    let public = repository.search_content(query(token.clone(), false)).await;
    let with_drafts = repository.search_content(query(token.clone(), true)).await;
    let literal_percent = repository
        .search_content(query(format!("{token}%"), true))
        .await;

    assert!(public.is_ok_and(|page| page.total == 2));
    assert!(with_drafts.is_ok_and(|page| page.total == 3));
    assert!(literal_percent.is_ok_and(|page| {
        page.total == 1 && page.items.first().is_some_and(|first| first.id == wildcard.id)
    }));
}
