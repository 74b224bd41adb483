use chrono::Utc;
use lectern_application::{RoleRepository, UserRepository};
use lectern_core::{AppError, AppResult, NonEmptyString};
use lectern_domain::{
    ContentDocument, ContentKind, Permission, Role, UserAccount, UserStatus, normalize_roles,
};
use lectern_infrastructure::{
    PostgresContentRepository, PostgresRoleRepository, PostgresUserRepository,
};
use sqlx::PgPool;
use tracing::info;

const DEV_SEED_AUTHOR_ID: &str = "5b7f3c1e-8d2a-4f60-9a43-0c1e7d2b9f11";
const DEV_SEED_AUTHOR_EMAIL: &str = "author@lectern.local";
const DEV_SEED_AUTHOR_NAME: &str = "Seed Author";

const DEV_SEED_EDITOR_ROLE_ID: &str = "0f6d8a52-3c4b-4e1f-b7a9-52d1e6c08a34";
const DEV_SEED_MEMBER_ROLE_ID: &str = "9e2c4b71-6a5d-4c38-8f0e-1b3a7d9c2e56";

struct SeedDocument {
    id: &'static str,
    kind: ContentKind,
    slug: &'static str,
    title: &'static str,
    excerpt: &'static str,
    tags: &'static [&'static str],
    is_published: bool,
}

const DEV_SEED_DOCUMENTS: &[SeedDocument] = &[
    SeedDocument {
        id: "3a1f9b2c-7d4e-4a6b-8c5d-e0f1a2b3c4d5",
        kind: ContentKind::Blog,
        slug: "hello-lectern",
        title: "Hello, Lectern",
        excerpt: "A first published post for local development.",
        tags: &["announcements"],
        is_published: true,
    },
    SeedDocument {
        id: "4b2e0c3d-8e5f-4b7c-9d6e-f1a2b3c4d5e6",
        kind: ContentKind::Blog,
        slug: "draft-notes",
        title: "Draft notes",
        excerpt: "Only the author and draft reviewers can read this.",
        tags: &["drafts"],
        is_published: false,
    },
    SeedDocument {
        id: "5c3f1d4e-9f6a-4c8d-ae7f-a2b3c4d5e6f7",
        kind: ContentKind::Service,
        slug: "content-review",
        title: "Content review",
        excerpt: "Editorial review for long-form articles.",
        tags: &["editorial"],
        is_published: true,
    },
    SeedDocument {
        id: "6d4a2e5f-a07b-4d9e-bf8a-b3c4d5e6f7a8",
        kind: ContentKind::Course,
        slug: "writing-basics",
        title: "Writing basics",
        excerpt: "A short course on structuring articles.",
        tags: &["writing", "beginner"],
        is_published: true,
    },
];

/// Seeds an author, two roles and a handful of documents.
///
/// Every write is an upsert keyed by a fixed id, so the command can be rerun.
pub async fn run(pool: PgPool) -> AppResult<()> {
    let roles = PostgresRoleRepository::new(pool.clone());
    let users = PostgresUserRepository::new(pool.clone());
    let content = PostgresContentRepository::new(pool);

    ensure_seed_role(
        &roles,
        DEV_SEED_EDITOR_ROLE_ID,
        "editor",
        "Reviews drafts and engages with published content.",
        [
            Permission::VisitAdminPanel,
            Permission::BlogsViewDraft,
            Permission::BlogsLike,
            Permission::BlogsSave,
            Permission::CourseViewDraft,
            Permission::ServiceViewDraft,
            Permission::ServiceLike,
            Permission::ServiceSave,
        ],
    )
    .await?;
    ensure_seed_role(
        &roles,
        DEV_SEED_MEMBER_ROLE_ID,
        "member",
        "Likes and saves published content.",
        [
            Permission::BlogsLike,
            Permission::BlogsSave,
            Permission::ServiceLike,
            Permission::ServiceSave,
        ],
    )
    .await?;

    let author = ensure_seed_author(&users).await?;

    let now = Utc::now();
    for seed in DEV_SEED_DOCUMENTS {
        let mut document = ContentDocument::draft(
            seed.id,
            seed.kind,
            seed.slug,
            seed.title,
            author.member_ref(),
            now,
        );
        document.excerpt = seed.excerpt.to_owned();
        document.tags = seed.tags.iter().map(|tag| (*tag).to_owned()).collect();
        document.is_published = seed.is_published;

        content.insert_document(&document).await?;
    }

    info!(
        author = DEV_SEED_AUTHOR_EMAIL,
        documents = DEV_SEED_DOCUMENTS.len(),
        "development seed applied"
    );
    Ok(())
}

async fn ensure_seed_role<const N: usize>(
    roles: &PostgresRoleRepository,
    role_id: &str,
    name: &str,
    description: &str,
    permissions: [Permission; N],
) -> AppResult<()> {
    if roles.find_role_by_name(name).await?.is_some() {
        return Ok(());
    }

    let role = Role::new(
        role_id,
        NonEmptyString::new(name)?,
        description,
        2,
        permissions.into_iter().collect(),
        DEV_SEED_AUTHOR_ID,
        Utc::now(),
    )?;

    match roles.create_role(role).await {
        Ok(_) | Err(AppError::Conflict(_)) => Ok(()),
        Err(error) => Err(error),
    }
}

async fn ensure_seed_author(users: &PostgresUserRepository) -> AppResult<UserAccount> {
    if let Some(existing) = users.find_user_by_email(DEV_SEED_AUTHOR_EMAIL).await? {
        return Ok(existing);
    }

    let now = Utc::now();
    users
        .save_user(UserAccount {
            id: DEV_SEED_AUTHOR_ID.to_owned(),
            email: DEV_SEED_AUTHOR_EMAIL.to_owned(),
            name: Some(DEV_SEED_AUTHOR_NAME.to_owned()),
            image: None,
            bio: Some("Writes the sample posts.".to_owned()),
            roles: normalize_roles(["editor"]),
            status: UserStatus::Active,
            saved_content: Vec::new(),
            created_at: now,
            updated_at: now,
        })
        .await
}
