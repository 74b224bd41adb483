//! Account records and profile rules.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use lectern_core::{AppError, AppResult, UserIdentity};
use serde::{Deserialize, Serialize};

use crate::{ContentKind, DEFAULT_ROLE_NAME, MemberRef};

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated, lowercased email address.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        };

        if local.is_empty() || domain.contains('@') {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        }

        if domain.is_empty() || !domain.contains('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        if trimmed.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Lifecycle state of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// Fully usable account.
    Active,
    /// Disabled by its owner.
    Inactive,
    /// Disabled by an administrator.
    Blocked,
    /// Self-registered and awaiting review.
    Pending,
}

impl UserStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Blocked => "blocked",
            Self::Pending => "pending",
        }
    }
}

impl FromStr for UserStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "blocked" => Ok(Self::Blocked),
            "pending" => Ok(Self::Pending),
            _ => Err(AppError::Validation(format!(
                "unknown user status '{value}'"
            ))),
        }
    }
}

/// Cross-reference from an account to content it saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedContentRef {
    /// Saved content id.
    pub reference: String,
    /// Saved content kind.
    pub kind: ContentKind,
    /// When the save was recorded.
    pub created_at: DateTime<Utc>,
}

/// Stored account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Store-generated identifier.
    pub id: String,
    /// Unique, lowercased email.
    pub email: String,
    /// Display name.
    pub name: Option<String>,
    /// Avatar image URL.
    pub image: Option<String>,
    /// Short biography.
    #[serde(default)]
    pub bio: Option<String>,
    /// Role names in assignment order.
    pub roles: Vec<String>,
    /// Lifecycle state.
    pub status: UserStatus,
    /// Saved content cross-references.
    #[serde(default)]
    pub saved_content: Vec<SavedContentRef>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}

impl UserAccount {
    /// Returns whether `content_id` is in the saved list.
    #[must_use]
    pub fn has_saved(&self, content_id: &str) -> bool {
        self.saved_content
            .iter()
            .any(|entry| entry.reference == content_id)
    }

    /// Returns the identity handed to permission resolution.
    #[must_use]
    pub fn identity(&self) -> UserIdentity {
        UserIdentity::new(
            self.id.clone(),
            self.email.clone(),
            self.name.clone(),
            self.roles.clone(),
        )
        .with_image(self.image.clone())
    }

    /// Returns the minimal record stored in content membership lists.
    #[must_use]
    pub fn member_ref(&self) -> MemberRef {
        MemberRef {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            image: self.image.clone(),
        }
    }

    /// Applies a profile patch, leaving omitted fields untouched.
    pub fn apply_profile(&mut self, patch: &ProfilePatch, now: DateTime<Utc>) {
        if let Some(name) = &patch.name {
            self.name = Some(name.clone());
        }
        if let Some(bio) = &patch.bio {
            self.bio = Some(bio.clone());
        }
        if let Some(image) = &patch.image {
            self.image = Some(image.clone());
        }
        self.updated_at = now;
    }

    /// Case-insensitive substring match over name, email and bio.
    #[must_use]
    pub fn matches_text(&self, text: &str) -> bool {
        let needle = text.to_lowercase();
        [self.name.as_deref(), Some(self.email.as_str()), self.bio.as_deref()]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(needle.as_str()))
    }
}

/// Normalizes stored roles: `user` first, then each other role once.
#[must_use]
pub fn normalize_roles<'a>(roles: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut normalized = vec![DEFAULT_ROLE_NAME.to_owned()];
    for role in roles {
        let role = role.trim();
        if !role.is_empty() && !normalized.iter().any(|existing| existing == role) {
            normalized.push(role.to_owned());
        }
    }

    normalized
}

/// Editable profile fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePatch {
    /// New display name.
    pub name: Option<String>,
    /// New biography.
    pub bio: Option<String>,
    /// New avatar image URL.
    pub image: Option<String>,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{EmailAddress, UserAccount, UserStatus, normalize_roles};

    #[test]
    fn email_is_lowercased() {
        let email = EmailAddress::new("  Ada@Example.COM ");
        assert_eq!(email.ok().map(String::from), Some("ada@example.com".to_owned()));
    }

    #[test]
    fn email_requires_single_at_and_dotted_domain() {
        assert!(EmailAddress::new("ada@@example.com").is_err());
        assert!(EmailAddress::new("ada@localhost").is_err());
        assert!(EmailAddress::new("@example.com").is_err());
    }

    #[test]
    fn roles_start_with_user_and_are_deduplicated() {
        let roles = normalize_roles(["editor", "user", "editor", " "]);
        assert_eq!(roles, vec!["user".to_owned(), "editor".to_owned()]);
    }

    #[test]
    fn text_match_covers_name_email_and_bio() {
        let now = Utc::now();
        let account = UserAccount {
            id: "u1".to_owned(),
            email: "ada@example.com".to_owned(),
            name: Some("Ada Lovelace".to_owned()),
            image: None,
            bio: Some("Writes about engines".to_owned()),
            roles: vec!["user".to_owned()],
            status: UserStatus::Active,
            saved_content: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        assert!(account.matches_text("LOVELACE"));
        assert!(account.matches_text("example.com"));
        assert!(account.matches_text("engines"));
        assert!(!account.matches_text("babbage"));
    }
}
