use serde::{Deserialize, Serialize};

/// Verified identity handed over by the identity provider.
///
/// Permission resolution only reads `id`, `email` and `roles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    id: String,
    email: String,
    display_name: Option<String>,
    image: Option<String>,
    roles: Vec<String>,
}

impl UserIdentity {
    /// Creates a user identity from the stored account data.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        display_name: Option<String>,
        roles: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            display_name,
            image: None,
            roles,
        }
    }

    /// Attaches an avatar image URL.
    #[must_use]
    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }

    /// Returns the stable account identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the account email.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Returns the display name, if the account has one.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Returns the avatar image URL, if any.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Returns role names in the order they were stored.
    #[must_use]
    pub fn roles(&self) -> &[String] {
        self.roles.as_slice()
    }
}
