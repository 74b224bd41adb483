use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use lectern_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::Permission;

/// Name of the role every identity implicitly carries.
pub const DEFAULT_ROLE_NAME: &str = "user";

/// Name of the role that implies the whole permission catalog.
pub const OPERATOR_ROLE_NAME: &str = "operator";

/// Author recorded on built-in roles.
const SYSTEM_ACTOR: &str = "system";

/// Activation state of a role record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleStatus {
    /// Role grants its permissions.
    Active,
    /// Role is kept but grants nothing.
    Inactive,
}

impl RoleStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl FromStr for RoleStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(AppError::Validation(format!(
                "unknown role status '{value}'"
            ))),
        }
    }
}

/// Named permission bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Store-generated identifier.
    pub id: String,
    /// Unique role name referenced by identities.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Ordering hint for administration screens.
    pub rank: i32,
    /// Granted permissions.
    pub permissions: BTreeSet<Permission>,
    /// Activation state.
    pub status: RoleStatus,
    /// Identity id that created the role.
    pub created_by: String,
    /// Identity id that last changed the role.
    pub updated_by: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Builds a new stored role after validating its name.
    ///
    /// Built-in role names are reserved.
    pub fn new(
        id: impl Into<String>,
        name: NonEmptyString,
        description: impl Into<String>,
        rank: i32,
        permissions: BTreeSet<Permission>,
        created_by: impl Into<String>,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        let name = name.as_str().trim().to_owned();
        if BuiltinRole::from_name(name.as_str()).is_some() {
            return Err(AppError::Validation(format!(
                "role name '{name}' is reserved for a built-in role"
            )));
        }

        let created_by = created_by.into();
        Ok(Self {
            id: id.into(),
            name,
            description: description.into(),
            rank,
            permissions,
            status: RoleStatus::Active,
            updated_by: created_by.clone(),
            created_by,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns whether the role currently grants its permissions.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == RoleStatus::Active
    }
}

/// Roles that exist even when the role store is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinRole {
    /// Carried by every identity, grants the `default-user` bundle.
    User,
    /// Grants the full catalog.
    Operator,
}

impl BuiltinRole {
    /// Returns all built-in roles in rank order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[BuiltinRole] = &[BuiltinRole::User, BuiltinRole::Operator];

        ALL
    }

    /// Resolves a built-in role by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            DEFAULT_ROLE_NAME => Some(Self::User),
            OPERATOR_ROLE_NAME => Some(Self::Operator),
            _ => None,
        }
    }

    /// Returns the reserved role name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::User => DEFAULT_ROLE_NAME,
            Self::Operator => OPERATOR_ROLE_NAME,
        }
    }

    /// Materializes the built-in role as a role record.
    #[must_use]
    pub fn to_role(&self) -> Role {
        let (id, description, rank, permissions) = match self {
            Self::User => (
                "builtin-user",
                "Assigned to every account.",
                1,
                Permission::default_user_bundle(),
            ),
            Self::Operator => (
                "builtin-operator",
                "Holds every permission in the catalog.",
                2,
                Permission::operator_bundle(),
            ),
        };

        Role {
            id: id.to_owned(),
            name: self.name().to_owned(),
            description: description.to_owned(),
            rank,
            permissions: permissions.iter().copied().collect(),
            status: RoleStatus::Active,
            created_by: SYSTEM_ACTOR.to_owned(),
            updated_by: SYSTEM_ACTOR.to_owned(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

/// How a role name on an identity is resolved into permissions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoleKind {
    /// The implicit `user` role; its bundle is always granted.
    Default,
    /// A role defined in the role store.
    Named(String),
    /// The `operator` role; implies every permission.
    Operator,
}

impl RoleKind {
    /// Classifies a role name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match BuiltinRole::from_name(name) {
            Some(BuiltinRole::User) => Self::Default,
            Some(BuiltinRole::Operator) => Self::Operator,
            None => Self::Named(name.to_owned()),
        }
    }

    /// Returns the role name this kind was classified from.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Default => DEFAULT_ROLE_NAME,
            Self::Named(name) => name.as_str(),
            Self::Operator => OPERATOR_ROLE_NAME,
        }
    }
}
