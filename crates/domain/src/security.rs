use std::collections::BTreeSet;
use std::str::FromStr;

use lectern_core::AppError;
use serde::{Deserialize, Serialize};

macro_rules! permission_catalog {
    ($($variant:ident => $id:literal, $name:literal, $description:literal;)+) => {
        /// Every permission the platform knows about.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(rename_all = "snake_case")]
        pub enum Permission {
            $(
                #[doc = $description]
                $variant,
            )+
        }

        impl Permission {
            /// Returns a stable storage value for this permission.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $id,)+
                }
            }

            /// Returns the human readable name shown in administration screens.
            #[must_use]
            pub fn display_name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }

            /// Returns a one-line explanation of what the permission allows.
            #[must_use]
            pub fn description(&self) -> &'static str {
                match self {
                    $(Self::$variant => $description,)+
                }
            }

            /// Returns all known permissions in catalog order.
            #[must_use]
            pub fn all() -> &'static [Self] {
                const ALL: &[Permission] = &[$(Permission::$variant,)+];

                ALL
            }
        }

        impl FromStr for Permission {
            type Err = AppError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($id => Ok(Self::$variant),)+
                    _ => Err(AppError::Validation(format!(
                        "unknown permission value '{value}'"
                    ))),
                }
            }
        }
    };
}

permission_catalog! {
    VisitAdminPanel => "visit_admin_panel", "Visit Admin Panel",
        "Allows opening the administrative control panel.";
    UserAdd => "user_add", "Add User",
        "Allows creating user accounts that start out active.";
    UserEdit => "user_edit", "Edit User",
        "Allows updating one's own profile.";
    UserDelete => "user_delete", "Delete User",
        "Allows removing user accounts.";
    UserView => "user_view", "View User",
        "Allows reading user profiles and their roles.";
    UserEditOthers => "user_edit_others", "Edit Other Users",
        "Allows updating profiles that belong to other users.";
    RoleAdd => "role_add", "Add Role",
        "Allows creating roles with a permission subset.";
    RoleEdit => "role_edit", "Edit Role",
        "Allows changing a role's permissions and status.";
    RoleDelete => "role_delete", "Delete Role",
        "Allows removing roles.";
    RoleView => "role_view", "View Role",
        "Allows reading role definitions.";
    PermissionAdd => "permission_add", "Add Permission",
        "Allows introducing permissions.";
    PermissionEdit => "permission_edit", "Edit Permission",
        "Allows modifying permission metadata.";
    PermissionDelete => "permission_delete", "Delete Permission",
        "Allows removing permissions.";
    PermissionView => "permission_view", "View Permission",
        "Allows reading the permission catalog.";
    BlogsAdd => "blogs_add", "Add Blog",
        "Allows writing new blog posts.";
    BlogsEdit => "blogs_edit", "Edit Blog",
        "Allows editing one's own blog posts.";
    BlogsDelete => "blogs_delete", "Delete Blog",
        "Allows deleting one's own blog posts.";
    BlogsEditOthers => "blogs_edit_others", "Edit Other's Blog",
        "Allows editing blog posts written by other users.";
    BlogsDeleteOthers => "blogs_delete_others", "Delete Other's Blog",
        "Allows deleting blog posts written by other users.";
    BlogsViewPublished => "blogs_view_published", "View Published Blog",
        "Allows reading published blog posts.";
    BlogsViewDraft => "blogs_view_draft", "View Draft Blog",
        "Allows reading unpublished blog drafts.";
    BlogsLike => "blogs_like", "Like Blog",
        "Allows liking blog posts.";
    BlogsComment => "blogs_comment", "Comment on Blog",
        "Allows commenting on blog posts.";
    BlogsCommentLike => "blogs_comment_like", "Like Blog Comment",
        "Allows liking comments on blog posts.";
    BlogsCommentEdit => "blogs_comment_edit", "Edit Blog Comment",
        "Allows editing one's own blog comments.";
    BlogsCommentDelete => "blogs_comment_delete", "Delete Blog Comment",
        "Allows deleting one's own blog comments.";
    BlogsCommentEditOthers => "blogs_comment_edit_others", "Edit Other's Comment",
        "Allows editing blog comments written by other users.";
    BlogsCommentDeleteOthers => "blogs_comment_delete_others", "Delete Other's Comment",
        "Allows deleting blog comments written by other users.";
    BlogsSave => "blogs_save", "Save Blog",
        "Allows bookmarking blog posts.";
    CourseEnroll => "course_enroll", "Enroll in Course",
        "Allows enrolling in courses.";
    CourseAdd => "course_add", "Add Course",
        "Allows creating courses.";
    CourseEdit => "course_edit", "Edit Course",
        "Allows editing one's own courses.";
    CourseDelete => "course_delete", "Delete Course",
        "Allows deleting one's own courses.";
    CourseEditOthers => "course_edit_others", "Edit Other's Course",
        "Allows editing courses created by other users.";
    CourseDeleteOthers => "course_delete_others", "Delete Other's Course",
        "Allows deleting courses created by other users.";
    CourseViewPublished => "course_view_published", "View Published Course",
        "Allows reading published courses.";
    CourseViewDraft => "course_view_draft", "View Draft Course",
        "Allows reading unpublished course drafts.";
    ServiceEnroll => "service_enroll", "Enroll in Service",
        "Allows signing up for services.";
    ServiceAdd => "service_add", "Add Service",
        "Allows creating services.";
    ServiceEdit => "service_edit", "Edit Service",
        "Allows editing one's own services.";
    ServiceDelete => "service_delete", "Delete Service",
        "Allows deleting one's own services.";
    ServiceEditOthers => "service_edit_others", "Edit Other's Service",
        "Allows editing services created by other users.";
    ServiceDeleteOthers => "service_delete_others", "Delete Other's Service",
        "Allows deleting services created by other users.";
    ServiceViewPublished => "service_view_published", "View Published Service",
        "Allows reading published services.";
    ServiceViewDraft => "service_view_draft", "View Draft Service",
        "Allows reading unpublished service drafts.";
    ServiceLike => "service_like", "Like Service",
        "Allows liking services.";
    ServiceComment => "service_comment", "Comment on Service",
        "Allows commenting on services.";
    ServiceSave => "service_save", "Save Service",
        "Allows bookmarking services.";
    DatabaseManage => "database_manage", "Manage Database",
        "Allows managing the primary database.";
    StaticDatabaseManage => "static_database_manage", "Manage Static Database",
        "Allows managing the static database.";
    StaticDatabaseConfigurationEdit => "static_database_configuration_edit",
        "Edit Static Database Configuration",
        "Allows changing the static database configuration.";
    StaticDatabaseView => "static_database_view", "View Static Database",
        "Allows reading the static database.";
    ViewDashboard => "view_dashboard", "View Dashboard",
        "Allows opening the dashboard.";
    ViewSettings => "view_settings", "View Settings",
        "Allows opening system settings.";
    ViewLogs => "view_logs", "View Logs",
        "Allows reading system logs.";
    ViewNotifications => "view_notifications", "View Notifications",
        "Allows reading system notifications.";
    ViewReports => "view_reports", "View Reports",
        "Allows reading system reports.";
    ViewUnlighthouseReports => "view_unlighthouse_reports", "View Unlighthouse Reports",
        "Allows reading Unlighthouse audit reports.";
    ViewHiddenProfiles => "view_hidden_profiles", "View Hidden Profiles",
        "Allows reading profiles that are not publicly visible.";
}

impl Permission {
    /// Returns the bundle every identity receives regardless of roles.
    #[must_use]
    pub fn default_user_bundle() -> &'static [Self] {
        const DEFAULT_USER: &[Permission] = &[
            Permission::BlogsViewPublished,
            Permission::CourseViewPublished,
            Permission::ServiceViewPublished,
        ];

        DEFAULT_USER
    }

    /// Returns the bundle carried by the operator role: the whole catalog.
    #[must_use]
    pub fn operator_bundle() -> &'static [Self] {
        Self::all()
    }

    /// Parses a transport value into a permission.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

/// Effective permissions of a caller, keyed by the catalog enum.
///
/// Absence means the permission is not granted. Grants only ever add.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    /// Creates an empty permission set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set holding the `default-user` bundle.
    #[must_use]
    pub fn default_user() -> Self {
        Self(Permission::default_user_bundle().iter().copied().collect())
    }

    /// Creates a set holding the whole catalog.
    #[must_use]
    pub fn full() -> Self {
        Self(Permission::operator_bundle().iter().copied().collect())
    }

    /// Grants one permission, returning whether it was newly added.
    pub fn grant(&mut self, permission: Permission) -> bool {
        self.0.insert(permission)
    }

    /// Grants every permission yielded by the iterator.
    pub fn grant_all(&mut self, permissions: impl IntoIterator<Item = Permission>) {
        self.0.extend(permissions);
    }

    /// Returns whether the permission is granted.
    #[must_use]
    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    /// Returns the granted subset of `required`, in catalog order.
    #[must_use]
    pub fn matching(&self, required: &[Permission]) -> BTreeSet<Permission> {
        required
            .iter()
            .copied()
            .filter(|permission| self.0.contains(permission))
            .collect()
    }

    /// Returns the number of granted permissions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether nothing is granted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates granted permissions in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{Permission, PermissionSet};

    #[test]
    fn permission_roundtrip_storage_value() {
        for permission in Permission::all() {
            let restored = Permission::from_str(permission.as_str());
            assert_eq!(restored.ok(), Some(*permission));
        }
    }

    #[test]
    fn unknown_permission_is_rejected() {
        let parsed = Permission::from_str("blogs_teleport");
        assert!(parsed.is_err());
    }

    #[test]
    fn catalog_has_every_subject_group() {
        assert_eq!(Permission::all().len(), 59);
        assert_eq!(Permission::all()[0], Permission::VisitAdminPanel);
        assert_eq!(
            Permission::all().last().copied(),
            Some(Permission::ViewHiddenProfiles)
        );
    }

    #[test]
    fn serde_uses_storage_value() {
        let encoded = serde_json::to_string(&Permission::StaticDatabaseConfigurationEdit)
            .unwrap_or_default();
        assert_eq!(encoded, "\"static_database_configuration_edit\"");
    }

    #[test]
    fn default_user_set_only_reads_published_content() {
        let set = PermissionSet::default_user();
        assert_eq!(set.len(), 3);
        assert!(set.contains(Permission::BlogsViewPublished));
        assert!(!set.contains(Permission::BlogsViewDraft));
    }

    #[test]
    fn matching_keeps_only_granted_requirements() {
        let set = PermissionSet::default_user();
        let matched = set.matching(&[Permission::BlogsViewPublished, Permission::BlogsViewDraft]);
        assert_eq!(matched.len(), 1);
        assert!(matched.contains(&Permission::BlogsViewPublished));
    }

    #[test]
    fn full_set_covers_catalog() {
        assert_eq!(PermissionSet::full().len(), Permission::all().len());
    }
}
