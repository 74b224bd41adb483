use lectern_domain::UserSession;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Development sign-in payload guarded by the bootstrap token.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/bootstrap-request.ts"
)]
pub struct BootstrapRequest {
    pub token: String,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
}

/// Resolved session of the signed-in user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/session-response.ts"
)]
pub struct SessionResponse {
    pub user_id: String,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

impl From<&UserSession> for SessionResponse {
    fn from(session: &UserSession) -> Self {
        let identity = session.identity();
        Self {
            user_id: identity.id().to_owned(),
            email: identity.email().to_owned(),
            name: identity.display_name().map(ToOwned::to_owned),
            image: identity.image().map(ToOwned::to_owned),
            roles: session.roles().iter().cloned().collect(),
            permissions: session
                .permissions()
                .iter()
                .map(|permission| permission.as_str().to_owned())
                .collect(),
        }
    }
}
