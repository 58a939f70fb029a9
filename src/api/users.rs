use tracing::{info, instrument};

use crate::error::Result;
use crate::gateway::Gateway;
use crate::model::{AuthSession, FirebaseLogin, UserProfile};

#[instrument(skip(gateway))]
pub(crate) async fn get_profile(gateway: &Gateway) -> Result<UserProfile> {
    gateway.get("/users/profile").await
}

/// Exchange an identity-provider token for a backend bearer token and
/// store it in the session.
#[instrument(skip(gateway, id_token))]
pub(crate) async fn authenticate_firebase(gateway: &Gateway, id_token: &str) -> Result<UserProfile> {
    let auth: AuthSession = gateway
        .post("/users/auth/firebase", &FirebaseLogin { id_token })
        .await?;
    gateway.session().set_token(auth.token);
    info!(user = %auth.user.email, "signed in");
    Ok(auth.user)
}
