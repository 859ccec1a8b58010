use axum::{
    Json,
    extract::{Path, State},
};
use axum_extra::extract::WithRejection;
use tracing::info;

use crate::error::{ApiMessage, GatewayError};
use crate::router::GatewayState;
use crate::types::requests::CredentialsRequest;
use crate::types::responses::LoginResponse;

/// POST /user/login -> issues an access token for valid credentials.
pub async fn login(
    State(state): State<GatewayState>,
    WithRejection(Json(req), _): WithRejection<Json<CredentialsRequest>, GatewayError>,
) -> Result<Json<LoginResponse>, GatewayError> {
    let username = req.username.unwrap_or_default();
    let password = req.password.unwrap_or_default();

    let Some(user) = state.users.verify(&username, &password).await? else {
        return Err(GatewayError::Unauthorized(
            "Bad username or password".to_string(),
        ));
    };

    let access_token = state.tokens.issue(&user.username)?;
    info!(username = %user.username, "login succeeded");
    Ok(Json(LoginResponse { access_token }))
}

/// POST /user/register
pub async fn register(
    State(state): State<GatewayState>,
    WithRejection(Json(req), _): WithRejection<Json<CredentialsRequest>, GatewayError>,
) -> Result<Json<ApiMessage>, GatewayError> {
    let (Some(username), Some(password)) = (
        req.username.filter(|u| !u.is_empty()),
        req.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(GatewayError::bad_request("Missing username or password"));
    };

    let user = state.users.insert(&username, &password).await?;
    info!(username = %user.username, id = user.id, "user registered");
    Ok(Json(ApiMessage::new("User registered successfully")))
}

/// DELETE /user/{username}
pub async fn delete_user(
    State(state): State<GatewayState>,
    WithRejection(Path(username), _): WithRejection<Path<String>, GatewayError>,
) -> Result<Json<ApiMessage>, GatewayError> {
    state.users.delete(&username).await?;
    info!(username = %username, "user deleted");
    Ok(Json(ApiMessage::new("User deleted successfully")))
}
