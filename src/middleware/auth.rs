use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::typed_header::TypedHeaderRejectionReason;
use headers::Authorization;
use headers::authorization::Bearer;

use crate::error::GatewayError;
use crate::service::token::TokenIssuer;

/// Bearer-token gate, applied as a route layer in front of every protected route.
#[derive(Debug, Clone)]
pub struct RequireAuth {
    pub username: String,
}

impl<S> FromRequestParts<S> for RequireAuth
where
    TokenIssuer: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|rejection| {
                    let msg = if matches!(rejection.reason(), TypedHeaderRejectionReason::Missing) {
                        "Missing Authorization Header"
                    } else {
                        "Invalid Authorization Header"
                    };
                    GatewayError::Unauthorized(msg.to_string())
                })?;

        let username = TokenIssuer::from_ref(state).verify(bearer.token())?;
        Ok(Self { username })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use chrono::Duration;

    async fn extract(issuer: &TokenIssuer, header: Option<&str>) -> Result<RequireAuth, GatewayError> {
        let mut builder = Request::builder().uri("/tables");
        if let Some(value) = header {
            builder = builder.header("authorization", value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        RequireAuth::from_request_parts(&mut parts, issuer).await
    }

    #[tokio::test]
    async fn valid_bearer_yields_username() {
        let issuer = TokenIssuer::new("k", Duration::minutes(5));
        let token = issuer.issue("user").unwrap();
        let auth = extract(&issuer, Some(&format!("Bearer {token}"))).await.unwrap();
        assert_eq!(auth.username, "user");
    }

    #[tokio::test]
    async fn missing_or_malformed_header_is_unauthorized() {
        let issuer = TokenIssuer::new("k", Duration::minutes(5));
        let err = extract(&issuer, None).await.unwrap_err();
        assert!(matches!(err, GatewayError::Unauthorized(m) if m == "Missing Authorization Header"));

        let err = extract(&issuer, Some("Basic dXNlcjpwYXNz")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Unauthorized(m) if m == "Invalid Authorization Header"));

        let err = extract(&issuer, Some("Bearer nope")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Unauthorized(_)));
    }
}
