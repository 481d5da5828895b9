//! Salesforce login routes.

use armlink_domain::{ArmLinkError, OAuthSettings};
use armlink_infra::generate_challenge;
use axum::extract::{Query, State};
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::context::AppContext;
use crate::error::{ApiError, ApiResult};
use crate::session::{expired_cookie, session_cookie, session_id, Authenticated, SessionData};

/// Per-login overrides of the configured OAuth client.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginParams {
    login_url: Option<String>,
    consumer_key: Option<String>,
    consumer_secret: Option<String>,
    callback_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

fn resolve(value: Option<String>, default: &str, name: &str) -> ApiResult<String> {
    let value = value.filter(|v| !v.trim().is_empty()).unwrap_or_else(|| default.to_string());
    if value.trim().is_empty() {
        return Err(ArmLinkError::InvalidInput(format!("{name} is required")).into());
    }
    Ok(value)
}

/// `GET /auth/login`: starts the authorization-code flow in a new session.
pub async fn login(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Query(params): Query<LoginParams>,
) -> ApiResult<Response> {
    let defaults = ctx.default_oauth();
    let settings = OAuthSettings {
        login_url: resolve(params.login_url, &defaults.login_url, "loginUrl")?,
        client_id: resolve(params.consumer_key, &defaults.client_id, "consumerKey")?,
        client_secret: resolve(params.consumer_secret, &defaults.client_secret, "consumerSecret")?,
        callback_url: resolve(params.callback_url, &defaults.callback_url, "callbackUrl")?,
    };

    let challenge = generate_challenge();
    let authorize_url = ctx.authenticator.authorization_url(&settings, &challenge)?;
    info!(login_url = %settings.login_url, "Redirecting to Salesforce login");

    if let Some(previous) = session_id(&headers) {
        ctx.sessions.remove(&previous);
    }
    let id = ctx.sessions.create(SessionData {
        oauth: Some(settings),
        pending: Some(challenge),
        crm: None,
    });

    let cookie = session_cookie(&id, ctx.config.server.secure_cookies);
    Ok(([(SET_COOKIE, cookie)], Redirect::to(&authorize_url)).into_response())
}

/// `GET /auth/callback`: exchanges the code and stores the CRM session.
pub async fn callback(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> ApiResult<Response> {
    if let Some(error) = params.error {
        let description = params.error_description.unwrap_or_default();
        return Err(ArmLinkError::Auth(format!("{error}: {description}")).into());
    }
    let code = params.code.filter(|c| !c.is_empty()).ok_or(ApiError::MissingCode)?;

    let id = session_id(&headers).ok_or(ApiError::NoPendingLogin)?;
    let mut data = ctx.sessions.get(&id).ok_or(ApiError::NoPendingLogin)?;

    // a challenge is good for one callback, whatever its outcome
    let challenge = data.pending.take().ok_or(ApiError::NoPendingLogin)?;
    ctx.sessions.put(&id, data.clone());

    let oauth = data.oauth.clone().ok_or(ApiError::NoPendingLogin)?;
    if params.state.as_deref() != Some(challenge.state.as_str()) {
        warn!("OAuth callback state did not match the issued challenge");
        return Err(ApiError::StateMismatch);
    }

    let crm = ctx.authenticator.exchange_code(&oauth, &code, &challenge.code_verifier).await?;
    data.crm = Some(crm);
    ctx.sessions.put(&id, data);

    Ok(Redirect::to(&ctx.config.server.post_login_redirect).into_response())
}

/// `GET /auth/logout`: revokes the token and ends the session.
pub async fn logout(State(ctx): State<AppContext>, auth: Authenticated) -> ApiResult<Response> {
    if let Err(e) = ctx.connector.connect(&auth.crm).revoke().await {
        warn!(error = %e, "Token revoke failed; ending session anyway");
    }
    ctx.sessions.remove(&auth.session_id);

    let cookie = expired_cookie(ctx.config.server.secure_cookies);
    Ok(([(SET_COOKIE, cookie)], Redirect::to(&ctx.config.server.post_login_redirect)).into_response())
}

/// `GET /auth/whoami`: the CRM's userinfo for the signed-in user.
pub async fn whoami(State(ctx): State<AppContext>, auth: Authenticated) -> ApiResult<Json<Value>> {
    Ok(Json(ctx.connector.connect(&auth.crm).identity().await?))
}
