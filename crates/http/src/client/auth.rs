//! Authentication API client methods

use super::{AssistClient, ClientError, PendingRequest};
use crate::types::{
    ApiEnvelope, LoginRequest, LoginResponse, PasswordChangeRequest, RefreshData, RefreshRequest,
};
use serde_json::Value as JsonValue;
use tracing::{debug, info};

pub const LOGIN_PATH: &str = "/auth/login/";
pub const LOGOUT_PATH: &str = "/auth/logout/";
pub const REFRESH_PATH: &str = "/auth/refresh/";
pub const PROFILE_PATH: &str = "/auth/profile/";
pub const PASSWORD_CHANGE_PATH: &str = "/auth/password-change/";

impl AssistClient {
    /// Log in and store the returned tokens and user in the session
    pub async fn login(
        &self,
        user_login_id: &str,
        passwd: &str,
    ) -> Result<LoginResponse, ClientError> {
        let request = PendingRequest::post(LOGIN_PATH).json(&LoginRequest {
            user_login_id: user_login_id.to_string(),
            passwd: passwd.to_string(),
        })?;
        let body: JsonValue = self.send_public(request).await?.json().await?;
        let login = parse_login(body)?;

        self.session().store_login(
            &login.access_token,
            login.refresh_token.as_deref(),
            login.user.as_ref(),
        )?;
        info!(user_login_id, "Logged in");
        Ok(login)
    }

    /// Tell the server we are leaving, then drop the local session whatever
    /// the server said
    pub async fn logout(&self) -> Result<(), ClientError> {
        let token = self.session().access_token();
        if token.is_some() {
            match self
                .dispatch(&PendingRequest::post(LOGOUT_PATH), token.as_deref())
                .await
            {
                Ok(response) => debug!(status = %response.status(), "Logout acknowledged"),
                Err(e) => debug!(error = %e, "Logout request failed"),
            }
        }
        self.session().clear()?;
        info!("Logged out");
        Ok(())
    }

    /// Whether an access token is stored
    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }

    /// User identity stored at login
    pub fn current_user(&self) -> Option<JsonValue> {
        self.session().user()
    }

    /// Fetch the profile of the logged-in user
    pub async fn profile(&self) -> Result<JsonValue, ClientError> {
        self.request_data(PendingRequest::get(PROFILE_PATH)).await
    }

    /// Update profile fields; the stored user is replaced with the result
    pub async fn update_profile(&self, update: &JsonValue) -> Result<JsonValue, ClientError> {
        let profile: JsonValue = self
            .request_data(PendingRequest::put(PROFILE_PATH).json(update)?)
            .await?;
        if profile.is_object() {
            self.session().set_user(&profile)?;
        }
        Ok(profile)
    }

    /// Change the password; returns the server's confirmation message
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<Option<String>, ClientError> {
        let request = PendingRequest::post(PASSWORD_CHANGE_PATH).json(&PasswordChangeRequest {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
            confirm_password: confirm_password.to_string(),
        })?;
        let envelope: ApiEnvelope<JsonValue> = self.request_json(request).await?;
        let message = envelope.message.clone();
        envelope.into_result()?;
        Ok(message)
    }

    /// Trade the refresh token for a new access token. Sent without a bearer
    /// and outside the refresh path so it can never recurse.
    pub(crate) async fn exchange_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<String, ClientError> {
        let request = PendingRequest::post(REFRESH_PATH).json(&RefreshRequest {
            refresh: refresh_token.to_string(),
        })?;
        let envelope: ApiEnvelope<RefreshData> = self.send_public(request).await?.json().await?;

        envelope
            .into_result()?
            .and_then(|data| data.access_token)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                ClientError::Application("refresh response carried no access token".into())
            })
    }
}

/// Login payloads come bare or wrapped in the standard envelope
fn parse_login(body: JsonValue) -> Result<LoginResponse, ClientError> {
    if body.get("success").and_then(JsonValue::as_bool) == Some(false) {
        let message = body
            .get("message")
            .and_then(JsonValue::as_str)
            .unwrap_or("login failed");
        return Err(ClientError::Application(message.to_string()));
    }

    let payload = match body.get("data") {
        Some(data) if data.is_object() => data.clone(),
        _ => body,
    };
    Ok(serde_json::from_value(payload)?)
}
