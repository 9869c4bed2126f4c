//! Authentication endpoints.

use crate::client::{json_or_error, ApiClient, RequestOptions};
use alphadesk_core::types::{
    Acknowledgement, AuthResponse, BindEmailRequest, ForgotPasswordRequest, LoginRequest,
    LogoutRequest, ProfileResponse, RegisterRequest, ResetPasswordRequest, TokenPair,
    VerifyEmailRequest,
};
use alphadesk_core::{ClientError, Result};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Method, Response};
use tracing::{info, warn};

impl ApiClient {
    /// `POST /auth/register`, retried on network failures.
    ///
    /// Stores the returned credentials.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        let response = self
            .send_with_retry(Method::POST, "/auth/register", RequestOptions::json(request)?)
            .await?;
        let auth: AuthResponse = json_or_error(response).await?;
        self.store_credentials(&auth);
        info!(user = %auth.user.username, "Registered");
        Ok(auth)
    }

    /// `POST /auth/login`, retried on network failures.
    ///
    /// Stores the returned credentials. A wrong password is an
    /// [`ClientError::Auth`] carrying the backend's remaining-attempts hint.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self
            .send_with_retry(Method::POST, "/auth/login", RequestOptions::json(&body)?)
            .await?;
        let auth: AuthResponse = json_or_error(response).await?;
        self.store_credentials(&auth);
        info!(user = %auth.user.username, "Logged in");
        Ok(auth)
    }

    /// `POST /auth/logout`.
    ///
    /// The call is best-effort; local credentials are cleared whatever the
    /// outcome.
    pub async fn logout(&self) {
        let body = LogoutRequest {
            refresh_token: self.session().refresh_token(),
        };
        let token = self.session().access_token();

        let outcome: Result<Response> = async {
            let mut options = RequestOptions::json(&body)?;
            if let Some(token) = token {
                let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                    ClientError::Configuration("invalid access token".to_string())
                })?;
                options = options.header(AUTHORIZATION, value);
            }
            self.public_request(Method::POST, "/auth/logout", options).await
        }
        .await;

        if let Err(error) = outcome {
            warn!(error = %error, "Logout request failed");
        }
        self.session().clear_tokens();
        info!("Logged out");
    }

    /// `GET /auth/profile`.
    pub async fn profile(&self) -> Result<ProfileResponse> {
        let response = self.request(Method::GET, "/auth/profile", RequestOptions::new()).await?;
        json_or_error(response).await
    }

    /// `POST /auth/forgot-password`.
    ///
    /// The backend acknowledges every username alike.
    pub async fn forgot_password(&self, username: &str) -> Result<Acknowledgement> {
        let body = ForgotPasswordRequest {
            username: username.to_string(),
        };
        let response = self
            .public_request(Method::POST, "/auth/forgot-password", RequestOptions::json(&body)?)
            .await?;
        acknowledgement(response).await
    }

    /// `POST /auth/reset-password`.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<Acknowledgement> {
        let body = ResetPasswordRequest {
            token: token.to_string(),
            new_password: new_password.to_string(),
        };
        let response = self
            .public_request(Method::POST, "/auth/reset-password", RequestOptions::json(&body)?)
            .await?;
        acknowledgement(response).await
    }

    /// `POST /auth/bind-email/send-code`.
    pub async fn bind_email_send_code(&self, email: &str) -> Result<Acknowledgement> {
        let body = BindEmailRequest {
            email: email.to_string(),
        };
        let response = self
            .request(Method::POST, "/auth/bind-email/send-code", RequestOptions::json(&body)?)
            .await?;
        acknowledgement(response).await
    }

    /// `POST /auth/bind-email/verify`.
    pub async fn bind_email_verify(&self, email: &str, code: &str) -> Result<Acknowledgement> {
        let body = VerifyEmailRequest {
            email: email.to_string(),
            code: code.to_string(),
        };
        let response = self
            .request(Method::POST, "/auth/bind-email/verify", RequestOptions::json(&body)?)
            .await?;
        acknowledgement(response).await
    }

    fn store_credentials(&self, auth: &AuthResponse) {
        match auth.refresh_token.as_deref() {
            Some(refresh) if !refresh.is_empty() => self
                .session()
                .set_tokens(&TokenPair::new(auth.access_token.as_str(), refresh)),
            _ => self.session().set_access_token(&auth.access_token),
        }
    }
}

async fn acknowledgement(response: Response) -> Result<Acknowledgement> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        return Err(ClientError::from_status(
            status.as_u16(),
            &String::from_utf8_lossy(&bytes),
        ));
    }
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Acknowledgement::default());
    }
    Ok(serde_json::from_slice(&bytes)?)
}
