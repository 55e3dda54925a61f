/*
[INPUT]:  Registration and login form fields
[OUTPUT]: Logged-in user profile or rejection
[POS]:    HTTP layer - account endpoints (login.php, register.php)
[UPDATE]: When account scripts change their form fields or answers
*/

use crate::http::client::{expect_success, read_json};
use crate::http::{Result, TaskrClient, TaskrError};
use crate::types::{LoginRequest, LoginResponse, RegisterRequest, User};

const REGISTER_ENDPOINT: &str = "register.php";
const LOGIN_ENDPOINT: &str = "login.php";

impl TaskrClient {
    /// Create an account
    ///
    /// POST register.php (username, email, password)
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<()> {
        let form = RegisterRequest {
            username,
            email,
            password,
        };
        let response = self.post_form(REGISTER_ENDPOINT, &form).await?;
        expect_success(response, "Registration failed").await?;
        tracing::info!(username, email, "registered");
        Ok(())
    }

    /// Log in and return the user's profile
    ///
    /// POST login.php (email, password)
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let form = LoginRequest { email, password };
        let response = self.post_form(LOGIN_ENDPOINT, &form).await?;
        let body: LoginResponse = read_json(response).await?;

        if !body.success {
            return Err(TaskrError::rejected(body.message, "Login failed"));
        }

        let user = body.into_user(email).ok_or_else(|| {
            TaskrError::InvalidResponse("login succeeded without a user id".to_string())
        })?;
        tracing::info!(user_id = user.id, "logged in");
        Ok(user)
    }
}
