use serde_json::Value;

use crate::envelope::ResponseEnvelope;
use crate::error::Result;
use crate::models::{LoginData, PasswordUpdate, User};
use crate::transport::{ApiClient, ApiRequest};

/// `/user/*` endpoints.
#[derive(Debug, Clone)]
pub struct UserApi {
    client: ApiClient,
}

impl UserApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Credentials travel as query parameters.
    pub async fn login(&self, username: &str, password: &str) -> Result<ResponseEnvelope<LoginData>> {
        self.client
            .send(
                ApiRequest::post("/user/login")
                    .query("username", username)
                    .query("password", password),
            )
            .await
    }

    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> Result<ResponseEnvelope<Value>> {
        let mut request = ApiRequest::post("/user/register")
            .query("username", username)
            .query("password", password);
        if let Some(email) = email {
            request = request.query("email", email);
        }
        self.client.send(request).await
    }

    pub async fn user_info(&self) -> Result<ResponseEnvelope<User>> {
        self.client.send(ApiRequest::get("/user/userInfo")).await
    }

    pub async fn update_me(&self, user: &User) -> Result<ResponseEnvelope<Value>> {
        self.client
            .send(ApiRequest::put("/user/update").json(user)?)
            .await
    }

    pub async fn update_password(&self, update: &PasswordUpdate) -> Result<ResponseEnvelope<Value>> {
        self.client
            .send(ApiRequest::patch("/user/updatePwd").json(update)?)
            .await
    }

    pub async fn logout(&self) -> Result<ResponseEnvelope<Value>> {
        self.client.send(ApiRequest::post("/user/logout")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::test_support::*;
    use bridge_traits::http::HttpMethod;

    #[tokio::test]
    async fn test_login_sends_credentials_as_query() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|request| {
                request.method == HttpMethod::Post
                    && request.url
                        == "http://localhost:8083/user/login?username=ops&password=p%40ss"
                    && request.body.is_none()
            })
            .times(1)
            .returning(|_| {
                Ok(response(
                    200,
                    r#"{"code":200,"data":{"token":"t","username":"ops","id":1,"roleCode":1}}"#,
                ))
            });

        let api = UserApi::new(client(http, empty_session()));
        let envelope = api.login("ops", "p@ss").await.unwrap();

        assert!(envelope.is_success());
        assert_eq!(envelope.data.unwrap().token, "t");
    }

    #[tokio::test]
    async fn test_update_password_uses_patch_with_json() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|request| {
                request.method == HttpMethod::Patch
                    && request.url.ends_with("/user/updatePwd")
                    && request.body.is_some()
            })
            .times(1)
            .returning(|_| Ok(response(200, r#"{"code":200}"#)));

        let api = UserApi::new(client(http, empty_session()));
        let envelope = api
            .update_password(&PasswordUpdate::new("old", "new"))
            .await
            .unwrap();
        assert!(envelope.is_success());
    }
}
