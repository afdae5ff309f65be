use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use super::segment;
use crate::envelope::ResponseEnvelope;
use crate::error::Result;
use crate::models::{PageBean, PageQuery, Quota, QuotaUpdate, User};
use crate::transport::{ApiClient, ApiRequest};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserPageParams<'a> {
    #[serde(flatten)]
    page: PageQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
}

/// `/admin/users` endpoints. The server rejects callers without the admin
/// role with 403.
#[derive(Debug, Clone)]
pub struct AdminApi {
    client: ApiClient,
}

impl AdminApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn page_users(
        &self,
        page: PageQuery,
        username: Option<&str>,
    ) -> Result<ResponseEnvelope<PageBean<User>>> {
        let params = UserPageParams { page, username };
        self.client
            .send(ApiRequest::get("/admin/users").query_params(&params)?)
            .await
    }

    pub async fn add_user(&self, user: &User) -> Result<ResponseEnvelope<Value>> {
        self.client
            .send(ApiRequest::post("/admin/users").json(user)?)
            .await
    }

    pub async fn update_user(&self, user: &User) -> Result<ResponseEnvelope<Value>> {
        self.client
            .send(ApiRequest::put("/admin/users").json(user)?)
            .await
    }

    pub async fn delete_user(&self, id: i64) -> Result<ResponseEnvelope<Value>> {
        self.client
            .send(ApiRequest::delete(format!("/admin/users/{}", segment(id))))
            .await
    }

    /// Remaining daily downloads and seconds until reset.
    pub async fn quota(&self, id: i64) -> Result<ResponseEnvelope<Quota>> {
        self.client
            .send(ApiRequest::get(format!("/admin/users/{}/quota", segment(id))))
            .await
    }

    pub async fn set_quota(&self, id: i64, update: QuotaUpdate) -> Result<ResponseEnvelope<Value>> {
        self.client
            .send(ApiRequest::patch(format!("/admin/users/{}/quota", segment(id))).json(&update)?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::test_support::*;
    use bridge_traits::http::HttpMethod;

    #[tokio::test]
    async fn test_page_users_omits_missing_filter() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|request| {
                request.method == HttpMethod::Get
                    && request.url == "http://localhost:8083/admin/users?pageNum=2&pageSize=20"
            })
            .times(1)
            .returning(|_| {
                Ok(response(
                    200,
                    r#"{"code":200,"data":{"total":21,"items":[{"id":21,"username":"late"}]}}"#,
                ))
            });

        let api = AdminApi::new(client(http, empty_session()));
        let page = api
            .page_users(PageQuery::new(2, 20), None)
            .await
            .unwrap()
            .data
            .unwrap();

        assert_eq!(page.total, 21);
        assert_eq!(page.items[0].username, "late");
    }

    #[tokio::test]
    async fn test_quota_round_trip() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|request| request.method == HttpMethod::Get && request.url.ends_with("/admin/users/7/quota"))
            .times(1)
            .returning(|_| Ok(response(200, r#"{"code":200,"data":{"value":3,"ttlSeconds":3600}}"#)));
        http.expect_execute()
            .withf(|request| request.method == HttpMethod::Patch && request.url.ends_with("/admin/users/7/quota"))
            .times(1)
            .returning(|_| Ok(response(200, r#"{"code":200}"#)));

        let api = AdminApi::new(client(http, empty_session()));
        let quota = api.quota(7).await.unwrap().data.unwrap();
        assert_eq!(quota.value, Some(3));
        assert_eq!(quota.ttl_seconds, Some(3600));

        let update = QuotaUpdate {
            value: 10,
            ttl_hours: 24,
        };
        assert!(api.set_quota(7, update).await.unwrap().is_success());
    }
}
