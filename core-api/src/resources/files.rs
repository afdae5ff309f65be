use bridge_traits::http::FormPart;
use bytes::Bytes;
use serde_json::Value;

use super::segment;
use crate::envelope::ResponseEnvelope;
use crate::error::Result;
use crate::models::FileInfo;
use crate::transport::{ApiClient, ApiRequest};

/// Shared upload directory under `/files`.
#[derive(Debug, Clone)]
pub struct FilesApi {
    client: ApiClient,
}

impl FilesApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<ResponseEnvelope<Vec<FileInfo>>> {
        self.client.send(ApiRequest::get("/files")).await
    }

    pub async fn info(&self, name: &str) -> Result<ResponseEnvelope<FileInfo>> {
        self.client
            .send(ApiRequest::get(format!("/files/{}", segment(name))))
            .await
    }

    /// Returns the stored file name.
    pub async fn upload(&self, file_name: &str, data: Bytes) -> Result<ResponseEnvelope<String>> {
        self.client
            .send(ApiRequest::post("/files").multipart(vec![FormPart::file("file", file_name, data)]))
            .await
    }

    pub async fn replace(&self, name: &str, data: Bytes) -> Result<ResponseEnvelope<Value>> {
        self.client
            .send(
                ApiRequest::put(format!("/files/{}", segment(name)))
                    .multipart(vec![FormPart::file("file", name, data)]),
            )
            .await
    }

    pub async fn delete(&self, name: &str) -> Result<ResponseEnvelope<Value>> {
        self.client
            .send(ApiRequest::delete(format!("/files/{}", segment(name))))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::test_support::*;
    use bridge_traits::http::{FormValue, HttpBody};

    #[tokio::test]
    async fn test_upload_sends_file_part() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|request| match &request.body {
                Some(HttpBody::Multipart(parts)) => {
                    parts.len() == 1
                        && parts[0].name == "file"
                        && matches!(&parts[0].value, FormValue::File { file_name, .. } if file_name == "report.csv")
                }
                _ => false,
            })
            .times(1)
            .returning(|_| Ok(response(200, r#"{"code":200,"data":"report.csv"}"#)));

        let api = FilesApi::new(client(http, empty_session()));
        let stored = api
            .upload("report.csv", Bytes::from_static(b"a,b\n1,2\n"))
            .await
            .unwrap();
        assert_eq!(stored.data.as_deref(), Some("report.csv"));
    }

    #[tokio::test]
    async fn test_names_are_percent_encoded() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|request| request.url == "http://localhost:8083/files/march%20report.csv")
            .times(1)
            .returning(|_| Ok(response(200, r#"{"code":200}"#)));

        let api = FilesApi::new(client(http, empty_session()));
        assert!(api.delete("march report.csv").await.unwrap().is_success());
    }
}
