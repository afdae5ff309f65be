//! TIF raster management and bulk downloads.

use bridge_traits::http::FormPart;
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use super::segment;
use crate::envelope::ResponseEnvelope;
use crate::error::Result;
use crate::models::{GeospatialFile, PageBean, PageQuery, TaskStatus};
use crate::transport::{ApiClient, ApiRequest};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileFilter<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    file_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct GeoFilesApi {
    client: ApiClient,
}

impl GeoFilesApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, data), fields(size = data.len()))]
    pub async fn upload_tif(
        &self,
        file_name: &str,
        data: Bytes,
        plant_id: Option<i64>,
        data_type: Option<&str>,
    ) -> Result<ResponseEnvelope<GeospatialFile>> {
        let mut parts = vec![FormPart::file("file", file_name, data)];
        if let Some(plant_id) = plant_id {
            parts.push(FormPart::text("plantId", plant_id.to_string()));
        }
        if let Some(data_type) = data_type.filter(|value| !value.is_empty()) {
            parts.push(FormPart::text("dataType", data_type));
        }
        self.client
            .send(ApiRequest::post("/geo/upload-tif").multipart(parts))
            .await
    }

    pub async fn list(
        &self,
        file_type: Option<&str>,
        status: Option<&str>,
    ) -> Result<ResponseEnvelope<Vec<GeospatialFile>>> {
        let filter = FileFilter { file_type, status };
        self.client
            .send(ApiRequest::get("/geo/files").query_params(&filter)?)
            .await
    }

    pub async fn info(&self, file_id: i64) -> Result<ResponseEnvelope<GeospatialFile>> {
        self.client
            .send(ApiRequest::get(format!("/geo/tif-info/{}", segment(file_id))))
            .await
    }

    pub async fn process(&self, file_id: i64) -> Result<ResponseEnvelope<Value>> {
        self.client
            .send(ApiRequest::post(format!("/geo/process-tif/{}", segment(file_id))))
            .await
    }

    /// Absolute tile URL for map widgets. No request is made.
    pub fn tile_url(&self, file_id: i64, z: u32, x: u32, y: u32) -> Result<String> {
        let url = self
            .client
            .url_for(&format!("/geo/tile/{}/{z}/{x}/{y}", segment(file_id)))?;
        Ok(url.into())
    }

    pub async fn download(&self, file_id: i64) -> Result<Bytes> {
        self.client
            .download(ApiRequest::get(format!("/data-download/tif/{}", segment(file_id))))
            .await
    }

    /// Zip archive of several rasters.
    pub async fn batch_download(&self, file_ids: &[i64]) -> Result<Bytes> {
        self.client
            .download(ApiRequest::post("/data-download/batch-download").json(file_ids)?)
            .await
    }

    pub async fn download_status(&self) -> Result<ResponseEnvelope<Value>> {
        self.client
            .send(ApiRequest::get("/data-download/download-status"))
            .await
    }

    pub async fn download_history(&self, page: PageQuery) -> Result<ResponseEnvelope<PageBean<Value>>> {
        self.client
            .send(ApiRequest::get("/data-download/download-history").query_params(&page)?)
            .await
    }

    /// Returns the task id.
    pub async fn submit_async_download(&self, file_ids: &[i64]) -> Result<ResponseEnvelope<String>> {
        self.client
            .send(ApiRequest::post("/data-download/async-download").json(file_ids)?)
            .await
    }

    pub async fn async_download_status(&self, task_id: &str) -> Result<ResponseEnvelope<TaskStatus>> {
        self.client
            .send(ApiRequest::get(format!(
                "/data-download/async-download/{}/status",
                segment(task_id)
            )))
            .await
    }

    pub async fn async_download_result(&self, task_id: &str) -> Result<Bytes> {
        self.client
            .download(ApiRequest::get(format!(
                "/data-download/async-download/{}/result",
                segment(task_id)
            )))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::transport::test_support::*;
    use bridge_traits::http::HttpBody;

    #[test]
    fn test_tile_url() {
        let api = GeoFilesApi::new(client(MockHttpClient::new(), empty_session()));
        assert_eq!(
            api.tile_url(12, 8, 210, 104).unwrap(),
            "http://localhost:8083/geo/tile/12/8/210/104"
        );
    }

    #[tokio::test]
    async fn test_upload_skips_absent_fields() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|request| match &request.body {
                Some(HttpBody::Multipart(parts)) => {
                    parts.iter().map(|part| part.name.as_str()).collect::<Vec<_>>()
                        == vec!["file", "plantId"]
                }
                _ => false,
            })
            .times(1)
            .returning(|_| Ok(response(200, r#"{"code":200,"data":{"fileId":5,"fileName":"scene.tif"}}"#)));

        let api = GeoFilesApi::new(client(http, empty_session()));
        let file = api
            .upload_tif("scene.tif", Bytes::from_static(b"II*\0"), Some(3), Some(""))
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(file.file_id, 5);
    }

    #[tokio::test]
    async fn test_batch_download_returns_bytes() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(response(200, "PK\u{3}\u{4}")));

        let api = GeoFilesApi::new(client(http, empty_session()));
        let archive = api.batch_download(&[1, 2]).await.unwrap();
        assert!(archive.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn test_download_failure_is_status_error() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(response(404, "missing")));

        let api = GeoFilesApi::new(client(http, empty_session()));
        let error = api.download(99).await.unwrap_err();
        assert!(matches!(error, ApiError::Status { status: 404, .. }));
    }
}
