//! Pollution records and their quota-limited downloads.
//!
//! Downloads come in two flavours. [`PollutionApi::download`] streams the
//! archive directly and fails with [`ApiError::QuotaExceeded`] once the daily
//! quota is used up. [`PollutionApi::enqueue`] hands the work to a server-side
//! queue; [`PollutionApi::wait_for_task`] then polls until the task settles.
//!
//! [`ApiError::QuotaExceeded`]: crate::ApiError::QuotaExceeded

use std::sync::Arc;

use bridge_traits::time::Timer;
use bytes::Bytes;
use tracing::instrument;

use super::segment;
use super::tasks::{poll_task, PollPolicy};
use crate::envelope::ResponseEnvelope;
use crate::error::Result;
use crate::models::{PageBean, PollutionData, PollutionQuery, TaskStatus};
use crate::transport::{ApiClient, ApiRequest};

#[derive(Clone)]
pub struct PollutionApi {
    client: ApiClient,
    timer: Arc<dyn Timer>,
}

impl PollutionApi {
    pub fn new(client: ApiClient, timer: Arc<dyn Timer>) -> Self {
        Self { client, timer }
    }

    pub async fn page(&self, query: &PollutionQuery) -> Result<ResponseEnvelope<PageBean<PollutionData>>> {
        self.client
            .send(ApiRequest::get("/pollution").query_params(query)?)
            .await
    }

    pub async fn get(&self, id: i64) -> Result<ResponseEnvelope<PollutionData>> {
        self.client
            .send(ApiRequest::get(format!("/pollution/{}", segment(id))))
            .await
    }

    /// Each id is sent as its own `ids` query pair.
    #[instrument(skip(self))]
    pub async fn download(&self, ids: &[i64]) -> Result<Bytes> {
        let request = ids
            .iter()
            .fold(ApiRequest::get("/pollution/download"), |request, id| {
                request.query("ids", id)
            });
        self.client.download(request).await
    }

    /// Returns the task id.
    pub async fn enqueue(&self, ids: &[i64]) -> Result<ResponseEnvelope<String>> {
        self.client
            .send(ApiRequest::post("/pollution/async/enqueue").json(ids)?)
            .await
    }

    pub async fn task_status(&self, task_id: &str) -> Result<ResponseEnvelope<TaskStatus>> {
        self.client
            .send(ApiRequest::get(format!(
                "/pollution/async/status/{}",
                segment(task_id)
            )))
            .await
    }

    pub async fn task_result(&self, task_id: &str) -> Result<Bytes> {
        self.client
            .download(ApiRequest::get(format!(
                "/pollution/async/result/{}",
                segment(task_id)
            )))
            .await
    }

    /// Poll a queued task until it reports `done` or `error`.
    ///
    /// A non-success envelope ends polling and is returned unchanged. Running
    /// out of attempts yields [`crate::ApiError::TaskTimedOut`].
    #[instrument(skip(self))]
    pub async fn wait_for_task(&self, task_id: &str, policy: PollPolicy) -> Result<ResponseEnvelope<TaskStatus>> {
        poll_task(self.timer.as_ref(), task_id, policy, || self.task_status(task_id)).await
    }
}

impl std::fmt::Debug for PollutionApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollutionApi")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::models::{PageQuery, TaskState};
    use crate::transport::test_support::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    struct NoopTimer;

    #[async_trait]
    impl Timer for NoopTimer {
        async fn sleep(&self, _duration: Duration) {}
    }

    fn api(http: MockHttpClient) -> PollutionApi {
        PollutionApi::new(client(http, empty_session()), Arc::new(NoopTimer))
    }

    #[tokio::test]
    async fn test_download_repeats_ids() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|request| request.url == "http://localhost:8083/pollution/download?ids=4&ids=9")
            .times(1)
            .returning(|_| Ok(response(200, "zip")));

        let bytes = api(http).download(&[4, 9]).await.unwrap();
        assert_eq!(&bytes[..], b"zip");
    }

    #[tokio::test]
    async fn test_download_quota_exhausted() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(response(429, "")));

        let error = api(http).download(&[1]).await.unwrap_err();
        assert!(matches!(error, ApiError::QuotaExceeded));
    }

    #[tokio::test]
    async fn test_page_filters() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|request| {
                request.url
                    == "http://localhost:8083/pollution?pageNum=1&pageSize=10&pollutantType=NO2&year=2024"
            })
            .times(1)
            .returning(|_| Ok(response(200, r#"{"code":200,"data":{"total":0,"items":[]}}"#)));

        let query = PollutionQuery {
            page: PageQuery::default(),
            pollutant_type: Some("NO2".into()),
            year: Some(2024),
            ..Default::default()
        };
        let page = api(http).page(&query).await.unwrap().data.unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_wait_for_task_until_done() {
        let polls = Arc::new(AtomicU32::new(0));
        let counter = polls.clone();

        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|request| request.url.ends_with("/pollution/async/status/job-1"))
            .times(3)
            .returning(move |_| {
                let body = match counter.fetch_add(1, Ordering::SeqCst) {
                    0 => r#"{"code":200,"data":{"status":"queued"}}"#,
                    1 => r#"{"code":200,"data":{"status":"processing","progress":40}}"#,
                    _ => r#"{"code":200,"data":{"status":"done","file":"job-1.zip"}}"#,
                };
                Ok(response(200, body))
            });

        let envelope = api(http)
            .wait_for_task("job-1", PollPolicy::default())
            .await
            .unwrap();

        let status = envelope.data.unwrap();
        assert_eq!(status.status, TaskState::Done);
        assert_eq!(status.extra.get("file").and_then(|v| v.as_str()), Some("job-1.zip"));
        assert_eq!(polls.load(Ordering::SeqCst), 3);
    }
}
