//! Cement plants, their satellite identifications and summary statistics.

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::instrument;

use super::segment;
use crate::envelope::ResponseEnvelope;
use crate::error::Result;
use crate::models::{CementPlant, CementPlantIdentification, PageBean, PageQuery, PlantStatus};
use crate::transport::{ApiClient, ApiRequest};

/// Wire format of time-range parameters.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn serialize_time<S: Serializer>(time: &Option<NaiveDateTime>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    match time {
        Some(time) => serializer.collect_str(&time.format(TIME_FORMAT)),
        None => serializer.serialize_none(),
    }
}

/// Filters for `GET /cement-plant/page`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantSearch {
    #[serde(flatten)]
    pub page: PageQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plant_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PlantStatus>,
}

/// Filters for `GET /cement-plant/identification/page`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificationSearch {
    #[serde(flatten)]
    pub page: PageQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plant_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_time")]
    pub start_time: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_time")]
    pub end_time: Option<NaiveDateTime>,
}

/// Longitude/latitude window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_lng: f64,
    pub max_lng: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TimeRange {
    #[serde(serialize_with = "serialize_time")]
    start_time: Option<NaiveDateTime>,
    #[serde(serialize_with = "serialize_time")]
    end_time: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct CementPlantApi {
    client: ApiClient,
}

impl CementPlantApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    // ---- plants ----

    pub async fn list(&self) -> Result<ResponseEnvelope<Vec<CementPlant>>> {
        self.client.send(ApiRequest::get("/cement-plant/list")).await
    }

    pub async fn get(&self, plant_id: i64) -> Result<ResponseEnvelope<CementPlant>> {
        self.client
            .send(ApiRequest::get(format!("/cement-plant/{}", segment(plant_id))))
            .await
    }

    pub async fn add(&self, plant: &CementPlant) -> Result<ResponseEnvelope<Value>> {
        self.client
            .send(ApiRequest::post("/cement-plant").json(plant)?)
            .await
    }

    pub async fn update(&self, plant: &CementPlant) -> Result<ResponseEnvelope<Value>> {
        self.client
            .send(ApiRequest::put("/cement-plant").json(plant)?)
            .await
    }

    pub async fn delete(&self, plant_id: i64) -> Result<ResponseEnvelope<Value>> {
        self.client
            .send(ApiRequest::delete(format!("/cement-plant/{}", segment(plant_id))))
            .await
    }

    #[instrument(skip(self))]
    pub async fn search(&self, search: &PlantSearch) -> Result<ResponseEnvelope<PageBean<CementPlant>>> {
        self.client
            .send(ApiRequest::get("/cement-plant/page").query_params(search)?)
            .await
    }

    pub async fn by_location(&self, window: BoundingBox) -> Result<ResponseEnvelope<Vec<CementPlant>>> {
        self.client
            .send(ApiRequest::get("/cement-plant/location-range").query_params(&window)?)
            .await
    }

    // ---- identifications ----

    pub async fn identifications(&self) -> Result<ResponseEnvelope<Vec<CementPlantIdentification>>> {
        self.client
            .send(ApiRequest::get("/cement-plant/identification/list"))
            .await
    }

    pub async fn identification(&self, id: i64) -> Result<ResponseEnvelope<CementPlantIdentification>> {
        self.client
            .send(ApiRequest::get(format!(
                "/cement-plant/identification/{}",
                segment(id)
            )))
            .await
    }

    pub async fn add_identification(
        &self,
        identification: &CementPlantIdentification,
    ) -> Result<ResponseEnvelope<Value>> {
        self.client
            .send(ApiRequest::post("/cement-plant/identification").json(identification)?)
            .await
    }

    pub async fn update_identification(
        &self,
        identification: &CementPlantIdentification,
    ) -> Result<ResponseEnvelope<Value>> {
        self.client
            .send(ApiRequest::put("/cement-plant/identification").json(identification)?)
            .await
    }

    pub async fn delete_identification(&self, id: i64) -> Result<ResponseEnvelope<Value>> {
        self.client
            .send(ApiRequest::delete(format!(
                "/cement-plant/identification/{}",
                segment(id)
            )))
            .await
    }

    #[instrument(skip(self))]
    pub async fn search_identifications(
        &self,
        search: &IdentificationSearch,
    ) -> Result<ResponseEnvelope<PageBean<CementPlantIdentification>>> {
        self.client
            .send(ApiRequest::get("/cement-plant/identification/page").query_params(search)?)
            .await
    }

    // ---- statistics ----

    pub async fn active_count(&self) -> Result<ResponseEnvelope<u64>> {
        self.client
            .send(ApiRequest::get("/cement-plant/stats/active-count"))
            .await
    }

    pub async fn identification_count(&self, plant_id: i64) -> Result<ResponseEnvelope<u64>> {
        self.client
            .send(ApiRequest::get(format!(
                "/cement-plant/stats/identification-count/{}",
                segment(plant_id)
            )))
            .await
    }

    pub async fn identification_count_between(
        &self,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> Result<ResponseEnvelope<u64>> {
        let range = TimeRange {
            start_time: Some(start_time),
            end_time: Some(end_time),
        };
        self.client
            .send(ApiRequest::get("/cement-plant/stats/identification-count-by-time").query_params(&range)?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::test_support::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_identification_search_formats_times() {
        let search = IdentificationSearch {
            plant_id: Some(4),
            start_time: Some(at(1, 8)),
            ..Default::default()
        };
        let request = ApiRequest::get("/x").query_params(&search).unwrap();

        assert_eq!(
            request.query,
            vec![
                ("pageNum".to_string(), "1".to_string()),
                ("pageSize".to_string(), "10".to_string()),
                ("plantId".to_string(), "4".to_string()),
                ("startTime".to_string(), "2024-03-01 08:00:00".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_search_plants_by_status() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|request| {
                request.url
                    == "http://localhost:8083/cement-plant/page?pageNum=1&pageSize=10&province=Hubei&status=under_construction"
            })
            .times(1)
            .returning(|_| {
                Ok(response(
                    200,
                    r#"{"code":200,"data":{"total":1,"list":[{"plantId":9,"plantName":"Huaxin","longitude":114.3,"latitude":30.6,"status":"under_construction"}]}}"#,
                ))
            });

        let api = CementPlantApi::new(client(http, empty_session()));
        let search = PlantSearch {
            province: Some("Hubei".into()),
            status: Some(PlantStatus::UnderConstruction),
            ..Default::default()
        };
        let page = api.search(&search).await.unwrap().data.unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].plant_id, Some(9));
    }

    #[tokio::test]
    async fn test_list_tolerates_unknown_status() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .times(1)
            .returning(|_| {
                Ok(response(
                    200,
                    r#"{"code":200,"data":[
                        {"plantId":1,"plantName":"Huaxin","longitude":114.3,"latitude":30.6,"status":"active"},
                        {"plantId":2,"plantName":"Gezhouba","longitude":111.3,"latitude":30.7,"status":"decommissioned"}
                    ]}"#,
                ))
            });

        let api = CementPlantApi::new(client(http, empty_session()));
        let plants = api.list().await.unwrap().data.unwrap();

        assert_eq!(plants[0].status, Some(PlantStatus::Active));
        assert_eq!(plants[1].status, Some(PlantStatus::Other("decommissioned".into())));
    }

    #[tokio::test]
    async fn test_count_by_time_range() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|request| {
                request.url.contains("/cement-plant/stats/identification-count-by-time?")
                    && request.url.contains("startTime=2024-03-01+08%3A00%3A00")
                    && request.url.contains("endTime=2024-03-02+18%3A00%3A00")
            })
            .times(1)
            .returning(|_| Ok(response(200, r#"{"code":200,"data":12}"#)));

        let api = CementPlantApi::new(client(http, empty_session()));
        let count = api
            .identification_count_between(at(1, 8), at(2, 18))
            .await
            .unwrap();
        assert_eq!(count.data, Some(12));
    }

    #[tokio::test]
    async fn test_location_range_params() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|request| {
                request.url
                    == "http://localhost:8083/cement-plant/location-range?minLng=113.5&maxLng=115.0&minLat=30.0&maxLat=31.25"
            })
            .times(1)
            .returning(|_| Ok(response(200, r#"{"code":200,"data":[]}"#)));

        let api = CementPlantApi::new(client(http, empty_session()));
        let window = BoundingBox {
            min_lng: 113.5,
            max_lng: 115.0,
            min_lat: 30.0,
            max_lat: 31.25,
        };
        let plants = api.by_location(window).await.unwrap();
        assert_eq!(plants.data, Some(vec![]));
    }
}
