//! # Map Layer Configuration
//!
//! Static description of the map server (WMS/WFS endpoints, the three plant
//! layers with their legends, default view and base maps) plus URL builders
//! for the OGC services.
//!
//! In mock mode no map server is contacted and WMS URLs use the
//! `mock://wms/<layer>` scheme.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GeoError {
    #[error("Unknown map layer: {0}")]
    UnknownLayer(String),

    #[error("Invalid map service URL: {0}")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, GeoError>;

pub const CEMENT_PLANTS: &str = "cementPlants";
pub const CEMENT_PLANT_IDENTIFICATIONS: &str = "cementPlantIdentifications";
pub const GEOSPATIAL_FILES: &str = "geospatialFiles";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WmsSettings {
    pub url: String,
    pub version: String,
    pub format: String,
    pub transparent: bool,
    pub crs: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WfsSettings {
    pub url: String,
    pub version: String,
    pub output_format: String,
    pub crs: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
    pub color: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    pub title: String,
    pub items: Vec<LegendItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Qualified layer name on the map server, e.g. `cement:cement_plants`.
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub style: Option<String>,
    pub visible: bool,
    pub opacity: f32,
    pub legend: Legend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    /// `[longitude, latitude]`.
    pub center: [f64; 2],
    pub zoom: u8,
    pub projection: String,
    pub max_zoom: u8,
    pub min_zoom: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseMap {
    pub name: String,
    /// Tile URL template with `{z}`, `{x}`, `{y}` placeholders.
    pub url: String,
    pub attribution: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapServiceConfig {
    pub base_url: String,
    pub workspace: String,
    pub mock_mode: bool,
    pub wms: WmsSettings,
    pub wfs: WfsSettings,
    pub layers: BTreeMap<String, LayerConfig>,
    pub map: MapView,
    pub base_maps: BTreeMap<String, BaseMap>,
}

fn legend(title: &str, items: &[(Option<&str>, &str, &str)]) -> Legend {
    Legend {
        title: title.to_string(),
        items: items
            .iter()
            .map(|(shape, color, label)| LegendItem {
                shape: shape.map(str::to_string),
                color: color.to_string(),
                label: label.to_string(),
            })
            .collect(),
    }
}

fn layer(name: &str, title: &str, visible: bool, opacity: f32, legend: Legend) -> LayerConfig {
    let style = name.split_once(':').map(|(_, style)| style.to_string());
    LayerConfig {
        name: name.to_string(),
        title: title.to_string(),
        style,
        visible,
        opacity,
        legend,
    }
}

fn base_map(name: &str, url: &str, attribution: &str) -> BaseMap {
    BaseMap {
        name: name.to_string(),
        url: url.to_string(),
        attribution: attribution.to_string(),
    }
}

impl Default for MapServiceConfig {
    fn default() -> Self {
        let layers = BTreeMap::from([
            (
                CEMENT_PLANTS.to_string(),
                layer(
                    "cement:cement_plants",
                    "Cement plant locations",
                    true,
                    1.0,
                    legend(
                        "Cement plants",
                        &[
                            (None, "#00ff00", "Active"),
                            (None, "#ff0000", "Inactive"),
                            (None, "#ffff00", "Under construction"),
                        ],
                    ),
                ),
            ),
            (
                CEMENT_PLANT_IDENTIFICATIONS.to_string(),
                layer(
                    "cement:cement_plant_identifications",
                    "Cement plant identifications",
                    true,
                    0.8,
                    legend(
                        "Identifications",
                        &[
                            (Some("square"), "#0066cc", "GF-2"),
                            (Some("triangle"), "#ff6600", "Landsat-8"),
                            (Some("star"), "#9900cc", "Sentinel-2"),
                        ],
                    ),
                ),
            ),
            (
                GEOSPATIAL_FILES.to_string(),
                layer(
                    "cement:geospatial_files",
                    "Geospatial data files",
                    false,
                    0.5,
                    legend(
                        "TIF file bounds",
                        &[(None, "#00ff00", "TIF file"), (None, "#ffaa00", "Other format")],
                    ),
                ),
            ),
        ]);

        let base_maps = BTreeMap::from([
            (
                "osm".to_string(),
                base_map(
                    "OpenStreetMap",
                    "https://{a-c}.tile.openstreetmap.org/{z}/{x}/{y}.png",
                    "© OpenStreetMap contributors",
                ),
            ),
            (
                "satellite".to_string(),
                base_map(
                    "Satellite imagery",
                    "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
                    "© Esri",
                ),
            ),
            (
                "terrain".to_string(),
                base_map(
                    "Terrain",
                    "https://server.arcgisonline.com/ArcGIS/rest/services/World_Topo_Map/MapServer/tile/{z}/{y}/{x}",
                    "© Esri",
                ),
            ),
        ]);

        Self {
            base_url: "http://localhost:8080/geoserver".to_string(),
            workspace: "cement".to_string(),
            mock_mode: true,
            wms: WmsSettings {
                url: "http://localhost:8080/geoserver/cement/wms".to_string(),
                version: "1.3.0".to_string(),
                format: "image/png".to_string(),
                transparent: true,
                crs: "EPSG:4326".to_string(),
            },
            wfs: WfsSettings {
                url: "http://localhost:8080/geoserver/cement/wfs".to_string(),
                version: "2.0.0".to_string(),
                output_format: "application/json".to_string(),
                crs: "EPSG:4326".to_string(),
            },
            layers,
            map: MapView {
                center: [114.3, 30.6],
                zoom: 8,
                projection: "EPSG:4326".to_string(),
                max_zoom: 18,
                min_zoom: 3,
            },
            base_maps,
        }
    }
}

impl MapServiceConfig {
    pub fn layer(&self, key: &str) -> Result<&LayerConfig> {
        self.layers
            .get(key)
            .ok_or_else(|| GeoError::UnknownLayer(key.to_string()))
    }

    pub fn layers(&self) -> &BTreeMap<String, LayerConfig> {
        &self.layers
    }

    pub fn map_view(&self) -> &MapView {
        &self.map
    }

    pub fn base_maps(&self) -> &BTreeMap<String, BaseMap> {
        &self.base_maps
    }

    /// WMS `GetMap` URL for a layer. `extra` entries override the defaults.
    ///
    /// In mock mode the layer key is not checked.
    pub fn wms_layer_url(&self, key: &str, extra: &[(&str, &str)]) -> Result<String> {
        if self.mock_mode {
            return Ok(format!("mock://wms/{key}"));
        }

        let layer = self.layer(key)?;
        let transparent = self.wms.transparent.to_string();
        let defaults = [
            ("SERVICE", "WMS"),
            ("VERSION", self.wms.version.as_str()),
            ("REQUEST", "GetMap"),
            ("LAYERS", layer.name.as_str()),
            ("STYLES", layer.style.as_deref().unwrap_or("")),
            ("FORMAT", self.wms.format.as_str()),
            ("TRANSPARENT", transparent.as_str()),
            ("CRS", self.wms.crs.as_str()),
        ];
        build_url(&self.wms.url, &defaults, extra)
    }

    /// WFS `GetFeature` URL for a layer. `extra` entries override the defaults.
    pub fn wfs_layer_url(&self, key: &str, extra: &[(&str, &str)]) -> Result<String> {
        let layer = self.layer(key)?;
        let defaults = [
            ("SERVICE", "WFS"),
            ("VERSION", self.wfs.version.as_str()),
            ("REQUEST", "GetFeature"),
            ("TYPENAME", layer.name.as_str()),
            ("OUTPUTFORMAT", self.wfs.output_format.as_str()),
            ("SRSNAME", self.wfs.crs.as_str()),
        ];
        build_url(&self.wfs.url, &defaults, extra)
    }
}

fn build_url(endpoint: &str, defaults: &[(&str, &str)], extra: &[(&str, &str)]) -> Result<String> {
    let mut url = Url::parse(endpoint).map_err(|e| GeoError::InvalidUrl(e.to_string()))?;
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in defaults {
            let value = extra
                .iter()
                .find(|(k, _)| k == key)
                .map_or(*value, |(_, v)| *v);
            pairs.append_pair(key, value);
        }
        for (key, value) in extra {
            if !defaults.iter().any(|(k, _)| k == key) {
                pairs.append_pair(key, value);
            }
        }
    }
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live() -> MapServiceConfig {
        MapServiceConfig {
            mock_mode: false,
            ..MapServiceConfig::default()
        }
    }

    #[test]
    fn test_mock_mode_wms_url() {
        let config = MapServiceConfig::default();
        assert_eq!(
            config.wms_layer_url("anything", &[]).unwrap(),
            "mock://wms/anything"
        );
    }

    #[test]
    fn test_wms_url() {
        let url = live().wms_layer_url(CEMENT_PLANTS, &[]).unwrap();
        assert_eq!(
            url,
            "http://localhost:8080/geoserver/cement/wms?SERVICE=WMS&VERSION=1.3.0&REQUEST=GetMap\
             &LAYERS=cement%3Acement_plants&STYLES=cement_plants&FORMAT=image%2Fpng\
             &TRANSPARENT=true&CRS=EPSG%3A4326"
        );
    }

    #[test]
    fn test_extra_params_override_and_extend() {
        let url = live()
            .wfs_layer_url(GEOSPATIAL_FILES, &[("SRSNAME", "EPSG:3857"), ("COUNT", "50")])
            .unwrap();
        assert!(url.contains("SRSNAME=EPSG%3A3857"));
        assert!(!url.contains("EPSG%3A4326"));
        assert!(url.ends_with("&COUNT=50"));
    }

    #[test]
    fn test_unknown_layer() {
        assert_eq!(
            live().wms_layer_url("roads", &[]),
            Err(GeoError::UnknownLayer("roads".to_string()))
        );
        assert!(MapServiceConfig::default().wfs_layer_url("roads", &[]).is_err());
    }

    #[test]
    fn test_defaults() {
        let config = MapServiceConfig::default();
        assert_eq!(config.layers().len(), 3);
        assert!(!config.layer(GEOSPATIAL_FILES).unwrap().visible);
        assert_eq!(config.map_view().center, [114.3, 30.6]);
        assert_eq!(config.base_maps().len(), 3);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: MapServiceConfig =
            serde_json::from_str(r#"{"mockMode": false, "workspace": "plants"}"#).unwrap();
        assert!(!config.mock_mode);
        assert_eq!(config.workspace, "plants");
        assert_eq!(config.wms.version, "1.3.0");
    }
}
