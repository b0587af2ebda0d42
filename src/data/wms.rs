//! WMS GetFeatureInfo query for point-and-click feature lookups.

use crate::core::constants::{
    WMS_FEATURE_COUNT, WMS_INFO_FORMAT, WMS_REQUEST, WMS_SERVICE, WMS_SRS, WMS_VERSION,
};
use crate::core::geo::LatLng;
use crate::core::viewport::{Viewport, ViewportExtent};
use crate::data::filter::{compose_cql, FilterDefinition};
use crate::{MapError, Result};

/// Identify query centered on a clicked map point.
///
/// The query pixel is always the viewport center, and the bounding box is
/// the approximate extent around the clicked point.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureInfoRequest {
    pub layer_name: String,
    pub center: LatLng,
    pub zoom: f64,
    pub width: u32,
    pub height: u32,
    pub feature_count: u32,
    /// Composed CQL filter; empty means unfiltered
    pub cql_filter: String,
}

impl FeatureInfoRequest {
    pub fn new(layer_name: impl Into<String>, center: LatLng, zoom: f64, width: u32, height: u32) -> Self {
        Self {
            layer_name: layer_name.into(),
            center,
            zoom,
            width,
            height,
            feature_count: WMS_FEATURE_COUNT,
            cql_filter: String::new(),
        }
    }

    /// Query for `clicked` using the zoom and pixel size of `viewport`.
    pub fn from_viewport(layer_name: impl Into<String>, clicked: LatLng, viewport: &Viewport) -> Self {
        Self::new(
            layer_name,
            clicked,
            viewport.zoom,
            viewport.size.x.max(0.0).round() as u32,
            viewport.size.y.max(0.0).round() as u32,
        )
    }

    pub fn with_filter(mut self, definition: Option<&FilterDefinition>) -> Self {
        self.cql_filter = compose_cql(definition);
        self
    }

    pub fn with_feature_count(mut self, feature_count: u32) -> Self {
        self.feature_count = feature_count;
        self
    }

    pub fn extent(&self) -> ViewportExtent {
        ViewportExtent::around(
            self.center.lng,
            self.center.lat,
            self.zoom,
            f64::from(self.width),
            f64::from(self.height),
        )
    }

    /// Query pixel, the rounded viewport center.
    pub fn query_pixel(&self) -> (u32, u32) {
        (
            (f64::from(self.width) / 2.0).round() as u32,
            (f64::from(self.height) / 2.0).round() as u32,
        )
    }

    /// Query parameters in a stable order.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let (x, y) = self.query_pixel();
        let mut params = vec![
            ("SERVICE", WMS_SERVICE.to_string()),
            ("VERSION", WMS_VERSION.to_string()),
            ("REQUEST", WMS_REQUEST.to_string()),
            ("LAYERS", self.layer_name.clone()),
            ("QUERY_LAYERS", self.layer_name.clone()),
            ("INFO_FORMAT", WMS_INFO_FORMAT.to_string()),
            ("X", x.to_string()),
            ("Y", y.to_string()),
            ("BBOX", self.extent().to_bbox_string()),
            ("WIDTH", self.width.to_string()),
            ("HEIGHT", self.height.to_string()),
            ("SRS", WMS_SRS.to_string()),
            ("FEATURE_COUNT", self.feature_count.to_string()),
        ];
        if !self.cql_filter.is_empty() {
            params.push(("CQL_FILTER", self.cql_filter.clone()));
        }
        params
    }

    /// Full URL against the API's WMS proxy endpoint.
    pub fn url(&self, api_base: &str) -> Result<reqwest::Url> {
        reqwest::Url::parse_with_params(
            &format!("{}/proxy-wms/", api_base.trim_end_matches('/')),
            self.params(),
        )
        .map_err(|e| MapError::ParseError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::Point;
    use crate::data::filter::FilterCondition;

    fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_fixed_parameters() {
        let request = FeatureInfoRequest::new("plots", LatLng::new(19.0, 72.8), 10.0, 801, 600);
        let params = request.params();

        assert_eq!(param(&params, "SERVICE"), Some("WMS"));
        assert_eq!(param(&params, "VERSION"), Some("1.1.1"));
        assert_eq!(param(&params, "REQUEST"), Some("GetFeatureInfo"));
        assert_eq!(param(&params, "LAYERS"), Some("plots"));
        assert_eq!(param(&params, "QUERY_LAYERS"), Some("plots"));
        assert_eq!(param(&params, "INFO_FORMAT"), Some("application/json"));
        assert_eq!(param(&params, "X"), Some("401"));
        assert_eq!(param(&params, "Y"), Some("300"));
        assert_eq!(param(&params, "SRS"), Some("EPSG:4326"));
        assert_eq!(param(&params, "FEATURE_COUNT"), Some("10"));
        assert_eq!(param(&params, "CQL_FILTER"), None);
    }

    #[test]
    fn test_bbox_matches_extent() {
        let request = FeatureInfoRequest::new("plots", LatLng::new(19.0, 72.8), 10.0, 256, 256);
        let params = request.params();
        assert_eq!(
            param(&params, "BBOX"),
            Some(ViewportExtent::around(72.8, 19.0, 10.0, 256.0, 256.0).to_string().as_str())
        );
    }

    #[test]
    fn test_filter_is_attached_when_non_empty() {
        let definition =
            FilterDefinition::default().with_condition(FilterCondition::new("pop", ">", 100));
        let request = FeatureInfoRequest::new("plots", LatLng::default(), 5.0, 256, 256)
            .with_filter(Some(&definition));
        assert_eq!(param(&request.params(), "CQL_FILTER"), Some("pop > 100"));

        let request = request.with_filter(Some(&FilterDefinition::default()));
        assert_eq!(param(&request.params(), "CQL_FILTER"), None);
    }

    #[test]
    fn test_from_viewport() {
        let viewport = Viewport::new(LatLng::new(21.0, 75.7), 12.0, Point::new(1024.4, 767.6));
        let request = FeatureInfoRequest::from_viewport("plots", LatLng::new(21.1, 75.8), &viewport)
            .with_feature_count(3);
        assert_eq!((request.width, request.height), (1024, 768));
        assert_eq!(request.center, LatLng::new(21.1, 75.8));
        assert_eq!(param(&request.params(), "FEATURE_COUNT"), Some("3"));
    }

    #[test]
    fn test_url_encodes_parameters() {
        let definition =
            FilterDefinition::default().with_condition(FilterCondition::new("owner", "=", "O'Brien"));
        let url = FeatureInfoRequest::new("plots", LatLng::default(), 1.0, 256, 256)
            .with_filter(Some(&definition))
            .url("http://api.example/api/")
            .unwrap();

        assert_eq!(url.path(), "/api/proxy-wms/");
        let cql = url
            .query_pairs()
            .find(|(k, _)| k == "CQL_FILTER")
            .map(|(_, v)| v.into_owned());
        assert_eq!(cql.as_deref(), Some("owner = 'O''Brien'"));
    }
}
