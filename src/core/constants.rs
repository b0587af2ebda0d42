//! Core constants shared by the layer lifecycle, the query builders and the
//! popup placement. Keeping them in a single place makes it easier to tweak
//! engine-wide magic numbers.

/// Default square tile size in pixels. The viewport extent approximation
/// scales by `pixels / TILE_SIZE`.
pub const TILE_SIZE: f64 = 256.0;

/// Longitude span covered by a single tile at zoom 0.
pub const WORLD_LON_SPAN: f64 = 360.0;

/// Latitude span assumed for a single tile at zoom 0 by the planar extent
/// approximation (roughly the Web Mercator latitude range).
pub const WORLD_LAT_SPAN: f64 = 170.0;

/// Fixed info popup size in screen units (width, height).
pub const POPUP_SIZE: (f64, f64) = (200.0, 120.0);

/// Zoom range registered for vector tile sources.
pub const SOURCE_MIN_ZOOM: u8 = 0;
pub const SOURCE_MAX_ZOOM: u8 = 22;

/// Default paint for point layers.
pub const CIRCLE_RADIUS: f64 = 6.0;
pub const CIRCLE_COLOR: &str = "#ff0000";

/// Default paint for line layers.
pub const LINE_WIDTH: f64 = 2.0;
pub const LINE_COLOR: &str = "#0000ff";

/// Default paint for polygon layers.
pub const FILL_COLOR: &str = "#0080FF";
pub const FILL_OPACITY: f64 = 0.2;
pub const FILL_OUTLINE_COLOR: &str = "#0000FF";

/// Fixed WMS GetFeatureInfo parameters.
pub const WMS_SERVICE: &str = "WMS";
pub const WMS_VERSION: &str = "1.1.1";
pub const WMS_REQUEST: &str = "GetFeatureInfo";
pub const WMS_INFO_FORMAT: &str = "application/json";
pub const WMS_SRS: &str = "EPSG:4326";
pub const WMS_FEATURE_COUNT: u32 = 10;

/// Placeholder shown for attributes a clicked feature does not carry.
pub const MISSING_ATTRIBUTE: &str = "N/A";

/// Mean earth radius used by the measurement tools, in metres.
pub const EARTH_RADIUS: f64 = 6_378_137.0;
