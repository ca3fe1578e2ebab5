use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use utoipa::ToSchema;

// Input records

/// A number that upstream sources deliver either as a JSON number or as a
/// numeric string (`"103.52"`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum NumericValue {
    Number(f64),
    Text(String),
}

impl NumericValue {
    /// Numeric coercion; unparseable text becomes NaN and is filtered downstream
    pub fn coerce(&self) -> f64 {
        match self {
            NumericValue::Number(n) => *n,
            NumericValue::Text(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        }
    }
}

impl From<f64> for NumericValue {
    fn from(value: f64) -> Self {
        NumericValue::Number(value)
    }
}

/// One observation for a station. The station id is the key of the
/// enclosing map.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ObservationPoint {
    /// `YYYYMMDD` for daily series, `YYYYMM` for monthly series
    #[serde(alias = "ymd")]
    pub date: String,
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub elevation: Option<NumericValue>,
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub temperature: Option<NumericValue>,
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub conductivity: Option<NumericValue>,
    #[serde(default, alias = "waterLevel")]
    #[schema(value_type = Option<f64>)]
    pub water_level: Option<NumericValue>,
}

impl ObservationPoint {
    pub fn new(date: &str, elevation: f64) -> Self {
        Self {
            date: date.to_string(),
            elevation: Some(elevation.into()),
            temperature: None,
            conductivity: None,
            water_level: None,
        }
    }

    /// Coerced value of one measurement, NaN when absent or malformed
    pub fn value_of(&self, measurement: Measurement) -> f64 {
        let field = match measurement {
            Measurement::Elevation => &self.elevation,
            Measurement::Temperature => &self.temperature,
            Measurement::Conductivity => &self.conductivity,
            Measurement::WaterLevel => &self.water_level,
        };
        field.as_ref().map(NumericValue::coerce).unwrap_or(f64::NAN)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum Measurement {
    #[default]
    Elevation,
    Temperature,
    Conductivity,
    WaterLevel,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverviewRequest {
    pub stations: BTreeMap<String, Vec<ObservationPoint>>,
    /// Stations the caller asked for; any that are missing from `stations`
    /// still get columns and are reported in `missingStations`
    #[serde(default)]
    pub expected_stations: Vec<String>,
    /// Measurement shown in the daily table
    #[serde(default)]
    pub measurement: Measurement,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct ForecastRecord {
    #[serde(default)]
    pub station_id: String,
    pub yyyymm: u32,
    pub observed: f64,
    pub predicted: f64,
    #[serde(default)]
    pub diff: Option<f64>,
}

impl ForecastRecord {
    pub fn new(yyyymm: u32, observed: f64, predicted: f64) -> Self {
        Self {
            station_id: String::new(),
            yyyymm,
            observed,
            predicted,
            diff: None,
        }
    }

    /// Deviation shown in the heatmap, `predicted - observed` unless supplied
    pub fn deviation(&self) -> f64 {
        self.diff.unwrap_or(self.predicted - self.observed)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct VerificationRequest {
    pub records: Vec<ForecastRecord>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct SensitivityRecord {
    pub station_id: String,
    pub increase_if_rainfall: f64,
    pub decrease_if_drought: f64,
    #[serde(default)]
    pub range_variation: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct SensitivityRequest {
    pub stations: Vec<SensitivityRecord>,
}

/// Historical percentile thresholds of one station
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct PercentileProfile {
    pub p10: f64,
    pub p25: f64,
    pub p75: f64,
    pub p90: f64,
}

impl PercentileProfile {
    pub fn is_finite(&self) -> bool {
        [self.p10, self.p25, self.p75, self.p90]
            .iter()
            .all(|p| p.is_finite())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StationStatusInput {
    pub station_id: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub percentiles: Option<PercentileProfile>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct StatusRequest {
    pub stations: Vec<StationStatusInput>,
}

// Daily table

/// One station's cell in a daily table row.
///
/// Serialized as `[value, null]` on the calendar's first date, `[value]`
/// on later dates and `[]` when the station has no reading that day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DailyCell {
    First(f64),
    Observed(f64),
    Missing,
}

impl DailyCell {
    pub fn value(&self) -> Option<f64> {
        match self {
            DailyCell::First(v) | DailyCell::Observed(v) => Some(*v),
            DailyCell::Missing => None,
        }
    }
}

impl Serialize for DailyCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeSeq;

        match self {
            DailyCell::First(v) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(v)?;
                seq.serialize_element(&Option::<f64>::None)?;
                seq.end()
            }
            DailyCell::Observed(v) => {
                let mut seq = serializer.serialize_seq(Some(1))?;
                seq.serialize_element(v)?;
                seq.end()
            }
            DailyCell::Missing => serializer.serialize_seq(Some(0))?.end(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailyTableRow {
    pub date: String,
    #[schema(value_type = Object)]
    pub values: BTreeMap<String, DailyCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DiffTableRow {
    pub date: String,
    /// `previous - current`; null on the first date or when either side is missing
    pub values: BTreeMap<String, Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyTable {
    pub rows: Vec<DailyTableRow>,
    pub diff_rows: Vec<DiffTableRow>,
}

// Geomap and trend

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RollingMeans {
    pub elev_mean_1: Option<f64>,
    pub elev_mean_7: Option<f64>,
    pub elev_mean_14: Option<f64>,
    pub elev_mean_30: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrendMetric {
    /// Relative position of the latest reading within `[min, max]`, 0..=1
    pub position: Option<f64>,
    pub latest_elev: Option<f64>,
    pub latest_ymd: Option<String>,
    pub min_elev: Option<f64>,
    pub max_elev: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResult {
    pub table: DailyTable,
    pub geomap: BTreeMap<String, RollingMeans>,
    pub trend: BTreeMap<String, TrendMetric>,
    /// Stations that were requested but delivered no usable readings
    pub missing_stations: Vec<String>,
}

// Forecast verification

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    /// Climatological season of a month; December shares winter with
    /// January and February regardless of calendar year.
    pub fn from_month(month: u32) -> Option<Season> {
        match month {
            3..=5 => Some(Season::Spring),
            6..=8 => Some(Season::Summer),
            9..=11 => Some(Season::Autumn),
            12 | 1 | 2 => Some(Season::Winter),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SeasonSummary {
    pub season: Season,
    pub count: usize,
    pub rmse: f64,
    pub bias: f64,
    pub range: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricSummary {
    pub count: usize,
    pub mean_predicted: f64,
    pub mean_observed: f64,
    pub rmse: f64,
    pub nse: f64,
    pub kge: f64,
    pub r2: f64,
    pub bias: f64,
    pub range: f64,
    pub mae: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct YearSummary {
    pub year: i32,
    #[serde(flatten)]
    pub metrics: MetricSummary,
    pub seasons: Vec<SeasonSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct HeatmapRow {
    pub year: i32,
    /// January..December; null where the month has no record
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct VerificationResult {
    pub years: Vec<YearSummary>,
    pub heatmap: Vec<HeatmapRow>,
    pub overall: Option<MetricSummary>,
}

// Sensitivity

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum SensitivityType {
    #[serde(rename = "강수형")]
    Rainfall,
    #[serde(rename = "가뭄형")]
    Drought,
    #[serde(rename = "복합형")]
    Composite,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ClassifiedSensitivity {
    #[serde(flatten)]
    pub record: SensitivityRecord,
    /// Null when either magnitude is not a finite number
    pub sensitive_type: Option<SensitivityType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct SensitivityResult {
    pub stations: Vec<ClassifiedSensitivity>,
}

// Status banding

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum StatusBand5 {
    VeryHigh,
    High,
    Normal,
    Low,
    VeryLow,
    NoData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum StatusBand3 {
    Danger,
    Warning,
    Normal,
    NoData,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StationStatus {
    pub station_id: String,
    pub value: Option<f64>,
    pub band5: StatusBand5,
    pub band3: StatusBand3,
}

/// Number of stations per five-level band, for legend display
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BandCounts {
    pub very_high: usize,
    pub high: usize,
    pub normal: usize,
    pub low: usize,
    pub very_low: usize,
    pub no_data: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusResult {
    pub stations: Vec<StationStatus>,
    pub band_counts: BandCounts,
}
