use {
    crate::ChartError,
    pose::PoseKeypoints,
    serde::{Deserialize, Serialize},
    std::fmt,
};

/// Garment size label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeKey {
    S,
    M,
    L,
    XL,
}

impl SizeKey {
    /// Evaluation order for recommendations; on equal fit the earlier key wins.
    pub const ALL: [SizeKey; 4] = [SizeKey::S, SizeKey::M, SizeKey::L, SizeKey::XL];

    pub fn as_str(self) -> &'static str {
        match self {
            SizeKey::S => "S",
            SizeKey::M => "M",
            SizeKey::L => "L",
            SizeKey::XL => "XL",
        }
    }
}

impl fmt::Display for SizeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference body measurements in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub shoulder: f32,
    pub chest: f32,
}

impl Measurement {
    pub fn new(shoulder: f32, chest: f32) -> Self {
        Self { shoulder, chest }
    }
}

/// Per-product size chart, one measurement per size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeChart {
    #[serde(rename = "S")]
    pub s: Measurement,
    #[serde(rename = "M")]
    pub m: Measurement,
    #[serde(rename = "L")]
    pub l: Measurement,
    #[serde(rename = "XL")]
    pub xl: Measurement,
}

impl Default for SizeChart {
    fn default() -> Self {
        Self {
            s: Measurement::new(42.0, 96.0),
            m: Measurement::new(44.0, 102.0),
            l: Measurement::new(46.0, 108.0),
            xl: Measurement::new(48.0, 114.0),
        }
    }
}

impl SizeChart {
    /// Parse a chart shaped like `{"S": {"shoulder": 42, "chest": 96}, ...}`.
    pub fn from_json(json: &str) -> Result<Self, ChartError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn get(&self, key: SizeKey) -> Measurement {
        match key {
            SizeKey::S => self.s,
            SizeKey::M => self.m,
            SizeKey::L => self.l,
            SizeKey::XL => self.xl,
        }
    }

    /// Entries in `SizeKey::ALL` order.
    pub fn entries(&self) -> impl Iterator<Item = (SizeKey, Measurement)> + '_ {
        SizeKey::ALL.iter().map(|&key| (key, self.get(key)))
    }
}

/// The sizing part of a catalog product record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSizing {
    pub id: String,
    pub name: String,
    #[serde(rename = "sizeChart", default, skip_serializing_if = "Option::is_none")]
    pub size_chart: Option<SizeChart>,
}

impl ProductSizing {
    /// Parse a product record; fields other than id, name and sizeChart are ignored.
    pub fn from_json(json: &str) -> Result<Self, ChartError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The product's chart, or the default chart when it has none.
    pub fn size_chart_or_default(&self) -> SizeChart {
        self.size_chart.unwrap_or_else(|| {
            log::info!("product {} has no size chart, using the default", self.id);
            SizeChart::default()
        })
    }
}

/// Conversion from normalized landmark distances to body measurements.
///
/// Both factors are empirical and were tuned for a single camera distance.
/// They need real anthropometric validation before being trusted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    cm_per_unit: f32,
    chest_ratio: f32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            cm_per_unit: 100.0,
            chest_ratio: 2.2,
        }
    }
}

impl Calibration {
    /// Centimeters per unit of normalized frame width.
    pub fn with_cm_per_unit(mut self, cm_per_unit: f32) -> Self {
        self.cm_per_unit = cm_per_unit;
        self
    }

    /// Chest width as a multiple of shoulder width.
    pub fn with_chest_ratio(mut self, chest_ratio: f32) -> Self {
        self.chest_ratio = chest_ratio;
        self
    }

    // Getters
    pub fn cm_per_unit(&self) -> f32 {
        self.cm_per_unit
    }

    pub fn chest_ratio(&self) -> f32 {
        self.chest_ratio
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeRecommendation {
    pub recommended_size: SizeKey,
    /// Whole centimeters.
    pub shoulder_width: f32,
    /// Whole centimeters.
    pub chest_width: f32,
    /// Lowest joint visibility of the frame, in [0, 1].
    pub confidence: f32,
}

impl SizeRecommendation {
    /// Confidence as a whole percentage, as shown on the size badge.
    pub fn match_percent(&self) -> u32 {
        (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u32
    }
}

/// Pick the chart size closest to the measured shoulder and chest widths.
///
/// Selection uses unrounded widths; only the reported widths are rounded.
pub fn recommend(
    keypoints: &PoseKeypoints,
    chart: &SizeChart,
    calibration: &Calibration,
) -> SizeRecommendation {
    let shoulder = (keypoints.right_shoulder.x - keypoints.left_shoulder.x).abs()
        * calibration.cm_per_unit;
    let chest = shoulder * calibration.chest_ratio;

    let mut best = SizeKey::S;
    let mut best_diff = f32::INFINITY;
    for (key, measurement) in chart.entries() {
        let diff = (measurement.shoulder - shoulder).abs() + (measurement.chest - chest).abs();
        if diff < best_diff {
            best = key;
            best_diff = diff;
        }
    }

    SizeRecommendation {
        recommended_size: best,
        shoulder_width: shoulder.round(),
        chest_width: chest.round(),
        confidence: keypoints.min_visibility(),
    }
}
