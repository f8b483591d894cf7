use serde::{Deserialize, Serialize};

use super::groups::GroupName;
use super::results::PriceRange;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub price: f64,
    pub margin: f64,
}

/// Uniform (price, margin) samples of one group over its margin-feasible range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSampleSet {
    pub group: GroupName,
    pub range: PriceRange,
    pub samples: Vec<RawSample>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
    pub price: f64,
    pub margin: f64,
    pub group: GroupName,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub group: GroupName,
    pub points: Vec<ChartPoint>,
}

/// Where one group's price range lands on the compressed x-axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XSegment {
    pub price_min: f64,
    pub price_max: f64,
    pub x_min: f64,
    pub x_max: f64,
    pub group: GroupName,
}

/// Demand curve used for the volume and total-profit overlays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum DemandCurve {
    /// `q = (P / P0)^-epsilon`
    #[serde(rename = "ce")]
    ConstantElasticity {
        #[serde(default)]
        epsilon: Option<f64>,
        #[serde(default)]
        pref_price: Option<f64>,
    },
    /// `q = 1 / (1 + e^(k (P - pmid)))`, fitted through the 10%/90% prices.
    Logistic {
        #[serde(default)]
        p10: Option<f64>,
        #[serde(default)]
        p90: Option<f64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandSpec {
    #[serde(flatten)]
    pub curve: DemandCurve,
    pub global_min: f64,
    pub global_max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandPoint {
    pub x: f64,
    pub y: f64,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DemandLines {
    pub q_pts: Vec<DemandPoint>,
    pub pi_pts: Vec<DemandPoint>,
}
