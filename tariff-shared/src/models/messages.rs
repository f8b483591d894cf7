//! Request/response messages for offloaded pricing work.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::chart::{DemandLines, DemandSpec, RawSampleSet, XSegment};
use super::groups::GroupName;
use super::params::PricingParams;
use super::rates::ServiceKey;
use super::results::ResultItem;

/// Breakdown of every service of `group` at one slider price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeListRequest {
    pub price: f64,
    pub group: GroupName,
    pub params: PricingParams,
}

/// Margin curve of one service across the feasible groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleChartRequest {
    pub params: PricingParams,
    pub service: ServiceKey,
    /// Defaults to the groups feasible for `params.weight_g`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feasible_groups: Option<Vec<GroupName>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples: Option<usize>,
}

/// Demand and total-profit overlays over already-compressed segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleDemandRequest {
    pub params: PricingParams,
    pub service: ServiceKey,
    pub segments: Vec<XSegment>,
    pub demand: DemandSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OffloadRequest {
    ComputeList(ComputeListRequest),
    SampleChart(SampleChartRequest),
    SampleDemandLines(SampleDemandRequest),
}

impl OffloadRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            OffloadRequest::ComputeList(_) => "compute_list",
            OffloadRequest::SampleChart(_) => "sample_chart",
            OffloadRequest::SampleDemandLines(_) => "sample_demand_lines",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OffloadResponse {
    ComputeListDone { items: Vec<ResultItem> },
    SampleChartDone { raw_sets: Vec<RawSampleSet> },
    SampleDemandLinesDone(DemandLines),
}

impl OffloadResponse {
    pub fn kind(&self) -> &'static str {
        match self {
            OffloadResponse::ComputeListDone { .. } => "compute_list_done",
            OffloadResponse::SampleChartDone { .. } => "sample_chart_done",
            OffloadResponse::SampleDemandLinesDone(_) => "sample_demand_lines_done",
        }
    }

    /// True when this response answers `request`'s kind.
    pub fn answers(&self, request: &OffloadRequest) -> bool {
        matches!(
            (request, self),
            (OffloadRequest::ComputeList(_), OffloadResponse::ComputeListDone { .. })
                | (OffloadRequest::SampleChart(_), OffloadResponse::SampleChartDone { .. })
                | (OffloadRequest::SampleDemandLines(_), OffloadResponse::SampleDemandLinesDone(_))
        )
    }
}

/// Correlation wrapper; a reply carries the id of the request it answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub id: Uuid,
    pub issued_at: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: T,
}

impl<T> Envelope<T> {
    pub fn new(payload: T) -> Self {
        Self { id: Uuid::new_v4(), issued_at: Utc::now(), payload }
    }

    pub fn reply<U>(&self, payload: U) -> Envelope<U> {
        Envelope { id: self.id, issued_at: Utc::now(), payload }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_tagged_by_type() {
        let req = OffloadRequest::ComputeList(ComputeListRequest {
            price: 999.0,
            group: GroupName::ExtraSmall,
            params: PricingParams::default(),
        });
        let value = serde_json::to_value(Envelope::new(req.clone())).unwrap();
        assert_eq!(value["type"], "compute_list");
        assert!(value["id"].is_string());

        let resp = OffloadResponse::SampleDemandLinesDone(DemandLines::default());
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["type"], "sample_demand_lines_done");
        assert!(value["q_pts"].as_array().unwrap().is_empty());
        assert!(!resp.answers(&req));
        assert!(OffloadResponse::ComputeListDone { items: vec![] }.answers(&req));
    }

    #[test]
    fn test_reply_keeps_correlation_id() {
        let env = Envelope::new(1u8);
        let reply = env.reply("done");
        assert_eq!(env.id, reply.id);
    }
}
