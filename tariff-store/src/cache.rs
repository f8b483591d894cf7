//! Content-addressed memo of offloaded pricing results.
//!
//! Entries are never evicted; the working set is bounded by what one session
//! of slider movements and chart redraws can produce. `clear` drops everything,
//! e.g. after the rate catalog is reloaded.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tariff_shared::{
    ComputeListRequest, DemandCurve, DemandSpec, OffloadRequest, OffloadResponse, PricingParams,
    SampleChartRequest, SampleDemandRequest, XSegment,
};

#[derive(Debug, Default)]
pub struct SampleCache {
    entries: DashMap<String, Arc<OffloadResponse>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

impl SampleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Arc<OffloadResponse>> {
        match self.entries.get(key) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(entry.value()))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn insert(&self, key: String, response: OffloadResponse) -> Arc<OffloadResponse> {
        let response = Arc::new(response);
        self.entries.insert(key, Arc::clone(&response));
        response
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

fn norm(v: f64, places: usize) -> String {
    if v.is_finite() {
        format!("{:.*}", places, v)
    } else {
        "NaN".to_string()
    }
}

fn norm_opt(v: Option<f64>, places: usize) -> String {
    v.map_or_else(|| "-".to_string(), |v| norm(v, places))
}

fn params_key(params: &PricingParams) -> String {
    // field order is fixed by the struct definition
    serde_json::to_string(params).unwrap_or_default()
}

fn segment_key(seg: &XSegment) -> String {
    [
        norm(seg.price_min, 2),
        norm(seg.price_max, 2),
        norm(seg.x_min, 1),
        norm(seg.x_max, 1),
        seg.group.to_string(),
    ]
    .join(":")
}

fn demand_key(spec: &DemandSpec) -> String {
    let curve = match spec.curve {
        DemandCurve::ConstantElasticity { epsilon, pref_price } => {
            format!("ce:{}:{}", norm_opt(epsilon, 4), norm_opt(pref_price, 2))
        }
        DemandCurve::Logistic { p10, p90 } => {
            format!("logistic:{}:{}", norm_opt(p10, 2), norm_opt(p90, 2))
        }
    };
    format!("{}:{}:{}", curve, norm(spec.global_min, 2), norm(spec.global_max, 2))
}

/// Canonical key: equal requests (up to number formatting) map to equal keys.
pub fn cache_key(request: &OffloadRequest) -> String {
    match request {
        OffloadRequest::ComputeList(ComputeListRequest { price, group, params }) => {
            // items echo the requested price, so it keys at full precision
            format!("cl:{}|{:?}|{}", group, price, params_key(params))
        }
        OffloadRequest::SampleChart(SampleChartRequest {
            params,
            service,
            feasible_groups,
            samples,
        }) => {
            let groups = feasible_groups
                .as_ref()
                .map(|gs| gs.iter().map(|g| g.as_str()).collect::<Vec<_>>().join(","))
                .unwrap_or_else(|| "*".to_string());
            format!(
                "sc:{}|{}|N={}|{}",
                service,
                groups,
                samples.map_or_else(|| "-".to_string(), |n| n.to_string()),
                params_key(params)
            )
        }
        OffloadRequest::SampleDemandLines(SampleDemandRequest {
            params,
            service,
            segments,
            demand,
            height,
            samples,
        }) => {
            let segs = segments.iter().map(segment_key).collect::<Vec<_>>().join("|");
            format!(
                "dl:{}|{}|{}|vbH={}|N={}|{}",
                service,
                segs,
                demand_key(demand),
                norm_opt(*height, 1),
                samples.map_or_else(|| "-".to_string(), |n| n.to_string()),
                params_key(params)
            )
        }
    }
}
