pub mod models;
pub mod money;

pub use models::chart::{
    ChartPoint, ChartSeries, DemandCurve, DemandLines, DemandPoint, DemandSpec, RawSample,
    RawSampleSet, XSegment,
};
pub use models::groups::{BillingMode, Bounds, DimsLimit, DimsReport, GroupName, GroupRule};
pub use models::messages::{
    ComputeListRequest, Envelope, OffloadRequest, OffloadResponse, SampleChartRequest,
    SampleDemandRequest,
};
pub use models::params::{Dimensions, FxBase, LastMileFee, PricingParams, DEFAULT_MARGIN_FLOOR};
pub use models::rates::{DeliveryMode, LinearPricing, RateEntry, RateSheet, ServiceKey};
pub use models::results::{CalcBreakdown, PriceRange, PricingOutcome, ResultItem, SafeRange};
