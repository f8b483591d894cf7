pub mod bounds;
pub mod candidates;
pub mod optimizer;
pub mod ranker;

pub use bounds::MarginBounds;
pub use candidates::CandidateGenerator;
pub use optimizer::{best_pricing, PricingOptimizer};
pub use ranker::{closest_to_bounds, compare_items, rank};
