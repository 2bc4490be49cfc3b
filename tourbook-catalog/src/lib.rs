pub mod pricing;
pub mod riders;

pub use pricing::{display_cents, parse_quoted_total, PricedTotal, PricingError, PricingValidator};
pub use riders::{RiderCheck, RiderError, RiderPolicy, RiderValidator, SubmittedRider, MAX_RIDERS};
