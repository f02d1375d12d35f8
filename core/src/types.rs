//! Shared primitive types used across the engine.

/// A mobile subscriber number. Primary key of subscriber rows.
pub type Msisdn = i64;

/// Identifier of one analysis run.
pub type RunId = String;

/// The eight recommendation columns, in the order the model is asked to emit them.
pub const RECOMMENDATION_COLUMNS: [&str; 8] = [
    "MSISDN",
    "RecommendedProduct",
    "Category",
    "Tier",
    "ProductPrice",
    "Reason",
    "UpsellOption",
    "CrossSellOption",
];

/// Profiling attributes offered to the operator by default.
pub const DEFAULT_PROFILING_FIELDS: [&str; 4] =
    ["DemographicSegment", "DeviceType", "CurrentPlan", "VASUsed"];
