//! Velocity detection.
//!
//! Per post, leaves first:
//! 1. Eligibility filter and rates ([`eligibility`])
//! 2. Acceleration from the snapshot series ([`acceleration`])
//! 3. Peak-window heuristic ([`peak`])
//! 4. Urgency bucket ([`urgency`])
//! 5. Confidence blend ([`confidence`])
//!
//! [`VelocityEngine::analyze_creator`] runs this over a creator's recent
//! posts and ranks the spikes.

pub mod acceleration;
pub mod confidence;
pub mod eligibility;
pub mod engine;
pub mod peak;
pub mod urgency;

pub use confidence::ConfidenceBreakdown;
pub use eligibility::{normalize_baseline, Ineligible, PostRates};
pub use engine::{
    analyze_creator, evaluate_post, recency_cutoff, CreatorAnalysis, ExclusionCounts,
    VelocityEngine,
};
