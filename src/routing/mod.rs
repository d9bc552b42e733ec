//! Routing configuration subsystem.
//!
//! # Data Flow
//! ```text
//! discovered service (normalized name + destinations)
//!     → synth.rs (derive cluster + catch-all/root-match routes)
//!     → model.rs types (Route, Cluster, RouteTransform)
//!     → assembled into a ConfigSnapshot by the provider
//! ```
//!
//! # Design Decisions
//! - Routes and clusters are plain data: the dispatch engine that consumes
//!   them lives outside this crate
//! - Transforms carry their own apply semantics so path rewriting is
//!   testable without a proxy in the loop
//! - Destination maps are ordered so snapshot dumps are deterministic

pub mod model;
pub mod synth;

pub use model::{Cluster, Destination, ForwardedCall, Route, RouteTransform};
pub use synth::{synthesize, FORWARDED_PATH_BASE_HEADER};
