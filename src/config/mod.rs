//! Settings management subsystem.
//!
//! # Data Flow
//! ```text
//! settings file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → Settings (validated, immutable)
//!     → main.rs wires the topology binding + admin surface from it
//! ```
//!
//! # Design Decisions
//! - Settings are immutable once loaded; a refresh re-reads topology, not
//!   this file
//! - All fields have defaults so a minimal (or absent) file is valid
//! - Validation separates syntactic (serde) from semantic checks and
//!   reports every problem, not just the first

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_settings, ConfigError};
pub use schema::{AdminSettings, ObservabilitySettings, Settings, TopologyMode, TopologySettings};
pub use validation::{validate_settings, ValidationError};
