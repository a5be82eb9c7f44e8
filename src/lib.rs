//! Interactive 3D visualizer for layered neural-network weight files.
//!
//! The core pipeline: raw text → [`parser::parse`] → [`model::NetworkModel`]
//! → [`model::layer_info`] / [`diff::compare`] → [`layout::NetworkLayout`]
//! → [`scene::Scene`] (interactive 3D view) and/or
//! [`summary::ComparisonSummary`] (pairwise difference summary).

pub mod app;
pub mod diff;
pub mod layout;
pub mod model;
pub mod parser;
pub mod scene;
pub mod summary;

pub use app::WeightScopeApp;
pub use diff::{compare, layer_differences, DifferenceResult, Verdict};
pub use layout::{NetworkLayout, PanePosition, Theme, ViewMode};
pub use model::{layer_info, LayerInfo, NetworkFile, NetworkModel};
pub use parser::{load, parse, ParseError};
pub use scene::{HoveredConnection, Scene};
pub use summary::ComparisonSummary;
