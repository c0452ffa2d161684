//! Core types and presentation models for the MEP audit viewer.

pub mod dashboard;
pub mod error;
pub mod history;
pub mod html;
pub mod records;
pub mod report;
pub mod search_panel;
pub mod settings;
pub mod standards;
pub mod store;

pub use dashboard::*;
pub use error::*;
pub use history::render_history_cards;
pub use records::*;
pub use report::*;
pub use search_panel::*;
pub use settings::*;
pub use standards::{FailureInsight, StandardsMatch, StandardsNode};
pub use store::*;
