//! Record types, host services, validation stages and billed-amount
//! propagation shared by the purchase and sales records.

mod builder;
mod error;
mod services;
mod settings;
mod status;
mod types;

pub mod billing;
pub mod compare;
pub mod currency;
pub mod hold;
pub mod lifecycle;
pub mod lookup;
pub mod pipeline;
pub mod stages;
pub mod totals;
pub mod uom;

pub use builder::*;
pub use error::*;
pub use lifecycle::{RecordController, amend, cancel, save, submit};
pub use pipeline::{Context, Pipeline, Stage};
pub use services::*;
pub use settings::*;
pub use status::*;
pub use types::*;
