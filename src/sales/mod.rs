//! Sales Invoice Record: a record billed against submitted Sales Invoices,
//! with payment rows and project/cost-center checks.

pub mod checks;
mod controller;
pub mod payments;

pub use controller::SalesRecordController;
pub use payments::{PortalIndicator, portal_indicator};
