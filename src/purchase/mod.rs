//! Purchase Invoice Record: a record billed against submitted Purchase
//! Invoices, with hold metadata and tax withholding.

pub mod cash;
mod controller;
pub mod hold;
pub mod supplier_invoice;
pub mod withholding;

pub use controller::PurchaseRecordController;
pub use hold::{block, unblock};
