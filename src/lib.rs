//! # invoice-records
//!
//! Purchase and Sales Invoice Records: secondary documents that bill
//! against submitted invoices. A record is validated by a fixed pipeline of
//! stages, and submitting or cancelling it recomputes the billed amounts of
//! the invoice rows it references.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//! Documents, accounts and tax rules live in the host application, which
//! exposes them through the traits in [`core`]; "today" is always passed in.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use invoice_records::core::*;
//! use rust_decimal_macros::dec;
//!
//! let record = RecordBuilder::new("PIR-0001", Side::Purchase, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
//!     .party("Supplier A")
//!     .company("Acme")
//!     .currency("USD")
//!     .add_item(RecordItemBuilder::new("WIDGET", dec!(3), dec!(50))
//!         .against("PINV-0001", "PINV-0001-1").build())
//!     .add_item(RecordItemBuilder::new("WIDGET", dec!(1), dec!(50))
//!         .against("PINV-0001", "PINV-0001-1").build())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(record.grand_total, dec!(200));
//! assert_eq!(record.linked_invoices(), vec!["PINV-0001"]);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` | Types, host traits, validation stages, billing propagation |
//! | `purchase` | Purchase Invoice Record controller |
//! | `sales` | Sales Invoice Record controller |
//! | `reports` | Invoice details and payment entry reports |
//! | `all` (default) | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "purchase")]
pub mod purchase;

#[cfg(feature = "sales")]
pub mod sales;

#[cfg(feature = "reports")]
pub mod reports;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
