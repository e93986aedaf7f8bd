//! Monthly cash-flow schedule and return-on-investment summary for a rental
//! property bought with an amortizing loan.

pub mod config;
pub mod error;
pub mod loan;
pub mod rental;
pub mod report;
pub mod schedule;

pub use config::{LoanTerms, RentalConfig};
pub use error::{RentalError, RentalResult};
pub use loan::{Compounding, Loan, LoanPeriod, LoanTotals};
pub use rental::Rental;
pub use report::{ReportFormat, SummaryMetrics};
pub use schedule::{CashflowRecord, Schedule};
