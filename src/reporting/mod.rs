//! Display metrics computed client side
//!
//! The backend returns flat collections with no aggregation support;
//! every total, projection and filter the pages show is derived here
//! from those collections. One builder per page, shared lookup and
//! scoping helpers underneath.

pub mod admin;
pub mod export;
pub mod index;
pub mod operator;
pub mod report;
pub mod scope;
pub mod works;

pub use admin::{admin_overview, AdminFilters, AdminLogRow, AdminOverview, ItemLine, ProjectOption};
pub use export::{csv_matrix, default_export_filename, write_csv};
pub use operator::{operator_overview, OperatorOverview, RecentActivity};
pub use report::{approved_report, ApprovedReport, ReportFilters, ReportItem, ReportRow};
pub use works::{assigned_works, AssignedWork};
