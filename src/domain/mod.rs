pub mod catalog;
pub mod declaration;
pub mod period;
pub mod project;
pub mod user;
pub mod work_log;

// Re-export commonly used types
pub use catalog::CatalogItem;
pub use declaration::{CableFamily, DeclarationForm, DeclarationItem, DeclarationPayload};
pub use period::{local_date_in, Period};
pub use project::{Project, UNKNOWN_PROJECT};
pub use user::{Role, User};
pub use work_log::{Photo, WorkLog, WorkLogItem, WorkStatus};
