pub mod alert;
pub mod message;
pub mod report;
pub mod snapshot;

pub use alert::{Alert, AlertBatch};
pub use message::{ImageAttachment, OutboundMessage, SNAPSHOT_CONTENT_ID};
pub use report::{AlertOutcome, AlertReport, BatchDisposition, BatchReport};
pub use snapshot::{DashboardTarget, SnapshotReference, SNAPSHOT_PLACEHOLDER};
