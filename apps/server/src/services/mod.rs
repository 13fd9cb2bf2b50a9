pub mod compose;
pub mod notification;
pub mod pipeline;
pub mod snapshot;

pub use compose::compose;
pub use notification::{MailError, Mailer, SmtpMailer};
pub use pipeline::AlertPipeline;
pub use snapshot::{create_provider, SnapshotError, SnapshotProvider};
