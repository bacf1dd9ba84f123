pub mod preview;
pub mod processor;
pub mod reader;
pub mod sessions;

pub use preview::PREVIEW_LIMIT;
pub use processor::{BulkProcessor, BulkQueryStrategy, ProcessedRow};
pub use reader::UploadedWorkbook;
pub use sessions::{BulkSession, BulkSessions, SESSION_COOKIE};
