/// All entity primary keys are UUID v4, stored as BLOB in SQLite.
pub type EntityId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
