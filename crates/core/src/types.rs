/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Monotonic edit counter of a draft store. Bumped on every update so a save
/// response can be matched against the draft it persisted.
pub type DraftVersion = u64;
