/// Entity-table primary keys (BIGSERIAL). Lookup-table ids are `i16`
/// and live on the status enums instead.
pub type DbId = i64;

/// UTC wall-clock time, as stored in every `timestamptz` column.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
