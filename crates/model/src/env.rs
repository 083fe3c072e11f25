/// Environment variable containing the DynamoDB table name
pub const STUDENT_TABLE_NAME: &'static str = "STUDENT_RECORDS_TABLE_NAME";
/// Environment variable enabling strongly consistent reads
pub const STUDENT_CONSISTENT_READ: &'static str = "STUDENT_RECORDS_CONSISTENT_READ";

/// Table used when `STUDENT_RECORDS_TABLE_NAME` is unset
pub const DEFAULT_TABLE_NAME: &str = "StudentRecords";
