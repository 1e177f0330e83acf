use super::*;

#[test]
fn not_found_message_names_table() {
    let id = Uuid::nil();
    let err = RecordError::not_found("matches", id);
    assert_eq!(err.to_string(), format!("matches not found: {id}"));
}

#[test]
fn validation_error_passes_through_message() {
    let err = RecordError::from(ValidationError::required("sport_id"));
    assert_eq!(err.to_string(), "sport_id is required");
}

#[test]
fn non_database_sqlx_errors_stay_database_errors() {
    let err = RecordError::from(sqlx::Error::RowNotFound);
    assert!(matches!(err, RecordError::Database(_)));
}
