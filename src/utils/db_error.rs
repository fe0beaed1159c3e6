//! Classification of database driver errors.

/// Column whose unique index guards short-code uniqueness.
const CODE_UNIQUE_TARGET: &str = "short_links.code";

/// Returns true if `e` is the store rejecting a duplicate short code.
///
/// SQLite reports unique violations as `UNIQUE constraint failed: <table>.<column>`
/// and does not expose a constraint name, so the target column is matched in
/// the message.
pub fn is_unique_violation_on_code(e: &sqlx::Error) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    if !db_err.is_unique_violation() {
        return false;
    }

    db_err
        .constraint()
        .map(|c| c == CODE_UNIQUE_TARGET)
        .unwrap_or_else(|| db_err.message().contains(CODE_UNIQUE_TARGET))
}
