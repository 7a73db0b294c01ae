//! Database connection utilities.

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

/// SQLite pragmas applied to file-backed databases.
///
/// - `journal_mode=WAL` so sync writes do not block readers
/// - `busy_timeout=5000` to wait for locks instead of failing at once
/// - `synchronous=NORMAL`, safe with WAL
const SQLITE_PRAGMAS: [&str; 3] = [
    "PRAGMA journal_mode=WAL",
    "PRAGMA busy_timeout=5000",
    "PRAGMA synchronous=NORMAL",
];

async fn configure_sqlite(db: &DatabaseConnection) -> Result<(), DbErr> {
    for pragma in SQLITE_PRAGMAS {
        db.execute(Statement::from_string(
            db.get_database_backend(),
            pragma.to_string(),
        ))
        .await?;
    }
    Ok(())
}

/// In-memory SQLite has no journal to tune.
fn is_sqlite_file(database_url: &str) -> bool {
    database_url.starts_with("sqlite:") && !database_url.contains(":memory:")
}

/// Establish a connection to the document store.
///
/// File-backed SQLite databases get WAL mode, a 5 second busy timeout, and
/// NORMAL synchronous mode.
///
/// # Arguments
/// * `database_url` - e.g. `sqlite://pitchside.db?mode=rwc` or `postgres:///pitchside`
///
/// # Errors
/// Returns `DbErr` if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;
    if is_sqlite_file(database_url) {
        configure_sqlite(&db).await?;
    }
    tracing::debug!(backend = ?db.get_database_backend(), "Connected to document store");
    Ok(db)
}

/// Connect and bring the schema up to date.
///
/// # Errors
/// Returns `DbErr` if the connection cannot be established or migrations fail.
///
/// # Example
/// ```ignore
/// let db = pitchside::connect_and_migrate("sqlite://pitchside.db?mode=rwc").await?;
/// ```
#[cfg(feature = "migrate")]
pub async fn connect_and_migrate(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    use sea_orm_migration::MigratorTrait;

    let db = connect(database_url).await?;
    crate::migration::Migrator::up(&db, None).await?;
    Ok(db)
}
