use sea_orm::{ConnectionTrait, DatabaseBackend, DbErr, Statement};

/// What a read-only connectivity check learned about the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticReport {
    pub version: String,
    pub tables: Vec<String>,
}

fn version_sql(backend: DatabaseBackend) -> &'static str {
    match backend {
        DatabaseBackend::Postgres => "SELECT version() AS version",
        DatabaseBackend::MySql => "SELECT VERSION() AS version",
        DatabaseBackend::Sqlite => "SELECT sqlite_version() AS version",
    }
}

fn tables_sql(backend: DatabaseBackend) -> &'static str {
    match backend {
        // information_schema reports sql_identifier, which sqlx will not decode as text.
        DatabaseBackend::Postgres => {
            "SELECT table_name::text AS table_name FROM information_schema.tables \
             WHERE table_schema = 'public' ORDER BY table_name"
        }
        DatabaseBackend::MySql => {
            "SELECT table_name AS table_name FROM information_schema.tables \
             WHERE table_schema = DATABASE() ORDER BY table_name"
        }
        DatabaseBackend::Sqlite => {
            "SELECT name AS table_name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name"
        }
    }
}

/// Queries the server version and the tables visible in the default schema.
/// Nothing is written.
pub async fn run<C: ConnectionTrait>(conn: &C) -> Result<DiagnosticReport, DbErr> {
    let backend = conn.get_database_backend();

    let version = conn
        .query_one(Statement::from_string(backend, version_sql(backend)))
        .await?
        .ok_or_else(|| DbErr::RecordNotFound("server returned no version row".to_string()))?
        .try_get::<String>("", "version")?;

    let tables = conn
        .query_all(Statement::from_string(backend, tables_sql(backend)))
        .await?
        .iter()
        .map(|row| row.try_get::<String>("", "table_name"))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DiagnosticReport { version, tables })
}
