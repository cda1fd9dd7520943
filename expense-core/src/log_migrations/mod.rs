//! Log database migrations - embedded SQL files
//!
//! Kept apart from the store migrations because logs.duckdb is a separate
//! file with its own sys_migrations table.

pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    ("001_initial_schema.sql", include_str!("001_initial_schema.sql")),
];
