use rusqlite::Connection;
use tracing::info;

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    info!("Running SQLite migrations");

    create_users_table(conn)?;
    create_reminders_table(conn)?;
    create_reminders_index(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// Create the users table
fn create_users_table(conn: &Connection) -> Result<(), String> {
    info!("Creating users table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL,
            age INTEGER,
            sex TEXT,
            location TEXT,
            conditions TEXT,
            health_data TEXT,
            last_health_update TEXT
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

/// Create the reminders table
fn create_reminders_table(conn: &Connection) -> Result<(), String> {
    info!("Creating reminders table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS reminders (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id),
            test_name TEXT NOT NULL,
            frequency TEXT NOT NULL,
            info_link TEXT,
            next_due TEXT,
            last_check TEXT,
            last_notified TEXT,
            created_at TEXT NOT NULL
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

/// Create index on next_due for the due-window scan
fn create_reminders_index(conn: &Connection) -> Result<(), String> {
    info!("Creating index on next_due");

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_reminders_next_due
        ON reminders (next_due)",
        [],
    ).map_err(|e| format!("Failed to create index: {}", e))?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_reminders_user_id
        ON reminders (user_id)",
        [],
    ).map_err(|e| format!("Failed to create index: {}", e))?;

    Ok(())
}
