use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                username    TEXT NOT NULL UNIQUE,
                email       TEXT NOT NULL,
                password    TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE exercises (
                id            TEXT PRIMARY KEY,
                name          TEXT NOT NULL,
                description   TEXT NOT NULL,
                category      TEXT NOT NULL DEFAULT '',
                muscle_group  TEXT NOT NULL DEFAULT ''
            );

            CREATE INDEX idx_exercises_name ON exercises(name);

            CREATE TABLE workout_plans (
                id              TEXT PRIMARY KEY,
                user_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                title           TEXT NOT NULL,
                description     TEXT NOT NULL DEFAULT '',
                scheduled_date  TEXT,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );

            CREATE INDEX idx_workout_plans_user
                ON workout_plans(user_id, created_at);

            CREATE TABLE workout_exercises (
                id           TEXT PRIMARY KEY,
                workout_id   TEXT NOT NULL REFERENCES workout_plans(id) ON DELETE CASCADE,
                exercise_id  TEXT NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
                position     INTEGER NOT NULL,
                sets         INTEGER NOT NULL CHECK (sets > 0),
                reps         INTEGER NOT NULL CHECK (reps > 0),
                weight       REAL
            );

            CREATE INDEX idx_workout_exercises_workout
                ON workout_exercises(workout_id, position);

            CREATE TABLE scheduled_workouts (
                id                  TEXT PRIMARY KEY,
                user_id             TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                workout_id          TEXT NOT NULL REFERENCES workout_plans(id) ON DELETE CASCADE,
                scheduled_datetime  TEXT NOT NULL,
                created_at          TEXT NOT NULL
            );

            CREATE INDEX idx_scheduled_workouts_user
                ON scheduled_workouts(user_id, scheduled_datetime);

            CREATE TABLE workout_comments (
                id          TEXT PRIMARY KEY,
                workout_id  TEXT NOT NULL REFERENCES workout_plans(id) ON DELETE CASCADE,
                user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                comment     TEXT NOT NULL,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE INDEX idx_workout_comments_user
                ON workout_comments(user_id, workout_id);

            CREATE TABLE workout_performances (
                id                  TEXT PRIMARY KEY,
                workout_id          TEXT NOT NULL REFERENCES workout_plans(id) ON DELETE CASCADE,
                user_id             TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                performance_metric  REAL,
                notes               TEXT NOT NULL DEFAULT '',
                performed_at        TEXT NOT NULL
            );

            CREATE INDEX idx_workout_performances_user
                ON workout_performances(user_id, workout_id);

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
