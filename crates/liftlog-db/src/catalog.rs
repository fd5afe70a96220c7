//! Exercise reference data: lookups for the workout service plus the default
//! catalog seeded at startup.

use anyhow::Result;
use rusqlite::Connection;
use tracing::{debug, info};
use uuid::Uuid;

use liftlog_core::model::ExerciseDef;
use liftlog_core::ports::ExerciseCatalog;

use crate::Database;
use crate::models::ExerciseRow;
use crate::queries::OptionalExt;

/// (name, description, category, muscle_group); empty string means unset.
const DEFAULT_EXERCISES: [(&str, &str, &str, &str); 8] = [
    (
        "Running",
        "A cardiovascular exercise that improves endurance.",
        "cardio",
        "",
    ),
    (
        "Cycling",
        "A low-impact exercise that improves cardiovascular health.",
        "cardio",
        "",
    ),
    (
        "Bench Press",
        "A strength exercise targeting the chest, shoulders, and triceps.",
        "strength",
        "chest",
    ),
    (
        "Squats",
        "A strength exercise targeting the legs and glutes.",
        "strength",
        "legs",
    ),
    (
        "Yoga",
        "A flexibility and balance exercise that improves core strength.",
        "flexibility",
        "core",
    ),
    (
        "Plank",
        "An isometric core strength exercise that involves maintaining a position similar to a push-up.",
        "",
        "core",
    ),
    (
        "Bicep Curl",
        "A strength exercise that targets the biceps.",
        "strength",
        "arms",
    ),
    (
        "Shoulder Press",
        "A strength exercise that targets the shoulders.",
        "strength",
        "shoulders",
    ),
];

impl Database {
    /// Get-or-create each default exercise by name. Existing rows are left
    /// alone since workout lines reference them. Returns how many were created.
    pub fn seed_exercises(&self) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let mut created = 0;
            for (name, description, category, muscle_group) in DEFAULT_EXERCISES {
                let exists = tx
                    .query_row("SELECT 1 FROM exercises WHERE name = ?1", [name], |_| Ok(()))
                    .optional()?
                    .is_some();
                if exists {
                    debug!("Exercise already exists: {}", name);
                    continue;
                }
                tx.execute(
                    "INSERT INTO exercises (id, name, description, category, muscle_group)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    (
                        Uuid::new_v4().to_string(),
                        name,
                        description,
                        category,
                        muscle_group,
                    ),
                )?;
                debug!("Created exercise: {}", name);
                created += 1;
            }
            tx.commit()?;
            info!("Exercise seeding completed ({} created)", created);
            Ok(created)
        })
    }
}

impl ExerciseCatalog for Database {
    fn resolve_exercise(&self, id: Uuid) -> Result<Option<ExerciseDef>> {
        self.with_conn(|conn| {
            query_exercises(conn, "WHERE id = ?1", &[&id.to_string()])?
                .into_iter()
                .next()
                .map(ExerciseRow::into_domain)
                .transpose()
        })
    }

    fn list_exercises(&self) -> Result<Vec<ExerciseDef>> {
        self.with_conn(|conn| {
            query_exercises(conn, "ORDER BY name, rowid", &[])?
                .into_iter()
                .map(ExerciseRow::into_domain)
                .collect()
        })
    }
}

fn query_exercises(
    conn: &Connection,
    tail: &str,
    params: &[&dyn rusqlite::types::ToSql],
) -> Result<Vec<ExerciseRow>> {
    let sql = format!(
        "SELECT id, name, description, category, muscle_group FROM exercises {}",
        tail
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params, |row| {
            Ok(ExerciseRow {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                category: row.get(3)?,
                muscle_group: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
