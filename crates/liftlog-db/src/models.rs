//! Database row types. These map directly to SQLite rows and are converted
//! into `liftlog-core` entities, keeping the column layout out of the domain.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use uuid::Uuid;

use liftlog_core::UserRef;
use liftlog_core::model::{
    ExerciseDef, ExerciseLine, ScheduledWorkout, WorkoutComment, WorkoutPerformance, WorkoutPlan,
};

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub created_at: String,
}

pub struct ExerciseRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub muscle_group: String,
}

pub struct WorkoutRow {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub title: String,
    pub description: String,
    pub scheduled_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub struct ExerciseLineRow {
    pub id: String,
    pub workout_id: String,
    pub exercise_id: String,
    pub sets: i64,
    pub reps: i64,
    pub weight: Option<f64>,
}

pub struct ScheduleRow {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub workout_id: String,
    pub scheduled_datetime: String,
    pub created_at: String,
}

pub struct CommentRow {
    pub id: String,
    pub workout_id: String,
    pub user_id: String,
    pub username: String,
    pub comment: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct PerformanceRow {
    pub id: String,
    pub workout_id: String,
    pub user_id: String,
    pub username: String,
    pub performance_metric: Option<f64>,
    pub notes: String,
    pub performed_at: String,
}

// -- Column codecs --

/// Fixed-width RFC 3339, so lexical order in SQL matches time order.
pub fn fmt_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_ts(raw: &str) -> Result<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // datetime('now') style values carry no timezone; they are UTC.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .with_context(|| format!("Corrupt timestamp '{}'", raw))
}

pub fn parse_id(raw: &str) -> Result<Uuid> {
    raw.parse::<Uuid>()
        .with_context(|| format!("Corrupt id '{}'", raw))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    raw.parse::<NaiveDate>()
        .with_context(|| format!("Corrupt date '{}'", raw))
}

fn parse_count(raw: i64, column: &str) -> Result<u32> {
    u32::try_from(raw).map_err(|_| anyhow!("Corrupt {} value {}", column, raw))
}

fn owner(user_id: &str, username: String) -> Result<UserRef> {
    Ok(UserRef {
        id: parse_id(user_id)?,
        username,
    })
}

// -- Row → domain --

impl UserRow {
    pub fn user_ref(&self) -> Result<UserRef> {
        owner(&self.id, self.username.clone())
    }
}

impl ExerciseRow {
    pub fn into_domain(self) -> Result<ExerciseDef> {
        let category = match self.category.as_str() {
            "" => None,
            c => Some(c.parse()?),
        };
        let muscle_group = match self.muscle_group.as_str() {
            "" => None,
            m => Some(m.parse()?),
        };
        Ok(ExerciseDef {
            id: parse_id(&self.id)?,
            name: self.name,
            description: self.description,
            category,
            muscle_group,
        })
    }
}

impl ExerciseLineRow {
    pub fn into_domain(self) -> Result<ExerciseLine> {
        Ok(ExerciseLine {
            id: parse_id(&self.id)?,
            exercise: parse_id(&self.exercise_id)?,
            sets: parse_count(self.sets, "sets")?,
            reps: parse_count(self.reps, "reps")?,
            weight: self.weight,
        })
    }
}

impl WorkoutRow {
    pub fn into_domain(self, exercises: Vec<ExerciseLine>) -> Result<WorkoutPlan> {
        Ok(WorkoutPlan {
            id: parse_id(&self.id)?,
            owner: owner(&self.user_id, self.username)?,
            title: self.title,
            description: self.description,
            scheduled_date: self.scheduled_date.as_deref().map(parse_date).transpose()?,
            exercises,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

impl ScheduleRow {
    pub fn into_domain(self) -> Result<ScheduledWorkout> {
        Ok(ScheduledWorkout {
            id: parse_id(&self.id)?,
            owner: owner(&self.user_id, self.username)?,
            workout: parse_id(&self.workout_id)?,
            scheduled_datetime: parse_ts(&self.scheduled_datetime)?,
            created_at: parse_ts(&self.created_at)?,
        })
    }
}

impl CommentRow {
    pub fn into_domain(self) -> Result<WorkoutComment> {
        Ok(WorkoutComment {
            id: parse_id(&self.id)?,
            workout: parse_id(&self.workout_id)?,
            owner: owner(&self.user_id, self.username)?,
            comment: self.comment,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

impl PerformanceRow {
    pub fn into_domain(self) -> Result<WorkoutPerformance> {
        Ok(WorkoutPerformance {
            id: parse_id(&self.id)?,
            workout: parse_id(&self.workout_id)?,
            owner: owner(&self.user_id, self.username)?,
            performance_metric: self.performance_metric,
            notes: self.notes,
            performed_at: parse_ts(&self.performed_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_sort_lexically() {
        let a = parse_ts("2025-04-10T07:00:00Z").unwrap();
        let b = parse_ts("2025-04-10T07:00:00.5Z").unwrap();
        let c = parse_ts("2025-04-10 08:00:00").unwrap();
        assert!(fmt_ts(&a) < fmt_ts(&b));
        assert!(fmt_ts(&b) < fmt_ts(&c));
        assert_eq!(parse_ts(&fmt_ts(&b)).unwrap(), b);
    }

    #[test]
    fn empty_choices_map_to_none() {
        let row = ExerciseRow {
            id: Uuid::new_v4().to_string(),
            name: "Plank".into(),
            description: "Hold".into(),
            category: String::new(),
            muscle_group: "core".into(),
        };
        let exercise = row.into_domain().unwrap();
        assert!(exercise.category.is_none());
        assert!(exercise.muscle_group.is_some());
    }
}
