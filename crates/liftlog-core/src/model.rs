//! Domain entities. Storage adapters map their rows into these; the API layer
//! turns them into the response bodies from `liftlog_types::api`.

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use uuid::Uuid;

use liftlog_types::api::{
    ExerciseResponse, ScheduledWorkoutResponse, WorkoutCommentResponse,
    WorkoutExerciseResponse, WorkoutPerformanceResponse, WorkoutPlanResponse,
};
use liftlog_types::models::{Category, MuscleGroup};

/// Current time at the microsecond precision the stores keep.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Authenticated identity attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseDef {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: Option<Category>,
    pub muscle_group: Option<MuscleGroup>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseLine {
    pub id: Uuid,
    pub exercise: Uuid,
    pub sets: u32,
    pub reps: u32,
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutPlan {
    pub id: Uuid,
    pub owner: UserRef,
    pub title: String,
    pub description: String,
    pub scheduled_date: Option<NaiveDate>,
    pub exercises: Vec<ExerciseLine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledWorkout {
    pub id: Uuid,
    pub owner: UserRef,
    pub workout: Uuid,
    pub scheduled_datetime: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutComment {
    pub id: Uuid,
    pub workout: Uuid,
    pub owner: UserRef,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutPerformance {
    pub id: Uuid,
    pub workout: Uuid,
    pub owner: UserRef,
    pub performance_metric: Option<f64>,
    pub notes: String,
    pub performed_at: DateTime<Utc>,
}

// -- Response mapping --

impl From<&ExerciseDef> for ExerciseResponse {
    fn from(e: &ExerciseDef) -> Self {
        Self {
            id: e.id,
            name: e.name.clone(),
            description: e.description.clone(),
            category: e.category.map(|c| c.as_str()).unwrap_or_default().to_string(),
            muscle_group: e
                .muscle_group
                .map(|m| m.as_str())
                .unwrap_or_default()
                .to_string(),
        }
    }
}

impl From<&ExerciseLine> for WorkoutExerciseResponse {
    fn from(l: &ExerciseLine) -> Self {
        Self {
            id: l.id,
            exercise: l.exercise,
            sets: l.sets,
            reps: l.reps,
            weight: l.weight,
        }
    }
}

impl From<&WorkoutPlan> for WorkoutPlanResponse {
    fn from(p: &WorkoutPlan) -> Self {
        Self {
            id: p.id,
            title: p.title.clone(),
            description: p.description.clone(),
            scheduled_date: p.scheduled_date,
            exercises: p.exercises.iter().map(Into::into).collect(),
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl From<&ScheduledWorkout> for ScheduledWorkoutResponse {
    fn from(s: &ScheduledWorkout) -> Self {
        Self {
            id: s.id,
            workout: s.workout,
            scheduled_datetime: s.scheduled_datetime,
            created_at: s.created_at,
        }
    }
}

impl From<&WorkoutComment> for WorkoutCommentResponse {
    fn from(c: &WorkoutComment) -> Self {
        Self {
            id: c.id,
            workout: c.workout,
            user: c.owner.username.clone(),
            comment: c.comment.clone(),
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

impl From<&WorkoutPerformance> for WorkoutPerformanceResponse {
    fn from(p: &WorkoutPerformance) -> Self {
        Self {
            id: p.id,
            workout: p.workout,
            user: p.owner.username.clone(),
            performance_metric: p.performance_metric,
            notes: p.notes.clone(),
            performed_at: p.performed_at,
        }
    }
}
