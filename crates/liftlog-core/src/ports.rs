//! Store ports, one per entity. The SQLite adapter in `liftlog-db` and the
//! in-memory store in [`crate::memory`] both implement every trait here.
//!
//! Each call is one unit of work: an adapter must apply a multi-row write
//! (a plan and its lines) entirely or not at all. Writes re-check that the
//! rows they depend on still exist in that same unit and report `false`
//! instead of failing when a concurrent delete got there first.

use anyhow::Result;
use uuid::Uuid;

use liftlog_types::models::SortOrder;

use crate::model::{
    ExerciseDef, ScheduledWorkout, WorkoutComment, WorkoutPerformance, WorkoutPlan,
};

/// Read-only reference data.
pub trait ExerciseCatalog: Send + Sync {
    fn resolve_exercise(&self, id: Uuid) -> Result<Option<ExerciseDef>>;

    /// All exercises, sorted by name.
    fn list_exercises(&self) -> Result<Vec<ExerciseDef>>;
}

pub trait WorkoutStore: Send + Sync {
    fn find_workout(&self, id: Uuid) -> Result<Option<WorkoutPlan>>;

    /// Plans owned by `owner`, newest `created_at` first.
    fn list_workouts(&self, owner: Uuid) -> Result<Vec<WorkoutPlan>>;

    /// Persist a new plan together with its lines.
    fn insert_workout(&self, plan: &WorkoutPlan) -> Result<()>;

    /// Overwrite the plan's scalar fields and replace its whole line
    /// collection with `plan.exercises`. Returns false when the plan is gone.
    fn save_workout(&self, plan: &WorkoutPlan) -> Result<bool>;

    /// Delete the plan with its lines, schedules, comments and performances.
    /// Returns false when no plan had this id.
    fn delete_workout(&self, id: Uuid) -> Result<bool>;
}

pub trait ScheduleStore: Send + Sync {
    fn find_schedule(&self, id: Uuid) -> Result<Option<ScheduledWorkout>>;

    /// Schedules owned by `owner` sorted by `scheduled_datetime`. `Desc` is the
    /// exact reverse of `Asc`, ties included.
    fn list_schedules(&self, owner: Uuid, order: SortOrder) -> Result<Vec<ScheduledWorkout>>;

    /// Returns false when the referenced workout no longer exists.
    fn insert_schedule(&self, schedule: &ScheduledWorkout) -> Result<bool>;

    /// Returns false when the schedule or its referenced workout no longer exists.
    fn save_schedule(&self, schedule: &ScheduledWorkout) -> Result<bool>;

    fn delete_schedule(&self, id: Uuid) -> Result<bool>;
}

pub trait CommentStore: Send + Sync {
    fn find_comment(&self, id: Uuid) -> Result<Option<WorkoutComment>>;

    /// Comments owned by `owner`, oldest first, optionally for one workout.
    fn list_comments(&self, owner: Uuid, workout: Option<Uuid>) -> Result<Vec<WorkoutComment>>;

    /// Returns false when the referenced workout no longer exists.
    fn insert_comment(&self, comment: &WorkoutComment) -> Result<bool>;

    /// Returns false when the comment or its referenced workout no longer exists.
    fn save_comment(&self, comment: &WorkoutComment) -> Result<bool>;

    fn delete_comment(&self, id: Uuid) -> Result<bool>;
}

pub trait PerformanceStore: Send + Sync {
    fn find_performance(&self, id: Uuid) -> Result<Option<WorkoutPerformance>>;

    /// Performances owned by `owner`, oldest first, optionally for one workout.
    fn list_performances(
        &self,
        owner: Uuid,
        workout: Option<Uuid>,
    ) -> Result<Vec<WorkoutPerformance>>;

    /// Returns false when the referenced workout no longer exists.
    fn insert_performance(&self, performance: &WorkoutPerformance) -> Result<bool>;

    /// Returns false when the performance or its referenced workout no longer exists.
    fn save_performance(&self, performance: &WorkoutPerformance) -> Result<bool>;

    fn delete_performance(&self, id: Uuid) -> Result<bool>;
}
