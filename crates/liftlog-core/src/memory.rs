//! In-memory store implementing every port. Backs the service tests and any
//! caller that wants the domain rules without SQLite.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Result, anyhow};
use uuid::Uuid;

use liftlog_types::models::SortOrder;

use crate::model::{
    ExerciseDef, ScheduledWorkout, WorkoutComment, WorkoutPerformance, WorkoutPlan,
};
use crate::ports::{
    CommentStore, ExerciseCatalog, PerformanceStore, ScheduleStore, WorkoutStore,
};

#[derive(Default)]
struct Tables {
    exercises: Vec<ExerciseDef>,
    // Vectors keep insertion order; it breaks ties when sorting.
    workouts: Vec<WorkoutPlan>,
    schedules: Vec<ScheduledWorkout>,
    comments: Vec<WorkoutComment>,
    performances: Vec<WorkoutPerformance>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    #[cfg(test)]
    doomed: Mutex<Option<Uuid>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_exercise(&self, exercise: ExerciseDef) -> Result<()> {
        self.lock()?.exercises.push(exercise);
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|e| anyhow!("Memory store lock poisoned: {}", e))
    }
}

#[cfg(test)]
impl MemoryStore {
    /// Delete `workout` right after its next read, the way a concurrent
    /// request could between a service's check and its write.
    pub(crate) fn delete_after_next_read(&self, workout: Uuid) {
        *self.doomed.lock().unwrap() = Some(workout);
    }

    fn after_read(&self, id: Uuid) -> Result<()> {
        let hit = {
            let mut doomed = self.doomed.lock().unwrap();
            *doomed == Some(id) && doomed.take().is_some()
        };
        if hit {
            self.delete_workout(id)?;
        }
        Ok(())
    }
}

fn has_workout(tables: &Tables, id: Uuid) -> bool {
    tables.workouts.iter().any(|w| w.id == id)
}

/// Replace the element with the same id; false when there is none.
fn replace_by<T: Clone>(rows: &mut [T], value: &T, same: impl Fn(&T) -> bool) -> bool {
    match rows.iter_mut().find(|r| same(r)) {
        Some(slot) => {
            *slot = value.clone();
            true
        }
        None => false,
    }
}

/// Remove the element matching `same`; false when there is none.
fn remove_by<T>(rows: &mut Vec<T>, same: impl Fn(&T) -> bool) -> bool {
    let before = rows.len();
    rows.retain(|r| !same(r));
    rows.len() != before
}

impl ExerciseCatalog for MemoryStore {
    fn resolve_exercise(&self, id: Uuid) -> Result<Option<ExerciseDef>> {
        Ok(self.lock()?.exercises.iter().find(|e| e.id == id).cloned())
    }

    fn list_exercises(&self) -> Result<Vec<ExerciseDef>> {
        let mut all = self.lock()?.exercises.clone();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }
}

impl WorkoutStore for MemoryStore {
    fn find_workout(&self, id: Uuid) -> Result<Option<WorkoutPlan>> {
        let found = self.lock()?.workouts.iter().find(|w| w.id == id).cloned();
        #[cfg(test)]
        self.after_read(id)?;
        Ok(found)
    }

    fn list_workouts(&self, owner: Uuid) -> Result<Vec<WorkoutPlan>> {
        let mut plans: Vec<WorkoutPlan> = self
            .lock()?
            .workouts
            .iter()
            .filter(|w| w.owner.id == owner)
            .cloned()
            .collect();
        // Newest insert first on equal timestamps.
        plans.reverse();
        plans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(plans)
    }

    fn insert_workout(&self, plan: &WorkoutPlan) -> Result<()> {
        let mut tables = self.lock()?;
        if tables.workouts.iter().any(|w| w.id == plan.id) {
            return Err(anyhow!("Workout {} already exists", plan.id));
        }
        tables.workouts.push(plan.clone());
        Ok(())
    }

    fn save_workout(&self, plan: &WorkoutPlan) -> Result<bool> {
        Ok(replace_by(&mut self.lock()?.workouts, plan, |w| w.id == plan.id))
    }

    fn delete_workout(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.lock()?;
        if !remove_by(&mut tables.workouts, |w| w.id == id) {
            return Ok(false);
        }
        tables.schedules.retain(|s| s.workout != id);
        tables.comments.retain(|c| c.workout != id);
        tables.performances.retain(|p| p.workout != id);
        Ok(true)
    }
}

impl ScheduleStore for MemoryStore {
    fn find_schedule(&self, id: Uuid) -> Result<Option<ScheduledWorkout>> {
        Ok(self.lock()?.schedules.iter().find(|s| s.id == id).cloned())
    }

    fn list_schedules(&self, owner: Uuid, order: SortOrder) -> Result<Vec<ScheduledWorkout>> {
        let mut schedules: Vec<ScheduledWorkout> = self
            .lock()?
            .schedules
            .iter()
            .filter(|s| s.owner.id == owner)
            .cloned()
            .collect();
        schedules.sort_by(|a, b| a.scheduled_datetime.cmp(&b.scheduled_datetime));
        if order == SortOrder::Desc {
            schedules.reverse();
        }
        Ok(schedules)
    }

    fn insert_schedule(&self, schedule: &ScheduledWorkout) -> Result<bool> {
        let mut tables = self.lock()?;
        if !has_workout(&tables, schedule.workout) {
            return Ok(false);
        }
        tables.schedules.push(schedule.clone());
        Ok(true)
    }

    fn save_schedule(&self, schedule: &ScheduledWorkout) -> Result<bool> {
        let mut tables = self.lock()?;
        if !has_workout(&tables, schedule.workout) {
            return Ok(false);
        }
        Ok(replace_by(&mut tables.schedules, schedule, |s| s.id == schedule.id))
    }

    fn delete_schedule(&self, id: Uuid) -> Result<bool> {
        Ok(remove_by(&mut self.lock()?.schedules, |s| s.id == id))
    }
}

impl CommentStore for MemoryStore {
    fn find_comment(&self, id: Uuid) -> Result<Option<WorkoutComment>> {
        Ok(self.lock()?.comments.iter().find(|c| c.id == id).cloned())
    }

    fn list_comments(&self, owner: Uuid, workout: Option<Uuid>) -> Result<Vec<WorkoutComment>> {
        let mut comments: Vec<WorkoutComment> = self
            .lock()?
            .comments
            .iter()
            .filter(|c| c.owner.id == owner && workout.is_none_or(|w| c.workout == w))
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    fn insert_comment(&self, comment: &WorkoutComment) -> Result<bool> {
        let mut tables = self.lock()?;
        if !has_workout(&tables, comment.workout) {
            return Ok(false);
        }
        tables.comments.push(comment.clone());
        Ok(true)
    }

    fn save_comment(&self, comment: &WorkoutComment) -> Result<bool> {
        let mut tables = self.lock()?;
        if !has_workout(&tables, comment.workout) {
            return Ok(false);
        }
        Ok(replace_by(&mut tables.comments, comment, |c| c.id == comment.id))
    }

    fn delete_comment(&self, id: Uuid) -> Result<bool> {
        Ok(remove_by(&mut self.lock()?.comments, |c| c.id == id))
    }
}

impl PerformanceStore for MemoryStore {
    fn find_performance(&self, id: Uuid) -> Result<Option<WorkoutPerformance>> {
        Ok(self.lock()?.performances.iter().find(|p| p.id == id).cloned())
    }

    fn list_performances(
        &self,
        owner: Uuid,
        workout: Option<Uuid>,
    ) -> Result<Vec<WorkoutPerformance>> {
        let mut performances: Vec<WorkoutPerformance> = self
            .lock()?
            .performances
            .iter()
            .filter(|p| p.owner.id == owner && workout.is_none_or(|w| p.workout == w))
            .cloned()
            .collect();
        performances.sort_by(|a, b| a.performed_at.cmp(&b.performed_at));
        Ok(performances)
    }

    fn insert_performance(&self, performance: &WorkoutPerformance) -> Result<bool> {
        let mut tables = self.lock()?;
        if !has_workout(&tables, performance.workout) {
            return Ok(false);
        }
        tables.performances.push(performance.clone());
        Ok(true)
    }

    fn save_performance(&self, performance: &WorkoutPerformance) -> Result<bool> {
        let mut tables = self.lock()?;
        if !has_workout(&tables, performance.workout) {
            return Ok(false);
        }
        Ok(replace_by(&mut tables.performances, performance, |p| p.id == performance.id))
    }

    fn delete_performance(&self, id: Uuid) -> Result<bool> {
        Ok(remove_by(&mut self.lock()?.performances, |p| p.id == id))
    }
}
