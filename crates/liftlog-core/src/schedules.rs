//! Scheduled workouts: a plan pinned to a date and time.
//!
//! A schedule's owner must also own the workout it points at. That is
//! checked on create and again whenever an update names a workout.

use chrono::SubsecRound;
use tracing::info;
use uuid::Uuid;

use liftlog_types::api::ScheduleRequest;
use liftlog_types::models::SortOrder;

use crate::error::{CoreError, CoreResult, FieldErrors, REQUIRED};
use crate::guard::{authorize, lost_write, resolve_reference, unknown_workout};
use crate::model::{now, ScheduledWorkout, UserRef};
use crate::ports::{ScheduleStore, WorkoutStore};

pub const FOREIGN_WORKOUT: &str = "You cannot schedule a workout that doesn't belong to you.";

pub struct ScheduleService<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> ScheduleService<'a, S>
where
    S: ScheduleStore + WorkoutStore + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn list(&self, requester: &UserRef, order: SortOrder) -> CoreResult<Vec<ScheduledWorkout>> {
        Ok(self.store.list_schedules(requester.id, order)?)
    }

    pub fn create(&self, requester: &UserRef, req: ScheduleRequest) -> CoreResult<ScheduledWorkout> {
        let mut errors = FieldErrors::new();
        let workout_id = errors.required("workout", req.workout);
        let scheduled_datetime = errors.required("scheduled_datetime", req.scheduled_datetime);
        errors.into_result()?;

        let (Some(workout_id), Some(scheduled_datetime)) = (workout_id, scheduled_datetime) else {
            return Err(CoreError::Validation(FieldErrors::single("workout", REQUIRED)));
        };
        let workout = resolve_reference(self.store, requester, workout_id, FOREIGN_WORKOUT)?;

        let schedule = ScheduledWorkout {
            id: Uuid::new_v4(),
            owner: requester.clone(),
            workout: workout.id,
            scheduled_datetime: scheduled_datetime.trunc_subsecs(6),
            created_at: now(),
        };
        if !self.store.insert_schedule(&schedule)? {
            return Err(CoreError::Validation(unknown_workout(workout.id)));
        }
        info!(
            "Workout {} scheduled for {} by {}",
            workout.id, scheduled_datetime, requester.username
        );
        Ok(schedule)
    }

    pub fn get(&self, requester: &UserRef, id: Uuid) -> CoreResult<ScheduledWorkout> {
        authorize(requester, self.store.find_schedule(id)?)
    }

    pub fn update(
        &self,
        requester: &UserRef,
        id: Uuid,
        req: ScheduleRequest,
    ) -> CoreResult<ScheduledWorkout> {
        let mut schedule = self.get(requester, id)?;
        let mut errors = FieldErrors::new();
        let workout_id = errors.optional("workout", req.workout);
        let when = errors.optional("scheduled_datetime", req.scheduled_datetime);
        errors.into_result()?;

        if let Some(workout_id) = workout_id {
            let workout = resolve_reference(self.store, requester, workout_id, FOREIGN_WORKOUT)?;
            schedule.workout = workout.id;
        }
        if let Some(when) = when {
            schedule.scheduled_datetime = when.trunc_subsecs(6);
        }

        if !self.store.save_schedule(&schedule)? {
            let exists = self.store.find_schedule(schedule.id)?.is_some();
            return Err(lost_write(exists, schedule.workout));
        }
        info!("Schedule {} updated by {}", schedule.id, requester.username);
        Ok(schedule)
    }

    pub fn delete(&self, requester: &UserRef, id: Uuid) -> CoreResult<()> {
        let schedule = self.get(requester, id)?;
        if !self.store.delete_schedule(schedule.id)? {
            return Err(CoreError::NotFound);
        }
        info!("Schedule {} deleted by {}", schedule.id, requester.username);
        Ok(())
    }
}
