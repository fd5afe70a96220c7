//! Workout aggregate: a plan and the exercise lines it owns.
//!
//! Lines are never edited in place. An update that carries `exercises`
//! discards every stored line and stores the submitted set instead, and the
//! store applies that swap as one unit.

use tracing::info;
use uuid::Uuid;

use liftlog_types::api::{CreateWorkoutRequest, ExerciseLineInput, UpdateWorkoutRequest};

use crate::error::{BLANK, CoreError, CoreResult, FieldErrors, REQUIRED};
use crate::guard::authorize;
use crate::model::{now, ExerciseLine, UserRef, WorkoutPlan};
use crate::ports::{ExerciseCatalog, WorkoutStore};

pub const TITLE_MAX_LEN: usize = 255;

/// Largest value accepted for `sets` and `reps`.
pub const COUNT_MAX: i64 = 2_147_483_647;

pub struct WorkoutService<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> WorkoutService<'a, S>
where
    S: WorkoutStore + ExerciseCatalog + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn list(&self, requester: &UserRef) -> CoreResult<Vec<WorkoutPlan>> {
        Ok(self.store.list_workouts(requester.id)?)
    }

    /// The owner is always `requester`; nothing in the payload can change it.
    pub fn create(
        &self,
        requester: &UserRef,
        req: CreateWorkoutRequest,
    ) -> CoreResult<WorkoutPlan> {
        let mut errors = FieldErrors::new();

        let title = errors.required("title", req.title);
        let title = title.filter(|t| check_title(t, &mut errors));
        let description = errors.optional("description", req.description);
        let scheduled_date = errors.nullable("scheduled_date", req.scheduled_date);
        let lines = match errors.required("exercises", req.exercises) {
            Some(inputs) => self.build_lines(inputs, &mut errors)?,
            None => Vec::new(),
        };

        errors.into_result()?;
        let Some(title) = title else {
            return Err(CoreError::Validation(FieldErrors::single("title", REQUIRED)));
        };

        let stamp = now();
        let plan = WorkoutPlan {
            id: Uuid::new_v4(),
            owner: requester.clone(),
            title,
            description: description.unwrap_or_default(),
            scheduled_date: scheduled_date.flatten(),
            exercises: lines,
            created_at: stamp,
            updated_at: stamp,
        };

        self.store.insert_workout(&plan)?;
        info!(
            "Workout {} created by {} with {} exercises",
            plan.id,
            requester.username,
            plan.exercises.len()
        );
        Ok(plan)
    }

    pub fn get(&self, requester: &UserRef, id: Uuid) -> CoreResult<WorkoutPlan> {
        authorize(requester, self.store.find_workout(id)?)
    }

    /// Absent keys keep their stored values. A present `exercises` list, even
    /// an empty one, becomes the plan's entire line collection.
    pub fn replace(
        &self,
        requester: &UserRef,
        id: Uuid,
        req: UpdateWorkoutRequest,
    ) -> CoreResult<WorkoutPlan> {
        let mut plan = self.get(requester, id)?;
        let mut errors = FieldErrors::new();

        let title = errors.optional("title", req.title);
        let title = title.filter(|t| check_title(t, &mut errors));
        let description = errors.optional("description", req.description);
        let scheduled_date = errors.nullable("scheduled_date", req.scheduled_date);
        let lines = match errors.optional("exercises", req.exercises) {
            Some(inputs) => Some(self.build_lines(inputs, &mut errors)?),
            None => None,
        };
        errors.into_result()?;

        if let Some(title) = title {
            plan.title = title;
        }
        if let Some(description) = description {
            plan.description = description;
        }
        if let Some(date) = scheduled_date {
            plan.scheduled_date = date;
        }
        if let Some(lines) = lines {
            plan.exercises = lines;
        }
        plan.updated_at = now();

        if !self.store.save_workout(&plan)? {
            return Err(CoreError::NotFound);
        }
        info!(
            "Workout {} updated by {} ({} exercises)",
            plan.id,
            requester.username,
            plan.exercises.len()
        );
        Ok(plan)
    }

    /// Cascades to the plan's lines, schedules, comments and performances.
    pub fn delete(&self, requester: &UserRef, id: Uuid) -> CoreResult<()> {
        let plan = self.get(requester, id)?;
        if !self.store.delete_workout(plan.id)? {
            return Err(CoreError::NotFound);
        }
        info!("Workout {} deleted by {}", plan.id, requester.username);
        Ok(())
    }

    /// Validates every line before anything is written; errors are keyed by
    /// position, e.g. `exercises[0].sets`.
    fn build_lines(
        &self,
        inputs: Vec<ExerciseLineInput>,
        errors: &mut FieldErrors,
    ) -> CoreResult<Vec<ExerciseLine>> {
        let mut lines = Vec::with_capacity(inputs.len());

        for (i, input) in inputs.into_iter().enumerate() {
            let field = |name: &str| format!("exercises[{}].{}", i, name);

            let exercise = errors.required(&field("exercise"), input.exercise);
            if let Some(id) = exercise {
                if self.store.resolve_exercise(id)?.is_none() {
                    errors.add(
                        field("exercise"),
                        format!("Invalid pk \"{}\" - object does not exist.", id),
                    );
                }
            }
            let sets = errors
                .required(&field("sets"), input.sets)
                .and_then(|v| check_count(v, &field("sets"), errors));
            let reps = errors
                .required(&field("reps"), input.reps)
                .and_then(|v| check_count(v, &field("reps"), errors));
            let weight = errors.nullable(&field("weight"), input.weight).flatten();

            if let (Some(exercise), Some(sets), Some(reps)) = (exercise, sets, reps) {
                lines.push(ExerciseLine {
                    id: Uuid::new_v4(),
                    exercise,
                    sets,
                    reps,
                    weight,
                });
            }
        }

        Ok(lines)
    }
}

fn check_title(title: &str, errors: &mut FieldErrors) -> bool {
    if title.trim().is_empty() {
        errors.add("title", BLANK);
        false
    } else if title.chars().count() > TITLE_MAX_LEN {
        errors.add(
            "title",
            format!("Ensure this field has no more than {} characters.", TITLE_MAX_LEN),
        );
        false
    } else {
        true
    }
}

fn check_count(value: i64, field: &str, errors: &mut FieldErrors) -> Option<u32> {
    if value < 1 {
        errors.add(field, "Ensure this value is greater than or equal to 1.");
        None
    } else if value > COUNT_MAX {
        errors.add(
            field,
            format!("Ensure this value is less than or equal to {}.", COUNT_MAX),
        );
        None
    } else {
        u32::try_from(value).ok()
    }
}
