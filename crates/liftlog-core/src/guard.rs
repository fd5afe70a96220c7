//! Ownership guard: the single gate deciding who may see or change a record.

use tracing::warn;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, FieldErrors};
use crate::model::{ScheduledWorkout, UserRef, WorkoutComment, WorkoutPerformance, WorkoutPlan};
use crate::ports::WorkoutStore;

pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

impl Owned for WorkoutPlan {
    fn owner_id(&self) -> Uuid {
        self.owner.id
    }
}

impl Owned for ScheduledWorkout {
    fn owner_id(&self) -> Uuid {
        self.owner.id
    }
}

impl Owned for WorkoutComment {
    fn owner_id(&self) -> Uuid {
        self.owner.id
    }
}

impl Owned for WorkoutPerformance {
    fn owner_id(&self) -> Uuid {
        self.owner.id
    }
}

/// Record-level check for reads and mutations addressed by id.
///
/// A missing record and someone else's record both yield `NotFound`, so a
/// caller cannot discover ids that belong to other users.
pub fn authorize<T: Owned>(requester: &UserRef, record: Option<T>) -> CoreResult<T> {
    match record {
        Some(r) if r.owner_id() == requester.id => Ok(r),
        _ => Err(CoreError::NotFound),
    }
}

/// Write-time check on a workout the requester named explicitly in a payload.
/// The id came from the caller, so refusing it is `Forbidden` rather than
/// `NotFound`.
pub fn authorize_reference(
    requester: &UserRef,
    workout: &WorkoutPlan,
    denial: &str,
) -> CoreResult<()> {
    if workout.owner.id == requester.id {
        Ok(())
    } else {
        warn!(
            "{} referenced workout {} owned by another user",
            requester.username, workout.id
        );
        Err(CoreError::Forbidden(denial.to_string()))
    }
}

/// Load a referenced workout and run [`authorize_reference`] on it. An id
/// that resolves to nothing is a validation error on the `workout` field.
pub fn resolve_reference<S>(
    store: &S,
    requester: &UserRef,
    workout_id: Uuid,
    denial: &str,
) -> CoreResult<WorkoutPlan>
where
    S: WorkoutStore + ?Sized,
{
    let workout = store
        .find_workout(workout_id)?
        .ok_or_else(|| CoreError::Validation(unknown_workout(workout_id)))?;
    authorize_reference(requester, &workout, denial)?;
    Ok(workout)
}

pub fn unknown_workout(id: Uuid) -> FieldErrors {
    FieldErrors::single(
        "workout",
        format!("Invalid pk \"{}\" - object does not exist.", id),
    )
}

/// Error for a checked write that matched no row because a concurrent
/// request deleted something first: the record itself (`NotFound`) or the
/// workout it points at (`workout` validation error).
pub fn lost_write(record_exists: bool, workout: Uuid) -> CoreError {
    if record_exists {
        CoreError::Validation(unknown_workout(workout))
    } else {
        CoreError::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(name: &str) -> UserRef {
        UserRef {
            id: Uuid::new_v4(),
            username: name.to_string(),
        }
    }

    fn plan_for(owner: &UserRef) -> WorkoutPlan {
        let now = Utc::now();
        WorkoutPlan {
            id: Uuid::new_v4(),
            owner: owner.clone(),
            title: "Legs".into(),
            description: String::new(),
            scheduled_date: None,
            exercises: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn owner_is_allowed() {
        let alice = user("alice");
        let plan = plan_for(&alice);
        assert!(authorize(&alice, Some(plan)).is_ok());
    }

    #[test]
    fn foreign_and_missing_records_look_the_same() {
        let alice = user("alice");
        let bob = user("bob");
        let foreign = authorize(&bob, Some(plan_for(&alice)));
        let missing = authorize::<WorkoutPlan>(&bob, None);
        assert!(matches!(foreign, Err(CoreError::NotFound)));
        assert!(matches!(missing, Err(CoreError::NotFound)));
    }

    #[test]
    fn foreign_reference_is_forbidden() {
        let alice = user("alice");
        let bob = user("bob");
        let plan = plan_for(&alice);
        assert!(authorize_reference(&alice, &plan, "no").is_ok());
        match authorize_reference(&bob, &plan, "not yours") {
            Err(CoreError::Forbidden(msg)) => assert_eq!(msg, "not yours"),
            other => panic!("expected Forbidden, got {:?}", other),
        }
    }
}
