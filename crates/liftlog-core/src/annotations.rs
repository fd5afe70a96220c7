//! Comments and performance logs attached to a workout by its owner.

use tracing::info;
use uuid::Uuid;

use liftlog_types::api::{CommentRequest, PerformanceRequest};

use crate::error::{BLANK, CoreError, CoreResult, FieldErrors, REQUIRED};
use crate::guard::{authorize, lost_write, resolve_reference, unknown_workout};
use crate::model::{now, UserRef, WorkoutComment, WorkoutPerformance};
use crate::ports::{CommentStore, PerformanceStore, WorkoutStore};

pub const FOREIGN_COMMENT: &str = "You cannot comment on a workout that is not yours.";
pub const FOREIGN_PERFORMANCE: &str =
    "You cannot log performance for a workout that is not yours.";

pub struct CommentService<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> CommentService<'a, S>
where
    S: CommentStore + WorkoutStore + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn list(
        &self,
        requester: &UserRef,
        workout: Option<Uuid>,
    ) -> CoreResult<Vec<WorkoutComment>> {
        Ok(self.store.list_comments(requester.id, workout)?)
    }

    pub fn create(&self, requester: &UserRef, req: CommentRequest) -> CoreResult<WorkoutComment> {
        let mut errors = FieldErrors::new();
        let workout_id = errors.required("workout", req.workout);
        let text = errors.required("comment", req.comment);
        let text = text.filter(|t| check_comment(t, &mut errors));
        errors.into_result()?;

        let (Some(workout_id), Some(text)) = (workout_id, text) else {
            return Err(CoreError::Validation(FieldErrors::single("comment", REQUIRED)));
        };
        let workout = resolve_reference(self.store, requester, workout_id, FOREIGN_COMMENT)?;

        let stamp = now();
        let comment = WorkoutComment {
            id: Uuid::new_v4(),
            workout: workout.id,
            owner: requester.clone(),
            comment: text,
            created_at: stamp,
            updated_at: stamp,
        };
        if !self.store.insert_comment(&comment)? {
            return Err(CoreError::Validation(unknown_workout(workout.id)));
        }
        info!("Comment {} added to workout {} by {}", comment.id, workout.id, requester.username);
        Ok(comment)
    }

    pub fn get(&self, requester: &UserRef, id: Uuid) -> CoreResult<WorkoutComment> {
        authorize(requester, self.store.find_comment(id)?)
    }

    pub fn update(
        &self,
        requester: &UserRef,
        id: Uuid,
        req: CommentRequest,
    ) -> CoreResult<WorkoutComment> {
        let mut comment = self.get(requester, id)?;
        let mut errors = FieldErrors::new();
        let workout_id = errors.optional("workout", req.workout);
        let text = errors.optional("comment", req.comment);
        let text = text.filter(|t| check_comment(t, &mut errors));
        errors.into_result()?;

        if let Some(workout_id) = workout_id {
            comment.workout =
                resolve_reference(self.store, requester, workout_id, FOREIGN_COMMENT)?.id;
        }
        if let Some(text) = text {
            comment.comment = text;
        }
        comment.updated_at = now();

        if !self.store.save_comment(&comment)? {
            let exists = self.store.find_comment(comment.id)?.is_some();
            return Err(lost_write(exists, comment.workout));
        }
        info!("Comment {} updated by {}", comment.id, requester.username);
        Ok(comment)
    }

    pub fn delete(&self, requester: &UserRef, id: Uuid) -> CoreResult<()> {
        let comment = self.get(requester, id)?;
        if !self.store.delete_comment(comment.id)? {
            return Err(CoreError::NotFound);
        }
        info!("Comment {} deleted by {}", comment.id, requester.username);
        Ok(())
    }
}

fn check_comment(text: &str, errors: &mut FieldErrors) -> bool {
    if text.trim().is_empty() {
        errors.add("comment", BLANK);
        false
    } else {
        true
    }
}

pub struct PerformanceService<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> PerformanceService<'a, S>
where
    S: PerformanceStore + WorkoutStore + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn list(
        &self,
        requester: &UserRef,
        workout: Option<Uuid>,
    ) -> CoreResult<Vec<WorkoutPerformance>> {
        Ok(self.store.list_performances(requester.id, workout)?)
    }

    pub fn create(
        &self,
        requester: &UserRef,
        req: PerformanceRequest,
    ) -> CoreResult<WorkoutPerformance> {
        let mut errors = FieldErrors::new();
        let workout_id = errors.required("workout", req.workout);
        let metric = errors.nullable("performance_metric", req.performance_metric);
        let notes = errors.optional("notes", req.notes);
        errors.into_result()?;

        let Some(workout_id) = workout_id else {
            return Err(CoreError::Validation(FieldErrors::single("workout", REQUIRED)));
        };
        let workout = resolve_reference(self.store, requester, workout_id, FOREIGN_PERFORMANCE)?;

        let performance = WorkoutPerformance {
            id: Uuid::new_v4(),
            workout: workout.id,
            owner: requester.clone(),
            performance_metric: metric.flatten(),
            notes: notes.unwrap_or_default(),
            performed_at: now(),
        };
        if !self.store.insert_performance(&performance)? {
            return Err(CoreError::Validation(unknown_workout(workout.id)));
        }
        info!(
            "Performance {} logged for workout {} by {}",
            performance.id, workout.id, requester.username
        );
        Ok(performance)
    }

    pub fn get(&self, requester: &UserRef, id: Uuid) -> CoreResult<WorkoutPerformance> {
        authorize(requester, self.store.find_performance(id)?)
    }

    /// `performed_at` is fixed at creation and never changes.
    pub fn update(
        &self,
        requester: &UserRef,
        id: Uuid,
        req: PerformanceRequest,
    ) -> CoreResult<WorkoutPerformance> {
        let mut performance = self.get(requester, id)?;
        let mut errors = FieldErrors::new();
        let workout_id = errors.optional("workout", req.workout);
        let metric = errors.nullable("performance_metric", req.performance_metric);
        let notes = errors.optional("notes", req.notes);
        errors.into_result()?;

        if let Some(workout_id) = workout_id {
            performance.workout =
                resolve_reference(self.store, requester, workout_id, FOREIGN_PERFORMANCE)?.id;
        }
        if let Some(metric) = metric {
            performance.performance_metric = metric;
        }
        if let Some(notes) = notes {
            performance.notes = notes;
        }

        if !self.store.save_performance(&performance)? {
            let exists = self.store.find_performance(performance.id)?.is_some();
            return Err(lost_write(exists, performance.workout));
        }
        info!("Performance {} updated by {}", performance.id, requester.username);
        Ok(performance)
    }

    pub fn delete(&self, requester: &UserRef, id: Uuid) -> CoreResult<()> {
        let performance = self.get(requester, id)?;
        if !self.store.delete_performance(performance.id)? {
            return Err(CoreError::NotFound);
        }
        info!("Performance {} deleted by {}", performance.id, requester.username);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::workouts::WorkoutService;
    use liftlog_types::api::{CreateWorkoutRequest, Field};

    fn user(name: &str) -> UserRef {
        UserRef {
            id: Uuid::new_v4(),
            username: name.to_string(),
        }
    }

    fn empty_plan(store: &MemoryStore, owner: &UserRef) -> Uuid {
        WorkoutService::new(store)
            .create(
                owner,
                CreateWorkoutRequest {
                    title: Field::Value("Plan".into()),
                    exercises: Field::Value(vec![]),
                    ..Default::default()
                },
            )
            .unwrap()
            .id
    }

    fn comment_on(workout: Uuid, text: &str) -> CommentRequest {
        CommentRequest {
            workout: Field::Value(workout),
            comment: Field::Value(text.into()),
        }
    }

    #[test]
    fn comment_on_foreign_workout_is_forbidden() {
        let store = MemoryStore::new();
        let alice = user("alice");
        let bob = user("bob");
        let theirs = empty_plan(&store, &bob);
        let svc = CommentService::new(&store);

        match svc.create(&alice, comment_on(theirs, "nice")) {
            Err(CoreError::Forbidden(msg)) => assert_eq!(msg, FOREIGN_COMMENT),
            other => panic!("expected Forbidden, got {:?}", other),
        }
    }

    #[test]
    fn comments_filter_by_workout_and_owner() {
        let store = MemoryStore::new();
        let alice = user("alice");
        let bob = user("bob");
        let a1 = empty_plan(&store, &alice);
        let a2 = empty_plan(&store, &alice);
        let b1 = empty_plan(&store, &bob);
        let svc = CommentService::new(&store);

        svc.create(&alice, comment_on(a1, "first")).unwrap();
        svc.create(&alice, comment_on(a2, "second")).unwrap();
        svc.create(&alice, comment_on(a1, "third")).unwrap();
        svc.create(&bob, comment_on(b1, "bob's")).unwrap();

        let all = svc.list(&alice, None).unwrap();
        assert_eq!(all.len(), 3);
        let on_a1: Vec<String> = svc
            .list(&alice, Some(a1))
            .unwrap()
            .into_iter()
            .map(|c| c.comment)
            .collect();
        assert_eq!(on_a1, vec!["first".to_string(), "third".to_string()]);
        assert!(svc.list(&alice, Some(b1)).unwrap().is_empty());
    }

    #[test]
    fn blank_comment_is_rejected() {
        let store = MemoryStore::new();
        let alice = user("alice");
        let plan = empty_plan(&store, &alice);
        let svc = CommentService::new(&store);

        match svc.create(&alice, comment_on(plan, "   ")) {
            Err(CoreError::Validation(errors)) => {
                assert_eq!(errors.get("comment").unwrap(), [BLANK.to_string()])
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn comment_update_refreshes_updated_at() {
        let store = MemoryStore::new();
        let alice = user("alice");
        let plan = empty_plan(&store, &alice);
        let svc = CommentService::new(&store);
        let c = svc.create(&alice, comment_on(plan, "before")).unwrap();

        let updated = svc
            .update(
                &alice,
                c.id,
                CommentRequest {
                    workout: Field::Absent,
                    comment: Field::Value("after".into()),
                },
            )
            .unwrap();
        assert_eq!(updated.comment, "after");
        assert_eq!(updated.created_at, c.created_at);
        assert!(updated.updated_at >= c.updated_at);
        assert!(matches!(svc.get(&user("eve"), c.id), Err(CoreError::NotFound)));
    }

    #[test]
    fn comment_update_checks_the_new_workout() {
        let store = MemoryStore::new();
        let alice = user("alice");
        let bob = user("bob");
        let mine = empty_plan(&store, &alice);
        let theirs = empty_plan(&store, &bob);
        let svc = CommentService::new(&store);
        let c = svc.create(&alice, comment_on(mine, "keep")).unwrap();

        match svc.update(&alice, c.id, comment_on(theirs, "moved")) {
            Err(CoreError::Forbidden(msg)) => assert_eq!(msg, FOREIGN_COMMENT),
            other => panic!("expected Forbidden, got {:?}", other),
        }
        match svc.update(&alice, c.id, comment_on(Uuid::new_v4(), "moved")) {
            Err(CoreError::Validation(errors)) => assert!(errors.get("workout").is_some()),
            other => panic!("expected validation error, got {:?}", other),
        }
        let stored = svc.get(&alice, c.id).unwrap();
        assert_eq!(stored.workout, mine);
        assert_eq!(stored.comment, "keep");
    }

    #[test]
    fn comment_on_workout_deleted_mid_request() {
        let store = MemoryStore::new();
        let alice = user("alice");
        let mine = empty_plan(&store, &alice);
        let other = empty_plan(&store, &alice);
        let svc = CommentService::new(&store);

        store.delete_after_next_read(mine);
        assert!(matches!(
            svc.create(&alice, comment_on(mine, "gone")),
            Err(CoreError::Validation(_))
        ));

        let c = svc.create(&alice, comment_on(other, "still here")).unwrap();
        store.delete_after_next_read(other);
        assert!(matches!(
            svc.update(&alice, c.id, comment_on(other, "too late")),
            Err(CoreError::NotFound)
        ));
    }

    #[test]
    fn mistyped_comment_fields_are_reported() {
        let store = MemoryStore::new();
        let svc = CommentService::new(&store);
        let req = CommentRequest {
            workout: Field::Invalid("Must be a valid UUID."),
            comment: Field::Null,
        };
        match svc.create(&user("alice"), req) {
            Err(CoreError::Validation(errors)) => {
                assert!(errors.get("workout").is_some());
                assert_eq!(errors.get("comment").unwrap(), [crate::error::NULL.to_string()]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn performance_update_checks_the_new_workout() {
        let store = MemoryStore::new();
        let alice = user("alice");
        let bob = user("bob");
        let mine = empty_plan(&store, &alice);
        let theirs = empty_plan(&store, &bob);
        let svc = PerformanceService::new(&store);
        let p = svc
            .create(
                &alice,
                PerformanceRequest {
                    workout: Field::Value(mine),
                    ..Default::default()
                },
            )
            .unwrap();

        let moved = |workout| PerformanceRequest {
            workout: Field::Value(workout),
            performance_metric: Field::Value(1.0),
            notes: Field::Absent,
        };
        match svc.update(&alice, p.id, moved(theirs)) {
            Err(CoreError::Forbidden(msg)) => assert_eq!(msg, FOREIGN_PERFORMANCE),
            other => panic!("expected Forbidden, got {:?}", other),
        }
        match svc.update(&alice, p.id, moved(Uuid::new_v4())) {
            Err(CoreError::Validation(errors)) => assert!(errors.get("workout").is_some()),
            other => panic!("expected validation error, got {:?}", other),
        }
        let stored = svc.get(&alice, p.id).unwrap();
        assert_eq!(stored.workout, mine);
        assert_eq!(stored.performance_metric, None);
    }

    #[test]
    fn performance_lifecycle() {
        let store = MemoryStore::new();
        let alice = user("alice");
        let bob = user("bob");
        let plan = empty_plan(&store, &alice);
        let svc = PerformanceService::new(&store);

        let p = svc
            .create(
                &alice,
                PerformanceRequest {
                    workout: Field::Value(plan),
                    performance_metric: Field::Value(82.5),
                    notes: Field::Value("felt strong".into()),
                },
            )
            .unwrap();
        assert_eq!(p.performance_metric, Some(82.5));

        let cleared = svc
            .update(
                &alice,
                p.id,
                PerformanceRequest {
                    workout: Field::Absent,
                    performance_metric: Field::Null,
                    notes: Field::Absent,
                },
            )
            .unwrap();
        assert_eq!(cleared.performance_metric, None);
        assert_eq!(cleared.notes, "felt strong");
        assert_eq!(cleared.performed_at, p.performed_at);

        assert!(matches!(svc.get(&bob, p.id), Err(CoreError::NotFound)));
        let theirs = empty_plan(&store, &bob);
        assert!(matches!(
            svc.create(
                &alice,
                PerformanceRequest {
                    workout: Field::Value(theirs),
                    ..Default::default()
                }
            ),
            Err(CoreError::Forbidden(_))
        ));

        svc.delete(&alice, p.id).unwrap();
        assert!(svc.list(&alice, None).unwrap().is_empty());
    }
}
