//! SQLite implementations of the `liftlog-core` store ports.
//!
//! Owner usernames come from a JOIN on `users`. Plan lines are written in the
//! same transaction as their plan, and deletes cascade through foreign keys.

use std::collections::HashMap;

use anyhow::Result;
use rusqlite::{Connection, Row, Transaction, params};
use uuid::Uuid;

use liftlog_core::model::{
    ExerciseLine, ScheduledWorkout, WorkoutComment, WorkoutPerformance, WorkoutPlan,
};
use liftlog_core::ports::{CommentStore, PerformanceStore, ScheduleStore, WorkoutStore};
use liftlog_types::models::SortOrder;

use crate::Database;
use crate::models::{
    CommentRow, ExerciseLineRow, PerformanceRow, ScheduleRow, WorkoutRow, fmt_ts,
};

const WORKOUT_COLUMNS: &str = "SELECT w.id, w.user_id, u.username, w.title, w.description,
        w.scheduled_date, w.created_at, w.updated_at
     FROM workout_plans w
     JOIN users u ON u.id = w.user_id";

const LINE_COLUMNS: &str = "SELECT e.id, e.workout_id, e.exercise_id, e.sets, e.reps, e.weight
     FROM workout_exercises e";

const SCHEDULE_COLUMNS: &str = "SELECT s.id, s.user_id, u.username, s.workout_id,
        s.scheduled_datetime, s.created_at
     FROM scheduled_workouts s
     JOIN users u ON u.id = s.user_id";

const COMMENT_COLUMNS: &str = "SELECT c.id, c.workout_id, c.user_id, u.username, c.comment,
        c.created_at, c.updated_at
     FROM workout_comments c
     JOIN users u ON u.id = c.user_id";

const PERFORMANCE_COLUMNS: &str = "SELECT p.id, p.workout_id, p.user_id, u.username,
        p.performance_metric, p.notes, p.performed_at
     FROM workout_performances p
     JOIN users u ON u.id = p.user_id";

// -- Row mappers --

fn workout_row(row: &Row<'_>) -> rusqlite::Result<WorkoutRow> {
    Ok(WorkoutRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        username: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        scheduled_date: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn line_row(row: &Row<'_>) -> rusqlite::Result<ExerciseLineRow> {
    Ok(ExerciseLineRow {
        id: row.get(0)?,
        workout_id: row.get(1)?,
        exercise_id: row.get(2)?,
        sets: row.get(3)?,
        reps: row.get(4)?,
        weight: row.get(5)?,
    })
}

fn schedule_row(row: &Row<'_>) -> rusqlite::Result<ScheduleRow> {
    Ok(ScheduleRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        username: row.get(2)?,
        workout_id: row.get(3)?,
        scheduled_datetime: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn comment_row(row: &Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        workout_id: row.get(1)?,
        user_id: row.get(2)?,
        username: row.get(3)?,
        comment: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn performance_row(row: &Row<'_>) -> rusqlite::Result<PerformanceRow> {
    Ok(PerformanceRow {
        id: row.get(0)?,
        workout_id: row.get(1)?,
        user_id: row.get(2)?,
        username: row.get(3)?,
        performance_metric: row.get(4)?,
        notes: row.get(5)?,
        performed_at: row.get(6)?,
    })
}

/// Run `sql` and map every row with `map`.
fn select<T>(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, map)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn order_keyword(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    }
}

// -- Workout plans --

fn insert_lines(tx: &Transaction<'_>, plan: &WorkoutPlan) -> Result<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO workout_exercises (id, workout_id, exercise_id, position, sets, reps, weight)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    for (position, line) in plan.exercises.iter().enumerate() {
        stmt.execute(params![
            line.id.to_string(),
            plan.id.to_string(),
            line.exercise.to_string(),
            position as i64,
            line.sets,
            line.reps,
            line.weight,
        ])?;
    }
    Ok(())
}

fn plan_lines(conn: &Connection, workout_id: &str) -> Result<Vec<ExerciseLine>> {
    let sql = format!("{} WHERE e.workout_id = ?1 ORDER BY e.position", LINE_COLUMNS);
    select(conn, &sql, [workout_id], line_row)?
        .into_iter()
        .map(ExerciseLineRow::into_domain)
        .collect()
}

impl WorkoutStore for Database {
    fn find_workout(&self, id: Uuid) -> Result<Option<WorkoutPlan>> {
        self.with_conn(|conn| {
            let sql = format!("{} WHERE w.id = ?1", WORKOUT_COLUMNS);
            let Some(row) = select(conn, &sql, [id.to_string()], workout_row)?
                .into_iter()
                .next()
            else {
                return Ok(None);
            };
            let lines = plan_lines(conn, &row.id)?;
            row.into_domain(lines).map(Some)
        })
    }

    fn list_workouts(&self, owner: Uuid) -> Result<Vec<WorkoutPlan>> {
        self.with_conn(|conn| {
            let owner = owner.to_string();
            let sql = format!(
                "{} WHERE w.user_id = ?1 ORDER BY w.created_at DESC, w.rowid DESC",
                WORKOUT_COLUMNS
            );
            let plans = select(conn, &sql, [&owner], workout_row)?;

            // One query for every line of every plan instead of one per plan.
            let sql = format!(
                "{} JOIN workout_plans w ON w.id = e.workout_id
                 WHERE w.user_id = ?1 ORDER BY e.position",
                LINE_COLUMNS
            );
            let mut lines: HashMap<String, Vec<ExerciseLine>> = HashMap::new();
            for row in select(conn, &sql, [&owner], line_row)? {
                let key = row.workout_id.clone();
                lines.entry(key).or_default().push(row.into_domain()?);
            }

            plans
                .into_iter()
                .map(|row| {
                    let own = lines.remove(&row.id).unwrap_or_default();
                    row.into_domain(own)
                })
                .collect()
        })
    }

    fn insert_workout(&self, plan: &WorkoutPlan) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO workout_plans
                    (id, user_id, title, description, scheduled_date, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    plan.id.to_string(),
                    plan.owner.id.to_string(),
                    plan.title,
                    plan.description,
                    plan.scheduled_date.map(|d| d.to_string()),
                    fmt_ts(&plan.created_at),
                    fmt_ts(&plan.updated_at),
                ],
            )?;
            insert_lines(&tx, plan)?;
            tx.commit()?;
            Ok(())
        })
    }

    fn save_workout(&self, plan: &WorkoutPlan) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "UPDATE workout_plans
                 SET title = ?2, description = ?3, scheduled_date = ?4, updated_at = ?5
                 WHERE id = ?1",
                params![
                    plan.id.to_string(),
                    plan.title,
                    plan.description,
                    plan.scheduled_date.map(|d| d.to_string()),
                    fmt_ts(&plan.updated_at),
                ],
            )?;
            if changed == 0 {
                return Ok(false);
            }
            tx.execute(
                "DELETE FROM workout_exercises WHERE workout_id = ?1",
                [plan.id.to_string()],
            )?;
            insert_lines(&tx, plan)?;
            tx.commit()?;
            Ok(true)
        })
    }

    fn delete_workout(&self, id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM workout_plans WHERE id = ?1",
                [id.to_string()],
            )?;
            Ok(deleted > 0)
        })
    }
}

// -- Scheduled workouts --

impl ScheduleStore for Database {
    fn find_schedule(&self, id: Uuid) -> Result<Option<ScheduledWorkout>> {
        self.with_conn(|conn| {
            let sql = format!("{} WHERE s.id = ?1", SCHEDULE_COLUMNS);
            select(conn, &sql, [id.to_string()], schedule_row)?
                .into_iter()
                .next()
                .map(ScheduleRow::into_domain)
                .transpose()
        })
    }

    fn list_schedules(&self, owner: Uuid, order: SortOrder) -> Result<Vec<ScheduledWorkout>> {
        self.with_conn(|conn| {
            // rowid breaks ties so DESC is the exact reverse of ASC.
            let dir = order_keyword(order);
            let sql = format!(
                "{} WHERE s.user_id = ?1 ORDER BY s.scheduled_datetime {}, s.rowid {}",
                SCHEDULE_COLUMNS, dir, dir
            );
            select(conn, &sql, [owner.to_string()], schedule_row)?
                .into_iter()
                .map(ScheduleRow::into_domain)
                .collect()
        })
    }

    fn insert_schedule(&self, schedule: &ScheduledWorkout) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO scheduled_workouts
                    (id, user_id, workout_id, scheduled_datetime, created_at)
                 SELECT ?1, ?2, ?3, ?4, ?5
                 WHERE EXISTS (SELECT 1 FROM workout_plans WHERE id = ?3)",
                params![
                    schedule.id.to_string(),
                    schedule.owner.id.to_string(),
                    schedule.workout.to_string(),
                    fmt_ts(&schedule.scheduled_datetime),
                    fmt_ts(&schedule.created_at),
                ],
            )?;
            Ok(inserted > 0)
        })
    }

    fn save_schedule(&self, schedule: &ScheduledWorkout) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE scheduled_workouts SET workout_id = ?2, scheduled_datetime = ?3
                 WHERE id = ?1 AND EXISTS (SELECT 1 FROM workout_plans WHERE id = ?2)",
                params![
                    schedule.id.to_string(),
                    schedule.workout.to_string(),
                    fmt_ts(&schedule.scheduled_datetime),
                ],
            )?;
            Ok(changed > 0)
        })
    }

    fn delete_schedule(&self, id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM scheduled_workouts WHERE id = ?1",
                [id.to_string()],
            )?;
            Ok(deleted > 0)
        })
    }
}

// -- Comments --

impl CommentStore for Database {
    fn find_comment(&self, id: Uuid) -> Result<Option<WorkoutComment>> {
        self.with_conn(|conn| {
            let sql = format!("{} WHERE c.id = ?1", COMMENT_COLUMNS);
            select(conn, &sql, [id.to_string()], comment_row)?
                .into_iter()
                .next()
                .map(CommentRow::into_domain)
                .transpose()
        })
    }

    fn list_comments(&self, owner: Uuid, workout: Option<Uuid>) -> Result<Vec<WorkoutComment>> {
        self.with_conn(|conn| {
            let sql = format!(
                "{} WHERE c.user_id = ?1 AND (?2 IS NULL OR c.workout_id = ?2)
                 ORDER BY c.created_at, c.rowid",
                COMMENT_COLUMNS
            );
            select(
                conn,
                &sql,
                params![owner.to_string(), workout.map(|w| w.to_string())],
                comment_row,
            )?
            .into_iter()
            .map(CommentRow::into_domain)
            .collect()
        })
    }

    fn insert_comment(&self, comment: &WorkoutComment) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO workout_comments
                    (id, workout_id, user_id, comment, created_at, updated_at)
                 SELECT ?1, ?2, ?3, ?4, ?5, ?6
                 WHERE EXISTS (SELECT 1 FROM workout_plans WHERE id = ?2)",
                params![
                    comment.id.to_string(),
                    comment.workout.to_string(),
                    comment.owner.id.to_string(),
                    comment.comment,
                    fmt_ts(&comment.created_at),
                    fmt_ts(&comment.updated_at),
                ],
            )?;
            Ok(inserted > 0)
        })
    }

    fn save_comment(&self, comment: &WorkoutComment) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE workout_comments SET workout_id = ?2, comment = ?3, updated_at = ?4
                 WHERE id = ?1 AND EXISTS (SELECT 1 FROM workout_plans WHERE id = ?2)",
                params![
                    comment.id.to_string(),
                    comment.workout.to_string(),
                    comment.comment,
                    fmt_ts(&comment.updated_at),
                ],
            )?;
            Ok(changed > 0)
        })
    }

    fn delete_comment(&self, id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted =
                conn.execute("DELETE FROM workout_comments WHERE id = ?1", [id.to_string()])?;
            Ok(deleted > 0)
        })
    }
}

// -- Performances --

impl PerformanceStore for Database {
    fn find_performance(&self, id: Uuid) -> Result<Option<WorkoutPerformance>> {
        self.with_conn(|conn| {
            let sql = format!("{} WHERE p.id = ?1", PERFORMANCE_COLUMNS);
            select(conn, &sql, [id.to_string()], performance_row)?
                .into_iter()
                .next()
                .map(PerformanceRow::into_domain)
                .transpose()
        })
    }

    fn list_performances(
        &self,
        owner: Uuid,
        workout: Option<Uuid>,
    ) -> Result<Vec<WorkoutPerformance>> {
        self.with_conn(|conn| {
            let sql = format!(
                "{} WHERE p.user_id = ?1 AND (?2 IS NULL OR p.workout_id = ?2)
                 ORDER BY p.performed_at, p.rowid",
                PERFORMANCE_COLUMNS
            );
            select(
                conn,
                &sql,
                params![owner.to_string(), workout.map(|w| w.to_string())],
                performance_row,
            )?
            .into_iter()
            .map(PerformanceRow::into_domain)
            .collect()
        })
    }

    fn insert_performance(&self, performance: &WorkoutPerformance) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO workout_performances
                    (id, workout_id, user_id, performance_metric, notes, performed_at)
                 SELECT ?1, ?2, ?3, ?4, ?5, ?6
                 WHERE EXISTS (SELECT 1 FROM workout_plans WHERE id = ?2)",
                params![
                    performance.id.to_string(),
                    performance.workout.to_string(),
                    performance.owner.id.to_string(),
                    performance.performance_metric,
                    performance.notes,
                    fmt_ts(&performance.performed_at),
                ],
            )?;
            Ok(inserted > 0)
        })
    }

    fn save_performance(&self, performance: &WorkoutPerformance) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE workout_performances
                 SET workout_id = ?2, performance_metric = ?3, notes = ?4
                 WHERE id = ?1 AND EXISTS (SELECT 1 FROM workout_plans WHERE id = ?2)",
                params![
                    performance.id.to_string(),
                    performance.workout.to_string(),
                    performance.performance_metric,
                    performance.notes,
                ],
            )?;
            Ok(changed > 0)
        })
    }

    fn delete_performance(&self, id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM workout_performances WHERE id = ?1",
                [id.to_string()],
            )?;
            Ok(deleted > 0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, NaiveDate, Utc};
    use liftlog_core::UserRef;
    use liftlog_core::model::now;
    use liftlog_core::ports::ExerciseCatalog;

    fn register(db: &Database, name: &str) -> UserRef {
        let id = Uuid::new_v4();
        db.create_user(&id.to_string(), name, "", "hash").unwrap();
        UserRef {
            id,
            username: name.to_string(),
        }
    }

    fn setup() -> (Database, UserRef, UserRef) {
        let db = Database::open_in_memory().unwrap();
        db.seed_exercises().unwrap();
        let alice = register(&db, "alice");
        let bob = register(&db, "bob");
        (db, alice, bob)
    }

    fn plan(db: &Database, owner: &UserRef, title: &str, lines: usize) -> WorkoutPlan {
        let catalog = db.list_exercises().unwrap();
        let stamp = now();
        let plan = WorkoutPlan {
            id: Uuid::new_v4(),
            owner: owner.clone(),
            title: title.to_string(),
            description: String::new(),
            scheduled_date: NaiveDate::from_ymd_opt(2025, 4, 10),
            exercises: catalog
                .iter()
                .take(lines)
                .enumerate()
                .map(|(i, e)| ExerciseLine {
                    id: Uuid::new_v4(),
                    exercise: e.id,
                    sets: 3,
                    reps: 10 + i as u32,
                    weight: Some(50.0),
                })
                .collect(),
            created_at: stamp,
            updated_at: stamp,
        };
        db.insert_workout(&plan).unwrap();
        plan
    }

    fn at(offset_hours: i64) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-04-10T07:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
            + Duration::hours(offset_hours)
    }

    fn schedule(owner: &UserRef, workout: Uuid, when: DateTime<Utc>) -> ScheduledWorkout {
        ScheduledWorkout {
            id: Uuid::new_v4(),
            owner: owner.clone(),
            workout,
            scheduled_datetime: when,
            created_at: now(),
        }
    }

    #[test]
    fn workout_round_trips_with_lines_in_order() {
        let (db, alice, _) = setup();
        let saved = plan(&db, &alice, "Morning Workout", 3);

        let found = db.find_workout(saved.id).unwrap().unwrap();
        assert_eq!(found, saved);
        assert!(db.find_workout(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn save_replaces_the_whole_line_collection() {
        let (db, alice, _) = setup();
        let mut saved = plan(&db, &alice, "Morning Workout", 3);

        saved.title = "Evening Workout".into();
        saved.scheduled_date = None;
        saved.exercises.truncate(1);
        saved.exercises[0].id = Uuid::new_v4();
        assert!(db.save_workout(&saved).unwrap());

        let found = db.find_workout(saved.id).unwrap().unwrap();
        assert_eq!(found.title, "Evening Workout");
        assert_eq!(found.scheduled_date, None);
        assert_eq!(found.exercises.len(), 1);
        assert_eq!(found.exercises[0].id, saved.exercises[0].id);

        let lines: i64 = db
            .with_conn(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM workout_exercises", [], |r| r.get(0))?)
            })
            .unwrap();
        assert_eq!(lines, 1);
    }

    #[test]
    fn failed_line_insert_rolls_back_the_plan() {
        let (db, alice, _) = setup();
        let stamp = now();
        let bad = WorkoutPlan {
            id: Uuid::new_v4(),
            owner: alice.clone(),
            title: "Broken".into(),
            description: String::new(),
            scheduled_date: None,
            exercises: vec![ExerciseLine {
                id: Uuid::new_v4(),
                exercise: Uuid::new_v4(),
                sets: 1,
                reps: 1,
                weight: None,
            }],
            created_at: stamp,
            updated_at: stamp,
        };
        assert!(db.insert_workout(&bad).is_err());
        assert!(db.find_workout(bad.id).unwrap().is_none());
    }

    #[test]
    fn list_workouts_is_newest_first_and_owner_scoped() {
        let (db, alice, bob) = setup();
        let first = plan(&db, &alice, "first", 1);
        let second = plan(&db, &alice, "second", 2);
        plan(&db, &bob, "bob's", 1);

        let mine = db.list_workouts(alice.id).unwrap();
        let ids: Vec<Uuid> = mine.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(mine[0].exercises.len(), 2);
        assert_eq!(mine[1].exercises.len(), 1);
        assert_eq!(mine[0].owner.username, "alice");
    }

    #[test]
    fn deleting_a_plan_cascades() {
        let (db, alice, _) = setup();
        let saved = plan(&db, &alice, "doomed", 2);
        let s = schedule(&alice, saved.id, at(0));
        db.insert_schedule(&s).unwrap();
        let stamp = now();
        let c = WorkoutComment {
            id: Uuid::new_v4(),
            workout: saved.id,
            owner: alice.clone(),
            comment: "tough".into(),
            created_at: stamp,
            updated_at: stamp,
        };
        db.insert_comment(&c).unwrap();
        let p = WorkoutPerformance {
            id: Uuid::new_v4(),
            workout: saved.id,
            owner: alice.clone(),
            performance_metric: Some(1.5),
            notes: String::new(),
            performed_at: stamp,
        };
        db.insert_performance(&p).unwrap();

        assert!(db.delete_workout(saved.id).unwrap());
        assert!(!db.delete_workout(saved.id).unwrap());
        assert!(db.find_schedule(s.id).unwrap().is_none());
        assert!(db.find_comment(c.id).unwrap().is_none());
        assert!(db.find_performance(p.id).unwrap().is_none());
        let lines: i64 = db
            .with_conn(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM workout_exercises", [], |r| r.get(0))?)
            })
            .unwrap();
        assert_eq!(lines, 0);
    }

    #[test]
    fn schedule_order_desc_is_exact_reverse() {
        let (db, alice, bob) = setup();
        let saved = plan(&db, &alice, "plan", 0);
        for offset in [5, -3, 5, 0, -3] {
            db.insert_schedule(&schedule(&alice, saved.id, at(offset)))
                .unwrap();
        }
        let theirs = plan(&db, &bob, "theirs", 0);
        db.insert_schedule(&schedule(&bob, theirs.id, at(1))).unwrap();

        let asc: Vec<Uuid> = db
            .list_schedules(alice.id, SortOrder::Asc)
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        let mut desc: Vec<Uuid> = db
            .list_schedules(alice.id, SortOrder::Desc)
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(asc.len(), 5);
        desc.reverse();
        assert_eq!(asc, desc);

        let first = db.list_schedules(alice.id, SortOrder::Asc).unwrap()[0].clone();
        assert_eq!(first.scheduled_datetime, at(-3));
        assert_eq!(first.owner.username, "alice");
    }

    #[test]
    fn schedule_save_moves_it() {
        let (db, alice, _) = setup();
        let a = plan(&db, &alice, "a", 0);
        let b = plan(&db, &alice, "b", 0);
        let mut s = schedule(&alice, a.id, at(0));
        db.insert_schedule(&s).unwrap();

        s.workout = b.id;
        s.scheduled_datetime = at(4);
        assert!(db.save_schedule(&s).unwrap());
        assert_eq!(db.find_schedule(s.id).unwrap().unwrap(), s);

        assert!(db.delete_schedule(s.id).unwrap());
        assert!(!db.save_schedule(&s).unwrap());
    }

    #[test]
    fn writes_after_a_delete_report_false() {
        let (db, alice, _) = setup();
        let kept = plan(&db, &alice, "kept", 0);
        let mut gone = plan(&db, &alice, "gone", 1);
        let mut s = schedule(&alice, kept.id, at(0));
        db.insert_schedule(&s).unwrap();
        let stamp = now();
        let mut c = WorkoutComment {
            id: Uuid::new_v4(),
            workout: kept.id,
            owner: alice.clone(),
            comment: "hi".into(),
            created_at: stamp,
            updated_at: stamp,
        };
        db.insert_comment(&c).unwrap();
        assert!(db.delete_workout(gone.id).unwrap());

        gone.title = "renamed".into();
        assert!(!db.save_workout(&gone).unwrap());
        assert!(db.find_workout(gone.id).unwrap().is_none());

        assert!(!db.insert_schedule(&schedule(&alice, gone.id, at(1))).unwrap());
        assert!(!db
            .insert_performance(&WorkoutPerformance {
                id: Uuid::new_v4(),
                workout: gone.id,
                owner: alice.clone(),
                performance_metric: None,
                notes: String::new(),
                performed_at: stamp,
            })
            .unwrap());

        // Pointing an existing row at the deleted plan leaves it unchanged.
        s.workout = gone.id;
        assert!(!db.save_schedule(&s).unwrap());
        c.workout = gone.id;
        assert!(!db.save_comment(&c).unwrap());
        assert_eq!(db.find_schedule(s.id).unwrap().unwrap().workout, kept.id);
        assert_eq!(db.find_comment(c.id).unwrap().unwrap().workout, kept.id);
        assert_eq!(db.list_schedules(alice.id, SortOrder::Asc).unwrap().len(), 1);
    }

    #[test]
    fn comment_and_performance_filters() {
        let (db, alice, _) = setup();
        let a = plan(&db, &alice, "a", 0);
        let b = plan(&db, &alice, "b", 0);
        for (workout, text) in [(a.id, "one"), (b.id, "two"), (a.id, "three")] {
            let stamp = now();
            db.insert_comment(&WorkoutComment {
                id: Uuid::new_v4(),
                workout,
                owner: alice.clone(),
                comment: text.into(),
                created_at: stamp,
                updated_at: stamp,
            })
            .unwrap();
            db.insert_performance(&WorkoutPerformance {
                id: Uuid::new_v4(),
                workout,
                owner: alice.clone(),
                performance_metric: None,
                notes: text.into(),
                performed_at: stamp,
            })
            .unwrap();
        }

        let on_a: Vec<String> = db
            .list_comments(alice.id, Some(a.id))
            .unwrap()
            .into_iter()
            .map(|c| c.comment)
            .collect();
        assert_eq!(on_a, vec!["one".to_string(), "three".to_string()]);
        assert_eq!(db.list_comments(alice.id, None).unwrap().len(), 3);

        let mut perf = db.list_performances(alice.id, Some(b.id)).unwrap();
        assert_eq!(perf.len(), 1);
        let mut p = perf.remove(0);
        p.performance_metric = Some(12.0);
        p.notes = "updated".into();
        assert!(db.save_performance(&p).unwrap());
        assert_eq!(db.find_performance(p.id).unwrap().unwrap(), p);
        assert_eq!(db.list_performances(alice.id, None).unwrap().len(), 3);
    }
}
