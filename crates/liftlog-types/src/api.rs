use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use uuid::Uuid;

// -- Submitted fields --

/// One field of a request body. A value of the wrong type is kept as
/// `Invalid` instead of failing the whole body, so every bad field can be
/// reported at once.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    Absent,
    Null,
    Value(T),
    Invalid(&'static str),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Absent
    }
}

impl<T> From<T> for Field<T> {
    fn from(value: T) -> Self {
        Field::Value(value)
    }
}

/// A type that can appear in a [`Field`], with the message reported when the
/// submitted JSON does not parse as it.
pub trait FieldValue: DeserializeOwned {
    const INVALID: &'static str;
}

impl FieldValue for String {
    const INVALID: &'static str = "Not a valid string.";
}

impl FieldValue for i64 {
    const INVALID: &'static str = "A valid integer is required.";
}

impl FieldValue for f64 {
    const INVALID: &'static str = "A valid number is required.";
}

impl FieldValue for Uuid {
    const INVALID: &'static str = "Must be a valid UUID.";
}

impl FieldValue for NaiveDate {
    const INVALID: &'static str =
        "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";
}

impl FieldValue for DateTime<Utc> {
    const INVALID: &'static str = "Datetime has wrong format. Use one of these formats instead: YYYY-MM-DDThh:mm[:ss[.uuuuuu]][+HH:MM|-HH:MM|Z].";
}

impl FieldValue for Vec<ExerciseLineInput> {
    const INVALID: &'static str = "Expected a list of items.";
}

impl<'de, T: FieldValue> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(de)?;
        if raw.is_null() {
            return Ok(Field::Null);
        }
        Ok(serde_json::from_value(raw).map_or(Field::Invalid(T::INVALID), Field::Value))
    }
}

// -- JWT Claims --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims for both token kinds. Protected routes only accept `Access`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub token_type: TokenType,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: Field<String>,
    pub email: Field<String>,
    pub password: Field<String>,
    pub password2: Field<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TokenRequest {
    pub username: Field<String>,
    pub password: Field<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenPairResponse {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RefreshRequest {
    pub refresh: Field<String>,
}

#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    pub access: String,
}

// -- Exercises --

#[derive(Debug, Serialize)]
pub struct ExerciseResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub muscle_group: String,
}

// -- Workouts --

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExerciseLineInput {
    pub exercise: Field<Uuid>,
    pub sets: Field<i64>,
    pub reps: Field<i64>,
    pub weight: Field<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateWorkoutRequest {
    pub title: Field<String>,
    pub description: Field<String>,
    pub scheduled_date: Field<NaiveDate>,
    pub exercises: Field<Vec<ExerciseLineInput>>,
}

/// Partial update. Absent keys keep their stored value; `exercises`, when
/// present, replaces the whole line collection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateWorkoutRequest {
    pub title: Field<String>,
    pub description: Field<String>,
    pub scheduled_date: Field<NaiveDate>,
    pub exercises: Field<Vec<ExerciseLineInput>>,
}

#[derive(Debug, Serialize)]
pub struct WorkoutExerciseResponse {
    pub id: Uuid,
    pub exercise: Uuid,
    pub sets: u32,
    pub reps: u32,
    pub weight: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct WorkoutPlanResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub scheduled_date: Option<NaiveDate>,
    pub exercises: Vec<WorkoutExerciseResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// -- Scheduled workouts --

/// Used for both create and update; create requires both fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScheduleRequest {
    pub workout: Field<Uuid>,
    pub scheduled_datetime: Field<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScheduleQuery {
    pub order: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScheduledWorkoutResponse {
    pub id: Uuid,
    pub workout: Uuid,
    pub scheduled_datetime: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

// -- Comments and performances --

#[derive(Debug, Default, Deserialize)]
pub struct WorkoutFilter {
    pub workout: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommentRequest {
    pub workout: Field<Uuid>,
    pub comment: Field<String>,
}

#[derive(Debug, Serialize)]
pub struct WorkoutCommentResponse {
    pub id: Uuid,
    pub workout: Uuid,
    pub user: String,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PerformanceRequest {
    pub workout: Field<Uuid>,
    pub performance_metric: Field<f64>,
    pub notes: Field<String>,
}

#[derive(Debug, Serialize)]
pub struct WorkoutPerformanceResponse {
    pub id: Uuid,
    pub workout: Uuid,
    pub user: String,
    pub performance_metric: Option<f64>,
    pub notes: String,
    pub performed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_distinguishes_null_from_missing_date() {
        let missing: UpdateWorkoutRequest = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert_eq!(missing.scheduled_date, Field::Absent);

        let cleared: UpdateWorkoutRequest =
            serde_json::from_str(r#"{"scheduled_date":null}"#).unwrap();
        assert_eq!(cleared.scheduled_date, Field::Null);

        let set: UpdateWorkoutRequest =
            serde_json::from_str(r#"{"scheduled_date":"2025-04-15"}"#).unwrap();
        assert_eq!(
            set.scheduled_date,
            Field::Value(NaiveDate::from_ymd_opt(2025, 4, 15).unwrap())
        );
    }

    #[test]
    fn mistyped_fields_do_not_fail_the_body() {
        let req: CreateWorkoutRequest = serde_json::from_str(
            r#"{"title":7,"scheduled_date":"tomorrow",
                "exercises":[{"exercise":"not-a-uuid","sets":"three","reps":10,"weight":null}]}"#,
        )
        .unwrap();
        assert_eq!(req.title, Field::Invalid(String::INVALID));
        assert_eq!(req.scheduled_date, Field::Invalid(NaiveDate::INVALID));
        assert_eq!(req.description, Field::Absent);

        let Field::Value(lines) = req.exercises else {
            panic!("expected a parsed line list, got {:?}", req.exercises);
        };
        assert_eq!(lines[0].exercise, Field::Invalid(Uuid::INVALID));
        assert_eq!(lines[0].sets, Field::Invalid(i64::INVALID));
        assert_eq!(lines[0].reps, Field::Value(10));
        assert_eq!(lines[0].weight, Field::Null);

        let req: CreateWorkoutRequest = serde_json::from_str(r#"{"exercises":"lots"}"#).unwrap();
        assert_eq!(
            req.exercises,
            Field::Invalid(<Vec<ExerciseLineInput>>::INVALID)
        );
    }

    #[test]
    fn token_request_tolerates_missing_fields() {
        let req: TokenRequest = serde_json::from_str(r#"{"username":"alice"}"#).unwrap();
        assert_eq!(req.username, Field::Value("alice".to_string()));
        assert_eq!(req.password, Field::Absent);
    }

    #[test]
    fn read_only_fields_in_payload_are_ignored() {
        let req: CommentRequest = serde_json::from_str(
            r#"{"workout":"00000000-0000-0000-0000-000000000001","comment":"hi","user":"mallory","id":7}"#,
        )
        .unwrap();
        assert_eq!(req.comment, Field::Value("hi".to_string()));
    }
}
