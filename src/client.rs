//! Typed HTTP client for the `/api` surface. Pure transport: every method is
//! one request, decoded into the server's own models.

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;

use crate::auth::dto::AuthResponse;
use crate::catalog::repo_types::{
    DetoxItem, DetoxItemPatch, ExerciseItem, ExerciseItemPatch, FoodItem, FoodItemPatch, Recipe,
    RecipePatch,
};
use crate::folders::repo_types::UserFolder;
use crate::plans::repo_types::{
    DailyDetoxPlan, DailyDetoxPlanInput, DailyDietPlan, DailyDietPlanInput, DailyExercisePlan,
    DailyExercisePlanInput,
};
use crate::progress::repo_types::{Measurement, WeightRecord};
use crate::store::Record;
use crate::users::repo_types::{DataCounts, PublicUser, User, UserPatch};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("api error {status}: {message}")]
    Api { status: u16, message: String },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Success {
    pub success: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedUser {
    pub success: bool,
    pub user: PublicUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Health {
    pub status: String,
    pub timestamp: String,
}

/// Which single-record plan family a legacy call addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanKind {
    Diet,
    Exercise,
    Detox,
}

impl PlanKind {
    fn legacy_path(self) -> &'static str {
        match self {
            PlanKind::Diet => "diet-plans",
            PlanKind::Exercise => "exercise-plans",
            PlanKind::Detox => "detox-plans",
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// `base_url` is the server root, e.g. `http://localhost:3001`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Sends `token` as a Bearer header on every later request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self
            .http
            .request(method, format!("{}/api{}", self.base_url, path));
        match &self.token {
            Some(t) => req.bearer_auth(t),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> ClientResult<T> {
        let res = req.send().await?;
        let status = res.status();
        if status.is_success() {
            return Ok(res.json::<T>().await?);
        }
        let message = match res.json::<ErrorMessage>().await {
            Ok(body) => body.message,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        };
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send(self.request(Method::GET, path)).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.send(self.request(Method::PUT, path).json(body)).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send(self.request(Method::DELETE, path)).await
    }

    // --- auth ---

    pub async fn login(&self, username: &str, password: &str) -> ClientResult<AuthResponse> {
        self.post(
            "/auth/login",
            &json!({ "username": username, "password": password }),
        )
        .await
    }

    pub async fn register(&self, user: &User) -> ClientResult<AuthResponse> {
        self.post("/auth/register", user).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> ClientResult<AuthResponse> {
        self.post("/auth/refresh", &json!({ "refreshToken": refresh_token }))
            .await
    }

    pub async fn me(&self) -> ClientResult<PublicUser> {
        self.get("/auth/me").await
    }

    // --- users ---

    pub async fn users(&self) -> ClientResult<Vec<PublicUser>> {
        self.get("/users").await
    }

    pub async fn user(&self, id: &str) -> ClientResult<Option<PublicUser>> {
        not_found_as_none(self.get(&format!("/users/{}", id)).await)
    }

    pub async fn create_user(&self, user: &User) -> ClientResult<CreatedUser> {
        self.post("/users", user).await
    }

    pub async fn update_user(&self, id: &str, patch: &UserPatch) -> ClientResult<PublicUser> {
        self.put(&format!("/users/{}", id), patch).await
    }

    pub async fn delete_user(&self, id: &str) -> ClientResult<Success> {
        self.delete(&format!("/users/{}", id)).await
    }

    pub async fn user_data_counts(&self, id: &str) -> ClientResult<DataCounts> {
        self.get(&format!("/users/{}/data-counts", id)).await
    }

    // --- catalog ---

    pub async fn food_items(&self) -> ClientResult<Vec<FoodItem>> {
        self.get("/food-items").await
    }

    pub async fn food_item(&self, id: &str) -> ClientResult<Option<FoodItem>> {
        not_found_as_none(self.get(&format!("/food-items/{}", id)).await)
    }

    pub async fn create_food_item(&self, item: &FoodItem) -> ClientResult<FoodItem> {
        self.post("/food-items", item).await
    }

    pub async fn update_food_item(&self, id: &str, patch: &FoodItemPatch) -> ClientResult<FoodItem> {
        self.put(&format!("/food-items/{}", id), patch).await
    }

    pub async fn delete_food_item(&self, id: &str) -> ClientResult<Success> {
        self.delete(&format!("/food-items/{}", id)).await
    }

    pub async fn exercise_items(&self) -> ClientResult<Vec<ExerciseItem>> {
        self.get("/exercise-items").await
    }

    pub async fn exercise_item(&self, id: &str) -> ClientResult<Option<ExerciseItem>> {
        not_found_as_none(self.get(&format!("/exercise-items/{}", id)).await)
    }

    pub async fn create_exercise_item(&self, item: &ExerciseItem) -> ClientResult<ExerciseItem> {
        self.post("/exercise-items", item).await
    }

    pub async fn update_exercise_item(
        &self,
        id: &str,
        patch: &ExerciseItemPatch,
    ) -> ClientResult<ExerciseItem> {
        self.put(&format!("/exercise-items/{}", id), patch).await
    }

    pub async fn delete_exercise_item(&self, id: &str) -> ClientResult<Success> {
        self.delete(&format!("/exercise-items/{}", id)).await
    }

    pub async fn detox_items(&self) -> ClientResult<Vec<DetoxItem>> {
        self.get("/detox-items").await
    }

    pub async fn detox_item(&self, id: &str) -> ClientResult<Option<DetoxItem>> {
        not_found_as_none(self.get(&format!("/detox-items/{}", id)).await)
    }

    pub async fn create_detox_item(&self, item: &DetoxItem) -> ClientResult<DetoxItem> {
        self.post("/detox-items", item).await
    }

    pub async fn update_detox_item(
        &self,
        id: &str,
        patch: &DetoxItemPatch,
    ) -> ClientResult<DetoxItem> {
        self.put(&format!("/detox-items/{}", id), patch).await
    }

    pub async fn delete_detox_item(&self, id: &str) -> ClientResult<Success> {
        self.delete(&format!("/detox-items/{}", id)).await
    }

    pub async fn recipes(&self) -> ClientResult<Vec<Recipe>> {
        self.get("/recipes").await
    }

    pub async fn recipe(&self, id: &str) -> ClientResult<Option<Recipe>> {
        not_found_as_none(self.get(&format!("/recipes/{}", id)).await)
    }

    pub async fn create_recipe(&self, recipe: &Recipe) -> ClientResult<Recipe> {
        self.post("/recipes", recipe).await
    }

    pub async fn update_recipe(&self, id: &str, patch: &RecipePatch) -> ClientResult<Recipe> {
        self.put(&format!("/recipes/{}", id), patch).await
    }

    pub async fn delete_recipe(&self, id: &str) -> ClientResult<Success> {
        self.delete(&format!("/recipes/{}", id)).await
    }

    // --- legacy plans ---

    pub async fn legacy_plan(&self, kind: PlanKind, user_id: &str) -> ClientResult<Option<Record>> {
        self.get(&format!("/{}/{}", kind.legacy_path(), user_id))
            .await
    }

    pub async fn save_legacy_plan(
        &self,
        kind: PlanKind,
        user_id: &str,
        plan: &Record,
    ) -> ClientResult<Record> {
        self.post(&format!("/{}/{}", kind.legacy_path(), user_id), plan)
            .await
    }

    pub async fn delete_legacy_plan(&self, kind: PlanKind, user_id: &str) -> ClientResult<Success> {
        self.delete(&format!("/{}/{}", kind.legacy_path(), user_id))
            .await
    }

    // --- daily plans ---

    pub async fn daily_diet_plans(&self, user_id: &str) -> ClientResult<Vec<DailyDietPlan>> {
        self.get(&format!("/daily-diet-plans/{}", user_id)).await
    }

    pub async fn daily_diet_plan(
        &self,
        user_id: &str,
        date: &str,
    ) -> ClientResult<Option<DailyDietPlan>> {
        self.get(&format!("/daily-diet-plans/{}/{}", user_id, date))
            .await
    }

    pub async fn save_daily_diet_plan(
        &self,
        user_id: &str,
        plan: &DailyDietPlanInput,
    ) -> ClientResult<DailyDietPlan> {
        self.post(&format!("/daily-diet-plans/{}", user_id), plan)
            .await
    }

    pub async fn delete_daily_diet_plan(&self, user_id: &str, date: &str) -> ClientResult<Success> {
        self.delete(&format!("/daily-diet-plans/{}/{}", user_id, date))
            .await
    }

    pub async fn daily_exercise_plans(&self, user_id: &str) -> ClientResult<Vec<DailyExercisePlan>> {
        self.get(&format!("/daily-exercise-plans/{}", user_id)).await
    }

    pub async fn daily_exercise_plan(
        &self,
        user_id: &str,
        date: &str,
    ) -> ClientResult<Option<DailyExercisePlan>> {
        self.get(&format!("/daily-exercise-plans/{}/{}", user_id, date))
            .await
    }

    pub async fn save_daily_exercise_plan(
        &self,
        user_id: &str,
        plan: &DailyExercisePlanInput,
    ) -> ClientResult<DailyExercisePlan> {
        self.post(&format!("/daily-exercise-plans/{}", user_id), plan)
            .await
    }

    pub async fn delete_daily_exercise_plan(
        &self,
        user_id: &str,
        date: &str,
    ) -> ClientResult<Success> {
        self.delete(&format!("/daily-exercise-plans/{}/{}", user_id, date))
            .await
    }

    pub async fn daily_detox_plans(&self, user_id: &str) -> ClientResult<Vec<DailyDetoxPlan>> {
        self.get(&format!("/daily-detox-plans/{}", user_id)).await
    }

    pub async fn daily_detox_plan(
        &self,
        user_id: &str,
        date: &str,
    ) -> ClientResult<Option<DailyDetoxPlan>> {
        self.get(&format!("/daily-detox-plans/{}/{}", user_id, date))
            .await
    }

    pub async fn save_daily_detox_plan(
        &self,
        user_id: &str,
        plan: &DailyDetoxPlanInput,
    ) -> ClientResult<DailyDetoxPlan> {
        self.post(&format!("/daily-detox-plans/{}", user_id), plan)
            .await
    }

    pub async fn delete_daily_detox_plan(&self, user_id: &str, date: &str) -> ClientResult<Success> {
        self.delete(&format!("/daily-detox-plans/{}/{}", user_id, date))
            .await
    }

    // --- progress ---

    pub async fn weight_records(&self, user_id: &str) -> ClientResult<Vec<WeightRecord>> {
        self.get(&format!("/weight-records/{}", user_id)).await
    }

    pub async fn add_weight_record(
        &self,
        user_id: &str,
        record: &WeightRecord,
    ) -> ClientResult<WeightRecord> {
        self.post(&format!("/weight-records/{}", user_id), record)
            .await
    }

    pub async fn delete_weight_record(&self, id: &str) -> ClientResult<Success> {
        self.delete(&format!("/weight-records/{}", id)).await
    }

    pub async fn measurements(&self, user_id: &str) -> ClientResult<Vec<Measurement>> {
        self.get(&format!("/measurements/{}", user_id)).await
    }

    pub async fn add_measurement(
        &self,
        user_id: &str,
        measurement: &Measurement,
    ) -> ClientResult<Measurement> {
        self.post(&format!("/measurements/{}", user_id), measurement)
            .await
    }

    pub async fn delete_measurement(&self, id: &str) -> ClientResult<Success> {
        self.delete(&format!("/measurements/{}", id)).await
    }

    // --- folders ---

    pub async fn folders(&self, user_id: &str) -> ClientResult<Vec<UserFolder>> {
        self.get(&format!("/folders/{}", user_id)).await
    }

    pub async fn create_folder(&self, user_id: &str, name: &str) -> ClientResult<UserFolder> {
        self.post(&format!("/folders/{}", user_id), &json!({ "name": name }))
            .await
    }

    pub async fn rename_folder(&self, id: &str, name: &str) -> ClientResult<UserFolder> {
        self.put(&format!("/folders/{}", id), &json!({ "name": name }))
            .await
    }

    pub async fn delete_folder(&self, id: &str) -> ClientResult<Success> {
        self.delete(&format!("/folders/{}", id)).await
    }

    pub async fn health(&self) -> ClientResult<Health> {
        self.get("/health").await
    }
}

fn not_found_as_none<T>(res: ClientResult<T>) -> ClientResult<Option<T>> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(ClientError::Api { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => Ok(None),
        Err(e) => Err(e),
    }
}
