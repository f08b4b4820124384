//! Task CRUD. Every handler here sits behind `SessionMiddleware` and scopes
//! its queries by the session user's id: one user can never see or touch
//! another user's tasks, and a foreign task id reads as "not found" rather
//! than "forbidden".

use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::models::{Task, TaskInput};

const TASK_COLUMNS: &str = "id, user_id, title, description, completed, created_at, updated_at";

/// List the session user's tasks, newest first.
#[get("")]
pub async fn get_tasks(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks = sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE user_id = $1 ORDER BY created_at DESC",
        TASK_COLUMNS
    ))
    .bind(user.id())
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": tasks.len(),
        "data": tasks
    })))
}

/// Create a task owned by the session user.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    payload: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let task = Task::new(payload.into_inner(), user.id());

    let created = sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (id, user_id, title, description, completed, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(task.id)
    .bind(task.user_id)
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.completed)
    .bind(task.created_at)
    .bind(task.updated_at)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "data": created
    })))
}

/// Fetch one task by id, if the session user owns it.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE id = $1 AND user_id = $2",
        TASK_COLUMNS
    ))
    .bind(task_id.into_inner())
    .bind(user.id())
    .fetch_optional(&**pool)
    .await?;

    match task {
        Some(task) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": task
        }))),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Replace a task's title, description, and completion flag.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
    payload: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let updated = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks SET title = $1, description = $2, completed = $3, updated_at = now()
         WHERE id = $4 AND user_id = $5
         RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(payload.completed)
    .bind(task_id.into_inner())
    .bind(user.id())
    .fetch_optional(&**pool)
    .await?;

    match updated {
        Some(task) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": task
        }))),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Delete a task the session user owns.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
        .bind(task_id.into_inner())
        .bind(user.id())
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Task not found".into()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Task deleted successfully"
    })))
}
