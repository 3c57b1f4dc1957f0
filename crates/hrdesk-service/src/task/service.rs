//! Task CRUD, status workflow and comments.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use hrdesk_auth::policy::{Action, PolicyEnforcer, RowScope, Table};
use hrdesk_core::error::AppError;
use hrdesk_core::types::{PageRequest, PageResponse};
use hrdesk_database::repositories::{TaskCommentRepository, TaskRepository};
use hrdesk_database::{begin_scoped, commit};
use hrdesk_entity::Role;
use hrdesk_entity::task::{
    CreateTask, CreateTaskComment, Task, TaskComment, TaskFilter, TaskPriority, TaskStatus,
    UpdateTask,
};

use crate::activity::log_activity;
use crate::context::{RequestContext, ensure_member};

/// Request to create a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    /// Target company; defaults to the caller's.
    pub company_id: Option<Uuid>,
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Priority.
    #[serde(default)]
    pub priority: TaskPriority,
    /// Assignee user ID.
    pub assigned_to: Option<Uuid>,
    /// Due date.
    pub due_date: Option<NaiveDate>,
}

/// Manages tasks and their comments.
#[derive(Debug, Clone)]
pub struct TaskService {
    pool: PgPool,
    policy: Arc<PolicyEnforcer>,
}

fn task_scope(task: &Task) -> RowScope {
    RowScope::company(task.company_id)
        .owned_by(task.created_by)
        .assigned_to(task.assigned_to)
}

impl TaskService {
    /// Creates a new task service.
    pub fn new(pool: PgPool, policy: Arc<PolicyEnforcer>) -> Self {
        Self { pool, policy }
    }

    /// Lists visible tasks. Employees only ever see tasks assigned to them.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        company_id: Option<Uuid>,
        mut filter: TaskFilter,
        page: PageRequest,
    ) -> Result<PageResponse<Task>, AppError> {
        let company_id = match company_id {
            Some(id) => Some(id),
            None if ctx.is_super_admin() => None,
            None => Some(ctx.principal.require_company()?),
        };
        self.policy
            .require_listing(&ctx.principal, Table::Task, company_id)?;
        if ctx.role() == Role::Employee {
            filter.assigned_to = Some(ctx.user_id());
        }

        let page = page.normalized();
        let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
        let tasks = TaskRepository::find_all(&mut tx, company_id, &filter, &page).await?;
        commit(tx).await?;
        Ok(tasks)
    }

    /// Gets a task by ID.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<Task, AppError> {
        let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
        let task = self.visible_task(&mut tx, ctx, id).await?;
        commit(tx).await?;
        Ok(task)
    }

    /// Creates a task. The assignee must belong to the task's company.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateTaskRequest,
    ) -> Result<Task, AppError> {
        let company_id = ctx.target_company(req.company_id)?;
        self.policy.require(
            &ctx.principal,
            Table::Task,
            Action::Insert,
            &RowScope::company(company_id),
        )?;
        if req.title.trim().is_empty() {
            return Err(AppError::validation("Task title must not be empty"));
        }

        let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
        if let Some(assignee) = req.assigned_to {
            ensure_member(&mut tx, assignee, company_id).await?;
        }

        let task = TaskRepository::create(
            &mut tx,
            &CreateTask {
                company_id,
                title: req.title.trim().to_string(),
                description: req.description,
                priority: req.priority,
                assigned_to: req.assigned_to,
                created_by: ctx.user_id(),
                due_date: req.due_date,
            },
        )
        .await?;
        log_activity(&mut tx, ctx, Some(company_id), "task.created", "task", task.id).await?;
        commit(tx).await?;

        info!(
            user_id = %ctx.user_id(),
            task_id = %task.id,
            company_id = %company_id,
            assigned_to = ?task.assigned_to,
            "Task created"
        );
        Ok(task)
    }

    /// Updates task fields. Reserved for callers who manage the company's
    /// tasks; assignees change status only.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Task, AppError> {
        if data.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(AppError::validation("Task title must not be empty"));
        }

        let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
        let task = self.visible_task(&mut tx, ctx, id).await?;
        self.policy.require(
            &ctx.principal,
            Table::Task,
            Action::Update,
            &RowScope::company(task.company_id),
        )?;
        if let Some(assignee) = data.assigned_to {
            ensure_member(&mut tx, assignee, task.company_id).await?;
        }

        let updated = TaskRepository::update(&mut tx, id, &data).await?;
        log_activity(&mut tx, ctx, Some(task.company_id), "task.updated", "task", id).await?;
        commit(tx).await?;
        Ok(updated)
    }

    /// Moves a task through its workflow.
    pub async fn change_status(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        status: TaskStatus,
    ) -> Result<Task, AppError> {
        let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
        let task = self.visible_task(&mut tx, ctx, id).await?;
        self.policy
            .require(&ctx.principal, Table::Task, Action::Update, &task_scope(&task))?;
        if !task.status.can_transition_to(status) {
            return Err(AppError::validation(format!(
                "Cannot move task from {} to {}",
                task.status, status
            )));
        }

        let updated = TaskRepository::update_status(&mut tx, id, status).await?;
        log_activity(
            &mut tx,
            ctx,
            Some(task.company_id),
            "task.status_changed",
            "task",
            id,
        )
        .await?;
        commit(tx).await?;

        info!(
            user_id = %ctx.user_id(),
            task_id = %id,
            from = %task.status,
            to = %status,
            "Task status changed"
        );
        Ok(updated)
    }

    /// Deletes a task and its comments.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
        let task = self.visible_task(&mut tx, ctx, id).await?;
        self.policy
            .require(&ctx.principal, Table::Task, Action::Delete, &task_scope(&task))?;

        TaskRepository::delete(&mut tx, id).await?;
        log_activity(&mut tx, ctx, Some(task.company_id), "task.deleted", "task", id).await?;
        commit(tx).await?;

        info!(user_id = %ctx.user_id(), task_id = %id, "Task deleted");
        Ok(())
    }

    /// Lists the comments of a visible task.
    pub async fn list_comments(
        &self,
        ctx: &RequestContext,
        task_id: Uuid,
    ) -> Result<Vec<TaskComment>, AppError> {
        let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
        let task = self.visible_task(&mut tx, ctx, task_id).await?;
        self.policy.require(
            &ctx.principal,
            Table::TaskComment,
            Action::Select,
            &task_scope(&task),
        )?;

        let comments = TaskCommentRepository::find_by_task(&mut tx, task_id).await?;
        commit(tx).await?;
        Ok(comments)
    }

    /// Adds a comment to a visible task.
    pub async fn add_comment(
        &self,
        ctx: &RequestContext,
        task_id: Uuid,
        body: &str,
    ) -> Result<TaskComment, AppError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(AppError::validation("Comment must not be empty"));
        }

        let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
        let task = self.visible_task(&mut tx, ctx, task_id).await?;
        self.policy.require(
            &ctx.principal,
            Table::TaskComment,
            Action::Insert,
            &RowScope::company(task.company_id)
                .owned_by(ctx.user_id())
                .assigned_to(task.assigned_to),
        )?;

        let comment = TaskCommentRepository::create(
            &mut tx,
            &CreateTaskComment {
                task_id,
                author_id: ctx.user_id(),
                body: body.to_string(),
            },
        )
        .await?;
        log_activity(
            &mut tx,
            ctx,
            Some(task.company_id),
            "task.commented",
            "task",
            task_id,
        )
        .await?;
        commit(tx).await?;
        Ok(comment)
    }

    /// Deletes a comment.
    pub async fn delete_comment(&self, ctx: &RequestContext, comment_id: Uuid) -> Result<(), AppError> {
        let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
        let comment = TaskCommentRepository::find_by_id(&mut tx, comment_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Comment {comment_id} not found")))?;
        let task = self.visible_task(&mut tx, ctx, comment.task_id).await?;
        self.policy.require(
            &ctx.principal,
            Table::TaskComment,
            Action::Delete,
            &RowScope::company(task.company_id).owned_by(comment.author_id),
        )?;

        TaskCommentRepository::delete(&mut tx, comment_id).await?;
        commit(tx).await?;

        info!(user_id = %ctx.user_id(), comment_id = %comment_id, "Comment deleted");
        Ok(())
    }

    async fn visible_task(
        &self,
        conn: &mut PgConnection,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<Task, AppError> {
        let task = TaskRepository::find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Task {id} not found")))?;
        self.policy
            .require(&ctx.principal, Table::Task, Action::Select, &task_scope(&task))?;
        Ok(task)
    }
}
