use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerInfo},
    tool, tool_handler, tool_router,
    schemars::JsonSchema,
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use levelr_core::models::*;
use levelr_core::{Database, GoalUpdateError};

#[derive(Clone)]
pub struct McpServer {
    db: Database,
    tool_router: ToolRouter<Self>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListQuestsRequest {
    #[schemars(description = "The user ID whose quests to list")]
    pub user_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetLevelRequest {
    #[schemars(description = "The goal (quest) ID")]
    pub goal_id: String,
    #[schemars(description = "The level number, starting at 1")]
    pub level_number: u32,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ToggleTaskRequest {
    #[schemars(description = "The goal (quest) ID")]
    pub goal_id: String,
    #[schemars(description = "The level number, starting at 1")]
    pub level_number: u32,
    #[schemars(description = "Zero-based index of the checklist task")]
    pub task_index: usize,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CompleteLevelRequest {
    #[schemars(description = "The goal (quest) ID")]
    pub goal_id: String,
    #[schemars(description = "The level number to mark as complete")]
    pub level_number: u32,
}

#[derive(Debug, Serialize)]
pub struct QuestSummary {
    pub id: Uuid,
    pub title: String,
    pub difficulty: Difficulty,
    pub progress: u8,
    pub current_level: u32,
    pub total_levels: u32,
    pub is_completed: bool,
}

#[derive(Debug, Serialize)]
pub struct LevelContext {
    pub goal_title: String,
    pub total_levels: u32,
    pub level: Level,
}

impl McpServer {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            tool_router: Self::tool_router(),
        }
    }

    fn parse_uuid(s: &str) -> Result<Uuid, McpError> {
        Uuid::parse_str(s)
            .map_err(|e| McpError::invalid_params(format!("Invalid UUID: {}", e), None))
    }

    fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    fn update_error(err: GoalUpdateError) -> McpError {
        match err {
            GoalUpdateError::GoalNotFound
            | GoalUpdateError::UserNotFound
            | GoalUpdateError::Progression(_) => McpError::invalid_params(err.to_string(), None),
            other => McpError::internal_error(other.to_string(), None),
        }
    }
}

#[tool_router]
impl McpServer {
    #[tool(description = "List a user's quests with their progress")]
    async fn list_quests(
        &self,
        params: Parameters<ListQuestsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let user_id = Self::parse_uuid(&params.0.user_id)?;

        let goals = self.db.list_goals(user_id)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        let summaries: Vec<QuestSummary> = goals
            .into_iter()
            .map(|g| QuestSummary {
                id: g.id,
                title: g.title,
                difficulty: g.difficulty,
                progress: g.progress,
                current_level: g.current_level,
                total_levels: g.total_levels,
                is_completed: g.is_completed,
            })
            .collect();

        Self::to_json(&summaries)
    }

    #[tool(description = "Get the tasks, tips and resources for one level of a quest")]
    async fn get_level(
        &self,
        params: Parameters<GetLevelRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let goal_id = Self::parse_uuid(&req.goal_id)?;

        let goal = self.db.get_goal(goal_id)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?
            .ok_or_else(|| McpError::invalid_params("Goal not found", None))?;

        let level = goal.level(req.level_number)
            .cloned()
            .ok_or_else(|| McpError::invalid_params("Level not found", None))?;

        Self::to_json(&LevelContext {
            goal_title: goal.title,
            total_levels: goal.total_levels,
            level,
        })
    }

    #[tool(description = "Toggle one checklist task of a level")]
    async fn toggle_task(
        &self,
        params: Parameters<ToggleTaskRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let goal_id = Self::parse_uuid(&req.goal_id)?;

        let goal = self.db.toggle_task(goal_id, req.level_number, req.task_index)
            .map_err(Self::update_error)?;

        let done = goal
            .level(req.level_number)
            .and_then(|l| l.completed_tasks.get(req.task_index).copied())
            .unwrap_or(false);

        Ok(CallToolResult::success(vec![Content::text(format!(
            "Task {} of level {} is now {}",
            req.task_index,
            req.level_number,
            if done { "done" } else { "not done" }
        ))]))
    }

    #[tool(description = "Mark a level as complete and collect its reward")]
    async fn complete_level(
        &self,
        params: Parameters<CompleteLevelRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let goal_id = Self::parse_uuid(&req.goal_id)?;

        let outcome = self.db.complete_level(goal_id, req.level_number)
            .map_err(Self::update_error)?;

        Self::to_json(&outcome)
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some("Levelr MCP server for tracking quests and completing levels".into()),
            ..Default::default()
        }
    }
}

pub async fn run_stdio_server(db: Database) -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!("Starting MCP server via stdio");

    let service = McpServer::new(db);
    let server = service.serve((stdin(), stdout())).await?;

    let quit_reason = server.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);

    Ok(())
}
