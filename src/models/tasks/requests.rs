use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/task.ts")]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    /// 负责该任务的小组成员
    #[serde(default)]
    pub assignee_ids: Vec<i64>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/task.ts")]
pub struct GradeTaskRequest {
    pub student_id: i64,
    pub points: f64,
    pub feedback: Option<String>,
}
