use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 任务状态：done → graded，申诉期间为 appeal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/task.ts")]
pub enum TaskStatus {
    Done,
    Graded,
    Appeal,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Done => write!(f, "done"),
            TaskStatus::Graded => write!(f, "graded"),
            TaskStatus::Appeal => write!(f, "appeal"),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "done" => Ok(TaskStatus::Done),
            "graded" => Ok(TaskStatus::Graded),
            "appeal" => Ok(TaskStatus::Appeal),
            _ => Err(format!("Invalid task status: {s}")),
        }
    }
}

// 小组任务
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/task.ts")]
pub struct Task {
    pub id: i64,
    pub group_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub created_by: i64,
    pub assignee_ids: Vec<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Task {
    pub fn is_assignee(&self, user_id: i64) -> bool {
        self.assignee_ids.contains(&user_id)
    }
}

// (任务, 学生) 评分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/task.ts")]
pub struct TaskGrade {
    pub id: i64,
    pub task_id: i64,
    pub student_id: i64,
    pub grader_id: i64,
    pub points: f64,
    pub feedback: Option<String>,
    pub graded_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 写入一条评分所需的数据
#[derive(Debug, Clone)]
pub struct TaskGradeInput {
    pub task_id: i64,
    pub student_id: i64,
    pub grader_id: i64,
    pub points: f64,
    pub feedback: Option<String>,
}
