use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::tasks::entities::TaskGrade;

/// 两个分数视为相同的容差
const POINTS_EPSILON: f64 = 1e-9;

/// 学生在某小组内的任务成绩汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/final-grade.ts")]
pub struct StudentAggregate {
    pub total_points: f64,
    pub graded_task_count: i64,
    pub task_grades: Vec<TaskGrade>,
}

impl StudentAggregate {
    /// 汇总评分；没有任何已评分任务时返回 `None`
    pub fn from_grades(mut grades: Vec<TaskGrade>) -> Option<Self> {
        if grades.is_empty() {
            return None;
        }

        // 固定求和顺序，保证重复计算得到完全相同的浮点结果
        grades.sort_by_key(|g| (g.task_id, g.id));
        let total_points: f64 = grades.iter().map(|g| g.points).sum();

        Some(Self {
            total_points,
            graded_task_count: grades.len() as i64,
            task_grades: grades,
        })
    }
}

/// 期末评价快照，按 (小组, 学生) 唯一
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/final-grade.ts")]
pub struct Evaluation {
    pub id: i64,
    pub group_id: i64,
    pub student_id: i64,
    pub total_points: f64,
    pub graded_task_count: i64,
    pub feedback: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Evaluation {
    /// 快照与实时汇总是否一致
    pub fn matches(&self, aggregate: Option<&StudentAggregate>) -> bool {
        match aggregate {
            Some(live) => {
                (self.total_points - live.total_points).abs() < POINTS_EPSILON
                    && self.graded_task_count == live.graded_task_count
            }
            None => false,
        }
    }
}
