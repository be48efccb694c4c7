use super::entities::{Evaluation, StudentAggregate};
use serde::Serialize;
use ts_rs::TS;

/// 单个学生的期末成绩：实时汇总与快照并列返回
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/final-grade.ts")]
pub struct FinalGradeResponse {
    pub group_id: i64,
    pub student_id: i64,
    pub live: Option<StudentAggregate>,
    pub snapshot: Option<Evaluation>,
    /// 快照存在且与实时汇总不一致
    pub stale: bool,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/final-grade.ts")]
pub struct EvaluationListResponse {
    pub items: Vec<Evaluation>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/final-grade.ts")]
pub struct RecalculationFailure {
    pub group_id: i64,
    pub student_id: i64,
    pub error: String,
}

/// 批量重算结果
#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/final-grade.ts")]
pub struct RecalculationReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: Vec<RecalculationFailure>,
}
