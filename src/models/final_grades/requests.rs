use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/final-grade.ts")]
pub struct RecalculateFinalGradeRequest {
    /// 总评语；为空时保留已有评语
    pub feedback: Option<String>,
}
