use super::waste::WasteEntry;
use serde::{Deserialize, Serialize};

/// 建议请求: 自由文本或从列表中选择
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdviceRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub selected: Option<String>,
    /// 投入量 (kg), 用于估算堆肥产出
    #[serde(default)]
    pub quantity_kg: Option<f64>,
}

/// 命中的废弃物类型
#[derive(Debug, Clone, Serialize)]
pub struct MatchedWaste {
    pub entry: WasteEntry,
    pub score: f64,
}

/// 堆肥产出估算
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompostEstimate {
    pub input_kg: f64,
    pub yield_pct: f64,
    pub output_kg: f64,
}

impl CompostEstimate {
    pub fn new(input_kg: f64, yield_pct: f64) -> Self {
        Self {
            input_kg,
            yield_pct,
            output_kg: input_kg * (yield_pct / 100.0),
        }
    }
}

/// 候选项
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub label: String,
    pub score: f64,
}

/// 建议结果
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Advice {
    Matched {
        matched: MatchedWaste,
        #[serde(skip_serializing_if = "Option::is_none")]
        estimate: Option<CompostEstimate>,
    },
    NoMatch {
        best_score: f64,
        suggestions: Vec<Suggestion>,
    },
}

impl Advice {
    pub fn matched(&self) -> Option<&MatchedWaste> {
        match self {
            Advice::Matched { matched, .. } => Some(matched),
            Advice::NoMatch { .. } => None,
        }
    }
}

/// 可下载的文本报告
#[derive(Debug, Clone)]
pub struct Report {
    pub file_name: String,
    pub body: String,
}
