use serde::{Deserialize, Serialize};

/// 场景分割器输出的场景文本块
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneBlock {
    pub heading: String,
    pub text: String,
}

impl SceneBlock {
    pub fn new(heading: impl Into<String>, text: impl Into<String>) -> Self {
        SceneBlock {
            heading: heading.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrationStats {
    pub line_count: usize,
    pub avg_emotion_score: Option<f32>,
}

/// 场景叙述（非对白）部分的分析结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrationAnalysis {
    pub text: String,
    pub emotion: Option<String>,
    pub score: Option<f32>,
    pub summary: String,
    pub stats: NarrationStats,
}

/// 结果中的场景标签，t 为场景在全剧中的进度
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneLabel {
    pub label: String,
    pub t: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narration: Option<NarrationAnalysis>,
}
