use serde::{Deserialize, Serialize};

/// 一段对白：角色提示行及其后连续的对白行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueBlock {
    /// 去掉扩展后的提示行文本（未做大小写标准化）
    pub character: String,
    pub lines: Vec<String>,
}

impl DialogueBlock {
    pub fn new(character: impl Into<String>) -> Self {
        DialogueBlock {
            character: character.into(),
            lines: Vec::new(),
        }
    }
}

/// 带情绪的对白行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueLine {
    pub line: String,
    pub emotion: String,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogStats {
    pub line_count: usize,
    pub avg_emotion_score: f32,
}
