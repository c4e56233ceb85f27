use serde::{Deserialize, Serialize};

/// 结构片段类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentType {
    #[serde(rename = "directive:scene-name")]
    SceneName,
    #[serde(rename = "directive:scene-modifier")]
    SceneModifier,
    #[serde(rename = "directive:character-name")]
    CharacterName,
    #[serde(rename = "content:support")]
    Support,
    #[serde(rename = "content:dialog")]
    Dialog,
    #[serde(rename = "content:narration")]
    Narration,
}

impl SegmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentType::SceneName => "directive:scene-name",
            SegmentType::SceneModifier => "directive:scene-modifier",
            SegmentType::CharacterName => "directive:character-name",
            SegmentType::Support => "content:support",
            SegmentType::Dialog => "content:dialog",
            SegmentType::Narration => "content:narration",
        }
    }

    /// 对白块内的类型（角色名之后的对白和括号说明）
    pub fn is_dialogue_part(&self) -> bool {
        matches!(self, SegmentType::Dialog | SegmentType::Support)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(rename = "type")]
    pub segment_type: SegmentType,
    pub text: String,
}

impl Segment {
    pub fn new(segment_type: SegmentType, text: impl Into<String>) -> Self {
        Segment {
            segment_type,
            text: text.into(),
        }
    }
}

/// 一个场景在片段序列中的闭区间 [start, end]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneRange {
    pub start: usize,
    pub end: usize,
}

impl SceneRange {
    /// 倒置的区间长度为 0
    pub fn len(&self) -> usize {
        (self.end + 1).saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
