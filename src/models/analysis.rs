use serde::Serialize;
use crate::models::character::{serialize_timelines, CharacterTimeline};
use crate::models::scene::SceneLabel;

/// 全剧叙事分析结果
#[derive(Debug, Clone, Serialize)]
pub struct ScriptAnalysis {
    pub scenes: Vec<SceneLabel>,
    #[serde(serialize_with = "serialize_timelines")]
    pub characters: Vec<CharacterTimeline>,
    /// 生成时间（RFC 3339）
    pub generated_at: String,
}

impl ScriptAnalysis {
    pub fn character(&self, name: &str) -> Option<&CharacterTimeline> {
        self.characters.iter().find(|c| c.name == name)
    }

    pub fn character_names(&self) -> Vec<&str> {
        self.characters.iter().map(|c| c.name.as_str()).collect()
    }
}
