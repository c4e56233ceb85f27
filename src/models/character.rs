use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use crate::models::dialogue::{DialogStats, DialogueLine};

/// 句子中出现的一次角色提及
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterMention {
    #[serde(skip)]
    pub name: String,
    pub scene: String,
    #[serde(rename = "sentenceIndex")]
    pub sentence_index: usize,
    /// 句子序号 / 场景句子总数，取值 [0, 1)
    pub position: f32,
    pub emotion: String,
    #[serde(rename = "sentiment")]
    pub score: f32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionPoint {
    pub position: f32,
    pub emotion: String,
    pub scene: String,
}

impl From<&CharacterMention> for EmotionPoint {
    fn from(mention: &CharacterMention) -> Self {
        EmotionPoint {
            position: mention.position,
            emotion: mention.emotion.clone(),
            scene: mention.scene.clone(),
        }
    }
}

/// 保持插入顺序的字符串键映射（场景标题、角色名）
///
/// 相同的键合并到同一项下
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        OrderedMap { entries: Vec::new() }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_or_insert_with(&mut self, key: &str, f: impl FnOnce() -> V) -> &mut V {
        let idx = match self.entries.iter().position(|(k, _)| k == key) {
            Some(idx) => idx,
            None => {
                self.entries.push((key.to_string(), f()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    pub fn insert(&mut self, key: &str, value: V) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// 单个角色贯穿全剧的时间线
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterTimeline {
    #[serde(skip)]
    pub name: String,
    pub color: String,
    pub appearances: Vec<CharacterMention>,
    #[serde(rename = "emotionTimeline")]
    pub emotion_timeline: Vec<EmotionPoint>,
    pub dialog: OrderedMap<Vec<DialogueLine>>,
    pub dialog_stats: OrderedMap<DialogStats>,
}

impl CharacterTimeline {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        CharacterTimeline {
            name: name.into(),
            color: color.into(),
            appearances: Vec::new(),
            emotion_timeline: Vec::new(),
            dialog: OrderedMap::new(),
            dialog_stats: OrderedMap::new(),
        }
    }

    pub fn dialog_line_count(&self) -> usize {
        self.dialog.iter().map(|(_, lines)| lines.len()).sum()
    }

    /// 既没有出场也没有对白的角色不输出
    pub fn is_empty(&self) -> bool {
        self.appearances.is_empty() && self.dialog_line_count() == 0
    }
}

/// 按首次出现顺序把角色序列化为 JSON 对象
pub fn serialize_timelines<S: Serializer>(
    timelines: &[CharacterTimeline],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(timelines.len()))?;
    for timeline in timelines {
        map.serialize_entry(&timeline.name, timeline)?;
    }
    map.end()
}
