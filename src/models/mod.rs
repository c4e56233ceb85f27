pub mod segment;
pub mod scene;
pub mod dialogue;
pub mod character;
pub mod analysis;
pub mod conf;

pub use segment::{Segment, SegmentType, SceneRange};
pub use scene::{SceneBlock, SceneLabel, NarrationAnalysis, NarrationStats};
pub use dialogue::{DialogueBlock, DialogueLine, DialogStats};
pub use character::{CharacterMention, CharacterTimeline, EmotionPoint, OrderedMap};
pub use analysis::ScriptAnalysis;
pub use conf::Conf;
