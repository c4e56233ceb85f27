pub mod models;
pub mod utils;
pub mod parser;
pub mod analysis;
pub mod error;
pub mod api;

pub use models::{
    Segment,
    SegmentType,
    SceneRange,
    SceneBlock,
    SceneLabel,
    DialogueBlock,
    DialogueLine,
    CharacterMention,
    CharacterTimeline,
    ScriptAnalysis,
    Conf
};

pub use parser::{
    ParseOutput,
    StructureParser,
    segment_scenes,
    extract_dialogue,
    collect_character_names
};

pub use analysis::{
    Collaborators,
    EntityRecognizer,
    EmotionClassifier,
    Summarizer,
    CentralityService,
    ScriptAnalyzer,
    network_metrics
};

pub use error::{ScriptError, ScriptResult, CollaboratorError, CollaboratorResult};

pub use api::{
    load_script,
    parse_script,
    parse_script_text,
    analyze_script,
    analyze_script_json,
    analyze_script_file
};

/// 快速解析剧本文本
///
/// # Arguments
///
/// * `script` - 剧本纯文本
///
/// # Returns
///
/// 片段序列和场景区间
pub fn parse(script: &str) -> ParseOutput {
    parse_script(script)
}
