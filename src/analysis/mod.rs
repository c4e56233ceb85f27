pub mod collaborators;
pub mod mention_resolver;
pub mod scene_analyzer;
pub mod aggregator;
pub mod network;
pub mod script_analyzer;

pub use collaborators::{
    Collaborators,
    EntityRecognizer,
    EmotionClassifier,
    Summarizer,
    CentralityService,
    EntitySpan,
    EmotionScore,
    FallbackSummarizer
};
pub use mention_resolver::{CharacterLexicon, MentionResolver};
pub use scene_analyzer::{SceneAnalysis, SceneAnalyzer};
pub use aggregator::NarrativeAggregator;
pub use network::{network_metrics, AdjacencyGraph, CentralityReport, Edge, LocalCentrality, NodeCentrality};
pub use script_analyzer::ScriptAnalyzer;
