pub mod line_classifier;
pub mod structure_parser;
pub mod scene_segmenter;
pub mod dialogue_extractor;

pub use line_classifier::{classify_line, is_heading_complete, ClassifierContext, LineClass};
pub use structure_parser::{parse_structure, ParseOutput, StructureParser};
pub use scene_segmenter::{collect_character_names, segment_scenes, strip_front_matter};
pub use dialogue_extractor::{extract_dialogue, SceneLines};
