use tracing::debug;
use crate::analysis::collaborators::{
    classify_batched,
    dominant_or_neutral,
    summarize_or_fallback,
    Collaborators
};
use crate::analysis::mention_resolver::{CharacterLexicon, MentionResolver};
use crate::models::{
    CharacterMention,
    Conf,
    DialogStats,
    DialogueBlock,
    DialogueLine,
    NarrationAnalysis,
    NarrationStats,
    OrderedMap,
    SceneBlock
};
use crate::parser::extract_dialogue;
use crate::utils::truncate_chars;

/// 单个场景的分析结果
#[derive(Debug, Clone, Default)]
pub struct SceneAnalysis {
    pub heading: String,
    /// 按说话人分组的带情绪对白行
    pub dialog: OrderedMap<Vec<DialogueLine>>,
    pub mentions: Vec<CharacterMention>,
    pub narration: Option<NarrationAnalysis>,
}

impl SceneAnalysis {
    pub fn empty(heading: &str) -> Self {
        SceneAnalysis {
            heading: heading.to_string(),
            ..Default::default()
        }
    }

    pub fn dialog_stats(&self) -> OrderedMap<DialogStats> {
        let mut stats = OrderedMap::new();
        for (speaker, lines) in self.dialog.iter() {
            if lines.is_empty() {
                continue;
            }
            let total: f32 = lines.iter().map(|l| l.score).sum();
            stats.insert(speaker, DialogStats {
                line_count: lines.len(),
                avg_emotion_score: total / lines.len() as f32,
            });
        }
        stats
    }
}

pub struct SceneAnalyzer<'a> {
    collaborators: &'a Collaborators,
    lexicon: &'a CharacterLexicon,
    conf: &'a Conf,
}

impl<'a> SceneAnalyzer<'a> {
    pub fn new(collaborators: &'a Collaborators, lexicon: &'a CharacterLexicon, conf: &'a Conf) -> Self {
        SceneAnalyzer {
            collaborators,
            lexicon,
            conf,
        }
    }

    /// 空白场景直接返回空结果，不调用任何外部服务
    pub fn analyze(&self, scene: &SceneBlock) -> SceneAnalysis {
        if scene.text.trim().is_empty() {
            return SceneAnalysis::empty(&scene.heading);
        }

        let lines = extract_dialogue(&scene.text);
        let dialog = self.score_dialogue(&lines.blocks);
        let narration = self.analyze_narration(&lines.narration);
        let mentions = MentionResolver::new(
            self.lexicon,
            self.collaborators.recognizer.as_ref(),
            self.collaborators.emotion.as_ref(),
            self.conf,
        )
        .resolve(&scene.text, &scene.heading);

        debug!(
            scene = %scene.heading,
            blocks = lines.blocks.len(),
            mentions = mentions.len(),
            "场景分析完成"
        );
        SceneAnalysis {
            heading: scene.heading.clone(),
            dialog,
            mentions,
            narration,
        }
    }

    /// 每行对白一次情绪分类（分批）
    fn score_dialogue(&self, blocks: &[DialogueBlock]) -> OrderedMap<Vec<DialogueLine>> {
        let mut speakers = Vec::new();
        let mut texts = Vec::new();
        for block in blocks {
            for line in block.lines.iter().filter(|l| !l.trim().is_empty()) {
                speakers.push(block.character.as_str());
                texts.push(line.clone());
            }
        }

        let mut dialog = OrderedMap::new();
        if texts.is_empty() {
            return dialog;
        }

        let inputs: Vec<String> = texts
            .iter()
            .map(|t| truncate_chars(t, self.conf.max_sentence_chars).to_string())
            .collect();
        let emotions = classify_batched(self.collaborators.emotion.as_ref(), &inputs, self.conf.batch_size);

        for ((speaker, line), scores) in speakers.into_iter().zip(texts).zip(emotions.iter()) {
            let top = dominant_or_neutral(scores);
            dialog.get_or_insert_with(speaker, Vec::new).push(DialogueLine {
                line,
                emotion: top.label,
                score: top.score,
            });
        }
        dialog
    }

    fn analyze_narration(&self, narration: &[String]) -> Option<NarrationAnalysis> {
        let lines: Vec<&str> = narration.iter().map(String::as_str).filter(|l| !l.trim().is_empty()).collect();
        if lines.is_empty() {
            return None;
        }
        let text = lines.join("\n");

        let input = vec![truncate_chars(&text, self.conf.max_sentence_chars).to_string()];
        let scores = classify_batched(self.collaborators.emotion.as_ref(), &input, 1);
        let top = scores.first().map(|s| dominant_or_neutral(s));

        let summary = summarize_or_fallback(
            self.collaborators.summarizer.as_ref(),
            &text,
            self.conf.summary_max_len,
            self.conf.summary_min_len,
        );

        Some(NarrationAnalysis {
            emotion: top.as_ref().map(|t| t.label.clone()),
            score: top.as_ref().map(|t| t.score),
            summary,
            stats: NarrationStats {
                line_count: lines.len(),
                avg_emotion_score: top.as_ref().map(|t| t.score),
            },
            text,
        })
    }
}
