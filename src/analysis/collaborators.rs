//! 外部服务接口
//!
//! 实体识别、情绪分类、摘要和图中心度都由外部模型服务提供，这里只定义窄接口。
//! 所有句柄以 `Arc` 显式注入，可在并行的场景分析之间只读共享。

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::warn;
use crate::analysis::network::{AdjacencyGraph, CentralityReport};
use crate::error::{CollaboratorError, CollaboratorResult};
use crate::utils::{truncate_chars, ScreenplayConstants};

/// 实体识别结果中的一个片段，偏移为字符偏移
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub label: String,
    pub word: String,
    pub start: usize,
    pub end: usize,
    pub score: f32,
}

impl EntitySpan {
    pub fn new(label: &str, word: &str, start: usize, end: usize, score: f32) -> Self {
        EntitySpan {
            label: label.to_string(),
            word: word.to_string(),
            start,
            end,
            score,
        }
    }

    /// `PER`、`B-PER`、`I-PER`、`PERSON`
    pub fn is_person(&self) -> bool {
        self.label.ends_with("PER") || self.label.eq_ignore_ascii_case("PERSON")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
    pub label: String,
    pub score: f32,
}

impl EmotionScore {
    pub fn new(label: &str, score: f32) -> Self {
        EmotionScore {
            label: label.to_string(),
            score,
        }
    }

    /// 分类失败或无结果时的兜底情绪
    pub fn neutral() -> Self {
        Self::new(ScreenplayConstants::NEUTRAL_EMOTION, ScreenplayConstants::NEUTRAL_SCORE)
    }
}

/// 取得分最高的情绪；得分相同时取服务输出中先出现的标签
pub fn dominant_emotion(scores: &[EmotionScore]) -> Option<&EmotionScore> {
    let mut best: Option<&EmotionScore> = None;
    for score in scores {
        match best {
            Some(b) if score.score <= b.score => {}
            _ => best = Some(score),
        }
    }
    best
}

/// 主导情绪，标签小写；无结果时为 neutral
pub fn dominant_or_neutral(scores: &[EmotionScore]) -> EmotionScore {
    match dominant_emotion(scores) {
        Some(top) if !top.label.trim().is_empty() => EmotionScore::new(&top.label.to_lowercase(), top.score),
        _ => EmotionScore::neutral(),
    }
}

pub trait EntityRecognizer: Send + Sync {
    /// 每个输入句子对应一组实体片段
    fn recognize(&self, sentences: &[String]) -> CollaboratorResult<Vec<Vec<EntitySpan>>>;
}

pub trait EmotionClassifier: Send + Sync {
    /// 每个输入句子对应完整的情绪得分分布
    fn classify(&self, sentences: &[String]) -> CollaboratorResult<Vec<Vec<EmotionScore>>>;
}

pub trait Summarizer: Send + Sync {
    fn summarize(&self, text: &str, max_len: usize, min_len: usize) -> CollaboratorResult<String>;
}

pub trait CentralityService: Send + Sync {
    fn centrality(&self, graph: &AdjacencyGraph) -> CollaboratorResult<CentralityReport>;
}

/// 不依赖模型的摘要：首行 ... 末行，或截断文本
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackSummarizer;

impl Summarizer for FallbackSummarizer {
    fn summarize(&self, text: &str, max_len: usize, _min_len: usize) -> CollaboratorResult<String> {
        Ok(fallback_summary(text, max_len))
    }
}

pub fn fallback_summary(text: &str, max_len: usize) -> String {
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    match lines.as_slice() {
        [] => String::new(),
        [only] => truncate_chars(only, max_len).to_string(),
        [first, .., last] => format!("{} ... {}", first, last),
    }
}

/// 调用摘要服务，失败时退回 fallback_summary
pub fn summarize_or_fallback(summarizer: &dyn Summarizer, text: &str, max_len: usize, min_len: usize) -> String {
    match summarizer.summarize(text, max_len, min_len) {
        Ok(summary) => summary,
        Err(e) => {
            warn!(error = %e, "摘要服务失败，使用首尾行摘要");
            fallback_summary(text, max_len)
        }
    }
}

/// 注入到分析流程中的外部服务句柄
#[derive(Clone)]
pub struct Collaborators {
    pub recognizer: Arc<dyn EntityRecognizer>,
    pub emotion: Arc<dyn EmotionClassifier>,
    pub summarizer: Arc<dyn Summarizer>,
}

impl Collaborators {
    pub fn new(recognizer: Arc<dyn EntityRecognizer>, emotion: Arc<dyn EmotionClassifier>) -> Self {
        Collaborators {
            recognizer,
            emotion,
            summarizer: Arc::new(FallbackSummarizer),
        }
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = summarizer;
        self
    }
}

fn check_len<T>(result: CollaboratorResult<Vec<T>>, expected: usize) -> CollaboratorResult<Vec<T>> {
    let items = result?;
    if items.len() != expected {
        return Err(CollaboratorError::LengthMismatch { expected, actual: items.len() });
    }
    Ok(items)
}

/// 分批调用实体识别；失败的批次按 “无实体” 处理
pub fn recognize_batched(
    recognizer: &dyn EntityRecognizer,
    sentences: &[String],
    batch_size: usize,
) -> Vec<Vec<EntitySpan>> {
    let mut out = Vec::with_capacity(sentences.len());
    for batch in sentences.chunks(batch_size.max(1)) {
        match check_len(recognizer.recognize(batch), batch.len()) {
            Ok(spans) => out.extend(spans),
            Err(e) => {
                warn!(error = %e, batch = batch.len(), "实体识别失败，该批句子按无实体处理");
                out.extend(batch.iter().map(|_| Vec::new()));
            }
        }
    }
    out
}

/// 分批调用情绪分类；失败的批次得到空分布
pub fn classify_batched(
    classifier: &dyn EmotionClassifier,
    sentences: &[String],
    batch_size: usize,
) -> Vec<Vec<EmotionScore>> {
    let mut out = Vec::with_capacity(sentences.len());
    for batch in sentences.chunks(batch_size.max(1)) {
        match check_len(classifier.classify(batch), batch.len()) {
            Ok(scores) => out.extend(scores),
            Err(e) => {
                warn!(error = %e, batch = batch.len(), "情绪分类失败，该批句子使用 neutral");
                out.extend(batch.iter().map(|_| Vec::new()));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl EmotionClassifier for Broken {
        fn classify(&self, _sentences: &[String]) -> CollaboratorResult<Vec<Vec<EmotionScore>>> {
            Err(CollaboratorError::Unavailable("emotion".to_string()))
        }
    }

    struct Short;

    impl EntityRecognizer for Short {
        fn recognize(&self, _sentences: &[String]) -> CollaboratorResult<Vec<Vec<EntitySpan>>> {
            Ok(vec![vec![EntitySpan::new("PER", "Ann", 0, 3, 0.9)]])
        }
    }

    #[test]
    fn tie_goes_to_first_label() {
        let scores = vec![
            EmotionScore::new("joy", 0.4),
            EmotionScore::new("fear", 0.4),
            EmotionScore::new("anger", 0.2),
        ];
        assert_eq!(dominant_emotion(&scores).unwrap().label, "joy");
        assert_eq!(dominant_or_neutral(&[]), EmotionScore::neutral());
        assert_eq!(dominant_or_neutral(&[EmotionScore::new("JOY", 0.9)]).label, "joy");
    }

    #[test]
    fn failed_batches_degrade() {
        let sentences: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
        let emotions = classify_batched(&Broken, &sentences, 2);
        assert_eq!(emotions, vec![Vec::new(), Vec::new(), Vec::new()]);

        // 返回数量不匹配视为失败
        let spans = recognize_batched(&Short, &sentences, 8);
        assert_eq!(spans.len(), 3);
        assert!(spans.iter().all(|s| s.is_empty()));
    }

    #[test]
    fn fallback_summary_uses_first_and_last_line() {
        assert_eq!(fallback_summary("One.\n\nTwo.\nThree.", 60), "One. ... Three.");
        assert_eq!(fallback_summary("Only one line here", 4), "Only");
        assert_eq!(fallback_summary("  \n ", 10), "");
    }

    #[test]
    fn person_labels() {
        assert!(EntitySpan::new("B-PER", "Ann", 0, 3, 0.9).is_person());
        assert!(EntitySpan::new("PERSON", "Ann", 0, 3, 0.9).is_person());
        assert!(!EntitySpan::new("LOC", "Paris", 0, 5, 0.9).is_person());
    }
}
