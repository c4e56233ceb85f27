use std::collections::HashSet;
use regex::Regex;
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;
use crate::analysis::collaborators::{
    classify_batched,
    dominant_or_neutral,
    recognize_batched,
    EmotionClassifier,
    EntityRecognizer,
    EntitySpan
};
use crate::models::{CharacterMention, Conf};
use crate::parser::collect_character_names;
use crate::utils::{normalize_character_name, truncate_chars, TEXT_REGEX};

/// 全剧候选角色名，编译为大小写不敏感的整词匹配
#[derive(Debug, Clone, Default)]
pub struct CharacterLexicon {
    entries: Vec<(String, Regex)>,
}

impl CharacterLexicon {
    pub fn new(names: &[String]) -> Self {
        let entries = names
            .iter()
            .filter_map(|name| {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(name));
                Regex::new(&pattern).ok().map(|re| (name.clone(), re))
            })
            .collect();
        CharacterLexicon { entries }
    }

    pub fn from_script(text: &str) -> Self {
        Self::new(&collect_character_names(text))
    }

    /// 句子中出现的候选名（保持剧本中的写法）
    pub fn matches(&self, sentence: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, re)| re.is_match(sentence))
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 场景文本分句：去除首尾空白，丢弃过短的句子，并截断到最大字符数
pub fn split_scene_sentences(text: &str, max_chars: usize) -> Vec<String> {
    text.unicode_sentences()
        .map(str::trim)
        .filter(|s| s.chars().count() > 2)
        .map(|s| truncate_chars(s, max_chars).to_string())
        .collect()
}

/// 合并相邻的人名片段
///
/// 后一个片段紧接前一个（子词，直接拼接）或只隔一个字符（以空格连接）时视为同一个名字
pub fn coalesce_person_spans(spans: &[EntitySpan], min_name_len: usize) -> Vec<String> {
    let mut names = Vec::new();
    let mut current = String::new();
    let mut last_end: Option<usize> = None;

    for span in spans.iter().filter(|s| s.is_person()) {
        let word = span.word.trim();
        if word.is_empty() || TEXT_REGEX["non_word_only"].is_match(word) {
            continue;
        }
        match last_end {
            Some(end) if span.start == end && !current.is_empty() => {
                current.push_str(word.trim_start_matches("##"));
            }
            Some(end) if span.start == end + 1 && !current.is_empty() => {
                current.push(' ');
                current.push_str(word);
            }
            _ => {
                push_name(&mut names, &current, min_name_len);
                current = word.trim_start_matches("##").to_string();
            }
        }
        last_end = Some(span.end);
    }
    push_name(&mut names, &current, min_name_len);
    names
}

fn push_name(names: &mut Vec<String>, raw: &str, min_name_len: usize) {
    if raw.is_empty() {
        return;
    }
    let name = normalize_character_name(raw);
    if name.chars().count() > min_name_len {
        names.push(name);
    }
}

/// 单个场景的角色提及解析
pub struct MentionResolver<'a> {
    lexicon: &'a CharacterLexicon,
    recognizer: &'a dyn EntityRecognizer,
    emotion: &'a dyn EmotionClassifier,
    conf: &'a Conf,
}

impl<'a> MentionResolver<'a> {
    pub fn new(
        lexicon: &'a CharacterLexicon,
        recognizer: &'a dyn EntityRecognizer,
        emotion: &'a dyn EmotionClassifier,
        conf: &'a Conf,
    ) -> Self {
        MentionResolver {
            lexicon,
            recognizer,
            emotion,
            conf,
        }
    }

    /// 每个句子先按候选名匹配；未命中的句子送实体识别。
    /// 每个（角色，句子）产生一个提及，带句子主导情绪
    pub fn resolve(&self, scene_text: &str, heading: &str) -> Vec<CharacterMention> {
        let sentences = split_scene_sentences(scene_text, self.conf.max_sentence_chars);
        if sentences.is_empty() {
            return Vec::new();
        }

        let mut names: Vec<Vec<String>> = sentences.iter().map(|s| self.lexicon.matches(s)).collect();

        let unmatched: Vec<usize> = (0..sentences.len()).filter(|&i| names[i].is_empty()).collect();
        if !unmatched.is_empty() {
            let batch: Vec<String> = unmatched.iter().map(|&i| sentences[i].clone()).collect();
            let spans = recognize_batched(self.recognizer, &batch, self.conf.batch_size);
            for (&i, sentence_spans) in unmatched.iter().zip(spans.iter()) {
                names[i] = coalesce_person_spans(sentence_spans, self.conf.min_name_len);
            }
        }

        let mentioned: Vec<usize> = (0..sentences.len()).filter(|&i| !names[i].is_empty()).collect();
        if mentioned.is_empty() {
            return Vec::new();
        }

        let batch: Vec<String> = mentioned.iter().map(|&i| sentences[i].clone()).collect();
        let emotions = classify_batched(self.emotion, &batch, self.conf.batch_size);

        let total = sentences.len() as f32;
        let mut mentions = Vec::new();
        for (&i, scores) in mentioned.iter().zip(emotions.iter()) {
            let top = dominant_or_neutral(scores);
            let mut seen = HashSet::new();
            for name in &names[i] {
                if !seen.insert(name.as_str()) {
                    continue;
                }
                mentions.push(CharacterMention {
                    name: name.clone(),
                    scene: heading.to_string(),
                    sentence_index: i,
                    position: i as f32 / total,
                    emotion: top.label.clone(),
                    score: top.score,
                    text: sentences[i].clone(),
                });
            }
        }
        debug!(scene = heading, sentences = sentences.len(), mentions = mentions.len(), "角色提及解析完成");
        mentions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contiguous_person_tokens_are_merged() {
        let spans = vec![
            EntitySpan::new("PER", "John", 0, 4, 0.99),
            EntitySpan::new("PER", "Smith", 5, 10, 0.98),
            EntitySpan::new("LOC", "Paris", 14, 19, 0.97),
        ];
        assert_eq!(coalesce_person_spans(&spans, 2), vec!["John Smith"]);
    }

    #[test]
    fn gap_splits_names_and_short_names_are_dropped() {
        let spans = vec![
            EntitySpan::new("B-PER", "anna", 0, 4, 0.9),
            EntitySpan::new("I-PER", "##bel", 4, 7, 0.9),
            EntitySpan::new("B-PER", "Al", 12, 14, 0.9),
            EntitySpan::new("B-PER", "...", 20, 23, 0.9),
            EntitySpan::new("B-PER", "Marcus", 30, 36, 0.9),
        ];
        assert_eq!(coalesce_person_spans(&spans, 2), vec!["Annabel", "Marcus"]);
    }

    #[test]
    fn lexicon_matches_whole_words_case_insensitively() {
        let lexicon = CharacterLexicon::new(&["JOHN".to_string(), "MARY JANE".to_string()]);
        assert_eq!(lexicon.matches("Then john looks at Mary Jane."), vec!["JOHN", "MARY JANE"]);
        assert!(lexicon.matches("Johnny waves.").is_empty());
    }

    #[test]
    fn sentences_are_filtered_and_truncated() {
        let sentences = split_scene_sentences("Hi. No! The long sentence here.", 8);
        assert_eq!(sentences, vec!["Hi.", "No!", "The long"]);
        assert!(split_scene_sentences("  ", 512).is_empty());
    }
}
