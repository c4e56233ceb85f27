use std::time::Instant;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::models::{Segment, SegmentType, SceneRange};
use crate::parser::line_classifier::{classify_line, is_heading_complete, ClassifierContext, LineClass};
use crate::utils::{clean_text, split_sentences};

/// 快速解析结果：有序片段序列和场景区间
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseOutput {
    pub segments: Vec<Segment>,
    pub scenes: Vec<SceneRange>,
    /// 解析耗时（毫秒）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_time: Option<u64>,
}

impl ParseOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// 第 index 个场景的片段；区间越界或倒置时为空
    pub fn scene_segments(&self, index: usize) -> &[Segment] {
        self.scenes
            .get(index)
            .filter(|range| range.start <= range.end)
            .and_then(|range| self.segments.get(range.start..=range.end))
            .unwrap_or(&[])
    }

    pub fn segment_types(&self) -> Vec<SegmentType> {
        self.segments.iter().map(|s| s.segment_type).collect()
    }

    /// 把片段重新拼成剧本文本
    ///
    /// 同一缓冲切出的句子以空格连回一行，对白块内部逐行，其余片段之间插入空行
    pub fn reconstruct_text(&self) -> String {
        let mut out = String::new();
        let mut prev: Option<&Segment> = None;
        for segment in &self.segments {
            if let Some(p) = prev {
                out.push_str(separator(p, segment));
            }
            out.push_str(&segment.text);
            prev = Some(segment);
        }
        out
    }
}

fn separator(prev: &Segment, next: &Segment) -> &'static str {
    use SegmentType::*;
    // 缓冲内非末尾的句子必以句末标点结尾，据此可还原缓冲边界
    let same_buffer = prev.segment_type == next.segment_type
        && matches!(next.segment_type, Dialog | Narration)
        && prev.text.ends_with(['.', '!', '?']);
    if same_buffer {
        " "
    } else if next.segment_type.is_dialogue_part() && matches!(prev.segment_type, CharacterName | Dialog | Support) {
        "\n"
    } else {
        "\n\n"
    }
}

/// 解析器状态：多行标题累积与对白块互斥
#[derive(Debug, Clone, PartialEq)]
enum ParserState {
    Normal,
    Heading(Vec<String>),
    Dialogue,
}

/// 待刷新的对白或叙述缓冲
#[derive(Debug, Default)]
struct PendingBuffer {
    kind: Option<SegmentType>,
    lines: Vec<String>,
}

pub struct StructureParser {
    result: ParseOutput,
    state: ParserState,
    buffer: PendingBuffer,
    scene_start: Option<usize>,
}

impl StructureParser {
    pub fn new() -> Self {
        StructureParser {
            result: ParseOutput::new(),
            state: ParserState::Normal,
            buffer: PendingBuffer::default(),
            scene_start: None,
        }
    }

    /// 解析剧本文本，重建片段序列和场景区间
    pub fn parse(&mut self, script: &str) -> ParseOutput {
        let started = Instant::now();
        self.result = ParseOutput::new();
        self.state = ParserState::Normal;
        self.buffer = PendingBuffer::default();
        self.scene_start = None;

        for raw in script.lines() {
            let text = clean_text(raw);
            self.feed_line(text);
        }
        self.finish();

        self.result.parse_time = Some(started.elapsed().as_millis() as u64);
        debug!(
            segments = self.result.segments.len(),
            scenes = self.result.scenes.len(),
            "结构解析完成"
        );
        std::mem::take(&mut self.result)
    }

    fn context(&self) -> ClassifierContext {
        ClassifierContext {
            in_heading: matches!(self.state, ParserState::Heading(_)),
            in_dialogue: self.state == ParserState::Dialogue,
        }
    }

    fn feed_line(&mut self, text: String) {
        match classify_line(&text, &self.context()) {
            LineClass::Blank => self.on_blank(),
            LineClass::SceneModifier => self.on_scene_modifier(text),
            LineClass::HeadingContinuation => self.on_heading_continuation(text),
            LineClass::HeadingStart { complete } => self.on_heading_start(text, complete),
            LineClass::SceneName => self.on_scene_name(text),
            LineClass::CharacterName => self.on_character_name(text),
            LineClass::Support => self.on_support(text),
            LineClass::Dialog => self.buffer_line(SegmentType::Dialog, text),
            LineClass::Narration => self.buffer_line(SegmentType::Narration, text),
        }
    }

    fn on_blank(&mut self) {
        if matches!(self.state, ParserState::Heading(_)) {
            self.finalize_heading();
        }
        self.flush_buffer();
        self.state = ParserState::Normal;
    }

    fn on_scene_modifier(&mut self, text: String) {
        self.flush_buffer();
        self.push(SegmentType::SceneModifier, text);
        // 多行标题继续累积，对白块结束
        if self.state == ParserState::Dialogue {
            self.state = ParserState::Normal;
        }
    }

    fn on_heading_continuation(&mut self, text: String) {
        let complete = match &mut self.state {
            ParserState::Heading(lines) => {
                lines.push(text);
                is_heading_complete(&lines.join(" "))
            }
            _ => false,
        };
        if complete {
            self.finalize_heading();
        }
    }

    fn on_heading_start(&mut self, text: String, complete: bool) {
        self.state = ParserState::Heading(vec![text]);
        if complete {
            self.finalize_heading();
        }
    }

    fn on_scene_name(&mut self, text: String) {
        self.flush_buffer();
        self.start_scene();
        self.push(SegmentType::SceneName, text);
        self.state = ParserState::Normal;
    }

    fn on_character_name(&mut self, text: String) {
        self.flush_buffer();
        self.push(SegmentType::CharacterName, text);
        self.state = ParserState::Dialogue;
    }

    fn on_support(&mut self, text: String) {
        // 先刷新缓冲，保持文档顺序
        self.flush_buffer();
        self.push(SegmentType::Support, text);
    }

    fn buffer_line(&mut self, kind: SegmentType, text: String) {
        if self.buffer.kind.is_some() && self.buffer.kind != Some(kind) {
            self.flush_buffer();
        }
        self.buffer.kind = Some(kind);
        self.buffer.lines.push(text);
    }

    fn finalize_heading(&mut self) {
        let state = std::mem::replace(&mut self.state, ParserState::Normal);
        if let ParserState::Heading(lines) = state {
            if lines.is_empty() {
                return;
            }
            let heading = clean_text(&lines.join(" "));
            self.flush_buffer();
            self.start_scene();
            self.push(SegmentType::SceneName, heading);
        }
    }

    /// 关闭上一个场景区间，并在当前片段数处开启新场景
    fn start_scene(&mut self) {
        self.close_scene();
        self.scene_start = Some(self.result.segments.len());
    }

    fn close_scene(&mut self) {
        if let Some(start) = self.scene_start.take() {
            let count = self.result.segments.len();
            if count > start {
                self.result.scenes.push(SceneRange { start, end: count - 1 });
            }
        }
    }

    fn flush_buffer(&mut self) {
        let buffer = std::mem::take(&mut self.buffer);
        let kind = match buffer.kind {
            Some(kind) => kind,
            None => return,
        };
        if buffer.lines.is_empty() {
            return;
        }
        let block = clean_text(&buffer.lines.join(" "));
        for sentence in split_sentences(&block) {
            self.push(kind, sentence);
        }
    }

    fn push(&mut self, segment_type: SegmentType, text: String) {
        self.result.segments.push(Segment::new(segment_type, text));
    }

    fn finish(&mut self) {
        if matches!(self.state, ParserState::Heading(_)) {
            self.finalize_heading();
        }
        self.flush_buffer();
        self.close_scene();
        self.state = ParserState::Normal;
    }
}

impl Default for StructureParser {
    fn default() -> Self {
        Self::new()
    }
}

/// 便捷函数：不调用任何外部服务的结构预览
pub fn parse_structure(script: &str) -> ParseOutput {
    StructureParser::new().parse(script)
}

#[cfg(test)]
mod tests {
    use super::*;
    use SegmentType::*;

    #[test]
    fn two_scene_scenario() {
        let output = parse_structure(
            "INT. HOUSE - DAY\nJOHN\nHello there.\n\nEXT. STREET - NIGHT\nAction happens.",
        );
        assert_eq!(output.scenes.len(), 2);
        assert_eq!(
            output.scene_segments(0).to_vec(),
            vec![
                Segment::new(SceneName, "INT. HOUSE - DAY"),
                Segment::new(CharacterName, "JOHN"),
                Segment::new(Dialog, "Hello there."),
            ]
        );
        assert_eq!(
            output.scene_segments(1).to_vec(),
            vec![
                Segment::new(SceneName, "EXT. STREET - NIGHT"),
                Segment::new(Narration, "Action happens."),
            ]
        );
    }

    #[test]
    fn multi_line_heading_accumulates_until_terminator() {
        let output = parse_structure("INT. OLD WAREHOUSE\nBACK OFFICE --\nRain hits the roof.");
        assert_eq!(output.segments[0], Segment::new(SceneName, "INT. OLD WAREHOUSE BACK OFFICE --"));
        assert_eq!(output.segments[1], Segment::new(Narration, "Rain hits the roof."));
        assert_eq!(output.scenes, vec![SceneRange { start: 0, end: 1 }]);
    }

    #[test]
    fn blank_line_finalizes_pending_heading() {
        let output = parse_structure("EXT. ROOFTOP\n\nWind howls.");
        assert_eq!(output.segment_types(), vec![SceneName, Narration]);
        assert_eq!(output.segments[0].text, "EXT. ROOFTOP");
    }

    #[test]
    fn heading_at_end_of_input_is_finalized() {
        let output = parse_structure("Some narration.\nINT. ATTIC");
        assert_eq!(output.segment_types(), vec![Narration, SceneName]);
        assert_eq!(output.scenes, vec![SceneRange { start: 1, end: 1 }]);
    }

    #[test]
    fn narration_buffer_is_split_into_sentences() {
        let output = parse_structure("INT. LAB - NIGHT\nThe door opens. A man\nenters! Is he armed?");
        let texts: Vec<_> = output.segments.iter().skip(1).map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["The door opens.", "A man enters!", "Is he armed?"]);
    }

    #[test]
    fn support_lines_inside_and_outside_dialogue() {
        let output = parse_structure("MARY\n(whispering)\nCome here.\n\nShe waits.\n(beat)\nNothing.");
        assert_eq!(
            output.segment_types(),
            vec![CharacterName, Support, Dialog, Narration, Support, Narration]
        );
    }

    #[test]
    fn modifiers_and_scene_names() {
        let output = parse_structure("FADE IN:\n\nSPACE.\nStars drift.\n\nCUT TO:\n\n1.");
        assert_eq!(
            output.segment_types(),
            vec![SceneModifier, SceneName, Narration, SceneModifier, SceneModifier]
        );
        // 场景前的修饰行不属于任何场景
        assert_eq!(output.scenes, vec![SceneRange { start: 1, end: 4 }]);
    }

    #[test]
    fn scene_boundary_ends_dialogue() {
        let output = parse_structure("JOHN\nWait for me\nINT. CAR - DAY\nMARY\nNo.");
        assert_eq!(
            output.segment_types(),
            vec![CharacterName, Dialog, SceneName, CharacterName, Dialog]
        );
    }

    #[test]
    fn empty_script() {
        let output = parse_structure("");
        assert!(output.segments.is_empty());
        assert!(output.scenes.is_empty());
    }

    #[test]
    fn reconstruct_keeps_dialogue_group_together() {
        let output = parse_structure("INT. HOUSE - DAY\nJOHN\n(softly)\nHi. Bye.\n\nHe leaves.");
        assert_eq!(
            output.reconstruct_text(),
            "INT. HOUSE - DAY\n\nJOHN\n(softly)\nHi. Bye.\n\nHe leaves."
        );
    }

    fn assert_reparse_stable(script: &str) {
        let first = parse_structure(script);
        let second = parse_structure(&first.reconstruct_text());
        assert_eq!(first.segments, second.segments);
        assert_eq!(first.scenes, second.scenes);
    }

    #[test]
    fn uppercase_sentence_stays_in_its_buffer() {
        let output = parse_structure("INT. LAB - NIGHT\nThe door opens. HE RUNS.");
        assert_eq!(output.segment_types(), vec![SceneName, Narration, Narration]);
        assert_eq!(output.reconstruct_text(), "INT. LAB - NIGHT\n\nThe door opens. HE RUNS.");
        assert_reparse_stable("INT. LAB - NIGHT\nThe door opens. HE RUNS.");

        let dialogue = "INT. LAB - NIGHT\nJOHN\nNO WAY. Go away.";
        assert_eq!(
            parse_structure(dialogue).segment_types(),
            vec![SceneName, CharacterName, Dialog, Dialog]
        );
        assert_reparse_stable(dialogue);
    }

    #[test]
    fn separate_buffers_stay_separate() {
        // 第一段末句没有句末标点，合并会改变切句结果
        assert_reparse_stable("INT. LAB - NIGHT\nA man waits\n\nHe sits. THEN NOTHING.\n\nJOHN\nWell\n(beat)\nOK. FINE.");
    }

    #[test]
    fn malformed_ranges_yield_no_segments() {
        let mut output = parse_structure("INT. HOUSE - DAY\nHi.");
        output.scenes.push(SceneRange { start: 1, end: 9 });
        output.scenes.push(SceneRange { start: 1, end: 0 });
        assert!(output.scene_segments(1).is_empty());
        assert!(output.scene_segments(2).is_empty());
        assert_eq!(output.scenes[2].len(), 0);
        assert_eq!(output.scene_segments(0).len(), 2);
    }
}
