use std::collections::HashSet;
use tracing::debug;
use crate::models::SceneBlock;
use crate::utils::{
    is_scene_heading,
    ScreenplayConstants,
    CHARACTER_CANDIDATE_REGEX,
    FRONT_MATTER_REGEX
};

/// 按场景标题把剧本切成场景文本块
///
/// 标题行本身被消费为块的 heading，块文本去除首尾空白，空块丢弃。
/// 第一个标题之前的非空文本使用合成标题；全文没有标题时返回唯一的 `Scene 1`
pub fn segment_scenes(text: &str) -> Vec<SceneBlock> {
    let mut blocks = Vec::new();
    let mut heading: Option<String> = None;
    let mut found_heading = false;
    let mut body_start = 0;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        if is_scene_heading(line) {
            push_block(&mut blocks, heading.take(), &text[body_start..offset]);
            heading = Some(line.trim().to_string());
            found_heading = true;
            body_start = offset + line.len();
        }
        offset += line.len();
    }
    push_block(&mut blocks, heading, &text[body_start..]);

    if !found_heading && blocks.is_empty() {
        blocks.push(SceneBlock::new(synthetic_heading(0), text.trim()));
    }

    debug!(scenes = blocks.len(), found_heading, "场景分割完成");
    blocks
}

fn push_block(blocks: &mut Vec<SceneBlock>, heading: Option<String>, body: &str) {
    let body = body.trim();
    if body.is_empty() {
        return;
    }
    let heading = heading.unwrap_or_else(|| synthetic_heading(blocks.len()));
    blocks.push(SceneBlock::new(heading, body));
}

fn synthetic_heading(index: usize) -> String {
    format!("{} {}", ScreenplayConstants::SYNTHETIC_SCENE_PREFIX, index + 1)
}

/// 收集整篇剧本中的全大写候选角色名（按首次出现顺序去重）
pub fn collect_character_names(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for cap in CHARACTER_CANDIDATE_REGEX.captures_iter(text) {
        let name = match cap.get(1) {
            Some(m) => m.as_str().trim(),
            None => continue,
        };
        if name.chars().count() < 3 || is_scene_heading(name) {
            continue;
        }
        if seen.insert(name.to_string()) {
            names.push(name.to_string());
        }
    }
    names
}

/// 去除第一个场景标题（或第一行正文性质的全大写行）之前的标题页内容
pub fn strip_front_matter(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines
        .iter()
        .position(|line| is_scene_heading(line) || is_content_caps_line(line))
        .unwrap_or(0);
    lines[start..].join("\n")
}

fn is_content_caps_line(line: &str) -> bool {
    FRONT_MATTER_REGEX["all_caps"].is_match(line)
        && !FRONT_MATTER_REGEX["blank"].is_match(line)
        && !FRONT_MATTER_REGEX["short_title"].is_match(line)
        && !FRONT_MATTER_REGEX["credit"].is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_headings() {
        let text = "INT. HOUSE - DAY\nJOHN\nHello.\n\nEXT. STREET - NIGHT\nCars pass.\n";
        let blocks = segment_scenes(text);
        assert_eq!(
            blocks,
            vec![
                SceneBlock::new("INT. HOUSE - DAY", "JOHN\nHello."),
                SceneBlock::new("EXT. STREET - NIGHT", "Cars pass."),
            ]
        );
    }

    #[test]
    fn no_heading_yields_single_synthetic_scene() {
        let blocks = segment_scenes("Just some text.\nMore text.");
        assert_eq!(blocks, vec![SceneBlock::new("Scene 1", "Just some text.\nMore text.")]);
        assert_eq!(segment_scenes("   ").len(), 1);
    }

    #[test]
    fn preamble_and_empty_scenes() {
        let text = "A cold open.\nINT. A - DAY\n\nINT. B - DAY\nSomething.";
        let blocks = segment_scenes(text);
        assert_eq!(
            blocks,
            vec![
                SceneBlock::new("Scene 1", "A cold open."),
                SceneBlock::new("INT. B - DAY", "Something."),
            ]
        );
    }

    #[test]
    fn character_names_exclude_headings() {
        let text = "INT. HOUSE - DAY\nJOHN\nHi.\nMARY (V.O.)\nHey.\nJOHN\nBye.\nAL\nEXT. ALLEY\nTHE END\n";
        assert_eq!(collect_character_names(text), vec!["JOHN", "MARY", "THE END"]);
    }

    #[test]
    fn strips_title_page() {
        let text = "MY FILM\n\nWRITTEN BY\n\nJane Doe\n\nINT. HOUSE - DAY\nJohn sits.";
        assert_eq!(strip_front_matter(text), "INT. HOUSE - DAY\nJohn sits.");
        assert_eq!(strip_front_matter("no headings here"), "no headings here");
    }
}
