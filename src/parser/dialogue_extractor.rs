use serde::Serialize;
use crate::models::DialogueBlock;
use crate::utils::{cue_name, is_scene_heading};

/// 一个场景拆分后的叙述行和对白块
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SceneLines {
    pub narration: Vec<String>,
    pub blocks: Vec<DialogueBlock>,
}

impl SceneLines {
    pub fn dialogue_line_count(&self) -> usize {
        self.blocks.iter().map(|b| b.lines.len()).sum()
    }
}

struct OpenBlock {
    block: DialogueBlock,
    cue_line: String,
    /// 提示行有缩进时，对白须保持缩进，非缩进行结束对白块
    indented: bool,
}

enum Step {
    Skip,
    Append,
    Close,
    CloseToNarration,
    Narration,
}

/// 对白块提示行：至少 3 个字符的全大写角色名，可带扩展
fn dialogue_cue(line: &str) -> Option<String> {
    if is_scene_heading(line) {
        return None;
    }
    cue_name(line).filter(|name| name.chars().count() >= 3)
}

fn is_indented(line: &str) -> bool {
    line.starts_with(|c: char| c == ' ' || c == '\t')
}

/// 按行把场景文本重组为对白块和叙述行
///
/// 没有收集到任何对白的提示行退回为叙述，不丢行
pub fn extract_dialogue(scene_text: &str) -> SceneLines {
    let mut out = SceneLines::default();
    let mut open: Option<OpenBlock> = None;

    for line in scene_text.lines() {
        let blank = line.trim().is_empty();
        if !blank && is_scene_heading(line) {
            continue;
        }

        if !blank {
            if let Some(name) = dialogue_cue(line) {
                close_block(&mut out, open.take());
                open = Some(OpenBlock {
                    block: DialogueBlock::new(name),
                    cue_line: line.trim().to_string(),
                    indented: is_indented(line),
                });
                continue;
            }
        }

        let step = match &open {
            None if blank => Step::Skip,
            None => Step::Narration,
            // 缩进格式下，紧跟提示行的空行忽略
            Some(current) if blank && current.indented && current.block.lines.is_empty() => Step::Skip,
            Some(_) if blank => Step::Close,
            Some(current) if current.indented && !is_indented(line) => Step::CloseToNarration,
            Some(_) => Step::Append,
        };

        match step {
            Step::Skip => {}
            Step::Append => {
                if let Some(current) = open.as_mut() {
                    current.block.lines.push(line.trim().to_string());
                }
            }
            Step::Close => close_block(&mut out, open.take()),
            Step::CloseToNarration => {
                close_block(&mut out, open.take());
                out.narration.push(line.trim().to_string());
            }
            Step::Narration => out.narration.push(line.trim().to_string()),
        }
    }
    close_block(&mut out, open.take());
    out
}

fn close_block(out: &mut SceneLines, open: Option<OpenBlock>) {
    if let Some(OpenBlock { block, cue_line, .. }) = open {
        if block.lines.is_empty() {
            out.narration.push(cue_line);
        } else {
            out.blocks.push(block);
        }
    }
}
