use crate::utils::{
    cue_name,
    is_parenthetical,
    is_scene_heading,
    is_uppercase_line,
    LINE_REGEX
};

/// 分类时携带的状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifierContext {
    /// 正在累积多行场景标题
    pub in_heading: bool,
    /// 正在对白块内
    pub in_dialogue: bool,
}

/// 单行的分类结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// 空行：刷新缓冲，结束多行标题，结束对白块
    Blank,
    /// 转场、镜头号等（`CUT TO:`、`12.`）
    SceneModifier,
    /// 多行标题的后续行
    HeadingContinuation,
    /// 以场景前缀开头的行；complete 表示本行已是完整标题
    HeadingStart { complete: bool },
    /// 全大写并以句号结尾的单行场景名（`SPACE.`）
    SceneName,
    CharacterName,
    Support,
    Dialog,
    Narration,
}

/// 按优先级对一行（已 clean_text）分类，先匹配者胜出
pub fn classify_line(text: &str, ctx: &ClassifierContext) -> LineClass {
    if text.is_empty() {
        return LineClass::Blank;
    }

    if is_scene_modifier(text) {
        return LineClass::SceneModifier;
    }

    if ctx.in_heading {
        return LineClass::HeadingContinuation;
    }

    if is_scene_heading(text) {
        return LineClass::HeadingStart { complete: is_heading_complete(text) };
    }

    if LINE_REGEX["scene_name"].is_match(text) && is_uppercase_line(text) {
        return LineClass::SceneName;
    }

    if !ctx.in_dialogue && cue_name(text).is_some() {
        return LineClass::CharacterName;
    }

    if ctx.in_dialogue {
        if is_parenthetical(text) {
            return LineClass::Support;
        }
        return LineClass::Dialog;
    }

    if is_parenthetical(text) {
        LineClass::Support
    } else {
        LineClass::Narration
    }
}

fn is_scene_modifier(text: &str) -> bool {
    (LINE_REGEX["scene_modifier"].is_match(text) && is_uppercase_line(text))
        || LINE_REGEX["shot_number"].is_match(text)
}

/// 标题以 `.`、`--`、`:` 结尾，或已写明 “地点 - 时间”，即视为完整
pub fn is_heading_complete(heading: &str) -> bool {
    LINE_REGEX["heading_end"].is_match(heading) || LINE_REGEX["heading_time_of_day"].is_match(heading)
}
