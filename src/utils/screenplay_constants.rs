use std::collections::HashMap;
use lazy_static::lazy_static;
use regex::Regex;

pub struct ScreenplayConstants;

impl ScreenplayConstants {
    /// 场景标题前缀（大小写不敏感）
    pub const SCENE_HEADING_PREFIXES: [&'static str; 7] = [
        "INT.", "EXT.", "EST.", "INT/EXT.", "I/E.", "INT-EXT.", "EXT-INT.",
    ];

    /// 没有任何场景标题时使用的合成标题前缀
    pub const SYNTHETIC_SCENE_PREFIX: &'static str = "Scene";

    /// 情绪分类失败或无结果时的兜底标签
    pub const NEUTRAL_EMOTION: &'static str = "neutral";
    pub const NEUTRAL_SCORE: f32 = 0.5;

    /// 颜色表为空时使用
    pub const FALLBACK_COLOR: &'static str = "#808080";

    // 角色显示颜色表，按角色首次出现顺序取模
    pub fn palette() -> Vec<&'static str> {
        vec![
            "#f54242", "#4287f5", "#42f554", "#f5e142", "#a142f5",
            "#f57e42", "#42f5e6", "#e642f5", "#f542a7", "#42f5b9",
            "#b9f542", "#f5b942", "#42b9f5", "#b942f5", "#f54242",
        ]
    }
}

lazy_static! {
    // 场景标题判定，整个 crate 只有这一处定义
    pub static ref SCENE_HEADING_REGEX: Regex = {
        let prefixes: Vec<String> = ScreenplayConstants::SCENE_HEADING_PREFIXES
            .iter()
            .map(|p| regex::escape(p))
            .collect();
        Regex::new(&format!(r"(?i)^\s*({})", prefixes.join("|"))).unwrap()
    };

    // 行分类正则
    pub static ref LINE_REGEX: HashMap<&'static str, Regex> = {
        let mut map = HashMap::new();
        map.insert("scene_modifier", Regex::new(r"^[A-Z0-9 \-]+:$").unwrap());
        map.insert("shot_number", Regex::new(r"^\d+\.$").unwrap());
        map.insert("heading_end", Regex::new(r"(\.|--|:)$").unwrap());
        // 已包含 “地点 - 时间” 的标题视为完整
        map.insert("heading_time_of_day", Regex::new(r"\S\s+[\-–—−]+\s*[A-Z0-9][A-Z0-9' ]*$").unwrap());
        map.insert("scene_name", Regex::new(r"^[A-Z0-9 \-]+\.$").unwrap());
        map.insert("cue_name", Regex::new(r"^[A-Z][A-Z0-9 '\-]*$").unwrap());
        map.insert("character_extension", Regex::new(r"[ \t]*(\(.*\)|（.*）)[ \t]*([ \t]*\^)?$").unwrap());
        map.insert("dual_marker", Regex::new(r"[ \t]*\^$").unwrap());
        map.insert("parenthetical", Regex::new(r"^\(.*\)$").unwrap());
        map
    };

    // 文本处理正则
    pub static ref TEXT_REGEX: HashMap<&'static str, Regex> = {
        let mut map = HashMap::new();
        map.insert("whitespace", Regex::new(r"\s+").unwrap());
        map.insert("sentence_end", Regex::new(r"[.!?]\s+").unwrap());
        map.insert("edge_non_word", Regex::new(r"^\W+|\W+$").unwrap());
        map.insert("non_word_only", Regex::new(r"^[\s\W_]*$").unwrap());
        map
    };

    // 整篇剧本中的候选角色名（行首全大写，后接逗号、括号或行尾）
    pub static ref CHARACTER_CANDIDATE_REGEX: Regex =
        Regex::new(r"(?m)^[ \t]*([A-Z][A-Z0-9\-' ]{2,})(?:,|\(|$)").unwrap();

    // 标题页（front matter）识别
    pub static ref FRONT_MATTER_REGEX: HashMap<&'static str, Regex> = {
        let mut map = HashMap::new();
        map.insert("blank", Regex::new(r"^\s*$").unwrap());
        map.insert("short_title", Regex::new(r#"^\s*[A-Z0-9 "']{1,30}$"#).unwrap());
        map.insert("credit", Regex::new(r"^\s*(WRITTEN BY|STORY BY|BY|SCREENPLAY BY|MARCH \d{1,2} \d{4})\s*$").unwrap());
        map.insert("all_caps", Regex::new(r"^\s*[A-Z0-9 .,!?:'\-]{2,}$").unwrap());
        map
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_prefix_is_case_insensitive() {
        assert!(SCENE_HEADING_REGEX.is_match("INT. HOUSE - DAY"));
        assert!(SCENE_HEADING_REGEX.is_match("  ext. street"));
        assert!(SCENE_HEADING_REGEX.is_match("I/E. CAR - MOVING"));
        assert!(!SCENE_HEADING_REGEX.is_match("INTERIOR DESIGN"));
    }

    #[test]
    fn time_of_day_marks_heading_complete() {
        let re = &LINE_REGEX["heading_time_of_day"];
        assert!(re.is_match("INT. HOUSE - DAY"));
        assert!(re.is_match("EXT. STREET -- NIGHT"));
        assert!(!re.is_match("INT. HOUSE"));
        assert!(!re.is_match("INT. HOUSE -"));
    }
}
