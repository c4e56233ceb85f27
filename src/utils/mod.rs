pub mod screenplay_constants;

pub use screenplay_constants::{
    ScreenplayConstants,
    SCENE_HEADING_REGEX,
    LINE_REGEX,
    TEXT_REGEX,
    CHARACTER_CANDIDATE_REGEX,
    FRONT_MATTER_REGEX
};

/// 检查一行文本是否以场景标题前缀开头（INT. / EXT. / EST. ...）
///
/// 结构状态机和场景分割器共用此判定
pub fn is_scene_heading(text: &str) -> bool {
    SCENE_HEADING_REGEX.is_match(text)
}

/// 去除首尾空白，并把连续空白压缩为一个空格
pub fn clean_text(text: &str) -> String {
    TEXT_REGEX["whitespace"].replace_all(text.trim(), " ").to_string()
}

/// 按句末标点（. ! ?）后的空白切分句子
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut last = 0;
    for m in TEXT_REGEX["sentence_end"].find_iter(text) {
        // 标点均为单字节字符
        let cut = m.start() + 1;
        sentences.push(clean_text(&text[last..cut]));
        last = m.end();
    }
    sentences.push(clean_text(&text[last..]));
    sentences.retain(|s| !s.is_empty());
    sentences
}

/// 整行是否为全大写（不含小写字母）
pub fn is_uppercase_line(text: &str) -> bool {
    text == text.to_uppercase()
}

/// 整行是否被括号包裹，例如 `(beat)`
pub fn is_parenthetical(text: &str) -> bool {
    LINE_REGEX["parenthetical"].is_match(text)
}

/// 去除角色名后的扩展部分，例如 `BOB (V.O.)` -> `BOB`
pub fn trim_character_extension(text: &str) -> String {
    let no_ext = LINE_REGEX["character_extension"].replace(text, "");
    LINE_REGEX["dual_marker"].replace(&no_ext, "").trim().to_string()
}

/// 若该行是角色提示行则返回角色名
///
/// 角色名部分须全大写，由字母、数字、撇号、连字符和空格组成，可带括号扩展
pub fn cue_name(line: &str) -> Option<String> {
    let text = line.trim();
    if text.is_empty() || !is_uppercase_line(text) || is_parenthetical(text) {
        return None;
    }
    let name = trim_character_extension(text);
    if LINE_REGEX["cue_name"].is_match(&name) {
        Some(name)
    } else {
        None
    }
}

/// 标准化 NER 识别出的人名：压缩空白、去除首尾非单词字符、各单词首字母大写
pub fn normalize_character_name(name: &str) -> String {
    let collapsed = clean_text(name);
    let trimmed = TEXT_REGEX["edge_non_word"].replace_all(&collapsed, "");
    trimmed
        .split(' ')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

/// 统一换行：CRLF、单独的 CR 和分页符都转成 `\n`
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace(['\r', '\u{000C}'], "\n")
}

/// 按字符数截断（不会切断多字节字符）
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
