//! 对外 API
//!
//! 文件读取、快速结构解析和完整的叙事分析入口

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use crate::analysis::{Collaborators, ScriptAnalyzer};
use crate::error::{ScriptError, ScriptResult};
use crate::models::{Conf, ScriptAnalysis};
use crate::parser::{parse_structure, ParseOutput};
use crate::utils::normalize_newlines;

/// 支持的剧本文件扩展名
const SUPPORTED_EXTENSIONS: [&str; 2] = ["txt", "fountain"];

/// 读取剧本文件，统一换行
///
/// 只接受纯文本（.txt / .fountain），其他类型返回 `UnsupportedFormat`
pub async fn load_script(path: impl AsRef<Path>) -> ScriptResult<String> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(ScriptError::UnsupportedFormat(path.display().to_string()));
    }

    let text = tokio::fs::read_to_string(path).await?;
    debug!(path = %path.display(), bytes = text.len(), "剧本文件已读取");
    Ok(normalize_newlines(&text))
}

/// 快速解析（不调用任何外部服务）
pub fn parse_script(text: &str) -> ParseOutput {
    parse_structure(&normalize_newlines(text))
}

/// 解析剧本文本，返回 JSON 格式的片段和场景区间
pub async fn parse_script_text(text: String) -> String {
    let result = parse_script(&text);
    serde_json::to_string(&result).unwrap_or_else(|_| "{}".to_string())
}

/// 完整叙事分析
///
/// `conf` 为空时使用默认配置；`parallel_scenes` 决定场景是否并行分析
pub async fn analyze_script(
    text: String,
    collaborators: Arc<Collaborators>,
    conf: Option<Conf>,
) -> ScriptResult<ScriptAnalysis> {
    let conf = conf.unwrap_or_default();
    let parallel = conf.parallel_scenes;
    let analyzer = ScriptAnalyzer::new(collaborators, conf)?;

    let analysis = if parallel {
        analyzer.analyze_concurrent(&text).await
    } else {
        analyzer.analyze(&text)
    };
    info!(
        scenes = analysis.scenes.len(),
        characters = analysis.characters.len(),
        parallel,
        "剧本分析完成"
    );
    Ok(analysis)
}

/// 完整叙事分析，结果为 JSON
pub async fn analyze_script_json(
    text: String,
    collaborators: Arc<Collaborators>,
    conf: Option<Conf>,
) -> ScriptResult<String> {
    let analysis = analyze_script(text, collaborators, conf).await?;
    Ok(serde_json::to_string(&analysis)?)
}

/// 读取文件并完成分析
pub async fn analyze_script_file(
    path: impl AsRef<Path>,
    collaborators: Arc<Collaborators>,
    conf: Option<Conf>,
) -> ScriptResult<ScriptAnalysis> {
    let text = load_script(path).await?;
    analyze_script(text, collaborators, conf).await
}
