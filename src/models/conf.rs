use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::error::{ScriptError, ScriptResult};
use crate::utils::ScreenplayConstants;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Conf {
    /// 是否在分析前去除标题页（片名、署名等）
    pub strip_front_matter: bool,
    /// 送入识别服务的单句最大字符数
    pub max_sentence_chars: usize,
    /// 每次调用识别/情绪服务的句子数
    pub batch_size: usize,
    /// 标准化后人名长度须大于此值
    pub min_name_len: usize,
    /// 摘要最大长度
    pub summary_max_len: usize,
    /// 摘要最小长度
    pub summary_min_len: usize,
    /// 是否按场景并行分析
    pub parallel_scenes: bool,
    /// 角色显示颜色表
    pub palette: Vec<String>,
}

impl Default for Conf {
    fn default() -> Self {
        Conf {
            strip_front_matter: true,
            max_sentence_chars: 512,
            batch_size: 8,
            min_name_len: 2,
            summary_max_len: 60,
            summary_min_len: 10,
            parallel_scenes: true,
            palette: ScreenplayConstants::palette().into_iter().map(String::from).collect(),
        }
    }
}

impl Conf {
    /// 从 JSON 字符串读取配置，缺省字段使用默认值
    pub fn from_json(text: &str) -> ScriptResult<Self> {
        let conf: Conf = serde_json::from_str(text)?;
        conf.validate()?;
        Ok(conf)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> ScriptResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// 检查取值范围，分析器构造时也会调用
    pub fn validate(&self) -> ScriptResult<()> {
        if self.palette.is_empty() {
            return Err(ScriptError::Config("palette 不能为空".to_string()));
        }
        if self.batch_size == 0 {
            return Err(ScriptError::Config("batch_size 必须大于 0".to_string()));
        }
        if self.max_sentence_chars == 0 {
            return Err(ScriptError::Config("max_sentence_chars 必须大于 0".to_string()));
        }
        Ok(())
    }

    /// 按角色序号取颜色
    pub fn color_for(&self, index: usize) -> &str {
        if self.palette.is_empty() {
            return ScreenplayConstants::FALLBACK_COLOR;
        }
        &self.palette[index % self.palette.len()]
    }
}
