use std::collections::HashMap;
use chrono::Utc;
use tracing::info;
use crate::analysis::scene_analyzer::SceneAnalysis;
use crate::models::{CharacterTimeline, Conf, DialogStats, EmotionPoint, SceneLabel, ScriptAnalysis};

/// 按剧本顺序合并各场景结果，生成每个角色的时间线
///
/// 对白提示名和提及名各自作为键，不做跨来源的统一
pub struct NarrativeAggregator<'a> {
    conf: &'a Conf,
    timelines: Vec<CharacterTimeline>,
    index: HashMap<String, usize>,
    scenes: Vec<SceneLabel>,
}

impl<'a> NarrativeAggregator<'a> {
    pub fn new(conf: &'a Conf) -> Self {
        NarrativeAggregator {
            conf,
            timelines: Vec::new(),
            index: HashMap::new(),
            scenes: Vec::new(),
        }
    }

    /// 首次出现时创建时间线，颜色按首次出现序号取色
    fn timeline_mut(&mut self, name: &str) -> &mut CharacterTimeline {
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                let idx = self.timelines.len();
                let color = self.conf.color_for(idx).to_string();
                self.timelines.push(CharacterTimeline::new(name, color));
                self.index.insert(name.to_string(), idx);
                idx
            }
        };
        &mut self.timelines[idx]
    }

    /// 场景须按剧本顺序加入
    pub fn add_scene(&mut self, scene: SceneAnalysis) {
        let stats = scene.dialog_stats();
        let SceneAnalysis { heading, dialog, mentions, narration } = scene;

        for (speaker, lines) in dialog.iter() {
            let timeline = self.timeline_mut(speaker);
            timeline
                .dialog
                .get_or_insert_with(&heading, Vec::new)
                .extend(lines.iter().cloned());
            if let Some(scene_stats) = stats.get(speaker) {
                let merged = match timeline.dialog_stats.get(&heading) {
                    Some(prev) => merge_stats(prev, scene_stats),
                    None => scene_stats.clone(),
                };
                timeline.dialog_stats.insert(&heading, merged);
            }
        }

        for mention in mentions {
            let timeline = self.timeline_mut(&mention.name);
            timeline.emotion_timeline.push(EmotionPoint::from(&mention));
            timeline.appearances.push(mention);
        }

        self.scenes.push(SceneLabel {
            label: heading,
            t: 0.0,
            narration,
        });
    }

    pub fn finish(self) -> ScriptAnalysis {
        let NarrativeAggregator { timelines, mut scenes, .. } = self;

        let total = scenes.len().max(1) as f32;
        for (i, scene) in scenes.iter_mut().enumerate() {
            scene.t = i as f32 / total;
        }

        let characters: Vec<CharacterTimeline> = timelines.into_iter().filter(|t| !t.is_empty()).collect();
        info!(scenes = scenes.len(), characters = characters.len(), "叙事汇总完成");

        ScriptAnalysis {
            scenes,
            characters,
            generated_at: Utc::now().to_rfc3339(),
        }
    }
}

/// 同一标题出现在多个场景时合并对白统计
fn merge_stats(a: &DialogStats, b: &DialogStats) -> DialogStats {
    let count = a.line_count + b.line_count;
    let avg = if count == 0 {
        0.0
    } else {
        (a.avg_emotion_score * a.line_count as f32 + b.avg_emotion_score * b.line_count as f32) / count as f32
    };
    DialogStats {
        line_count: count,
        avg_emotion_score: avg,
    }
}
