use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{info, warn};
use crate::analysis::aggregator::NarrativeAggregator;
use crate::analysis::collaborators::Collaborators;
use crate::analysis::mention_resolver::CharacterLexicon;
use crate::analysis::scene_analyzer::{SceneAnalysis, SceneAnalyzer};
use crate::error::ScriptResult;
use crate::models::{Conf, SceneBlock, ScriptAnalysis};
use crate::parser::{segment_scenes, strip_front_matter};
use crate::utils::normalize_newlines;

/// 整篇剧本的叙事分析
///
/// 场景之间互不依赖，可顺序执行（`analyze`）或在阻塞线程池上并行（`analyze_concurrent`），
/// 两者结果相同
#[derive(Clone)]
pub struct ScriptAnalyzer {
    collaborators: Arc<Collaborators>,
    conf: Arc<Conf>,
}

impl ScriptAnalyzer {
    /// 配置不合法时返回 `ScriptError::Config`
    pub fn new(collaborators: Arc<Collaborators>, conf: Conf) -> ScriptResult<Self> {
        conf.validate()?;
        Ok(ScriptAnalyzer {
            collaborators,
            conf: Arc::new(conf),
        })
    }

    pub fn conf(&self) -> &Conf {
        &self.conf
    }

    /// 换行统一，并按配置去除标题页
    pub fn prepare(&self, text: &str) -> String {
        let text = normalize_newlines(text);
        if self.conf.strip_front_matter {
            strip_front_matter(&text)
        } else {
            text
        }
    }

    pub fn analyze(&self, text: &str) -> ScriptAnalysis {
        let text = self.prepare(text);
        let lexicon = CharacterLexicon::from_script(&text);
        let scenes = segment_scenes(&text);
        info!(scenes = scenes.len(), candidates = lexicon.len(), "开始叙事分析");

        let mut aggregator = NarrativeAggregator::new(&self.conf);
        for scene in &scenes {
            aggregator.add_scene(analyze_isolated(&self.collaborators, &lexicon, &self.conf, scene));
        }
        aggregator.finish()
    }

    /// 每个场景一个 `spawn_blocking` 任务，按场景顺序等待并合并
    pub async fn analyze_concurrent(&self, text: &str) -> ScriptAnalysis {
        let text = self.prepare(text);
        let lexicon = Arc::new(CharacterLexicon::from_script(&text));
        let scenes = segment_scenes(&text);
        info!(scenes = scenes.len(), candidates = lexicon.len(), "开始并行叙事分析");

        let handles: Vec<_> = scenes
            .into_iter()
            .map(|scene| {
                let collaborators = Arc::clone(&self.collaborators);
                let lexicon = Arc::clone(&lexicon);
                let conf = Arc::clone(&self.conf);
                let heading = scene.heading.clone();
                let handle = tokio::task::spawn_blocking(move || {
                    analyze_isolated(&collaborators, &lexicon, &conf, &scene)
                });
                (heading, handle)
            })
            .collect();

        let mut aggregator = NarrativeAggregator::new(&self.conf);
        for (heading, handle) in handles {
            match handle.await {
                Ok(scene) => aggregator.add_scene(scene),
                Err(e) => {
                    warn!(scene = %heading, error = %e, "场景分析任务失败，按空场景处理");
                    aggregator.add_scene(SceneAnalysis::empty(&heading));
                }
            }
        }
        aggregator.finish()
    }
}

/// 单个场景出错（panic）不影响其余场景
fn analyze_isolated(
    collaborators: &Collaborators,
    lexicon: &CharacterLexicon,
    conf: &Conf,
    scene: &SceneBlock,
) -> SceneAnalysis {
    let analyzer = SceneAnalyzer::new(collaborators, lexicon, conf);
    match catch_unwind(AssertUnwindSafe(|| analyzer.analyze(scene))) {
        Ok(result) => result,
        Err(_) => {
            warn!(scene = %scene.heading, "场景分析中断，按空场景处理");
            SceneAnalysis::empty(&scene.heading)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::collaborators::{EmotionClassifier, EmotionScore, EntityRecognizer, EntitySpan};
    use crate::error::CollaboratorResult;

    struct NoEntities;

    impl EntityRecognizer for NoEntities {
        fn recognize(&self, sentences: &[String]) -> CollaboratorResult<Vec<Vec<EntitySpan>>> {
            Ok(sentences.iter().map(|_| Vec::new()).collect())
        }
    }

    struct AlwaysJoy;

    impl EmotionClassifier for AlwaysJoy {
        fn classify(&self, sentences: &[String]) -> CollaboratorResult<Vec<Vec<EmotionScore>>> {
            Ok(sentences.iter().map(|_| vec![EmotionScore::new("Joy", 0.9)]).collect())
        }
    }

    struct Panicking;

    impl EmotionClassifier for Panicking {
        fn classify(&self, _sentences: &[String]) -> CollaboratorResult<Vec<Vec<EmotionScore>>> {
            panic!("model crashed");
        }
    }

    fn analyzer(emotion: Arc<dyn EmotionClassifier>) -> ScriptAnalyzer {
        let collaborators = Collaborators::new(Arc::new(NoEntities), emotion);
        ScriptAnalyzer::new(Arc::new(collaborators), Conf::default()).unwrap()
    }

    const SCRIPT: &str = "INT. HOUSE - DAY\r\nJOHN\r\nHello there.\r\n\r\nMARY enters.\r\n\u{000C}EXT. STREET - NIGHT\r\nJOHN walks home.\r\n";

    #[test]
    fn prepare_normalizes_newlines() {
        let text = analyzer(Arc::new(AlwaysJoy)).prepare(SCRIPT);
        assert!(!text.contains('\r'));
        assert!(text.starts_with("INT. HOUSE - DAY\n"));
    }

    #[test]
    fn sequential_analysis() {
        let analysis = analyzer(Arc::new(AlwaysJoy)).analyze(SCRIPT);
        assert_eq!(analysis.scenes.len(), 2);
        assert_eq!(analysis.scenes[1].label, "EXT. STREET - NIGHT");

        let john = analysis.character("JOHN").unwrap();
        assert_eq!(john.dialog.get("INT. HOUSE - DAY").unwrap()[0].line, "Hello there.");
        assert_eq!(john.dialog.get("INT. HOUSE - DAY").unwrap()[0].emotion, "joy");
        assert!(john.appearances.iter().any(|a| a.scene == "EXT. STREET - NIGHT"));
        // "MARY enters." 不是候选行，识别服务也没有返回实体
        assert_eq!(analysis.character_names(), vec!["JOHN"]);
    }

    #[tokio::test]
    async fn concurrent_matches_sequential() {
        let analyzer = analyzer(Arc::new(AlwaysJoy));
        let sequential = analyzer.analyze(SCRIPT);
        let concurrent = analyzer.analyze_concurrent(SCRIPT).await;
        assert_eq!(sequential.scenes, concurrent.scenes);
        assert_eq!(sequential.characters, concurrent.characters);
    }

    #[test]
    fn panicking_scene_degrades_to_empty() {
        let analysis = analyzer(Arc::new(Panicking)).analyze(SCRIPT);
        assert_eq!(analysis.scenes.len(), 2);
        assert!(analysis.scenes.iter().all(|s| s.narration.is_none()));
        assert!(analysis.characters.is_empty());
    }
}
