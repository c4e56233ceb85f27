use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::{Bfs, EdgeRef};
use serde::{Deserialize, Serialize};
use tracing::warn;
use crate::analysis::collaborators::CentralityService;
use crate::error::CollaboratorResult;
use crate::models::{OrderedMap, ScriptAnalysis};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
    /// 共同出现的场景数
    pub weight: u32,
}

/// 角色共现图（无向），中心度服务的输入
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdjacencyGraph {
    pub nodes: Vec<String>,
    pub edges: Vec<Edge>,
}

impl AdjacencyGraph {
    /// 同一场景中出场或说话的两个角色之间连一条边
    pub fn from_analysis(analysis: &ScriptAnalysis) -> Self {
        Self::from_ungraph(&cooccurrence_graph(analysis))
    }

    fn from_ungraph(graph: &UnGraph<String, u32>) -> Self {
        AdjacencyGraph {
            nodes: graph.node_indices().map(|i| graph[i].clone()).collect(),
            edges: graph
                .edge_references()
                .map(|e| Edge {
                    source: e.source().index(),
                    target: e.target().index(),
                    weight: *e.weight(),
                })
                .collect(),
        }
    }

    /// 转为 petgraph 图；越界的边和自环被忽略，重复的边合并权重
    pub fn to_ungraph(&self) -> UnGraph<String, u32> {
        let mut graph = UnGraph::with_capacity(self.nodes.len(), self.edges.len());
        let indices: Vec<NodeIndex> = self.nodes.iter().map(|n| graph.add_node(n.clone())).collect();
        for edge in &self.edges {
            let (a, b) = match (indices.get(edge.source), indices.get(edge.target)) {
                (Some(&a), Some(&b)) if a != b => (a, b),
                _ => continue,
            };
            add_weight(&mut graph, a, b, edge.weight);
        }
        graph
    }
}

fn add_weight(graph: &mut UnGraph<String, u32>, a: NodeIndex, b: NodeIndex, weight: u32) {
    match graph.find_edge(a, b) {
        Some(e) => graph[e] += weight,
        None => {
            graph.add_edge(a, b, weight);
        }
    }
}

/// 节点顺序与 `analysis.characters` 一致，边按场景顺序首次出现
fn cooccurrence_graph(analysis: &ScriptAnalysis) -> UnGraph<String, u32> {
    let mut graph = UnGraph::default();
    let nodes: Vec<NodeIndex> = analysis
        .characters
        .iter()
        .map(|c| graph.add_node(c.name.clone()))
        .collect();

    let mut present: OrderedMap<Vec<NodeIndex>> = OrderedMap::new();
    for (character, &node) in analysis.characters.iter().zip(nodes.iter()) {
        let scenes = character
            .appearances
            .iter()
            .map(|a| a.scene.as_str())
            .chain(character.dialog.keys());
        for scene in scenes {
            let members = present.get_or_insert_with(scene, Vec::new);
            if !members.contains(&node) {
                members.push(node);
            }
        }
    }

    for (_, members) in present.iter() {
        for (i, &a) in members.iter().enumerate() {
            for &b in &members[i + 1..] {
                add_weight(&mut graph, a, b, 1);
            }
        }
    }
    graph
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeCentrality {
    pub degree: f64,
    pub betweenness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CentralityReport {
    #[serde(rename = "perNode")]
    pub per_node: OrderedMap<NodeCentrality>,
}

/// 本地计算：归一化度中心度和 Brandes 介数中心度（无权）
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalCentrality;

impl CentralityService for LocalCentrality {
    fn centrality(&self, graph: &AdjacencyGraph) -> CollaboratorResult<CentralityReport> {
        Ok(local_centrality(graph))
    }
}

pub fn local_centrality(graph: &AdjacencyGraph) -> CentralityReport {
    let graph = graph.to_ungraph();
    let n = graph.node_count();
    let betweenness = brandes_betweenness(&graph);
    let scale = if n > 2 { 1.0 / ((n - 1) * (n - 2)) as f64 } else { 1.0 };

    let mut per_node = OrderedMap::new();
    for node in graph.node_indices() {
        let degree = if n > 1 {
            graph.neighbors(node).count() as f64 / (n - 1) as f64
        } else {
            0.0
        };
        per_node.insert(&graph[node], NodeCentrality {
            degree,
            betweenness: betweenness[node.index()] * scale,
        });
    }
    CentralityReport { per_node }
}

// 未归一化，每个无序点对计两次（s->t 与 t->s）
fn brandes_betweenness(graph: &UnGraph<String, u32>) -> Vec<f64> {
    let n = graph.node_count();
    let mut cb = vec![0.0; n];
    for s in graph.node_indices() {
        let mut order = Vec::with_capacity(n);
        let mut pred: Vec<Vec<NodeIndex>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0f64; n];
        let mut dist: Vec<Option<usize>> = vec![None; n];
        sigma[s.index()] = 1.0;
        dist[s.index()] = Some(0);

        // BFS 按距离非递减的顺序出队，处理 v 时 dist[v] 已确定
        let mut bfs = Bfs::new(graph, s);
        while let Some(v) = bfs.next(graph) {
            order.push(v);
            let dv = dist[v.index()].unwrap_or(0);
            for w in graph.neighbors(v) {
                let wi = w.index();
                if dist[wi].is_none() {
                    dist[wi] = Some(dv + 1);
                }
                if dist[wi] == Some(dv + 1) {
                    sigma[wi] += sigma[v.index()];
                    pred[wi].push(v);
                }
            }
        }

        let mut delta = vec![0.0f64; n];
        while let Some(w) = order.pop() {
            let wi = w.index();
            for &v in &pred[wi] {
                delta[v.index()] += sigma[v.index()] / sigma[wi] * (1.0 + delta[wi]);
            }
            if w != s {
                cb[wi] += delta[wi];
            }
        }
    }
    cb
}

/// 角色网络指标；中心度服务失败时改用本地计算
pub fn network_metrics(analysis: &ScriptAnalysis, service: &dyn CentralityService) -> CentralityReport {
    let graph = AdjacencyGraph::from_analysis(analysis);
    match service.centrality(&graph) {
        Ok(report) => report,
        Err(e) => {
            warn!(error = %e, "中心度服务失败，改用本地计算");
            local_centrality(&graph)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollaboratorError;
    use crate::models::{CharacterMention, CharacterTimeline};

    fn star() -> AdjacencyGraph {
        AdjacencyGraph {
            nodes: vec!["HUB".into(), "A".into(), "B".into(), "C".into()],
            edges: vec![
                Edge { source: 0, target: 1, weight: 1 },
                Edge { source: 0, target: 2, weight: 2 },
                Edge { source: 3, target: 0, weight: 1 },
            ],
        }
    }

    #[test]
    fn star_center_has_full_betweenness() {
        let report = local_centrality(&star());
        let hub = report.per_node.get("HUB").unwrap();
        assert_eq!(hub.degree, 1.0);
        assert!((hub.betweenness - 1.0).abs() < 1e-9);
        let leaf = report.per_node.get("A").unwrap();
        assert!((leaf.degree - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(leaf.betweenness, 0.0);
    }

    #[test]
    fn path_middle_node() {
        let graph = AdjacencyGraph {
            nodes: vec!["A".into(), "B".into(), "C".into()],
            edges: vec![
                Edge { source: 0, target: 1, weight: 1 },
                Edge { source: 1, target: 2, weight: 1 },
            ],
        };
        let report = local_centrality(&graph);
        assert!((report.per_node.get("B").unwrap().betweenness - 1.0).abs() < 1e-9);
        assert_eq!(report.per_node.get("A").unwrap().betweenness, 0.0);
    }

    #[test]
    fn invalid_and_duplicate_edges() {
        let graph = AdjacencyGraph {
            nodes: vec!["A".into(), "B".into()],
            edges: vec![
                Edge { source: 0, target: 1, weight: 1 },
                Edge { source: 1, target: 0, weight: 2 },
                Edge { source: 0, target: 0, weight: 1 },
                Edge { source: 0, target: 7, weight: 1 },
            ],
        };
        let ungraph = graph.to_ungraph();
        assert_eq!(ungraph.edge_count(), 1);
        assert_eq!(ungraph.edge_references().map(|e| *e.weight()).collect::<Vec<_>>(), vec![3]);
        assert_eq!(local_centrality(&graph).per_node.get("A").unwrap().degree, 1.0);
    }

    #[test]
    fn empty_graph() {
        let report = local_centrality(&AdjacencyGraph::default());
        assert!(report.per_node.is_empty());
    }

    fn timeline(name: &str, scenes: &[&str]) -> CharacterTimeline {
        let mut timeline = CharacterTimeline::new(name, "#000000");
        for (i, scene) in scenes.iter().enumerate() {
            timeline.appearances.push(CharacterMention {
                name: name.to_string(),
                scene: scene.to_string(),
                sentence_index: i,
                position: 0.0,
                emotion: "neutral".to_string(),
                score: 0.5,
                text: String::new(),
            });
        }
        timeline
    }

    struct Down;

    impl CentralityService for Down {
        fn centrality(&self, _graph: &AdjacencyGraph) -> CollaboratorResult<CentralityReport> {
            Err(CollaboratorError::Unavailable("centrality".to_string()))
        }
    }

    #[test]
    fn cooccurrence_weights_and_fallback() {
        let analysis = ScriptAnalysis {
            scenes: Vec::new(),
            characters: vec![
                timeline("JOHN", &["S1", "S2", "S2"]),
                timeline("MARY", &["S1", "S2"]),
                timeline("ZED", &["S3"]),
            ],
            generated_at: String::new(),
        };
        let graph = AdjacencyGraph::from_analysis(&analysis);
        assert_eq!(graph.nodes, vec!["JOHN", "MARY", "ZED"]);
        assert_eq!(graph.edges, vec![Edge { source: 0, target: 1, weight: 2 }]);

        let report = network_metrics(&analysis, &Down);
        assert_eq!(report.per_node.get("ZED").unwrap().degree, 0.0);
        assert_eq!(report.per_node.get("JOHN").unwrap().degree, 0.5);
    }
}
