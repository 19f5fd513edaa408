use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// One graph of a synthetic TU dataset: node count, 0-based edges, class.
pub struct ToyGraph {
    pub num_nodes: usize,
    pub edges: Vec<(usize, usize)>,
    pub label: i64,
}

/// Cycles of length 3..=n_max labelled 0 and stars labelled 1.
#[allow(dead_code)]
pub fn cycles_and_stars(n_max: usize) -> Vec<ToyGraph> {
    let mut graphs = Vec::new();
    for n in 3..=n_max {
        graphs.push(ToyGraph {
            num_nodes: n,
            edges: (0..n).map(|i| (i, (i + 1) % n)).collect(),
            label: 0,
        });
        graphs.push(ToyGraph {
            num_nodes: n,
            edges: (1..n).map(|i| (0, i)).collect(),
            label: 1,
        });
    }
    graphs
}

/// Writes `graphs` in TU format under `{root}/{name}/`, listing every
/// undirected edge in both directions like the published benchmarks do.
pub fn write_tu_dataset(root: &Path, name: &str, graphs: &[ToyGraph]) {
    let dir = root.join(name);
    fs::create_dir_all(&dir).expect("create dataset dir");
    let (mut a, mut indicator, mut labels, mut node_labels) =
        (String::new(), String::new(), String::new(), String::new());
    let mut offset = 0;
    for (g, graph) in graphs.iter().enumerate() {
        for &(u, v) in &graph.edges {
            a.push_str(&format!("{}, {}\n{}, {}\n", offset + u + 1, offset + v + 1, offset + v + 1, offset + u + 1));
        }
        for i in 0..graph.num_nodes {
            indicator.push_str(&format!("{}\n", g + 1));
            node_labels.push_str(&format!("{}\n", i % 2));
        }
        labels.push_str(&format!("{}\n", graph.label));
        offset += graph.num_nodes;
    }
    let write = |suffix: &str, contents: &str| {
        fs::write(dir.join(format!("{}_{}.txt", name, suffix)), contents).expect("write dataset file");
    };
    write("A", &a);
    write("graph_indicator", &indicator);
    write("graph_labels", &labels);
    write("node_labels", &node_labels);
}

#[allow(dead_code)]
pub fn toy_dataset_dir(name: &str, graphs: &[ToyGraph]) -> TempDir {
    let tmp = TempDir::new().expect("tempdir");
    write_tu_dataset(tmp.path(), name, graphs);
    tmp
}
