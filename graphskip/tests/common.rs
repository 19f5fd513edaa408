use std::fs;
use std::path::Path;

/// Writes cycles and stars of 3..=n_max nodes in TU format under
/// `{root}/{name}/`. Cycles are class 1 and stars class 2 in the raw file.
pub fn write_cycles_and_stars(root: &Path, name: &str, n_max: usize) {
    let mut graphs: Vec<(usize, Vec<(usize, usize)>, i64)> = Vec::new();
    for n in 3..=n_max {
        graphs.push((n, (0..n).map(|i| (i, (i + 1) % n)).collect(), 1));
        graphs.push((n, (1..n).map(|i| (0, i)).collect(), 2));
    }

    let dir = root.join(name);
    fs::create_dir_all(&dir).expect("create dataset dir");
    let (mut a, mut indicator, mut labels) = (String::new(), String::new(), String::new());
    let mut offset = 0;
    for (g, (num_nodes, edges, label)) in graphs.iter().enumerate() {
        for &(u, v) in edges {
            a.push_str(&format!("{}, {}\n{}, {}\n", offset + u + 1, offset + v + 1, offset + v + 1, offset + u + 1));
        }
        for _ in 0..*num_nodes {
            indicator.push_str(&format!("{}\n", g + 1));
        }
        labels.push_str(&format!("{}\n", label));
        offset += num_nodes;
    }
    fs::write(dir.join(format!("{}_A.txt", name)), a).expect("write A");
    fs::write(dir.join(format!("{}_graph_indicator.txt", name)), indicator).expect("write indicator");
    fs::write(dir.join(format!("{}_graph_labels.txt", name)), labels).expect("write labels");
}
