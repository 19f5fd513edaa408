//! Reader for the TU graph benchmark format.
//!
//! A dataset `NAME` lives in `{datadir}/NAME/` as:
//! - `NAME_A.txt`: one `u, v` edge per line, 1-based global node ids
//! - `NAME_graph_indicator.txt`: graph id (1-based) of every node
//! - `NAME_graph_labels.txt`: class label of every graph
//! - `NAME_node_labels.txt` (optional): integer label of every node
//! - `NAME_node_attributes.txt` (optional): comma separated floats per node

use crate::error::DataError;
use crate::graph::Graph;
use log::{info, warn};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Datasets whose graphs are added to the training set of `name` when
/// training with extension enabled.
pub fn extension_datasets(name: &str) -> &'static [&'static str] {
    match name {
        "PTC_MR" => &["PTC_MM", "PTC_FR", "PTC_FM"],
        "Tox21_AR" => &["Tox21_AHR", "Tox21_AR-LBD"],
        "REDDIT-BINARY" => &["REDDIT-MULTI-5K", "REDDIT-MULTI-12K"],
        _ => &[],
    }
}

fn dataset_file(dir: &Path, name: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{}_{}.txt", name, suffix))
}

/// Reads the non-empty lines of `path`, paired with their 1-based line number.
fn read_lines(path: &Path) -> Result<Vec<(usize, String)>, DataError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataError::MissingFile {
            path: path.to_path_buf(),
        },
        _ => DataError::Io(e),
    })?;
    let mut lines = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            lines.push((i + 1, trimmed.to_string()));
        }
    }
    Ok(lines)
}

fn parse_field<T: std::str::FromStr>(path: &Path, line: usize, field: &str) -> Result<T, DataError>
where
    T::Err: std::fmt::Display,
{
    field.trim().parse::<T>().map_err(|e| DataError::Parse {
        file: path.to_path_buf(),
        line,
        message: format!("cannot parse {:?}: {}", field.trim(), e),
    })
}

/// One integer per line; extra comma separated columns are ignored.
fn read_int_column(path: &Path) -> Result<Vec<i64>, DataError> {
    read_lines(path)?
        .into_iter()
        .map(|(line, text)| {
            let first = text.split(',').next().unwrap_or_default();
            parse_field(path, line, first)
        })
        .collect()
}

/// Maps every value to its rank among the distinct values.
fn dense_codes(values: &[i64]) -> (Vec<usize>, usize) {
    let distinct: Vec<i64> = values.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
    let codes = values
        .iter()
        .map(|v| distinct.binary_search(v).unwrap_or_default())
        .collect();
    (codes, distinct.len())
}

/// Loads every graph of the TU dataset `name` under `datadir`.
///
/// Graph and node labels are remapped to `0..C` in ascending order of their
/// original values. With `max_nodes > 0`, graphs having more nodes are
/// dropped.
pub fn read_graphfile(datadir: impl AsRef<Path>, name: &str, max_nodes: usize) -> Result<Vec<Graph>, DataError> {
    let dir = datadir.as_ref().join(name);
    let inconsistent = |message: String| DataError::Inconsistent {
        dataset: name.to_string(),
        message,
    };

    let indicator_path = dataset_file(&dir, name, "graph_indicator");
    let indicator = read_int_column(&indicator_path)?;
    let num_nodes_total = indicator.len();
    let num_graphs = indicator.iter().copied().max().unwrap_or(0).max(0) as usize;

    // Nodes of a graph are contiguous in the global numbering.
    let mut graph_of_node = Vec::with_capacity(num_nodes_total);
    let mut start = vec![usize::MAX; num_graphs];
    let mut sizes = vec![0usize; num_graphs];
    for (node, &g) in indicator.iter().enumerate() {
        if g < 1 {
            return Err(inconsistent(format!("graph id {} of node {} is not positive", g, node + 1)));
        }
        let g = (g - 1) as usize;
        if start[g] == usize::MAX {
            start[g] = node;
        }
        if node - start[g] != sizes[g] {
            return Err(inconsistent(format!("nodes of graph {} are not contiguous", g + 1)));
        }
        sizes[g] += 1;
        graph_of_node.push(g);
    }

    let label_path = dataset_file(&dir, name, "graph_labels");
    let raw_labels = read_int_column(&label_path)?;
    if raw_labels.len() != num_graphs {
        return Err(inconsistent(format!(
            "{} graph labels for {} graphs",
            raw_labels.len(),
            num_graphs
        )));
    }
    let (graph_labels, num_classes) = dense_codes(&raw_labels);

    let mut edges: Vec<Vec<(usize, usize)>> = vec![Vec::new(); num_graphs];
    let adj_path = dataset_file(&dir, name, "A");
    for (line, text) in read_lines(&adj_path)? {
        let mut parts = text.split(',');
        let (u, v) = match (parts.next(), parts.next()) {
            (Some(u), Some(v)) => (
                parse_field::<usize>(&adj_path, line, u)?,
                parse_field::<usize>(&adj_path, line, v)?,
            ),
            _ => {
                return Err(DataError::Parse {
                    file: adj_path.clone(),
                    line,
                    message: "expected `u, v`".to_string(),
                })
            }
        };
        if u == 0 || v == 0 || u > num_nodes_total || v > num_nodes_total {
            return Err(DataError::Parse {
                file: adj_path.clone(),
                line,
                message: format!("node id out of range 1..={}", num_nodes_total),
            });
        }
        let (gu, gv) = (graph_of_node[u - 1], graph_of_node[v - 1]);
        if gu != gv {
            return Err(inconsistent(format!(
                "edge ({}, {}) connects graphs {} and {}",
                u,
                v,
                gu + 1,
                gv + 1
            )));
        }
        edges[gu].push((u - 1 - start[gu], v - 1 - start[gu]));
    }

    let node_label_path = dataset_file(&dir, name, "node_labels");
    let node_labels = if node_label_path.exists() {
        let raw = read_int_column(&node_label_path)?;
        if raw.len() != num_nodes_total {
            return Err(inconsistent(format!("{} node labels for {} nodes", raw.len(), num_nodes_total)));
        }
        Some(dense_codes(&raw).0)
    } else {
        None
    };

    let attr_path = dataset_file(&dir, name, "node_attributes");
    let node_attrs = if attr_path.exists() {
        let rows: Vec<Vec<f32>> = read_lines(&attr_path)?
            .into_iter()
            .map(|(line, text)| {
                text.split(',')
                    .map(|f| parse_field::<f32>(&attr_path, line, f))
                    .collect::<Result<Vec<f32>, _>>()
            })
            .collect::<Result<_, _>>()?;
        if rows.len() != num_nodes_total {
            return Err(inconsistent(format!("{} attribute rows for {} nodes", rows.len(), num_nodes_total)));
        }
        Some(rows)
    } else {
        None
    };

    let mut graphs = Vec::with_capacity(num_graphs);
    let mut dropped = 0;
    for (g, graph_edges) in edges.into_iter().enumerate() {
        let n = sizes[g];
        if max_nodes > 0 && n > max_nodes {
            dropped += 1;
            continue;
        }
        let range = start[g]..start[g].saturating_add(n);
        let mut graph = Graph::new(n, graph_edges, graph_labels[g])?;
        if n > 0 {
            if let Some(labels) = &node_labels {
                graph = graph.with_node_labels(labels[range.clone()].to_vec());
            }
            if let Some(attrs) = &node_attrs {
                graph = graph.with_node_attrs(attrs[range].to_vec());
            }
        }
        graphs.push(graph);
    }

    if dropped > 0 {
        warn!(
            "{}: dropped {} graphs with more than {} nodes",
            name, dropped, max_nodes
        );
    }
    info!(
        "Loaded {}: {} graphs, {} classes, node labels: {}, node attributes: {}",
        name,
        graphs.len(),
        num_classes,
        node_labels.is_some(),
        node_attrs.is_some()
    );
    Ok(graphs)
}

#[cfg(test)]
#[path = "tu_test.rs"]
mod tests;
