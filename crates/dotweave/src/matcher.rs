//! Pairing engine output with the original graph objects.
//!
//! Vertices are resolved through the [`IdAssignment`] written by the
//! serializer. Edges are resolved through the `e<index>` id the serializer
//! gives them, falling back to the endpoints. Clusters are resolved by exact
//! member-set equality, consuming originals in declaration order so that two
//! sub-graphs with identical membership are matched first to first.

use std::{collections::HashSet, fmt, hash::Hash};

use log::{debug, warn};

use dotweave_core::graph::{Edge, Graph, SubGraph};
use dotweave_parser::{DotEdge, DotGraph, DotSubGraph, DotVertex};

use crate::{error::LayoutError, ids::IdAssignment, snapshot::Snapshot};

/// Engine objects paired with their originals.
///
/// Vertices, edges and sub-graphs are listed in the enumeration order of the
/// snapshot they were matched against.
pub struct MatchedGraph<'g, 'd, G: Graph> {
    pub vertices: Vec<(&'g G::Vertex, &'d DotVertex)>,
    pub edges: Vec<(&'g G::Edge, &'d DotEdge)>,
    pub sub_graphs: Vec<(&'g G::SubGraph, &'d DotSubGraph)>,
}

/// Matches `dot` against the snapshot it was serialized from.
///
/// # Errors
///
/// Fails with [`LayoutError::UnmatchedVertex`], [`LayoutError::UnmatchedEdge`]
/// or [`LayoutError::UnmatchedSubGraph`] when an engine object has no
/// original, or an original has no engine object.
pub fn match_graph<'g, 'd, G: Graph>(
    snapshot: &Snapshot<'g, G>,
    ids: &IdAssignment<'g, G::Vertex>,
    dot: &'d DotGraph,
) -> Result<MatchedGraph<'g, 'd, G>, LayoutError> {
    let matched = MatchedGraph {
        vertices: match_vertices(ids, dot)?,
        edges: match_edges(snapshot, ids, dot)?,
        sub_graphs: match_sub_graphs(snapshot, ids, dot)?,
    };
    debug!(
        vertices = matched.vertices.len(),
        edges = matched.edges.len(),
        sub_graphs = matched.sub_graphs.len();
        "Engine output matched"
    );
    Ok(matched)
}

fn match_vertices<'g, 'd, V: Eq + Hash + fmt::Debug>(
    ids: &IdAssignment<'g, V>,
    dot: &'d DotGraph,
) -> Result<Vec<(&'g V, &'d DotVertex)>, LayoutError> {
    if let Some(unknown) = dot.vertices().find(|vertex| ids.vertex(vertex.id()).is_none()) {
        return Err(LayoutError::UnmatchedVertex {
            id: unknown.id().to_owned(),
        });
    }

    ids.iter()
        .map(|(vertex, id)| {
            dot.vertex(id)
                .map(|dot_vertex| (vertex, dot_vertex))
                .ok_or_else(|| LayoutError::UnmatchedVertex { id: id.to_owned() })
        })
        .collect()
}

fn match_edges<'g, 'd, G: Graph>(
    snapshot: &Snapshot<'g, G>,
    ids: &IdAssignment<'g, G::Vertex>,
    dot: &'d DotGraph,
) -> Result<Vec<(&'g G::Edge, &'d DotEdge)>, LayoutError> {
    let endpoints = |edge: &G::Edge| (ids.id(edge.source()), ids.id(edge.destination()));
    let connects = |edge: &G::Edge, dot_edge: &DotEdge| {
        endpoints(edge) == (Some(dot_edge.source()), Some(dot_edge.destination()))
    };

    let mut matched: Vec<Option<&'d DotEdge>> = vec![None; snapshot.edges.len()];
    for dot_edge in dot.edges() {
        let by_id = dot_edge
            .id()
            .and_then(|id| id.strip_prefix('e'))
            .and_then(|index| index.parse::<usize>().ok())
            .filter(|&index| {
                index < matched.len()
                    && matched[index].is_none()
                    && connects(snapshot.edges[index], dot_edge)
            });

        let index = by_id.or_else(|| {
            let fallback = (0..matched.len())
                .find(|&index| matched[index].is_none() && connects(snapshot.edges[index], dot_edge));
            if fallback.is_some() {
                debug!(
                    from = dot_edge.source(),
                    to = dot_edge.destination();
                    "Edge matched by endpoints"
                );
            }
            fallback
        });

        match index {
            Some(index) => matched[index] = Some(dot_edge),
            None => {
                return Err(LayoutError::UnmatchedEdge {
                    from: dot_edge.source().to_owned(),
                    to: dot_edge.destination().to_owned(),
                });
            }
        }
    }

    snapshot
        .edges
        .iter()
        .zip(matched)
        .map(|(edge, dot_edge)| match dot_edge {
            Some(dot_edge) => Ok((*edge, dot_edge)),
            None => {
                let (from, to) = endpoints(edge);
                Err(LayoutError::UnmatchedEdge {
                    from: from.unwrap_or_default().to_owned(),
                    to: to.unwrap_or_default().to_owned(),
                })
            }
        })
        .collect()
}

fn match_sub_graphs<'g, 'd, G: Graph>(
    snapshot: &Snapshot<'g, G>,
    ids: &IdAssignment<'g, G::Vertex>,
    dot: &'d DotGraph,
) -> Result<Vec<(&'g G::SubGraph, &'d DotSubGraph)>, LayoutError> {
    let member_sets: Vec<_> = snapshot
        .sub_graphs
        .iter()
        .map(|entry| entry.member_set())
        .collect();
    let mut matched: Vec<Option<&'d DotSubGraph>> = vec![None; member_sets.len()];

    for cluster in dot.sub_graphs() {
        let members = cluster
            .members()
            .iter()
            .map(|id| {
                ids.vertex(id)
                    .ok_or_else(|| LayoutError::UnmatchedVertex { id: id.clone() })
            })
            .collect::<Result<HashSet<_>, _>>()?;

        let index = (0..matched.len()).find(|&index| {
            matched[index].is_none()
                && !snapshot.sub_graphs[index].is_empty()
                && member_sets[index] == members
        });
        match index {
            Some(index) => matched[index] = Some(cluster),
            None => {
                return Err(LayoutError::UnmatchedSubGraph {
                    name: cluster.name().to_owned(),
                });
            }
        }
    }

    let mut pairs = Vec::with_capacity(matched.len());
    for (index, (entry, cluster)) in snapshot.sub_graphs.iter().zip(matched).enumerate() {
        match cluster {
            Some(cluster) => pairs.push((entry.sub_graph, cluster)),
            None if entry.is_empty() => {}
            None => {
                warn!(index; "Sub-graph missing from engine output");
                return Err(LayoutError::UnmatchedSubGraph {
                    name: entry
                        .sub_graph
                        .label()
                        .map_or_else(|| format!("cluster_{index}"), str::to_owned),
                });
            }
        }
    }
    Ok(pairs)
}
