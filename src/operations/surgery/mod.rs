//! Embeds a resolved cut path into the mesh topology.

mod normals;
mod split;

pub use normals::RepairNormals;

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use self::split::{split_loop, Corner};
use super::path::Crossing;
use crate::error::{Result, TopologyError};
use crate::math::Point3;
use crate::topology::{EdgeId, FaceId, MeshStore, VertexId};

/// An element of the ordered cut path.
#[derive(Debug, Clone, Copy)]
pub enum CutNode {
    /// The path crosses a mesh edge.
    Crossing(Crossing),
    /// A user-placed point inside a face.
    Click { index: usize, point: Point3, face: FaceId },
}

/// How a face is cut, by the number of cut vertices on its loop and the
/// number of chords through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceSplitKind {
    Untouched,
    SingleCrossing,
    /// One chord, two faces.
    TwoWay,
    /// Two chords, three faces.
    ThreeWay,
    /// More than two chords.
    MultiSplit(usize),
}

impl FaceSplitKind {
    fn classify(crossings: usize, chords: usize) -> Self {
        match (crossings, chords) {
            (0, 0) => Self::Untouched,
            (_, 0) => Self::SingleCrossing,
            (_, 1) => Self::TwoWay,
            (_, 2) => Self::ThreeWay,
            (_, n) => Self::MultiSplit(n),
        }
    }
}

/// Why part of the cut was not embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    /// The edge was crossed again later on the path; only the first crossing
    /// was kept.
    DuplicateCrossing(EdgeId),
    /// A face holds a single cut vertex and no chord.
    SingleCrossing,
    /// Cut vertices on the face that no chord connects.
    UnpairedCrossings(usize),
    /// A chord whose ends are not on the same part of the face.
    ChordOffLoop,
    /// Two consecutive crossings share no face.
    NoSharedFace,
}

/// A face (if any) left unmodified and the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurgeryIssue {
    pub face: Option<FaceId>,
    pub kind: IssueKind,
}

/// Outcome of embedding a cut.
#[derive(Debug, Clone, Default)]
pub struct CutResult {
    /// Chord edges in path order.
    pub perimeter: Vec<EdgeId>,
    /// Vertices from bisected edges, then click vertices.
    pub new_vertices: Vec<VertexId>,
    pub new_faces: Vec<FaceId>,
    pub removed_faces: Vec<FaceId>,
    /// Split classification of every face touched by the cut.
    pub splits: Vec<(FaceId, FaceSplitKind)>,
    pub issues: Vec<SurgeryIssue>,
    /// New faces flipped by normal repair.
    pub flipped: Vec<FaceId>,
}

/// The part of the path inside one face.
#[derive(Debug)]
struct Chord {
    face: FaceId,
    corners: Vec<Corner>,
    built: bool,
}

impl Chord {
    fn ends(&self) -> [Corner; 2] {
        [self.corners[0], self.corners[self.corners.len() - 1]]
    }
}

/// Bisects crossed edges and rebuilds the faces they border so that the
/// cut path becomes a chain of mesh edges.
///
/// Steps, in order:
/// 1. later crossings of an already crossed edge are dropped;
/// 2. every crossed edge is bisected at its crossing point, except where the
///    crossing lies at an edge end, which reuses that vertex;
/// 3. consecutive crossings are joined by chords through their common face,
///    with the click points between them as interior vertices;
/// 4. every face with cut vertices is split along its chords, or reported
///    and left as is;
/// 5. new faces are oriented against their neighbours.
pub struct CommitCut {
    nodes: Vec<CutNode>,
    cyclic: bool,
}

impl CommitCut {
    /// Creates a new `CommitCut` operation over the ordered cut nodes.
    #[must_use]
    pub fn new(nodes: Vec<CutNode>, cyclic: bool) -> Self {
        Self { nodes, cyclic }
    }

    /// Executes the surgery.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is inconsistent with the cut nodes.
    pub fn execute(&self, store: &mut MeshStore) -> Result<CutResult> {
        let mut result = CutResult::default();

        // Crossings at an edge end run through the existing vertex. Resolved
        // before any bisection moves edge ends.
        let mut at_vertex = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            at_vertex.push(match node {
                CutNode::Crossing(c) => endpoint_vertex(store, c)?,
                CutNode::Click { .. } => None,
            });
        }

        // Steps 1 and 2: bisect at the computed crossing coordinates, first
        // crossing of an edge wins. Consecutive crossings through the same
        // vertex become one node.
        let mut seen = HashSet::new();
        let mut bisected = HashSet::new();
        let mut nodes: Vec<CutNode> = Vec::with_capacity(self.nodes.len());
        let mut node_vertex: Vec<Option<VertexId>> = Vec::with_capacity(self.nodes.len());
        for (node, reuse) in self.nodes.iter().zip(at_vertex) {
            let vertex = match (node, reuse) {
                (CutNode::Click { .. }, _) => None,
                (CutNode::Crossing(_), Some(v)) => Some(v),
                (CutNode::Crossing(c), None) => {
                    if !seen.insert(c.edge) {
                        warn!(edge = ?c.edge, "edge crossed twice, later crossing dropped");
                        result.issues.push(SurgeryIssue {
                            face: None,
                            kind: IssueKind::DuplicateCrossing(c.edge),
                        });
                        continue;
                    }
                    let v = store.bisect_edge(c.edge, c.point)?;
                    bisected.insert(v);
                    result.new_vertices.push(v);
                    Some(v)
                }
            };
            if vertex.is_some() && node_vertex.last() == Some(&vertex) {
                debug!(vertex = ?vertex, "repeated crossing through a vertex merged");
                continue;
            }
            nodes.push(*node);
            node_vertex.push(vertex);
        }
        if self.cyclic {
            let first = node_vertex.iter().position(Option::is_some);
            let last = node_vertex.iter().rposition(Option::is_some);
            if let (Some(i), Some(j)) = (first, last) {
                if i != j && node_vertex[i] == node_vertex[j] {
                    nodes.remove(j);
                    node_vertex.remove(j);
                }
            }
        }

        // Step 3: chords between consecutive crossings.
        let mut chords = build_chords(store, &nodes, &node_vertex, self.cyclic, &mut result.issues)?;

        // Step 4: rebuild every face holding new vertices or a chord.
        let crossing_vertices: HashSet<VertexId> = node_vertex.iter().flatten().copied().collect();
        let mut touched = Vec::new();
        for &v in &result.new_vertices {
            for face in store.vertex_faces(v)? {
                if !touched.contains(&face) {
                    touched.push(face);
                }
            }
        }
        for chord in &chords {
            if !touched.contains(&chord.face) {
                touched.push(chord.face);
            }
        }

        let click_points: HashMap<usize, Point3> = nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| match node {
                CutNode::Click { point, .. } => Some((i, *point)),
                CutNode::Crossing(_) => None,
            })
            .collect();
        let mut click_vertices: HashMap<usize, VertexId> = HashMap::new();

        for face in touched {
            let outer: Vec<VertexId> = store.face(face)?.vertices().to_vec();
            let on_loop = outer.iter().filter(|v| crossing_vertices.contains(v)).count();
            let here: Vec<usize> = (0..chords.len()).filter(|&k| chords[k].face == face).collect();
            result.splits.push((face, FaceSplitKind::classify(on_loop, here.len())));

            if here.is_empty() {
                let loose = outer.iter().filter(|v| bisected.contains(v)).count();
                let kind = if loose == 1 {
                    IssueKind::SingleCrossing
                } else {
                    IssueKind::UnpairedCrossings(loose)
                };
                warn!(?face, ?kind, "face left uncut");
                result.issues.push(SurgeryIssue { face: Some(face), kind });
                continue;
            }

            let endpoints: HashSet<Corner> = here
                .iter()
                .flat_map(|&k| chords[k].ends())
                .collect();
            let unpaired = outer
                .iter()
                .filter(|&&v| bisected.contains(&v) && !endpoints.contains(&Corner::Vertex(v)))
                .count();
            if unpaired > 0 {
                warn!(?face, unpaired, "face left uncut");
                result.issues.push(SurgeryIssue {
                    face: Some(face),
                    kind: IssueKind::UnpairedCrossings(unpaired),
                });
                continue;
            }

            let outer_corners: Vec<Corner> = outer.iter().map(|&v| Corner::Vertex(v)).collect();
            let chord_corners: Vec<Vec<Corner>> = here.iter().map(|&k| chords[k].corners.clone()).collect();
            let Ok(loops) = split_loop(&outer_corners, &chord_corners) else {
                warn!(?face, "chord does not fit face, face left uncut");
                result.issues.push(SurgeryIssue {
                    face: Some(face),
                    kind: IssueKind::ChordOffLoop,
                });
                continue;
            };
            if loops.len() == 1 {
                // Every chord runs along an existing edge.
                if let Some(split) = result.splits.last_mut() {
                    split.1 = FaceSplitKind::Untouched;
                }
                for k in here {
                    chords[k].built = true;
                }
                continue;
            }

            for corners in loops {
                let mut ids = Vec::with_capacity(corners.len());
                for corner in corners {
                    ids.push(match corner {
                        Corner::Vertex(v) => v,
                        Corner::Click(i) => match click_vertices.get(&i) {
                            Some(&v) => v,
                            None => {
                                let point = click_points.get(&i).copied().ok_or_else(|| {
                                    TopologyError::InvalidTopology("chord corner is not a click point".into())
                                })?;
                                let v = store.add_vertex(point);
                                click_vertices.insert(i, v);
                                v
                            }
                        },
                    });
                }
                result.new_faces.push(store.add_face(&ids)?);
            }
            store.remove_face(face)?;
            result.removed_faces.push(face);
            for k in here {
                chords[k].built = true;
            }
        }

        let mut clicks: Vec<(usize, VertexId)> = click_vertices.iter().map(|(&i, &v)| (i, v)).collect();
        clicks.sort_unstable_by_key(|&(i, _)| i);
        result.new_vertices.extend(clicks.into_iter().map(|(_, v)| v));

        // Perimeter: chord edges in path order.
        for chord in chords.iter().filter(|c| c.built) {
            let ids: Vec<VertexId> = chord
                .corners
                .iter()
                .filter_map(|c| match c {
                    Corner::Vertex(v) => Some(*v),
                    Corner::Click(i) => click_vertices.get(i).copied(),
                })
                .collect();
            for pair in ids.windows(2) {
                if let Some(e) = store.find_edge(pair[0], pair[1]) {
                    result.perimeter.push(e);
                }
            }
        }

        // Step 5: orientation.
        result.flipped = RepairNormals::new(result.new_faces.clone()).execute(store)?;

        info!(
            crossings = crossing_vertices.len(),
            perimeter = result.perimeter.len(),
            new_faces = result.new_faces.len(),
            removed_faces = result.removed_faces.len(),
            issues = result.issues.len(),
            "cut committed"
        );
        Ok(result)
    }
}

/// Crossings within this fraction of an edge end go through the end vertex.
const VERTEX_SNAP: f64 = 1e-6;

/// The edge end a crossing lies on, if any.
fn endpoint_vertex(store: &MeshStore, crossing: &Crossing) -> Result<Option<VertexId>> {
    let edge = store.edge(crossing.edge)?;
    Ok(if crossing.t <= VERTEX_SNAP {
        Some(edge.start)
    } else if crossing.t >= 1.0 - VERTEX_SNAP {
        Some(edge.end)
    } else {
        None
    })
}

/// Joins consecutive crossing vertices (and the last to the first when
/// cyclic) through the face they share.
///
/// Click points between the two crossings become interior corners when they
/// lie on that face.
fn build_chords(
    store: &MeshStore,
    nodes: &[CutNode],
    node_vertex: &[Option<VertexId>],
    cyclic: bool,
    issues: &mut Vec<SurgeryIssue>,
) -> Result<Vec<Chord>> {
    let crossings: Vec<usize> = (0..nodes.len()).filter(|&i| node_vertex[i].is_some()).collect();
    let mut pairs: Vec<(usize, usize)> = crossings.windows(2).map(|w| (w[0], w[1])).collect();
    if cyclic && crossings.len() > 1 {
        pairs.push((crossings[crossings.len() - 1], crossings[0]));
    }

    let mut chords = Vec::with_capacity(pairs.len());
    for (a, b) in pairs {
        let (Some(va), Some(vb)) = (node_vertex[a], node_vertex[b]) else {
            continue;
        };
        let between: Vec<usize> = if a < b {
            (a + 1..b).collect()
        } else {
            (a + 1..nodes.len()).chain(0..b).collect()
        };

        let faces_b = store.vertex_faces(vb)?;
        let common: Vec<FaceId> = store
            .vertex_faces(va)?
            .into_iter()
            .filter(|f| faces_b.contains(f))
            .collect();
        let click_face = between.iter().find_map(|&i| match nodes[i] {
            CutNode::Click { face, .. } => Some(face),
            CutNode::Crossing(_) => None,
        });
        let face = match click_face {
            Some(f) if common.contains(&f) => Some(f),
            _ => common.first().copied(),
        };
        let Some(face) = face else {
            warn!("consecutive crossings share no face");
            issues.push(SurgeryIssue {
                face: None,
                kind: IssueKind::NoSharedFace,
            });
            continue;
        };

        let mut corners = vec![Corner::Vertex(va)];
        for i in between {
            if let CutNode::Click { face: on, .. } = nodes[i] {
                if on == face {
                    corners.push(Corner::Click(i));
                } else {
                    warn!(index = i, "click point off its chord face, skipped");
                }
            }
        }
        corners.push(Corner::Vertex(vb));
        chords.push(Chord {
            face,
            corners,
            built: false,
        });
    }
    Ok(chords)
}
