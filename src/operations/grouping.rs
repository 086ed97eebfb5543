use tracing::warn;

use crate::topology::FaceId;

/// Point indices grouped by the face they lie on.
#[derive(Debug, Clone, Default)]
pub struct FaceGroups {
    /// Groups in order of insertion; each face appears once.
    groups: Vec<(FaceId, Vec<usize>)>,
    /// Indices `i` such that points `i` and `i + 1` lie on different faces.
    pub face_changes: Vec<usize>,
    /// Faces re-entered without wrapping through the first point. The later
    /// runs on these faces are not part of any group.
    pub revisited: Vec<FaceId>,
}

impl FaceGroups {
    /// Point indices on `face`, in path order.
    #[must_use]
    pub fn get(&self, face: FaceId) -> Option<&[usize]> {
        self.groups
            .iter()
            .find(|(f, _)| *f == face)
            .map(|(_, g)| g.as_slice())
    }

    #[must_use]
    pub fn contains(&self, face: FaceId) -> bool {
        self.get(face).is_some()
    }

    /// Groups in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (FaceId, &[usize])> {
        self.groups.iter().map(|(f, g)| (*f, g.as_slice()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Commits a finished run to `face`.
    ///
    /// A run for a face that already has a group is only accepted when that
    /// group holds the first point, i.e. the path has wrapped around; the run
    /// is then placed in front of it.
    fn commit(&mut self, face: FaceId, run: Vec<usize>) {
        match self.groups.iter_mut().find(|(f, _)| *f == face) {
            None => self.groups.push((face, run)),
            Some((_, existing)) if existing.contains(&0) => {
                let mut merged = run;
                merged.append(existing);
                *existing = merged;
            }
            Some(_) => {
                warn!(?face, "face entered more than once, later points ignored");
                if !self.revisited.contains(&face) {
                    self.revisited.push(face);
                }
            }
        }
    }

    fn remove(&mut self, face: FaceId) {
        self.groups.retain(|(f, _)| *f != face);
    }

    fn group_mut(&mut self, face: FaceId) -> Option<&mut Vec<usize>> {
        self.groups
            .iter_mut()
            .find(|(f, _)| *f == face)
            .map(|(_, g)| g)
    }
}

/// Partitions a point sequence by face.
///
/// One forward pass over the per-point faces. Every face change closes the
/// running group; the last point decides whether the final run wraps into
/// the first group. For an open cut bound to boundary edges, the terminal
/// points are trimmed from the groups of their faces.
pub struct FaceGrouping {
    faces: Vec<FaceId>,
    cyclic: bool,
    start_face: Option<FaceId>,
    end_face: Option<FaceId>,
}

impl FaceGrouping {
    /// Creates a new `FaceGrouping` over the face of each point.
    #[must_use]
    pub fn new(faces: Vec<FaceId>, cyclic: bool) -> Self {
        Self {
            faces,
            cyclic,
            start_face: None,
            end_face: None,
        }
    }

    /// Faces of the boundary edges bound to the first and last point.
    #[must_use]
    pub fn with_terminals(mut self, start_face: Option<FaceId>, end_face: Option<FaceId>) -> Self {
        self.start_face = start_face;
        self.end_face = end_face;
        self
    }

    /// Executes the grouping.
    #[must_use]
    pub fn execute(&self) -> FaceGroups {
        let mut out = FaceGroups::default();
        let Some(&first) = self.faces.first() else {
            return out;
        };
        let last_index = self.faces.len() - 1;

        let mut current = first;
        let mut run = vec![0];

        for (i, &face) in self.faces.iter().enumerate().skip(1) {
            if face == current {
                run.push(i);
            } else {
                out.face_changes.push(i - 1);
                out.commit(current, std::mem::replace(&mut run, vec![i]));
                current = face;
            }
        }

        // The final run either wraps into the first group or stands alone.
        if self.faces[last_index] != first && self.cyclic {
            out.face_changes.push(last_index);
        }
        out.commit(current, run);

        if !self.cyclic {
            if let Some(face) = self.start_face {
                trim(&mut out, face, |g| {
                    g.remove(0);
                });
            }
            if let Some(face) = self.end_face {
                trim(&mut out, face, |g| {
                    g.pop();
                });
            }
        }

        out
    }
}

/// Drops one terminal point from the group of `face`, or the whole group
/// when it holds nothing else.
fn trim(groups: &mut FaceGroups, face: FaceId, drop_point: impl FnOnce(&mut Vec<usize>)) {
    let Some(group) = groups.group_mut(face) else {
        return;
    };
    if group.len() <= 1 {
        groups.remove(face);
    } else {
        drop_point(group);
    }
}
