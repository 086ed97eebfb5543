use crate::topology::VertexId;

/// A corner of a loop under construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) enum Corner {
    /// A vertex already in the store.
    Vertex(VertexId),
    /// A click point, by cut node index; created only if the split succeeds.
    Click(usize),
}

/// Splits `outer` along each chord in turn.
///
/// A chord runs from one loop corner to another through optional interior
/// corners. Each chord is applied to the sub-loop holding both of its ends:
/// one side walks the loop forward from the first end to the second and
/// returns along the reversed chord, the other walks on from the second end
/// back to the first and follows the chord forward. Both keep the winding of
/// `outer`. A chord without interior corners whose ends are already adjacent
/// is a loop edge and leaves the loops unchanged.
///
/// Returns the index of the first chord that fits no sub-loop on failure.
pub(super) fn split_loop(outer: &[Corner], chords: &[Vec<Corner>]) -> Result<Vec<Vec<Corner>>, usize> {
    let mut loops = vec![outer.to_vec()];

    for (k, chord) in chords.iter().enumerate() {
        let (Some(&a), Some(&b)) = (chord.first(), chord.last()) else {
            return Err(k);
        };
        if chord.len() < 2 || a == b {
            return Err(k);
        }
        let interior = &chord[1..chord.len() - 1];

        let Some(li) = loops.iter().position(|l| l.contains(&a) && l.contains(&b)) else {
            return Err(k);
        };
        let current = &loops[li];
        let n = current.len();
        let (Some(i), Some(j)) = (
            current.iter().position(|&c| c == a),
            current.iter().position(|&c| c == b),
        ) else {
            return Err(k);
        };

        let mut first: Vec<Corner> = (0..=(j + n - i) % n).map(|s| current[(i + s) % n]).collect();
        let mut second: Vec<Corner> = (0..=(i + n - j) % n).map(|s| current[(j + s) % n]).collect();
        first.extend(interior.iter().rev());
        second.extend(interior.iter());

        if first.len() < 3 || second.len() < 3 {
            continue;
        }
        loops[li] = first;
        loops.push(second);
    }

    Ok(loops)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::grid;

    fn corners() -> Vec<Corner> {
        grid(1, 1)
            .vertex_ids
            .into_iter()
            .map(Corner::Vertex)
            .collect()
    }

    #[test]
    fn diagonal_splits_square_in_two() {
        // Grid vertex order is (0,0) (1,0) (0,1) (1,1).
        let v = corners();
        let outer = vec![v[0], v[1], v[3], v[2]];
        let loops = split_loop(&outer, &[vec![v[0], v[3]]]).unwrap();
        assert_eq!(loops, vec![vec![v[0], v[1], v[3]], vec![v[3], v[2], v[0]]]);
    }

    #[test]
    fn chord_interior_is_shared_in_opposite_directions() {
        let v = corners();
        let outer = vec![v[0], v[1], v[3], v[2]];
        let x = Corner::Click(7);
        let loops = split_loop(&outer, &[vec![v[0], x, v[3]]]).unwrap();
        assert_eq!(loops[0], vec![v[0], v[1], v[3], x]);
        assert_eq!(loops[1], vec![v[3], v[2], v[0], x]);
    }

    #[test]
    fn second_chord_splits_matching_sub_loop() {
        let v = corners();
        let c = [Corner::Click(0), Corner::Click(1), Corner::Click(2), Corner::Click(3)];
        // Two crossings per side pair: a band across the square.
        let ring = vec![v[0], c[0], v[1], c[1], v[3], c[2], v[2], c[3]];
        let loops = split_loop(&ring, &[vec![c[0], c[2]], vec![c[1], c[3]]]);
        // The chords cross each other, so the second cannot be applied.
        assert_eq!(loops, Err(1));

        let loops = split_loop(&ring, &[vec![c[3], c[1]], vec![c[0], c[1]]]).unwrap();
        assert_eq!(loops.len(), 3);
        assert_eq!(loops[1], vec![c[1], v[3], c[2], v[2], c[3]]);
    }

    #[test]
    fn adjacent_ends_are_an_existing_edge() {
        let v = corners();
        let outer = vec![v[0], v[1], v[3], v[2]];
        let loops = split_loop(&outer, &[vec![v[0], v[1]]]).unwrap();
        assert_eq!(loops, vec![outer]);
    }
}
