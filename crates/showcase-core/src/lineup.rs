//! Lineup arrangement: assets in a spaced row
//!
//! Spacing is derived from the largest asset so every instance fits in its
//! slot. Periodic padding appends linked duplicates of the boundary
//! instances at both ends. A looping clip also extends the tail by the
//! distance the row travels, so the padded window is still full at the
//! closing key.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::constants::MIN_SPACING_UNIT;
use crate::error::{PlanError, PlanResult};
use crate::math::Axis;
use crate::scene::{HierarchyId, SceneSession};

/// Lineup layout options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineupSettings {
    /// Axis the row extends along
    pub spacing_axis: Axis,
    /// Spacing as a multiple of the largest extent along the axis
    pub gap_multiplier: f32,
    /// Boundary instances duplicated at each end (0 disables padding)
    pub loop_pad: usize,
    /// Extra periodic slots after the trailing padding, one per spacing unit
    /// the row travels
    pub tail_extension: usize,
}

impl Default for LineupSettings {
    fn default() -> Self {
        Self {
            spacing_axis: Axis::Y,
            gap_multiplier: 1.25,
            loop_pad: 0,
            tail_extension: 0,
        }
    }
}

/// One placed instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineupEntry {
    /// Root handle of the placed hierarchy
    pub handle: Uuid,
    /// Hierarchy placed in this slot
    pub hierarchy: HierarchyId,
    /// Index of the original instance this entry shows
    pub source_index: usize,
    /// Slot relative to the first original instance
    pub offset: i64,
    /// Where the instance's bounds center sits in lineup space
    pub position: Vec3,
    /// Root translation that centers the instance on its own origin
    pub root_offset: Vec3,
    /// Linked duplicate outside the original run
    pub is_padding: bool,
}

impl LineupEntry {
    /// Root translation placing the instance at its slot
    pub fn root_translation(&self) -> Vec3 {
        self.root_offset + self.position
    }
}

/// Ordered placements for a whole lineup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineupPlan {
    /// Entries ordered by slot
    pub entries: Vec<LineupEntry>,
    /// Distance between neighbouring slots
    pub spacing: f32,
    /// Axis the row extends along
    pub spacing_axis: Axis,
    /// Per-axis maximum size over all original instances
    pub max_size: Vec3,
    /// Number of original (unpadded) instances
    pub instance_count: usize,
    /// Duplicates before the first original
    pub loop_pad: usize,
    /// Duplicates after the last original
    pub trailing: usize,
}

impl LineupPlan {
    /// Distance from the first to the last original instance
    pub fn total_length(&self) -> f32 {
        self.instance_count.saturating_sub(1) as f32 * self.spacing
    }

    /// Entries for the original instances, in order
    pub fn originals(&self) -> impl Iterator<Item = &LineupEntry> {
        self.entries.iter().filter(|e| !e.is_padding)
    }

    /// Number of entries including padding
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the plan has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Move every hierarchy root to its slot
    pub fn apply(&self, session: &mut SceneSession) -> PlanResult<()> {
        for entry in &self.entries {
            session
                .get_mut(entry.hierarchy)?
                .set_root_translation(entry.root_translation());
        }
        Ok(())
    }
}

/// Lays out instances along one axis
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LineupArranger {
    /// Layout options
    pub settings: LineupSettings,
}

impl LineupArranger {
    /// Arranger with the given layout options
    pub fn new(settings: LineupSettings) -> Self {
        Self { settings }
    }

    /// Slot spacing for the largest instance size
    pub fn spacing_for(&self, max_size: Vec3) -> PlanResult<f32> {
        let gap = self.settings.gap_multiplier;
        if !gap.is_finite() || gap <= 0.0 {
            return Err(PlanError::invalid_config(format!(
                "gap multiplier must be > 0, got {gap}"
            )));
        }
        let unit = self
            .settings
            .spacing_axis
            .component(max_size)
            .max(MIN_SPACING_UNIT);
        Ok(unit * gap)
    }

    /// Per-axis maximum size over the hierarchies and the resulting spacing
    pub fn measure(&self, session: &SceneSession, ids: &[HierarchyId]) -> PlanResult<(Vec3, f32)> {
        if ids.is_empty() {
            return Err(PlanError::NoAssets);
        }
        let mut max_size = Vec3::ZERO;
        for &id in ids {
            max_size = max_size.max(session.get(id)?.world_bounds().size());
        }
        Ok((max_size, self.spacing_for(max_size)?))
    }

    /// Arrange the given hierarchies (each already centered on its origin).
    ///
    /// With `loop_pad = k` the sequence becomes the last `k` instances, the
    /// originals, then the first `k + tail_extension` instances repeating
    /// periodically; padding entries are linked duplicates added to the
    /// session.
    pub fn arrange(
        &self,
        session: &mut SceneSession,
        ids: &[HierarchyId],
    ) -> PlanResult<LineupPlan> {
        let (max_size, spacing) = self.measure(session, ids)?;

        let count = ids.len();
        let pad = self.settings.loop_pad;
        let trailing = pad + self.settings.tail_extension;
        let axis = self.settings.spacing_axis.unit();
        let mut entries = Vec::with_capacity(pad + count + trailing);
        for slot in 0..pad + count + trailing {
            let offset = slot as i64 - pad as i64;
            let source_index = offset.rem_euclid(count as i64) as usize;
            let is_padding = slot < pad || slot >= pad + count;
            let hierarchy = if is_padding {
                session.link_duplicate(ids[source_index])?
            } else {
                ids[source_index]
            };
            let placed = session.get(hierarchy)?;
            entries.push(LineupEntry {
                handle: placed.root_handle(),
                hierarchy,
                source_index,
                offset,
                position: axis * (offset as f32 * spacing),
                root_offset: placed.root_transform().translation,
                is_padding,
            });
        }

        debug!(?max_size, spacing, "Computed lineup spacing");
        info!(
            instances = count,
            padded = entries.len(),
            spacing,
            "Arranged lineup"
        );
        Ok(LineupPlan {
            entries,
            spacing,
            spacing_axis: self.settings.spacing_axis,
            max_size,
            instance_count: count,
            loop_pad: pad,
            trailing,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::scene::{BoundingBox, Mesh, SceneHierarchy, Transform};
    use approx::assert_relative_eq;

    fn boxed(name: &str, size: Vec3) -> SceneHierarchy {
        let mut h = SceneHierarchy::new(name);
        let mesh = Arc::new(Mesh::new(
            name,
            BoundingBox::from_center_half_extents(Vec3::ZERO, size * 0.5),
        ));
        h.add_node(h.root(), "mesh", Transform::IDENTITY, Some(mesh))
            .unwrap();
        h
    }

    fn session_with(sizes: &[Vec3]) -> (SceneSession, Vec<HierarchyId>) {
        let mut session = SceneSession::new();
        let ids = sizes
            .iter()
            .enumerate()
            .map(|(i, &s)| session.add(boxed(&format!("asset{i}"), s)))
            .collect();
        (session, ids)
    }

    fn arranger(gap: f32, pad: usize) -> LineupArranger {
        LineupArranger::new(LineupSettings {
            spacing_axis: Axis::Y,
            gap_multiplier: gap,
            loop_pad: pad,
            tail_extension: 0,
        })
    }

    #[test]
    fn test_three_instance_lineup() {
        let (mut session, ids) = session_with(&[Vec3::new(2.0, 2.0, 1.0); 3]);
        let plan = arranger(1.5, 0).arrange(&mut session, &ids).unwrap();
        assert_relative_eq!(plan.spacing, 3.0);
        let ys: Vec<f32> = plan.entries.iter().map(|e| e.position.y).collect();
        assert_eq!(ys, vec![0.0, 3.0, 6.0]);
        assert_relative_eq!(plan.total_length(), 6.0);
    }

    #[test]
    fn test_spacing_unit_floor() {
        let (mut session, ids) = session_with(&[Vec3::new(0.2, 0.1, 0.3), Vec3::ZERO]);
        let plan = arranger(1.25, 0).arrange(&mut session, &ids).unwrap();
        assert_relative_eq!(plan.spacing, 1.25);
    }

    #[test]
    fn test_spacing_uses_largest_instance() {
        let (mut session, ids) = session_with(&[
            Vec3::new(1.0, 1.5, 1.0),
            Vec3::new(3.0, 4.0, 1.0),
            Vec3::new(9.0, 2.0, 1.0),
        ]);
        let plan = arranger(1.0, 0).arrange(&mut session, &ids).unwrap();
        assert_eq!(plan.max_size, Vec3::new(9.0, 4.0, 1.0));
        assert_relative_eq!(plan.spacing, 4.0);
    }

    #[test]
    fn test_empty_lineup_is_fatal() {
        let mut session = SceneSession::new();
        let err = arranger(1.0, 0).arrange(&mut session, &[]).unwrap_err();
        assert_eq!(err, PlanError::NoAssets);
    }

    #[test]
    fn test_invalid_gap_multiplier() {
        let (mut session, ids) = session_with(&[Vec3::ONE]);
        assert!(arranger(0.0, 0).arrange(&mut session, &ids).is_err());
    }

    #[test]
    fn test_padding_preserves_middle() {
        let sizes = [Vec3::ONE * 2.0; 4];
        let (mut plain_session, plain_ids) = session_with(&sizes);
        let plain = arranger(1.25, 0)
            .arrange(&mut plain_session, &plain_ids)
            .unwrap();

        let (mut session, ids) = session_with(&sizes);
        let padded = arranger(1.25, 2).arrange(&mut session, &ids).unwrap();

        assert_eq!(padded.len(), 4 + 2 * 2);
        let middle: Vec<Vec3> = padded.entries[2..6].iter().map(|e| e.position).collect();
        let unpadded: Vec<Vec3> = plain.entries.iter().map(|e| e.position).collect();
        assert_eq!(middle, unpadded);
        assert!(padded.entries[2..6].iter().all(|e| !e.is_padding));
        assert_eq!(padded.originals().count(), 4);
    }

    #[test]
    fn test_padding_wraps_boundary_instances() {
        let (mut session, ids) = session_with(&[Vec3::ONE; 3]);
        let plan = arranger(1.0, 2).arrange(&mut session, &ids).unwrap();
        let sources: Vec<usize> = plan.entries.iter().map(|e| e.source_index).collect();
        assert_eq!(sources, vec![1, 2, 0, 1, 2, 0, 1]);
        let offsets: Vec<i64> = plan.entries.iter().map(|e| e.offset).collect();
        assert_eq!(offsets, vec![-2, -1, 0, 1, 2, 3, 4]);
        assert_eq!(plan.entries[2].position, Vec3::ZERO);
    }

    #[test]
    fn test_padding_wraps_past_instance_count() {
        let (mut session, ids) = session_with(&[Vec3::ONE; 2]);
        let plan = arranger(1.0, 3).arrange(&mut session, &ids).unwrap();
        let sources: Vec<usize> = plan.entries.iter().map(|e| e.source_index).collect();
        assert_eq!(sources, vec![1, 0, 1, 0, 1, 0, 1, 0]);
    }

    #[test]
    fn test_tail_extension_continues_period() {
        let (mut session, ids) = session_with(&[Vec3::ONE; 3]);
        let plan = LineupArranger::new(LineupSettings {
            loop_pad: 1,
            tail_extension: 3,
            gap_multiplier: 1.0,
            ..LineupSettings::default()
        })
        .arrange(&mut session, &ids)
        .unwrap();

        assert_eq!(plan.len(), 1 + 3 + 4);
        assert_eq!(plan.trailing, 4);
        assert_eq!(session.len(), 8);
        let sources: Vec<usize> = plan.entries.iter().map(|e| e.source_index).collect();
        assert_eq!(sources, vec![2, 0, 1, 2, 0, 1, 2, 0]);
        assert_eq!(plan.originals().count(), 3);
        assert!(plan.entries[4..].iter().all(|e| e.is_padding));
        assert_relative_eq!(plan.entries.last().unwrap().position.y, 6.0);
    }

    #[test]
    fn test_measure_matches_arranged_spacing() {
        let (mut session, ids) = session_with(&[Vec3::new(1.0, 3.0, 1.0), Vec3::ONE]);
        let arranger = arranger(1.5, 1);
        let (max_size, spacing) = arranger.measure(&session, &ids).unwrap();
        let plan = arranger.arrange(&mut session, &ids).unwrap();
        assert_eq!(max_size, plan.max_size);
        assert_relative_eq!(spacing, plan.spacing);
        assert_eq!(
            arranger.measure(&session, &[]).unwrap_err(),
            PlanError::NoAssets
        );
    }

    #[test]
    fn test_padding_shares_geometry() {
        let (mut session, ids) = session_with(&[Vec3::ONE; 2]);
        let plan = arranger(1.0, 1).arrange(&mut session, &ids).unwrap();
        assert_eq!(session.len(), 4);

        let first_pad = &plan.entries[0];
        assert!(first_pad.is_padding);
        assert_ne!(first_pad.hierarchy, ids[1]);
        assert_ne!(first_pad.handle, session.get(ids[1]).unwrap().root_handle());

        let mesh_of = |id: HierarchyId| {
            session.get(id).unwrap().nodes()[1]
                .mesh
                .clone()
                .unwrap()
        };
        assert!(Arc::ptr_eq(&mesh_of(first_pad.hierarchy), &mesh_of(ids[1])));
    }

    #[test]
    fn test_apply_moves_roots_independently() {
        let (mut session, ids) = session_with(&[Vec3::ONE; 2]);
        let plan = arranger(2.0, 1).arrange(&mut session, &ids).unwrap();
        plan.apply(&mut session).unwrap();
        for entry in &plan.entries {
            let root = session.get(entry.hierarchy).unwrap().root_transform();
            assert_eq!(root.translation, entry.root_translation());
        }
        // The padded copy of instance 0 sits past the end, the original at the origin
        let tail = plan.entries.last().unwrap();
        assert_eq!(tail.source_index, 0);
        assert_relative_eq!(tail.position.y, 4.0);
    }

    #[test]
    fn test_apply_preserves_root_offset() {
        let mut session = SceneSession::new();
        let mut off_center = boxed("off", Vec3::ONE);
        off_center.set_root_translation(Vec3::new(0.5, -1.0, 0.0));
        let id = session.add(off_center);
        let other = session.add(boxed("other", Vec3::ONE));

        let plan = arranger(1.0, 0).arrange(&mut session, &[other, id]).unwrap();
        plan.apply(&mut session).unwrap();

        let center = session.get(id).unwrap().world_bounds().center();
        assert!(center.abs_diff_eq(Vec3::new(0.5, 0.0, 0.0), 1e-5));
    }
}
