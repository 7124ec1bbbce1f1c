//! Incremental installation of merged boxes into a physics world.
//!
//! After every merge pass the landscape hands the new box list to [`CollisionBodySync`], which
//! compares it by value against the boxes it installed last time:
//! - boxes that disappeared lose their body,
//! - boxes that are new get a static cuboid body,
//! - boxes present in both lists keep their existing body untouched.
//!
//! Keeping unchanged bodies alive avoids disturbing contacts the solver has already settled,
//! which matters when terrain is edited while bodies rest on it.

use std::collections::{BTreeMap, BTreeSet};

use nalgebra::Vector3;

use crate::{
    error::PhysicsError, physics::PhysicsWorld, rapier::StaticBodyDef, voxel_box::VoxelBox,
};

/// What one [`CollisionBodySync::sync`] call changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Boxes that received a new body, in ascending box order.
    pub added: Vec<VoxelBox>,
    /// Boxes whose body was removed, in ascending box order.
    pub removed: Vec<VoxelBox>,
    /// Number of boxes whose body was kept as is.
    pub kept: usize,
}

impl SyncReport {
    #[inline]
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Tracks which physics body belongs to which box.
///
/// The map always mirrors the bodies that are actually installed, including after a failed
/// sync, so a later call can pick up where the failed one stopped.
pub struct CollisionBodySync<W: PhysicsWorld> {
    installed: BTreeMap<VoxelBox, W::BodyHandle>,
}

impl<W: PhysicsWorld> Default for CollisionBodySync<W> {
    fn default() -> Self {
        Self {
            installed: BTreeMap::new(),
        }
    }
}

impl<W: PhysicsWorld> CollisionBodySync<W> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of installed box bodies.
    #[inline]
    pub fn len(&self) -> usize {
        self.installed.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.installed.is_empty()
    }

    /// Body installed for `voxel_box`, if any.
    #[inline]
    pub fn handle(&self, voxel_box: &VoxelBox) -> Option<W::BodyHandle> {
        self.installed.get(voxel_box).copied()
    }

    /// Installed boxes and their bodies, in ascending box order.
    pub fn iter(&self) -> impl Iterator<Item = (&VoxelBox, &W::BodyHandle)> {
        self.installed.iter()
    }

    /// Make the installed bodies match `boxes`.
    ///
    /// Removals run before additions. The first physics error aborts the call and is returned
    /// unchanged; there is no retry.
    pub fn sync(
        &mut self,
        world: &mut W,
        boxes: &[VoxelBox],
        cell_size: Vector3<f32>,
    ) -> Result<SyncReport, PhysicsError> {
        let wanted: BTreeSet<VoxelBox> = boxes.iter().copied().collect();
        let mut report = SyncReport::default();

        let stale: Vec<VoxelBox> = self
            .installed
            .keys()
            .filter(|b| !wanted.contains(b))
            .copied()
            .collect();
        for voxel_box in stale {
            if let Some(handle) = self.installed.get(&voxel_box).copied() {
                world.remove_body(handle)?;
                self.installed.remove(&voxel_box);
                report.removed.push(voxel_box);
            }
        }

        for voxel_box in wanted {
            if self.installed.contains_key(&voxel_box) {
                report.kept += 1;
                continue;
            }
            let def = StaticBodyDef::from_voxel_box(&voxel_box, cell_size);
            let handle = world.add_body(&def)?;
            self.installed.insert(voxel_box, handle);
            report.added.push(voxel_box);
        }

        log::debug!(
            "box body sync: +{} -{} ={}",
            report.added.len(),
            report.removed.len(),
            report.kept
        );

        Ok(report)
    }

    /// Remove every installed box body.
    pub fn clear(&mut self, world: &mut W) -> Result<usize, PhysicsError> {
        let mut removed = 0;
        while let Some((voxel_box, handle)) = self.installed.pop_first() {
            if let Err(err) = world.remove_body(handle) {
                self.installed.insert(voxel_box, handle);
                return Err(err);
            }
            removed += 1;
        }
        Ok(removed)
    }
}
