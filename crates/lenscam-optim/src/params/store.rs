use std::collections::HashMap;

use anyhow::{anyhow, ensure, Result};
use lenscam_core::CameraEntity;
use log::debug;
use nalgebra::DVector;

/// Named parameter blocks backing camera entities during a solve.
#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    blocks: HashMap<String, DVector<f64>>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(blocks: HashMap<String, DVector<f64>>) -> Self {
        Self { blocks }
    }

    /// Allocate a block holding the camera's current base parameters.
    pub fn insert_camera<E: CameraEntity>(&mut self, name: &str, camera: &E) {
        let block = camera.parameter_block();
        debug!(
            "store: block {name} <- {} camera ({} params)",
            E::ENTITY_ID,
            block.len()
        );
        self.blocks.insert(name.to_string(), block);
    }

    pub fn insert(&mut self, name: &str, block: DVector<f64>) {
        self.blocks.insert(name.to_string(), block);
    }

    pub fn block(&self, name: &str) -> Option<&DVector<f64>> {
        self.blocks.get(name)
    }

    pub fn block_mut(&mut self, name: &str) -> Option<&mut DVector<f64>> {
        self.blocks.get_mut(name)
    }

    /// The named block, checked to hold exactly `camera.num_parameters()` values.
    pub fn camera_block<E: CameraEntity>(
        &self,
        name: &str,
        camera: &E,
    ) -> Result<&DVector<f64>> {
        let block = self
            .blocks
            .get(name)
            .ok_or_else(|| anyhow!("parameter block {name} not found"))?;
        ensure!(
            block.len() == camera.num_parameters(),
            "block {name} has {} values, {} camera expects {}",
            block.len(),
            E::ENTITY_ID,
            camera.num_parameters()
        );
        Ok(block)
    }

    /// View of `camera` whose base parameters alias the stored block.
    pub fn view<'a, E: CameraEntity>(
        &'a self,
        name: &str,
        camera: &'a E,
    ) -> Result<E::View<'a, f64>> {
        let block = self.camera_block(name, camera)?;
        Ok(camera.try_view_with_block(block.as_view())?)
    }

    /// Copy the named block into the camera's Meta.
    pub fn write_back<E: CameraEntity>(&self, name: &str, camera: &mut E) -> Result<()> {
        let block = self.camera_block(name, camera)?;
        camera.update_from_block(block.as_view())?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn as_map(&self) -> &HashMap<String, DVector<f64>> {
        &self.blocks
    }

    pub fn into_map(self) -> HashMap<String, DVector<f64>> {
        self.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lenscam_core::{AtanCamera, CameraView};
    use nalgebra::{Vector2, Vector3};

    fn camera() -> AtanCamera {
        AtanCamera::new(640, 480, 0.0, 0.8, Vector2::zeros()).with_intrinsics(
            500.0, 500.0, 320.0, 240.0,
        )
    }

    #[test]
    fn store_edits_are_visible_through_view() {
        let cam = camera();
        let mut store = ParameterStore::new();
        store.insert_camera("cam", &cam);

        let x = Vector3::new(0.1, 0.1, 1.0);
        let before = store.view("cam", &cam).unwrap().project(&x);
        store.block_mut("cam").unwrap()[0] = 600.0;
        let after = store.view("cam", &cam).unwrap().project(&x);

        assert!(after.x > before.x);
        assert_eq!(after.y, before.y);
        // the entity itself is untouched until write_back
        assert_eq!(cam.project(&x), before);
    }

    #[test]
    fn write_back_updates_entity() {
        let mut cam = camera();
        let mut store = ParameterStore::new();
        store.insert("cam", nalgebra::dvector![450.0, 460.0, 300.0, 200.0]);
        store.write_back("cam", &mut cam).unwrap();
        assert_eq!(cam.meta().base.fx, 450.0);
        assert_eq!(cam.meta().base.cy, 200.0);
        // distortion is not part of the block
        assert_eq!(cam.gamma(), 0.8);
    }

    #[test]
    fn missing_or_short_blocks_are_errors() {
        let mut cam = camera();
        let mut store = ParameterStore::new();
        assert!(store.view("cam", &cam).is_err());
        assert!(store.write_back("cam", &mut cam).is_err());

        store.insert("cam", nalgebra::dvector![1.0, 2.0, 3.0]);
        assert!(store.write_back("cam", &mut cam).is_err());
        let err = store.view("cam", &cam).err().expect("short block must be rejected");
        assert!(err.to_string().contains("3 values"), "{err}");

        store.insert("cam", nalgebra::dvector![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(store.view("cam", &cam).is_err());
        assert_eq!(cam.parameter_block(), camera().parameter_block());
    }
}
