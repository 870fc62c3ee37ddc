//! Sprite instance data handed to the host's renderer

use bytemuck::{Pod, Zeroable};
use glam::IVec2;

use crate::sim::{Layer, SimObject};

/// One visible sprite, ready to upload as-is
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct SpriteInstance {
    /// Display position in world pixels, wrapped
    pub position: [i32; 2],
    /// Bounding size in pixels
    pub size: i32,
    pub layer: u32,
    pub bank: u32,
    pub frame: u32,
}

impl SpriteInstance {
    pub fn new(layer: Layer, obj: &SimObject) -> Self {
        let p: IVec2 = obj.motion.interp_px();
        Self {
            position: p.to_array(),
            size: obj.size,
            layer: layer.index() as u32,
            bank: obj.anim.bank as u32,
            frame: obj.anim.sprite() as u32,
        }
    }

    pub fn as_bytes(instances: &[SpriteInstance]) -> &[u8] {
        bytemuck::cast_slice(instances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::pool::AnimState;

    #[test]
    fn test_instance_from_object() {
        let mut obj = SimObject::default();
        obj.motion.interp = IVec2::new(40 * 256 + 128, 7 * 256);
        obj.size = 16;
        obj.anim = AnimState::new(4, 10, 2, 8);
        obj.anim.set_frame(1);
        let inst = SpriteInstance::new(Layer::Enemies, &obj);
        assert_eq!(inst.position, [40, 7]);
        assert_eq!(inst.layer, Layer::Enemies.index() as u32);
        assert_eq!((inst.bank, inst.frame, inst.size), (4, 11, 16));
        assert_eq!(SpriteInstance::as_bytes(&[inst]).len(), 24);
    }
}
