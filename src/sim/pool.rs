//! Fixed-capacity object pool with per-layer intrusive lists
//!
//! Every moving thing in the world (ship, bolts, actors) is a [`SimObject`]
//! living in one dense array. Free objects form a singly-linked stack; each
//! render layer is a doubly-linked list threaded through the same array by
//! index, so acquire, release, attach and detach are all O(1).
//!
//! Free-list reuse order is unspecified. Nothing in the simulation may depend
//! on which slot an object lands in.

use serde::{Deserialize, Serialize};

use super::kinds::KindId;
use super::motion::MotionPoint;

/// Stable index of a pooled object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectHandle(u32);

impl ObjectHandle {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Ordered render layers, back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    /// Map sentries (cannons, cores)
    Bases,
    Enemies,
    Player,
    Bullets,
    /// Explosions and other effects
    Fx,
}

impl Layer {
    pub const COUNT: usize = 5;
    pub const ALL: [Layer; Layer::COUNT] = [
        Layer::Bases,
        Layer::Enemies,
        Layer::Player,
        Layer::Bullets,
        Layer::Fx,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Object status bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectFlags {
    /// Linked into a layer list
    pub active: bool,
    pub visible: bool,
    /// On-death handling has started
    pub dying: bool,
    pub animated: bool,
}

/// Who drives an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Ship,
    Bolt,
    Actor(KindId),
}

/// Sprite animation cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimState {
    pub bank: u16,
    /// First frame of the sequence within the bank
    pub base: u16,
    /// Offset from `base`
    pub frame: u16,
    /// Frames in the sequence (at least 1)
    pub frames: u16,
    /// Ticks each frame is held; 0 freezes the animation
    pub speed: u16,
    timer: u16,
    /// Set once the sequence has played through
    pub looped: bool,
}

impl AnimState {
    pub fn new(bank: u16, base: u16, frames: u16, speed: u16) -> Self {
        Self {
            bank,
            base,
            frame: 0,
            frames: frames.max(1),
            speed,
            timer: 0,
            looped: false,
        }
    }

    /// Frame index within the bank.
    pub fn sprite(&self) -> u16 {
        self.base.saturating_add(self.frame)
    }

    /// Jump to a frame offset; out-of-range frames clamp to the last one.
    pub fn set_frame(&mut self, frame: u16) {
        self.frame = frame.min(self.frames.max(1) - 1);
        self.timer = 0;
    }

    /// Advance by one tick. Returns true when the sequence wraps.
    pub fn advance(&mut self) -> bool {
        if self.speed == 0 {
            return false;
        }
        self.timer += 1;
        if self.timer < self.speed {
            return false;
        }
        self.timer = 0;
        self.frame += 1;
        if self.frame >= self.frames.max(1) {
            self.frame = 0;
            self.looped = true;
            return true;
        }
        false
    }
}

/// A pooled simulation object.
#[derive(Debug, Clone, Default)]
pub struct SimObject {
    /// Render layer, `None` while unattached
    pub layer: Option<Layer>,
    pub motion: MotionPoint,
    /// Bounding size in pixels
    pub size: i32,
    pub flags: ObjectFlags,
    pub anim: AnimState,
    /// `None` means dead/free; such an object is never in a layer list
    pub owner: Option<Owner>,
    prev: Option<u32>,
    /// Next in the layer list, or next free object while pooled
    next: Option<u32>,
    pooled: bool,
}

/// The object arena.
#[derive(Debug, Clone)]
pub struct ObjectPool {
    objects: Vec<SimObject>,
    heads: [Option<u32>; Layer::COUNT],
    free_head: Option<u32>,
    free_count: usize,
    violations: u32,
}

impl ObjectPool {
    /// Create a pool with a fixed capacity. There is no growth.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.min(u32::MAX as usize);
        let mut pool = Self {
            objects: vec![SimObject::default(); capacity],
            heads: [None; Layer::COUNT],
            free_head: None,
            free_count: 0,
            violations: 0,
        };
        // Push in reverse so the first acquire returns slot 0
        for i in (0..capacity).rev() {
            let obj = &mut pool.objects[i];
            obj.pooled = true;
            obj.next = pool.free_head;
            pool.free_head = Some(i as u32);
            pool.free_count += 1;
        }
        pool
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn free_count(&self) -> usize {
        self.free_count
    }

    #[inline]
    pub fn live_count(&self) -> usize {
        self.capacity() - self.free_count
    }

    /// Contract violations seen so far (double release, attaching a free object).
    pub fn violations(&self) -> u32 {
        self.violations
    }

    /// Take an object off the free list. `None` when exhausted.
    pub fn acquire(&mut self) -> Option<ObjectHandle> {
        let index = self.free_head?;
        let obj = &mut self.objects[index as usize];
        self.free_head = obj.next.take();
        obj.pooled = false;
        self.free_count -= 1;
        Some(ObjectHandle(index))
    }

    /// Clear an object, unlink it from its layer and push it back on the free list.
    pub fn release(&mut self, handle: ObjectHandle) {
        let Some(obj) = self.objects.get(handle.index()) else {
            self.violation("release of out-of-range handle", handle);
            return;
        };
        if obj.pooled {
            self.violation("double release", handle);
            return;
        }
        self.detach(handle);
        let obj = &mut self.objects[handle.index()];
        *obj = SimObject {
            pooled: true,
            next: self.free_head,
            ..SimObject::default()
        };
        self.free_head = Some(handle.0);
        self.free_count += 1;
    }

    /// Link an object at the head of a layer list (re-attaching moves it).
    pub fn attach(&mut self, handle: ObjectHandle, layer: Layer) {
        match self.objects.get(handle.index()) {
            None => {
                self.violation("attach of out-of-range handle", handle);
                return;
            }
            Some(obj) if obj.pooled => {
                self.violation("attach of free object", handle);
                return;
            }
            Some(_) => {}
        }
        self.detach(handle);
        let old_head = self.heads[layer.index()];
        if let Some(h) = old_head {
            self.objects[h as usize].prev = Some(handle.0);
        }
        let obj = &mut self.objects[handle.index()];
        obj.prev = None;
        obj.next = old_head;
        obj.layer = Some(layer);
        obj.flags.active = true;
        self.heads[layer.index()] = Some(handle.0);
    }

    /// Unlink an object from its layer list. No-op when unattached.
    pub fn detach(&mut self, handle: ObjectHandle) {
        let Some(obj) = self.objects.get(handle.index()) else {
            return;
        };
        let Some(layer) = obj.layer else {
            return;
        };
        let (prev, next) = (obj.prev, obj.next);
        match prev {
            Some(p) => self.objects[p as usize].next = next,
            None => self.heads[layer.index()] = next,
        }
        if let Some(n) = next {
            self.objects[n as usize].prev = prev;
        }
        let obj = &mut self.objects[handle.index()];
        obj.layer = None;
        obj.prev = None;
        obj.next = None;
        obj.flags.active = false;
    }

    pub fn get(&self, handle: ObjectHandle) -> Option<&SimObject> {
        self.objects.get(handle.index()).filter(|o| !o.pooled)
    }

    pub fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut SimObject> {
        self.objects.get_mut(handle.index()).filter(|o| !o.pooled)
    }

    /// Handles in a layer, most recently attached first.
    pub fn iter_layer(&self, layer: Layer) -> LayerIter<'_> {
        LayerIter {
            pool: self,
            cursor: self.heads[layer.index()],
        }
    }

    /// Every object currently linked into some layer.
    pub fn attached_mut(&mut self) -> impl Iterator<Item = &mut SimObject> {
        self.objects.iter_mut().filter(|o| o.layer.is_some())
    }

    /// Number of objects linked into a layer.
    pub fn layer_len(&self, layer: Layer) -> usize {
        self.iter_layer(layer).count()
    }

    fn violation(&mut self, what: &str, handle: ObjectHandle) {
        self.violations += 1;
        log::warn!("object pool: {} (slot {})", what, handle.0);
    }
}

/// Iterator over one layer list.
pub struct LayerIter<'a> {
    pool: &'a ObjectPool,
    cursor: Option<u32>,
}

impl Iterator for LayerIter<'_> {
    type Item = ObjectHandle;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        self.cursor = self.pool.objects[index as usize].next;
        Some(ObjectHandle(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_acquire_until_exhausted() {
        let mut pool = ObjectPool::new(3);
        let handles: Vec<_> = (0..3).filter_map(|_| pool.acquire()).collect();
        assert_eq!(handles.len(), 3);
        assert!(pool.acquire().is_none());
        assert_eq!(pool.live_count(), 3);
        pool.release(handles[1]);
        assert_eq!(pool.acquire(), Some(handles[1]));
    }

    #[test]
    fn test_attach_inserts_at_head() {
        let mut pool = ObjectPool::new(4);
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        let c = pool.acquire().unwrap();
        pool.attach(a, Layer::Enemies);
        pool.attach(b, Layer::Enemies);
        pool.attach(c, Layer::Fx);
        let order: Vec<_> = pool.iter_layer(Layer::Enemies).collect();
        assert_eq!(order, vec![b, a]);
        assert_eq!(pool.layer_len(Layer::Fx), 1);
        assert!(pool.get(a).unwrap().flags.active);
    }

    #[test]
    fn test_detach_middle_of_list() {
        let mut pool = ObjectPool::new(4);
        let hs: Vec<_> = (0..3).filter_map(|_| pool.acquire()).collect();
        for &h in &hs {
            pool.attach(h, Layer::Bullets);
        }
        pool.detach(hs[1]);
        let order: Vec<_> = pool.iter_layer(Layer::Bullets).collect();
        assert_eq!(order, vec![hs[2], hs[0]]);
        // Idempotent
        pool.detach(hs[1]);
        assert_eq!(pool.layer_len(Layer::Bullets), 2);
        assert!(!pool.get(hs[1]).unwrap().flags.active);
    }

    #[test]
    fn test_reattach_moves_between_layers() {
        let mut pool = ObjectPool::new(2);
        let a = pool.acquire().unwrap();
        pool.attach(a, Layer::Enemies);
        pool.attach(a, Layer::Fx);
        assert_eq!(pool.layer_len(Layer::Enemies), 0);
        assert_eq!(pool.layer_len(Layer::Fx), 1);
    }

    #[test]
    fn test_release_detaches_and_clears() {
        let mut pool = ObjectPool::new(2);
        let a = pool.acquire().unwrap();
        pool.get_mut(a).unwrap().size = 12;
        pool.attach(a, Layer::Player);
        pool.release(a);
        assert_eq!(pool.layer_len(Layer::Player), 0);
        assert!(pool.get(a).is_none());
        let again = pool.acquire().unwrap();
        assert_eq!(pool.get(again).unwrap().size, 0);
    }

    #[test]
    fn test_double_release_is_flagged_not_fatal() {
        let mut pool = ObjectPool::new(2);
        let a = pool.acquire().unwrap();
        pool.release(a);
        pool.release(a);
        assert_eq!(pool.violations(), 1);
        assert_eq!(pool.free_count(), 2);
        pool.attach(a, Layer::Fx);
        assert_eq!(pool.violations(), 2);
        assert_eq!(pool.layer_len(Layer::Fx), 0);
    }

    #[test]
    fn test_anim_advance_wraps() {
        let mut anim = AnimState::new(1, 12, 3, 2);
        assert_eq!(anim.sprite(), 12);
        let wraps: Vec<bool> = (0..6).map(|_| anim.advance()).collect();
        assert_eq!(wraps, vec![false, false, false, false, false, true]);
        assert!(anim.looped);
        assert_eq!(anim.sprite(), 12);
        anim.set_frame(40);
        assert_eq!(anim.frame, 2);
        assert_eq!(anim.sprite(), 14);
    }

    proptest! {
        #[test]
        fn prop_pool_conservation(ops in proptest::collection::vec((any::<bool>(), 0usize..16, 0usize..5), 1..200)) {
            let mut pool = ObjectPool::new(16);
            let mut held: Vec<ObjectHandle> = Vec::new();
            for (acquire, pick, layer) in ops {
                if acquire {
                    if let Some(h) = pool.acquire() {
                        pool.attach(h, Layer::ALL[layer % Layer::COUNT]);
                        held.push(h);
                    }
                } else if !held.is_empty() {
                    let h = held.swap_remove(pick % held.len());
                    pool.release(h);
                }
                prop_assert_eq!(pool.live_count() + pool.free_count(), pool.capacity());
                prop_assert_eq!(pool.live_count(), held.len());
                let linked: usize = Layer::ALL.iter().map(|&l| pool.layer_len(l)).sum();
                prop_assert_eq!(linked, held.len());
            }
            prop_assert_eq!(pool.violations(), 0);
        }
    }
}
