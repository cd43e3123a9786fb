use glam::Vec2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    collision::{aabb::Aabb, dynamic_tree::DynamicTree, queries::RayCastInput},
    config::{Settings, AABB_EXTENSION, AABB_MULTIPLIER},
    utils::allocator::FixtureId,
};

/// Handle of a broad-phase proxy. Callers track the unregistered state as
/// `Option<ProxyId>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProxyId(u32);

impl ProxyId {
    pub fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// User data stored with each proxy: which fixture child it bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProxyKey {
    pub fixture: FixtureId,
    pub child_index: usize,
}

/// Spatial index over fat AABBs, as consumed by fixtures and the contact
/// manager.
///
/// Proxies created, moved out of their fat box or touched since the last
/// [`update_pairs`](BroadPhase::update_pairs) call are "buffered"; only pairs
/// involving a buffered proxy are reported.
pub trait BroadPhase {
    /// Registers `aabb` and returns the new proxy handle.
    fn create_proxy(&mut self, aabb: Aabb, key: ProxyKey) -> ProxyId;

    fn destroy_proxy(&mut self, proxy: ProxyId);

    /// Updates the tight bounds of a proxy. `displacement` is the motion of
    /// the owner over the step and may be used to predict the next box.
    fn move_proxy(&mut self, proxy: ProxyId, aabb: Aabb, displacement: Vec2);

    /// Re-reports every pair of `proxy` on the next pair update.
    fn touch_proxy(&mut self, proxy: ProxyId);

    fn user_data(&self, proxy: ProxyId) -> Option<ProxyKey>;

    fn fat_aabb(&self, proxy: ProxyId) -> Option<Aabb>;

    fn proxy_count(&self) -> usize;

    /// Reports each overlapping pair involving a buffered proxy once, then
    /// clears the buffer.
    fn update_pairs(&mut self, callback: &mut dyn FnMut(ProxyKey, ProxyKey));

    /// Visits proxies whose fat box overlaps `aabb` until `callback` returns
    /// `false`.
    fn query(&self, aabb: &Aabb, callback: &mut dyn FnMut(ProxyId) -> bool);

    /// Visits proxies whose fat box the segment of `input` enters until
    /// `callback` returns `false`.
    fn raycast(&self, input: &RayCastInput, callback: &mut dyn FnMut(ProxyId) -> bool);

    fn test_overlap(&self, a: ProxyId, b: ProxyId) -> bool {
        match (self.fat_aabb(a), self.fat_aabb(b)) {
            (Some(a), Some(b)) => a.overlaps(&b),
            _ => false,
        }
    }
}

/// Tree-backed [`BroadPhase`] with fat boxes and motion prediction.
pub struct TreeBroadPhase {
    tree: DynamicTree,
    move_buffer: Vec<ProxyId>,
    proxy_count: usize,
    aabb_extension: f32,
    aabb_multiplier: f32,
}

impl Default for TreeBroadPhase {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBroadPhase {
    pub fn new() -> Self {
        Self {
            tree: DynamicTree::new(),
            move_buffer: Vec::new(),
            proxy_count: 0,
            aabb_extension: AABB_EXTENSION,
            aabb_multiplier: AABB_MULTIPLIER,
        }
    }

    pub fn with_settings(settings: &Settings) -> Self {
        Self {
            aabb_extension: settings.aabb_extension,
            aabb_multiplier: settings.aabb_multiplier,
            ..Self::new()
        }
    }

    /// Number of proxies waiting for the next pair update.
    pub fn move_count(&self) -> usize {
        self.move_buffer.len()
    }

    pub fn tree(&self) -> &DynamicTree {
        &self.tree
    }

    fn buffer_move(&mut self, proxy: ProxyId) {
        self.move_buffer.push(proxy);
    }

    /// Canonical `(min, max)` pairs between `proxy` and every other proxy
    /// whose fat box overlaps it.
    fn pairs_for(&self, proxy: ProxyId) -> Vec<(ProxyId, ProxyId)> {
        let Some(fat) = self.tree.fat_aabb(proxy.index()) else {
            return Vec::new();
        };
        let mut pairs = Vec::new();
        self.tree.query(&fat, &mut |other| {
            let other = ProxyId::from_index(other);
            if other != proxy {
                pairs.push((proxy.min(other), proxy.max(other)));
            }
            true
        });
        pairs
    }
}

impl BroadPhase for TreeBroadPhase {
    fn create_proxy(&mut self, aabb: Aabb, key: ProxyKey) -> ProxyId {
        let fat = aabb.extended(self.aabb_extension);
        let proxy = ProxyId::from_index(self.tree.create_proxy(fat, key));
        self.proxy_count += 1;
        self.buffer_move(proxy);
        proxy
    }

    fn destroy_proxy(&mut self, proxy: ProxyId) {
        if !self.tree.destroy_proxy(proxy.index()) {
            log::warn!("destroy_proxy on unknown proxy {}", proxy.index());
            return;
        }
        self.move_buffer.retain(|&id| id != proxy);
        self.proxy_count -= 1;
    }

    fn move_proxy(&mut self, proxy: ProxyId, aabb: Aabb, displacement: Vec2) {
        let Some(current) = self.tree.fat_aabb(proxy.index()) else {
            log::warn!("move_proxy on unknown proxy {}", proxy.index());
            return;
        };
        if current.contains(&aabb) {
            return;
        }

        let mut fat = aabb.extended(self.aabb_extension);

        // Stretch the box ahead of the motion.
        let d = displacement * self.aabb_multiplier;
        if d.x < 0.0 {
            fat.lower_bound.x += d.x;
        } else {
            fat.upper_bound.x += d.x;
        }
        if d.y < 0.0 {
            fat.lower_bound.y += d.y;
        } else {
            fat.upper_bound.y += d.y;
        }

        self.tree.move_proxy(proxy.index(), fat);
        self.buffer_move(proxy);
    }

    fn touch_proxy(&mut self, proxy: ProxyId) {
        if self.tree.user_data(proxy.index()).is_some() {
            self.buffer_move(proxy);
        }
    }

    fn user_data(&self, proxy: ProxyId) -> Option<ProxyKey> {
        self.tree.user_data(proxy.index())
    }

    fn fat_aabb(&self, proxy: ProxyId) -> Option<Aabb> {
        self.tree.fat_aabb(proxy.index())
    }

    fn proxy_count(&self) -> usize {
        self.proxy_count
    }

    fn update_pairs(&mut self, callback: &mut dyn FnMut(ProxyKey, ProxyKey)) {
        let mut moved = std::mem::take(&mut self.move_buffer);
        moved.sort_unstable();
        moved.dedup();

        let this = &*self;
        #[cfg(feature = "parallel")]
        let mut pairs: Vec<(ProxyId, ProxyId)> = moved
            .par_iter()
            .flat_map_iter(|&proxy| this.pairs_for(proxy))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let mut pairs: Vec<(ProxyId, ProxyId)> = moved
            .iter()
            .flat_map(|&proxy| this.pairs_for(proxy))
            .collect();

        pairs.sort_unstable();
        pairs.dedup();
        log::trace!("broadphase: {} moved proxies, {} pairs", moved.len(), pairs.len());

        for (a, b) in pairs {
            if let (Some(key_a), Some(key_b)) = (self.user_data(a), self.user_data(b)) {
                callback(key_a, key_b);
            }
        }
    }

    fn query(&self, aabb: &Aabb, callback: &mut dyn FnMut(ProxyId) -> bool) {
        self.tree.query(aabb, &mut |leaf| callback(ProxyId::from_index(leaf)));
    }

    fn raycast(&self, input: &RayCastInput, callback: &mut dyn FnMut(ProxyId) -> bool) {
        self.tree.raycast(input, &mut |leaf| callback(ProxyId::from_index(leaf)));
    }
}
