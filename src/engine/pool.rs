// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Reusable resource pool.
//!
//! Resources are kept in an arena indexed by id with a stack of released
//! ids. Releasing a resource runs the `on_free` hook and parks it; the next
//! [`ResourcePool::acquire`] takes the most recently released one back,
//! runs `on_reuse` and hands it out under its original id. New resources
//! are only built through `on_create` when nothing is parked.

type CreateFn<T> = Box<dyn FnMut(usize) -> T>;
type HookFn<T> = Box<dyn FnMut(&mut T)>;

/// Pool of resources keyed by integer id.
pub struct ResourcePool<T> {
    slots: Vec<T>,
    active: Vec<bool>,
    free: Vec<usize>,
    on_create: CreateFn<T>,
    on_free: HookFn<T>,
    on_reuse: HookFn<T>,
}

impl<T> ResourcePool<T> {
    /// Create an empty pool.
    ///
    /// * `on_create` builds the resource for a fresh id.
    /// * `on_free` resets a resource as it is released.
    /// * `on_reuse` restores a parked resource before it is handed out again.
    pub fn new(
        on_create: impl FnMut(usize) -> T + 'static,
        on_free: impl FnMut(&mut T) + 'static,
        on_reuse: impl FnMut(&mut T) + 'static,
    ) -> Self {
        Self {
            slots: Vec::new(),
            active: Vec::new(),
            free: Vec::new(),
            on_create: Box::new(on_create),
            on_free: Box::new(on_free),
            on_reuse: Box::new(on_reuse),
        }
    }

    /// Check out a resource, reusing the last released one if possible.
    pub fn acquire(&mut self) -> (usize, &mut T) {
        let id = match self.free.pop() {
            Some(id) => {
                (self.on_reuse)(&mut self.slots[id]);
                log::trace!("Reusing pooled resource {}", id);
                id
            }
            None => {
                let id = self.slots.len();
                let resource = (self.on_create)(id);
                self.slots.push(resource);
                self.active.push(false);
                log::trace!("Created pooled resource {}", id);
                id
            }
        };

        self.active[id] = true;
        (id, &mut self.slots[id])
    }

    /// Return a resource to the pool. Unknown or already released ids are
    /// ignored.
    pub fn release(&mut self, id: usize) {
        if !self.is_active(id) {
            return;
        }

        (self.on_free)(&mut self.slots[id]);
        self.active[id] = false;
        self.free.push(id);
    }

    /// Release every active resource.
    pub fn release_all(&mut self) {
        for id in 0..self.slots.len() {
            self.release(id);
        }
    }

    pub fn is_active(&self, id: usize) -> bool {
        self.active.get(id).copied().unwrap_or(false)
    }

    /// Active resource by id.
    pub fn get(&self, id: usize) -> Option<&T> {
        if self.is_active(id) {
            self.slots.get(id)
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, id: usize) -> Option<&mut T> {
        if self.is_active(id) {
            self.slots.get_mut(id)
        } else {
            None
        }
    }

    /// Currently checked-out resources, in no particular order.
    pub fn active(&self) -> impl Iterator<Item = &T> + '_ {
        self.slots
            .iter()
            .zip(&self.active)
            .filter_map(|(slot, active)| active.then_some(slot))
    }

    /// Ids of the currently checked-out resources.
    pub fn active_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.active
            .iter()
            .enumerate()
            .filter_map(|(id, active)| active.then_some(id))
    }

    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|a| **a).count()
    }

    /// Number of resources ever built by this pool.
    pub fn allocated(&self) -> usize {
        self.slots.len()
    }
}

impl<T> std::fmt::Debug for ResourcePool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourcePool")
            .field("allocated", &self.slots.len())
            .field("active", &self.active_count())
            .field("free", &self.free)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, PartialEq)]
    struct Tag {
        id: usize,
        visible: bool,
    }

    fn tag_pool() -> ResourcePool<Tag> {
        ResourcePool::new(
            |id| Tag { id, visible: true },
            |tag: &mut Tag| tag.visible = false,
            |tag: &mut Tag| tag.visible = true,
        )
    }

    #[test]
    fn test_ids_start_at_zero_and_increase() {
        let mut pool = tag_pool();
        assert_eq!(pool.acquire().0, 0);
        assert_eq!(pool.acquire().0, 1);
        assert_eq!(pool.acquire().0, 2);
        assert_eq!(pool.allocated(), 3);
    }

    #[test]
    fn test_release_then_acquire_reuses_same_id() {
        let mut pool = tag_pool();
        let (a, _) = pool.acquire();
        let (b, _) = pool.acquire();

        pool.release(a);
        assert_eq!(pool.get(b).map(|t| t.visible), Some(true));
        let (again, tag) = pool.acquire();
        assert_eq!(again, a);
        assert_eq!(tag.id, a);
        assert!(tag.visible);
        assert_eq!(pool.allocated(), 2);
    }

    #[test]
    fn test_reuse_is_lifo() {
        let mut pool = tag_pool();
        for _ in 0..3 {
            pool.acquire();
        }
        pool.release(0);
        pool.release(2);
        assert_eq!(pool.acquire().0, 2);
        assert_eq!(pool.acquire().0, 0);
        assert_eq!(pool.acquire().0, 3);
    }

    #[test]
    fn test_double_release_is_ignored() {
        let freed = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&freed);
        let mut pool = ResourcePool::new(
            |id| id,
            move |_: &mut usize| *counter.borrow_mut() += 1,
            |_: &mut usize| {},
        );

        let (id, _) = pool.acquire();
        pool.release(id);
        pool.release(id);
        pool.release(42);
        assert_eq!(*freed.borrow(), 1);

        // A second acquire must not hand the same id out twice.
        let (first, _) = pool.acquire();
        let (second, _) = pool.acquire();
        assert_ne!(first, second);
    }

    #[test]
    fn test_hooks_run_on_free_and_reuse() {
        let mut pool = tag_pool();
        let (id, _) = pool.acquire();
        pool.release(id);
        assert!(pool.get(id).is_none());
        assert!(!pool.slots[id].visible);

        pool.acquire();
        assert_eq!(pool.get(id), Some(&Tag { id, visible: true }));
    }

    #[test]
    fn test_release_all_frees_every_active_entry() {
        let mut pool = tag_pool();
        for _ in 0..4 {
            pool.acquire();
        }
        pool.release(1);
        pool.release_all();

        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.active().count(), 0);
        assert!(pool.slots.iter().all(|t| !t.visible));

        // Everything comes back before anything new is built.
        for _ in 0..4 {
            pool.acquire();
        }
        assert_eq!(pool.allocated(), 4);
    }

    #[test]
    fn test_active_ids_are_unique() {
        let mut pool = tag_pool();
        for step in 0..20 {
            if step % 3 == 2 {
                pool.release(step % 5);
            } else {
                pool.acquire();
            }
            let mut ids: Vec<usize> = pool.active().map(|t| t.id).collect();
            let count = ids.len();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), count);
            assert_eq!(pool.active_ids().collect::<Vec<_>>(), ids);
        }
    }
}
