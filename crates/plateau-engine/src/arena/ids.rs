use std::collections::BTreeSet;
use std::fmt;

use super::ArenaError;

/// Identifier of a live scene object.
///
/// Doubles as the index of the object's uniform regions and as the value the
/// picking pass writes into its color target.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl ObjectId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object #{}", self.0)
    }
}

/// Pool of object ids in `[0, max)`.
///
/// The free set is filled on first use. `acquire` always hands out the lowest
/// free id, so released ids are reused before fresh ones.
#[derive(Debug, Clone)]
pub struct ObjectIdPool {
    max: u32,
    free: Option<BTreeSet<u32>>,
}

impl ObjectIdPool {
    pub fn new(max: u32) -> Self {
        Self { max, free: None }
    }

    #[inline]
    pub fn capacity(&self) -> u32 {
        self.max
    }

    /// Number of ids currently handed out.
    pub fn in_use(&self) -> u32 {
        match &self.free {
            Some(free) => self.max - free.len() as u32,
            None => 0,
        }
    }

    pub fn acquire(&mut self) -> Result<ObjectId, ArenaError> {
        let max = self.max;
        let free = self.free.get_or_insert_with(|| (0..max).collect());

        free.pop_first()
            .map(ObjectId)
            .ok_or(ArenaError::ObjectSlotsExhausted { max })
    }

    /// Returns `id` to the pool. Releasing an id that is not held is an error.
    pub fn release(&mut self, id: ObjectId) -> Result<(), ArenaError> {
        let Some(free) = self.free.as_mut() else {
            return Err(ArenaError::SlotNotHeld(id));
        };
        if id.0 >= self.max || !free.insert(id.0) {
            return Err(ArenaError::SlotNotHeld(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hands_out_lowest_first() {
        let mut pool = ObjectIdPool::new(4);
        let ids: Vec<u32> = (0..4).map(|_| pool.acquire().unwrap().get()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn released_middle_id_is_reused_next() {
        let mut pool = ObjectIdPool::new(100);
        let _a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        let _c = pool.acquire().unwrap();

        pool.release(b).unwrap();
        assert_eq!(pool.acquire().unwrap(), b);
        assert_eq!(pool.acquire().unwrap(), ObjectId::new(3));
    }

    #[test]
    fn exhaustion_is_an_error() {
        let mut pool = ObjectIdPool::new(2);
        pool.acquire().unwrap();
        pool.acquire().unwrap();
        assert_eq!(
            pool.acquire().unwrap_err(),
            ArenaError::ObjectSlotsExhausted { max: 2 }
        );
        assert_eq!(pool.in_use(), 2);
    }

    #[test]
    fn double_release_is_rejected() {
        let mut pool = ObjectIdPool::new(8);
        let id = pool.acquire().unwrap();
        pool.release(id).unwrap();
        assert_eq!(pool.release(id), Err(ArenaError::SlotNotHeld(id)));
    }

    #[test]
    fn release_before_first_acquire_is_rejected() {
        let mut pool = ObjectIdPool::new(8);
        let id = ObjectId::new(0);
        assert_eq!(pool.release(id), Err(ArenaError::SlotNotHeld(id)));
    }

    #[test]
    fn out_of_range_release_is_rejected() {
        let mut pool = ObjectIdPool::new(8);
        pool.acquire().unwrap();
        let id = ObjectId::new(8);
        assert_eq!(pool.release(id), Err(ArenaError::SlotNotHeld(id)));
    }

    #[test]
    fn live_ids_are_unique() {
        let mut pool = ObjectIdPool::new(16);
        let mut held: Vec<ObjectId> = (0..10).map(|_| pool.acquire().unwrap()).collect();
        for id in [held.remove(7), held.remove(2), held.remove(0)] {
            pool.release(id).unwrap();
        }
        held.extend((0..5).map(|_| pool.acquire().unwrap()));

        let mut sorted = held.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), held.len());
        assert_eq!(pool.in_use(), held.len() as u32);
    }
}
