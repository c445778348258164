use dishboard_core::{DishStore, MemoryDishStore, NewDish, StoreError};
use dishboard_protocol::{Dish, DishPatch};
use std::sync::atomic::{AtomicBool, Ordering};

/// Memory store whose writes can be switched to fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryDishStore,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write rejected".to_string()));
        }
        Ok(())
    }
}

impl DishStore for FlakyStore {
    fn list(&self) -> Result<Vec<Dish>, StoreError> {
        self.inner.list()
    }

    fn get(&self, dish_id: &str) -> Result<Option<Dish>, StoreError> {
        self.inner.get(dish_id)
    }

    fn insert(&self, dish: NewDish) -> Result<Dish, StoreError> {
        self.check()?;
        self.inner.insert(dish)
    }

    fn update(&self, dish_id: &str, patch: &DishPatch) -> Result<Option<Dish>, StoreError> {
        self.check()?;
        self.inner.update(dish_id, patch)
    }

    fn delete(&self, dish_id: &str) -> Result<bool, StoreError> {
        self.check()?;
        self.inner.delete(dish_id)
    }
}
