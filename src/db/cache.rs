// src/db/cache.rs

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

use super::record::Record;

/// LRU-кэш записей по `id` (для просмотра деталей)
pub type RecordCache = LruCache<i64, Record>;

#[derive(Clone)]
pub struct CacheHandler {
    pub record_cache: Arc<Mutex<RecordCache>>,
}

impl CacheHandler {
    /// Создаёт новый кэш с заданной ёмкостью (0 превращается в 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            record_cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RecordCache> {
        // кэш не содержит инвариантов, которые может сломать паника
        self.record_cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get_record(&self, id: i64) -> Option<Record> {
        self.lock().get(&id).cloned()
    }

    /// Добавляет или обновляет запись в кэше
    pub fn put_record(&self, record: Record) {
        self.lock().put(record.id, record);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
