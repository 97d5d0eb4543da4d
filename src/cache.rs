//! Translation cache keyed by `(source text, target language)`.
//!
//! Entries live for the lifetime of the process: there is no eviction and no
//! persistence. Only fresh engine output is ever inserted, so a passthrough
//! after a failure never shadows a later successful translation.
//!
//! The map sits behind an `RwLock` because translators may run on a
//! multi-threaded runtime. Two requests racing on the same key both compute
//! the same deterministic value, so last-write-wins is acceptable.

use crate::i18n::LanguageCode;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: RwLock<HashMap<(String, LanguageCode), String>>,
}

/// A batch split into cached and uncached positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePartition {
    /// `(input index, cached translation)` for every hit
    pub hits: Vec<(usize, String)>,
    /// Input indices with no entry for the target language
    pub misses: Vec<usize>,
}

impl CachePartition {
    /// Reassemble a result in input order.
    ///
    /// `fresh` holds one value per entry of `misses`, in the same order.
    /// `len` is the length of the original input.
    pub fn merge(self, fresh: Vec<String>, len: usize) -> Vec<String> {
        debug_assert_eq!(fresh.len(), self.misses.len());

        let mut merged = vec![String::new(); len];
        for (index, cached) in self.hits {
            merged[index] = cached;
        }
        for (index, value) in self.misses.into_iter().zip(fresh) {
            merged[index] = value;
        }
        merged
    }

    pub fn is_fully_cached(&self) -> bool {
        self.misses.is_empty()
    }
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<(String, LanguageCode), String>> {
        self.entries.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<(String, LanguageCode), String>> {
        self.entries.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Cached translation of `text` into `language`, if any.
    pub fn get(&self, text: &str, language: LanguageCode) -> Option<String> {
        self.read().get(&(text.to_string(), language)).cloned()
    }

    /// Store (or overwrite) the translation of `text` into `language`.
    pub fn insert(&self, text: &str, language: LanguageCode, translation: &str) {
        self.write()
            .insert((text.to_string(), language), translation.to_string());
    }

    /// Split `texts` into positions already cached for `language` and
    /// positions that still need the engine.
    pub fn partition(&self, texts: &[String], language: LanguageCode) -> CachePartition {
        let entries = self.read();
        let mut hits = Vec::new();
        let mut misses = Vec::new();

        for (index, text) in texts.iter().enumerate() {
            match entries.get(&(text.clone(), language)) {
                Some(cached) => hits.push((index, cached.clone())),
                None => misses.push(index),
            }
        }

        CachePartition { hits, misses }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn clear(&self) {
        self.write().clear();
    }
}
