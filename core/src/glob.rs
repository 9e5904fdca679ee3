//! Wildcard lookup over `%chardef`.
//!
//! `?` matches exactly one key and `*` any run of keys. Matching scans the
//! whole table in declaration order, so results are bounded by a limit and
//! cached per pattern.
use std::cell::RefCell;
use std::num::NonZeroUsize;

use regex::Regex;
use tracing::debug;

use crate::table::ChardefMap;

/// Keys with wildcard meaning.
pub const GLOB_KEYS: &str = "?*";

/// Whether `pattern` contains a wildcard.
pub fn is_glob_pattern(pattern: &str) -> bool {
    pattern.chars().any(is_glob_key)
}

pub fn is_glob_key(c: char) -> bool {
    GLOB_KEYS.contains(c)
}

/// Anchored regex source for a glob pattern. Every other character is
/// matched literally.
pub fn glob_to_regex(pattern: &str) -> String {
    let mut re = String::with_capacity(pattern.len() + 2);
    re.push('^');
    for c in pattern.chars() {
        match c {
            '?' => re.push('.'),
            '*' => re.push_str(".*"),
            other => {
                let mut buf = [0u8; 4];
                re.push_str(&regex::escape(other.encode_utf8(&mut buf)));
            }
        }
    }
    re.push('$');
    re
}

/// Glob matcher with an LRU cache of results keyed by pattern.
///
/// A matcher is tied to one table; do not share it between tables.
pub struct GlobMatcher {
    cache: RefCell<lru::LruCache<String, Vec<String>>>,
    cache_hits: RefCell<usize>,
    cache_misses: RefCell<usize>,
}

impl GlobMatcher {
    pub fn new(cache_capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: RefCell::new(lru::LruCache::new(capacity)),
            cache_hits: RefCell::new(0),
            cache_misses: RefCell::new(0),
        }
    }

    /// Candidates of every key matching `pattern`, in table order, truncated
    /// to `limit`.
    pub fn collect(&self, chardef: &ChardefMap, pattern: &str, limit: usize) -> Vec<String> {
        let cache_key = format!("{}\u{0}{}", limit, pattern);
        if let Some(cached) = self.cache.borrow_mut().get(&cache_key) {
            *self.cache_hits.borrow_mut() += 1;
            return cached.clone();
        }
        *self.cache_misses.borrow_mut() += 1;

        let result = Self::scan(chardef, pattern, limit);
        self.cache.borrow_mut().put(cache_key, result.clone());
        result
    }

    /// Uncached scan.
    pub fn scan(chardef: &ChardefMap, pattern: &str, limit: usize) -> Vec<String> {
        let re = match Regex::new(&glob_to_regex(pattern)) {
            Ok(re) => re,
            Err(e) => {
                debug!("glob: bad pattern {:?}: {}", pattern, e);
                return Vec::new();
            }
        };

        let mut result: Vec<String> = Vec::new();
        for (key, candidates) in chardef.iter() {
            if !re.is_match(key) {
                continue;
            }
            result.extend(candidates.iter().cloned());
            if result.len() >= limit {
                debug!("glob: too many candidates for {:?}, truncated to {}", pattern, limit);
                result.truncate(limit);
                break;
            }
        }
        result
    }

    /// `(hits, misses)` of the result cache.
    pub fn cache_stats(&self) -> (usize, usize) {
        (*self.cache_hits.borrow(), *self.cache_misses.borrow())
    }

    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
    }
}

impl Default for GlobMatcher {
    fn default() -> Self {
        Self::new(256)
    }
}
