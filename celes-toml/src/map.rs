//! Open-addressed map from string keys to values, iterable in bucket order.

#[cfg(test)]
mod test;

const STARTING_CAPACITY: usize = 16;
const HASH_BASE: u64 = 29791;
const HASH_PRIME: u64 = 1_000_000_007;

fn bucket_limit(capacity: usize) -> usize {
    capacity >> 1 | capacity >> 2
}

// Polynomial rolling hash over the key bytes. Bytes are sign-extended and
// the intermediate arithmetic wraps.
fn hash_key(key: &str) -> u64 {
    let mut pow: u64 = 1;
    let mut hash: u64 = 0;
    for (i, b) in key.bytes().enumerate() {
        if i != 0 {
            pow = pow.wrapping_mul(HASH_BASE);
        }
        let val = (b as i8) as i64 as u64;
        hash = hash.wrapping_add(val.wrapping_mul(pow));
    }
    hash % HASH_PRIME
}

#[derive(Debug, PartialEq)]
struct Bucket<V> {
    hash: u64,
    key: String,
    value: V,
}

/// Buckets are allocated lazily on the first insert, start at a capacity of
/// 16, and double once occupancy reaches three quarters. Collisions probe
/// linearly; a probed bucket matches only if both its hash and its stored
/// key equal the incoming key. The bucket order is stable between writes.
#[derive(Debug, PartialEq)]
pub struct StrMap<V> {
    buckets: Vec<Option<Bucket<V>>>,
    occupied: usize,
}

impl<V> StrMap<V> {
    pub fn new() -> Self {
        Self {
            buckets: Vec::new(),
            occupied: 0,
        }
    }

    /// Number of buckets, including free ones. Zero before the first insert.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of occupied buckets.
    pub fn len(&self) -> usize {
        self.occupied
    }

    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Inserts or overwrites; the previous value under `key` is dropped.
    pub fn set(&mut self, key: &str, value: V) -> &mut V {
        if self.buckets.is_empty() {
            self.buckets.resize_with(STARTING_CAPACITY, || None);
        }

        let hash = hash_key(key);
        let idx = self.probe(hash, key);
        match &mut self.buckets[idx] {
            Some(bucket) => {
                bucket.value = value;
            }
            slot @ None => {
                *slot = Some(Bucket {
                    hash,
                    key: key.to_owned(),
                    value,
                });
                self.occupied += 1;
                if self.occupied == bucket_limit(self.buckets.len()) {
                    self.grow();
                    let idx = self.probe(hash, key);
                    match &mut self.buckets[idx] {
                        Some(bucket) => return &mut bucket.value,
                        None => unreachable!("inserted bucket lost during resize"),
                    }
                }
            }
        }
        match &mut self.buckets[idx] {
            Some(bucket) => &mut bucket.value,
            None => unreachable!("probe returned an empty bucket after insert"),
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        if self.buckets.is_empty() {
            return None;
        }
        let idx = self.probe(hash_key(key), key);
        self.buckets[idx].as_ref().map(|b| &b.value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        if self.buckets.is_empty() {
            return None;
        }
        let idx = self.probe(hash_key(key), key);
        self.buckets[idx].as_mut().map(|b| &mut b.value)
    }

    /// Direct access to bucket `idx`; `None` for a free bucket. Enumeration
    /// is `(0..bucket_count()).filter_map(|i| map.get_idx(i))`.
    pub fn get_idx(&self, idx: usize) -> Option<(&str, &V)> {
        self.buckets
            .get(idx)?
            .as_ref()
            .map(|b| (b.key.as_str(), &b.value))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.buckets
            .iter()
            .flatten()
            .map(|b| (b.key.as_str(), &b.value))
    }

    // Index of the bucket holding `key`, or of the free bucket where it
    // would be inserted. The load limit guarantees free buckets exist.
    fn probe(&self, hash: u64, key: &str) -> usize {
        let mut idx = (hash % self.buckets.len() as u64) as usize;
        loop {
            match &self.buckets[idx] {
                None => return idx,
                Some(b) if b.hash == hash && b.key == key => return idx,
                Some(_) => idx = (idx + 1) & (self.buckets.len() - 1),
            }
        }
    }

    fn grow(&mut self) {
        let new_capacity = self.buckets.len() << 1;
        let mut new_buckets = Vec::new();
        new_buckets.resize_with(new_capacity, || None);
        let old = std::mem::replace(&mut self.buckets, new_buckets);

        for bucket in old.into_iter().flatten() {
            let mut idx = (bucket.hash % new_capacity as u64) as usize;
            while self.buckets[idx].is_some() {
                idx = (idx + 1) & (new_capacity - 1);
            }
            self.buckets[idx] = Some(bucket);
        }
    }
}

impl<V> Default for StrMap<V> {
    fn default() -> Self {
        Self::new()
    }
}
