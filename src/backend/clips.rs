use std::collections::HashMap;

use super::{ClipHandle, ClipRepository};

struct ClipEntry {
    name: String,
    duration: f32,
}

/// A clip repository backed by an ordered list of named clips.
///
/// Lookup tries the explicit key table first, then falls back to clip names.
/// When several clips share a key or name, the earliest one wins.
#[derive(Default)]
pub struct ClipBank {
    clips: Vec<ClipEntry>,
    by_key: HashMap<String, ClipHandle>,
    by_name: HashMap<String, ClipHandle>,
}

impl ClipBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clip reachable by its name only.
    pub fn insert(&mut self, name: impl Into<String>, duration: f32) -> ClipHandle {
        let name = name.into();
        let handle = ClipHandle(self.clips.len() as u32);

        if !name.is_empty() {
            self.by_name.entry(name.clone()).or_insert(handle);
        }
        self.clips.push(ClipEntry {
            name,
            duration: duration.max(0.0),
        });
        handle
    }

    /// Add a clip reachable by an explicit key as well as its name.
    pub fn insert_keyed(
        &mut self,
        key: impl Into<String>,
        name: impl Into<String>,
        duration: f32,
    ) -> ClipHandle {
        let key = key.into();
        let handle = self.insert(name, duration);
        if !key.is_empty() {
            self.by_key.entry(key).or_insert(handle);
        }
        handle
    }

    /// Builder-style [`ClipBank::insert`].
    pub fn with_clip(mut self, name: impl Into<String>, duration: f32) -> Self {
        self.insert(name, duration);
        self
    }

    pub fn name(&self, clip: ClipHandle) -> Option<&str> {
        self.clips.get(clip.0 as usize).map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

impl ClipRepository for ClipBank {
    fn resolve(&self, key: &str) -> Option<ClipHandle> {
        if key.is_empty() {
            return None;
        }
        self.by_key
            .get(key)
            .or_else(|| self.by_name.get(key))
            .copied()
    }

    fn duration(&self, clip: ClipHandle) -> f32 {
        self.clips
            .get(clip.0 as usize)
            .map(|c| c.duration)
            .unwrap_or(0.0)
    }
}
