use std::{
    collections::HashMap,
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::Context;

use crate::{
    foundation::error::{PenwrightError, PenwrightResult},
    library::glyph::GlyphLibrary,
};

/// Read-only source of per-user glyph libraries.
///
/// Loaded libraries are immutable and may be shared across concurrently running jobs.
pub trait GlyphStore: Send + Sync {
    /// Load the library for `user_id`, failing with [`PenwrightError::LibraryNotFound`].
    fn load(&self, user_id: &str) -> PenwrightResult<Arc<GlyphLibrary>>;
}

/// In-process store, used for tests and for batch jobs over preloaded libraries.
#[derive(Clone, Debug, Default)]
pub struct MemoryGlyphStore {
    libraries: HashMap<String, Arc<GlyphLibrary>>,
}

impl MemoryGlyphStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the library of `library.user()`.
    pub fn insert(&mut self, library: GlyphLibrary) {
        self.libraries
            .insert(library.user().to_string(), Arc::new(library));
    }

    /// Builder-style [`MemoryGlyphStore::insert`].
    pub fn with(mut self, library: GlyphLibrary) -> Self {
        self.insert(library);
        self
    }
}

impl GlyphStore for MemoryGlyphStore {
    fn load(&self, user_id: &str) -> PenwrightResult<Arc<GlyphLibrary>> {
        self.libraries
            .get(user_id)
            .cloned()
            .ok_or_else(|| PenwrightError::library_not_found(user_id))
    }
}

/// Directory-backed store: one `<user_id>.json` file per user.
#[derive(Clone, Debug)]
pub struct FsGlyphStore {
    root: PathBuf,
}

impl FsGlyphStore {
    /// Store rooted at `root`; the directory need not exist until [`FsGlyphStore::save`].
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// File path for `user_id`.
    pub fn path_for(&self, user_id: &str) -> PenwrightResult<PathBuf> {
        validate_user_id(user_id)?;
        Ok(self.root.join(format!("{user_id}.json")))
    }

    /// Persist `library` (maintenance path; never called during compilation).
    pub fn save(&self, library: &GlyphLibrary) -> PenwrightResult<PathBuf> {
        let path = self.path_for(library.user())?;
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("create library dir '{}'", self.root.display()))?;
        let f = File::create(&path)
            .with_context(|| format!("create library file '{}'", path.display()))?;
        let mut w = BufWriter::new(f);
        serde_json::to_writer_pretty(&mut w, library)
            .map_err(|e| PenwrightError::serde(format!("write glyph library: {e}")))?;
        w.flush()
            .with_context(|| format!("flush library file '{}'", path.display()))?;
        Ok(path)
    }
}

impl GlyphStore for FsGlyphStore {
    #[tracing::instrument(skip(self), fields(root = %self.root.display()))]
    fn load(&self, user_id: &str) -> PenwrightResult<Arc<GlyphLibrary>> {
        let path = self.path_for(user_id)?;
        if !path.is_file() {
            return Err(PenwrightError::library_not_found(user_id));
        }
        let f = File::open(&path)
            .with_context(|| format!("open library file '{}'", path.display()))?;
        let library: GlyphLibrary = serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            PenwrightError::serde(format!("parse glyph library '{}': {e}", path.display()))
        })?;
        if library.user() != user_id {
            return Err(PenwrightError::serde(format!(
                "library file '{}' belongs to user '{}'",
                path.display(),
                library.user()
            )));
        }
        tracing::debug!(
            characters = library.characters().count(),
            samples = library.sample_count(),
            "loaded glyph library"
        );
        Ok(Arc::new(library))
    }
}

/// Reject user ids that cannot safely name a single file.
pub fn validate_user_id(user_id: &str) -> PenwrightResult<()> {
    if user_id.trim().is_empty() {
        return Err(PenwrightError::invalid_config("user id must be non-empty"));
    }
    if user_id.contains(['/', '\\']) || user_id == "." || user_id == ".." {
        return Err(PenwrightError::invalid_config(format!(
            "user id '{user_id}' must not contain path separators"
        )));
    }
    if user_id.chars().any(char::is_control) {
        return Err(PenwrightError::invalid_config(
            "user id must not contain control characters",
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/library/store.rs"]
mod tests;
