//! Metarig loading.

use std::path::Path;

use chainrig_armature::{Armature, Metarig, MetarigResult};
use tracing::debug;

/// A metarig document and the armature built from it.
#[derive(Debug)]
pub struct LoadResult {
    pub metarig: Metarig,
    pub armature: Armature,
}

/// Reads, validates and builds a metarig JSON file.
pub fn load_metarig(path: &Path) -> MetarigResult<LoadResult> {
    let metarig = Metarig::from_file(path)?;
    let armature = metarig.to_armature()?;
    debug!(path = %path.display(), bones = armature.len(), "loaded metarig");
    Ok(LoadResult { metarig, armature })
}
