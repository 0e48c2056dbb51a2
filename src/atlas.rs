//! Tile atlases - named ordered sets of graduated-tone tile images.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use image::RgbImage;
use serde::Deserialize;

use crate::{Result, SemitonosError};

/// An ordered sequence of decoded tiles, ranked from lightest to darkest tone
/// (or the reverse; the mosaic renderer's invert flag compensates either way).
/// Read-only once constructed.
pub struct TileAtlas {
    name: String,
    tiles: Vec<RgbImage>,
}

impl TileAtlas {
    /// Build an atlas from already-decoded tiles. The sequence must be
    /// non-empty and every tile non-degenerate.
    pub fn new(name: impl Into<String>, tiles: Vec<RgbImage>) -> Result<Self> {
        let name = name.into();
        if tiles.is_empty() {
            return Err(SemitonosError::InvalidParameter(format!(
                "tile set '{name}' is empty"
            )));
        }
        if tiles.iter().any(|t| t.width() == 0 || t.height() == 0) {
            return Err(SemitonosError::InvalidParameter(format!(
                "tile set '{name}' contains a zero-sized tile"
            )));
        }
        Ok(Self { name, tiles })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tile(&self, index: usize) -> &RgbImage {
        &self.tiles[index]
    }

    pub fn tiles(&self) -> &[RgbImage] {
        &self.tiles
    }
}

/// One named set: a subdirectory under the asset root plus an ordered file
/// list.
#[derive(Debug, Clone, Deserialize)]
pub struct SetEntry {
    pub dir: String,
    pub files: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    sets: BTreeMap<String, SetEntry>,
}

/// Resolves flat set identifiers to ordered tile file lists under an asset
/// root, and decodes them on demand. Atlases are not cached across calls.
pub struct AtlasStore {
    root: PathBuf,
    sets: BTreeMap<String, SetEntry>,
}

impl AtlasStore {
    /// Store with only the given root and no sets registered.
    pub fn empty(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), sets: BTreeMap::new() }
    }

    /// Store with the built-in halftone sets ("A"/"B"/"C" under `semitonos/`)
    /// and dice sets ("m"/"g"/"c" under `dados/`). File order encodes the
    /// tone ranking of each set.
    pub fn builtin(root: impl Into<PathBuf>) -> Self {
        fn entry(dir: &str, files: &[&str]) -> SetEntry {
            SetEntry {
                dir: dir.to_string(),
                files: files.iter().map(|f| (*f).to_string()).collect(),
            }
        }
        let mut sets = BTreeMap::new();
        sets.insert(
            "A".to_string(),
            entry(
                "semitonos",
                &["a10.jpg", "a9.jpg", "a8.jpg", "a7.jpg", "a6.jpg", "a5.jpg", "a4.jpg",
                  "a3.jpg", "a2.jpg", "a1.jpg"],
            ),
        );
        sets.insert(
            "B".to_string(),
            entry(
                "semitonos",
                &["b0.jpg", "b1.jpg", "b2.jpg", "b3.jpg", "b4.jpg", "b5.jpg", "b6.jpg",
                  "b7.jpg", "b8.jpg", "b9.jpg"],
            ),
        );
        sets.insert(
            "C".to_string(),
            entry("semitonos", &["c0.jpg", "c1.jpg", "c2.jpg", "c3.jpg", "c4.jpg"]),
        );
        sets.insert(
            "m".to_string(),
            entry(
                "dados",
                &["m0d.jpg", "m1d.jpg", "m2d.jpg", "m3d.jpg", "m4d.jpg", "m5d.jpg",
                  "m6d.jpg"],
            ),
        );
        sets.insert(
            "g".to_string(),
            entry(
                "dados",
                &["g6d.jpg", "g5d.jpg", "g4d.jpg", "g3d.jpg", "g2d.jpg", "g1d.jpg",
                  "g0d.jpg"],
            ),
        );
        sets.insert(
            "c".to_string(),
            entry("dados", &["c0.jpg", "c1.jpg", "c2.jpg", "c3.jpg", "c4.jpg"]),
        );
        Self { root: root.into(), sets }
    }

    /// Register one set directly.
    pub fn insert(&mut self, id: impl Into<String>, set: SetEntry) {
        self.sets.insert(id.into(), set);
    }

    /// Extend the set table from a JSON manifest of the form
    /// `{"sets": {"id": {"dir": "...", "files": ["...", ...]}}}`.
    /// Manifest entries shadow built-in ids.
    pub fn load_manifest(&mut self, path: &Path) -> Result<()> {
        let manifest: Manifest = serde_json::from_str(&std::fs::read_to_string(path)?)
            .map_err(|e| {
                SemitonosError::InvalidParameter(format!(
                    "bad atlas manifest {}: {e}",
                    path.display()
                ))
            })?;
        self.sets.extend(manifest.sets);
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sets.contains_key(id)
    }

    pub fn set_ids(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    /// Resolve and decode the atlas for `id`. An unknown identifier is a
    /// parameter error; a tile file that cannot be read or decoded surfaces
    /// as a missing-asset error and is never retried.
    pub fn load(&self, id: &str) -> Result<TileAtlas> {
        let entry = self
            .sets
            .get(id)
            .ok_or_else(|| SemitonosError::InvalidParameter(format!("unknown tile set '{id}'")))?;
        let mut tiles = Vec::with_capacity(entry.files.len());
        for file in &entry.files {
            let path = self.root.join(&entry.dir).join(file);
            log::debug!("loading tile {}", path.display());
            let img = image::open(&path)
                .map_err(|source| SemitonosError::MissingAsset { path: path.clone(), source })?;
            tiles.push(img.to_rgb8());
        }
        TileAtlas::new(id, tiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(v: u8) -> RgbImage {
        RgbImage::from_pixel(3, 3, image::Rgb([v, v, v]))
    }

    #[test]
    fn atlas_rejects_empty_and_degenerate_sets() {
        assert!(TileAtlas::new("x", vec![]).is_err());
        assert!(TileAtlas::new("x", vec![RgbImage::new(0, 3)]).is_err());
        assert!(TileAtlas::new("x", vec![solid(1)]).is_ok());
    }

    #[test]
    fn builtin_sets_are_registered() {
        let store = AtlasStore::builtin("assets");
        for id in ["A", "B", "C", "m", "g", "c"] {
            assert!(store.contains(id), "missing built-in set {id}");
        }
        assert!(!store.contains("Z"));
    }

    #[test]
    fn unknown_set_is_a_parameter_error() {
        let store = AtlasStore::builtin("assets");
        match store.load("Z") {
            Err(SemitonosError::InvalidParameter(msg)) => assert!(msg.contains('Z')),
            Err(other) => panic!("expected InvalidParameter, got {other}"),
            Ok(_) => panic!("expected InvalidParameter, got an atlas"),
        }
    }

    #[test]
    fn missing_tile_file_is_a_missing_asset_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = AtlasStore::empty(dir.path());
        store.insert(
            "t",
            SetEntry { dir: "tiles".into(), files: vec!["nope.png".into()] },
        );
        match store.load("t") {
            Err(SemitonosError::MissingAsset { path, .. }) => {
                assert!(path.ends_with("tiles/nope.png"));
            }
            Err(other) => panic!("expected MissingAsset, got {other}"),
            Ok(_) => panic!("expected MissingAsset, got an atlas"),
        }
    }

    #[test]
    fn undecodable_tile_file_is_a_missing_asset_error() {
        let dir = tempfile::tempdir().unwrap();
        let tiles = dir.path().join("tiles");
        std::fs::create_dir(&tiles).unwrap();
        std::fs::write(tiles.join("bad.png"), b"not an image").unwrap();
        let mut store = AtlasStore::empty(dir.path());
        store.insert(
            "t",
            SetEntry { dir: "tiles".into(), files: vec!["bad.png".into()] },
        );
        assert!(matches!(
            store.load("t"),
            Err(SemitonosError::MissingAsset { .. })
        ));
    }

    #[test]
    fn loads_tiles_in_declared_order() {
        let dir = tempfile::tempdir().unwrap();
        let tiles = dir.path().join("tiles");
        std::fs::create_dir(&tiles).unwrap();
        solid(10).save(tiles.join("light.png")).unwrap();
        solid(200).save(tiles.join("dark.png")).unwrap();
        let mut store = AtlasStore::empty(dir.path());
        store.insert(
            "t",
            SetEntry {
                dir: "tiles".into(),
                files: vec!["light.png".into(), "dark.png".into()],
            },
        );
        let atlas = store.load("t").unwrap();
        assert_eq!(atlas.len(), 2);
        assert_eq!(atlas.tile(0).get_pixel(0, 0).0, [10, 10, 10]);
        assert_eq!(atlas.tile(1).get_pixel(0, 0).0, [200, 200, 200]);
    }

    #[test]
    fn manifest_extends_and_shadows_sets() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("sets.json");
        std::fs::write(
            &manifest,
            r#"{"sets": {"A": {"dir": "alt", "files": ["x.png"]},
                        "extra": {"dir": "e", "files": ["e0.png", "e1.png"]}}}"#,
        )
        .unwrap();
        let mut store = AtlasStore::builtin(dir.path());
        store.load_manifest(&manifest).unwrap();
        assert!(store.contains("extra"));
        // "A" is shadowed by the manifest entry.
        match store.load("A") {
            Err(SemitonosError::MissingAsset { path, .. }) => {
                assert!(path.ends_with("alt/x.png"));
            }
            Err(other) => panic!("expected MissingAsset for shadowed set, got {other}"),
            Ok(_) => panic!("expected MissingAsset for shadowed set, got an atlas"),
        }
    }

    #[test]
    fn malformed_manifest_is_a_parameter_error() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("sets.json");
        std::fs::write(&manifest, "{ not json").unwrap();
        let mut store = AtlasStore::builtin(dir.path());
        assert!(matches!(
            store.load_manifest(&manifest),
            Err(SemitonosError::InvalidParameter(_))
        ));
    }
}
