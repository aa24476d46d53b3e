use std::collections::HashMap;
use std::path::{Path, PathBuf};

use gdk_pixbuf::Pixbuf;
use tracing::{debug, warn};

use crate::error::ResourceError;
use crate::game::types::CandyKind;

/// Represents a loaded image – either a raster Pixbuf or SVG tree.
pub enum GameImage {
    Raster(Pixbuf),
    Svg { tree: resvg::usvg::Tree },
}

/// Candy images loaded from the resources directory. Kinds without an image
/// are drawn as emoji text instead.
pub struct GameResources {
    images: HashMap<CandyKind, GameImage>,
}

impl GameResources {
    /// Load one image per candy kind, preferring `.svg` over `.png`.
    pub fn load<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        let mut images = HashMap::new();

        for kind in CandyKind::ALL {
            match Self::load_image(dir, kind.resource_name()) {
                Ok(img) => {
                    images.insert(kind, img);
                }
                Err(e) => warn!(error = %e, "falling back to emoji for {:?}", kind),
            }
        }
        debug!(loaded = images.len(), dir = %dir.display(), "candy images");

        Self { images }
    }

    fn load_image(dir: &Path, name: &str) -> Result<GameImage, ResourceError> {
        let svg_path = dir.join(format!("{}.svg", name));
        if svg_path.exists() {
            return Self::load_svg(svg_path);
        }

        let png_path = dir.join(format!("{}.png", name));
        if png_path.exists() {
            return Pixbuf::from_file(&png_path)
                .map(GameImage::Raster)
                .map_err(|source| ResourceError::Raster {
                    path: png_path,
                    source,
                });
        }

        Err(ResourceError::Missing(name.to_string()))
    }

    fn load_svg(path: PathBuf) -> Result<GameImage, ResourceError> {
        let data = std::fs::read(&path).map_err(|source| ResourceError::Io {
            path: path.clone(),
            source,
        })?;
        let opt = resvg::usvg::Options::default();
        let tree = resvg::usvg::Tree::from_data(&data, &opt)
            .map_err(|source| ResourceError::Svg { path, source })?;
        Ok(GameImage::Svg { tree })
    }

    /// Image for a candy kind, if one was loaded.
    pub fn candy(&self, kind: CandyKind) -> Option<&GameImage> {
        self.images.get(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resources_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("resources")
    }

    #[test]
    fn bundled_svgs_cover_every_kind() {
        let res = GameResources::load(resources_dir());
        for kind in CandyKind::ALL {
            assert!(
                matches!(res.candy(kind), Some(GameImage::Svg { .. })),
                "{kind:?}"
            );
        }
    }

    #[test]
    fn missing_directory_leaves_every_kind_unloaded() {
        let res = GameResources::load(resources_dir().join("does-not-exist"));
        assert!(CandyKind::ALL.iter().all(|k| res.candy(*k).is_none()));
    }

    #[test]
    fn missing_image_reports_its_name() {
        match GameResources::load_image(&resources_dir(), "licorice") {
            Err(ResourceError::Missing(name)) => assert_eq!(name, "licorice"),
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("licorice should not exist"),
        }
    }
}
