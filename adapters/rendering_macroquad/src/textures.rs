use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, ensure, Context, Result};
use grove_core::GrowthStage;
use grove_rendering::StageAssets;
use macroquad::texture::Texture2D;

const SUPPORTED_MANIFEST_VERSION: u32 = 1;
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

/// Canopy textures of the four stage models.
///
/// Stages whose texture could not be loaded are recorded as failures in the
/// accompanying [`StageAssets`] ledger instead of aborting the load, so the
/// renderer can fall back per node.
#[derive(Debug)]
pub(crate) struct StageTextures {
    textures: HashMap<GrowthStage, Texture2D>,
}

impl StageTextures {
    /// Loads the textures listed by the manifest located at the provided path.
    pub(crate) fn from_manifest_path(
        path: impl AsRef<Path>,
        assets: &mut StageAssets,
    ) -> Result<Self> {
        Self::from_manifest_with_loader(path, assets, default_loader)
    }

    /// Retrieves the texture of the provided stage.
    pub(crate) fn texture(&self, stage: GrowthStage) -> Option<Texture2D> {
        self.textures.get(&stage).copied()
    }

    fn from_manifest_with_loader(
        path: impl AsRef<Path>,
        assets: &mut StageAssets,
        mut loader: impl FnMut(GrowthStage, &Path) -> Result<Texture2D>,
    ) -> Result<Self> {
        let manifest_path = path.as_ref();
        let contents = fs::read_to_string(manifest_path).with_context(|| {
            format!(
                "failed to read stage manifest at {}",
                manifest_path.display()
            )
        })?;
        let base = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let entries = parse_manifest(&contents, &base)?;
        Ok(Self::from_entries(entries, assets, &mut loader))
    }

    fn from_entries(
        entries: Vec<(GrowthStage, Option<PathBuf>)>,
        assets: &mut StageAssets,
        loader: &mut impl FnMut(GrowthStage, &Path) -> Result<Texture2D>,
    ) -> Self {
        let mut textures = HashMap::with_capacity(entries.len());
        for (stage, path) in entries {
            let Some(path) = path else {
                assets.record_failure(stage, "missing from stage manifest");
                continue;
            };
            match loader(stage, &path) {
                Ok(texture) => {
                    let _ = textures.insert(stage, texture);
                    assets.record_loaded(stage);
                }
                Err(error) => {
                    assets.record_failure(stage, format!("{}: {error:#}", path.display()));
                }
            }
        }
        Self { textures }
    }
}

fn default_loader(_stage: GrowthStage, path: &Path) -> Result<Texture2D> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read stage texture at {}", path.display()))?;
    ensure!(
        bytes.starts_with(&PNG_SIGNATURE),
        "stage texture at {} is not a PNG image",
        path.display()
    );
    Ok(Texture2D::from_file_with_format(&bytes, None))
}

#[derive(Debug, serde::Deserialize)]
struct Manifest {
    version: u32,
    stages: HashMap<String, String>,
}

fn parse_manifest(
    contents: &str,
    base_path: &Path,
) -> Result<Vec<(GrowthStage, Option<PathBuf>)>> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse stage manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported stage manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }

    let mut resolved = HashMap::new();
    for (name, relative_path) in manifest.stages {
        let stage = parse_stage_key(&name)
            .with_context(|| format!("unknown stage key `{name}` in manifest"))?;
        let _ = resolved.insert(stage, base_path.join(relative_path));
    }

    Ok(GrowthStage::ALL
        .into_iter()
        .map(|stage| (stage, resolved.remove(&stage)))
        .collect())
}

fn parse_stage_key(name: &str) -> Result<GrowthStage> {
    let Some(number) = name.strip_prefix("stage") else {
        bail!("stage keys are named `stage1` to `stage4`");
    };
    number
        .parse::<u8>()
        .ok()
        .and_then(GrowthStage::from_number)
        .with_context(|| format!("stage number `{number}` is out of range"))
}
