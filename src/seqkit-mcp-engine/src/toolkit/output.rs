//! Output path selection for file-writing operations.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::Result;
use crate::settings::Settings;

/// Pick where a file-writing operation puts its result.
///
/// A caller-specified path wins (its parent directory is created when
/// missing). Otherwise a fresh directory is created under the configured
/// temp root so concurrent calls can never collide; the directory is left
/// behind on purpose, since the reported path must stay valid after the
/// response is sent.
pub(crate) fn resolve_output_path(
    settings: &Settings,
    requested: Option<&Path>,
    input: &Path,
    stem: &str,
    forced_extension: Option<&str>,
) -> Result<PathBuf> {
    if let Some(path) = requested {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        return Ok(path.to_path_buf());
    }

    let extension = forced_extension
        .map(str::to_string)
        .or_else(|| {
            input
                .extension()
                .map(|ext| ext.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "fa".to_string());

    let dir = settings
        .temp_dir
        .join(format!("seqkit-mcp-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir)?;

    Ok(dir.join(format!("{stem}.{extension}")))
}
