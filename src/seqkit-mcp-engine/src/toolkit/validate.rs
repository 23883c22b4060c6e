//! Pre-spawn validation helpers shared by the handlers.

use std::path::Path;

use crate::error::{EngineError, Result};
use crate::settings::Settings;

/// Check the main input file: it must exist, be a regular file, and fit
/// under the configured size cap.
pub(crate) fn check_input_file(path: &Path, settings: &Settings) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|_| EngineError::InputFileNotFound {
        path: path.to_path_buf(),
    })?;
    if !metadata.is_file() {
        return Err(EngineError::InputFileNotFound {
            path: path.to_path_buf(),
        });
    }
    if metadata.len() > settings.max_file_size {
        return Err(EngineError::InputFileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            limit: settings.max_file_size,
        });
    }
    Ok(())
}

/// Check a secondary file parameter (BED file, pattern file).
pub(crate) fn check_auxiliary_file(path: &Path, what: &str) -> Result<()> {
    if !path.is_file() {
        return Err(EngineError::Validation(format!(
            "{what} not found: {}",
            path.display()
        )));
    }
    Ok(())
}

/// Enforce that exactly one of a group of alternative parameters is given.
pub(crate) fn exactly_one_of(options: &[(&str, bool)]) -> Result<()> {
    let given: Vec<&str> = options
        .iter()
        .filter(|(_, present)| *present)
        .map(|(name, _)| *name)
        .collect();

    match given.len() {
        1 => Ok(()),
        0 => {
            let names = options
                .iter()
                .map(|(name, _)| format!("'{name}'"))
                .collect::<Vec<_>>()
                .join(" or ");
            Err(EngineError::Validation(format!(
                "either {names} must be specified"
            )))
        }
        _ => {
            let names = given
                .iter()
                .map(|name| format!("'{name}'"))
                .collect::<Vec<_>>()
                .join(" and ");
            Err(EngineError::Validation(format!(
                "{names} are mutually exclusive"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_input_file_is_reported() {
        let err = check_input_file(Path::new("/no/such/reads.fq"), &Settings::default());
        assert!(matches!(
            err,
            Err(EngineError::InputFileNotFound { .. })
        ));
    }

    #[test]
    fn oversized_input_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b">r1\nACGTACGT\n").unwrap();

        let settings = Settings {
            max_file_size: 4,
            ..Settings::default()
        };
        let err = check_input_file(file.path(), &settings).unwrap_err();
        assert!(matches!(err, EngineError::InputFileTooLarge { .. }));

        // Under a sane cap the same file passes.
        assert!(check_input_file(file.path(), &Settings::default()).is_ok());
    }

    #[test]
    fn directories_do_not_count_as_input_files() {
        let dir = tempfile::tempdir().unwrap();
        let err = check_input_file(dir.path(), &Settings::default());
        assert!(matches!(
            err,
            Err(EngineError::InputFileNotFound { .. })
        ));
    }

    #[test]
    fn exactly_one_accepts_a_single_choice() {
        assert!(exactly_one_of(&[("region", true), ("bed_file", false)]).is_ok());
    }

    #[test]
    fn exactly_one_rejects_none() {
        let err = exactly_one_of(&[("number", false), ("proportion", false)]).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("'number'"));
        assert!(text.contains("'proportion'"));
        assert!(text.contains("must be specified"));
    }

    #[test]
    fn exactly_one_rejects_both() {
        let err = exactly_one_of(&[("number", true), ("proportion", true)]).unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"));
    }
}
