//! BOM conversion through an external XSLT processor
//!
//! KiCad writes its bill of materials as XML. The JLCPCB grouped CSV is
//! produced by running a stylesheet over it with `xsltproc`.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::FabError;

/// Stylesheet looked up when none is given on the command line
pub const DEFAULT_STYLESHEET: &str = "bom2grouped_csv_jlcpcb.xsl";

/// Executable used when none is given on the command line
pub const DEFAULT_PROCESSOR: &str = "xsltproc";

/// Anything able to turn an XML file into an output file with a stylesheet
pub trait XsltProcessor {
    fn transform(&self, stylesheet: &Path, input: &Path, output: &Path) -> Result<(), FabError>;
}

/// `xsltproc -o <output> <stylesheet> <input>`
#[derive(Debug, Clone)]
pub struct Xsltproc {
    program: String,
}

impl Xsltproc {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl XsltProcessor for Xsltproc {
    fn transform(&self, stylesheet: &Path, input: &Path, output: &Path) -> Result<(), FabError> {
        debug!(
            "Running {} -o {} {} {}",
            self.program,
            output.display(),
            stylesheet.display(),
            input.display()
        );

        let result = Command::new(&self.program)
            .arg("-o")
            .arg(output)
            .arg(stylesheet)
            .arg(input)
            .output()
            .map_err(|source| FabError::ToolUnavailable {
                program: self.program.clone(),
                source,
            })?;

        if !result.status.success() {
            return Err(FabError::TransformFailed {
                program: self.program.clone(),
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

/// Fail early when the stylesheet is missing, before any file is touched
pub fn check_stylesheet(path: &Path) -> Result<(), FabError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(FabError::StylesheetNotFound {
            path: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_program() {
        let dir = tempdir().expect("Failed to create temp dir");
        let processor = Xsltproc::new("kicad-fab-no-such-xsltproc");

        let err = processor
            .transform(
                &dir.path().join("style.xsl"),
                &dir.path().join("bom.xml"),
                &dir.path().join("bom.csv"),
            )
            .unwrap_err();

        assert!(matches!(err, FabError::ToolUnavailable { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status_is_checked() {
        let dir = tempdir().expect("Failed to create temp dir");
        let paths = (
            dir.path().join("style.xsl"),
            dir.path().join("bom.xml"),
            dir.path().join("bom.csv"),
        );

        assert!(Xsltproc::new("true")
            .transform(&paths.0, &paths.1, &paths.2)
            .is_ok());

        let err = Xsltproc::new("false")
            .transform(&paths.0, &paths.1, &paths.2)
            .unwrap_err();
        assert!(matches!(err, FabError::TransformFailed { .. }));
    }

    #[test]
    fn test_check_stylesheet() {
        let dir = tempdir().expect("Failed to create temp dir");
        let stylesheet = dir.path().join(DEFAULT_STYLESHEET);

        assert!(matches!(
            check_stylesheet(&stylesheet),
            Err(FabError::StylesheetNotFound { .. })
        ));

        std::fs::write(&stylesheet, "<xsl:stylesheet/>").unwrap();
        assert!(check_stylesheet(&stylesheet).is_ok());
    }
}
