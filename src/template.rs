//! Startup script template
//!
//! The instance boot script is a file template using the engine's
//! `templatefile` syntax: `${name}` interpolates, `$${` and `%%{` escape.
//! Exactly one variable is recognized, `downloadUrl`. Templates are
//! validated when loaded so a broken script never reaches composition.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// The only variable a startup template may use
pub const DOWNLOAD_URL_VAR: &str = "downloadUrl";

const BUNDLED: &str = include_str!("../assets/init.sh");

/// Errors raised while loading a template
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("could not read template {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{source_name}:{line}: unterminated interpolation")]
    Unterminated { source_name: String, line: usize },

    #[error("{source_name}:{line}: unknown variable '{name}' (only 'downloadUrl' is available)")]
    UnknownVariable {
        source_name: String,
        line: usize,
        name: String,
    },

    #[error("{source_name}:{line}: template directives are not supported; escape as '%%{{'")]
    Directive { source_name: String, line: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    DownloadUrl,
}

/// A parsed, validated startup script template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupTemplate {
    source_name: String,
    segments: Vec<Segment>,
}

impl StartupTemplate {
    /// Template shipped with the binary
    pub fn bundled() -> Result<Self, TemplateError> {
        Self::parse("init.sh", BUNDLED)
    }

    /// Load a template from disk
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let text = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loaded startup template {}", path.display());
        Self::parse(&path.display().to_string(), &text)
    }

    /// Parse template text
    pub fn parse(source_name: &str, text: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut line = 1;
        let mut rest = text;

        while let Some(c) = rest.chars().next() {
            if let Some(after) = rest.strip_prefix("$${") {
                literal.push_str("${");
                rest = after;
            } else if let Some(after) = rest.strip_prefix("%%{") {
                literal.push_str("%{");
                rest = after;
            } else if let Some(after) = rest.strip_prefix("${") {
                let (name, remainder) =
                    after
                        .split_once('}')
                        .ok_or_else(|| TemplateError::Unterminated {
                            source_name: source_name.to_string(),
                            line,
                        })?;
                let name = name.trim();
                if name != DOWNLOAD_URL_VAR {
                    return Err(TemplateError::UnknownVariable {
                        source_name: source_name.to_string(),
                        line,
                        name: name.to_string(),
                    });
                }
                if !literal.is_empty() {
                    segments.push(Segment::Text(std::mem::take(&mut literal)));
                }
                segments.push(Segment::DownloadUrl);
                rest = remainder;
            } else if rest.starts_with("%{") {
                return Err(TemplateError::Directive {
                    source_name: source_name.to_string(),
                    line,
                });
            } else {
                if c == '\n' {
                    line += 1;
                }
                literal.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Text(literal));
        }

        let template = Self {
            source_name: source_name.to_string(),
            segments,
        };
        if !template.uses_download_url() {
            log::warn!("startup template {source_name} never uses ${{{DOWNLOAD_URL_VAR}}}");
        }
        Ok(template)
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn uses_download_url(&self) -> bool {
        self.segments.contains(&Segment::DownloadUrl)
    }

    /// Substitute the download URL and return the script verbatim
    pub fn render(&self, download_url: &str) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::DownloadUrl => out.push_str(download_url),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_substitutes_download_url() {
        let t = StartupTemplate::parse("t", "curl -o server.jar ${downloadUrl}\n").unwrap();
        assert_eq!(
            t.render("https://example.com/server.jar"),
            "curl -o server.jar https://example.com/server.jar\n"
        );
    }

    #[test]
    fn test_whitespace_inside_interpolation() {
        let t = StartupTemplate::parse("t", "${ downloadUrl }").unwrap();
        assert_eq!(t.render("u"), "u");
    }

    #[test]
    fn test_escapes_become_literal() {
        let t = StartupTemplate::parse("t", "echo $${HOME} %%{x} $PATH").unwrap();
        assert_eq!(t.render("u"), "echo ${HOME} %{x} $PATH");
    }

    #[test]
    fn test_unknown_variable_rejected_with_line() {
        let err = StartupTemplate::parse("init.sh", "#!/bin/sh\necho ${version}\n").unwrap_err();
        match err {
            TemplateError::UnknownVariable { line, name, .. } => {
                assert_eq!(line, 2);
                assert_eq!(name, "version");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_directive_rejected() {
        let err = StartupTemplate::parse("t", "%{ if true }x%{ endif }").unwrap_err();
        assert!(matches!(err, TemplateError::Directive { line: 1, .. }));
    }

    #[test]
    fn test_unterminated_rejected() {
        let err = StartupTemplate::parse("t", "echo ${downloadUrl").unwrap_err();
        assert!(matches!(err, TemplateError::Unterminated { .. }));
    }

    #[test]
    fn test_bundled_template_uses_download_url() {
        let t = StartupTemplate::bundled().unwrap();
        assert!(t.uses_download_url());
        let script = t.render("https://example.com/server.jar");
        assert!(script.starts_with("#!/bin/bash"));
        assert!(script.contains("https://example.com/server.jar"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boot.sh");
        std::fs::write(&path, "wget ${downloadUrl}").unwrap();
        let t = StartupTemplate::load(&path).unwrap();
        assert_eq!(t.render("u"), "wget u");

        let missing = StartupTemplate::load(&dir.path().join("nope.sh")).unwrap_err();
        assert!(matches!(missing, TemplateError::Io { .. }));
    }
}
