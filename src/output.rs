//! Runs the whole pipeline over a DSL source and writes the artifact.

use std::{
    fs,
    io::{self, Write as _},
    path::{Path, PathBuf},
    process::Command,
};

use crate::{
    emit::emit,
    error::{Error, Report},
    parser::{Decl, parse_decl},
    print::print,
    reader::{lines, read_line},
    registry::Registry,
    schema::resolve,
};

pub const DEFAULT_PRELUDE: &str = "use super::{Node, NodeChild, NodeKind, Tag, Token};";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Emitted verbatim after the header. Skipped if blank.
    pub prelude: String,
    /// Emit the `AstNode` and `AstToken` traits.
    pub runtime: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            prelude: DEFAULT_PRELUDE.into(),
            runtime: true,
        }
    }
}

/// Generated source, and the errors of declarations left out of it.
#[derive(Debug, Clone)]
pub struct Output {
    pub code: String,
    pub report: Report,
}

/// Reads and parses every declaration line, collecting per-line errors.
pub fn parse_source<'a>(src: &'a str, report: &mut Report) -> Vec<Decl<'a>> {
    let mut decls = Vec::new();
    for line in lines(src) {
        match read_line(line).and_then(parse_decl) {
            Ok(decl) => decls.push(decl),
            Err(error) => report.push(error),
        }
    }
    decls
}

/// Generates bindings for every valid declaration in `src`.
///
/// Fails only if no declaration survives. Errors of the declarations
/// which were left out are returned alongside the code otherwise.
pub fn generate(src: &str, registry: &Registry, options: &Options) -> Result<Output, Report> {
    let mut report = Report::default();

    let decls = parse_source(src, &mut report);
    let resolved = resolve(decls, registry, &mut report);
    report.sort();

    if resolved.is_empty() {
        report.push(Error::empty());
        return Err(report);
    }

    let items = emit(&resolved);
    log::debug!(
        "emitting {} items: {}",
        items.len(),
        items.iter().map(|item| item.name()).collect::<Vec<_>>().join(", ")
    );

    Ok(Output {
        code: print(&items, options),
        report,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to run rustfmt: {0}")]
    RustfmtSpawn(#[source] io::Error),

    #[error("rustfmt exited with {0}")]
    Rustfmt(std::process::ExitStatus),
}

pub fn read_source(path: &Path) -> Result<String, OutputError> {
    fs::read_to_string(path).map_err(|source| OutputError::Read {
        path: path.to_owned(),
        source,
    })
}

/// Replaces the file at `path` with `code`.
///
/// `code` is written to a sibling temporary file which is then renamed
/// over `path`, so the target is either fully old or fully new.
/// A path of `-` writes to stdout instead.
pub fn write_artifact(path: &Path, code: &str) -> Result<(), OutputError> {
    replace(path, code, false)
}

/// Same as [`write_artifact`], but the temporary file is formatted with
/// rustfmt before it replaces `path`. Stdout output is left unformatted.
pub fn write_formatted_artifact(path: &Path, code: &str) -> Result<(), OutputError> {
    replace(path, code, true)
}

fn replace(path: &Path, code: &str, format: bool) -> Result<(), OutputError> {
    let write_error = |source| OutputError::Write {
        path: path.to_owned(),
        source,
    };

    if path == Path::new("-") {
        return io::stdout()
            .lock()
            .write_all(code.as_bytes())
            .map_err(write_error);
    }

    let tmp = temp_path(path);
    let write = || -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&tmp, code)
    };

    let result = write()
        .map_err(write_error)
        .and_then(|()| if format { rustfmt(&tmp) } else { Ok(()) })
        .and_then(|()| fs::rename(&tmp, path).map_err(write_error));
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result?;

    log::info!("wrote {}", path.display());
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn rustfmt(path: &Path) -> Result<(), OutputError> {
    let status = Command::new("rustfmt")
        .args(["--edition", "2024"])
        .arg(path)
        .status()
        .map_err(OutputError::RustfmtSpawn)?;
    if !status.success() {
        return Err(OutputError::Rustfmt(status));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_file_is_a_sibling() {
        assert_eq!(
            temp_path(Path::new("out/nodes.rs")),
            Path::new("out/nodes.rs.tmp")
        );
        assert_eq!(temp_path(Path::new("nodes.rs")), Path::new("nodes.rs.tmp"));
    }

    #[test]
    fn blank_prelude_is_skipped() {
        let options = Options {
            prelude: "  \n".into(),
            runtime: false,
        };
        let output = generate("Ident", &Registry::default(), &options).unwrap();
        assert!(output.report.is_empty());
        assert!(!output.code.contains("use "));
    }
}
