use std::ops::Range;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use hcl_edit::structure::{Block, BlockLabel, Body};

use crate::runner::RunnerError;
use crate::types::SourceRange;

/// One parsed configuration file.
#[derive(Debug, Clone)]
pub struct ModuleFile {
    name: String,
    source: String,
    body: Body,
}

impl ModuleFile {
    /// Parse `source`; `name` is the file name used in ranges and messages.
    pub fn parse(name: impl Into<String>, source: impl Into<String>) -> Result<Self, RunnerError> {
        let name = name.into();
        let source = source.into();
        let body = Body::from_str(&source)
            .map_err(|e| RunnerError::Parse { file: name.clone(), message: e.to_string() })?;
        Ok(Self { name, source, body })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Range of a parsed item, without surrounding whitespace
    pub fn range(&self, span: Option<Range<usize>>) -> SourceRange {
        let span = span.unwrap_or(0..0);
        let span = match self.source.get(span.clone()) {
            Some(text) => {
                let start = span.start + (text.len() - text.trim_start().len());
                let end = (span.end - (text.len() - text.trim_end().len())).max(start);
                start..end
            }
            None => span,
        };
        SourceRange::from_span(&self.name, &self.source, span)
    }

    /// Top-level blocks named `ident`
    pub fn blocks<'a>(&'a self, ident: &'a str) -> impl Iterator<Item = &'a Block> + 'a {
        self.body.blocks().filter(move |block| block.ident.as_str() == ident)
    }
}

/// The configuration files of one directory.
#[derive(Debug, Clone, Default)]
pub struct Module {
    dir: PathBuf,
    files: Vec<ModuleFile>,
}

impl Module {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), files: vec![] }
    }

    /// Build a module from in-memory sources, in the given order.
    pub fn from_sources<I, N, S>(dir: impl Into<PathBuf>, sources: I) -> Result<Self, RunnerError>
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: Into<String>,
    {
        let mut module = Self::new(dir);
        for (name, source) in sources {
            module.add_file(ModuleFile::parse(name, source)?);
        }
        Ok(module)
    }

    pub fn add_file(&mut self, file: ModuleFile) {
        self.files.push(file);
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn files(&self) -> &[ModuleFile] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Top-level blocks named `ident` across files, in file then source order
    pub fn blocks<'a>(
        &'a self,
        ident: &'a str,
    ) -> impl Iterator<Item = (&'a ModuleFile, &'a Block)> + 'a {
        self.files.iter().flat_map(move |file| file.blocks(ident).map(move |block| (file, block)))
    }
}

pub fn label_str(label: &BlockLabel) -> &str {
    match label {
        BlockLabel::String(s) => s.value().as_str(),
        BlockLabel::Ident(i) => i.value().as_str(),
    }
}
