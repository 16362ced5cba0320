//! File-level plumbing: finding `.vm` units, running them through one
//! [`Translator`] and writing the combined `.asm` output.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{LineError, TranslateError};
use crate::parser;
use crate::translator::{Translator, TranslatorOptions};

const SOURCE_EXTENSION: &str = "vm";
const OUTPUT_EXTENSION: &str = "asm";

/// When to emit the bootstrap code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum BootstrapMode {
    /// Only when a directory combines more than one unit.
    #[default]
    Auto,
    Always,
    Never,
}

/// The units to translate and where the result goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub units: Vec<PathBuf>,
    pub output: PathBuf,
    pub from_directory: bool,
}

fn is_source(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == SOURCE_EXTENSION)
}

/// Unit name used to namespace static cells: the file stem.
pub fn unit_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl Job {
    /// Works out the units and the output path for `input`, which is either
    /// a single `.vm` file or a directory of them.
    pub fn plan(input: &Path, output: Option<&Path>) -> Result<Job, TranslateError> {
        if input.is_dir() {
            let entries = fs::read_dir(input).map_err(|source| TranslateError::Read {
                path: input.to_path_buf(),
                source,
            })?;

            let mut units = vec![];
            for entry in entries {
                let path = entry
                    .map_err(|source| TranslateError::Read {
                        path: input.to_path_buf(),
                        source,
                    })?
                    .path();
                if path.is_file() && is_source(&path) {
                    units.push(path);
                }
            }
            if units.is_empty() {
                return Err(TranslateError::NoSourceFiles(input.to_path_buf()));
            }
            units.sort();

            let dir_name = input
                .canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                .unwrap_or_else(|| "out".to_string());
            let output = output
                .map(Path::to_path_buf)
                .unwrap_or_else(|| input.join(format!("{}.{}", dir_name, OUTPUT_EXTENSION)));

            Ok(Job {
                units,
                output,
                from_directory: true,
            })
        } else if input.is_file() && is_source(input) {
            let output = output
                .map(Path::to_path_buf)
                .unwrap_or_else(|| input.with_extension(OUTPUT_EXTENSION));
            Ok(Job {
                units: vec![input.to_path_buf()],
                output,
                from_directory: false,
            })
        } else {
            Err(TranslateError::UnsupportedInput(input.to_path_buf()))
        }
    }

    pub fn wants_bootstrap(&self, mode: BootstrapMode) -> bool {
        match mode {
            BootstrapMode::Always => true,
            BootstrapMode::Never => false,
            BootstrapMode::Auto => self.from_directory && self.units.len() > 1,
        }
    }

    /// Reads, translates and writes. The output file is only touched once
    /// every unit has translated cleanly.
    pub fn run(
        &self,
        mode: BootstrapMode,
        options: TranslatorOptions,
    ) -> Result<usize, TranslateError> {
        let bootstrap = self.wants_bootstrap(mode);
        info!(
            "translating {} unit(s) into {} (bootstrap: {})",
            self.units.len(),
            self.output.display(),
            bootstrap
        );

        let mut sources = vec![];
        for path in &self.units {
            let text = fs::read_to_string(path).map_err(|source| TranslateError::Read {
                path: path.clone(),
                source,
            })?;
            sources.push((unit_name(path), text));
        }

        let instructions = translate_sources(&sources, bootstrap, options)?;

        let mut text = instructions.join("\n");
        text.push('\n');
        fs::write(&self.output, text).map_err(|source| TranslateError::Write {
            path: self.output.clone(),
            source,
        })?;

        info!("wrote {} instructions", instructions.len());
        Ok(instructions.len())
    }
}

/// Translates `(unit name, source text)` pairs, in order, into one
/// instruction stream.
pub fn translate_sources(
    sources: &[(String, String)],
    bootstrap: bool,
    options: TranslatorOptions,
) -> Result<Vec<String>, TranslateError> {
    let mut translator = Translator::new(options);
    if bootstrap {
        translator.bootstrap();
    }

    for (unit, text) in sources {
        let unit_error = |source: LineError| TranslateError::Unit {
            unit: unit.clone(),
            source,
        };

        let commands = parser::parse(text).map_err(unit_error)?;
        debug!("{}: {} commands", unit, commands.len());

        translator.set_unit(unit);
        translator.translate_all(&commands).map_err(unit_error)?;
    }

    Ok(translator.into_instructions())
}
