#[macro_use]
extern crate lazy_static;

pub mod ast;
mod builtins;
pub mod env;
pub mod error;
pub mod eval;
pub mod foreign;
pub mod import;
pub mod output;
pub mod parsing;
mod rules;
mod types;
pub mod value;
mod wrappers;

#[cfg(test)]
mod tests;

use std::fs::read_to_string;
use std::path::Path;

pub use ast::{Node, Program};
pub use env::Environment;
pub use error::Error;
pub use eval::Interpreter;
pub use types::{Key, Map, Operator, Res, Type};
pub use value::Value;

use error::Collaborator;
use import::{FileLoader, NullLoader};
use parsing::{JsonAstParser, Parser};

/// Conventions for turning a bare module name into a loader path.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportConfig {
    /// Directory holding named modules, relative to the loader root.
    pub lib_dir: String,

    /// File extension of module files, without the dot.
    pub extension: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        ImportConfig {
            lib_dir: "lib".to_owned(),
            extension: "lango".to_owned(),
        }
    }
}

impl ImportConfig {
    pub fn module_path(&self, name: &str) -> String {
        format!("{}/{}.{}", self.lib_dir, name, self.extension)
    }
}

/// Parse and run a program given as AST JSON. If `root` is given, it is the
/// path of the program file and imports are read relative to its directory.
pub fn run(source: &str, root: Option<&Path>, config: ImportConfig) -> Res<Environment> {
    let program = JsonAstParser.parse(source).map_err(Error::render)?;
    let interp = Interpreter::new().with_config(config);
    let interp = match root.and_then(Path::parent) {
        Some(dir) => interp.with_loader(FileLoader::new(dir)),
        None => interp.with_loader(NullLoader),
    };
    interp.run_blocking(&program, &Environment::new())
}

pub fn run_raw(source: &str) -> Res<Environment> {
    run(source, None, ImportConfig::default())
}

pub fn run_file(path: &Path) -> Res<Environment> {
    let contents = read_to_string(path)
        .map_err(|e| Error::new(Collaborator::Load(path.display().to_string(), e.to_string())).render())?;
    run(&contents, Some(path), ImportConfig::default())
}

/// Run an already-built program with the default interpreter.
pub fn run_program(program: &[Node]) -> Res<Environment> {
    Interpreter::new().run_blocking(program, &Environment::new())
}
