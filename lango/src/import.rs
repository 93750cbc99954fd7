use std::collections::HashMap;
use std::fs::read_to_string;
use std::path::PathBuf;

use futures::future::{ready, FutureExt, LocalBoxFuture};
use log::debug;

use crate::ast::Program;
use crate::error::{Collaborator, Error};
use crate::parsing::{JsonAstParser, Parser};
use crate::types::Res;

/// Produces parsed programs for `import`.
pub trait Loader {
    fn load<'a>(&'a self, path: &'a str) -> LocalBoxFuture<'a, Res<Program>>;
}

/// Reads programs from disk, relative to a root directory, and hands the
/// text to a parser.
pub struct FileLoader {
    pub root: PathBuf,
    pub parser: Box<dyn Parser>,
}

impl FileLoader {
    pub fn new(root: impl Into<PathBuf>) -> FileLoader {
        FileLoader {
            root: root.into(),
            parser: Box::new(JsonAstParser),
        }
    }

    pub fn with_parser(mut self, parser: impl Parser + 'static) -> FileLoader {
        self.parser = Box::new(parser);
        self
    }

    fn load_sync(&self, path: &str) -> Res<Program> {
        let target = self.root.join(path);
        debug!("reading {}", target.display());
        let contents = read_to_string(&target)
            .map_err(|e| Error::new(Collaborator::Load(path.to_owned(), e.to_string())))?;
        self.parser.parse(&contents)
    }
}

impl Loader for FileLoader {
    fn load<'a>(&'a self, path: &'a str) -> LocalBoxFuture<'a, Res<Program>> {
        ready(self.load_sync(path)).boxed_local()
    }
}

/// In-memory table of programs keyed by path.
#[derive(Default)]
pub struct MemoryLoader {
    programs: HashMap<String, Program>,
}

impl MemoryLoader {
    pub fn new() -> MemoryLoader {
        MemoryLoader::default()
    }

    pub fn with(mut self, path: impl Into<String>, program: Program) -> MemoryLoader {
        self.programs.insert(path.into(), program);
        self
    }
}

impl Loader for MemoryLoader {
    fn load<'a>(&'a self, path: &'a str) -> LocalBoxFuture<'a, Res<Program>> {
        let result = self
            .programs
            .get(path)
            .cloned()
            .ok_or_else(|| Error::new(Collaborator::Load(path.to_owned(), "no such program".to_owned())));
        ready(result).boxed_local()
    }
}

/// Tries each loader in turn; the first success wins.
pub struct SeqLoader {
    pub loaders: Vec<Box<dyn Loader>>,
}

impl Loader for SeqLoader {
    fn load<'a>(&'a self, path: &'a str) -> LocalBoxFuture<'a, Res<Program>> {
        async move {
            for loader in &self.loaders {
                if let Ok(program) = loader.load(path).await {
                    return Ok(program);
                }
            }
            Err(Error::new(Collaborator::Load(path.to_owned(), "couldn't import".to_owned())))
        }
        .boxed_local()
    }
}

/// Refuses every import.
pub struct NullLoader;

impl Loader for NullLoader {
    fn load<'a>(&'a self, path: &'a str) -> LocalBoxFuture<'a, Res<Program>> {
        ready(Err(Error::new(Collaborator::Load(path.to_owned(), "no imports".to_owned())))).boxed_local()
    }
}
