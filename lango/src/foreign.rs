use std::collections::HashMap;
use std::rc::Rc;

use futures::future::{ready, FutureExt, LocalBoxFuture};
use json::JsonValue;

use crate::builtins;
use crate::error::{Collaborator, Error};
use crate::types::Res;

/// A callable living outside the evaluator. Arguments and results cross the
/// boundary as JSON values; failures are reported as messages.
pub type ForeignFn = Rc<dyn Fn(&[JsonValue]) -> Result<JsonValue, String>>;

/// Resolves `require` paths to foreign callables.
pub trait ForeignRuntime {
    fn resolve<'a>(&'a self, path: &'a [String]) -> LocalBoxFuture<'a, Res<ForeignFn>>;
}

/// The static host library, optionally extended with embedder-supplied
/// functions. Extra functions take precedence.
///
/// Paths resolve flat: registered functions match their whole dotted path,
/// and the static table only answers `[module, name]`.
#[derive(Default)]
pub struct HostLibrary {
    extra: HashMap<String, ForeignFn>,
}

impl HostLibrary {
    pub fn new() -> HostLibrary {
        HostLibrary::default()
    }

    /// Register a function under a dotted path, e.g. `"app.greet"`.
    pub fn register(
        mut self,
        path: impl Into<String>,
        func: impl Fn(&[JsonValue]) -> Result<JsonValue, String> + 'static,
    ) -> HostLibrary {
        self.extra.insert(path.into(), Rc::new(func));
        self
    }

    fn resolve_sync(&self, path: &[String]) -> Res<ForeignFn> {
        let dotted = path.join(".");
        if let Some(func) = self.extra.get(&dotted) {
            return Ok(func.clone());
        }
        match path {
            [module, name] => builtins::lookup(module, name)
                .map(|func| Rc::new(func) as ForeignFn)
                .ok_or_else(|| Error::new(Collaborator::Unresolved(dotted))),
            _ => Err(Error::new(Collaborator::Unresolved(dotted))),
        }
    }
}

impl ForeignRuntime for HostLibrary {
    fn resolve<'a>(&'a self, path: &'a [String]) -> LocalBoxFuture<'a, Res<ForeignFn>> {
        ready(self.resolve_sync(path)).boxed_local()
    }
}
