use std::rc::Rc;
use std::str::FromStr;

use futures::executor::block_on;
use futures::future::{join, ready, join_all, FutureExt, LocalBoxFuture};
use log::{debug, trace};

use crate::ast::{Node, Template};
use crate::env::Environment;
use crate::error::{Error, Structural};
use crate::foreign::{ForeignRuntime, HostLibrary};
use crate::import::{Loader, NullLoader};
use crate::output::PrintHandler;
use crate::types::{GcCell, Map, Operator, Res};
use crate::value::Value;
use crate::ImportConfig;

/// Runs programs. Holds the collaborators every evaluation may reach for:
/// the loader used by `import`, the foreign runtime used by `require` and
/// the sink written to by `print`.
pub struct Interpreter {
    pub(crate) config: ImportConfig,
    pub(crate) loader: Box<dyn Loader>,
    pub(crate) foreign: Box<dyn ForeignRuntime>,
    pub(crate) output: PrintHandler,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Interpreter {
        Interpreter {
            config: ImportConfig::default(),
            loader: Box::new(NullLoader),
            foreign: Box::new(HostLibrary::new()),
            output: PrintHandler::default(),
        }
    }

    pub fn with_config(mut self, config: ImportConfig) -> Interpreter {
        self.config = config;
        self
    }

    pub fn with_loader(mut self, loader: impl Loader + 'static) -> Interpreter {
        self.loader = Box::new(loader);
        self
    }

    pub fn with_foreign(mut self, foreign: impl ForeignRuntime + 'static) -> Interpreter {
        self.foreign = Box::new(foreign);
        self
    }

    pub fn with_output(mut self, output: PrintHandler) -> Interpreter {
        self.output = output;
        self
    }

    pub fn output(&self) -> &PrintHandler {
        &self.output
    }

    /// Execute a program in a fork of `initial`, one statement at a time, and
    /// return the resulting scope. Errors are not rendered.
    pub fn execute<'a>(&'a self, program: &'a [Node], initial: &Environment) -> LocalBoxFuture<'a, Res<Environment>> {
        let scope = initial.fork();
        async move {
            debug!("executing program of {} statements", program.len());
            let frame = Frame::new(self, scope.clone());
            for node in program {
                frame.evaluate(node).await?;
            }
            debug!("program finished");
            Ok(scope)
        }
        .boxed_local()
    }

    /// Execute a program and render any error for display.
    pub async fn run(&self, program: &[Node], initial: &Environment) -> Res<Environment> {
        self.execute(program, initial).await.map_err(Error::render)
    }

    /// Blocking variant of [`Interpreter::run`].
    pub fn run_blocking(&self, program: &[Node], initial: &Environment) -> Res<Environment> {
        block_on(self.run(program, initial))
    }
}

/// Evaluation context: the interpreter and the scope statements write to.
#[derive(Clone)]
pub(crate) struct Frame<'a> {
    pub(crate) interp: &'a Interpreter,
    pub(crate) scope: Environment,
}

impl<'a> Frame<'a> {
    pub(crate) fn new(interp: &'a Interpreter, scope: Environment) -> Frame<'a> {
        Frame { interp, scope }
    }

    pub(crate) fn evaluate<'n>(&self, node: &'n Node) -> LocalBoxFuture<'n, Res<Value>>
    where
        'a: 'n,
    {
        let frame = self.clone();
        async move { frame.evaluate_node(node).await }.boxed_local()
    }

    async fn evaluate_node(&self, node: &Node) -> Res<Value> {
        match node {
            Node::Expression { operator, left, right } => {
                let symbol = match operator.as_ref() {
                    Node::Operator(symbol) => symbol,
                    other => return Err(Error::new(Structural::NotAnOperator(other.kind()))),
                };
                let op = Operator::from_str(symbol)
                    .map_err(|_| Error::new(Structural::UnknownOperator(symbol.clone())))?;
                trace!("applying '{}'", op);
                self.apply(op, left, right).await.map_err(|e| e.tag(op))
            }

            Node::Atom(name) | Node::Accessor(name) => Ok(self
                .scope
                .lookup(*name)
                .unwrap_or_else(|| Value::String(name.as_str().to_owned()))),

            Node::Literal(value) => Ok(value.clone()),

            Node::Template(template) => Ok(Value::Struct(GcCell::new(self.materialize(template).await?))),

            Node::Operator(symbol) => Err(Error::new(Structural::StrayOperator(symbol.clone()))),
        }
    }

    /// Evaluate both operands concurrently and fail if either fails.
    pub(crate) async fn both(&self, left: &Node, right: &Node) -> Res<(Value, Value)> {
        let (l, r) = join(self.evaluate(left), self.evaluate(right)).await;
        Ok((l?, r?))
    }

    /// Build a fresh struct from a template. Atom entries stand for their own
    /// names; everything else is evaluated.
    pub(crate) async fn materialize(&self, template: &Template) -> Res<Map> {
        let values = join_all(template.values().map(|node| self.entry(node))).await;
        let mut map = Map::new();
        for ((key, _), value) in template.iter().zip(values) {
            map.insert(*key, value?);
        }
        Ok(map)
    }

    fn entry<'n>(&self, node: &'n Node) -> LocalBoxFuture<'n, Res<Value>>
    where
        'a: 'n,
    {
        match node {
            Node::Atom(name) => ready(Ok(Value::String(name.as_str().to_owned()))).boxed_local(),
            Node::Template(template) => {
                let frame = self.clone();
                async move { Ok(Value::Struct(GcCell::new(frame.materialize(template).await?))) }.boxed_local()
            }
            _ => self.evaluate(node),
        }
    }

    /// Run a block of statements in a new scope holding `bindings`.
    pub(crate) fn execute_block(&self, body: Rc<Vec<Node>>, bindings: Map) -> LocalBoxFuture<'a, Res<Environment>> {
        let interp = self.interp;
        async move {
            debug!("entering block of {} statements", body.len());
            let scope = Environment::from_map(bindings);
            let frame = Frame::new(interp, scope.clone());
            for node in body.iter() {
                frame.evaluate(node).await?;
            }
            Ok(scope)
        }
        .boxed_local()
    }

    /// Load a program through the loader and run it in an empty scope.
    pub(crate) fn import_and_run(&self, path: String) -> LocalBoxFuture<'a, Res<Environment>> {
        let interp = self.interp;
        async move {
            debug!("importing {}", path);
            let program = interp.loader.load(&path).await?;
            interp.execute(&program, &Environment::new()).await
        }
        .boxed_local()
    }
}
