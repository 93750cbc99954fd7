//! The operator rules.
//!
//! Each rule receives the unevaluated operand nodes and decides for itself
//! what to evaluate. Rules that need both operand values evaluate them
//! concurrently through [`Frame::both`].

use futures::future::join_all;
use json::JsonValue;
use log::{debug, warn};

use crate::ast::Node;
use crate::env::AssignPath;
use crate::error::{Collaborator, Error, Reason, Structural, TypeMismatch};
use crate::eval::Frame;
use crate::types::{reserved, Key, Map, Operator, Res, Type};
use crate::value::{Action, Function, Value};

fn expected(operator: Operator, expected: Type, received: &Value) -> Error {
    Error::new(TypeMismatch::Expected {
        operator,
        expected,
        received: received.type_of(),
    })
}

impl<'a> Frame<'a> {
    pub(crate) async fn apply(&self, op: Operator, left: &Node, right: &Node) -> Res<Value> {
        match op {
            Operator::Bind => self.bind(left, right).await,
            Operator::Add | Operator::Subtract => self.arithmetic(op, left, right).await,
            Operator::Equal | Operator::NotEqual => self.equality(op, left, right).await,
            Operator::Field => self.field(left, right).await,
            Operator::KeyRead => self.key_read(left, right).await,
            Operator::Capture => self.capture(left, right).await,
            Operator::Call => self.call(left, right).await,
            Operator::Branch => self.branch(left, right).await,
            Operator::Each => self.each(left, right).await,
            Operator::Append => self.append(left, right).await,
            Operator::Assign => self.assign(left, right).await,
            Operator::New => self.construct(right),
            Operator::Module => self.module(right),
            Operator::Export => self.export(right).await,
            Operator::Import => self.import(right).await,
            Operator::Require => self.require(right).await,
            Operator::Print => self.print(right).await,
            Operator::Return => self.ret(right).await,
        }
    }

    async fn bind(&self, left: &Node, right: &Node) -> Res<Value> {
        let name = match left {
            Node::Atom(name) => *name,
            other => return Err(Error::new(Structural::ExpectedName(other.kind()))),
        };
        let value = self.evaluate(right).await?;
        self.scope.bind(name, value);
        Ok(Value::Void)
    }

    async fn arithmetic(&self, op: Operator, left: &Node, right: &Node) -> Res<Value> {
        let (l, r) = self.both(left, right).await?;
        match (&l, &r) {
            (Value::Void, Value::Number(y)) if op == Operator::Subtract => Ok(Value::Number(-y)),
            (Value::Void, _) if op == Operator::Subtract => Err(Error::new(TypeMismatch::UnOp(r.type_of(), op))),
            (Value::Number(x), Value::Number(y)) => Ok(Value::Number(match op {
                Operator::Add => x + y,
                _ => x - y,
            })),
            _ => Err(Error::new(TypeMismatch::BinOp(l.type_of(), r.type_of(), op))),
        }
    }

    async fn equality(&self, op: Operator, left: &Node, right: &Node) -> Res<Value> {
        let (l, r) = self.both(left, right).await?;
        if l.type_of() != r.type_of() {
            return Err(Error::new(TypeMismatch::BinOp(l.type_of(), r.type_of(), op)));
        }
        Ok(Value::Bool((l == r) == (op == Operator::Equal)))
    }

    async fn field(&self, left: &Node, right: &Node) -> Res<Value> {
        match right {
            Node::Atom(key) => Ok(self.evaluate(left).await?.field(*key)),
            Node::Accessor(_) => {
                let (l, r) = self.both(left, right).await?;
                Ok(r.to_key().map(|key| l.field(key)).unwrap_or(Value::Void))
            }
            other => Err(Error::new(Structural::ExpectedField(other.kind()))),
        }
    }

    async fn key_read(&self, left: &Node, right: &Node) -> Res<Value> {
        let (key, target) = self.both(left, right).await?;
        Ok(key.to_key().map(|key| target.field(key)).unwrap_or(Value::Void))
    }

    async fn capture(&self, left: &Node, right: &Node) -> Res<Value> {
        let (_, r) = self.both(left, right).await?;
        match &r {
            Value::Action(action) => Ok(Value::Action(action.capture(self.scope.storage().clone()))),
            other => Err(expected(Operator::Capture, Type::Action, other)),
        }
    }

    async fn call(&self, left: &Node, right: &Node) -> Res<Value> {
        let callee = self.evaluate(left).await?;
        match &callee {
            Value::Function(func) => {
                let args = self.arguments(right).await?;
                debug!("calling {} with {} arguments", func.name(), args.len());
                func.call(&args)
            }
            Value::Action(action) => {
                let bindings = self.parameters(right).await?;
                self.invoke(action, bindings).await
            }
            other => Err(Error::new(Reason::Call(other.type_of()))),
        }
    }

    /// Positional arguments for a native function.
    async fn arguments(&self, right: &Node) -> Res<Vec<Value>> {
        match right {
            Node::Template(template) => join_all(template.values().map(|node| self.evaluate(node)))
                .await
                .into_iter()
                .collect(),
            other => {
                let value = self.evaluate(other).await?;
                Ok(match &value {
                    Value::Struct(map) => map.borrow().values().cloned().collect(),
                    Value::Void => vec![],
                    _ => vec![value.clone()],
                })
            }
        }
    }

    /// Named arguments for an action. An unbound name passes no arguments.
    async fn parameters(&self, right: &Node) -> Res<Map> {
        match right {
            Node::Atom(name) if self.scope.lookup(*name).is_none() => Ok(Map::new()),
            Node::Template(template) => self.materialize(template).await,
            other => {
                let value = self.evaluate(other).await?;
                match &value {
                    Value::Struct(map) => Ok(map.borrow().clone()),
                    Value::Void => Ok(Map::new()),
                    _ => Err(Error::new(TypeMismatch::Arguments(value.type_of()))),
                }
            }
        }
    }

    /// Run an action. Captured bindings are laid over the arguments.
    async fn invoke(&self, action: &Action, mut bindings: Map) -> Res<Value> {
        if let Some(captured) = action.scope() {
            let ret = Key::new(reserved::RETURN);
            for (key, value) in captured.borrow().iter() {
                if *key != ret {
                    bindings.insert(*key, value.clone());
                }
            }
        }
        bindings.insert(Key::new(reserved::RECEIVER), self.scope.as_struct());

        debug!("invoking action with {} bindings", bindings.len());
        let scope = self.execute_block(action.body(), bindings).await?;
        Ok(scope.returned())
    }

    async fn branch(&self, left: &Node, right: &Node) -> Res<Value> {
        let (condition, body) = self.both(left, right).await?;
        if condition.is_void() {
            return Ok(Value::Void);
        }
        let action = match &body {
            Value::Action(action) => action,
            other => return Err(expected(Operator::Branch, Type::Action, other)),
        };
        let seed = self.scope.storage().borrow().clone();
        self.execute_block(action.body(), seed).await?;
        Ok(Value::Void)
    }

    async fn each(&self, left: &Node, right: &Node) -> Res<Value> {
        let (sequence, body) = self.both(left, right).await?;
        let action = match &body {
            Value::Action(action) => action,
            other => return Err(expected(Operator::Each, Type::Action, other)),
        };
        let elements = sequence
            .elements()
            .ok_or_else(|| Error::new(TypeMismatch::Iterate(sequence.type_of())))?;

        for (i, element) in elements.into_iter().enumerate() {
            let mut bindings = match action.scope() {
                Some(captured) => captured.borrow().clone(),
                None => Map::new(),
            };
            bindings.insert(Key::new(reserved::VALUE), element);
            bindings.insert(Key::new(reserved::INDEX), Value::Number(i as f64));
            self.execute_block(action.body(), bindings).await?;
        }
        Ok(Value::Void)
    }

    async fn append(&self, left: &Node, right: &Node) -> Res<Value> {
        let (target, value) = self.both(left, right).await?;
        if target.push(value) {
            Ok(Value::Void)
        } else {
            Err(expected(Operator::Append, Type::Struct, &target))
        }
    }

    async fn assign(&self, left: &Node, right: &Node) -> Res<Value> {
        let value = self.evaluate(right).await?;
        let path = self.assign_path(left).await?;
        self.scope.merge_into(&path, value);
        Ok(Value::Void)
    }

    /// Walk a `:` chain from its outermost application down to the root atom.
    async fn assign_path(&self, mut node: &Node) -> Res<AssignPath> {
        let mut keys = Vec::new();
        loop {
            match node {
                Node::Expression { left, right, .. } if node.is_application_of(Operator::Field.symbol()) => {
                    keys.push(self.path_key(right).await?);
                    node = left.as_ref();
                }
                Node::Atom(root) if !keys.is_empty() => return Ok(AssignPath::new(*root, keys)),
                _ => return Err(Error::new(Structural::MalformedPath)),
            }
        }
    }

    async fn path_key(&self, node: &Node) -> Res<Key> {
        match node {
            Node::Atom(name) => Ok(*name),
            Node::Accessor(_) => {
                let value = self.evaluate(node).await?;
                value
                    .to_key()
                    .ok_or_else(|| Error::new(TypeMismatch::Key(value.type_of())))
            }
            other => Err(Error::new(Structural::ExpectedField(other.kind()))),
        }
    }

    fn construct(&self, right: &Node) -> Res<Value> {
        match right.name() {
            Some("Struct") => Ok(Value::new_struct()),
            Some(other) => Err(Error::new(Structural::UnknownType(other.to_owned()))),
            None => Err(Error::new(Structural::ExpectedName(right.kind()))),
        }
    }

    fn module(&self, right: &Node) -> Res<Value> {
        let name = right
            .name()
            .ok_or_else(|| Error::new(Structural::ExpectedName(right.kind())))?;
        self.scope.bind(Key::new(reserved::MODULE_NAME), Value::from(name));
        Ok(Value::Void)
    }

    async fn export(&self, right: &Node) -> Res<Value> {
        if self.scope.get(reserved::MODULE_NAME).is_none() {
            return Err(Error::new(Collaborator::ModuleUndeclared));
        }
        let value = self.evaluate(right).await?;
        self.scope.bind(Key::new(reserved::MODULE), value);
        Ok(Value::Void)
    }

    async fn import(&self, right: &Node) -> Res<Value> {
        let path = match right {
            Node::Literal(Value::String(path)) => path.clone(),
            Node::Atom(name) => self.interp.config.module_path(name.as_str()),
            other => return Err(Error::new(Structural::ExpectedName(other.kind()))),
        };

        let module = self.import_and_run(path.clone()).await?;
        let name = match module.get(reserved::MODULE_NAME).as_ref().and_then(Value::get_str) {
            Some(name) => name.to_owned(),
            None => return Err(Error::new(Collaborator::NoModule(path))),
        };
        let exported = module.get(reserved::MODULE).unwrap_or(Value::Void);
        debug!("imported module {} from {}", name, path);
        self.scope.bind(Key::new(name), exported);
        Ok(Value::Void)
    }

    async fn require(&self, right: &Node) -> Res<Value> {
        let path: Vec<String> = match right {
            Node::Template(template) => template
                .values()
                .map(|node| {
                    node.name()
                        .map(str::to_owned)
                        .ok_or_else(|| Error::new(Structural::ExpectedName(node.kind())))
                })
                .collect::<Res<_>>()?,
            other => other
                .name()
                .ok_or_else(|| Error::new(Structural::ExpectedName(other.kind())))?
                .split('.')
                .map(str::to_owned)
                .collect(),
        };

        let func = self.interp.foreign.resolve(&path).await?;
        let name = path.join(".");
        debug!("required {}", name);

        Ok(Value::Function(Function::new(name.clone(), move |args: &[Value]| {
            let args: Vec<JsonValue> = args.iter().map(Value::unwrap).collect();
            match func(&args) {
                Ok(result) => Ok(Value::wrap(&result)),
                Err(message) => {
                    warn!("{} failed: {}", name, message);
                    Ok(Value::Error(format!("Executed function returned an error: {}", message)))
                }
            }
        })))
    }

    async fn print(&self, right: &Node) -> Res<Value> {
        let value = self.evaluate(right).await?;
        self.interp.output.println(&value.to_string());
        Ok(Value::Void)
    }

    async fn ret(&self, right: &Node) -> Res<Value> {
        let value = self.evaluate(right).await?;
        self.scope.bind(Key::new(reserved::RETURN), value);
        Ok(Value::Void)
    }
}
