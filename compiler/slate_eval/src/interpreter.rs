//! Tree-walking interpreter for parsed templates.
//!
//! One [`Interpreter`] executes one template's [`Program`] against that
//! template's [`Environment`]. Everything that outlives a single template
//! (output capture, sections, the include chain) belongs to the
//! [`Runtime`] it borrows, and the runtime's intrinsics are the only way a
//! template reaches it.

use std::rc::Rc;

use slate_ir::{AssignOp, BinaryOp, ExprId, ExprKind, Intrinsic, Node, Program, Span};
use slate_stack::ensure_sufficient_stack;

use crate::builtins::call_builtin;
use crate::environment::Environment;
use crate::errors::{
    arity_mismatch, invalid_argument, not_indexable, not_iterable, type_mismatch, undefined_function,
    undefined_index, undefined_property, undefined_variable, EvalErrorKind, EvalResult,
};
use crate::operators::{evaluate_binary, evaluate_unary};
use crate::runtime::Runtime;
use crate::value::{next_index, Map, Value};

/// One step of a path into a value being assigned.
#[derive(Clone, Debug)]
enum Segment {
    Key(String),
    Append,
    Prop(String),
}

pub struct Interpreter<'a, 'r> {
    program: &'a Program,
    env: Environment,
    runtime: &'a mut Runtime<'r>,
}

impl<'a, 'r> Interpreter<'a, 'r> {
    pub fn new(program: &'a Program, env: Environment, runtime: &'a mut Runtime<'r>) -> Self {
        Interpreter {
            program,
            env,
            runtime,
        }
    }

    /// Variables as they stand after execution.
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Execute the whole program, writing to the runtime's current capture.
    pub fn run(&mut self) -> EvalResult<()> {
        let program = self.program;
        self.exec_block(&program.nodes)
    }

    fn exec_block(&mut self, nodes: &[Node]) -> EvalResult<()> {
        for node in nodes {
            self.exec(node)?;
        }
        Ok(())
    }

    fn exec(&mut self, node: &Node) -> EvalResult<()> {
        ensure_sufficient_stack(|| self.exec_inner(node))
    }

    fn exec_inner(&mut self, node: &Node) -> EvalResult<()> {
        match node {
            Node::Text(text) => {
                self.runtime.write(text);
                Ok(())
            }
            Node::Echo { expr, span } => {
                let value = self.eval(*expr)?;
                let text = value.to_text().map_err(|e| e.with_span(*span))?;
                self.runtime.write(&text);
                Ok(())
            }
            Node::Eval { expr, .. } => self.eval(*expr).map(drop),
            Node::If {
                branches,
                otherwise,
            } => {
                for branch in branches {
                    if self.eval(branch.condition)?.is_truthy() {
                        return self.exec_block(&branch.body);
                    }
                }
                match otherwise {
                    Some(body) => self.exec_block(body),
                    None => Ok(()),
                }
            }
            Node::Foreach {
                iterable,
                key,
                value,
                body,
                span,
            } => self.exec_foreach(*iterable, key.as_deref(), value, body, *span),
            Node::For {
                init,
                condition,
                step,
                body,
            } => {
                for id in init {
                    self.eval(*id)?;
                }
                while self.for_condition(condition)? {
                    self.exec_block(body)?;
                    for id in step {
                        self.eval(*id)?;
                    }
                }
                Ok(())
            }
            Node::While { condition, body } => {
                while self.eval(*condition)?.is_truthy() {
                    self.exec_block(body)?;
                }
                Ok(())
            }
        }
    }

    /// Every condition expression runs; the last one decides. No
    /// condition loops forever, as in the host language it mirrors.
    fn for_condition(&mut self, condition: &[ExprId]) -> EvalResult<bool> {
        let mut result = true;
        for id in condition {
            result = self.eval(*id)?.is_truthy();
        }
        Ok(result)
    }

    fn exec_foreach(
        &mut self,
        iterable: ExprId,
        key: Option<&str>,
        value: &str,
        body: &[Node],
        span: Span,
    ) -> EvalResult<()> {
        // The collection is a snapshot: the body may reassign the variable
        // it came from without disturbing the iteration.
        match self.eval(iterable)? {
            Value::List(items) => {
                for (index, item) in items.iter().enumerate() {
                    if let Some(key) = key {
                        let index = i64::try_from(index).unwrap_or(i64::MAX);
                        self.env.set(key, Value::Int(index));
                    }
                    self.env.set(value, item.clone());
                    self.exec_block(body)?;
                }
                Ok(())
            }
            Value::Map(map) => {
                for (name, item) in map.iter() {
                    if let Some(key) = key {
                        self.env.set(key, key_value(name));
                    }
                    self.env.set(value, item.clone());
                    self.exec_block(body)?;
                }
                Ok(())
            }
            other => Err(not_iterable(other.type_name()).with_span(span)),
        }
    }

    // Expressions

    pub fn eval(&mut self, id: ExprId) -> EvalResult {
        ensure_sufficient_stack(|| {
            let span = self.program.arena.get(id).span;
            self.eval_inner(id).map_err(|e| e.with_span(span))
        })
    }

    fn eval_inner(&mut self, id: ExprId) -> EvalResult {
        let program = self.program;
        match &program.arena.get(id).kind {
            ExprKind::Int(n) => Ok(Value::Int(*n)),
            ExprKind::Float(f) => Ok(Value::Float(*f)),
            ExprKind::Str(s) => Ok(Value::Str(s.clone())),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Var(name) => self.variable(name),
            ExprKind::Array(entries) => self.array(entries),
            ExprKind::Binary { op, left, right } => self.binary(*op, *left, *right),
            ExprKind::Unary { op, operand } => {
                let value = self.eval(*operand)?;
                evaluate_unary(&value, *op)
            }
            ExprKind::Ternary {
                cond,
                then,
                otherwise,
            } => {
                let cond_value = self.eval(*cond)?;
                match (cond_value.is_truthy(), then) {
                    (true, Some(then)) => self.eval(*then),
                    (true, None) => Ok(cond_value),
                    (false, _) => self.eval(*otherwise),
                }
            }
            ExprKind::Assign { op, target, value } => self.assign(*op, *target, *value),
            ExprKind::IncDec {
                target,
                increment,
                prefix,
            } => self.inc_dec(*target, *increment, *prefix),
            ExprKind::Index { base, index } => {
                let Some(index) = index else {
                    return Err(EvalErrorKind::AppendRead.into());
                };
                let base = self.eval(*base)?;
                let key = self.eval(*index)?;
                index_value(&base, &key)?.ok_or_else(|| undefined_index(display_key(&key)))
            }
            ExprKind::Property { base, name } => {
                let base = self.eval(*base)?;
                property_value(&base, name)?.ok_or_else(|| undefined_property(name))
            }
            ExprKind::Call { name, args } => self.call(name, args),
            ExprKind::Intrinsic { intrinsic, args } => self.intrinsic(*intrinsic, args),
        }
    }

    fn variable(&self, name: &str) -> EvalResult {
        if let Some(value) = self.env.get(name) {
            return Ok(value.clone());
        }
        self.runtime
            .services()
            .lookup(name)
            .ok_or_else(|| undefined_variable(name))
    }

    fn array(&mut self, entries: &[(Option<ExprId>, ExprId)]) -> EvalResult {
        if entries.iter().all(|(key, _)| key.is_none()) {
            let items = entries
                .iter()
                .map(|(_, value)| self.eval(*value))
                .collect::<EvalResult<Vec<_>>>()?;
            return Ok(Value::list(items));
        }

        let mut map = Map::default();
        for (key, value) in entries {
            let value = self.eval(*value)?;
            match key {
                Some(key) => {
                    let key = self.eval(*key)?.to_key()?;
                    map.insert(key, value);
                }
                None => {
                    map.insert(next_index(&map).to_string(), value);
                }
            }
        }
        Ok(Value::map(map))
    }

    fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> EvalResult {
        match op {
            BinaryOp::And => {
                let result = self.eval(left)?.is_truthy() && self.eval(right)?.is_truthy();
                Ok(Value::Bool(result))
            }
            BinaryOp::Or => {
                let result = self.eval(left)?.is_truthy() || self.eval(right)?.is_truthy();
                Ok(Value::Bool(result))
            }
            BinaryOp::Coalesce => match self.eval_lenient(left)? {
                Some(value) if !value.is_null() => Ok(value),
                _ => self.eval(right),
            },
            _ => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                evaluate_binary(&left, &right, op)
            }
        }
    }

    /// Evaluate where a missing variable, key or property is `None` rather
    /// than an error. Backs `isset`, `empty` and `??`.
    fn eval_lenient(&mut self, id: ExprId) -> EvalResult<Option<Value>> {
        let program = self.program;
        match &program.arena.get(id).kind {
            ExprKind::Var(name) => Ok(self
                .env
                .get(name)
                .cloned()
                .or_else(|| self.runtime.services().lookup(name))),
            ExprKind::Index {
                base,
                index: Some(index),
            } => {
                let Some(base) = self.eval_lenient(*base)? else {
                    return Ok(None);
                };
                let key = self.eval(*index)?;
                Ok(index_value(&base, &key).ok().flatten())
            }
            ExprKind::Property { base, name } => {
                let Some(base) = self.eval_lenient(*base)? else {
                    return Ok(None);
                };
                Ok(property_value(&base, name).ok().flatten())
            }
            _ => self.eval(id).map(Some),
        }
    }

    fn call(&mut self, name: &str, args: &[ExprId]) -> EvalResult {
        if name.eq_ignore_ascii_case("isset") {
            if args.is_empty() {
                return Err(arity_mismatch("isset", "at least 1", 0));
            }
            for arg in args {
                if !self.eval_lenient(*arg)?.is_some_and(|v| !v.is_null()) {
                    return Ok(Value::Bool(false));
                }
            }
            return Ok(Value::Bool(true));
        }
        if name.eq_ignore_ascii_case("empty") {
            let [arg] = args else {
                return Err(arity_mismatch("empty", "1", args.len()));
            };
            let empty = !self.eval_lenient(*arg)?.is_some_and(|v| v.is_truthy());
            return Ok(Value::Bool(empty));
        }

        let values = args
            .iter()
            .map(|arg| self.eval(*arg))
            .collect::<EvalResult<Vec<_>>>()?;
        if let Some(result) = call_builtin(name, &values) {
            return result;
        }
        if let Some(result) = self.runtime.services().call(name, &values) {
            return result;
        }
        Err(undefined_function(name))
    }

    fn intrinsic(&mut self, intrinsic: Intrinsic, args: &[ExprId]) -> EvalResult {
        let values = args
            .iter()
            .map(|arg| self.eval(*arg))
            .collect::<EvalResult<Vec<_>>>()?;
        let name = || -> EvalResult<String> {
            let value = values.first().cloned().unwrap_or_default();
            match value {
                Value::Str(s) => Ok(s),
                other => Err(type_mismatch("template or section name", other.type_name())),
            }
        };
        match intrinsic {
            Intrinsic::Include => {
                let data = match values.get(1) {
                    None | Some(Value::Null) => None,
                    Some(Value::Map(map)) => Some(Rc::clone(map)),
                    Some(Value::List(items)) if items.is_empty() => None,
                    Some(other) => {
                        return Err(invalid_argument(
                            intrinsic.name(),
                            format!("include data must be a map, got {}", other.type_name()),
                        ))
                    }
                };
                let name = name()?;
                self.runtime
                    .include(&name, data.as_deref())
                    .map(Value::Str)
            }
            Intrinsic::Yield => {
                let name = name()?;
                Ok(Value::from(self.runtime.yield_section(&name)))
            }
            Intrinsic::SectionStart => {
                let name = name()?;
                self.runtime.section_start(name);
                Ok(Value::Null)
            }
            Intrinsic::SectionEnd => self.runtime.section_end().map(Value::Str),
        }
    }

    // Assignment

    fn assign(&mut self, op: AssignOp, target: ExprId, value: ExprId) -> EvalResult {
        let (root, path) = self.place(target)?;
        let mut value = self.eval(value)?;
        if let Some(binary) = op.binary() {
            let current = self.read_place(&root, &path)?;
            value = evaluate_binary(&current, &value, binary)?;
        }
        *self.slot(&root, &path)? = value.clone();
        Ok(value)
    }

    fn inc_dec(&mut self, target: ExprId, increment: bool, prefix: bool) -> EvalResult {
        let (root, path) = self.place(target)?;
        let old = self.read_place(&root, &path)?;
        let new = match (&old, increment) {
            (Value::Null, true) => Value::Int(1),
            (Value::Null, false) => Value::Null,
            (_, true) => evaluate_binary(&old, &Value::Int(1), BinaryOp::Add)?,
            (_, false) => evaluate_binary(&old, &Value::Int(1), BinaryOp::Sub)?,
        };
        *self.slot(&root, &path)? = new.clone();
        Ok(if prefix { new } else { old })
    }

    /// Resolve an assignable expression to its root variable and the
    /// evaluated path below it, evaluating index expressions left to right.
    fn place(&mut self, id: ExprId) -> EvalResult<(String, Vec<Segment>)> {
        let program = self.program;
        match &program.arena.get(id).kind {
            ExprKind::Var(name) => Ok((name.clone(), Vec::new())),
            ExprKind::Index { base, index } => {
                let (root, mut path) = self.place(*base)?;
                let segment = match index {
                    Some(index) => Segment::Key(self.eval(*index)?.to_key()?),
                    None => Segment::Append,
                };
                path.push(segment);
                Ok((root, path))
            }
            ExprKind::Property { base, name } => {
                let (root, mut path) = self.place(*base)?;
                path.push(Segment::Prop(name.clone()));
                Ok((root, path))
            }
            _ => Err(type_mismatch("assignable place", "expression")),
        }
    }

    /// Current value at a place; missing entries read as null.
    fn read_place(&self, root: &str, path: &[Segment]) -> EvalResult {
        let mut current = match self.env.get(root) {
            Some(value) => value.clone(),
            None => return Ok(Value::Null),
        };
        for segment in path {
            let next = match segment {
                Segment::Append => None,
                Segment::Key(key) => index_value(&current, &Value::Str(key.clone()))?,
                Segment::Prop(name) => property_value(&current, name)?,
            };
            match next {
                Some(value) => current = value,
                None => return Ok(Value::Null),
            }
        }
        Ok(current)
    }

    fn slot(&mut self, root: &str, path: &[Segment]) -> EvalResult<&mut Value> {
        let mut current = self.env.slot(root);
        for segment in path {
            current = child_slot(current, segment)?;
        }
        Ok(current)
    }
}

/// Mutable child of `value`, creating containers and entries as needed.
fn child_slot<'v>(value: &'v mut Value, segment: &Segment) -> EvalResult<&'v mut Value> {
    if value.is_null() {
        *value = match segment {
            Segment::Append => Value::list(Vec::new()),
            Segment::Key(_) | Segment::Prop(_) => Value::empty_map(),
        };
    }

    // A list addressed by a key that is not its next or an existing index
    // becomes a map.
    if let (Value::List(items), Segment::Key(key) | Segment::Prop(key)) = (&*value, segment) {
        let fits = key.parse::<usize>().is_ok_and(|i| i <= items.len() && i.to_string() == *key);
        if !fits {
            let map: Map = items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v.clone()))
                .collect();
            *value = Value::map(map);
        }
    }

    match value {
        Value::List(items) => {
            let items = Rc::make_mut(items);
            let index = match segment {
                Segment::Append => items.len(),
                Segment::Key(key) | Segment::Prop(key) => key.parse::<usize>().unwrap_or(items.len()),
            };
            if index == items.len() {
                items.push(Value::Null);
            }
            Ok(&mut items[index])
        }
        Value::Map(map) => {
            let map = Rc::make_mut(map);
            let key = match segment {
                Segment::Append => next_index(map).to_string(),
                Segment::Key(key) | Segment::Prop(key) => key.clone(),
            };
            Ok(map.entry(key).or_default())
        }
        other => Err(not_indexable(other.type_name())),
    }
}

/// `base[key]`: `Ok(None)` when the entry is missing.
fn index_value(base: &Value, key: &Value) -> EvalResult<Option<Value>> {
    match base {
        Value::List(items) => {
            let index = match key {
                Value::Int(n) => usize::try_from(*n).ok(),
                Value::Str(s) => s.parse::<usize>().ok().filter(|i| i.to_string() == *s),
                other => usize::try_from(other.to_int()).ok(),
            };
            Ok(index.and_then(|i| items.get(i)).cloned())
        }
        Value::Map(map) => Ok(map.get(&key.to_key()?).cloned()),
        Value::Str(s) => {
            let index = key.to_int();
            let count = i64::try_from(s.chars().count()).unwrap_or(i64::MAX);
            let index = if index < 0 { count + index } else { index };
            Ok(usize::try_from(index)
                .ok()
                .and_then(|i| s.chars().nth(i))
                .map(|c| Value::Str(c.to_string())))
        }
        other => Err(not_indexable(other.type_name())),
    }
}

/// `base->name`: `Ok(None)` when the property is missing.
fn property_value(base: &Value, name: &str) -> EvalResult<Option<Value>> {
    match base {
        Value::Map(map) => Ok(map.get(name).cloned()),
        other => Err(not_indexable(other.type_name())),
    }
}

/// Loop key for a map entry: canonical integer keys come back as ints.
fn key_value(key: &str) -> Value {
    match key.parse::<i64>() {
        Ok(n) if n.to_string() == key => Value::Int(n),
        _ => Value::from(key),
    }
}

fn display_key(key: &Value) -> String {
    match key {
        Value::Str(s) => format!("'{s}'"),
        other => other.to_string(),
    }
}
