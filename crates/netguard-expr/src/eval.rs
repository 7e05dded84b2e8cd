use crate::ast::{BinaryOp, Expr, LogicalOp, UnaryOp};
use crate::pattern::compile_regex;
use crate::value::Value;
use crate::{EvalLimits, ExprError};
use netguard_helpers::{HelperArg, HelperRegistry};
use netguard_model::ConfigNode;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::time::Instant;

/// Steps between wall-clock checks.
const CLOCK_INTERVAL: u64 = 64;

/// One evaluation: a fresh scope binding only `node`, with its own step counter and deadline.
pub(crate) struct Interpreter<'a, 'r> {
    node: &'a ConfigNode,
    helpers: &'r HelperRegistry,
    limits: &'r EvalLimits,
    steps: u64,
    started: Instant,
}

impl<'a, 'r> Interpreter<'a, 'r> {
    pub fn new(node: &'a ConfigNode, helpers: &'r HelperRegistry, limits: &'r EvalLimits) -> Self {
        Self {
            node,
            helpers,
            limits,
            steps: 0,
            started: Instant::now(),
        }
    }

    pub fn run(mut self, expr: &Expr) -> Result<bool, ExprError> {
        Ok(self.eval(expr)?.truthy())
    }

    fn charge(&mut self, cost: u64) -> Result<(), ExprError> {
        let before = self.steps;
        self.steps = self.steps.saturating_add(cost.max(1));
        if self.steps > self.limits.step_budget {
            return Err(ExprError::BudgetExhausted(self.limits.step_budget));
        }
        if before / CLOCK_INTERVAL != self.steps / CLOCK_INTERVAL
            && self.started.elapsed() >= self.limits.timeout
        {
            return Err(ExprError::Timeout(self.limits.timeout.as_millis() as u64));
        }
        Ok(())
    }

    fn bounded(&self, s: String) -> Result<Value<'a>, ExprError> {
        if s.chars().count() > self.limits.max_string_len {
            return Err(ExprError::StringTooLong(self.limits.max_string_len));
        }
        Ok(Value::Str(Cow::Owned(s)))
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value<'a>, ExprError> {
        self.charge(1)?;
        match expr {
            Expr::Null => Ok(Value::Null),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Num(n) => Ok(Value::Num(*n)),
            Expr::Str(s) => Ok(Value::Str(Cow::Owned(s.clone()))),
            Expr::Regex(re) => Ok(Value::Regex(re.clone())),
            Expr::List(items) => Ok(Value::List(
                items
                    .iter()
                    .map(|item| self.eval(item))
                    .collect::<Result<_, _>>()?,
            )),
            Expr::Ident(name) if name == "node" => Ok(Value::Node(self.node)),
            Expr::Ident(name) => Err(ExprError::UnknownIdentifier(name.clone())),
            Expr::Member(object, name) => {
                let object = self.eval(object)?;
                self.property(object, name)
            }
            Expr::Index(object, index) => {
                let object = self.eval(object)?;
                let index = self.eval(index)?;
                index_value(object, &index)
            }
            Expr::Call(callee, args) => self.call(callee, args),
            Expr::Unary(op, operand) => {
                let value = self.eval(operand)?;
                match (op, value) {
                    (UnaryOp::Not, value) => Ok(Value::Bool(!value.truthy())),
                    (UnaryOp::Neg, Value::Num(n)) => Ok(Value::Num(-n)),
                    (UnaryOp::Neg, other) => {
                        Err(ExprError::Type(format!("cannot negate {}", other.kind())))
                    }
                }
            }
            Expr::Logical(op, lhs, rhs) => {
                let lhs = self.eval(lhs)?;
                match (op, lhs.truthy()) {
                    (LogicalOp::And, false) | (LogicalOp::Or, true) => Ok(lhs),
                    _ => self.eval(rhs),
                }
            }
            Expr::Ternary(cond, then, otherwise) => {
                if self.eval(cond)?.truthy() {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
            Expr::Binary(op, lhs, rhs) => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                self.binary(*op, lhs, rhs)
            }
        }
    }

    fn property(&mut self, object: Value<'a>, name: &str) -> Result<Value<'a>, ExprError> {
        match object {
            Value::Node(node) => {
                let value = Value::node_property(node, name)
                    .ok_or_else(|| ExprError::UnknownProperty(name.to_string()))?;
                if let Value::List(items) = &value {
                    self.charge(items.len() as u64)?;
                }
                Ok(value)
            }
            Value::Str(s) if name == "length" => Ok(Value::Num(s.chars().count() as f64)),
            Value::List(items) if name == "length" => Ok(Value::Num(items.len() as f64)),
            object => Err(ExprError::Type(format!(
                "cannot read property `{name}` of {}",
                object.kind()
            ))),
        }
    }

    fn call(&mut self, callee: &Expr, args: &[Expr]) -> Result<Value<'a>, ExprError> {
        match callee {
            Expr::Ident(name) => self.call_helper(name, args),
            Expr::Member(object, method) => match object.as_ref() {
                Expr::Ident(namespace) if namespace != "node" => {
                    self.call_helper(&format!("{namespace}.{method}"), args)
                }
                _ => {
                    let receiver = self.eval(object)?;
                    let args = self.eval_args(args)?;
                    self.method(receiver, method, args)
                }
            },
            _ => Err(ExprError::Type("expression is not callable".to_string())),
        }
    }

    fn eval_args(&mut self, args: &[Expr]) -> Result<Vec<Value<'a>>, ExprError> {
        args.iter().map(|arg| self.eval(arg)).collect()
    }

    fn call_helper(&mut self, name: &str, args: &[Expr]) -> Result<Value<'a>, ExprError> {
        let helpers = self.helpers;
        let helper = helpers
            .resolve(name)
            .ok_or_else(|| ExprError::UnknownFunction(name.to_string()))?;
        let args: Vec<HelperArg<'a>> = self.eval_args(args)?.iter().map(Value::to_arg).collect();
        let value = Value::from(helper(&args)?);
        if let Value::List(items) = &value {
            self.charge(items.len() as u64)?;
        }
        Ok(value)
    }

    fn method(
        &mut self,
        receiver: Value<'a>,
        method: &str,
        args: Vec<Value<'a>>,
    ) -> Result<Value<'a>, ExprError> {
        let unknown = |receiver: &'static str| ExprError::UnknownMethod {
            method: method.to_string(),
            receiver,
        };
        match receiver {
            Value::Str(s) => {
                self.charge(s.len() as u64 / 64)?;
                match method {
                    "startsWith" => Ok(Value::Bool(s.starts_with(str_arg(method, &args, 0)?))),
                    "endsWith" => Ok(Value::Bool(s.ends_with(str_arg(method, &args, 0)?))),
                    "includes" => Ok(Value::Bool(s.contains(str_arg(method, &args, 0)?))),
                    "indexOf" => {
                        let needle = str_arg(method, &args, 0)?;
                        Ok(Value::Num(
                            s.find(needle)
                                .map_or(-1.0, |byte| s[..byte].chars().count() as f64),
                        ))
                    }
                    "toLowerCase" => self.bounded(s.to_lowercase()),
                    "toUpperCase" => self.bounded(s.to_uppercase()),
                    "trim" => Ok(Value::Str(Cow::Owned(s.trim().to_string()))),
                    "split" => {
                        let sep = str_arg(method, &args, 0)?;
                        let parts: Vec<Value<'a>> = if sep.is_empty() {
                            s.chars().map(|c| Value::Str(Cow::Owned(c.to_string()))).collect()
                        } else {
                            s.split(sep)
                                .map(|part| Value::Str(Cow::Owned(part.to_string())))
                                .collect()
                        };
                        self.charge(parts.len() as u64)?;
                        Ok(Value::List(parts))
                    }
                    _ => Err(unknown("string")),
                }
            }
            Value::List(items) => {
                self.charge(items.len() as u64)?;
                match method {
                    "includes" => {
                        let needle = any_arg(method, &args, 0)?;
                        Ok(Value::Bool(items.iter().any(|item| item.strict_eq(needle))))
                    }
                    "indexOf" => {
                        let needle = any_arg(method, &args, 0)?;
                        Ok(Value::Num(
                            items
                                .iter()
                                .position(|item| item.strict_eq(needle))
                                .map_or(-1.0, |i| i as f64),
                        ))
                    }
                    "join" => {
                        let sep = match args.first() {
                            None | Some(Value::Null) => ",",
                            Some(_) => str_arg(method, &args, 0)?,
                        };
                        let mut parts = Vec::with_capacity(items.len());
                        for item in &items {
                            parts.push(item.display().ok_or_else(|| {
                                ExprError::Type(format!("cannot join {}", item.kind()))
                            })?);
                        }
                        self.bounded(parts.join(sep))
                    }
                    _ => Err(unknown("list")),
                }
            }
            Value::Regex(re) => match method {
                "test" => Ok(Value::Bool(re.is_match(text_arg(method, &args, 0)?))),
                _ => Err(unknown("regex")),
            },
            Value::Node(_) => Err(unknown("node")),
            Value::Num(_) => Err(unknown("number")),
            Value::Bool(_) => Err(unknown("bool")),
            Value::Null => Err(unknown("null")),
        }
    }

    fn binary(&mut self, op: BinaryOp, lhs: Value<'a>, rhs: Value<'a>) -> Result<Value<'a>, ExprError> {
        match op {
            BinaryOp::Eq => Ok(Value::Bool(lhs.strict_eq(&rhs))),
            BinaryOp::NotEq => Ok(Value::Bool(!lhs.strict_eq(&rhs))),
            BinaryOp::Match | BinaryOp::NotMatch => {
                let matched = self.regex_match(&lhs, &rhs)?;
                Ok(Value::Bool(matched == (op == BinaryOp::Match)))
            }
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                let ordering = compare(&lhs, &rhs)?;
                Ok(Value::Bool(match (op, ordering) {
                    (_, None) => false,
                    (BinaryOp::Lt, Some(o)) => o == Ordering::Less,
                    (BinaryOp::Le, Some(o)) => o != Ordering::Greater,
                    (BinaryOp::Gt, Some(o)) => o == Ordering::Greater,
                    (_, Some(o)) => o != Ordering::Less,
                }))
            }
            BinaryOp::Add => match (&lhs, &rhs) {
                (Value::Num(a), Value::Num(b)) => Ok(Value::Num(a + b)),
                (Value::Str(_), _) | (_, Value::Str(_)) => {
                    let (Some(a), Some(b)) = (lhs.display(), rhs.display()) else {
                        return Err(type_pair("+", &lhs, &rhs));
                    };
                    let joined = format!("{a}{b}");
                    self.bounded(joined)
                }
                _ => Err(type_pair("+", &lhs, &rhs)),
            },
            BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
                let (Value::Num(a), Value::Num(b)) = (&lhs, &rhs) else {
                    return Err(type_pair(arith_symbol(op), &lhs, &rhs));
                };
                Ok(Value::Num(match op {
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => a / b,
                    _ => a % b,
                }))
            }
        }
    }

    /// `text =~ /re/` or `text =~ "re"`; a node on the left matches against its `id`.
    fn regex_match(&mut self, lhs: &Value<'a>, rhs: &Value<'a>) -> Result<bool, ExprError> {
        let text = match lhs {
            Value::Str(s) => s.as_ref(),
            Value::Node(node) => node.id.as_str(),
            other => {
                return Err(ExprError::Type(format!("cannot match {} against a regex", other.kind())));
            }
        };
        match rhs {
            Value::Regex(re) => Ok(re.is_match(text)),
            Value::Str(pattern) => {
                self.charge(pattern.len() as u64)?;
                Ok(compile_regex(pattern, "")?.is_match(text))
            }
            other => Err(ExprError::Type(format!("cannot use {} as a regex", other.kind()))),
        }
    }
}

fn index_value<'a>(object: Value<'a>, index: &Value<'a>) -> Result<Value<'a>, ExprError> {
    let Value::Num(n) = index else {
        return Err(ExprError::Type(format!("cannot index with {}", index.kind())));
    };
    let position = (n.fract() == 0.0 && *n >= 0.0).then_some(*n as usize);
    match object {
        Value::List(mut items) => Ok(match position {
            Some(i) if i < items.len() => items.swap_remove(i),
            _ => Value::Null,
        }),
        Value::Str(s) => Ok(position
            .and_then(|i| s.chars().nth(i))
            .map_or(Value::Null, |c| Value::Str(Cow::Owned(c.to_string())))),
        other => Err(ExprError::Type(format!("cannot index {}", other.kind()))),
    }
}

/// `None` when either side is NaN.
fn compare(lhs: &Value<'_>, rhs: &Value<'_>) -> Result<Option<Ordering>, ExprError> {
    match (lhs, rhs) {
        (Value::Num(a), Value::Num(b)) => Ok(a.partial_cmp(b)),
        (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
        _ => Err(type_pair("comparison", lhs, rhs)),
    }
}

fn type_pair(op: &str, lhs: &Value<'_>, rhs: &Value<'_>) -> ExprError {
    ExprError::Type(format!(
        "unsupported operands for {op}: {} and {}",
        lhs.kind(),
        rhs.kind()
    ))
}

fn arith_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        _ => "%",
    }
}

fn any_arg<'v, 'a>(method: &str, args: &'v [Value<'a>], index: usize) -> Result<&'v Value<'a>, ExprError> {
    args.get(index)
        .ok_or_else(|| ExprError::Type(format!("`{method}` expects an argument")))
}

fn str_arg<'v>(method: &str, args: &'v [Value<'_>], index: usize) -> Result<&'v str, ExprError> {
    match args.get(index) {
        Some(Value::Str(s)) => Ok(s.as_ref()),
        Some(other) => Err(ExprError::Type(format!(
            "`{method}` expects a string, got {}",
            other.kind()
        ))),
        None => Err(ExprError::Type(format!("`{method}` expects a string argument"))),
    }
}

/// A string argument, or a node standing for its `id`.
fn text_arg<'v>(method: &str, args: &'v [Value<'_>], index: usize) -> Result<&'v str, ExprError> {
    match args.get(index) {
        Some(Value::Node(node)) => Ok(node.id.as_str()),
        _ => str_arg(method, args, index),
    }
}
