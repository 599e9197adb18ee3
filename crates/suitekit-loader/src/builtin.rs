//! Built-in functions available to every project

use crate::functions::{function, ExtensionModule, FunctionError, ModuleItem};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde_json::{json, Value};
use std::fmt::Write;

/// Module with the functions shipped with the loader
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinModule;

impl ExtensionModule for BuiltinModule {
    fn name(&self) -> &str {
        "built_in"
    }

    fn items(&self) -> Vec<(String, ModuleItem)> {
        vec![
            (
                "get_timestamp".to_string(),
                ModuleItem::Function(function(get_timestamp)),
            ),
            (
                "get_current_date".to_string(),
                ModuleItem::Function(function(get_current_date)),
            ),
            (
                "gen_random_string".to_string(),
                ModuleItem::Function(function(gen_random_string)),
            ),
            (
                "multiply".to_string(),
                ModuleItem::Function(function(multiply)),
            ),
            (
                "VERSION".to_string(),
                ModuleItem::Constant(json!(env!("CARGO_PKG_VERSION"))),
            ),
        ]
    }
}

fn usize_arg(name: &str, args: &[Value], index: usize, default: usize) -> Result<usize, FunctionError> {
    match args.get(index) {
        None => Ok(default),
        Some(value) => value
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| FunctionError::new(name, format!("argument {index} must be a non-negative integer"))),
    }
}

/// Millisecond timestamp truncated to `len` digits (default 13)
fn get_timestamp(args: &[Value]) -> Result<Value, FunctionError> {
    let len = usize_arg("get_timestamp", args, 0, 13)?;
    if len == 0 || len > 16 {
        return Err(FunctionError::new("get_timestamp", "length must be within 1..=16"));
    }

    let micros = chrono::Utc::now().timestamp_micros().to_string();
    let digits: String = micros.chars().take(len).collect();
    Ok(Value::String(digits))
}

/// Current local date formatted with `fmt` (default `%Y-%m-%d`)
fn get_current_date(args: &[Value]) -> Result<Value, FunctionError> {
    let fmt = match args.first() {
        None => "%Y-%m-%d",
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return Err(FunctionError::new("get_current_date", "format must be a string")),
    };

    let mut date = String::new();
    write!(date, "{}", chrono::Local::now().format(fmt)).map_err(|_| {
        FunctionError::new("get_current_date", format!("invalid date format: {fmt}"))
    })?;
    Ok(Value::String(date))
}

/// Random alphanumeric string of `len` characters
fn gen_random_string(args: &[Value]) -> Result<Value, FunctionError> {
    let len = usize_arg("gen_random_string", args, 0, 8)?;
    let s: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(len)
        .map(char::from)
        .collect();
    Ok(Value::String(s))
}

/// Product of two numbers
fn multiply(args: &[Value]) -> Result<Value, FunctionError> {
    match args {
        [a, b] => match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => x
                .checked_mul(y)
                .map(|p| json!(p))
                .ok_or_else(|| FunctionError::new("multiply", "integer overflow")),
            _ => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => Ok(json!(x * y)),
                _ => Err(FunctionError::new("multiply", "arguments must be numbers")),
            },
        },
        _ => Err(FunctionError::new("multiply", "expects exactly two arguments")),
    }
}
