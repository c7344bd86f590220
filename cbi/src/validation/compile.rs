//! Compiler for validator expressions such as `or(port, "auto")` or
//! `list(neg(ipaddr))`.
//!
//! ```text
//! expr    := call
//! call    := IDENT [ '(' arglist ')' ]
//! arglist := arg (',' arg)*
//! arg     := call | NUMBER | STRING
//! ```

use log::debug;

use super::types::{Arg, TypeTable, ValidatorSpec};
use crate::coerce::{parse_float_prefix, to_number};
use crate::error::CompileError;

/// Compile an expression into its top-level argument list.
///
/// Name lookups go through `types`; an unknown name is an error before
/// anything runs.
pub fn compile(code: &str, types: &TypeTable) -> Result<Vec<Arg>, CompileError> {
    let code: Vec<char> = code.chars().chain(std::iter::once(',')).collect();
    let mut stack: Vec<Arg> = Vec::new();
    // Index of the call that an upcoming argument list belongs to.
    let mut open_call: Option<usize> = None;
    let mut pos = 0;
    let mut depth = 0i32;
    let mut escaped = false;
    let mut i = 0;

    while i < code.len() {
        if escaped {
            escaped = false;
            i += 1;
            continue;
        }

        match code[i] {
            '\\' => escaped = true,
            quote @ ('"' | '\'') => {
                let mut j = i + 1;
                while j < code.len() {
                    if code[j] == '\\' {
                        j += 2;
                        continue;
                    }
                    if code[j] == quote {
                        i = j;
                        break;
                    }
                    j += 1;
                }
            }
            c @ ('(' | ',') => {
                if depth <= 0 {
                    if pos < i {
                        let token: String = code[pos..i].iter().collect();
                        if let Some(arg) = classify(&token, types)? {
                            open_call = matches!(arg, Arg::Call(_)).then_some(stack.len());
                            stack.push(arg);
                        }
                    }
                    pos = i + 1;
                }
                if c == '(' {
                    depth += 1;
                }
            }
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(CompileError::UnbalancedParenthesis);
                }
                if depth == 0 {
                    let target = match open_call.take() {
                        Some(idx) if idx + 1 == stack.len() => idx,
                        _ => return Err(CompileError::ArgumentListFollowsNonFunction),
                    };
                    let inner: String = code[pos..i].iter().collect();
                    let args = compile(&inner, types)?;
                    if let Arg::Call(spec) = &mut stack[target] {
                        spec.args = args;
                    }
                    pos = i + 1;
                }
            }
            _ => {}
        }

        i += 1;
    }

    if depth > 0 {
        return Err(CompileError::UnbalancedParenthesis);
    }

    Ok(stack)
}

/// Compile an expression that must start with a validator call.
pub fn compile_spec(code: &str, types: &TypeTable) -> Result<ValidatorSpec, CompileError> {
    let mut stack = compile(code, types)?.into_iter();
    let spec = match stack.next() {
        Some(Arg::Call(spec)) => spec,
        _ => return Err(CompileError::ExpectedCall),
    };
    let trailing = stack.count();
    if trailing > 0 {
        debug!("ignoring {trailing} trailing token(s) in '{code}'");
    }
    Ok(spec)
}

fn classify(raw: &str, types: &TypeTable) -> Result<Option<Arg>, CompileError> {
    let label = unescape(raw);
    let label = label.trim_matches([' ', '\t']);

    if label.is_empty() {
        return Ok(None);
    }

    // Anything that converts to a number is one, valued by its leading
    // decimal part: `0x10` compiles to 0.
    if !to_number(label).is_nan() {
        return Ok(Some(Arg::Number(parse_float_prefix(label))));
    }

    if let Some(inner) = strip_quotes(label) {
        return Ok(Some(Arg::Str(inner.to_string())));
    }

    match types.get(label) {
        Some(callee) => Ok(Some(Arg::Call(ValidatorSpec::new(callee)))),
        None => Err(CompileError::UnhandledToken {
            token: label.to_string(),
        }),
    }
}

/// Drop each escaping backslash, keeping the character it escapes.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(next) => out.push(next),
                None => out.push('\\'),
            },
            c => out.push(c),
        }
    }
    out
}

fn strip_quotes(label: &str) -> Option<&str> {
    let first = label.chars().next()?;
    if !matches!(first, '"' | '\'') || label.len() < 2 || !label.ends_with(first) {
        return None;
    }
    Some(&label[1..label.len() - 1])
}
