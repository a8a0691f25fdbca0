//! Constant-expression evaluation over the parsed tree.
//!
//! Reduces a directive's value expression to a [`Value`] without executing
//! any runtime code. Everything that needs runtime context (function
//! calls, variables, bare constants like `__DIR__` or `ABSPATH`, string
//! interpolation, heredocs) comes back as an `Err`, and the caller falls
//! back to the expression's source text instead.

use tree_sitter::Node;

use crate::parse::node_text;
use crate::value::Value;

/// Internal marker that an expression is not a compile-time constant.
/// Never surfaced to library callers; lookup degrades to `Value::Raw`.
#[derive(Debug, thiserror::Error)]
#[error("not a constant expression: {0}")]
pub(crate) struct EvalError(pub(crate) &'static str);

/// Evaluate an expression node to a constant value.
pub(crate) fn evaluate(node: Node<'_>, source: &str) -> Result<Value, EvalError> {
    match node.kind() {
        "string" => Ok(Value::Str(decode_single_quoted(node_text(node, source))?)),
        "encapsed_string" => Ok(Value::Str(decode_double_quoted(node, source)?)),
        "integer" => Ok(Value::Int(parse_int_literal(node_text(node, source))?)),
        "float" => Ok(Value::Float(parse_float_literal(node_text(node, source))?)),
        "boolean" => Ok(Value::Bool(
            node_text(node, source).eq_ignore_ascii_case("true"),
        )),
        "null" => Ok(Value::Null),
        "parenthesized_expression" => {
            let inner = node.named_child(0).ok_or(EvalError("empty parentheses"))?;
            evaluate(inner, source)
        },
        "unary_op_expression" => evaluate_unary(node, source),
        "binary_expression" => evaluate_binary(node, source),
        "conditional_expression" => evaluate_conditional(node, source),
        "array_creation_expression" => evaluate_array(node, source),
        _ => Err(EvalError("runtime-only construct")),
    }
}

/// Decode a string literal node (single- or double-quoted) to its text.
/// Used both for evaluation and for matching `define()` name arguments.
pub(crate) fn decode_string_literal(node: Node<'_>, source: &str) -> Result<String, EvalError> {
    match node.kind() {
        "string" => decode_single_quoted(node_text(node, source)),
        "encapsed_string" => decode_double_quoted(node, source),
        _ => Err(EvalError("not a string literal")),
    }
}

// ── String literals ────────────────────────────────────────────────────

/// Decode a single-quoted literal from its raw source text. Only `\'` and
/// `\\` are escapes; any other backslash stays literal.
fn decode_single_quoted(raw: &str) -> Result<String, EvalError> {
    let body = raw
        .strip_prefix('b')
        .or_else(|| raw.strip_prefix('B'))
        .unwrap_or(raw);
    let body = body
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .ok_or(EvalError("malformed string literal"))?;

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            },
            None => out.push('\\'),
        }
    }
    Ok(out)
}

/// Decode a double-quoted literal from its parse-tree children. Rejects
/// anything interpolated: a `$var` or `{$expr}` part means the string is
/// not a compile-time constant.
fn decode_double_quoted(node: Node<'_>, source: &str) -> Result<String, EvalError> {
    let mut out = String::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "string_content" => out.push_str(node_text(child, source)),
            "escape_sequence" => out.push_str(&decode_escape(node_text(child, source))?),
            _ => return Err(EvalError("interpolated string")),
        }
    }
    Ok(out)
}

/// Decode one double-quote escape sequence. Unknown escapes stay literal,
/// matching PHP (`"\q"` is a backslash followed by `q`).
fn decode_escape(esc: &str) -> Result<String, EvalError> {
    let rest = esc.strip_prefix('\\').ok_or(EvalError("malformed escape"))?;
    let mut chars = rest.chars();
    let Some(first) = chars.next() else {
        return Ok("\\".to_string());
    };

    let decoded = match first {
        'n' => "\n".to_string(),
        't' => "\t".to_string(),
        'r' => "\r".to_string(),
        'v' => "\u{0B}".to_string(),
        'f' => "\u{0C}".to_string(),
        'e' => "\u{1B}".to_string(),
        '\\' => "\\".to_string(),
        '$' => "$".to_string(),
        '"' => "\"".to_string(),
        'x' | 'X' => decode_radix_escape(chars.as_str(), 16)?,
        'u' => decode_unicode_escape(chars.as_str())?,
        '0'..='7' => decode_radix_escape(rest, 8)?,
        other => format!("\\{other}"),
    };
    Ok(decoded)
}

/// Decode `\xHH` (hex) or `\NNN` (octal) byte escapes.
fn decode_radix_escape(digits: &str, radix: u32) -> Result<String, EvalError> {
    let value =
        u32::from_str_radix(digits, radix).map_err(|_| EvalError("malformed escape"))?;
    let byte = u8::try_from(value).map_err(|_| EvalError("escape out of range"))?;
    Ok(char::from(byte).to_string())
}

/// Decode a `\u{...}` codepoint escape.
fn decode_unicode_escape(body: &str) -> Result<String, EvalError> {
    let inner = body
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .ok_or(EvalError("malformed unicode escape"))?;
    let code = u32::from_str_radix(inner, 16).map_err(|_| EvalError("malformed unicode escape"))?;
    let c = char::from_u32(code).ok_or(EvalError("invalid codepoint"))?;
    Ok(c.to_string())
}

// ── Numeric literals ───────────────────────────────────────────────────

/// Parse a PHP integer literal: decimal, `0x` hex, `0b` binary, `0o` or
/// legacy leading-zero octal, with `_` digit separators.
fn parse_int_literal(raw: &str) -> Result<i64, EvalError> {
    let s: String = raw.chars().filter(|c| *c != '_').collect();
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16)
    } else if let Some(bin) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
        i64::from_str_radix(bin, 2)
    } else if let Some(oct) = s.strip_prefix("0o").or_else(|| s.strip_prefix("0O")) {
        i64::from_str_radix(oct, 8)
    } else if s.len() > 1 && s.starts_with('0') && s.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
        i64::from_str_radix(&s[1..], 8)
    } else {
        s.parse::<i64>()
    };
    parsed.map_err(|_| EvalError("integer literal out of range"))
}

/// Parse a PHP float literal, with `_` digit separators.
fn parse_float_literal(raw: &str) -> Result<f64, EvalError> {
    let s: String = raw.chars().filter(|c| *c != '_').collect();
    s.parse::<f64>().map_err(|_| EvalError("malformed float literal"))
}

// ── Operators ──────────────────────────────────────────────────────────

/// Evaluate a unary operator applied to a constant operand.
fn evaluate_unary(node: Node<'_>, source: &str) -> Result<Value, EvalError> {
    let operand = node
        .named_child(node.named_child_count().saturating_sub(1))
        .ok_or(EvalError("missing operand"))?;
    let value = evaluate(operand, source)?;
    let op = operator_token(node, source)?;

    match (op, value) {
        ("-", Value::Int(i)) => i
            .checked_neg()
            .map(Value::Int)
            .ok_or(EvalError("integer overflow")),
        ("-", Value::Float(f)) => Ok(Value::Float(-f)),
        ("+", v @ (Value::Int(_) | Value::Float(_))) => Ok(v),
        ("!", v) => Ok(Value::Bool(!truthy(&v)?)),
        ("~", Value::Int(i)) => Ok(Value::Int(!i)),
        _ => Err(EvalError("unsupported unary operator")),
    }
}

/// Evaluate a binary operator over two constant operands.
fn evaluate_binary(node: Node<'_>, source: &str) -> Result<Value, EvalError> {
    let left_node = node
        .child_by_field_name("left")
        .ok_or(EvalError("missing operand"))?;
    let right_node = node
        .child_by_field_name("right")
        .ok_or(EvalError("missing operand"))?;
    let op = operator_token(node, source)?;

    let left = evaluate(left_node, source)?;
    let right = evaluate(right_node, source)?;

    match op {
        "." => Ok(Value::Str(format!(
            "{}{}",
            stringify(&left)?,
            stringify(&right)?
        ))),
        "+" | "-" | "*" | "/" | "%" | "**" => arithmetic(op, &left, &right),
        "&" | "|" | "^" | "<<" | ">>" => bitwise(op, &left, &right),
        "==" => Ok(Value::Bool(loose_eq(&left, &right)?)),
        "!=" | "<>" => Ok(Value::Bool(!loose_eq(&left, &right)?)),
        "===" => Ok(Value::Bool(left == right)),
        "!==" => Ok(Value::Bool(left != right)),
        "<" | "<=" | ">" | ">=" | "<=>" => comparison(op, &left, &right),
        "&&" | "and" => Ok(Value::Bool(truthy(&left)? && truthy(&right)?)),
        "||" | "or" => Ok(Value::Bool(truthy(&left)? || truthy(&right)?)),
        "xor" => Ok(Value::Bool(truthy(&left)? ^ truthy(&right)?)),
        "??" => Ok(if left == Value::Null { right } else { left }),
        _ => Err(EvalError("unsupported binary operator")),
    }
}

/// Evaluate `cond ? a : b`, including the short `cond ?: b` form.
fn evaluate_conditional(node: Node<'_>, source: &str) -> Result<Value, EvalError> {
    let condition = node
        .child_by_field_name("condition")
        .ok_or(EvalError("missing condition"))?;
    let alternative = node
        .child_by_field_name("alternative")
        .ok_or(EvalError("missing alternative"))?;

    let cond = evaluate(condition, source)?;
    if truthy(&cond)? {
        match node.child_by_field_name("body") {
            Some(body) => evaluate(body, source),
            // Short ternary: the condition's own value.
            None => Ok(cond),
        }
    } else {
        evaluate(alternative, source)
    }
}

/// Evaluate an unkeyed array literal. Keyed entries and spreads are not
/// part of the sequence model and bail out to the text fallback.
fn evaluate_array(node: Node<'_>, source: &str) -> Result<Value, EvalError> {
    let mut items = Vec::new();
    let mut cursor = node.walk();
    for element in node.named_children(&mut cursor) {
        if element.kind() == "comment" {
            continue;
        }
        if element.kind() != "array_element_initializer" {
            return Err(EvalError("unsupported array element"));
        }
        if element.named_child_count() != 1 {
            return Err(EvalError("keyed array"));
        }
        let expr = element.named_child(0).ok_or(EvalError("empty array element"))?;
        items.push(evaluate(expr, source)?);
    }
    Ok(Value::Array(items))
}

/// The operator token of a unary/binary expression node. Prefers the
/// grammar's `operator` field, falling back to the first anonymous child.
fn operator_token<'a>(node: Node<'_>, source: &'a str) -> Result<&'a str, EvalError> {
    if let Some(op) = node.child_by_field_name("operator") {
        return Ok(node_text(op, source));
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if !child.is_named() {
            return Ok(node_text(child, source));
        }
    }
    Err(EvalError("missing operator"))
}

// ── Semantics ──────────────────────────────────────────────────────────

/// PHP truthiness for constant values.
fn truthy(v: &Value) -> Result<bool, EvalError> {
    match v {
        Value::Array(items) => Ok(!items.is_empty()),
        Value::Bool(b) => Ok(*b),
        Value::Float(f) => Ok(*f != 0.0),
        Value::Int(i) => Ok(*i != 0),
        Value::Null => Ok(false),
        Value::Raw(_) => Err(EvalError("raw fragment")),
        Value::Str(s) => Ok(!s.is_empty() && s != "0"),
    }
}

/// PHP string conversion for scalar values, as `.` concatenation applies.
fn stringify(v: &Value) -> Result<String, EvalError> {
    match v {
        Value::Array(_) => Err(EvalError("array to string")),
        Value::Bool(true) => Ok("1".to_string()),
        Value::Bool(false) => Ok(String::new()),
        Value::Float(f) => Ok(float_to_php_string(*f)),
        Value::Int(i) => Ok(i.to_string()),
        Value::Null => Ok(String::new()),
        Value::Raw(_) => Err(EvalError("raw fragment")),
        Value::Str(s) => Ok(s.clone()),
    }
}

/// PHP's string cast drops the fraction of integral floats: `(string)2.0`
/// is `"2"`.
fn float_to_php_string(f: f64) -> String {
    if f.is_finite() && f == f.trunc() && f.abs() < 1e15 {
        return format!("{}", f as i64);
    }
    format!("{f}")
}

/// Numeric view of a value, when it has one.
fn as_float(v: &Value) -> Option<f64> {
    match v {
        Value::Float(f) => Some(*f),
        Value::Int(i) => Some(*i as f64),
        _ => None,
    }
}

/// Arithmetic with PHP's promotion rules: int overflow widens to float,
/// `/` stays int only when it divides evenly.
fn arithmetic(op: &str, left: &Value, right: &Value) -> Result<Value, EvalError> {
    if let (Value::Int(a), Value::Int(b)) = (left, right) {
        return int_arithmetic(op, *a, *b);
    }

    let a = as_float(left).ok_or(EvalError("non-numeric operand"))?;
    let b = as_float(right).ok_or(EvalError("non-numeric operand"))?;
    match op {
        "+" => Ok(Value::Float(a + b)),
        "-" => Ok(Value::Float(a - b)),
        "*" => Ok(Value::Float(a * b)),
        "/" => {
            if b == 0.0 {
                return Err(EvalError("division by zero"));
            }
            Ok(Value::Float(a / b))
        },
        "%" => Err(EvalError("modulo on float")),
        "**" => Ok(Value::Float(a.powf(b))),
        _ => Err(EvalError("unsupported binary operator")),
    }
}

/// Integer arithmetic; any overflow promotes to float like PHP does.
fn int_arithmetic(op: &str, a: i64, b: i64) -> Result<Value, EvalError> {
    let widened = |f: fn(f64, f64) -> f64| Value::Float(f(a as f64, b as f64));

    match op {
        "+" => Ok(a.checked_add(b).map_or_else(|| widened(|x, y| x + y), Value::Int)),
        "-" => Ok(a.checked_sub(b).map_or_else(|| widened(|x, y| x - y), Value::Int)),
        "*" => Ok(a.checked_mul(b).map_or_else(|| widened(|x, y| x * y), Value::Int)),
        "/" => {
            if b == 0 {
                return Err(EvalError("division by zero"));
            }
            if a % b == 0 {
                Ok(Value::Int(a / b))
            } else {
                Ok(Value::Float(a as f64 / b as f64))
            }
        },
        "%" => {
            if b == 0 {
                return Err(EvalError("modulo by zero"));
            }
            Ok(Value::Int(a % b))
        },
        "**" => {
            if b < 0 {
                return Ok(widened(f64::powf));
            }
            let exp = u32::try_from(b).map_err(|_| EvalError("exponent too large"))?;
            Ok(a.checked_pow(exp).map_or_else(|| widened(f64::powf), Value::Int))
        },
        _ => Err(EvalError("unsupported binary operator")),
    }
}

/// Bitwise and shift operators, integers only.
fn bitwise(op: &str, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let (Value::Int(a), Value::Int(b)) = (left, right) else {
        return Err(EvalError("bitwise on non-integer"));
    };
    match op {
        "&" => Ok(Value::Int(a & b)),
        "|" => Ok(Value::Int(a | b)),
        "^" => Ok(Value::Int(a ^ b)),
        "<<" => shift(*a, *b, true),
        ">>" => shift(*a, *b, false),
        _ => Err(EvalError("unsupported binary operator")),
    }
}

/// Checked shift; PHP errors on negative or oversized shift counts.
fn shift(a: i64, b: i64, left: bool) -> Result<Value, EvalError> {
    let count = u32::try_from(b).map_err(|_| EvalError("negative shift"))?;
    if count >= 64 {
        return Err(EvalError("shift out of range"));
    }
    Ok(Value::Int(if left { a << count } else { a >> count }))
}

/// Loose equality for the type pairs with unambiguous semantics. Pairs
/// whose PHP juggling is context-dependent degrade to the text fallback
/// rather than risk a wrong answer.
fn loose_eq(left: &Value, right: &Value) -> Result<bool, EvalError> {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Ok(a == b),
        (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
        (Value::Null, Value::Null) => Ok(true),
        (Value::Array(a), Value::Array(b)) => Ok(a == b),
        _ => {
            let (Some(a), Some(b)) = (as_float(left), as_float(right)) else {
                return Err(EvalError("ambiguous loose comparison"));
            };
            Ok(a == b)
        },
    }
}

/// Ordering comparisons over numbers or two strings.
fn comparison(op: &str, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let ordering = if let (Some(a), Some(b)) = (as_float(left), as_float(right)) {
        a.partial_cmp(&b).ok_or(EvalError("unordered floats"))?
    } else if let (Value::Str(a), Value::Str(b)) = (left, right) {
        a.cmp(b)
    } else {
        return Err(EvalError("incomparable operands"));
    };

    match op {
        "<" => Ok(Value::Bool(ordering.is_lt())),
        "<=" => Ok(Value::Bool(ordering.is_le())),
        ">" => Ok(Value::Bool(ordering.is_gt())),
        ">=" => Ok(Value::Bool(ordering.is_ge())),
        "<=>" => Ok(Value::Int(match ordering {
            std::cmp::Ordering::Less => -1,
            std::cmp::Ordering::Equal => 0,
            std::cmp::Ordering::Greater => 1,
        })),
        _ => Err(EvalError("unsupported binary operator")),
    }
}
