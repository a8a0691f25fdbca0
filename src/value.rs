/// The native value model for directive arguments and lookup results.
///
/// `Value` covers everything a `define()` second argument can carry once
/// reduced to a compile-time constant: PHP's scalar types, `null`, and plain
/// (unkeyed) arrays. `Raw` holds a verbatim source fragment: either the
/// degraded form of an expression the evaluator cannot reduce, or a
/// caller-supplied snippet injected into the document as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Unkeyed array of constant values.
    Array(Vec<Value>),
    /// PHP boolean.
    Bool(bool),
    /// PHP float.
    Float(f64),
    /// PHP integer.
    Int(i64),
    /// PHP null.
    Null,
    /// A verbatim PHP source fragment, injected or returned without quoting.
    Raw(String),
    /// PHP string, decoded: no surrounding quotes, escapes resolved.
    Str(String),
}

impl Value {
    /// Render this value as PHP literal source, suitable for injection as a
    /// `define()` argument. Strings come out single-quoted, booleans as bare
    /// keywords, arrays in short syntax, `Raw` fragments verbatim.
    pub fn php_literal(&self) -> String {
        match self {
            Value::Array(items) => {
                let rendered: Vec<String> = items.iter().map(Value::php_literal).collect();
                format!("[{}]", rendered.join(", "))
            },
            Value::Bool(true) => "true".to_string(),
            Value::Bool(false) => "false".to_string(),
            Value::Float(f) => float_literal(*f),
            Value::Int(i) => i.to_string(),
            Value::Null => "null".to_string(),
            Value::Raw(fragment) => fragment.clone(),
            Value::Str(s) => quote_single(s),
        }
    }
}

/// Render a float so it reads back as a float: integral values keep a
/// trailing `.0`, non-finite values use PHP's constant spellings.
fn float_literal(f: f64) -> String {
    if f.is_nan() {
        return "NAN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "INF".to_string() } else { "-INF".to_string() };
    }
    let s = format!("{f}");
    if s.contains('.') || s.contains('e') || s.contains('E') {
        s
    } else {
        format!("{s}.0")
    }
}

/// Single-quote a string, escaping only what PHP single quotes require.
pub(crate) fn quote_single(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if c == '\\' || c == '\'' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booleans_render_as_keywords() {
        assert_eq!(Value::Bool(true).php_literal(), "true");
        assert_eq!(Value::Bool(false).php_literal(), "false");
    }

    #[test]
    fn strings_are_single_quoted_and_escaped() {
        assert_eq!(Value::from("wp_main").php_literal(), "'wp_main'");
        assert_eq!(Value::from("it's").php_literal(), r"'it\'s'");
        assert_eq!(Value::from(r"C:\www").php_literal(), r"'C:\\www'");
    }

    #[test]
    fn integral_floats_keep_a_fraction() {
        assert_eq!(Value::Float(2.0).php_literal(), "2.0");
        assert_eq!(Value::Float(2.5).php_literal(), "2.5");
    }

    #[test]
    fn arrays_use_short_syntax() {
        let v = Value::Array(vec![Value::Int(1), Value::from("a"), Value::Null]);
        assert_eq!(v.php_literal(), "[1, 'a', null]");
    }

    #[test]
    fn raw_fragments_pass_through() {
        let v = Value::Raw("__DIR__ . '/'".to_string());
        assert_eq!(v.php_literal(), "__DIR__ . '/'");
    }
}
