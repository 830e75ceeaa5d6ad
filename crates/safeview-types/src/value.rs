//! The dynamic-value tagged union (`$3 Data Model`): a field in a card is
//! either a literal, a `{$ref: "..."}`, or a `{$expr: "..."}`.

use serde::{Serialize, Serializer};
use serde_json::Value as Json;

/// A card field value: a literal, a reference into state/locals, or an
/// unevaluated expression string.
///
/// Parsing a [`Json`] into a `Value` never fails — any JSON shape becomes
/// a literal unless it is recognizably a `$ref` or `$expr` object. Whether
/// a *particular field* is allowed to hold a `Ref` or `Expr` is a
/// value-type-pass concern (`safeview-validator`), not something this type
/// enforces.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A plain literal: string, number, boolean, or (rarely) a nested
    /// object/array passed through as-is.
    Literal(Json),
    /// `{"$ref": "$dotted.path"}`.
    Ref(RefPath),
    /// `{"$expr": "expression text"}`.
    Expr(ExprString),
}

impl Value {
    /// Renders this value back to the JSON shape it would have been
    /// parsed from — used by [`Serialize`] and by the round-trip tests
    /// that re-validate a normalized style.
    #[must_use]
    pub fn to_json(&self) -> Json {
        match self {
            Value::Literal(json) => json.clone(),
            Value::Ref(r) => serde_json::json!({"$ref": r.raw()}),
            Value::Expr(e) => serde_json::json!({"$expr": e.text()}),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

impl Value {
    /// Classifies a raw JSON value as a literal, ref, or expr.
    ///
    /// An object is recognized as a `Ref`/`Expr` only when it has exactly
    /// one key, `$ref` or `$expr`, with a string value; any other object
    /// shape (including `{"$ref": 1}` or `{"$ref": "...", "extra": 1}`) is
    /// treated as an opaque literal — it is not a well-formed dynamic
    /// value, but that is a shape question for the passes that inspect
    /// literals, not a parse failure.
    #[must_use]
    pub fn from_json(json: &Json) -> Self {
        if let Json::Object(map) = json {
            if map.len() == 1 {
                if let Some(Json::String(s)) = map.get("$ref") {
                    return Value::Ref(RefPath::new(s.clone()));
                }
                if let Some(Json::String(s)) = map.get("$expr") {
                    return Value::Expr(ExprString::new(s.clone()));
                }
            }
        }
        Value::Literal(json.clone())
    }

    /// The literal JSON value, if this is a literal.
    #[must_use]
    pub fn as_literal(&self) -> Option<&Json> {
        match self {
            Value::Literal(json) => Some(json),
            _ => None,
        }
    }

    /// The literal as a string, if this is a string literal.
    #[must_use]
    pub fn as_literal_str(&self) -> Option<&str> {
        self.as_literal().and_then(Json::as_str)
    }

    /// The literal as an f64, if this is a numeric literal (including
    /// numeric strings are *not* coerced here — callers that accept
    /// `"16px"`-style strings parse those themselves).
    #[must_use]
    pub fn as_literal_f64(&self) -> Option<f64> {
        self.as_literal().and_then(Json::as_f64)
    }

    #[must_use]
    pub fn as_ref_path(&self) -> Option<&RefPath> {
        match self {
            Value::Ref(r) => Some(r),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_expr(&self) -> Option<&ExprString> {
        match self {
            Value::Expr(e) => Some(e),
            _ => None,
        }
    }
}

/// A `{"$ref": "$a.b[0]"}` value, carrying the raw path text.
///
/// Segment parsing (splitting on `.`, flattening `[N]` brackets, detecting
/// pollution segments) is shared by the expression-constraints pass and
/// the renderer's value resolver, so it lives here as a pure function over
/// the raw string rather than being duplicated in both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefPath(String);

/// A pollution segment: any ref-path component that could be used to climb
/// onto `Object.prototype` if the resolver ever indexed into it with a raw
/// string key.
pub const POLLUTION_SEGMENTS: [&str; 3] = ["__proto__", "constructor", "prototype"];

impl RefPath {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw `$`-prefixed path text exactly as authored.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.0
    }

    /// Splits the path into segments: the leading `$` is stripped, `.`
    /// separates named segments, and `[N]` bracket indices are flattened
    /// into their own [`Segment::Index`] entries.
    ///
    /// Returns `None` if a bracket index is not a valid non-negative
    /// integer — the spec treats this the same as a resolution failure,
    /// not a distinct error code, so it's surfaced as `None` rather than
    /// a `Result`.
    #[must_use]
    pub fn segments(&self) -> Option<Vec<Segment>> {
        let stripped = self.0.strip_prefix('$').unwrap_or(&self.0);
        let mut out = Vec::new();
        for dotted in stripped.split('.') {
            let mut rest = dotted;
            loop {
                if let Some(bracket_start) = rest.find('[') {
                    let (name, tail) = rest.split_at(bracket_start);
                    if !name.is_empty() {
                        out.push(Segment::Name(name.to_string()));
                    }
                    let close = tail.find(']')?;
                    let idx_str = &tail[1..close];
                    let idx: usize = idx_str.parse().ok()?;
                    out.push(Segment::Index(idx));
                    rest = &tail[close + 1..];
                } else {
                    if !rest.is_empty() {
                        out.push(Segment::Name(rest.to_string()));
                    }
                    break;
                }
            }
        }
        Some(out)
    }

    /// True if any segment is a pollution segment (`__proto__`,
    /// `constructor`, `prototype`).
    #[must_use]
    pub fn contains_pollution_segment(&self) -> bool {
        match self.segments() {
            Some(segments) => segments.iter().any(|s| match s {
                Segment::Name(name) => POLLUTION_SEGMENTS.contains(&name.as_str()),
                Segment::Index(_) => false,
            }),
            None => false,
        }
    }
}

/// One segment of a parsed ref path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A named field, e.g. `items` in `$items.length`.
    Name(String),
    /// A flattened bracket index, e.g. `0` in `$items[0]`.
    Index(usize),
}

/// A `{"$expr": "..."}` value, carrying the raw expression text.
///
/// Tokenizing and structurally validating the text is the
/// expression-constraints pass's job; this type is just a marked string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprString(String);

impl ExprString {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.0
    }
}

/// A permission-narrowed view of a [`Value`] for *RefOnly* fields
/// (`Image.src`, `Avatar.src`): literal or `$ref`, never `$expr`.
///
/// This is the "phantom permission encoded at construction" the design
/// notes describe: rather than rejecting a disallowed arm while parsing
/// the document (which would lose the precise per-field error the
/// value-type pass needs to report), the narrowing happens when a pass
/// or the renderer asks a field for its `RefOnly` view. An `Expr` value in
/// a `RefOnly` field fails the narrowing — the caller is expected to have
/// already reported `EXPR_NOT_ALLOWED` via the value-type pass.
#[derive(Debug, Clone, PartialEq)]
pub enum RefOnlyValue<'a> {
    Literal(&'a Json),
    Ref(&'a RefPath),
}

impl<'a> TryFrom<&'a Value> for RefOnlyValue<'a> {
    type Error = ();

    fn try_from(value: &'a Value) -> Result<Self, Self::Error> {
        match value {
            Value::Literal(json) => Ok(RefOnlyValue::Literal(json)),
            Value::Ref(r) => Ok(RefOnlyValue::Ref(r)),
            Value::Expr(_) => Err(()),
        }
    }
}

/// A permission-narrowed view of a [`Value`] for *Static* fields
/// (`Icon.name`, `Button.action`, `Toggle.onToggle`, and several style
/// properties): literal only.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticValue<'a>(pub &'a Json);

impl<'a> TryFrom<&'a Value> for StaticValue<'a> {
    type Error = ();

    fn try_from(value: &'a Value) -> Result<Self, Self::Error> {
        match value {
            Value::Literal(json) => Ok(StaticValue(json)),
            Value::Ref(_) | Value::Expr(_) => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn literal_json_stays_literal() {
        let v = Value::from_json(&json!("hello"));
        assert_eq!(v.as_literal_str(), Some("hello"));
    }

    #[test]
    fn ref_object_becomes_ref() {
        let v = Value::from_json(&json!({"$ref": "$a.b"}));
        assert_eq!(v.as_ref_path().unwrap().raw(), "$a.b");
    }

    #[test]
    fn expr_object_becomes_expr() {
        let v = Value::from_json(&json!({"$expr": "$a + 1"}));
        assert_eq!(v.as_expr().unwrap().text(), "$a + 1");
    }

    #[test]
    fn malformed_ref_shape_is_literal() {
        let v = Value::from_json(&json!({"$ref": 1}));
        assert!(v.as_literal().is_some());
        let v2 = Value::from_json(&json!({"$ref": "$a", "extra": true}));
        assert!(v2.as_literal().is_some());
    }

    #[test]
    fn segments_flatten_bracket_indices() {
        let path = RefPath::new("$items[0].name");
        let segments = path.segments().unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::Name("items".to_string()),
                Segment::Index(0),
                Segment::Name("name".to_string()),
            ]
        );
    }

    #[test]
    fn detects_pollution_segment() {
        assert!(RefPath::new("$__proto__.polluted").contains_pollution_segment());
        assert!(RefPath::new("$a.constructor.b").contains_pollution_segment());
        assert!(!RefPath::new("$a.b.c").contains_pollution_segment());
    }

    #[test]
    fn ref_only_view_rejects_expr() {
        let v = Value::Expr(ExprString::new("$a"));
        assert!(RefOnlyValue::try_from(&v).is_err());
    }

    #[test]
    fn static_view_rejects_ref_and_expr() {
        let r = Value::Ref(RefPath::new("$a"));
        let e = Value::Expr(ExprString::new("$a"));
        assert!(StaticValue::try_from(&r).is_err());
        assert!(StaticValue::try_from(&e).is_err());
    }
}
