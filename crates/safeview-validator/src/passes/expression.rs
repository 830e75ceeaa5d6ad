//! Expression-Constraints Pass (§4.8): every `$ref` and `$expr` value
//! anywhere in the tree is checked against the fixed grammar limits in
//! [`crate::limits::expr`], and every `$expr` body is tokenized (never
//! evaluated) to enforce the allowed-operator whitelist.

use safeview_types::{Card, Node, PointerPath, RefPath, Segment, Value};

use crate::context::Context;
use crate::error::{ErrorCode, ValidationError, ValidationResult};
use crate::limits::expr::{
    MAX_BRACKET_INDEX, MAX_EXPR_LEN, MAX_EXPR_TOKENS, MAX_FRACTIONAL_DIGITS, MAX_IF_COUNT,
    MAX_PAREN_DEPTH, MAX_REF_PATH_LEN, MAX_REF_SEGMENT_DEPTH, MAX_STRING_LITERAL_LEN,
    MAX_VAR_CHAIN_DEPTH,
};
use crate::walk::{walk_card, VisitResult, Visitor};

#[must_use]
pub fn run(card: &Card) -> ValidationResult {
    let mut pass = ExpressionPass {
        result: ValidationResult::default(),
    };
    for (name, style) in &card.styles {
        pass.check_style(style, &PointerPath::root().field("styles").field(name));
    }
    walk_card(card, &mut pass);
    pass.result
}

struct ExpressionPass {
    result: ValidationResult,
}

impl ExpressionPass {
    fn check_style(&mut self, style: &safeview_types::StyleObject, path: &PointerPath) {
        for (property, value) in &style.props {
            self.check_value(value, &path.field(property));
        }
    }

    fn check_value(&mut self, value: &Value, path: &PointerPath) {
        match value {
            Value::Ref(r) => self.check_ref(r, path),
            Value::Expr(e) => self.check_expr(e.text(), path),
            Value::Literal(_) => {}
        }
    }

    fn check_ref(&mut self, r: &RefPath, path: &PointerPath) {
        if r.raw().len() > MAX_REF_PATH_LEN {
            self.result.push(ValidationError::new(
                ErrorCode::RefTooLong,
                format!("ref path of {} chars exceeds the {MAX_REF_PATH_LEN} char limit", r.raw().len()),
                path,
            ));
        }
        let Some(segments) = r.segments() else {
            self.result.push(ValidationError::new(
                ErrorCode::ExprInvalidToken,
                format!("{:?} is not a well-formed ref path", r.raw()),
                path,
            ));
            return;
        };
        self.check_segments(&segments, path);
    }

    fn check_segments(&mut self, segments: &[Segment], path: &PointerPath) {
        let depth = segments.iter().filter(|s| matches!(s, Segment::Name(_))).count();
        if depth > MAX_REF_SEGMENT_DEPTH {
            self.result.push(ValidationError::new(
                ErrorCode::ExprRefDepthExceeded,
                format!("ref path depth {depth} exceeds the {MAX_REF_SEGMENT_DEPTH} segment limit"),
                path,
            ));
        }
        for segment in segments {
            if let Segment::Index(idx) = segment {
                if *idx > MAX_BRACKET_INDEX {
                    self.result.push(ValidationError::new(
                        ErrorCode::ExprArrayIndexExceeded,
                        format!("bracket index {idx} exceeds the {MAX_BRACKET_INDEX} limit"),
                        path,
                    ));
                }
            }
        }
    }

    fn check_expr(&mut self, text: &str, path: &PointerPath) {
        if text.len() > MAX_EXPR_LEN {
            self.result.push(ValidationError::new(
                ErrorCode::ExprTooLong,
                format!("expression of {} chars exceeds the {MAX_EXPR_LEN} char limit", text.len()),
                path,
            ));
        }

        let tokens = tokenize(text);

        if tokens.len() > MAX_EXPR_TOKENS {
            self.result.push(ValidationError::new(
                ErrorCode::ExprTooManyTokens,
                format!("{} tokens exceeds the {MAX_EXPR_TOKENS} token limit", tokens.len()),
                path,
            ));
        }

        let if_count = tokens.iter().filter(|t| matches!(t, Token::Keyword("if"))).count();
        if if_count > MAX_IF_COUNT {
            self.result.push(ValidationError::new(
                ErrorCode::ExprConditionNestingTooDeep,
                format!("{if_count} \"if\" keywords exceeds the {MAX_IF_COUNT} limit"),
                path,
            ));
        }

        let mut depth = 0i32;
        let mut max_depth = 0i32;
        for token in &tokens {
            match token {
                Token::LParen => {
                    depth += 1;
                    max_depth = max_depth.max(depth);
                }
                Token::RParen => depth -= 1,
                _ => {}
            }
        }
        if max_depth as usize > MAX_PAREN_DEPTH {
            self.result.push(ValidationError::new(
                ErrorCode::ExprNestingTooDeep,
                format!("paren nesting depth {max_depth} exceeds the {MAX_PAREN_DEPTH} limit"),
                path,
            ));
        }

        for token in &tokens {
            match token {
                Token::String(s) => {
                    if s.len() > MAX_STRING_LITERAL_LEN {
                        self.result.push(ValidationError::new(
                            ErrorCode::ExprStringLiteralTooLong,
                            format!(
                                "string literal of {} chars exceeds the {MAX_STRING_LITERAL_LEN} char limit",
                                s.len()
                            ),
                            path,
                        ));
                    }
                }
                Token::Number(raw) => {
                    let fractional = raw.split_once('.').map_or(0, |(_, frac)| frac.len());
                    if fractional > MAX_FRACTIONAL_DIGITS {
                        self.result.push(ValidationError::new(
                            ErrorCode::ExprInvalidToken,
                            format!(
                                "{raw} has {fractional} fractional digits, exceeding the {MAX_FRACTIONAL_DIGITS} limit"
                            ),
                            path,
                        ));
                    }
                }
                Token::Ident(raw) => {
                    let chain = RefPath::new(raw.clone());
                    if let Some(segments) = chain.segments() {
                        let depth =
                            segments.iter().filter(|s| matches!(s, Segment::Name(_))).count();
                        if depth > MAX_VAR_CHAIN_DEPTH {
                            self.result.push(ValidationError::new(
                                ErrorCode::ExprRefDepthExceeded,
                                format!(
                                    "variable chain depth {depth} exceeds the {MAX_VAR_CHAIN_DEPTH} limit"
                                ),
                                path,
                            ));
                        }
                        for segment in &segments {
                            if let Segment::Index(idx) = segment {
                                if *idx > MAX_BRACKET_INDEX {
                                    self.result.push(ValidationError::new(
                                        ErrorCode::ExprArrayIndexExceeded,
                                        format!("bracket index {idx} exceeds the {MAX_BRACKET_INDEX} limit"),
                                        path,
                                    ));
                                }
                            }
                        }
                    }
                }
                Token::Forbidden(reason) => match reason {
                    ForbiddenReason::FunctionCall => self.result.push(ValidationError::new(
                        ErrorCode::ExprFunctionCall,
                        "function calls are not permitted in an expression",
                        path,
                    )),
                    ForbiddenReason::Operator(text) | ForbiddenReason::Keyword(text) | ForbiddenReason::BareIdentifier(text) => {
                        self.result.push(ValidationError::new(
                            ErrorCode::ExprForbiddenToken,
                            format!("{text:?} is not permitted in an expression"),
                            path,
                        ));
                    }
                },
                Token::Invalid(text) => self.result.push(ValidationError::new(
                    ErrorCode::ExprInvalidToken,
                    format!("{text:?} is not a recognized token"),
                    path,
                )),
                Token::Bool(_) | Token::Op(_) | Token::Keyword(_) | Token::LParen | Token::RParen => {}
            }
        }
    }
}

impl Visitor for ExpressionPass {
    fn visit(&mut self, node: &Node, ctx: &Context) -> VisitResult {
        if let Some(style) = &node.common().style {
            self.check_style(style, &ctx.path.field("style"));
        }
        if let Some(condition) = &node.common().condition {
            self.check_value(condition, &ctx.path.field("condition"));
        }

        for (value, field) in node_scalar_values(node) {
            self.check_value(value, &ctx.path.field(field));
        }

        VisitResult::Continue
    }
}

/// All of a node's kind-specific scalar field values paired with their
/// field name — shared with the security pass, which needs the same
/// enumeration to scan every field for pollution segments, not just the
/// handful picked out by name.
pub(crate) fn node_scalar_values(node: &Node) -> Vec<(&Value, &'static str)> {
    match node {
        Node::Text(f) => f.content.as_ref().map(|v| (v, "content")).into_iter().collect(),
        Node::Image(f) => [f.src.as_ref().map(|v| (v, "src")), f.alt.as_ref().map(|v| (v, "alt"))]
            .into_iter()
            .flatten()
            .collect(),
        Node::ProgressBar(f) => [
            f.value.as_ref().map(|v| (v, "value")),
            f.max.as_ref().map(|v| (v, "max")),
        ]
        .into_iter()
        .flatten()
        .collect(),
        Node::Avatar(f) => [
            f.src.as_ref().map(|v| (v, "src")),
            f.size.as_ref().map(|v| (v, "size")),
        ]
        .into_iter()
        .flatten()
        .collect(),
        Node::Icon(f) => [
            f.name.as_ref().map(|v| (v, "name")),
            f.size.as_ref().map(|v| (v, "size")),
            f.color.as_ref().map(|v| (v, "color")),
        ]
        .into_iter()
        .flatten()
        .collect(),
        Node::Badge(f) | Node::Chip(f) => f.label.as_ref().map(|v| (v, "label")).into_iter().collect(),
        Node::Divider(f) => f.thickness.as_ref().map(|v| (v, "thickness")).into_iter().collect(),
        Node::Button(f) => [
            f.label.as_ref().map(|v| (v, "label")),
            f.action.as_ref().map(|v| (v, "action")),
        ]
        .into_iter()
        .flatten()
        .collect(),
        Node::Toggle(f) => [
            f.value.as_ref().map(|v| (v, "value")),
            f.on_toggle.as_ref().map(|v| (v, "onToggle")),
        ]
        .into_iter()
        .flatten()
        .collect(),
        Node::Box(_) | Node::Row(_) | Node::Column(_) | Node::Stack(_) | Node::Grid(_) | Node::Spacer(_) => {
            Vec::new()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ForbiddenReason {
    Operator(String),
    Keyword(String),
    BareIdentifier(String),
    FunctionCall,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(String),
    String(String),
    Bool(bool),
    /// A `$`-prefixed ref chain, raw text (e.g. `"$a.b[0]"`).
    Ident(String),
    Op(&'static str),
    Keyword(&'static str),
    LParen,
    RParen,
    Forbidden(ForbiddenReason),
    Invalid(String),
}

const KEYWORDS: &[&str] = &["and", "or", "not", "if", "then", "else"];
const FORBIDDEN_KEYWORDS: &[&str] =
    &["typeof", "instanceof", "new", "delete", "function", "return", "var", "let", "const"];

/// Turns an expression body into a flat token sequence without executing
/// it: a hand-rolled scanner, not a parser — structural limits (paren
/// depth, token count, ...) are checked over the flat sequence, so there's
/// no need to build an AST.
fn tokenize(text: &str) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c == '"' {
            let start = i + 1;
            let mut j = start;
            while j < chars.len() && chars[j] != '"' {
                j += 1;
            }
            let content: String = chars[start..j.min(chars.len())].iter().collect();
            tokens.push(Token::String(content));
            i = j + 1;
            continue;
        }
        if c == '$' {
            let start = i;
            i += 1;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            loop {
                if i < chars.len() && chars[i] == '.' {
                    i += 1;
                    while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                        i += 1;
                    }
                } else if i < chars.len() && chars[i] == '[' {
                    i += 1;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                    if i < chars.len() && chars[i] == ']' {
                        i += 1;
                    }
                } else {
                    break;
                }
            }
            let raw: String = chars[start..i].iter().collect();
            if i < chars.len() && chars[i] == '(' {
                tokens.push(Token::Forbidden(ForbiddenReason::FunctionCall));
            } else {
                tokens.push(Token::Ident(raw));
            }
            continue;
        }
        if c.is_ascii_digit() || (c == '-' && starts_signed_number(&tokens, &chars, i)) {
            let start = i;
            if c == '-' {
                i += 1;
            }
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            if i < chars.len() && chars[i] == '.' {
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
            }
            let raw: String = chars[start..i].iter().collect();
            tokens.push(Token::Number(raw));
            continue;
        }
        if c.is_alphabetic() {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            if word == "true" || word == "false" {
                tokens.push(Token::Bool(word == "true"));
            } else if KEYWORDS.contains(&word.as_str()) {
                let kw = *KEYWORDS.iter().find(|k| **k == word).unwrap();
                tokens.push(Token::Keyword(kw));
            } else if FORBIDDEN_KEYWORDS.contains(&word.as_str()) {
                tokens.push(Token::Forbidden(ForbiddenReason::Keyword(word)));
            } else if i < chars.len() && chars[i] == '(' {
                tokens.push(Token::Forbidden(ForbiddenReason::FunctionCall));
            } else {
                tokens.push(Token::Forbidden(ForbiddenReason::BareIdentifier(word)));
            }
            continue;
        }
        if c == '(' {
            tokens.push(Token::LParen);
            i += 1;
            continue;
        }
        if c == ')' {
            tokens.push(Token::RParen);
            i += 1;
            continue;
        }

        if let Some(three) = chars.get(i..i + 3).map(|s| s.iter().collect::<String>()) {
            if three == "===" || three == "!==" {
                tokens.push(Token::Forbidden(ForbiddenReason::Operator(three)));
                i += 3;
                continue;
            }
        }

        let two: Option<String> = chars.get(i..i + 2).map(|s| s.iter().collect());
        match two.as_deref() {
            Some("==") | Some("!=") | Some("<=") | Some(">=") => {
                tokens.push(Token::Op(match two.as_deref().unwrap() {
                    "==" => "==",
                    "!=" => "!=",
                    "<=" => "<=",
                    _ => ">=",
                }));
                i += 2;
                continue;
            }
            Some("&&") | Some("||") => {
                tokens.push(Token::Forbidden(ForbiddenReason::Operator(two.unwrap())));
                i += 2;
                continue;
            }
            _ => {}
        }

        match c {
            '+' | '-' | '*' | '/' | '%' | '<' | '>' => {
                tokens.push(Token::Op(match c {
                    '+' => "+",
                    '-' => "-",
                    '*' => "*",
                    '/' => "/",
                    '%' => "%",
                    '<' => "<",
                    _ => ">",
                }));
                i += 1;
            }
            '!' => {
                tokens.push(Token::Forbidden(ForbiddenReason::Operator("!".to_string())));
                i += 1;
            }
            _ => {
                tokens.push(Token::Invalid(c.to_string()));
                i += 1;
            }
        }
    }
    tokens
}

/// A `-` starts a signed number literal only when there's nothing before it
/// that would make it a binary operator (no previous token, or the previous
/// token is an operator, a condition keyword, `(`, or `[` — per the
/// unary-minus disambiguation rule).
fn starts_signed_number(tokens: &[Token], chars: &[char], i: usize) -> bool {
    if !chars.get(i + 1).is_some_and(char::is_ascii_digit) {
        return false;
    }
    match tokens.last() {
        None => true,
        Some(Token::Op(_) | Token::LParen) => true,
        Some(Token::Keyword(k)) => matches!(*k, "if" | "then" | "else" | "and" | "or" | "not"),
        _ => false,
    }
}
