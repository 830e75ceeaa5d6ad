//! The closed error enumeration (§7) and the accumulated validation result.

use std::fmt;

use safeview_types::PointerPath;

/// Every code a validation or runtime error can carry. Closed — adding a
/// new failure mode means adding a new variant here, not stringly typing
/// it at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Structural
    InvalidJson,
    SchemaError,
    MissingField,
    InvalidType,
    InvalidValue,
    UnknownNodeType,
    // Permissions
    ExprNotAllowed,
    RefNotAllowed,
    DynamicNotAllowed,
    // Style
    ForbiddenStyleProperty,
    StyleValueOutOfRange,
    ForbiddenCssFunction,
    InvalidColor,
    InvalidLength,
    ForbiddenOverflowValue,
    TransformSkewForbidden,
    // Security
    ExternalUrl,
    PositionFixedForbidden,
    PositionStickyForbidden,
    PositionAbsoluteNotInStack,
    AssetPathTraversal,
    InvalidAssetPath,
    PrototypePollution,
    // Limits
    CardSizeExceeded,
    TextContentSizeExceeded,
    StyleSizeExceeded,
    NodeCountExceeded,
    LoopIterationsExceeded,
    NestedLoopsExceeded,
    OverflowAutoCountExceeded,
    OverflowAutoNested,
    StackNestingExceeded,
    LoopSourceNotArray,
    LoopSourceMissing,
    // Expressions
    ExprTooLong,
    RefTooLong,
    ExprTooManyTokens,
    ExprNestingTooDeep,
    ExprConditionNestingTooDeep,
    ExprRefDepthExceeded,
    ExprArrayIndexExceeded,
    ExprStringLiteralTooLong,
    ExprForbiddenToken,
    ExprFunctionCall,
    ExprInvalidToken,
    // Style-ref
    StyleCircularRef,
    StyleRefNotFound,
    InvalidStyleRef,
    InvalidStyleName,
    // Runtime
    RuntimeNodeLimit,
    RuntimeStyleLimit,
    RuntimeOverflowLimit,
    RuntimeTextLimit,
    RuntimeLoopSourceInvalid,
}

impl ErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidJson => "INVALID_JSON",
            ErrorCode::SchemaError => "SCHEMA_ERROR",
            ErrorCode::MissingField => "MISSING_FIELD",
            ErrorCode::InvalidType => "INVALID_TYPE",
            ErrorCode::InvalidValue => "INVALID_VALUE",
            ErrorCode::UnknownNodeType => "UNKNOWN_NODE_TYPE",
            ErrorCode::ExprNotAllowed => "EXPR_NOT_ALLOWED",
            ErrorCode::RefNotAllowed => "REF_NOT_ALLOWED",
            ErrorCode::DynamicNotAllowed => "DYNAMIC_NOT_ALLOWED",
            ErrorCode::ForbiddenStyleProperty => "FORBIDDEN_STYLE_PROPERTY",
            ErrorCode::StyleValueOutOfRange => "STYLE_VALUE_OUT_OF_RANGE",
            ErrorCode::ForbiddenCssFunction => "FORBIDDEN_CSS_FUNCTION",
            ErrorCode::InvalidColor => "INVALID_COLOR",
            ErrorCode::InvalidLength => "INVALID_LENGTH",
            ErrorCode::ForbiddenOverflowValue => "FORBIDDEN_OVERFLOW_VALUE",
            ErrorCode::TransformSkewForbidden => "TRANSFORM_SKEW_FORBIDDEN",
            ErrorCode::ExternalUrl => "EXTERNAL_URL",
            ErrorCode::PositionFixedForbidden => "POSITION_FIXED_FORBIDDEN",
            ErrorCode::PositionStickyForbidden => "POSITION_STICKY_FORBIDDEN",
            ErrorCode::PositionAbsoluteNotInStack => "POSITION_ABSOLUTE_NOT_IN_STACK",
            ErrorCode::AssetPathTraversal => "ASSET_PATH_TRAVERSAL",
            ErrorCode::InvalidAssetPath => "INVALID_ASSET_PATH",
            ErrorCode::PrototypePollution => "PROTOTYPE_POLLUTION",
            ErrorCode::CardSizeExceeded => "CARD_SIZE_EXCEEDED",
            ErrorCode::TextContentSizeExceeded => "TEXT_CONTENT_SIZE_EXCEEDED",
            ErrorCode::StyleSizeExceeded => "STYLE_SIZE_EXCEEDED",
            ErrorCode::NodeCountExceeded => "NODE_COUNT_EXCEEDED",
            ErrorCode::LoopIterationsExceeded => "LOOP_ITERATIONS_EXCEEDED",
            ErrorCode::NestedLoopsExceeded => "NESTED_LOOPS_EXCEEDED",
            ErrorCode::OverflowAutoCountExceeded => "OVERFLOW_AUTO_COUNT_EXCEEDED",
            ErrorCode::OverflowAutoNested => "OVERFLOW_AUTO_NESTED",
            ErrorCode::StackNestingExceeded => "STACK_NESTING_EXCEEDED",
            ErrorCode::LoopSourceNotArray => "LOOP_SOURCE_NOT_ARRAY",
            ErrorCode::LoopSourceMissing => "LOOP_SOURCE_MISSING",
            ErrorCode::ExprTooLong => "EXPR_TOO_LONG",
            ErrorCode::RefTooLong => "REF_TOO_LONG",
            ErrorCode::ExprTooManyTokens => "EXPR_TOO_MANY_TOKENS",
            ErrorCode::ExprNestingTooDeep => "EXPR_NESTING_TOO_DEEP",
            ErrorCode::ExprConditionNestingTooDeep => "EXPR_CONDITION_NESTING_TOO_DEEP",
            ErrorCode::ExprRefDepthExceeded => "EXPR_REF_DEPTH_EXCEEDED",
            ErrorCode::ExprArrayIndexExceeded => "EXPR_ARRAY_INDEX_EXCEEDED",
            ErrorCode::ExprStringLiteralTooLong => "EXPR_STRING_LITERAL_TOO_LONG",
            ErrorCode::ExprForbiddenToken => "EXPR_FORBIDDEN_TOKEN",
            ErrorCode::ExprFunctionCall => "EXPR_FUNCTION_CALL",
            ErrorCode::ExprInvalidToken => "EXPR_INVALID_TOKEN",
            ErrorCode::StyleCircularRef => "STYLE_CIRCULAR_REF",
            ErrorCode::StyleRefNotFound => "STYLE_REF_NOT_FOUND",
            ErrorCode::InvalidStyleRef => "INVALID_STYLE_REF",
            ErrorCode::InvalidStyleName => "INVALID_STYLE_NAME",
            ErrorCode::RuntimeNodeLimit => "RUNTIME_NODE_LIMIT",
            ErrorCode::RuntimeStyleLimit => "RUNTIME_STYLE_LIMIT",
            ErrorCode::RuntimeOverflowLimit => "RUNTIME_OVERFLOW_LIMIT",
            ErrorCode::RuntimeTextLimit => "RUNTIME_TEXT_LIMIT",
            ErrorCode::RuntimeLoopSourceInvalid => "RUNTIME_LOOP_SOURCE_INVALID",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One accumulated defect: `{code, message, path}` (§6's wire shape).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub code: ErrorCode,
    pub message: String,
    pub path: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>, path: &PointerPath) -> Self {
        Self {
            code,
            message: message.into(),
            path: path.to_string(),
        }
    }

    /// A document-level error (empty path), e.g. a missing `meta.name`.
    #[must_use]
    pub fn document(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: String::new(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "[{}] {}", self.code, self.message)
        } else {
            write!(f, "[{}] {} (at {})", self.code, self.message, self.path)
        }
    }
}

/// `Result = { valid: bool, errors: [Error] }` (§3, §6).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    #[must_use]
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn extend(&mut self, errors: impl IntoIterator<Item = ValidationError>) {
        self.errors.extend(errors);
    }

    /// True if any accumulated error carries this code.
    #[must_use]
    pub fn has_code(&self, code: ErrorCode) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_has_a_stable_wire_string() {
        assert_eq!(ErrorCode::ExternalUrl.as_str(), "EXTERNAL_URL");
        assert_eq!(
            ErrorCode::PositionAbsoluteNotInStack.as_str(),
            "POSITION_ABSOLUTE_NOT_IN_STACK"
        );
    }

    #[test]
    fn document_error_has_empty_path() {
        let err = ValidationError::document(ErrorCode::SchemaError, "bad card");
        assert_eq!(err.path, "");
    }
}
