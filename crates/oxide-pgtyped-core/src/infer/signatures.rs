//! Built-in signatures: `(left, right) -> result` for operators, with an
//! `Any` fallback, and argument-driven return types for the common
//! functions a schema seldom describes.

use super::Type;
use crate::ast::BinaryOp;

/// Every binary operator, for mapping a stored symbol back to its operator.
const OPERATORS: &[BinaryOp] = &[
    BinaryOp::Or,
    BinaryOp::And,
    BinaryOp::Eq,
    BinaryOp::NotEq,
    BinaryOp::Lt,
    BinaryOp::LtEq,
    BinaryOp::Gt,
    BinaryOp::GtEq,
    BinaryOp::Like,
    BinaryOp::NotLike,
    BinaryOp::ILike,
    BinaryOp::NotILike,
    BinaryOp::In,
    BinaryOp::NotIn,
    BinaryOp::Is,
    BinaryOp::IsNot,
    BinaryOp::IsDistinctFrom,
    BinaryOp::IsNotDistinctFrom,
    BinaryOp::TextSearch,
    BinaryOp::RightShift,
    BinaryOp::LeftShift,
    BinaryOp::RegexMatch,
    BinaryOp::RegexIMatch,
    BinaryOp::NotRegexMatch,
    BinaryOp::NotRegexIMatch,
    BinaryOp::BitXor,
    BinaryOp::BitAnd,
    BinaryOp::BitOr,
    BinaryOp::Concat,
    BinaryOp::JsonGetText,
    BinaryOp::JsonGet,
    BinaryOp::JsonPathText,
    BinaryOp::JsonPath,
    BinaryOp::Contains,
    BinaryOp::ContainedBy,
    BinaryOp::JsonAnyKey,
    BinaryOp::JsonAllKeys,
    BinaryOp::JsonHasKey,
    BinaryOp::JsonDeletePath,
    BinaryOp::Add,
    BinaryOp::Sub,
    BinaryOp::Mul,
    BinaryOp::Div,
    BinaryOp::Mod,
    BinaryOp::Pow,
];

/// Looks up an operator by its SQL symbol.
pub fn operator(symbol: &str) -> Option<BinaryOp> {
    OPERATORS.iter().copied().find(|op| op.as_str() == symbol)
}

/// Returns the result type of `left op right`.
///
/// Predicates are always `Boolean`. Placeholder operands defer the lookup
/// to refinement through `LoadOperator`; unions are resolved member-wise.
pub fn binary_result(op: BinaryOp, left: &Type, right: &Type) -> Type {
    if op.is_predicate() {
        return Type::Boolean;
    }
    if left.is_placeholder() || right.is_placeholder() {
        return Type::LoadOperator {
            op: op.as_str().to_string(),
            left: Box::new(left.clone()),
            right: Box::new(right.clone()),
        };
    }
    if let Type::Union { items } = left {
        return Type::union(items.iter().map(|item| binary_result(op, item, right)));
    }
    if let Type::Union { items } = right {
        return Type::union(items.iter().map(|item| binary_result(op, left, item)));
    }
    signature(op, left, right)
}

/// Resolves `left op right` for final operand types.
pub fn signature(op: BinaryOp, left: &Type, right: &Type) -> Type {
    use BinaryOp as Op;

    match (op, left, right) {
        (_, Type::Null, _) | (_, _, Type::Null) => Type::Null,
        (
            Op::Add | Op::Sub | Op::Mul | Op::Div | Op::Mod | Op::Pow,
            Type::Number,
            Type::Number,
        )
        | (
            Op::BitAnd | Op::BitOr | Op::BitXor | Op::LeftShift | Op::RightShift,
            Type::Number,
            Type::Number,
        )
        | (Op::Sub, Type::Date, Type::Date) => Type::Number,
        (Op::Add | Op::Sub, Type::Date, Type::Number | Type::String)
        | (Op::Add, Type::Number | Type::String, Type::Date) => Type::Date,
        (Op::Concat, Type::Json, Type::Json) => Type::Json,
        (Op::Concat, Type::Array { items }, _) | (Op::Concat, _, Type::Array { items }) => {
            Type::array((**items).clone())
        }
        (Op::Concat, Type::String, _) | (Op::Concat, _, Type::String) => Type::String,
        (Op::JsonGet | Op::JsonPath | Op::JsonDeletePath, Type::Json, _) => Type::Json,
        (Op::JsonGetText | Op::JsonPathText, Type::Json, _) => Type::String,
        _ => Type::Any,
    }
}

/// Returns the result type of a built-in function called with `args`, or
/// `None` when the function is not one of the well-known ones.
pub fn function_result(name: &str, args: &[Type]) -> Option<Type> {
    let first = args.first().cloned().unwrap_or(Type::Unknown);
    let ty = match name.to_ascii_lowercase().as_str() {
        "count" | "length" | "char_length" | "octet_length" | "position" | "strpos"
        | "abs" | "ceil" | "ceiling" | "floor" | "round" | "trunc" | "sqrt" | "power"
        | "random" | "sum" | "avg" | "stddev" | "variance" | "row_number" | "rank"
        | "dense_rank" | "ntile" | "date_part" | "array_length" | "cardinality" => {
            Type::Number
        }
        "lower" | "upper" | "trim" | "btrim" | "ltrim" | "rtrim" | "concat" | "concat_ws"
        | "substr" | "substring" | "replace" | "left" | "right" | "lpad" | "rpad" | "md5"
        | "string_agg" | "format" | "to_char" | "initcap" | "repeat" | "reverse"
        | "split_part" | "gen_random_uuid" | "uuid_generate_v4" => Type::String,
        "now" | "clock_timestamp" | "statement_timestamp" | "transaction_timestamp"
        | "date_trunc" | "to_timestamp" | "to_date" | "make_date" => Type::Date,
        "bool_and" | "bool_or" | "every" => Type::Boolean,
        "json_agg" | "jsonb_agg" | "to_json" | "to_jsonb" | "json_build_object"
        | "jsonb_build_object" | "json_build_array" | "jsonb_build_array"
        | "json_object_agg" | "jsonb_object_agg" | "jsonb_set" | "row_to_json" => Type::Json,
        "array_agg" => Type::array(first),
        "min" | "max" | "first_value" | "last_value" | "lag" | "lead" => first,
        "unnest" => match first {
            Type::Array { items } => *items,
            _ => Type::Unknown,
        },
        _ => return None,
    };
    Some(ty)
}
