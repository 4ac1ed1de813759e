//! Parameter collection: one entry per name, merged over occurrences.

use tracing::trace;

use super::{Param, Type};
use crate::ast::Parameter;

/// Builds the type a parameter occurrence stands for from the type its
/// position expects: a pick list makes an object, a spread makes a list.
pub fn shape(param: &Parameter, expected: Type) -> Type {
    let element = if param.pick.is_empty() || matches!(expected, Type::Object { .. }) {
        expected
    } else {
        Type::object(
            param
                .pick
                .iter()
                .map(|field| (field.normalized(), Type::Unknown)),
        )
    };
    if param.is_spread() {
        Type::array(element)
    } else {
        element
    }
}

/// The parameters of one statement.
#[derive(Debug, Default)]
pub struct ParamSet {
    params: Vec<Param>,
}

impl ParamSet {
    /// Records one occurrence of `param` typed `ty`.
    ///
    /// A repeated name keeps its first shape. Its type is replaced only by
    /// a strictly more specific one, and `!` on any occurrence makes it
    /// required.
    pub fn add(&mut self, param: &Parameter, ty: Type) {
        if let Some(existing) = self.params.iter_mut().find(|p| p.name == param.name) {
            existing.spans.push(param.span);
            existing.required |= param.required;
            if ty.rank() > existing.ty.rank() {
                trace!(name = %param.name, ?ty, "parameter type narrowed");
                existing.ty = ty;
            }
            return;
        }
        trace!(name = %param.name, ?ty, "parameter added");
        self.params.push(Param {
            name: param.name.clone(),
            ty,
            required: param.required,
            spread: param.is_spread(),
            pick: param.pick.iter().map(|field| field.normalized()).collect(),
            spans: vec![param.span],
        });
    }

    /// Returns the parameters ordered by first occurrence in the text.
    pub fn into_sorted(self) -> Vec<Param> {
        let mut params = self.params;
        for param in &mut params {
            param.spans.sort_by_key(|span| span.start);
        }
        params.sort_by_key(|param| param.spans.first().map_or(0, |span| span.start));
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Ident, ParameterKind, ParameterStyle};
    use crate::runtime::Span;

    fn param(name: &str, start: usize) -> Parameter {
        Parameter {
            name: name.into(),
            kind: ParameterKind::Single,
            required: false,
            pick: vec![],
            style: ParameterStyle::Dollar,
            span: Span::new(start, start + name.len() + 1),
        }
    }

    #[test]
    fn test_merge_keeps_most_specific() {
        let mut set = ParamSet::default();
        set.add(&param("id", 10), Type::Unknown);
        set.add(&param("id", 30), Type::Number);
        set.add(&param("id", 50), Type::Unknown);
        let params = set.into_sorted();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].ty, Type::Number);
        assert_eq!(params[0].spans.len(), 3);
    }

    #[test]
    fn test_first_concrete_type_wins() {
        let mut set = ParamSet::default();
        set.add(&param("x", 0), Type::String);
        set.add(&param("x", 20), Type::Number);
        assert_eq!(set.into_sorted()[0].ty, Type::String);
    }

    #[test]
    fn test_sorted_by_first_occurrence() {
        let mut set = ParamSet::default();
        set.add(&param("b", 40), Type::Unknown);
        set.add(&param("a", 10), Type::Unknown);
        let names: Vec<_> = set.into_sorted().into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_required_on_any_occurrence() {
        let mut set = ParamSet::default();
        set.add(&param("x", 0), Type::Unknown);
        let mut required = param("x", 10);
        required.required = true;
        set.add(&required, Type::Unknown);
        assert!(set.into_sorted()[0].required);
    }

    #[test]
    fn test_shape() {
        let mut rows = param("rows", 0);
        rows.kind = ParameterKind::Spread;
        rows.pick = vec![
            Ident::new("a", Span::default()),
            Ident::new("b", Span::default()),
        ];
        assert_eq!(
            shape(&rows, Type::Unknown),
            Type::array(Type::object([
                ("a".to_string(), Type::Unknown),
                ("b".to_string(), Type::Unknown),
            ]))
        );
        let mut ids = param("ids", 0);
        ids.kind = ParameterKind::Spread;
        assert_eq!(shape(&ids, Type::Number), Type::array(Type::Number));
    }
}
