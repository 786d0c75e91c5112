//! Converts a `defineProps`/`withDefaults` declaration into a runtime
//! props schema.

use downlevel_core::{atom_to_propname, DownlevelAtom, IntoIdent};
use swc_core::{
    common::{Span, DUMMY_SP},
    ecma::ast::{
        ArrayLit, Bool, Expr, ExprOrSpread, IdentName, KeyValueProp, Lit, ModuleItem, Null,
        ObjectLit, Prop, PropName, PropOrSpread, TsType, TsTypeElement,
    },
};

use crate::atoms::{DEFAULT, REQUIRED, TYPE};

use super::resolve_type::{infer_runtime_type, DeclaredTypes, PropsTypeDecl, Types, TypesSet};

/// Captured arguments of one `defineProps`/`withDefaults` usage
#[derive(Default)]
pub struct DefinePropsCapture {
    pub span: Span,
    /// First call argument (an object or array literal passed through)
    pub runtime_decl: Option<Box<Expr>>,
    /// First type parameter
    pub type_decl: Option<Box<TsType>>,
    /// Second argument of `withDefaults`
    pub defaults: Option<Box<Expr>>,
}

/// One prop derived from a type-only declaration
pub struct PropTypeData {
    pub key: DownlevelAtom,
    pub types: TypesSet,
    pub required: bool,
}

/// Reads prop descriptions out of a resolved type declaration.
/// Computed and non-identifier keys are skipped.
pub fn extract_prop_types(
    decl: &PropsTypeDecl,
    items: &[ModuleItem],
    declared: &mut DeclaredTypes,
) -> Vec<PropTypeData> {
    let members = match decl {
        PropsTypeDecl::TypeLit(type_lit) => &type_lit.members,
        PropsTypeDecl::Interface(body) => &body.body,
    };

    let mut props = Vec::with_capacity(members.len());

    for member in members {
        match member {
            TsTypeElement::TsPropertySignature(signature) => {
                if signature.computed {
                    continue;
                }
                let Expr::Ident(key) = signature.key.as_ref() else {
                    continue;
                };

                let types = match &signature.type_ann {
                    Some(ann) => infer_runtime_type(&ann.type_ann, items, declared),
                    None => Types::Null.into(),
                };

                props.push(PropTypeData {
                    key: key.sym.clone(),
                    types,
                    required: !signature.optional,
                });
            }

            TsTypeElement::TsMethodSignature(signature) => {
                if signature.computed {
                    continue;
                }
                let Expr::Ident(key) = signature.key.as_ref() else {
                    continue;
                };

                props.push(PropTypeData {
                    key: key.sym.clone(),
                    types: Types::Function.into(),
                    required: !signature.optional,
                });
            }

            _ => {}
        }
    }

    props
}

/// Generates the runtime props object from derived prop types, merging
/// in static defaults. A prop with a static default is not required.
pub fn generate_runtime_props(
    props: Vec<PropTypeData>,
    defaults: Option<&Expr>,
) -> Option<Box<Expr>> {
    if props.is_empty() {
        return None;
    }

    let has_static_defaults = has_static_defaults(defaults);
    let mut fields: Vec<PropOrSpread> = Vec::with_capacity(props.len());

    for prop in props {
        let key = atom_to_propname(prop.key.clone(), DUMMY_SP);

        // Unconstrained props carry no runtime check at all
        if prop.types == TypesSet::from(Types::Null) {
            fields.push(PropOrSpread::Prop(Box::new(Prop::KeyValue(KeyValueProp {
                key,
                value: Box::new(Expr::Lit(Lit::Null(Null { span: DUMMY_SP }))),
            }))));
            continue;
        }

        let default_value = if has_static_defaults {
            find_static_default(defaults, &prop.key)
        } else {
            None
        };

        let mut prop_fields: Vec<PropOrSpread> = Vec::with_capacity(3);

        macro_rules! add_field {
            ($sym: expr, $value: expr) => {
                prop_fields.push(PropOrSpread::Prop(Box::new(Prop::KeyValue(KeyValueProp {
                    key: PropName::Ident(IdentName {
                        span: DUMMY_SP,
                        sym: $sym,
                    }),
                    value: $value,
                }))))
            };
        }

        // e.g. `type: Number` or `type: [String, Number]`
        add_field!(TYPE.to_owned(), to_runtime_type_expr(prop.types));

        // e.g. `required: true`
        add_field!(
            REQUIRED.to_owned(),
            Box::new(Expr::Lit(Lit::Bool(Bool {
                span: DUMMY_SP,
                value: prop.required && default_value.is_none(),
            })))
        );

        // e.g. `default: 0`
        if let Some(default_value) = default_value {
            add_field!(DEFAULT.to_owned(), default_value);
        }

        fields.push(PropOrSpread::Prop(Box::new(Prop::KeyValue(KeyValueProp {
            key,
            value: Box::new(Expr::Object(ObjectLit {
                span: DUMMY_SP,
                props: prop_fields,
            })),
        }))));
    }

    Some(Box::new(Expr::Object(ObjectLit {
        span: DUMMY_SP,
        props: fields,
    })))
}

fn to_runtime_type_expr(types: TypesSet) -> Box<Expr> {
    let mut idents: Vec<&'static str> = Vec::new();

    for type_name in types.into_iter() {
        idents.push(type_name.into());
    }

    if idents.len() == 1 {
        return Box::new(Expr::Ident(DownlevelAtom::from(idents[0]).into_ident()));
    }

    let array_elems = idents
        .into_iter()
        .map(|ident| {
            Some(ExprOrSpread {
                spread: None,
                expr: Box::new(Expr::Ident(DownlevelAtom::from(ident).into_ident())),
            })
        })
        .collect();

    Box::new(Expr::Array(ArrayLit {
        span: DUMMY_SP,
        elems: array_elems,
    }))
}

/// A defaults object is static when every property is a plain,
/// non-computed key. Only static defaults can be merged into the schema.
fn has_static_defaults(defaults: Option<&Expr>) -> bool {
    let Some(Expr::Object(obj)) = defaults else {
        return false;
    };

    obj.props.iter().all(|prop_or_spread| {
        let PropOrSpread::Prop(prop) = prop_or_spread else {
            return false;
        };

        match prop.as_ref() {
            Prop::KeyValue(key_value) => !matches!(key_value.key, PropName::Computed(_)),
            Prop::Shorthand(_) => true,
            _ => false,
        }
    })
}

fn find_static_default(defaults: Option<&Expr>, key: &str) -> Option<Box<Expr>> {
    let Some(Expr::Object(obj)) = defaults else {
        return None;
    };

    for prop_or_spread in &obj.props {
        let PropOrSpread::Prop(prop) = prop_or_spread else {
            continue;
        };

        match prop.as_ref() {
            Prop::KeyValue(key_value) => {
                let key_matches = match &key_value.key {
                    PropName::Ident(ident) => ident.sym.eq(key),
                    PropName::Str(s) => s.value.eq(key),
                    PropName::Num(n) => n.value.to_string() == key,
                    _ => false,
                };

                if key_matches {
                    return Some(key_value.value.clone());
                }
            }
            Prop::Shorthand(ident) if ident.sym.eq(key) => {
                return Some(Box::new(Expr::Ident(ident.clone())));
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::parser::parse_javascript_expr;

    #[test]
    fn it_detects_static_defaults() {
        let static_defaults = parse_javascript_expr("({ foo: 1, bar: 'a' })");
        assert!(has_static_defaults(Some(unparen(&static_defaults))));

        let computed_defaults = parse_javascript_expr("({ [key]: 1 })");
        assert!(!has_static_defaults(Some(unparen(&computed_defaults))));

        let spread_defaults = parse_javascript_expr("({ ...shared })");
        assert!(!has_static_defaults(Some(unparen(&spread_defaults))));
    }

    #[test]
    fn it_finds_defaults_by_key() {
        let defaults = parse_javascript_expr("({ foo: 42, 'quo-ted': 1 })");
        let defaults = unparen(&defaults);

        assert!(find_static_default(Some(defaults), "foo").is_some());
        assert!(find_static_default(Some(defaults), "quo-ted").is_some());
        assert!(find_static_default(Some(defaults), "bar").is_none());
    }

    fn unparen(expr: &Expr) -> &Expr {
        match expr {
            Expr::Paren(paren) => &paren.expr,
            other => other,
        }
    }
}
