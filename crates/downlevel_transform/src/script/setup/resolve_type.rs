//! Resolves type-only macro declarations against local type declarations
//! and infers runtime type tags from TypeScript types.

use downlevel_core::DownlevelAtom;
use flagset::{flags, FlagSet};
use fxhash::FxHashMap;
use strum_macros::IntoStaticStr;
use swc_core::ecma::ast::{
    Decl, ModuleDecl, ModuleItem, Stmt, TsEntityName, TsFnOrConstructorType, TsInterfaceBody,
    TsKeywordTypeKind, TsLit, TsType, TsTypeLit, TsUnionOrIntersectionType,
};

flags! {
    /// The runtime-representable type vocabulary. `Null` stands for
    /// "no runtime check possible".
    #[derive(IntoStaticStr)]
    pub enum Types: usize {
        String,
        Number,
        Boolean,
        Object,
        Function,
        Array,
        #[strum(serialize = "null")]
        Null,
    }
}

pub type TypesSet = FlagSet<Types>;

/// Runtime type tags of locally declared type aliases, resolved on
/// demand. Scoped to a single macro-processing invocation.
#[derive(Default)]
pub struct DeclaredTypes {
    resolved: FxHashMap<DownlevelAtom, TypesSet>,
}

/// A local interface or type-alias declaration
pub enum LocalTypeDecl<'a> {
    Interface(&'a swc_core::ecma::ast::TsInterfaceDecl),
    Alias(&'a swc_core::ecma::ast::TsTypeAliasDecl),
}

/// Finds a local (possibly `export`ed) type declaration by name
pub fn find_type_decl<'a>(items: &'a [ModuleItem], name: &str) -> Option<LocalTypeDecl<'a>> {
    for item in items {
        let decl = match item {
            ModuleItem::Stmt(Stmt::Decl(decl)) => decl,
            ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => &export.decl,
            _ => continue,
        };

        match decl {
            Decl::TsInterface(interface) if interface.id.sym.eq(name) => {
                return Some(LocalTypeDecl::Interface(interface));
            }
            Decl::TsTypeAlias(alias) if alias.id.sym.eq(name) => {
                return Some(LocalTypeDecl::Alias(alias));
            }
            _ => {}
        }
    }

    None
}

/// A props type argument resolved to something with members
pub enum PropsTypeDecl<'a> {
    TypeLit(&'a TsTypeLit),
    Interface(&'a TsInterfaceBody),
}

/// Resolves the type argument of `defineProps` to a literal type or an
/// interface body. `None` means the argument is not resolvable.
pub fn resolve_props_type<'a>(
    items: &'a [ModuleItem],
    ts_type: &'a TsType,
) -> Option<PropsTypeDecl<'a>> {
    match ts_type {
        TsType::TsTypeLit(type_lit) => Some(PropsTypeDecl::TypeLit(type_lit)),

        TsType::TsTypeRef(type_ref) => {
            let TsEntityName::Ident(ref ident) = type_ref.type_name else {
                return None;
            };

            match find_type_decl(items, &ident.sym)? {
                LocalTypeDecl::Interface(interface) => {
                    Some(PropsTypeDecl::Interface(&interface.body))
                }
                LocalTypeDecl::Alias(alias) => match alias.type_ann.as_ref() {
                    TsType::TsTypeLit(type_lit) => Some(PropsTypeDecl::TypeLit(type_lit)),
                    _ => None,
                },
            }
        }

        _ => None,
    }
}

/// Checks that the type argument of `defineEmits` resolves to a function
/// type, a literal type (with call signatures) or an interface.
pub fn is_emits_type_resolvable(items: &[ModuleItem], ts_type: &TsType) -> bool {
    match ts_type {
        TsType::TsFnOrConstructorType(TsFnOrConstructorType::TsFnType(_)) => true,
        TsType::TsTypeLit(_) => true,

        TsType::TsTypeRef(type_ref) => {
            let TsEntityName::Ident(ref ident) = type_ref.type_name else {
                return false;
            };

            match find_type_decl(items, &ident.sym) {
                Some(LocalTypeDecl::Interface(_)) => true,
                Some(LocalTypeDecl::Alias(alias)) => matches!(
                    alias.type_ann.as_ref(),
                    TsType::TsTypeLit(_)
                        | TsType::TsFnOrConstructorType(TsFnOrConstructorType::TsFnType(_))
                ),
                None => false,
            }
        }

        _ => false,
    }
}

/// Infers the runtime type tags of a TypeScript type. Unions combine
/// their members' tags, intersections collapse to `Object`, anything
/// unrecognized yields `null` (no runtime check).
pub fn infer_runtime_type(
    ts_type: &TsType,
    items: &[ModuleItem],
    declared: &mut DeclaredTypes,
) -> TypesSet {
    match ts_type {
        TsType::TsKeywordType(keyword) => match keyword.kind {
            TsKeywordTypeKind::TsStringKeyword => Types::String.into(),
            TsKeywordTypeKind::TsNumberKeyword => Types::Number.into(),
            TsKeywordTypeKind::TsBooleanKeyword => Types::Boolean.into(),
            TsKeywordTypeKind::TsObjectKeyword => Types::Object.into(),
            _ => Types::Null.into(),
        },

        TsType::TsTypeLit(_) => Types::Object.into(),

        TsType::TsFnOrConstructorType(TsFnOrConstructorType::TsFnType(_)) => {
            Types::Function.into()
        }
        TsType::TsFnOrConstructorType(TsFnOrConstructorType::TsConstructorType(_)) => {
            Types::Null.into()
        }

        TsType::TsArrayType(_) | TsType::TsTupleType(_) => Types::Array.into(),

        TsType::TsLitType(literal_type) => match literal_type.lit {
            TsLit::Str(_) => Types::String.into(),
            TsLit::Bool(_) => Types::Boolean.into(),
            TsLit::Number(_) | TsLit::BigInt(_) => Types::Number.into(),
            TsLit::Tpl(_) => Types::Null.into(),
        },

        TsType::TsTypeRef(type_ref) => {
            let TsEntityName::Ident(ref ident) = type_ref.type_name else {
                return Types::Null.into();
            };

            if let Some(resolved) = declared.resolved.get(&ident.sym) {
                return *resolved;
            }

            match &*ident.sym {
                "Array" => return Types::Array.into(),
                "Function" => return Types::Function.into(),
                "Object" => return Types::Object.into(),

                // Collection types and TS utility types have no closer
                // runtime representation than a plain object check
                "Set" | "Map" | "WeakSet" | "WeakMap" | "Record" | "Partial" | "Readonly"
                | "Pick" | "Omit" | "Exclude" | "Extract" | "Required" | "InstanceType" => {
                    return Types::Object.into();
                }

                _ => {}
            }

            match find_type_decl(items, &ident.sym) {
                Some(LocalTypeDecl::Alias(alias)) => {
                    // Guard against `type A = A | string` cycles
                    declared
                        .resolved
                        .insert(ident.sym.clone(), Types::Null.into());

                    let resolved = infer_runtime_type(&alias.type_ann, items, declared);
                    declared.resolved.insert(ident.sym.clone(), resolved);
                    resolved
                }
                Some(LocalTypeDecl::Interface(_)) => {
                    declared
                        .resolved
                        .insert(ident.sym.clone(), Types::Object.into());
                    Types::Object.into()
                }
                None => Types::Null.into(),
            }
        }

        TsType::TsParenthesizedType(paren) => infer_runtime_type(&paren.type_ann, items, declared),

        TsType::TsUnionOrIntersectionType(union_or_intersection) => match union_or_intersection {
            TsUnionOrIntersectionType::TsUnionType(union_type) => {
                let mut combined = TypesSet::default();
                for member in &union_type.types {
                    combined |= infer_runtime_type(member, items, declared);
                }
                combined
            }
            TsUnionOrIntersectionType::TsIntersectionType(_) => Types::Object.into(),
        },

        _ => Types::Null.into(),
    }
}
