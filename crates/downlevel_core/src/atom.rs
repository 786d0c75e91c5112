use swc_core::{
    common::{Span, DUMMY_SP},
    ecma::ast::{Ident, IdentName, PropName, Str},
};

/// Interned string type used across the whole pipeline
pub type DownlevelAtom = swc_core::ecma::atoms::Atom;

#[macro_export]
macro_rules! downlevel_atom {
    ($str: expr) => {
        $crate::DownlevelAtom::from($str)
    };
}

/// Convenience conversions from an atom to an AST identifier
pub trait IntoIdent {
    fn into_ident(self) -> Ident;
    fn into_ident_spanned(self, span: Span) -> Ident;
}

impl IntoIdent for DownlevelAtom {
    fn into_ident(self) -> Ident {
        self.into_ident_spanned(DUMMY_SP)
    }

    fn into_ident_spanned(self, span: Span) -> Ident {
        Ident {
            span,
            ctxt: Default::default(),
            sym: self,
            optional: false,
        }
    }
}

/// Converts an atom to a `PropName`, using a string key
/// when the atom is not a valid ECMA identifier.
pub fn atom_to_propname(sym: DownlevelAtom, span: Span) -> PropName {
    if is_valid_ident(&sym) {
        PropName::Ident(IdentName { span, sym })
    } else {
        PropName::Str(Str {
            span,
            value: sym,
            raw: None,
        })
    }
}

fn is_valid_ident(sym: &str) -> bool {
    let mut chars = sym.chars();

    let Some(first) = chars.next() else {
        return false;
    };

    if !(first.is_ascii_alphabetic() || first == '_' || first == '$') {
        return false;
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
