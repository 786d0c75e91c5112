use fxhash::FxHashSet;

use crate::DownlevelAtom;

/// Everything the template statically references.
///
/// `components` holds candidate component tags both verbatim and
/// PascalCase-normalized, `directives` holds camelCase-normalized custom
/// directive names (built-ins excluded), `identifiers` holds the free
/// identifiers of all dynamic expressions.
#[derive(Debug, Default, PartialEq)]
pub struct TemplateReferences {
    pub components: FxHashSet<DownlevelAtom>,
    pub directives: FxHashSet<DownlevelAtom>,
    pub identifiers: FxHashSet<DownlevelAtom>,
}
