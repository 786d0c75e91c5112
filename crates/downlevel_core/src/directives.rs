use phf::{phf_set, Set};

/// Directive names handled by the framework itself.
/// Only directives outside of this set are reported as custom.
static BUILTIN_DIRECTIVES: Set<&'static str> = phf_set! {
    "if",
    "else",
    "else-if",
    "for",
    "once",
    "model",
    "on",
    "bind",
    "slot",
    "slot-scope",
    "key",
    "ref",
    "text",
    "html",
    "show",
    "pre",
    "cloak",
};

pub fn is_builtin_directive(name: &str) -> bool {
    BUILTIN_DIRECTIVES.contains(name)
}
