//! Commonly used words as static symbols (`DownlevelAtom`)

use downlevel_core::{downlevel_atom, DownlevelAtom};

lazy_static! {
    // Compiler macros
    pub static ref DEFINE_PROPS: DownlevelAtom = downlevel_atom!("defineProps");
    pub static ref DEFINE_EMITS: DownlevelAtom = downlevel_atom!("defineEmits");
    pub static ref DEFINE_EXPOSE: DownlevelAtom = downlevel_atom!("defineExpose");
    pub static ref WITH_DEFAULTS: DownlevelAtom = downlevel_atom!("withDefaults");

    // Component-options fields
    pub static ref PROPS: DownlevelAtom = downlevel_atom!("props");
    pub static ref SETUP: DownlevelAtom = downlevel_atom!("setup");
    pub static ref COMPONENTS: DownlevelAtom = downlevel_atom!("components");
    pub static ref DIRECTIVES: DownlevelAtom = downlevel_atom!("directives");
    pub static ref REQUIRED: DownlevelAtom = downlevel_atom!("required");
    pub static ref TYPE: DownlevelAtom = downlevel_atom!("type");
    pub static ref DEFAULT: DownlevelAtom = downlevel_atom!("default");

    // Helper atoms
    pub static ref SFC_MAIN: DownlevelAtom = downlevel_atom!("__sfc_main");
    pub static ref PROPS_HELPER: DownlevelAtom = downlevel_atom!("__props");
    pub static ref CTX_HELPER: DownlevelAtom = downlevel_atom!("__ctx");
    pub static ref EMIT: DownlevelAtom = downlevel_atom!("emit");
    pub static ref OBJECT: DownlevelAtom = downlevel_atom!("Object");
    pub static ref ASSIGN: DownlevelAtom = downlevel_atom!("assign");
    pub static ref DEFINE_ASYNC_COMPONENT: DownlevelAtom = downlevel_atom!("defineAsyncComponent");
}
