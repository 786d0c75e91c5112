use swc_core::{
    common::DUMMY_SP,
    ecma::ast::{Module, ModuleItem},
};

use crate::DownlevelAtom;

/// One located and parsed component file.
///
/// Regions which were not found in the source keep their zeroed
/// [`RegionSpan`] and an empty program, so downstream stages never
/// need to special-case a missing `<script>`.
#[derive(Debug, Default)]
pub struct SfcDescriptor {
    pub id: Option<String>,
    pub template: Option<SfcTemplateRegion>,
    pub script_setup: SfcScriptRegion,
    pub script: SfcScriptRegion,
    /// Module items synthesized by auxiliary passes (e.g. reactivity
    /// helper imports). Prepended to the merged module.
    pub extra_declarations: Vec<ModuleItem>,
}

/// Byte offsets of one region in the original file.
/// Invariant: `start <= content_start <= content_end <= end`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionSpan {
    pub start: u32,
    pub end: u32,
    pub content_start: u32,
    pub content_end: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SfcAttribute {
    pub name: DownlevelAtom,
    pub value: Option<DownlevelAtom>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScriptLang {
    #[default]
    Es,
    Jsx,
    Typescript,
    Tsx,
}

/// A `<script>` or `<script setup>` region: its location, raw content,
/// opening-tag attributes and the parsed program.
#[derive(Debug)]
pub struct SfcScriptRegion {
    pub span: RegionSpan,
    pub content: String,
    pub attrs: Vec<SfcAttribute>,
    pub lang: ScriptLang,
    pub found: bool,
    pub program: Module,
}

impl Default for SfcScriptRegion {
    fn default() -> Self {
        SfcScriptRegion {
            span: RegionSpan::default(),
            content: String::new(),
            attrs: vec![],
            lang: ScriptLang::default(),
            found: false,
            program: empty_module(),
        }
    }
}

impl SfcScriptRegion {
    /// The raw value of the `lang` attribute, if one was written.
    pub fn lang_attr(&self) -> Option<&DownlevelAtom> {
        self.attrs
            .iter()
            .find(|attr| attr.name.eq("lang"))
            .and_then(|attr| attr.value.as_ref())
    }
}

/// The `<template>` region. `span.content_start..span.content_end`
/// delimits the raw markup between the template tags.
#[derive(Debug, Clone)]
pub struct SfcTemplateRegion {
    pub lang: DownlevelAtom,
    pub content: String,
    pub span: RegionSpan,
}

pub fn empty_module() -> Module {
    Module {
        span: DUMMY_SP,
        body: vec![],
        shebang: None,
    }
}
