use downlevel::{
    should_transform, transform, ByteOffset, CompileError, ParseErrorKind, ScriptErrorKind,
    TransformOptions,
};

/// Strips all whitespace, making assertions independent of the
/// emitter's formatting
fn compact(code: &str) -> String {
    code.split_whitespace().collect()
}

fn run(input: &str) -> Option<String> {
    transform(input, Some("test.vue"), &TransformOptions::default())
        .expect("Transform should succeed")
        .map(|result| result.code)
}

fn run_err(input: &str) -> CompileError {
    match transform(input, Some("test.vue"), &TransformOptions::default()) {
        Err(e) => e,
        Ok(_) => panic!("Expected the transform to fail"),
    }
}

fn script_error_kind(error: CompileError) -> ScriptErrorKind {
    match error {
        CompileError::Transform(downlevel::TransformError::ScriptError(e)) => e.kind,
        other => panic!("Expected a script error, got {:?}", other),
    }
}

#[test]
fn it_exposes_template_referenced_bindings() {
    let code = run("<script setup>const a = 1</script>\n<template>{{ a }}</template>")
        .expect("Should rewrite");

    assert!(!code.contains("<script setup>"));
    assert!(compact(&code).contains("const__sfc_main={};"));
    assert!(compact(&code).contains("__sfc_main.setup=(__props,__ctx)=>"));
    assert!(code.contains("const a = 1"));
    assert!(code.contains("export default __sfc_main"));

    // The template region is untouched
    assert!(code.contains("<template>{{ a }}</template>"));

    // `a` is returned from setup
    let return_body = return_object_of(&code);
    assert!(return_body.contains('a'), "Return body: {return_body}");
}

#[test]
fn it_does_not_return_unreferenced_declarations() {
    let code = run(
        "<script setup>const a = 1\nconst hidden = 2</script>\n<template>{{ a }}</template>",
    )
    .expect("Should rewrite");

    let return_body = return_object_of(&code);
    assert!(return_body.contains('a'));
    assert!(!return_body.contains("hidden"));
}

#[test]
fn it_passes_runtime_props_through() {
    let code = run("<script setup>defineProps(['foo'])</script>").expect("Should rewrite");

    assert!(compact(&code).contains("__sfc_main.props=['foo'];"));
    // No setup statements remain, so no setup function is emitted
    assert!(!code.contains("__sfc_main.setup"));
}

#[test]
fn it_derives_typed_props_and_hoists_types() {
    let code = run(
        "<script setup lang=\"ts\">interface Props { msg: string }\n\
         const props = defineProps<Props>()</script>\n\
         <template>{{ props.msg }}</template>",
    )
    .expect("Should rewrite");

    assert!(code.contains("const props = __props"));
    assert!(compact(&code).contains("msg:{type:String,required:true}"));

    let interface_pos = code.find("interface Props").expect("Interface should be hoisted");
    let main_pos = code.find("const __sfc_main").expect("Main binding");
    assert!(interface_pos < main_pos);

    // The new opening tag keeps the language attribute
    assert!(code.contains("<script lang=\"ts\">"));
}

#[test]
fn it_merges_with_defaults() {
    let code = run(
        "<script setup lang=\"ts\">interface Props { msg?: string }\n\
         const props = withDefaults(defineProps<Props>(), { msg: 'hello' })</script>",
    )
    .expect("Should rewrite");

    assert!(compact(&code).contains("required:false"));
    assert!(compact(&code).contains("default:'hello'"));
}

#[test]
fn it_registers_components_case_flexibly() {
    let code = run(
        "<script setup>import DynamicStyle from './DynamicStyle.vue'</script>\n\
         <template><dynamic-style></dynamic-style><button></button></template>",
    )
    .expect("Should rewrite");

    assert!(code.contains("import DynamicStyle from './DynamicStyle.vue'"));
    assert!(compact(&code)
        .contains("__sfc_main.components=Object.assign({DynamicStyle},__sfc_main.components);"));

    // Built-in tags never become components
    assert!(!code.contains("Button"));
}

#[test]
fn it_registers_directives() {
    let code = run(
        "<script setup>const vFocus = { inserted: (el) => el.focus() }</script>\n\
         <template><input v-focus></template>",
    )
    .expect("Should rewrite");

    assert!(compact(&code)
        .contains("__sfc_main.directives=Object.assign({focus:vFocus},__sfc_main.directives);"));
}

#[test]
fn it_merges_the_plain_script_default_export() {
    let code = run(
        "<script>export default { name: 'Comp' }</script>\n\
         <script setup>const a = 1</script>\n\
         <template>{{ a }}</template>",
    )
    .expect("Should rewrite");

    assert!(compact(&code).contains("const__sfc_main={name:'Comp'}"));
    // The plain script region is removed, only one script block remains
    assert_eq!(1, code.matches("<script").count());
    assert_eq!(1, code.matches("</script>").count());
}

#[test]
fn it_supports_define_expose() {
    let code = run(
        "<script setup>const a = 1\ndefineExpose({ manual: a })</script>\n\
         <template>{{ a }}</template>",
    )
    .expect("Should rewrite");

    assert!(compact(&code).contains("returnObject.assign({a},{manual:a});"));
}

#[test]
fn it_rejects_language_mismatches() {
    let error = run_err(
        "<script setup>const a = 1</script><script lang=\"ts\">export default {}</script>",
    );

    assert!(matches!(
        error,
        CompileError::Parse(e) if matches!(e.kind, ParseErrorKind::LangMismatch)
    ));
}

#[test]
fn it_rejects_duplicate_define_props_calls() {
    let error = run_err("<script setup>defineProps(['a'])\ndefineProps(['b'])</script>");
    assert_eq!(ScriptErrorKind::DuplicateDefineProps, script_error_kind(error));
}

#[test]
fn it_rejects_top_level_await() {
    let error = run_err("<script setup>await load()</script>");
    assert_eq!(ScriptErrorKind::TopLevelAwait, script_error_kind(error));

    // Awaits inside functions are fine
    assert!(run("<script setup>const f = async () => { await load() }</script>").is_some());
}

#[test]
fn it_is_idempotent() {
    let input = "<script setup>const a = 1</script>\n<template>{{ a }}</template>";
    let first = run(input).expect("Should rewrite");

    // The rewritten file contains no setup-marked region, so a second
    // pass is a no-op
    let second = transform(&first, Some("test.vue"), &TransformOptions::default())
        .expect("Second pass should succeed");
    assert!(second.is_none());
}

#[test]
fn it_skips_files_without_applicable_syntax() {
    assert!(run("<script>export default {}</script><template>{{ a }}</template>").is_none());
    assert!(run("export const x = 1").is_none());
}

#[test]
fn it_returns_the_sentinel_for_vacuous_setups() {
    assert!(run("<script setup></script>").is_none());
}

#[test]
fn it_detects_setup_tags_flexibly() {
    let options = TransformOptions::default();

    assert!(should_transform("<script setup></script>", &options));
    assert!(should_transform("<script lang=\"ts\" setup></script>", &options));
    assert!(should_transform("<script setup lang=\"ts\"></script>", &options));
    assert!(should_transform("<script\n  lang=\"ts\"\n  setup\n>\n</script>", &options));

    assert!(!should_transform("<script></script>", &options));
    assert!(!should_transform("<script-setup>", &options));
}

#[test]
fn it_expands_reactivity_sugar_when_enabled() {
    let input = "<script setup>let c = $ref(0)\nconst double = $computed(() => c * 2)</script>\n\
                 <template><button @click=\"c++\">{{ double }}</button></template>";

    let options = TransformOptions {
        reactivity_transform: true,
        ..Default::default()
    };

    let code = transform(input, Some("test.vue"), &options)
        .expect("Transform should succeed")
        .expect("Should rewrite")
        .code;

    assert!(code.contains(
        "import { ref as _ref, computed as _computed } from \"@vue/composition-api\""
    ));
    assert!(code.contains("let c = _ref(0)"));
    assert!(compact(&code).contains("c.value*2"));

    // Both bindings are template-referenced and returned
    let return_body = return_object_of(&code);
    assert!(return_body.contains('c'));
    assert!(return_body.contains("double"));
}

#[test]
fn it_treats_unpreprocessed_dialect_templates_as_empty() {
    let code = run(
        "<template lang=\"pug\">div {{ a }}</template>\n<script setup>const a = 1</script>",
    )
    .expect("Should rewrite");

    // No references were discovered, so nothing is returned from setup
    assert!(compact(&code).contains("return{};"));
}

#[test]
fn it_produces_a_source_map_for_untouched_spans() {
    let input = "<template><p>{{ a }}</p></template>\n<script setup>const a = 1</script>";

    let result = transform(input, Some("test.vue"), &TransformOptions::default())
        .expect("Transform should succeed")
        .expect("Should rewrite");

    let map = result.map.expect("Source maps are on by default");

    // The template region precedes the rewritten script and maps 1:1
    assert_eq!(
        Some(ByteOffset::from(5)),
        map.original_position(ByteOffset::from(5))
    );

    // Positions inside the generated block have no original
    let generated_pos = result.code.find("__sfc_main").expect("generated code") as u32;
    assert_eq!(None, map.original_position(ByteOffset::from(generated_pos)));
}

#[test]
fn it_can_disable_source_maps() {
    let options = TransformOptions {
        source_map: false,
        ..Default::default()
    };

    let result = transform(
        "<script setup>const a = 1</script>\n<template>{{ a }}</template>",
        None,
        &options,
    )
    .expect("Transform should succeed")
    .expect("Should rewrite");

    assert!(result.map.is_none());
}

/// Extracts the body of the `return { ... }` statement of the setup fn
fn return_object_of(code: &str) -> &str {
    let start = code.find("return").expect("Setup should contain a return");
    let rest = &code[start..];
    let open = rest.find('{').expect("Return should contain an object");
    let close = rest.find('}').expect("Return object should close");
    &rest[open + 1..close]
}
