//! Serializes the merged component-definition module back to text.

use swc_core::{
    common::{sync::Lrc, SourceMap},
    ecma::ast::Module,
};
use swc_ecma_codegen::{text_writer::JsWriter, Emitter, Node};

pub fn stringify(module: &Module) -> String {
    let cm: Lrc<SourceMap> = Default::default();
    let mut buff: Vec<u8> = Vec::with_capacity(1024);
    let writer: JsWriter<&mut Vec<u8>> = JsWriter::new(cm.clone(), "\n", &mut buff, None);

    let mut emitter_cfg = swc_ecma_codegen::Config::default();
    emitter_cfg.minify = false;
    emitter_cfg.omit_last_semi = false;

    let mut emitter = Emitter {
        cfg: emitter_cfg,
        comments: None,
        wr: writer,
        cm,
    };

    // Writing to a Vec cannot fail
    let _ = module.emit_with(&mut emitter);

    String::from_utf8(buff).unwrap_or_default()
}
