use phf::{phf_set, Set};

/// HTML tags, including void elements and deprecated ones still parsed
/// by browsers
static HTML_TAGS: Set<&'static str> = phf_set! {
    "a", "abbr", "address", "area", "article", "aside", "audio", "b",
    "base", "bdi", "bdo", "blockquote", "body", "br", "button", "canvas",
    "caption", "cite", "code", "col", "colgroup", "data", "datalist",
    "dd", "del", "details", "dfn", "dialog", "div", "dl", "dt", "em",
    "embed", "fieldset", "figcaption", "figure", "footer", "form", "h1",
    "h2", "h3", "h4", "h5", "h6", "head", "header", "hgroup", "hr",
    "html", "i", "iframe", "img", "input", "ins", "kbd", "label",
    "legend", "li", "link", "main", "map", "mark", "menu", "meta",
    "meter", "nav", "noscript", "object", "ol", "optgroup", "option",
    "output", "p", "param", "picture", "pre", "progress", "q", "rp",
    "rt", "ruby", "s", "samp", "script", "section", "select", "slot",
    "small", "source", "span", "strong", "style", "sub", "summary", "sup",
    "table", "tbody", "td", "template", "textarea", "tfoot", "th",
    "thead", "time", "title", "tr", "track", "u", "ul", "var", "video",
    "wbr",
};

/// SVG tags. These are case-sensitive, hence stored verbatim.
static SVG_TAGS: Set<&'static str> = phf_set! {
    "svg", "animate", "animateMotion", "animateTransform", "circle",
    "clipPath", "defs", "desc", "ellipse", "feBlend", "feColorMatrix",
    "feComponentTransfer", "feComposite", "feConvolveMatrix",
    "feDiffuseLighting", "feDisplacementMap", "feDistantLight",
    "feDropShadow", "feFlood", "feFuncA", "feFuncB", "feFuncG",
    "feFuncR", "feGaussianBlur", "feImage", "feMerge", "feMergeNode",
    "feMorphology", "feOffset", "fePointLight", "feSpecularLighting",
    "feSpotLight", "feTile", "feTurbulence", "filter", "foreignObject",
    "g", "image", "line", "linearGradient", "marker", "mask", "metadata",
    "mpath", "path", "pattern", "polygon", "polyline", "radialGradient",
    "rect", "set", "stop", "switch", "symbol", "text", "textPath",
    "tspan", "use", "view",
};

/// Checks whether a tag is a built-in HTML or SVG tag.
/// HTML tag names are matched case-insensitively, SVG names verbatim.
pub fn is_native_tag(tag: &str) -> bool {
    if HTML_TAGS.contains(tag) || SVG_TAGS.contains(tag) {
        return true;
    }

    let lowercased = tag.to_ascii_lowercase();
    HTML_TAGS.contains(lowercased.as_str())
}
