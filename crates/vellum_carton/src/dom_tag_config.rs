//! Tag classification for the template language.

use phf::phf_set;

static HTML_TAGS: phf::Set<&'static str> = phf_set! {
    "html", "body", "base", "head", "link", "meta", "style", "title", "address", "article",
    "aside", "footer", "header", "hgroup", "h1", "h2", "h3", "h4", "h5", "h6", "nav",
    "section", "div", "dd", "dl", "dt", "figcaption", "figure", "picture", "hr", "img",
    "li", "main", "ol", "p", "pre", "ul", "a", "b", "abbr", "bdi", "bdo", "br", "cite",
    "code", "data", "dfn", "em", "i", "kbd", "mark", "q", "rp", "rt", "ruby", "s", "samp",
    "small", "span", "strong", "sub", "sup", "time", "u", "var", "wbr", "area", "audio",
    "map", "track", "video", "embed", "object", "param", "source", "canvas", "script",
    "noscript", "del", "ins", "caption", "col", "colgroup", "table", "thead", "tbody",
    "td", "th", "tr", "button", "datalist", "fieldset", "form", "input", "label",
    "legend", "meter", "optgroup", "option", "output", "progress", "select", "textarea",
    "details", "dialog", "menu", "summary", "template", "blockquote", "iframe", "tfoot",
    "search", "slot",
};

static SVG_TAGS: phf::Set<&'static str> = phf_set! {
    "svg", "animate", "animateMotion", "animateTransform", "circle", "clipPath",
    "color-profile", "defs", "desc", "discard", "ellipse", "feBlend", "feColorMatrix",
    "feComponentTransfer", "feComposite", "feConvolveMatrix", "feDiffuseLighting",
    "feDisplacementMap", "feDistantLight", "feDropShadow", "feFlood", "feFuncA",
    "feFuncB", "feFuncG", "feFuncR", "feGaussianBlur", "feImage", "feMerge",
    "feMergeNode", "feMorphology", "feOffset", "fePointLight", "feSpecularLighting",
    "feSpotLight", "feTile", "feTurbulence", "filter", "foreignObject", "g", "hatch",
    "hatchpath", "image", "line", "linearGradient", "marker", "mask", "mesh",
    "meshgradient", "meshpatch", "meshrow", "metadata", "mpath", "path", "pattern",
    "polygon", "polyline", "radialGradient", "rect", "set", "solidcolor", "stop",
    "switch", "symbol", "text", "textPath", "tspan", "unknown", "use", "view",
};

static VOID_TAGS: phf::Set<&'static str> = phf_set! {
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
};

static BUILT_IN_TAGS: phf::Set<&'static str> = phf_set! {
    "component", "slot", "template", "transition", "transition-group", "Transition",
    "TransitionGroup", "keep-alive", "KeepAlive", "teleport", "Teleport", "suspense",
    "Suspense",
};

#[inline]
pub fn is_html_tag(tag: &str) -> bool {
    HTML_TAGS.contains(tag)
}

#[inline]
pub fn is_svg_tag(tag: &str) -> bool {
    SVG_TAGS.contains(tag)
}

/// Elements that never have children or a closing tag.
#[inline]
pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(&*tag.to_ascii_lowercase())
}

/// Intrinsic elements resolved through the element registry.
#[inline]
pub fn is_native_tag(tag: &str) -> bool {
    is_html_tag(tag) || is_svg_tag(tag)
}

#[inline]
pub fn is_built_in_tag(tag: &str) -> bool {
    BUILT_IN_TAGS.contains(tag)
}

/// Tags resolved through the component registry.
#[inline]
pub fn is_component_tag(tag: &str) -> bool {
    !is_native_tag(tag) && !is_built_in_tag(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(is_html_tag("div"));
        assert!(is_svg_tag("circle"));
        assert!(is_void_tag("INPUT"));
        assert!(!is_void_tag("div"));
        assert!(is_component_tag("MyButton"));
        assert!(is_component_tag("my-button"));
        assert!(!is_component_tag("slot"));
        assert!(!is_component_tag("span"));
    }
}
