//! Template expressions rewritten against the component context.

use vellum_carton::general::{is_js_global, is_js_keyword};
use vellum_carton::js::{tokenize, Token, TokenKind};
use vellum_carton::{CompactString, FxHashSet, SmallVec};
use vellum_mapping::CodeFeatures;

use super::context::TemplateCodegenContext;
use crate::codes::Codes;

const CTX_ACCESS: &str = "__VLS_ctx.";

/// Emit `code` with `__VLS_ctx.` in front of every free identifier.
///
/// The expression text is copied in mapped chunks starting at `offset`; the
/// inserted accessors are unmapped.
pub fn generate_interpolation<'a>(
    codes: &mut Codes<'a>,
    ctx: &TemplateCodegenContext,
    source_key: &str,
    features: CodeFeatures,
    code: &'a str,
    offset: Option<u32>,
) {
    let tokens = tokenize(code);
    let params = arrow_params(code, &tokens);

    // `true` for braces that open an object literal
    let mut brackets: SmallVec<[(u8, bool); 8]> = SmallVec::new();
    let mut cursor = 0usize;

    for (i, token) in tokens.iter().enumerate() {
        let prev = i.checked_sub(1).map(|p| &tokens[p]);
        let next = tokens.get(i + 1);

        if token.kind == TokenKind::Punct {
            match token.text(code) {
                "(" => brackets.push((b'(', false)),
                "[" => brackets.push((b'[', false)),
                "{" => {
                    let block = prev.is_some_and(|p| p.is_punct(code, "=>") || p.is_punct(code, ")"));
                    brackets.push((b'{', !block));
                }
                ")" | "]" | "}" => {
                    brackets.pop();
                }
                _ => {}
            }
            continue;
        }
        if token.kind != TokenKind::Ident {
            continue;
        }

        let name = token.text(code);
        if prev.is_some_and(|p| p.is_punct(code, ".") || p.is_punct(code, "?.")) {
            continue;
        }
        if is_js_keyword(name) || is_js_global(name) || name == "$event" {
            continue;
        }
        if ctx.is_local(name) || params.contains(name) {
            continue;
        }

        let in_object = brackets.last().is_some_and(|(_, object)| *object);
        let key_position =
            in_object && prev.is_some_and(|p| p.is_punct(code, "{") || p.is_punct(code, ","));
        if key_position && next.is_some_and(|n| n.is_punct(code, ":")) {
            continue;
        }
        let shorthand =
            key_position && next.is_some_and(|n| n.is_punct(code, "}") || n.is_punct(code, ","));

        let start = token.start as usize;
        push_chunk(codes, code, cursor, start, source_key, offset, features);
        if shorthand {
            codes.maybe_mapped(name, source_key, offset.map(|o| o + token.start), features);
            codes.text(": ");
        }
        codes.text(CTX_ACCESS);
        cursor = start;
    }

    push_chunk(codes, code, cursor, code.len(), source_key, offset, features);
}

fn push_chunk<'a>(
    codes: &mut Codes<'a>,
    code: &'a str,
    start: usize,
    end: usize,
    source_key: &str,
    offset: Option<u32>,
    features: CodeFeatures,
) {
    if start >= end {
        return;
    }
    codes.maybe_mapped(
        &code[start..end],
        source_key,
        offset.map(|o| o + start as u32),
        features,
    );
}

/// Names bound by arrow function parameters anywhere in `code`.
fn arrow_params<'s>(code: &'s str, tokens: &[Token]) -> FxHashSet<&'s str> {
    let mut params = FxHashSet::default();
    for (i, token) in tokens.iter().enumerate() {
        if !token.is_punct(code, "=>") || i == 0 {
            continue;
        }
        let prev = &tokens[i - 1];
        if prev.kind == TokenKind::Ident {
            params.insert(prev.text(code));
            continue;
        }
        if !prev.is_punct(code, ")") {
            continue;
        }
        let mut depth = 0usize;
        let mut open = None;
        for j in (0..i).rev() {
            let t = &tokens[j];
            if t.is_punct(code, ")") || t.is_punct(code, "]") || t.is_punct(code, "}") {
                depth += 1;
            } else if t.is_punct(code, "(") || t.is_punct(code, "[") || t.is_punct(code, "{") {
                depth -= 1;
                if depth == 0 {
                    open = Some(j);
                    break;
                }
            }
        }
        if let Some(open) = open {
            params.extend(binding_names_in(code, &tokens[open..i]));
        }
    }
    params
}

/// Names bound by a destructuring pattern or parameter list such as
/// `(item, index)` or `{ a: b, c }`.
pub fn collect_binding_names(pattern: &str) -> Vec<CompactString> {
    let tokens = tokenize(pattern);
    binding_names_in(pattern, &tokens)
        .map(CompactString::new)
        .collect()
}

fn binding_names_in<'s, 't>(
    code: &'s str,
    tokens: &'t [Token],
) -> impl Iterator<Item = &'s str> + 't
where
    's: 't,
{
    tokens.iter().enumerate().filter_map(move |(i, token)| {
        if token.kind != TokenKind::Ident {
            return None;
        }
        let binds_after = match i.checked_sub(1).map(|p| tokens[p].text(code)) {
            None => true,
            Some(prev) => matches!(prev, "(" | "," | "{" | "[" | "..." | ":"),
        };
        let is_key = tokens.get(i + 1).is_some_and(|n| n.is_punct(code, ":"));
        (binds_after && !is_key).then(|| token.text(code))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(code: &str, locals: &[&str]) -> String {
        let mut ctx = TemplateCodegenContext::new();
        ctx.add_locals(locals.iter().copied());
        let mut codes = Codes::new();
        generate_interpolation(&mut codes, &ctx, "template", CodeFeatures::ALL, code, Some(0));
        codes.to_text()
    }

    #[test]
    fn test_prefix_free_identifiers() {
        assert_eq!(render("count + 1", &[]), "__VLS_ctx.count + 1");
        assert_eq!(render("user.name", &[]), "__VLS_ctx.user.name");
        assert_eq!(render("a?.b(c)", &[]), "__VLS_ctx.a?.b(__VLS_ctx.c)");
    }

    #[test]
    fn test_skip_globals_keywords_and_locals() {
        assert_eq!(
            render("Math.max(item, n) || true", &["item"]),
            "Math.max(item, __VLS_ctx.n) || true"
        );
        assert_eq!(render("go($event)", &[]), "__VLS_ctx.go($event)");
        assert_eq!(
            render("typeof x === 'string'", &[]),
            "typeof __VLS_ctx.x === 'string'"
        );
    }

    #[test]
    fn test_object_literal_keys_and_shorthand() {
        assert_eq!(
            render("{ active: isActive, size }", &[]),
            "{ active: __VLS_ctx.isActive, size: __VLS_ctx.size }"
        );
    }

    #[test]
    fn test_arrow_params() {
        assert_eq!(
            render("items.map((x, i) => x + i + offset)", &[]),
            "__VLS_ctx.items.map((x, i) => x + i + __VLS_ctx.offset)"
        );
        assert_eq!(render("e => save(e)", &[]), "e => __VLS_ctx.save(e)");
    }

    #[test]
    fn test_template_literal() {
        assert_eq!(render("`${a}-b`", &[]), "`${__VLS_ctx.a}-b`");
    }

    #[test]
    fn test_mapped_chunks_keep_offsets() {
        let ctx = TemplateCodegenContext::new();
        let mut codes = Codes::new();
        generate_interpolation(&mut codes, &ctx, "template", CodeFeatures::ALL, "a + b", Some(40));
        let built = codes.finish();
        assert_eq!(built.text, "__VLS_ctx.a + __VLS_ctx.b");
        let sources: Vec<(u32, u32, u32)> = built
            .mapper
            .ranges()
            .iter()
            .map(|r| (r.generated_start, r.source_start, r.source_len()))
            .collect();
        assert_eq!(sources, vec![(10, 40, 4), (24, 44, 1)]);
    }

    #[test]
    fn test_collect_binding_names() {
        assert_eq!(collect_binding_names("(item, index)"), vec!["item", "index"]);
        assert_eq!(collect_binding_names("{ a: b, c }"), vec!["b", "c"]);
        assert_eq!(collect_binding_names("props"), vec!["props"]);
    }
}
