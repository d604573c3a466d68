//! Virtual code: generated text, its mapper and embedded children.

use vellum_armature::CompileError;
use vellum_carton::hash::content_hash;
use vellum_carton::CompactString;
use vellum_mapping::{BuiltCode, CodeFeatures, MappedRange, Mapper, MappingComposer, Segment};
use vellum_sfc::BlockLocation;

/// One generated (or copied) text handed to a language service.
///
/// The mapper of every code maps its text to document offsets.
#[derive(Debug, Clone, Default)]
pub struct VirtualCode {
    pub id: CompactString,
    pub language_id: CompactString,
    pub text: String,
    pub mapper: Mapper,
    pub embedded: Vec<VirtualCode>,
    /// Features of the code as a whole
    pub features: CodeFeatures,
    /// Template compile errors in document coordinates
    pub diagnostics: Vec<CompileError>,
}

impl VirtualCode {
    pub fn new(
        id: impl Into<CompactString>,
        language_id: impl Into<CompactString>,
        built: BuiltCode,
    ) -> Self {
        Self {
            id: id.into(),
            language_id: language_id.into(),
            text: built.text,
            mapper: built.mapper,
            embedded: Vec::new(),
            features: CodeFeatures::ALL,
            diagnostics: Vec::new(),
        }
    }

    /// The document itself, mapped onto itself.
    pub fn root(language_id: impl Into<CompactString>, content: &str) -> Self {
        let len = content.len() as u32;
        Self {
            id: CompactString::new("root"),
            language_id: language_id.into(),
            text: content.to_owned(),
            mapper: Mapper::new(vec![MappedRange::new(0, 0, len, CodeFeatures::ALL)]),
            embedded: Vec::new(),
            features: CodeFeatures::ALL,
            diagnostics: Vec::new(),
        }
    }

    /// Section content copied verbatim.
    pub fn from_section(
        id: impl Into<CompactString>,
        language_id: impl Into<CompactString>,
        content: &str,
        loc: BlockLocation,
        source_key: &str,
    ) -> Self {
        let segment = Segment::mapped(content, loc.start, CodeFeatures::ALL).with_source_key(source_key);
        Self::new(id, language_id, vellum_mapping::build_mappings([&segment]))
    }

    /// Depth-first lookup by id, including `self`.
    pub fn find(&self, id: &str) -> Option<&VirtualCode> {
        if self.id == id {
            return Some(self);
        }
        self.embedded.iter().find_map(|code| code.find(id))
    }

    /// Every descendant, depth first.
    pub fn descendants(&self) -> Vec<&VirtualCode> {
        let mut out = Vec::new();
        let mut stack: Vec<&VirtualCode> = self.embedded.iter().rev().collect();
        while let Some(code) = stack.pop() {
            out.push(code);
            stack.extend(code.embedded.iter().rev());
        }
        out
    }

    /// Document offset of a generated offset.
    #[inline]
    pub fn to_document_offset(&self, offset: u32) -> Option<u32> {
        MappingComposer::new([&self.mapper]).resolve(offset)
    }

    /// First generated offset of a document offset.
    #[inline]
    pub fn to_generated_offset(&self, offset: u32) -> Option<u32> {
        self.mapper.first_generated(offset)
    }

    /// Content fingerprint of the generated text.
    #[inline]
    pub fn fingerprint(&self) -> String {
        content_hash(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_identity() {
        let root = VirtualCode::root("vue", "<template></template>");
        assert_eq!(root.to_document_offset(0), Some(0));
        assert_eq!(root.to_document_offset(21), Some(21));
        assert_eq!(root.to_generated_offset(5), Some(5));
    }

    #[test]
    fn test_from_section() {
        let code = VirtualCode::from_section(
            "style_0",
            "css",
            ".a {}",
            BlockLocation::new(30, 35),
            "style_0",
        );
        assert_eq!(code.text, ".a {}");
        assert_eq!(code.to_document_offset(1), Some(31));
        assert_eq!(code.mapper.ranges()[0].source_key.as_deref(), Some("style_0"));
    }

    #[test]
    fn test_find_and_descendants() {
        let mut root = VirtualCode::root("vue", "");
        let mut template = VirtualCode::root("html", "");
        template.id = "template".into();
        let mut inner = VirtualCode::root("css", "");
        inner.id = "inner".into();
        template.embedded.push(inner);
        root.embedded.push(template);

        assert_eq!(root.find("inner").map(|c| c.language_id.as_str()), Some("css"));
        let ids: Vec<&str> = root.descendants().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["template", "inner"]);
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = VirtualCode::root("vue", "same");
        let b = VirtualCode::root("vue", "same");
        assert_eq!(a.fingerprint(), b.fingerprint());
    }
}
