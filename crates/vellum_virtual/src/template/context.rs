//! Per-pass state of the template code generator.

use vellum_armature::{CompileError, ErrorCode, SourceSpan};
use vellum_carton::{CompactString, FxHashMap};

/// A static class name used in the template, in document coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassReference {
    pub name: CompactString,
    pub offset: Option<u32>,
}

/// A `<slot>` outlet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotOutlet {
    pub name: CompactString,
    /// Offset of the `name` attribute value, if written
    pub offset: Option<u32>,
}

/// A static `ref="..."` on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRef {
    pub name: CompactString,
    pub offset: Option<u32>,
    /// TypeScript type of the referenced element
    pub type_text: CompactString,
}

#[derive(Debug, Default)]
pub struct TemplateCodegenContext {
    /// Names bound by `v-for` and slot props, with nesting counts
    locals: FxHashMap<CompactString, u32>,
    pub class_references: Vec<ClassReference>,
    pub slots: Vec<SlotOutlet>,
    pub refs: Vec<TemplateRef>,
    /// Problems found while walking, in AST coordinates
    pub errors: Vec<CompileError>,
}

impl TemplateCodegenContext {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_local(&self, name: &str) -> bool {
        self.locals.get(name).is_some_and(|count| *count > 0)
    }

    pub fn add_locals<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        for name in names {
            *self.locals.entry(name.into()).or_insert(0) += 1;
        }
    }

    pub fn remove_locals<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            if let Some(count) = self.locals.get_mut(name.as_ref()) {
                *count = count.saturating_sub(1);
            }
        }
    }

    pub fn add_slot(&mut self, name: CompactString, offset: Option<u32>) {
        if !self.slots.iter().any(|slot| slot.name == name) {
            self.slots.push(SlotOutlet { name, offset });
        }
    }

    #[inline]
    pub fn error(&mut self, code: ErrorCode, loc: SourceSpan) {
        self.errors.push(CompileError::new(code, loc));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_locals() {
        let mut ctx = TemplateCodegenContext::new();
        ctx.add_locals(["item"]);
        ctx.add_locals(["item", "index"]);
        ctx.remove_locals(["item", "index"]);
        assert!(ctx.is_local("item"));
        assert!(!ctx.is_local("index"));
        ctx.remove_locals(["item"]);
        assert!(!ctx.is_local("item"));
    }

    #[test]
    fn test_slots_are_deduplicated() {
        let mut ctx = TemplateCodegenContext::new();
        ctx.add_slot("default".into(), None);
        ctx.add_slot("default".into(), Some(4));
        assert_eq!(ctx.slots.len(), 1);
        assert_eq!(ctx.slots[0].offset, None);
    }
}
