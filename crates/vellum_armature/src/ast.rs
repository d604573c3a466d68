//! Template AST.
//!
//! Nodes live in a flat arena owned by [`TemplateAst`] and refer to each
//! other by [`NodeId`]. Offsets are byte offsets into the parsed source.

use serde::Serialize;
use vellum_carton::CompactString;

/// Index of a node in its [`TemplateAst`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub u32);

/// Half-open byte range in the template source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct SourceSpan {
    pub start: u32,
    pub end: u32,
}

impl SourceSpan {
    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start as u32,
            end: end as u32,
        }
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Parsed template.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TemplateAst {
    /// Text the spans refer to
    pub source: String,
    /// Node arena
    pub nodes: Vec<Node>,
    /// Top-level nodes in document order
    pub children: Vec<NodeId>,
}

impl TemplateAst {
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn element(&self, id: NodeId) -> Option<&ElementNode> {
        match self.node(id) {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Source text of a span.
    #[inline]
    pub fn text(&self, span: SourceSpan) -> &str {
        self.source
            .get(span.start as usize..span.end as usize)
            .unwrap_or_default()
    }

    /// Children of `id`, or the top level when `id` is `None`.
    pub fn children_of(&self, id: Option<NodeId>) -> &[NodeId] {
        match id {
            None => &self.children,
            Some(id) => match self.node(id) {
                Node::Element(el) => &el.children,
                _ => &[],
            },
        }
    }

    /// Every element in document order.
    pub fn elements(&self) -> impl Iterator<Item = (NodeId, &ElementNode)> {
        let mut order = Vec::new();
        let mut stack: Vec<NodeId> = self.children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let Node::Element(el) = self.node(id) {
                order.push((id, el));
                stack.extend(el.children.iter().rev().copied());
            }
        }
        order.into_iter()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Node {
    Element(ElementNode),
    Text(TextNode),
    Interpolation(InterpolationNode),
    Comment(CommentNode),
}

impl Node {
    #[inline]
    pub fn loc(&self) -> SourceSpan {
        match self {
            Node::Element(n) => n.loc,
            Node::Text(n) => n.loc,
            Node::Interpolation(n) => n.loc,
            Node::Comment(n) => n.loc,
        }
    }

    /// Text or comment that consists of whitespace only.
    pub fn is_blank(&self, ast: &TemplateAst) -> bool {
        match self {
            Node::Text(n) => ast.text(n.loc).trim().is_empty(),
            Node::Comment(_) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ElementType {
    Element,
    Component,
    Slot,
    Template,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementNode {
    pub tag: CompactString,
    pub tag_type: ElementType,
    /// Tag name in the opening tag
    pub tag_loc: SourceSpan,
    /// Tag name in the closing tag
    pub end_tag_loc: Option<SourceSpan>,
    /// From `<` of the opening tag through the end of the element
    pub loc: SourceSpan,
    pub props: Vec<PropNode>,
    pub children: Vec<NodeId>,
    pub is_self_closing: bool,
}

impl ElementNode {
    pub fn attribute(&self, name: &str) -> Option<&AttributeNode> {
        self.props.iter().find_map(|p| match p {
            PropNode::Attribute(attr) if attr.name == name => Some(attr),
            _ => None,
        })
    }

    pub fn directive(&self, name: &str) -> Option<&DirectiveNode> {
        self.props.iter().find_map(|p| match p {
            PropNode::Directive(dir) if dir.name == name => Some(dir),
            _ => None,
        })
    }

    pub fn directives(&self) -> impl Iterator<Item = &DirectiveNode> {
        self.props.iter().filter_map(|p| match p {
            PropNode::Directive(dir) => Some(dir),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum PropNode {
    Attribute(AttributeNode),
    Directive(DirectiveNode),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeNode {
    pub name: CompactString,
    pub name_loc: SourceSpan,
    /// Value without quotes
    pub value: Option<SourceSpan>,
    pub loc: SourceSpan,
}

/// A directive such as `v-if="ok"`, `:title="t"`, `@click.stop="go"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectiveNode {
    /// Normalized name without prefix (`bind`, `on`, `slot`, `if`, ...)
    pub name: CompactString,
    /// Attribute name as written
    pub raw_name: CompactString,
    pub name_loc: SourceSpan,
    pub arg: Option<DirectiveArg>,
    pub modifiers: Vec<SourceSpan>,
    /// Expression without quotes
    pub exp: Option<SourceSpan>,
    pub loc: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectiveArg {
    /// Argument text; for dynamic arguments, the expression inside `[]`
    pub loc: SourceSpan,
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextNode {
    pub loc: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterpolationNode {
    /// Trimmed expression
    pub content: SourceSpan,
    /// From `{{` through `}}`
    pub loc: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentNode {
    pub loc: SourceSpan,
}
