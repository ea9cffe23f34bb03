//! The tagged syntax tree shared by the parser and the evaluator.
//!
//! A [`Node`] is either a leaf carrying literal text or a branch owning an
//! ordered list of children. Every node carries a [`Tag`] naming the grammar
//! rule that produced it; the evaluator dispatches on tags only and never
//! re-inspects operator text.

use serde::{Deserialize, Serialize};
use std::fmt;

// ══════════════════════════════════════════════════════════════════════════════
// Tags
// ══════════════════════════════════════════════════════════════════════════════

/// Label attached to every node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    /// A single matched character (`(`, `)`, `=`, operators).
    Char,
    /// Reserved: skipped or delimiting text. Renders as nothing.
    Whitespace,
    Number,
    Variable,
    ArgumentDelimiter,

    Expression,
    Sum,
    Multiplication,
    Terms,
    Term,
    OpAdd,
    OpMinus,
    OpMult,
    OpDiv,
    Unit,

    FunctionCall,
    Arguments,
    Argument,
    Parameters,
    Parameter,
    VariableDeclaration,
    FunctionDeclaration,
    Line,
    Lines,
}

impl Tag {
    /// The tag's name as it appears in rendered trees.
    pub fn name(self) -> &'static str {
        match self {
            Self::Char => "Char",
            Self::Whitespace => "Whitespace",
            Self::Number => "Number",
            Self::Variable => "Variable",
            Self::ArgumentDelimiter => "ArgumentDelimiter",
            Self::Expression => "Expression",
            Self::Sum => "Sum",
            Self::Multiplication => "Multiplication",
            Self::Terms => "Terms",
            Self::Term => "Term",
            Self::OpAdd => "OpAdd",
            Self::OpMinus => "OpMinus",
            Self::OpMult => "OpMult",
            Self::OpDiv => "OpDiv",
            Self::Unit => "Unit",
            Self::FunctionCall => "FunctionCall",
            Self::Arguments => "Arguments",
            Self::Argument => "Argument",
            Self::Parameters => "Parameters",
            Self::Parameter => "Parameter",
            Self::VariableDeclaration => "VariableDeclaration",
            Self::FunctionDeclaration => "FunctionDeclaration",
            Self::Line => "Line",
            Self::Lines => "Lines",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Nodes
// ══════════════════════════════════════════════════════════════════════════════

/// A node of the syntax tree.
///
/// Exactly one of literal text or children is populated, which the enum
/// shape enforces. Children are owned; the tree has no sharing and no cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Leaf { tag: Tag, value: String },
    Branch { tag: Tag, children: Vec<Node> },
}

impl Node {
    /// Create a leaf node.
    pub fn leaf(tag: Tag, value: impl Into<String>) -> Self {
        Self::Leaf {
            tag,
            value: value.into(),
        }
    }

    /// Create a branch node.
    pub fn branch(tag: Tag, children: Vec<Node>) -> Self {
        Self::Branch { tag, children }
    }

    pub fn tag(&self) -> Tag {
        match self {
            Self::Leaf { tag, .. } | Self::Branch { tag, .. } => *tag,
        }
    }

    /// Literal text of a leaf; `None` for branches.
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Leaf { value, .. } => Some(value),
            Self::Branch { .. } => None,
        }
    }

    /// Children of a branch; empty for leaves.
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Leaf { .. } => &[],
            Self::Branch { children, .. } => children,
        }
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children().get(index)
    }

    pub fn is_whitespace(&self) -> bool {
        self.tag() == Tag::Whitespace
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn size(&self) -> usize {
        1 + self.children().iter().map(Node::size).sum::<usize>()
    }
}

/// Renders the tree in its compact bracketed form, e.g.
/// `Sum[1 Terms[Term[OpAdd[+] 2]]]`.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            _ if self.is_whitespace() => Ok(()),
            Self::Leaf { value, .. } => f.write_str(value),
            Self::Branch { tag, children } => {
                write!(f, "{tag}[")?;
                for (i, child) in children.iter().enumerate() {
                    // Single characters sit flush against their neighbour.
                    if i > 0 && child.tag() != Tag::Char {
                        f.write_str(" ")?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str("]")
            }
        }
    }
}
