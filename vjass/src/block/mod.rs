use std::fmt;

use crate::text::{LineRecord, TextRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Globals,
    Function,
    Method,
    Struct,
    Library,
    Zinc,
    /// The implicit root holding top-level content.
    Program,
}

impl BlockKind {
    /// The keyword that closes a block of this kind, if it has one.
    pub fn closer(self) -> Option<&'static str> {
        match self {
            BlockKind::Globals => Some("endglobals"),
            BlockKind::Function => Some("endfunction"),
            BlockKind::Method => Some("endmethod"),
            BlockKind::Struct => Some("endstruct"),
            BlockKind::Library => Some("endlibrary"),
            BlockKind::Zinc | BlockKind::Program => None,
        }
    }

    /// Whether the block stores its header line as the first child.
    pub fn has_header(self) -> bool {
        matches!(
            self,
            BlockKind::Function | BlockKind::Method | BlockKind::Struct | BlockKind::Library
        )
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockKind::Globals => "globals",
            BlockKind::Function => "function",
            BlockKind::Method => "method",
            BlockKind::Struct => "struct",
            BlockKind::Library => "library",
            BlockKind::Zinc => "zinc",
            BlockKind::Program => "program",
        };
        f.write_str(name)
    }
}

/// A child of a block: either a plain line or a nested block.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Line(LineRecord),
    Block(Block),
}

impl Node {
    pub fn range(&self) -> TextRange {
        match self {
            Node::Line(line) => line.range(),
            Node::Block(block) => block.range,
        }
    }
}

/// A nested structural unit recovered from line-start keywords.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    /// From the opener line to the closer line (or the last line absorbed,
    /// for a block that was never closed).
    pub range: TextRange,
    /// Whether a matching closer was found.
    pub closed: bool,
    /// Children in stream order. Headed blocks start with their header line.
    pub children: Vec<Node>,
}

impl Block {
    pub fn new(kind: BlockKind, range: TextRange) -> Self {
        Block {
            kind,
            range,
            closed: false,
            children: Vec::new(),
        }
    }

    /// The header line of a function/method/struct/library block.
    pub fn header(&self) -> Option<&LineRecord> {
        if !self.kind.has_header() {
            return None;
        }
        match self.children.first() {
            Some(Node::Line(line)) => Some(line),
            _ => None,
        }
    }

    /// Children after the header line.
    pub fn body(&self) -> &[Node] {
        if self.header().is_some() {
            &self.children[1..]
        } else {
            &self.children
        }
    }

    /// Nested blocks, depth-first, excluding `self`.
    pub fn descendants(&self) -> Vec<&Block> {
        let mut out = Vec::new();
        for child in &self.children {
            if let Node::Block(block) = child {
                out.push(block);
                out.extend(block.descendants());
            }
        }
        out
    }
}
