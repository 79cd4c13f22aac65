pub mod doc;

use std::fmt;

use crate::text::TextRange;

pub use doc::{Doc, DocParam};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Visibility {
    #[default]
    Default,
    Private,
    Public,
}

impl Visibility {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "private" => Some(Visibility::Private),
            "public" => Some(Visibility::Public),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Modifier {
    #[default]
    None,
    Constant,
    Static,
    Stub,
}

impl Modifier {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "constant" => Some(Modifier::Constant),
            "static" => Some(Modifier::Static),
            "stub" => Some(Modifier::Stub),
            _ => None,
        }
    }
}

/// A `//` comment line, kept to document the declaration that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineComment {
    /// The comment text including the leading `//`.
    pub text: String,
    pub range: TextRange,
}

/// A formal parameter: `integer a`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Take {
    pub ty: String,
    pub name: Option<String>,
    pub range: TextRange,
}

impl fmt::Display for Take {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} {}", self.ty, name),
            None => f.write_str(&self.ty),
        }
    }
}

/// Shared view over every declaration kind.
pub trait Declaration {
    fn name(&self) -> Option<&str>;
    fn range(&self) -> TextRange;
    fn comments(&self) -> &[LineComment];

    /// Documentation gathered from the leading comments.
    fn doc(&self) -> Doc {
        Doc::from_comments(self.comments())
    }
}

macro_rules! impl_declaration {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Declaration for $ty {
                fn name(&self) -> Option<&str> {
                    self.name.as_deref()
                }

                fn range(&self) -> TextRange {
                    self.range
                }

                fn comments(&self) -> &[LineComment] {
                    &self.comments
                }
            }
        )*
    };
}

impl_declaration!(Global, Local, Member, Native, Func, Method, Struct, Library, TypeDecl);

/// A variable declared inside a `globals` block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Global {
    pub visibility: Visibility,
    /// `None` or `Constant`.
    pub modifier: Modifier,
    pub ty: Option<String>,
    pub is_array: bool,
    pub name: Option<String>,
    pub comments: Vec<LineComment>,
    pub range: TextRange,
}

impl Global {
    pub fn is_constant(&self) -> bool {
        self.modifier == Modifier::Constant
    }
}

/// A `local` variable in a function or method body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Local {
    /// `None` or `Constant`.
    pub modifier: Modifier,
    pub ty: Option<String>,
    pub is_array: bool,
    pub name: Option<String>,
    pub comments: Vec<LineComment>,
    pub range: TextRange,
}

impl Local {
    pub fn is_constant(&self) -> bool {
        self.modifier == Modifier::Constant
    }
}

/// A struct field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Member {
    pub visibility: Visibility,
    /// `None`, `Static` or `Stub`.
    pub modifier: Modifier,
    /// `static constant integer MAX = 5`.
    pub is_constant: bool,
    pub is_readonly: bool,
    pub ty: Option<String>,
    pub is_array: bool,
    pub name: Option<String>,
    pub comments: Vec<LineComment>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Native {
    pub is_constant: bool,
    pub name: Option<String>,
    pub takes: Vec<Take>,
    pub returns: Option<String>,
    pub comments: Vec<LineComment>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Func {
    pub visibility: Visibility,
    pub is_constant: bool,
    pub name: Option<String>,
    pub takes: Vec<Take>,
    pub returns: Option<String>,
    pub comments: Vec<LineComment>,
    /// The whole block, header to `endfunction`.
    pub range: TextRange,
    pub locals: Vec<Local>,
    /// Variables from `globals` blocks nested in the body.
    pub globals: Vec<Global>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Method {
    pub visibility: Visibility,
    /// `None`, `Static` or `Stub`.
    pub modifier: Modifier,
    pub name: Option<String>,
    pub takes: Vec<Take>,
    pub returns: Option<String>,
    pub comments: Vec<LineComment>,
    pub range: TextRange,
    pub locals: Vec<Local>,
    pub globals: Vec<Global>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Struct {
    pub visibility: Visibility,
    pub name: Option<String>,
    pub extends: Vec<String>,
    pub members: Vec<Member>,
    pub methods: Vec<Method>,
    pub comments: Vec<LineComment>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Library {
    pub name: Option<String>,
    pub initializer: Option<String>,
    /// Required library names, in source order, without `optional`.
    pub requires: Vec<String>,
    pub globals: Vec<Global>,
    pub functions: Vec<Func>,
    pub structs: Vec<Struct>,
    pub comments: Vec<LineComment>,
    pub range: TextRange,
}

/// `type NAME extends PARENT`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeDecl {
    pub name: Option<String>,
    pub extends: Option<String>,
    pub comments: Vec<LineComment>,
    pub range: TextRange,
}
