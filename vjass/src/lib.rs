pub mod block;
pub mod decl;
pub mod directive;
pub mod lexer;
pub mod parser;
pub mod text;
pub mod textmacro;

pub use decl::{
    Declaration, Doc, Func, Global, LineComment, Library, Local, Member, Method, Modifier, Native,
    Struct, Take, TypeDecl, Visibility,
};
pub use parser::{ParseError, ParseOptions, Parser, SubDialectParser};
pub use text::{Position, TextRange};

/// The declarations recovered from one source text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub natives: Vec<Native>,
    pub functions: Vec<Func>,
    pub globals: Vec<Global>,
    pub structs: Vec<Struct>,
    pub libraries: Vec<Library>,
    pub types: Vec<TypeDecl>,
    /// The source file ID (for error reporting with codespan-reporting).
    pub source_id: usize,
}

fn named<'a, T: Declaration + 'a>(items: impl Iterator<Item = &'a T>, name: &str) -> Vec<&'a T> {
    items.filter(|item| item.name() == Some(name)).collect()
}

fn span_lines(range: TextRange) -> usize {
    range.end.line.saturating_sub(range.start.line)
}

impl Program {
    /// Top-level functions followed by those inside libraries.
    pub fn all_functions(&self) -> impl Iterator<Item = &Func> {
        self.functions
            .iter()
            .chain(self.libraries.iter().flat_map(|l| l.functions.iter()))
    }

    pub fn all_globals(&self) -> impl Iterator<Item = &Global> {
        self.globals
            .iter()
            .chain(self.libraries.iter().flat_map(|l| l.globals.iter()))
            .chain(self.all_functions().flat_map(|f| f.globals.iter()))
    }

    pub fn all_structs(&self) -> impl Iterator<Item = &Struct> {
        self.structs
            .iter()
            .chain(self.libraries.iter().flat_map(|l| l.structs.iter()))
    }

    pub fn all_methods(&self) -> impl Iterator<Item = &Method> {
        self.all_structs().flat_map(|s| s.methods.iter())
    }

    pub fn natives_named(&self, name: &str) -> Vec<&Native> {
        named(self.natives.iter(), name)
    }

    pub fn functions_named(&self, name: &str) -> Vec<&Func> {
        named(self.all_functions(), name)
    }

    pub fn globals_named(&self, name: &str) -> Vec<&Global> {
        named(self.all_globals(), name)
    }

    pub fn structs_named(&self, name: &str) -> Vec<&Struct> {
        named(self.all_structs(), name)
    }

    pub fn libraries_named(&self, name: &str) -> Vec<&Library> {
        named(self.libraries.iter(), name)
    }

    pub fn methods_named(&self, name: &str) -> Vec<&Method> {
        named(self.all_methods(), name)
    }

    pub fn members_named(&self, name: &str) -> Vec<&Member> {
        named(self.all_structs().flat_map(|s| s.members.iter()), name)
    }

    pub fn types_named(&self, name: &str) -> Vec<&TypeDecl> {
        named(self.types.iter(), name)
    }

    /// The innermost function whose range contains `position`.
    pub fn function_at(&self, position: Position) -> Option<&Func> {
        self.all_functions()
            .filter(|f| f.range.contains(position))
            .min_by_key(|f| (span_lines(f.range), f.range.start))
    }

    pub fn method_at(&self, position: Position) -> Option<&Method> {
        self.all_methods()
            .filter(|m| m.range.contains(position))
            .min_by_key(|m| (span_lines(m.range), m.range.start))
    }

    /// Append everything in `other`, e.g. the declarations of the zinc blocks.
    pub fn merge(&mut self, other: Program) {
        self.natives.extend(other.natives);
        self.functions.extend(other.functions);
        self.globals.extend(other.globals);
        self.structs.extend(other.structs);
        self.libraries.extend(other.libraries);
        self.types.extend(other.types);
    }

    pub fn is_empty(&self) -> bool {
        self.natives.is_empty()
            && self.functions.is_empty()
            && self.globals.is_empty()
            && self.structs.is_empty()
            && self.libraries.is_empty()
            && self.types.is_empty()
    }
}
