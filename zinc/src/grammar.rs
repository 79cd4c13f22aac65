//! Declaration-level grammar for zinc.
//!
//! Only the declaration skeleton is parsed: libraries, sections, structs,
//! functions, methods and variables. Function bodies are skipped by brace
//! balance, picking up local variable declarations on the way.

use tracing::trace;
use vjass::text::TextRange;
use vjass::{
    Func, Global, LineComment, Library, Local, Member, Method, Modifier, Program, Struct, Take,
    Visibility,
};

use crate::cursor::Cursor;
use crate::error::ZincError;

/// Words that start a statement rather than a local declaration.
const STATEMENT_KEYWORDS: &[&str] = &[
    "if", "else", "while", "whilenot", "for", "do", "return", "break", "debug", "static",
    "method", "function",
];

/// Declarations that are recognized but carry nothing for the model.
const SKIPPED_DECLARATIONS: &[&str] = &[
    "interface", "module", "type", "hook", "implement", "delegate", "optional",
];

enum Item {
    Library(Library),
    Struct(Struct),
    Function(Func),
    Globals(Vec<Global>),
    Skipped,
}

/// One declared variable, before it becomes a global or a member.
struct Variable {
    is_constant: bool,
    ty: String,
    is_array: bool,
    name: String,
    range: TextRange,
}

pub(crate) struct Grammar {
    cursor: Cursor,
}

impl Grammar {
    pub fn new(cursor: Cursor) -> Self {
        Grammar { cursor }
    }

    pub fn program(&mut self) -> Result<Program, ZincError> {
        let mut program = Program::default();
        while !self.cursor.at_end() {
            let comments = self.cursor.take_comments();
            let visibility = self.visibility_prefix().unwrap_or_default();
            match self.item(visibility, comments, true)? {
                Item::Library(library) => program.libraries.push(library),
                Item::Struct(def) => program.structs.push(def),
                Item::Function(func) => program.functions.push(func),
                Item::Globals(globals) => program.globals.extend(globals),
                Item::Skipped => {}
            }
        }
        Ok(program)
    }

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    fn item(
        &mut self,
        visibility: Visibility,
        comments: Vec<LineComment>,
        allow_library: bool,
    ) -> Result<Item, ZincError> {
        let Some(token) = self.cursor.peek().cloned() else {
            return Err(ZincError::eof("a declaration"));
        };

        if token.is_op(";") {
            self.cursor.advance();
            return Ok(Item::Skipped);
        }
        if !token.is_ident() {
            return Err(ZincError::unexpected(&token, "a declaration"));
        }

        match token.text.as_str() {
            "library" | "library_once" if allow_library => {
                Ok(Item::Library(self.library(comments)?))
            }
            "library" | "library_once" => Err(ZincError::unexpected(&token, "a library member")),
            "struct" => Ok(Item::Struct(self.struct_def(visibility, comments)?)),
            "function" => Ok(Item::Function(self.function(visibility, comments)?)),
            word if SKIPPED_DECLARATIONS.contains(&word) => {
                trace!(word, "skipping zinc declaration");
                self.skip_declaration()?;
                Ok(Item::Skipped)
            }
            _ => {
                let globals = self
                    .variables()?
                    .into_iter()
                    .enumerate()
                    .map(|(index, var)| Global {
                        visibility,
                        modifier: if var.is_constant {
                            Modifier::Constant
                        } else {
                            Modifier::None
                        },
                        ty: Some(var.ty),
                        is_array: var.is_array,
                        name: Some(var.name),
                        comments: if index == 0 { comments.clone() } else { Vec::new() },
                        range: var.range,
                    })
                    .collect();
                Ok(Item::Globals(globals))
            }
        }
    }

    /// `public` or `private` in front of a declaration.
    fn visibility_prefix(&mut self) -> Option<Visibility> {
        let visibility = self
            .cursor
            .peek()
            .and_then(|t| Visibility::from_keyword(&t.text))?;
        self.cursor.advance();
        Some(visibility)
    }

    /// `public {` / `private {` opening a section.
    fn section_start(&mut self) -> Option<Visibility> {
        let visibility = self
            .cursor
            .peek()
            .and_then(|t| Visibility::from_keyword(&t.text))?;
        if !self.cursor.peek_nth(1).is_some_and(|t| t.is_op("{")) {
            return None;
        }
        self.cursor.advance();
        self.cursor.advance();
        Some(visibility)
    }

    /// `library NAME [requires [optional] A, B] { ... }`
    fn library(&mut self, comments: Vec<LineComment>) -> Result<Library, ZincError> {
        let keyword = self.cursor.advance().ok_or_else(|| ZincError::eof("`library`"))?;
        let name = self.cursor.expect_ident("a library name")?;
        let mut library = Library {
            name: Some(name.text),
            comments,
            ..Library::default()
        };

        if ["requires", "needs", "uses"]
            .iter()
            .any(|kw| self.cursor.eat_keyword(kw))
        {
            loop {
                self.cursor.eat_keyword("optional");
                library.requires.push(self.cursor.expect_ident("a library name")?.text);
                if !self.cursor.eat_op(",") {
                    break;
                }
            }
        }

        self.cursor.expect_op("{")?;
        // Library contents are private unless a section says otherwise.
        self.library_items(&mut library, Visibility::Private)?;
        let close = self.cursor.expect_op("}")?;

        // Zinc has no initializer clause; `onInit` plays that role.
        if library.functions.iter().any(|f| f.name.as_deref() == Some("onInit")) {
            library.initializer = Some("onInit".to_string());
        }
        library.range = TextRange::new(keyword.start(), close.end());
        Ok(library)
    }

    fn library_items(&mut self, library: &mut Library, visibility: Visibility) -> Result<(), ZincError> {
        loop {
            if self.cursor.peek_is_op("}") {
                return Ok(());
            }
            if self.cursor.at_end() {
                return Err(ZincError::eof("`}`"));
            }
            let comments = self.cursor.take_comments();
            if let Some(section) = self.section_start() {
                self.library_items(library, section)?;
                self.cursor.expect_op("}")?;
                continue;
            }
            let item_visibility = self.visibility_prefix().unwrap_or(visibility);
            match self.item(item_visibility, comments, false)? {
                Item::Struct(def) => library.structs.push(def),
                Item::Function(func) => library.functions.push(func),
                Item::Globals(globals) => library.globals.extend(globals),
                Item::Library(_) | Item::Skipped => {}
            }
        }
    }

    /// `struct NAME [extends A, B] { ... } [;]`
    fn struct_def(&mut self, visibility: Visibility, comments: Vec<LineComment>) -> Result<Struct, ZincError> {
        let keyword = self.cursor.advance().ok_or_else(|| ZincError::eof("`struct`"))?;
        let name = self.cursor.expect_ident("a struct name")?;
        let mut def = Struct {
            visibility,
            name: Some(name.text),
            comments,
            ..Struct::default()
        };

        // `struct Name[8000]` sizes the instance array.
        if self.cursor.peek_is_op("[") {
            self.skip_group("[", "]")?;
        }
        if self.cursor.eat_keyword("extends") {
            loop {
                def.extends.push(self.cursor.expect_ident("a parent name")?.text);
                if self.cursor.peek_is_op("[") {
                    self.skip_group("[", "]")?;
                }
                if !self.cursor.eat_op(",") {
                    break;
                }
            }
        }

        self.cursor.expect_op("{")?;
        self.struct_items(&mut def, Visibility::Default)?;
        let close = self.cursor.expect_op("}")?;
        self.cursor.eat_op(";");

        def.range = TextRange::new(keyword.start(), close.end());
        Ok(def)
    }

    fn struct_items(&mut self, def: &mut Struct, visibility: Visibility) -> Result<(), ZincError> {
        loop {
            if self.cursor.peek_is_op("}") {
                return Ok(());
            }
            if self.cursor.at_end() {
                return Err(ZincError::eof("`}`"));
            }
            let comments = self.cursor.take_comments();
            if let Some(section) = self.section_start() {
                self.struct_items(def, section)?;
                self.cursor.expect_op("}")?;
                continue;
            }

            let item_visibility = self.visibility_prefix().unwrap_or(visibility);
            let modifier = if self.cursor.eat_keyword("static") {
                Modifier::Static
            } else if self.cursor.eat_keyword("stub") {
                Modifier::Stub
            } else {
                Modifier::None
            };

            let Some(token) = self.cursor.peek().cloned() else {
                return Err(ZincError::eof("a struct member"));
            };
            if token.is_keyword("method") {
                let method = self.method(item_visibility, modifier, comments)?;
                def.methods.push(method);
            } else if token.is_op(";") {
                self.cursor.advance();
            } else if SKIPPED_DECLARATIONS.contains(&token.text.as_str()) {
                self.skip_declaration()?;
            } else {
                let members = self.variables()?;
                def.members
                    .extend(members.into_iter().enumerate().map(|(index, var)| Member {
                        visibility: item_visibility,
                        modifier,
                        is_constant: var.is_constant,
                        is_readonly: false,
                        ty: Some(var.ty),
                        is_array: var.is_array,
                        name: Some(var.name),
                        comments: if index == 0 { comments.clone() } else { Vec::new() },
                        range: var.range,
                    }));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Functions and methods
    // -----------------------------------------------------------------------

    /// `function NAME(TYPE a, TYPE b) [-> TYPE] { body }`
    fn function(&mut self, visibility: Visibility, comments: Vec<LineComment>) -> Result<Func, ZincError> {
        let keyword = self.cursor.advance().ok_or_else(|| ZincError::eof("`function`"))?;
        let name = self.cursor.expect_ident("a function name")?;
        let takes = self.params()?;
        let returns = self.return_type()?;
        let locals = self.body()?;

        Ok(Func {
            visibility,
            name: Some(name.text),
            takes,
            returns,
            comments,
            range: TextRange::new(keyword.start(), self.cursor.last_end()),
            locals,
            ..Func::default()
        })
    }

    /// `method NAME(...)`, `method operator NAME(...)`; a body is optional
    /// for interface-style declarations.
    fn method(
        &mut self,
        visibility: Visibility,
        modifier: Modifier,
        comments: Vec<LineComment>,
    ) -> Result<Method, ZincError> {
        let keyword = self.cursor.advance().ok_or_else(|| ZincError::eof("`method`"))?;
        let name = if self.cursor.eat_keyword("operator") {
            let mut name = String::new();
            while let Some(token) = self.cursor.peek() {
                if token.is_op("(") {
                    break;
                }
                name.push_str(&token.text);
                self.cursor.advance();
            }
            name
        } else {
            self.cursor.expect_ident("a method name")?.text
        };
        let takes = self.params()?;
        let returns = self.return_type()?;
        let locals = if self.cursor.eat_op(";") {
            Vec::new()
        } else {
            self.body()?
        };

        Ok(Method {
            visibility,
            modifier,
            name: Some(name),
            takes,
            returns,
            comments,
            range: TextRange::new(keyword.start(), self.cursor.last_end()),
            locals,
            ..Method::default()
        })
    }

    /// `( [TYPE NAME {, TYPE NAME}] )`
    fn params(&mut self) -> Result<Vec<Take>, ZincError> {
        self.cursor.expect_op("(")?;
        let mut takes = Vec::new();
        if self.cursor.eat_op(")") {
            return Ok(takes);
        }
        loop {
            let ty = self.cursor.expect_ident("a parameter type")?;
            if ty.is_keyword("nothing") && self.cursor.peek_is_op(")") {
                self.cursor.advance();
                return Ok(takes);
            }
            let name = self.cursor.expect_ident("a parameter name")?;
            takes.push(Take {
                range: TextRange::new(ty.start(), name.end()),
                ty: ty.text,
                name: Some(name.text),
            });
            if !self.cursor.eat_op(",") {
                break;
            }
        }
        self.cursor.expect_op(")")?;
        Ok(takes)
    }

    fn return_type(&mut self) -> Result<Option<String>, ZincError> {
        if self.cursor.eat_op("->") {
            Ok(Some(self.cursor.expect_ident("a return type")?.text))
        } else {
            Ok(None)
        }
    }

    /// Skip a `{ ... }` body, collecting `TYPE NAME ...;` locals found at the
    /// start of a statement.
    fn body(&mut self) -> Result<Vec<Local>, ZincError> {
        self.cursor.expect_op("{")?;
        let mut locals = Vec::new();
        let mut depth = 1usize;
        let mut statement_start = true;

        loop {
            let comments = if statement_start {
                self.cursor.take_comments()
            } else {
                Vec::new()
            };
            let token = self.cursor.advance().ok_or_else(|| ZincError::eof("`}`"))?;

            if token.is_op("{") {
                depth += 1;
                statement_start = true;
                continue;
            }
            if token.is_op("}") {
                depth -= 1;
                if depth == 0 {
                    return Ok(locals);
                }
                statement_start = true;
                continue;
            }
            if token.is_op(";") {
                statement_start = true;
                continue;
            }

            if statement_start
                && token.is_ident()
                && !STATEMENT_KEYWORDS.contains(&token.text.as_str())
                && self.cursor.peek().is_some_and(|t| t.is_ident())
            {
                let start = token.start();
                let (modifier, ty) = if token.is_keyword("constant") {
                    let ty = self.cursor.expect_ident("a type name")?;
                    (Modifier::Constant, ty)
                } else {
                    (Modifier::None, token)
                };
                if self.cursor.peek().is_some_and(|t| t.is_ident()) {
                    if let Some(name) = self.cursor.advance() {
                        locals.push(Local {
                            modifier,
                            is_array: self.cursor.peek_is_op("["),
                            range: TextRange::new(start, name.end()),
                            ty: Some(ty.text),
                            name: Some(name.text),
                            comments,
                        });
                    }
                }
            }
            statement_start = false;
        }
    }

    // -----------------------------------------------------------------------
    // Variables
    // -----------------------------------------------------------------------

    /// `[constant] TYPE [array] NAME [[N]] [= expr] {, NAME ...} ;`
    fn variables(&mut self) -> Result<Vec<Variable>, ZincError> {
        let is_constant = self.cursor.eat_keyword("constant");
        let ty = self.cursor.expect_ident("a type name")?;
        let array_keyword = self.cursor.eat_keyword("array");
        let mut variables = Vec::new();

        loop {
            let name = self.cursor.expect_ident("a variable name")?;
            let mut is_array = array_keyword;
            if self.cursor.peek_is_op("[") {
                self.skip_group("[", "]")?;
                is_array = true;
            }
            variables.push(Variable {
                is_constant,
                ty: ty.text.clone(),
                is_array,
                range: TextRange::new(ty.start(), name.end()),
                name: name.text,
            });
            if self.cursor.eat_op("=") {
                self.skip_expression()?;
            }
            if !self.cursor.eat_op(",") {
                break;
            }
        }

        self.cursor.expect_op(";")?;
        Ok(variables)
    }

    // -----------------------------------------------------------------------
    // Skipping
    // -----------------------------------------------------------------------

    /// Consume a balanced `open ... close` group.
    fn skip_group(&mut self, open: &str, close: &str) -> Result<(), ZincError> {
        self.cursor.expect_op(open)?;
        let mut depth = 1usize;
        while depth > 0 {
            let token = self
                .cursor
                .advance()
                .ok_or_else(|| ZincError::eof(format!("`{close}`")))?;
            if token.is_op(open) {
                depth += 1;
            } else if token.is_op(close) {
                depth -= 1;
            }
        }
        Ok(())
    }

    /// Up to (not including) a `,` or `;` outside any brackets.
    fn skip_expression(&mut self) -> Result<(), ZincError> {
        let mut depth = 0usize;
        loop {
            let Some(token) = self.cursor.peek() else {
                return Err(ZincError::eof("`;`"));
            };
            if depth == 0 && (token.is_op(",") || token.is_op(";")) {
                return Ok(());
            }
            if ["(", "[", "{"].iter().any(|op| token.is_op(op)) {
                depth += 1;
            } else if [")", "]", "}"].iter().any(|op| token.is_op(op)) {
                if depth == 0 {
                    let token = token.clone();
                    return Err(ZincError::unexpected(&token, "`;`"));
                }
                depth -= 1;
            }
            self.cursor.advance();
        }
    }

    /// Through the terminating `;`, or through a `{ ... }` body, whichever
    /// closes the declaration first.
    fn skip_declaration(&mut self) -> Result<(), ZincError> {
        let mut depth = 0usize;
        loop {
            let Some(token) = self.cursor.peek() else {
                return Err(ZincError::eof("`;`"));
            };
            if depth == 0 && token.is_op("}") {
                return Ok(());
            }
            let opens = ["(", "[", "{"].iter().any(|op| token.is_op(op));
            let closes = [")", "]", "}"].iter().any(|op| token.is_op(op));
            let brace_close = token.is_op("}");
            let semicolon = token.is_op(";");
            self.cursor.advance();

            if opens {
                depth += 1;
            } else if closes {
                depth = depth.saturating_sub(1);
                if depth == 0 && brace_close {
                    self.cursor.eat_op(";");
                    return Ok(());
                }
            } else if depth == 0 && semicolon {
                return Ok(());
            }
        }
    }
}
