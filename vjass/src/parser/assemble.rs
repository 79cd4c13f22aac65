use std::mem;

use crate::Program;
use crate::block::{Block, BlockKind, Node};
use crate::decl::{Func, Global, LineComment, Library, Local, Member, Method, Native, Struct, TypeDecl};
use crate::parser::header;
use crate::parser::line_kind::{LineKind, classify, is_global_line, is_member_line};

/// Which declarations a scope collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// natives, types, globals blocks, functions, structs, libraries
    Program,
    /// globals blocks, functions, structs
    Library,
    /// members, methods
    Struct,
    /// locals, globals blocks
    Body,
    /// global variable lines
    Globals,
}

impl Scope {
    fn accepts_block(self, kind: BlockKind) -> bool {
        match self {
            Scope::Program => matches!(
                kind,
                BlockKind::Globals | BlockKind::Function | BlockKind::Struct | BlockKind::Library
            ),
            Scope::Library => matches!(
                kind,
                BlockKind::Globals | BlockKind::Function | BlockKind::Struct
            ),
            Scope::Struct => kind == BlockKind::Method,
            Scope::Body => kind == BlockKind::Globals,
            Scope::Globals => false,
        }
    }
}

#[derive(Debug, Default)]
struct Collected {
    natives: Vec<Native>,
    types: Vec<TypeDecl>,
    globals: Vec<Global>,
    functions: Vec<Func>,
    structs: Vec<Struct>,
    libraries: Vec<Library>,
    members: Vec<Member>,
    methods: Vec<Method>,
    locals: Vec<Local>,
}

/// Turn the outline root into a program.
pub fn assemble(root: &Block, source_id: usize) -> Program {
    let collected = walk(&root.children, Scope::Program);
    Program {
        natives: collected.natives,
        functions: collected.functions,
        globals: collected.globals,
        structs: collected.structs,
        libraries: collected.libraries,
        types: collected.types,
        source_id,
    }
}

/// Collect the declarations `scope` accepts from `nodes`.
///
/// Consecutive comment lines are buffered and handed to the next declaration.
/// Anything else in between, including a block of any kind, drops them.
fn walk(nodes: &[Node], scope: Scope) -> Collected {
    let mut out = Collected::default();
    let mut comments: Vec<LineComment> = Vec::new();

    for node in nodes {
        match node {
            Node::Line(line) => {
                let kind = classify(line);
                match kind {
                    LineKind::Comment => {
                        comments.push(header::parse_line_comment(line));
                        continue;
                    }
                    LineKind::Native if scope == Scope::Program => {
                        let mut native = header::parse_native(line);
                        native.comments = mem::take(&mut comments);
                        out.natives.push(native);
                    }
                    LineKind::TypeDecl if scope == Scope::Program => {
                        let mut decl = header::parse_type(line);
                        decl.comments = mem::take(&mut comments);
                        out.types.push(decl);
                    }
                    LineKind::Local if scope == Scope::Body => {
                        let mut local = header::parse_local(line);
                        local.comments = mem::take(&mut comments);
                        out.locals.push(local);
                    }
                    LineKind::Other | LineKind::Local
                        if scope == Scope::Struct && is_member_line(line) =>
                    {
                        let mut member = header::parse_member(line);
                        member.comments = mem::take(&mut comments);
                        out.members.push(member);
                    }
                    LineKind::Other | LineKind::TypeDecl | LineKind::Local
                        if scope == Scope::Globals && is_global_line(line) =>
                    {
                        let mut global = header::parse_global(line);
                        global.comments = mem::take(&mut comments);
                        out.globals.push(global);
                    }
                    _ => {}
                }
                comments.clear();
            }
            Node::Block(block) => {
                if scope.accepts_block(block.kind) {
                    collect_block(block, &mut out, mem::take(&mut comments));
                }
                comments.clear();
            }
        }
    }

    out
}

fn collect_block(block: &Block, out: &mut Collected, comments: Vec<LineComment>) {
    match block.kind {
        BlockKind::Globals => {
            out.globals.extend(walk(&block.children, Scope::Globals).globals);
        }
        BlockKind::Function => {
            let mut func = match block.header() {
                Some(header) => header::parse_function(header, block.range),
                None => Func {
                    range: block.range,
                    ..Func::default()
                },
            };
            let body = walk(block.body(), Scope::Body);
            func.comments = comments;
            func.locals = body.locals;
            func.globals = body.globals;
            out.functions.push(func);
        }
        BlockKind::Method => {
            let mut method = match block.header() {
                Some(header) => header::parse_method(header, block.range),
                None => Method {
                    range: block.range,
                    ..Method::default()
                },
            };
            let body = walk(block.body(), Scope::Body);
            method.comments = comments;
            method.locals = body.locals;
            method.globals = body.globals;
            out.methods.push(method);
        }
        BlockKind::Struct => {
            let mut def = match block.header() {
                Some(header) => header::parse_struct(header, block.range),
                None => Struct {
                    range: block.range,
                    ..Struct::default()
                },
            };
            let body = walk(block.body(), Scope::Struct);
            def.comments = comments;
            def.members = body.members;
            def.methods = body.methods;
            out.structs.push(def);
        }
        BlockKind::Library => {
            let mut library = match block.header() {
                Some(header) => header::parse_library(header, block.range),
                None => Library {
                    range: block.range,
                    ..Library::default()
                },
            };
            let body = walk(block.body(), Scope::Library);
            library.comments = comments;
            library.globals = body.globals;
            library.functions = body.functions;
            library.structs = body.structs;
            out.libraries.push(library);
        }
        BlockKind::Zinc | BlockKind::Program => {}
    }
}
