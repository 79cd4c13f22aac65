use vjass::{Declaration, Modifier, Parser, Position, Program, Visibility};

fn parse(source: &str) -> Program {
    Parser::new(source, 0).parse()
}

fn take_pairs(takes: &[vjass::Take]) -> Vec<(String, Option<String>)> {
    takes.iter().map(|t| (t.ty.clone(), t.name.clone())).collect()
}

#[test]
fn library_requires_skips_optional() {
    let program = parse("library L requires optional A, B\nendlibrary\n");
    let library = &program.libraries[0];
    assert_eq!(library.name.as_deref(), Some("L"));
    assert_eq!(library.requires, vec!["A", "B"]);
    assert_eq!(library.initializer, None);
}

#[test]
fn library_initializer_and_needs() {
    let program = parse("library Core initializer Init needs Table, optional Debug\nendlibrary\n");
    let library = &program.libraries[0];
    assert_eq!(library.initializer.as_deref(), Some("Init"));
    assert_eq!(library.requires, vec!["Table", "Debug"]);
}

#[test]
fn takes_list() {
    let program = parse(
        "\
function f takes integer a, string b returns nothing
endfunction
function g takes nothing returns boolean
endfunction
",
    );
    assert_eq!(
        take_pairs(&program.functions[0].takes),
        vec![
            ("integer".to_string(), Some("a".to_string())),
            ("string".to_string(), Some("b".to_string())),
        ]
    );
    assert_eq!(program.functions[0].returns.as_deref(), Some("nothing"));
    assert!(program.functions[1].takes.is_empty());
    assert_eq!(program.functions[1].returns.as_deref(), Some("boolean"));
}

#[test]
fn partial_header_keeps_declaration() {
    let program = parse("function\nendfunction\nstruct\nendstruct\n");
    assert_eq!(program.functions.len(), 1);
    assert_eq!(program.functions[0].name, None);
    assert_eq!(program.functions[0].returns, None);
    assert_eq!(program.structs[0].name, None);
}

#[test]
fn natives() {
    let program = parse(
        "\
native GetUnitX takes unit whichUnit returns real
constant native GetPlayerId takes player p returns integer
",
    );
    assert_eq!(program.natives.len(), 2);
    assert!(!program.natives[0].is_constant);
    assert_eq!(program.natives[0].name.as_deref(), Some("GetUnitX"));
    assert_eq!(
        take_pairs(&program.natives[0].takes),
        vec![("unit".to_string(), Some("whichUnit".to_string()))]
    );
    assert!(program.natives[1].is_constant);
    assert_eq!(program.natives[1].returns.as_deref(), Some("integer"));
}

#[test]
fn globals_block() {
    let program = parse(
        "\
globals
    // the count
    integer count = 0
    constant real PI = 3.14
    private unit array heroes
endglobals
",
    );
    let globals = &program.globals;
    assert_eq!(globals.len(), 3);

    assert_eq!(globals[0].ty.as_deref(), Some("integer"));
    assert_eq!(globals[0].name.as_deref(), Some("count"));
    assert_eq!(globals[0].doc().contents, vec!["the count"]);

    assert!(globals[1].is_constant());
    assert_eq!(globals[1].name.as_deref(), Some("PI"));
    assert!(globals[1].comments.is_empty());

    assert_eq!(globals[2].visibility, Visibility::Private);
    assert!(globals[2].is_array);
    assert_eq!(globals[2].name.as_deref(), Some("heroes"));
}

#[test]
fn leading_comments_and_doc() {
    let program = parse(
        "\
// Adds numbers.
// @param a first operand
// @deprecated
function add takes integer a, integer b returns integer
endfunction
",
    );
    let func = &program.functions[0];
    assert_eq!(func.comments.len(), 3);
    let doc = func.doc();
    assert_eq!(doc.contents, vec!["Adds numbers."]);
    assert_eq!(doc.param("a").map(|p| p.description.as_str()), Some("first operand"));
    assert!(doc.param("b").is_none());
    assert!(doc.deprecated);
}

#[test]
fn comments_do_not_cross_code() {
    let program = parse(
        "\
// about nothing
call Foo()
function f takes nothing returns nothing
endfunction
// about globals
globals
endglobals
function g takes nothing returns nothing
endfunction
",
    );
    assert!(program.functions[0].comments.is_empty());
    assert!(program.functions[1].comments.is_empty());
}

#[test]
fn directive_lines_are_not_comments() {
    let program = parse(
        "\
//! import \"other.j\"
function f takes nothing returns nothing
endfunction
",
    );
    assert!(program.functions[0].comments.is_empty());
}

#[test]
fn function_locals_and_nested_globals() {
    let program = parse(
        "\
constant function f takes nothing returns nothing
    // counter
    local integer i = 0
    local unit array us
    globals
        integer inner
    endglobals
    set i = i + 1
endfunction
",
    );
    let func = &program.functions[0];
    assert!(func.is_constant);
    assert_eq!(func.locals.len(), 2);
    assert_eq!(func.locals[0].name.as_deref(), Some("i"));
    assert_eq!(func.locals[0].comments.len(), 1);
    assert_eq!(func.locals[0].range.start, Position::new(2, 4));
    assert!(func.locals[1].is_array);
    assert_eq!(func.globals[0].name.as_deref(), Some("inner"));
    assert!(program.globals.is_empty());
}

#[test]
fn constant_locals() {
    let program = parse(
        "\
function f takes nothing returns nothing
    local constant integer y = 1
    local real z
endfunction
",
    );
    let locals = &program.functions[0].locals;
    assert_eq!(locals[0].modifier, Modifier::Constant);
    assert!(locals[0].is_constant());
    assert_eq!(locals[0].ty.as_deref(), Some("integer"));
    assert_eq!(locals[0].name.as_deref(), Some("y"));
    assert!(!locals[1].is_constant());
    assert_eq!(locals[1].name.as_deref(), Some("z"));
}

#[test]
fn constant_and_readonly_members() {
    let program = parse(
        "\
struct Limits
    private static constant integer MAX = 5
    readonly real x
    public static readonly string array names
    local constant boolean legacy = true
endstruct
",
    );
    let members = &program.structs[0].members;
    let shapes: Vec<(Option<&str>, Option<&str>, bool, bool)> = members
        .iter()
        .map(|m| (m.ty.as_deref(), m.name.as_deref(), m.is_constant, m.is_readonly))
        .collect();
    assert_eq!(
        shapes,
        vec![
            (Some("integer"), Some("MAX"), true, false),
            (Some("real"), Some("x"), false, true),
            (Some("string"), Some("names"), false, true),
            (Some("boolean"), Some("legacy"), true, false),
        ]
    );
    assert_eq!(members[0].modifier, Modifier::Static);
    assert_eq!(members[0].visibility, Visibility::Private);
    assert!(members[2].is_array);
}

#[test]
fn struct_members_and_methods() {
    let program = parse(
        "\
private struct Point extends Base, Other
    // x coordinate
    real x
    static integer count
    private real array ys
    local integer legacy
    implement Alloc
    method length takes nothing returns real
        local real r
        return r
    endmethod
    static method create takes real x returns thistype
    endmethod
endstruct
",
    );
    let def = &program.structs[0];
    assert_eq!(def.visibility, Visibility::Private);
    assert_eq!(def.name.as_deref(), Some("Point"));
    assert_eq!(def.extends, vec!["Base", "Other"]);

    let members: Vec<Option<&str>> = def.members.iter().map(|m| m.name.as_deref()).collect();
    assert_eq!(
        members,
        vec![Some("x"), Some("count"), Some("ys"), Some("legacy")]
    );
    assert_eq!(def.members[0].doc().contents, vec!["x coordinate"]);
    assert_eq!(def.members[1].modifier, Modifier::Static);
    assert_eq!(def.members[2].visibility, Visibility::Private);
    assert!(def.members[2].is_array);
    assert_eq!(def.members[3].ty.as_deref(), Some("integer"));

    assert_eq!(def.methods.len(), 2);
    assert_eq!(def.methods[0].name.as_deref(), Some("length"));
    assert_eq!(def.methods[0].locals[0].name.as_deref(), Some("r"));
    assert_eq!(def.methods[1].modifier, Modifier::Static);
    assert_eq!(def.methods[1].returns.as_deref(), Some("thistype"));
}

#[test]
fn library_contents() {
    let program = parse(
        "\
library Util
    globals
        private integer n
    endglobals
    private function helper takes nothing returns nothing
    endfunction
    struct Node
    endstruct
endlibrary
",
    );
    assert!(program.functions.is_empty());
    let library = &program.libraries[0];
    assert_eq!(library.globals.len(), 1);
    assert_eq!(library.functions[0].visibility, Visibility::Private);
    assert_eq!(library.structs[0].name.as_deref(), Some("Node"));
}

#[test]
fn type_declarations() {
    let program = parse("type unit extends widget\ntype agent extends handle\n");
    assert_eq!(program.types.len(), 2);
    assert_eq!(program.types[0].name.as_deref(), Some("unit"));
    assert_eq!(program.types[0].extends.as_deref(), Some("widget"));
}

#[test]
fn lookups_search_libraries() {
    let source = "\
function a takes nothing returns nothing
    call b()
endfunction
library L
    function b takes nothing returns nothing
    endfunction
    struct S
        integer v
        method m takes nothing returns nothing
        endmethod
    endstruct
endlibrary
";
    let program = parse(source);
    assert_eq!(program.functions_named("b").len(), 1);
    assert_eq!(program.structs_named("S").len(), 1);
    assert_eq!(program.methods_named("m").len(), 1);
    assert_eq!(program.members_named("v").len(), 1);
    assert_eq!(program.libraries_named("L").len(), 1);
    assert!(program.functions_named("nope").is_empty());

    let at = program.function_at(Position::new(1, 4)).and_then(|f| f.name());
    assert_eq!(at, Some("a"));
    let at = program.function_at(Position::new(4, 4)).and_then(|f| f.name());
    assert_eq!(at, Some("b"));
    let at = program.method_at(Position::new(8, 8)).and_then(|m| m.name());
    assert_eq!(at, Some("m"));
    assert!(program.method_at(Position::new(1, 0)).is_none());
}

#[test]
fn merge_appends() {
    let mut program = parse("function a takes nothing returns nothing\nendfunction\n");
    let other = parse("function b takes nothing returns nothing\nendfunction\n");
    program.merge(other);
    let names: Vec<Option<&str>> = program.functions.iter().map(|f| f.name()).collect();
    assert_eq!(names, vec![Some("a"), Some("b")]);
}
