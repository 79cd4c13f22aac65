use vjass::{Declaration, Modifier, Parser, Program, Visibility};
use zinc::{ZincError, ZincParser};

fn parse_zinc(body: &str) -> Result<Program, ZincError> {
    let source = format!("//! zinc\n{body}\n//! endzinc\n");
    Parser::new(&source, 0).parse_zinc(&ZincParser)
}

fn parse_ok(body: &str) -> Program {
    parse_zinc(body).expect("zinc parse failed")
}

#[test]
fn library_with_requires_and_sections() {
    let program = parse_ok(
        "\
library Spells requires optional Table, Timer {
    integer counter = 0;
    public {
        constant real RANGE = 600.0;
        function Cast(unit caster, real x) -> boolean {
            return true;
        }
    }
    function onInit() {}
}",
    );
    assert_eq!(program.libraries.len(), 1);
    let library = &program.libraries[0];
    assert_eq!(library.name.as_deref(), Some("Spells"));
    assert_eq!(library.requires, vec!["Table", "Timer"]);
    assert_eq!(library.initializer.as_deref(), Some("onInit"));

    assert_eq!(library.globals.len(), 2);
    assert_eq!(library.globals[0].visibility, Visibility::Private);
    assert_eq!(library.globals[1].visibility, Visibility::Public);
    assert!(library.globals[1].is_constant());

    let cast = &library.functions[0];
    assert_eq!(cast.name.as_deref(), Some("Cast"));
    assert_eq!(cast.visibility, Visibility::Public);
    assert_eq!(cast.takes.len(), 2);
    assert_eq!(cast.takes[1].ty, "real");
    assert_eq!(cast.takes[1].name.as_deref(), Some("x"));
    assert_eq!(cast.returns.as_deref(), Some("boolean"));
    assert_eq!(library.functions[1].visibility, Visibility::Private);
}

#[test]
fn struct_members_and_methods() {
    let program = parse_ok(
        "\
library Shapes {
    struct Circle extends Shape {
        // radius in game units
        real radius, area;
        static integer count = 0;
        integer cache[16];
        module Alloc;
        static method create(real r) -> thistype {
            thistype c = thistype.allocate();
            return c;
        }
        method operator diameter() -> real { return radius * 2; }
    }
}",
    );
    let def = &program.libraries[0].structs[0];
    assert_eq!(def.name.as_deref(), Some("Circle"));
    assert_eq!(def.extends, vec!["Shape"]);

    let members: Vec<Option<&str>> = def.members.iter().map(|m| m.name()).collect();
    assert_eq!(
        members,
        vec![Some("radius"), Some("area"), Some("count"), Some("cache")]
    );
    assert_eq!(def.members[0].doc().contents, vec!["radius in game units"]);
    assert!(def.members[1].comments.is_empty());
    assert_eq!(def.members[2].modifier, Modifier::Static);
    assert!(def.members[3].is_array);

    assert_eq!(def.methods.len(), 2);
    let create = &def.methods[0];
    assert_eq!(create.modifier, Modifier::Static);
    assert_eq!(create.returns.as_deref(), Some("thistype"));
    assert_eq!(create.locals.len(), 1);
    assert_eq!(create.locals[0].ty.as_deref(), Some("thistype"));
    assert_eq!(create.locals[0].name.as_deref(), Some("c"));
    assert_eq!(def.methods[1].name.as_deref(), Some("diameter"));
}

#[test]
fn locals_only_at_statement_start() {
    let program = parse_ok(
        "\
function f() {
    integer i = 0;
    unit u;
    if (i > 0) { real r = 1.0; }
    while (i < 10) { i = i + 1; }
    return;
}",
    );
    let names: Vec<Option<&str>> = program.functions[0]
        .locals
        .iter()
        .map(|l| l.name.as_deref())
        .collect();
    assert_eq!(names, vec![Some("i"), Some("u"), Some("r")]);
}

#[test]
fn constant_locals_and_members() {
    let program = parse_ok(
        "\
struct Limits {
    static constant integer MAX = 5;
    method f() {
        constant real step = 0.5;
        real x;
    }
}",
    );
    let def = &program.structs[0];
    assert_eq!(def.members[0].name.as_deref(), Some("MAX"));
    assert!(def.members[0].is_constant);
    assert_eq!(def.members[0].modifier, Modifier::Static);

    let locals = &def.methods[0].locals;
    assert_eq!(locals.len(), 2);
    assert!(locals[0].is_constant());
    assert_eq!(locals[0].ty.as_deref(), Some("real"));
    assert_eq!(locals[0].name.as_deref(), Some("step"));
    assert!(!locals[1].is_constant());
}

#[test]
fn ranges_span_declarations() {
    let program = parse_ok("function f() {\n}\n");
    let func = &program.functions[0];
    // Line 0 holds the `//! zinc` marker.
    assert_eq!(func.range.start.line, 1);
    assert_eq!(func.range.end.line, 2);
}

#[test]
fn skipped_declarations() {
    let program = parse_ok(
        "\
interface Event { method fire(); }
type Vector extends real[3];
function g() {}",
    );
    assert_eq!(program.functions.len(), 1);
    assert_eq!(program.functions[0].name.as_deref(), Some("g"));
}

#[test]
fn unexpected_token_is_reported_with_position() {
    let error = parse_zinc("function (").expect_err("should fail");
    assert_eq!(
        error,
        ZincError::UnexpectedToken {
            found: "(".to_string(),
            expected: "a function name".to_string(),
            line: 1,
            column: 9,
        }
    );
    assert_eq!(error.to_string(), "2:10: expected a function name, found `(`");
}

#[test]
fn unterminated_body_is_eof() {
    let error = parse_zinc("library L {\n function f() {").expect_err("should fail");
    assert_eq!(
        error,
        ZincError::UnexpectedEof {
            expected: "`}`".to_string()
        }
    );
}

#[test]
fn nested_library_is_rejected() {
    let error = parse_zinc("library A { library B {} }").expect_err("should fail");
    assert!(matches!(
        error,
        ZincError::UnexpectedToken { ref found, .. } if found == "library"
    ));
}

#[test]
fn merges_into_main_program() {
    let source = "\
function Main takes nothing returns nothing
endfunction
//! zinc
library Z { public function Helper() {} }
//! endzinc
";
    let parser = Parser::new(source, 0);
    let mut program = parser.parse();
    program.merge(parser.parse_zinc(&ZincParser).expect("zinc parse failed"));
    assert_eq!(program.functions_named("Main").len(), 1);
    assert_eq!(program.functions_named("Helper").len(), 1);
}
