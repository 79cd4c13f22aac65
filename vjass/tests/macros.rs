use vjass::{ParseOptions, Parser};

fn expanded_texts(parser: &Parser) -> Vec<String> {
    parser
        .expanded_lines()
        .iter()
        .map(|l| l.text().trim_end().to_string())
        .collect()
}

fn has_warning(parser: &Parser, needle: &str) -> bool {
    parser
        .diagnostics()
        .iter()
        .any(|d| d.is_warning() && d.message.contains(needle))
}

const MAKER: &str = "\
//! textmacro M(a, b)
function $a$ takes nothing returns $b$
endfunction
//! endtextmacro
";

#[test]
fn expansion_substitutes_parameters() {
    let source = format!("{MAKER}//! runtextmacro M(\"foo\", \"integer\")\n");
    let parser = Parser::new(&source, 0);

    assert_eq!(
        expanded_texts(&parser),
        vec!["function foo takes nothing returns integer", "endfunction"]
    );
    assert!(parser.expanded_lines().iter().all(|l| !l.text().contains('$')));

    let program = parser.parse();
    assert_eq!(program.functions.len(), 1);
    assert_eq!(program.functions[0].name.as_deref(), Some("foo"));
    assert_eq!(program.functions[0].returns.as_deref(), Some("integer"));
    assert!(parser.diagnostics().is_empty());
}

#[test]
fn expanded_lines_keep_macro_body_positions() {
    let source = format!("{MAKER}\n\n//! runtextmacro M(\"foo\", \"integer\")\n");
    let parser = Parser::new(&source, 0);
    let lines: Vec<usize> = parser
        .expanded_lines()
        .iter()
        .filter(|l| !l.is_blank())
        .map(|l| l.line())
        .collect();
    assert_eq!(lines, vec![1, 2]);
}

#[test]
fn takes_form_header() {
    let source = "\
//! textmacro_once Getter takes NAME, TYPE
function Get$NAME$ takes nothing returns $TYPE$
endfunction
//! endtextmacro
//! runtextmacro optional Getter(\"Life\", \"real\")
";
    let program = Parser::new(source, 0).parse();
    assert_eq!(program.functions[0].name.as_deref(), Some("GetLife"));
    assert_eq!(program.functions[0].returns.as_deref(), Some("real"));
}

#[test]
fn invocations_are_independent() {
    let source = format!(
        "{MAKER}//! runtextmacro M(\"foo\", \"integer\")\n//! runtextmacro M(\"bar\", \"real\")\n"
    );
    let program = Parser::new(&source, 0).parse();
    let sigs: Vec<(Option<&str>, Option<&str>)> = program
        .functions
        .iter()
        .map(|f| (f.name.as_deref(), f.returns.as_deref()))
        .collect();
    assert_eq!(
        sigs,
        vec![(Some("foo"), Some("integer")), (Some("bar"), Some("real"))]
    );
}

#[test]
fn missing_arguments_become_empty() {
    let source = format!("{MAKER}//! runtextmacro M(\"foo\")\n");
    let parser = Parser::new(&source, 0);
    assert_eq!(
        expanded_texts(&parser)[0],
        "function foo takes nothing returns"
    );
    assert_eq!(parser.parse().functions[0].returns, None);
}

#[test]
fn undefined_macro_contributes_nothing() {
    let source = "set a = 1\n//! runtextmacro Missing(\"x\")\nset b = 2\n";
    let parser = Parser::new(source, 0);
    assert_eq!(expanded_texts(&parser), vec!["set a = 1", "set b = 2"]);
    assert!(has_warning(&parser, "undefined text macro `Missing`"));
}

#[test]
fn optional_undefined_macro_is_silent() {
    let source = "//! runtextmacro optional Missing(\"x\")\nset b = 2\n";
    let parser = Parser::new(source, 0);
    assert_eq!(expanded_texts(&parser), vec!["set b = 2"]);
    assert!(parser.diagnostics().is_empty());
}

#[test]
fn definitions_leave_the_main_stream() {
    let parser = Parser::new(MAKER, 0);
    assert!(parser.expanded_lines().is_empty());
    assert_eq!(parser.text_macros().len(), 1);
    let m = parser.text_macros().get("M").expect("macro M");
    assert_eq!(m.params, vec!["a", "b"]);
    assert_eq!(m.body.len(), 2);
    assert_eq!(m.range.start.line, 0);
    assert_eq!(m.range.end.line, 3);
}

#[test]
fn macro_text_is_the_raw_body() {
    let parser = Parser::new(MAKER, 0);
    assert_eq!(
        parser.macro_text("M").as_deref(),
        Some("function $a$ takes nothing returns $b$\nendfunction\n")
    );
    assert_eq!(parser.macro_text("Nope"), None);
}

#[test]
fn nested_invocations_expand() {
    let source = "\
//! textmacro Inner takes name
function $name$ takes nothing returns nothing
endfunction
//! endtextmacro
//! textmacro Outer takes n
//! runtextmacro Inner(\"$n$_a\")
//! runtextmacro Inner(\"$n$_b\")
//! endtextmacro
//! runtextmacro Outer(\"x\")
";
    let program = Parser::new(source, 0).parse();
    let names: Vec<&str> = program
        .functions
        .iter()
        .filter_map(|f| f.name.as_deref())
        .collect();
    assert_eq!(names, vec!["x_a", "x_b"]);
}

#[test]
fn recursive_invocation_is_dropped() {
    let source = "\
//! textmacro Loop
set x = x + 1
//! runtextmacro Loop()
//! endtextmacro
//! runtextmacro Loop()
";
    let parser = Parser::new(source, 0);
    assert_eq!(expanded_texts(&parser), vec!["set x = x + 1"]);
    assert!(has_warning(&parser, "invokes itself"));
}

#[test]
fn duplicate_definition_first_wins() {
    let source = "\
//! textmacro D
function first takes nothing returns nothing
endfunction
//! endtextmacro
//! textmacro D
function second takes nothing returns nothing
endfunction
//! endtextmacro
//! runtextmacro D()
";
    let parser = Parser::new(source, 0);
    let program = parser.parse();
    assert_eq!(program.functions.len(), 1);
    assert_eq!(program.functions[0].name.as_deref(), Some("first"));
    assert!(has_warning(&parser, "duplicate text macro `D`"));
}

#[test]
fn expansion_cap_stops_output() {
    let source = format!(
        "{MAKER}//! runtextmacro M(\"a\", \"integer\")\n//! runtextmacro M(\"b\", \"integer\")\n"
    );
    let options = ParseOptions {
        max_expanded_lines: Some(2),
    };
    let parser = Parser::with_options(&source, 0, &options);
    assert_eq!(parser.expanded_lines().len(), 2);
    assert_eq!(parser.parse().functions.len(), 1);
    let cap_warnings = parser
        .diagnostics()
        .iter()
        .filter(|d| d.message.contains("expansion limit"))
        .count();
    assert_eq!(cap_warnings, 1);
}

#[test]
fn unclosed_definition_is_reported() {
    let source = "//! textmacro Open\nset x = 1\n";
    let parser = Parser::new(source, 0);
    assert!(parser.expanded_lines().is_empty());
    assert!(parser.text_macros().get("Open").is_some());
    assert!(has_warning(&parser, "never closed"));
}

#[test]
fn stray_endtextmacro_is_reported() {
    let parser = Parser::new("//! endtextmacro\n", 0);
    assert!(has_warning(&parser, "`endtextmacro` without"));
}

#[test]
fn expanded_line_diagnostics_stay_inside_the_source() {
    let source = "\
//! textmacro Open takes n
function $n$
//! endtextmacro
//! runtextmacro Open(\"a_very_long_function_name_that_is_much_longer\")
";
    let parser = Parser::new(source, 0);
    assert!(has_warning(&parser, "never closed"));
    for diagnostic in parser.diagnostics() {
        assert!(diagnostic.span.end <= source.len(), "{:?}", diagnostic.span);
        assert!(source.is_char_boundary(diagnostic.span.end));
    }
    // The opener's span is the body line, not the longer expanded text.
    let body_start = source.find("function").unwrap();
    let opener = &parser.diagnostics()[0];
    assert_eq!(opener.span, body_start..body_start + "function $n$".len());
}
