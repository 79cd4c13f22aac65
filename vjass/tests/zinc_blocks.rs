use vjass::block::{BlockKind, Node};
use vjass::lexer::Token;
use vjass::{Parser, SubDialectParser};

/// Collects identifier texts, failing on an empty stream.
struct Idents;

impl SubDialectParser for Idents {
    type Output = Vec<String>;
    type Error = String;

    fn parse(&self, tokens: Vec<Token>) -> Result<Vec<String>, String> {
        if tokens.is_empty() {
            return Err("no zinc code".to_string());
        }
        Ok(tokens
            .into_iter()
            .filter(|t| t.is_ident())
            .map(|t| t.text)
            .collect())
    }
}

#[test]
fn zinc_block_leaves_main_stream() {
    let source = "\
function a takes nothing returns nothing
endfunction
//! zinc
library Z {
    function b() {}
}
//! endzinc
function c takes nothing returns nothing
endfunction
";
    let parser = Parser::new(source, 0);
    assert_eq!(parser.zinc_blocks().len(), 1);
    let block = &parser.zinc_blocks()[0];
    assert_eq!(block.kind, BlockKind::Zinc);
    assert!(block.closed);
    assert_eq!(block.children.len(), 3);
    assert_eq!(block.range.start.line, 2);
    assert_eq!(block.range.end.line, 6);

    let program = parser.parse();
    let names: Vec<Option<&str>> = program.functions.iter().map(|f| f.name.as_deref()).collect();
    assert_eq!(names, vec![Some("a"), Some("c")]);
    assert!(program.libraries.is_empty());
}

#[test]
fn zinc_opened_inside_macro_is_extracted() {
    let source = "\
//! textmacro Z
//! zinc
library Foo { }
//! endzinc
//! endtextmacro
//! runtextmacro Z()
function f takes nothing returns nothing
endfunction
";
    let parser = Parser::new(source, 0);
    assert_eq!(parser.zinc_blocks().len(), 1);
    let texts: Vec<&str> = parser.zinc_blocks()[0]
        .children
        .iter()
        .filter_map(|n| match n {
            Node::Line(l) => Some(l.text().trim()),
            Node::Block(_) => None,
        })
        .collect();
    assert_eq!(texts, vec!["library Foo { }"]);

    assert!(
        parser
            .outline()
            .descendants()
            .iter()
            .all(|b| b.kind == BlockKind::Function)
    );
    let tokens = parser.zinc_tokens();
    assert_eq!(tokens[0].text, "library");
    assert_eq!(tokens[0].line, 2);
}

#[test]
fn tokens_from_all_blocks_in_order() {
    let source = "\
//! zinc
library A {}
//! endzinc
//! zinc
library B {}
//! endzinc
";
    let parser = Parser::new(source, 0);
    let idents = parser.parse_zinc(&Idents);
    assert_eq!(
        idents,
        Ok(vec![
            "library".to_string(),
            "A".to_string(),
            "library".to_string(),
            "B".to_string()
        ])
    );
    let lines: Vec<usize> = parser.zinc_tokens().iter().map(|t| t.line).collect();
    assert_eq!(lines, vec![1, 1, 1, 1, 4, 4, 4, 4]);
}

#[test]
fn sub_dialect_errors_are_propagated() {
    let parser = Parser::new("function f takes nothing returns nothing\nendfunction\n", 0);
    assert_eq!(parser.parse_zinc(&Idents), Err("no zinc code".to_string()));
}

#[test]
fn unbalanced_zinc_markers() {
    let parser = Parser::new("//! endzinc\n//! zinc\n//! zinc\nlibrary L {}\n", 0);
    assert_eq!(parser.zinc_blocks().len(), 1);
    assert!(!parser.zinc_blocks()[0].closed);
    let messages: Vec<&str> = parser
        .diagnostics()
        .iter()
        .map(|d| d.message.as_str())
        .collect();
    assert_eq!(
        messages,
        vec![
            "`//! endzinc` without a matching `//! zinc`",
            "`//! zinc` inside an open zinc block",
            "zinc block is never closed",
        ]
    );
}
