mod analysis;
mod config;
mod test_runner;

use std::path::Path;
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing_subscriber::EnvFilter;

use vjass::block::{Block, Node};
use vjass::{Declaration, Program, Take};

use crate::analysis::{analyze, zinc_diagnostic};
use crate::config::Config;

const SUBCOMMANDS: &[&str] = &["outline", "test", "help"];

/// Options that take a value, so their value is not mistaken for a file.
const VALUE_OPTIONS: &[&str] = &["--config", "-c", "--category"];

#[derive(Parser)]
#[command(name = "vjass", version, about = "vJass outline parser")]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log pipeline stages (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML file with parse settings
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a source file and print its declarations
    Outline(OutlineArgs),

    /// Run .test.j test files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct OutlineArgs {
    /// vJass source file
    file: String,

    /// Parse only; exit 0 unless the zinc blocks fail to parse
    #[arg(long)]
    check: bool,

    /// Dump the parsed program
    #[arg(long)]
    ast: bool,

    /// Print the block tree
    #[arg(long)]
    list_blocks: bool,

    /// Print the line stream after text macro expansion
    #[arg(long)]
    expanded: bool,

    /// List text macro definitions
    #[arg(long)]
    macros: bool,

    /// List zinc blocks
    #[arg(long)]
    zinc: bool,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.j file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    // `vjass file.j` works like `vjass outline file.j`.
    let mut args: Vec<String> = std::env::args().collect();
    if let Some(pos) = first_positional(&args) {
        if !SUBCOMMANDS.contains(&args[pos].as_str()) {
            args.insert(pos, "outline".to_string());
        }
    }

    let cli = Cli::parse_from(&args);
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => match Config::load(Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("error: {}", e);
                process::exit(1);
            }
        },
        None => Config::default(),
    };

    match cli.command {
        Command::Outline(outline_args) => do_outline(outline_args, &config, cli.no_color),
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            let exit_code = test_runner::run_tests(path, &config, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

fn first_positional(args: &[String]) -> Option<usize> {
    let mut index = 1;
    while index < args.len() {
        let arg = &args[index];
        if VALUE_OPTIONS.contains(&arg.as_str()) {
            index += 2;
            continue;
        }
        if !arg.starts_with('-') {
            return Some(index);
        }
        index += 1;
    }
    None
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn do_outline(args: OutlineArgs, config: &Config, no_color: bool) {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    let source = match std::fs::read_to_string(&args.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", args.file, e);
            process::exit(1);
        }
    };

    let mut files = SimpleFiles::new();
    let file_id = files.add(args.file.clone(), source.clone());

    let analysis = analyze(&source, file_id, config);
    let parser = &analysis.parser;

    let writer = StandardStream::stderr(color_choice);
    let term_config = term::Config::default();
    for error in parser.diagnostics() {
        let diagnostic = error.to_diagnostic();
        let _ = term::emit_to_write_style(&mut writer.lock(), &term_config, &files, &diagnostic);
    }
    if let Some(error) = &analysis.zinc_error {
        let diagnostic = zinc_diagnostic(error, &files, file_id);
        let _ = term::emit_to_write_style(&mut writer.lock(), &term_config, &files, &diagnostic);
    }

    if args.check {
        if analysis.zinc_error.is_some() {
            process::exit(1);
        }
        eprintln!(
            "ok: {} parsed with {} warning(s)",
            args.file,
            parser.diagnostics().len()
        );
        return;
    }

    if args.ast {
        println!("{:#?}", analysis.program);
        return;
    }

    if args.list_blocks {
        print_blocks(&parser.outline().children, 0);
        return;
    }

    if args.expanded {
        for line in parser.expanded_lines() {
            println!("{:>5} | {}", line.line() + 1, line.text().trim_end());
        }
        return;
    }

    if args.macros {
        for text_macro in parser.text_macros().iter() {
            println!(
                "{}({})  lines {}-{}, {} body line(s)",
                text_macro.name,
                text_macro.params.join(", "),
                text_macro.range.start.line + 1,
                text_macro.range.end.line + 1,
                text_macro.body.len()
            );
        }
        return;
    }

    if args.zinc {
        for block in parser.zinc_blocks() {
            println!(
                "zinc  lines {}-{}, {} line(s){}",
                block.range.start.line + 1,
                block.range.end.line + 1,
                block.children.len(),
                if block.closed { "" } else { " (unclosed)" }
            );
        }
        println!("{} token(s)", parser.zinc_tokens().len());
        return;
    }

    print_program(&analysis.program);
}

fn print_blocks(nodes: &[Node], indent: usize) {
    for node in nodes {
        if let Node::Block(block) = node {
            print_block(block, indent);
        }
    }
}

fn print_block(block: &Block, indent: usize) {
    let pad = "  ".repeat(indent);
    let title = block
        .header()
        .map(|h| h.text().trim().to_string())
        .unwrap_or_else(|| block.kind.to_string());
    let unclosed = if block.closed { "" } else { " (unclosed)" };
    println!(
        "{}{} [{}-{}]{}",
        pad,
        title,
        block.range.start.line + 1,
        block.range.end.line + 1,
        unclosed
    );
    print_blocks(&block.children, indent + 1);
}

fn name_of(decl: &impl Declaration) -> &str {
    decl.name().unwrap_or("?")
}

fn signature(takes: &[Take], returns: Option<&str>) -> String {
    let params: Vec<String> = takes.iter().map(Take::to_string).collect();
    format!("({}) -> {}", params.join(", "), returns.unwrap_or("?"))
}

fn print_program(program: &Program) {
    for native in &program.natives {
        println!(
            "native {}{}",
            name_of(native),
            signature(&native.takes, native.returns.as_deref())
        );
    }
    for decl in &program.types {
        println!(
            "type {} extends {}",
            name_of(decl),
            decl.extends.as_deref().unwrap_or("?")
        );
    }
    for global in &program.globals {
        println!(
            "global {} {}",
            global.ty.as_deref().unwrap_or("?"),
            name_of(global)
        );
    }
    for func in &program.functions {
        println!(
            "function {}{}",
            name_of(func),
            signature(&func.takes, func.returns.as_deref())
        );
    }
    for def in &program.structs {
        print_struct(def, 0);
    }
    for library in &program.libraries {
        let requires = if library.requires.is_empty() {
            String::new()
        } else {
            format!(" requires {}", library.requires.join(", "))
        };
        println!("library {}{}", name_of(library), requires);
        for global in &library.globals {
            println!(
                "  global {} {}",
                global.ty.as_deref().unwrap_or("?"),
                name_of(global)
            );
        }
        for func in &library.functions {
            println!(
                "  function {}{}",
                name_of(func),
                signature(&func.takes, func.returns.as_deref())
            );
        }
        for def in &library.structs {
            print_struct(def, 1);
        }
    }
}

fn print_struct(def: &vjass::Struct, indent: usize) {
    let pad = "  ".repeat(indent);
    let extends = if def.extends.is_empty() {
        String::new()
    } else {
        format!(" extends {}", def.extends.join(", "))
    };
    println!("{}struct {}{}", pad, name_of(def), extends);
    for member in &def.members {
        println!(
            "{}  member {} {}",
            pad,
            member.ty.as_deref().unwrap_or("?"),
            name_of(member)
        );
    }
    for method in &def.methods {
        println!(
            "{}  method {}{}",
            pad,
            name_of(method),
            signature(&method.takes, method.returns.as_deref())
        );
    }
}
