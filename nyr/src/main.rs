use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use console::style;
use log::warn;
use nyr::{logger, Bindings, Error, Limits, Program};
use nyr_source::Source;

#[derive(Parser)]
#[command(
    name = "nyr",
    version,
    about = "Lexer, parser and interpreter for the Nyr scripting language",
    long_about = None,
)]
struct Cli {
    /// Input file (ending with .nyr). Starts a REPL when omitted.
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,
    /// Interpret the program and print its variables. This is the default unless -p or -o is given.
    #[arg(short, long)]
    interpret: bool,
    /// Print the AST as JSON
    #[arg(short, long)]
    print: bool,
    /// Write the AST as JSON to ./ast.json
    #[arg(short, long)]
    output: bool,
    /// Maximum number of iterations of a single loop
    #[arg(long, value_name = "N", default_value_t = Limits::DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,
    /// Maximum call nesting level
    #[arg(long, value_name = "N", default_value_t = Limits::DEFAULT_MAX_RECURSION_DEPTH)]
    max_recursion_depth: usize,
    /// Log what the interpreter is doing. Repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = logger::init(logger::level_from_verbosity(cli.verbose)) {
        eprintln!("could not install logger: {}", err);
    }

    process::exit(cli.run());
}

impl Cli {
    fn limits(&self) -> Limits {
        Limits {
            max_iterations: self.max_iterations,
            max_recursion_depth: self.max_recursion_depth,
        }
    }

    fn interprets(&self) -> bool {
        self.interpret || !(self.print || self.output)
    }

    fn run(self) -> i32 {
        match &self.file {
            Some(path) => self.run_file(path),
            None => self.repl(),
        }
    }

    fn run_file(&self, path: &Path) -> i32 {
        if path.extension().map_or(true, |ext| ext != "nyr") {
            eprintln!(
                "{} expected a .nyr file, got {}",
                style("error:").red().bold().for_stderr(),
                path.display()
            );
            return 1;
        }
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                eprintln!(
                    "{} could not read {}: {}",
                    style("error:").red().bold().for_stderr(),
                    path.display(),
                    err
                );
                return 1;
            }
        };
        if source.trim().is_empty() {
            warn!("input file {} is empty", path.display());
            return 0;
        }

        match self.execute(&source) {
            Ok(bindings) => {
                if let Some(bindings) = bindings {
                    print_bindings(&bindings);
                }
                0
            }
            Err(err) => {
                report(&source, &err);
                1
            }
        }
    }

    /// Reads lines until `exit` or end of input. Accepted lines are kept and run again with every new line.
    fn repl(&self) -> i32 {
        println!(
            "Nyr {} (type `exit` to quit)",
            env!("CARGO_PKG_VERSION")
        );
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut accepted = String::new();

        loop {
            print!("nyr> ");
            if stdout.flush().is_err() {
                return 1;
            }

            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) => return 0, // EOF
                Ok(_) => {}
                Err(err) => {
                    eprintln!("{} {}", style("error:").red().bold().for_stderr(), err);
                    return 1;
                }
            }

            let line = line.trim();
            match line {
                "" => continue,
                "exit" => return 0,
                "clear" => {
                    print!("\x1bc");
                    continue;
                }
                _ => {}
            }

            let mut input = format!("{}{}", accepted, line);
            if !line.ends_with(';') && !line.ends_with('}') {
                input.push(';');
            }
            input.push('\n');

            match self.execute(&input) {
                Ok(bindings) => {
                    if let Some(bindings) = bindings {
                        print_bindings(&bindings);
                    }
                    accepted = input;
                }
                Err(err) => report(&input, &err),
            }
        }
    }

    /// Parses `source`, emits the AST as requested and interprets it unless only AST output was asked for.
    fn execute(&self, source: &str) -> Result<Option<Bindings>, Error> {
        let program = nyr::parse_source(source)?;
        if let Err(err) = self.emit_ast(&program) {
            eprintln!(
                "{} could not write the AST: {}",
                style("error:").red().bold().for_stderr(),
                err
            );
        }

        if !self.interprets() {
            return Ok(None);
        }
        let bindings = nyr_interpreter::interpret_with_limits(&program, self.limits())?;
        Ok(Some(bindings))
    }

    fn emit_ast(&self, program: &Program) -> io::Result<()> {
        if !(self.print || self.output) {
            return Ok(());
        }
        let json = program.to_json()?;
        if self.print {
            println!("{}", json);
        }
        if self.output {
            fs::write("./ast.json", format!("{}\n", json))?;
        }
        Ok(())
    }
}

fn print_bindings(bindings: &Bindings) {
    println!("{}", style("Env").bold());
    if !bindings.is_empty() {
        println!("{}", bindings);
    }
}

/// Prints `err` and, when it has a position, the offending line of `source` with a marker.
fn report(source: &str, err: &Error) {
    eprintln!("{} {}", style("error:").red().bold().for_stderr(), err);

    let position = match err.position() {
        Some(position) => position,
        None => return,
    };
    let source = Source::new(source);
    if let Some(line) = source.line(position.line) {
        let width = source.line_count().to_string().len();
        eprintln!(
            "{} {}",
            style(format!("{:>width$} |", position.line, width = width))
                .blue()
                .bold()
                .for_stderr(),
            line
        );
        eprintln!(
            "{} {}^",
            style(format!("{} |", " ".repeat(width)))
                .blue()
                .bold()
                .for_stderr(),
            " ".repeat(position.column)
        );
    }
}
