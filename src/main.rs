// finn: stack-based scripting language runtime with a step inspector

use std::error::Error;
use std::fs;
use std::io::{self, BufRead, Write};
use std::time::Instant;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use finn::cli::{Options, USAGE};
use finn::emit::AsmEmitter;
use finn::interpreter::{FsLoader, Interpreter};
use finn::lexer::{tokenize, Token};
use finn::ui::App;

/// Install a stderr subscriber, only when `RUST_LOG` is set.
fn init_tracing() {
    if std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .with(EnvFilter::from_default_env())
        .init();
}

fn main() {
    init_tracing();

    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32, Box<dyn Error>> {
    let options = match Options::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            eprintln!("{}", USAGE);
            return Ok(1);
        }
    };

    if options.help {
        println!("{}", USAGE);
        return Ok(0);
    }
    if options.repl {
        return repl(&options);
    }

    let Some(file) = options.file.as_deref() else {
        eprintln!("{}", USAGE);
        return Ok(1);
    };
    let source = match fs::read_to_string(file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", file, e);
            return Ok(1);
        }
    };

    let started = Instant::now();
    let lexed = match tokenize(&source, file) {
        Ok(lexed) => lexed,
        Err(e) => {
            println!("{}", e);
            return Ok(1);
        }
    };
    let lex_time = started.elapsed();
    for diagnostic in &lexed.diagnostics {
        println!("{}", diagnostic);
    }

    if options.show_tokens {
        print_tokens(&lexed.tokens);
        return Ok(0);
    }

    if options.compile {
        match AsmEmitter::new(&lexed.tokens).emit() {
            Ok(listing) => println!("{}", listing),
            Err(e) => {
                println!("{}", e);
                return Ok(1);
            }
        }
    }

    if !(options.interpret || options.tui) {
        return Ok(0);
    }

    let started = Instant::now();
    let mut interpreter =
        Interpreter::new(lexed.tokens, options.engine_config()).with_loader(FsLoader);
    // A halt has already been reported on the console
    let _ = interpreter.run();
    let run_time = started.elapsed();

    let interpreter = if options.tui {
        inspect(interpreter, source)?
    } else {
        interpreter
    };

    report(&options, &interpreter);
    if options.time {
        println!(
            "Lexer completed lexing in {:.4} seconds and lexed {} tokens\nInterpreting took {:.5} seconds",
            lex_time.as_secs_f64(),
            lexed.count.saturating_sub(1),
            run_time.as_secs_f64()
        );
    }

    Ok(interpreter.exit_code().unwrap_or(0))
}

/// Interactive loop over one persistent interpreter
fn repl(options: &Options) -> Result<i32, Box<dyn Error>> {
    let config = options.engine_config();
    let mut interpreter = Interpreter::new(Vec::new(), config).with_loader(FsLoader);
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!(" >> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(0);
        }
        let input = line.trim_end();
        if input == ":q" {
            return Ok(0);
        }

        let lexed = match tokenize(input, "finn-repl") {
            Ok(lexed) => lexed,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        for diagnostic in &lexed.diagnostics {
            println!("{}", diagnostic);
        }
        if options.show_tokens {
            print_tokens(&lexed.tokens);
            continue;
        }

        interpreter.load(lexed.tokens);
        let _ = interpreter.run();
        if let Some(code) = interpreter.exit_code() {
            return Ok(code);
        }
        report(options, &interpreter);
    }
}

/// Open the step inspector over a recorded run
fn inspect(interpreter: Interpreter, source: String) -> Result<Interpreter, Box<dyn Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(interpreter, source);
    let res = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(app.into_interpreter())
}

fn print_tokens(tokens: &[Token]) {
    for token in tokens {
        println!("{}", token);
    }
}

/// Post-run reports selected by flags
fn report(options: &Options, interpreter: &Interpreter) {
    if options.show_variables {
        println!("Variables:");
        for (name, value) in interpreter.namespaces().sorted_variables() {
            println!("  {}: {}", name, value.repr());
        }
    }

    if let Some(name) = &options.deconstruct {
        match interpreter.namespaces().procedure(name) {
            Some(body) => {
                println!("{}:", name);
                for token in body.iter() {
                    println!("  {}", token.kind);
                }
            }
            None => println!("Undefined procedure '{}'", name),
        }
    }

    if options.memory_report {
        println!("{}", interpreter.memory().usage().render());
    }
}
