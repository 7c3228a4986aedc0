//! Command-line entry point: compile a source file, report diagnostics,
//! print the evaluated dump, and write the MathML next to the input.

use std::env;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use std::process;

use mathmlc::ast::{dump, mathml};
use mathmlc::parser::Parser;
use mathmlc::scanner::Scanner;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("Usage: mathmlc <source-file>");
        return;
    }

    let src_path = Path::new(&args[1]);
    let file = match File::open(src_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: cannot open {}: {}", src_path.display(), e);
            process::exit(1);
        }
    };

    eprintln!("Parsing {}", src_path.display());
    let scanner = Scanner::from_reader(Box::new(BufReader::new(file)));
    let (program, errors) = Parser::new(scanner).parse();

    for d in errors.iter() {
        eprintln!("{}", d);
    }
    if errors.count() > 0 {
        println!("Compilation with Errors");
    } else {
        println!("Parsed correctly");
    }

    print!("{}", dump::dump(&program));

    let html = mathml::render(&program);
    println!("\n{}", html);

    let out_path = src_path.with_extension("html");
    if let Err(e) = fs::write(&out_path, &html) {
        eprintln!("Error: cannot write {}: {}", out_path.display(), e);
        process::exit(1);
    }
    eprintln!("Wrote {}", out_path.display());
}
