use std::process::ExitCode;

use clap::{Arg, Command};

fn main() -> ExitCode {
    let matches = Command::new("celes")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Celes transpiler")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("build").about("Build the project described by Project.toml"),
        )
        .subcommand(
            Command::new("lex")
                .about("Print the token tree of a celes source file")
                .arg(
                    Arg::new("path")
                        .help("Path to the source file")
                        .required(true)
                        .index(1),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("build", _)) => build(),
        Some(("lex", sub)) => {
            let path = sub.get_one::<String>("path").expect("path is required");
            lex(path)
        }
        _ => ExitCode::FAILURE,
    }
}

fn build() -> ExitCode {
    let text = match celes_common::read_utf8_file("Project.toml") {
        Ok(text) => text,
        Err(_) => {
            eprintln!("Could not find Project.toml");
            return ExitCode::FAILURE;
        }
    };

    let outcome = celes_toml::parse_str("Project.toml", &text);
    if outcome.error.is_some() {
        let lines: Vec<&str> = text.lines().collect();
        eprintln!("Error parsing Project.toml:");
        for item in outcome.report.iter() {
            eprintln!("{}", item.display(&lines));
        }
        return ExitCode::FAILURE;
    }

    let config = outcome.root;
    let Some(name) = config.lookup_str("Build", "Name") else {
        eprintln!("No program name specified");
        return ExitCode::FAILURE;
    };

    println!("Building {name}");
    ExitCode::SUCCESS
}

fn lex(path: &str) -> ExitCode {
    let text = match celes_common::read_utf8_file(path) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("Error reading {path}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let tree = celes_parser::TokenTree::build(&text);
    println!("{tree:#?}");
    ExitCode::SUCCESS
}
