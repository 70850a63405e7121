//! Command-line interface for cfgdb.
//!
//! This binary builds the keyword database from a definition tree and
//! queries it.
//!
//! Usage:
//!   cfgdb build `<root>` [--format `<json|yaml>`] [--output `<file>`]
//!   cfgdb lookup `<root>` `<dialect>` `<name>`
//!   cfgdb defects `<root>`

use clap::{Arg, Command};
use std::path::Path;
use std::process::ExitCode;

use cfgdb::{build, Database, Dialect};

fn main() -> ExitCode {
    let matches = Command::new("cfgdb")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Build and query a solver keyword database from CFG definition trees")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("build")
                .about("Build the database and serialize it")
                .arg(
                    Arg::new("root")
                        .help("Root directory of the definition tree")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format ('json' or 'yaml')")
                        .default_value("json"),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Write to a file instead of stdout"),
                ),
        )
        .subcommand(
            Command::new("lookup")
                .about("Look up one keyword by dialect and name")
                .arg(Arg::new("root").required(true).index(1))
                .arg(
                    Arg::new("dialect")
                        .help("Dialect tag (RADIOSS, LS_DYNA, ...)")
                        .required(true)
                        .index(2),
                )
                .arg(Arg::new("name").required(true).index(3)),
        )
        .subcommand(
            Command::new("defects")
                .about("List the defects collected while building")
                .arg(Arg::new("root").required(true).index(1)),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("build", sub)) => {
            let root = sub.get_one::<String>("root").expect("required arg");
            let format = sub.get_one::<String>("format").expect("defaulted arg");
            let output = sub.get_one::<String>("output");
            handle_build(root, format, output.map(String::as_str))
        }
        Some(("lookup", sub)) => {
            let root = sub.get_one::<String>("root").expect("required arg");
            let dialect = sub.get_one::<String>("dialect").expect("required arg");
            let name = sub.get_one::<String>("name").expect("required arg");
            handle_lookup(root, dialect, name)
        }
        Some(("defects", sub)) => {
            let root = sub.get_one::<String>("root").expect("required arg");
            handle_defects(root)
        }
        _ => unreachable!(),
    }
}

fn build_database(root: &str) -> Result<Database, ExitCode> {
    build(Path::new(root)).map_err(|error| {
        eprintln!("Error: {}", error);
        ExitCode::FAILURE
    })
}

fn handle_build(root: &str, format: &str, output: Option<&str>) -> ExitCode {
    let database = match build_database(root) {
        Ok(database) => database,
        Err(code) => return code,
    };

    let serialized = match format {
        "json" => database.to_json().map_err(|e| e.to_string()),
        "yaml" => database.to_yaml().map_err(|e| e.to_string()),
        other => Err(format!("unknown format '{}'", other)),
    };
    let serialized = match serialized {
        Ok(text) => text,
        Err(message) => {
            eprintln!("Error: {}", message);
            return ExitCode::FAILURE;
        }
    };

    match output {
        Some(path) => {
            if let Err(error) = std::fs::write(path, serialized) {
                eprintln!("Error: cannot write {}: {}", path, error);
                return ExitCode::FAILURE;
            }
        }
        None => println!("{}", serialized),
    }
    ExitCode::SUCCESS
}

fn handle_lookup(root: &str, dialect: &str, name: &str) -> ExitCode {
    let database = match build_database(root) {
        Ok(database) => database,
        Err(code) => return code,
    };

    let dialect = match Dialect::from_tag(dialect) {
        Some(dialect) => dialect,
        None => {
            eprintln!("Error: unknown dialect '{}'", dialect);
            return ExitCode::FAILURE;
        }
    };

    match database.lookup(dialect, name) {
        Some(keyword) => match serde_json::to_string_pretty(keyword) {
            Ok(text) => {
                println!("{}", text);
                ExitCode::SUCCESS
            }
            Err(error) => {
                eprintln!("Error: {}", error);
                ExitCode::FAILURE
            }
        },
        None => {
            eprintln!("not found: {} {}", dialect, name);
            ExitCode::FAILURE
        }
    }
}

fn handle_defects(root: &str) -> ExitCode {
    let database = match build_database(root) {
        Ok(database) => database,
        Err(code) => return code,
    };

    for defect in &database.defects {
        println!("{}", defect);
    }
    println!(
        "{} keywords, {} defects",
        database.keywords.len(),
        database.defects.len()
    );
    ExitCode::SUCCESS
}
