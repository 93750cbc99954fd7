use std::fs::read_to_string;
use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use json::stringify_pretty;

use lango::{run, ImportConfig};

#[derive(Parser)]
struct Cli {
    /// Program AST as JSON
    #[arg(short = 'c')]
    code: Option<String>,

    /// Directory holding named modules
    #[arg(long = "lib", default_value = "lib")]
    lib_dir: String,

    /// Extension of module files
    #[arg(long = "ext", default_value = "lango")]
    extension: String,

    path: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    let args = Cli::parse();
    let config = ImportConfig {
        lib_dir: args.lib_dir,
        extension: args.extension,
    };

    let scope = if let Some(path) = args.path {
        match read_to_string(&path) {
            Ok(contents) => run(&contents, Some(&path), config),
            Err(error) => {
                eprintln!("Error: couldn't read {}: {}", path.display(), error);
                exit(1);
            }
        }
    } else if let Some(code) = args.code {
        run(&code, None, config)
    } else {
        eprintln!("Error: no code or path to file given");
        exit(1);
    };

    match scope {
        Ok(scope) => println!("{}", stringify_pretty(scope.to_json(), 4)),
        Err(error) => match error.rendered() {
            Some(e) => {
                eprintln!("{}", e);
                exit(1);
            }
            _ => {
                eprintln!("Error: {:?}", error);
                exit(1);
            }
        },
    }
}
