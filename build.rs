// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common shape of a boolean switch
fn flag(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id).action(ArgAction::SetTrue).help(help)
}

fn build_cli() -> Command {
    Command::new("reposync")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Reposync Contributors")
        .about("Copy .rpm packages into a repository tree and regenerate its metadata")
        .arg(
            Arg::new("source")
                .required(true)
                .help("Package file or directory to get .rpm's from"),
        )
        .arg(
            Arg::new("destination")
                .required(true)
                .help("Repository directory to put .rpm's into"),
        )
        .arg(
            flag("recursive", "Copy packages from subdirectories of the source too")
                .short('r')
                .long("recursive"),
        )
        .arg(
            flag("purge", "Purge (do not back up) superseded packages")
                .short('p')
                .long("purge"),
        )
        .arg(
            Arg::new("execute")
                .short('x')
                .long("execute")
                .value_name("PROGRAM")
                .default_value("/usr/bin/createrepo")
                .help("Program to run on the destination afterwards (empty to skip)"),
        )
        .arg(flag("no_regenerate", "Do not run the regeneration program").long("no-regenerate"))
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECS")
                .help("Give up on the regeneration program after this many seconds"),
        )
        .arg(
            Arg::new("on_duplicate")
                .long("on-duplicate")
                .value_parser(["last-wins", "first-wins", "error"])
                .default_value("last-wins")
                .help("How to resolve two files providing the same package in one scan"),
        )
        .arg(flag("strict", "Abort when a candidate file is not a readable package").long("strict"))
        .arg(flag("dry_run", "Show what would be copied without changing anything").long("dry-run"))
        .arg(
            flag("verbose", "Print verbose output")
                .short('v')
                .long("verbose"),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("reposync.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
