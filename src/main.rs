#[cfg(unix)]
use clap::Parser;

#[cfg(unix)]
use scee_lib::cli::Cli;

/// Main entry point for the scee supervisor
#[cfg(unix)]
fn main() {
    let cli = Cli::parse();

    if let Err(e) = scee_lib::run(cli) {
        eprintln!("scee: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(not(unix))]
fn main() {
    eprintln!("scee: process control relies on POSIX signals and needs a Unix-like system");
    std::process::exit(1);
}
