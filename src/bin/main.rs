use libkaleido::repl;
use std::io;
use tracing_subscriber::EnvFilter;

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();

    println!("Hello! This is the Kaleidoscope language!");
    println!("Feel free to type in definitions and expressions");
    repl::start()
}
