#![forbid(unsafe_code)]

use std::env;

use hours_engines::generation::GenerationClient;
use hours_tools::clean_cli::execute_clean_command;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() || args[0] != "clean" {
        return Err("usage: hours clean <input.csv> [output.csv]".to_string());
    }
    let input_path = args
        .get(1)
        .ok_or_else(|| "usage: hours clean <input.csv> [output.csv]".to_string())?;
    let output_path = args.get(2).map(String::as_str);

    let client = GenerationClient::default_from_env();
    let output = execute_clean_command(input_path, output_path, &client)?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
