mod cli;
mod templates;

use clap::Parser;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let args = cli::args::Cli::parse();
    let code = match cli::commands::dispatch(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fatal: {e:?}");
            cli::commands::exit_codes::CONFIG_ERROR
        }
    };
    std::process::exit(code);
}
