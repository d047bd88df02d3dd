mod clean_cmd;
mod cli;
mod inspect_cmd;
mod preview_cmd;
mod prompt;
mod shared;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = Cli::parse();
    shared::init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        cli::Commands::Clean {
            paths,
            mode,
            interactive,
            output_dir,
            min_chars,
            resize_cover,
        } => clean_cmd::run(clean_cmd::CleanArgs {
            paths,
            mode,
            interactive,
            output_dir,
            min_chars,
            resize_cover,
        }),
        cli::Commands::Inspect { ref file, ref format } => inspect_cmd::run(file, format),
        cli::Commands::Preview { ref file, ref out } => preview_cmd::run(file, out),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
