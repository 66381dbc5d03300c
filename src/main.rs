//! oregex - regex matching, substitution and scanning from the command line
//!
//! Results go to stdout as JSON (default) or text; errors go to stderr as a
//! JSON object.

#[cfg(feature = "cli")]
mod cli;

use std::process::ExitCode;

fn main() -> ExitCode {
    #[cfg(feature = "cli")]
    {
        use cli::{parse, Commands};
        use oregex::output::json::format_json_compact;
        use oregex::output::ErrorResponse;

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
            .init();

        let args = parse();
        let format = args.format;
        let compile = &args.compile;

        let result = match args.command {
            Commands::Match {
                pattern,
                input,
                begin,
                end,
            } => cli::handle_match(&pattern, &input, begin, end, compile, format),

            Commands::Sub {
                pattern,
                template,
                input,
            } => cli::handle_sub(&pattern, &template, &input, false, compile, format),

            Commands::Gsub {
                pattern,
                template,
                input,
            } => cli::handle_sub(&pattern, &template, &input, true, compile, format),

            Commands::Scan {
                pattern,
                input,
                max_matches,
            } => cli::handle_scan(&pattern, &input, max_matches, compile, format),

            Commands::Apply {
                pattern,
                template,
                file,
                dry_run,
                no_backup,
                first,
                max_preview,
            } => cli::handle_apply(
                &pattern,
                &template,
                &file,
                dry_run,
                no_backup,
                first,
                max_preview,
                compile,
                format,
            ),

            Commands::Escape { text } => cli::handle_escape(&text, compile, format),

            Commands::Inspect { pattern } => cli::handle_inspect(&pattern, compile, format),
        };

        match result {
            Ok(output) => {
                println!("{}", output);
                ExitCode::SUCCESS
            }
            Err(e) => {
                let error = ErrorResponse::new(cli::error_code(&e), format!("{:#}", e));
                eprintln!("{}", format_json_compact(&error));
                ExitCode::FAILURE
            }
        }
    }

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("CLI feature not enabled. Build with --features cli");
        ExitCode::FAILURE
    }
}
