mod actions;
use actions::{action_gimme, normalize_args};
use anyhow::Result;
use seahorse::{App, Flag, FlagType};
use std::env;

fn main() -> Result<()> {
    env_logger::init();
    let args = normalize_args(env::args().collect());
    let app = App::new(env!("CARGO_PKG_NAME"))
        .description(env!("CARGO_PKG_DESCRIPTION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .usage("gimme [request_name] [--env env_name]")
        .action(action_gimme)
        .flag(
            Flag::new("list", FlagType::Bool)
                .description("list all requests and exit")
                .alias("l"),
        )
        .flag(
            Flag::new("env", FlagType::String)
                .description("the environment to use, optional when one is named default")
                .alias("e"),
        )
        .flag(
            Flag::new("requests_file", FlagType::String)
                .description("path to the requests file (default: requests.json)")
                .alias("rf"),
        )
        .flag(
            Flag::new("environments_file", FlagType::String)
                .description("path to the environments file (default: envs.json)")
                .alias("ef"),
        )
        .flag(
            Flag::new("output_all_requests", FlagType::Bool)
                .description("print the response of every request in the chain")
                .alias("o"),
        );
    app.run(args);
    Ok(())
}
