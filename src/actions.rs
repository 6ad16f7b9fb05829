use anyhow::{bail, Context, Result};
use gimme::{EnvironmentRegistry, Executor, RequestCatalog, DEFAULT_ENVIRONMENT};
use std::{path::PathBuf, process};

const REQUESTS_FILE: &str = "requests.json";
const ENVIRONMENTS_FILE: &str = "envs.json";

pub fn action_gimme(c: &seahorse::Context) {
    run(c).unwrap_or_else(|e| {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    })
}

/// seahorse only knows one long name per flag.
pub fn normalize_args(args: Vec<String>) -> Vec<String> {
    args.into_iter()
        .map(|a| if a == "--environment" { "--env".to_string() } else { a })
        .collect()
}

#[derive(Debug)]
struct Settings {
    request: Option<String>,
    environment: Option<String>,
    requests_file: PathBuf,
    environments_file: PathBuf,
    list: bool,
    echo: bool,
}

impl Settings {
    fn from_context(c: &seahorse::Context) -> Self {
        let path_flag = |name: &str, default: &str| {
            c.string_flag(name)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(default))
        };
        Self {
            request: c.args.first().cloned(),
            environment: c.string_flag("env").ok(),
            requests_file: path_flag("requests_file", REQUESTS_FILE),
            environments_file: path_flag("environments_file", ENVIRONMENTS_FILE),
            list: c.bool_flag("list"),
            echo: c.bool_flag("output_all_requests"),
        }
    }
}

fn run(c: &seahorse::Context) -> Result<()> {
    let settings = Settings::from_context(c);
    let environments = EnvironmentRegistry::from_file(&settings.environments_file)
        .with_context(|| format!("Failed to load environments from {:?}", settings.environments_file))?;
    let requests = RequestCatalog::from_file(&settings.requests_file)
        .with_context(|| format!("Failed to load requests from {:?}", settings.requests_file))?;

    if settings.list {
        print_request_list(&requests);
        return Ok(());
    }
    let Some(request) = settings.request else {
        println!("Type -h for help");
        return Ok(());
    };
    let environment = match settings.environment {
        Some(env) => env,
        None if environments.has_default() => DEFAULT_ENVIRONMENT.to_string(),
        None => bail!(
            "--env is required, or name one environment {:?}",
            DEFAULT_ENVIRONMENT
        ),
    };

    let executor = Executor::new(&requests, &environments).echo(settings.echo);
    let response = executor.make_call(&request, &environment)?;
    // echo has already printed it
    if !settings.echo {
        println!("{}", serde_json::to_string_pretty(&response)?);
    }
    Ok(())
}

fn print_request_list(requests: &RequestCatalog) {
    for (name, description) in requests.list() {
        println!("Name: {}", name);
        if let Some(description) = description {
            println!("Description: {}", description);
        }
        println!("{}", "-".repeat(20));
    }
}
