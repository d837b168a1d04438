use anyhow::{anyhow, Result};
use dyndns::{Config, ConfiguredEnvironment};
use is_terminal::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, PartialEq)]
enum Command {
    Serve,
    Check,
    PrintConfig,
    Delete(String),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_init();

    let mut args = std::env::args();
    let program_name = args.next().unwrap_or_else(|| "dyndns".to_string());
    let (command, config_file) = parse_args(args).ok_or_else(|| {
        anyhow!("usage: {program_name} [check | config | delete <fqdn>] [/path/to/dyndns.yml]")
    })?;

    let config = Arc::new(Config::load(config_file.as_deref())?);
    if command == Command::PrintConfig {
        println!("{config:#?}");
        return Ok(());
    }
    let env = Arc::new(ConfiguredEnvironment::new(config.clone())?);

    match command {
        Command::Check => {
            println!("{}", env.check().await?);
            return Ok(());
        }
        Command::Delete(fqdn) => {
            println!("{}", env.delete_record(&fqdn).await?);
            return Ok(());
        }
        Command::Serve | Command::PrintConfig => {}
    }

    tracing::info!(
        "updating {} zone(s) on {}:{}",
        env.zones().len(),
        config.nameserver,
        config.port
    );
    tracing::info!("API listening on {}", &config.api_bind_addr);
    let api_server = dyndns::new_http(env)?;
    let api_handle = tokio::spawn(api_server);

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("quitting from signal");
        },
        Ok(api_res) = api_handle => {
            if let Err(err) = api_res {
                return Err(err.into())
            }
        }
    }
    tracing::info!("goodbye");
    Ok(())
}

// Arguments after the program name: an optional subcommand, then an optional config file.
fn parse_args(args: impl IntoIterator<Item = String>) -> Option<(Command, Option<PathBuf>)> {
    let args: Vec<String> = args.into_iter().collect();
    let (command, rest) = match args.as_slice() {
        [cmd, rest @ ..] if cmd == "check" => (Command::Check, rest),
        [cmd, rest @ ..] if cmd == "config" => (Command::PrintConfig, rest),
        [cmd, fqdn, rest @ ..] if cmd == "delete" => (Command::Delete(fqdn.clone()), rest),
        [cmd] if cmd == "delete" => return None,
        rest => (Command::Serve, rest),
    };
    match rest {
        [] => Some((command, None)),
        [path] => Some((command, Some(PathBuf::from(path)))),
        _ => None,
    }
}

fn tracing_init() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_ansi(std::io::stdout().is_terminal()))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dyndns=info".into()),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Option<(Command, Option<PathBuf>)> {
        parse_args(args.iter().map(ToString::to_string))
    }

    #[test]
    fn subcommands() {
        assert_eq!(parse(&[]), Some((Command::Serve, None)));
        assert_eq!(
            parse(&["/etc/dyndns.yml"]),
            Some((Command::Serve, Some(PathBuf::from("/etc/dyndns.yml"))))
        );
        assert_eq!(parse(&["check"]), Some((Command::Check, None)));
        assert_eq!(
            parse(&["config", "dyndns.yml"]),
            Some((Command::PrintConfig, Some(PathBuf::from("dyndns.yml"))))
        );
        assert_eq!(
            parse(&["delete", "www.example.com"]),
            Some((Command::Delete("www.example.com".to_string()), None))
        );
        assert_eq!(
            parse(&["delete", "www.example.com", "dyndns.yml"]),
            Some((
                Command::Delete("www.example.com".to_string()),
                Some(PathBuf::from("dyndns.yml"))
            ))
        );
    }

    #[test]
    fn bad_arguments() {
        assert_eq!(parse(&["delete"]), None);
        assert_eq!(parse(&["check", "a.yml", "b.yml"]), None);
        assert_eq!(parse(&["a.yml", "b.yml"]), None);
    }
}
