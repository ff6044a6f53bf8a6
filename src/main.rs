// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use media_dispatch::config::load_and_validate_config;
use media_dispatch::engine::Dispatcher;
use media_dispatch::job::{JobRequest, ResultPayload, ToolType};

const USAGE: &str = "Usage: media-dispatch <config.yaml|config.toml> <tool> <input-file> [key=value ...] [--out DIR]";

struct CliArgs {
    config: PathBuf,
    tool: ToolType,
    input: PathBuf,
    options: Vec<(String, String)>,
    out_dir: PathBuf,
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    if args.len() < 3 {
        bail!("{}\nTools: {}", USAGE, tool_names());
    }

    let tool = args[1]
        .parse::<ToolType>()
        .with_context(|| format!("Tools: {}", tool_names()))?;

    let mut options = Vec::new();
    let mut out_dir = PathBuf::from(".");
    let mut rest = args[3..].iter();
    while let Some(arg) = rest.next() {
        if arg == "--out" {
            let Some(dir) = rest.next() else {
                bail!("--out needs a directory\n{}", USAGE);
            };
            out_dir = PathBuf::from(dir);
        } else if let Some((key, value)) = arg.split_once('=') {
            options.push((key.to_string(), value.to_string()));
        } else {
            bail!("expected key=value, got '{}'\n{}", arg, USAGE);
        }
    }

    Ok(CliArgs {
        config: PathBuf::from(&args[0]),
        tool,
        input: PathBuf::from(&args[2]),
        options,
        out_dir,
    })
}

fn tool_names() -> String {
    ToolType::ALL
        .iter()
        .map(|tool| tool.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let cli = parse_args(&args)?;

    let config = load_and_validate_config(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let dispatcher = Dispatcher::from_config(&config)?;

    let source = tokio::fs::read(&cli.input)
        .await
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let mut request = JobRequest::new(cli.tool, source);
    if let Some(name) = cli.input.file_name().and_then(|name| name.to_str()) {
        request = request.with_source_name(name);
    }
    for (key, value) in cli.options {
        request = request.with_option(key, value);
    }

    println!("🎬 {} -> {}", cli.input.display(), cli.tool);

    let handle = dispatcher.submit(request);
    let mut status = handle.status();
    let mut progress = handle.progress();

    let cancel = handle.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let reporter = tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = status.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let current = status.borrow_and_update().clone();
                    match current.message {
                        Some(message) => println!("  [{}] {}", current.state, message),
                        None => println!("  [{}]", current.state),
                    }
                }
                changed = progress.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let current = *progress.borrow_and_update();
                    println!("  {:>3}% {}", current.percent, current.message());
                }
            }
        }
    });

    let outcome = handle.wait().await;
    reporter.abort();
    let result = outcome?;

    let bytes = match &result.payload {
        ResultPayload::Bytes(bytes) => bytes.clone(),
        ResultPayload::Reference(result_ref) => {
            let worker = dispatcher
                .remote_worker()
                .context("remote result without a remote worker")?;
            worker.fetch_result(result_ref).await?
        }
    };

    let file_name = Path::new(&result.filename)
        .file_name()
        .context("result has no file name")?;
    tokio::fs::create_dir_all(&cli.out_dir).await?;
    let path = cli.out_dir.join(file_name);
    tokio::fs::write(&path, &bytes)
        .await
        .with_context(|| format!("writing {}", path.display()))?;

    println!(
        "✅ {} ({}, {} bytes, {})",
        path.display(),
        result.media_type,
        bytes.len(),
        result.origin
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn test_parse_options_and_out_dir() {
        let cli = parse_args(&args(&[
            "configs/media-dispatch.yaml",
            "gif",
            "clip.mp4",
            "fps=12",
            "--out",
            "/tmp/out",
            "start=2",
        ]))
        .unwrap();

        assert_eq!(cli.tool, ToolType::Gif);
        assert_eq!(cli.input, PathBuf::from("clip.mp4"));
        assert_eq!(cli.out_dir, PathBuf::from("/tmp/out"));
        assert_eq!(
            cli.options,
            vec![
                ("fps".to_string(), "12".to_string()),
                ("start".to_string(), "2".to_string())
            ]
        );
    }

    #[test]
    fn test_rejects_unknown_tool_and_bare_words() {
        assert!(parse_args(&args(&["c.yaml", "sharpen", "clip.mp4"])).is_err());
        assert!(parse_args(&args(&["c.yaml", "compress", "clip.mp4", "high"])).is_err());
        assert!(parse_args(&args(&["c.yaml", "compress"])).is_err());
    }
}
