use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use jugglegraph::runner::{LAYOUT_TIMEOUT, LayoutRunner, apply_token, run_sequence};
use jugglegraph::session::{BuildSession, BuildToken, parse_sequence};
use jugglegraph::svg::{SvgOptions, render_svg};
use jugglegraph::table::{format_graph_summary, format_table, format_throws};
use jugglegraph_ascii_render::{AsciiRenderOptions, render_ascii};
use jugglegraph_engine::EngineClient;
use jugglegraph_layout::{LayoutInput, LayoutResult};
use jugglegraph_state::{JugglingState, LabelFlags};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use crate::cli::{BuildArgs, GraphArgs, OutputFormat, TableArgs, ThrowsArgs};

pub async fn run_graph(client: &EngineClient, args: &GraphArgs) -> Result<()> {
    let document = client
        .graph(args.pattern.props, args.pattern.max_height)
        .await
        .context("failed to fetch state graph")?;
    info!(
        nodes = document.num_nodes,
        edges = document.num_edges,
        "fetched state graph"
    );
    let summary = format_graph_summary(&document);

    let runner = LayoutRunner::spawn()?;
    runner.request(LayoutInput::new(document, args.labels.flags()));
    let layout = runner.latest(LAYOUT_TIMEOUT).await?;
    emit(&layout, args.format, args.output.as_deref())?;
    print_summary(&summary, args.format, args.output.as_deref());
    Ok(())
}

pub async fn run_throws(client: &EngineClient, args: &ThrowsArgs) -> Result<()> {
    let throws = client
        .throws(JugglingState::from(args.state), args.max_height)
        .await
        .context("failed to fetch throws")?;
    print!("{}", format_throws(&throws, args.labels.flags()));
    Ok(())
}

pub async fn run_table(client: &EngineClient, args: &TableArgs) -> Result<()> {
    let table = client
        .table(args.pattern.props, args.pattern.max_height)
        .await
        .context("failed to fetch state table")?;
    print!("{}", format_table(&table, args.labels.flags()));
    Ok(())
}

pub async fn run_build(client: &EngineClient, args: &BuildArgs) -> Result<()> {
    let mut session = BuildSession::new(args.pattern.props, args.pattern.max_height)?;
    let flags = args.labels.flags();
    let runner = LayoutRunner::spawn()?;

    match &args.sequence {
        Some(sequence) => {
            let tokens = parse_sequence(sequence)?;
            let layout = run_sequence(client, &mut session, &runner, &tokens, flags)
                .await?;
            print!("{}", session.describe(flags));
            emit(&layout, args.format, args.output.as_deref())?;
            let summary = format_graph_summary(&session.document());
            print_summary(&summary, args.format, args.output.as_deref());
            Ok(())
        }
        None => interactive(client, &mut session, &runner, flags).await,
    }
}

async fn interactive(
    client: &EngineClient,
    session: &mut BuildSession,
    runner: &LayoutRunner,
    flags: LabelFlags,
) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("enter a throw height, u (undo), r (reset), show or q");
    runner.request(session.layout_input(flags));

    'prompt: loop {
        let state = session.current_state();
        match client.throws(state, session.max_height()).await {
            Ok(throws) => print!("{}", session.describe_candidates(&throws, flags)),
            Err(err) => eprintln!("error: {err}"),
        }
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let tokens = match parse_sequence(&line) {
            Ok(tokens) => tokens,
            Err(err) => {
                eprintln!("error: {err:#}");
                continue;
            }
        };
        for token in tokens {
            match token {
                BuildToken::Quit => break 'prompt,
                BuildToken::Show => {
                    print!("{}", session.describe(flags));
                    let layout = runner.latest(LAYOUT_TIMEOUT).await?;
                    println!("{}", render_ascii(&layout, &AsciiRenderOptions::default()));
                    println!("{}", format_graph_summary(&session.document()));
                }
                token => match apply_token(client, session, token, flags).await {
                    Ok(true) => {
                        runner.request(session.layout_input(flags));
                    }
                    Ok(false) => println!("nothing to undo"),
                    Err(err) => {
                        eprintln!("error: {err:#}");
                        break;
                    }
                },
            }
        }
    }

    print!("{}", session.describe(flags));
    Ok(())
}

/// Printed under an ASCII drawing, or alone when the drawing went to a file.
fn print_summary(summary: &str, format: OutputFormat, output: Option<&Path>) {
    if output.is_some() || format == OutputFormat::Ascii {
        println!("{summary}");
    }
}

fn emit(layout: &LayoutResult, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    let rendered = match format {
        OutputFormat::Ascii => {
            let mut text = render_ascii(layout, &AsciiRenderOptions::default());
            text.push('\n');
            text
        }
        OutputFormat::Svg => render_svg(layout, &SvgOptions::default()),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(layout)?;
            json.push('\n');
            json
        }
    };
    match output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            print!("{rendered}");
            Ok(())
        }
    }
}
