use std::io::{self, BufRead, Write};

use anyhow::{bail, Context};
use chrono::Utc;
use visualizer_core::wizard::SubmissionPayload;
use visualizer_core::{JobId, ViewStatus};
use visualizer_engine::{EngineEvent, EngineHandle};
use visualizer_logging::{viz_info, LogDestination};

use super::cli::{Args, Command, ScreenOptions};
use super::config::AppConfig;
use super::history::History;
use super::intake::{self, ScopeAnswers};
use super::render::{self, Renderer};

enum Session {
    Submit {
        payload: SubmissionPayload,
        track: bool,
    },
    Track(JobId),
    Regenerate(JobId),
}

pub fn run_app(args: Args) -> anyhow::Result<()> {
    let mut config = AppConfig::load(&args.config).context("loading configuration")?;
    config.apply_overrides(args.base_url, args.poll_interval_ms);

    visualizer_logging::initialize(if config.log_to_file {
        LogDestination::File(config.log_path())
    } else {
        LogDestination::Terminal
    });

    let session = match args.command {
        Command::History => {
            print_history(&History::load(&config.state_dir));
            return Ok(());
        }
        Command::Submit {
            categories,
            options,
        } => {
            let image = intake::load_image(&options.image)?;
            let payload = intake::flat_payload(&categories, &options, image)
                .context("building the order")?;
            submission(payload, &options)
        }
        Command::SubmitScoped {
            patio,
            windows,
            doors,
            door_type,
            options,
        } => {
            let answers = ScopeAnswers {
                patio,
                windows,
                doors,
                door_type,
            };
            let image = intake::load_image(&options.image)?;
            let payload = intake::scoped_payload(answers, &options, image)
                .context("building the order")?;
            submission(payload, &options)
        }
        Command::Track { job_id } => Session::Track(job_id),
        Command::Regenerate { job_id } => Session::Regenerate(job_id),
    };

    let settings = config.tracker_settings()?;
    let engine = EngineHandle::new(settings).context("starting the engine")?;
    let mut history = History::load(&config.state_dir);
    drive(&engine, session, &mut history, &config)
}

fn submission(payload: SubmissionPayload, options: &ScreenOptions) -> Session {
    Session::Submit {
        payload,
        track: !options.no_track,
    }
}

fn drive(
    engine: &EngineHandle,
    session: Session,
    history: &mut History,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let mut tracked = None;
    let mut track_after_submit = true;
    match session {
        Session::Submit { payload, track } => {
            track_after_submit = track;
            println!("Uploading {}...", payload.image.file_name);
            engine.submit(payload);
        }
        Session::Track(job_id) => {
            tracked = Some(job_id);
            engine.track(job_id);
        }
        Session::Regenerate(job_id) => {
            tracked = Some(job_id);
            engine.regenerate(job_id);
        }
    }

    let mut renderer = Renderer::default();
    while let Some(event) = engine.recv() {
        match event {
            EngineEvent::Submitted { job_id } => {
                println!("Created visualization #{job_id}");
                remember(history, config, job_id, "pending");
                if !track_after_submit {
                    return Ok(());
                }
                tracked = Some(job_id);
                engine.track(job_id);
            }
            EngineEvent::SubmitFailed { error } => bail!("submission failed: {error}"),
            EngineEvent::RegenerateFailed { job_id, error } => {
                bail!("could not regenerate visualization #{job_id}: {error}")
            }
            EngineEvent::View { job_id, view } => {
                if tracked != Some(job_id) {
                    continue;
                }
                for line in renderer.update(&view) {
                    println!("{line}");
                }
                if !render::is_settled(&view) {
                    continue;
                }
                for line in render::summary(&view) {
                    println!("{line}");
                }
                remember(history, config, job_id, render::status_name(view.status));
                if view.status == ViewStatus::Failed
                    && view.can_retry
                    && confirm("Retry this visualization? [y/N] ")?
                {
                    renderer.reset();
                    engine.retry(job_id);
                    continue;
                }
                engine.dispose(job_id);
                return Ok(());
            }
            EngineEvent::Interrupted => {
                if let Some(job_id) = tracked {
                    engine.dispose(job_id);
                }
                println!("Interrupted.");
                return Ok(());
            }
        }
    }
    bail!("engine stopped unexpectedly")
}

fn remember(history: &mut History, config: &AppConfig, job_id: JobId, status: &str) {
    history.record(job_id, status, Utc::now());
    if let Err(err) = history.save(&config.state_dir) {
        eprintln!("Warning: could not save job history: {err}");
    }
}

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    let accepted = matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes");
    viz_info!("retry prompt answered {}", accepted);
    Ok(accepted)
}

fn print_history(history: &History) {
    if history.entries().is_empty() {
        println!("No visualizations yet.");
        return;
    }
    for entry in history.entries() {
        println!(
            "#{:<8} {:<11} first seen {}",
            entry.job_id,
            entry.last_status,
            entry.first_seen.format("%Y-%m-%d %H:%M UTC")
        );
    }
}
