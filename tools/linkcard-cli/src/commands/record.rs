//! Capture a single artifact.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use linkcard_capture_engine::{CaptureMode, CaptureSession, CapturedMedia};
use linkcard_card_model::ArtifactRef;

use super::AppContext;

const PUMP_INTERVAL: Duration = Duration::from_millis(100);

pub async fn run(
    ctx: &AppContext,
    mode: CaptureMode,
    output: Option<PathBuf>,
    seconds: Option<u64>,
) -> anyhow::Result<()> {
    let mut session = ctx.session();
    let captured = capture(ctx, &mut session, mode, seconds).await?;

    let ArtifactRef::Inline { mime, data } = &captured.media else {
        anyhow::bail!("Capture produced no inline payload");
    };
    let output = output.unwrap_or_else(|| PathBuf::from(format!("capture.{}", extension(mime))));
    std::fs::write(&output, data)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Saved {mime} ({} bytes) to: {}", data.len(), output.display());

    if let (CaptureMode::Video, Some(ArtifactRef::Inline { data, .. })) = (mode, &captured.frame) {
        let thumb = output.with_extension("jpg");
        std::fs::write(&thumb, data)
            .with_context(|| format!("Failed to write {}", thumb.display()))?;
        println!("Saved thumbnail to: {}", thumb.display());
    }

    session.reset();
    Ok(())
}

/// Drive `session` through one capture and return the finished artifact.
///
/// Photos are taken as soon as the stream is granted. Recordings run until
/// `seconds` elapse (or the configured maximum), Ctrl+C, or the device ends.
pub async fn capture(
    ctx: &AppContext,
    session: &mut CaptureSession,
    mode: CaptureMode,
    seconds: Option<u64>,
) -> anyhow::Result<CapturedMedia> {
    session
        .start(mode)
        .await
        .with_context(|| format!("Could not access the {mode} device"))?;

    if mode == CaptureMode::Photo {
        let captured = session.capture().context("Photo capture failed")?;
        return Ok(captured.clone());
    }

    session.record().context("Recorder failed to start")?;

    let limit = seconds
        .or(Some(ctx.config.capture.max_recording_secs).filter(|s| *s > 0))
        .map(Duration::from_secs);
    match limit {
        Some(limit) => println!("Recording {mode} for {}s...", limit.as_secs()),
        None => println!("Recording {mode}. Press Ctrl+C to stop..."),
    }

    let deadline = limit.map(|l| tokio::time::Instant::now() + l);
    let limit_reached = async {
        match deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    };
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(limit_reached, ctrl_c);
    let mut pump = tokio::time::interval(PUMP_INTERVAL);

    let mut ended_early = false;
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = &mut limit_reached => break,
            _ = pump.tick() => {
                if session.pump() {
                    ended_early = true;
                    break;
                }
            }
        }
    }

    if !ended_early {
        session.stop().await?;
    }

    let captured = session
        .captured()
        .cloned()
        .context("Recording produced no artifact")?;
    if captured.partial {
        println!("Device stopped unexpectedly; kept {}s of partial recording", captured.elapsed_secs);
    } else {
        println!("Recorded {}s", captured.elapsed_secs);
    }
    Ok(captured)
}

fn extension(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        _ => "webm",
    }
}
