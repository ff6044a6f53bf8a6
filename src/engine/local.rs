// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Local execution path: tool parameters to ffmpeg arguments, run inside
//! the sandboxed engine.

use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::Instrument;

use crate::engine::EngineRegistry;
use crate::errors::{DispatchError, DispatchResult, EngineResult};
use crate::job::{Container, JobResult, ToolParams, ValidatedRequest};
use crate::observability::messages::{engine::*, StructuredLog};
use crate::traits::EngineHandle;

/// Width animated GIFs are scaled to; height follows the aspect ratio.
const GIF_WIDTH: u32 = 320;

/// Engine invocation for one job: file names plus the arguments that sit
/// between the input and the output path.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandPlan {
    pub input_name: String,
    pub output_name: String,
    pub media_type: &'static str,
    options: Vec<String>,
}

impl CommandPlan {
    /// Build the plan for `request`; `stamp` makes the output name unique.
    pub fn for_request(request: &ValidatedRequest, stamp: u128) -> Self {
        let input = request.container;
        let input_name = format!("input.{}", input.extension());

        let (options, extension, media_type): (Vec<String>, &str, &'static str) = match &request.params {
            ToolParams::Gif {
                start,
                duration,
                fps,
            } => (
                vec![
                    "-ss".to_string(),
                    start.to_string(),
                    "-t".to_string(),
                    duration.to_string(),
                    "-vf".to_string(),
                    format!("fps={},scale={}:-1", fps, GIF_WIDTH),
                ],
                "gif",
                "image/gif",
            ),
            ToolParams::Compress { quality } => (
                vec![
                    "-vcodec".to_string(),
                    "libx264".to_string(),
                    "-crf".to_string(),
                    quality.crf().to_string(),
                    "-preset".to_string(),
                    "ultrafast".to_string(),
                ],
                input.extension(),
                input.media_type(),
            ),
            ToolParams::Rotate { rotation } => (
                vec![
                    "-vf".to_string(),
                    rotation.filter().to_string(),
                    "-c:a".to_string(),
                    "copy".to_string(),
                ],
                input.extension(),
                input.media_type(),
            ),
            ToolParams::Convert { format } => {
                let (video, audio) = match format {
                    Container::Webm => ("libvpx-vp9", "libopus"),
                    _ => ("libx264", "aac"),
                };
                (
                    vec![
                        "-c:v".to_string(),
                        video.to_string(),
                        "-c:a".to_string(),
                        audio.to_string(),
                    ],
                    format.extension(),
                    format.media_type(),
                )
            }
            ToolParams::Watermark { region, .. } => (
                vec![
                    "-vf".to_string(),
                    format!(
                        "delogo=x={}:y={}:w={}:h={}",
                        region.x, region.y, region.width, region.height
                    ),
                    "-c:a".to_string(),
                    "copy".to_string(),
                ],
                input.extension(),
                input.media_type(),
            ),
        };

        Self {
            input_name,
            output_name: format!("output_{}.{}", stamp, extension),
            media_type,
            options,
        }
    }

    /// Full argument list (program name excluded) for the given engine paths.
    pub fn render(&self, input_path: &str, output_path: &str) -> Vec<String> {
        let mut args = Vec::with_capacity(self.options.len() + 3);
        args.push("-i".to_string());
        args.push(input_path.to_string());
        args.extend(self.options.iter().cloned());
        args.push(output_path.to_string());
        args
    }
}

/// Runs validated requests on the shared engine.
pub struct LocalProcessor {
    registry: Arc<EngineRegistry>,
}

impl LocalProcessor {
    pub fn new(registry: Arc<EngineRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &EngineRegistry {
        &self.registry
    }

    /// Load the engine if needed and transform the request.
    ///
    /// Load failures are `LocalEngineUnavailable`; anything that goes wrong
    /// during the transform is a job-scoped `Processing` error.
    pub async fn run(&self, request: &ValidatedRequest) -> DispatchResult<JobResult> {
        let engine = self.registry.ensure_loaded().await?;

        transform(&engine, request).await.map_err(|e| {
            TransformFailed {
                tool: request.tool().as_str(),
                error: &e,
            }
            .log();
            DispatchError::Processing(e.to_string())
        })
    }
}

pub async fn transform(engine: &EngineHandle, request: &ValidatedRequest) -> EngineResult<JobResult> {
    let plan = CommandPlan::for_request(request, unix_millis());
    let mut workspace = engine.open_workspace()?;

    workspace
        .write_file(&plan.input_name, &request.request.source)
        .await?;
    let args = plan.render(
        &workspace.path_of(&plan.input_name),
        &workspace.path_of(&plan.output_name),
    );

    let input_size = request.request.source.len();
    let start_msg = TransformStarted {
        tool: request.tool().as_str(),
        input_size,
        args: &args,
    };
    let span = start_msg.span("local_transform");
    start_msg.log();

    let started = Instant::now();
    let output = async {
        workspace.execute(args.clone()).await?;
        workspace.read_file(&plan.output_name).await
    }
    .instrument(span)
    .await?;

    TransformCompleted {
        tool: request.tool().as_str(),
        input_size,
        output_size: output.len(),
        duration: started.elapsed(),
    }
    .log();

    Ok(JobResult::local(output, plan.output_name, plan.media_type))
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}
