use crate::{error::Error, videos::VideoSpec};
use serde::Serialize;
use std::{
    fmt,
    path::{Path, PathBuf},
    process::Command,
};
use tracing::{debug, info};

pub(crate) trait PoseEstimator {
    /// Predict keypoints for every frame of `videos`. Results are written
    /// next to each video in DeepLabCut's native format, and additionally as
    /// CSV when `export_csv` is set.
    fn analyze(&self, config_path: &Path, videos: &VideoSpec, export_csv: bool)
        -> Result<(), Error>;

    /// Render previously computed predictions into a labeled copy of each
    /// video. `keep_frames` retains the intermediate per-frame images.
    fn render_labels(
        &self,
        config_path: &Path,
        videos: &VideoSpec,
        keep_frames: bool,
    ) -> Result<(), Error>;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Operation {
    AnalyzeVideos,
    CreateLabeledVideo,
}

impl Operation {
    fn function_name(self) -> &'static str {
        match self {
            Self::AnalyzeVideos => "analyze_videos",
            Self::CreateLabeledVideo => "create_labeled_video",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.function_name())
    }
}

/// Imports deeplabcut inside the child interpreter and calls the requested
/// function with the JSON request in `sys.argv[1]`.
const BOOTSTRAP: &str = "\
import json
import sys

import deeplabcut

request = json.loads(sys.argv[1])
getattr(deeplabcut, request['function'])(
    request['config'], request['videos'], **request['options'])
";

#[derive(Serialize)]
struct Request<'a> {
    function: &'static str,
    config: &'a Path,
    videos: &'a VideoSpec,
    options: Options,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Options {
    Analyze { save_as_csv: bool },
    Label { save_frames: bool },
}

/// Runs the DeepLabCut python package in a child interpreter.
#[derive(Debug, Clone)]
pub(crate) struct DeepLabCut {
    pub(crate) python: PathBuf,
    /// Sets `DLClight=True` for the child, which turns off DeepLabCut's GUI
    /// support. Needed wherever there is no display.
    pub(crate) light_mode: bool,
}

impl Default for DeepLabCut {
    fn default() -> Self {
        Self {
            python: PathBuf::from("python3"),
            light_mode: true,
        }
    }
}

impl DeepLabCut {
    fn command(
        &self,
        operation: Operation,
        config_path: &Path,
        videos: &VideoSpec,
        options: Options,
    ) -> Result<Command, Error> {
        let request = serde_json::to_string(&Request {
            function: operation.function_name(),
            config: config_path,
            videos,
            options,
        })
        .map_err(|e| Error::SerializeRequest(operation, e))?;

        let mut command = Command::new(&self.python);
        command.arg("-c").arg(BOOTSTRAP).arg(request);
        if self.light_mode {
            command.env("DLClight", "True");
        }
        Ok(command)
    }

    fn run(&self, operation: Operation, mut command: Command) -> Result<(), Error> {
        info!(message = "calling deeplabcut", %operation, python = ?self.python);
        debug!(command = ?command);

        let status = command
            .status()
            .map_err(|e| Error::SpawnEstimator(e, self.python.clone()))?;
        if status.success() {
            info!(message = "deeplabcut finished", %operation);
            Ok(())
        } else {
            Err(Error::EstimatorFailed { operation, status })
        }
    }
}

impl PoseEstimator for DeepLabCut {
    fn analyze(
        &self,
        config_path: &Path,
        videos: &VideoSpec,
        export_csv: bool,
    ) -> Result<(), Error> {
        let operation = Operation::AnalyzeVideos;
        let command = self.command(
            operation,
            config_path,
            videos,
            Options::Analyze {
                save_as_csv: export_csv,
            },
        )?;
        self.run(operation, command)
    }

    fn render_labels(
        &self,
        config_path: &Path,
        videos: &VideoSpec,
        keep_frames: bool,
    ) -> Result<(), Error> {
        let operation = Operation::CreateLabeledVideo;
        let command = self.command(
            operation,
            config_path,
            videos,
            Options::Label {
                save_frames: keep_frames,
            },
        )?;
        self.run(operation, command)
    }
}
