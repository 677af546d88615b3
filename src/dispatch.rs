use crate::{
    config::{self, ProjectConfig},
    error::Error,
    estimator::PoseEstimator,
    videos::VideoSpec,
};
use std::{fmt, path::PathBuf};
use tracing::{info, warn};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    Predict,
    Label,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Predict => "predict",
            Self::Label => "label",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Request {
    pub(crate) action: Action,
    pub(crate) config_path: PathBuf,
    pub(crate) videos: VideoSpec,
}

/// Load the project config, then hand the request to `estimator`.
///
/// Prediction always exports CSV alongside DeepLabCut's own output. Labeling
/// never keeps the per-frame images, since the rendered video comes out worse
/// when it does.
pub(crate) fn dispatch<E>(request: &Request, estimator: &E) -> Result<(), Error>
where
    E: PoseEstimator + ?Sized,
{
    let project = config::load_config(&request.config_path)?;
    describe(request, &project);

    match request.action {
        Action::Predict => estimator.analyze(&request.config_path, &request.videos, true),
        Action::Label => estimator.render_labels(&request.config_path, &request.videos, false),
    }
}

fn describe(request: &Request, project: &ProjectConfig) {
    info!(
        message = "loaded project config",
        path = ?request.config_path,
        task = project.task().unwrap_or("<unnamed>"),
        keys = project.len()
    );

    match project.snapshot_index() {
        Some(index) => info!(message = "using snapshot", %index),
        None => warn!("project config has no usable snapshotindex, deeplabcut expects one"),
    }

    // listing only feeds the log; deeplabcut does its own expansion
    if let VideoSpec::Directory(dir) = &request.videos {
        match request.videos.expand() {
            Ok(found) if found.is_empty() => {
                warn!(message = "no recognized videos in directory", dir = ?dir)
            }
            Ok(found) => info!(
                message = "found videos in directory",
                dir = ?dir,
                count = found.len()
            ),
            Err(e) => warn!(message = "failed to list video directory", error = %e),
        }
    }
}
