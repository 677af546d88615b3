use crate::estimator::Operation;
use std::{path::PathBuf, process::ExitStatus};

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error(
        "DLC config file not found: {0:?}. Make sure that the file exists \
         and/or that you passed the path of the config file correctly!"
    )]
    ConfigNotFound(PathBuf),

    #[error("failed to read DLC config file: {1:?}")]
    ReadConfig(#[source] std::io::Error, PathBuf),

    #[error("the DLC config file is not a valid YAML file: {1:?}")]
    ConfigMalformed(#[source] serde_yaml::Error, PathBuf),

    #[error("cannot resolve an empty list of video paths")]
    EmptyVideoSpec,

    #[error("failed to list video directory: {1:?}")]
    ReadVideoDir(#[source] std::io::Error, PathBuf),

    #[error("failed to serialize {0} request")]
    SerializeRequest(Operation, #[source] serde_json::Error),

    #[error("failed to launch python interpreter: {1:?}")]
    SpawnEstimator(#[source] std::io::Error, PathBuf),

    #[error("deeplabcut {operation} failed: {status}")]
    EstimatorFailed {
        operation: Operation,
        status: ExitStatus,
    },
}
