use anyhow::{Context, Result};
use dispatch::{Action, Request};
use estimator::{DeepLabCut, PoseEstimator};
use std::path::PathBuf;
use structopt::StructOpt;
use tracing_subscriber::layer::SubscriberExt;

mod config;
mod dispatch;
mod error;
mod estimator;
mod videos;

#[derive(Debug, structopt::StructOpt)]
#[structopt(
    name = "paw-inference",
    about = "Command-line program to analyze (predict paw locations) and label videos \
             with DeepLabCut. Prediction results are stored as HDF5 and CSV files in \
             the folder where the corresponding video resides.",
    after_help = "The mode must come before its flags, otherwise -v/--videos takes the \
                  mode as one of its paths.

EXAMPLES:
    Predict the paw locations for each video in a folder:
        paw-inference predict -c /path/to/dlc/config.yaml -v /path/to/video_folder

    Label a video using the predictions stored next to it:
        paw-inference label -c /path/to/dlc/config.yaml -v /path/to/video_file.mp4"
)]
struct Opt {
    /// Log filter, e.g. `info` or `paw_inference=debug`.
    #[structopt(short, long, default_value = "info", env = "RUST_LOG")]
    log_level: tracing_subscriber::filter::EnvFilter,

    /// Python interpreter with the deeplabcut package installed.
    #[structopt(long, default_value = "python3", parse(from_os_str))]
    python: PathBuf,

    #[structopt(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, structopt::StructOpt)]
enum Mode {
    /// Predict paw locations
    Predict(Target),
    /// Label video
    Label(Target),
}

#[derive(Debug, structopt::StructOpt)]
struct Target {
    /// Path to DLC project config file
    #[structopt(short = "c", long = "cfg", parse(from_os_str))]
    cfg_path: PathBuf,

    /// Absolute path to a video folder or list of absolute video paths to run
    /// on. When passing a folder, only "avi", "mp4", "mov", "mpeg", "mkv" are
    /// processed
    #[structopt(
        short = "v",
        long = "videos",
        required = true,
        min_values = 1,
        parse(from_os_str)
    )]
    videos: Vec<PathBuf>,
}

impl Mode {
    fn into_request(self) -> Result<Request, error::Error> {
        let (action, target) = match self {
            Self::Predict(target) => (Action::Predict, target),
            Self::Label(target) => (Action::Label, target),
        };
        Ok(Request {
            action,
            config_path: target.cfg_path,
            videos: videos::resolve(target.videos)?,
        })
    }
}

fn run<E>(mode: Option<Mode>, estimator: &E) -> Result<()>
where
    E: PoseEstimator + ?Sized,
{
    let mode = match mode {
        Some(mode) => mode,
        None => {
            println!("Mode: none");
            return Ok(());
        }
    };

    let request = mode.into_request()?;
    println!("Mode: {}", request.action);

    dispatch::dispatch(&request, estimator)
        .with_context(|| format!("failed to {} videos", request.action))
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(opt.log_level),
    )?;

    let estimator = DeepLabCut {
        python: opt.python,
        light_mode: true,
    };
    run(opt.mode, &estimator)
}

#[cfg(test)]
mod tests {
    use super::{run, Opt};
    use crate::{
        error::Error,
        estimator::recording::{Call, Recorder},
        videos::VideoSpec,
    };
    use std::{ffi::OsString, path::PathBuf};
    use structopt::{clap::ErrorKind, StructOpt};

    fn parse<I, T>(args: I) -> structopt::clap::Result<Opt>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args = args.into_iter().map(Into::into);
        Opt::from_iter_safe(std::iter::once(OsString::from("paw-inference")).chain(args))
    }

    fn project(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("config.yaml");
        std::fs::write(&path, "Task: reaching\nsnapshotindex: -1\n").unwrap();
        path
    }

    #[test]
    fn no_mode_does_nothing() {
        let opt = parse(Vec::<OsString>::new()).unwrap();
        assert!(opt.mode.is_none());

        let recorder = Recorder::default();
        run(opt.mode, &recorder).unwrap();
        assert!(recorder.calls.borrow().is_empty());
    }

    #[test]
    fn predict_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = project(dir.path());
        let videos = dir.path().join("videos");
        std::fs::create_dir(&videos).unwrap();

        let opt = parse(vec![
            OsString::from("predict"),
            "-c".into(),
            config_path.clone().into(),
            "-v".into(),
            videos.clone().into(),
        ])
        .unwrap();

        let recorder = Recorder::default();
        run(opt.mode, &recorder).unwrap();
        assert_eq!(
            recorder.calls.into_inner(),
            vec![Call::Analyze {
                config_path,
                videos: VideoSpec::Directory(videos),
                export_csv: true,
            }]
        );
    }

    #[test]
    fn label_file_list_long_flags() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = project(dir.path());

        let opt = parse(vec![
            OsString::from("label"),
            "--cfg".into(),
            config_path.clone().into(),
            "--videos".into(),
            "file1.mp4".into(),
            "file2.mp4".into(),
        ])
        .unwrap();

        let recorder = Recorder::default();
        run(opt.mode, &recorder).unwrap();
        assert_eq!(
            recorder.calls.into_inner(),
            vec![Call::RenderLabels {
                config_path,
                videos: VideoSpec::Files(vec![
                    PathBuf::from("file1.mp4"),
                    PathBuf::from("file2.mp4"),
                ]),
                keep_frames: false,
            }]
        );
    }

    #[test]
    fn videos_before_config_flag() {
        let opt = parse(vec!["predict", "-v", "a.mp4", "b.mp4", "-c", "config.yaml"]).unwrap();
        match opt.mode {
            Some(super::Mode::Predict(target)) => {
                assert_eq!(target.cfg_path, PathBuf::from("config.yaml"));
                assert_eq!(
                    target.videos,
                    vec![PathBuf::from("a.mp4"), PathBuf::from("b.mp4")]
                );
            }
            other => panic!("expected predict, got {:?}", other),
        }
    }

    #[test]
    fn missing_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("config.yaml");
        let opt = parse(vec![
            OsString::from("predict"),
            "-c".into(),
            missing.into(),
            "-v".into(),
            "a.mp4".into(),
        ])
        .unwrap();

        let recorder = Recorder::default();
        let err = run(opt.mode, &recorder).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::ConfigNotFound(_))
        ));
        assert!(recorder.calls.borrow().is_empty());
    }

    #[test]
    fn unknown_mode_is_a_usage_error() {
        let err = parse(vec!["foo", "-c", "config.yaml", "-v", "a.mp4"])
            .err()
            .unwrap();
        assert!(err.use_stderr());
    }

    #[test]
    fn missing_config_flag_is_a_usage_error() {
        let err = parse(vec!["label", "-v", "a.mp4"]).err().unwrap();
        assert_eq!(err.kind, ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn missing_videos_flag_is_a_usage_error() {
        let err = parse(vec!["label", "-c", "config.yaml"]).err().unwrap();
        assert_eq!(err.kind, ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn empty_videos_flag_is_a_usage_error() {
        let err = parse(vec!["predict", "-c", "config.yaml", "-v"])
            .err()
            .unwrap();
        assert!(err.use_stderr());
    }

    #[test]
    fn videos_flag_before_mode_is_rejected() {
        assert!(parse(vec!["-v", "a.mp4", "predict", "-c", "config.yaml"]).is_err());
    }

    #[test]
    fn help_is_not_an_error() {
        let err = parse(vec!["-h"]).err().unwrap();
        assert_eq!(err.kind, ErrorKind::HelpDisplayed);
        assert!(!err.use_stderr());
        assert!(err.message.contains("must come before its flags"));
    }

    #[test]
    fn global_options() {
        let opt = parse(vec!["--python", "/opt/dlc/bin/python", "-l", "debug"]).unwrap();
        assert_eq!(opt.python, PathBuf::from("/opt/dlc/bin/python"));
        assert!(opt.mode.is_none());
    }
}
