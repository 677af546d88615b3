use crate::error::Error;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Extensions DeepLabCut picks up when given a video folder.
pub(crate) const VIDEO_EXTENSIONS: [&str; 5] = ["avi", "mp4", "mov", "mpeg", "mkv"];

/// The videos to run an operation on, in the shape DeepLabCut's `videos`
/// argument expects: a folder path, or a list of video paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub(crate) enum VideoSpec {
    /// Every recognized video inside the folder.
    Directory(PathBuf),
    /// Explicit video paths, used as given.
    Files(Vec<PathBuf>),
}

/// Resolve the tokens passed to `-v/--videos`.
///
/// A single token naming an existing directory resolves to
/// [`VideoSpec::Directory`]. Anything else is taken as a list of video files,
/// in the order given and without checking that they exist.
pub(crate) fn resolve(mut tokens: Vec<PathBuf>) -> Result<VideoSpec, Error> {
    match tokens.len() {
        0 => Err(Error::EmptyVideoSpec),
        1 if tokens[0].is_dir() => Ok(VideoSpec::Directory(tokens.remove(0))),
        _ => Ok(VideoSpec::Files(tokens)),
    }
}

pub(crate) fn is_recognized_video(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| VIDEO_EXTENSIONS.contains(&ext))
}

impl VideoSpec {
    /// The video files an operation will touch.
    ///
    /// Directories are listed non-recursively and filtered by extension; file
    /// lists come back unchanged.
    pub(crate) fn expand(&self) -> Result<Vec<PathBuf>, Error> {
        match self {
            Self::Files(paths) => Ok(paths.clone()),
            Self::Directory(dir) => {
                let read_dir_err = |e| Error::ReadVideoDir(e, dir.clone());
                let mut videos = std::fs::read_dir(dir)
                    .map_err(read_dir_err)?
                    .map(|entry| entry.map(|entry| entry.path()).map_err(read_dir_err))
                    .filter(|path| {
                        path.as_ref()
                            .map_or(true, |path| path.is_file() && is_recognized_video(path))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                videos.sort();
                Ok(videos)
            }
        }
    }
}
