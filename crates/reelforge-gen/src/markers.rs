//! Chapter-marker queue source
//!
//! Marker files are plain text, one entry per line: `<timestamp> <title>`
//! where timestamp is `MM:SS` or `HH:MM:SS`. Malformed lines are skipped
//! with a warning, never a crash.

use crate::descriptor::{AssetDescriptor, ImageParams, Modality};
use crate::queue::QueueSource;
use reelforge_core::{ReelError, Result};
use std::path::{Path, PathBuf};

/// One parsed marker line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterMarker {
    pub timestamp: String,
    pub title: String,
}

/// Parse one marker line; `None` for anything without a leading timestamp
pub fn parse_marker_line(line: &str) -> Option<ChapterMarker> {
    let line = line.trim();
    let (timestamp, title) = line.split_once(char::is_whitespace)?;
    if !is_timestamp(timestamp) {
        return None;
    }
    let title = title.trim();
    if title.is_empty() {
        return None;
    }
    Some(ChapterMarker {
        timestamp: timestamp.to_string(),
        title: title.to_string(),
    })
}

fn is_timestamp(s: &str) -> bool {
    let groups: Vec<&str> = s.split(':').collect();
    if groups.len() != 2 && groups.len() != 3 {
        return false;
    }
    groups.iter().all(|g| {
        !g.is_empty() && g.len() <= 2 && g.chars().all(|c| c.is_ascii_digit())
    })
}

/// Load all well-formed markers from a file, warning about skipped lines
pub fn load_markers(path: &Path) -> Result<Vec<ChapterMarker>> {
    if !path.exists() {
        return Err(ReelError::ConfigMissing(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    let mut markers = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_marker_line(line) {
            Some(marker) => markers.push(marker),
            None => eprintln!(
                "warning: {}:{}: skipping malformed marker line: {}",
                path.display(),
                lineno + 1,
                line.trim()
            ),
        }
    }
    Ok(markers)
}

/// Queue source producing one chapter-card image descriptor per marker
pub struct MarkerQueue {
    path: PathBuf,
    model: String,
}

impl MarkerQueue {
    pub fn new<P: AsRef<Path>>(path: P, model: &str) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            model: model.to_string(),
        }
    }
}

impl QueueSource for MarkerQueue {
    fn build_queue(&self) -> Result<Vec<AssetDescriptor>> {
        let markers = load_markers(&self.path)?;
        let queue = markers
            .iter()
            .enumerate()
            .map(|(i, marker)| {
                let mut d = AssetDescriptor::new(
                    &format!("marker_{:03}", i + 1),
                    &marker.title,
                    &format!(
                        "Minimal chapter title card reading \"{}\", bold typography, dark background",
                        marker.title
                    ),
                    &self.model,
                    Modality::Image,
                );
                d.image = Some(ImageParams {
                    width: 1920,
                    height: 1080,
                });
                d.scene = Some(marker.timestamp.clone());
                d
            })
            .collect();
        Ok(queue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "reelforge_markers_test_{}",
            uuid::Uuid::new_v4()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_parse_marker_line() {
        let m = parse_marker_line("00:45 The Solution").unwrap();
        assert_eq!(m.timestamp, "00:45");
        assert_eq!(m.title, "The Solution");

        let m = parse_marker_line("1:02:33 Deep Dive").unwrap();
        assert_eq!(m.timestamp, "1:02:33");
        assert_eq!(m.title, "Deep Dive");
    }

    #[test]
    fn test_parse_marker_line_malformed() {
        assert!(parse_marker_line("no timestamp here").is_none());
        assert!(parse_marker_line("123:45 too many digits").is_none());
        assert!(parse_marker_line("00:45").is_none()); // no title
        assert!(parse_marker_line("0045 Missing Colon").is_none());
        assert!(parse_marker_line("").is_none());
    }

    #[test]
    fn test_load_markers_skips_malformed() {
        let dir = temp_dir();
        let path = dir.join("markers.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(
            b"00:00 Intro\nthis line is junk\n00:45 The Solution\n\n01:02:33 Outro\n",
        )
        .unwrap();

        let markers = load_markers(&path).unwrap();
        assert_eq!(markers.len(), 3);
        assert_eq!(markers[1].title, "The Solution");
        assert_eq!(markers[2].timestamp, "01:02:33");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_marker_file() {
        let err = load_markers(Path::new("/nonexistent/markers.txt")).unwrap_err();
        assert!(matches!(err, ReelError::ConfigMissing(_)));
    }

    #[test]
    fn test_marker_queue_descriptors() {
        let dir = temp_dir();
        let path = dir.join("markers.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"00:00 Intro\n00:45 The Solution\n").unwrap();

        let queue = MarkerQueue::new(&path, "fal-ai/flux/dev")
            .build_queue()
            .unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue[0].id, "marker_001");
        assert_eq!(queue[1].id, "marker_002");
        assert_eq!(queue[1].name, "The Solution");
        assert_eq!(queue[1].scene.as_deref(), Some("00:45"));
        assert_eq!(queue[1].modality, Modality::Image);
        assert!(queue[1].prompt.contains("The Solution"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
