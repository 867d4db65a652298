//! Output filename construction
//!
//! Generated files follow `<3-digit-index>_<type>_<slug(name)>[_vN].<ext>`
//! so a run's output directory sorts in queue order.

/// Lower-case a name and collapse non-alphanumeric runs into single
/// underscores, trimming leading/trailing ones
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

/// Build the output filename for one queue position
pub fn build_filename(
    index: usize,
    asset_type: &str,
    name: &str,
    version: Option<u32>,
    ext: &str,
) -> String {
    let version_suffix = version.map(|v| format!("_v{}", v)).unwrap_or_default();
    format!(
        "{:03}_{}_{}{}.{}",
        index,
        asset_type,
        slug(name),
        version_suffix,
        ext
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_basic() {
        assert_eq!(slug("Ferrari Cart Morph"), "ferrari_cart_morph");
        assert_eq!(slug("The  Solution!"), "the_solution");
        assert_eq!(slug("--edge--case--"), "edge_case");
        assert_eq!(slug("already_fine"), "already_fine");
    }

    #[test]
    fn test_slug_collapses_runs() {
        assert_eq!(slug("a   &   b"), "a_b");
        assert_eq!(slug("(03) Intro: part #2"), "03_intro_part_2");
    }

    #[test]
    fn test_build_filename_with_version() {
        assert_eq!(
            build_filename(1, "image", "Ferrari Cart Morph", Some(1), "png"),
            "001_image_ferrari_cart_morph_v1.png"
        );
    }

    #[test]
    fn test_build_filename_no_version() {
        assert_eq!(
            build_filename(12, "audio", "Theme Song", None, "mp3"),
            "012_audio_theme_song.mp3"
        );
    }

    #[test]
    fn test_build_filename_large_index() {
        assert_eq!(
            build_filename(1234, "video", "Outro", None, "mp4"),
            "1234_video_outro.mp4"
        );
    }
}
