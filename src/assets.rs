// Asset path expansion for story pages: short names in the frame config are
// resolved against the study's base directory.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioSource {
    pub src: String,
    #[serde(rename = "type")]
    pub mime: String,
}

pub trait AssetExpander {
    /// One canonical URL for an image reference.
    fn image_url(&self, base_dir: &str, src: &str) -> String;
    /// One source per candidate extension for a logical audio name.
    fn audio_sources(&self, base_dir: &str, name: &str, types: &[String]) -> Vec<AudioSource>;
}

/// `<baseDir>img/<src>` for images, `<baseDir><type>/<name>.<type>` for audio.
/// Absolute URLs pass through untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectoryExpander;

impl AssetExpander for DirectoryExpander {
    fn image_url(&self, base_dir: &str, src: &str) -> String {
        if is_absolute(src) {
            src.to_string()
        } else {
            format!("{}img/{}", with_slash(base_dir), src)
        }
    }

    fn audio_sources(&self, base_dir: &str, name: &str, types: &[String]) -> Vec<AudioSource> {
        if is_absolute(name) {
            let mime = name
                .rsplit_once('.')
                .map(|(_, ext)| format!("audio/{ext}"))
                .unwrap_or_default();
            return vec![AudioSource {
                src: name.to_string(),
                mime,
            }];
        }
        let base = with_slash(base_dir);
        types
            .iter()
            .map(|ext| AudioSource {
                src: format!("{base}{ext}/{name}.{ext}"),
                mime: format!("audio/{ext}"),
            })
            .collect()
    }
}

fn is_absolute(src: &str) -> bool {
    src.contains("://") || src.starts_with('/') || src.starts_with("data:")
}

fn with_slash(base: &str) -> String {
    if base.is_empty() || base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    }
}
