use std::path::PathBuf;

/// How generated frame files are named and looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNaming {
    /// Output directory. Default: `exampleframes`.
    pub dir: PathBuf,
    /// File name prefix. Default: `test`.
    pub prefix: String,
    /// Appended after the frame number. Default: empty.
    pub suffix: String,
    /// Extension including the dot. Default: `.frame`.
    pub extension: String,
}

impl Default for FileNaming {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("exampleframes"),
            prefix: "test".to_string(),
            suffix: String::new(),
            extension: ".frame".to_string(),
        }
    }
}

impl FileNaming {
    /// Path of the per-frame file number `index`.
    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!(
            "{}{index}{}{}",
            self.prefix, self.suffix, self.extension
        ))
    }

    /// Path of the file holding a whole batch.
    pub fn batch_path(&self) -> PathBuf {
        self.dir
            .join(format!("{}{}{}", self.prefix, self.suffix, self.extension))
    }

    /// Candidate paths for a user-supplied name, in lookup order.
    pub fn candidates(&self, name: &str) -> [PathBuf; 5] {
        let with_ext = format!("{name}{}", self.extension);
        let with_suffix = format!("{name}{}{}", self.suffix, self.extension);
        [
            PathBuf::from(name),
            PathBuf::from(&with_ext),
            self.dir.join(&with_ext),
            PathBuf::from(&with_suffix),
            self.dir.join(&with_suffix),
        ]
    }

    /// First candidate for `name` that exists as a file.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let found = self
            .candidates(name)
            .into_iter()
            .find(|path| path.is_file());
        tracing::debug!(name, found = ?found, "resolved frame file");
        found
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn unique_temp_dir(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "wibframe-gen-{label}-{}-{nanos}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn default_names() {
        let naming = FileNaming::default();
        assert_eq!(
            naming.frame_path(7),
            Path::new("exampleframes").join("test7.frame")
        );
        assert_eq!(
            naming.batch_path(),
            Path::new("exampleframes").join("test.frame")
        );
    }

    #[test]
    fn suffix_follows_the_frame_number() {
        let naming = FileNaming {
            dir: PathBuf::from("out"),
            prefix: "run".to_string(),
            suffix: "_a".to_string(),
            extension: ".bin".to_string(),
        };
        assert_eq!(naming.frame_path(12), Path::new("out").join("run12_a.bin"));
        assert_eq!(naming.batch_path(), Path::new("out").join("run_a.bin"));
    }

    #[test]
    fn resolve_tries_candidates_in_order() {
        let dir = unique_temp_dir("resolve");
        let naming = FileNaming {
            dir: dir.clone(),
            suffix: "_x".to_string(),
            ..FileNaming::default()
        };

        assert_eq!(naming.resolve("test0"), None);

        let suffixed = dir.join("test0_x.frame");
        fs::write(&suffixed, b"").expect("write suffixed");
        assert_eq!(naming.resolve("test0"), Some(suffixed));

        let plain = dir.join("test0.frame");
        fs::write(&plain, b"").expect("write plain");
        assert_eq!(naming.resolve("test0"), Some(plain.clone()));

        // A name that already points at a file wins.
        let direct = plain.to_string_lossy().into_owned();
        assert_eq!(naming.resolve(&direct), Some(plain));

        fs::remove_dir_all(dir).expect("cleanup");
    }
}
