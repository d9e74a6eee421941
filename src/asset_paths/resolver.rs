use std::path::{Path, PathBuf};

use super::normalize::{absolutize, normalize, relative_to, to_slash};

/// Resolves manifest output paths against a fixed output directory and public path.
///
/// The output directory is normalized once, up front, so every manifest entry of a build is
/// measured against the same absolute base.
#[derive(Debug, Clone)]
pub struct PathResolver {
    working_dir: PathBuf,
    outdir: PathBuf,
    public_path: Option<String>,
}

impl PathResolver {
    /// Build a resolver. Relative `outdir` values are taken relative to `working_dir`, which
    /// must be absolute.
    ///
    /// An empty `public_path` is treated the same as no public path.
    pub fn new(working_dir: &Path, outdir: &str, public_path: Option<&str>) -> Self {
        let working_dir = normalize(working_dir);
        let outdir = absolutize(&working_dir, &slashed(outdir));
        let public_path = public_path
            .filter(|value| !value.is_empty())
            .map(|value| value.trim_end_matches(['/', '\\']).to_string());

        Self {
            working_dir,
            outdir,
            public_path,
        }
    }

    /// Normalized absolute output directory.
    pub fn outdir(&self) -> &Path {
        &self.outdir
    }

    /// Browser-facing path for a manifest output.
    pub fn resolve(&self, output: &str) -> String {
        let target = absolutize(&self.working_dir, &slashed(output));
        let relative = to_slash(&relative_to(&self.outdir, &target));

        match &self.public_path {
            Some(public_path) => format!("{public_path}/{relative}"),
            None => relative,
        }
    }
}

fn slashed(value: &str) -> PathBuf {
    PathBuf::from(value.replace('\\', "/"))
}
