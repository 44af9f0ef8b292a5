//! Category tree walker: depth-bounded descent over the ingestion root.
//!
//! The root's first three directory levels map to category, subcategory,
//! and sub-subcategory. Directory entries are sorted explicitly so
//! traversal order is deterministic.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;
use crate::types::CategoryPath;

/// One image file discovered under the category tree.
#[derive(Debug, Clone)]
pub struct DiscoveredImage {
    /// Full path to the file
    pub path: PathBuf,
    /// Category hierarchy derived from the directory levels
    pub categories: CategoryPath,
}

/// A leaf directory whose image files share one category path.
#[derive(Debug, Clone)]
struct LeafDir {
    dir: PathBuf,
    categories: CategoryPath,
}

/// Discovers image files and their category hierarchy.
pub struct CategoryWalker {
    extensions: Vec<String>,
}

impl CategoryWalker {
    /// Create a walker accepting the given extensions (case-insensitive).
    pub fn new(supported_formats: &[String]) -> Self {
        Self {
            extensions: supported_formats.iter().map(|f| f.to_lowercase()).collect(),
        }
    }

    /// Plan the traversal of `root` and return a lazy file sequence.
    ///
    /// Leaf directories are enumerated eagerly (at most three listing
    /// levels); their files are listed lazily as the sequence is
    /// consumed. The sequence is finite and non-restartable.
    pub fn walk(&self, root: &Path) -> Result<ImageWalk, PipelineError> {
        let mut leaves = Vec::new();

        for category_dir in sorted_dirs(root)? {
            let category = dir_name(&category_dir);
            let sub_dirs = sorted_dirs(&category_dir)?;

            // A category with no subdirectories is itself the leaf.
            if sub_dirs.is_empty() {
                leaves.push(LeafDir {
                    dir: category_dir,
                    categories: CategoryPath::new(&category),
                });
                continue;
            }

            for sub_dir in sub_dirs {
                let subcategory = dir_name(&sub_dir);
                let sub_sub_dirs = sorted_dirs(&sub_dir)?;

                if sub_sub_dirs.is_empty() {
                    leaves.push(LeafDir {
                        dir: sub_dir,
                        categories: CategoryPath::with_sub(&category, &subcategory),
                    });
                } else {
                    // Documented quirk: when sub-subdirectories exist,
                    // loose files directly under the subcategory are
                    // silently skipped.
                    for sub_sub_dir in sub_sub_dirs {
                        let sub_subcategory = dir_name(&sub_sub_dir);
                        leaves.push(LeafDir {
                            dir: sub_sub_dir,
                            categories: CategoryPath::with_sub_sub(
                                &category,
                                &subcategory,
                                &sub_subcategory,
                            ),
                        });
                    }
                }
            }
        }

        Ok(ImageWalk {
            leaves: leaves.into(),
            pending: VecDeque::new(),
            extensions: self.extensions.clone(),
        })
    }
}

/// Lazy, finite, non-restartable sequence of discovered images.
#[derive(Debug)]
pub struct ImageWalk {
    leaves: VecDeque<LeafDir>,
    pending: VecDeque<DiscoveredImage>,
    extensions: Vec<String>,
}

impl ImageWalk {
    fn list_leaf(&self, leaf: &LeafDir) -> Result<Vec<DiscoveredImage>, PipelineError> {
        let mut files = sorted_files(&leaf.dir)?;
        files.retain(|path| has_accepted_extension(path, &self.extensions));
        Ok(files
            .into_iter()
            .map(|path| DiscoveredImage {
                path,
                categories: leaf.categories.clone(),
            })
            .collect())
    }
}

impl Iterator for ImageWalk {
    type Item = Result<DiscoveredImage, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(image) = self.pending.pop_front() {
                return Some(Ok(image));
            }
            let leaf = self.leaves.pop_front()?;
            match self.list_leaf(&leaf) {
                Ok(images) => self.pending = images.into(),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn has_accepted_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext_lower = ext.to_lowercase();
            extensions.iter().any(|accepted| *accepted == ext_lower)
        })
        .unwrap_or(false)
}

fn sorted_entries(
    path: &Path,
    want_dirs: bool,
) -> Result<Vec<PathBuf>, PipelineError> {
    let walk_err = |source: std::io::Error| PipelineError::Walk {
        path: path.to_path_buf(),
        source,
    };

    let mut out = Vec::new();
    for entry in std::fs::read_dir(path).map_err(walk_err)? {
        let entry = entry.map_err(walk_err)?;
        let file_type = entry.file_type().map_err(walk_err)?;
        if file_type.is_dir() == want_dirs {
            out.push(entry.path());
        }
    }
    out.sort();
    Ok(out)
}

fn sorted_dirs(path: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    sorted_entries(path, true)
}

fn sorted_files(path: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    sorted_entries(path, false)
}
