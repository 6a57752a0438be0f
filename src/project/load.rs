use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::error::{MatteError, Result};
use crate::syntax::{parse_file, parse_go_version, parse_module_path, FuncDecl, GoFile};

/// Name of the scratch directory holding the synthesized program.
pub const SCRATCH_DIR: &str = "matte";

/// Module manifest resolved at the project root.
pub const MANIFEST_FILE: &str = "go.mod";

/// One directory of the project.
#[derive(Debug, Clone)]
pub struct Package {
    /// Module path joined with the directory's path relative to the root
    pub import_path: String,
    /// Name from the files' `package` clause; empty when the directory has no Go files
    pub name: String,
    /// Directory the package was read from
    pub dir: PathBuf,
    /// Parsed files, ordered by file name
    pub files: Vec<GoFile>,
}

impl Package {
    /// Every function declaration of the package, in file then source order.
    pub fn functions(&self) -> impl Iterator<Item = (&GoFile, &FuncDecl)> {
        self.files
            .iter()
            .flat_map(|file| file.functions.iter().map(move |func| (file, func)))
    }
}

/// The loaded project tree.
#[derive(Debug, Clone)]
pub struct Project {
    /// Project root directory
    pub root: PathBuf,
    /// Module path from `go.mod`
    pub module_path: String,
    /// Packages in breadth-first order; the root package comes first
    pub packages: Vec<Package>,
}

impl Project {
    /// The package at the project root.
    pub fn root_package(&self) -> Option<&Package> {
        self.packages.first()
    }
}

/// Oldest `go` directive whose `net/http` mux understands `"METHOD /path"`
/// patterns and path wildcards.
pub const MIN_GO_VERSION: (u32, u32) = (1, 22);

/// Read the module path from `<root>/go.mod`.
///
/// # Errors
///
/// `Configuration` if the manifest is missing, unreadable or has no module directive.
pub fn resolve_module_path(root: &Path) -> Result<String> {
    let (manifest, bytes) = read_manifest(root)?;
    parse_module_path(&bytes).ok_or_else(|| {
        MatteError::Configuration(format!(
            "{} declares no module path",
            manifest.display()
        ))
    })
}

/// Check that `<root>/go.mod` asks for at least [`MIN_GO_VERSION`].
///
/// The synthesized program is compiled inside the module, so an older
/// directive switches the mux to its pre-1.22 behavior where no route matches.
/// A missing directive means Go 1.16.
pub fn check_go_version(root: &Path) -> Result<(u32, u32)> {
    let (manifest, bytes) = read_manifest(root)?;
    let (min_major, min_minor) = MIN_GO_VERSION;
    match parse_go_version(&bytes) {
        Some(version) if version >= MIN_GO_VERSION => Ok(version),
        Some((major, minor)) => Err(MatteError::Configuration(format!(
            "{} declares go {major}.{minor}, but the generated routing needs go {min_major}.{min_minor} or newer",
            manifest.display()
        ))),
        None => Err(MatteError::Configuration(format!(
            "{} has no go directive, add 'go {min_major}.{min_minor}' or newer",
            manifest.display()
        ))),
    }
}

fn read_manifest(root: &Path) -> Result<(PathBuf, Vec<u8>)> {
    let manifest = root.join(MANIFEST_FILE);
    match fs::read(&manifest) {
        Ok(bytes) => Ok((manifest, bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(MatteError::Configuration(format!(
            "your project dir '{}' must contain a {MANIFEST_FILE} file, but it does not",
            root.display()
        ))),
        Err(e) => Err(MatteError::Configuration(format!(
            "failed to read the {MANIFEST_FILE} file at {}: {e}",
            manifest.display()
        ))),
    }
}

/// Load every package under `root`, breadth-first.
///
/// One level of directories is fully parsed before any of their
/// subdirectories. A failing directory does not stop its siblings from being
/// parsed, but the call still fails with the first error encountered.
pub fn load_project(root: &Path, scratch_dir: &str) -> Result<Project> {
    let module_path = resolve_module_path(root)?;
    let mut packages = Vec::new();
    let mut first_error: Option<MatteError> = None;

    let mut level = vec![root.to_path_buf()];
    while !level.is_empty() {
        let mut next_level = Vec::new();
        for dir in &level {
            let scan = scan_dir(root, dir, &module_path, scratch_dir);
            if let Some(err) = scan.error {
                error!(dir = %dir.display(), error = %err, "failed to load package");
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
            debug!(
                import_path = %scan.package.import_path,
                files = scan.package.files.len(),
                "package loaded"
            );
            packages.push(scan.package);
            next_level.extend(scan.subdirs);
        }
        level = next_level;
    }

    if let Some(err) = first_error {
        return Err(err);
    }
    info!(
        module = %module_path,
        packages = packages.len(),
        "project loaded"
    );
    Ok(Project {
        root: root.to_path_buf(),
        module_path,
        packages,
    })
}

/// Import path of `dir`: the module path itself for the root, otherwise the
/// module path joined with the relative directory using `/`.
pub fn import_path_for(module_path: &str, root: &Path, dir: &Path) -> String {
    let relative = dir.strip_prefix(root).unwrap_or(dir);
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .filter(|c| !c.is_empty() && c != ".")
        .collect();
    if parts.is_empty() {
        module_path.to_string()
    } else {
        format!("{}/{}", module_path, parts.join("/"))
    }
}

struct DirScan {
    package: Package,
    subdirs: Vec<PathBuf>,
    error: Option<MatteError>,
}

fn scan_dir(root: &Path, dir: &Path, module_path: &str, scratch_dir: &str) -> DirScan {
    let mut scan = DirScan {
        package: Package {
            import_path: import_path_for(module_path, root, dir),
            name: String::new(),
            dir: dir.to_path_buf(),
            files: Vec::new(),
        },
        subdirs: Vec::new(),
        error: None,
    };

    let entries = match read_sorted(dir) {
        Ok(entries) => entries,
        Err(err) => {
            scan.error = Some(err);
            return scan;
        }
    };

    for (path, is_dir) in entries {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if is_dir {
            if !skip_dir(root, &path, &name, scratch_dir) {
                scan.subdirs.push(path);
            }
            continue;
        }
        if !name.ends_with(".go") || name.ends_with("_test.go") {
            continue;
        }
        match parse_file(&path) {
            Ok(file) => {
                if scan.package.name.is_empty() {
                    scan.package.name = file.package_name.clone();
                } else if scan.package.name != file.package_name {
                    if scan.error.is_none() {
                        scan.error = Some(MatteError::Parse {
                            file: path.clone(),
                            line: 1,
                            column: 1,
                            message: format!(
                                "found packages {} and {} in {}",
                                scan.package.name,
                                file.package_name,
                                dir.display()
                            ),
                        });
                    }
                    continue;
                }
                scan.package.files.push(file);
            }
            Err(err) => {
                if scan.error.is_none() {
                    scan.error = Some(err);
                }
            }
        }
    }
    scan
}

fn read_sorted(dir: &Path) -> Result<Vec<(PathBuf, bool)>> {
    let reader = fs::read_dir(dir).map_err(|e| MatteError::io_at("read directory", dir, e))?;
    let mut entries = Vec::new();
    for entry in reader {
        let entry = entry.map_err(|e| MatteError::io_at("read directory", dir, e))?;
        let is_dir = entry
            .file_type()
            .map_err(|e| MatteError::io_at("stat", &entry.path(), e))?
            .is_dir();
        entries.push((entry.path(), is_dir));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

/// Directories the Go tool ignores, plus the scratch directory at the root.
fn skip_dir(root: &Path, path: &Path, name: &str, scratch_dir: &str) -> bool {
    if name.starts_with('.') || name.starts_with('_') || name == "testdata" {
        return true;
    }
    path.parent() == Some(root) && name == scratch_dir
}
