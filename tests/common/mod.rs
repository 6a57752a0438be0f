#![allow(dead_code)]

pub mod go_project {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    use tempfile::TempDir;

    /// Root `main.go` configuring both default frameworks.
    pub const MAIN_BOTH: &str = r#"package main

type HttpConfig struct{ Addr string }
type ParamsConfig struct{ Addr string }

// GeneralAPIInfo configures the servers.
func GeneralAPIInfo() (HttpConfig, ParamsConfig) {
	return HttpConfig{Addr: ":8080"}, ParamsConfig{Addr: ":8081"}
}
"#;

    /// Root `main.go` configuring only the http framework.
    pub const MAIN_HTTP: &str = r#"package main

type HttpConfig struct{ Addr string }

// GeneralAPIInfo configures the servers.
func GeneralAPIInfo() HttpConfig {
	return HttpConfig{Addr: ":8080"}
}
"#;

    /// A throwaway Go module on disk.
    pub struct GoProject {
        dir: TempDir,
    }

    impl GoProject {
        /// Module `module_path` with the given root `main.go`.
        pub fn new(module_path: &str, main_go: &str) -> Self {
            let project = GoProject {
                dir: tempfile::tempdir().unwrap(),
            };
            project.write("go.mod", &format!("module {module_path}\n\ngo 1.22\n"));
            project.write("main.go", main_go);
            project
        }

        pub fn root(&self) -> &Path {
            self.dir.path()
        }

        pub fn scratch(&self) -> PathBuf {
            self.root().join("matte")
        }

        pub fn program(&self) -> PathBuf {
            self.scratch().join("app.go")
        }

        pub fn read_program(&self) -> String {
            fs::read_to_string(self.program()).unwrap()
        }

        /// Write `contents` to `relative`, creating parent directories.
        pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
            let path = self.root().join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, contents).unwrap();
            path
        }

        /// Executable shell script standing in for the Go toolchain.
        pub fn stub_compiler(&self, script: &str) -> PathBuf {
            let stub = self.root().join("bin").join("go");
            fs::create_dir_all(stub.parent().unwrap()).unwrap();
            fs::write(&stub, script).unwrap();
            let mut perms = fs::metadata(&stub).unwrap().permissions();
            perms.set_mode(0o755);
            fs::set_permissions(&stub, perms).unwrap();
            stub
        }
    }

    /// Compiler stub that creates the `-o` output file and succeeds.
    pub const COMPILER_OK: &str = "#!/bin/sh\n[ \"$1\" = build ] || exit 3\n: > \"$3\"\n";

    /// Compiler stub that reports a diagnostic and fails.
    pub const COMPILER_FAIL: &str =
        "#!/bin/sh\necho './app.go:12:2: undefined: router.Missing' >&2\nexit 1\n";
}
