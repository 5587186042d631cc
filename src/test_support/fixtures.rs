//! Test fixtures for common test scenarios.
//!
//! [`ProjectFixture`] lays out a small C project in a temporary directory
//! and keeps its `Quay.toml` in sync with the builder calls made on it.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::MockProcessOutput;

/// Name of the build file written by fixtures.
pub const CONFIG_FILE: &str = "Quay.toml";

/// An on-disk C project.
///
/// Defaults: compiler `cc`, profiles `debug = ["-g"]` and
/// `release = ["-O2"]`, binary `hello.out`, a single `src/main.c`, and no
/// dependencies.
#[derive(Debug)]
pub struct ProjectFixture {
    _dir: TempDir,
    root: PathBuf,
    name: String,
    compiler: Option<String>,
    sources: Vec<String>,
    dependencies: String,
}

impl ProjectFixture {
    /// The default hello-world project.
    pub fn hello() -> Self {
        Self::hello_in("")
    }

    /// The hello-world project, placed in `subdir` of the temporary directory.
    pub fn hello_in(subdir: &str) -> Self {
        let dir = TempDir::new().expect("create fixture dir");
        let root = if subdir.is_empty() {
            dir.path().to_path_buf()
        } else {
            dir.path().join(subdir)
        };
        let fixture = ProjectFixture {
            _dir: dir,
            root,
            name: "hello".to_string(),
            compiler: Some("cc".to_string()),
            sources: vec!["main.c".to_string()],
            dependencies: String::new(),
        };
        fixture.write();
        fixture
    }

    /// Replace the source list, writing a stub file for each entry.
    pub fn with_sources(mut self, sources: &[&str]) -> Self {
        self.sources = sources.iter().map(|s| s.to_string()).collect();
        self.write();
        self
    }

    /// Append raw TOML, normally `[dependencies.*]` tables.
    pub fn with_dependencies(mut self, toml: &str) -> Self {
        self.dependencies = toml.to_string();
        self.write();
        self
    }

    /// Drop `project.setup.compiler`.
    pub fn without_compiler(mut self) -> Self {
        self.compiler = None;
        self.write();
        self
    }

    /// Project root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join(CONFIG_FILE)
    }

    /// Render the build file for the current settings.
    pub fn config(&self) -> String {
        let compiler = match &self.compiler {
            Some(compiler) => format!("compiler = \"{}\"\n", compiler),
            None => String::new(),
        };
        let sources = self
            .sources
            .iter()
            .map(|s| format!("\"{}\"", s))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            r#"[project]
name = "{name}"
authors = ["Test Author"]
version = "0.1.0"
language = "c"

[project.dirs]
source = "src"
include = "include"
build = "build"
deps = "deps"
target = "target"

[project.setup]
type = "out"
{compiler}
[project.setup.files]
sources = [{sources}]
include = ["{name}.h"]

[project.setup.profiles]
debug = ["-g"]
release = ["-O2"]
{dependencies}"#,
            name = self.name,
            compiler = compiler,
            sources = sources,
            dependencies = self.dependencies,
        )
    }

    fn write(&self) {
        let root = self.root();
        std::fs::create_dir_all(root.join("src")).expect("create src");
        std::fs::create_dir_all(root.join("include")).expect("create include");

        for source in &self.sources {
            let path = root.join("src").join(source);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).expect("create source parent");
            }
            let content = if source == "main.c" {
                sources::hello_main(&self.name)
            } else {
                sources::stub(source)
            };
            std::fs::write(path, content).expect("write source");
        }

        std::fs::write(
            root.join("include").join(format!("{}.h", self.name)),
            headers::guard(&self.name),
        )
        .expect("write header");
        std::fs::write(self.config_path(), self.config()).expect("write config");
    }
}

/// Sample C sources.
pub mod sources {
    pub fn hello_main(name: &str) -> String {
        format!(
            r#"#include <stdio.h>
#include "{name}.h"

int main(void) {{
    printf("Hello, World!\n");
    return 0;
}}
"#
        )
    }

    /// A translation unit defining one function named after the file.
    pub fn stub(file: &str) -> String {
        let ident: String = file
            .split('.')
            .next()
            .unwrap_or("stub")
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!("int {ident}_value(void) {{ return 0; }}\n")
    }
}

/// Sample C headers.
pub mod headers {
    pub fn guard(name: &str) -> String {
        let guard = name.to_uppercase().replace('-', "_");
        format!("#ifndef {guard}_H\n#define {guard}_H\n#endif\n")
    }
}

/// Canned compiler outputs.
pub mod outputs {
    use super::MockProcessOutput;

    pub fn compile_error(file: &str, line: u32, message: &str) -> MockProcessOutput {
        MockProcessOutput::failure(1, format!("{}:{}: error: {}", file, line, message))
    }

    pub fn link_undefined_symbol(symbol: &str) -> MockProcessOutput {
        MockProcessOutput::failure(1, format!("undefined reference to `{}'", symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hello_layout() {
        let fixture = ProjectFixture::hello();
        let root = fixture.root();

        assert!(fixture.config_path().is_file());
        assert!(root.join("src/main.c").is_file());
        assert!(root.join("include/hello.h").is_file());
        assert!(fixture.config().contains("compiler = \"cc\""));
    }

    #[test]
    fn test_builders_rewrite_config() {
        let fixture = ProjectFixture::hello()
            .with_sources(&["main.c", "util/str.c"])
            .without_compiler();

        let content = std::fs::read_to_string(fixture.config_path()).unwrap();
        assert!(content.contains("sources = [\"main.c\", \"util/str.c\"]"));
        assert!(!content.contains("compiler"));
        assert!(fixture.root().join("src/util/str.c").is_file());
        assert!(toml::from_str::<toml::Table>(&content).is_ok());
    }

    #[test]
    fn test_stub_source() {
        assert_eq!(sources::stub("util/str.c"), "int util_str_value(void) { return 0; }\n");
        assert!(outputs::compile_error("a.c", 3, "boom").stderr.contains("a.c:3"));
    }
}
