//! Integration tests for slicebuild

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// A registry with one bunch plus a config file pointing at it
    struct Fixture {
        temp: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let files = [
                (
                    "slices/slices-1/os/debian-8",
                    "OS\ndebian-8\nFROM\ndebian:8\nRUN\napt-get update",
                ),
                (
                    "slices/slices-1/lang/ruby-2.3",
                    "OS\ndebian-8\nRUN\napt-get install -y ruby",
                ),
                (
                    "slices/slices-1/app/jekyll-3",
                    "OS\ndebian-8\nDEP\nruby-2\nRUN\ngem install jekyll\nEXPOSE\n4000",
                ),
                ("slices/slices-1/README.md", "Slices for debian"),
                (
                    "slices/slices-2/app/jekyll-4",
                    "OS\ndebian-8\nRUN\ngem install jekyll",
                ),
            ];
            for (path, content) in files {
                let path = temp.path().join(path);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(path, content).unwrap();
            }

            let fixture = Self { temp };
            let config = format!(
                "[registry]\nroot = {:?}\n\n[output]\ndir = {:?}\n",
                fixture.root().display().to_string(),
                fixture.out_dir().display().to_string(),
            );
            fs::write(fixture.config_path(), config).unwrap();
            fixture
        }

        fn root(&self) -> PathBuf {
            self.temp.path().join("slices")
        }

        fn out_dir(&self) -> PathBuf {
            self.temp.path().join("out")
        }

        fn config_path(&self) -> PathBuf {
            self.temp.path().join("config.toml")
        }

        fn sb(&self) -> Command {
            let mut cmd = sb();
            cmd.arg("--config").arg(self.config_path());
            cmd
        }
    }

    fn sb() -> Command {
        let mut cmd = cargo_bin_cmd!("sb");
        cmd.env_remove("SB_CONFIG").env_remove("SB_ROOT");
        cmd
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn help_displays() {
        sb()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("versioned slices"));
    }

    #[test]
    fn version_displays() {
        sb()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("sb"));
    }

    #[test]
    fn make_writes_shell_script_to_default_location() {
        let fixture = Fixture::new();
        fixture
            .sb()
            .args(["make", "jekyll", "debian"])
            .assert()
            .success()
            .stdout(predicate::str::contains("jekyll-3"));

        let script = read(&fixture.out_dir().join("jekyll-3").join("jekyll-3.sh"));
        assert_eq!(
            script,
            "# debian-8\napt-get update\n\
             # ruby-2.3\napt-get install -y ruby\n\
             # jekyll-3\ngem install jekyll\n"
        );
    }

    #[test]
    fn make_dockerfile_to_stdout() {
        let fixture = Fixture::new();
        fixture
            .sb()
            .args([
                "make",
                "jekyll,ruby",
                "debian-8",
                "-f",
                "docker",
                "-o",
                "-",
            ])
            .assert()
            .success()
            .stdout(predicate::eq(
                "FROM debian:8\n\
                 RUN apt-get update\n\
                 RUN apt-get install -y ruby\n\
                 RUN gem install jekyll\n\
                 EXPOSE 4000\n",
            ));
    }

    #[test]
    fn make_replaces_explicit_output_file() {
        let fixture = Fixture::new();
        let out = fixture.temp.path().join("custom").join("ruby.sh");
        fs::create_dir_all(out.parent().unwrap()).unwrap();
        fs::write(&out, "stale").unwrap();

        fixture
            .sb()
            .args(["make", "ruby"])
            .arg("-o")
            .arg(&out)
            .assert()
            .success();

        assert_eq!(
            read(&out),
            "# debian-8\napt-get update\n# ruby-2.3\napt-get install -y ruby\n"
        );
    }

    #[test]
    fn make_reports_every_missing_slice() {
        let fixture = Fixture::new();
        fixture
            .sb()
            .args(["make", "jekyll,node,ruby-3", "debian"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Missing slices: node, ruby-3"))
            .stderr(predicate::str::contains("sb find"));

        assert!(!fixture.out_dir().exists());
    }

    #[test]
    fn make_rejects_unknown_format() {
        let fixture = Fixture::new();
        fixture
            .sb()
            .args(["make", "jekyll", "-f", "yaml"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("yaml"));
    }

    #[test]
    fn root_flag_overrides_config() {
        let fixture = Fixture::new();
        let empty = TempDir::new().unwrap();
        fixture
            .sb()
            .arg("--root")
            .arg(empty.path().join("nowhere"))
            .args(["find"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("sb fetch"));
    }

    #[test]
    fn find_lists_compatible_slices() {
        let fixture = Fixture::new();
        fixture
            .sb()
            .args(["find", "-f", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("jekyll-3"))
            .stdout(predicate::str::contains("ruby-2.3"))
            .stdout(predicate::str::contains("debian-8"))
            .stdout(predicate::str::contains("jekyll-4").not())
            .stdout(predicate::str::contains("README").not());
    }

    #[test]
    fn find_filters_by_name_as_json() {
        let fixture = Fixture::new();
        let output = fixture
            .sb()
            .args(["find", "ruby", "-f", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let entries = json.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["label"], "ruby-2.3");
        assert_eq!(entries[0]["path"], "slices-1/lang/ruby-2.3");
    }

    #[test]
    fn find_for_unsupported_os_is_empty() {
        let fixture = Fixture::new();
        fixture
            .sb()
            .args(["find", "--os", "alpine", "-f", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[]"));
    }

    #[test]
    fn config_set_and_show() {
        let fixture = Fixture::new();
        fixture
            .sb()
            .args(["config", "set", "build.runtime", "podman"])
            .assert()
            .success();

        fixture
            .sb()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("runtime = \"podman\""))
            .stdout(predicate::str::contains("[registry]"));
    }

    #[test]
    fn config_set_rejects_unknown_key() {
        let fixture = Fixture::new();
        fixture
            .sb()
            .args(["config", "set", "vm.name", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));
    }

    #[test]
    fn config_path() {
        let fixture = Fixture::new();
        fixture
            .sb()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn completions_generate() {
        sb()
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("sb"));
    }

    #[test]
    fn invalid_command_fails() {
        sb().arg("frobnicate").assert().failure();
    }
}
