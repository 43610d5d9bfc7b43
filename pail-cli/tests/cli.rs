//! End-to-end tests for the pail binary against the local filesystem.

use assert_cmd::Command;
use chrono::Datelike;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn pail() -> Command {
    Command::cargo_bin("pail").unwrap()
}

fn p(dir: &TempDir, name: &str) -> String {
    dir.path().join(name).to_string_lossy().into_owned()
}

mod ls {
    use super::*;

    #[test]
    fn lists_in_lexicographic_order() {
        let dir = TempDir::new().unwrap();
        for name in ["charlie", "alpha", "bravo"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        pail()
            .arg("ls")
            .arg(dir.path())
            .assert()
            .success()
            .stdout("alpha\nbravo\ncharlie\n");
    }

    #[test]
    fn reverse_flag_reverses_order() {
        let dir = TempDir::new().unwrap();
        for name in ["charlie", "alpha", "bravo"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        pail()
            .args(["ls", "-r"])
            .arg(dir.path())
            .assert()
            .success()
            .stdout("charlie\nbravo\nalpha\n");
    }

    #[test]
    fn hides_dotfiles_unless_all() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".hidden"), b"").unwrap();
        fs::write(dir.path().join("shown"), b"").unwrap();

        pail()
            .arg("ls")
            .arg(dir.path())
            .assert()
            .success()
            .stdout("shown\n");

        pail()
            .args(["ls", "-A"])
            .arg(dir.path())
            .assert()
            .success()
            .stdout(".hidden\nshown\n");
    }

    #[test]
    fn sorts_by_size_with_s() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("small"), b"x").unwrap();
        fs::write(dir.path().join("large"), vec![b'x'; 100]).unwrap();

        pail()
            .args(["ls", "-S"])
            .arg(dir.path())
            .assert()
            .success()
            .stdout("large\nsmall\n");
    }

    #[test]
    fn recursive_prints_directory_headers() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/inner.txt"), b"").unwrap();

        pail()
            .args(["ls", "-R"])
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("sub:"))
            .stdout(predicate::str::contains("inner.txt"));
    }

    #[test]
    fn long_format_has_mode_and_size() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("file.txt"), b"12345").unwrap();

        pail()
            .args(["ls", "-l"])
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("-rw"))
            .stdout(predicate::str::contains("5"))
            .stdout(predicate::str::contains("file.txt"));
    }

    #[test]
    fn missing_operand_reports_cannot_access() {
        let dir = TempDir::new().unwrap();
        pail()
            .arg("ls")
            .arg(dir.path().join("nope"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("cannot access"));
    }
}

mod cp {
    use super::*;

    #[test]
    fn copies_a_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("src"), b"payload").unwrap();

        pail()
            .args(["cp", &p(&dir, "src"), &p(&dir, "dst")])
            .assert()
            .success();
        assert_eq!(fs::read(dir.path().join("dst")).unwrap(), b"payload");
    }

    #[test]
    fn no_clobber_keeps_destination() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("src"), b"new").unwrap();
        fs::write(dir.path().join("dst"), b"old").unwrap();

        pail()
            .args(["cp", "-n", &p(&dir, "src"), &p(&dir, "dst")])
            .assert()
            .success();
        assert_eq!(fs::read(dir.path().join("dst")).unwrap(), b"old");
    }

    #[test]
    fn no_clobber_beats_force() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("src"), b"new").unwrap();
        fs::write(dir.path().join("dst"), b"old").unwrap();

        pail()
            .args(["cp", "-f", "-n", &p(&dir, "src"), &p(&dir, "dst")])
            .assert()
            .success();
        assert_eq!(fs::read(dir.path().join("dst")).unwrap(), b"old");
    }

    #[test]
    fn multiple_sources_require_directory_destination() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a"), b"a").unwrap();
        fs::write(dir.path().join("b"), b"b").unwrap();
        fs::write(dir.path().join("plain"), b"before").unwrap();

        pail()
            .args(["cp", &p(&dir, "a"), &p(&dir, "b"), &p(&dir, "plain")])
            .assert()
            .failure()
            .stderr(predicate::str::contains("is not a directory"));
        // Structural error: nothing was touched
        assert_eq!(fs::read(dir.path().join("plain")).unwrap(), b"before");
    }

    #[test]
    fn directory_source_requires_recursive() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("tree")).unwrap();

        pail()
            .args(["cp", &p(&dir, "tree"), &p(&dir, "copy")])
            .assert()
            .failure()
            .stderr(predicate::str::contains("-r not specified"));
        assert!(!dir.path().join("copy").exists());
    }

    #[test]
    fn recursive_copies_a_tree() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("tree/sub")).unwrap();
        fs::write(dir.path().join("tree/a"), b"a").unwrap();
        fs::write(dir.path().join("tree/sub/b"), b"b").unwrap();

        pail()
            .args(["cp", "-r", &p(&dir, "tree"), &p(&dir, "copy")])
            .assert()
            .success();
        assert_eq!(fs::read(dir.path().join("copy/a")).unwrap(), b"a");
        assert_eq!(fs::read(dir.path().join("copy/sub/b")).unwrap(), b"b");
    }

    #[test]
    fn target_directory_flag_collects_sources() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a"), b"a").unwrap();
        fs::write(dir.path().join("b"), b"b").unwrap();

        pail()
            .args([
                "cp",
                "-t",
                &p(&dir, "collected"),
                &p(&dir, "a"),
                &p(&dir, "b"),
            ])
            .assert()
            .success();
        assert!(dir.path().join("collected/a").exists());
        assert!(dir.path().join("collected/b").exists());
    }

    #[test]
    fn copy_into_existing_directory_appends_name() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("src"), b"x").unwrap();
        fs::create_dir(dir.path().join("dest")).unwrap();

        pail()
            .args(["cp", &p(&dir, "src"), &p(&dir, "dest")])
            .assert()
            .success();
        assert!(dir.path().join("dest/src").exists());
    }
}

mod mv {
    use super::*;

    #[test]
    fn renames_a_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("old"), b"payload").unwrap();

        pail()
            .args(["mv", &p(&dir, "old"), &p(&dir, "new")])
            .assert()
            .success();
        assert!(!dir.path().join("old").exists());
        assert_eq!(fs::read(dir.path().join("new")).unwrap(), b"payload");
    }

    #[test]
    fn missing_source_reports_cannot_stat() {
        let dir = TempDir::new().unwrap();
        pail()
            .args(["mv", &p(&dir, "ghost"), &p(&dir, "dest")])
            .assert()
            .failure()
            .stderr(predicate::str::contains("cannot stat"));
    }

    #[test]
    fn multiple_sources_require_directory_destination() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a"), b"a").unwrap();
        fs::write(dir.path().join("b"), b"b").unwrap();
        fs::write(dir.path().join("plain"), b"x").unwrap();

        pail()
            .args(["mv", &p(&dir, "a"), &p(&dir, "b"), &p(&dir, "plain")])
            .assert()
            .failure()
            .stderr(predicate::str::contains("is not a directory"));
    }

    #[test]
    fn update_older_skips_newer_destination() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("src"), b"from-src").unwrap();
        fs::write(dir.path().join("dst"), b"kept").unwrap();
        // Make the source older than the destination
        let old = filetime_from_secs(1_000_000_000);
        filetime::set_file_mtime(dir.path().join("src"), old).unwrap();

        pail()
            .args(["mv", "--update=older", &p(&dir, "src"), &p(&dir, "dst")])
            .assert()
            .success();
        assert!(dir.path().join("src").exists());
        assert_eq!(fs::read(dir.path().join("dst")).unwrap(), b"kept");
    }

    fn filetime_from_secs(secs: i64) -> filetime::FileTime {
        filetime::FileTime::from_unix_time(secs, 0)
    }
}

mod rm {
    use super::*;

    #[test]
    fn missing_operand_is_an_error_without_force() {
        let dir = TempDir::new().unwrap();
        pail()
            .args(["rm", &p(&dir, "ghost")])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No such file or directory"));
    }

    #[test]
    fn force_silences_missing_operand() {
        let dir = TempDir::new().unwrap();
        pail()
            .args(["rm", "-f", &p(&dir, "ghost")])
            .assert()
            .success()
            .stderr("");
    }

    #[test]
    fn directory_requires_recursive() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("tree")).unwrap();
        fs::write(dir.path().join("tree/f"), b"x").unwrap();

        pail()
            .args(["rm", &p(&dir, "tree")])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Is a directory"));
        assert!(dir.path().join("tree/f").exists());
    }

    #[test]
    fn dir_flag_removes_only_empty_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();
        fs::create_dir(dir.path().join("full")).unwrap();
        fs::write(dir.path().join("full/f"), b"x").unwrap();

        pail()
            .args(["rm", "-d", &p(&dir, "empty")])
            .assert()
            .success();
        assert!(!dir.path().join("empty").exists());

        pail()
            .args(["rm", "-d", &p(&dir, "full")])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not empty"));
    }

    #[test]
    fn recursive_removes_a_tree() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("tree/sub")).unwrap();
        fs::write(dir.path().join("tree/sub/f"), b"x").unwrap();

        pail()
            .args(["rm", "-r", &p(&dir, "tree")])
            .assert()
            .success();
        assert!(!dir.path().join("tree").exists());
    }

    #[test]
    fn continues_past_failing_operands() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("real"), b"x").unwrap();

        pail()
            .args(["rm", &p(&dir, "ghost"), &p(&dir, "real")])
            .assert()
            .failure();
        // The failing operand did not stop the batch
        assert!(!dir.path().join("real").exists());
    }
}

mod cat {
    use super::*;

    #[test]
    fn concatenates_operands_in_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("one"), b"first\n").unwrap();
        fs::write(dir.path().join("two"), b"second\n").unwrap();

        pail()
            .args(["cat", &p(&dir, "one"), &p(&dir, "two")])
            .assert()
            .success()
            .stdout("first\nsecond\n");
    }

    #[test]
    fn numbers_lines_across_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("one"), b"a\n").unwrap();
        fs::write(dir.path().join("two"), b"b\n").unwrap();

        pail()
            .args(["cat", "-n", &p(&dir, "one"), &p(&dir, "two")])
            .assert()
            .success()
            .stdout("     1\ta\n     2\tb\n");
    }

    #[test]
    fn reads_stdin_for_dash() {
        pail()
            .args(["cat", "-"])
            .write_stdin("from stdin")
            .assert()
            .success()
            .stdout("from stdin");
    }

    #[test]
    fn missing_file_continues_with_rest() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("real"), b"ok\n").unwrap();

        pail()
            .args(["cat", &p(&dir, "ghost"), &p(&dir, "real")])
            .assert()
            .failure()
            .stdout("ok\n");
    }
}

mod head_tail {
    use super::*;

    const TEN: &str = "L1\nL2\nL3\nL4\nL5\nL6\nL7\nL8\nL9\nL10\n";

    fn ten_lines(dir: &TempDir) -> String {
        fs::write(dir.path().join("ten"), TEN).unwrap();
        p(dir, "ten")
    }

    #[test]
    fn head_first_three_lines() {
        let dir = TempDir::new().unwrap();
        let file = ten_lines(&dir);

        pail()
            .args(["head", "-n", "3", &file])
            .assert()
            .success()
            .stdout("L1\nL2\nL3\n");
    }

    #[test]
    fn head_plus_n_starts_at_line_n() {
        let dir = TempDir::new().unwrap();
        let file = ten_lines(&dir);

        pail()
            .args(["head", "-n", "+3", &file])
            .assert()
            .success()
            .stdout("L3\nL4\nL5\nL6\nL7\nL8\nL9\nL10\n");
    }

    #[test]
    fn tail_last_three_lines() {
        let dir = TempDir::new().unwrap();
        let file = ten_lines(&dir);

        pail()
            .args(["tail", "-n", "3", &file])
            .assert()
            .success()
            .stdout("L8\nL9\nL10\n");
    }

    #[test]
    fn tail_plus_n_starts_at_line_n() {
        let dir = TempDir::new().unwrap();
        let file = ten_lines(&dir);

        pail()
            .args(["tail", "-n", "+9", &file])
            .assert()
            .success()
            .stdout("L9\nL10\n");
    }

    #[test]
    fn multiple_files_get_headers() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a"), b"aaa\n").unwrap();
        fs::write(dir.path().join("b"), b"bbb\n").unwrap();

        pail()
            .args(["head", &p(&dir, "a"), &p(&dir, "b")])
            .assert()
            .success()
            .stdout(predicate::str::contains(format!("==> {} <==", p(&dir, "a"))))
            .stdout(predicate::str::contains(format!("==> {} <==", p(&dir, "b"))));
    }

    #[test]
    fn quiet_suppresses_headers() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a"), b"aaa\n").unwrap();
        fs::write(dir.path().join("b"), b"bbb\n").unwrap();

        pail()
            .args(["head", "-q", &p(&dir, "a"), &p(&dir, "b")])
            .assert()
            .success()
            .stdout("aaa\nbbb\n");
    }

    #[test]
    fn head_bytes_with_multiplier_suffix() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("big"), vec![b'x'; 4096]).unwrap();

        let output = pail()
            .args(["head", "-c", "1K", &p(&dir, "big")])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        assert_eq!(output.len(), 1024);
    }

    #[test]
    fn invalid_suffix_is_reported() {
        let dir = TempDir::new().unwrap();
        let file = ten_lines(&dir);

        pail()
            .args(["head", "-c", "1X", &file])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid number of bytes: '1X'"));

        pail()
            .args(["tail", "-n", "1X", &file])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid number of lines: '1X'"));
    }

    #[test]
    fn zero_terminated_records() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("z"), b"one\0two\0three\0").unwrap();

        pail()
            .args(["head", "-z", "-n", "2", &p(&dir, "z")])
            .assert()
            .success()
            .stdout(predicate::eq(&b"one\0two\0"[..]));
    }

    #[test]
    fn head_reads_stdin_by_default() {
        pail()
            .arg("head")
            .args(["-n", "2"])
            .write_stdin("s1\ns2\ns3\n")
            .assert()
            .success()
            .stdout("s1\ns2\n");
    }
}

mod mkdir_touch {
    use super::*;

    #[test]
    fn mkdir_creates_directory() {
        let dir = TempDir::new().unwrap();
        pail()
            .args(["mkdir", &p(&dir, "made")])
            .assert()
            .success();
        assert!(dir.path().join("made").is_dir());
    }

    #[test]
    fn mkdir_without_parents_needs_existing_parent() {
        let dir = TempDir::new().unwrap();
        pail()
            .args(["mkdir", &p(&dir, "a/b/c")])
            .assert()
            .failure()
            .stderr(predicate::str::contains("cannot create directory"));

        pail()
            .args(["mkdir", "-p", &p(&dir, "a/b/c")])
            .assert()
            .success();
        assert!(dir.path().join("a/b/c").is_dir());
    }

    #[test]
    fn mkdir_existing_without_parents_fails() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("made")).unwrap();

        pail()
            .args(["mkdir", &p(&dir, "made")])
            .assert()
            .failure();
        pail()
            .args(["mkdir", "-p", &p(&dir, "made")])
            .assert()
            .success();
    }

    #[test]
    fn touch_creates_an_empty_file() {
        let dir = TempDir::new().unwrap();
        pail()
            .args(["touch", &p(&dir, "new")])
            .assert()
            .success();
        assert_eq!(fs::read(dir.path().join("new")).unwrap(), b"");
    }

    #[test]
    fn touch_no_create_leaves_missing_files_missing() {
        let dir = TempDir::new().unwrap();
        pail()
            .args(["touch", "-c", &p(&dir, "ghost")])
            .assert()
            .success();
        assert!(!dir.path().join("ghost").exists());
    }

    #[test]
    fn touch_compact_stamp_sets_mtime() {
        let dir = TempDir::new().unwrap();
        pail()
            .args(["touch", "-t", "202301011200", &p(&dir, "stamped")])
            .assert()
            .success();

        let modified = fs::metadata(dir.path().join("stamped"))
            .unwrap()
            .modified()
            .unwrap();
        let when: chrono::DateTime<chrono::Local> = modified.into();
        assert_eq!(when.year(), 2023);
        assert_eq!(when.month(), 1);
    }

    #[test]
    fn touch_reference_copies_times() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("reference"), b"x").unwrap();
        let old = filetime::FileTime::from_unix_time(1_000_000_000, 0);
        filetime::set_file_mtime(dir.path().join("reference"), old).unwrap();

        pail()
            .args([
                "touch",
                "-r",
                &p(&dir, "reference"),
                &p(&dir, "stamped"),
            ])
            .assert()
            .success();

        let got = fs::metadata(dir.path().join("stamped")).unwrap().modified().unwrap();
        let want = fs::metadata(dir.path().join("reference")).unwrap().modified().unwrap();
        assert_eq!(got, want);
    }
}

mod sink {
    use super::*;

    #[test]
    fn writes_stdin_to_file() {
        let dir = TempDir::new().unwrap();
        pail()
            .args(["sink", &p(&dir, "out")])
            .write_stdin("payload bytes")
            .assert()
            .success();
        assert_eq!(fs::read(dir.path().join("out")).unwrap(), b"payload bytes");
    }

    #[test]
    fn append_accumulates() {
        let dir = TempDir::new().unwrap();
        pail()
            .args(["sink", &p(&dir, "out")])
            .write_stdin("first")
            .assert()
            .success();
        pail()
            .args(["sink", "-a", &p(&dir, "out")])
            .write_stdin("|second")
            .assert()
            .success();
        assert_eq!(fs::read(dir.path().join("out")).unwrap(), b"first|second");
    }

    #[test]
    fn overwrite_replaces() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("out"), b"old contents").unwrap();

        pail()
            .args(["sink", &p(&dir, "out")])
            .write_stdin("new")
            .assert()
            .success();
        assert_eq!(fs::read(dir.path().join("out")).unwrap(), b"new");
    }
}

mod complete {
    use super::*;

    #[test]
    fn empty_prefix_lists_roots() {
        let dir = TempDir::new().unwrap();
        pail()
            .args(["complete", "--cache-file", &p(&dir, "cache.json")])
            .assert()
            .success()
            .stdout(predicate::str::contains("-"))
            .stdout(predicate::str::contains("s3://"));
    }

    #[test]
    fn local_prefix_lists_live() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("test1.txt"), b"").unwrap();
        fs::write(dir.path().join("test2.txt"), b"").unwrap();
        fs::create_dir(dir.path().join("testdir")).unwrap();
        fs::write(dir.path().join("other"), b"").unwrap();

        let prefix = p(&dir, "test");
        pail()
            .args(["complete", "--cache-file", &p(&dir, "cache.json"), &prefix])
            .assert()
            .success()
            .stdout(predicate::str::contains("test1.txt"))
            .stdout(predicate::str::contains("test2.txt"))
            .stdout(predicate::str::contains("testdir/"))
            .stdout(predicate::str::contains("other").not());
    }

    #[test]
    fn update_cache_rejects_local_paths() {
        let dir = TempDir::new().unwrap();
        pail()
            .args([
                "complete",
                "--update-cache",
                "--cache-file",
                &p(&dir, "cache.json"),
                &p(&dir, "somewhere"),
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not an object-store path"));
    }

    #[test]
    fn clear_cache_removes_the_file() {
        let dir = TempDir::new().unwrap();
        let cache = p(&dir, "cache.json");
        fs::write(&cache, "{}").unwrap();

        pail()
            .args(["complete", "--clear-cache", "--cache-file", &cache])
            .assert()
            .success();
        assert!(!dir.path().join("cache.json").exists());
    }
}

mod exit_codes {
    use super::*;

    #[test]
    fn success_is_zero() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("f"), b"x").unwrap();
        pail().arg("ls").arg(dir.path()).assert().code(0);
    }

    #[test]
    fn partial_failure_is_nonzero() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("real"), b"x\n").unwrap();
        pail()
            .args(["cat", &p(&dir, "ghost"), &p(&dir, "real")])
            .assert()
            .code(predicate::ne(0));
    }
}
