use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use filetime::{set_file_mtime, FileTime};
use reposync_core::{Diagnostics, ExclusionSet, FailurePolicy, Layout, RunDiagnostics, SyncOptions};
use reposync_renderer::{values_path, Renderer, TEMPLATE_MARKER};
use reposync_sync::{list_files, sync, SyncError, Synchronizer, WriteResult};
use tempfile::TempDir;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn populate(root: &Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        let path = root.join(name);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, content).expect("write");
    }
}

fn listing(root: &Path) -> BTreeSet<String> {
    list_files(root)
        .expect("list")
        .into_iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect()
}

fn names(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn template(body: &str) -> String {
    format!("{TEMPLATE_MARKER}\n{body}")
}

// ---------------------------------------------------------------------------
// Copy phase
// ---------------------------------------------------------------------------

#[test]
fn non_template_files_are_copied_verbatim() {
    init_logging();
    let src = TempDir::new().expect("src");
    let dest = TempDir::new().expect("dest");
    populate(
        src.path(),
        &[("LICENSE", "MIT\r\n"), (".editorconfig", "root = true\n")],
    );

    let report = sync(src.path(), dest.path(), &SyncOptions::new("copnow"), &RunDiagnostics::new())
        .expect("sync");

    assert!(report.is_success());
    assert_eq!(report.changed_count(), 2);
    assert_eq!(fs::read(dest.path().join("LICENSE")).expect("read"), b"MIT\r\n");
    assert_eq!(
        fs::read_to_string(dest.path().join(".editorconfig")).expect("read"),
        "root = true\n"
    );
}

#[test]
fn values_files_never_reach_the_destination() {
    let src = TempDir::new().expect("src");
    let dest = TempDir::new().expect("dest");
    populate(
        src.path(),
        &[
            ("ci.yml", template("name: <% name %>\n").as_str()),
            ("ci.yml.copnow.values.yml", "name: copnow\n"),
            ("ci.yml.other.values.yml", "name: other\n"),
        ],
    );

    sync(src.path(), dest.path(), &SyncOptions::new("copnow"), &RunDiagnostics::new())
        .expect("sync");

    assert_eq!(listing(dest.path()), names(&["ci.yml"]));
    let rendered = fs::read_to_string(dest.path().join("ci.yml")).expect("read");
    assert!(rendered.contains("name: copnow"), "got: {rendered:?}");
}

#[test]
fn nested_entries_are_flattened_to_base_name() {
    let src = TempDir::new().expect("src");
    let dest = TempDir::new().expect("dest");
    populate(src.path(), &[("sub/dir/file.txt", "nested")]);

    sync(src.path(), dest.path(), &SyncOptions::new("copnow"), &RunDiagnostics::new())
        .expect("sync");

    assert_eq!(listing(dest.path()), names(&["file.txt"]));
    assert!(!dest.path().join("sub").exists());
}

#[test]
fn mirror_layout_keeps_relative_paths() {
    let src = TempDir::new().expect("src");
    let dest = TempDir::new().expect("dest");
    populate(
        src.path(),
        &[("one/README.md", "one"), ("two/README.md", "two")],
    );

    let options = SyncOptions::new("copnow").layout(Layout::Mirror);
    sync(src.path(), dest.path(), &options, &RunDiagnostics::new()).expect("sync");

    assert_eq!(
        fs::read_to_string(dest.path().join("one/README.md")).expect("read"),
        "one"
    );
    assert_eq!(
        fs::read_to_string(dest.path().join("two/README.md")).expect("read"),
        "two"
    );
}

#[test]
fn excluded_source_entries_are_not_copied() {
    let src = TempDir::new().expect("src");
    let dest = TempDir::new().expect("dest");
    populate(src.path(), &[("keep.txt", "k"), ("secret.env", "s")]);

    let exclude: ExclusionSet = [src.path().join("secret.env").to_string_lossy().into_owned()]
        .into_iter()
        .collect();
    let options = SyncOptions::new("copnow").exclude(exclude);
    let report = sync(src.path(), dest.path(), &options, &RunDiagnostics::new()).expect("sync");

    assert_eq!(listing(dest.path()), names(&["keep.txt"]));
    assert_eq!(report.excluded, vec![src.path().join("secret.env")]);
}

#[test]
fn single_file_source_writes_the_literal_destination() {
    let src = TempDir::new().expect("src");
    let dest = TempDir::new().expect("dest");
    populate(src.path(), &[("file.txt", "solo"), ("other.txt", "ignored")]);
    let target = dest.path().join("out.txt");

    let options = SyncOptions::new("copnow").delete_orphaned(true);
    let report = sync(&src.path().join("file.txt"), &target, &options, &RunDiagnostics::new())
        .expect("sync");

    assert_eq!(report.writes, vec![WriteResult::Written { path: target.clone() }]);
    assert_eq!(listing(dest.path()), names(&["out.txt"]));
    assert_eq!(fs::read_to_string(&target).expect("read"), "solo");
}

#[test]
fn missing_source_is_fatal_and_marks_run_failed() {
    let src = TempDir::new().expect("src");
    let dest = TempDir::new().expect("dest");
    let diagnostics = RunDiagnostics::new();

    let err = sync(
        &src.path().join("nope"),
        dest.path(),
        &SyncOptions::new("copnow"),
        &diagnostics,
    )
    .unwrap_err();

    assert!(matches!(err, SyncError::SourceNotFound { .. }), "got: {err}");
    assert!(diagnostics.has_failed());
}

#[test]
fn unchanged_files_are_not_rewritten() {
    let src = TempDir::new().expect("src");
    let dest = TempDir::new().expect("dest");
    populate(src.path(), &[("README.md", "same")]);
    populate(dest.path(), &[("README.md", "same")]);

    let old = FileTime::from_system_time(SystemTime::now() - Duration::from_secs(24 * 60 * 60));
    let target = dest.path().join("README.md");
    set_file_mtime(&target, old).expect("set old mtime");

    let report = sync(src.path(), dest.path(), &SyncOptions::new("copnow"), &RunDiagnostics::new())
        .expect("sync");

    assert_eq!(report.unchanged_count(), 1);
    let mtime = FileTime::from_last_modification_time(&fs::metadata(&target).expect("meta"));
    assert_eq!(
        mtime.unix_seconds(),
        old.unix_seconds(),
        "unchanged destination must keep its mtime"
    );
}

#[test]
#[cfg(unix)]
fn overwritten_destination_keeps_its_mode() {
    use std::os::unix::fs::PermissionsExt;

    let src = TempDir::new().expect("src");
    let dest = TempDir::new().expect("dest");
    populate(src.path(), &[("run.sh", "#!/bin/sh\necho new\n")]);
    populate(dest.path(), &[("run.sh", "#!/bin/sh\necho old\n")]);
    let target = dest.path().join("run.sh");
    fs::set_permissions(&target, fs::Permissions::from_mode(0o755)).expect("chmod");

    let report = sync(src.path(), dest.path(), &SyncOptions::new("copnow"), &RunDiagnostics::new())
        .expect("sync");

    assert_eq!(report.changed_count(), 1);
    assert_eq!(fs::read_to_string(&target).expect("read"), "#!/bin/sh\necho new\n");
    let mode = fs::metadata(&target).expect("meta").permissions().mode() & 0o777;
    assert_eq!(mode, 0o755, "executable bit must survive the overwrite");
}

// ---------------------------------------------------------------------------
// Invalid values files and failure policy
// ---------------------------------------------------------------------------

#[test]
fn invalid_values_file_marks_failure_and_skips_only_that_file() {
    let src = TempDir::new().expect("src");
    let dest = TempDir::new().expect("dest");
    populate(
        src.path(),
        &[
            ("ci.yml", template("name: <% name %>\n").as_str()),
            ("ci.yml.copnow.values.yml", ""),
            ("README.md", "readme"),
        ],
    );
    populate(dest.path(), &[("ci.yml", "previous")]);
    let diagnostics = RunDiagnostics::new();

    let report = sync(src.path(), dest.path(), &SyncOptions::new("copnow"), &diagnostics)
        .expect("sync");

    assert!(diagnostics.has_failed());
    assert!(!report.is_success());
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].error.is_invalid_values());
    assert_eq!(
        fs::read_to_string(dest.path().join("ci.yml")).expect("read"),
        "previous"
    );
    assert_eq!(
        fs::read_to_string(dest.path().join("README.md")).expect("read"),
        "readme"
    );
}

#[test]
fn invalid_values_file_never_creates_the_destination() {
    let src = TempDir::new().expect("src");
    let dest = TempDir::new().expect("dest");
    populate(
        src.path(),
        &[
            ("ci.yml", template("<% name %>").as_str()),
            ("ci.yml.copnow.values.yml", "[not, a, mapping]\n"),
        ],
    );

    let diagnostics = RunDiagnostics::new();
    sync(src.path(), dest.path(), &SyncOptions::new("copnow"), &diagnostics).expect("sync");

    assert!(diagnostics.has_failed());
    assert!(!dest.path().join("ci.yml").exists());
}

#[test]
fn fail_fast_returns_the_first_failure() {
    let src = TempDir::new().expect("src");
    let dest = TempDir::new().expect("dest");
    populate(
        src.path(),
        &[
            ("a.yml", template("<% name %>").as_str()),
            ("a.yml.copnow.values.yml", "~\n"),
            ("b.txt", "never copied"),
        ],
    );

    let options = SyncOptions::new("copnow").on_error(FailurePolicy::FailFast);
    let err = sync(src.path(), dest.path(), &options, &RunDiagnostics::new()).unwrap_err();

    assert!(err.is_invalid_values(), "got: {err}");
    assert!(!dest.path().join("b.txt").exists(), "copy phase must stop");
}

// ---------------------------------------------------------------------------
// Orphan reconciliation
// ---------------------------------------------------------------------------

#[test]
fn orphans_are_removed() {
    let src = TempDir::new().expect("src");
    let dest = TempDir::new().expect("dest");
    populate(src.path(), &[("a", "new a"), ("b", "new b")]);
    populate(dest.path(), &[("a", "old a"), ("b", "old b"), ("c", "orphan")]);

    let options = SyncOptions::new("copnow").delete_orphaned(true);
    let report = sync(src.path(), dest.path(), &options, &RunDiagnostics::new()).expect("sync");

    assert_eq!(listing(dest.path()), names(&["a", "b"]));
    assert_eq!(fs::read_to_string(dest.path().join("a")).expect("read"), "new a");
    assert_eq!(fs::read_to_string(dest.path().join("b")).expect("read"), "new b");
    assert_eq!(report.removed, vec![dest.path().join("c")]);
}

#[test]
fn excluded_orphans_are_kept_untouched() {
    let src = TempDir::new().expect("src");
    let dest = TempDir::new().expect("dest");
    populate(src.path(), &[("a", "a"), ("b", "b")]);
    populate(dest.path(), &[("a", "a"), ("b", "b"), ("c", "keep me")]);

    let exclude: ExclusionSet = [src.path().join("c").to_string_lossy().into_owned()]
        .into_iter()
        .collect();
    let options = SyncOptions::new("copnow")
        .delete_orphaned(true)
        .exclude(exclude);
    let report = sync(src.path(), dest.path(), &options, &RunDiagnostics::new()).expect("sync");

    assert_eq!(listing(dest.path()), names(&["a", "b", "c"]));
    assert_eq!(fs::read_to_string(dest.path().join("c")).expect("read"), "keep me");
    assert_eq!(report.kept_orphans, vec![dest.path().join("c")]);
    assert!(report.removed.is_empty());
}

#[test]
fn orphans_survive_without_delete_flag() {
    let src = TempDir::new().expect("src");
    let dest = TempDir::new().expect("dest");
    populate(src.path(), &[("a", "a")]);
    populate(dest.path(), &[("c", "c")]);

    sync(src.path(), dest.path(), &SyncOptions::new("copnow"), &RunDiagnostics::new())
        .expect("sync");
    assert_eq!(listing(dest.path()), names(&["a", "c"]));
}

#[test]
fn flattened_copies_survive_orphan_reconciliation() {
    let src = TempDir::new().expect("src");
    let dest = TempDir::new().expect("dest");
    populate(src.path(), &[("sub/dir/file.txt", "nested")]);
    populate(dest.path(), &[("stale/old.txt", "old")]);

    let options = SyncOptions::new("copnow").delete_orphaned(true);
    sync(src.path(), dest.path(), &options, &RunDiagnostics::new()).expect("sync");

    assert_eq!(listing(dest.path()), names(&["file.txt"]));
}

#[test]
fn stray_values_files_in_destination_are_removed() {
    let src = TempDir::new().expect("src");
    let dest = TempDir::new().expect("dest");
    populate(
        src.path(),
        &[("ci.yml", "plain"), ("ci.yml.copnow.values.yml", "name: x\n")],
    );
    populate(dest.path(), &[("ci.yml.copnow.values.yml", "name: x\n")]);

    let options = SyncOptions::new("copnow").delete_orphaned(true);
    sync(src.path(), dest.path(), &options, &RunDiagnostics::new()).expect("sync");

    assert_eq!(listing(dest.path()), names(&["ci.yml"]));
}

// ---------------------------------------------------------------------------
// Dry-run and custom renderers
// ---------------------------------------------------------------------------

#[test]
fn dry_run_reports_but_touches_nothing() {
    let src = TempDir::new().expect("src");
    let dest = TempDir::new().expect("dest");
    populate(src.path(), &[("a", "new")]);
    populate(dest.path(), &[("c", "orphan")]);

    let options = SyncOptions::new("copnow").delete_orphaned(true).dry_run(true);
    let report = sync(src.path(), dest.path(), &options, &RunDiagnostics::new()).expect("sync");

    assert_eq!(
        report.writes,
        vec![WriteResult::WouldWrite {
            path: dest.path().join("a")
        }]
    );
    assert_eq!(report.removed, vec![dest.path().join("c")]);
    assert_eq!(listing(dest.path()), names(&["c"]));
}

#[test]
fn custom_detector_is_honoured() {
    let src = TempDir::new().expect("src");
    let dest = TempDir::new().expect("dest");
    populate(src.path(), &[("greeting.txt", "{{=<% %>=}}\nhi <% who %>")]);
    fs::write(values_path(&src.path().join("greeting.txt"), &"copnow".into()), "who: you\n")
        .expect("values");

    let plain = Synchronizer::with_renderer(Renderer::new().with_detector(|_: &[u8]| false));
    plain
        .sync(src.path(), dest.path(), &SyncOptions::new("copnow"), &RunDiagnostics::new())
        .expect("sync");

    let copied = fs::read_to_string(dest.path().join("greeting.txt")).expect("read");
    assert_eq!(copied, "{{=<% %>=}}\nhi <% who %>");
}

#[test]
fn report_serializes_to_json() {
    let src = TempDir::new().expect("src");
    let dest = TempDir::new().expect("dest");
    populate(src.path(), &[("a", "a")]);

    let report = sync(src.path(), dest.path(), &SyncOptions::new("copnow"), &RunDiagnostics::new())
        .expect("sync");
    let json = serde_json::to_value(&report).expect("json");

    assert_eq!(json["repo_id"], "copnow");
    assert_eq!(json["writes"][0]["status"], "written");
    let path: PathBuf = serde_json::from_value(json["writes"][0]["path"].clone()).expect("path");
    assert_eq!(path, dest.path().join("a"));
}
