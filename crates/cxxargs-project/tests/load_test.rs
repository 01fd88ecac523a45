//! End-to-end project loading against real directory trees.

use cxxargs_project::{
    ensure_ends_in_slash, GroupMatch, LoadSource, PathNormalizer, Project, ProjectConfig,
    ProjectHandle, Verbatim,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn root_string(dir: &Path) -> String {
    let mut root = dir.to_string_lossy().replace('\\', "/");
    ensure_ends_in_slash(&mut root);
    root
}

fn write(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn project_with_database(commands: &str) -> (TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let root = root_string(dir.path());
    write(dir.path(), "compile_commands.json", &commands.replace("$ROOT", &root));
    (dir, root)
}

#[test]
fn test_loads_compile_commands() {
    let (dir, root) = project_with_database(
        r#"[
            {
                "directory": "$ROOTout/Debug",
                "file": "../../src/app.cc",
                "command": "clang++ -MMD -MF obj/app.o.d -I../.. -Igen -iquote ../../src -isystem ../../third_party/include -std=c++17 -c ../../src/app.cc"
            },
            {
                "directory": "$ROOTout/Debug",
                "file": "$ROOTsrc/legacy.c",
                "arguments": ["gcc", "-I../..", "-c", "../../src/legacy.c"]
            }
        ]"#,
    );

    let project = Project::load(dir.path(), &ProjectConfig::default());

    assert_eq!(project.source(), LoadSource::CompileCommands);
    assert_eq!(project.entries().len(), 2);

    let app = project.find(&format!("{}src/app.cc", root));
    assert!(!app.is_inferred);
    assert_eq!(
        app.args,
        vec![
            format!("-I{}", root.trim_end_matches('/')),
            format!("-I{}out/Debug/gen", root),
            "-iquote".to_string(),
            format!("{}src", root),
            "-isystem".to_string(),
            format!("{}third_party/include", root),
            "-std=c++17".to_string(),
            "-c".to_string(),
            "../../src/app.cc".to_string(),
            "-xc++".to_string(),
        ]
    );

    let legacy = project.find(&format!("{}src/legacy.c", root));
    assert_eq!(legacy.args.last().map(String::as_str), Some("-std=c11"));

    assert_eq!(project.quote_include_directories(), &[format!("{}src/", root)]);
    assert_eq!(
        project.angle_include_directories(),
        &[
            root.clone(),
            format!("{}out/Debug/gen/", root),
            format!("{}third_party/include/", root),
        ]
    );
}

#[test]
fn test_header_is_inferred_from_neighbour() {
    let (dir, root) = project_with_database(
        r#"[
            {"directory": "$ROOT", "file": "net/socket.cc", "command": "-DNET"},
            {"directory": "$ROOT", "file": "ui/view.cc", "command": "-DUI"}
        ]"#,
    );

    let project = Project::load(dir.path(), &ProjectConfig::default());
    let header = project.find(&format!("{}ui/view.h", root));

    assert!(header.is_inferred);
    assert_eq!(header.filename, format!("{}ui/view.h", root));
    assert_eq!(header.args, vec!["-DUI", "-xc++", "-std=c++11"]);
}

#[test]
fn test_invalid_json_falls_back_to_listing() {
    let dir = tempfile::tempdir().unwrap();
    let root = root_string(dir.path());
    write(dir.path(), "compile_commands.json", "[ {not json");
    write(dir.path(), "clang_args", "# shared flags\n-Iinclude\n-DLISTED\n");
    write(dir.path(), "src/a.cc", "");

    let project = Project::load(dir.path(), &ProjectConfig::default());

    assert_eq!(project.source(), LoadSource::DirectoryListing);
    let entry = project.find(&format!("{}src/a.cc", root));
    assert!(!entry.is_inferred);
    assert_eq!(
        entry.args,
        vec![
            format!("-I{}include", root),
            "-DLISTED".to_string(),
            "-xc++".to_string(),
            "-std=c++11".to_string(),
        ]
    );
    assert_eq!(project.angle_include_directories(), &[format!("{}include/", root)]);
}

#[test]
fn test_entry_without_command_falls_back_to_listing() {
    let (dir, _root) = project_with_database(
        r#"[
            {"directory": "$ROOT", "file": "a.cc", "command": "-Ifrom_database"},
            {"directory": "$ROOT", "file": "b.cc"}
        ]"#,
    );
    write(dir.path(), "a.cc", "");

    let project = Project::load(dir.path(), &ProjectConfig::default());

    assert_eq!(project.source(), LoadSource::DirectoryListing);
    assert_eq!(project.entries().len(), 1);
    // Nothing from the rejected database leaks into the search paths.
    assert!(project.angle_include_directories().is_empty());
}

#[test]
fn test_empty_arguments_array_keeps_database() {
    let (dir, root) = project_with_database(
        r#"[
            {"directory": "$ROOT", "file": "a.cc", "command": "clang++ -DA -c a.cc"},
            {"directory": "$ROOT", "file": "b.cc", "arguments": []}
        ]"#,
    );

    let project = Project::load(dir.path(), &ProjectConfig::default());

    assert_eq!(project.source(), LoadSource::CompileCommands);
    let b = project.find(&format!("{}b.cc", root));
    assert!(!b.is_inferred);
    assert_eq!(b.args, vec!["-xc++", "-std=c++11"]);
}

#[cfg(unix)]
#[test]
fn test_symlinked_root_with_resolved_paths() {
    let dir = tempfile::tempdir().unwrap();
    let real = dir.path().join("real");
    write(&real, "src/a.cc", "");
    let link = dir.path().join("link");
    std::os::unix::fs::symlink(&real, &link).unwrap();
    let link_root = root_string(&link);
    write(
        &real,
        "compile_commands.json",
        &format!(
            r#"[{{"directory": "{}", "file": "src/a.cc", "command": "-DA"}}]"#,
            link_root
        ),
    );

    let mut config = ProjectConfig::default();
    config.paths.resolve_symlinks = true;
    let project = Project::load(&link, &config);

    // Queries spelled through the link hit the exact entry once they go
    // through the same normalizer.
    let query = config.normalizer().normalize(&format!("{}src/a.cc", link_root));
    let found = project.find(&query);
    assert!(!found.is_inferred);
    assert_eq!(found.args[0], "-DA");
}

#[test]
fn test_missing_database_and_flags_file() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "main.cpp", "");
    write(dir.path(), "notes.txt", "");

    let project = Project::load(dir.path(), &ProjectConfig::default());

    assert_eq!(project.source(), LoadSource::DirectoryListing);
    assert_eq!(project.entries().len(), 1);
    assert_eq!(project.entries()[0].args, vec!["-xc++", "-std=c++11"]);
}

#[test]
fn test_empty_tree() {
    let dir = tempfile::tempdir().unwrap();
    let project = Project::load(dir.path(), &ProjectConfig::default());

    assert!(project.entries().is_empty());
    let guess = project.find("/anything.cc");
    assert!(guess.is_inferred);
    assert!(guess.args.is_empty());
}

#[test]
fn test_config_extra_flags_and_listing_settings() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        ".cxxargs.toml",
        r#"
[compiler]
extra_flags = ["-DINDEXING", "-std=c++20"]

[listing]
flags_file = "flags.txt"
extensions = ["cxx"]
"#,
    );
    write(dir.path(), "flags.txt", "-Wall\n");
    write(dir.path(), "a.cxx", "");
    write(dir.path(), "b.cc", "");

    let config = ProjectConfig::discover(dir.path()).unwrap();
    let project = Project::load(dir.path(), &config);

    assert_eq!(project.entries().len(), 1);
    assert_eq!(
        project.entries()[0].args,
        vec!["-Wall", "-DINDEXING", "-std=c++20", "-xc++"]
    );
}

#[test]
fn test_verbatim_normalizer() {
    let (dir, root) = project_with_database(
        r#"[{"directory": "$ROOTout", "file": "../a.cc", "command": "-I../inc"}]"#,
    );

    let project = Project::load_with(dir.path(), &ProjectConfig::default(), &Verbatim);

    assert_eq!(project.entries()[0].filename, format!("{}out/../a.cc", root));
    assert_eq!(project.entries()[0].args[0], format!("-I{}out/../inc", root));
}

#[test]
fn test_filtered_work_list() {
    let (dir, root) = project_with_database(
        r#"[
            {"directory": "$ROOT", "file": "a.cc", "command": "-DA"},
            {"directory": "$ROOT", "file": "third_party/z.cc", "command": "-DZ"},
            {"directory": "$ROOT", "file": "third_party/keep/k.cc", "command": "-DK"}
        ]"#,
    );

    let config = ProjectConfig::default()
        .with_blacklist(&["**/third_party/**"])
        .with_whitelist(&["**/keep/**"]);
    let project = Project::load(dir.path(), &config);
    let filter: GroupMatch = config.index_filter().unwrap();

    let mut work = Vec::new();
    project.for_each_filtered(&filter, true, |index, entry| {
        work.push((index, entry.filename.clone()));
    });

    assert_eq!(
        work,
        vec![
            (0, format!("{}a.cc", root)),
            (2, format!("{}third_party/keep/k.cc", root)),
        ]
    );
}

#[test]
fn test_reload_replaces_snapshot() {
    let (dir, root) = project_with_database(
        r#"[{"directory": "$ROOT", "file": "a.cc", "command": "-DOLD"}]"#,
    );
    let config = ProjectConfig::default();
    let handle = ProjectHandle::new(Project::load(dir.path(), &config));
    let before = handle.current();

    write(
        dir.path(),
        "compile_commands.json",
        &format!(r#"[{{"directory": "{}", "file": "a.cc", "command": "-DNEW"}}]"#, root),
    );
    handle.reload(dir.path(), &config);

    let file = format!("{}a.cc", root);
    assert_eq!(before.find(&file).args[0], "-DOLD");
    assert_eq!(handle.current().find(&file).args[0], "-DNEW");
}

#[test]
fn test_concurrent_lookups() {
    let (dir, root) = project_with_database(
        r#"[
            {"directory": "$ROOT", "file": "a/x.cc", "command": "-DX"},
            {"directory": "$ROOT", "file": "b/y.cc", "command": "-DY"}
        ]"#,
    );
    let project = Project::load(dir.path(), &ProjectConfig::default());

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..50 {
                    assert_eq!(project.find(&format!("{}a/x.h", root)).args[0], "-DX");
                    assert_eq!(project.find(&format!("{}b/y.cc", root)).args[0], "-DY");
                }
            });
        }
    });

    assert_eq!(project.inferred_count(), 1);
}
