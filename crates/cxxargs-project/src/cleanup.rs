//! Argument cleanup: the rewrite applied to every raw argument list.
//!
//! A single left-to-right pass drops flags libclang cannot use, turns
//! relative include/sysroot paths into absolute ones and records include
//! directories. Language and standard flags are appended afterwards when
//! the command did not choose them.

use indexmap::IndexSet;

use crate::paths::{ensure_ends_in_slash, is_absolute_path, PathNormalizer};

/// Flags removed together with the token that follows them.
const MULTI_TOKEN_FLAGS: &[&str] = &["-MF", "-MT", "-MQ", "-Xclang", "--param", "-gcc-toolchain"];

/// Bare compiler names removed only when the whole token matches, so
/// source files such as `cc_wrapper.cc` survive.
const EXACT_FLAGS: &[&str] = &["cc", "c++", "gcc", "g++", "clang"];

/// Flags removed when the token starts with them. Checked after the
/// multi-token table, so `-MF` alone is a two-token flag and `-MFfoo.d`
/// is one token.
const PREFIX_FLAGS: &[&str] = &[
    // Compiler invocations, including versioned names like `clang++-14`.
    "clang++",
    "/work/goma/gomacc",
    "../../third_party/llvm-build/Release+Asserts/bin/clang++",
    // Dependency file generation (`-MD`, `-MMD`, `-MJ`, `-MFx.d`, ...).
    "-M",
    "--param",
    "-gcc-toolchain",
    "--gcc-toolchain=",
    // Assembler/linker settings.
    "-Wa,--32",
    "-Wa,--64",
    "-Wl,--incremental-full",
    "-Wl,--incremental-patch,1",
    "-Wl,--no-incremental",
    // Code generation and debug tracking.
    "-Og",
    "-fbuild-session-file=",
    "-fbuild-session-timestamp=",
    "-fembed-bitcode",
    "-fmodules-validate-once-per-build-session",
    "-fno-delete-null-pointer-checks",
    "-fno-use-linker-plugin",
    "-fno-var-tracking",
    "-fno-enforce-eh-specs",
    "-fvar-tracking",
    "-march=",
    "-masm=",
    "-mcpu=",
    "-mfpmath=",
    "-mtune=",
    "-B",
    "-Wno-unused-lambda-capture",
];

/// Which include search list a path-bearing flag feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IncludeKind {
    Quote,
    Angle,
}

/// A flag whose value is a path, given either joined or as the next token.
struct PathFlag {
    spelling: &'static str,
    include: Option<IncludeKind>,
}

const PATH_FLAGS: &[PathFlag] = &[
    PathFlag { spelling: "-I", include: Some(IncludeKind::Angle) },
    PathFlag { spelling: "-iquote", include: Some(IncludeKind::Quote) },
    PathFlag { spelling: "-isystem", include: Some(IncludeKind::Angle) },
    PathFlag { spelling: "--sysroot=", include: None },
];

enum Removal {
    Token,
    TokenAndValue,
}

fn removal_for(arg: &str) -> Option<Removal> {
    if MULTI_TOKEN_FLAGS.contains(&arg) {
        Some(Removal::TokenAndValue)
    } else if EXACT_FLAGS.contains(&arg) || PREFIX_FLAGS.iter().any(|p| arg.starts_with(p)) {
        Some(Removal::Token)
    } else {
        None
    }
}

enum PathArg<'a> {
    /// `-I` alone; the path is the next token.
    Separate(&'static PathFlag),
    /// `-Ifoo`; the path is the flag's suffix.
    Joined(&'static PathFlag, &'a str),
}

fn classify_path_arg(arg: &str) -> Option<PathArg<'_>> {
    for flag in PATH_FLAGS {
        if arg == flag.spelling && !flag.spelling.ends_with('=') {
            return Some(PathArg::Separate(flag));
        }
        if let Some(path) = arg.strip_prefix(flag.spelling) {
            return Some(PathArg::Joined(flag, path));
        }
    }
    None
}

/// Source language chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLanguage {
    C,
    Cxx,
}

impl SourceLanguage {
    /// `.c` files are C; everything else, headers included, is C++.
    pub fn from_filename(filename: &str) -> Self {
        if filename.ends_with(".c") {
            SourceLanguage::C
        } else {
            SourceLanguage::Cxx
        }
    }

    pub fn language_flag(self) -> &'static str {
        match self {
            SourceLanguage::C => "-xc",
            SourceLanguage::Cxx => "-xc++",
        }
    }

    pub fn default_std_flag(self) -> &'static str {
        match self {
            SourceLanguage::C => "-std=c11",
            SourceLanguage::Cxx => "-std=c++11",
        }
    }
}

/// Quote (`#include "x"`) and angle (`#include <x>`) search directories
/// collected across every cleaned entry, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct IncludeDirectories {
    quote: IndexSet<String>,
    angle: IndexSet<String>,
}

impl IncludeDirectories {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, kind: Option<IncludeKind>, path: &str) {
        if path.is_empty() {
            return;
        }
        match kind {
            Some(IncludeKind::Quote) => {
                self.quote.insert(path.to_string());
            }
            Some(IncludeKind::Angle) => {
                self.angle.insert(path.to_string());
            }
            None => {}
        }
    }

    /// Adds everything `other` found, keeping first-seen order.
    pub fn merge(&mut self, other: IncludeDirectories) {
        self.quote.extend(other.quote);
        self.angle.extend(other.angle);
    }

    pub fn quote(&self) -> impl Iterator<Item = &str> {
        self.quote.iter().map(String::as_str)
    }

    pub fn angle(&self) -> impl Iterator<Item = &str> {
        self.angle.iter().map(String::as_str)
    }

    /// Slash-terminates every directory and drops the duplicates that
    /// creates (`/a` and `/a/`). Returns `(quote, angle)`.
    pub fn into_search_paths(self) -> (Vec<String>, Vec<String>) {
        fn finish(set: IndexSet<String>) -> Vec<String> {
            let terminated: IndexSet<String> = set
                .into_iter()
                .map(|mut dir| {
                    ensure_ends_in_slash(&mut dir);
                    dir
                })
                .collect();
            terminated.into_iter().collect()
        }
        (finish(self.quote), finish(self.angle))
    }
}

/// Rewrites raw argument lists into something libclang can parse with.
pub struct ArgumentCleaner<'a> {
    normalizer: &'a dyn PathNormalizer,
    extra_flags: &'a [String],
}

impl<'a> ArgumentCleaner<'a> {
    pub fn new(normalizer: &'a dyn PathNormalizer) -> Self {
        Self {
            normalizer,
            extra_flags: &[],
        }
    }

    /// Flags appended verbatim to every cleaned list, before the
    /// language/standard heuristics run.
    pub fn with_extra_flags(mut self, extra_flags: &'a [String]) -> Self {
        self.extra_flags = extra_flags;
        self
    }

    /// Cleans `args` for `filename`, resolving relative paths against
    /// `build_directory`, which must end in `/`.
    pub fn clean(
        &self,
        build_directory: &str,
        filename: &str,
        args: Vec<String>,
        includes: &mut IncludeDirectories,
    ) -> Vec<String> {
        debug_assert!(build_directory.ends_with('/'));

        let mut cleaned = Vec::with_capacity(args.len() + self.extra_flags.len() + 2);
        let mut drop_next = false;
        let mut pending: Option<&'static PathFlag> = None;

        for arg in args {
            if drop_next {
                drop_next = false;
                continue;
            }

            match removal_for(&arg) {
                Some(Removal::TokenAndValue) => {
                    drop_next = true;
                    continue;
                }
                Some(Removal::Token) => continue,
                None => {}
            }

            if let Some(flag) = pending.take() {
                let path = self.absolutize(build_directory, &arg);
                includes.record(flag.include, &path);
                cleaned.push(path);
                continue;
            }

            match classify_path_arg(&arg) {
                Some(PathArg::Separate(flag)) => {
                    pending = Some(flag);
                    cleaned.push(arg);
                }
                Some(PathArg::Joined(flag, path)) => {
                    let path = self.absolutize(build_directory, path);
                    includes.record(flag.include, &path);
                    cleaned.push(format!("{}{}", flag.spelling, path));
                }
                None => cleaned.push(arg),
            }
        }

        cleaned.extend(self.extra_flags.iter().cloned());
        add_language_heuristics(filename, &mut cleaned);
        cleaned
    }

    fn absolutize(&self, build_directory: &str, path: &str) -> String {
        if path.is_empty() || is_absolute_path(path) {
            return path.to_string();
        }
        self.normalizer
            .normalize(&format!("{}{}", build_directory, path))
    }
}

/// Clang guesses the language poorly, so pick one explicitly.
fn add_language_heuristics(filename: &str, args: &mut Vec<String>) {
    let language = SourceLanguage::from_filename(filename);
    if !args.iter().any(|arg| arg.starts_with("-x")) {
        args.push(language.language_flag().to_string());
    }
    if !args.iter().any(|arg| arg.starts_with("-std=")) {
        args.push(language.default_std_flag().to_string());
    }
}
