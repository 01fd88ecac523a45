//! Splitting of `command` strings into argument tokens.

/// Splits a command line on runs of whitespace.
///
/// No quoting, escaping or variable expansion is performed: build generators
/// emit already-expanded command lines, and a quote character is kept as part
/// of the token it appears in (`-DREV=\"1\"` stays one token).
pub fn split_command(command: &str) -> Vec<String> {
    command.split_whitespace().map(str::to_string).collect()
}
