//! Alias (macro) expansion table, scoped per client executable.
//!
//! Expansion supports the classic macro escapes: `$1`..`$9` insert the
//! n-th argument, `$*` inserts everything after the alias name, `$T`
//! separates commands onto their own lines, and `$$` is a literal dollar
//! sign. Every produced line is terminated with `\r\n`, and the reported
//! line count lets the read loop hand multi-line expansions back to the
//! client one line at a time.

use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct AliasTable {
    // exe name -> alias name -> expansion source, all keys lowercased.
    exes: HashMap<String, HashMap<String, String>>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, exe: &str, alias: &str, expansion: &str) {
        self.exes
            .entry(exe.to_lowercase())
            .or_default()
            .insert(alias.to_lowercase(), expansion.to_string());
    }

    /// Drop every alias registered for `exe`.
    pub fn clear_for(&mut self, exe: &str) {
        if self.exes.remove(&exe.to_lowercase()).is_some() {
            tracing::debug!(target: "cooked.alias", exe, "aliases cleared");
        }
    }

    /// Match `input`'s first token against the aliases of `exe` and
    /// expand it. Returns the expanded text and its line count, or `None`
    /// when no alias matches.
    pub fn match_and_copy(&self, input: &str, exe: &str) -> Option<(String, usize)> {
        let aliases = self.exes.get(&exe.to_lowercase())?;
        let (name, args_text) = match input.find(' ') {
            Some(i) => (&input[..i], input[i + 1..].trim_start_matches(' ')),
            None => (input, ""),
        };
        let source = aliases.get(&name.to_lowercase())?;
        let args: Vec<&str> = args_text.split_ascii_whitespace().collect();

        let mut out = String::with_capacity(source.len() + args_text.len());
        let mut line_count = 1;
        let mut chars = source.chars();
        while let Some(ch) = chars.next() {
            if ch != '$' {
                out.push(ch);
                continue;
            }
            match chars.next() {
                Some(d @ '1'..='9') => {
                    let n = d as usize - '1' as usize;
                    if let Some(arg) = args.get(n) {
                        out.push_str(arg);
                    }
                }
                Some('*') => out.push_str(args_text),
                Some('t') | Some('T') => {
                    out.push_str("\r\n");
                    line_count += 1;
                }
                Some('$') => out.push('$'),
                Some(other) => {
                    out.push('$');
                    out.push(other);
                }
                None => out.push('$'),
            }
        }
        if !out.ends_with('\n') {
            out.push_str("\r\n");
        }
        // Literal newlines in the source count too.
        let line_count = line_count.max(out.matches('\n').count());
        Some((out, line_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> AliasTable {
        let mut t = AliasTable::new();
        t.define("cmd.exe", "ll", "dir /w $*");
        t.define("cmd.exe", "go", "cd $1$Tdir");
        t.define("x", "test", "a$Tb");
        t
    }

    #[test]
    fn no_match_for_unknown_alias_or_exe() {
        let t = table();
        assert!(t.match_and_copy("nope", "cmd.exe").is_none());
        assert!(t.match_and_copy("ll", "powershell.exe").is_none());
    }

    #[test]
    fn star_inserts_raw_argument_text() {
        let t = table();
        let (out, lines) = t.match_and_copy("ll *.rs  src", "cmd.exe").unwrap();
        assert_eq!(out, "dir /w *.rs  src\r\n");
        assert_eq!(lines, 1);
    }

    #[test]
    fn numbered_args_and_line_separator() {
        let t = table();
        let (out, lines) = t.match_and_copy("go src extra", "cmd.exe").unwrap();
        assert_eq!(out, "cd src\r\ndir\r\n");
        assert_eq!(lines, 2);
    }

    #[test]
    fn missing_numbered_arg_expands_empty() {
        let t = table();
        let (out, _) = t.match_and_copy("go", "cmd.exe").unwrap();
        assert_eq!(out, "cd \r\ndir\r\n");
    }

    #[test]
    fn matching_is_case_insensitive() {
        let t = table();
        assert!(t.match_and_copy("LL", "CMD.EXE").is_some());
    }

    #[test]
    fn two_line_expansion_reports_count() {
        let t = table();
        let (out, lines) = t.match_and_copy("test", "x").unwrap();
        assert_eq!(out, "a\r\nb\r\n");
        assert_eq!(lines, 2);
    }

    #[test]
    fn literal_dollar_and_trailing_dollar() {
        let mut t = AliasTable::new();
        t.define("x", "p", "echo $$PATH$");
        let (out, _) = t.match_and_copy("p", "x").unwrap();
        assert_eq!(out, "echo $PATH$\r\n");
    }

    #[test]
    fn clear_for_drops_scope() {
        let mut t = table();
        t.clear_for("cmd.exe");
        assert!(t.match_and_copy("ll x", "cmd.exe").is_none());
        assert!(t.match_and_copy("test", "x").is_some());
    }
}
