use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSetBuilder};
use ignore::WalkBuilder;
use rayon::prelude::*;

fn has_glob_meta(s: &str) -> bool {
    s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
}

// Extract a static directory prefix before the first glob meta-character
fn static_prefix_dir(pattern: &str) -> PathBuf {
    let idx = pattern
        .bytes()
        .position(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
        .unwrap_or(pattern.len());
    let p = Path::new(&pattern[..idx]);
    if p.is_dir() {
        p.to_path_buf()
    } else {
        match p.parent() {
            Some(pp) if !pp.as_os_str().is_empty() => pp.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

/// Expand glob patterns into the sorted, de-duplicated list of matching files.
///
/// `**` matches across directories, `*` stays within one. Plain paths are
/// taken as is when they name an existing file. Walking uses ignore +
/// globset, one parallel walk per distinct root.
pub fn expand_input_globs(patterns: &[String]) -> Result<Vec<PathBuf>, String> {
    let mut results: BTreeSet<PathBuf> = BTreeSet::new();

    let globbed: Vec<&String> = patterns.iter().filter(|p| has_glob_meta(p)).collect();
    for literal in patterns.iter().filter(|p| !has_glob_meta(p)) {
        let path = Path::new(literal);
        if path.is_file() {
            results.insert(path.to_path_buf());
        }
    }
    if globbed.is_empty() {
        return Ok(results.into_iter().collect());
    }

    // Build one GlobSet for all patterns (literal_separator to avoid '/' matching)
    let mut builder = GlobSetBuilder::new();
    for pat in &globbed {
        let glob = GlobBuilder::new(pat)
            .literal_separator(true)
            .build()
            .map_err(|e| format!("Invalid glob pattern '{}': {}", pat, e))?;
        builder.add(glob);
    }
    let set = builder
        .build()
        .map_err(|e| format!("Failed to build glob set: {}", e))?;

    let mut roots: Vec<PathBuf> = Vec::new();
    for pat in &globbed {
        let root = static_prefix_dir(pat);
        if !roots.contains(&root) {
            roots.push(root);
        }
    }

    let collected: Vec<PathBuf> = roots
        .par_iter()
        .map(|root| {
            let mut out = Vec::new();
            let walker = WalkBuilder::new(root)
                .git_ignore(true)
                .git_global(true)
                .git_exclude(true)
                .hidden(false)
                .ignore(true)
                .parents(true)
                .build();

            for dent in walker.flatten() {
                if !dent.file_type().is_some_and(|t| t.is_file()) {
                    continue;
                }
                let path = dent.path();
                // Walking "." yields "./x.xml" while the user wrote "*.xml".
                let relative = path.strip_prefix(".").unwrap_or(path);
                if set.is_match(path) || set.is_match(relative) {
                    out.push(relative.to_path_buf());
                }
            }
            out
        })
        .flatten()
        .collect();

    results.extend(collected);
    Ok(results.into_iter().collect())
}

/// Whether `path` looks like a file this tool produced for `subdir`
/// (`.../SUB/base-SUB.ext`), so recursive globs do not translate outputs again.
pub fn is_generated_output(path: &Path, subdir: &str) -> bool {
    let in_subdir = path
        .parent()
        .and_then(|p| p.file_name())
        .is_some_and(|name| name.to_string_lossy() == subdir);
    let suffixed = path
        .file_stem()
        .is_some_and(|stem| stem.to_string_lossy().ends_with(&format!("-{}", subdir)));
    in_subdir && suffixed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<base/>").unwrap();
    }

    fn pattern(dir: &Path, rest: &str) -> String {
        format!("{}/{}", dir.to_string_lossy(), rest)
    }

    #[test]
    fn test_single_star_stays_in_directory() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("a.xml"));
        touch(&dir.path().join("sub").join("b.xml"));

        let files = expand_input_globs(&[pattern(dir.path(), "*.xml")]).unwrap();
        assert_eq!(files, vec![dir.path().join("a.xml")]);
    }

    #[test]
    fn test_double_star_recurses() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("a.xml"));
        touch(&dir.path().join("sub").join("deep").join("b.xml"));
        touch(&dir.path().join("sub").join("c.txt"));

        let files = expand_input_globs(&[pattern(dir.path(), "**/*.xml")]).unwrap();
        assert_eq!(
            files,
            vec![
                dir.path().join("a.xml"),
                dir.path().join("sub").join("deep").join("b.xml"),
            ]
        );
    }

    #[test]
    fn test_overlapping_patterns_are_deduplicated() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("a.xml"));

        let files = expand_input_globs(&[
            pattern(dir.path(), "*.xml"),
            pattern(dir.path(), "a.*"),
            pattern(dir.path(), "a.xml"),
        ])
        .unwrap();
        assert_eq!(files, vec![dir.path().join("a.xml")]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let dir = TempDir::new().unwrap();
        let files = expand_input_globs(&[pattern(dir.path(), "*.xml")]).unwrap();
        assert!(files.is_empty());
        let files = expand_input_globs(&[pattern(dir.path(), "missing.xml")]).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(expand_input_globs(&["[".to_string()]).is_err());
    }

    #[test]
    fn test_is_generated_output() {
        assert!(is_generated_output(Path::new("mod/FR/strings-FR.xml"), "FR"));
        assert!(!is_generated_output(Path::new("mod/strings.xml"), "FR"));
        assert!(!is_generated_output(Path::new("mod/FR/strings.xml"), "FR"));
        assert!(!is_generated_output(Path::new("mod/DE/strings-FR.xml"), "FR"));
    }
}
