//! `lvt fmt <file>`: validates a template file compiles, then normalizes
//! trailing whitespace and a final newline. A reduced stand-in for the
//! teacher's `dioxus-autofmt`; reformatting the directive language itself
//! is out of scope (SPEC_FULL.md §4).

use std::path::Path;

pub fn fmt_file(path: &Path) -> anyhow::Result<bool> {
    let original = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;

    lvt_template::compile(&original, &[])
        .map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))?;

    let mut formatted: String = original
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    formatted.push('\n');

    let changed = formatted != original;
    if changed {
        std::fs::write(path, &formatted)?;
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_whitespace() {
        let dir = std::env::temp_dir().join(format!("lvt-fmt-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("t.lvt");
        std::fs::write(&file, "<p>{{.n}}</p>   \n").unwrap();
        let changed = fmt_file(&file).unwrap();
        assert!(changed);
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "<p>{{.n}}</p>\n");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn rejects_invalid_templates() {
        let dir = std::env::temp_dir().join(format!("lvt-fmt-test-invalid-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("bad.lvt");
        std::fs::write(&file, "{{if .x}}unterminated").unwrap();
        assert!(fmt_file(&file).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
