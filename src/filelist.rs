use std::fs;
use std::path::Path;

use log::{debug, info};
use regex::Regex;
use tera::{Context, Tera};
use walkdir::WalkDir;

use crate::domain::{FileList, FileListConfig, FileListSpec};
use crate::error::{Result, StageError};

const TEMPLATE_NAME: &str = "filelist";

pub const DEFAULT_TEMPLATE: &str = r#"# Generated by worlds-build. Do not edit.
set({{ variable }}
{%- for file in files %}
    "{{ file }}"
{%- endfor %}
)
"#;

/// Compiles a glob into a regex matched against `/`-separated relative paths.
///
/// `*` and `?` stay inside one path segment, `**/` spans zero or more whole
/// segments and any other `**` matches anything. `[...]` classes pass through,
/// with a leading `!` negating.
pub fn glob_to_regex(pattern: &str) -> Result<Regex> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut re = String::from("^");
    let mut in_class = false;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if in_class {
            match c {
                ']' => {
                    in_class = false;
                    re.push(']');
                }
                '\\' => re.push_str("\\\\"),
                _ => re.push(c),
            }
            i += 1;
            continue;
        }
        match c {
            '*' if chars.get(i + 1) == Some(&'*') => {
                if chars.get(i + 2) == Some(&'/') {
                    re.push_str("(?:.*/)?");
                    i += 3;
                } else {
                    re.push_str(".*");
                    i += 2;
                }
                continue;
            }
            '*' => re.push_str("[^/]*"),
            '?' => re.push_str("[^/]"),
            '[' => {
                in_class = true;
                re.push('[');
                if chars.get(i + 1) == Some(&'!') {
                    re.push('^');
                    i += 1;
                }
            }
            _ => re.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
        i += 1;
    }
    re.push('$');
    Regex::new(&re).map_err(|source| StageError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// `cpp` or `.cpp` -> `**/*.cpp`
pub fn extension_pattern(ext: &str) -> String {
    format!("**/*.{}", ext.trim_start_matches('.'))
}

/// Sorted, de-duplicated `/`-separated paths of regular files under `root`
/// matching at least one pattern.
pub fn collect_files(root: &Path, patterns: &[String]) -> Result<Vec<String>> {
    let matchers = patterns
        .iter()
        .map(|p| glob_to_regex(p))
        .collect::<Result<Vec<_>>>()?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            StageError::Io {
                path,
                source: e.into(),
            }
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative_path) = entry.path().strip_prefix(root) else {
            continue;
        };
        let relative = relative_path
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if matchers.iter().any(|m| m.is_match(&relative)) {
            files.push(relative);
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn init_tera(template: Option<&Path>) -> Result<Tera> {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    let added = match template {
        Some(path) => tera.add_template_file(path, Some(TEMPLATE_NAME)),
        None => tera.add_raw_template(TEMPLATE_NAME, DEFAULT_TEMPLATE),
    };
    added.map_err(|source| StageError::Template {
        name: template
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| TEMPLATE_NAME.to_string()),
        source,
    })?;
    Ok(tera)
}

pub fn render_file_list(spec: &FileListSpec, files: &[String]) -> Result<String> {
    let tera = init_tera(spec.template.as_deref())?;
    let mut context = Context::new();
    context.insert("variable", &spec.variable);
    context.insert("files", files);
    context.insert("root", &spec.root.display().to_string());
    tera.render(TEMPLATE_NAME, &context)
        .map_err(|source| StageError::Template {
            name: TEMPLATE_NAME.to_string(),
            source,
        })
}

pub fn generate(spec: &FileListSpec) -> Result<FileList> {
    let files = collect_files(&spec.root, &spec.patterns)?;
    debug!("Matched {} files under {}", files.len(), spec.root.display());
    let rendered = render_file_list(spec, &files)?;

    if let Some(parent) = spec.output.parent() {
        fs::create_dir_all(parent).map_err(StageError::io(parent))?;
    }
    fs::write(&spec.output, rendered).map_err(StageError::io(&spec.output))?;
    info!("Wrote file list: {} ({} files)", spec.output.display(), files.len());

    Ok(FileList {
        variable: spec.variable.clone(),
        files,
        output: spec.output.clone(),
    })
}

/// Runs every list in a YAML config. Relative paths resolve against the
/// config file's directory.
pub fn generate_from_config(config_path: &Path) -> Result<Vec<FileList>> {
    let text = fs::read_to_string(config_path).map_err(StageError::io(config_path))?;
    let config: FileListConfig =
        serde_yaml::from_str(&text).map_err(|source| StageError::ConfigParse {
            path: config_path.to_path_buf(),
            source,
        })?;
    let base = config_path.parent().unwrap_or_else(|| Path::new(""));

    config
        .lists
        .into_iter()
        .map(|mut spec| {
            spec.root = base.join(&spec.root);
            spec.output = base.join(&spec.output);
            spec.template = spec.template.map(|t| base.join(t));
            generate(&spec)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(pattern: &str, path: &str) -> bool {
        glob_to_regex(pattern).unwrap().is_match(path)
    }

    #[test]
    fn star_stays_in_one_segment() {
        assert!(matches("*.cpp", "main.cpp"));
        assert!(!matches("*.cpp", "src/main.cpp"));
        assert!(matches("src/*.hpp", "src/core.hpp"));
    }

    #[test]
    fn double_star_spans_segments() {
        assert!(matches("**/*.cpp", "main.cpp"));
        assert!(matches("**/*.cpp", "a/b/c/main.cpp"));
        assert!(matches("Source/**", "Source/VK/VKCore.cpp"));
        assert!(!matches("**/*.cpp", "main.cpp.bak"));
    }

    #[test]
    fn classes_and_literals() {
        assert!(matches("VK?ore.cpp", "VKCore.cpp"));
        assert!(matches("[ab].txt", "a.txt"));
        assert!(!matches("[!ab].txt", "a.txt"));
        assert!(matches("file+1.(x)", "file+1.(x)"));
    }

    #[test]
    fn unterminated_class_is_invalid() {
        assert!(matches!(
            glob_to_regex("src/[abc"),
            Err(StageError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn extension_shortcut() {
        assert_eq!(extension_pattern("cpp"), "**/*.cpp");
        assert_eq!(extension_pattern(".hpp"), "**/*.hpp");
    }

    #[test]
    fn default_template_lists_each_file() {
        let spec = FileListSpec {
            root: "Source".into(),
            patterns: vec![],
            output: "out.cmake".into(),
            variable: "ENGINE_SOURCES".to_string(),
            template: None,
        };
        let text = render_file_list(&spec, &["a.cpp".to_string(), "b/c.cpp".to_string()]).unwrap();
        assert!(text.starts_with("# Generated by worlds-build"));
        assert!(text.contains("set(ENGINE_SOURCES"));
        assert!(text.contains("    \"a.cpp\""));
        assert!(text.contains("    \"b/c.cpp\""));
        assert!(text.trim_end().ends_with(')'));
    }

    #[test]
    fn default_template_quotes_paths_with_spaces() {
        let spec = FileListSpec {
            root: "Source".into(),
            patterns: vec![],
            output: "out.cmake".into(),
            variable: "GAME_SOURCES".to_string(),
            template: None,
        };
        let text = render_file_list(&spec, &["Player Rig/hand.cpp".to_string()]).unwrap();
        assert!(text.contains("    \"Player Rig/hand.cpp\"\n"));
    }
}
