use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::{
    CssVariablesFormatter, FilterReport, TokenBuildError, TokenFormatter, TokenSource,
    merge_categories, repair_borders,
};
use crate::config::TokenBuildConfig;

static TRANSPARENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r":\s*#0000(\s*;|\s*/\*)").expect("transparent pattern is valid")
});

/// Stylesheet text plus the bookkeeping of how it was produced.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledTokens {
    pub css: String,
    pub report: FilterReport,
    pub repaired: Vec<String>,
    pub variables: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BuildSummary {
    pub report: FilterReport,
    pub repaired: Vec<String>,
    pub variables: usize,
    pub output: PathBuf,
}

/// Rewrites `: #0000;` and `: #0000 /*` declarations to the `transparent` keyword.
pub fn rewrite_transparent(css: &str) -> String {
    TRANSPARENT
        .replace_all(css, ": transparent$1")
        .into_owned()
}

/// Runs filter, merge, repair and formatting over an in-memory token export.
pub fn compile_tokens(text: &str, config: &TokenBuildConfig) -> Result<CompiledTokens, TokenBuildError> {
    let source = TokenSource::from_json_str(text)?;
    debug!(categories = source.len(), "loaded token source");

    let (mut tree, report) = merge_categories(&source, &config.themes);
    report.log_summary();

    let repaired = repair_borders(tree.root_mut(), &config.border_defaults, &config.wrapper);

    let formatter = CssVariablesFormatter::new(
        config.wrapper.clone(),
        config.math_fraction_digits,
        config.fonts.clone(),
    );
    let formatted = formatter.format(&tree)?;

    let mut css = config.fonts.render();
    css.push('\n');
    css.push_str(&rewrite_transparent(&formatted.text));

    Ok(CompiledTokens {
        css,
        report,
        repaired,
        variables: formatted.variables,
    })
}

/// Reads `config.input`, compiles it and writes the stylesheet to `config.output`.
pub fn build_tokens(config: &TokenBuildConfig) -> Result<BuildSummary, TokenBuildError> {
    let text = fs::read_to_string(&config.input).map_err(|source| TokenBuildError::Read {
        path: config.input.clone(),
        source,
    })?;
    let compiled = compile_tokens(&text, config)?;
    write_atomically(&config.output, &compiled.css)?;

    info!(
        output = %config.output.display(),
        variables = compiled.variables,
        repaired = compiled.repaired.len(),
        "tokens built"
    );

    Ok(BuildSummary {
        report: compiled.report,
        repaired: compiled.repaired,
        variables: compiled.variables,
        output: config.output.clone(),
    })
}

fn write_atomically(path: &Path, contents: &str) -> Result<(), TokenBuildError> {
    let write_error = |source| TokenBuildError::Write {
        path: path.to_path_buf(),
        source,
    };
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(directory).map_err(write_error)?;

    let mut file = NamedTempFile::new_in(directory).map_err(write_error)?;
    file.write_all(contents.as_bytes()).map_err(write_error)?;
    file.persist(path).map_err(|error| write_error(error.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkshopConfig;
    use crate::tokens::CategoryDecision;

    fn config() -> TokenBuildConfig {
        WorkshopConfig::builtin()
            .expect("builtin config should parse")
            .tokens
    }

    #[test]
    fn transparent_rewrite_matches_declarations_only() {
        assert_eq!(rewrite_transparent("  --a: #0000;"), "  --a: transparent;");
        assert_eq!(
            rewrite_transparent("  --a:#0000 /** clear */"),
            "  --a: transparent /** clear */"
        );
        assert_eq!(rewrite_transparent("  --a: #00000f;"), "  --a: #00000f;");
        assert_eq!(rewrite_transparent("  --a: #0000ff;"), "  --a: #0000ff;");
        assert_eq!(rewrite_transparent("  --a: 0 0 #0000;"), "  --a: 0 0 #0000;");
    }

    #[test]
    fn compiles_the_designated_theme_with_font_prelude() {
        let compiled = compile_tokens(
            r##"{
                "colors/tonies/default": { "tds": { "bg": { "$type": "color", "$value": "#0000" } } },
                "colors/tonies/inverted": { "tds": { "bg": { "$type": "color", "$value": "#fff" } } },
                "core/border": { "tds": { "focus": { "$type": "border", "$value": { "color": "#00f", "width": "", "style": "" } } } }
            }"##,
            &config(),
        )
        .expect("tokens should compile");

        assert!(compiled.css.starts_with("@font-face {"));
        let root = compiled.css.find(":root {").expect("root block should exist");
        let last_face = compiled.css.rfind("@font-face").expect("font faces should exist");
        assert!(last_face < root);
        assert!(compiled.css.contains("  --tds-bg: transparent;\n"));
        assert!(compiled.css.contains("  --tds-focus-width: 0px;\n"));
        assert!(compiled.css.contains("  --tds-focus-style: solid;\n"));
        assert_eq!(compiled.repaired, vec!["tds.focus"]);
        assert_eq!(
            compiled.report.decision("colors/tonies/inverted"),
            Some(CategoryDecision::SkippedInverted)
        );
        assert_eq!(compiled.variables, 4);
    }

    #[test]
    fn empty_result_still_produces_a_stylesheet() {
        let compiled = compile_tokens(r#"{ "$themes": [] }"#, &config())
            .expect("empty source should compile");
        assert_eq!(compiled.variables, 0);
        assert_eq!(compiled.report.processed(), 0);
        assert!(compiled.css.ends_with(":root {\n}\n"));
    }

    #[test]
    fn token_named_value_survives_category_merge() {
        let compiled = compile_tokens(
            r#"{
                "core/a": { "tds": { "opacity": { "value": { "$type": "opacity", "$value": "50%" } } } },
                "core/b": { "tds": { "opacity": { "other": { "$type": "opacity", "$value": "10%" } } } }
            }"#,
            &config(),
        )
        .expect("tokens should compile");

        assert_eq!(compiled.variables, 2);
        assert!(compiled.css.contains("  --tds-opacity-value: 0.5;\n"));
        assert!(compiled.css.contains("  --tds-opacity-other: 0.1;\n"));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            compile_tokens("{ nope", &config()),
            Err(TokenBuildError::Parse(_))
        ));
    }
}
