//! # Groovy Rendering Helpers
//!
//! Small helpers for assembling groovy source submitted to the Jenkins script
//! console. Descriptors are rendered deterministically: the same input always
//! produces byte-identical script text.

/// Render a groovy single-quoted string literal with escaping
///
/// Single-quoted groovy strings do not interpolate, so substitution-resolved
/// values can be embedded without further escaping concerns.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

/// Render an optional value as a quoted literal or groovy `null`
pub fn quote_or_null(value: Option<&str>) -> String {
    match value {
        Some(v) => quote(v),
        None => "null".to_string(),
    }
}

/// Wrap a configuration-as-code document in a groovy script that applies it
///
/// The document is written into the Jenkins home and handed to the
/// configuration-as-code plugin, all inside a single script execution, so a
/// crash can never leave a half-applied document behind.
pub fn configuration_as_code_script(document: &str) -> String {
    format!(
        r"import io.jenkins.plugins.casc.ConfigurationAsCode
import jenkins.model.Jenkins

def cascFile = new java.io.File(Jenkins.get().getRootDir(), 'jenkins-operator-casc.yaml')
cascFile.text = {document}
ConfigurationAsCode.get().configure(cascFile.toURI().toString())
println 'configuration as code applied'
",
        document = quote(document)
    )
}
