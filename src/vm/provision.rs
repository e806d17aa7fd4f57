//! Rendering libvirt definitions and registering them

use crate::backend::{BackendError, ControlPlane, ResourceKind};
use crate::error::{DeployError, TemplateError};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

fn placeholder() -> Regex {
    Regex::new(r"%([^%\s]+)%").expect("placeholder pattern is valid")
}

/// Replace every `%KEY%` in `template`; unknown keys are an error
pub fn render_str(template: &str, substitutions: &HashMap<&str, &str>) -> Result<String, TemplateError> {
    let re = placeholder();
    if let Some(missing) = re
        .captures_iter(template)
        .map(|c| c[1].to_string())
        .find(|k| !substitutions.contains_key(k.as_str()))
    {
        return Err(TemplateError::MissingKey(missing));
    }
    let rendered = re.replace_all(template, |c: &Captures| substitutions[&c[1]].to_string());
    Ok(rendered.into_owned())
}

/// Read and render a template file
pub fn render_template(path: &Path, substitutions: &HashMap<&str, &str>) -> Result<String, TemplateError> {
    let text = fs::read_to_string(path).map_err(|source| TemplateError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    render_str(&text, substitutions)
}

/// Define a resource, then start it and mark it autostart.
///
/// Nothing is started unless the define succeeded. A failed start is fatal;
/// a failed autostart only leaves the resource running until next boot.
pub fn define_and_start(
    control: &dyn ControlPlane,
    kind: ResourceKind,
    name: &str,
    xml: &Path,
) -> Result<(), DeployError> {
    let fail = |source: BackendError| DeployError::Provision {
        kind,
        name: name.to_string(),
        source,
    };
    control.define(kind, xml).map_err(fail)?;
    control.start(kind, name).map_err(fail)?;
    if let Err(e) = control.autostart(kind, name) {
        warn!("Failed to set {kind} {name} to autostart: {e}");
    }
    info!("VSA {kind} {name} creation success");
    Ok(())
}

/// Render `template` into `out` and bring the resource up from it
pub fn provision(
    control: &dyn ControlPlane,
    kind: ResourceKind,
    name: &str,
    template: &Path,
    out: &Path,
    substitutions: &HashMap<&str, &str>,
) -> Result<(), DeployError> {
    let xml = render_template(template, substitutions)?;
    fs::write(out, xml).map_err(|source| TemplateError::Write {
        path: out.to_path_buf(),
        source,
    })?;
    define_and_start(control, kind, name, out)
}
