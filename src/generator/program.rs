use std::collections::BTreeMap;

use askama::Template;
use tracing::{debug, info};

use crate::error::{MatteError, Result};
use crate::frameworks::{Bootstrap, Frameworks, GoImport};
use crate::syntax::literal::quote;

use super::templates::ProgramTemplate;

/// Imports the supervisor in `main` always needs.
pub const SUPERVISOR_IMPORTS: [&str; 5] = ["errors", "log", "os", "os/signal", "syscall"];

/// Identifiers the generated code declares itself; a package with one of
/// these names would be shadowed.
const GENERATED_IDENTIFIERS: [&str; 15] = [
    "main",
    "mux",
    "server",
    "errChan",
    "errS",
    "err",
    "errs",
    "w",
    "r",
    "signals",
    "serveErrs",
    "shutDowners",
    "shutDown",
    "run",
    "sig",
];

/// Synthesize the program for every active framework, in framework order.
pub fn synthesize(frameworks: &Frameworks, module_path: &str) -> Result<String> {
    let bootstraps = frameworks
        .iter()
        .filter(|f| f.is_active())
        .map(|f| {
            let bootstrap = f.finalize()?;
            debug!(
                framework = f.kind(),
                function = %bootstrap.function_name,
                bindings = f.bindings().len(),
                "bootstrap emitted"
            );
            Ok(bootstrap)
        })
        .collect::<Result<Vec<_>>>()?;
    render_program(&bootstraps, module_path)
}

/// Assemble bootstraps into one program: one import block, every bootstrap
/// function, and a `main` that supervises them.
pub fn render_program(bootstraps: &[Bootstrap], module_path: &str) -> Result<String> {
    let (std_imports, project_imports) = import_groups(bootstraps, module_path)?;
    let mut source = ProgramTemplate {
        std_imports,
        project_imports,
        bootstrap_names: bootstraps.iter().map(|b| b.function_name.clone()).collect(),
        bootstrap_bodies: bootstraps.iter().map(|b| b.body.clone()).collect(),
    }
    .render()?;
    while source.ends_with("\n\n") {
        source.pop();
    }
    if !source.ends_with('\n') {
        source.push('\n');
    }
    info!(
        bootstraps = bootstraps.len(),
        bytes = source.len(),
        "program synthesized"
    );
    Ok(source)
}

/// Whether `path` belongs to the analyzed module rather than the standard library.
pub fn is_project_import(path: &str, module_path: &str) -> bool {
    path == module_path
        || path
            .strip_prefix(module_path)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Split every import into the standard library group and the project group,
/// each sorted and de-duplicated, rendered as Go import specs.
fn import_groups(
    bootstraps: &[Bootstrap],
    module_path: &str,
) -> Result<(Vec<String>, Vec<String>)> {
    let supervisor = SUPERVISOR_IMPORTS.iter().map(|p| GoImport::std(p));
    let all = supervisor.chain(bootstraps.iter().flat_map(|b| b.imports.iter().cloned()));

    let mut by_path: BTreeMap<String, GoImport> = BTreeMap::new();
    let mut by_name: BTreeMap<String, String> = BTreeMap::new();
    for import in all {
        if by_path.contains_key(&import.path) {
            continue;
        }
        if let Some(other) = by_name.get(&import.name) {
            return Err(MatteError::Configuration(format!(
                "packages {other} and {} are both named {}, the generated program cannot import both",
                import.path, import.name
            )));
        }
        if is_project_import(&import.path, module_path)
            && GENERATED_IDENTIFIERS.contains(&import.name.as_str())
        {
            return Err(MatteError::Configuration(format!(
                "package {} is named {}, which the generated program uses as an identifier",
                import.path, import.name
            )));
        }
        by_name.insert(import.name.clone(), import.path.clone());
        by_path.insert(import.path.clone(), import);
    }

    let (project, standard): (Vec<_>, Vec<_>) = by_path
        .into_values()
        .partition(|i| is_project_import(&i.path, module_path));
    Ok((
        standard.iter().map(import_spec).collect(),
        project.iter().map(import_spec).collect(),
    ))
}

fn import_spec(import: &GoImport) -> String {
    let last = import.path.rsplit('/').next().unwrap_or(&import.path);
    if last == import.name {
        quote(&import.path)
    } else {
        format!("{} {}", import.name, quote(&import.path))
    }
}
