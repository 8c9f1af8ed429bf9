//! Resolve module use case
//!
//! Computes the runtime properties of one module: loads the descriptor,
//! builds the resolution context, substitutes every expression in the
//! module's properties and flattens the result into environment entries.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use mta_domain::context::ResolutionContext;
use mta_domain::descriptor::{Descriptor, Module};
use mta_domain::value::{PropertyMap, value_to_string};

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::{DescriptorLoader, EnvironmentSource};
use crate::variable_resolver::{Scope, VariableResolver, apply_service_bindings};

/// Environment file name used when none is given.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Input for [`ResolveModule`].
#[derive(Debug, Clone, Default)]
pub struct ResolveModuleInput {
    /// Project directory; defaults to the directory of the descriptor.
    pub working_dir: Option<PathBuf>,
    /// Name of the module to resolve.
    pub module_name: String,
    /// Path of the `mta.yaml` descriptor.
    pub descriptor_path: PathBuf,
    /// Paths of extension descriptors to merge.
    pub extension_paths: Vec<PathBuf>,
    /// Environment file name or path; defaults to `.env`.
    pub env_file: Option<String>,
}

/// Resolved module properties and the diagnostics gathered on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveModuleOutput {
    /// Flattened properties, ready to be exposed as environment variables.
    pub properties: BTreeMap<String, String>,
    /// Human-readable descriptions of unresolved references.
    pub messages: Vec<String>,
}

/// Resolves the runtime properties of a module.
pub struct ResolveModule<L, E> {
    loader: L,
    environment: E,
}

impl<L: DescriptorLoader, E: EnvironmentSource> ResolveModule<L, E> {
    /// Creates a new `ResolveModule` use case.
    pub const fn new(loader: L, environment: E) -> Self {
        Self {
            loader,
            environment,
        }
    }

    /// Executes the use case.
    ///
    /// # Errors
    /// Returns an error if the module name is empty, the descriptor cannot be
    /// loaded, or the module does not exist. Unresolved references are not
    /// errors; they are listed in [`ResolveModuleOutput::messages`].
    pub fn execute(&self, input: &ResolveModuleInput) -> ApplicationResult<ResolveModuleOutput> {
        if input.module_name.trim().is_empty() {
            return Err(ApplicationError::EmptyModuleName);
        }

        let mut descriptor = self
            .loader
            .load(&input.descriptor_path, &input.extension_paths)?;

        let working_dir = input
            .working_dir
            .clone()
            .unwrap_or_else(|| default_working_dir(&input.descriptor_path));
        let env_file = input
            .env_file
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_ENV_FILE);

        let module = descriptor
            .module(&input.module_name)
            .ok_or_else(|| ApplicationError::ModuleNotFound(input.module_name.clone()))?;

        let env_path = env_file_path(&working_dir, module, env_file);
        let context = build_context(
            &descriptor,
            self.environment.variables(),
            self.read_env_file(&env_path),
        );

        let output = resolve_module(&mut descriptor, &input.module_name, &context)?;
        info!(
            module = %input.module_name,
            properties = output.properties.len(),
            unresolved = output.messages.len(),
            "resolved module"
        );
        Ok(output)
    }

    fn read_env_file(&self, path: &Path) -> Vec<(String, String)> {
        match self.environment.env_file(path) {
            Ok(entries) => {
                debug!(path = %path.display(), entries = entries.len(), "loaded env file");
                entries
            }
            Err(error) => {
                debug!(path = %path.display(), %error, "env file not loaded");
                Vec::new()
            }
        }
    }
}

/// Returns the directory containing the descriptor.
#[must_use]
pub fn default_working_dir(descriptor_path: &Path) -> PathBuf {
    descriptor_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Locates a module's environment file: absolute paths are used as is,
/// relative ones are taken from the module directory.
#[must_use]
pub fn env_file_path(working_dir: &Path, module: &Module, env_file: &str) -> PathBuf {
    let env_file = Path::new(env_file);
    if env_file.is_absolute() {
        return env_file.to_path_buf();
    }
    working_dir
        .join(module.path.as_deref().unwrap_or_default())
        .join(env_file)
}

/// Builds the resolution context of a run.
///
/// Process variables are inserted first, then the environment file entries,
/// then service bindings found under `VCAP_SERVICES`.
pub fn build_context<V, F>(descriptor: &Descriptor, variables: V, env_entries: F) -> ResolutionContext
where
    V: IntoIterator<Item = (String, String)>,
    F: IntoIterator<Item = (String, String)>,
{
    let mut context = ResolutionContext::for_descriptor(descriptor);
    context.extend(variables);
    context.extend(env_entries);

    let bound = apply_service_bindings(&mut context);
    debug!(bound, "built resolution context");
    context
}

/// Resolves a module of `descriptor` in place and flattens the result.
///
/// The module's properties and the properties of each of its requires
/// entries are rewritten with their resolved values.
///
/// # Errors
/// Returns [`ApplicationError::ModuleNotFound`] if the module does not exist.
pub fn resolve_module(
    descriptor: &mut Descriptor,
    module_name: &str,
    context: &ResolutionContext,
) -> ApplicationResult<ResolveModuleOutput> {
    let (properties, requires_properties, diagnostics) = {
        let module = descriptor
            .module(module_name)
            .ok_or_else(|| ApplicationError::ModuleNotFound(module_name.to_string()))?;
        let mut resolver = VariableResolver::new(descriptor, context);

        let mut properties = module.properties.clone();
        resolver.resolve_properties(&mut properties, Scope::module(module));

        let mut requires_properties = Vec::with_capacity(module.requires.len());
        for requires in &module.requires {
            let mut resolved = requires.properties.clone();
            resolver.resolve_properties(&mut resolved, Scope::requires(module, requires));
            requires_properties.push(resolved);
        }

        (properties, requires_properties, resolver.into_diagnostics())
    };

    let module = descriptor
        .module_mut(module_name)
        .ok_or_else(|| ApplicationError::ModuleNotFound(module_name.to_string()))?;
    module.properties = properties;
    for (requires, resolved) in module.requires.iter_mut().zip(requires_properties) {
        requires.properties = resolved;
    }

    Ok(ResolveModuleOutput {
        properties: flatten_properties(module),
        messages: diagnostics.into_messages(),
    })
}

/// Flattens a module's properties into string entries.
///
/// Module properties come first. Properties of requires entries without a
/// group are added next and override same-named entries; requires entries
/// sharing a group are collected into a JSON array stored under the group
/// name. Non-string values are serialized as compact JSON.
#[must_use]
pub fn flatten_properties(module: &Module) -> BTreeMap<String, String> {
    let mut flattened = BTreeMap::new();
    insert_all(&mut flattened, &module.properties);

    let mut groups: BTreeMap<&str, Vec<Value>> = BTreeMap::new();
    for requires in &module.requires {
        match requires.group.as_deref() {
            Some(group) => groups
                .entry(group)
                .or_default()
                .push(Value::Object(requires.properties.clone())),
            None => insert_all(&mut flattened, &requires.properties),
        }
    }

    for (group, entries) in groups {
        flattened.insert(group.to_string(), Value::Array(entries).to_string());
    }
    flattened
}

fn insert_all(flattened: &mut BTreeMap<String, String>, properties: &PropertyMap) {
    for (key, value) in properties {
        flattened.insert(key.clone(), value_to_string(value));
    }
}
