use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use genmedia_contracts::models::{CapabilityRegistry, MediaFamily};
use genmedia_contracts::requests::{
    ConstraintValidator, FamilyDefaults, Operation, ParameterResolver, ResolverDefaults,
    ToolArguments, ValidatedDescriptor,
};
use genmedia_contracts::{RegistryError, ValidationError};
use serde_json::{json, Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("request processing canceled early for {operation}")]
    Cancelled { operation: Operation },

    #[error(transparent)]
    Rejected(#[from] ValidationError),

    #[error("unknown backend '{name}'; available: {available}")]
    UnknownBackend { name: String, available: String },

    #[error("backend '{backend}' failed: {message}")]
    Backend { backend: String, message: String },
}

/// Per-request context shared with the transport layer. Cancellation is
/// cooperative: the engine only looks at the flag before it starts work and
/// before handing a descriptor to a backend.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancelled: Arc<AtomicBool>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackendReceipt {
    pub backend: String,
    pub request: Map<String, Value>,
    pub response: Map<String, Value>,
    pub warnings: Vec<String>,
}

/// Seam to the generation client. Implementations own the network call and
/// any polling; they only ever see validated descriptors.
pub trait GenerationBackend: Send + Sync {
    fn name(&self) -> &str;
    fn submit(&self, descriptor: &ValidatedDescriptor) -> Result<BackendReceipt>;
}

#[derive(Default)]
pub struct BackendRegistry {
    backends: BTreeMap<String, Box<dyn GenerationBackend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<B: GenerationBackend + 'static>(&mut self, backend: B) {
        self.backends
            .insert(backend.name().to_string(), Box::new(backend));
    }

    pub fn get(&self, name: &str) -> Option<&dyn GenerationBackend> {
        self.backends.get(name).map(|backend| backend.as_ref())
    }

    pub fn names(&self) -> Vec<String> {
        self.backends.keys().cloned().collect()
    }
}

/// Echoes the descriptor back as the request payload without calling out.
pub struct DryrunBackend;

impl GenerationBackend for DryrunBackend {
    fn name(&self) -> &str {
        "dryrun"
    }

    fn submit(&self, descriptor: &ValidatedDescriptor) -> Result<BackendReceipt> {
        let payload = serde_json::to_value(descriptor)?;
        Ok(BackendReceipt {
            backend: self.name().to_string(),
            request: map_object(json!({
                "endpoint": "dryrun",
                "payload": payload,
            })),
            response: map_object(json!({
                "status": "ok",
                "model": descriptor.model,
                "outputs": descriptor.output_count.unwrap_or(1),
            })),
            warnings: descriptor.warnings.clone(),
        })
    }
}

fn default_backend_registry() -> BackendRegistry {
    let mut backends = BackendRegistry::new();
    backends.register(DryrunBackend);
    backends
}

/// Entry point for tool handlers: turns raw arguments into validated
/// descriptors against one immutable capability registry.
pub struct RequestEngine {
    registry: Arc<CapabilityRegistry>,
    defaults: ResolverDefaults,
    backends: BackendRegistry,
}

impl RequestEngine {
    /// Fails when a configured default model does not resolve in a family
    /// that has models, or when the configured default aspect ratio or
    /// duration is outside that model's limits.
    pub fn new(
        registry: Arc<CapabilityRegistry>,
        defaults: ResolverDefaults,
    ) -> std::result::Result<Self, RegistryError> {
        for family in MediaFamily::ALL {
            if registry.list(family).next().is_none() {
                continue;
            }
            check_family_defaults(&registry, family, defaults.for_family(family))?;
        }
        Ok(Self {
            registry,
            defaults,
            backends: default_backend_registry(),
        })
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn defaults(&self) -> &ResolverDefaults {
        &self.defaults
    }

    pub fn register_backend<B: GenerationBackend + 'static>(&mut self, backend: B) {
        self.backends.register(backend);
    }

    pub fn backend_names(&self) -> Vec<String> {
        self.backends.names()
    }

    pub fn describe(&self, family: MediaFamily) -> String {
        self.registry.describe(family)
    }

    /// Resolves and validates one request. Pure: no I/O, no shared state.
    pub fn validate(
        &self,
        operation: Operation,
        args: &ToolArguments,
    ) -> std::result::Result<ValidatedDescriptor, ValidationError> {
        let params =
            ParameterResolver::new(&self.registry, &self.defaults).resolve(operation, args)?;
        let model = self
            .registry
            .lookup(params.family, &params.model)
            .ok_or_else(|| ValidationError::UnsupportedModel {
                family: params.family,
                input: params.model.clone(),
            })?;
        ConstraintValidator::new(model).validate(params)
    }

    pub fn prepare(
        &self,
        ctx: &RequestContext,
        operation: Operation,
        args: &ToolArguments,
    ) -> std::result::Result<ValidatedDescriptor, EngineError> {
        if ctx.is_cancelled() {
            tracing::info!(operation = %operation, "request canceled before validation");
            return Err(EngineError::Cancelled { operation });
        }
        match self.validate(operation, args) {
            Ok(descriptor) => {
                tracing::info!(
                    operation = %operation,
                    model = %descriptor.model,
                    outputs = ?descriptor.output_count,
                    duration_secs = ?descriptor.duration_secs,
                    warnings = descriptor.warnings.len(),
                    "request validated"
                );
                Ok(descriptor)
            }
            Err(err) => {
                tracing::info!(operation = %operation, error = %err, "request rejected");
                Err(err.into())
            }
        }
    }

    pub fn dispatch(
        &self,
        ctx: &RequestContext,
        operation: Operation,
        args: &ToolArguments,
        backend: &str,
    ) -> std::result::Result<(ValidatedDescriptor, BackendReceipt), EngineError> {
        let Some(target) = self.backends.get(backend) else {
            return Err(EngineError::UnknownBackend {
                name: backend.to_string(),
                available: self.backends.names().join(", "),
            });
        };
        let descriptor = self.prepare(ctx, operation, args)?;
        if ctx.is_cancelled() {
            return Err(EngineError::Cancelled { operation });
        }
        let receipt = target
            .submit(&descriptor)
            .map_err(|err| EngineError::Backend {
                backend: backend.to_string(),
                message: format!("{err:#}"),
            })?;
        Ok((descriptor, receipt))
    }
}

fn check_family_defaults(
    registry: &CapabilityRegistry,
    family: MediaFamily,
    defaults: &FamilyDefaults,
) -> std::result::Result<(), RegistryError> {
    let Some(model) = registry.resolve(family, &defaults.model) else {
        return Err(RegistryError::UnknownDefaultModel {
            family,
            input: defaults.model.clone(),
        });
    };
    let unsupported = |field: &str, value: String| RegistryError::UnsupportedDefault {
        family,
        field: field.to_string(),
        value,
        model: model.canonical_id.clone(),
    };
    if let Some(ratio) = defaults.aspect_ratio.as_deref() {
        let ratios = model.aspect_ratios();
        if !ratios.is_empty() && !ratios.iter().any(|candidate| candidate == ratio) {
            return Err(unsupported("aspect_ratio", ratio.to_string()));
        }
    }
    if let Some(duration) = defaults.duration {
        if family == MediaFamily::Video && !model.durations().contains(&duration) {
            return Err(unsupported("duration", duration.to_string()));
        }
    }
    Ok(())
}

fn map_object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}
